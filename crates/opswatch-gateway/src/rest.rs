//! REST-backed gateway against the hosted record store.
//!
//! Talks PostgREST dialect: row counts come back in the `Content-Range`
//! response header when `Prefer: count=exact` is set, filters are query
//! parameters like `deleted_at=lt.<ts>`, and deletions can return the removed
//! rows with `Prefer: return=representation`.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::debug;

use crate::error::DataAccessError;
use crate::gateway::DataGateway;

/// REST gateway to the record store.
pub struct RestGateway {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl RestGateway {
    /// Create a gateway for a backend base URL and service credential.
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Run a count query and read the total from `Content-Range`.
    async fn count_with_filters(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<u64, DataAccessError> {
        let mut query: Vec<(&str, String)> = vec![
            ("select", "id".to_string()),
            ("limit", "1".to_string()),
        ];
        query.extend_from_slice(filters);

        let response = self
            .request(self.http.get(self.table_url(table)))
            .header("Prefer", "count=exact")
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataAccessError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                DataAccessError::InvalidResponse("missing Content-Range header".to_string())
            })?;

        parse_content_range(range).ok_or_else(|| {
            DataAccessError::InvalidResponse(format!("unparseable Content-Range: {range}"))
        })
    }
}

/// Extract the total from a `Content-Range` value like `0-0/42` or `*/42`.
fn parse_content_range(range: &str) -> Option<u64> {
    range.split('/').nth(1)?.trim().parse().ok()
}

#[async_trait]
impl DataGateway for RestGateway {
    async fn count_records(&self, table: &str) -> Result<u64, DataAccessError> {
        let count = self
            .count_with_filters(table, &[("deleted_at", "is.null".to_string())])
            .await?;
        debug!("count_records({table}) = {count}");
        Ok(count)
    }

    async fn find_soft_deleted_older_than(
        &self,
        table: &str,
        cutoff: Duration,
    ) -> Result<Vec<String>, DataAccessError> {
        let threshold = (Utc::now() - cutoff).to_rfc3339();
        let response = self
            .request(self.http.get(self.table_url(table)))
            .query(&[
                ("select", "id".to_string()),
                ("deleted_at", "not.is.null".to_string()),
                ("deleted_at", format!("lt.{threshold}")),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataAccessError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<serde_json::Value> = response.json().await?;
        let ids = rows
            .iter()
            .map(|row| match &row["id"] {
                serde_json::Value::String(s) => Ok(s.clone()),
                serde_json::Value::Number(n) => Ok(n.to_string()),
                other => Err(DataAccessError::InvalidResponse(format!(
                    "row without usable id: {other}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "find_soft_deleted_older_than({table}) found {} record(s)",
            ids.len()
        );
        Ok(ids)
    }

    async fn purge(&self, table: &str, ids: &[String]) -> Result<u64, DataAccessError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let filter = format!("in.({})", ids.join(","));
        let response = self
            .request(self.http.delete(self.table_url(table)))
            .header("Prefer", "return=representation")
            .query(&[("id", filter)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataAccessError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let removed: Vec<serde_json::Value> = response.json().await?;
        debug!("purge({table}) removed {} record(s)", removed.len());
        Ok(removed.len() as u64)
    }

    async fn record_growth_since(
        &self,
        table: &str,
        window: Duration,
    ) -> Result<u64, DataAccessError> {
        let since = (Utc::now() - window).to_rfc3339();
        let count = self
            .count_with_filters(table, &[("created_at", format!("gte.{since}"))])
            .await?;
        debug!("record_growth_since({table}) = {count}");
        Ok(count)
    }
}

#[cfg(test)]
mod parse_tests {
    use super::parse_content_range;

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-0/42"), Some(42));
        assert_eq!(parse_content_range("*/3573"), Some(3573));
        assert_eq!(parse_content_range("0-24"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }
}

#[cfg(test)]
#[path = "rest_tests.rs"]
mod tests;
