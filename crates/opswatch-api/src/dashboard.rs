//! Read-only HTML dashboard.
//!
//! Rendered server-side from the registry snapshot, the run history, and
//! aggregate record counts from the gateway. Backend failures degrade to an
//! "unavailable" cell; the page itself always renders.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;

use opswatch_scheduler::{RunOutcome, TaskState};

use crate::state::AppState;

/// GET /dashboard
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Html<String> {
    let tasks = state.scheduler.registry().list();
    let runs = state.scheduler.history().recent(15);

    let mut table_counts = Vec::with_capacity(state.tables.len());
    for table in &state.tables {
        let cell = match state.gateway.count_records(table).await {
            Ok(count) => count.to_string(),
            Err(_) => "unavailable".to_string(),
        };
        table_counts.push((table.clone(), cell));
    }

    Html(render(&tasks, &runs, &table_counts))
}

fn render(
    tasks: &[TaskState],
    runs: &[opswatch_scheduler::JobRun],
    table_counts: &[(String, String)],
) -> String {
    let task_rows: String = tasks
        .iter()
        .map(|t| {
            let cadence = t
                .recurrence_secs
                .map(|s| format!("every {s}s"))
                .unwrap_or_else(|| "manual".to_string());
            let last_run = t
                .last_run
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "never".to_string());
            let outcome = match t.last_outcome {
                Some(RunOutcome::Success) => "success",
                Some(RunOutcome::Failure) => "failure",
                None => "-",
            };
            let running = if t.running { "running" } else { "idle" };
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}</td></tr>",
                escape(&t.name),
                cadence,
                last_run,
                outcome,
                outcome,
                running,
                t.run_count,
            )
        })
        .collect();

    let run_rows: String = runs
        .iter()
        .map(|r| {
            let outcome = match r.outcome {
                RunOutcome::Success => "success",
                RunOutcome::Failure => "failure",
            };
            format!(
                "<tr><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td></tr>",
                escape(&r.task),
                r.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
                outcome,
                outcome,
                escape(&r.message),
            )
        })
        .collect();

    let count_rows: String = table_counts
        .iter()
        .map(|(table, count)| format!("<tr><td>{}</td><td>{}</td></tr>", escape(table), count))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Opswatch</title>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta http-equiv="refresh" content="30">
  <style>
    body {{ font-family: -apple-system, sans-serif; margin: 40px; line-height: 1.5; color: #222; }}
    .container {{ max-width: 900px; margin: 0 auto; }}
    h2 {{ margin-top: 32px; }}
    table {{ width: 100%; border-collapse: collapse; background: #fff; }}
    th, td {{ padding: 8px 12px; border-bottom: 1px solid #e5e5e5; text-align: left; }}
    th {{ background: #f5f5f5; }}
    .success {{ color: #155724; }}
    .failure {{ color: #dc3545; }}
    .note {{ color: #666; font-size: 0.9em; }}
  </style>
</head>
<body>
  <div class="container">
    <h1>Opswatch</h1>
    <p class="note">Read-only monitoring view. Refreshes every 30 seconds.</p>

    <h2>Tasks</h2>
    <table>
      <tr><th>Task</th><th>Cadence</th><th>Last run</th><th>Outcome</th><th>State</th><th>Runs</th></tr>
      {task_rows}
    </table>

    <h2>Recent runs</h2>
    <table>
      <tr><th>Task</th><th>Started</th><th>Outcome</th><th>Message</th></tr>
      {run_rows}
    </table>

    <h2>Record counts</h2>
    <table>
      <tr><th>Table</th><th>Live records</th></tr>
      {count_rows}
    </table>
  </div>
</body>
</html>
"#
    )
}

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
