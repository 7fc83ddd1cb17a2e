//! # Opswatch Gateway
//!
//! The sole interface to the external record store. Tasks and the API surface
//! never talk to the backend directly; everything goes through the
//! [`DataGateway`] trait.
//!
//! The gateway is a narrow capability interface: counting records, finding
//! soft-deleted records past a retention cutoff, purging by id, and measuring
//! record growth over a window. It performs no retries — each task decides
//! whether a failure aborts the run or is tolerated.

mod error;
mod gateway;
mod rest;

pub use error::DataAccessError;
pub use gateway::{DataGateway, MemoryGateway, MemoryRecord};
pub use rest::RestGateway;
