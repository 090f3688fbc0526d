//! Metrics queries from inside a worker.

pub use crate::appmanager::metrics::{QueryRequest, QueryResponse, QueryResult};
