//! Operations available to an application manager.
//!
//! Each submodule owns the request and response shapes of one platform
//! resource. Requests carry their operation as a method taking the
//! [`Dispatcher`](crate::dispatch::Dispatcher) to send it through:
//!
//! ```no_run
//! use semut_sdk::appmanager::worker::DescribeRequest;
//! use semut_sdk::dispatch::Dispatcher;
//!
//! # async fn example() -> Result<(), semut_sdk::error::ApiError> {
//! let dispatcher = Dispatcher::default();
//! let workers = DescribeRequest::default().describe(&dispatcher).await?;
//! # let _ = workers;
//! # Ok(())
//! # }
//! ```

pub mod applications;
pub mod cron;
pub mod deployment;
pub mod encryption;
pub mod events;
pub mod images;
pub mod kvdatabase;
pub mod logexport;
pub mod metrics;
pub mod notifications;
pub mod objectstore;
pub mod secrets;
pub mod snapshots;
pub mod volumes;
pub mod worker;
pub mod workergroup;
