//! Asynchronous client for the SoundCloud search API.
//!
//! [`Client`] issues anonymous or bearer-authenticated GET requests on a
//! background I/O thread, inflates gzip bodies, and decodes the heterogeneous
//! result lists into typed records. [`Client::cancel`] aborts every pending
//! and future query of that client.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

pub use api::{Client, QueryFuture};
pub use config::Config;
pub use error::{Error, Result};
pub use model::{SearchKey, Track, User};
