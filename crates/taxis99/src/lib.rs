//! HTTP client for the 99 Taxis REST API
//!
//! This crate provides a small JSON-over-HTTP [`Client`]: it resolves a
//! relative path against a base URL, sends an optional JSON body through a
//! pluggable [`Transport`] and decodes the JSON response.
//!
//! # Example
//!
//! ```no_run
//! use serde::Deserialize;
//! use taxis99::{CancellationToken, Client, Error};
//!
//! #[derive(Deserialize)]
//! struct Employee {
//!     name: String,
//! }
//!
//! async fn example() -> Result<Vec<Employee>, Error> {
//!     let client: Client = Client::new(None);
//!     let ctx = CancellationToken::new();
//!
//!     let mut employees = Vec::new();
//!     client
//!         .request(&ctx, "GET", "employees", None::<&()>, Some(&mut employees))
//!         .await?;
//!     Ok(employees)
//! }
//! ```

mod client;
mod error;
mod settings;
mod transport;

pub use client::{Client, JSON_CONTENT_TYPE};
pub use error::{ApiError, Error, ErrorKind};
pub use reqwest;
pub use settings::{Settings, DEFAULT_BASE_URL, ENV_PREFIX};
pub use tokio_util::sync::CancellationToken;
pub use transport::{HttpTransport, HttpTransportBuilder, Transport};
pub use url;
