//! # pulse-client
//!
//! Remote source adapters for the market-pulse feed.
//!
//! Two sources deliver the same [`MarketRecord`] shape:
//!
//! - **Primary**: a JSON array endpoint, tried first and bounded by a short
//!   timeout
//! - **Fallback**: a published spreadsheet in CSV form, used while the
//!   primary is cooling down
//!
//! Neither source touches any cache; both hand records back to the caller.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pulse_client::{HttpSourceAdapter, SourceAdapter};
//! use pulse_core::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = HttpSourceAdapter::new(&Config::from_env()?)?;
//!     let records = adapter.fetch_primary().await?;
//!     println!("{} records", records.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every call returns `pulse_core::Result`; a source failure is one of
//! `Error::Timeout`, `Error::Network` or `Error::Protocol`.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod sources;
pub mod transport;

pub use adapter::{HttpSourceAdapter, SourceAdapter};
pub use pulse_core::{Config, Error, Result};
pub use pulse_models::MarketRecord;
pub use sources::{fallback::FallbackSource, primary::PrimarySource};
