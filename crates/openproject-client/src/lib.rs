//! # OpenProject Client
//!
//! Minimal client for the OpenProject API v3, covering the work package
//! operations needed by Ticket-Bridge:
//! - Looking up work packages by a custom field value
//! - Creating work packages in a project
//! - Updating work packages with optimistic locking (`lockVersion`)
//!
//! Responses are HAL+JSON documents. Every response is checked for an
//! `Error` envelope before being decoded, so callers only ever see typed
//! values or an [`ApiError`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use openproject_client::{ClientConfig, OpenProjectClient, WorkPackageQuery};
//!
//! # async fn example() -> Result<(), openproject_client::ApiError> {
//! let client = OpenProjectClient::new(ClientConfig::new(
//!     "https://openproject.example.com",
//!     "api-token",
//! ))?;
//!
//! let query = WorkPackageQuery::custom_field_equals(
//!     "customField2",
//!     "https://helpdesk.example.com/#ticket/zoom/42",
//! );
//! let matches = client.find_work_packages("support", &query).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod hal;
pub mod work_package;

pub use client::{ClientConfig, OpenProjectClient};
pub use error::ApiError;
pub use work_package::{
    Formattable, Link, WorkPackage, WorkPackageCollection, WorkPackageLinks, WorkPackageQuery,
    WorkPackageWrite, WriteLinks,
};
