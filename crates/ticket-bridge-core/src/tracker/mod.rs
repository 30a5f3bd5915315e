//! Seam between the sync logic and the project tracker.

use async_trait::async_trait;
use openproject_client::ApiError;

use crate::work_item::{CorrelationKey, WorkItemDraft};

mod openproject;

pub use openproject::OpenProjectTracker;

/// Errors from tracker operations.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The tracker API rejected the call or could not be reached.
    #[error("Tracker API call failed: {0}")]
    Api(#[from] ApiError),
}

impl TrackerError {
    /// Whether a later redelivery of the same webhook could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api(e) => e.is_transient(),
        }
    }
}

/// Work item that already exists in the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingWorkItem {
    pub id: u64,

    /// Concurrency token, echoed on update
    pub lock_version: u64,

    pub subject: String,

    pub description: Option<String>,

    /// Value of the correlation field, if the tracker returned it
    pub correlation: Option<String>,

    pub status: Option<String>,

    pub assignee: Option<String>,
}

/// Query and mutate work items in the project tracker.
///
/// Implementations perform exactly one remote call per method and never retry.
#[async_trait]
pub trait WorkItemTracker: Send + Sync {
    /// First work item (lowest id) whose `field` equals `key`.
    async fn find_by_correlation(
        &self,
        field: &str,
        key: &CorrelationKey,
    ) -> Result<Option<ExistingWorkItem>, TrackerError>;

    /// Create a work item. Returns the new item's id.
    async fn create_work_item(
        &self,
        draft: &WorkItemDraft,
        notify: bool,
    ) -> Result<u64, TrackerError>;

    /// Overwrite `existing` with `draft`, guarded by its lock version.
    /// Returns the updated item's id.
    async fn update_work_item(
        &self,
        existing: &ExistingWorkItem,
        draft: &WorkItemDraft,
        notify: bool,
    ) -> Result<u64, TrackerError>;
}
