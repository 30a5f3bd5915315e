//! Ticket → work package synchronization.
//!
//! One call to [`SyncHandler::handle`] processes one webhook delivery:
//!
//! 1. Derive the correlation key from the ticket id
//! 2. Look up an existing work package by that key
//! 3. Refuse to continue without a configured correlation field
//! 4. Build the desired work package from the ticket and mapping tables
//! 5. Update the existing work package, or create one if the ticket is
//!    neither closed/merged nor owned by an unmapped agent
//!
//! At most one lookup and one mutation are issued and nothing is retried.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::locks::TicketLocks;
use crate::mapping::{AssigneeMap, StatusMap};
use crate::ticket::{OwnerId, TicketEvent, TicketState};
use crate::tracker::{TrackerError, WorkItemTracker};
use crate::work_item::{CorrelationKey, WorkItemDraft};

/// Lookup field used when no correlation field is configured.
///
/// The lookup still runs so the log shows whether a matching item exists,
/// which helps finding the right field name on a fresh instance.
pub const DEFAULT_LOOKUP_FIELD: &str = "customField2";

/// Immutable settings shared by every delivery.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Prepended to the ticket id to form the correlation key
    pub url_prefix: String,

    /// Custom field storing the correlation key; required for any mutation
    pub custom_field: Option<String>,

    /// Filter key used for the lookup
    pub lookup_field: String,

    pub assignees: AssigneeMap,

    pub statuses: StatusMap,
}

impl SyncSettings {
    pub fn new(
        url_prefix: impl Into<String>,
        custom_field: Option<String>,
        assignees: AssigneeMap,
        statuses: StatusMap,
    ) -> Self {
        let lookup_field = custom_field
            .clone()
            .unwrap_or_else(|| DEFAULT_LOOKUP_FIELD.to_string());

        Self {
            url_prefix: url_prefix.into(),
            custom_field,
            lookup_field,
            assignees,
            statuses,
        }
    }
}

/// Why a new work package was not created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Ticket ended before it was ever mirrored
    ClosedOrMerged(TicketState),

    /// Owner has no assignee mapping
    UnmappedOwner(OwnerId),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClosedOrMerged(state) => write!(f, "ticket is {}", state),
            Self::UnmappedOwner(owner) => write!(f, "owner {} is not mapped", owner),
        }
    }
}

/// Successful result of handling one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created { id: u64 },
    Updated { id: u64 },
    Skipped(SkipReason),
}

/// Failures that abort handling of one delivery.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Correlation custom field is not configured")]
    MissingCustomField,

    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Mirrors tickets into the tracker.
///
/// Safe to share across concurrent requests; deliveries for the same ticket
/// are serialized, all others run in parallel.
pub struct SyncHandler {
    tracker: Arc<dyn WorkItemTracker>,
    settings: Arc<SyncSettings>,
    locks: TicketLocks,
}

impl SyncHandler {
    pub fn new(tracker: Arc<dyn WorkItemTracker>, settings: SyncSettings) -> Self {
        Self {
            tracker,
            settings: Arc::new(settings),
            locks: TicketLocks::new(),
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Handle one ticket event.
    ///
    /// # Errors
    ///
    /// - [`SyncError::MissingCustomField`] when no correlation field is configured
    /// - [`SyncError::Tracker`] when the lookup or the mutation fails
    #[instrument(skip(self, event), fields(
        ticket_id = %event.ticket.id,
        ticket_number = %event.ticket.number,
        state = %event.ticket.state
    ))]
    pub async fn handle(&self, event: &TicketEvent) -> Result<SyncOutcome, SyncError> {
        let ticket = &event.ticket;
        let settings = &self.settings;

        info!(
            "Handling Ticket#{} (new state = {})",
            ticket.number, ticket.state
        );

        let key = CorrelationKey::for_ticket(&settings.url_prefix, ticket.id);

        let _guard = self.locks.acquire(ticket.id).await;

        let existing = self
            .tracker
            .find_by_correlation(&settings.lookup_field, &key)
            .await
            .inspect_err(|e| {
                error!(error = %e, transient = e.is_transient(), "Work package lookup failed")
            })?;

        let Some(custom_field) = settings.custom_field.as_deref() else {
            match &existing {
                Some(item) => error!(
                    work_package_id = item.id,
                    subject = %item.subject,
                    lock_version = item.lock_version,
                    "Correlation custom field is not configured; inspect this work package for the field name"
                ),
                None => error!(
                    lookup_field = %settings.lookup_field,
                    "Correlation custom field is not configured; create a test work package and re-run"
                ),
            }
            return Err(SyncError::MissingCustomField);
        };

        let draft = WorkItemDraft::from_ticket(
            ticket,
            custom_field,
            key,
            &settings.statuses,
            &settings.assignees,
        );

        if draft.status.is_none() {
            debug!(state = %ticket.state, "No status mapping for ticket state");
        }

        if let Some(item) = existing {
            let id = self
                .tracker
                .update_work_item(&item, &draft, false)
                .await
                .inspect_err(|e| {
                    error!(
                        error = %e,
                        work_package_id = item.id,
                        transient = e.is_transient(),
                        "Work package update failed"
                    )
                })?;

            info!(work_package_id = id, "Updated task successfully.");
            return Ok(SyncOutcome::Updated { id });
        }

        if ticket.state.blocks_creation() {
            debug!("Not creating a new work package due to state.");
            return Ok(SyncOutcome::Skipped(SkipReason::ClosedOrMerged(ticket.state)));
        }

        if draft.assignee.is_none() {
            debug!(
                owner_id = %ticket.owner_id,
                "Not creating a new work package as owner is not mapped."
            );
            return Ok(SyncOutcome::Skipped(SkipReason::UnmappedOwner(ticket.owner_id)));
        }

        let id = self
            .tracker
            .create_work_item(&draft, true)
            .await
            .inspect_err(|e| {
                error!(error = %e, transient = e.is_transient(), "Work package creation failed")
            })?;

        info!(work_package_id = id, "Created task successfully.");
        Ok(SyncOutcome::Created { id })
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
