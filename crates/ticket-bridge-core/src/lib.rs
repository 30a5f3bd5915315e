//! # Ticket-Bridge Core
//!
//! Domain logic for mirroring helpdesk tickets into OpenProject work packages.
//!
//! Each webhook delivery carries one ticket. [`SyncHandler`] looks up the
//! work package whose correlation field holds the ticket's canonical URL and
//! either updates it or, when the ticket is eligible, creates it.
//!
//! ## Architecture
//!
//! - Business logic depends only on the [`WorkItemTracker`] trait
//! - [`tracker::OpenProjectTracker`] is the production implementation
//! - Mapping tables are parsed once and shared read-only through [`SyncSettings`]
//!
//! ## Usage
//!
//! ```rust
//! use ticket_bridge_core::{CorrelationKey, TicketId};
//!
//! let key = CorrelationKey::for_ticket("https://helpdesk.example.com/#ticket/zoom/", TicketId::new(42));
//! assert_eq!(key.as_str(), "https://helpdesk.example.com/#ticket/zoom/42");
//! ```

pub mod locks;
pub mod mapping;
pub mod sync;
pub mod ticket;
pub mod tracker;
pub mod work_item;

pub use locks::{TicketGuard, TicketLocks};
pub use mapping::{AssigneeMap, MappingError, StatusMap};
pub use sync::{SkipReason, SyncError, SyncHandler, SyncOutcome, SyncSettings};
pub use ticket::{Group, OwnerId, ParseError, Priority, Ticket, TicketEvent, TicketId, TicketState};
pub use tracker::{ExistingWorkItem, OpenProjectTracker, TrackerError, WorkItemTracker};
pub use work_item::{CorrelationKey, WorkItemDraft};
