//! Target work item representation computed from a ticket.

use std::fmt;

use crate::mapping::{AssigneeMap, StatusMap};
use crate::ticket::{Ticket, TicketId};

/// Canonical ticket URL stored in the work package's correlation field.
///
/// This is the only link between a ticket and its work package.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationKey(String);

impl CorrelationKey {
    /// `prefix` followed by the ticket id, with no separator added.
    pub fn for_ticket(prefix: &str, id: TicketId) -> Self {
        Self(format!("{}{}", prefix, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Desired state of the work package for one ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItemDraft {
    pub subject: String,

    pub description: String,

    /// Custom field holding the correlation key, e.g. `customField2`
    pub correlation_field: String,

    pub correlation: CorrelationKey,

    /// `None` when the state is not mapped; sent as an empty link
    pub status: Option<String>,

    /// `None` when the owner is not mapped; left out of the request
    pub assignee: Option<String>,
}

impl WorkItemDraft {
    pub fn from_ticket(
        ticket: &Ticket,
        correlation_field: &str,
        correlation: CorrelationKey,
        statuses: &StatusMap,
        assignees: &AssigneeMap,
    ) -> Self {
        Self {
            subject: format!("Ticket#{}: {}", ticket.number, ticket.title),
            description: format!(
                "Ticket in {} with {} priority",
                ticket.group.name, ticket.priority.name
            ),
            correlation_field: correlation_field.to_string(),
            correlation,
            status: statuses.get(ticket.state).map(str::to_string),
            assignee: assignees.get(ticket.owner_id).map(str::to_string),
        }
    }
}

#[cfg(test)]
#[path = "work_item_tests.rs"]
mod tests;
