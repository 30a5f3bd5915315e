//! Tests for correlation keys and work item drafts.

use super::*;
use crate::ticket::{Group, OwnerId, Priority, TicketState};

const PREFIX: &str = "https://helpdesk.example.com/#ticket/zoom/";

fn ticket(state: TicketState, owner: u64) -> Ticket {
    Ticket {
        id: TicketId::new(42),
        number: "42".to_string(),
        owner_id: OwnerId::new(owner),
        title: "Login broken".to_string(),
        state,
        priority: Priority {
            name: "High".to_string(),
        },
        group: Group {
            name: "Support".to_string(),
        },
    }
}

#[test]
fn test_correlation_key_appends_id_to_prefix() {
    let key = CorrelationKey::for_ticket(PREFIX, TicketId::new(42));
    assert_eq!(key.as_str(), "https://helpdesk.example.com/#ticket/zoom/42");
    assert_eq!(key.to_string(), key.as_str());
}

#[test]
fn test_draft_fields_from_mapped_ticket() {
    let statuses = StatusMap::parse("open:status/3").unwrap();
    let assignees = AssigneeMap::parse("7:user/9").unwrap();
    let key = CorrelationKey::for_ticket(PREFIX, TicketId::new(42));

    let draft = WorkItemDraft::from_ticket(
        &ticket(TicketState::Open, 7),
        "customField2",
        key.clone(),
        &statuses,
        &assignees,
    );

    assert_eq!(draft.subject, "Ticket#42: Login broken");
    assert_eq!(draft.description, "Ticket in Support with High priority");
    assert_eq!(draft.correlation_field, "customField2");
    assert_eq!(draft.correlation, key);
    assert_eq!(draft.status.as_deref(), Some("status/3"));
    assert_eq!(draft.assignee.as_deref(), Some("user/9"));
}

#[test]
fn test_draft_without_mappings_leaves_references_empty() {
    let draft = WorkItemDraft::from_ticket(
        &ticket(TicketState::PendingClose, 8),
        "customField2",
        CorrelationKey::for_ticket(PREFIX, TicketId::new(42)),
        &StatusMap::default(),
        &AssigneeMap::parse("7:user/9").unwrap(),
    );

    assert_eq!(draft.status, None);
    assert_eq!(draft.assignee, None);
}
