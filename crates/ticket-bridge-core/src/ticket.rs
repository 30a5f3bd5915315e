//! Ticket events delivered by the helpdesk webhook.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors parsing identifiers and enumerations from strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid format: expected {expected}, got '{actual}'")]
    InvalidFormat { expected: String, actual: String },
}

/// Helpdesk ticket identifier (numeric database id, not the display number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(u64);

impl TicketId {
    /// Create new ticket ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TicketId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.parse::<u64>().map_err(|_| ParseError::InvalidFormat {
            expected: "positive integer".to_string(),
            actual: s.to_string(),
        })?;
        Ok(Self::new(id))
    }
}

/// Helpdesk user identifier of a ticket owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Create new owner ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OwnerId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.parse::<u64>().map_err(|_| ParseError::InvalidFormat {
            expected: "positive integer".to_string(),
            actual: s.to_string(),
        })?;
        Ok(Self::new(id))
    }
}

/// Ticket lifecycle state as named by the helpdesk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TicketState {
    #[serde(rename = "new")]
    New,
    #[serde(rename = "open")]
    Open,
    #[serde(rename = "closed")]
    Closed,
    #[serde(rename = "merged")]
    Merged,
    #[serde(rename = "pending close")]
    PendingClose,
    #[serde(rename = "pending reminder")]
    PendingReminder,
}

impl TicketState {
    /// Every state, in wire order.
    pub const ALL: [TicketState; 6] = [
        Self::New,
        Self::Open,
        Self::Closed,
        Self::Merged,
        Self::PendingClose,
        Self::PendingReminder,
    ];

    /// Name used on the wire and in the status mapping.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Merged => "merged",
            Self::PendingClose => "pending close",
            Self::PendingReminder => "pending reminder",
        }
    }

    /// A ticket in this state never gets a new work package.
    pub fn blocks_creation(&self) -> bool {
        matches!(self, Self::Closed | Self::Merged)
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ParseError::InvalidFormat {
                expected: "ticket state (new, open, closed, merged, pending close, pending reminder)"
                    .to_string(),
                actual: s.to_string(),
            })
    }
}

/// Ticket priority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority {
    pub name: String,
}

/// Group the ticket is assigned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
}

/// Ticket as carried in the webhook payload.
///
/// Unknown fields are ignored; the helpdesk sends far more than is mirrored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Database id, the stable join key
    pub id: TicketId,

    /// Display number shown to agents
    pub number: String,

    pub owner_id: OwnerId,

    pub title: String,

    pub state: TicketState,

    pub priority: Priority,

    pub group: Group,
}

/// Webhook payload: `{ "ticket": { ... } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketEvent {
    pub ticket: Ticket,
}

impl TicketEvent {
    /// Decode a webhook body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

#[cfg(test)]
#[path = "ticket_tests.rs"]
mod tests;
