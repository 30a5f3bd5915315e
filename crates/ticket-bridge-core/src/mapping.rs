//! Static mapping tables from helpdesk values to OpenProject resources.
//!
//! Both tables are written as comma separated `key:reference` pairs, e.g.
//! `7:/api/v3/users/9,12:/api/v3/users/4`. Only the first `:` separates key
//! and reference, so references may themselves be absolute URLs.

use std::collections::HashMap;

use crate::ticket::{OwnerId, TicketState};

/// Errors parsing a mapping table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("Mapping entry '{entry}' is not of the form key:reference")]
    MissingSeparator { entry: String },

    #[error("Mapping key '{key}' is not a valid {expected}")]
    InvalidKey { key: String, expected: String },

    #[error("Mapping entry for '{key}' has an empty reference")]
    EmptyReference { key: String },
}

/// Owner id → assignee resource path.
///
/// Owners without an entry are expected; their tickets are never turned into
/// new work packages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssigneeMap(HashMap<OwnerId, String>);

impl AssigneeMap {
    pub fn new(entries: HashMap<OwnerId, String>) -> Self {
        Self(entries)
    }

    /// Parse `id:reference` pairs.
    pub fn parse(input: &str) -> Result<Self, MappingError> {
        let mut entries = HashMap::new();
        for (key, reference) in split_pairs(input)? {
            let owner = key.parse::<OwnerId>().map_err(|_| MappingError::InvalidKey {
                key: key.to_string(),
                expected: "owner id".to_string(),
            })?;
            entries.insert(owner, reference.to_string());
        }
        Ok(Self(entries))
    }

    pub fn get(&self, owner: OwnerId) -> Option<&str> {
        self.0.get(&owner).map(String::as_str)
    }

    pub fn contains(&self, owner: OwnerId) -> bool {
        self.0.contains_key(&owner)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Ticket state → status resource path.
///
/// A state missing here is a configuration defect; it is reported at startup
/// by [`StatusMap::missing_states`] but not rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusMap(HashMap<TicketState, String>);

impl StatusMap {
    pub fn new(entries: HashMap<TicketState, String>) -> Self {
        Self(entries)
    }

    /// Parse `state:reference` pairs.
    pub fn parse(input: &str) -> Result<Self, MappingError> {
        let mut entries = HashMap::new();
        for (key, reference) in split_pairs(input)? {
            let state = key.parse::<TicketState>().map_err(|_| MappingError::InvalidKey {
                key: key.to_string(),
                expected: "ticket state".to_string(),
            })?;
            entries.insert(state, reference.to_string());
        }
        Ok(Self(entries))
    }

    pub fn get(&self, state: TicketState) -> Option<&str> {
        self.0.get(&state).map(String::as_str)
    }

    /// States without a status reference, in wire order.
    pub fn missing_states(&self) -> Vec<TicketState> {
        TicketState::ALL
            .into_iter()
            .filter(|state| !self.0.contains_key(state))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn split_pairs(input: &str) -> Result<Vec<(&str, &str)>, MappingError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (key, reference) =
                entry
                    .split_once(':')
                    .ok_or_else(|| MappingError::MissingSeparator {
                        entry: entry.to_string(),
                    })?;
            let (key, reference) = (key.trim(), reference.trim());
            if reference.is_empty() {
                return Err(MappingError::EmptyReference {
                    key: key.to_string(),
                });
            }
            Ok((key, reference))
        })
        .collect()
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod tests;
