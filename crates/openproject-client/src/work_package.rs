//! Work package resources and request bodies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HAL link. An absent `href` serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Target resource path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl Link {
    /// Link to the given resource path.
    pub fn to(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
        }
    }
}

/// Formattable text property (`{"raw": "..."}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formattable {
    /// Raw markdown text
    #[serde(default)]
    pub raw: Option<String>,
}

impl Formattable {
    /// Formattable holding the given raw text.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            raw: Some(text.into()),
        }
    }
}

/// Work package as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkPackage {
    /// Work package identifier
    pub id: u64,

    /// Optimistic locking token, echoed back on update
    #[serde(rename = "lockVersion")]
    pub lock_version: u64,

    /// Subject line
    #[serde(default)]
    pub subject: String,

    /// Description
    #[serde(default)]
    pub description: Option<Formattable>,

    /// Linked resources
    #[serde(rename = "_links", default)]
    pub links: WorkPackageLinks,

    /// Every other property, custom fields included
    #[serde(flatten)]
    pub properties: serde_json::Map<String, Value>,
}

impl WorkPackage {
    /// String value of a custom field such as `customField2`.
    pub fn custom_field(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Value::as_str)
    }

    /// Status resource path.
    pub fn status_href(&self) -> Option<&str> {
        self.links.status.as_ref().and_then(|l| l.href.as_deref())
    }

    /// Assignee resource path, `None` when unassigned.
    pub fn assignee_href(&self) -> Option<&str> {
        self.links.assignee.as_ref().and_then(|l| l.href.as_deref())
    }
}

/// Links of a work package that Ticket-Bridge reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkPackageLinks {
    #[serde(default)]
    pub status: Option<Link>,

    #[serde(default)]
    pub assignee: Option<Link>,
}

/// Paged work package collection.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkPackageCollection {
    /// Total matches across all pages
    #[serde(default)]
    pub total: u64,

    /// Elements on this page
    #[serde(default)]
    pub count: u64,

    #[serde(rename = "_embedded")]
    pub embedded: EmbeddedWorkPackages,
}

/// `_embedded` section of a collection.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedWorkPackages {
    #[serde(default)]
    pub elements: Vec<WorkPackage>,
}

/// Body for creating or updating a work package.
///
/// Custom fields are flattened into the top level object because their
/// keys (`customFieldN`) are instance specific.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkPackageWrite {
    pub subject: String,

    pub description: Formattable,

    #[serde(flatten)]
    pub custom_fields: BTreeMap<String, String>,

    #[serde(rename = "_links")]
    pub links: WriteLinks,

    /// Required on update, omitted on create
    #[serde(rename = "lockVersion", skip_serializing_if = "Option::is_none")]
    pub lock_version: Option<u64>,
}

/// Links sent with a work package write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteLinks {
    pub status: Link,

    /// Omitted entirely when `None`, which leaves the assignee untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Link>,
}

/// Custom field equality lookup against a project's work packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkPackageQuery {
    /// Filter key, e.g. `customField2`
    pub field: String,

    /// Exact value to match
    pub value: String,

    /// 1-based page number
    pub offset: u32,

    pub page_size: u32,
}

impl WorkPackageQuery {
    /// First page of ten, sorted by ascending id.
    pub fn custom_field_equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            offset: 1,
            page_size: 10,
        }
    }

    /// `filters` query parameter.
    pub fn filters_param(&self) -> String {
        let mut condition = serde_json::Map::new();
        condition.insert(
            self.field.clone(),
            serde_json::json!({ "operator": "=", "values": [self.value] }),
        );
        Value::Array(vec![Value::Object(condition)]).to_string()
    }

    /// `sortBy` query parameter.
    pub fn sort_param(&self) -> String {
        serde_json::json!([["id", "asc"]]).to_string()
    }
}

#[cfg(test)]
#[path = "work_package_tests.rs"]
mod tests;
