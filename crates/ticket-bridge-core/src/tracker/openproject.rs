//! [`WorkItemTracker`] backed by OpenProject work packages.

use std::collections::BTreeMap;

use async_trait::async_trait;
use openproject_client::{
    Formattable, Link, OpenProjectClient, WorkPackage, WorkPackageQuery, WorkPackageWrite,
    WriteLinks,
};
use tracing::instrument;

use super::{ExistingWorkItem, TrackerError, WorkItemTracker};
use crate::work_item::{CorrelationKey, WorkItemDraft};

/// Work packages of a single OpenProject project.
#[derive(Debug, Clone)]
pub struct OpenProjectTracker {
    client: OpenProjectClient,
    project: String,
}

impl OpenProjectTracker {
    /// `project` is the project identifier or numeric id used in API paths.
    pub fn new(client: OpenProjectClient, project: impl Into<String>) -> Self {
        Self {
            client,
            project: project.into(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }
}

#[async_trait]
impl WorkItemTracker for OpenProjectTracker {
    #[instrument(skip(self), fields(project = %self.project))]
    async fn find_by_correlation(
        &self,
        field: &str,
        key: &CorrelationKey,
    ) -> Result<Option<ExistingWorkItem>, TrackerError> {
        let query = WorkPackageQuery::custom_field_equals(field, key.as_str());
        let found = self.client.find_work_packages(&self.project, &query).await?;

        Ok(found
            .into_iter()
            .next()
            .map(|wp| existing_from_work_package(wp, field)))
    }

    #[instrument(skip(self, draft), fields(project = %self.project, correlation = %draft.correlation))]
    async fn create_work_item(
        &self,
        draft: &WorkItemDraft,
        notify: bool,
    ) -> Result<u64, TrackerError> {
        let body = write_from_draft(draft, None);
        let created = self
            .client
            .create_work_package(&self.project, &body, notify)
            .await?;
        Ok(created.id)
    }

    #[instrument(skip(self, existing, draft), fields(id = existing.id, lock_version = existing.lock_version))]
    async fn update_work_item(
        &self,
        existing: &ExistingWorkItem,
        draft: &WorkItemDraft,
        notify: bool,
    ) -> Result<u64, TrackerError> {
        let body = write_from_draft(draft, Some(existing.lock_version));
        let updated = self
            .client
            .update_work_package(existing.id, &body, notify)
            .await?;
        Ok(updated.id)
    }
}

fn write_from_draft(draft: &WorkItemDraft, lock_version: Option<u64>) -> WorkPackageWrite {
    let mut custom_fields = BTreeMap::new();
    custom_fields.insert(
        draft.correlation_field.clone(),
        draft.correlation.as_str().to_string(),
    );

    WorkPackageWrite {
        subject: draft.subject.clone(),
        description: Formattable::raw(draft.description.clone()),
        custom_fields,
        links: WriteLinks {
            status: Link {
                href: draft.status.clone(),
            },
            assignee: draft.assignee.clone().map(Link::to),
        },
        lock_version,
    }
}

fn existing_from_work_package(wp: WorkPackage, correlation_field: &str) -> ExistingWorkItem {
    ExistingWorkItem {
        id: wp.id,
        lock_version: wp.lock_version,
        correlation: wp.custom_field(correlation_field).map(str::to_string),
        status: wp.status_href().map(str::to_string),
        assignee: wp.assignee_href().map(str::to_string),
        description: wp.description.and_then(|d| d.raw),
        subject: wp.subject,
    }
}

#[cfg(test)]
#[path = "openproject_tests.rs"]
mod tests;
