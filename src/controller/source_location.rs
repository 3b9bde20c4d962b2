//! Source location create, read, update and delete

use std::sync::Arc;

use tracing::{info, instrument};

use super::cascade;
use super::identity::ResourceRef;
use super::tags;
use crate::crd::{SourceLocationObservedState, SourceLocationSpec};
use crate::error::{Error, Result};
use crate::mediatailor::{MediaTailorApi, SourceLocationRequest};

pub struct SourceLocationReconciler {
    api: Arc<dyn MediaTailorApi>,
}

impl SourceLocationReconciler {
    pub fn new(api: Arc<dyn MediaTailorApi>) -> Self {
        Self { api }
    }

    #[instrument(skip(self, desired), fields(source_location = %desired.source_location_name))]
    pub async fn create(&self, desired: &SourceLocationSpec) -> Result<SourceLocationObservedState> {
        let created = self
            .api
            .create_source_location(&SourceLocationRequest::for_create(desired))
            .await
            .map_err(Error::remote("creating the source location"))?;
        info!("Created source location {} ({})", created.source_location_name, created.arn);

        self.read(&ResourceRef::by_name(created.source_location_name))
            .await
    }

    pub async fn read(&self, reference: &ResourceRef) -> Result<SourceLocationObservedState> {
        let name = reference.resolve()?;
        self.api
            .describe_source_location(&name)
            .await
            .map(SourceLocationObservedState::from)
            .map_err(Error::remote("describing the source location"))
    }

    /// Diff tags against `previous`, then update the location in place
    #[instrument(skip(self, previous, desired), fields(source_location = %desired.source_location_name))]
    pub async fn update(
        &self,
        previous: &SourceLocationSpec,
        desired: &SourceLocationSpec,
    ) -> Result<SourceLocationObservedState> {
        let name = desired.source_location_name.as_str();

        let tag_diff = tags::diff(&previous.tags, &desired.tags);
        if !tag_diff.is_empty() {
            let current = self
                .api
                .describe_source_location(name)
                .await
                .map_err(Error::remote("reading the source location before tagging"))?;
            tags::submit(self.api.as_ref(), &current.arn, &tag_diff).await?;
        }

        self.api
            .update_source_location(&SourceLocationRequest::for_update(desired))
            .await
            .map_err(Error::remote("updating the source location"))?;

        self.read(&ResourceRef::by_name(name)).await
    }

    /// Delete every source of the location, then the location itself
    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<()> {
        cascade::delete_source_location(self.api.as_ref(), name)
            .await
            .map(|_| ())
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        match self.api.describe_source_location(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(Error::remote("describing the source location")(e)),
        }
    }
}
