//! VOD and live source create, read, update and delete
//!
//! Sources are addressed by (source location, name). One reconciler serves
//! both kinds; the kind travels in [`SourceDesiredState`].

use std::sync::Arc;

use tracing::{info, instrument};

use super::identity::source_identity_from_arn;
use super::tags;
use crate::crd::{SourceDesiredState, SourceKind, SourceObservedState};
use crate::error::{Error, Result};
use crate::mediatailor::{MediaTailorApi, SourceRequest, SourceVerb};

fn step(kind: SourceKind, verb: SourceVerb) -> &'static str {
    match (kind, verb) {
        (SourceKind::Vod, SourceVerb::Create) => "creating the VOD source",
        (SourceKind::Vod, SourceVerb::Update) => "updating the VOD source",
        (SourceKind::Vod, SourceVerb::Delete) => "deleting the VOD source",
        (SourceKind::Vod, _) => "describing the VOD source",
        (SourceKind::Live, SourceVerb::Create) => "creating the live source",
        (SourceKind::Live, SourceVerb::Update) => "updating the live source",
        (SourceKind::Live, SourceVerb::Delete) => "deleting the live source",
        (SourceKind::Live, _) => "describing the live source",
    }
}

pub struct SourceReconciler {
    api: Arc<dyn MediaTailorApi>,
}

impl SourceReconciler {
    pub fn new(api: Arc<dyn MediaTailorApi>) -> Self {
        Self { api }
    }

    #[instrument(skip(self, desired), fields(kind = %desired.kind, source = %desired.name))]
    pub async fn create(&self, desired: &SourceDesiredState) -> Result<SourceObservedState> {
        let created = self
            .api
            .create_source(&SourceRequest::for_create(desired))
            .await
            .map_err(Error::remote(step(desired.kind, SourceVerb::Create)))?;
        info!(
            "Created {} {}/{} ({})",
            desired.kind, created.source_location_name, created.name, created.arn
        );

        self.read(desired.kind, &created.source_location_name, &created.name)
            .await
    }

    pub async fn read(
        &self,
        kind: SourceKind,
        source_location_name: &str,
        name: &str,
    ) -> Result<SourceObservedState> {
        self.api
            .describe_source(kind, source_location_name, name)
            .await
            .map(SourceObservedState::from)
            .map_err(Error::remote(step(kind, SourceVerb::Describe)))
    }

    /// Read a source known only by its ARN
    pub async fn read_by_arn(&self, kind: SourceKind, arn: &str) -> Result<SourceObservedState> {
        let (location, name) = source_identity_from_arn(arn)?;
        self.read(kind, &location, &name).await
    }

    #[instrument(skip(self, previous, desired), fields(kind = %desired.kind, source = %desired.name))]
    pub async fn update(
        &self,
        previous: &SourceDesiredState,
        desired: &SourceDesiredState,
    ) -> Result<SourceObservedState> {
        let tag_diff = tags::diff(&previous.tags, &desired.tags);
        if !tag_diff.is_empty() {
            let current = self
                .api
                .describe_source(desired.kind, &desired.source_location_name, &desired.name)
                .await
                .map_err(Error::remote(step(desired.kind, SourceVerb::Describe)))?;
            tags::submit(self.api.as_ref(), &current.arn, &tag_diff).await?;
        }

        self.api
            .update_source(&SourceRequest::for_update(desired))
            .await
            .map_err(Error::remote(step(desired.kind, SourceVerb::Update)))?;

        self.read(desired.kind, &desired.source_location_name, &desired.name)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        kind: SourceKind,
        source_location_name: &str,
        name: &str,
    ) -> Result<()> {
        self.api
            .delete_source(kind, source_location_name, name)
            .await
            .map_err(Error::remote(step(kind, SourceVerb::Delete)))?;
        info!("Deleted {} {}/{}", kind, source_location_name, name);
        Ok(())
    }

    pub async fn exists(
        &self,
        kind: SourceKind,
        source_location_name: &str,
        name: &str,
    ) -> Result<bool> {
        match self
            .api
            .describe_source(kind, source_location_name, name)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(Error::remote(step(kind, SourceVerb::Describe))(e)),
        }
    }
}
