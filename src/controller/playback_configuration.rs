//! Playback configuration create, read, update and delete

use std::sync::Arc;

use tracing::{info, instrument};

use super::identity::ResourceRef;
use super::tags;
use crate::crd::{PlaybackConfigurationObservedState, PlaybackConfigurationSpec};
use crate::error::{Error, Result};
use crate::mediatailor::{MediaTailorApi, PlaybackConfigurationRequest};

pub struct PlaybackConfigurationReconciler {
    api: Arc<dyn MediaTailorApi>,
}

impl PlaybackConfigurationReconciler {
    pub fn new(api: Arc<dyn MediaTailorApi>) -> Self {
        Self { api }
    }

    #[instrument(skip(self, desired), fields(configuration = %desired.configuration_name))]
    pub async fn create(
        &self,
        desired: &PlaybackConfigurationSpec,
    ) -> Result<PlaybackConfigurationObservedState> {
        let created = self
            .api
            .put_playback_configuration(&PlaybackConfigurationRequest::for_create(desired))
            .await
            .map_err(Error::remote("putting the playback configuration"))?;
        info!(
            "Created playback configuration {} ({})",
            created.name, created.playback_configuration_arn
        );

        self.read(&ResourceRef::by_name(created.name)).await
    }

    pub async fn read(&self, reference: &ResourceRef) -> Result<PlaybackConfigurationObservedState> {
        let name = reference.resolve()?;
        self.api
            .get_playback_configuration(&name)
            .await
            .map(PlaybackConfigurationObservedState::from)
            .map_err(Error::remote("reading the playback configuration"))
    }

    /// Diff tags against `previous`, then put the full configuration again
    #[instrument(skip(self, previous, desired), fields(configuration = %desired.configuration_name))]
    pub async fn update(
        &self,
        previous: &PlaybackConfigurationSpec,
        desired: &PlaybackConfigurationSpec,
    ) -> Result<PlaybackConfigurationObservedState> {
        let name = desired.configuration_name.as_str();

        let tag_diff = tags::diff(&previous.tags, &desired.tags);
        if !tag_diff.is_empty() {
            let current = self
                .api
                .get_playback_configuration(name)
                .await
                .map_err(Error::remote("reading the playback configuration before tagging"))?;
            tags::submit(
                self.api.as_ref(),
                &current.playback_configuration_arn,
                &tag_diff,
            )
            .await?;
        }

        self.api
            .put_playback_configuration(&PlaybackConfigurationRequest::for_update(desired))
            .await
            .map_err(Error::remote("putting the playback configuration"))?;

        self.read(&ResourceRef::by_name(name)).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<()> {
        self.api
            .delete_playback_configuration(name)
            .await
            .map_err(Error::remote("deleting the playback configuration"))?;
        info!("Deleted playback configuration {}", name);
        Ok(())
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        match self.api.get_playback_configuration(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(Error::remote("reading the playback configuration")(e)),
        }
    }
}
