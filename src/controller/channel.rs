//! Create, read, update and delete of a single MediaTailor channel
//!
//! Every operation is a strictly sequential series of control plane calls and
//! ends with a fresh read-back. Nothing is cached between calls.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::identity::ResourceRef;
use super::lifecycle::{target_state, LifecycleController, Transition};
use super::policy::PolicyManager;
use super::tags;
use crate::crd::{ChannelObservedState, ChannelSpec, ChannelState};
use crate::error::{Error, Result};
use crate::mediatailor::{CreateChannelRequest, MediaTailorApi, UpdateChannelRequest};

pub struct ChannelReconciler {
    api: Arc<dyn MediaTailorApi>,
}

impl ChannelReconciler {
    pub fn new(api: Arc<dyn MediaTailorApi>) -> Self {
        Self { api }
    }

    fn lifecycle(&self) -> LifecycleController<'_> {
        LifecycleController::new(self.api.as_ref())
    }

    fn policies(&self) -> PolicyManager<'_> {
        PolicyManager::new(self.api.as_ref())
    }

    /// Create the channel, start it if requested, attach the policy and read it back
    #[instrument(skip(self, desired), fields(channel = %desired.channel_name))]
    pub async fn create(&self, desired: &ChannelSpec) -> Result<ChannelObservedState> {
        let created = self
            .api
            .create_channel(&CreateChannelRequest::from(desired))
            .await
            .map_err(Error::remote("creating the channel"))?;
        info!("Created channel {} ({})", created.channel_name, created.arn);

        if desired.channel_state == Some(ChannelState::Running) {
            self.lifecycle().start(&created.channel_name).await?;
        }

        if let Some(policy) = desired.desired_policy() {
            self.policies().upsert(&created.channel_name, policy).await?;
        }

        self.read(&ResourceRef {
            name: Some(created.channel_name),
            arn: Some(created.arn),
        })
        .await
    }

    /// Describe the channel and fetch its policy
    pub async fn read(&self, reference: &ResourceRef) -> Result<ChannelObservedState> {
        let name = reference.resolve()?;
        let description = self
            .api
            .describe_channel(&name)
            .await
            .map_err(Error::remote("describing the channel"))?;
        let policy = self.policies().fetch(&name).await?;

        Ok(description.into_observed(policy))
    }

    /// Converge an existing channel from `previous` to `desired`
    ///
    /// `previous` is only used to diff tags. The running state is always taken
    /// from the control plane.
    #[instrument(skip(self, previous, desired), fields(channel = %desired.channel_name))]
    pub async fn update(
        &self,
        previous: &ChannelSpec,
        desired: &ChannelSpec,
    ) -> Result<ChannelObservedState> {
        let name = desired.channel_name.as_str();

        let tag_diff = tags::diff(&previous.tags, &desired.tags);
        if !tag_diff.is_empty() {
            let current = self
                .api
                .describe_channel(name)
                .await
                .map_err(Error::remote("reading the channel before tagging"))?;
            tags::submit(self.api.as_ref(), &current.arn, &tag_diff).await?;
        }

        let observed = self
            .api
            .describe_channel(name)
            .await
            .map_err(Error::remote("reading the channel state"))?
            .into_observed(None);
        let was = observed.channel_state;
        let drifted = desired.core_drifted_from(previous, &observed);
        debug!("Channel {} is {:?}, core drift: {}", name, was, drifted);

        if drifted && was == ChannelState::Running {
            self.lifecycle().stop(name).await?;
        }

        self.policies()
            .ensure(name, desired.desired_policy())
            .await?;

        if drifted {
            self.api
                .update_channel(&UpdateChannelRequest::from(desired))
                .await
                .map_err(Error::remote("updating the channel"))?;
            info!("Updated channel {}", name);
        }

        let current = if drifted { ChannelState::Stopped } else { was };
        let transition = Transition::decide(current, target_state(was, desired.channel_state));
        self.lifecycle().apply(name, transition).await?;

        self.read(&ResourceRef::by_name(name)).await
    }

    /// Stop the channel, drop its policy and delete it
    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<()> {
        self.lifecycle().stop(name).await?;
        self.policies().remove(name).await?;
        self.api
            .delete_channel(name)
            .await
            .map_err(Error::remote("deleting the channel"))?;
        info!("Deleted channel {}", name);
        Ok(())
    }

    /// Whether the channel exists on the control plane
    pub async fn exists(&self, name: &str) -> Result<bool> {
        match self.api.describe_channel(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(Error::remote("describing the channel")(e)),
        }
    }
}
