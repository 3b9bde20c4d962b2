//! Channel policy sub-resource
//!
//! The policy has no identity of its own. It exists while the channel spec
//! declares a document and is removed when the document goes away.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::mediatailor::MediaTailorApi;

/// What [`PolicyManager::ensure`] did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyAction {
    Put,
    Delete,
    Unchanged,
}

/// Strip every whitespace character so formatting changes compare equal
pub fn normalize(document: &str) -> String {
    document.chars().filter(|c| !c.is_whitespace()).collect()
}

pub struct PolicyManager<'a> {
    api: &'a dyn MediaTailorApi,
}

impl<'a> PolicyManager<'a> {
    pub fn new(api: &'a dyn MediaTailorApi) -> Self {
        Self { api }
    }

    /// Create or replace the channel's policy
    pub async fn upsert(&self, channel: &str, document: &str) -> Result<()> {
        self.api
            .put_channel_policy(channel, document)
            .await
            .map_err(Error::remote("putting the channel policy"))
    }

    /// Delete the channel's policy; an absent policy counts as removed
    pub async fn remove(&self, channel: &str) -> Result<()> {
        match self.api.delete_channel_policy(channel).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!("Policy for channel {} already absent", channel);
                Ok(())
            }
            Err(e) => Err(Error::remote("deleting the channel policy")(e)),
        }
    }

    /// Current policy document, or `None` when the channel has none
    pub async fn fetch(&self, channel: &str) -> Result<Option<String>> {
        match self.api.get_channel_policy(channel).await {
            Ok(policy) => Ok(Some(policy)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(Error::remote("reading the channel policy")(e)),
        }
    }

    /// Bring the remote policy in line with `desired`
    pub async fn ensure(&self, channel: &str, desired: Option<&str>) -> Result<PolicyAction> {
        let current = self.fetch(channel).await?;

        let action = match (desired, current.as_deref()) {
            (Some(want), Some(have)) if normalize(want) == normalize(have) => {
                PolicyAction::Unchanged
            }
            (Some(want), _) => {
                self.upsert(channel, want).await?;
                PolicyAction::Put
            }
            (None, Some(_)) => {
                self.remove(channel).await?;
                PolicyAction::Delete
            }
            (None, None) => PolicyAction::Unchanged,
        };

        if action != PolicyAction::Unchanged {
            info!("Channel {} policy: {:?}", channel, action);
        }
        Ok(action)
    }
}
