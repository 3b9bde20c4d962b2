//! Running/stopped state of a channel
//!
//! Core-field updates are only legal while a channel is stopped, so the
//! reconciler stops it around them and then drives it to the state decided
//! by [`target_state`].

use tracing::{debug, info};

use crate::crd::ChannelState;
use crate::error::{Error, Result};
use crate::mediatailor::MediaTailorApi;

/// State the channel must end in
///
/// Running iff it was running or running is requested, and stopped is not
/// explicitly requested.
pub fn target_state(previous: ChannelState, desired: Option<ChannelState>) -> ChannelState {
    let wants_running =
        previous == ChannelState::Running || desired == Some(ChannelState::Running);
    if wants_running && desired != Some(ChannelState::Stopped) {
        ChannelState::Running
    } else {
        ChannelState::Stopped
    }
}

/// Call needed to move a channel from its current state to the target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Start,
    Stop,
    None,
}

impl Transition {
    pub fn decide(current: ChannelState, target: ChannelState) -> Self {
        match (current, target) {
            (ChannelState::Stopped, ChannelState::Running) => Transition::Start,
            (ChannelState::Running, ChannelState::Stopped) => Transition::Stop,
            _ => Transition::None,
        }
    }
}

pub struct LifecycleController<'a> {
    api: &'a dyn MediaTailorApi,
}

impl<'a> LifecycleController<'a> {
    pub fn new(api: &'a dyn MediaTailorApi) -> Self {
        Self { api }
    }

    pub async fn start(&self, channel: &str) -> Result<()> {
        info!("Starting channel {}", channel);
        self.api
            .start_channel(channel)
            .await
            .map_err(Error::remote("starting the channel"))
    }

    /// Stop the channel; a conflict from an already stopped channel is success
    pub async fn stop(&self, channel: &str) -> Result<()> {
        info!("Stopping channel {}", channel);
        match self.api.stop_channel(channel).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_conflict() => {
                debug!("Channel {} already stopped: {}", channel, e.message);
                Ok(())
            }
            Err(e) => Err(Error::remote("stopping the channel")(e)),
        }
    }

    pub async fn apply(&self, channel: &str, transition: Transition) -> Result<()> {
        match transition {
            Transition::Start => self.start(channel).await,
            Transition::Stop => self.stop(channel).await,
            Transition::None => Ok(()),
        }
    }
}
