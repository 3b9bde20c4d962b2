//! Controller module for MediaTailor reconciliation
//! This module contains the controller loops, the per-resource reconcilers
//! and the helpers they share (tag diffing, policy and lifecycle handling).

pub mod cascade;
pub mod channel;
pub mod conditions;
mod finalizers;
pub mod identity;
pub mod lifecycle;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod playback_configuration;
pub mod policy;
mod reconciler;
pub mod source;
pub mod source_location;
pub mod tags;

pub use channel::ChannelReconciler;
pub use finalizers::{
    CHANNEL_FINALIZER, LIVE_SOURCE_FINALIZER, PLAYBACK_CONFIGURATION_FINALIZER,
    SOURCE_LOCATION_FINALIZER, VOD_SOURCE_FINALIZER,
};
pub use identity::ResourceRef;
pub use lifecycle::{target_state, LifecycleController, Transition};
pub use playback_configuration::PlaybackConfigurationReconciler;
pub use policy::{PolicyAction, PolicyManager};
pub use reconciler::{run_controller, ControllerState, SourceResource};
pub use source::SourceReconciler;
pub use source_location::SourceLocationReconciler;
pub use tags::TagDiff;
