//! Custom Resource Definitions for the MediaTailor operator
//!
//! This module defines the Kubernetes CRDs that declare MediaTailor channels,
//! source locations, their VOD/live sources and ad insertion playback
//! configurations.

mod channel;
mod playback_configuration;
mod source;
mod source_location;
pub mod types;


pub use channel::{Channel, ChannelObservedState, ChannelSpec, ChannelStatus, ObservedOutput};
pub use playback_configuration::{
    CdnConfiguration, DashConfiguration, OriginManifestType, PlaybackConfiguration,
    PlaybackConfigurationObservedState, PlaybackConfigurationSpec, PlaybackConfigurationStatus,
};
pub use source::{
    LiveSource, LiveSourceSpec, SourceDesiredState, SourceKind, SourceObservedState, SourceStatus,
    VodSource, VodSourceSpec,
};
pub use source_location::{
    SourceLocation, SourceLocationObservedState, SourceLocationSpec, SourceLocationStatus,
};
pub use types::*;
