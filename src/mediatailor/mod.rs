//! Client layer for the AWS Elemental MediaTailor control plane
//!
//! The reconcilers only depend on the [`MediaTailorApi`] trait. The operator
//! binary wires in [`HttpMediaTailorClient`]; tests wire in an in-memory fake.

pub mod error;
#[cfg(test)]
pub(crate) mod fake;
mod http;
pub mod models;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::crd::SourceKind;

pub use error::{ApiError, ApiErrorKind, ApiResult, Operation};
pub use http::{HttpClientConfig, HttpMediaTailorClient};
pub use models::{
    ChannelDescription, ChildReference, CreateChannelRequest, PlaybackConfigurationDescription,
    PlaybackConfigurationRequest, SourceDescription, SourceLocationDescription,
    SourceLocationRequest, SourceRequest, UpdateChannelRequest,
};

/// Operations consumed from the MediaTailor control plane
///
/// Every call is a single request/response. Implementations must not retry
/// internally and must report a missing resource as [`ApiErrorKind::NotFound`].
#[async_trait]
pub trait MediaTailorApi: Send + Sync {
    async fn create_channel(&self, request: &CreateChannelRequest)
        -> ApiResult<ChannelDescription>;

    async fn describe_channel(&self, name: &str) -> ApiResult<ChannelDescription>;

    async fn update_channel(&self, request: &UpdateChannelRequest)
        -> ApiResult<ChannelDescription>;

    async fn delete_channel(&self, name: &str) -> ApiResult<()>;

    async fn start_channel(&self, name: &str) -> ApiResult<()>;

    async fn stop_channel(&self, name: &str) -> ApiResult<()>;

    async fn put_channel_policy(&self, name: &str, policy: &str) -> ApiResult<()>;

    async fn get_channel_policy(&self, name: &str) -> ApiResult<String>;

    async fn delete_channel_policy(&self, name: &str) -> ApiResult<()>;

    async fn tag_resource(&self, arn: &str, tags: &BTreeMap<String, String>) -> ApiResult<()>;

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> ApiResult<()>;

    async fn create_source_location(
        &self,
        request: &SourceLocationRequest,
    ) -> ApiResult<SourceLocationDescription>;

    async fn describe_source_location(&self, name: &str) -> ApiResult<SourceLocationDescription>;

    async fn update_source_location(
        &self,
        request: &SourceLocationRequest,
    ) -> ApiResult<SourceLocationDescription>;

    async fn delete_source_location(&self, name: &str) -> ApiResult<()>;

    async fn create_source(&self, request: &SourceRequest) -> ApiResult<SourceDescription>;

    async fn describe_source(
        &self,
        kind: SourceKind,
        source_location_name: &str,
        name: &str,
    ) -> ApiResult<SourceDescription>;

    async fn update_source(&self, request: &SourceRequest) -> ApiResult<SourceDescription>;

    async fn delete_source(
        &self,
        kind: SourceKind,
        source_location_name: &str,
        name: &str,
    ) -> ApiResult<()>;

    /// Every source of `kind` under the location, across all pages
    async fn list_sources(
        &self,
        kind: SourceKind,
        source_location_name: &str,
    ) -> ApiResult<Vec<ChildReference>>;

    /// Create or replace a playback configuration
    async fn put_playback_configuration(
        &self,
        request: &PlaybackConfigurationRequest,
    ) -> ApiResult<PlaybackConfigurationDescription>;

    async fn get_playback_configuration(
        &self,
        name: &str,
    ) -> ApiResult<PlaybackConfigurationDescription>;

    async fn delete_playback_configuration(&self, name: &str) -> ApiResult<()>;
}

/// Per-kind operation names for source calls
pub(crate) fn source_operation(kind: SourceKind, verb: SourceVerb) -> Operation {
    match (kind, verb) {
        (SourceKind::Vod, SourceVerb::Create) => Operation::CreateVodSource,
        (SourceKind::Vod, SourceVerb::Describe) => Operation::DescribeVodSource,
        (SourceKind::Vod, SourceVerb::Update) => Operation::UpdateVodSource,
        (SourceKind::Vod, SourceVerb::Delete) => Operation::DeleteVodSource,
        (SourceKind::Vod, SourceVerb::List) => Operation::ListVodSources,
        (SourceKind::Live, SourceVerb::Create) => Operation::CreateLiveSource,
        (SourceKind::Live, SourceVerb::Describe) => Operation::DescribeLiveSource,
        (SourceKind::Live, SourceVerb::Update) => Operation::UpdateLiveSource,
        (SourceKind::Live, SourceVerb::Delete) => Operation::DeleteLiveSource,
        (SourceKind::Live, SourceVerb::List) => Operation::ListLiveSources,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SourceVerb {
    Create,
    Describe,
    Update,
    Delete,
    List,
}
