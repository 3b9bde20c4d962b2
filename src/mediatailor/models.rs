//! Request and response bodies of the MediaTailor control plane
//!
//! Field names follow the control plane's PascalCase JSON. Conversions from
//! the custom resource specs and into the observed-state types live here so the
//! reconcilers never handle wire shapes directly.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crd::{
    AccessConfiguration, AccessType, CdnConfiguration, ChannelObservedState, ChannelSpec,
    ChannelState, DashConfiguration, FillerSlate, HttpPackageConfiguration, ObservedOutput,
    OriginManifestType, OutputSpec, PlaybackConfigurationObservedState, PlaybackConfigurationSpec,
    PlaybackMode, SegmentDeliveryConfiguration, SourceDesiredState, SourceKind,
    SourceLocationObservedState, SourceLocationSpec, SourceObservedState, Tier,
};

/// Render an epoch-seconds timestamp as RFC 3339
fn epoch_to_rfc3339(seconds: Option<f64>) -> Option<String> {
    let seconds = seconds?;
    let whole = seconds.trunc() as i64;
    let nanos = ((seconds - seconds.trunc()) * 1e9) as u32;
    DateTime::<Utc>::from_timestamp(whole, nanos).map(|t| t.to_rfc3339())
}

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SlateSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vod_source_name: Option<String>,
}

impl From<&FillerSlate> for SlateSource {
    fn from(slate: &FillerSlate) -> Self {
        Self {
            source_location_name: slate.source_location_name.clone(),
            vod_source_name: slate.vod_source_name.clone(),
        }
    }
}

impl From<SlateSource> for FillerSlate {
    fn from(slate: SlateSource) -> Self {
        Self {
            source_location_name: slate.source_location_name,
            vod_source_name: slate.vod_source_name,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DashPlaylistSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_window_seconds: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_buffer_time_seconds: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_update_period_seconds: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_presentation_delay_seconds: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HlsPlaylistSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_window_seconds: Option<i32>,
}

/// Output item sent with create and update requests
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestOutputItem {
    pub manifest_name: String,
    pub source_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_playlist_settings: Option<DashPlaylistSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls_playlist_settings: Option<HlsPlaylistSettings>,
}

impl From<&OutputSpec> for RequestOutputItem {
    fn from(output: &OutputSpec) -> Self {
        let dash_playlist_settings = output.has_dash_settings().then(|| DashPlaylistSettings {
            manifest_window_seconds: output.dash_manifest_window_seconds,
            min_buffer_time_seconds: output.dash_min_buffer_time_seconds,
            min_update_period_seconds: output.dash_min_update_period_seconds,
            suggested_presentation_delay_seconds: output.dash_suggested_presentation_delay_seconds,
        });
        let hls_playlist_settings = output
            .hls_manifest_window_seconds
            .map(|seconds| HlsPlaylistSettings {
                manifest_window_seconds: Some(seconds),
            });

        Self {
            manifest_name: output.manifest_name.clone(),
            source_group: output.source_group.clone(),
            dash_playlist_settings,
            hls_playlist_settings,
        }
    }
}

/// Output item as returned by `DescribeChannel`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseOutputItem {
    pub manifest_name: String,
    pub source_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_playlist_settings: Option<DashPlaylistSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls_playlist_settings: Option<HlsPlaylistSettings>,
}

impl From<ResponseOutputItem> for ObservedOutput {
    fn from(item: ResponseOutputItem) -> Self {
        let dash = item.dash_playlist_settings.unwrap_or_default();
        let hls = item.hls_playlist_settings.unwrap_or_default();
        Self {
            output: OutputSpec {
                manifest_name: item.manifest_name,
                source_group: item.source_group,
                dash_manifest_window_seconds: dash.manifest_window_seconds,
                dash_min_buffer_time_seconds: dash.min_buffer_time_seconds,
                dash_min_update_period_seconds: dash.min_update_period_seconds,
                dash_suggested_presentation_delay_seconds: dash
                    .suggested_presentation_delay_seconds,
                hls_manifest_window_seconds: hls.manifest_window_seconds,
            },
            playback_url: item.playback_url,
        }
    }
}

/// Body of `CreateChannel`; the channel name travels in the path
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateChannelRequest {
    #[serde(skip)]
    pub channel_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filler_slate: Option<SlateSource>,
    pub outputs: Vec<RequestOutputItem>,
    pub playback_mode: PlaybackMode,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
}

impl From<&ChannelSpec> for CreateChannelRequest {
    fn from(spec: &ChannelSpec) -> Self {
        Self {
            channel_name: spec.channel_name.clone(),
            filler_slate: spec.filler_slate.as_ref().map(SlateSource::from),
            outputs: spec.outputs.iter().map(RequestOutputItem::from).collect(),
            playback_mode: spec.playback_mode,
            tags: spec.tags.clone(),
            tier: spec.tier,
        }
    }
}

/// Body of `UpdateChannel`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateChannelRequest {
    #[serde(skip)]
    pub channel_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filler_slate: Option<SlateSource>,
    pub outputs: Vec<RequestOutputItem>,
    pub playback_mode: PlaybackMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
}

impl From<&ChannelSpec> for UpdateChannelRequest {
    fn from(spec: &ChannelSpec) -> Self {
        Self {
            channel_name: spec.channel_name.clone(),
            filler_slate: spec.filler_slate.as_ref().map(SlateSource::from),
            outputs: spec.outputs.iter().map(RequestOutputItem::from).collect(),
            playback_mode: spec.playback_mode,
            tier: spec.tier,
        }
    }
}

/// Response of `CreateChannel`, `DescribeChannel` and `UpdateChannel`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChannelDescription {
    pub arn: String,
    pub channel_name: String,
    #[serde(default)]
    pub channel_state: ChannelState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filler_slate: Option<SlateSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<f64>,
    #[serde(default)]
    pub outputs: Vec<ResponseOutputItem>,
    #[serde(default)]
    pub playback_mode: PlaybackMode,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
}

impl ChannelDescription {
    /// Combine the description with the separately fetched policy
    pub fn into_observed(self, policy: Option<String>) -> ChannelObservedState {
        ChannelObservedState {
            name: self.channel_name,
            arn: self.arn,
            playback_mode: self.playback_mode,
            tier: self.tier,
            outputs: self.outputs.into_iter().map(ObservedOutput::from).collect(),
            filler_slate: self.filler_slate.map(FillerSlate::from),
            channel_state: self.channel_state,
            policy,
            tags: self.tags,
            creation_time: epoch_to_rfc3339(self.creation_time),
            last_modified_time: epoch_to_rfc3339(self.last_modified_time),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChannelPolicy {
    pub policy: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TagResourceRequest {
    pub tags: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Source locations
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecretsManagerAccessTokenConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_string_key: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireAccessConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_type: Option<AccessType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets_manager_access_token_configuration: Option<SecretsManagerAccessTokenConfiguration>,
}

impl From<&AccessConfiguration> for WireAccessConfiguration {
    fn from(access: &AccessConfiguration) -> Self {
        let has_token = access.header_name.is_some()
            || access.secret_arn.is_some()
            || access.secret_string_key.is_some();
        Self {
            access_type: access.access_type,
            secrets_manager_access_token_configuration: has_token.then(|| {
                SecretsManagerAccessTokenConfiguration {
                    header_name: access.header_name.clone(),
                    secret_arn: access.secret_arn.clone(),
                    secret_string_key: access.secret_string_key.clone(),
                }
            }),
        }
    }
}

impl From<WireAccessConfiguration> for AccessConfiguration {
    fn from(access: WireAccessConfiguration) -> Self {
        let token = access
            .secrets_manager_access_token_configuration
            .unwrap_or_default();
        Self {
            access_type: access.access_type,
            header_name: token.header_name,
            secret_arn: token.secret_arn,
            secret_string_key: token.secret_string_key,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BaseUrl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireSegmentDeliveryConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Body of `CreateSourceLocation` and `UpdateSourceLocation`
///
/// Tags are only accepted on create; `UpdateSourceLocation` requests leave
/// them empty so they are not serialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceLocationRequest {
    #[serde(skip)]
    pub source_location_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_configuration: Option<WireAccessConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_segment_delivery_configuration: Option<BaseUrl>,
    pub http_configuration: BaseUrl,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub segment_delivery_configurations: Vec<WireSegmentDeliveryConfiguration>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl SourceLocationRequest {
    pub fn for_create(spec: &SourceLocationSpec) -> Self {
        Self {
            tags: spec.tags.clone(),
            ..Self::for_update(spec)
        }
    }

    pub fn for_update(spec: &SourceLocationSpec) -> Self {
        Self {
            source_location_name: spec.source_location_name.clone(),
            access_configuration: spec
                .access_configuration
                .as_ref()
                .map(WireAccessConfiguration::from),
            default_segment_delivery_configuration: spec
                .default_segment_delivery_configuration_url
                .as_ref()
                .map(|url| BaseUrl {
                    base_url: Some(url.clone()),
                }),
            http_configuration: BaseUrl {
                base_url: Some(spec.http_configuration_url.clone()),
            },
            segment_delivery_configurations: spec
                .segment_delivery_configurations
                .iter()
                .map(|c| WireSegmentDeliveryConfiguration {
                    base_url: c.base_url.clone(),
                    name: c.name.clone(),
                })
                .collect(),
            tags: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceLocationDescription {
    pub arn: String,
    pub source_location_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_configuration: Option<WireAccessConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_segment_delivery_configuration: Option<BaseUrl>,
    #[serde(default)]
    pub http_configuration: BaseUrl,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<f64>,
    #[serde(default)]
    pub segment_delivery_configurations: Vec<WireSegmentDeliveryConfiguration>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl From<SourceLocationDescription> for SourceLocationObservedState {
    fn from(desc: SourceLocationDescription) -> Self {
        Self {
            name: desc.source_location_name,
            arn: desc.arn,
            http_configuration_url: desc.http_configuration.base_url.unwrap_or_default(),
            access_configuration: desc.access_configuration.map(AccessConfiguration::from),
            default_segment_delivery_configuration_url: desc
                .default_segment_delivery_configuration
                .and_then(|c| c.base_url),
            segment_delivery_configurations: desc
                .segment_delivery_configurations
                .into_iter()
                .map(|c| SegmentDeliveryConfiguration {
                    base_url: c.base_url,
                    name: c.name,
                })
                .collect(),
            tags: desc.tags,
            creation_time: epoch_to_rfc3339(desc.creation_time),
            last_modified_time: epoch_to_rfc3339(desc.last_modified_time),
        }
    }
}

// ---------------------------------------------------------------------------
// VOD and live sources
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireHttpPackageConfiguration {
    pub path: String,
    pub source_group: String,
    #[serde(rename = "Type")]
    pub type_: crate::crd::PackageType,
}

impl From<&HttpPackageConfiguration> for WireHttpPackageConfiguration {
    fn from(package: &HttpPackageConfiguration) -> Self {
        Self {
            path: package.path.clone(),
            source_group: package.source_group.clone(),
            type_: package.type_,
        }
    }
}

impl From<WireHttpPackageConfiguration> for HttpPackageConfiguration {
    fn from(package: WireHttpPackageConfiguration) -> Self {
        Self {
            path: package.path,
            source_group: package.source_group,
            type_: package.type_,
        }
    }
}

/// Body of the create and update source operations
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceRequest {
    #[serde(skip)]
    pub kind: SourceKind,
    #[serde(skip)]
    pub source_location_name: String,
    #[serde(skip)]
    pub name: String,
    pub http_package_configurations: Vec<WireHttpPackageConfiguration>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl SourceRequest {
    pub fn for_create(desired: &SourceDesiredState) -> Self {
        Self {
            tags: desired.tags.clone(),
            ..Self::for_update(desired)
        }
    }

    pub fn for_update(desired: &SourceDesiredState) -> Self {
        Self {
            kind: desired.kind,
            source_location_name: desired.source_location_name.clone(),
            name: desired.name.clone(),
            http_package_configurations: desired
                .http_package_configurations
                .iter()
                .map(WireHttpPackageConfiguration::from)
                .collect(),
            tags: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceDescription {
    pub arn: String,
    /// `VodSourceName` or `LiveSourceName` depending on the kind
    #[serde(alias = "VodSourceName", alias = "LiveSourceName")]
    pub name: String,
    pub source_location_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<f64>,
    #[serde(default)]
    pub http_package_configurations: Vec<WireHttpPackageConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<f64>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl From<SourceDescription> for SourceObservedState {
    fn from(desc: SourceDescription) -> Self {
        Self {
            name: desc.name,
            source_location_name: desc.source_location_name,
            arn: desc.arn,
            http_package_configurations: desc
                .http_package_configurations
                .into_iter()
                .map(HttpPackageConfiguration::from)
                .collect(),
            tags: desc.tags,
            creation_time: epoch_to_rfc3339(desc.creation_time),
            last_modified_time: epoch_to_rfc3339(desc.last_modified_time),
        }
    }
}

/// One page of a `ListVodSources` / `ListLiveSources` response
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceListPage {
    #[serde(default)]
    pub items: Vec<SourceDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// A dependent source scoped to its source location
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChildReference {
    pub kind: SourceKind,
    pub source_location_name: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Playback configurations
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireCdnConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_segment_url_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_segment_url_prefix: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireDashConfiguration {
    /// Only present in responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_endpoint_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpd_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_manifest_type: Option<OriginManifestType>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HlsConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_endpoint_prefix: Option<String>,
}

/// Body of `PutPlaybackConfiguration`
///
/// Tags are sent on the first put only; later changes go through
/// `TagResource`/`UntagResource`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaybackConfigurationRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_decision_server_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdn_configuration: Option<WireCdnConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_configuration: Option<WireDashConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slate_ad_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcode_profile_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_content_source_url: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl PlaybackConfigurationRequest {
    pub fn for_create(spec: &PlaybackConfigurationSpec) -> Self {
        Self {
            tags: spec.tags.clone(),
            ..Self::for_update(spec)
        }
    }

    pub fn for_update(spec: &PlaybackConfigurationSpec) -> Self {
        Self {
            name: spec.configuration_name.clone(),
            ad_decision_server_url: spec.ad_decision_server_url.clone(),
            cdn_configuration: spec.cdn_configuration.as_ref().map(|cdn| WireCdnConfiguration {
                ad_segment_url_prefix: cdn.ad_segment_url_prefix.clone(),
                content_segment_url_prefix: cdn.content_segment_url_prefix.clone(),
            }),
            dash_configuration: spec
                .dash_configuration
                .as_ref()
                .map(|dash| WireDashConfiguration {
                    manifest_endpoint_prefix: None,
                    mpd_location: dash.mpd_location.clone(),
                    origin_manifest_type: dash.origin_manifest_type,
                }),
            slate_ad_url: spec.slate_ad_url.clone(),
            transcode_profile_name: spec.transcode_profile_name.clone(),
            video_content_source_url: spec.video_content_source_url.clone(),
            tags: BTreeMap::new(),
        }
    }
}

/// Response of `PutPlaybackConfiguration` and `GetPlaybackConfiguration`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaybackConfigurationDescription {
    pub name: String,
    pub playback_configuration_arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_decision_server_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_configuration: Option<WireCdnConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_configuration: Option<WireDashConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls_configuration: Option<HlsConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_endpoint_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_initialization_endpoint_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slate_ad_url: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcode_profile_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_content_source_url: Option<String>,
}

impl From<PlaybackConfigurationDescription> for PlaybackConfigurationObservedState {
    fn from(desc: PlaybackConfigurationDescription) -> Self {
        let dash_manifest_endpoint_prefix = desc
            .dash_configuration
            .as_ref()
            .and_then(|d| d.manifest_endpoint_prefix.clone());
        Self {
            name: desc.name,
            arn: desc.playback_configuration_arn,
            ad_decision_server_url: desc.ad_decision_server_url,
            cdn_configuration: desc.cdn_configuration.map(|cdn| CdnConfiguration {
                ad_segment_url_prefix: cdn.ad_segment_url_prefix,
                content_segment_url_prefix: cdn.content_segment_url_prefix,
            }),
            dash_configuration: desc.dash_configuration.map(|dash| DashConfiguration {
                mpd_location: dash.mpd_location,
                origin_manifest_type: dash.origin_manifest_type,
            }),
            slate_ad_url: desc.slate_ad_url,
            transcode_profile_name: desc.transcode_profile_name,
            video_content_source_url: desc.video_content_source_url,
            playback_endpoint_prefix: desc.playback_endpoint_prefix,
            session_initialization_endpoint_prefix: desc.session_initialization_endpoint_prefix,
            hls_manifest_endpoint_prefix: desc
                .hls_configuration
                .and_then(|h| h.manifest_endpoint_prefix),
            dash_manifest_endpoint_prefix,
            tags: desc.tags,
        }
    }
}
