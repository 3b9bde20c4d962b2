//! PlaybackConfiguration Custom Resource Definition
//!
//! A playback configuration ties a content origin to an ad decision server
//! for server-side ad insertion. The control plane stores it with a single
//! put, so create and update are the same remote call.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{validate_http_url, validate_name, Condition, SpecValidationError};

#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "mediatailor.aws",
    version = "v1alpha1",
    kind = "PlaybackConfiguration",
    namespaced,
    status = "PlaybackConfigurationStatus",
    shortname = "mtpc",
    printcolumn = r#"{"name":"Configuration","type":"string","jsonPath":".spec.configurationName"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackConfigurationSpec {
    /// Remote configuration name; changing it replaces the configuration
    pub configuration_name: String,

    /// URL of the ad decision server (VAST/VMAP)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_decision_server_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_configuration: Option<CdnConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_configuration: Option<DashConfiguration>,

    /// Ad played when the ad decision server returns nothing to fill a break
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slate_ad_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcode_profile_name: Option<String>,

    /// Origin of the content, without the manifest path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_content_source_url: Option<String>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// CDN rewrite rules for content and ad segments
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CdnConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_segment_url_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_segment_url_prefix: Option<String>,
}

/// DASH manifest handling
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashConfiguration {
    /// `DISABLED` or `EMT_DEFAULT`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpd_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_manifest_type: Option<OriginManifestType>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OriginManifestType {
    SinglePeriod,
    MultiPeriod,
}

const MPD_LOCATIONS: [&str; 2] = ["DISABLED", "EMT_DEFAULT"];

impl PlaybackConfigurationSpec {
    pub fn validate(&self) -> Result<(), Vec<SpecValidationError>> {
        let mut errors = Vec::new();

        validate_name(
            "spec.configurationName",
            &self.configuration_name,
            &mut errors,
        );

        let mut urls = vec![
            ("spec.adDecisionServerUrl", self.ad_decision_server_url.as_deref()),
            ("spec.slateAdUrl", self.slate_ad_url.as_deref()),
            ("spec.videoContentSourceUrl", self.video_content_source_url.as_deref()),
        ];
        if let Some(cdn) = &self.cdn_configuration {
            urls.push((
                "spec.cdnConfiguration.adSegmentUrlPrefix",
                cdn.ad_segment_url_prefix.as_deref(),
            ));
            urls.push((
                "spec.cdnConfiguration.contentSegmentUrlPrefix",
                cdn.content_segment_url_prefix.as_deref(),
            ));
        }
        for (field, url) in urls {
            if let Some(url) = url {
                validate_http_url(field, url, &mut errors);
            }
        }

        if let Some(location) = self
            .dash_configuration
            .as_ref()
            .and_then(|d| d.mpd_location.as_deref())
        {
            if !MPD_LOCATIONS.contains(&location) {
                errors.push(SpecValidationError::new(
                    "spec.dashConfiguration.mpdLocation",
                    format!("'{}' is not a known MPD location", location),
                    "Use DISABLED or EMT_DEFAULT.",
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Playback configuration as read back from the control plane
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackConfigurationObservedState {
    pub name: String,
    pub arn: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_decision_server_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_configuration: Option<CdnConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_configuration: Option<DashConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slate_ad_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcode_profile_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_content_source_url: Option<String>,

    /// Prefix players use to request manifests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_endpoint_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_initialization_endpoint_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls_manifest_endpoint_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_manifest_endpoint_prefix: Option<String>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackConfigurationStatus {
    #[serde(default)]
    pub phase: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<PlaybackConfigurationObservedState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_tags: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl PlaybackConfigurationStatus {
    pub fn applied_name(&self) -> Option<&str> {
        self.observed.as_ref().map(|o| o.name.as_str())
    }
}
