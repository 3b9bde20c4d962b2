//! Response bodies for the REST API

use std::collections::BTreeMap;

use kube::ResourceExt;
use serde::Serialize;

use crate::crd::{Channel, ChannelSpec, ChannelState, ChannelStatus};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

/// One row of the channel list
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSummary {
    pub name: String,
    pub namespace: String,
    /// Name of the remote channel
    pub channel_name: String,
    pub phase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_state: Option<ChannelState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_state: Option<ChannelState>,
    /// Playback URL per manifest name
    pub playback_urls: BTreeMap<String, String>,
}

impl From<&Channel> for ChannelSummary {
    fn from(channel: &Channel) -> Self {
        let status = channel.status.as_ref();
        let observed = status.and_then(|s| s.observed.as_ref());

        Self {
            name: channel.name_any(),
            namespace: channel.namespace().unwrap_or_default(),
            channel_name: channel.spec.channel_name.clone(),
            phase: status
                .map(|s| s.phase.clone())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "Pending".to_string()),
            desired_state: channel.spec.channel_state,
            observed_state: observed.map(|o| o.channel_state),
            playback_urls: observed
                .map(|o| {
                    o.outputs
                        .iter()
                        .filter_map(|out| {
                            out.playback_url
                                .clone()
                                .map(|url| (out.output.manifest_name.clone(), url))
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChannelListResponse {
    pub items: Vec<ChannelSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDetailResponse {
    pub name: String,
    pub namespace: String,
    pub spec: ChannelSpec,
    pub status: ChannelStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<Channel> for ChannelDetailResponse {
    fn from(channel: Channel) -> Self {
        Self {
            name: channel.name_any(),
            namespace: channel.namespace().unwrap_or_default(),
            created_at: channel
                .metadata
                .creation_timestamp
                .as_ref()
                .map(|t| t.0.to_rfc3339()),
            status: channel.status.unwrap_or_default(),
            spec: channel.spec,
        }
    }
}
