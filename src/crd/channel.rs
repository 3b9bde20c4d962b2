//! Channel Custom Resource Definition
//!
//! A `Channel` declares the desired configuration of one MediaTailor channel:
//! its outputs, playback mode, filler slate, optional access policy, tags and
//! optionally the operational state it should be left in.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{
    optional_matches, validate_name, ChannelState, Condition, FillerSlate, OutputSpec,
    PlaybackMode, SpecValidationError, Tier, DASH_TIMING_RANGE, MANIFEST_WINDOW_RANGE,
};

/// Desired state of a MediaTailor channel
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "mediatailor.aws",
    version = "v1alpha1",
    kind = "Channel",
    namespaced,
    status = "ChannelStatus",
    shortname = "mtch",
    printcolumn = r#"{"name":"Channel","type":"string","jsonPath":".spec.channelName"}"#,
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.observed.channelState"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSpec {
    /// Remote channel name; changing it replaces the channel
    pub channel_name: String,

    #[serde(default)]
    pub playback_mode: PlaybackMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,

    pub outputs: Vec<OutputSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filler_slate: Option<FillerSlate>,

    /// Requested operational state. When unset the controller keeps a
    /// running channel running and leaves a stopped one stopped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_state: Option<ChannelState>,

    /// IAM policy document attached to the channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl ChannelSpec {
    /// Validate the spec
    ///
    /// Returns every problem found, not just the first one.
    pub fn validate(&self) -> Result<(), Vec<SpecValidationError>> {
        let mut errors = Vec::new();

        validate_name("spec.channelName", &self.channel_name, &mut errors);

        if self.outputs.is_empty() {
            errors.push(SpecValidationError::new(
                "spec.outputs",
                "at least one output is required",
                "Add an entry with manifestName and sourceGroup to spec.outputs.",
            ));
        }

        for (i, output) in self.outputs.iter().enumerate() {
            let prefix = format!("spec.outputs[{}]", i);
            if output.manifest_name.trim().is_empty() {
                errors.push(SpecValidationError::new(
                    format!("{}.manifestName", prefix),
                    "must not be empty",
                    "Set the manifest name, e.g. \"index\".",
                ));
            }
            if output.source_group.trim().is_empty() {
                errors.push(SpecValidationError::new(
                    format!("{}.sourceGroup", prefix),
                    "must not be empty",
                    "Set the source group of the package configuration to play.",
                ));
            }

            let bounded = [
                (
                    "dashManifestWindowSeconds",
                    output.dash_manifest_window_seconds,
                    &MANIFEST_WINDOW_RANGE,
                ),
                (
                    "dashMinBufferTimeSeconds",
                    output.dash_min_buffer_time_seconds,
                    &DASH_TIMING_RANGE,
                ),
                (
                    "dashMinUpdatePeriodSeconds",
                    output.dash_min_update_period_seconds,
                    &DASH_TIMING_RANGE,
                ),
                (
                    "dashSuggestedPresentationDelaySeconds",
                    output.dash_suggested_presentation_delay_seconds,
                    &DASH_TIMING_RANGE,
                ),
                (
                    "hlsManifestWindowSeconds",
                    output.hls_manifest_window_seconds,
                    &MANIFEST_WINDOW_RANGE,
                ),
            ];
            for (field, value, range) in bounded {
                if let Some(v) = value {
                    if !range.contains(&v) {
                        errors.push(SpecValidationError::new(
                            format!("{}.{}", prefix, field),
                            format!("{} is out of range", v),
                            format!(
                                "Use a value between {} and {} seconds.",
                                range.start(),
                                range.end()
                            ),
                        ));
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The declared policy document, treating a blank document as absent
    pub fn desired_policy(&self) -> Option<&str> {
        self.policy.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// Whether the fields carried by `UpdateChannel` differ from what the
    /// control plane reports.
    ///
    /// `previous` is the spec of the last apply; optional fields it set and
    /// `self` no longer does must be reported as unset.
    pub fn core_drifted_from(
        &self,
        previous: &ChannelSpec,
        observed: &ChannelObservedState,
    ) -> bool {
        if self.playback_mode != observed.playback_mode {
            return true;
        }
        if !optional_matches(self.tier, previous.tier.is_some(), observed.tier) {
            return true;
        }
        if self.filler_slate.clone().unwrap_or_default()
            != observed.filler_slate.clone().unwrap_or_default()
        {
            return true;
        }
        self.outputs.len() != observed.outputs.len()
            || self
                .outputs
                .iter()
                .zip(&observed.outputs)
                .enumerate()
                .any(|(i, (desired, actual))| {
                    !desired.matches(previous.outputs.get(i), &actual.output)
                })
    }
}

/// One output as reported by the control plane
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObservedOutput {
    #[serde(flatten)]
    pub output: OutputSpec,

    /// Playback URL computed by the control plane
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_url: Option<String>,
}

/// Channel as read back from the control plane
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelObservedState {
    pub name: String,
    pub arn: String,
    pub playback_mode: PlaybackMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,

    #[serde(default)]
    pub outputs: Vec<ObservedOutput>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filler_slate: Option<FillerSlate>,

    pub channel_state: ChannelState,

    /// Attached policy, `None` when the channel has no policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<String>,
}

/// Status subresource of a Channel
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatus {
    /// Current phase: Pending, Ready, Failed or Deleting
    #[serde(default)]
    pub phase: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Last state read from the control plane
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<ChannelObservedState>,

    /// Tags as of the last successful apply, used to diff the next one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_tags: Option<BTreeMap<String, String>>,

    /// Spec as of the last successful apply, used to spot cleared fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_spec: Option<ChannelSpec>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl ChannelStatus {
    /// Remote channel name recorded by the last successful apply
    pub fn applied_name(&self) -> Option<&str> {
        self.observed.as_ref().map(|o| o.name.as_str())
    }
}
