//! Shared types for MediaTailor resource specifications
//!
//! These types are used by the CRD definitions, the reconcilers and the
//! control plane client. Enum values serialize exactly as the control plane
//! spells them (`RUNNING`, `LINEAR`, `SECRETS_MANAGER_ACCESS_TOKEN`, ...), so the
//! same types appear in custom resources and in request bodies.
//!
//! # Type Hierarchy
//!
//! - [`ChannelState`] - Operational state of a channel (running or stopped)
//! - [`PlaybackMode`] / [`Tier`] - Channel playback behaviour and pricing tier
//! - [`OutputSpec`] - One channel output with its manifest timing parameters
//! - [`FillerSlate`] - VOD source played when the schedule has gaps
//! - [`HttpPackageConfiguration`] - Package paths of a VOD or live source
//! - [`AccessConfiguration`] / [`SegmentDeliveryConfiguration`] - Source location access
//! - [`Condition`] - Kubernetes-style status condition

use std::ops::RangeInclusive;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Allowed DASH and HLS manifest window, in seconds
pub const MANIFEST_WINDOW_RANGE: RangeInclusive<i32> = 30..=3600;
/// Allowed range for the DASH buffer, update period and presentation delay, in seconds
pub const DASH_TIMING_RANGE: RangeInclusive<i32> = 2..=60;

/// Operational state of a channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelState {
    Running,
    /// Newly created channels start out stopped
    #[default]
    Stopped,
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelState::Running => write!(f, "RUNNING"),
            ChannelState::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// How the channel plays its program schedule
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaybackMode {
    /// Programs play back-to-back once
    #[default]
    Linear,
    /// Programs repeat from the start once the schedule ends
    Loop,
}

impl std::fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackMode::Linear => write!(f, "LINEAR"),
            PlaybackMode::Loop => write!(f, "LOOP"),
        }
    }
}

/// Channel tier
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    #[default]
    Basic,
    Standard,
}

/// Package type of a source's HTTP package configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageType {
    Dash,
    #[default]
    Hls,
    Cmaf,
}

/// How MediaTailor authenticates against a source location origin
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessType {
    /// Sign origin requests with SigV4 (S3 origins)
    S3Sigv4,
    /// Send a header whose value is read from Secrets Manager
    SecretsManagerAccessToken,
}

/// One channel output
///
/// The DASH and HLS playlist settings are kept flat here; the client
/// nests them into the request shape the control plane expects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    /// Name of the manifest for this output, e.g. `index`
    pub manifest_name: String,
    /// Source group of the package configuration to play
    pub source_group: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_manifest_window_seconds: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_min_buffer_time_seconds: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_min_update_period_seconds: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_suggested_presentation_delay_seconds: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hls_manifest_window_seconds: Option<i32>,
}

impl OutputSpec {
    pub fn has_dash_settings(&self) -> bool {
        self.dash_manifest_window_seconds.is_some()
            || self.dash_min_buffer_time_seconds.is_some()
            || self.dash_min_update_period_seconds.is_some()
            || self.dash_suggested_presentation_delay_seconds.is_some()
    }

    /// True when `observed` carries what `self` asks for.
    ///
    /// Unset timing parameters are left to the control plane's defaults,
    /// unless `previous` had set them: then the field is being cleared and
    /// any value still reported counts as drift.
    pub fn matches(&self, previous: Option<&OutputSpec>, observed: &OutputSpec) -> bool {
        let field = |get: fn(&OutputSpec) -> Option<i32>| {
            let cleared = previous.and_then(get).is_some();
            optional_matches(get(self), cleared, get(observed))
        };

        self.manifest_name == observed.manifest_name
            && self.source_group == observed.source_group
            && field(|o| o.dash_manifest_window_seconds)
            && field(|o| o.dash_min_buffer_time_seconds)
            && field(|o| o.dash_min_update_period_seconds)
            && field(|o| o.dash_suggested_presentation_delay_seconds)
            && field(|o| o.hls_manifest_window_seconds)
    }
}

/// Compare an optional desired field with the reported one.
///
/// `None` accepts whatever is reported unless the field was set by the last
/// apply (`cleared`), in which case the control plane must report nothing.
pub fn optional_matches<T: PartialEq>(
    desired: Option<T>,
    cleared: bool,
    observed: Option<T>,
) -> bool {
    match desired {
        Some(_) => desired == observed,
        None => !cleared || observed.is_none(),
    }
}

/// Slate played when a linear channel has nothing scheduled
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FillerSlate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vod_source_name: Option<String>,
}

/// HTTP package configuration of a VOD or live source
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HttpPackageConfiguration {
    /// Relative path appended to the source location URL
    pub path: String,
    pub source_group: String,
    #[serde(rename = "type")]
    pub type_: PackageType,
}

/// Access configuration of a source location
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_type: Option<AccessType>,

    /// Header name sent to the origin (Secrets Manager access token only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_string_key: Option<String>,
}

/// Named CDN base URL for segment delivery
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentDeliveryConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Kubernetes-style condition for status reporting
///
/// # Examples
///
/// ```rust
/// use mediatailor_operator::crd::Condition;
///
/// use mediatailor_operator::controller::conditions;
///
/// let mut conditions: Vec<Condition> = Vec::new();
/// conditions::mark_ready(&mut conditions, Some(1), "Reconciled", "Channel is in sync");
/// assert!(conditions::is_condition_true(&conditions, "Ready"));
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition (e.g., "Ready", "Progressing", "Degraded")
    #[serde(rename = "type")]
    pub type_: String,
    /// Status of the condition: "True", "False", or "Unknown"
    pub status: String,
    /// Last time the condition transitioned
    pub last_transition_time: String,
    /// Machine-readable reason for the condition
    pub reason: String,
    /// Human-readable message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// Structured validation error for resource specs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpecValidationError {
    pub field: String,
    pub message: String,
    pub how_to_fix: String,
}

impl SpecValidationError {
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        how_to_fix: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            how_to_fix: how_to_fix.into(),
        }
    }
}

impl std::fmt::Display for SpecValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.field, self.message, self.how_to_fix)
    }
}

/// Join validation errors into one line for status messages
pub fn format_validation_errors(errors: &[SpecValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn validate_name(field: &str, value: &str, errors: &mut Vec<SpecValidationError>) {
    if value.trim().is_empty() {
        errors.push(SpecValidationError::new(
            field,
            "must not be empty",
            format!("Set {} to the name of the MediaTailor resource.", field),
        ));
    } else if value.contains('/') {
        errors.push(SpecValidationError::new(
            field,
            "must not contain '/'",
            format!("Remove the '/' characters from {}.", field),
        ));
    }
}

pub(crate) fn validate_http_url(field: &str, value: &str, errors: &mut Vec<SpecValidationError>) {
    if !(value.starts_with("https://") || value.starts_with("http://")) {
        errors.push(SpecValidationError::new(
            field,
            format!("'{}' is not an http(s) URL", value),
            format!("Set {} to an absolute http:// or https:// URL.", field),
        ));
    }
}
