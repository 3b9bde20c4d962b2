//! VodSource and LiveSource Custom Resource Definitions
//!
//! Both kinds describe a set of HTTP package configurations under a source
//! location and differ only in how MediaTailor plays them. They are converted
//! into a [`SourceDesiredState`] so one reconciler serves both.

use std::collections::BTreeMap;
use std::fmt;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{validate_name, Condition, HttpPackageConfiguration, SpecValidationError};

/// On-demand or live source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum SourceKind {
    Vod,
    Live,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Vod => write!(f, "VOD source"),
            SourceKind::Live => write!(f, "live source"),
        }
    }
}

#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "mediatailor.aws",
    version = "v1alpha1",
    kind = "VodSource",
    namespaced,
    status = "SourceStatus",
    shortname = "mtvod",
    printcolumn = r#"{"name":"Location","type":"string","jsonPath":".spec.sourceLocationName"}"#,
    printcolumn = r#"{"name":"Source","type":"string","jsonPath":".spec.vodSourceName"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct VodSourceSpec {
    pub source_location_name: String,
    pub vod_source_name: String,
    pub http_package_configurations: Vec<HttpPackageConfiguration>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl VodSourceSpec {
    pub fn desired(&self) -> SourceDesiredState {
        SourceDesiredState {
            kind: SourceKind::Vod,
            source_location_name: self.source_location_name.clone(),
            name: self.vod_source_name.clone(),
            http_package_configurations: self.http_package_configurations.clone(),
            tags: self.tags.clone(),
        }
    }
}

#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "mediatailor.aws",
    version = "v1alpha1",
    kind = "LiveSource",
    namespaced,
    status = "SourceStatus",
    shortname = "mtlive",
    printcolumn = r#"{"name":"Location","type":"string","jsonPath":".spec.sourceLocationName"}"#,
    printcolumn = r#"{"name":"Source","type":"string","jsonPath":".spec.liveSourceName"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct LiveSourceSpec {
    pub source_location_name: String,
    pub live_source_name: String,
    pub http_package_configurations: Vec<HttpPackageConfiguration>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl LiveSourceSpec {
    pub fn desired(&self) -> SourceDesiredState {
        SourceDesiredState {
            kind: SourceKind::Live,
            source_location_name: self.source_location_name.clone(),
            name: self.live_source_name.clone(),
            http_package_configurations: self.http_package_configurations.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Desired state shared by VOD and live sources
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceDesiredState {
    pub kind: SourceKind,
    pub source_location_name: String,
    pub name: String,
    pub http_package_configurations: Vec<HttpPackageConfiguration>,
    pub tags: BTreeMap<String, String>,
}

impl SourceDesiredState {
    pub fn validate(&self) -> Result<(), Vec<SpecValidationError>> {
        let mut errors = Vec::new();
        let name_field = match self.kind {
            SourceKind::Vod => "spec.vodSourceName",
            SourceKind::Live => "spec.liveSourceName",
        };

        validate_name(
            "spec.sourceLocationName",
            &self.source_location_name,
            &mut errors,
        );
        validate_name(name_field, &self.name, &mut errors);

        if self.http_package_configurations.is_empty() {
            errors.push(SpecValidationError::new(
                "spec.httpPackageConfigurations",
                "at least one package configuration is required",
                "Add an entry with path, sourceGroup and type.",
            ));
        }
        for (i, package) in self.http_package_configurations.iter().enumerate() {
            if package.source_group.trim().is_empty() {
                errors.push(SpecValidationError::new(
                    format!("spec.httpPackageConfigurations[{}].sourceGroup", i),
                    "must not be empty",
                    "Name the source group channels will refer to.",
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

/// VOD or live source as read back from the control plane
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceObservedState {
    pub name: String,
    pub source_location_name: String,
    pub arn: String,

    #[serde(default)]
    pub http_package_configurations: Vec<HttpPackageConfiguration>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    #[serde(default)]
    pub phase: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<SourceObservedState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_tags: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl SourceStatus {
    /// (location, name) recorded by the last successful apply
    pub fn applied_identity(&self) -> Option<(&str, &str)> {
        self.observed
            .as_ref()
            .map(|o| (o.source_location_name.as_str(), o.name.as_str()))
    }
}
