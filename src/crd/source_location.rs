//! SourceLocation Custom Resource Definition
//!
//! A source location is the origin that VOD and live sources hang off.
//! Deleting it first deletes every source it owns.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{
    validate_http_url, validate_name, AccessConfiguration, AccessType, Condition,
    SegmentDeliveryConfiguration, SpecValidationError,
};

#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "mediatailor.aws",
    version = "v1alpha1",
    kind = "SourceLocation",
    namespaced,
    status = "SourceLocationStatus",
    shortname = "mtsl",
    printcolumn = r#"{"name":"Location","type":"string","jsonPath":".spec.sourceLocationName"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocationSpec {
    /// Remote source location name; changing it replaces the location
    pub source_location_name: String,

    /// Base URL of the origin
    pub http_configuration_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_configuration: Option<AccessConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_segment_delivery_configuration_url: Option<String>,

    #[serde(default)]
    pub segment_delivery_configurations: Vec<SegmentDeliveryConfiguration>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl SourceLocationSpec {
    pub fn validate(&self) -> Result<(), Vec<SpecValidationError>> {
        let mut errors = Vec::new();

        validate_name(
            "spec.sourceLocationName",
            &self.source_location_name,
            &mut errors,
        );
        validate_http_url(
            "spec.httpConfigurationUrl",
            &self.http_configuration_url,
            &mut errors,
        );
        if let Some(url) = &self.default_segment_delivery_configuration_url {
            validate_http_url(
                "spec.defaultSegmentDeliveryConfigurationUrl",
                url,
                &mut errors,
            );
        }

        if let Some(access) = &self.access_configuration {
            if access.access_type == Some(AccessType::SecretsManagerAccessToken) {
                let required = [
                    ("headerName", &access.header_name),
                    ("secretArn", &access.secret_arn),
                    ("secretStringKey", &access.secret_string_key),
                ];
                for (field, value) in required {
                    if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                        errors.push(SpecValidationError::new(
                            format!("spec.accessConfiguration.{}", field),
                            "is required for SECRETS_MANAGER_ACCESS_TOKEN access",
                            format!("Set spec.accessConfiguration.{}.", field),
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
}

/// Source location as read back from the control plane
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocationObservedState {
    pub name: String,
    pub arn: String,
    pub http_configuration_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_configuration: Option<AccessConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_segment_delivery_configuration_url: Option<String>,

    #[serde(default)]
    pub segment_delivery_configurations: Vec<SegmentDeliveryConfiguration>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocationStatus {
    #[serde(default)]
    pub phase: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<SourceLocationObservedState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_tags: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl SourceLocationStatus {
    pub fn applied_name(&self) -> Option<&str> {
        self.observed.as_ref().map(|o| o.name.as_str())
    }
}
