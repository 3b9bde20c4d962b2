//! Resolving a resource's short name from its name or ARN

use crate::error::{Error, Result};

/// How a read addresses a remote resource
///
/// Imported resources may only carry an ARN; the name wins when both are set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceRef {
    pub name: Option<String>,
    pub arn: Option<String>,
}

impl ResourceRef {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            arn: None,
        }
    }

    pub fn by_arn(arn: impl Into<String>) -> Self {
        Self {
            name: None,
            arn: Some(arn.into()),
        }
    }

    pub fn resolve(&self) -> Result<String> {
        match (self.name.as_deref(), self.arn.as_deref()) {
            (Some(name), _) if !name.trim().is_empty() => Ok(name.to_string()),
            (_, Some(arn)) => name_from_arn(arn),
            _ => Err(Error::IdentityError {
                identifier: String::new(),
                reason: "neither a name nor an ARN is recorded".to_string(),
            }),
        }
    }
}

/// Short name from an ARN such as
/// `arn:aws:mediatailor:eu-west-1:123456789012:channel/news-24`
pub fn name_from_arn(arn: &str) -> Result<String> {
    let invalid = |reason: &str| Error::IdentityError {
        identifier: arn.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    if parts.len() != 6 || parts[0] != "arn" {
        return Err(invalid(
            "expected arn:partition:service:region:account:resource",
        ));
    }

    let resource = parts[5];
    if !resource.contains('/') {
        return Err(invalid("resource part has no path"));
    }
    match resource.rsplit('/').next() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(invalid("resource path ends without a name")),
    }
}

/// (location, name) of a source from its ARN, e.g. `...:vodSource/origin/slate`
pub fn source_identity_from_arn(arn: &str) -> Result<(String, String)> {
    let name = name_from_arn(arn)?;
    let location = arn
        .rsplit('/')
        .nth(1)
        .filter(|segment| !segment.contains(':') && !segment.is_empty())
        .ok_or_else(|| Error::IdentityError {
            identifier: arn.to_string(),
            reason: "source ARN has no source location segment".to_string(),
        })?;
    Ok((location.to_string(), name))
}
