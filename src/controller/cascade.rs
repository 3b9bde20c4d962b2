//! Cascade delete of a source location and its sources
//!
//! The control plane refuses to delete a source location that still owns
//! sources, so every VOD and live source is deleted first. Any failure leaves
//! the location in place.

use tracing::info;

use crate::crd::SourceKind;
use crate::error::{Error, Result};
use crate::mediatailor::{ChildReference, MediaTailorApi};

/// All sources owned by `location`, VOD sources first
pub async fn list_children(
    api: &dyn MediaTailorApi,
    location: &str,
) -> Result<Vec<ChildReference>> {
    let mut children = api
        .list_sources(SourceKind::Vod, location)
        .await
        .map_err(Error::remote("listing VOD sources"))?;
    children.extend(
        api.list_sources(SourceKind::Live, location)
            .await
            .map_err(Error::remote("listing live sources"))?,
    );
    Ok(children)
}

/// Delete every child of `location`, then the location itself
///
/// Returns the number of children deleted.
pub async fn delete_source_location(api: &dyn MediaTailorApi, location: &str) -> Result<usize> {
    let children = list_children(api, location).await?;

    for child in &children {
        info!(
            "Deleting {} {} of source location {}",
            child.kind, child.name, location
        );
        api.delete_source(child.kind, &child.source_location_name, &child.name)
            .await
            .map_err(Error::remote(match child.kind {
                SourceKind::Vod => "deleting a VOD source",
                SourceKind::Live => "deleting a live source",
            }))?;
    }

    api.delete_source_location(location)
        .await
        .map_err(Error::remote("deleting the source location"))?;
    info!(
        "Deleted source location {} and {} source(s)",
        location,
        children.len()
    );

    Ok(children.len())
}
