//! Tag reconciliation
//!
//! Tags are never replaced wholesale. The differ computes the keys to add or
//! update and the keys to remove, and only those are submitted.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{Error, Result};
use crate::mediatailor::MediaTailorApi;

/// Add/update and remove halves of a tag change; the two key sets are disjoint
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagDiff {
    pub to_add: BTreeMap<String, String>,
    pub to_remove: BTreeSet<String>,
}

impl TagDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Apply the diff to `tags`, as the control plane would
    pub fn apply_to(&self, tags: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut result: BTreeMap<String, String> = tags
            .iter()
            .filter(|(k, _)| !self.to_remove.contains(*k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        result.extend(self.to_add.iter().map(|(k, v)| (k.clone(), v.clone())));
        result
    }
}

/// Compute the changes that turn `old` into `new`
pub fn diff(old: &BTreeMap<String, String>, new: &BTreeMap<String, String>) -> TagDiff {
    let to_add = new
        .iter()
        .filter(|(k, v)| old.get(*k) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let to_remove = old
        .keys()
        .filter(|k| !new.contains_key(*k))
        .cloned()
        .collect();

    TagDiff { to_add, to_remove }
}

/// Submit a diff against `arn`: removals first, then additions, skipping empty halves
pub async fn submit(api: &dyn MediaTailorApi, arn: &str, diff: &TagDiff) -> Result<()> {
    if !diff.to_remove.is_empty() {
        let keys: Vec<String> = diff.to_remove.iter().cloned().collect();
        debug!("Removing tags {:?} from {}", keys, arn);
        api.untag_resource(arn, &keys)
            .await
            .map_err(Error::remote("removing tags"))?;
    }

    if !diff.to_add.is_empty() {
        debug!("Adding {} tag(s) to {}", diff.to_add.len(), arn);
        api.tag_resource(arn, &diff.to_add)
            .await
            .map_err(Error::remote("adding tags"))?;
    }

    Ok(())
}
