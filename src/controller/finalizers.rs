//! Finalizer names for the MediaTailor resources
//!
//! A finalizer keeps the custom resource around until the remote resource it
//! manages has been removed from the control plane. The kube-rs `finalizer`
//! helper adds and removes them.

pub const CHANNEL_FINALIZER: &str = "mediatailor.aws/channel-cleanup";
pub const SOURCE_LOCATION_FINALIZER: &str = "mediatailor.aws/source-location-cleanup";
pub const VOD_SOURCE_FINALIZER: &str = "mediatailor.aws/vod-source-cleanup";
pub const LIVE_SOURCE_FINALIZER: &str = "mediatailor.aws/live-source-cleanup";
pub const PLAYBACK_CONFIGURATION_FINALIZER: &str =
    "mediatailor.aws/playback-configuration-cleanup";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalizer_names_are_domain_qualified() {
        for name in [
            CHANNEL_FINALIZER,
            SOURCE_LOCATION_FINALIZER,
            VOD_SOURCE_FINALIZER,
            LIVE_SOURCE_FINALIZER,
            PLAYBACK_CONFIGURATION_FINALIZER,
        ] {
            assert!(name.starts_with("mediatailor.aws/"));
        }
    }
}
