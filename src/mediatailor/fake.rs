//! In-memory control plane used by the reconciler tests
//!
//! Behaves like the real service for the rules the reconcilers rely on: a
//! running channel cannot be updated or deleted, a source location with
//! sources cannot be deleted, a playback configuration put replaces it whole,
//! and missing resources report `NotFound`.
//! Every call is recorded and any operation can be made to fail.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use super::error::{ApiError, ApiErrorKind, ApiResult, Operation};
use super::models::{
    ChannelDescription, ChildReference, CreateChannelRequest, HlsConfiguration,
    PlaybackConfigurationDescription, PlaybackConfigurationRequest, RequestOutputItem,
    ResponseOutputItem, SourceDescription, SourceLocationDescription, SourceLocationRequest,
    SourceRequest, UpdateChannelRequest,
};
use super::{source_operation, MediaTailorApi, SourceVerb};
use crate::crd::{ChannelState, SourceKind};

const ARN_PREFIX: &str = "arn:aws:mediatailor:us-east-1:123456789012";
const CREATED_AT: f64 = 1_700_000_000.0;

pub(crate) fn channel_arn(name: &str) -> String {
    format!("{}:channel/{}", ARN_PREFIX, name)
}

/// One recorded call: the operation and the name or ARN it addressed
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Call {
    pub operation: Operation,
    pub target: String,
}

struct Failure {
    operation: Operation,
    target: Option<String>,
    kind: ApiErrorKind,
}

type SourceKey = (SourceKind, String, String);

#[derive(Default)]
struct FakeState {
    channels: BTreeMap<String, ChannelDescription>,
    policies: BTreeMap<String, String>,
    locations: BTreeMap<String, SourceLocationDescription>,
    sources: HashMap<SourceKey, SourceDescription>,
    playback_configurations: BTreeMap<String, PlaybackConfigurationDescription>,
    calls: Vec<Call>,
    failures: Vec<Failure>,
}

impl FakeState {
    fn tags_for_arn(&mut self, arn: &str) -> Option<&mut BTreeMap<String, String>> {
        if let Some(c) = self.channels.values_mut().find(|c| c.arn == arn) {
            return Some(&mut c.tags);
        }
        if let Some(l) = self.locations.values_mut().find(|l| l.arn == arn) {
            return Some(&mut l.tags);
        }
        if let Some(c) = self
            .playback_configurations
            .values_mut()
            .find(|c| c.playback_configuration_arn == arn)
        {
            return Some(&mut c.tags);
        }
        self.sources
            .values_mut()
            .find(|s| s.arn == arn)
            .map(|s| &mut s.tags)
    }
}

#[derive(Default)]
pub(crate) struct FakeMediaTailor {
    state: Mutex<FakeState>,
}

impl FakeMediaTailor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a channel with one HLS output, bypassing the call log
    pub fn seed_channel(&self, name: &str, state: ChannelState, tags: &[(&str, &str)]) {
        let desc = ChannelDescription {
            arn: channel_arn(name),
            channel_name: name.to_string(),
            channel_state: state,
            creation_time: Some(CREATED_AT),
            outputs: vec![ResponseOutputItem {
                manifest_name: "index".to_string(),
                source_group: "hls".to_string(),
                playback_url: Some(format!("https://fake.mediatailor/{}/index.m3u8", name)),
                ..Default::default()
            }],
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        };
        self.lock().channels.insert(name.to_string(), desc);
    }

    pub fn seed_policy(&self, channel: &str, policy: &str) {
        self.lock()
            .policies
            .insert(channel.to_string(), policy.to_string());
    }

    pub fn seed_source_location(&self, name: &str) {
        let desc = SourceLocationDescription {
            arn: format!("{}:sourceLocation/{}", ARN_PREFIX, name),
            source_location_name: name.to_string(),
            creation_time: Some(CREATED_AT),
            ..Default::default()
        };
        self.lock().locations.insert(name.to_string(), desc);
    }

    pub fn seed_source(&self, kind: SourceKind, location: &str, name: &str) {
        let desc = SourceDescription {
            arn: source_arn(kind, location, name),
            name: name.to_string(),
            source_location_name: location.to_string(),
            creation_time: Some(CREATED_AT),
            ..Default::default()
        };
        self.lock()
            .sources
            .insert((kind, location.to_string(), name.to_string()), desc);
    }

    pub fn seed_playback_configuration(&self, name: &str, tags: &[(&str, &str)]) {
        let desc = PlaybackConfigurationDescription {
            name: name.to_string(),
            playback_configuration_arn: playback_configuration_arn(name),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        };
        self.lock()
            .playback_configurations
            .insert(name.to_string(), desc);
    }

    /// Make every later call of `operation` fail with `kind`
    pub fn fail(&self, operation: Operation, kind: ApiErrorKind) {
        self.lock().failures.push(Failure {
            operation,
            target: None,
            kind,
        });
    }

    /// Like [`fail`](Self::fail) but only for calls addressing `target`
    pub fn fail_for(&self, operation: Operation, target: &str, kind: ApiErrorKind) {
        self.lock().failures.push(Failure {
            operation,
            target: Some(target.to_string()),
            kind,
        });
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.lock().calls.iter().map(|c| c.operation).collect()
    }

    /// Operations that change remote state
    pub fn mutations(&self) -> Vec<Operation> {
        self.operations()
            .into_iter()
            .filter(|op| {
                !matches!(
                    op,
                    Operation::DescribeChannel
                        | Operation::GetChannelPolicy
                        | Operation::DescribeSourceLocation
                        | Operation::DescribeVodSource
                        | Operation::DescribeLiveSource
                        | Operation::ListVodSources
                        | Operation::ListLiveSources
                        | Operation::GetPlaybackConfiguration
                )
            })
            .collect()
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    pub fn reset_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn channel(&self, name: &str) -> Option<ChannelDescription> {
        self.lock().channels.get(name).cloned()
    }

    pub fn policy(&self, channel: &str) -> Option<String> {
        self.lock().policies.get(channel).cloned()
    }

    pub fn source_location(&self, name: &str) -> Option<SourceLocationDescription> {
        self.lock().locations.get(name).cloned()
    }

    pub fn source(&self, kind: SourceKind, location: &str, name: &str) -> Option<SourceDescription> {
        self.lock()
            .sources
            .get(&(kind, location.to_string(), name.to_string()))
            .cloned()
    }

    pub fn playback_configuration(&self, name: &str) -> Option<PlaybackConfigurationDescription> {
        self.lock().playback_configurations.get(name).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Record the call and apply any injected failure
    fn begin(&self, operation: Operation, target: &str) -> ApiResult<std::sync::MutexGuard<'_, FakeState>> {
        let mut state = self.lock();
        state.calls.push(Call {
            operation,
            target: target.to_string(),
        });
        let injected = state.failures.iter().find(|f| {
            f.operation == operation && f.target.as_deref().map_or(true, |t| t == target)
        });
        if let Some(failure) = injected {
            return Err(ApiError::new(operation, failure.kind, "injected failure"));
        }
        Ok(state)
    }
}

fn source_arn(kind: SourceKind, location: &str, name: &str) -> String {
    let segment = match kind {
        SourceKind::Vod => "vodSource",
        SourceKind::Live => "liveSource",
    };
    format!("{}:{}/{}/{}", ARN_PREFIX, segment, location, name)
}

fn playback_configuration_arn(name: &str) -> String {
    format!("{}:playbackConfiguration/{}", ARN_PREFIX, name)
}

fn response_outputs(name: &str, outputs: &[RequestOutputItem]) -> Vec<ResponseOutputItem> {
    outputs
        .iter()
        .map(|o| ResponseOutputItem {
            manifest_name: o.manifest_name.clone(),
            source_group: o.source_group.clone(),
            playback_url: Some(format!(
                "https://fake.mediatailor/{}/{}.m3u8",
                name, o.manifest_name
            )),
            dash_playlist_settings: o.dash_playlist_settings.clone(),
            hls_playlist_settings: o.hls_playlist_settings.clone(),
        })
        .collect()
}

#[async_trait]
impl MediaTailorApi for FakeMediaTailor {
    async fn create_channel(
        &self,
        request: &CreateChannelRequest,
    ) -> ApiResult<ChannelDescription> {
        let op = Operation::CreateChannel;
        let mut state = self.begin(op, &request.channel_name)?;
        if state.channels.contains_key(&request.channel_name) {
            return Err(ApiError::new(op, ApiErrorKind::Conflict, "channel already exists"));
        }
        let desc = ChannelDescription {
            arn: channel_arn(&request.channel_name),
            channel_name: request.channel_name.clone(),
            channel_state: ChannelState::Stopped,
            creation_time: Some(CREATED_AT),
            filler_slate: request.filler_slate.clone(),
            last_modified_time: Some(CREATED_AT),
            outputs: response_outputs(&request.channel_name, &request.outputs),
            playback_mode: request.playback_mode,
            tags: request.tags.clone(),
            tier: request.tier,
        };
        state
            .channels
            .insert(request.channel_name.clone(), desc.clone());
        Ok(desc)
    }

    async fn describe_channel(&self, name: &str) -> ApiResult<ChannelDescription> {
        let op = Operation::DescribeChannel;
        let state = self.begin(op, name)?;
        state
            .channels
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::not_found(op, format!("channel {} not found", name)))
    }

    async fn update_channel(
        &self,
        request: &UpdateChannelRequest,
    ) -> ApiResult<ChannelDescription> {
        let op = Operation::UpdateChannel;
        let mut state = self.begin(op, &request.channel_name)?;
        let channel = state
            .channels
            .get_mut(&request.channel_name)
            .ok_or_else(|| ApiError::not_found(op, "channel not found"))?;
        if channel.channel_state == ChannelState::Running {
            return Err(ApiError::new(
                op,
                ApiErrorKind::Conflict,
                "channel must be stopped before it is updated",
            ));
        }
        channel.filler_slate = request.filler_slate.clone();
        channel.outputs = response_outputs(&request.channel_name, &request.outputs);
        channel.playback_mode = request.playback_mode;
        if request.tier.is_some() {
            channel.tier = request.tier;
        }
        channel.last_modified_time = Some(CREATED_AT + 60.0);
        Ok(channel.clone())
    }

    async fn delete_channel(&self, name: &str) -> ApiResult<()> {
        let op = Operation::DeleteChannel;
        let mut state = self.begin(op, name)?;
        match state.channels.get(name) {
            None => return Err(ApiError::not_found(op, "channel not found")),
            Some(c) if c.channel_state == ChannelState::Running => {
                return Err(ApiError::new(
                    op,
                    ApiErrorKind::Conflict,
                    "channel must be stopped before it is deleted",
                ))
            }
            Some(_) => {}
        }
        state.channels.remove(name);
        state.policies.remove(name);
        Ok(())
    }

    async fn start_channel(&self, name: &str) -> ApiResult<()> {
        let op = Operation::StartChannel;
        let mut state = self.begin(op, name)?;
        let channel = state
            .channels
            .get_mut(name)
            .ok_or_else(|| ApiError::not_found(op, "channel not found"))?;
        channel.channel_state = ChannelState::Running;
        Ok(())
    }

    async fn stop_channel(&self, name: &str) -> ApiResult<()> {
        let op = Operation::StopChannel;
        let mut state = self.begin(op, name)?;
        let channel = state
            .channels
            .get_mut(name)
            .ok_or_else(|| ApiError::not_found(op, "channel not found"))?;
        channel.channel_state = ChannelState::Stopped;
        Ok(())
    }

    async fn put_channel_policy(&self, name: &str, policy: &str) -> ApiResult<()> {
        let op = Operation::PutChannelPolicy;
        let mut state = self.begin(op, name)?;
        if !state.channels.contains_key(name) {
            return Err(ApiError::not_found(op, "channel not found"));
        }
        state.policies.insert(name.to_string(), policy.to_string());
        Ok(())
    }

    async fn get_channel_policy(&self, name: &str) -> ApiResult<String> {
        let op = Operation::GetChannelPolicy;
        let state = self.begin(op, name)?;
        state
            .policies
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::not_found(op, "policy not found"))
    }

    async fn delete_channel_policy(&self, name: &str) -> ApiResult<()> {
        let op = Operation::DeleteChannelPolicy;
        let mut state = self.begin(op, name)?;
        state
            .policies
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found(op, "policy not found"))
    }

    async fn tag_resource(&self, arn: &str, tags: &BTreeMap<String, String>) -> ApiResult<()> {
        let op = Operation::TagResource;
        let mut state = self.begin(op, arn)?;
        let current = state
            .tags_for_arn(arn)
            .ok_or_else(|| ApiError::not_found(op, "resource not found"))?;
        current.extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> ApiResult<()> {
        let op = Operation::UntagResource;
        let mut state = self.begin(op, arn)?;
        let current = state
            .tags_for_arn(arn)
            .ok_or_else(|| ApiError::not_found(op, "resource not found"))?;
        for key in keys {
            current.remove(key);
        }
        Ok(())
    }

    async fn create_source_location(
        &self,
        request: &SourceLocationRequest,
    ) -> ApiResult<SourceLocationDescription> {
        let op = Operation::CreateSourceLocation;
        let name = &request.source_location_name;
        let mut state = self.begin(op, name)?;
        if state.locations.contains_key(name) {
            return Err(ApiError::new(op, ApiErrorKind::Conflict, "source location exists"));
        }
        let desc = SourceLocationDescription {
            arn: format!("{}:sourceLocation/{}", ARN_PREFIX, name),
            source_location_name: name.clone(),
            access_configuration: request.access_configuration.clone(),
            creation_time: Some(CREATED_AT),
            default_segment_delivery_configuration: request
                .default_segment_delivery_configuration
                .clone(),
            http_configuration: request.http_configuration.clone(),
            last_modified_time: Some(CREATED_AT),
            segment_delivery_configurations: request.segment_delivery_configurations.clone(),
            tags: request.tags.clone(),
        };
        state.locations.insert(name.clone(), desc.clone());
        Ok(desc)
    }

    async fn describe_source_location(&self, name: &str) -> ApiResult<SourceLocationDescription> {
        let op = Operation::DescribeSourceLocation;
        let state = self.begin(op, name)?;
        state
            .locations
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::not_found(op, "source location not found"))
    }

    async fn update_source_location(
        &self,
        request: &SourceLocationRequest,
    ) -> ApiResult<SourceLocationDescription> {
        let op = Operation::UpdateSourceLocation;
        let mut state = self.begin(op, &request.source_location_name)?;
        let location = state
            .locations
            .get_mut(&request.source_location_name)
            .ok_or_else(|| ApiError::not_found(op, "source location not found"))?;
        location.access_configuration = request.access_configuration.clone();
        location.default_segment_delivery_configuration =
            request.default_segment_delivery_configuration.clone();
        location.http_configuration = request.http_configuration.clone();
        location.segment_delivery_configurations = request.segment_delivery_configurations.clone();
        location.last_modified_time = Some(CREATED_AT + 60.0);
        Ok(location.clone())
    }

    async fn delete_source_location(&self, name: &str) -> ApiResult<()> {
        let op = Operation::DeleteSourceLocation;
        let mut state = self.begin(op, name)?;
        if !state.locations.contains_key(name) {
            return Err(ApiError::not_found(op, "source location not found"));
        }
        if state.sources.keys().any(|(_, loc, _)| loc == name) {
            return Err(ApiError::new(
                op,
                ApiErrorKind::BadRequest,
                "source location still has sources",
            ));
        }
        state.locations.remove(name);
        Ok(())
    }

    async fn create_source(&self, request: &SourceRequest) -> ApiResult<SourceDescription> {
        let op = source_operation(request.kind, SourceVerb::Create);
        let mut state = self.begin(op, &request.name)?;
        if !state.locations.contains_key(&request.source_location_name) {
            return Err(ApiError::not_found(op, "source location not found"));
        }
        let key = (
            request.kind,
            request.source_location_name.clone(),
            request.name.clone(),
        );
        if state.sources.contains_key(&key) {
            return Err(ApiError::new(op, ApiErrorKind::Conflict, "source exists"));
        }
        let desc = SourceDescription {
            arn: source_arn(request.kind, &request.source_location_name, &request.name),
            name: request.name.clone(),
            source_location_name: request.source_location_name.clone(),
            creation_time: Some(CREATED_AT),
            http_package_configurations: request.http_package_configurations.clone(),
            last_modified_time: Some(CREATED_AT),
            tags: request.tags.clone(),
        };
        state.sources.insert(key, desc.clone());
        Ok(desc)
    }

    async fn describe_source(
        &self,
        kind: SourceKind,
        source_location_name: &str,
        name: &str,
    ) -> ApiResult<SourceDescription> {
        let op = source_operation(kind, SourceVerb::Describe);
        let state = self.begin(op, name)?;
        state
            .sources
            .get(&(kind, source_location_name.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| ApiError::not_found(op, "source not found"))
    }

    async fn update_source(&self, request: &SourceRequest) -> ApiResult<SourceDescription> {
        let op = source_operation(request.kind, SourceVerb::Update);
        let mut state = self.begin(op, &request.name)?;
        let key = (
            request.kind,
            request.source_location_name.clone(),
            request.name.clone(),
        );
        let source = state
            .sources
            .get_mut(&key)
            .ok_or_else(|| ApiError::not_found(op, "source not found"))?;
        source.http_package_configurations = request.http_package_configurations.clone();
        source.last_modified_time = Some(CREATED_AT + 60.0);
        Ok(source.clone())
    }

    async fn delete_source(
        &self,
        kind: SourceKind,
        source_location_name: &str,
        name: &str,
    ) -> ApiResult<()> {
        let op = source_operation(kind, SourceVerb::Delete);
        let mut state = self.begin(op, name)?;
        state
            .sources
            .remove(&(kind, source_location_name.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found(op, "source not found"))
    }

    async fn list_sources(
        &self,
        kind: SourceKind,
        source_location_name: &str,
    ) -> ApiResult<Vec<ChildReference>> {
        let op = source_operation(kind, SourceVerb::List);
        let state = self.begin(op, source_location_name)?;
        if !state.locations.contains_key(source_location_name) {
            return Err(ApiError::not_found(op, "source location not found"));
        }
        let mut children: Vec<_> = state
            .sources
            .keys()
            .filter(|(k, loc, _)| *k == kind && loc == source_location_name)
            .map(|(k, loc, name)| ChildReference {
                kind: *k,
                source_location_name: loc.clone(),
                name: name.clone(),
            })
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    /// Replaces every setting; tags on the request are merged into existing ones
    async fn put_playback_configuration(
        &self,
        request: &PlaybackConfigurationRequest,
    ) -> ApiResult<PlaybackConfigurationDescription> {
        let op = Operation::PutPlaybackConfiguration;
        let mut state = self.begin(op, &request.name)?;
        let mut tags = state
            .playback_configurations
            .get(&request.name)
            .map(|c| c.tags.clone())
            .unwrap_or_default();
        tags.extend(request.tags.iter().map(|(k, v)| (k.clone(), v.clone())));

        let prefix = format!("https://fake.mediatailor/{}", request.name);
        let desc = PlaybackConfigurationDescription {
            name: request.name.clone(),
            playback_configuration_arn: playback_configuration_arn(&request.name),
            ad_decision_server_url: request.ad_decision_server_url.clone(),
            cdn_configuration: request.cdn_configuration.clone(),
            dash_configuration: request.dash_configuration.clone(),
            hls_configuration: Some(HlsConfiguration {
                manifest_endpoint_prefix: Some(format!("{}/v1/master/", prefix)),
            }),
            playback_endpoint_prefix: Some(prefix.clone()),
            session_initialization_endpoint_prefix: Some(format!("{}/v1/session/", prefix)),
            slate_ad_url: request.slate_ad_url.clone(),
            tags,
            transcode_profile_name: request.transcode_profile_name.clone(),
            video_content_source_url: request.video_content_source_url.clone(),
        };
        state
            .playback_configurations
            .insert(request.name.clone(), desc.clone());
        Ok(desc)
    }

    async fn get_playback_configuration(
        &self,
        name: &str,
    ) -> ApiResult<PlaybackConfigurationDescription> {
        let op = Operation::GetPlaybackConfiguration;
        let state = self.begin(op, name)?;
        state
            .playback_configurations
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::not_found(op, "playback configuration not found"))
    }

    async fn delete_playback_configuration(&self, name: &str) -> ApiResult<()> {
        let op = Operation::DeletePlaybackConfiguration;
        let mut state = self.begin(op, name)?;
        state
            .playback_configurations
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found(op, "playback configuration not found"))
    }
}
