//! Kubernetes controllers for the MediaTailor custom resources
//!
//! Implements the controller pattern using kube-rs runtime. Each resource
//! kind gets its own `Controller`; all five run concurrently and share one
//! [`ControllerState`].

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use k8s_openapi::NamespaceResourceScope;
use kube::{
    api::{Api, ListParams, Patch, PatchParams},
    client::Client,
    runtime::{
        controller::{Action, Controller},
        finalizer::{finalizer, Event as FinalizerEvent},
        watcher::Config,
    },
    Resource, ResourceExt,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::crd::{
    format_validation_errors, Channel, ChannelObservedState, ChannelSpec, ChannelStatus,
    Condition, LiveSource, PlaybackConfiguration, PlaybackConfigurationObservedState,
    PlaybackConfigurationSpec, PlaybackConfigurationStatus, SourceDesiredState, SourceLocation,
    SourceLocationObservedState, SourceLocationSpec, SourceLocationStatus, SourceObservedState,
    SourceStatus, VodSource,
};
use crate::error::{Error, Result};
use crate::mediatailor::MediaTailorApi;

use super::channel::ChannelReconciler;
use super::conditions;
use super::finalizers::{
    CHANNEL_FINALIZER, LIVE_SOURCE_FINALIZER, PLAYBACK_CONFIGURATION_FINALIZER,
    SOURCE_LOCATION_FINALIZER, VOD_SOURCE_FINALIZER,
};
use super::identity::ResourceRef;
use super::playback_configuration::PlaybackConfigurationReconciler;
use super::source::SourceReconciler;
use super::source_location::SourceLocationReconciler;

/// Field manager used for status patches
const FIELD_MANAGER: &str = "mediatailor-operator";

/// How long a non-leader waits before looking again
const NON_LEADER_REQUEUE: Duration = Duration::from_secs(30);

/// Shared state for the controllers
pub struct ControllerState {
    pub client: Client,
    pub mediatailor: Arc<dyn MediaTailorApi>,
    /// Requeue interval after a successful apply
    pub requeue_interval: Duration,
    pub is_leader: Arc<AtomicBool>,
}

impl ControllerState {
    fn is_leader(&self) -> bool {
        self.is_leader.load(Ordering::Relaxed)
    }

    fn channels(&self) -> ChannelReconciler {
        ChannelReconciler::new(self.mediatailor.clone())
    }

    fn source_locations(&self) -> SourceLocationReconciler {
        SourceLocationReconciler::new(self.mediatailor.clone())
    }

    fn sources(&self) -> SourceReconciler {
        SourceReconciler::new(self.mediatailor.clone())
    }

    fn playback_configurations(&self) -> PlaybackConfigurationReconciler {
        PlaybackConfigurationReconciler::new(self.mediatailor.clone())
    }
}

/// Main entry point to start the controllers
pub async fn run_controller(state: Arc<ControllerState>) -> Result<()> {
    let client = state.client.clone();

    info!("Starting MediaTailor controllers");

    ensure_crd_installed::<Channel>(&client).await?;
    ensure_crd_installed::<SourceLocation>(&client).await?;
    ensure_crd_installed::<VodSource>(&client).await?;
    ensure_crd_installed::<LiveSource>(&client).await?;
    ensure_crd_installed::<PlaybackConfiguration>(&client).await?;

    let channels = Controller::new(Api::<Channel>::all(client.clone()), Config::default())
        .shutdown_on_signal()
        .run(reconcile_channel, error_policy, state.clone())
        .for_each(|res| async move {
            match res {
                Ok(obj) => debug!("Reconciled channel: {:?}", obj),
                Err(e) => warn!("Channel reconcile error: {:?}", e),
            }
        });

    let source_locations =
        Controller::new(Api::<SourceLocation>::all(client.clone()), Config::default())
            .shutdown_on_signal()
            .run(reconcile_source_location, error_policy, state.clone())
            .for_each(|res| async move {
                match res {
                    Ok(obj) => debug!("Reconciled source location: {:?}", obj),
                    Err(e) => warn!("Source location reconcile error: {:?}", e),
                }
            });

    let vod_sources = Controller::new(Api::<VodSource>::all(client.clone()), Config::default())
        .shutdown_on_signal()
        .run(reconcile_source::<VodSource>, error_policy, state.clone())
        .for_each(|res| async move {
            match res {
                Ok(obj) => debug!("Reconciled VOD source: {:?}", obj),
                Err(e) => warn!("VOD source reconcile error: {:?}", e),
            }
        });

    let live_sources = Controller::new(Api::<LiveSource>::all(client.clone()), Config::default())
        .shutdown_on_signal()
        .run(reconcile_source::<LiveSource>, error_policy, state.clone())
        .for_each(|res| async move {
            match res {
                Ok(obj) => debug!("Reconciled live source: {:?}", obj),
                Err(e) => warn!("Live source reconcile error: {:?}", e),
            }
        });

    let playback_configurations =
        Controller::new(Api::<PlaybackConfiguration>::all(client), Config::default())
            .shutdown_on_signal()
            .run(reconcile_playback_configuration, error_policy, state)
            .for_each(|res| async move {
                match res {
                    Ok(obj) => debug!("Reconciled playback configuration: {:?}", obj),
                    Err(e) => warn!("Playback configuration reconcile error: {:?}", e),
                }
            });

    futures::join!(
        channels,
        source_locations,
        vod_sources,
        live_sources,
        playback_configurations
    );
    info!("MediaTailor controllers stopped");

    Ok(())
}

async fn ensure_crd_installed<K>(client: &Client) -> Result<()>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    let api: Api<K> = Api::all(client.clone());
    match api.list(&ListParams::default().limit(1)).await {
        Ok(_) => {
            info!("{} CRD is available", K::kind(&()));
            Ok(())
        }
        Err(e) => {
            error!(
                "{} CRD not found. Please install the CRDs first: {:?}",
                K::kind(&()),
                e
            );
            Err(Error::ConfigError(format!(
                "{} CRD not installed",
                K::kind(&())
            )))
        }
    }
}

/// Error policy determines how to handle reconciliation errors
fn error_policy<K>(obj: Arc<K>, error: &Error, _ctx: Arc<ControllerState>) -> Action
where
    K: Resource<DynamicType = ()>,
{
    error!(
        "Reconciliation error for {} {}: {}",
        K::kind(&()),
        obj.name_any(),
        error
    );

    #[cfg(feature = "metrics")]
    super::metrics::inc_reconcile_error(&K::kind(&()).to_lowercase(), error_kind(error));

    // Use shorter retry for retriable errors
    let retry_duration = if error.is_retriable() {
        Duration::from_secs(15)
    } else {
        Duration::from_secs(60)
    };

    Action::requeue(retry_duration)
}

#[cfg(feature = "metrics")]
fn error_kind(error: &Error) -> &'static str {
    match error {
        Error::KubeError(_) => "kube",
        Error::Remote { .. } => "remote",
        Error::IdentityError { .. } => "identity",
        Error::ValidationError(_) => "validation",
        Error::ConfigError(_) => "config",
        Error::SerializationError(_) => "serialization",
        Error::FinalizerError(_) => "finalizer",
    }
}

#[cfg(feature = "metrics")]
fn observe_duration(controller: &str, started: std::time::Instant) {
    super::metrics::observe_reconcile_duration_seconds(controller, started.elapsed().as_secs_f64());
}

/// Whether the error came back as "not found" from the control plane
fn is_remote_not_found(error: &Error) -> bool {
    error.api_error().map_or(false, |e| e.is_not_found())
}

async fn patch_status<K>(api: &Api<K>, name: &str, status: &impl Serialize) -> Result<()>
where
    K: Clone + DeserializeOwned + Debug,
{
    let patch = serde_json::json!({ "status": status });
    api.patch_status(name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
        .await
        .map_err(Error::KubeError)?;
    Ok(())
}

/// Conditions after a failed apply, keeping everything else from the last success
fn failed_conditions(
    existing: &[Condition],
    generation: Option<i64>,
    error: &Error,
) -> Vec<Condition> {
    let mut conditions = existing.to_vec();
    let reason = match error {
        Error::ValidationError(_) => "InvalidSpec",
        Error::IdentityError { .. } => "InvalidIdentifier",
        Error::Remote { .. } => "RemoteCallFailed",
        _ => "ReconcileFailed",
    };
    conditions::mark_failed(
        &mut conditions,
        generation,
        reason,
        &error.to_string(),
        error.is_retriable(),
    );
    conditions
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

#[instrument(skip(ctx, obj), fields(name = %obj.name_any(), namespace = obj.namespace()))]
async fn reconcile_channel(obj: Arc<Channel>, ctx: Arc<ControllerState>) -> Result<Action> {
    if !ctx.is_leader() {
        debug!("Not the leader, skipping channel {}", obj.name_any());
        return Ok(Action::requeue(NON_LEADER_REQUEUE));
    }

    #[cfg(feature = "metrics")]
    let started = std::time::Instant::now();
    let namespace = obj.namespace().unwrap_or_else(|| "default".to_string());
    let api: Api<Channel> = Api::namespaced(ctx.client.clone(), &namespace);

    let result = finalizer(&api, CHANNEL_FINALIZER, obj, |event| async {
        match event {
            FinalizerEvent::Apply(channel) => apply_channel(&ctx, &api, &channel).await,
            FinalizerEvent::Cleanup(channel) => cleanup_channel(&ctx, &channel).await,
        }
    })
    .await
    .map_err(Error::from);

    #[cfg(feature = "metrics")]
    observe_duration("channel", started);
    result
}

/// Create, adopt, update or replace the remote channel
async fn create_or_update_channel(
    reconciler: &ChannelReconciler,
    desired: &ChannelSpec,
    status: &ChannelStatus,
) -> Result<ChannelObservedState> {
    let mut applied_tags = status.applied_tags.clone();
    let mut applied_spec = status.applied_spec.clone();
    if let Some(applied) = status.applied_name() {
        if applied != desired.channel_name {
            info!(
                "Channel name changed from {} to {}, replacing the remote channel",
                applied, desired.channel_name
            );
            if reconciler.exists(applied).await? {
                reconciler.delete(applied).await?;
            }
            // The recorded tags and spec belong to the old channel.
            applied_tags = None;
            applied_spec = None;
        }
    }

    match reconciler
        .read(&ResourceRef::by_name(&desired.channel_name))
        .await
    {
        Ok(current) => {
            let previous = ChannelSpec {
                tags: applied_tags.unwrap_or(current.tags),
                ..applied_spec.unwrap_or_else(|| desired.clone())
            };
            reconciler.update(&previous, desired).await
        }
        Err(e) if is_remote_not_found(&e) => reconciler.create(desired).await,
        Err(e) => Err(e),
    }
}

#[instrument(skip(ctx, api, channel), fields(name = %channel.name_any()))]
async fn apply_channel(
    ctx: &ControllerState,
    api: &Api<Channel>,
    channel: &Channel,
) -> Result<Action> {
    let name = channel.name_any();
    let generation = channel.metadata.generation;
    let previous_status = channel.status.clone().unwrap_or_default();

    let outcome = match channel.spec.validate() {
        Err(errors) => Err(Error::ValidationError(format_validation_errors(&errors))),
        Ok(()) => {
            create_or_update_channel(&ctx.channels(), &channel.spec, &previous_status).await
        }
    };

    match outcome {
        Ok(observed) => {
            let message = format!("Channel {} is {}", observed.name, observed.channel_state);
            info!("{}", message);

            #[cfg(feature = "metrics")]
            super::metrics::set_channel_running(
                &channel.namespace().unwrap_or_default(),
                &name,
                observed.channel_state == crate::crd::ChannelState::Running,
            );

            let mut conditions = previous_status.conditions.clone();
            conditions::mark_ready(&mut conditions, generation, "Reconciled", &message);
            let status = ChannelStatus {
                phase: "Ready".to_string(),
                message: Some(message),
                observed_generation: generation,
                observed: Some(observed),
                applied_tags: Some(channel.spec.tags.clone()),
                applied_spec: Some(channel.spec.clone()),
                conditions,
            };
            patch_status(api, &name, &status).await?;
            Ok(Action::requeue(ctx.requeue_interval))
        }
        Err(e) => {
            let status = ChannelStatus {
                phase: "Failed".to_string(),
                message: Some(e.to_string()),
                conditions: failed_conditions(&previous_status.conditions, generation, &e),
                ..previous_status
            };
            if let Err(patch_err) = patch_status(api, &name, &status).await {
                warn!("Failed to record failure on {}: {}", name, patch_err);
            }
            Err(e)
        }
    }
}

#[instrument(skip(ctx, channel), fields(name = %channel.name_any()))]
async fn cleanup_channel(ctx: &ControllerState, channel: &Channel) -> Result<Action> {
    let remote_name = channel
        .status
        .as_ref()
        .and_then(|s| s.applied_name())
        .unwrap_or(channel.spec.channel_name.as_str())
        .to_string();
    let reconciler = ctx.channels();

    if reconciler.exists(&remote_name).await? {
        info!("Deleting remote channel {}", remote_name);
        reconciler.delete(&remote_name).await?;
    } else {
        info!("Remote channel {} already gone", remote_name);
    }

    #[cfg(feature = "metrics")]
    super::metrics::remove_channel(
        &channel.namespace().unwrap_or_default(),
        &channel.name_any(),
    );

    Ok(Action::await_change())
}

// ---------------------------------------------------------------------------
// SourceLocation
// ---------------------------------------------------------------------------

#[instrument(skip(ctx, obj), fields(name = %obj.name_any(), namespace = obj.namespace()))]
async fn reconcile_source_location(
    obj: Arc<SourceLocation>,
    ctx: Arc<ControllerState>,
) -> Result<Action> {
    if !ctx.is_leader() {
        debug!("Not the leader, skipping source location {}", obj.name_any());
        return Ok(Action::requeue(NON_LEADER_REQUEUE));
    }

    #[cfg(feature = "metrics")]
    let started = std::time::Instant::now();
    let namespace = obj.namespace().unwrap_or_else(|| "default".to_string());
    let api: Api<SourceLocation> = Api::namespaced(ctx.client.clone(), &namespace);

    let result = finalizer(&api, SOURCE_LOCATION_FINALIZER, obj, |event| async {
        match event {
            FinalizerEvent::Apply(location) => apply_source_location(&ctx, &api, &location).await,
            FinalizerEvent::Cleanup(location) => cleanup_source_location(&ctx, &location).await,
        }
    })
    .await
    .map_err(Error::from);

    #[cfg(feature = "metrics")]
    observe_duration("sourcelocation", started);
    result
}

async fn create_or_update_source_location(
    reconciler: &SourceLocationReconciler,
    desired: &SourceLocationSpec,
    status: &SourceLocationStatus,
) -> Result<SourceLocationObservedState> {
    let mut applied_tags = status.applied_tags.clone();
    if let Some(applied) = status.applied_name() {
        if applied != desired.source_location_name {
            info!(
                "Source location name changed from {} to {}, replacing it",
                applied, desired.source_location_name
            );
            if reconciler.exists(applied).await? {
                reconciler.delete(applied).await?;
            }
            applied_tags = None;
        }
    }

    match reconciler
        .read(&ResourceRef::by_name(&desired.source_location_name))
        .await
    {
        Ok(current) => {
            let previous = SourceLocationSpec {
                tags: applied_tags.unwrap_or(current.tags),
                ..desired.clone()
            };
            reconciler.update(&previous, desired).await
        }
        Err(e) if is_remote_not_found(&e) => reconciler.create(desired).await,
        Err(e) => Err(e),
    }
}

async fn apply_source_location(
    ctx: &ControllerState,
    api: &Api<SourceLocation>,
    location: &SourceLocation,
) -> Result<Action> {
    let name = location.name_any();
    let generation = location.metadata.generation;
    let previous_status = location.status.clone().unwrap_or_default();

    let outcome = match location.spec.validate() {
        Err(errors) => Err(Error::ValidationError(format_validation_errors(&errors))),
        Ok(()) => {
            create_or_update_source_location(&ctx.source_locations(), &location.spec, &previous_status)
                .await
        }
    };

    match outcome {
        Ok(observed) => {
            let message = format!("Source location {} is in sync", observed.name);
            let mut conditions = previous_status.conditions.clone();
            conditions::mark_ready(&mut conditions, generation, "Reconciled", &message);
            let status = SourceLocationStatus {
                phase: "Ready".to_string(),
                message: Some(message),
                observed_generation: generation,
                observed: Some(observed),
                applied_tags: Some(location.spec.tags.clone()),
                conditions,
            };
            patch_status(api, &name, &status).await?;
            Ok(Action::requeue(ctx.requeue_interval))
        }
        Err(e) => {
            let status = SourceLocationStatus {
                phase: "Failed".to_string(),
                message: Some(e.to_string()),
                conditions: failed_conditions(&previous_status.conditions, generation, &e),
                ..previous_status
            };
            if let Err(patch_err) = patch_status(api, &name, &status).await {
                warn!("Failed to record failure on {}: {}", name, patch_err);
            }
            Err(e)
        }
    }
}

async fn cleanup_source_location(
    ctx: &ControllerState,
    location: &SourceLocation,
) -> Result<Action> {
    let remote_name = location
        .status
        .as_ref()
        .and_then(|s| s.applied_name())
        .unwrap_or(location.spec.source_location_name.as_str())
        .to_string();
    let reconciler = ctx.source_locations();

    if reconciler.exists(&remote_name).await? {
        info!("Deleting remote source location {} and its sources", remote_name);
        reconciler.delete(&remote_name).await?;
    } else {
        info!("Remote source location {} already gone", remote_name);
    }

    Ok(Action::await_change())
}

// ---------------------------------------------------------------------------
// VodSource / LiveSource
// ---------------------------------------------------------------------------

/// Custom resources that declare a VOD or live source
pub trait SourceResource {
    const FINALIZER: &'static str;

    fn desired(&self) -> SourceDesiredState;

    fn source_status(&self) -> Option<&SourceStatus>;
}

impl SourceResource for VodSource {
    const FINALIZER: &'static str = VOD_SOURCE_FINALIZER;

    fn desired(&self) -> SourceDesiredState {
        self.spec.desired()
    }

    fn source_status(&self) -> Option<&SourceStatus> {
        self.status.as_ref()
    }
}

impl SourceResource for LiveSource {
    const FINALIZER: &'static str = LIVE_SOURCE_FINALIZER;

    fn desired(&self) -> SourceDesiredState {
        self.spec.desired()
    }

    fn source_status(&self) -> Option<&SourceStatus> {
        self.status.as_ref()
    }
}

#[instrument(skip(ctx, obj), fields(kind = %K::kind(&()), name = %obj.name_any(), namespace = obj.namespace()))]
async fn reconcile_source<K>(obj: Arc<K>, ctx: Arc<ControllerState>) -> Result<Action>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + SourceResource
        + Clone
        + DeserializeOwned
        + Serialize
        + Debug
        + Send
        + Sync
        + 'static,
{
    if !ctx.is_leader() {
        debug!("Not the leader, skipping {} {}", K::kind(&()), obj.name_any());
        return Ok(Action::requeue(NON_LEADER_REQUEUE));
    }

    #[cfg(feature = "metrics")]
    let started = std::time::Instant::now();
    let namespace = obj.namespace().unwrap_or_else(|| "default".to_string());
    let api: Api<K> = Api::namespaced(ctx.client.clone(), &namespace);

    let result = finalizer(&api, K::FINALIZER, obj, |event| async {
        match event {
            FinalizerEvent::Apply(source) => apply_source(&ctx, &api, source.as_ref()).await,
            FinalizerEvent::Cleanup(source) => cleanup_source(&ctx, source.as_ref()).await,
        }
    })
    .await
    .map_err(Error::from);

    #[cfg(feature = "metrics")]
    observe_duration(&K::kind(&()).to_lowercase(), started);
    result
}

async fn create_or_update_source(
    reconciler: &SourceReconciler,
    desired: &SourceDesiredState,
    status: &SourceStatus,
) -> Result<SourceObservedState> {
    let mut applied_tags = status.applied_tags.clone();
    if let Some((location, name)) = status.applied_identity() {
        if (location, name) != (desired.source_location_name.as_str(), desired.name.as_str()) {
            info!(
                "{} moved from {}/{} to {}/{}, replacing it",
                desired.kind, location, name, desired.source_location_name, desired.name
            );
            if reconciler.exists(desired.kind, location, name).await? {
                reconciler.delete(desired.kind, location, name).await?;
            }
            applied_tags = None;
        }
    }

    match reconciler
        .read(desired.kind, &desired.source_location_name, &desired.name)
        .await
    {
        Ok(current) => {
            let previous = SourceDesiredState {
                tags: applied_tags.unwrap_or(current.tags),
                ..desired.clone()
            };
            reconciler.update(&previous, desired).await
        }
        Err(e) if is_remote_not_found(&e) => reconciler.create(desired).await,
        Err(e) => Err(e),
    }
}

async fn apply_source<K>(ctx: &ControllerState, api: &Api<K>, source: &K) -> Result<Action>
where
    K: Resource<DynamicType = ()> + SourceResource + Clone + DeserializeOwned + Debug,
{
    let name = source.name_any();
    let generation = source.meta().generation;
    let previous_status = source.source_status().cloned().unwrap_or_default();
    let desired = source.desired();

    let outcome = match desired.validate() {
        Err(errors) => Err(Error::ValidationError(format_validation_errors(&errors))),
        Ok(()) => {
            create_or_update_source(&ctx.sources(), &desired, &previous_status).await
        }
    };

    match outcome {
        Ok(observed) => {
            let message = format!(
                "{} {}/{} is in sync",
                desired.kind, observed.source_location_name, observed.name
            );
            let mut conditions = previous_status.conditions.clone();
            conditions::mark_ready(&mut conditions, generation, "Reconciled", &message);
            let status = SourceStatus {
                phase: "Ready".to_string(),
                message: Some(message),
                observed_generation: generation,
                observed: Some(observed),
                applied_tags: Some(desired.tags.clone()),
                conditions,
            };
            patch_status(api, &name, &status).await?;
            Ok(Action::requeue(ctx.requeue_interval))
        }
        Err(e) => {
            let status = SourceStatus {
                phase: "Failed".to_string(),
                message: Some(e.to_string()),
                conditions: failed_conditions(&previous_status.conditions, generation, &e),
                ..previous_status
            };
            if let Err(patch_err) = patch_status(api, &name, &status).await {
                warn!("Failed to record failure on {}: {}", name, patch_err);
            }
            Err(e)
        }
    }
}

async fn cleanup_source<K: SourceResource>(ctx: &ControllerState, source: &K) -> Result<Action> {
    let desired = source.desired();
    let (location, name) = source
        .source_status()
        .and_then(|s| s.applied_identity())
        .map(|(l, n)| (l.to_string(), n.to_string()))
        .unwrap_or((desired.source_location_name, desired.name));
    let reconciler = ctx.sources();

    if reconciler.exists(desired.kind, &location, &name).await? {
        reconciler.delete(desired.kind, &location, &name).await?;
    } else {
        info!("Remote {} {}/{} already gone", desired.kind, location, name);
    }

    Ok(Action::await_change())
}

// ---------------------------------------------------------------------------
// PlaybackConfiguration
// ---------------------------------------------------------------------------

#[instrument(skip(ctx, obj), fields(name = %obj.name_any(), namespace = obj.namespace()))]
async fn reconcile_playback_configuration(
    obj: Arc<PlaybackConfiguration>,
    ctx: Arc<ControllerState>,
) -> Result<Action> {
    if !ctx.is_leader() {
        debug!(
            "Not the leader, skipping playback configuration {}",
            obj.name_any()
        );
        return Ok(Action::requeue(NON_LEADER_REQUEUE));
    }

    #[cfg(feature = "metrics")]
    let started = std::time::Instant::now();
    let namespace = obj.namespace().unwrap_or_else(|| "default".to_string());
    let api: Api<PlaybackConfiguration> = Api::namespaced(ctx.client.clone(), &namespace);

    let result = finalizer(&api, PLAYBACK_CONFIGURATION_FINALIZER, obj, |event| async {
        match event {
            FinalizerEvent::Apply(config) => {
                apply_playback_configuration(&ctx, &api, &config).await
            }
            FinalizerEvent::Cleanup(config) => cleanup_playback_configuration(&ctx, &config).await,
        }
    })
    .await
    .map_err(Error::from);

    #[cfg(feature = "metrics")]
    observe_duration("playbackconfiguration", started);
    result
}

async fn create_or_update_playback_configuration(
    reconciler: &PlaybackConfigurationReconciler,
    desired: &PlaybackConfigurationSpec,
    status: &PlaybackConfigurationStatus,
) -> Result<PlaybackConfigurationObservedState> {
    let mut applied_tags = status.applied_tags.clone();
    if let Some(applied) = status.applied_name() {
        if applied != desired.configuration_name {
            info!(
                "Playback configuration name changed from {} to {}, replacing it",
                applied, desired.configuration_name
            );
            if reconciler.exists(applied).await? {
                reconciler.delete(applied).await?;
            }
            applied_tags = None;
        }
    }

    match reconciler
        .read(&ResourceRef::by_name(&desired.configuration_name))
        .await
    {
        Ok(current) => {
            let previous = PlaybackConfigurationSpec {
                tags: applied_tags.unwrap_or(current.tags),
                ..desired.clone()
            };
            reconciler.update(&previous, desired).await
        }
        Err(e) if is_remote_not_found(&e) => reconciler.create(desired).await,
        Err(e) => Err(e),
    }
}

async fn apply_playback_configuration(
    ctx: &ControllerState,
    api: &Api<PlaybackConfiguration>,
    config: &PlaybackConfiguration,
) -> Result<Action> {
    let name = config.name_any();
    let generation = config.metadata.generation;
    let previous_status = config.status.clone().unwrap_or_default();

    let outcome = match config.spec.validate() {
        Err(errors) => Err(Error::ValidationError(format_validation_errors(&errors))),
        Ok(()) => {
            create_or_update_playback_configuration(
                &ctx.playback_configurations(),
                &config.spec,
                &previous_status,
            )
            .await
        }
    };

    match outcome {
        Ok(observed) => {
            let message = format!("Playback configuration {} is in sync", observed.name);
            let mut conditions = previous_status.conditions.clone();
            conditions::mark_ready(&mut conditions, generation, "Reconciled", &message);
            let status = PlaybackConfigurationStatus {
                phase: "Ready".to_string(),
                message: Some(message),
                observed_generation: generation,
                observed: Some(observed),
                applied_tags: Some(config.spec.tags.clone()),
                conditions,
            };
            patch_status(api, &name, &status).await?;
            Ok(Action::requeue(ctx.requeue_interval))
        }
        Err(e) => {
            let status = PlaybackConfigurationStatus {
                phase: "Failed".to_string(),
                message: Some(e.to_string()),
                conditions: failed_conditions(&previous_status.conditions, generation, &e),
                ..previous_status
            };
            if let Err(patch_err) = patch_status(api, &name, &status).await {
                warn!("Failed to record failure on {}: {}", name, patch_err);
            }
            Err(e)
        }
    }
}

async fn cleanup_playback_configuration(
    ctx: &ControllerState,
    config: &PlaybackConfiguration,
) -> Result<Action> {
    let remote_name = config
        .status
        .as_ref()
        .and_then(|s| s.applied_name())
        .unwrap_or(config.spec.configuration_name.as_str())
        .to_string();
    let reconciler = ctx.playback_configurations();

    if reconciler.exists(&remote_name).await? {
        reconciler.delete(&remote_name).await?;
    } else {
        info!("Remote playback configuration {} already gone", remote_name);
    }

    Ok(Action::await_change())
}
