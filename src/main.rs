use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use k8s_openapi::api::coordination::v1::Lease;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::MicroTime;
use kube::api::{Api, ListParams, ObjectMeta, Patch, PatchParams, PostParams};
use mediatailor_operator::config::{ConfigLayer, LogFormat, OperatorConfig};
use mediatailor_operator::crd::{
    Channel, LiveSource, PlaybackConfiguration, SourceLocation, VodSource,
};
use mediatailor_operator::mediatailor::HttpMediaTailorClient;
use mediatailor_operator::{controller, Error};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the operator
    Run(RunArgs),
    /// Show version and build information
    Version,
    /// Show the MediaTailor resources managed in a namespace
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Optional TOML config file; flags and environment variables override it
    #[arg(long, env = "MEDIATAILOR_OPERATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the MediaTailor control plane
    #[arg(long, env = "MEDIATAILOR_ENDPOINT")]
    endpoint: Option<String>,

    /// Bearer token for the control plane
    #[arg(long, env = "MEDIATAILOR_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Operator namespace, used for the leader election lease
    #[arg(long, env = "OPERATOR_NAMESPACE")]
    namespace: Option<String>,

    /// Seconds between periodic reconciles of an in-sync resource
    #[arg(long, env = "REQUEUE_SECONDS")]
    requeue_seconds: Option<u64>,

    /// Timeout for each control plane request
    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS")]
    request_timeout_seconds: Option<u64>,

    #[arg(long, env = "LOG_FORMAT", value_enum)]
    log_format: Option<LogFormat>,

    /// Port for the REST API
    #[arg(long, env = "API_PORT")]
    api_port: Option<u16>,
}

impl RunArgs {
    fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            endpoint: self.endpoint.clone(),
            token: self.token.clone(),
            namespace: self.namespace.clone(),
            requeue_seconds: self.requeue_seconds,
            request_timeout_seconds: self.request_timeout_seconds,
            log_format: self.log_format,
            api_port: self.api_port,
        }
    }
}

#[derive(Parser, Debug)]
struct InfoArgs {
    #[arg(long, env = "OPERATOR_NAMESPACE", default_value = "default")]
    namespace: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    match args.command {
        Commands::Version => {
            println!("MediaTailor Operator v{}", env!("CARGO_PKG_VERSION"));
            println!("Build Date: {}", env!("BUILD_DATE"));
            println!("Git SHA: {}", env!("GIT_SHA"));
            println!("Rust Version: {}", env!("RUST_VERSION"));
            Ok(())
        }
        Commands::Info(info_args) => run_info(info_args).await,
        Commands::Run(run_args) => run_operator(run_args).await,
    }
}

async fn run_info(args: InfoArgs) -> Result<(), Error> {
    let client = kube::Client::try_default()
        .await
        .map_err(Error::KubeError)?;
    let params = ListParams::default();

    let channels: Api<Channel> = Api::namespaced(client.clone(), &args.namespace);
    let locations: Api<SourceLocation> = Api::namespaced(client.clone(), &args.namespace);
    let vod_sources: Api<VodSource> = Api::namespaced(client.clone(), &args.namespace);
    let live_sources: Api<LiveSource> = Api::namespaced(client.clone(), &args.namespace);
    let playback: Api<PlaybackConfiguration> = Api::namespaced(client, &args.namespace);

    println!("Channels: {}", channels.list(&params).await?.items.len());
    println!("Source locations: {}", locations.list(&params).await?.items.len());
    println!("VOD sources: {}", vod_sources.list(&params).await?.items.len());
    println!("Live sources: {}", live_sources.list(&params).await?.items.len());
    println!(
        "Playback configurations: {}",
        playback.list(&params).await?.items.len()
    );
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).init(),
    }
}

async fn run_operator(args: RunArgs) -> Result<(), Error> {
    let file_layer = args
        .config
        .as_deref()
        .map(ConfigLayer::from_file)
        .transpose()?;
    let config = OperatorConfig::resolve(args.layer(), file_layer)?;

    init_tracing(config.log_format);

    info!(
        "Starting MediaTailor Operator v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Using MediaTailor endpoint {}", config.endpoint);

    let mediatailor = HttpMediaTailorClient::new(config.client_config())?;

    let client = kube::Client::try_default()
        .await
        .map_err(Error::KubeError)?;

    info!("Connected to Kubernetes cluster");

    // Leader election configuration
    let leader_namespace =
        std::env::var("POD_NAMESPACE").unwrap_or_else(|_| config.namespace.clone());
    let holder_identity = std::env::var("HOSTNAME").unwrap_or_else(|_| {
        hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown-host".to_string())
    });

    info!("Leader election using holder ID: {}", holder_identity);

    let is_leader = Arc::new(AtomicBool::new(false));

    {
        let lease_client = client.clone();
        let lease_ns = leader_namespace.clone();
        let identity = holder_identity.clone();
        let is_leader_bg = Arc::clone(&is_leader);

        tokio::spawn(async move {
            run_leader_election(lease_client, &lease_ns, &identity, is_leader_bg).await;
        });
    }

    let state = Arc::new(controller::ControllerState {
        client: client.clone(),
        mediatailor: Arc::new(mediatailor),
        requeue_interval: config.requeue_interval,
        is_leader: Arc::clone(&is_leader),
    });

    #[cfg(feature = "rest-api")]
    {
        let api_state = state.clone();
        let port = config.api_port;
        tokio::spawn(async move {
            if let Err(e) = mediatailor_operator::rest_api::run_server(api_state, port).await {
                tracing::error!("REST API server error: {:?}", e);
            }
        });
    }

    controller::run_controller(state).await
}

const LEASE_NAME: &str = "mediatailor-operator-leader";
const LEASE_DURATION_SECS: i32 = 15;
const RENEW_INTERVAL: std::time::Duration = std::time::Duration::from_secs(10);
const RETRY_INTERVAL: std::time::Duration = std::time::Duration::from_secs(5);

async fn run_leader_election(
    client: kube::Client,
    namespace: &str,
    identity: &str,
    is_leader: Arc<AtomicBool>,
) {
    let leases: Api<Lease> = Api::namespaced(client, namespace);

    loop {
        match try_acquire_or_renew(&leases, namespace, identity).await {
            Ok(true) => {
                if !is_leader.load(Ordering::Relaxed) {
                    info!("Acquired leadership for lease {}", LEASE_NAME);
                }
                is_leader.store(true, Ordering::Relaxed);
                tokio::time::sleep(RENEW_INTERVAL).await;
            }
            Ok(false) => {
                if is_leader.load(Ordering::Relaxed) {
                    warn!("Lost leadership for lease {}", LEASE_NAME);
                }
                is_leader.store(false, Ordering::Relaxed);
                tokio::time::sleep(RETRY_INTERVAL).await;
            }
            Err(e) => {
                warn!("Leader election error: {:?}", e);
                is_leader.store(false, Ordering::Relaxed);
                tokio::time::sleep(RETRY_INTERVAL).await;
            }
        }
    }
}

async fn try_acquire_or_renew(
    leases: &Api<Lease>,
    namespace: &str,
    identity: &str,
) -> Result<bool, kube::Error> {
    let now = Utc::now();

    match leases.get(LEASE_NAME).await {
        Ok(existing) => {
            let spec = existing.spec.as_ref();
            let current_holder = spec.and_then(|s| s.holder_identity.as_deref());

            if current_holder == Some(identity) {
                let patch = serde_json::json!({
                    "spec": {
                        "renewTime": MicroTime(now),
                        "leaseDurationSeconds": LEASE_DURATION_SECS,
                    }
                });
                leases
                    .patch(LEASE_NAME, &PatchParams::default(), &Patch::Merge(&patch))
                    .await?;
                return Ok(true);
            }

            let expired = spec
                .and_then(|s| s.renew_time.as_ref())
                .map(|renew| {
                    let duration = spec
                        .and_then(|s| s.lease_duration_seconds)
                        .unwrap_or(LEASE_DURATION_SECS);
                    now > renew.0 + chrono::Duration::seconds(i64::from(duration))
                })
                .unwrap_or(true);

            if !expired {
                return Ok(false);
            }

            info!("Lease held by {:?} has expired, taking over", current_holder);
            let patch = serde_json::json!({
                "spec": {
                    "holderIdentity": identity,
                    "acquireTime": MicroTime(now),
                    "renewTime": MicroTime(now),
                    "leaseDurationSeconds": LEASE_DURATION_SECS,
                }
            });
            leases
                .patch(LEASE_NAME, &PatchParams::default(), &Patch::Merge(&patch))
                .await?;
            Ok(true)
        }
        Err(kube::Error::Api(err)) if err.code == 404 => {
            let lease = Lease {
                metadata: ObjectMeta {
                    name: Some(LEASE_NAME.to_string()),
                    namespace: Some(namespace.to_string()),
                    ..Default::default()
                },
                spec: Some(k8s_openapi::api::coordination::v1::LeaseSpec {
                    holder_identity: Some(identity.to_string()),
                    acquire_time: Some(MicroTime(now)),
                    renew_time: Some(MicroTime(now)),
                    lease_duration_seconds: Some(LEASE_DURATION_SECS),
                    ..Default::default()
                }),
            };
            leases.create(&PostParams::default(), &lease).await?;
            info!("Created lease {} with holder {}", LEASE_NAME, identity);
            Ok(true)
        }
        Err(e) => Err(e),
    }
}
