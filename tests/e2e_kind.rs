use std::error::Error;
use std::process::{Command, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};

/// Returns true if the given binary is accessible in PATH.
fn tool_available(binary: &str) -> bool {
    Command::new(binary)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

const OPERATOR_NAMESPACE: &str = "mediatailor-system";
const TEST_NAMESPACE: &str = "mediatailor-e2e";
const OPERATOR_NAME: &str = "mediatailor-operator";
const LOCATION_NAME: &str = "e2e-origin";
const SOURCE_NAME: &str = "e2e-slate";
const CHANNEL_NAME: &str = "e2e-channel";

// ---------------------------------------------------------------------------
// Full reconciliation on a Kind cluster against a real control plane.
//
// Needs MEDIATAILOR_ENDPOINT (and MEDIATAILOR_TOKEN if the endpoint wants one).
// Run with: cargo test --test e2e_kind -- --ignored
// ---------------------------------------------------------------------------

/// 1. Start (or reuse) a Kind cluster and install the CRDs printed by `crdgen`.
/// 2. Deploy the operator.
/// 3. Apply a SourceLocation, a VodSource and a stopped Channel; wait for Ready.
/// 4. Ask for the channel to run and wait until it is observed running.
/// 5. Delete everything and wait for the finalizers to release the objects.
#[test]
#[ignore]
fn e2e_mediatailor_reconciliation() -> Result<(), Box<dyn Error>> {
    for tool in &["kind", "kubectl", "docker"] {
        if !tool_available(tool) {
            eprintln!("Skipping e2e test: `{tool}` not found in PATH.");
            return Ok(());
        }
    }
    let endpoint = match std::env::var("MEDIATAILOR_ENDPOINT") {
        Ok(endpoint) => endpoint,
        Err(_) => {
            eprintln!("Skipping e2e test: MEDIATAILOR_ENDPOINT is not set.");
            return Ok(());
        }
    };
    let token = std::env::var("MEDIATAILOR_TOKEN").unwrap_or_default();

    let cluster_name =
        std::env::var("KIND_CLUSTER_NAME").unwrap_or_else(|_| "mediatailor-e2e".into());
    ensure_kind_cluster(&cluster_name)?;

    // ── Install the CRDs ──────────────────────────────────────────────────────
    let crds = run_cmd(env!("CARGO_BIN_EXE_crdgen"), &[])?;
    kubectl_apply(&crds)?;

    // ── Deploy the operator ──────────────────────────────────────────────────
    let image =
        std::env::var("E2E_OPERATOR_IMAGE").unwrap_or_else(|_| "mediatailor-operator:e2e".into());
    if env_true("E2E_BUILD_IMAGE", true) {
        run_cmd("docker", &["build", "-t", &image, "."])?;
    }
    if env_true("E2E_LOAD_IMAGE", true) {
        run_cmd(
            "kind",
            &["load", "docker-image", &image, "--name", &cluster_name],
        )?;
    }

    let operator_yaml = operator_manifest(&image, &endpoint, &token);
    let _cleanup = Cleanup::new(operator_yaml.clone());

    ensure_namespace(OPERATOR_NAMESPACE)?;
    kubectl_apply(&operator_yaml)?;
    run_cmd(
        "kubectl",
        &[
            "rollout",
            "status",
            &format!("deployment/{}", OPERATOR_NAME),
            "-n",
            OPERATOR_NAMESPACE,
            "--timeout=180s",
        ],
    )?;
    ensure_namespace(TEST_NAMESPACE)?;

    // ── Declare the resources ─────────────────────────────────────────────────
    kubectl_apply(&source_location_manifest())?;
    wait_for_phase("sourcelocation", LOCATION_NAME, "Ready")?;

    kubectl_apply(&vod_source_manifest())?;
    wait_for_phase("vodsource", SOURCE_NAME, "Ready")?;

    kubectl_apply(&channel_manifest("STOPPED"))?;
    wait_for_phase("channel", CHANNEL_NAME, "Ready")?;
    assert_eq!(
        get_field("channel", CHANNEL_NAME, "{.status.observed.channelState}")?,
        "STOPPED"
    );

    // ── Start the channel ─────────────────────────────────────────────────────
    kubectl_apply(&channel_manifest("RUNNING"))?;
    wait_for("channel observed running", Duration::from_secs(180), || {
        Ok(
            get_field("channel", CHANNEL_NAME, "{.status.observed.channelState}")
                .unwrap_or_default()
                == "RUNNING",
        )
    })?;

    // ── Delete and verify the finalizers complete ─────────────────────────────
    for (kind, name) in [
        ("channel", CHANNEL_NAME),
        ("sourcelocation", LOCATION_NAME),
    ] {
        run_cmd(
            "kubectl",
            &[
                "delete",
                kind,
                name,
                "-n",
                TEST_NAMESPACE,
                "--timeout=180s",
                "--wait=true",
            ],
        )?;
    }

    wait_for("resources released", Duration::from_secs(90), || {
        let channel = run_cmd(
            "kubectl",
            &["get", "channel", CHANNEL_NAME, "-n", TEST_NAMESPACE],
        );
        let location = run_cmd(
            "kubectl",
            &["get", "sourcelocation", LOCATION_NAME, "-n", TEST_NAMESPACE],
        );
        Ok(channel.is_err() && location.is_err())
    })?;

    Ok(())
}

fn source_location_manifest() -> String {
    format!(
        r#"apiVersion: mediatailor.aws/v1alpha1
kind: SourceLocation
metadata:
  name: {name}
  namespace: {namespace}
spec:
  sourceLocationName: {name}
  httpConfigurationUrl: "https://origin.example.com"
  tags:
    suite: e2e
"#,
        name = LOCATION_NAME,
        namespace = TEST_NAMESPACE,
    )
}

fn vod_source_manifest() -> String {
    format!(
        r#"apiVersion: mediatailor.aws/v1alpha1
kind: VodSource
metadata:
  name: {name}
  namespace: {namespace}
spec:
  sourceLocationName: {location}
  vodSourceName: {name}
  httpPackageConfigurations:
    - path: /slate/index.m3u8
      sourceGroup: hls
      type: HLS
"#,
        name = SOURCE_NAME,
        location = LOCATION_NAME,
        namespace = TEST_NAMESPACE,
    )
}

fn channel_manifest(state: &str) -> String {
    format!(
        r#"apiVersion: mediatailor.aws/v1alpha1
kind: Channel
metadata:
  name: {name}
  namespace: {namespace}
spec:
  channelName: {name}
  playbackMode: LOOP
  channelState: {state}
  outputs:
    - manifestName: index
      sourceGroup: hls
      hlsManifestWindowSeconds: 30
  tags:
    suite: e2e
"#,
        name = CHANNEL_NAME,
        namespace = TEST_NAMESPACE,
        state = state,
    )
}

fn operator_manifest(image: &str, endpoint: &str, token: &str) -> String {
    format!(
        r#"---
apiVersion: v1
kind: ServiceAccount
metadata:
  name: {operator_name}
  namespace: {operator_namespace}
---
apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRole
metadata:
  name: {operator_name}
rules:
  - apiGroups: ["mediatailor.aws"]
    resources:
      - "channels"
      - "sourcelocations"
      - "vodsources"
      - "livesources"
      - "playbackconfigurations"
    verbs: ["get", "list", "watch", "update", "patch"]
  - apiGroups: ["mediatailor.aws"]
    resources:
      - "channels/status"
      - "sourcelocations/status"
      - "vodsources/status"
      - "livesources/status"
      - "playbackconfigurations/status"
    verbs: ["get", "update", "patch"]
  - apiGroups: ["coordination.k8s.io"]
    resources: ["leases"]
    verbs: ["get", "list", "watch", "create", "update", "patch"]
---
apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRoleBinding
metadata:
  name: {operator_name}
roleRef:
  apiGroup: rbac.authorization.k8s.io
  kind: ClusterRole
  name: {operator_name}
subjects:
  - kind: ServiceAccount
    name: {operator_name}
    namespace: {operator_namespace}
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: {operator_name}
  namespace: {operator_namespace}
spec:
  replicas: 1
  selector:
    matchLabels:
      app: {operator_name}
  template:
    metadata:
      labels:
        app: {operator_name}
    spec:
      serviceAccountName: {operator_name}
      containers:
        - name: operator
          image: {image}
          imagePullPolicy: IfNotPresent
          args: ["run"]
          env:
            - name: OPERATOR_NAMESPACE
              value: {operator_namespace}
            - name: MEDIATAILOR_ENDPOINT
              value: "{endpoint}"
            - name: MEDIATAILOR_TOKEN
              value: "{token}"
            - name: REQUEUE_SECONDS
              value: "30"
"#,
        operator_name = OPERATOR_NAME,
        operator_namespace = OPERATOR_NAMESPACE,
        image = image,
        endpoint = endpoint,
        token = token,
    )
}

struct Cleanup {
    operator_manifest: String,
}

impl Cleanup {
    fn new(operator_manifest: String) -> Self {
        Self { operator_manifest }
    }
}

impl Drop for Cleanup {
    fn drop(&mut self) {
        // Custom resources go first so the operator can still run their finalizers.
        for (kind, name) in [
            ("channel", CHANNEL_NAME),
            ("vodsource", SOURCE_NAME),
            ("sourcelocation", LOCATION_NAME),
        ] {
            let _ = run_cmd_quiet(
                "kubectl",
                &[
                    "delete",
                    kind,
                    name,
                    "-n",
                    TEST_NAMESPACE,
                    "--ignore-not-found=true",
                    "--timeout=60s",
                    "--wait=true",
                ],
            );
        }
        let _ =
            run_cmd_with_stdin_quiet("kubectl", &["delete", "-f", "-"], &self.operator_manifest);
        for namespace in [TEST_NAMESPACE, OPERATOR_NAMESPACE] {
            let _ = run_cmd_quiet(
                "kubectl",
                &["delete", "namespace", namespace, "--ignore-not-found=true"],
            );
        }
    }
}

fn wait_for_phase(kind: &str, name: &str, phase: &str) -> Result<(), Box<dyn Error>> {
    wait_for(
        &format!("{kind}/{name} phase == {phase}"),
        Duration::from_secs(120),
        || Ok(get_field(kind, name, "{.status.phase}").unwrap_or_default() == phase),
    )
}

fn get_field(kind: &str, name: &str, jsonpath: &str) -> Result<String, Box<dyn Error>> {
    run_cmd(
        "kubectl",
        &[
            "get",
            kind,
            name,
            "-n",
            TEST_NAMESPACE,
            "-o",
            &format!("jsonpath={jsonpath}"),
        ],
    )
}

fn ensure_namespace(name: &str) -> Result<(), Box<dyn Error>> {
    run_cmd(
        "kubectl",
        &[
            "create",
            "namespace",
            name,
            "--dry-run=client",
            "-o",
            "yaml",
        ],
    )
    .and_then(|output| kubectl_apply(&output))
}

fn ensure_kind_cluster(name: &str) -> Result<(), Box<dyn Error>> {
    let clusters = run_cmd("kind", &["get", "clusters"])?;
    if clusters.lines().any(|line| line.trim() == name) {
        return Ok(());
    }
    run_cmd("kind", &["create", "cluster", "--name", name])?;
    Ok(())
}

fn kubectl_apply(manifest: &str) -> Result<(), Box<dyn Error>> {
    run_cmd_with_stdin("kubectl", &["apply", "-f", "-"], manifest)
}

fn run_cmd(program: &str, args: &[&str]) -> Result<String, Box<dyn Error>> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Ok(kubeconfig) = std::env::var("KUBECONFIG") {
        cmd.env("KUBECONFIG", kubeconfig);
    }
    let output = cmd.output()?;
    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "command failed: {} {:?}\nstdout:\n{}\nstderr:\n{}",
            program, args, stdout, stderr
        )
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn run_cmd_with_stdin(program: &str, args: &[&str], input: &str) -> Result<(), Box<dyn Error>> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Ok(kubeconfig) = std::env::var("KUBECONFIG") {
        cmd.env("KUBECONFIG", kubeconfig);
    }
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        use std::io::Write;
        stdin.write_all(input.as_bytes())?;
        stdin.flush()?;
        drop(stdin);
    }
    let output = child.wait_with_output()?;
    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "command failed: {} {:?}\nstdout:\n{}\nstderr:\n{}",
            program, args, stdout, stderr
        )
        .into());
    }
    Ok(())
}

fn wait_for<F>(label: &str, timeout: Duration, mut condition: F) -> Result<(), Box<dyn Error>>
where
    F: FnMut() -> Result<bool, Box<dyn Error>>,
{
    let start = Instant::now();
    let mut attempts: u32 = 0;
    loop {
        if condition()? {
            return Ok(());
        }
        attempts += 1;
        if start.elapsed() > timeout {
            return Err(format!(
                "timeout while waiting for {} after {:?} (attempts={})",
                label, timeout, attempts
            )
            .into());
        }
        sleep(Duration::from_secs(3));
    }
}

fn env_true(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(
            value.to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

fn run_cmd_quiet(program: &str, args: &[&str]) -> Result<(), Box<dyn Error>> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Ok(kubeconfig) = std::env::var("KUBECONFIG") {
        cmd.env("KUBECONFIG", kubeconfig);
    }
    let _ = cmd.output();
    Ok(())
}

fn run_cmd_with_stdin_quiet(
    program: &str,
    args: &[&str],
    input: &str,
) -> Result<(), Box<dyn Error>> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Ok(kubeconfig) = std::env::var("KUBECONFIG") {
        cmd.env("KUBECONFIG", kubeconfig);
    }
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        use std::io::Write;
        let _ = stdin.write_all(input.as_bytes());
        let _ = stdin.flush();
        drop(stdin);
    }
    let _ = child.wait_with_output();
    Ok(())
}
