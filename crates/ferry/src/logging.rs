use tracing_subscriber::EnvFilter;

/// Crates whose events follow `--log-level`; everything else stays at `warn`.
const FERRY_TARGETS: &[&str] = &[
    "ferry",
    "ferry_execution",
    "ferry_connector",
    "ferry_connector_filesystem",
];

/// Installs the global subscriber for the `ferry` binary. `RUST_LOG`
/// overrides the filter built from `log_level`.
pub fn init(log_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_names(true)
        .init();
}

fn default_directives(log_level: &str) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(FERRY_TARGETS.iter().map(|target| format!("{target}={log_level}")));
    directives.join(",")
}
