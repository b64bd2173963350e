use tracing_subscriber::EnvFilter;

/// Initialise les logs (tracing).
/// RUST_LOG contrôle le filtre, LOG_FORMAT=json pour des logs JSON.
/// Les logs `log` d'actix (middleware Logger) passent aussi par ce subscriber.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gold_ledger=info,actix_web=info"));

    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    let result = if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).try_init()
    };

    if let Err(e) = result {
        eprintln!("⚠️  Logger already initialized: {}", e);
    }
}
