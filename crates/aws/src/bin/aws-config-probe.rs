//! aws-config-probe: resolve an AWS SDK config through the cache.
//!
//! Resolves the same connection credentials `--repeat` times and reports
//! per-call latency, so the first (cold) and following (cached) resolutions
//! can be compared. Ctrl-C cancels an in-flight resolution.

use std::time::Instant;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use sdkcache_aws::credentials::{
    ADVANCED_KEY_AUTH_METHOD, ADVANCED_KEY_ENDPOINT, ADVANCED_KEY_PROFILE_NAME,
};
use sdkcache_aws::{is_known_region, AwsConfigResolver, CredentialRecord, SdkConfigSource};
use sdkcache_core::config::{load_dotenv, Config};

// ── CLI ─────────────────────────────────────────────────────────────

/// Resolve AWS SDK configuration for a connection and report cache behaviour.
#[derive(Parser, Debug)]
#[command(name = "aws-config-probe", version, about)]
struct Cli {
    /// AWS region (the connection's Hostname).
    #[arg(long, env = "AWS_REGION")]
    region: String,

    /// Access key id for static auth.
    #[arg(long, env = "AWS_ACCESS_KEY_ID", default_value = "")]
    access_key_id: String,

    /// Secret access key for static auth.
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", default_value = "", hide_env_values = true)]
    secret_access_key: String,

    /// Session token for temporary credentials.
    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    session_token: Option<String>,

    /// Auth method: static, profile, iam, env, default.
    #[arg(long, default_value = "default")]
    auth_method: String,

    /// Shared-config profile name (profile auth).
    #[arg(long)]
    profile: Option<String>,

    /// Custom endpoint (LocalStack, MinIO, ...).
    #[arg(long)]
    endpoint: Option<String>,

    /// Number of resolutions to run.
    #[arg(long, default_value_t = 2)]
    repeat: u32,
}

impl Cli {
    fn record(&self) -> CredentialRecord {
        let mut record = CredentialRecord::new(
            &self.region,
            &self.access_key_id,
            &self.secret_access_key,
        )
        .with_profile(self.profile.is_some())
        .with_advanced(ADVANCED_KEY_AUTH_METHOD, &self.auth_method);

        if let Some(token) = &self.session_token {
            record = record.with_session_token(token);
        }
        if let Some(profile) = &self.profile {
            record = record.with_advanced(ADVANCED_KEY_PROFILE_NAME, profile);
        }
        if let Some(endpoint) = &self.endpoint {
            record = record.with_advanced(ADVANCED_KEY_ENDPOINT, endpoint);
        }
        record
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    if !is_known_region(&cli.region) {
        warn!(region = %cli.region, "region is not in the commercial region list");
    }

    let resolver = AwsConfigResolver::new(SdkConfigSource::from_config(&config.cache), &config.cache)?;

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling");
            ctrl_c_cancel.cancel();
        }
    });

    let record = cli.record();
    let mut outcome = Ok(());
    for attempt in 1..=cli.repeat {
        let started = Instant::now();
        match resolver.resolve(&cancel, &record).await {
            Ok(sdk_config) => info!(
                attempt,
                elapsed_ms = started.elapsed().as_millis() as u64,
                region = ?sdk_config.region(),
                cache_size = resolver.size(),
                "resolved AWS config"
            ),
            Err(e) => {
                warn!(
                    attempt,
                    retryable = e.is_retryable(),
                    cancelled = e.is_cancelled(),
                    error = %e,
                    "resolution failed"
                );
                outcome = Err(e);
                break;
            }
        }
    }

    resolver.shutdown();
    info!("aws-config-probe exited");

    outcome.map_err(Into::into)
}
