//! Sequential Pedersen VSS demo
//!
//! Spawns every party of a k-party session inside one process, wired
//! together by the in-memory relay: each party deals a random secret in
//! turn, the verified sharings are collapsed, and every party recovers each
//! dealer's secret and the collapsed sum. The demo fails if any two parties
//! disagree on a recovered value.

use anyhow::{bail, Result};
use clap::Parser;
use k256::{elliptic_curve::Field, Scalar};
use pvss_core::algebra::CommitmentScheme;
use pvss_core::transport::MemoryRelay;
use pvss_core::vss::{run_recovery, run_sequential, CollapsedSharing, RecoveryTarget};
use pvss_core::SessionConfig;
use rand::rngs::OsRng;
use std::time::Duration;
use tracing::{info, Level};

/// Sequential Pedersen VSS demo runner
#[derive(Parser)]
#[command(name = "pvss-demo")]
#[command(about = "Run a k-party sequential VSS session in-process")]
#[command(version)]
struct Cli {
    /// Number of parties
    #[arg(short = 'n', long, default_value_t = pvss_core::DEFAULT_PARTIES)]
    parties: usize,

    /// Threshold (shares required to recover)
    #[arg(short, long, default_value_t = pvss_core::DEFAULT_THRESHOLD)]
    threshold: usize,

    /// Use hiding (Pedersen) commitments instead of Feldman
    #[arg(long)]
    hiding: bool,

    /// Bound on each protocol wait, in milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Complaints tolerated against a dealer before rejection
    #[arg(long, default_value_t = 0)]
    max_faults: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    info!(
        parties = cli.parties,
        threshold = cli.threshold,
        hiding = cli.hiding,
        "Starting VSS demo"
    );

    let relay = MemoryRelay::new();
    let scheme = CommitmentScheme::new(cli.hiding)?;
    let session_id: [u8; 32] = rand::random();

    let secrets: Vec<Scalar> = (0..cli.parties).map(|_| Scalar::random(&mut OsRng)).collect();
    let expected_sum = secrets.iter().fold(Scalar::ZERO, |acc, s| acc + s);

    let mut handles = Vec::with_capacity(cli.parties);
    for (party_id, secret) in secrets.iter().enumerate() {
        let mut config = SessionConfig::new(cli.parties, cli.threshold, party_id)?
            .with_max_faults(cli.max_faults)?
            .with_round_timeout(Duration::from_millis(cli.timeout_ms));
        config.session_id = session_id;

        let scheme = scheme.clone();
        let relay = relay.clone();
        let secret = *secret;
        handles.push(tokio::spawn(async move {
            run_party(config, scheme, relay, secret).await
        }));
    }

    let mut collapsed_secrets = Vec::with_capacity(cli.parties);
    for (party_id, handle) in handles.into_iter().enumerate() {
        let recovered = handle.await??;
        info!(
            party_id,
            collapsed = hex::encode(recovered.to_bytes()),
            "Party finished"
        );
        collapsed_secrets.push(recovered);
    }

    if collapsed_secrets.windows(2).any(|w| w[0] != w[1]) {
        bail!("Recovered collapsed secrets are not equal");
    }
    if collapsed_secrets[0] != expected_sum {
        bail!("Collapsed secret does not equal the sum of the dealt secrets");
    }

    println!(
        "Collapsed secret (sum of {} dealt secrets): {}",
        cli.parties,
        hex::encode(collapsed_secrets[0].to_bytes())
    );

    Ok(())
}

/// One party's full protocol run
async fn run_party(
    config: SessionConfig,
    scheme: CommitmentScheme,
    relay: MemoryRelay,
    secret: Scalar,
) -> Result<Scalar> {
    let instances = run_sequential(&config, &scheme, &relay, secret).await?;

    // Recover the first `threshold` dealers' secrets to exercise
    // per-instance recovery before the collapse.
    for instance in instances.iter().filter(|i| i.is_verified()).take(config.threshold) {
        let recovered = run_recovery(
            &config,
            &scheme,
            &relay,
            RecoveryTarget::Instance(instance),
        )
        .await?;
        info!(
            party_id = config.party_id,
            dealer = instance.dealer,
            secret = hex::encode(recovered.to_bytes()),
            "Recovered dealer secret"
        );
    }

    let collapsed = CollapsedSharing::collapse(&instances)?;
    let recovered = run_recovery(
        &config,
        &scheme,
        &relay,
        RecoveryTarget::Collapsed(&collapsed),
    )
    .await?;

    Ok(recovered)
}
