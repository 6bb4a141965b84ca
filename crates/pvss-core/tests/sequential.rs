//! End-to-end runs of the sequential VSS protocol over the in-memory relay

use k256::Scalar;
use pvss_core::algebra::CommitmentScheme;
use pvss_core::transport::MemoryRelay;
use pvss_core::vss::{
    run_recovery, run_sequential, CollapsedSharing, RecoveryTarget,
};
use pvss_core::{PartyId, SessionConfig};
use std::time::Duration;

fn config_for(session_id: [u8; 32], n: usize, t: usize, id: PartyId) -> SessionConfig {
    SessionConfig {
        session_id,
        n_parties: n,
        threshold: t,
        party_id: id,
        parties: (0..n).collect(),
        max_faults: 0,
        round_timeout: Duration::from_secs(2),
    }
}

/// One party's full run: deal, collapse, recover every dealer's secret and
/// the collapsed secret
async fn full_run(
    config: SessionConfig,
    scheme: CommitmentScheme,
    relay: MemoryRelay,
    secret: Scalar,
) -> (Vec<Scalar>, Scalar) {
    let instances = run_sequential(&config, &scheme, &relay, secret)
        .await
        .unwrap();
    assert!(instances.iter().all(|i| i.is_verified()));

    let mut dealt = Vec::new();
    for instance in &instances {
        let recovered = run_recovery(
            &config,
            &scheme,
            &relay,
            RecoveryTarget::Instance(instance),
        )
        .await
        .unwrap();
        dealt.push(recovered);
    }

    let collapsed = CollapsedSharing::collapse(&instances).unwrap();
    let sum = run_recovery(
        &config,
        &scheme,
        &relay,
        RecoveryTarget::Collapsed(&collapsed),
    )
    .await
    .unwrap();

    (dealt, sum)
}

async fn run_all_parties(hiding: bool) {
    let relay = MemoryRelay::new();
    let scheme = CommitmentScheme::new(hiding).unwrap();
    let session_id = rand::random();
    let secrets = [10u64, 7, 25];

    let mut handles = Vec::new();
    for (id, &secret) in secrets.iter().enumerate() {
        let config = config_for(session_id, 3, 2, id);
        let scheme = scheme.clone();
        let relay = relay.clone();
        handles.push(tokio::spawn(full_run(
            config,
            scheme,
            relay,
            Scalar::from(secret),
        )));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    for (dealt, sum) in &results {
        let expected: Vec<Scalar> = secrets.iter().map(|&s| Scalar::from(s)).collect();
        assert_eq!(dealt, &expected);
        assert_eq!(*sum, Scalar::from(42u64));
    }

    // Every party recovered the same collapsed secret
    assert!(results.windows(2).all(|w| w[0].1 == w[1].1));
}

#[tokio::test(flavor = "multi_thread")]
async fn feldman_mode_deals_collapses_and_recovers() {
    run_all_parties(false).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn pedersen_mode_deals_collapses_and_recovers() {
    run_all_parties(true).await;
}
