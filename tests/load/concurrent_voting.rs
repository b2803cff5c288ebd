//! High concurrency stress tests for vote processing
//!
//! These tests hammer the optimistic rating commit from many tasks at once
//! and check that no update is lost and ratings stay conserved.

use std::sync::Arc;
use std::time::{Duration, Instant};
use vote4goat::service::AppState;
use vote4goat::storage::Storage;
use vote4goat::types::{EntityId, VoteRequest};

// Import test fixtures
use crate::fixtures::{contended_config, football_seed, FOOTBALL};

/// Create a running system tuned for heavy contention
async fn create_load_test_system(entities: usize) -> Arc<AppState> {
    let app = Arc::new(AppState::from_seed(contended_config(), football_seed(entities)).unwrap());
    app.start().await.unwrap();
    app
}

fn vote(winner_id: EntityId, loser_id: EntityId) -> VoteRequest {
    VoteRequest {
        winner_id,
        loser_id,
        user_id: None,
        ip: Some("203.0.113.9".to_string()),
    }
}

/// Check the bookkeeping invariants across a whole category
fn assert_conserved(storage: &dyn Storage, entities: usize, votes: usize) {
    let snapshot = storage.category_snapshot(FOOTBALL).unwrap();
    assert_eq!(snapshot.len(), entities);

    let total_rating: f64 = snapshot.iter().map(|rated| rated.rating.rating).sum();
    let total_wins: u64 = snapshot.iter().map(|rated| rated.rating.wins).sum();
    let total_losses: u64 = snapshot.iter().map(|rated| rated.rating.losses).sum();

    assert!(
        (total_rating - 1500.0 * entities as f64).abs() < 1e-6 * votes.max(1) as f64,
        "Ratings should be conserved, total was {}",
        total_rating
    );
    assert_eq!(total_wins, votes as u64, "Every vote should record one win");
    assert_eq!(total_losses, votes as u64, "Every vote should record one loss");

    for rated in &snapshot {
        assert_eq!(
            rated.rating.version,
            rated.rating.votes(),
            "Entity {} version should count its votes",
            rated.entity.id
        );
    }

    assert_eq!(storage.vote_count().unwrap(), votes);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_100_concurrent_votes_on_one_pair() {
    let app = create_load_test_system(2).await;
    let concurrent_votes = 100;

    let start_time = Instant::now();

    let handles: Vec<_> = (0..concurrent_votes)
        .map(|i| {
            let voting = app.voting();
            let request = if i % 2 == 0 { vote(1, 2) } else { vote(2, 1) };
            tokio::spawn(async move { voting.vote(request).await })
        })
        .collect();

    let results = futures::future::join_all(handles).await;
    let duration = start_time.elapsed();

    let mut successful_votes = 0;
    let mut retried_votes = 0;
    for result in results {
        match result {
            Ok(Ok(outcome)) => {
                successful_votes += 1;
                if outcome.attempts > 1 {
                    retried_votes += 1;
                }
            }
            Ok(Err(e)) => eprintln!("Vote failed: {}", e),
            Err(e) => eprintln!("Task failed: {}", e),
        }
    }

    assert_eq!(
        successful_votes, concurrent_votes,
        "All votes should eventually commit"
    );
    assert_conserved(app.storage().as_ref(), 2, concurrent_votes);

    let storage = app.storage();
    let first = storage.get_rating(1).unwrap().unwrap();
    let second = storage.get_rating(2).unwrap().unwrap();
    assert_eq!(first.wins, 50);
    assert_eq!(second.wins, 50);

    println!(
        "✅ 100 concurrent votes on one pair passed - {} retried, took {:?}",
        retried_votes, duration
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_1000_concurrent_votes_across_category() {
    let entities = 20;
    let app = create_load_test_system(entities).await;

    let pairs: Vec<(EntityId, EntityId)> = (0..1000)
        .map(|i: i64| ((i * 7) % 20 + 1, (i * 13 + 5) % 20 + 1))
        .filter(|(winner, loser)| winner != loser)
        .collect();
    let expected_votes = pairs.len();

    let start_time = Instant::now();

    let handles: Vec<_> = pairs
        .into_iter()
        .map(|(winner, loser)| {
            let voting = app.voting();
            tokio::spawn(async move { voting.vote(vote(winner, loser)).await })
        })
        .collect();

    let results = futures::future::join_all(handles).await;
    let duration = start_time.elapsed();

    let successful_votes = results
        .into_iter()
        .filter(|result| matches!(result, Ok(Ok(_))))
        .count();

    assert_eq!(successful_votes, expected_votes);
    assert!(
        duration < Duration::from_secs(30),
        "{} votes should complete within 30 seconds, took: {:?}",
        expected_votes,
        duration
    );
    assert_conserved(app.storage().as_ref(), entities, expected_votes);

    let throughput = expected_votes as f64 / duration.as_secs_f64();
    println!(
        "✅ {} concurrent votes across category passed - Throughput: {:.1} votes/sec",
        expected_votes, throughput
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_disjoint_pairs_never_conflict() {
    let app = create_load_test_system(40).await;

    let handles: Vec<_> = (0..20)
        .map(|i: EntityId| {
            let voting = app.voting();
            tokio::spawn(async move { voting.vote(vote(2 * i + 1, 2 * i + 2)).await })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        let outcome = result.unwrap().unwrap();
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.winner.new_rating, 1516.0);
        assert_eq!(outcome.loser.new_rating, 1484.0);
    }

    assert_conserved(app.storage().as_ref(), 40, 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_reads_during_sustained_voting() {
    let entities = 10;
    let app = create_load_test_system(entities).await;
    let test_duration = Duration::from_millis(500);

    let start_time = Instant::now();

    let voter = {
        let voting = app.voting();
        tokio::spawn(async move {
            let mut votes = 0usize;
            while start_time.elapsed() < test_duration {
                let duel = voting.get_duel(FOOTBALL, None).unwrap();
                let (winner, loser) = duel.entity_ids();
                voting.vote(vote(winner, loser)).await.unwrap();
                votes += 1;
            }
            votes
        })
    };

    let reader = {
        let voting = app.voting();
        tokio::spawn(async move {
            let mut reads = 0usize;
            while start_time.elapsed() < test_duration {
                let page = voting.list_ranking(FOOTBALL, Some(entities)).unwrap();
                assert_eq!(page.entries.len(), entities);
                assert!(page
                    .entries
                    .windows(2)
                    .all(|rows| rows[0].rating >= rows[1].rating));
                reads += 1;
                tokio::task::yield_now().await;
            }
            reads
        })
    };

    let votes = voter.await.unwrap();
    let reads = reader.await.unwrap();

    assert!(votes > 0, "Voter should have committed votes");
    assert!(reads > 0, "Reader should have read rankings");
    assert_conserved(app.storage().as_ref(), entities, votes);

    println!(
        "✅ Sustained load passed - {} votes and {} ranking reads in {:?}",
        votes,
        reads,
        start_time.elapsed()
    );
}
