use mm_rating_processor::{
    database::db::DbClient,
    error::ProcessorError,
    model::{constants::RatingConstants, structures::rating_type::RatingType},
    processor::process_event,
    utils::test_utils::generate_stored_rating
};
use serial_test::serial;
use uuid::Uuid;

use super::test_helpers::{submissions, TestDatabase};
use crate::common::init_test_env;

const MM: RatingType = RatingType::Marathon;

async fn setup() -> (TestDatabase, DbClient) {
    init_test_env();
    let test_db = TestDatabase::new().await.expect("Failed to create test database");
    test_db
        .seed_ratings(&[generate_stored_rating(2, 1500, 300, 4, 1)])
        .await
        .expect("Failed to seed test data");

    let db_client = DbClient::connect(&test_db.connection_string)
        .await
        .expect("Failed to connect");

    (test_db, db_client)
}

#[tokio::test]
#[serial]
async fn test_process_event_persists_ratings_and_history() {
    let (test_db, mut db_client) = setup().await;
    let event_id = Uuid::new_v4();
    let event = submissions(&[(1, 10.0), (2, 30.0), (3, 20.0)]);

    let processed = process_event(&mut db_client, event_id, MM, &event, &RatingConstants::default(), false)
        .await
        .expect("Failed to process event");

    assert!(db_client.is_event_rated(event_id, MM).await.unwrap());
    assert_eq!(test_db.rating_count().await.unwrap(), 3);

    let stored = db_client.get_ratings(&[1, 2, 3], MM).await.unwrap();
    assert_eq!(stored.len(), 3);
    for rating in &processed.ratings {
        assert_eq!(stored.get(&rating.member_id), Some(rating));
    }
    assert_eq!(stored[&2].ratings_count, 5);
    assert_eq!(stored[&2].total_wins, 2);
    assert_eq!(stored[&2].challenge_id, Some(event_id));
    assert_eq!(stored[&2].win_position, Some(1));

    let history = db_client.get_history(event_id, MM).await.unwrap();
    assert_eq!(history.len(), 3);
    let snapshot = history.iter().find(|h| h.member_id == 2).unwrap();
    assert_eq!(snapshot.rating, 1500);
    assert_eq!(snapshot.volatility, 300);
    assert_eq!(snapshot.ratings_count, 4);
    assert_eq!(snapshot.score, 30.0);
    assert_eq!(snapshot.submission_id, event[1].id);
}

#[tokio::test]
#[serial]
async fn test_dry_run_does_not_persist() {
    let (test_db, mut db_client) = setup().await;
    let event_id = Uuid::new_v4();
    let event = submissions(&[(1, 10.0), (2, 30.0), (3, 20.0)]);

    let processed = process_event(&mut db_client, event_id, MM, &event, &RatingConstants::default(), true)
        .await
        .expect("Failed to process event");

    assert_eq!(processed.outcome.participants.len(), 3);
    assert!(!db_client.is_event_rated(event_id, MM).await.unwrap());
    assert_eq!(test_db.rating_count().await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn test_event_cannot_be_rated_twice() {
    let (test_db, mut db_client) = setup().await;
    let event_id = Uuid::new_v4();
    let event = submissions(&[(1, 10.0), (2, 30.0)]);
    let constants = RatingConstants::default();

    process_event(&mut db_client, event_id, MM, &event, &constants, false)
        .await
        .expect("Failed to process event");
    let before = db_client.get_ratings(&[1, 2], MM).await.unwrap();

    let result = process_event(&mut db_client, event_id, MM, &event, &constants, false).await;

    assert!(matches!(result, Err(ProcessorError::AlreadyRated { .. })));
    assert_eq!(db_client.get_ratings(&[1, 2], MM).await.unwrap(), before);
    assert_eq!(test_db.rating_count().await.unwrap(), 2);
}

#[tokio::test]
#[serial]
async fn test_rollback_restores_prior_ratings() {
    let (test_db, mut db_client) = setup().await;
    let event_id = Uuid::new_v4();
    let event = submissions(&[(1, 10.0), (2, 30.0), (3, 20.0)]);

    process_event(&mut db_client, event_id, MM, &event, &RatingConstants::default(), false)
        .await
        .expect("Failed to process event");

    let restored = db_client.rollback_event(event_id, MM).await.expect("Failed to roll back");

    assert_eq!(restored, 3);
    assert!(!db_client.is_event_rated(event_id, MM).await.unwrap());

    // First-timers disappear, the returning member gets their old rating back
    let stored = db_client.get_ratings(&[1, 2, 3], MM).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[&2], generate_stored_rating(2, 1500, 300, 4, 1));
    assert_eq!(test_db.rating_count().await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn test_rollback_refuses_when_rated_later() {
    let (_test_db, mut db_client) = setup().await;
    let constants = RatingConstants::default();
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    process_event(&mut db_client, first, MM, &submissions(&[(1, 10.0), (2, 30.0)]), &constants, false)
        .await
        .expect("Failed to process first event");
    process_event(&mut db_client, second, MM, &submissions(&[(2, 5.0), (3, 8.0)]), &constants, false)
        .await
        .expect("Failed to process second event");
    let before = db_client.get_ratings(&[1, 2, 3], MM).await.unwrap();

    let result = db_client.rollback_event(first, MM).await;

    assert!(matches!(result, Err(ProcessorError::RollbackConflict { member_id: 2 })));
    assert!(db_client.is_event_rated(first, MM).await.unwrap());
    assert_eq!(db_client.get_ratings(&[1, 2, 3], MM).await.unwrap(), before);
}

#[tokio::test]
#[serial]
async fn test_rollback_of_unrated_event() {
    let (_test_db, mut db_client) = setup().await;

    let result = db_client.rollback_event(Uuid::new_v4(), MM).await;

    assert!(matches!(result, Err(ProcessorError::NotRated { .. })));
}
