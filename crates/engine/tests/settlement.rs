use sea_orm::Database;

use engine::{Engine, SettleOutcome};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn add(engine: &Engine, date: &str, amount: i64, personnel: &[&str]) -> engine::ExpenseRecord {
    let record = engine
        .add_record(
            date,
            amount,
            personnel.iter().map(|p| p.to_string()).collect(),
            None,
            "alice@example.com",
        )
        .await
        .unwrap();
    // Keep created_at strictly increasing for ordering assertions.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    record
}

#[tokio::test]
async fn settle_aggregates_and_links_records() {
    let engine = engine_with_db().await;

    add(&engine, "2024-01-05", 100, &["俊德"]).await;
    add(&engine, "2024-01-02", 200, &["清野"]).await;
    // Unparseable date: excluded from the period bounds, still counted.
    add(&engine, "bad-date", 300, &["Sam"]).await;

    let outcome = engine.settle("alice@example.com").await.unwrap();
    let settlement = match outcome {
        SettleOutcome::Settled(settlement) => settlement,
        SettleOutcome::NothingToSettle => panic!("expected a settlement"),
    };

    assert_eq!(settlement.total_amount, 600);
    assert_eq!(settlement.record_count, 3);
    assert_eq!(settlement.period_start, "2024-01-02");
    assert_eq!(settlement.period_end, "2024-01-05");
    assert_eq!(settlement.created_by, "alice@example.com");

    assert!(engine.active_records().await.is_empty());

    let details = engine.settlement_details(settlement.id).await;
    assert_eq!(details.len(), 3);
    for record in &details {
        assert!(record.is_settled);
        assert_eq!(record.settlement_id, Some(settlement.id));
    }

    let reloaded = engine.settlement(settlement.id).await.unwrap();
    assert_eq!(reloaded.id, settlement.id);
    assert_eq!(reloaded.total_amount, settlement.total_amount);
    assert_eq!(reloaded.record_count, settlement.record_count);
}

#[tokio::test]
async fn settle_with_no_open_records_is_a_no_op() {
    let engine = engine_with_db().await;

    let outcome = engine.settle("alice@example.com").await.unwrap();
    assert_eq!(outcome, SettleOutcome::NothingToSettle);

    assert!(engine.settlements().await.is_empty());
    assert!(engine.active_records().await.is_empty());
}

#[tokio::test]
async fn second_settle_without_new_records_mints_nothing() {
    let engine = engine_with_db().await;

    add(&engine, "2024-02-01", 50, &["俊德"]).await;
    add(&engine, "2024-02-02", 70, &["虹妙"]).await;

    let first = engine.settle("alice@example.com").await.unwrap();
    let settlement = match first {
        SettleOutcome::Settled(settlement) => settlement,
        SettleOutcome::NothingToSettle => panic!("expected a settlement"),
    };
    assert_eq!(settlement.total_amount, 120);

    let second = engine.settle("alice@example.com").await.unwrap();
    assert_eq!(second, SettleOutcome::NothingToSettle);

    let history = engine.settlements().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].total_amount, 120);
}

#[tokio::test]
async fn record_added_after_snapshot_stays_open() {
    let engine = engine_with_db().await;

    add(&engine, "2024-03-01", 10, &["俊德"]).await;
    let outcome = engine.settle("alice@example.com").await.unwrap();
    let settlement = match outcome {
        SettleOutcome::Settled(settlement) => settlement,
        SettleOutcome::NothingToSettle => panic!("expected a settlement"),
    };

    let late = add(&engine, "2024-03-02", 20, &["清野"]).await;

    let active = engine.active_records().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, late.id);
    assert!(!active[0].is_settled);

    let details = engine.settlement_details(settlement.id).await;
    assert!(details.iter().all(|record| record.id != late.id));
}

#[tokio::test]
async fn concurrent_settles_produce_exactly_one_settlement() {
    let engine = engine_with_db().await;

    add(&engine, "2024-04-01", 500, &["俊德"]).await;

    let (first, second) = tokio::join!(
        engine.settle("alice@example.com"),
        engine.settle("bob@example.com"),
    );
    let outcomes = [first.unwrap(), second.unwrap()];

    let settled: Vec<_> = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, SettleOutcome::Settled(_)))
        .collect();
    assert_eq!(settled.len(), 1);

    let history = engine.settlements().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].total_amount, 500);
}

#[tokio::test]
async fn period_defaults_to_settlement_date_when_no_date_parses() {
    let engine = engine_with_db().await;

    add(&engine, "sometime soon", 40, &["Sam"]).await;

    let outcome = engine.settle("alice@example.com").await.unwrap();
    let settlement = match outcome {
        SettleOutcome::Settled(settlement) => settlement,
        SettleOutcome::NothingToSettle => panic!("expected a settlement"),
    };

    assert_eq!(settlement.period_start, settlement.date);
    assert_eq!(settlement.period_end, settlement.date);
    assert_eq!(settlement.total_amount, 40);
}
