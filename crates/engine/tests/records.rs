use sea_orm::Database;

use engine::{Department, Engine, EngineError, Roster};
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
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    record
}

#[tokio::test]
async fn active_records_are_newest_first() {
    let engine = engine_with_db().await;

    let first = add(&engine, "2024-01-01", 10, &["俊德"]).await;
    let second = add(&engine, "2024-01-02", 20, &["虹妙"]).await;
    let third = add(&engine, "2024-01-03", 30, &["清野"]).await;

    let active = engine.active_records().await;
    let ids: Vec<_> = active.iter().map(|record| record.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
    assert!(active.iter().all(|record| !record.is_settled));
}

#[tokio::test]
async fn add_record_rejects_bad_input_without_writes() {
    let engine = engine_with_db().await;

    let err = engine
        .add_record("2024-01-01", -5, vec!["俊德".to_string()], None, "alice@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .add_record("2024-01-01", 5, Vec::new(), None, "alice@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    assert!(engine.active_records().await.is_empty());
}

#[tokio::test]
async fn departments_are_a_creation_time_snapshot() {
    let engine = engine_with_db().await;

    let record = add(&engine, "2024-01-01", 100, &["俊德", "清野"]).await;
    assert_eq!(record.departments, vec!["品質部", "技術部"]);

    // Move 俊德 to a different department; the stored record must not
    // follow.
    let edited = Roster::new(vec![
        Department::new("技術部", ["俊德", "清野", "宏澤"]),
        Department::new("品質部", ["虹妙"]),
    ])
    .unwrap();
    engine.save_roster(&edited).await.unwrap();

    let active = engine.active_records().await;
    assert_eq!(active[0].departments, vec!["品質部", "技術部"]);

    // New records classify against the edited roster.
    let fresh = add(&engine, "2024-01-02", 50, &["俊德"]).await;
    assert_eq!(fresh.departments, vec!["技術部"]);
}

#[tokio::test]
async fn roster_defaults_then_round_trips() {
    let engine = engine_with_db().await;

    let roster = engine.roster().await;
    let names: Vec<_> = roster
        .departments()
        .iter()
        .map(|department| department.name.as_str())
        .collect();
    assert_eq!(names, vec!["品質部", "技術部", "其他部門"]);

    let replacement = Roster::new(vec![Department::new("業務部", ["Sam"])]).unwrap();
    engine.save_roster(&replacement).await.unwrap();

    let reloaded = engine.roster().await;
    assert_eq!(reloaded.departments().len(), 1);
    assert_eq!(reloaded.department_of("Sam"), "業務部");
    assert_eq!(reloaded.department_of("俊德"), engine::UNASSIGNED_DEPARTMENT);
}
