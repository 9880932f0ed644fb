use collector::{Collector, Reply, SqliteRecordStore, Step};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

async fn memory_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

async fn collector_with_db() -> Collector<SqliteRecordStore, i64> {
    Collector::new(SqliteRecordStore::new(memory_db().await))
}

#[tokio::test]
async fn three_answers_store_one_record_in_order() {
    let collector = collector_with_db().await;

    assert_eq!(collector.begin(42).await, Reply::Prompt(Step::AwaitingName));
    assert_eq!(
        collector.handle_text(&42, "Маша").await,
        Some(Reply::Prompt(Step::AwaitingAge))
    );
    assert_eq!(
        collector.handle_text(&42, "13").await,
        Some(Reply::Prompt(Step::AwaitingGrade))
    );
    let reply = collector.handle_text(&42, "7").await;
    assert_eq!(reply, Some(Reply::Saved { id: 1 }));

    let records = collector.store().list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Маша");
    assert_eq!(records[0].age, "13");
    assert_eq!(records[0].grade, "7");
    assert!(collector.sessions().is_empty().await);
}

#[tokio::test]
async fn partial_answers_never_persist() {
    let collector = collector_with_db().await;

    collector.begin(1).await;
    collector.handle_text(&1, "Коля").await;
    assert_eq!(collector.store().count().await.unwrap(), 0);

    collector.handle_text(&1, "9").await;
    assert_eq!(collector.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn begin_mid_form_restarts_from_the_name() {
    let collector = collector_with_db().await;

    collector.begin(5).await;
    collector.handle_text(&5, "Старое имя").await;
    collector.handle_text(&5, "10").await;

    assert_eq!(collector.begin(5).await, Reply::Prompt(Step::AwaitingName));
    collector.handle_text(&5, "Новое имя").await;
    collector.handle_text(&5, "11").await;
    collector.handle_text(&5, "5").await;

    let records = collector.store().list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Новое имя");
    assert_eq!(records[0].age, "11");
}

#[tokio::test]
async fn records_are_appended_with_growing_ids() {
    let collector = collector_with_db().await;

    for (chat, name) in [(1_i64, "a"), (2_i64, "b")] {
        collector.begin(chat).await;
        collector.handle_text(&chat, name).await;
        collector.handle_text(&chat, "10").await;
        collector.handle_text(&chat, "4").await;
    }

    let records = collector.store().list().await.unwrap();
    let ids: Vec<i32> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(collector.store().count().await.unwrap(), 2);
}

#[tokio::test]
async fn text_after_completion_is_not_a_form_answer() {
    let collector = collector_with_db().await;

    collector.begin(3).await;
    collector.handle_text(&3, "a").await;
    collector.handle_text(&3, "b").await;
    collector.handle_text(&3, "c").await;

    assert_eq!(collector.handle_text(&3, "d").await, None);
    assert_eq!(collector.store().count().await.unwrap(), 1);
}

#[tokio::test]
async fn missing_table_reports_a_failed_save() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let collector = Collector::new(SqliteRecordStore::new(db)).with_retry(collector::RetryPolicy {
        attempts: 2,
        base_delay: std::time::Duration::ZERO,
    });

    collector.begin(8_i64).await;
    collector.handle_text(&8, "a").await;
    collector.handle_text(&8, "b").await;
    assert_eq!(collector.handle_text(&8, "c").await, Some(Reply::SaveFailed));
}
