use api_types::{
    RecordFilter,
    expense::{ExpenseCategory, ExpenseNew},
    production::{ProductionNew, Quality},
    sale::SaleNew,
};
use chrono::{NaiveDate, TimeDelta, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};

use engine::{
    Engine, EngineError, MAX_SESSION_TTL_SECS, MIN_HASH_COST, Money, Window, compute_summary,
};
use migration::MigratorTrait;
use uuid::Uuid;

const ALICE: &str = "alice@farm.test";
const BOB: &str = "bob@farm.test";

async fn connect() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

async fn engine_with_db() -> Engine {
    let engine = Engine::builder()
        .database(connect().await)
        .hash_cost(MIN_HASH_COST)
        .build()
        .await
        .unwrap();
    engine.create_user(ALICE, "pasture").await.unwrap();
    engine.create_user(BOB, "barn").await.unwrap();
    engine
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 5, d).unwrap()
}

fn production(date: NaiveDate, liters: f64) -> ProductionNew {
    ProductionNew {
        date,
        quantity_liters: liters,
        cow_count: 12,
        quality: Quality::A,
        notes: None,
    }
}

fn sale(date: NaiveDate, liters: f64, price_cents: i64) -> SaleNew {
    SaleNew {
        date,
        quantity_liters: liters,
        price_per_liter_cents: price_cents,
        buyer: "Laticínio Serra".to_string(),
        notes: None,
    }
}

fn expense(date: NaiveDate, amount_cents: i64) -> ExpenseNew {
    ExpenseNew {
        date,
        amount_cents,
        category: ExpenseCategory::Feed,
        description: "Ração".to_string(),
    }
}

#[tokio::test]
async fn production_is_listed_newest_first() {
    let engine = engine_with_db().await;
    for d in [2, 5, 1] {
        engine
            .insert_production(ALICE, &production(day(d), f64::from(d) * 10.0))
            .await
            .unwrap();
    }

    let listed = engine
        .list_production(ALICE, &RecordFilter::default())
        .await
        .unwrap();
    let dates: Vec<NaiveDate> = listed.iter().map(|p| p.date).collect();
    assert_eq!(dates, vec![day(5), day(2), day(1)]);
}

#[tokio::test]
async fn date_filter_bounds_are_inclusive() {
    let engine = engine_with_db().await;
    for d in 1..=5 {
        engine.insert_expense(ALICE, &expense(day(d), 100)).await.unwrap();
    }

    let filter = RecordFilter {
        date_from: Some(day(2)),
        date_to: Some(day(4)),
    };
    let listed = engine.list_expenses(ALICE, &filter).await.unwrap();
    let dates: Vec<NaiveDate> = listed.iter().map(|e| e.date).collect();
    assert_eq!(dates, vec![day(4), day(3), day(2)]);

    let open_end = RecordFilter {
        date_from: Some(day(4)),
        date_to: None,
    };
    assert_eq!(engine.list_expenses(ALICE, &open_end).await.unwrap().len(), 2);
}

#[tokio::test]
async fn reversed_filter_is_rejected() {
    let engine = engine_with_db().await;
    let filter = RecordFilter {
        date_from: Some(day(4)),
        date_to: Some(day(2)),
    };
    let err = engine.list_sales(ALICE, &filter).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange(_)));
}

#[tokio::test]
async fn sale_total_is_fixed_at_insert() {
    let engine = engine_with_db().await;
    let stored = engine
        .insert_sale(ALICE, &sale(day(1), 100.0, 250))
        .await
        .unwrap();
    assert_eq!(stored.total_amount_cents, 25000);

    let rounded = engine
        .insert_sale(ALICE, &sale(day(1), 33.333, 199))
        .await
        .unwrap();
    // 33.333 * 1.99 = 66.33267
    assert_eq!(rounded.total_amount_cents, 6633);
}

#[tokio::test]
async fn invalid_payload_is_not_stored() {
    let engine = engine_with_db().await;
    let mut new = production(day(1), 50.0);
    new.cow_count = 0;
    let err = engine.insert_production(ALICE, &new).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let listed = engine
        .list_production(ALICE, &RecordFilter::default())
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn oversized_amount_is_not_stored() {
    let engine = engine_with_db().await;
    for _ in 0..2 {
        let err = engine
            .insert_expense(ALICE, &expense(day(1), i64::MAX / 2 + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    let listed = engine
        .list_expenses(ALICE, &RecordFilter::default())
        .await
        .unwrap();
    assert!(listed.is_empty());
    let summary = compute_summary(&[], &[], &listed, 30);
    assert_eq!(summary.total_expenses, Money::ZERO);
}

#[tokio::test]
async fn records_are_scoped_per_user() {
    let engine = engine_with_db().await;
    let mine = engine
        .insert_production(ALICE, &production(day(1), 80.0))
        .await
        .unwrap();
    engine
        .insert_production(BOB, &production(day(1), 40.0))
        .await
        .unwrap();

    let listed = engine
        .list_production(BOB, &RecordFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].quantity_liters, 40.0);

    // Bob cannot delete Alice's record.
    let err = engine.delete_production(BOB, mine.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    engine.delete_production(ALICE, mine.id).await.unwrap();
}

#[tokio::test]
async fn delete_unknown_id() {
    let engine = engine_with_db().await;
    let err = engine.delete_sale(ALICE, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn notes_are_trimmed_and_blank_dropped() {
    let engine = engine_with_db().await;
    let mut new = production(day(1), 10.0);
    new.notes = Some("  ordenha da manhã  ".to_string());
    let stored = engine.insert_production(ALICE, &new).await.unwrap();
    assert_eq!(stored.notes.as_deref(), Some("ordenha da manhã"));

    new.notes = Some("   ".to_string());
    let stored = engine.insert_production(ALICE, &new).await.unwrap();
    assert_eq!(stored.notes, None);
}

#[tokio::test]
async fn sign_in_flow() {
    let engine = engine_with_db().await;

    let err = engine.sign_in(ALICE, "wrong").await.unwrap_err();
    assert_eq!(err, EngineError::InvalidCredentials);
    let err = engine.sign_in("nobody@farm.test", "pasture").await.unwrap_err();
    assert_eq!(err, EngineError::InvalidCredentials);

    // Identifiers are case and whitespace insensitive.
    let session = engine.sign_in("  Alice@Farm.test ", "pasture").await.unwrap();
    assert_eq!(session.user_id, ALICE);

    let found = engine.session(&session.token).await.unwrap();
    assert_eq!(found.token, session.token);

    let refreshed = engine.refresh_session(&session.token).await.unwrap();
    assert!(refreshed.expires_at >= session.expires_at);

    engine.sign_out(&session.token).await.unwrap();
    assert_eq!(
        engine.session(&session.token).await.unwrap_err(),
        EngineError::Unauthenticated
    );
    // Signing out twice is fine.
    engine.sign_out(&session.token).await.unwrap();
}

#[tokio::test]
async fn duplicate_user_is_rejected() {
    let engine = engine_with_db().await;
    let err = engine.create_user("ALICE@farm.test", "other").await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

/// Moves the expiry of `token` one hour into the past.
async fn backdate_session(db: &DatabaseConnection, token: &str) {
    let past = Utc::now() - TimeDelta::hours(1);
    db.execute(Statement::from_sql_and_values(
        DbBackend::Sqlite,
        "UPDATE sessions SET expires_at = ? WHERE token = ?",
        [past.into(), token.into()],
    ))
    .await
    .unwrap();
}

#[tokio::test]
async fn expired_session_is_unauthenticated() {
    let db = connect().await;
    let engine = Engine::builder()
        .database(db.clone())
        .hash_cost(MIN_HASH_COST)
        .build().await.unwrap();
    engine.create_user(ALICE, "pasture").await.unwrap();

    let session = engine.sign_in(ALICE, "pasture").await.unwrap();
    backdate_session(&db, &session.token).await;
    assert_eq!(
        engine.session(&session.token).await.unwrap_err(),
        EngineError::Unauthenticated
    );
    assert_eq!(
        engine.refresh_session(&session.token).await.unwrap_err(),
        EngineError::Unauthenticated
    );
}

#[tokio::test]
async fn purge_drops_only_expired_sessions() {
    let db = connect().await;
    let engine = Engine::builder()
        .database(db.clone())
        .hash_cost(MIN_HASH_COST)
        .build().await.unwrap();
    engine.create_user(ALICE, "pasture").await.unwrap();

    let stale = engine.sign_in(ALICE, "pasture").await.unwrap();
    let alive = engine.sign_in(ALICE, "pasture").await.unwrap();
    backdate_session(&db, &stale.token).await;

    assert_eq!(engine.purge_expired_sessions().await.unwrap(), 1);
    assert!(engine.session(&alive.token).await.is_ok());
}

#[tokio::test]
async fn session_ttl_must_be_in_range() {
    for ttl in [
        TimeDelta::zero(),
        TimeDelta::seconds(-5),
        TimeDelta::seconds(MAX_SESSION_TTL_SECS + 1),
        TimeDelta::days(1_000_000_000),
    ] {
        let built = Engine::builder()
            .database(connect().await)
            .session_ttl(ttl)
            .build()
            .await;
        assert!(matches!(built, Err(EngineError::InvalidRange(_))), "{ttl}");
    }
}

#[tokio::test]
async fn longest_ttl_still_signs_in() {
    let engine = Engine::builder()
        .database(connect().await)
        .session_ttl(TimeDelta::seconds(MAX_SESSION_TTL_SECS))
        .hash_cost(MIN_HASH_COST)
        .build()
        .await
        .unwrap();
    engine.create_user(ALICE, "pasture").await.unwrap();

    let session = engine.sign_in(ALICE, "pasture").await.unwrap();
    assert_eq!(
        session.expires_at - session.created_at,
        TimeDelta::seconds(MAX_SESSION_TTL_SECS)
    );
    assert!(engine.refresh_session(&session.token).await.is_ok());
}

#[tokio::test]
async fn hash_cost_must_be_in_range() {
    for cost in [0, MIN_HASH_COST - 1, 32] {
        let built = Engine::builder()
            .database(connect().await)
            .hash_cost(cost)
            .build()
            .await;
        assert!(matches!(built, Err(EngineError::InvalidRange(_))), "{cost}");
    }
}

#[tokio::test]
async fn secrets_are_stored_as_bcrypt_hashes() {
    let db = connect().await;
    let engine = Engine::builder()
        .database(db.clone())
        .hash_cost(MIN_HASH_COST)
        .build()
        .await
        .unwrap();
    engine.create_user(ALICE, "pasture").await.unwrap();

    let row = db
        .query_one(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "SELECT password_hash FROM users WHERE username = ?",
            [ALICE.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    let stored: String = row.try_get("", "password_hash").unwrap();
    assert!(stored.starts_with("$2b$04$"));
    assert!(!stored.contains("pasture"));

    assert!(engine.sign_in(ALICE, "pasture").await.is_ok());
    assert_eq!(
        engine.sign_in(ALICE, "Pasture").await.unwrap_err(),
        EngineError::InvalidCredentials
    );
}

#[tokio::test]
async fn overlong_secret_is_rejected() {
    let engine = engine_with_db().await;
    let secret = "x".repeat(73);
    assert!(matches!(
        engine.create_user("carol@farm.test", &secret).await,
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn window_filtering_happens_before_summary() {
    let engine = engine_with_db().await;
    engine
        .insert_production(ALICE, &production(day(1), 120.0))
        .await
        .unwrap();
    engine
        .insert_sale(ALICE, &sale(day(1), 100.0, 250))
        .await
        .unwrap();
    engine.insert_expense(ALICE, &expense(day(2), 30000)).await.unwrap();

    let window = Window::new(day(1), day(1)).unwrap();
    let filter = window.filter();
    let productions = engine.list_production(ALICE, &filter).await.unwrap();
    let sales = engine.list_sales(ALICE, &filter).await.unwrap();
    let expenses = engine.list_expenses(ALICE, &filter).await.unwrap();

    let summary = compute_summary(&productions, &sales, &expenses, window.days());
    assert_eq!(summary.total_production_liters, 120.0);
    assert_eq!(summary.average_daily_production_liters, 120.0);
    assert_eq!(summary.total_revenue, Money::new(25000));
    assert_eq!(summary.total_expenses, Money::ZERO);
    assert_eq!(summary.net_profit, Money::new(25000));
}
