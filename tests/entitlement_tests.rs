//! Integration tests for two-tier entitlement resolution and seeding.

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sam_api::models::{feature_flag, user_feature};
use sam_api::repositories::EntitlementRepository;
use sam_api::seeds::seed_feature_flags;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::sync::Arc;
use uuid::Uuid;

async fn test_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

async fn insert_global_flag(db: &DatabaseConnection, feature: &str, is_enabled: bool) {
    feature_flag::ActiveModel {
        feature: Set(feature.to_string()),
        is_enabled: Set(is_enabled),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("insert feature flag");
}

async fn insert_user_override(
    db: &DatabaseConnection,
    user_id: Uuid,
    feature: &str,
    enabled: bool,
) {
    user_feature::ActiveModel {
        user_id: Set(user_id),
        feature: Set(feature.to_string()),
        enabled: Set(enabled),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("insert user feature");
}

#[tokio::test]
async fn missing_everything_resolves_disabled() {
    let db = test_db().await;
    let repo = EntitlementRepository::new(Arc::new(db));

    let enabled = repo
        .is_feature_enabled(Uuid::new_v4(), "generador")
        .await
        .unwrap();
    assert!(!enabled);
}

#[tokio::test]
async fn global_flag_applies_without_override() {
    let db = test_db().await;
    insert_global_flag(&db, "generador", true).await;

    let repo = EntitlementRepository::new(Arc::new(db));
    let enabled = repo
        .is_feature_enabled(Uuid::new_v4(), "generador")
        .await
        .unwrap();
    assert!(enabled);
}

#[tokio::test]
async fn user_override_beats_global_flag() {
    let db = test_db().await;
    let user_id = Uuid::new_v4();

    insert_global_flag(&db, "generador", true).await;
    insert_user_override(&db, user_id, "generador", false).await;

    let repo = EntitlementRepository::new(Arc::new(db));
    assert!(!repo.is_feature_enabled(user_id, "generador").await.unwrap());

    // Other users still get the global resolution.
    assert!(
        repo.is_feature_enabled(Uuid::new_v4(), "generador")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn user_override_enables_despite_disabled_global() {
    let db = test_db().await;
    let user_id = Uuid::new_v4();

    insert_global_flag(&db, "beta-reportes", false).await;
    insert_user_override(&db, user_id, "beta-reportes", true).await;

    let repo = EntitlementRepository::new(Arc::new(db));
    assert!(
        repo.is_feature_enabled(user_id, "beta-reportes")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn overrides_are_scoped_per_feature() {
    let db = test_db().await;
    let user_id = Uuid::new_v4();

    insert_user_override(&db, user_id, "generador", true).await;

    let repo = EntitlementRepository::new(Arc::new(db));
    assert!(repo.is_feature_enabled(user_id, "generador").await.unwrap());
    assert!(!repo.is_feature_enabled(user_id, "reportes").await.unwrap());
}

#[tokio::test]
async fn seeding_enables_generator_and_is_idempotent() {
    let db = test_db().await;

    seed_feature_flags(&db).await.expect("seed once");
    seed_feature_flags(&db).await.expect("seed twice");

    let repo = EntitlementRepository::new(Arc::new(db));
    assert!(
        repo.is_feature_enabled(Uuid::new_v4(), "generador")
            .await
            .unwrap()
    );
}
