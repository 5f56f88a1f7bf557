//! Integration tests for the collection repository and the
//! default-collection bootstrap.

use pinboard_db::migration::{Migrator, MigratorTrait};
use pinboard_db::repositories::{
    CollectionError, CollectionRepository, DEFAULT_COLLECTION_DESCRIPTION, DEFAULT_COLLECTION_NAME,
    UserRepository,
};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

static MIGRATED: tokio::sync::OnceCell<()> = tokio::sync::OnceCell::const_new();

async fn test_db() -> Option<DatabaseConnection> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("skipping: DATABASE_URL not set");
        return None;
    };
    let db = Database::connect(&url)
        .await
        .expect("failed to connect to database");
    // run migrations once per test binary, not once per parallel test
    MIGRATED
        .get_or_init(|| async {
            Migrator::up(&db, None)
                .await
                .expect("failed to run migrations");
        })
        .await;
    Some(db)
}

const TEST_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$dGVzdHNhbHQ$test";

async fn create_user(db: &DatabaseConnection) -> i64 {
    let username = format!("coll-{}", Uuid::new_v4());
    UserRepository::new(db.clone())
        .create(&username, &format!("{username}@example.com"), TEST_HASH)
        .await
        .expect("registration should succeed")
        .id
}

#[tokio::test]
async fn test_registration_bootstraps_default_collection() {
    let Some(db) = test_db().await else { return };
    let user_id = create_user(&db).await;
    let repo = CollectionRepository::new(db);

    let collections = repo
        .list_by_user(user_id)
        .await
        .expect("list should succeed");
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].name, DEFAULT_COLLECTION_NAME);
    assert_eq!(
        collections[0].description.as_deref(),
        Some(DEFAULT_COLLECTION_DESCRIPTION)
    );
}

#[tokio::test]
async fn test_ensure_default_is_idempotent() {
    let Some(db) = test_db().await else { return };
    let user_id = create_user(&db).await;
    let repo = CollectionRepository::new(db);

    let first = repo
        .ensure_default(user_id)
        .await
        .expect("ensure should succeed");
    let second = repo
        .ensure_default(user_id)
        .await
        .expect("ensure should succeed");

    // the registration-time row, returned both times
    assert_eq!(first.id, second.id);

    let saved: Vec<_> = repo
        .list_by_user(user_id)
        .await
        .expect("list should succeed")
        .into_iter()
        .filter(|c| c.name == DEFAULT_COLLECTION_NAME)
        .collect();
    assert_eq!(saved.len(), 1, "exactly one 'Saved' collection may exist");
}

#[tokio::test]
async fn test_create_named_collection() {
    let Some(db) = test_db().await else { return };
    let user_id = create_user(&db).await;
    let repo = CollectionRepository::new(db);

    let collection = repo
        .create(user_id, "Trips", Some("Places to go"))
        .await
        .expect("create should succeed");
    assert_eq!(collection.name, "Trips");
    assert_eq!(collection.user_id, user_id);

    let err = repo
        .create(user_id, "Trips", None)
        .await
        .expect_err("duplicate name must be rejected");
    assert!(matches!(err, CollectionError::NameTaken(_)));
}

#[tokio::test]
async fn test_same_name_allowed_across_users() {
    let Some(db) = test_db().await else { return };
    let first = create_user(&db).await;
    let second = create_user(&db).await;
    let repo = CollectionRepository::new(db);

    repo.create(first, "Inspiration", None)
        .await
        .expect("create should succeed");
    repo.create(second, "Inspiration", None)
        .await
        .expect("same name under another user should succeed");
}
