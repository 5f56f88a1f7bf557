//! Integration tests for the user repository.
//!
//! These tests run against the database named by `DATABASE_URL` and are
//! skipped when the variable is not set.

use pinboard_db::UserRepository;
use pinboard_db::entities::users;
use pinboard_db::migration::{Migrator, MigratorTrait};
use pinboard_db::repositories::UserError;
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
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

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

const TEST_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$dGVzdHNhbHQ$test";

#[tokio::test]
async fn test_create_and_find_user() {
    let Some(db) = test_db().await else { return };
    let repo = UserRepository::new(db);

    let username = unique("alice");
    let email = format!("{username}@example.com");

    let user = repo
        .create(&username, &email, TEST_HASH)
        .await
        .expect("registration should succeed");

    assert_eq!(user.username, username);
    assert_eq!(user.email, email);
    assert!(user.bio.is_none());

    let found = repo
        .find_by_email(&email)
        .await
        .expect("query should succeed")
        .expect("user should exist");
    assert_eq!(found.id, user.id);

    let found = repo
        .find_by_username(&username)
        .await
        .expect("query should succeed")
        .expect("user should exist");
    assert_eq!(found.id, user.id);
}

#[tokio::test]
async fn test_duplicate_email_creates_no_row() {
    let Some(db) = test_db().await else { return };
    let repo = UserRepository::new(db.clone());

    let email = format!("{}@example.com", unique("dup"));
    repo.create(&unique("first"), &email, TEST_HASH)
        .await
        .expect("first registration should succeed");

    let before = users::Entity::find()
        .count(&db)
        .await
        .expect("count should succeed");

    let err = repo
        .create(&unique("second"), &email, TEST_HASH)
        .await
        .expect_err("duplicate email must be rejected");
    assert!(matches!(err, UserError::EmailTaken));

    let after = users::Entity::find()
        .count(&db)
        .await
        .expect("count should succeed");
    assert_eq!(before, after, "rejected registration must not write a row");
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let Some(db) = test_db().await else { return };
    let repo = UserRepository::new(db);

    let username = unique("taken");
    repo.create(&username, &format!("{}@example.com", unique("a")), TEST_HASH)
        .await
        .expect("first registration should succeed");

    let err = repo
        .create(&username, &format!("{}@example.com", unique("b")), TEST_HASH)
        .await
        .expect_err("duplicate username must be rejected");
    assert!(matches!(err, UserError::UsernameTaken));
}

#[tokio::test]
async fn test_search_by_username() {
    let Some(db) = test_db().await else { return };
    let repo = UserRepository::new(db.clone());

    let marker = Uuid::new_v4().simple().to_string();
    let username = format!("finder-{marker}");
    repo.create(&username, &format!("{username}@example.com"), TEST_HASH)
        .await
        .expect("registration should succeed");

    // case-insensitive substring match
    let results = repo
        .search_by_username(&marker.to_uppercase(), 10)
        .await
        .expect("search should succeed");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].username, username);

    let cleanup = users::Entity::delete_many()
        .filter(users::Column::Username.eq(username))
        .exec(&db)
        .await
        .expect("cleanup should succeed");
    assert_eq!(cleanup.rows_affected, 1);
}
