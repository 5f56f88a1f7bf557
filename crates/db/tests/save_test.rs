//! Integration tests for the save relationship model: default-collection
//! targeting, duplicate conflicts, and unsave-everywhere semantics.

use pinboard_db::migration::{Migrator, MigratorTrait};
use pinboard_db::repositories::{
    CollectionRepository, CreatePostInput, DEFAULT_COLLECTION_NAME, PostRepository, SaveError,
    SaveRepository, UserRepository,
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
    let username = format!("saver-{}", Uuid::new_v4());
    UserRepository::new(db.clone())
        .create(&username, &format!("{username}@example.com"), TEST_HASH)
        .await
        .expect("registration should succeed")
        .id
}

async fn create_post(db: &DatabaseConnection, user_id: i64) -> i64 {
    PostRepository::new(db.clone())
        .create(CreatePostInput {
            title: Some("cat".to_string()),
            description: None,
            file_url: format!("/static/uploads/images/{}.jpg", Uuid::new_v4()),
            file_type: "image".to_string(),
            thumbnail_url: None,
            user_id,
        })
        .await
        .expect("post creation should succeed")
        .id
}

#[tokio::test]
async fn test_save_targets_default_collection() {
    let Some(db) = test_db().await else { return };
    let user_id = create_user(&db).await;
    let post_id = create_post(&db, user_id).await;
    let saves = SaveRepository::new(db.clone());

    let save = saves
        .save_post(user_id, post_id, None)
        .await
        .expect("save should succeed");

    let default = CollectionRepository::new(db)
        .ensure_default(user_id)
        .await
        .expect("default collection exists");
    assert_eq!(save.collection_id, default.id);
    assert_eq!(default.name, DEFAULT_COLLECTION_NAME);

    assert!(
        saves
            .is_saved_by_user(user_id, post_id)
            .await
            .expect("lookup should succeed")
    );
    assert_eq!(
        saves.save_count(post_id).await.expect("count should succeed"),
        1
    );
}

#[tokio::test]
async fn test_duplicate_save_is_conflict() {
    let Some(db) = test_db().await else { return };
    let user_id = create_user(&db).await;
    let post_id = create_post(&db, user_id).await;
    let saves = SaveRepository::new(db);

    saves
        .save_post(user_id, post_id, None)
        .await
        .expect("first save should succeed");

    let err = saves
        .save_post(user_id, post_id, None)
        .await
        .expect_err("second save must conflict");
    assert!(matches!(err, SaveError::AlreadySaved));

    // exactly one, not two
    assert_eq!(
        saves.save_count(post_id).await.expect("count should succeed"),
        1
    );
}

#[tokio::test]
async fn test_untargeted_unsave_removes_everywhere() {
    let Some(db) = test_db().await else { return };
    let user_id = create_user(&db).await;
    let post_id = create_post(&db, user_id).await;
    let saves = SaveRepository::new(db.clone());

    let second = CollectionRepository::new(db)
        .create(user_id, "Trips", None)
        .await
        .expect("collection creation should succeed");

    saves
        .save_post(user_id, post_id, None)
        .await
        .expect("save to default should succeed");
    saves
        .save_post(user_id, post_id, Some(second.id))
        .await
        .expect("save to second collection should succeed");
    assert_eq!(
        saves.save_count(post_id).await.expect("count should succeed"),
        2
    );

    let removed = saves
        .unsave_post(user_id, post_id, None)
        .await
        .expect("unsave should succeed");
    assert_eq!(removed, 2, "one call removes the post from both collections");

    assert!(
        !saves
            .is_saved_by_user(user_id, post_id)
            .await
            .expect("lookup should succeed")
    );

    let err = saves
        .unsave_post(user_id, post_id, None)
        .await
        .expect_err("nothing left to unsave");
    assert!(matches!(err, SaveError::NotSaved));
}

#[tokio::test]
async fn test_targeted_unsave_leaves_other_collections() {
    let Some(db) = test_db().await else { return };
    let user_id = create_user(&db).await;
    let post_id = create_post(&db, user_id).await;
    let saves = SaveRepository::new(db.clone());

    let second = CollectionRepository::new(db)
        .create(user_id, "Keep", None)
        .await
        .expect("collection creation should succeed");

    saves
        .save_post(user_id, post_id, None)
        .await
        .expect("save to default should succeed");
    saves
        .save_post(user_id, post_id, Some(second.id))
        .await
        .expect("save to second collection should succeed");

    let removed = saves
        .unsave_post(user_id, post_id, Some(second.id))
        .await
        .expect("targeted unsave should succeed");
    assert_eq!(removed, 1);

    assert!(
        saves
            .is_saved_by_user(user_id, post_id)
            .await
            .expect("lookup should succeed"),
        "the default-collection save must survive"
    );
}

#[tokio::test]
async fn test_foreign_collection_is_rejected() {
    let Some(db) = test_db().await else { return };
    let owner = create_user(&db).await;
    let intruder = create_user(&db).await;
    let post_id = create_post(&db, owner).await;
    let saves = SaveRepository::new(db.clone());

    let theirs = CollectionRepository::new(db)
        .ensure_default(owner)
        .await
        .expect("default collection exists");

    let err = saves
        .save_post(intruder, post_id, Some(theirs.id))
        .await
        .expect_err("saving into a foreign collection must fail");
    assert!(matches!(err, SaveError::NotOwner));

    let err = saves
        .unsave_post(intruder, post_id, Some(theirs.id))
        .await
        .expect_err("unsaving from a foreign collection must fail");
    assert!(matches!(err, SaveError::NotOwner));
}

#[tokio::test]
async fn test_missing_rows_are_not_found() {
    let Some(db) = test_db().await else { return };
    let user_id = create_user(&db).await;
    let post_id = create_post(&db, user_id).await;
    let saves = SaveRepository::new(db);

    let err = saves
        .save_post(user_id, i64::MAX, None)
        .await
        .expect_err("unknown post must fail");
    assert!(matches!(err, SaveError::PostNotFound(_)));

    let err = saves
        .save_post(user_id, post_id, Some(i64::MAX))
        .await
        .expect_err("unknown collection must fail");
    assert!(matches!(err, SaveError::CollectionNotFound(_)));

    let err = saves
        .unsave_post(user_id, post_id, None)
        .await
        .expect_err("never-saved post must report not saved");
    assert!(matches!(err, SaveError::NotSaved));
}

#[tokio::test]
async fn test_save_count_spans_users() {
    let Some(db) = test_db().await else { return };
    let author = create_user(&db).await;
    let fan = create_user(&db).await;
    let post_id = create_post(&db, author).await;
    let saves = SaveRepository::new(db);

    saves
        .save_post(author, post_id, None)
        .await
        .expect("author save should succeed");
    saves
        .save_post(fan, post_id, None)
        .await
        .expect("fan save should succeed");

    assert_eq!(
        saves.save_count(post_id).await.expect("count should succeed"),
        2
    );
}
