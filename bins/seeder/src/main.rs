//! Database seeder for Pinboard development and testing.
//!
//! Seeds a demo user with a couple of posts and a save, for local
//! development against a migrated database.
//!
//! Usage: cargo run --bin seeder

use pinboard_core::auth::hash_password;
use pinboard_db::repositories::{
    CreatePostInput, PostRepository, SaveRepository, UserError, UserRepository,
};
use sea_orm::DatabaseConnection;

const DEMO_USERNAME: &str = "demo";
const DEMO_EMAIL: &str = "demo@pinboard.dev";
const DEMO_PASSWORD: &str = "password123";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = pinboard_db::connect(&database_url, 5, 1)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo user...");
    let user_id = seed_demo_user(&db).await;

    println!("Seeding demo posts...");
    seed_demo_posts(&db, user_id).await;

    println!("Seeding complete!");
}

async fn seed_demo_user(db: &DatabaseConnection) -> i64 {
    let repo = UserRepository::new(db.clone());

    let password_hash = hash_password(DEMO_PASSWORD).expect("Failed to hash demo password");

    match repo.create(DEMO_USERNAME, DEMO_EMAIL, &password_hash).await {
        Ok(user) => user.id,
        Err(UserError::UsernameTaken | UserError::EmailTaken) => {
            println!("Demo user already exists, reusing it");
            repo.find_by_email(DEMO_EMAIL)
                .await
                .expect("Failed to look up demo user")
                .expect("Demo user should exist")
                .id
        }
        Err(e) => panic!("Failed to seed demo user: {e}"),
    }
}

async fn seed_demo_posts(db: &DatabaseConnection, user_id: i64) {
    let posts = PostRepository::new(db.clone());

    let existing = posts
        .list_by_user(user_id)
        .await
        .expect("Failed to list demo posts");
    if !existing.is_empty() {
        println!("Demo posts already exist, skipping");
        return;
    }

    let first = posts
        .create(CreatePostInput {
            title: Some("Sunset over the bay".to_string()),
            description: Some("Golden hour from the pier".to_string()),
            file_url: "/static/uploads/images/sunset.jpg".to_string(),
            file_type: "image".to_string(),
            thumbnail_url: None,
            user_id,
        })
        .await
        .expect("Failed to seed first post");

    posts
        .create(CreatePostInput {
            title: Some("Surf session".to_string()),
            description: None,
            file_url: "/static/uploads/videos/surf.mp4".to_string(),
            file_type: "video".to_string(),
            thumbnail_url: None,
            user_id,
        })
        .await
        .expect("Failed to seed second post");

    SaveRepository::new(db.clone())
        .save_post(user_id, first.id, None)
        .await
        .expect("Failed to seed save");
}
