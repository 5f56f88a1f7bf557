//! Initial database migration.
//!
//! Creates the core tables: users, posts, collections, and saves.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(POSTS_SQL).await?;
        db.execute_unprepared(COLLECTIONS_SQL).await?;
        db.execute_unprepared(SAVES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const USERS_SQL: &str = r"
-- Users: identity fields are immutable after registration
CREATE TABLE users (
    id BIGSERIAL PRIMARY KEY,
    username VARCHAR(64) NOT NULL UNIQUE,
    email VARCHAR(120) NOT NULL UNIQUE,
    password_hash VARCHAR(256) NOT NULL,
    bio VARCHAR(150),
    profile_image_url VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const POSTS_SQL: &str = r"
-- Posts: one content item backed by a stored blob
CREATE TABLE posts (
    id BIGSERIAL PRIMARY KEY,
    title VARCHAR(100),
    description VARCHAR(500),
    file_url VARCHAR(500) NOT NULL,
    file_type VARCHAR(10) NOT NULL CHECK (file_type IN ('image', 'video')),
    thumbnail_url VARCHAR(500),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
);

-- Feed listing (newest first) and per-user listing
CREATE INDEX idx_posts_created ON posts(created_at DESC);
CREATE INDEX idx_posts_user ON posts(user_id, created_at DESC);
";

const COLLECTIONS_SQL: &str = r"
-- Collections: named groupings owned by exactly one user.
-- The (user_id, name) uniqueness backs the default-collection bootstrap:
-- two racing requests can never both insert a 'Saved' collection.
CREATE TABLE collections (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    description VARCHAR(200),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    CONSTRAINT uq_collections_owner_name UNIQUE (user_id, name)
);
";

const SAVES_SQL: &str = r"
-- Saves: join records linking posts into collections.
-- The (post_id, collection_id) uniqueness makes a duplicate save a
-- conflict at the database level, closing the check-then-insert race.
CREATE TABLE saves (
    id BIGSERIAL PRIMARY KEY,
    post_id BIGINT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    collection_id BIGINT NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
    saved_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_saves_post_collection UNIQUE (post_id, collection_id)
);

CREATE INDEX idx_saves_collection ON saves(collection_id, saved_at DESC);
CREATE INDEX idx_saves_post ON saves(post_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS saves CASCADE;
DROP TABLE IF EXISTS collections CASCADE;
DROP TABLE IF EXISTS posts CASCADE;
DROP TABLE IF EXISTS users CASCADE;
";
