//! `SeaORM` entity definitions.

pub mod collections;
pub mod posts;
pub mod saves;
pub mod sessions;
pub mod users;
