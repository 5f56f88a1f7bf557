//! Blob storage for uploaded media using Apache OpenDAL.
//!
//! One [`MediaStore`] fronts both backend variants:
//! - Local filesystem under a public static prefix (development)
//! - S3-compatible object stores (Cloudflare R2, Supabase, AWS S3)
//!
//! Every operation runs under a bounded timeout. A transient failure on a
//! remote upload falls back once to a raw HTTP PUT against a presigned URL
//! before the error is surfaced; nothing here ever retries in a loop.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{MediaStore, StoredMedia};
