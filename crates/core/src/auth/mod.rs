//! Authentication primitives.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - Password policy checks

mod password;

pub use password::{MIN_PASSWORD_LENGTH, PasswordError, hash_password, validate_password, verify_password};
