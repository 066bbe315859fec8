//! Shared utilities

pub mod codec;
pub mod hashing;

pub use hashing::{sha256, sha256_prefixed};
