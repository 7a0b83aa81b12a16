//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Random numeric codes
//! - Password hashing (Argon2id)
//! - Cookie management
//! - Client identification (IP, user agent, bearer token, coarse location)

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
