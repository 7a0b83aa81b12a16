//! Value Object Module

pub mod email;
pub mod ids;
pub mod user_name;
pub mod user_password;
pub mod verification_code;
