//! Role Entity

use serde::Serialize;

use crate::domain::value_object::ids::RoleId;

/// Named permission grouping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: RoleId,
    /// Unique machine name, used to resolve the default role
    pub name: String,
    /// Human readable label
    pub label: String,
}
