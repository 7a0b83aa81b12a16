//! Presence markers

use std::fmt;

/// The two independent per-user presence markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresenceKind {
    Online,
    Offline,
}

impl PresenceKind {
    /// Cache namespace of the marker
    pub fn namespace(&self) -> &'static str {
        match self {
            PresenceKind::Online => "online_user",
            PresenceKind::Offline => "offline_user",
        }
    }
}

impl fmt::Display for PresenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenceKind::Online => f.write_str("online"),
            PresenceKind::Offline => f.write_str("offline"),
        }
    }
}
