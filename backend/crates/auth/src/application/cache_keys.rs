//! Cache key layout

use crate::domain::entity::PresenceKind;
use crate::domain::value_object::ids::UserAuthId;

/// Pending verification code of a target address
pub fn verification_code(target: &str) -> String {
    format!("verification_code:{target}")
}

/// Token generation counter of a user
pub fn token_generation(user_id: UserAuthId) -> String {
    format!("token_generation:{user_id}")
}

pub fn presence(kind: PresenceKind, user_id: UserAuthId) -> String {
    format!("{}:{user_id}", kind.namespace())
}

/// Articles the user has liked (owned by the content subsystem)
pub fn article_like_set(user_id: UserAuthId) -> String {
    format!("article_user_like_set:{user_id}")
}

/// Comments the user has liked (owned by the content subsystem)
pub fn comment_like_set(user_id: UserAuthId) -> String {
    format!("comment_user_like_set:{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let id = UserAuthId::from_raw(42);
        assert_eq!(verification_code("a@x.com"), "verification_code:a@x.com");
        assert_eq!(token_generation(id), "token_generation:42");
        assert_eq!(presence(PresenceKind::Online, id), "online_user:42");
        assert_eq!(presence(PresenceKind::Offline, id), "offline_user:42");
        assert_eq!(article_like_set(id), "article_user_like_set:42");
        assert_eq!(comment_like_set(id), "comment_user_like_set:42");
    }
}
