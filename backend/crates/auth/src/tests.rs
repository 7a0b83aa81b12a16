//! Behavioural tests of the auth use cases and routes on in-memory backends

use std::sync::Arc;
use std::time::Duration;

use crate::application::cache_keys;
use crate::application::config::AuthConfig;
use crate::application::session_manager::{AuthMethod, AuthSessionManager, ClientContext};
use crate::application::{LoginInput, LoginOutput, RegisterInput};
use crate::domain::entity::{PresenceKind, Role};
use crate::domain::repository::{CacheStore, CredentialStore, SessionRepository};
use crate::domain::value_object::user_name::UserName;
use crate::error::{AuthError, AuthResult};
use crate::infra::memory::{
    MemoryCacheStore, MemoryCredentialStore, MemoryMailbox, MemorySessionRepository,
};

type TestManager = AuthSessionManager<
    MemoryCredentialStore,
    MemoryCacheStore,
    MemorySessionRepository,
    MemoryMailbox,
>;

struct Harness {
    credentials: Arc<MemoryCredentialStore>,
    cache: Arc<MemoryCacheStore>,
    sessions: Arc<MemorySessionRepository>,
    mailbox: Arc<MemoryMailbox>,
    manager: Arc<TestManager>,
}

fn harness_with(credentials: MemoryCredentialStore, mailbox: MemoryMailbox) -> Harness {
    let credentials = Arc::new(credentials);
    let cache = Arc::new(MemoryCacheStore::new());
    let sessions = Arc::new(MemorySessionRepository::new());
    let mailbox = Arc::new(mailbox);
    let manager = Arc::new(AuthSessionManager::new(
        credentials.clone(),
        cache.clone(),
        sessions.clone(),
        mailbox.clone(),
        Arc::new(AuthConfig::development()),
    ));

    Harness {
        credentials,
        cache,
        sessions,
        mailbox,
        manager,
    }
}

fn harness() -> Harness {
    harness_with(MemoryCredentialStore::seeded(), MemoryMailbox::new())
}

fn client() -> ClientContext {
    ClientContext {
        ip: Some("203.0.113.7".parse().unwrap()),
        user_agent: Some("test-agent".to_string()),
    }
}

impl Harness {
    async fn pending_code(&self, target: &str) -> Option<String> {
        self.cache
            .get(&cache_keys::verification_code(target))
            .await
            .unwrap()
    }

    async fn send_and_read_code(&self, target: &str) -> String {
        self.manager.codes().send_code(target).await.unwrap();
        self.pending_code(target).await.unwrap()
    }

    async fn register(&self, username: &str, password: &str, code: &str) -> AuthResult<Role> {
        self.manager
            .register(
                RegisterInput {
                    username: username.to_string(),
                    password: password.to_string(),
                    code: code.to_string(),
                },
                client(),
            )
            .await
    }

    async fn register_user(&self, username: &str, password: &str) {
        let code = self.send_and_read_code(username).await;
        self.register(username, password, &code).await.unwrap();
    }

    async fn login(&self, username: &str, password: &str) -> AuthResult<LoginOutput> {
        self.manager
            .login(
                LoginInput {
                    username: username.to_string(),
                    password: password.to_string(),
                },
                client(),
            )
            .await
    }
}

#[cfg(test)]
mod verification_code_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_send_code_stores_code_for_configured_minutes() {
        let h = harness();
        let code = h.send_and_read_code("a@x.com").await;
        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| b.is_ascii_digit()));

        let mail = h.mailbox.last_to("a@x.com").await.unwrap();
        assert_eq!(mail.subject, "Register account");
        assert!(mail.html_body.contains(&code));
        assert!(mail.html_body.contains('5'));

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(h.pending_code("a@x.com").await, Some(code.clone()));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(h.pending_code("a@x.com").await, None);

        let err = h.register("a@x.com", "pw1234", &code).await.unwrap_err();
        assert!(matches!(err, AuthError::VerificationCodeExpired));
        assert_eq!(h.credentials.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_send_code_replaces_pending_code() {
        let h = harness();
        h.manager.codes().send_code("a@x.com").await.unwrap();
        h.manager.codes().send_code("a@x.com").await.unwrap();

        let pending = h.pending_code("a@x.com").await.unwrap();
        let last = h.mailbox.last_to("a@x.com").await.unwrap();
        assert!(last.html_body.contains(&pending));
        assert_eq!(h.mailbox.sent().await.len(), 2);
    }

    #[tokio::test]
    async fn test_send_code_target_is_case_insensitive() {
        let h = harness();
        h.manager.codes().send_code(" A@X.com ").await.unwrap();
        assert!(h.pending_code("a@x.com").await.is_some());
        assert!(h.mailbox.last_to("a@x.com").await.is_some());
    }

    #[tokio::test]
    async fn test_send_code_rejects_invalid_target() {
        let h = harness();
        let err = h.manager.codes().send_code("not-an-email").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest(_)));
        assert!(h.mailbox.sent().await.is_empty());
        assert_eq!(h.cache.entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_code_is_only_sent_to_registrable_addresses() {
        use crate::domain::value_object::user_name::USER_NAME_MAX_LENGTH;

        let h = harness();
        let longest = format!("{}@x.com", "a".repeat(USER_NAME_MAX_LENGTH - 6));
        h.register_user(&longest, "pw1234").await;
        assert_eq!(h.credentials.user_count().await, 1);

        let too_long = format!("{}@x.com", "b".repeat(USER_NAME_MAX_LENGTH - 5));
        let err = h.manager.codes().send_code(&too_long).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest(_)));
        assert!(h.pending_code(&too_long).await.is_none());
        assert!(h.mailbox.last_to(&too_long).await.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_mail_send_error() {
        let h = harness_with(MemoryCredentialStore::seeded(), MemoryMailbox::failing());
        let err = h.manager.codes().send_code("a@x.com").await.unwrap_err();
        assert!(matches!(err, AuthError::MailSend(_)));
        // The cache write is not rolled back
        assert!(h.pending_code("a@x.com").await.is_some());
    }

    #[tokio::test]
    async fn test_unreadable_template_is_mail_send_error() {
        let credentials = Arc::new(MemoryCredentialStore::seeded());
        let cache = Arc::new(MemoryCacheStore::new());
        let mailbox = Arc::new(MemoryMailbox::new());
        let config = AuthConfig {
            email_template_path: Some("/nonexistent/verification.html".into()),
            ..AuthConfig::development()
        };
        let manager = AuthSessionManager::new(
            credentials,
            cache.clone(),
            Arc::new(MemorySessionRepository::new()),
            mailbox.clone(),
            Arc::new(config),
        );

        let err = manager.codes().send_code("a@x.com").await.unwrap_err();
        assert!(matches!(err, AuthError::MailSend(_)));
        assert!(mailbox.sent().await.is_empty());
        assert_eq!(cache.entry_count().await, 0);
    }
}

#[cfg(test)]
mod register_tests {
    use super::*;

    #[tokio::test]
    async fn test_register_with_matching_code() {
        let h = harness();
        let code = h.send_and_read_code("a@x.com").await;

        let role = h.register("a@x.com", "pw1234", &code).await.unwrap();
        assert_eq!(role.name, "user");

        let username = UserName::new("a@x.com").unwrap();
        let user = h
            .credentials
            .find_user_auth_by_username(&username)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.username.original(), "a@x.com");
        assert_eq!(user.login_type, 1);
        assert_eq!(user.ip_source.as_deref(), Some("internet"));

        let role_ids = h.credentials.find_role_ids_by_user_id(user.id).await.unwrap();
        assert_eq!(role_ids, vec![role.id]);

        let profile = h
            .credentials
            .find_user_profile_by_id(user.profile_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.nickname, "a@x.com");
        assert_eq!(profile.email, "a@x.com");
        assert!(!profile.avatar.is_empty());
        assert!(!profile.website.is_empty());

        assert_eq!(h.credentials.user_count().await, 1);
        assert_eq!(h.credentials.profile_count().await, 1);
    }

    #[tokio::test]
    async fn test_mismatched_code_is_rejected_and_kept() {
        let h = harness();
        let code = h.send_and_read_code("a@x.com").await;
        let wrong = if code == "000000" { "111111" } else { "000000" };

        let err = h.register("a@x.com", "pw1234", wrong).await.unwrap_err();
        assert!(matches!(err, AuthError::VerificationCodeMismatch));
        assert_eq!(h.credentials.user_count().await, 0);
        assert_eq!(h.pending_code("a@x.com").await, Some(code.clone()));

        h.register("a@x.com", "pw1234", &code).await.unwrap();
    }

    #[tokio::test]
    async fn test_code_registers_one_account_only() {
        let h = harness();
        let code = h.send_and_read_code("a@x.com").await;
        h.register("a@x.com", "pw1234", &code).await.unwrap();

        let err = h.register("a@x.com", "pw1234", &code).await.unwrap_err();
        assert!(matches!(err, AuthError::VerificationCodeExpired));
    }

    #[tokio::test]
    async fn test_concurrent_registrations_consume_code_once() {
        let h = harness();
        let code = h.send_and_read_code("a@x.com").await;

        let (first, second) = tokio::join!(
            h.register("a@x.com", "pw1234", &code),
            h.register("a@x.com", "pw5678", &code),
        );
        assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
        assert_eq!(h.credentials.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_leaves_no_partial_records() {
        let h = harness();
        h.register_user("a@x.com", "pw1234").await;

        let code = h.send_and_read_code("a@x.com").await;
        let err = h.register("a@x.com", "other1", &code).await.unwrap_err();
        assert!(matches!(err, AuthError::RegistrationFailed(_)));
        assert_eq!(h.credentials.user_count().await, 1);
        assert_eq!(h.credentials.profile_count().await, 1);
    }

    #[tokio::test]
    async fn test_missing_default_role_fails_hard() {
        let h = harness_with(MemoryCredentialStore::new(), MemoryMailbox::new());
        let code = h.send_and_read_code("a@x.com").await;

        let err = h.register("a@x.com", "pw1234", &code).await.unwrap_err();
        assert!(matches!(err, AuthError::RegistrationFailed(_)));
        assert_eq!(h.credentials.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_register_input() {
        let h = harness();
        let code = h.send_and_read_code("a@x.com").await;
        let too_long = "p".repeat(21);

        for (username, password, code) in [
            ("a@x.com", "abc", code.as_str()),
            ("a@x.com", too_long.as_str(), code.as_str()),
            ("a@x.com", "pw1234", "12ab56"),
            ("", "pw1234", code.as_str()),
        ] {
            let err = h.register(username, password, code).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidRequest(_)), "{username:?} {password:?}");
        }

        // Validation runs before the code is consumed
        assert!(h.pending_code("a@x.com").await.is_some());
    }
}

#[cfg(test)]
mod login_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_returns_token_and_profile_view() {
        let h = harness();
        h.register_user("a@x.com", "pw1234").await;

        let username = UserName::new("a@x.com").unwrap();
        let user = h
            .credentials
            .find_user_auth_by_username(&username)
            .await
            .unwrap()
            .unwrap();
        h.cache
            .sadd(&cache_keys::article_like_set(user.id), "12")
            .await
            .unwrap();
        h.cache
            .sadd(&cache_keys::article_like_set(user.id), "7")
            .await
            .unwrap();
        h.manager
            .presence()
            .set(PresenceKind::Offline, user.id)
            .await
            .unwrap();

        let output = h.login("a@x.com", "pw1234").await.unwrap();
        let view = &output.view;
        assert_eq!(view.user_id, user.id);
        assert_eq!(view.nickname, "a@x.com");
        assert_eq!(view.article_like_set, vec!["12", "7"]);
        assert!(view.comment_like_set.is_empty());
        assert_eq!(view.role_ids.len(), 1);

        let claims = h.manager.tokens().verify(&view.token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.role_ids, view.role_ids);
        assert_eq!(claims.generation, 0);

        let stored = h.credentials.find_user_auth_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(stored.ip_source.as_deref(), Some("internet"));
        assert!(stored.last_login_at.is_some());

        assert_eq!(h.sessions.count_for_user(user.id).await, 1);
        assert!(
            !h.manager
                .presence()
                .is_set(PresenceKind::Offline, user.id)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_wrong_password_issues_nothing() {
        let h = harness();
        h.register_user("a@x.com", "pw1234").await;
        let entries = h.cache.entry_count().await;

        let err = h.login("a@x.com", "pw12345").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(h.sessions.session_count().await, 0);
        assert_eq!(h.cache.entry_count().await, entries);

        let username = UserName::new("a@x.com").unwrap();
        let user = h
            .credentials
            .find_user_auth_by_username(&username)
            .await
            .unwrap()
            .unwrap();
        assert!(user.last_login_at.is_none());
    }

    #[tokio::test]
    async fn test_unknown_user_performs_no_writes() {
        let h = harness();

        let err = h.login("nobody@x.com", "pw1234").await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotExist));
        assert_eq!(h.credentials.user_count().await, 0);
        assert_eq!(h.cache.entry_count().await, 0);
        assert_eq!(h.sessions.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_login_name_lookup_is_case_insensitive() {
        let h = harness();
        h.register_user("a@x.com", "pw1234").await;
        let output = h.login("A@X.COM", "pw1234").await.unwrap();
        assert_eq!(output.view.username, "a@x.com");
    }

    #[tokio::test]
    async fn test_login_output_debug_hides_credentials() {
        let h = harness();
        h.register_user("a@x.com", "pw1234").await;
        let output = h.login("a@x.com", "pw1234").await.unwrap();

        let debug = format!("{output:?}");
        assert!(debug.contains("a@x.com"));
        assert!(!debug.contains(&output.view.token));
        assert!(!debug.contains(&output.session_cookie));
    }

    #[tokio::test]
    async fn test_like_set_read_failure_aborts_login() {
        let h = harness();
        h.register_user("a@x.com", "pw1234").await;

        let username = UserName::new("a@x.com").unwrap();
        let user = h
            .credentials
            .find_user_auth_by_username(&username)
            .await
            .unwrap()
            .unwrap();
        h.cache
            .set(&cache_keys::comment_like_set(user.id), "corrupt", None)
            .await
            .unwrap();

        let err = h.login("a@x.com", "pw1234").await.unwrap_err();
        assert!(matches!(err, AuthError::Storage(_)));
        assert_eq!(h.sessions.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_logins_both_succeed() {
        let h = harness();
        h.register_user("a@x.com", "pw1234").await;

        let (first, second) = tokio::join!(
            h.login("a@x.com", "pw1234"),
            h.login("a@x.com", "pw1234"),
        );
        let (first, second) = (first.unwrap(), second.unwrap());
        assert_ne!(first.session_cookie, second.session_cookie);
        assert_eq!(h.sessions.session_count().await, 2);
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_token_and_cookie_authenticate() {
        let h = harness();
        h.register_user("a@x.com", "pw1234").await;
        let output = h.login("a@x.com", "pw1234").await.unwrap();

        let by_token = h
            .manager
            .authenticate(Some(&output.view.token), None)
            .await
            .unwrap();
        assert_eq!(by_token.user_id, output.view.user_id);
        assert_eq!(by_token.method, AuthMethod::BearerToken);

        let by_cookie = h
            .manager
            .authenticate(None, Some(&output.session_cookie))
            .await
            .unwrap();
        assert_eq!(by_cookie.user_id, output.view.user_id);
        assert_eq!(by_cookie.role_ids, output.view.role_ids);
        assert!(matches!(by_cookie.method, AuthMethod::Session(_)));

        // An invalid token falls through to the cookie
        let fallback = h
            .manager
            .authenticate(Some("garbage"), Some(&output.session_cookie))
            .await
            .unwrap();
        assert!(matches!(fallback.method, AuthMethod::Session(_)));

        let forged = format!("{}x", output.session_cookie);
        assert!(h.manager.authenticate(None, Some(&forged)).await.is_none());
        assert!(h.manager.authenticate(None, None).await.is_none());
    }

    #[tokio::test]
    async fn test_logout_revokes_sessions_and_tokens() {
        let h = harness();
        h.register_user("a@x.com", "pw1234").await;
        let first = h.login("a@x.com", "pw1234").await.unwrap();
        let second = h.login("a@x.com", "pw1234").await.unwrap();
        let user_id = first.view.user_id;

        let current = h
            .manager
            .authenticate(Some(&first.view.token), None)
            .await
            .unwrap();
        h.manager
            .presence()
            .set(PresenceKind::Online, user_id)
            .await
            .unwrap();

        h.manager.logout(Some(&current)).await.unwrap();

        assert_eq!(h.sessions.count_for_user(user_id).await, 0);
        for output in [&first, &second] {
            assert!(h.manager.authenticate(Some(&output.view.token), None).await.is_none());
            assert!(h.manager.authenticate(None, Some(&output.session_cookie)).await.is_none());
        }
        assert!(
            !h.manager
                .presence()
                .is_set(PresenceKind::Online, user_id)
                .await
                .unwrap()
        );

        // Tokens issued after the logout carry the new generation
        let again = h.login("a@x.com", "pw1234").await.unwrap();
        let claims = h.manager.tokens().verify(&again.view.token).unwrap();
        assert_eq!(claims.generation, 1);
        assert!(h.manager.authenticate(Some(&again.view.token), None).await.is_some());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let h = harness();
        h.register_user("a@x.com", "pw1234").await;
        let output = h.login("a@x.com", "pw1234").await.unwrap();
        let current = h
            .manager
            .authenticate(None, Some(&output.session_cookie))
            .await
            .unwrap();

        h.manager.logout(Some(&current)).await.unwrap();
        h.manager.logout(Some(&current)).await.unwrap();
        h.manager.logout(None).await.unwrap();

        assert_eq!(h.sessions.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_expired_sessions_are_cleaned_up() {
        let h = harness();
        let session = crate::domain::entity::AuthSession::new(
            crate::domain::value_object::ids::UserAuthId::from_raw(1),
            None,
            None,
            chrono::Duration::seconds(-1),
        );
        h.sessions.create(&session).await.unwrap();

        assert!(h.sessions.find_by_id(session.session_id).await.unwrap().is_none());
        assert_eq!(h.sessions.cleanup_expired().await.unwrap(), 1);
        assert_eq!(h.sessions.session_count().await, 0);
    }
}

#[cfg(test)]
mod presence_tests {
    use super::*;
    use crate::domain::value_object::ids::UserAuthId;

    #[tokio::test(start_paused = true)]
    async fn test_markers_are_independent_and_expire() {
        let h = harness();
        let presence = h.manager.presence();
        let id = UserAuthId::from_raw(9);

        assert!(!presence.is_set(PresenceKind::Online, id).await.unwrap());
        presence.set(PresenceKind::Online, id).await.unwrap();
        presence.set(PresenceKind::Offline, id).await.unwrap();
        assert!(presence.is_set(PresenceKind::Online, id).await.unwrap());
        assert!(presence.is_set(PresenceKind::Offline, id).await.unwrap());

        assert!(presence.clear(PresenceKind::Offline, id).await.unwrap());
        assert!(!presence.clear(PresenceKind::Offline, id).await.unwrap());
        assert!(presence.is_set(PresenceKind::Online, id).await.unwrap());

        tokio::time::advance(Duration::from_secs(10 * 60 + 1)).await;
        assert!(!presence.is_set(PresenceKind::Online, id).await.unwrap());
    }
}

#[cfg(test)]
mod router_tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::presentation::router::auth_router;

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_full_flow() {
        let h = harness();
        let app = auth_router(h.manager.clone());

        let (status, _, body) = call(&app, get("/code?email=a@x.com", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 0);
        let code = h.pending_code("a@x.com").await.unwrap();

        let (status, _, body) = call(
            &app,
            post_json(
                "/register",
                json!({"username": "a@x.com", "password": "pw1234", "code": code}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "user");

        let (status, headers, body) = call(
            &app,
            post_json("/login", json!({"username": "a@x.com", "password": "pw1234"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let cookie = headers[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("auth_session="));
        assert!(cookie.contains("HttpOnly"));
        assert_eq!(body["data"]["username"], "a@x.com");
        assert_eq!(body["data"]["ip_source"], "unknown");
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let (_, _, body) = call(&app, get("/status", Some(&token))).await;
        assert_eq!(body["data"]["authenticated"], true);
        assert_eq!(body["data"]["online"], true);

        let logout = Request::builder()
            .method("POST")
            .uri("/logout")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = call(&app, logout).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 0);
        assert!(
            headers[header::SET_COOKIE]
                .to_str()
                .unwrap()
                .contains("Max-Age=0")
        );

        let (_, _, body) = call(&app, get("/status", Some(&token))).await;
        assert_eq!(body["data"]["authenticated"], false);
    }

    #[tokio::test]
    async fn test_session_cookie_authenticates_status() {
        let h = harness();
        h.register_user("a@x.com", "pw1234").await;
        let output = h.login("a@x.com", "pw1234").await.unwrap();
        let app = auth_router(h.manager.clone());

        let req = Request::builder()
            .uri("/status")
            .header(header::COOKIE, format!("auth_session={}", output.session_cookie))
            .body(Body::empty())
            .unwrap();
        let (_, _, body) = call(&app, req).await;
        assert_eq!(body["data"]["authenticated"], true);
        assert_eq!(body["data"]["user_id"], output.view.user_id.get());
    }

    #[tokio::test]
    async fn test_code_accepts_username_parameter() {
        let h = harness();
        let app = auth_router(h.manager.clone());

        let (status, _, _) = call(&app, get("/code?username=b@x.com", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(h.pending_code("b@x.com").await.is_some());

        let (status, _, body) = call(&app, get("/code", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 9001);
    }

    #[tokio::test]
    async fn test_error_envelopes() {
        let h = harness();
        let app = auth_router(h.manager.clone());

        let malformed = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _, body) = call(&app, malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 9001);
        assert!(body["data"].is_null());

        let (status, _, body) = call(
            &app,
            post_json("/login", json!({"username": "nobody@x.com", "password": "pw1234"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 1003);

        let (status, _, body) = call(
            &app,
            post_json(
                "/register",
                json!({"username": "a@x.com", "password": "pw1234", "code": "123456"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::GONE);
        assert_eq!(body["code"], 1008);
    }

    #[tokio::test]
    async fn test_anonymous_logout_still_clears_cookie() {
        let h = harness();
        let app = auth_router(h.manager.clone());

        let req = Request::builder()
            .method("POST")
            .uri("/logout")
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = call(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 0);
        assert!(headers.contains_key(header::SET_COOKIE));
    }

    #[tokio::test]
    async fn test_require_auth_guards_routes() {
        let h = harness();
        h.register_user("a@x.com", "pw1234").await;
        let output = h.login("a@x.com", "pw1234").await.unwrap();

        let state = crate::presentation::handlers::AuthAppState {
            manager: h.manager.clone(),
        };
        let app = Router::new()
            .route("/private", axum::routing::get(|| async { "secret" }))
            .layer(axum::middleware::from_fn(crate::presentation::require_auth))
            .layer(axum::middleware::from_fn_with_state(
                state,
                crate::presentation::resolve_current_auth::<
                    MemoryCredentialStore,
                    MemoryCacheStore,
                    MemorySessionRepository,
                    MemoryMailbox,
                >,
            ));

        let resp = app.clone().oneshot(get("/private", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = app
            .oneshot(get("/private", Some(&output.view.token)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
