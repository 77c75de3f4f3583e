use tracing::warn;

use crate::auth::error::AuthError;
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::users::repo::{NewUser, User, UserStore};

/// Confirm identity from a username/password pair.
///
/// Unknown user and wrong password intentionally collapse into the same
/// error so callers cannot probe for registered emails.
pub async fn authenticate(
    users: &dyn UserStore,
    username: &str,
    password: &str,
) -> Result<User, AuthError> {
    let user = match users.find_by_email(username).await? {
        Some(u) => u,
        None => {
            warn!(email = %username, "login for unknown email");
            return Err(AuthError::InvalidCredentials);
        }
    };
    if !verify_password(password, &user.password_hash) {
        warn!(email = %username, "login with invalid password");
        return Err(AuthError::InvalidCredentials);
    }
    Ok(user)
}

/// Resolve a bearer token back to its user. Every failure mode (bad
/// signature, expiry, unknown subject) surfaces as `Unauthorized`.
pub async fn resolve_user(
    users: &dyn UserStore,
    keys: &JwtKeys,
    token: &str,
) -> Result<User, AuthError> {
    let subject = keys.validate(token)?;
    match users.find_by_email(&subject).await? {
        Some(user) => Ok(user),
        None => {
            warn!(email = %subject, "token subject no longer resolves");
            Err(AuthError::Unauthorized)
        }
    }
}

/// Gate for customer-facing operations.
pub fn require_active(user: User) -> Result<User, AuthError> {
    if !user.is_active {
        return Err(AuthError::InactiveAccount);
    }
    Ok(user)
}

/// Gate for administrative operations. Does not re-check the active flag:
/// an inactive admin keeps administrative access (see DESIGN.md).
pub fn require_admin(user: User) -> Result<User, AuthError> {
    if !user.is_admin {
        return Err(AuthError::InsufficientPrivilege);
    }
    Ok(user)
}

/// Register a new account. Standard signups never get the admin flag;
/// admin signups always do, whatever the request claimed.
pub async fn signup(
    users: &dyn UserStore,
    email: &str,
    password: &str,
    is_active: bool,
    admin_signup: bool,
) -> Result<User, AuthError> {
    if users.find_by_email(email).await?.is_some() {
        return Err(AuthError::EmailTaken);
    }
    let password_hash = hash_password(password)?;
    let user = users
        .create(NewUser {
            email: email.to_string(),
            password_hash,
            is_active,
            is_admin: admin_signup,
        })
        .await?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::users::repo::MemoryUserStore;
    use jsonwebtoken::Algorithm;

    fn make_keys() -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "test-secret".into(),
            algorithm: Algorithm::HS256,
            ttl_minutes: 5,
        })
    }

    async fn store_with_user(email: &str, password: &str, is_active: bool) -> MemoryUserStore {
        let store = MemoryUserStore::default();
        signup(&store, email, password, is_active, false)
            .await
            .expect("signup");
        store
    }

    #[tokio::test]
    async fn signup_then_authenticate_succeeds() {
        let store = store_with_user("a@b.com", "secret-pw", true).await;
        let user = authenticate(&store, "a@b.com", "secret-pw")
            .await
            .expect("authenticate");
        assert_eq!(user.email, "a@b.com");
        assert!(!user.is_admin);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_indistinguishable() {
        let store = store_with_user("a@b.com", "secret-pw", true).await;
        let wrong_pw = authenticate(&store, "a@b.com", "bad-pw").await.unwrap_err();
        let unknown = authenticate(&store, "nobody@b.com", "whatever")
            .await
            .unwrap_err();
        assert!(matches!(wrong_pw, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn resolve_user_roundtrips_an_issued_token() {
        let store = store_with_user("a@b.com", "secret-pw", true).await;
        let keys = make_keys();
        let token = keys.issue("a@b.com").expect("issue");
        let user = resolve_user(&store, &keys, &token).await.expect("resolve");
        assert_eq!(user.email, "a@b.com");
    }

    #[tokio::test]
    async fn token_for_unknown_subject_is_unauthorized() {
        let store = MemoryUserStore::default();
        let keys = make_keys();
        let token = keys.issue("ghost@b.com").expect("issue");
        let err = resolve_user(&store, &keys, &token).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let store = store_with_user("a@b.com", "secret-pw", true).await;
        let keys = make_keys();
        let err = resolve_user(&store, &keys, "garbage").await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn active_gate_rejects_inactive_users() {
        let store = store_with_user("a@b.com", "secret-pw", false).await;
        let user = authenticate(&store, "a@b.com", "secret-pw")
            .await
            .expect("authenticate");
        let err = require_active(user).unwrap_err();
        assert!(matches!(err, AuthError::InactiveAccount));
    }

    #[tokio::test]
    async fn admin_gate_rejects_non_admins() {
        let store = store_with_user("a@b.com", "secret-pw", true).await;
        let keys = make_keys();
        let token = keys.issue("a@b.com").expect("issue");
        let user = resolve_user(&store, &keys, &token).await.expect("resolve");
        assert!(!user.is_admin);
        let err = require_admin(user).unwrap_err();
        assert!(matches!(err, AuthError::InsufficientPrivilege));
    }

    #[tokio::test]
    async fn admin_gate_ignores_the_active_flag() {
        let store = MemoryUserStore::default();
        // Inactive admin: administrative access is retained.
        signup(&store, "admin@b.com", "secret-pw", false, true)
            .await
            .expect("signup");
        let user = authenticate(&store, "admin@b.com", "secret-pw")
            .await
            .expect("authenticate");
        assert!(require_admin(user).is_ok());
    }

    #[tokio::test]
    async fn admin_signup_forces_the_admin_flag() {
        let store = MemoryUserStore::default();
        // Caller submitted is_admin=false; admin signup overrides it.
        let user = signup(&store, "admin@b.com", "secret-pw", true, true)
            .await
            .expect("signup");
        assert!(user.is_admin);
        let stored = store
            .find_by_email("admin@b.com")
            .await
            .expect("lookup")
            .expect("present");
        assert!(stored.is_admin);
    }

    #[tokio::test]
    async fn standard_signup_never_grants_admin() {
        let store = MemoryUserStore::default();
        let user = signup(&store, "a@b.com", "secret-pw", true, false)
            .await
            .expect("signup");
        assert!(!user.is_admin);
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected() {
        let store = store_with_user("a@b.com", "secret-pw", true).await;
        let err = signup(&store, "a@b.com", "other-pw", true, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }
}
