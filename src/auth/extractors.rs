use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::auth::error::AuthError;
use crate::auth::jwt::JwtKeys;
use crate::auth::service::{require_active, require_admin, resolve_user};
use crate::state::AppState;
use crate::users::repo::User;

/// Authenticated user, no policy gate applied.
#[derive(Debug)]
pub struct CurrentUser(pub User);

/// Authenticated user with the active gate applied.
#[derive(Debug)]
pub struct ActiveUser(pub User);

/// Authenticated user with the admin gate applied.
#[derive(Debug)]
pub struct AdminUser(pub User);

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::Unauthorized)?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or(AuthError::Unauthorized)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let keys = JwtKeys::from_ref(state);
        let user = resolve_user(state.users.as_ref(), &keys, token).await?;
        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ActiveUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        require_active(user).map(ActiveUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        require_admin(user).map(AdminUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::service::signup;
    use axum::http::{header, Request};

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        let (parts, _) = builder.body(()).expect("request").into_parts();
        parts
    }

    async fn state_with_user(email: &str, is_active: bool, is_admin: bool) -> AppState {
        let state = AppState::fake();
        signup(
            state.users.as_ref(),
            email,
            "secret-pw",
            is_active,
            is_admin,
        )
        .await
        .expect("signup");
        state
    }

    #[tokio::test]
    async fn bearer_token_resolves_to_current_user() {
        let state = state_with_user("a@b.com", true, false).await;
        let token = JwtKeys::from_ref(&state).issue("a@b.com").expect("issue");
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let CurrentUser(user) = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extract");
        assert_eq!(user.email, "a@b.com");
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(None);
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_unauthorized() {
        let state = state_with_user("a@b.com", true, false).await;
        let mut parts = parts_with_auth(Some("Basic YWxhZGRpbjpvcGVuc2VzYW1l"));
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn inactive_user_fails_the_active_gate() {
        let state = state_with_user("a@b.com", false, false).await;
        let token = JwtKeys::from_ref(&state).issue("a@b.com").expect("issue");
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let err = ActiveUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InactiveAccount));
    }

    #[tokio::test]
    async fn non_admin_fails_the_admin_gate() {
        let state = state_with_user("a@b.com", true, false).await;
        let token = JwtKeys::from_ref(&state).issue("a@b.com").expect("issue");
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let err = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InsufficientPrivilege));
    }

    #[tokio::test]
    async fn admin_passes_the_admin_gate() {
        let state = state_with_user("admin@b.com", true, true).await;
        let token = JwtKeys::from_ref(&state)
            .issue("admin@b.com")
            .expect("issue");
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let AdminUser(user) = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extract");
        assert!(user.is_admin);
    }
}
