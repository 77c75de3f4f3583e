use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, PublicUser, SignupRequest, TokenResponse},
        error::AuthError,
        extractors::ActiveUser,
        jwt::JwtKeys,
        service,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(login))
        .route("/signup", post(signup))
        .route("/signup-admin", post(signup_admin))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AuthError> {
    let username = form.username.trim().to_lowercase();
    let user = service::authenticate(state.users.as_ref(), &username, &form.password).await?;
    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue(&user.email)?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(TokenResponse::bearer(token)))
}

async fn handle_signup(
    state: &AppState,
    mut payload: SignupRequest,
    admin_signup: bool,
) -> Result<(StatusCode, Json<PublicUser>), (StatusCode, String)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    let user = service::signup(
        state.users.as_ref(),
        &payload.email,
        &payload.password,
        payload.is_active,
        admin_signup,
    )
    .await
    .map_err(|e| match e {
        AuthError::EmailTaken => {
            warn!(email = %payload.email, "email already registered");
            (StatusCode::CONFLICT, e.to_string())
        }
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    })?;

    info!(user_id = %user.id, email = %user.email, admin = admin_signup, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<PublicUser>), (StatusCode, String)> {
    // is_admin in the payload is deliberately ignored here.
    handle_signup(&state, payload, false).await
}

#[instrument(skip_all)]
pub async fn signup_admin(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<PublicUser>), (StatusCode, String)> {
    // Always creates an admin, whatever is_admin in the payload says.
    handle_signup(&state, payload, true).await
}

#[instrument(skip_all)]
pub async fn get_me(ActiveUser(user): ActiveUser) -> Json<PublicUser> {
    Json(user.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_plausible_addresses() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@shop.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@b"));
    }
}
