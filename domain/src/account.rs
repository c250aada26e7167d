//! Account flows: login, signup, session restore and onboarding.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use session_auth::session::{Manager, RequestOptions, Tokens};

use crate::api::{decode, ensure_success};
use crate::error::Error;
use crate::validation::{LoginForm, SignupForm};

const LOGIN_PATH: &str = "auth/login";
const REGISTER_PATH: &str = "auth/register";
const FIRST_LOGIN_PATH: &str = "auth/is-first-login";
const COMPLETE_ONBOARDING_PATH: &str = "auth/complete-onboarding";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct FirstLoginResponse {
    #[serde(rename = "firstLogin", alias = "isFirstLogin")]
    first_login: bool,
}

/// Outcome of checking for an existing session on start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// An access token was already stored.
    Active,
    /// No access token, but the stored refresh token produced a new one.
    Restored,
    /// Nothing usable stored; the user has to log in.
    Anonymous,
}

/// Validate, authenticate against `POST /auth/login` and persist the returned pair.
pub async fn login(manager: &Manager, form: &LoginForm) -> Result<(), Error> {
    form.validate().into_result()?;

    let response = manager
        .client()
        .post(manager.endpoint(LOGIN_PATH))
        .json(&LoginRequest {
            email: &form.email,
            password: &form.password,
        })
        .send()
        .await?;

    let body: Value = decode(response, "Login failed").await?;
    store_auth_tokens(manager, &body).await?;

    info!("Logged in as {}", form.email);
    Ok(())
}

/// Validate, register through `POST /auth/register` and persist the returned pair.
pub async fn signup(manager: &Manager, form: &SignupForm) -> Result<(), Error> {
    form.validate().into_result()?;

    let response = manager
        .client()
        .post(manager.endpoint(REGISTER_PATH))
        .json(&RegisterRequest {
            name: &form.name,
            email: &form.email,
            password: &form.password,
        })
        .send()
        .await?;

    let body: Value = decode(response, "Signup failed").await?;
    store_auth_tokens(manager, &body).await?;

    info!("Registered {}", form.email);
    Ok(())
}

async fn store_auth_tokens(manager: &Manager, body: &Value) -> Result<(), Error> {
    let tokens = body
        .get("tokens")
        .map(Tokens::from_token_pair)
        .unwrap_or_default();

    if tokens.access.is_none() || tokens.refresh.is_none() {
        return Err(Error::decode("Auth response did not contain an access and refresh token"));
    }

    manager.store_tokens(&tokens).await?;
    Ok(())
}

pub async fn logout(manager: &Manager) -> Result<(), Error> {
    manager.clear_tokens().await?;
    info!("Logged out");
    Ok(())
}

/// Pick up a session left by an earlier run.
///
/// This is the one place that hands the stored refresh token to `refresh`
/// explicitly, so an expired session can be recovered without logging in again.
pub async fn restore_session(manager: &Manager) -> Result<SessionState, Error> {
    if manager.is_authenticated().await? {
        return Ok(SessionState::Active);
    }

    let Some(refresh_token) = manager.get_refresh_token().await? else {
        return Ok(SessionState::Anonymous);
    };

    if manager.refresh(Some(refresh_token.as_str())).await {
        debug!("Session restored from stored refresh token");
        Ok(SessionState::Restored)
    } else {
        Ok(SessionState::Anonymous)
    }
}

/// Whether the server still considers onboarding outstanding for this user.
pub async fn is_first_login(manager: &Manager) -> Result<bool, Error> {
    let response = manager
        .authenticated_request(&manager.endpoint(FIRST_LOGIN_PATH), RequestOptions::get())
        .await?;

    let body: FirstLoginResponse = decode(response, "Failed to check first login").await?;
    Ok(body.first_login)
}

pub async fn complete_onboarding(manager: &Manager) -> Result<(), Error> {
    let response = manager
        .authenticated_request(
            &manager.endpoint(COMPLETE_ONBOARDING_PATH),
            RequestOptions::post(),
        )
        .await?;

    ensure_success(response, "Failed to complete onboarding.").await?;
    Ok(())
}

/// Onboarding flag for the stored session in a single round trip.
///
/// `None` when the server rejects the session; the manager has cleared the
/// stored tokens by then.
pub async fn session_onboarding(manager: &Manager) -> Result<Option<bool>, Error> {
    let response = manager
        .authenticated_request(&manager.endpoint(FIRST_LOGIN_PATH), RequestOptions::get())
        .await?;

    if response.status() == reqwest::StatusCode::UNAUTHORIZED {
        debug!("Session rejected while checking onboarding state");
        return Ok(None);
    }

    let body: FirstLoginResponse = decode(response, "Failed to check first login").await?;
    Ok(Some(body.first_login))
}

/// Guard for commands that need a session.
///
/// Makes one authenticated round trip so an expired token is refreshed or
/// cleared before the local check, then reports whether a token is held.
pub async fn verify_session(manager: &Manager) -> Result<bool, Error> {
    if let Err(e) = manager
        .authenticated_request(&manager.endpoint(FIRST_LOGIN_PATH), RequestOptions::get())
        .await
    {
        warn!("Session check request failed: {}", e);
    }

    Ok(manager.is_authenticated().await?)
}
