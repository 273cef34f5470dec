use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    db::errors::DbError,
    db::handlers::{Repository, Users},
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Extract session claims from the JWT session cookie if present and valid
/// Returns:
/// - None: No session cookie present
/// - Some(Ok(claims)): Valid JWT found and verified
/// - Some(Err(error)): Cookie header present but unreadable
#[instrument(skip(parts, config))]
fn try_jwt_session_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<session::SessionClaims>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.auth.session.cookie_name;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                // Try to verify the JWT session token
                match session::verify_session_token(value, config) {
                    Ok(claims) => return Some(Ok(claims)),
                    Err(_) => {
                        // Invalid/expired token, continue checking other cookies.
                        // Verification errors are expected for expired tokens.
                        continue;
                    }
                }
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let claims = match try_jwt_session_auth(parts, &state.config) {
            Some(Ok(claims)) => claims,
            Some(Err(e)) => return Err(e),
            None => {
                trace!("No session cookie present");
                return Err(Error::Unauthenticated { message: None });
            }
        };

        // Re-read the profile so role/branch changes and deletions take
        // effect without waiting for the token to expire.
        let mut conn = state.db.acquire().await.map_err(DbError::from)?;
        let mut users = Users::new(&mut conn);
        let user = users.get_by_id(claims.sub).await?.ok_or(Error::Unauthenticated {
            message: Some("Account no longer exists".to_string()),
        })?;

        debug!("Authenticated session user: {}", user.id);
        Ok(CurrentUser::from(user))
    }
}
