//! Session workflows: login, local logout, activity, remote logout.

use tracing::{error, info, warn};

use tally_core::error::{AuthError, ClientError, CoreResult};
use tally_core::session::SessionAction;
use tally_core::types::User;

use crate::state::AppState;

/// Exchanges credentials for a session.
///
/// On success the session is authenticated with `last_activity = now` and
/// both tokens are stored. On failure the session records the error.
pub async fn login(state: &AppState, username: &str, password: &str) -> CoreResult<User> {
    state.dispatch_session(SessionAction::LoginPending).await;

    let response = match state.api().login(username, password).await {
        Ok(response) => response,
        Err(err) => {
            warn!(username = %username, error = %err, "Login failed");
            state
                .dispatch_session(SessionAction::LoginRejected(err.clone()))
                .await;
            return Err(err);
        }
    };

    let session = state
        .dispatch_session(SessionAction::LoginFulfilled {
            user: response.user.clone(),
            access_token: response.access_token.clone(),
            at: state.now(),
        })
        .await;

    if !session.is_authenticated {
        let err = session
            .error
            .unwrap_or_else(|| AuthError::Rejected("Login failed.".into()).into());
        return Err(err);
    }

    if let Err(e) = state
        .persist()
        .save_tokens(&response.access_token, response.refresh_token.as_deref())
        .await
    {
        error!(error = %e, "Failed to store tokens");
    }

    info!(user_id = response.user.user_id, "Logged in");
    Ok(response.user)
}

/// Local logout. Never touches the network.
pub async fn logout(state: &AppState) {
    state.dispatch_session(SessionAction::Logout).await;
    state.clear_tokens().await;
    info!("Logged out");
}

/// Records user activity for the auto-logout monitor.
pub async fn update_last_activity(state: &AppState) {
    state
        .dispatch_session(SessionAction::Touch { at: state.now() })
        .await;
}

/// Invalidates the refresh token on the server, then clears the session.
///
/// On failure the session is kept and carries the error.
pub async fn logout_user(state: &AppState) -> CoreResult<()> {
    let refresh = match state.persist().refresh_token().await {
        Ok(Some(token)) => token,
        Ok(None) => return reject_remote_logout(state, AuthError::MissingRefreshToken.into()).await,
        Err(e) => {
            error!(error = %e, "Failed to read refresh token");
            return reject_remote_logout(state, AuthError::MissingRefreshToken.into()).await;
        }
    };

    let session = state.session().await;
    let access = session.token().unwrap_or_default();

    match state.api().logout(&refresh, access).await {
        Ok(()) => {
            state.clear_tokens().await;
            state
                .dispatch_session(SessionAction::RemoteLogoutFulfilled)
                .await;
            info!("Logged out on server");
            Ok(())
        }
        Err(err) => reject_remote_logout(state, err).await,
    }
}

async fn reject_remote_logout(state: &AppState, err: ClientError) -> CoreResult<()> {
    warn!(error = %err, "Remote logout failed");
    state
        .dispatch_session(SessionAction::RemoteLogoutRejected(err.clone()))
        .await;
    Err(err)
}
