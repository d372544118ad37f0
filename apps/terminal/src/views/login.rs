//! Login form.

use std::fmt::Write as _;

use tracing::warn;

use tally_core::error::{ClientError, ValidationError};
use tally_core::types::User;
use tally_core::validation::validate_login_form;

use crate::state::AppState;
use crate::workflows::auth;

/// Shown when the server gives no usable reason.
pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";

/// Result of submitting the form.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    LoggedIn(User),
    /// A field failed validation; no request was made.
    Invalid,
    /// The login request failed; `form_error` is set.
    Failed,
}

/// Username / password form.
#[derive(Debug, Default)]
pub struct LoginView {
    pub username: String,
    pub password: String,
    field_errors: Vec<ValidationError>,
    form_error: Option<String>,
}

impl LoginView {
    pub fn new() -> Self {
        LoginView::default()
    }

    pub fn field_errors(&self) -> &[ValidationError] {
        &self.field_errors
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    /// Validates the fields, then runs the login workflow.
    pub async fn submit(&mut self, state: &AppState) -> LoginOutcome {
        self.form_error = None;

        if let Err(errors) = validate_login_form(&self.username, &self.password) {
            self.field_errors = errors;
            return LoginOutcome::Invalid;
        }
        self.field_errors.clear();

        match auth::login(state, self.username.trim(), &self.password).await {
            Ok(user) => {
                self.password.clear();
                LoginOutcome::LoggedIn(user)
            }
            Err(err) => {
                self.form_error = Some(form_message(&err));
                self.password.clear();
                LoginOutcome::Failed
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== Login ==");
        if !self.username.is_empty() {
            let _ = writeln!(out, "Username: {}", self.username);
        }
        for error in &self.field_errors {
            let _ = writeln!(out, "  ! {}", error);
        }
        if let Some(error) = &self.form_error {
            let _ = writeln!(out, "Error: {}", error);
        }
        let _ = writeln!(out, "Type `login` to sign in.");
        out
    }
}

fn form_message(err: &ClientError) -> String {
    match err {
        ClientError::Network(reason) => {
            warn!(reason = %reason, "Login request did not reach the server");
            LOGIN_FAILED.to_string()
        }
        other => {
            let message = other.message();
            if message.trim().is_empty() {
                LOGIN_FAILED.to_string()
            } else {
                message
            }
        }
    }
}
