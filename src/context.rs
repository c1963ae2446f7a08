// src/context.rs

use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    gate::SealedAssessment,
    models::user::{Authenticated, User},
};

/// Upstream access token obtained at sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub access_token: String,
    pub remember_me: bool,
}

/// Who is signed in and which assessment is loaded, for one portal session.
///
/// Handlers receive it as part of [`crate::storage::SessionState`]; nothing
/// is shared between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<AuthToken>,
    #[serde(default)]
    pub assessment: Option<SealedAssessment>,
}

impl SessionContext {
    pub fn sign_in(&mut self, auth: Authenticated, remember_me: bool) {
        self.user = Some(auth.user);
        self.token = Some(AuthToken {
            access_token: auth.access_token,
            remember_me,
        });
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.name.as_str())
    }

    /// Routing guard for every assessment page.
    pub fn require_user(&self) -> Result<&User, AppError> {
        match (&self.user, &self.token) {
            (Some(user), Some(_)) => Ok(user),
            _ => Err(AppError::AuthError("Please sign in to continue".to_string())),
        }
    }

    /// Drops the user, the token and any loaded assessment.
    pub fn teardown(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticated() -> Authenticated {
        Authenticated {
            access_token: "upstream-token".to_string(),
            user: User {
                id: "u1".to_string(),
                name: "Nimal".to_string(),
                registration_number: "EG/2019/1234".to_string(),
                email: None,
            },
        }
    }

    #[test]
    fn sign_in_then_teardown() {
        let mut context = SessionContext::default();
        assert!(context.require_user().is_err());

        context.sign_in(authenticated(), true);
        assert!(context.is_signed_in());
        assert_eq!(context.display_name(), Some("Nimal"));
        assert!(context.token.as_ref().unwrap().remember_me);

        context.teardown();
        assert_eq!(context, SessionContext::default());
    }
}
