use serde::{Deserialize, Serialize};

/// Tokens captured from the server-side HTTP context at first render.
/// Seeds the UI session context and is never mutated afterwards.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InitialTokenState {
    pub id_token: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Long-lived token holder consumed by UI components via the session
/// context. Structurally identical to [`InitialTokenState`] on purpose:
/// one seeds, one lives.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionTokens {
    pub id_token: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// Claims surfaced to the UI. A claim the provider did not send is the
/// empty string, never an option.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub picture: String,
}

/// Server → UI handoff for one render of the app.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthSnapshot {
    pub authenticated: bool,
    pub profile: UserProfile,
    pub tokens: InitialTokenState,
}

impl Default for InitialTokenState {
    fn default() -> Self {
        Self {
            id_token: None,
            access_token: None,
            refresh_token: None,
        }
    }
}

impl Default for SessionTokens {
    fn default() -> Self {
        Self {
            id_token: None,
            access_token: None,
            refresh_token: None,
        }
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            picture: String::new(),
        }
    }
}

impl Default for AuthSnapshot {
    fn default() -> Self {
        Self {
            authenticated: false,
            profile: UserProfile::default(),
            tokens: InitialTokenState::default(),
        }
    }
}

impl From<InitialTokenState> for SessionTokens {
    fn from(initial: InitialTokenState) -> Self {
        Self {
            id_token: initial.id_token,
            access_token: initial.access_token,
            refresh_token: initial.refresh_token,
        }
    }
}

impl From<SessionTokens> for InitialTokenState {
    fn from(tokens: SessionTokens) -> Self {
        Self {
            id_token: tokens.id_token,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_claims_default_to_empty_string() {
        let profile = UserProfile::default();
        assert_eq!(profile.name, "");
        assert_eq!(profile.email, "");
        assert_eq!(profile.picture, "");
    }

    #[test]
    fn initial_state_seeds_session_tokens() {
        let initial = InitialTokenState {
            id_token: Some("id".into()),
            access_token: Some("access".into()),
            refresh_token: None,
        };
        let tokens = SessionTokens::from(initial.clone());
        assert_eq!(tokens.id_token, initial.id_token);
        assert_eq!(tokens.access_token, initial.access_token);
        assert_eq!(tokens.refresh_token, None);
    }

    #[test]
    fn default_snapshot_is_unauthenticated() {
        let snapshot = AuthSnapshot::default();
        assert!(!snapshot.authenticated);
        assert_eq!(snapshot.tokens, InitialTokenState::default());
    }
}
