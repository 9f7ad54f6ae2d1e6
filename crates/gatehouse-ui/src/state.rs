use leptos::prelude::*;

use gatehouse_types::{AuthSnapshot, SessionTokens, UserProfile};

/// Injectable session state. Seeded once per app load from the snapshot
/// the server captured off the HTTP context, then read by any component
/// via [`use_session`].
#[derive(Clone, Copy)]
pub struct SessionContext {
    authenticated: RwSignal<bool>,
    profile: RwSignal<UserProfile>,
    tokens: RwSignal<SessionTokens>,
    loaded: RwSignal<bool>,
}

impl SessionContext {
    fn new() -> Self {
        Self {
            authenticated: RwSignal::new(false),
            profile: RwSignal::new(UserProfile::default()),
            tokens: RwSignal::new(SessionTokens::default()),
            loaded: RwSignal::new(false),
        }
    }

    pub fn seed(&self, snapshot: AuthSnapshot) {
        self.authenticated.set(snapshot.authenticated);
        self.profile.set(snapshot.profile);
        self.tokens.set(SessionTokens::from(snapshot.tokens));
        self.loaded.set(true);
    }

    pub fn loaded(&self) -> bool {
        self.loaded.get()
    }

    pub fn authenticated(&self) -> bool {
        self.authenticated.get()
    }

    pub fn profile(&self) -> UserProfile {
        self.profile.get()
    }

    pub fn tokens(&self) -> SessionTokens {
        self.tokens.get()
    }
}

/// Provides the session context and, on the client, fetches the snapshot.
/// Place this once near the root of the app.
pub fn provide_session_context() -> SessionContext {
    let ctx = SessionContext::new();
    provide_context(ctx);

    #[cfg(feature = "hydrate")]
    {
        use wasm_bindgen_futures::spawn_local;

        spawn_local(async move {
            match session_snapshot().await {
                Ok(snapshot) => ctx.seed(snapshot),
                Err(_) => ctx.seed(AuthSnapshot::default()),
            }
        });
    }

    ctx
}

pub fn use_session() -> SessionContext {
    expect_context::<SessionContext>()
}

/// Reads the session cookie off the HTTP context and resolves it against
/// the server-side store. An absent or unknown session is not an error,
/// just an unauthenticated snapshot.
#[server]
pub async fn session_snapshot() -> Result<AuthSnapshot, ServerFnError> {
    use axum_extra::extract::CookieJar;
    use gatehouse_auth::middleware::auth::AppState;
    use gatehouse_auth::session::SESSION_COOKIE;
    use gatehouse_types::InitialTokenState;

    let state = use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("auth state unavailable"))?;

    let jar: CookieJar = leptos_axum::extract().await?;
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(AuthSnapshot::default());
    };

    let Some(session) = state.sessions.get(cookie.value()).await else {
        return Ok(AuthSnapshot::default());
    };

    Ok(AuthSnapshot {
        authenticated: true,
        profile: session.profile,
        tokens: InitialTokenState::from(session.tokens),
    })
}
