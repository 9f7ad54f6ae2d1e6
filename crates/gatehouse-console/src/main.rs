#![allow(non_snake_case)]

#[cfg(feature = "ssr")]
mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Clone, Debug)]
    pub struct Config {
        pub server: ServerConfig,
        pub oidc: OidcConfig,
    }

    #[derive(Deserialize, Clone, Debug)]
    pub struct ServerConfig {
        pub bind: String,
        pub port: u16,
    }

    #[derive(Deserialize, Clone, Debug)]
    pub struct OidcConfig {
        /// Provider tenant host, e.g. `your-tenant.us.auth0.com`.
        pub domain: String,
        pub client_id: String,
        pub client_secret: String,
        #[serde(default = "default_scopes")]
        pub scopes: String,
        /// Public base URL of this application; the provider redirects
        /// back to `{public_url}/auth/callback`.
        pub public_url: String,
        #[serde(default = "default_post_logout_path")]
        pub post_logout_path: String,
    }

    fn default_scopes() -> String {
        "openid profile email".into()
    }

    fn default_post_logout_path() -> String {
        "/".into()
    }

    impl Default for Config {
        fn default() -> Self {
            Self {
                server: ServerConfig {
                    bind: "0.0.0.0".into(),
                    port: 3000,
                },
                oidc: OidcConfig {
                    domain: "your-tenant.us.auth0.com".into(),
                    client_id: "yourClientId".into(),
                    client_secret: "yourClientSecret".into(),
                    scopes: default_scopes(),
                    public_url: "http://127.0.0.1:3000".into(),
                    post_logout_path: default_post_logout_path(),
                },
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn load(path: &str) -> Config {
        match std::fs::read_to_string(path) {
            Ok(contents) => match parse(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("failed to parse config {path}: {e}, using defaults");
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("failed to read config {path}: {e}, using defaults");
                Config::default()
            }
        }
    }
}

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() {
    use std::sync::Arc;

    use axum::Router;
    use gatehouse_auth::middleware::auth::AppState;
    use gatehouse_auth::oidc::{OidcAuthority, OidcSettings};
    use gatehouse_auth::session::SessionStore;
    use gatehouse_ui::{shell, App};
    use leptos::prelude::*;
    use leptos_axum::{generate_route_list, LeptosRoutes};
    use tower_http::trace::TraceLayer;
    use tracing_subscriber::{fmt, EnvFilter};

    // Initialize tracing
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse config path from args
    let args: Vec<String> = std::env::args().collect();
    let configPath = if let Some(idx) = args.iter().position(|a| a == "--config") {
        args.get(idx + 1)
            .cloned()
            .unwrap_or_else(|| "config.example.toml".into())
    } else {
        "config.example.toml".into()
    };

    let appConfig = config::load(&configPath);
    tracing::info!(
        "loaded config from {configPath}: domain={}, client_id={}",
        appConfig.oidc.domain,
        appConfig.oidc.client_id
    );

    let settings = OidcSettings {
        domain: appConfig.oidc.domain.clone(),
        client_id: appConfig.oidc.client_id.clone(),
        client_secret: appConfig.oidc.client_secret.clone(),
        scopes: appConfig.oidc.scopes.clone(),
        public_url: appConfig.oidc.public_url.clone(),
        post_logout_path: appConfig.oidc.post_logout_path.clone(),
    };

    // The scheme is registered once at startup; a provider that cannot be
    // discovered leaves nothing to serve.
    let authority = OidcAuthority::discover(settings)
        .await
        .unwrap_or_else(|e| panic!("failed to register authentication scheme: {e}"));
    tracing::info!("authentication scheme registered for {}", appConfig.oidc.domain);

    let appState = AppState {
        sessions: SessionStore::new(),
        authority: Arc::new(authority),
    };

    // Get Leptos configuration
    let conf = get_configuration(None).expect("failed to load Leptos configuration");
    let leptosOptions = conf.leptos_options;

    // Generate route list from Leptos App
    let routes = generate_route_list(App);

    // Build the auth sub-router with its own state, then convert to a stateless Router
    let authRouter = gatehouse_auth::auth_router(appState.clone());

    // Build page auth middleware that gates the protected pages
    let pageAuthLayer = axum::middleware::from_fn_with_state(
        appState.clone(),
        gatehouse_auth::middleware::auth::require_page_auth,
    );

    // Compose the full router:
    // - auth routes are merged and carry their own AppState (via .with_state)
    // - Leptos routes use LeptosOptions as state; the extra context hands
    //   AppState to server functions
    // - Page auth is applied as a layer
    let app = Router::new()
        .leptos_routes_with_context(
            &leptosOptions,
            routes,
            {
                let appState = appState.clone();
                move || {
                    leptos::prelude::provide_context(appState.clone());
                }
            },
            {
                let leptosOptions = leptosOptions.clone();
                move || shell(leptosOptions.clone())
            },
        )
        .fallback(leptos_axum::file_and_error_handler(shell))
        .with_state(leptosOptions)
        .merge(authRouter)
        .layer(pageAuthLayer)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", appConfig.server.bind, appConfig.server.port);
    tracing::info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    axum::serve(listener, app.into_make_service())
        .await
        .expect("server exited with error");
}

#[cfg(not(feature = "ssr"))]
fn main() {}

#[cfg(all(test, feature = "ssr"))]
mod tests {
    use super::config;

    #[test]
    fn full_config_parses() {
        let parsed = config::parse(
            r#"
            [server]
            bind = "127.0.0.1"
            port = 4000

            [oidc]
            domain = "tenant.example.com"
            client_id = "abc"
            client_secret = "shh"
            scopes = "openid profile"
            public_url = "https://app.example.com"
            post_logout_path = "/bye"
            "#,
        )
        .expect("config should parse");

        assert_eq!(parsed.server.bind, "127.0.0.1");
        assert_eq!(parsed.server.port, 4000);
        assert_eq!(parsed.oidc.domain, "tenant.example.com");
        assert_eq!(parsed.oidc.post_logout_path, "/bye");
    }

    #[test]
    fn optional_fields_have_defaults() {
        let parsed = config::parse(
            r#"
            [server]
            bind = "0.0.0.0"
            port = 3000

            [oidc]
            domain = "tenant.example.com"
            client_id = "abc"
            client_secret = "shh"
            public_url = "http://127.0.0.1:3000"
            "#,
        )
        .expect("config should parse");

        assert_eq!(parsed.oidc.scopes, "openid profile email");
        assert_eq!(parsed.oidc.post_logout_path, "/");
    }

    #[test]
    fn garbage_fails_to_parse() {
        assert!(config::parse("not toml [").is_err());
    }
}
