use std::time::Instant;

use openidconnect::core::{CoreAuthenticationFlow, CoreClient, CoreProviderMetadata};
use openidconnect::reqwest::async_http_client;
use openidconnect::{
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, IssuerUrl, Nonce, OAuth2TokenResponse,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse,
};
use url::Url;

use gatehouse_types::{SessionTokens, UserProfile};

use crate::error::AuthError;
use crate::session::{EstablishedSession, PendingLogin};

/// Settings for one registered authentication scheme.
#[derive(Clone, Debug)]
pub struct OidcSettings {
    /// Provider tenant host, e.g. `your-tenant.us.auth0.com`.
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    /// Space-separated scope string, e.g. `openid profile email`.
    pub scopes: String,
    /// Public base URL of this application, used for the callback and the
    /// post-logout return.
    pub public_url: String,
    pub post_logout_path: String,
}

/// The registered scheme: discovered provider metadata plus the relying
/// party client. All protocol work happens inside `openidconnect`; this
/// type only carries state between the login, callback, and logout glue.
pub struct OidcAuthority {
    client: CoreClient,
    settings: OidcSettings,
}

impl OidcAuthority {
    /// Registers the scheme: discovers the issuer `https://{domain}/` and
    /// binds the client id, secret, and callback redirect.
    pub async fn discover(settings: OidcSettings) -> Result<Self, AuthError> {
        let issuer = IssuerUrl::new(format!("https://{}/", settings.domain))
            .map_err(|e| AuthError::Discovery(e.to_string()))?;

        let providerMetadata = CoreProviderMetadata::discover_async(issuer, async_http_client)
            .await
            .map_err(|e| AuthError::Discovery(e.to_string()))?;

        let redirectUrl = RedirectUrl::new(format!(
            "{}/auth/callback",
            settings.public_url.trim_end_matches('/')
        ))
        .map_err(|e| AuthError::Discovery(e.to_string()))?;

        let client = CoreClient::from_provider_metadata(
            providerMetadata,
            ClientId::new(settings.client_id.clone()),
            Some(ClientSecret::new(settings.client_secret.clone())),
        )
        .set_redirect_uri(redirectUrl);

        Ok(Self { client, settings })
    }

    /// Builds the authorize URL and the property bag the callback will need
    /// to finish the challenge.
    pub fn begin_authorization(&self, redirect_target: String) -> (Url, PendingLogin) {
        let (pkceChallenge, pkceVerifier) = PkceCodeChallenge::new_random_sha256();

        let mut request = self.client.authorize_url(
            CoreAuthenticationFlow::AuthorizationCode,
            CsrfToken::new_random,
            Nonce::new_random,
        );
        for scope in requested_scopes(&self.settings.scopes) {
            request = request.add_scope(Scope::new(scope));
        }

        let (authorizeUrl, csrfState, nonce) = request.set_pkce_challenge(pkceChallenge).url();

        let pending = PendingLogin {
            csrf_state: csrfState.secret().clone(),
            nonce: nonce.secret().clone(),
            pkce_verifier: pkceVerifier.secret().clone(),
            redirect_target,
            created_at: Instant::now(),
        };

        (authorizeUrl, pending)
    }

    /// Exchanges the authorization code and verifies the id token against
    /// the nonce stored at challenge time. Claims the provider did not send
    /// come back as empty strings.
    pub async fn exchange(
        &self,
        code: String,
        pending: PendingLogin,
    ) -> Result<EstablishedSession, AuthError> {
        let tokenResponse = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(PkceCodeVerifier::new(pending.pkce_verifier))
            .request_async(async_http_client)
            .await
            .map_err(|e| AuthError::Exchange(e.to_string()))?;

        let idToken = tokenResponse.id_token().ok_or(AuthError::MissingIdToken)?;
        let claims = idToken
            .claims(&self.client.id_token_verifier(), &Nonce::new(pending.nonce))
            .map_err(|e| AuthError::Verification(e.to_string()))?;

        let profile = UserProfile {
            name: claims
                .name()
                .and_then(|n| n.get(None))
                .map(|n| n.as_str().to_string())
                .unwrap_or_default(),
            email: claims
                .email()
                .map(|e| e.as_str().to_string())
                .unwrap_or_default(),
            picture: claims
                .picture()
                .and_then(|p| p.get(None))
                .map(|p| p.as_str().to_string())
                .unwrap_or_default(),
        };

        let tokens = SessionTokens {
            id_token: Some(idToken.to_string()),
            access_token: Some(tokenResponse.access_token().secret().clone()),
            refresh_token: tokenResponse.refresh_token().map(|t| t.secret().clone()),
        };

        Ok(EstablishedSession { profile, tokens })
    }

    /// Provider-side sign-out URL with the fixed post-logout return.
    pub fn logout_url(&self) -> Result<Url, url::ParseError> {
        provider_logout_url(
            &self.settings.domain,
            &self.settings.client_id,
            &self.post_logout_redirect(),
        )
    }

    pub fn post_logout_redirect(&self) -> String {
        format!(
            "{}{}",
            self.settings.public_url.trim_end_matches('/'),
            self.settings.post_logout_path
        )
    }
}

/// Splits the configured scope string. `openid` is implied by the protocol
/// layer and must not be requested twice.
pub fn requested_scopes(scopes: &str) -> Vec<String> {
    scopes
        .split_whitespace()
        .filter(|s| !s.eq_ignore_ascii_case("openid"))
        .map(str::to_string)
        .collect()
}

/// The tenant logout endpoint is not part of discovery metadata; it is
/// built from the domain directly.
pub fn provider_logout_url(
    domain: &str,
    client_id: &str,
    return_to: &str,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&format!("https://{domain}/v2/logout"))?;
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("returnTo", return_to);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_string_splits_on_whitespace() {
        assert_eq!(
            requested_scopes("openid profile email"),
            vec!["profile".to_string(), "email".to_string()]
        );
    }

    #[test]
    fn openid_scope_is_never_requested_twice() {
        assert!(requested_scopes("openid").is_empty());
        assert!(requested_scopes("OpenID").is_empty());
        assert!(requested_scopes("").is_empty());
    }

    #[test]
    fn logout_url_carries_client_and_return() {
        let url = provider_logout_url(
            "tenant.example.com",
            "abc123",
            "http://127.0.0.1:3000/",
        )
        .expect("logout url");

        assert_eq!(url.host_str(), Some("tenant.example.com"));
        assert_eq!(url.path(), "/v2/logout");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert!(pairs.contains(&("client_id".into(), "abc123".into())));
        assert!(pairs.contains(&("returnTo".into(), "http://127.0.0.1:3000/".into())));
    }

    #[test]
    fn logout_url_rejects_garbage_domain() {
        assert!(provider_logout_url("not a host", "id", "http://x/").is_err());
    }
}
