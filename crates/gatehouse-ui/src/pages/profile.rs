use leptos::prelude::*;

use gatehouse_types::{SessionTokens, UserProfile};

use crate::state::use_session;

const PREVIEW_CHARS: usize = 24;

/// Tokens are opaque to the UI; only a short prefix is ever rendered.
fn token_preview(token: &str) -> String {
    if token.chars().count() <= PREVIEW_CHARS {
        token.to_string()
    } else {
        let head: String = token.chars().take(PREVIEW_CHARS).collect();
        format!("{head}\u{2026}")
    }
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let session = use_session();

    view! {
        <div class="dashboard-header">
            <h1>"Profile"</h1>
            <p class="subtitle">"Claims and tokens for the signed-in user"</p>
        </div>
        {move || {
            if !session.loaded() {
                view! {
                    <div class="loading">
                        <div class="spinner"></div>
                        "Loading session..."
                    </div>
                }
                    .into_any()
            } else if !session.authenticated() {
                view! {
                    <div class="card">
                        <p>"No active session."</p>
                    </div>
                }
                    .into_any()
            } else {
                let profile = session.profile();
                let tokens = session.tokens();
                view! { <ProfileContent profile tokens /> }.into_any()
            }
        }}
    }
}

#[component]
fn ProfileContent(profile: UserProfile, tokens: SessionTokens) -> impl IntoView {
    let initial = profile
        .name
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "?".into());

    let avatar = if profile.picture.is_empty() {
        view! { <div class="profile-avatar profile-avatar-fallback">{initial}</div> }.into_any()
    } else {
        view! { <img class="profile-avatar" src=profile.picture.clone() alt="" /> }.into_any()
    };

    view! {
        <div class="profile-grid">
            <div class="card">
                <div class="card-title">"Identity"</div>
                <div class="profile-identity">
                    {avatar}
                    <div>
                        <div class="profile-name">{profile.name.clone()}</div>
                        <div class="profile-email">{profile.email.clone()}</div>
                    </div>
                </div>
            </div>

            <TokenCard label="ID token" token=tokens.id_token.clone() />
            <TokenCard label="Access token" token=tokens.access_token.clone() />
            <TokenCard label="Refresh token" token=tokens.refresh_token.clone() />
        </div>
    }
}

#[component]
fn TokenCard(label: &'static str, token: Option<String>) -> impl IntoView {
    view! {
        <div class="card">
            <div class="card-title">{label}</div>
            {match token {
                Some(value) => {
                    view! {
                        <div class="token-body">
                            <span class="token-present">"present"</span>
                            <code class="token-preview">{token_preview(&value)}</code>
                        </div>
                    }
                        .into_any()
                }
                None => view! { <div class="token-missing">"not issued"</div> }.into_any(),
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_tokens_render_whole() {
        assert_eq!(token_preview("abc"), "abc");
    }

    #[test]
    fn long_tokens_are_truncated() {
        let token = "a".repeat(100);
        let preview = token_preview(&token);
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 1);
        assert!(preview.ends_with('\u{2026}'));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let token = "\u{00E9}".repeat(40);
        let preview = token_preview(&token);
        assert!(preview.starts_with('\u{00E9}'));
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 1);
    }
}
