use leptos::prelude::*;

use crate::state::use_session;

#[component]
pub fn Nav() -> impl IntoView {
    let session = use_session();

    view! {
        <nav class="nav-sidebar">
            <div class="nav-brand">
                <div class="brand-icon">"G"</div>
                <span class="brand-text">"Gatehouse"</span>
            </div>
            <ul class="nav-links">
                <li class="nav-item">
                    <a href="/">
                        <span class="nav-icon">"\u{2302}"</span>
                        <span>"Home"</span>
                    </a>
                </li>
                <li class="nav-item">
                    <a href="/profile">
                        <span class="nav-icon">"\u{263A}"</span>
                        <span>"Profile"</span>
                    </a>
                </li>
            </ul>
            // Auth links bypass the client-side router; the flow is a full
            // round trip through the server and the provider.
            <div class="nav-auth">
                {move || {
                    if session.authenticated() {
                        let name = session.profile().name;
                        let display = if name.is_empty() { "Signed in".to_string() } else { name };
                        view! {
                            <div class="nav-auth-row">
                                <span class="nav-user">{display}</span>
                                <a class="btn btn-secondary" href="/auth/logout" rel="external">
                                    "Log out"
                                </a>
                            </div>
                        }
                            .into_any()
                    } else {
                        view! {
                            <div class="nav-auth-row">
                                <a class="btn btn-primary" href="/auth/login" rel="external">
                                    "Log in"
                                </a>
                            </div>
                        }
                            .into_any()
                    }
                }}
            </div>
        </nav>
    }
}
