use leptos::prelude::*;

use crate::state::use_session;

#[component]
pub fn HomePage() -> impl IntoView {
    let session = use_session();

    view! {
        <div class="dashboard-header">
            <h1>"Welcome"</h1>
            <p class="subtitle">"OIDC login sample"</p>
        </div>
        <div class="card">
            <div class="card-title">"Getting started"</div>
            {move || {
                if session.authenticated() {
                    view! {
                        <p>
                            "You are signed in. Open your "
                            <a href="/profile">"profile"</a>
                            " to see the claims and tokens issued by the provider."
                        </p>
                    }
                        .into_any()
                } else {
                    view! {
                        <p>
                            "Use the Log in link to start the authentication "
                            "challenge. The provider redirects back here once "
                            "you are signed in."
                        </p>
                    }
                        .into_any()
                }
            }}
        </div>
    }
}
