use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::{
    components::{Route, Router, Routes},
    StaticSegment,
};

use crate::components::nav::Nav;
use crate::pages::home::HomePage;
use crate::pages::profile::ProfilePage;
use crate::state::provide_session_context;

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <link rel="icon" href="/favicon.svg" type="image/svg+xml" />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <MetaTags />
            </head>
            <body>
                <App />
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    provide_session_context();

    view! {
        <Stylesheet id="leptos" href="/pkg/gatehouse-console.css" />
        <Title text="Gatehouse" />
        <Router>
            <Routes fallback=|| view! { <p>"Page not found."</p> }.into_any()>
                <Route path=StaticSegment("") view=HomeView />
                <Route path=StaticSegment("profile") view=ProfileView />
            </Routes>
        </Router>
    }
}

#[component]
fn HomeView() -> impl IntoView {
    view! {
        <div class="app-layout">
            <Nav />
            <main class="main-content">
                <HomePage />
            </main>
        </div>
    }
}

#[component]
fn ProfileView() -> impl IntoView {
    view! {
        <div class="app-layout">
            <Nav />
            <main class="main-content">
                <ProfilePage />
            </main>
        </div>
    }
}
