#![allow(non_snake_case)]

pub mod error;
pub mod middleware;
pub mod oidc;
pub mod routes;
pub mod session;

use axum::Router;

use crate::middleware::auth::AppState;

pub fn auth_router(state: AppState) -> Router {
    let authRoutes = routes::auth::routes(state.clone());

    Router::new().merge(authRoutes).with_state(state)
}
