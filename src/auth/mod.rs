use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod gate;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod tokens;

pub fn public_router() -> Router<AppState> {
    handlers::public_routes()
}

pub fn session_router() -> Router<AppState> {
    handlers::session_routes()
}
