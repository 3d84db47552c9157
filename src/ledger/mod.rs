use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod service;
pub mod validate;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::ledger_routes())
}
