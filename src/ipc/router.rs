use chrono::Utc;

use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;

/// Methods reachable without an authenticated session.
const PUBLIC_METHODS: [&str; 3] = ["ping", "auth.login", "auth.check"];

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    if !PUBLIC_METHODS.contains(&req.method.as_str()) && !state.auth.check(Utc::now()) {
        return err(&req.id, "not_authenticated", "login required", None);
    }

    if let Some(resp) = handlers::core::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::auth::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::students::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::payments::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::progress::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::library::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::settings::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::backup::try_handle(state, &req) {
        return resp;
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
