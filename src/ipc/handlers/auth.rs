use chrono::Utc;
use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{param_str, AppState, Request};

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(username) = param_str(req, "username") else {
        return err(&req.id, "bad_params", "missing username", None);
    };
    let Some(password) = param_str(req, "password") else {
        return err(&req.id, "bad_params", "missing password", None);
    };

    let config = state.config.clone();
    if state.auth.login(username, password, &config, Utc::now()) {
        ok(&req.id, json!({ "authenticated": true, "username": username }))
    } else {
        err(
            &req.id,
            "invalid_credentials",
            "wrong username or password",
            None,
        )
    }
}

fn handle_check(state: &mut AppState, req: &Request) -> serde_json::Value {
    let authenticated = state.auth.check(Utc::now());
    ok(
        &req.id,
        json!({
            "authenticated": authenticated,
            "username": state.auth.username(),
        }),
    )
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.auth.logout();
    ok(&req.id, json!({ "authenticated": false }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.login" => Some(handle_login(state, req)),
        "auth.check" => Some(handle_check(state, req)),
        "auth.logout" => Some(handle_logout(state, req)),
        _ => None,
    }
}
