use std::path::PathBuf;

use serde_json::json;

use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{param_str, AppState, Request};
use crate::models::{CATEGORIES, CHANNELS, LEVELS, MONTHS, WEEKDAYS};

fn handle_ping(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "pong": true }))
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(path) = param_str(req, "path") else {
        return err(&req.id, "bad_params", "missing path", None);
    };
    let workspace = PathBuf::from(path);

    let conn = match db::open_db(&workspace) {
        Ok(c) => c,
        Err(e) => return err(&req.id, "db_open_failed", e.to_string(), None),
    };

    // Initial snapshot. The workspace stays selected even if this fails; the
    // client gets an error banner and can retry.
    let reload = state.cache.reload(&conn);
    state.db = Some(conn);
    state.workspace = Some(workspace.clone());
    if let Err(e) = reload {
        return err(&req.id, "load_failed", e.to_string(), None);
    }

    ok(
        &req.id,
        json!({
            "workspace": workspace.to_string_lossy(),
            "cacheGeneration": state.cache.generation(),
        }),
    )
}

fn handle_state(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "workspace": state.workspace.as_ref().map(|p| p.to_string_lossy()),
            "authenticated": state.auth.username().is_some(),
            "username": state.auth.username(),
            "cacheGeneration": state.cache.generation(),
            "debug": state.config.debug,
        }),
    )
}

fn handle_meta_enums(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "giorni": WEEKDAYS,
            "livelli": LEVELS,
            "canali": CHANNELS,
            "mesi": MONTHS,
            "categorie": CATEGORIES,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "ping" => Some(handle_ping(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "state" => Some(handle_state(state, req)),
        "meta.enums" => Some(handle_meta_enums(state, req)),
        _ => None,
    }
}
