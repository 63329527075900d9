use std::path::PathBuf;

use serde_json::json;

use crate::backup::{export_workspace_bundle, import_workspace_bundle};
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{param_str, AppState, Request};

fn handle_backup_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(workspace) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(out_path) = param_str(req, "outPath") else {
        return err(&req.id, "bad_params", "missing outPath", None);
    };

    match export_workspace_bundle(&workspace, &PathBuf::from(out_path)) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "bundleFormat": summary.bundle_format,
                "dbSha256": summary.db_sha256,
            }),
        ),
        Err(e) => err(&req.id, "export_failed", e.to_string(), None),
    }
}

fn handle_backup_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(workspace) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(in_path) = param_str(req, "inPath") else {
        return err(&req.id, "bad_params", "missing inPath", None);
    };

    // Release the handle before swapping the database file in.
    state.db = None;

    if let Err(e) = import_workspace_bundle(&PathBuf::from(in_path), &workspace) {
        // Reopen the previous database so the session keeps working.
        state.db = db::open_db(&workspace).ok();
        return err(&req.id, "import_failed", e.to_string(), None);
    }

    let conn = match db::open_db(&workspace) {
        Ok(c) => c,
        Err(e) => return err(&req.id, "db_open_failed", e.to_string(), None),
    };
    let reload = state.cache.reload(&conn);
    state.db = Some(conn);
    if let Err(e) = reload {
        return err(&req.id, "load_failed", e.to_string(), None);
    }

    ok(
        &req.id,
        json!({ "cacheGeneration": state.cache.generation() }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.export" => Some(handle_backup_export(state, req)),
        "backup.import" => Some(handle_backup_import(state, req)),
        _ => None,
    }
}
