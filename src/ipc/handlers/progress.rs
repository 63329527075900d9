use chrono::NaiveDate;
use serde_json::json;

use crate::facade::{self, NewProgress};
use crate::ipc::error::{err, err_mutation, ok};
use crate::ipc::types::{param_i64, param_str, AppState, Request};

fn handle_progress_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = state
        .cache
        .progressi
        .iter()
        .map(|p| {
            json!({
                "id": p.id,
                "studente_id": p.studente_id,
                "data": p.data,
                "contenuto_id": p.contenuto_id,
                "descrizione": p.descrizione,
            })
        })
        .collect();
    ok(
        &req.id,
        json!({ "progressi": rows, "cacheGeneration": state.cache.generation() }),
    )
}

fn handle_progress_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(studente_id) = param_i64(req, "studente_id") else {
        return err(&req.id, "bad_params", "missing studente_id", None);
    };
    let Some(descrizione) = param_str(req, "descrizione") else {
        return err(&req.id, "bad_params", "missing descrizione", None);
    };
    let Some(data) = param_str(req, "data") else {
        return err(&req.id, "bad_params", "missing data", None);
    };
    let Ok(data) = data.parse::<NaiveDate>() else {
        return err(&req.id, "bad_params", "data must be an ISO date", None);
    };

    let new = NewProgress {
        studente_id,
        data,
        contenuto_id: param_i64(req, "contenuto_id"),
        descrizione: descrizione.to_string(),
    };

    match facade::add_progress(conn, &mut state.cache, new) {
        Ok(id) => ok(
            &req.id,
            json!({ "id": id, "cacheGeneration": state.cache.generation() }),
        ),
        Err(e) => err_mutation(&req.id, &e, state.config.debug),
    }
}

fn handle_progress_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(id) = param_i64(req, "id") else {
        return err(&req.id, "bad_params", "missing id", None);
    };

    match facade::delete_progress(conn, &mut state.cache, id) {
        Ok(()) => ok(
            &req.id,
            json!({ "cacheGeneration": state.cache.generation() }),
        ),
        Err(e) => err_mutation(&req.id, &e, state.config.debug),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "progress.list" => Some(handle_progress_list(state, req)),
        "progress.create" => Some(handle_progress_create(state, req)),
        "progress.delete" => Some(handle_progress_delete(state, req)),
        _ => None,
    }
}
