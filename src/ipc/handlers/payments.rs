use chrono::NaiveDate;
use serde_json::json;

use crate::facade::{self, NewPayment};
use crate::ipc::error::{err, err_mutation, ok};
use crate::ipc::types::{param_f64, param_i64, param_str, param_text_opt, AppState, Request};

fn handle_payments_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = state
        .cache
        .pagamenti
        .iter()
        .map(|p| {
            json!({
                "id": p.id,
                "studente_id": p.studente_id,
                "data": p.data,
                "importo": p.importo,
                "mese": p.mese,
                "anno": p.anno,
                "commenti": p.commenti,
            })
        })
        .collect();
    ok(
        &req.id,
        json!({ "pagamenti": rows, "cacheGeneration": state.cache.generation() }),
    )
}

fn handle_payments_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(studente_id) = param_i64(req, "studente_id") else {
        return err(&req.id, "bad_params", "missing studente_id", None);
    };
    let Some(importo) = param_f64(req, "importo") else {
        return err(&req.id, "bad_params", "missing importo", None);
    };
    let Some(mese) = param_str(req, "mese") else {
        return err(&req.id, "bad_params", "missing mese", None);
    };
    let Some(anno) = param_i64(req, "anno") else {
        return err(&req.id, "bad_params", "missing anno", None);
    };
    let Some(data) = param_str(req, "data") else {
        return err(&req.id, "bad_params", "missing data", None);
    };
    let Ok(data) = data.parse::<NaiveDate>() else {
        return err(&req.id, "bad_params", "data must be an ISO date", None);
    };

    let new = NewPayment {
        studente_id,
        data,
        importo,
        mese: mese.to_string(),
        anno,
        commenti: param_text_opt(req, "commenti"),
    };

    match facade::add_payment(conn, &mut state.cache, new) {
        Ok(id) => ok(
            &req.id,
            json!({ "id": id, "cacheGeneration": state.cache.generation() }),
        ),
        Err(e) => err_mutation(&req.id, &e, state.config.debug),
    }
}

fn handle_payments_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(id) = param_i64(req, "id") else {
        return err(&req.id, "bad_params", "missing id", None);
    };

    match facade::delete_payment(conn, &mut state.cache, id) {
        Ok(()) => ok(
            &req.id,
            json!({ "cacheGeneration": state.cache.generation() }),
        ),
        Err(e) => err_mutation(&req.id, &e, state.config.debug),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "payments.list" => Some(handle_payments_list(state, req)),
        "payments.create" => Some(handle_payments_create(state, req)),
        "payments.delete" => Some(handle_payments_delete(state, req)),
        _ => None,
    }
}
