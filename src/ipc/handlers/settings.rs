use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;

use crate::facade::{self, NewLink};
use crate::ipc::error::{err, err_mutation, ok};
use crate::ipc::types::{param_i64, param_str, param_text_opt, AppState, Request};
use crate::models::decode_image;

/// Icon bytes travel over the protocol as base64 strings. Stored blobs may be
/// raw bytes or base64 text; `decode_image` normalizes on the way out.
fn icon_out(blob: &Option<Vec<u8>>) -> Option<String> {
    blob.as_ref().map(|raw| STANDARD.encode(decode_image(raw)))
}

fn icon_in(req: &Request, key: &str) -> Result<Option<Vec<u8>>, String> {
    match param_str(req, key) {
        None => Ok(None),
        Some("") => Ok(None),
        Some(encoded) => STANDARD
            .decode(encoded)
            .map(Some)
            .map_err(|_| format!("{} must be base64", key)),
    }
}

fn handle_links_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = state
        .cache
        .custom_links
        .iter()
        .map(|link| {
            json!({
                "id": link.id,
                "titolo": link.titolo,
                "url": link.url,
                "icona": icon_out(&link.icona),
                "ordine": link.ordine,
            })
        })
        .collect();
    ok(
        &req.id,
        json!({ "links": rows, "cacheGeneration": state.cache.generation() }),
    )
}

fn handle_links_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(titolo) = param_str(req, "titolo") else {
        return err(&req.id, "bad_params", "missing titolo", None);
    };
    let Some(url) = param_str(req, "url") else {
        return err(&req.id, "bad_params", "missing url", None);
    };
    let icona = match icon_in(req, "icona") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };

    let new = NewLink {
        titolo: titolo.to_string(),
        url: url.to_string(),
        icona,
        ordine: param_i64(req, "ordine"),
    };

    match facade::add_custom_link(conn, &mut state.cache, new) {
        Ok(id) => ok(
            &req.id,
            json!({ "id": id, "cacheGeneration": state.cache.generation() }),
        ),
        Err(e) => err_mutation(&req.id, &e, state.config.debug),
    }
}

fn handle_links_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(id) = param_i64(req, "id") else {
        return err(&req.id, "bad_params", "missing id", None);
    };
    let Some(titolo) = param_str(req, "titolo") else {
        return err(&req.id, "bad_params", "missing titolo", None);
    };
    let Some(url) = param_str(req, "url") else {
        return err(&req.id, "bad_params", "missing url", None);
    };
    let icona = match icon_in(req, "icona") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };

    let update = NewLink {
        titolo: titolo.to_string(),
        url: url.to_string(),
        icona,
        ordine: param_i64(req, "ordine"),
    };

    match facade::update_custom_link(conn, &mut state.cache, id, update) {
        Ok(()) => ok(
            &req.id,
            json!({ "cacheGeneration": state.cache.generation() }),
        ),
        Err(e) => err_mutation(&req.id, &e, state.config.debug),
    }
}

fn handle_links_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(id) = param_i64(req, "id") else {
        return err(&req.id, "bad_params", "missing id", None);
    };

    match facade::delete_custom_link(conn, &mut state.cache, id) {
        Ok(()) => ok(
            &req.id,
            json!({ "cacheGeneration": state.cache.generation() }),
        ),
        Err(e) => err_mutation(&req.id, &e, state.config.debug),
    }
}

fn handle_branding_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    match &state.cache.branding {
        Some(branding) => ok(
            &req.id,
            json!({
                "logo": icon_out(&branding.logo),
                "welcome_message": branding.welcome_message,
            }),
        ),
        None => ok(
            &req.id,
            json!({ "logo": null, "welcome_message": null }),
        ),
    }
}

fn handle_branding_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let logo = match icon_in(req, "logo") {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let welcome_message = param_text_opt(req, "welcome_message");

    match facade::save_branding(conn, &mut state.cache, logo, welcome_message) {
        Ok(()) => ok(
            &req.id,
            json!({ "cacheGeneration": state.cache.generation() }),
        ),
        Err(e) => err_mutation(&req.id, &e, state.config.debug),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "links.list" => Some(handle_links_list(state, req)),
        "links.create" => Some(handle_links_create(state, req)),
        "links.update" => Some(handle_links_update(state, req)),
        "links.delete" => Some(handle_links_delete(state, req)),
        "branding.get" => Some(handle_branding_get(state, req)),
        "branding.save" => Some(handle_branding_save(state, req)),
        _ => None,
    }
}
