use serde_json::json;

use crate::facade::{self, NewResource};
use crate::ipc::error::{err, err_mutation, ok};
use crate::ipc::types::{param_i64, param_str, param_text_opt, AppState, Request};
use crate::models::Level;

fn handle_library_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = state
        .cache
        .libreria
        .iter()
        .map(|item| {
            json!({
                "id": item.id,
                "libro": item.libro,
                "titolo": item.titolo,
                "url": item.url,
                "categoria": item.categoria,
                "livello": item.livello,
                "descrizione": item.descrizione,
            })
        })
        .collect();
    ok(
        &req.id,
        json!({ "libreria": rows, "cacheGeneration": state.cache.generation() }),
    )
}

fn handle_library_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(titolo) = param_str(req, "titolo") else {
        return err(&req.id, "bad_params", "missing titolo", None);
    };
    let Some(url) = param_str(req, "url") else {
        return err(&req.id, "bad_params", "missing url", None);
    };
    let Some(categoria) = param_str(req, "categoria") else {
        return err(&req.id, "bad_params", "missing categoria", None);
    };
    let Some(livello) = param_str(req, "livello").and_then(Level::parse) else {
        return err(&req.id, "bad_params", "missing or unknown livello", None);
    };

    let new = NewResource {
        libro: param_text_opt(req, "libro"),
        titolo: titolo.to_string(),
        url: url.to_string(),
        categoria: categoria.to_string(),
        livello,
        descrizione: param_text_opt(req, "descrizione"),
    };

    match facade::add_resource(conn, &mut state.cache, new) {
        Ok(id) => ok(
            &req.id,
            json!({ "id": id, "cacheGeneration": state.cache.generation() }),
        ),
        Err(e) => err_mutation(&req.id, &e, state.config.debug),
    }
}

fn handle_library_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(id) = param_i64(req, "id") else {
        return err(&req.id, "bad_params", "missing id", None);
    };

    match facade::delete_resource(conn, &mut state.cache, id) {
        Ok(()) => ok(
            &req.id,
            json!({ "cacheGeneration": state.cache.generation() }),
        ),
        Err(e) => err_mutation(&req.id, &e, state.config.debug),
    }
}

fn handle_books_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let nomi: Vec<&str> = state
        .cache
        .libri_disponibili
        .iter()
        .map(String::as_str)
        .collect();
    ok(&req.id, json!({ "libri": nomi }))
}

fn handle_books_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(nome) = param_str(req, "nome") else {
        return err(&req.id, "bad_params", "missing nome", None);
    };

    match facade::add_book(conn, &mut state.cache, nome) {
        Ok(id) => ok(
            &req.id,
            json!({ "id": id, "cacheGeneration": state.cache.generation() }),
        ),
        Err(e) => err_mutation(&req.id, &e, state.config.debug),
    }
}

fn handle_books_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(nome) = param_str(req, "nome") else {
        return err(&req.id, "bad_params", "missing nome", None);
    };

    match facade::delete_book(conn, &mut state.cache, nome) {
        Ok(()) => ok(
            &req.id,
            json!({ "cacheGeneration": state.cache.generation() }),
        ),
        Err(e) => err_mutation(&req.id, &e, state.config.debug),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "library.list" => Some(handle_library_list(state, req)),
        "library.create" => Some(handle_library_create(state, req)),
        "library.delete" => Some(handle_library_delete(state, req)),
        "books.list" => Some(handle_books_list(state, req)),
        "books.create" => Some(handle_books_create(state, req)),
        "books.delete" => Some(handle_books_delete(state, req)),
        _ => None,
    }
}
