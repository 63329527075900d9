use chrono::NaiveDate;
use serde_json::json;

use crate::facade::{self, NewStudent, StudentUpdate};
use crate::ipc::error::{err, err_mutation, ok};
use crate::ipc::types::{param_f64, param_i64, param_str, param_text_opt, AppState, Request};
use crate::models::{Channel, Level, Weekday, WEEKDAYS};

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = state
        .cache
        .studenti
        .iter()
        .map(|s| {
            json!({
                "id": s.id,
                "nome": s.nome,
                "cognome": s.cognome,
                "canale": s.canale,
                "livello": s.livello,
                "metodologia": s.metodologia,
                "durata_lezione": s.durata_lezione,
                "prezzo_lezione": s.prezzo_lezione,
                "commenti": s.commenti,
                "data_iscrizione": s.data_iscrizione,
                "slides_url": s.slides_url,
                "classroom_url": s.classroom_url,
                "meet_url": s.meet_url,
            })
        })
        .collect();
    ok(
        &req.id,
        json!({ "studenti": rows, "cacheGeneration": state.cache.generation() }),
    )
}

/// Weekly agenda rows, grouped in canonical weekday order.
fn handle_schedule_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let mut giorni = Vec::with_capacity(WEEKDAYS.len());
    for giorno in WEEKDAYS {
        let slots: Vec<serde_json::Value> = state
            .cache
            .giorni_lezione
            .iter()
            .filter(|slot| slot.giorno == giorno)
            .map(|slot| {
                json!({
                    "studente_id": slot.studente_id,
                    "nome": slot.nome,
                    "cognome": slot.cognome,
                    "livello": slot.livello,
                })
            })
            .collect();
        giorni.push(json!({ "giorno": giorno, "studenti": slots }));
    }
    ok(&req.id, json!({ "giorni": giorni }))
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(nome) = param_str(req, "nome") else {
        return err(&req.id, "bad_params", "missing nome", None);
    };
    let Some(cognome) = param_str(req, "cognome") else {
        return err(&req.id, "bad_params", "missing cognome", None);
    };
    let Some(canale) = param_str(req, "canale").and_then(Channel::parse) else {
        return err(&req.id, "bad_params", "missing or unknown canale", None);
    };
    let Some(livello) = param_str(req, "livello").and_then(Level::parse) else {
        return err(&req.id, "bad_params", "missing or unknown livello", None);
    };
    let Some(prezzo_lezione) = param_f64(req, "prezzo_lezione") else {
        return err(&req.id, "bad_params", "missing prezzo_lezione", None);
    };
    let Some(data_iscrizione) = param_str(req, "data_iscrizione") else {
        return err(&req.id, "bad_params", "missing data_iscrizione", None);
    };
    let Ok(data_iscrizione) = data_iscrizione.parse::<NaiveDate>() else {
        return err(
            &req.id,
            "bad_params",
            "data_iscrizione must be an ISO date",
            None,
        );
    };

    let mut giorni = Vec::new();
    if let Some(values) = req.params.get("giorni").and_then(|v| v.as_array()) {
        for value in values {
            let Some(giorno) = value.as_str().and_then(Weekday::parse) else {
                return err(&req.id, "bad_params", "unknown weekday in giorni", None);
            };
            giorni.push(giorno);
        }
    }

    let new = NewStudent {
        nome: nome.to_string(),
        cognome: cognome.to_string(),
        canale,
        livello,
        metodologia: param_text_opt(req, "metodologia"),
        durata_lezione: param_i64(req, "durata_lezione"),
        prezzo_lezione,
        commenti: param_text_opt(req, "commenti"),
        data_iscrizione,
        slides_url: param_text_opt(req, "slides_url"),
        classroom_url: param_text_opt(req, "classroom_url"),
        meet_url: param_text_opt(req, "meet_url"),
        giorni,
    };

    match facade::add_student(conn, &mut state.cache, new) {
        Ok(id) => ok(
            &req.id,
            json!({ "id": id, "cacheGeneration": state.cache.generation() }),
        ),
        Err(e) => err_mutation(&req.id, &e, state.config.debug),
    }
}

fn handle_students_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(id) = param_i64(req, "id") else {
        return err(&req.id, "bad_params", "missing id", None);
    };
    let Some(nome) = param_str(req, "nome") else {
        return err(&req.id, "bad_params", "missing nome", None);
    };
    let Some(cognome) = param_str(req, "cognome") else {
        return err(&req.id, "bad_params", "missing cognome", None);
    };
    let Some(canale) = param_str(req, "canale").and_then(Channel::parse) else {
        return err(&req.id, "bad_params", "missing or unknown canale", None);
    };
    let Some(livello) = param_str(req, "livello").and_then(Level::parse) else {
        return err(&req.id, "bad_params", "missing or unknown livello", None);
    };
    let Some(prezzo_lezione) = param_f64(req, "prezzo_lezione") else {
        return err(&req.id, "bad_params", "missing prezzo_lezione", None);
    };

    let update = StudentUpdate {
        nome: nome.to_string(),
        cognome: cognome.to_string(),
        canale,
        livello,
        durata_lezione: param_i64(req, "durata_lezione"),
        prezzo_lezione,
    };

    match facade::update_student(conn, &mut state.cache, id, update) {
        Ok(()) => ok(
            &req.id,
            json!({ "cacheGeneration": state.cache.generation() }),
        ),
        Err(e) => err_mutation(&req.id, &e, state.config.debug),
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(id) = param_i64(req, "id") else {
        return err(&req.id, "bad_params", "missing id", None);
    };

    match facade::delete_student(conn, &mut state.cache, id) {
        Ok(()) => ok(
            &req.id,
            json!({ "cacheGeneration": state.cache.generation() }),
        ),
        Err(e) => err_mutation(&req.id, &e, state.config.debug),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "schedule.list" => Some(handle_schedule_list(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "students.update" => Some(handle_students_update(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        _ => None,
    }
}
