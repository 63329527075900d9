use chrono::NaiveDate;

use tutordeskd::cache::SessionCache;
use tutordeskd::db::open_in_memory;
use tutordeskd::facade::{self, NewPayment, NewProgress, NewStudent};
use tutordeskd::models::{Channel, Level, Weekday};

fn student(nome: &str, cognome: &str, giorni: &[&str]) -> NewStudent {
    NewStudent {
        nome: nome.to_string(),
        cognome: cognome.to_string(),
        canale: Channel::parse("Diretto").unwrap(),
        livello: Level::parse("B1").unwrap(),
        metodologia: None,
        durata_lezione: Some(60),
        prezzo_lezione: 20.0,
        commenti: None,
        data_iscrizione: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        slides_url: None,
        classroom_url: None,
        meet_url: None,
        giorni: giorni.iter().map(|g| Weekday::parse(g).unwrap()).collect(),
    }
}

#[test]
fn deleting_a_student_removes_all_dependent_rows() {
    let conn = open_in_memory().unwrap();
    let mut cache = SessionCache::new();

    let id = facade::add_student(&conn, &mut cache, student("Maria", "Rossi", &["Lunedì"]))
        .unwrap();
    let other =
        facade::add_student(&conn, &mut cache, student("Luca", "Bianchi", &["Venerdì"])).unwrap();

    facade::add_payment(
        &conn,
        &mut cache,
        NewPayment {
            studente_id: id,
            data: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            importo: 20.0,
            mese: "Gennaio".to_string(),
            anno: 2024,
            commenti: None,
        },
    )
    .unwrap();
    facade::add_progress(
        &conn,
        &mut cache,
        NewProgress {
            studente_id: id,
            data: NaiveDate::from_ymd_opt(2024, 1, 17).unwrap(),
            contenuto_id: None,
            descrizione: "Unità 1".to_string(),
        },
    )
    .unwrap();

    assert_eq!(cache.studenti.len(), 2);
    assert_eq!(cache.pagamenti.len(), 1);
    assert_eq!(cache.progressi.len(), 1);
    assert_eq!(cache.giorni_lezione.len(), 2);

    facade::delete_student(&conn, &mut cache, id).unwrap();

    // Only the other student's rows survive.
    assert_eq!(cache.studenti.len(), 1);
    assert_eq!(cache.studenti[0].id, other);
    assert!(cache.pagamenti.is_empty());
    assert!(cache.progressi.is_empty());
    assert_eq!(cache.giorni_lezione.len(), 1);
    assert_eq!(cache.giorni_lezione[0].studente_id, other);
}

#[test]
fn repeating_a_delete_is_idempotent() {
    let conn = open_in_memory().unwrap();
    let mut cache = SessionCache::new();

    let id =
        facade::add_student(&conn, &mut cache, student("Maria", "Rossi", &["Lunedì"])).unwrap();
    facade::delete_student(&conn, &mut cache, id).unwrap();
    let gen = cache.generation();

    // Zero-affected deletes still succeed and still reload.
    facade::delete_student(&conn, &mut cache, id).unwrap();
    assert_eq!(cache.generation(), gen + 1);
    assert!(cache.studenti.is_empty());
}

#[test]
fn blank_names_are_rejected_before_any_write() {
    let conn = open_in_memory().unwrap();
    let mut cache = SessionCache::new();
    cache.reload(&conn).unwrap();
    let gen = cache.generation();

    let err = facade::add_student(&conn, &mut cache, student("  ", "Rossi", &[])).unwrap_err();
    assert_eq!(err.code(), "invalid_input");
    assert_eq!(cache.generation(), gen);
    assert!(cache.studenti.is_empty());
}
