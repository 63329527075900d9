use chrono::NaiveDate;

use tutordeskd::cache::SessionCache;
use tutordeskd::db::open_in_memory;
use tutordeskd::facade::{self, NewPayment, NewStudent};
use tutordeskd::models::{Channel, Level};

fn payment(studente_id: i64, importo: f64) -> NewPayment {
    NewPayment {
        studente_id,
        data: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        importo,
        mese: "Gennaio".to_string(),
        anno: 2024,
        commenti: None,
    }
}

fn enroll(conn: &rusqlite::Connection, cache: &mut SessionCache) -> i64 {
    facade::add_student(
        conn,
        cache,
        NewStudent {
            nome: "Maria".to_string(),
            cognome: "Rossi".to_string(),
            canale: Channel::parse("Diretto").unwrap(),
            livello: Level::parse("B1").unwrap(),
            metodologia: None,
            durata_lezione: None,
            prezzo_lezione: 20.0,
            commenti: None,
            data_iscrizione: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            slides_url: None,
            classroom_url: None,
            meet_url: None,
            giorni: vec![],
        },
    )
    .unwrap()
}

#[test]
fn non_positive_amounts_never_reach_the_store() {
    let conn = open_in_memory().unwrap();
    let mut cache = SessionCache::new();
    let id = enroll(&conn, &mut cache);
    let gen = cache.generation();

    for importo in [0.0, -5.0] {
        let err = facade::add_payment(&conn, &mut cache, payment(id, importo)).unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    // Rejected input means no write and no reload.
    assert_eq!(cache.generation(), gen);
    assert!(cache.pagamenti.is_empty());
}

#[test]
fn payment_for_unknown_student_is_a_missing_reference() {
    let conn = open_in_memory().unwrap();
    let mut cache = SessionCache::new();
    cache.reload(&conn).unwrap();

    let err = facade::add_payment(&conn, &mut cache, payment(999, 20.0)).unwrap_err();
    assert_eq!(err.code(), "missing_reference");
    assert!(cache.pagamenti.is_empty());
}

#[test]
fn valid_payment_is_visible_after_one_reload() {
    let conn = open_in_memory().unwrap();
    let mut cache = SessionCache::new();
    let id = enroll(&conn, &mut cache);
    let gen = cache.generation();

    let pagamento_id = facade::add_payment(&conn, &mut cache, payment(id, 20.0)).unwrap();
    assert_eq!(cache.generation(), gen + 1);
    assert_eq!(cache.pagamenti.len(), 1);
    assert_eq!(cache.pagamenti[0].id, pagamento_id);
    assert_eq!(cache.pagamenti[0].importo, 20.0);
    assert_eq!(cache.pagamenti[0].mese, "Gennaio");

    facade::delete_payment(&conn, &mut cache, pagamento_id).unwrap();
    assert!(cache.pagamenti.is_empty());
}
