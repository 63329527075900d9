use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE: &str = "tutordesk.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    create_tables(&conn)?;
    Ok(conn)
}

/// In-memory database with the full schema, for tests.
pub fn open_in_memory() -> anyhow::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    create_tables(&conn)?;
    Ok(conn)
}

fn create_tables(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS branding_settings(
            id INTEGER PRIMARY KEY,
            logo BLOB,
            welcome_message TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS custom_links(
            id INTEGER PRIMARY KEY,
            titolo TEXT NOT NULL,
            url TEXT NOT NULL,
            icona BLOB,
            ordine INTEGER
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS studenti(
            id INTEGER PRIMARY KEY,
            nome TEXT NOT NULL,
            cognome TEXT NOT NULL,
            canale TEXT NOT NULL,
            livello TEXT NOT NULL,
            metodologia TEXT,
            durata_lezione INTEGER,
            prezzo_lezione REAL NOT NULL,
            commenti TEXT,
            data_iscrizione DATE NOT NULL,
            slides_url TEXT,
            classroom_url TEXT,
            meet_url TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS libreria(
            id INTEGER PRIMARY KEY,
            libro TEXT,
            titolo TEXT NOT NULL,
            url TEXT NOT NULL,
            categoria TEXT NOT NULL,
            livello TEXT NOT NULL,
            descrizione TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS giorni_lezione(
            id INTEGER PRIMARY KEY,
            studente_id INTEGER,
            giorno TEXT NOT NULL,
            FOREIGN KEY(studente_id) REFERENCES studenti(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_giorni_lezione_studente ON giorni_lezione(studente_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS progressi(
            id INTEGER PRIMARY KEY,
            studente_id INTEGER,
            data DATE NOT NULL,
            contenuto_id INTEGER,
            descrizione TEXT NOT NULL,
            FOREIGN KEY(studente_id) REFERENCES studenti(id),
            FOREIGN KEY(contenuto_id) REFERENCES libreria(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_progressi_studente ON progressi(studente_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS pagamenti(
            id INTEGER PRIMARY KEY,
            studente_id INTEGER,
            data DATE NOT NULL,
            importo REAL NOT NULL,
            mese TEXT NOT NULL,
            anno INTEGER NOT NULL,
            commenti TEXT,
            FOREIGN KEY(studente_id) REFERENCES studenti(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_pagamenti_studente ON pagamenti(studente_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS libri_disponibili(
            id INTEGER PRIMARY KEY,
            nome TEXT NOT NULL UNIQUE
        )",
        [],
    )?;

    Ok(())
}
