//! Session Cache: the per-session snapshot of every table.
//!
//! The cache is never patched incrementally. After each successful mutation
//! the whole snapshot is rebuilt with one select-all per table, in a fixed
//! order. A reload stages the complete new snapshot first and swaps it in
//! only when every table loaded, so a failed reload leaves the previous
//! contents visible (and the triggering write stays committed).

use std::collections::BTreeSet;

use rusqlite::Connection;
use tracing::debug;

use crate::models::{
    Branding, CustomLink, LessonSlot, LibraryItem, Payment, ProgressRecord, Student,
};

#[derive(Debug, Default)]
pub struct SessionCache {
    pub studenti: Vec<Student>,
    pub progressi: Vec<ProgressRecord>,
    pub libreria: Vec<LibraryItem>,
    pub pagamenti: Vec<Payment>,
    pub custom_links: Vec<CustomLink>,
    pub giorni_lezione: Vec<LessonSlot>,
    pub libri_disponibili: BTreeSet<String>,
    pub branding: Option<Branding>,
    generation: u64,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful reloads so far. Bumps exactly once per completed
    /// rebuild, so a caller can verify read-your-writes after a mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Rebuilds the full snapshot from the store.
    pub fn reload(&mut self, conn: &Connection) -> rusqlite::Result<()> {
        let snapshot = Snapshot::load(conn)?;

        self.studenti = snapshot.studenti;
        self.progressi = snapshot.progressi;
        self.libreria = snapshot.libreria;
        self.pagamenti = snapshot.pagamenti;
        self.custom_links = snapshot.custom_links;
        self.giorni_lezione = snapshot.giorni_lezione;
        self.libri_disponibili = snapshot.libri_disponibili;
        self.branding = snapshot.branding;
        self.generation += 1;

        debug!(
            generation = self.generation,
            studenti = self.studenti.len(),
            pagamenti = self.pagamenti.len(),
            libreria = self.libreria.len(),
            "session cache reloaded"
        );
        Ok(())
    }
}

struct Snapshot {
    studenti: Vec<Student>,
    progressi: Vec<ProgressRecord>,
    libreria: Vec<LibraryItem>,
    pagamenti: Vec<Payment>,
    custom_links: Vec<CustomLink>,
    giorni_lezione: Vec<LessonSlot>,
    libri_disponibili: BTreeSet<String>,
    branding: Option<Branding>,
}

impl Snapshot {
    // Load order is fixed: studenti, progressi, libreria, pagamenti,
    // custom_links, giorni_lezione, libri_disponibili, branding.
    fn load(conn: &Connection) -> rusqlite::Result<Self> {
        let studenti = collect(
            conn,
            "SELECT id, nome, cognome, canale, livello, metodologia, durata_lezione,
                    prezzo_lezione, commenti, data_iscrizione, slides_url, classroom_url, meet_url
             FROM studenti",
            Student::from_row,
        )?;
        let progressi = collect(
            conn,
            "SELECT id, studente_id, data, contenuto_id, descrizione FROM progressi",
            ProgressRecord::from_row,
        )?;
        let libreria = collect(
            conn,
            "SELECT id, libro, titolo, url, categoria, livello, descrizione FROM libreria",
            LibraryItem::from_row,
        )?;
        let pagamenti = collect(
            conn,
            "SELECT id, studente_id, data, importo, mese, anno, commenti FROM pagamenti",
            Payment::from_row,
        )?;
        let custom_links = collect(
            conn,
            "SELECT id, titolo, url, icona, ordine FROM custom_links ORDER BY ordine",
            CustomLink::from_row,
        )?;
        let giorni_lezione = collect(
            conn,
            "SELECT gl.studente_id, gl.giorno, s.nome, s.cognome, s.livello
             FROM giorni_lezione gl
             JOIN studenti s ON gl.studente_id = s.id",
            LessonSlot::from_row,
        )?;

        let mut stmt = conn.prepare("SELECT nome FROM libri_disponibili ORDER BY nome")?;
        let libri_disponibili = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;

        let branding = collect(
            conn,
            "SELECT id, logo, welcome_message FROM branding_settings LIMIT 1",
            Branding::from_row,
        )?
        .into_iter()
        .next();

        Ok(Self {
            studenti,
            progressi,
            libreria,
            pagamenti,
            custom_links,
            giorni_lezione,
            libri_disponibili,
            branding,
        })
    }
}

fn collect<T>(
    conn: &Connection,
    sql: &str,
    map: fn(&rusqlite::Row) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], map)?;
    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn reload_on_empty_store_yields_empty_tables() {
        let conn = open_in_memory().unwrap();
        let mut cache = SessionCache::new();
        cache.reload(&conn).unwrap();
        assert_eq!(cache.generation(), 1);
        assert!(cache.studenti.is_empty());
        assert!(cache.libri_disponibili.is_empty());
        assert!(cache.branding.is_none());
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot_and_generation() {
        let conn = open_in_memory().unwrap();
        conn.execute(
            "INSERT INTO libri_disponibili(nome) VALUES('Espresso 1')",
            [],
        )
        .unwrap();

        let mut cache = SessionCache::new();
        cache.reload(&conn).unwrap();
        assert_eq!(cache.libri_disponibili.len(), 1);

        // A snapshot query that cannot run must leave everything in place.
        conn.execute("DROP TABLE libri_disponibili", []).unwrap();
        assert!(cache.reload(&conn).is_err());
        assert_eq!(cache.generation(), 1);
        assert_eq!(cache.libri_disponibili.len(), 1);
    }
}
