//! Mutation Façade: one entry point per business mutation.
//!
//! Every entry point validates what the edge cannot be trusted with,
//! serializes dates to ISO strings, delegates to the Store Adapter and then
//! triggers exactly one full Session Cache reload. Backend failures never
//! escape raw: they are classified into [`MutationError`] kinds, keyed on
//! SQLite result codes rather than message text (message sniffing survives
//! only as a last-resort fallback for errors without a code).

use chrono::NaiveDate;
use rusqlite::Connection;
use thiserror::Error;
use tracing::{info, warn};

use crate::cache::SessionCache;
use crate::models::{Channel, Level, Weekday};
use crate::store::{self, RowData};

#[derive(Error, Debug)]
pub enum MutationError {
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("referenced row missing: {0}")]
    MissingReference(String),

    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("insufficient rights: {0}")]
    PermissionDenied(String),

    #[error("invalid input format: {0}")]
    MalformedRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The write committed but the cache rebuild failed; the snapshot is
    /// stale until the next successful reload.
    #[error("saved, but reloading data failed: {0}")]
    ReloadFailed(String),

    #[error("{0}")]
    Other(String),
}

impl MutationError {
    /// Stable slug for the IPC error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyExists(_) => "already_exists",
            Self::MissingReference(_) => "missing_reference",
            Self::MissingRequiredField(_) => "missing_required_field",
            Self::Unavailable(_) => "backend_unavailable",
            Self::PermissionDenied(_) => "permission_denied",
            Self::MalformedRequest(_) => "malformed_request",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::ReloadFailed(_) => "reload_failed",
            Self::Other(_) => "error",
        }
    }

    /// User-facing text. Unclassified errors only expose the raw backend
    /// message in debug mode.
    pub fn user_message(&self, debug: bool) -> String {
        match self {
            Self::Other(_) if !debug => {
                "operation failed; enable debug mode for details".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Maps a backend error onto the user-facing taxonomy.
pub fn classify(err: rusqlite::Error) -> MutationError {
    use rusqlite::ffi;
    use rusqlite::ErrorCode;

    match &err {
        rusqlite::Error::SqliteFailure(code, message) => {
            let text = message
                .clone()
                .unwrap_or_else(|| code.to_string());
            match code.code {
                ErrorCode::ConstraintViolation => match code.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        MutationError::AlreadyExists(text)
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => MutationError::MissingReference(text),
                    ffi::SQLITE_CONSTRAINT_NOTNULL => MutationError::MissingRequiredField(text),
                    _ => MutationError::MalformedRequest(text),
                },
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                    MutationError::Unavailable(text)
                }
                ErrorCode::PermissionDenied | ErrorCode::ReadOnly => {
                    MutationError::PermissionDenied(text)
                }
                ErrorCode::TypeMismatch | ErrorCode::ApiMisuse | ErrorCode::ParameterOutOfRange => {
                    MutationError::MalformedRequest(text)
                }
                ErrorCode::NotFound => MutationError::NotFound(text),
                _ => classify_by_message(&text),
            }
        }
        rusqlite::Error::QueryReturnedNoRows => {
            MutationError::NotFound("row not found".to_string())
        }
        rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::InvalidParameterCount(..)
        | rusqlite::Error::ToSqlConversionFailure(_) => {
            MutationError::MalformedRequest(err.to_string())
        }
        _ => classify_by_message(&err.to_string()),
    }
}

// Fallback only: substring matching is backend-version-fragile, so it runs
// solely for errors that carry no usable result code.
fn classify_by_message(message: &str) -> MutationError {
    let lower = message.to_lowercase();
    if lower.contains("duplicate key") || lower.contains("unique") {
        MutationError::AlreadyExists(message.to_string())
    } else if lower.contains("foreign key") {
        MutationError::MissingReference(message.to_string())
    } else if lower.contains("timeout") || lower.contains("connection") {
        MutationError::Unavailable(message.to_string())
    } else if lower.contains("not null") || lower.contains("not-null") {
        MutationError::MissingRequiredField(message.to_string())
    } else if lower.contains("permission") || lower.contains("not authorized") {
        MutationError::PermissionDenied(message.to_string())
    } else if lower.contains("bad request") || lower.contains("400") {
        MutationError::MalformedRequest(message.to_string())
    } else if lower.contains("not found") {
        MutationError::NotFound(message.to_string())
    } else {
        MutationError::Other(message.to_string())
    }
}

type Result<T> = std::result::Result<T, MutationError>;

/// One full cache rebuild after a committed write. A failure here does not
/// roll the write back; the caller reports the stale snapshot instead.
fn reload_after_write(conn: &Connection, cache: &mut SessionCache) -> Result<()> {
    cache.reload(conn).map_err(|e| {
        warn!(error = %e, "cache reload failed after committed write");
        MutationError::ReloadFailed(e.to_string())
    })
}

fn require_text(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MutationError::InvalidInput(format!(
            "{} is required",
            field
        )));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub nome: String,
    pub cognome: String,
    pub canale: Channel,
    pub livello: Level,
    pub metodologia: Option<String>,
    pub durata_lezione: Option<i64>,
    pub prezzo_lezione: f64,
    pub commenti: Option<String>,
    pub data_iscrizione: NaiveDate,
    pub slides_url: Option<String>,
    pub classroom_url: Option<String>,
    pub meet_url: Option<String>,
    pub giorni: Vec<Weekday>,
}

pub fn add_student(
    conn: &Connection,
    cache: &mut SessionCache,
    new: NewStudent,
) -> Result<i64> {
    require_text(&new.nome, "nome")?;
    require_text(&new.cognome, "cognome")?;

    // Empty optional fields are omitted rather than sent as NULL, so the
    // backend's own defaults apply.
    let row = RowData::new()
        .set("nome", new.nome.trim().to_string())
        .set("cognome", new.cognome.trim().to_string())
        .set("canale", new.canale.as_str().to_string())
        .set("livello", new.livello.as_str().to_string())
        .set_text_opt("metodologia", new.metodologia)
        .set_opt("durata_lezione", new.durata_lezione)
        .set("prezzo_lezione", new.prezzo_lezione)
        .set_text_opt("commenti", new.commenti)
        .set("data_iscrizione", new.data_iscrizione.to_string())
        .set_text_opt("slides_url", new.slides_url)
        .set_text_opt("classroom_url", new.classroom_url)
        .set_text_opt("meet_url", new.meet_url);

    let studente_id = store::insert(conn, "studenti", &row).map_err(classify)?;

    for giorno in &new.giorni {
        let slot = RowData::new()
            .set("studente_id", studente_id)
            .set("giorno", giorno.as_str().to_string());
        store::insert(conn, "giorni_lezione", &slot).map_err(classify)?;
    }

    info!(studente_id, giorni = new.giorni.len(), "student added");
    reload_after_write(conn, cache)?;
    Ok(studente_id)
}

#[derive(Debug, Clone)]
pub struct StudentUpdate {
    pub nome: String,
    pub cognome: String,
    pub canale: Channel,
    pub livello: Level,
    pub durata_lezione: Option<i64>,
    pub prezzo_lezione: f64,
}

pub fn update_student(
    conn: &Connection,
    cache: &mut SessionCache,
    id: i64,
    update: StudentUpdate,
) -> Result<()> {
    require_text(&update.nome, "nome")?;
    require_text(&update.cognome, "cognome")?;

    let row = RowData::new()
        .set("nome", update.nome.trim().to_string())
        .set("cognome", update.cognome.trim().to_string())
        .set("canale", update.canale.as_str().to_string())
        .set("livello", update.livello.as_str().to_string())
        .set_opt("durata_lezione", update.durata_lezione)
        .set("prezzo_lezione", update.prezzo_lezione);

    let affected = store::update_by_id(conn, "studenti", id, &row).map_err(classify)?;
    if affected == 0 {
        return Err(MutationError::NotFound(format!("student {}", id)));
    }

    info!(studente_id = id, "student updated");
    reload_after_write(conn, cache)
}

/// Cascade delete: four sequential statements, deliberately not wrapped in a
/// transaction. A partial failure leaves the completed steps in place, and
/// re-invoking the delete must pass over the already-removed rows without
/// erroring (zero-affected deletes are fine).
pub fn delete_student(conn: &Connection, cache: &mut SessionCache, id: i64) -> Result<()> {
    store::delete_where_eq(conn, "progressi", "studente_id", id).map_err(classify)?;
    store::delete_where_eq(conn, "pagamenti", "studente_id", id).map_err(classify)?;
    store::delete_where_eq(conn, "giorni_lezione", "studente_id", id).map_err(classify)?;
    store::delete_by_id(conn, "studenti", id).map_err(classify)?;

    info!(studente_id = id, "student deleted with dependents");
    reload_after_write(conn, cache)
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub studente_id: i64,
    pub data: NaiveDate,
    pub importo: f64,
    pub mese: String,
    pub anno: i64,
    pub commenti: Option<String>,
}

pub fn add_payment(
    conn: &Connection,
    cache: &mut SessionCache,
    new: NewPayment,
) -> Result<i64> {
    // Double-checked here: the edge validates too, but no non-positive amount
    // may ever reach the store.
    if new.importo <= 0.0 {
        return Err(MutationError::InvalidInput(
            "importo must be greater than zero".to_string(),
        ));
    }
    require_text(&new.mese, "mese")?;

    let row = RowData::new()
        .set("studente_id", new.studente_id)
        .set("data", new.data.to_string())
        .set("importo", new.importo)
        .set("mese", new.mese)
        .set("anno", new.anno)
        .set_text_opt("commenti", new.commenti);

    let id = store::insert(conn, "pagamenti", &row).map_err(classify)?;
    info!(pagamento_id = id, studente_id = new.studente_id, "payment added");
    reload_after_write(conn, cache)?;
    Ok(id)
}

pub fn delete_payment(conn: &Connection, cache: &mut SessionCache, id: i64) -> Result<()> {
    store::delete_by_id(conn, "pagamenti", id).map_err(classify)?;
    reload_after_write(conn, cache)
}

#[derive(Debug, Clone)]
pub struct NewProgress {
    pub studente_id: i64,
    pub data: NaiveDate,
    pub contenuto_id: Option<i64>,
    pub descrizione: String,
}

pub fn add_progress(
    conn: &Connection,
    cache: &mut SessionCache,
    new: NewProgress,
) -> Result<i64> {
    require_text(&new.descrizione, "descrizione")?;

    let row = RowData::new()
        .set("studente_id", new.studente_id)
        .set("data", new.data.to_string())
        .set_opt("contenuto_id", new.contenuto_id)
        .set("descrizione", new.descrizione);

    let id = store::insert(conn, "progressi", &row).map_err(classify)?;
    info!(progresso_id = id, studente_id = new.studente_id, "progress added");
    reload_after_write(conn, cache)?;
    Ok(id)
}

pub fn delete_progress(conn: &Connection, cache: &mut SessionCache, id: i64) -> Result<()> {
    store::delete_by_id(conn, "progressi", id).map_err(classify)?;
    reload_after_write(conn, cache)
}

#[derive(Debug, Clone)]
pub struct NewResource {
    pub libro: Option<String>,
    pub titolo: String,
    pub url: String,
    pub categoria: String,
    pub livello: Level,
    pub descrizione: Option<String>,
}

pub fn add_resource(
    conn: &Connection,
    cache: &mut SessionCache,
    new: NewResource,
) -> Result<i64> {
    require_text(&new.titolo, "titolo")?;
    require_text(&new.url, "url")?;
    require_text(&new.categoria, "categoria")?;

    let row = RowData::new()
        .set_text_opt("libro", new.libro)
        .set("titolo", new.titolo)
        .set("url", new.url)
        .set("categoria", new.categoria)
        .set("livello", new.livello.as_str().to_string())
        .set_text_opt("descrizione", new.descrizione);

    let id = store::insert(conn, "libreria", &row).map_err(classify)?;
    info!(contenuto_id = id, "library resource added");
    reload_after_write(conn, cache)?;
    Ok(id)
}

pub fn delete_resource(conn: &Connection, cache: &mut SessionCache, id: i64) -> Result<()> {
    store::delete_by_id(conn, "libreria", id).map_err(classify)?;
    reload_after_write(conn, cache)
}

#[derive(Debug, Clone)]
pub struct NewLink {
    pub titolo: String,
    pub url: String,
    pub icona: Option<Vec<u8>>,
    pub ordine: Option<i64>,
}

pub fn add_custom_link(
    conn: &Connection,
    cache: &mut SessionCache,
    new: NewLink,
) -> Result<i64> {
    require_text(&new.titolo, "titolo")?;
    require_text(&new.url, "url")?;

    let row = RowData::new()
        .set("titolo", new.titolo)
        .set("url", new.url)
        .set_opt("icona", new.icona)
        .set_opt("ordine", new.ordine);

    let id = store::insert(conn, "custom_links", &row).map_err(classify)?;
    reload_after_write(conn, cache)?;
    Ok(id)
}

pub fn update_custom_link(
    conn: &Connection,
    cache: &mut SessionCache,
    id: i64,
    update: NewLink,
) -> Result<()> {
    require_text(&update.titolo, "titolo")?;
    require_text(&update.url, "url")?;

    let row = RowData::new()
        .set("titolo", update.titolo)
        .set("url", update.url)
        .set("icona", rusqlite::types::Value::from(update.icona))
        .set("ordine", rusqlite::types::Value::from(update.ordine));

    let affected = store::update_by_id(conn, "custom_links", id, &row).map_err(classify)?;
    if affected == 0 {
        return Err(MutationError::NotFound(format!("custom link {}", id)));
    }
    reload_after_write(conn, cache)
}

pub fn delete_custom_link(conn: &Connection, cache: &mut SessionCache, id: i64) -> Result<()> {
    store::delete_by_id(conn, "custom_links", id).map_err(classify)?;
    reload_after_write(conn, cache)
}

/// Returns failure (never a panic, never a duplicate row) when the name is
/// already present.
pub fn add_book(conn: &Connection, cache: &mut SessionCache, nome: &str) -> Result<i64> {
    require_text(nome, "nome")?;

    let row = RowData::new().set("nome", nome.trim().to_string());
    let id = store::insert(conn, "libri_disponibili", &row).map_err(classify)?;
    reload_after_write(conn, cache)?;
    Ok(id)
}

pub fn delete_book(conn: &Connection, cache: &mut SessionCache, nome: &str) -> Result<()> {
    store::delete_where_eq(conn, "libri_disponibili", "nome", nome.to_string())
        .map_err(classify)?;
    reload_after_write(conn, cache)
}

/// Branding is a singleton: insert on first save, update-in-place afterwards.
pub fn save_branding(
    conn: &Connection,
    cache: &mut SessionCache,
    logo: Option<Vec<u8>>,
    welcome_message: Option<String>,
) -> Result<()> {
    let existing = store::count(conn, "branding_settings").map_err(classify)?;

    let row = RowData::new()
        .set("logo", rusqlite::types::Value::from(logo))
        .set(
            "welcome_message",
            rusqlite::types::Value::from(welcome_message),
        );

    if existing == 0 {
        store::insert(conn, "branding_settings", &row).map_err(classify)?;
    } else {
        store::update_all(conn, "branding_settings", &row).map_err(classify)?;
    }

    info!("branding settings saved");
    reload_after_write(conn, cache)
}
