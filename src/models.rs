//! Entities and enumerations mirrored on the backend schema.
//!
//! Field names follow the column names exactly; the View Layer consumes these
//! rows as-is, so the schema is the binding contract here.

use rusqlite::Row;

/// Weekdays in display order. `giorni_lezione.giorno` holds one of these.
pub const WEEKDAYS: [&str; 7] = [
    "Lunedì",
    "Martedì",
    "Mercoledì",
    "Giovedì",
    "Venerdì",
    "Sabato",
    "Domenica",
];

pub const LEVELS: [&str; 6] = ["A1", "A2", "B1", "B2", "C1", "C2"];

pub const CHANNELS: [&str; 4] = ["Diretto", "Apprentus", "Preply", "iTalki"];

/// Month names used by payment records.
pub const MONTHS: [&str; 12] = [
    "Gennaio",
    "Febbraio",
    "Marzo",
    "Aprile",
    "Maggio",
    "Giugno",
    "Luglio",
    "Agosto",
    "Settembre",
    "Ottobre",
    "Novembre",
    "Dicembre",
];

/// Library categories offered by the resource form.
pub const CATEGORIES: [&str; 5] = [
    "Materiale Didattico",
    "Esercizi",
    "Video",
    "Link Utili",
    "Altro",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weekday(usize);

impl Weekday {
    pub fn parse(name: &str) -> Option<Self> {
        WEEKDAYS.iter().position(|w| *w == name).map(Weekday)
    }

    pub fn as_str(&self) -> &'static str {
        WEEKDAYS[self.0]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level(usize);

impl Level {
    pub fn parse(name: &str) -> Option<Self> {
        LEVELS.iter().position(|l| *l == name).map(Level)
    }

    pub fn as_str(&self) -> &'static str {
        LEVELS[self.0]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel(usize);

impl Channel {
    pub fn parse(name: &str) -> Option<Self> {
        CHANNELS.iter().position(|c| *c == name).map(Channel)
    }

    pub fn as_str(&self) -> &'static str {
        CHANNELS[self.0]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: i64,
    pub nome: String,
    pub cognome: String,
    pub canale: String,
    pub livello: String,
    pub metodologia: Option<String>,
    pub durata_lezione: Option<i64>,
    pub prezzo_lezione: f64,
    pub commenti: Option<String>,
    pub data_iscrizione: String,
    pub slides_url: Option<String>,
    pub classroom_url: Option<String>,
    pub meet_url: Option<String>,
}

impl Student {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            nome: row.get(1)?,
            cognome: row.get(2)?,
            canale: row.get(3)?,
            livello: row.get(4)?,
            metodologia: row.get(5)?,
            durata_lezione: row.get(6)?,
            prezzo_lezione: row.get(7)?,
            commenti: row.get(8)?,
            data_iscrizione: row.get(9)?,
            slides_url: row.get(10)?,
            classroom_url: row.get(11)?,
            meet_url: row.get(12)?,
        })
    }
}

/// One weekday slot, denormalized with the student's name and level at load
/// time so the weekly agenda renders without further lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonSlot {
    pub studente_id: i64,
    pub giorno: String,
    pub nome: String,
    pub cognome: String,
    pub livello: String,
}

impl LessonSlot {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            studente_id: row.get(0)?,
            giorno: row.get(1)?,
            nome: row.get(2)?,
            cognome: row.get(3)?,
            livello: row.get(4)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub id: i64,
    pub studente_id: i64,
    pub data: String,
    pub contenuto_id: Option<i64>,
    pub descrizione: String,
}

impl ProgressRecord {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            studente_id: row.get(1)?,
            data: row.get(2)?,
            contenuto_id: row.get(3)?,
            descrizione: row.get(4)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub id: i64,
    pub studente_id: i64,
    pub data: String,
    pub importo: f64,
    pub mese: String,
    pub anno: i64,
    pub commenti: Option<String>,
}

impl Payment {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            studente_id: row.get(1)?,
            data: row.get(2)?,
            importo: row.get(3)?,
            mese: row.get(4)?,
            anno: row.get(5)?,
            commenti: row.get(6)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryItem {
    pub id: i64,
    pub libro: Option<String>,
    pub titolo: String,
    pub url: String,
    pub categoria: String,
    pub livello: String,
    pub descrizione: Option<String>,
}

impl LibraryItem {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            libro: row.get(1)?,
            titolo: row.get(2)?,
            url: row.get(3)?,
            categoria: row.get(4)?,
            livello: row.get(5)?,
            descrizione: row.get(6)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomLink {
    pub id: i64,
    pub titolo: String,
    pub url: String,
    pub icona: Option<Vec<u8>>,
    pub ordine: Option<i64>,
}

impl CustomLink {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            titolo: row.get(1)?,
            url: row.get(2)?,
            icona: row.get(3)?,
            ordine: row.get(4)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Branding {
    pub id: i64,
    pub logo: Option<Vec<u8>>,
    pub welcome_message: Option<String>,
}

impl Branding {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            logo: row.get(1)?,
            welcome_message: row.get(2)?,
        })
    }
}

/// Icon and logo blobs arrive from the store either as raw image bytes or as
/// base64-encoded text (both representations exist in the wild). Detect which
/// and return the decoded image bytes.
pub fn decode_image(raw: &[u8]) -> Vec<u8> {
    if has_image_magic(raw) {
        return raw.to_vec();
    }
    if let Ok(text) = std::str::from_utf8(raw) {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        if let Ok(decoded) = STANDARD.decode(text.trim()) {
            if has_image_magic(&decoded) || !decoded.is_empty() {
                return decoded;
            }
        }
    }
    raw.to_vec()
}

fn has_image_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0x89, b'P', b'N', b'G'])
        || bytes.starts_with(&[0xFF, 0xD8, 0xFF])
        || bytes.starts_with(b"GIF87a")
        || bytes.starts_with(b"GIF89a")
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    #[test]
    fn weekday_parse_roundtrip() {
        for name in WEEKDAYS {
            assert_eq!(Weekday::parse(name).unwrap().as_str(), name);
        }
        assert!(Weekday::parse("Monday").is_none());
    }

    #[test]
    fn level_and_channel_reject_unknown_values() {
        assert!(Level::parse("B1").is_some());
        assert!(Level::parse("D1").is_none());
        assert!(Channel::parse("Preply").is_some());
        assert!(Channel::parse("Skype").is_none());
    }

    #[test]
    fn decode_image_passes_raw_png_through() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];
        assert_eq!(decode_image(&png), png.to_vec());
    }

    #[test]
    fn decode_image_handles_base64_text() {
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 9, 8];
        let encoded = STANDARD.encode(&png);
        assert_eq!(decode_image(encoded.as_bytes()), png);
    }

    #[test]
    fn decode_image_falls_back_to_raw_bytes() {
        // Not an image, not base64: hand the bytes back unchanged.
        let junk = b"not-base64!!".to_vec();
        assert_eq!(decode_image(&junk), junk);
    }
}
