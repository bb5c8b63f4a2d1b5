use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::language::Language;

/// A durably persisted translation row. Immutable once created; there is no
/// update or delete operation for translations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRecord {
    pub id: i64,
    pub source_lang: Language,
    pub phrase: String,
    /// Sparse: languages with no resolved translation are simply absent.
    pub translations: BTreeMap<Language, String>,
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Initialize database connection and create the translations table.
    ///
    /// The schema carries one column per supported language, so extending
    /// `Language` requires a migration here.
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .context(format!("Failed to open database at {}", database_path))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS translations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_lang TEXT NOT NULL,
                phrase TEXT NOT NULL,
                english TEXT,
                french TEXT,
                spanish TEXT,
                portuguese TEXT,
                german TEXT
            )",
            [],
        )
        .context("Failed to create translations table")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Append a resolved translation and return the assigned row id.
    ///
    /// Deliberately append-only: no existence check, no upsert, no
    /// uniqueness constraint on `(source_lang, phrase)`. Repeated
    /// resolutions of the same phrase produce independent rows.
    pub fn insert_translation(
        &self,
        source_lang: Language,
        phrase: &str,
        translations: &BTreeMap<Language, String>,
    ) -> Result<i64> {
        if phrase.trim().is_empty() {
            anyhow::bail!("Cannot persist an empty phrase");
        }

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO translations (source_lang, phrase, english, french, spanish, portuguese, german)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                source_lang.code(),
                phrase,
                translations.get(&Language::English),
                translations.get(&Language::French),
                translations.get(&Language::Spanish),
                translations.get(&Language::Portuguese),
                translations.get(&Language::German),
            ],
        )
        .context("Failed to insert translation")?;

        Ok(conn.last_insert_rowid())
    }

    /// Read a translation row back by id.
    pub fn get_translation(&self, id: i64) -> Result<Option<TranslationRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, source_lang, phrase, english, french, spanish, portuguese, german
             FROM translations WHERE id = ?1",
        )?;

        let record = stmt
            .query_row(params![id], |row| {
                let code: String = row.get(1)?;
                let columns: [(Language, Option<String>); 5] = [
                    (Language::English, row.get(3)?),
                    (Language::French, row.get(4)?),
                    (Language::Spanish, row.get(5)?),
                    (Language::Portuguese, row.get(6)?),
                    (Language::German, row.get(7)?),
                ];
                Ok((row.get::<_, i64>(0)?, code, row.get::<_, String>(2)?, columns))
            })
            .optional()
            .context("Failed to read translation")?;

        let Some((id, code, phrase, columns)) = record else {
            return Ok(None);
        };

        let source_lang = Language::from_code(&code)
            .context(format!("Row {} carries an unsupported source_lang", id))?;

        let translations = columns
            .into_iter()
            .filter_map(|(lang, text)| text.map(|t| (lang, t)))
            .collect();

        Ok(Some(TranslationRecord {
            id,
            source_lang,
            phrase,
            translations,
        }))
    }

    /// Count rows stored for a given source language and phrase. Used to
    /// observe the append-only contract (duplicates accumulate).
    pub fn count_for_phrase(&self, source_lang: Language, phrase: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT COUNT(*) FROM translations WHERE source_lang = ?1 AND phrase = ?2",
        )?;
        let count: i64 = stmt.query_row(params![source_lang.code(), phrase], |row| row.get(0))?;
        Ok(count as usize)
    }
}
