//! The closed set of languages supported by the translation pipeline.
//!
//! The durable store has one column per language, so adding a language
//! here requires a schema migration in `db`.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A supported language, identified by its ISO 639-1 code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    English,
    French,
    Spanish,
    Portuguese,
    German,
}

impl Language {
    /// Every supported language, in a stable order.
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::French,
        Language::Spanish,
        Language::Portuguese,
        Language::German,
    ];

    /// Parse an ISO 639-1 code. Anything outside the supported set is an error.
    pub fn from_code(code: &str) -> Result<Language> {
        match code {
            "en" => Ok(Language::English),
            "fr" => Ok(Language::French),
            "es" => Ok(Language::Spanish),
            "pt" => Ok(Language::Portuguese),
            "de" => Ok(Language::German),
            _ => bail!("Unsupported language code: '{}'", code),
        }
    }

    /// The ISO 639-1 code (e.g., "en", "fr").
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
            Language::Spanish => "es",
            Language::Portuguese => "pt",
            Language::German => "de",
        }
    }

    /// The English name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::French => "French",
            Language::Spanish => "Spanish",
            Language::Portuguese => "Portuguese",
            Language::German => "German",
        }
    }

    /// The column name used for this language in the durable `translations`
    /// table and in cache documents.
    pub fn column(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::French => "french",
            Language::Spanish => "spanish",
            Language::Portuguese => "portuguese",
            Language::German => "german",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Language::from_code(s)
    }
}

impl TryFrom<String> for Language {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Language::from_code(&value)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> String {
        language.code().to_string()
    }
}
