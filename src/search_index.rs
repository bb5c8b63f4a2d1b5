//! Meilisearch-backed cache of resolved translations.
//!
//! Documents mirror durable `translations` rows plus the primary key; the
//! document `id` is always the durable store's assigned id, which is the
//! cross-store consistency invariant the orchestrator upholds. Lookups
//! combine a free-text match on the phrase with a boolean AND of exact
//! per-language filters.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::TranslationRecord;
use crate::error::ResolveError;
use crate::language::Language;

const INDEX_UID: &str = "translations_index";

/// Searchable projection of a `TranslationRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheDocument {
    pub id: i64,
    pub source_lang: Language,
    pub phrase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub french: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spanish: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portuguese: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub german: Option<String>,
}

impl CacheDocument {
    /// Project a durable record into its cache document, carrying the
    /// durable id over unchanged.
    pub fn from_record(record: &TranslationRecord) -> Self {
        let get = |lang: Language| record.translations.get(&lang).cloned();
        Self {
            id: record.id,
            source_lang: record.source_lang,
            phrase: record.phrase.clone(),
            english: get(Language::English),
            french: get(Language::French),
            spanish: get(Language::Spanish),
            portuguese: get(Language::Portuguese),
            german: get(Language::German),
        }
    }

    /// The cached translation for a language, if present.
    pub fn translation(&self, lang: Language) -> Option<&str> {
        let field = match lang {
            Language::English => &self.english,
            Language::French => &self.french,
            Language::Spanish => &self.spanish,
            Language::Portuguese => &self.portuguese,
            Language::German => &self.german,
        };
        field.as_deref()
    }
}

/// An exact-match clause applied on top of the free-text search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFilter {
    SourceLang(Language),
    Translation(Language, String),
}

impl SearchFilter {
    fn clause(&self) -> String {
        match self {
            SearchFilter::SourceLang(lang) => format!("source_lang = '{}'", lang.code()),
            SearchFilter::Translation(lang, text) => {
                format!("{} = '{}'", lang.column(), text.replace('\'', "\\'"))
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Vec<CacheDocument>,
}

#[derive(Debug, Clone)]
pub struct SearchIndex {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SearchIndex {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http,
            base_url,
            api_key,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }

    /// Create the translations index if it does not exist yet, and mark the
    /// filter attributes filterable.
    ///
    /// The settings update is mandatory: Meilisearch rejects a search whose
    /// `filter` names an attribute missing from `filterableAttributes`
    /// (which defaults to empty), so without it every filtered lookup
    /// fails and the cache can never hit.
    pub async fn ensure_index(&self) -> Result<(), ResolveError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/indexes/{}", INDEX_UID))
            .send()
            .await
            .map_err(|e| ResolveError::Persistence(format!("failed to reach Meilisearch: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            let response = self
                .request(reqwest::Method::POST, "/indexes")
                .json(&serde_json::json!({ "uid": INDEX_UID, "primaryKey": "id" }))
                .send()
                .await
                .map_err(|e| {
                    ResolveError::Persistence(format!("failed to reach Meilisearch: {}", e))
                })?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(ResolveError::Persistence(format!(
                    "Meilisearch error creating index ({}): {}",
                    status, body
                )));
            }

            debug!("Created Meilisearch index '{}'", INDEX_UID);
        } else if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ResolveError::Persistence(format!(
                "Meilisearch error checking index ({}): {}",
                status, body
            )));
        }

        // Idempotent; applied on every startup so existing indexes pick up
        // newly added languages.
        let attributes: Vec<&str> = std::iter::once("source_lang")
            .chain(Language::ALL.iter().map(|lang| lang.column()))
            .collect();

        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/indexes/{}/settings/filterable-attributes", INDEX_UID),
            )
            .json(&attributes)
            .send()
            .await
            .map_err(|e| ResolveError::Persistence(format!("failed to reach Meilisearch: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ResolveError::Persistence(format!(
                "Meilisearch error updating filterable attributes ({}): {}",
                status, body
            )));
        }

        Ok(())
    }

    /// Free-text search for a phrase, narrowed by exact filters. Returns the
    /// first hit or `None` for a cache miss.
    pub async fn lookup(
        &self,
        phrase: &str,
        filters: &[SearchFilter],
    ) -> Result<Option<CacheDocument>, ResolveError> {
        let filter = if filters.is_empty() {
            None
        } else {
            Some(
                filters
                    .iter()
                    .map(SearchFilter::clause)
                    .collect::<Vec<_>>()
                    .join(" AND "),
            )
        };

        debug!("Cache lookup for '{}' (filter: {:?})", phrase, filter);

        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/indexes/{}/search", INDEX_UID),
            )
            .json(&SearchRequest { q: phrase, filter })
            .send()
            .await
            .map_err(|e| ResolveError::Persistence(format!("failed to reach Meilisearch: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ResolveError::Persistence(format!(
                "Meilisearch search error ({}): {}",
                status, body
            )));
        }

        let search: SearchResponse = response.json().await.map_err(|e| {
            ResolveError::Persistence(format!("failed to parse Meilisearch response: {}", e))
        })?;

        Ok(search.hits.into_iter().next())
    }

    /// Idempotent upsert keyed by the document id. The caller always
    /// supplies the durable store's assigned id.
    pub async fn write(&self, document: &CacheDocument) -> Result<(), ResolveError> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/indexes/{}/documents", INDEX_UID),
            )
            .json(&[document])
            .send()
            .await
            .map_err(|e| ResolveError::Persistence(format!("failed to reach Meilisearch: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ResolveError::Persistence(format!(
                "Meilisearch indexing error ({}): {}",
                status, body
            )));
        }

        Ok(())
    }
}
