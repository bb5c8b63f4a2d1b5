//! Wikidata SPARQL client: entity resolution and translation fetching.
//!
//! Two queries, mirroring the knowledge-base protocol: an exact-label match
//! that yields a canonical entity IRI, and a label query for that entity
//! filtered to the requested target languages. Neither query is retried;
//! transport and parse failures surface as `ResolveError::Resolution`, while
//! zero bindings are an ordinary `None`/empty result, never an error.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::error::ResolveError;
use crate::language::Language;

/// Result cap for the translation query. The same cap is applied at every
/// call site.
const TRANSLATION_LIMIT: u32 = 10;

/// Canonical identifier of a knowledge-base entity (a full IRI such as
/// `http://www.wikidata.org/entity/Q316`). Transient; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityId(String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    bindings: Vec<BTreeMap<String, SparqlValue>>,
}

#[derive(Debug, Deserialize)]
struct SparqlValue {
    value: String,
}

#[derive(Debug, Clone)]
pub struct WikidataClient {
    http: reqwest::Client,
    endpoint: String,
}

impl WikidataClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Resolve a word to its canonical entity via an exact-label match
    /// scoped to the source language. Only the first binding is used; no
    /// ranking or disambiguation among entities sharing a label.
    ///
    /// Returns `Ok(None)` when the knowledge base has no match.
    pub async fn resolve_entity(
        &self,
        word: &str,
        source_lang: Language,
    ) -> Result<Option<EntityId>, ResolveError> {
        let query = format!(
            "SELECT ?item WHERE {{ ?item rdfs:label \"{}\"@{}. }} LIMIT 1",
            escape_literal(word),
            source_lang.code()
        );

        let response = self.run_query(&query).await?;

        Ok(response
            .results
            .bindings
            .first()
            .and_then(|binding| binding.get("item"))
            .map(|value| EntityId(value.value.clone())))
    }

    /// Fetch the entity's labels in the given target languages.
    ///
    /// Bindings are folded into the map in response order, so when the
    /// knowledge base returns several labels for the same language code the
    /// last one wins. Languages with no binding are absent from the result;
    /// an empty map is a valid outcome.
    pub async fn fetch_translations(
        &self,
        entity: &EntityId,
        target_langs: &[Language],
    ) -> Result<BTreeMap<Language, String>, ResolveError> {
        let language_filter = target_langs
            .iter()
            .map(|lang| format!("\"{}\"", lang.code()))
            .collect::<Vec<_>>()
            .join(", ");

        let query = format!(
            "SELECT ?translation ?languageCode WHERE {{ \
             <{}> rdfs:label ?translation. \
             FILTER (LANG(?translation) IN ({})) \
             BIND (LANG(?translation) AS ?languageCode) }} LIMIT {}",
            entity.as_str(),
            language_filter,
            TRANSLATION_LIMIT
        );

        let response = self.run_query(&query).await?;

        let mut translations = BTreeMap::new();
        for binding in &response.results.bindings {
            let (Some(code), Some(translation)) =
                (binding.get("languageCode"), binding.get("translation"))
            else {
                continue;
            };
            // Codes outside the supported set are ignored rather than fatal.
            if let Ok(lang) = Language::from_code(&code.value) {
                translations.insert(lang, translation.value.clone());
            }
        }

        Ok(translations)
    }

    async fn run_query(&self, query: &str) -> Result<SparqlResponse, ResolveError> {
        debug!("SPARQL query: {}", query);

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("query", query), ("format", "json")])
            .header("Accept", "application/sparql-results+json")
            .send()
            .await
            .map_err(|e| {
                ResolveError::Resolution(format!("failed to reach SPARQL endpoint: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ResolveError::Resolution(format!(
                "SPARQL endpoint error ({}): {}",
                status, body
            )));
        }

        response.json::<SparqlResponse>().await.map_err(|e| {
            ResolveError::Resolution(format!("failed to parse SPARQL response: {}", e))
        })
    }
}

/// Escape a word for interpolation into a SPARQL string literal.
fn escape_literal(word: &str) -> String {
    word.replace('\\', "\\\\").replace('"', "\\\"")
}
