//! Resolution orchestrator: cache-aside lookup, knowledge-base resolution,
//! phrase decomposition, and dual-store persistence.
//!
//! The flow for every request is the same state machine:
//!
//! ```text
//! cache lookup -> hit?  return cached document
//!              -> miss: connectivity gate -> resolve (word or per-token)
//!                       -> durable insert -> cache write -> return
//! ```
//!
//! The durable insert must succeed before the cache write is attempted,
//! because the cache document borrows the durable row's id. A cache-write
//! failure after a successful insert is logged and the operation still
//! succeeds; the resulting cache miss self-heals on a later resolution.

use futures::StreamExt;

use tracing::{info, warn};

use crate::connectivity::ConnectivityGate;
use crate::db::{Database, TranslationRecord};
use crate::error::ResolveError;
use crate::language::Language;
use crate::search_index::{CacheDocument, SearchFilter, SearchIndex};
use crate::wikidata::WikidataClient;

/// How many tokens of a phrase are resolved concurrently.
const PHRASE_CONCURRENCY: usize = 4;

/// A validated translation request. Constructed once at the system boundary;
/// everything past this point can rely on its invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub source_lang: Language,
    pub phrase: String,
    /// Effective target set: deduplicated, source language removed,
    /// original order preserved.
    pub target_langs: Vec<Language>,
}

impl TranslationRequest {
    pub fn new(
        source_lang: Language,
        target_langs: Vec<Language>,
        phrase: &str,
    ) -> Result<Self, ResolveError> {
        let phrase = phrase.trim();
        if phrase.is_empty() {
            return Err(ResolveError::Validation(
                "phrase must be a non-empty string".to_string(),
            ));
        }

        let mut effective = Vec::new();
        for lang in target_langs {
            if lang != source_lang && !effective.contains(&lang) {
                effective.push(lang);
            }
        }
        if effective.is_empty() {
            return Err(ResolveError::Validation(
                "target languages must differ from the source language".to_string(),
            ));
        }

        Ok(Self {
            source_lang,
            phrase: phrase.to_string(),
            target_langs: effective,
        })
    }

    fn is_multi_word(&self) -> bool {
        self.phrase.split_whitespace().nth(1).is_some()
    }
}

/// Resolution of one token inside a phrase. A failed token never aborts the
/// rest of the phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome {
    Resolved(TranslationRecord),
    NotFound,
    Failed(String),
}

/// Per-token outcomes for a multi-word phrase, one entry per token
/// occurrence, in the phrase's original order. Duplicate tokens are resolved
/// independently and keep their own entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseAggregate {
    pub phrase: String,
    pub tokens: Vec<(String, TokenOutcome)>,
}

/// Outcome of a resolution. "Not found" is an outcome, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Served from the cache index; no knowledge-base call was made.
    Cached(CacheDocument),
    /// Freshly resolved and durably persisted.
    Resolved(TranslationRecord),
    /// Per-token outcomes for a multi-word phrase.
    Phrase(PhraseAggregate),
    /// The knowledge base has no match for the word.
    NotFound,
}

/// Result of the single-word path, shared by direct requests and phrase
/// tokens.
enum WordResolution {
    Resolved(TranslationRecord),
    NotFound,
}

pub struct Resolver {
    wikidata: WikidataClient,
    cache: SearchIndex,
    db: Database,
    gate: ConnectivityGate,
}

impl Resolver {
    pub fn new(
        wikidata: WikidataClient,
        cache: SearchIndex,
        db: Database,
        gate: ConnectivityGate,
    ) -> Self {
        Self {
            wikidata,
            cache,
            db,
            gate,
        }
    }

    /// Resolve a request end to end. Single- and multi-word phrases enter
    /// here alike; the branch is selected solely by whether the phrase
    /// contains whitespace.
    pub async fn resolve(&self, request: &TranslationRequest) -> Result<Resolution, ResolveError> {
        // Cache-aside read. A failing cache read degrades to a miss rather
        // than aborting the resolution.
        let filters = [SearchFilter::SourceLang(request.source_lang)];
        match self.cache.lookup(&request.phrase, &filters).await {
            Ok(Some(document)) => {
                info!("Cache hit for '{}' (id {})", request.phrase, document.id);
                return Ok(Resolution::Cached(document));
            }
            Ok(None) => {}
            Err(e) => warn!("Cache lookup failed, treating as miss: {}", e),
        }

        if !self.gate.check().await {
            return Err(ResolveError::Connectivity);
        }

        if request.is_multi_word() {
            let aggregate = self.resolve_phrase(request).await;
            return Ok(Resolution::Phrase(aggregate));
        }

        match self
            .resolve_word(&request.phrase, request.source_lang, &request.target_langs)
            .await?
        {
            WordResolution::Resolved(record) => Ok(Resolution::Resolved(record)),
            WordResolution::NotFound => Ok(Resolution::NotFound),
        }
    }

    /// Split a phrase on whitespace and run the full single-word path for
    /// each token independently: no entity cache is shared between tokens,
    /// even for repeated ones. Tokens fan out with bounded concurrency and
    /// the aggregate preserves the original token order.
    async fn resolve_phrase(&self, request: &TranslationRequest) -> PhraseAggregate {
        let tokens: Vec<&str> = request.phrase.split_whitespace().collect();
        info!(
            "Resolving phrase '{}' as {} tokens",
            request.phrase,
            tokens.len()
        );

        let outcomes: Vec<(String, TokenOutcome)> = futures::stream::iter(
            tokens.into_iter().map(|token| async move {
                let outcome = match self
                    .resolve_word(token, request.source_lang, &request.target_langs)
                    .await
                {
                    Ok(WordResolution::Resolved(record)) => TokenOutcome::Resolved(record),
                    Ok(WordResolution::NotFound) => TokenOutcome::NotFound,
                    Err(e) => {
                        warn!("Token '{}' failed to resolve: {}", token, e);
                        TokenOutcome::Failed(e.to_string())
                    }
                };
                (token.to_string(), outcome)
            }),
        )
        .buffered(PHRASE_CONCURRENCY)
        .collect()
        .await;

        PhraseAggregate {
            phrase: request.phrase.clone(),
            tokens: outcomes,
        }
    }

    /// The single-word path: entity resolution, translation fetch, then
    /// persistence into both stores.
    async fn resolve_word(
        &self,
        word: &str,
        source_lang: Language,
        target_langs: &[Language],
    ) -> Result<WordResolution, ResolveError> {
        let Some(entity) = self.wikidata.resolve_entity(word, source_lang).await? else {
            info!("No entity found for '{}' ({})", word, source_lang);
            return Ok(WordResolution::NotFound);
        };

        let translations = self
            .wikidata
            .fetch_translations(&entity, target_langs)
            .await?;

        if translations.is_empty() {
            info!("No translations found for '{}' in the target languages", word);
            return Ok(WordResolution::NotFound);
        }

        // Durable insert first: the cache document borrows the assigned id.
        let id = self
            .db
            .insert_translation(source_lang, word, &translations)
            .map_err(|e| ResolveError::Persistence(e.to_string()))?;

        let record = TranslationRecord {
            id,
            source_lang,
            phrase: word.to_string(),
            translations,
        };

        // Cache write failure is downgraded: the durable row is the
        // authority, and a later resolution repopulates the cache.
        if let Err(e) = self.cache.write(&CacheDocument::from_record(&record)).await {
            warn!(
                "Cache write for '{}' (id {}) failed; durable row kept: {}",
                word, id, e
            );
        }

        info!("Resolved '{}' into record {}", word, id);
        Ok(WordResolution::Resolved(record))
    }
}
