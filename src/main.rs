use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use lexitrans::config::Config;
use lexitrans::connectivity::ConnectivityGate;
use lexitrans::db::Database;
use lexitrans::language::Language;
use lexitrans::resolver::{Resolution, Resolver, TokenOutcome, TranslationRequest};
use lexitrans::search_index::SearchIndex;
use lexitrans::wikidata::WikidataClient;

#[derive(Parser)]
#[command(
    name = "lexitrans",
    about = "Resolve word and phrase translations between supported languages",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate a word or phrase into one or more target languages
    Translate {
        /// Source language code (en, fr, es, pt, de)
        #[arg(short = 's', long = "source-lang")]
        source_lang: Language,

        /// Target language code(s); repeat the flag for several
        #[arg(short = 't', long = "target-lang", required = true)]
        target_langs: Vec<Language>,

        /// Word or phrase to translate
        phrase: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lexitrans=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Translate {
            source_lang,
            target_langs,
            phrase,
        } => {
            let request = TranslationRequest::new(source_lang, target_langs, &phrase)?;

            let http = reqwest::Client::new();
            let wikidata = WikidataClient::new(http.clone(), config.sparql_endpoint.clone());
            let cache = SearchIndex::new(
                http,
                config.meilisearch_url.clone(),
                config.meilisearch_api_key.clone(),
            );
            let db = Database::new(&config.database_path)?;

            cache.ensure_index().await?;

            info!(
                "Translating '{}' from {} into [{}]",
                request.phrase,
                request.source_lang,
                request
                    .target_langs
                    .iter()
                    .map(Language::code)
                    .collect::<Vec<_>>()
                    .join(", ")
            );

            let resolver = Resolver::new(wikidata, cache, db, ConnectivityGate::new());
            let resolution = resolver.resolve(&request).await?;
            println!("{}", render_resolution(&request, &resolution));
        }
    }

    Ok(())
}

/// Human-readable rendering of a resolution for the terminal.
fn render_resolution(request: &TranslationRequest, resolution: &Resolution) -> String {
    match resolution {
        Resolution::Cached(document) => {
            let mut lines = vec![format!("'{}' (cached):", document.phrase)];
            for lang in &request.target_langs {
                match document.translation(*lang) {
                    Some(text) => lines.push(format!("  {}: {}", lang.code(), text)),
                    None => lines.push(format!("  {}: -", lang.code())),
                }
            }
            lines.join("\n")
        }
        Resolution::Resolved(record) => {
            let mut lines = vec![format!("'{}':", record.phrase)];
            for lang in &request.target_langs {
                match record.translations.get(lang) {
                    Some(text) => lines.push(format!("  {}: {}", lang.code(), text)),
                    None => lines.push(format!("  {}: -", lang.code())),
                }
            }
            lines.join("\n")
        }
        Resolution::Phrase(aggregate) => {
            let mut lines = vec![format!("'{}':", aggregate.phrase)];
            for (token, outcome) in &aggregate.tokens {
                match outcome {
                    TokenOutcome::Resolved(record) => {
                        let parts: Vec<String> = record
                            .translations
                            .iter()
                            .map(|(lang, text)| format!("{}: {}", lang.code(), text))
                            .collect();
                        lines.push(format!("  {} -> {}", token, parts.join(", ")));
                    }
                    TokenOutcome::NotFound => {
                        lines.push(format!("  {} -> no translation found", token));
                    }
                    TokenOutcome::Failed(reason) => {
                        lines.push(format!("  {} -> error: {}", token, reason));
                    }
                }
            }
            lines.join("\n")
        }
        Resolution::NotFound => format!(
            "No translations found for '{}' in the target languages.",
            request.phrase
        ),
    }
}
