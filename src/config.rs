use anyhow::Result;

#[derive(Debug, Clone)]
pub struct Config {
    // Durable store
    pub database_path: String,

    // Meilisearch
    pub meilisearch_url: String,
    pub meilisearch_api_key: Option<String>,

    // Wikidata
    pub sparql_endpoint: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Durable store
            database_path: std::env::var("LEXITRANS_DB_PATH")
                .unwrap_or_else(|_| "data/translations.db".to_string()),

            // Meilisearch
            meilisearch_url: std::env::var("MEILISEARCH_URL")
                .unwrap_or_else(|_| "http://localhost:7700".to_string()),
            meilisearch_api_key: std::env::var("MEILISEARCH_API_KEY").ok(),

            // Wikidata
            sparql_endpoint: std::env::var("SPARQL_ENDPOINT")
                .unwrap_or_else(|_| "https://query.wikidata.org/sparql".to_string()),
        })
    }
}
