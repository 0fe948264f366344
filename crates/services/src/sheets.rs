use std::env;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use mehfil_core::csv::Table;

use crate::error::FetchError;

const DEFAULT_USERS_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRjS7naJ57vdLOHdSvUpUXNyotANcl9b4jHE5SUolPLPLjvSBPzjaq6gph605JGKjGI51OzR4OO7ywq/pub?output=csv";
const DEFAULT_MAIN_QUIZ_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vRDauFHl4Oddzupn2bC0PbayXrncq4R0zHP6JGxBzGSzx-Wn6ZW4OP-VBBe-NBF-n7K10Me64ydi5C3/pub?output=csv";
const DEFAULT_DEMO_QUIZ_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vQ4DzVrw2siEz6YQvb4bkfpmRIRbKcYQzsNyItErh0jdb5rdSAAMt7Tv0adk9o3SswspvlkMC9BTs4J/pub?output=csv";

/// Published-CSV endpoints for the three sheets the app reads.
#[derive(Clone, Debug)]
pub struct SheetEndpoints {
    pub users_url: String,
    pub main_quiz_url: String,
    pub demo_quiz_url: String,
}

impl SheetEndpoints {
    /// Reads `MEHFIL_USERS_CSV_URL`, `MEHFIL_QUIZ_CSV_URL` and
    /// `MEHFIL_DEMO_QUIZ_CSV_URL`, falling back to the published event
    /// sheets.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            users_url: env::var("MEHFIL_USERS_CSV_URL")
                .unwrap_or_else(|_| DEFAULT_USERS_URL.into()),
            main_quiz_url: env::var("MEHFIL_QUIZ_CSV_URL")
                .unwrap_or_else(|_| DEFAULT_MAIN_QUIZ_URL.into()),
            demo_quiz_url: env::var("MEHFIL_DEMO_QUIZ_CSV_URL")
                .unwrap_or_else(|_| DEFAULT_DEMO_QUIZ_URL.into()),
        }
    }
}

/// Read-only access to the published sheets.
///
/// A failed fetch is terminal for the operation that needed it: callers
/// surface "data unavailable" instead of retrying.
#[async_trait]
pub trait SheetFetcher: Send + Sync {
    /// Fetch the user-credentials sheet.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` on transport failure, a non-success status, or
    /// unparsable CSV.
    async fn fetch_users(&self) -> Result<Table, FetchError>;

    /// Fetch the main quiz bank.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` on transport failure, a non-success status, or
    /// unparsable CSV.
    async fn fetch_main_quiz(&self) -> Result<Table, FetchError>;

    /// Fetch the demo quiz bank.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` on transport failure, a non-success status, or
    /// unparsable CSV.
    async fn fetch_demo_quiz(&self) -> Result<Table, FetchError>;
}

/// `SheetFetcher` over plain HTTP GET.
#[derive(Clone)]
pub struct HttpSheetFetcher {
    client: Client,
    endpoints: SheetEndpoints,
}

impl HttpSheetFetcher {
    #[must_use]
    pub fn new(endpoints: SheetEndpoints) -> Self {
        Self {
            client: Client::new(),
            endpoints,
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(SheetEndpoints::from_env())
    }

    async fn fetch_table(&self, url: &str) -> Result<Table, FetchError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            warn!(status = %response.status(), "sheet fetch rejected");
            return Err(FetchError::HttpStatus(response.status()));
        }
        let text = response.text().await?;
        let table = Table::parse(&text)?;
        debug!(rows = table.len(), "fetched sheet");
        Ok(table)
    }
}

#[async_trait]
impl SheetFetcher for HttpSheetFetcher {
    async fn fetch_users(&self) -> Result<Table, FetchError> {
        self.fetch_table(&self.endpoints.users_url).await
    }

    async fn fetch_main_quiz(&self) -> Result<Table, FetchError> {
        self.fetch_table(&self.endpoints.main_quiz_url).await
    }

    async fn fetch_demo_quiz(&self) -> Result<Table, FetchError> {
        self.fetch_table(&self.endpoints.demo_quiz_url).await
    }
}
