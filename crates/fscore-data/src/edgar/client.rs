//! SEC EDGAR API client with rate limiting.

use crate::error::{DataError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// SEC EDGAR API base URL
const EDGAR_BASE_URL: &str = "https://data.sec.gov";

/// Ticker-to-CIK mapping file (hosted at www.sec.gov, not data.sec.gov)
const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// Default rate limit: 10 requests per second (SEC requirement)
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// User agent for SEC EDGAR requests (SEC requires identifying information)
const USER_AGENT: &str = "fscore/0.1 (fscore@factordynamics.io)";

/// Company information from tickers endpoint
/// The SEC returns: {"0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."}, ...}
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct CompanyInfo {
    /// CIK as a number (SEC returns this as an integer despite the name)
    cik_str: u64,
    /// Ticker symbol
    ticker: String,
    /// Company name
    title: String,
}

/// Rate limiter to ensure we don't exceed SEC's rate limits
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// SEC EDGAR API client with rate limiting.
///
/// Clones share the same rate limiter, so concurrent fetch tasks stay
/// within the SEC's request budget collectively.
#[derive(Clone)]
pub struct EdgarClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    base_url: String,
}

impl EdgarClient {
    /// Create a new EDGAR client with default settings (10 req/sec)
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(DEFAULT_RATE_LIMIT)
    }

    /// Create a new EDGAR client with custom rate limit
    ///
    /// # Arguments
    /// * `min_interval` - Minimum duration between requests
    ///
    /// # Example
    /// ```no_run
    /// use fscore_data::edgar::EdgarClient;
    /// use std::time::Duration;
    ///
    /// # fn example() -> fscore_data::Result<()> {
    /// // 5 requests per second
    /// let client = EdgarClient::with_rate_limit(Duration::from_millis(200))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_rate_limit(min_interval: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(min_interval))),
            base_url: EDGAR_BASE_URL.to_string(),
        })
    }

    /// The EDGAR API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Rate-limited GET with HTTP status handling.
    pub(crate) async fn get(&self, url: &str) -> Result<reqwest::Response> {
        self.rate_limiter.lock().await.wait().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(DataError::Network)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map_or(1000, |secs| secs * 1000);
            return Err(DataError::RateLimit { retry_after_ms });
        }
        if !status.is_success() {
            return Err(DataError::EdgarApi(format!("{}: HTTP {}", url, status)));
        }

        Ok(response)
    }

    /// Look up a company's CIK number from its ticker symbol
    ///
    /// # Arguments
    /// * `ticker` - Stock ticker symbol (e.g., "AAPL")
    ///
    /// # Returns
    /// The company's CIK number as a zero-padded 10-digit string
    ///
    /// # Errors
    /// Returns `DataError::CikNotFound` if the ticker is not found
    ///
    /// # Example
    /// ```no_run
    /// use fscore_data::edgar::EdgarClient;
    ///
    /// # async fn example() -> fscore_data::Result<()> {
    /// let client = EdgarClient::new()?;
    /// let cik = client.get_company_cik("AAPL").await?;
    /// println!("Apple CIK: {}", cik);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_company_cik(&self, ticker: &str) -> Result<String> {
        if ticker.is_empty() {
            return Err(DataError::InvalidSymbol("Empty ticker".to_string()));
        }

        let ticker_upper = ticker.to_uppercase();

        let response = self.get(COMPANY_TICKERS_URL).await?;

        // Parse as a map of index -> CompanyInfo
        let data: HashMap<String, CompanyInfo> = response
            .json()
            .await
            .map_err(|e| DataError::EdgarApi(format!("Failed to parse company tickers: {}", e)))?;

        // EDGAR lists tickers with '-' where exchanges use '.' (BRK.B vs BRK-B)
        let ticker_dashed = ticker_upper.replace('.', "-");

        for company in data.values() {
            let listed = company.ticker.to_uppercase();
            if listed == ticker_upper || listed == ticker_dashed {
                // CIK should be zero-padded to 10 digits
                let cik = format!("{:0>10}", company.cik_str);
                return Ok(cik);
            }
        }

        Err(DataError::CikNotFound(ticker.to_string()))
    }
}

impl std::fmt::Debug for EdgarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgarClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
