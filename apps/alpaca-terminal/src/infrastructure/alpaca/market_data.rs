//! Alpaca market data adapter.
//!
//! Implements every provider port over a single [`AlpacaHttpClient`].

use async_trait::async_trait;

use super::api_types::{AssetResponse, ClockResponse, CryptoBarsResponse, LatestQuoteResponse};
use super::error::AlpacaError;
use super::http_client::AlpacaHttpClient;
use crate::application::ports::{
    AssetPort, CryptoBarsPort, MarketClockPort, ProviderError, QuoteProviderPort,
};
use crate::domain::bars::{BarSet, CryptoBarsRequest};
use crate::domain::market::{AssetInfo, MarketClock};
use crate::domain::quote::Quote;
use crate::infrastructure::config::{AlpacaSettings, DataFeed};

/// Largest page the bars endpoint serves.
const MAX_PAGE_SIZE: usize = 10_000;

/// Alpaca REST adapter for quotes, clock, assets and crypto bars.
#[derive(Debug, Clone)]
pub struct AlpacaMarketData {
    http: AlpacaHttpClient,
    feed: DataFeed,
}

impl AlpacaMarketData {
    /// Create an adapter from settings.
    pub fn new(settings: &AlpacaSettings) -> Result<Self, AlpacaError> {
        Ok(Self {
            http: AlpacaHttpClient::new(settings)?,
            feed: settings.feed,
        })
    }

    async fn fetch_bars_page(
        &self,
        request: &CryptoBarsRequest,
        page_limit: usize,
        page_token: Option<&str>,
    ) -> Result<CryptoBarsResponse, AlpacaError> {
        let mut query = vec![
            ("symbols", request.symbols.join(",")),
            ("timeframe", request.timeframe.to_string()),
            ("start", format!("{}T00:00:00Z", request.start)),
            ("limit", page_limit.to_string()),
            ("sort", "asc".to_string()),
        ];
        if let Some(end) = request.end {
            query.push(("end", format!("{end}T23:59:59Z")));
        }
        if let Some(token) = page_token {
            query.push(("page_token", token.to_string()));
        }

        self.http
            .data_get(&["v1beta3", "crypto", "us", "bars"], &query)
            .await
    }
}

#[async_trait]
impl QuoteProviderPort for AlpacaMarketData {
    async fn latest_quote(&self, symbol: &str) -> Result<Quote, ProviderError> {
        let response: LatestQuoteResponse = self
            .http
            .data_get(
                &["v2", "stocks", symbol, "quotes", "latest"],
                &[("feed", self.feed.as_str().to_string())],
            )
            .await
            .map_err(|e| e.for_symbol(symbol))?;

        if response.quote.bp.is_none() && response.quote.ap.is_none() {
            tracing::debug!(symbol, "Latest quote has no prices");
        }

        Ok(Quote::new(symbol, response.quote.bp, response.quote.ap))
    }
}

#[async_trait]
impl MarketClockPort for AlpacaMarketData {
    async fn market_clock(&self) -> Result<MarketClock, ProviderError> {
        let clock: ClockResponse = self.http.get(&["v2", "clock"]).await?;
        Ok(clock.into())
    }
}

#[async_trait]
impl AssetPort for AlpacaMarketData {
    async fn asset(&self, symbol: &str) -> Result<AssetInfo, ProviderError> {
        let asset: AssetResponse = self
            .http
            .get(&["v2", "assets", symbol])
            .await
            .map_err(|e| e.for_symbol(symbol))?;
        Ok(asset.into())
    }
}

#[async_trait]
impl CryptoBarsPort for AlpacaMarketData {
    async fn crypto_bars(&self, request: &CryptoBarsRequest) -> Result<BarSet, ProviderError> {
        let mut set = BarSet::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0_u32;

        loop {
            let remaining = request.limit.map(|limit| limit.saturating_sub(set.len()));
            if remaining == Some(0) {
                break;
            }
            let page_limit = remaining.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE);

            let page = self
                .fetch_bars_page(request, page_limit, page_token.as_deref())
                .await
                .map_err(|e| match request.symbols.as_slice() {
                    [only] => e.for_symbol(only),
                    _ => e.into(),
                })?;
            pages += 1;

            for (symbol, bars) in page.bars {
                set.extend(&symbol, bars.into_iter().map(Into::into));
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(pages, bars = set.len(), "Fetched crypto bar pages");
        Ok(set)
    }
}
