use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::data_source::{DailyVolumes, MarketDataSource, SourceError};
use crate::{CoreError, ProviderId, Symbol};

/// In-memory volume histories, for offline replays and tests.
///
/// JSON form maps each ticker to its oldest-first daily volumes:
///
/// ```json
/// { "AAPL": [48000000, 61000000], "tsla": [90000000, 101000000] }
/// ```
///
/// Keys go through [`Symbol::parse`], so casing and surrounding whitespace do not matter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureSource {
    histories: HashMap<Symbol, Vec<u64>>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, symbol: Symbol, history: Vec<u64>) -> Self {
        self.insert(symbol, history);
        self
    }

    pub fn insert(&mut self, symbol: Symbol, history: Vec<u64>) {
        self.histories.insert(symbol, history);
    }

    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let histories = serde_json::from_str::<HashMap<Symbol, Vec<u64>>>(json)?;
        Ok(Self { histories })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}

impl MarketDataSource for FixtureSource {
    fn id(&self) -> ProviderId {
        ProviderId::Fixture
    }

    fn daily_volumes<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<DailyVolumes, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let history = self.histories.get(symbol).ok_or_else(|| {
                SourceError::not_found(format!("fixture has no volume history for {symbol}"))
            })?;
            DailyVolumes::from_history(symbol.clone(), history)
        })
    }
}
