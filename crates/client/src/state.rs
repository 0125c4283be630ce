//! Client state published to the presentation layer.

use chrono::{DateTime, Utc};
use dashboard_market_data::{InstrumentSpec, Quote, DEFAULT_INSTRUMENTS};

/// Last known values of one followed instrument.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedInstrument {
    pub symbol: String,
    pub display_name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    /// True until the instrument completes a fetch attempt.
    pub is_loading: bool,
}

impl TrackedInstrument {
    pub fn new(symbol: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: display_name.into(),
            price: 0.0,
            change: 0.0,
            change_percent: 0.0,
            is_loading: true,
        }
    }

    fn apply(&mut self, quote: &Quote) {
        self.price = quote.price;
        self.change = quote.change;
        self.change_percent = quote.change_percent;
        self.is_loading = false;
    }
}

impl From<&InstrumentSpec> for TrackedInstrument {
    fn from(spec: &InstrumentSpec) -> Self {
        Self::new(spec.symbol, spec.display_name)
    }
}

/// Snapshot of everything the client knows.
///
/// The instrument set is fixed at construction; refreshes update fields in
/// place, keyed by symbol.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientState {
    pub instruments: Vec<TrackedInstrument>,
    pub is_loading: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub data_source: Option<String>,
}

impl ClientState {
    pub fn new(instruments: Vec<TrackedInstrument>) -> Self {
        Self {
            instruments,
            ..Default::default()
        }
    }

    /// State tracking the default instrument catalog.
    pub fn with_default_instruments() -> Self {
        Self::new(DEFAULT_INSTRUMENTS.iter().map(TrackedInstrument::from).collect())
    }

    pub fn instrument(&self, symbol: &str) -> Option<&TrackedInstrument> {
        self.instruments.iter().find(|i| i.symbol == symbol)
    }

    pub(crate) fn begin_cycle(&mut self) {
        self.is_loading = true;
        self.error_message = None;
    }

    /// Merge a successful batch.
    ///
    /// Instruments present in `quotes` take the new values; the others keep
    /// their previous values. All of them stop loading. Quotes for symbols
    /// that are not tracked are ignored.
    pub(crate) fn apply_quotes(
        &mut self,
        quotes: &[Quote],
        source: Option<&str>,
        now: DateTime<Utc>,
    ) {
        for instrument in &mut self.instruments {
            match quotes.iter().find(|q| q.symbol == instrument.symbol) {
                Some(quote) => instrument.apply(quote),
                None => instrument.is_loading = false,
            }
        }
        self.last_update = Some(now);
        if let Some(source) = source {
            self.data_source = Some(source.to_string());
        }
        self.is_loading = false;
    }

    /// Record a cycle that ran out of attempts; values stay as they were.
    pub(crate) fn apply_failure(&mut self, message: &str) {
        self.error_message = Some(message.to_string());
        self.clear_loading();
    }

    pub(crate) fn clear_loading(&mut self) {
        for instrument in &mut self.instruments {
            instrument.is_loading = false;
        }
        self.is_loading = false;
    }
}
