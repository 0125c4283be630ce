//! Catalog of the instruments the dashboard follows.
//!
//! The set is fixed at startup. The server uses it to decide which symbols to
//! request upstream and how to name them; the client uses it to build its
//! tracked-instrument state.

/// Static description of one followed instrument.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InstrumentSpec {
    pub symbol: &'static str,
    pub display_name: &'static str,
}

/// Default tracked set: domestic index, ETF, volatility index, FX rate.
pub const DEFAULT_INSTRUMENTS: &[InstrumentSpec] = &[
    InstrumentSpec {
        symbol: "^KS11",
        display_name: "KOSPI",
    },
    InstrumentSpec {
        symbol: "102110.KS",
        display_name: "TIGER 200",
    },
    InstrumentSpec {
        symbol: "^VIX",
        display_name: "VIX",
    },
    InstrumentSpec {
        symbol: "KRW=X",
        display_name: "USD/KRW",
    },
];

/// Symbols of [`DEFAULT_INSTRUMENTS`], in catalog order.
pub fn default_symbols() -> Vec<String> {
    DEFAULT_INSTRUMENTS
        .iter()
        .map(|spec| spec.symbol.to_string())
        .collect()
}

/// Display name for `symbol`, or the symbol itself when it is not in the catalog.
pub fn display_name_for(symbol: &str) -> &str {
    DEFAULT_INSTRUMENTS
        .iter()
        .find(|spec| spec.symbol == symbol)
        .map(|spec| spec.display_name)
        .unwrap_or(symbol)
}
