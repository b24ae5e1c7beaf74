// =============================================================================
// Indicator Engine
// =============================================================================
//
// Technical indicators (moving averages, MACD, Bollinger Bands, RSI,
// Stochastic Slow) and the edge-triggered trading signals derived from them,
// computed over a time-ordered OHLCV series.  Every operation is a pure
// transformation: a table goes in, a new enriched table comes out.
// =============================================================================

pub mod config;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod pipeline;
pub mod series;
pub mod signals;
pub mod table;

#[cfg(test)]
mod testutil;

pub use config::EngineConfig;
pub use error::{IndicatorError, Result};
pub use market_data::{PriceBar, PriceField, PriceSeries};
pub use pipeline::{IndicatorKind, SignalPipeline};
pub use signals::SignalPair;
pub use table::IndicatorTable;
