// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator engines.  Each engine is an immutable
// parameter value; its methods take an `IndicatorTable` by reference and
// return an enriched copy.  Slice-level `compute` functions return typed
// results for callers that want to compose without string column names.

pub mod bollinger;
pub mod macd;
pub mod moving_average;
pub mod rsi;
pub mod stochastic;

pub use bollinger::{BandSignals, BollingerBands, BollingerSeries};
pub use macd::{Macd, MacdLines};
pub use moving_average::MovingAverages;
pub use rsi::{Rsi, RsiSeries};
pub use stochastic::{StochasticSeries, StochasticSignals, StochasticSlow};
