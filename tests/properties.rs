mod common;

use common::{bars_table, closes_table, price_path};
use indicator_engine::indicators::{BollingerBands, Macd, MovingAverages, Rsi, StochasticSlow};
use indicator_engine::indicators::moving_average::{self, sma};
use indicator_engine::{EngineConfig, SignalPipeline};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn rsi_stays_in_range(closes in price_path(20..=200)) {
        let out = Rsi::default().compute(&closes).unwrap();
        for v in out.rsi.iter().filter(|v| !v.is_nan()) {
            prop_assert!((0.0..=100.0).contains(v), "rsi out of range: {v}");
        }
    }

    #[test]
    fn macd_histogram_is_line_minus_signal(closes in price_path(40..=200)) {
        let lines = Macd::default().compute(&closes).unwrap();
        for t in 0..closes.len() {
            let (m, s, h) = (lines.macd[t], lines.signal[t], lines.histogram[t]);
            if m.is_nan() || s.is_nan() {
                prop_assert!(h.is_nan());
            } else {
                prop_assert!((h - (m - s)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn bands_are_ordered(closes in price_path(20..=150), num_std in 0.5f64..3.0) {
        let bands = BollingerBands::new(20, num_std).compute(&closes).unwrap();
        for t in 19..closes.len() {
            prop_assert!(bands.lower[t] <= bands.middle[t] + 1e-9);
            prop_assert!(bands.middle[t] <= bands.upper[t] + 1e-9);
        }
    }

    #[test]
    fn golden_and_dead_never_fire_together(closes in price_path(60..=150)) {
        let ma = MovingAverages::default();
        let t = ma.simple(&closes_table(&closes), "Close", &[5, 30]).unwrap();
        let t = ma.crossover_signals(&t, "MA5", "MA30").unwrap();
        let golden = t.signal(moving_average::GOLDEN_CROSS).unwrap();
        let dead = t.signal(moving_average::DEAD_CROSS).unwrap();
        prop_assert!(golden.iter().zip(dead).all(|(g, d)| !(*g && *d)));
    }

    #[test]
    fn sma_defined_exactly_from_period(closes in price_path(10..=80), period in 1usize..10) {
        let out = sma(&closes, period).unwrap();
        prop_assert_eq!(out.len(), closes.len());
        for (t, v) in out.iter().enumerate() {
            prop_assert_eq!(v.is_nan(), t + 1 < period, "row {}", t);
        }
    }

    #[test]
    fn stochastic_lines_stay_in_range(closes in price_path(30..=150)) {
        let t = StochasticSlow::default().calculate(&bars_table(&closes, 0.5)).unwrap();
        for name in ["%K_Fast", "%K", "%D"] {
            for v in t.indicator(name).unwrap().iter().filter(|v| !v.is_nan()) {
                prop_assert!((-1e-9..=100.0 + 1e-9).contains(v), "{name} = {v}");
            }
        }
    }

    #[test]
    fn pipeline_signals_cover_every_row(closes in price_path(60..=120)) {
        let pipeline = SignalPipeline::new(EngineConfig::default()).unwrap();
        let table = pipeline.run(bars_table(&closes, 1.0).series()).unwrap();
        for name in table.signal_names() {
            let column = table.signal(name).unwrap();
            prop_assert_eq!(column.len(), closes.len());
            prop_assert!(!column[0]);
        }
    }

    #[test]
    fn rising_prices_never_sell_on_rsi(start in 1.0f64..500.0, steps in prop::collection::vec(0.01f64..5.0, 20..=100)) {
        let mut price = start;
        let closes: Vec<f64> = steps
            .iter()
            .map(|s| {
                price += s;
                price
            })
            .collect();
        let out = Rsi::default().compute(&closes).unwrap();
        prop_assert!(out.signals(70.0, 30.0).sell_rows().is_empty());
    }
}
