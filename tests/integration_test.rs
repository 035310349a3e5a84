//! Integration tests for the full calculation.
//!
//! Tests cover:
//! - Known annual returns over synthetic monthly price series
//! - Relative performance and its averages
//! - Daily input collapsing to monthly contributions
//! - CSV file through the price adapter into the analysis

mod common;

use approx::assert_relative_eq;
use common::*;
use dcacompare::adapters::csv_adapter::CsvAdapter;
use dcacompare::domain::annual::{analyze, AnalysisConfig, MissingValuation};
use dcacompare::domain::error::DcaError;
use dcacompare::domain::strategy::Strategy;
use dcacompare::ports::price_port::PricePort;

mod known_returns {
    use super::*;

    #[test]
    fn three_years_of_steady_growth() {
        // 1% per month compounding, 37 months: three full valued years.
        let closes: Vec<f64> = (0..37).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let records = monthly_series(2000, &closes);
        let analysis = analyze(&records, &AnalysisConfig::default()).unwrap();

        assert_eq!(analysis.results.len(), 4);
        for (offset, result) in analysis.results.iter().take(3).enumerate() {
            assert_eq!(result.year, 2000 + offset as i32);
            assert!(result.valued);

            // Lump sum in January gains exactly 12 months of growth.
            assert_relative_eq!(
                result.annual_return(Strategy::AllInFirstMonth),
                1.01f64.powi(12) - 1.0,
                epsilon = 1e-9
            );
            // Lump sum in December gains one month.
            assert_relative_eq!(
                result.annual_return(Strategy::AllInLastMonth),
                0.01,
                epsilon = 1e-9
            );
            let expected_equal: f64 =
                (1..=12).map(|k| 1.01f64.powi(k)).sum::<f64>() / 12.0 - 1.0;
            assert_relative_eq!(
                result.annual_return(Strategy::EquallyInvested),
                expected_equal,
                epsilon = 1e-9
            );
        }

        let last = analysis.results.last().unwrap();
        assert_eq!(last.year, 2003);
        assert!(!last.valued);
    }

    #[test]
    fn falling_market_favours_waiting() {
        let closes: Vec<f64> = (0..13).map(|i| 200.0 - i as f64 * 5.0).collect();
        let records = monthly_series(2008, &closes);
        let config = AnalysisConfig {
            missing_valuation: MissingValuation::Skip,
            ..AnalysisConfig::default()
        };
        let analysis = analyze(&records, &config).unwrap();

        assert_eq!(analysis.results.len(), 1);
        let year = &analysis.results[0];
        assert!(year.annual_return(Strategy::AllInFirstMonth) < 0.0);
        assert!(year.rel_perf_first_month() < 0.0);
        assert!(year.rel_perf_last_month() > 0.0);

        // With one year the averages equal that year's deltas.
        assert_relative_eq!(
            analysis.summary.avg_rel_perf_first_month.unwrap(),
            year.rel_perf_first_month()
        );
        assert_relative_eq!(
            analysis.summary.avg_rel_perf_last_month.unwrap(),
            year.rel_perf_last_month()
        );
    }

    #[test]
    fn annual_amount_does_not_change_returns() {
        let closes: Vec<f64> = (0..25).map(|i| 50.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let records = monthly_series(2015, &closes);
        let small = analyze(&records, &AnalysisConfig::default()).unwrap();
        let large = analyze(
            &records,
            &AnalysisConfig {
                annual_amount: 1_000_000.0,
                ..AnalysisConfig::default()
            },
        )
        .unwrap();

        for (a, b) in small.results.iter().zip(&large.results) {
            for strategy in Strategy::ALL {
                assert_relative_eq!(
                    a.annual_return(strategy),
                    b.annual_return(strategy),
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn zero_policy_drags_averages_toward_zero() {
        let closes: Vec<f64> = (0..13).map(|i| 100.0 + i as f64).collect();
        let records = monthly_series(2010, &closes);

        let skip = analyze(
            &records,
            &AnalysisConfig {
                missing_valuation: MissingValuation::Skip,
                ..AnalysisConfig::default()
            },
        )
        .unwrap();
        let zero = analyze(&records, &AnalysisConfig::default()).unwrap();

        let skipped_avg = skip.summary.avg_rel_perf_first_month.unwrap();
        let zero_avg = zero.summary.avg_rel_perf_first_month.unwrap();
        assert_relative_eq!(zero_avg, skipped_avg / 2.0, epsilon = 1e-12);
    }
}

mod daily_input {
    use super::*;

    #[test]
    fn daily_records_use_first_trading_day_of_month() {
        let mut records = Vec::new();
        for month in 1..=12 {
            for day in [2, 3, 4] {
                records.push(PriceRecord::new(date(2019, month, day), 100.0 + day as f64));
            }
        }
        records.push(PriceRecord::new(date(2020, 1, 2), 110.0));
        records.push(PriceRecord::new(date(2020, 1, 3), 500.0));

        let analysis = analyze(&records, &AnalysisConfig::default()).unwrap();
        assert_eq!(analysis.monthly_count, 13);

        // Every month buys at 102 and is valued at 110.
        let year = &analysis.results[0];
        for strategy in Strategy::ALL {
            assert_relative_eq!(
                year.annual_return(strategy),
                110.0 / 102.0 - 1.0,
                epsilon = 1e-12
            );
        }
    }
}

mod csv_to_analysis {
    use super::*;

    #[test]
    fn yahoo_file_round_trip() {
        let closes: Vec<f64> = (0..25).map(|i| 1000.0 + i as f64 * 20.0).collect();
        let mut records = monthly_series(1990, &closes);
        records[3].adj_close = Some(999.0);
        let file = write_temp(&yahoo_csv(&records), ".csv");

        let adapter = CsvAdapter::new(file.path());
        let loaded = adapter.fetch_prices().unwrap();
        assert_eq!(loaded.len(), 25);

        let from_file = analyze(&loaded, &AnalysisConfig::default()).unwrap();
        let in_memory = analyze(&records, &AnalysisConfig::default()).unwrap();

        assert_eq!(from_file.adjusted_differences, 1);
        assert_eq!(from_file.results.len(), in_memory.results.len());
        for (a, b) in from_file.results.iter().zip(&in_memory.results) {
            assert_eq!(a.year, b.year);
            for strategy in Strategy::ALL {
                assert_relative_eq!(a.annual_return(strategy), b.annual_return(strategy));
            }
        }
    }

    #[test]
    fn file_with_only_null_rows_is_no_data() {
        let file = write_temp("Date,Close\n2020-01-01,null\n", ".csv");
        let loaded = CsvAdapter::new(file.path()).fetch_prices().unwrap();
        let err = analyze(&loaded, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, DcaError::NoData));
    }
}
