//! SVG line chart of annual returns per strategy.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::annual::{Analysis, YearlyResult};
use crate::domain::error::DcaError;
use crate::domain::strategy::Strategy;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_WIDTH: f64 = 1000.0;
pub const DEFAULT_HEIGHT: f64 = 600.0;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const Y_TICKS: usize = 6;
const MAX_X_LABELS: usize = 20;
const TITLE: &str = "Annual Return by Year for Each Strategy";

fn series_color(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::EquallyInvested => "#1f77b4",
        Strategy::AllInFirstMonth => "#ff7f0e",
        Strategy::AllInLastMonth => "#2ca02c",
    }
}

fn format_percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

/// Renders the chart as a standalone SVG document. Returns a placeholder
/// document when there are no results.
pub fn render_returns_svg(results: &[YearlyResult], width: f64, height: f64) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        r##"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"##,
        width, height, width, height
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"16\" fill=\"#222\">{}</text>\n",
        width / 2.0,
        MARGIN_TOP / 2.0 + 5.0,
        TITLE
    ));

    if results.is_empty() {
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"14\" fill=\"#666\">No annual results available.</text>\n",
            width / 2.0,
            height / 2.0
        ));
        svg.push_str("</svg>\n");
        return svg;
    }

    let plot_width = width - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = height - MARGIN_TOP - MARGIN_BOTTOM;

    let values = results
        .iter()
        .flat_map(|r| Strategy::ALL.map(|s| r.annual_return(s)))
        .filter(|v| v.is_finite());
    let (mut min_y, mut max_y) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if (max_y - min_y).abs() < f64::EPSILON {
        min_y -= 0.05;
        max_y += 0.05;
    }
    let pad = (max_y - min_y) * 0.05;
    min_y -= pad;
    max_y += pad;

    let first_year = results.first().map(|r| r.year).unwrap_or_default();
    let last_year = results.last().map(|r| r.year).unwrap_or(first_year);
    let year_span = (last_year - first_year).max(1) as f64;

    let x_scale = |year: i32| -> f64 {
        if first_year == last_year {
            MARGIN_LEFT + plot_width / 2.0
        } else {
            MARGIN_LEFT + (year - first_year) as f64 / year_span * plot_width
        }
    };
    let y_scale =
        |v: f64| -> f64 { MARGIN_TOP + plot_height - (v - min_y) / (max_y - min_y) * plot_height };

    // Horizontal grid with percentage labels.
    for i in 0..Y_TICKS {
        let value = min_y + (max_y - min_y) * i as f64 / (Y_TICKS - 1) as f64;
        let y = y_scale(value);
        svg.push_str(&format!(
            "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#e5e5e5\" stroke-width=\"1\"/>\n",
            MARGIN_LEFT,
            y,
            MARGIN_LEFT + plot_width,
            y
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"11\" fill=\"#666\">{}</text>\n",
            MARGIN_LEFT - 6.0,
            y + 4.0,
            format_percent(value)
        ));
    }

    // Vertical grid with year labels, thinned for long histories.
    let step = results.len().div_ceil(MAX_X_LABELS).max(1);
    for result in results.iter().step_by(step) {
        let x = x_scale(result.year);
        svg.push_str(&format!(
            "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#e5e5e5\" stroke-width=\"1\"/>\n",
            x,
            MARGIN_TOP,
            x,
            MARGIN_TOP + plot_height
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"11\" fill=\"#666\">{}</text>\n",
            x,
            MARGIN_TOP + plot_height + 18.0,
            result.year
        ));
    }

    // Axes and zero baseline.
    svg.push_str(&format!(
        "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"none\" stroke=\"#999\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT, MARGIN_TOP, plot_width, plot_height
    ));
    let zero_y = y_scale(0.0);
    svg.push_str(&format!(
        "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#999\" stroke-width=\"1\" stroke-dasharray=\"4 3\"/>\n",
        MARGIN_LEFT,
        zero_y,
        MARGIN_LEFT + plot_width,
        zero_y
    ));
    svg.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"13\" fill=\"#222\">Year</text>\n",
        MARGIN_LEFT + plot_width / 2.0,
        height - 15.0
    ));
    svg.push_str(&format!(
        "  <text x=\"20\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"13\" fill=\"#222\" transform=\"rotate(-90 20 {:.1})\">Annual Return</text>\n",
        MARGIN_TOP + plot_height / 2.0,
        MARGIN_TOP + plot_height / 2.0
    ));

    for strategy in Strategy::ALL {
        let color = series_color(strategy);
        let mut path_data = String::new();
        for (i, result) in results.iter().enumerate() {
            let x = x_scale(result.year);
            let y = y_scale(result.annual_return(strategy));
            if i == 0 {
                path_data.push_str(&format!("M {:.1} {:.1}", x, y));
            } else {
                path_data.push_str(&format!(" L {:.1} {:.1}", x, y));
            }
        }
        svg.push_str(&format!(
            "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\" data-series=\"{}\"/>\n",
            path_data,
            color,
            strategy.key()
        ));
        for result in results {
            svg.push_str(&format!(
                "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3.5\" fill=\"{}\"/>\n",
                x_scale(result.year),
                y_scale(result.annual_return(strategy)),
                color
            ));
        }
    }

    let legend_x = MARGIN_LEFT + 12.0;
    let legend_y = MARGIN_TOP + 12.0;
    svg.push_str(&format!(
        "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"170\" height=\"{:.1}\" fill=\"white\" fill-opacity=\"0.85\" stroke=\"#ccc\"/>\n",
        legend_x,
        legend_y,
        Strategy::ALL.len() as f64 * 20.0 + 8.0
    ));
    for (i, strategy) in Strategy::ALL.into_iter().enumerate() {
        let y = legend_y + 16.0 + i as f64 * 20.0;
        svg.push_str(&format!(
            "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"2\"/>\n",
            legend_x + 8.0,
            y - 4.0,
            legend_x + 32.0,
            y - 4.0,
            series_color(strategy)
        ));
        svg.push_str(&format!(
            "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3.5\" fill=\"{}\"/>\n",
            legend_x + 20.0,
            y - 4.0,
            series_color(strategy)
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" fill=\"#222\">{}</text>\n",
            legend_x + 40.0,
            y,
            strategy.label()
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

pub struct SvgChartAdapter {
    width: f64,
    height: f64,
}

impl SvgChartAdapter {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for SvgChartAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl ReportPort for SvgChartAdapter {
    fn write(&self, analysis: &Analysis, output_path: &Path) -> Result<(), DcaError> {
        let svg = render_returns_svg(&analysis.results, self.width, self.height);

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, svg).map_err(|e| DcaError::Report {
            path: output_path.display().to_string(),
            reason: e.to_string(),
        })?;
        info!(path = %output_path.display(), "chart written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::PerStrategy;

    fn result(year: i32, equal: f64, first: f64, last: f64) -> YearlyResult {
        YearlyResult {
            year,
            returns: PerStrategy::from_fn(|s| match s {
                Strategy::EquallyInvested => equal,
                Strategy::AllInFirstMonth => first,
                Strategy::AllInLastMonth => last,
            }),
            valued: true,
        }
    }

    #[test]
    fn empty_results_render_placeholder() {
        let svg = render_returns_svg(&[], DEFAULT_WIDTH, DEFAULT_HEIGHT);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("No annual results available."));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn one_series_per_strategy_with_markers() {
        let results = vec![
            result(2018, -0.05, -0.08, -0.02),
            result(2019, 0.20, 0.28, 0.10),
            result(2020, 0.12, 0.15, 0.20),
        ];
        let svg = render_returns_svg(&results, DEFAULT_WIDTH, DEFAULT_HEIGHT);

        assert_eq!(svg.matches("<path").count(), 3);
        for strategy in Strategy::ALL {
            assert!(svg.contains(&format!("data-series=\"{}\"", strategy.key())));
            assert!(svg.contains(strategy.label()));
        }
        // 3 markers per series plus one legend marker each.
        assert_eq!(svg.matches("<circle").count(), 12);
        assert!(svg.contains(TITLE));
        assert!(svg.contains(">2019<"));
        assert!(svg.contains(">Annual Return<"));
    }

    #[test]
    fn single_year_is_centered() {
        let svg = render_returns_svg(&[result(2020, 0.0, 0.0, 0.0)], 400.0, 300.0);
        assert!(svg.contains("width=\"400\""));
        let center = MARGIN_LEFT + (400.0 - MARGIN_LEFT - MARGIN_RIGHT) / 2.0;
        assert!(svg.contains(&format!("M {:.1}", center)));
    }

    #[test]
    fn percent_labels() {
        assert_eq!(format_percent(0.25), "25%");
        assert_eq!(format_percent(-0.104), "-10%");
    }

    #[test]
    fn adapter_writes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("charts").join("returns.svg");
        let analysis = Analysis {
            config: Default::default(),
            record_count: 0,
            monthly_count: 0,
            adjusted_differences: 0,
            results: vec![result(2020, 0.1, 0.2, 0.0)],
            summary: crate::domain::annual::summarize(&[]),
        };
        SvgChartAdapter::default().write(&analysis, &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
    }
}
