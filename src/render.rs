use analytics::{AnalyticsReport, ReturnHistogram};
use chrono::NaiveDate;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use configuration::{AnalyticsSettings, ForecastBasis};
use forecast::{ForecastRequest, ForecastResult};

const BAR_WIDTH: usize = 40;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn num(value: f64, decimals: usize) -> Cell {
    Cell::new(format!("{value:.decimals$}")).set_alignment(CellAlignment::Right)
}

fn optional(value: Option<f64>, decimals: usize) -> Cell {
    match value {
        Some(v) => num(v, decimals),
        None => Cell::new("-").set_alignment(CellAlignment::Right),
    }
}

fn date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

/// One row per instrument with the latest value of every derived series.
pub fn summary_table(report: &AnalyticsReport, settings: &AnalyticsSettings) -> Table {
    let mut table = new_table();

    let mut header = vec![
        "Instrument".to_string(),
        "Last Date".to_string(),
        "Last Price".to_string(),
        "Cumulative".to_string(),
        "Mean Return".to_string(),
        "Std Return".to_string(),
        format!("Vol ({}d)", settings.volatility_window),
    ];
    header.extend(settings.moving_average_windows.iter().map(|w| format!("MA{w}")));
    table.set_header(header);

    for analytics in report.iter() {
        let mut row = vec![
            Cell::new(&analytics.instrument),
            Cell::new(date(analytics.last_date())),
            optional(analytics.last_price(), 2),
            optional(analytics.last_cumulative_return(), 4),
            num(analytics.stats.mean, 5),
            num(analytics.stats.std_dev, 5),
            optional(analytics.last_volatility(), 5),
        ];
        row.extend(settings.moving_average_windows.iter().map(|w| {
            let latest = analytics
                .moving_averages
                .get(w)
                .and_then(|ma| ma.last())
                .map(|(_, v)| v);
            optional(latest, 2)
        }));
        table.add_row(row);
    }

    table
}

pub fn forecast_header(request: &ForecastRequest, result: &ForecastResult) -> String {
    let basis = match request.basis {
        ForecastBasis::Price => "price",
        ForecastBasis::CumulativeReturn => "cumulative return",
    };
    let seed = result
        .seed
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut header = format!(
        "{} {} forecast from {:.4} on {}: {} paths, mean {:.5}, std {:.5}, seed {}",
        request.instrument,
        basis,
        request.params.last_price,
        request.last_date,
        result.simulations,
        request.params.mean_return,
        request.params.std_return,
        seed,
    );
    if result.non_positive_paths > 0 {
        header.push_str(&format!(
            "\nwarning: {} paths reached a non-positive value",
            result.non_positive_paths
        ));
    }
    header
}

pub fn forecast_table(result: &ForecastResult) -> Table {
    let mut table = new_table();
    let band = result.band;
    table.set_header(vec![
        "Date".to_string(),
        format!("P{}", band.lower),
        format!("P{} (median)", band.median),
        format!("P{}", band.upper),
    ]);
    for (d, lower, median, upper) in result.rows() {
        table.add_row(vec![
            Cell::new(d.to_string()),
            num(lower, 4),
            num(median, 4),
            num(upper, 4),
        ]);
    }
    table
}

pub fn histogram_table(histogram: &ReturnHistogram) -> Table {
    let mut table = new_table();
    table.set_header(vec!["From", "To", "Count", ""]);

    let peak = histogram.counts.iter().copied().max().unwrap_or(0).max(1);
    for (lo, hi, count) in histogram.iter() {
        let bar = "#".repeat(count * BAR_WIDTH / peak);
        table.add_row(vec![
            num(lo, 5),
            num(hi, 5),
            Cell::new(count).set_alignment(CellAlignment::Right),
            Cell::new(bar),
        ]);
    }
    table
}
