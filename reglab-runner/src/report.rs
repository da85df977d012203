//! Markdown run report.

use crate::growth_math::{format_number, herfindahl_index, GrowthLabel};
use crate::pipeline::RunReport;

fn opt(v: Option<f64>, precision: usize) -> String {
    v.map_or_else(|| "N/A".to_string(), |x| format!("{x:.precision$}"))
}

/// Render a human-readable report for one run.
pub fn generate_report(report: &RunReport) -> String {
    let mut md = String::with_capacity(4096);

    md.push_str("# Vehicle Registration Report\n\n");

    // Metadata
    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Generated | {} |\n", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")));
    if let Some(request) = &report.request {
        md.push_str(&format!("| Period | {} to {} |\n", request.start, request.end));
    }
    if let Some(seed) = report.seed {
        md.push_str(&format!("| Seed | {seed} |\n"));
    }
    md.push_str(&format!("| Rows | {} |\n", report.raw_rows));
    md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash));
    if !report.manufacturer_filter.is_empty() {
        md.push_str(&format!(
            "| Manufacturers | {} |\n",
            report.manufacturer_filter.join(", ")
        ));
    }
    md.push_str(&format!("| Source | {} |\n", report.data_source.primary_source));
    md.push_str(&format!("| Note | {} |\n", report.data_source.note));
    md.push('\n');

    // KPIs
    let k = &report.kpis;
    md.push_str("## Key Metrics\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!(
        "| Total Registrations | {} |\n",
        format_number(k.total_registrations as f64, 1)
    ));
    md.push_str(&format!(
        "| Avg Monthly Registrations | {} |\n",
        format_number(k.avg_monthly_registrations, 1)
    ));
    md.push_str(&format!(
        "| Leading Category | {} ({:.1}%) |\n",
        k.leading_category.as_deref().unwrap_or("N/A"),
        k.leading_category_share
    ));
    if let Some(state) = &k.top_state {
        md.push_str(&format!("| Top State | {state} |\n"));
    }
    md.push('\n');

    // Growth
    let s = &report.summary;
    md.push_str("## Growth\n\n");
    md.push_str(&format!(
        "Total YoY growth: **{:.2}%** ({})\n\n",
        s.total_yoy_growth,
        GrowthLabel::classify(s.total_yoy_growth)
    ));
    md.push_str(&format!(
        "Average monthly growth: {:.2}% (consistency {:.2})\n\n",
        s.monthly_growth, s.growth_consistency
    ));
    md.push_str(&format!(
        "Top growing category: {} at {:.2}%\n\n",
        s.top_growing_category, s.top_growth_rate
    ));
    if !s.category_yoy_growth.is_empty() {
        md.push_str("| Category | Mean YoY % | Band |\n");
        md.push_str("| --- | ---: | --- |\n");
        for (category, rate) in &s.category_yoy_growth {
            md.push_str(&format!(
                "| {category} | {rate:.2} | {} |\n",
                GrowthLabel::classify(*rate)
            ));
        }
        md.push('\n');
    }
    if !k.category_cagr.is_empty() {
        md.push_str("| Category | CAGR % |\n");
        md.push_str("| --- | ---: |\n");
        for (category, rate) in &k.category_cagr {
            md.push_str(&format!("| {category} | {rate:.2} |\n"));
        }
        md.push('\n');
    }

    // Market structure
    if !s.market_concentration.is_empty() {
        md.push_str("## Market Structure\n\n");
        md.push_str("| Category | Share % |\n");
        md.push_str("| --- | ---: |\n");
        for (category, share) in &s.market_concentration {
            md.push_str(&format!("| {category} | {share:.2} |\n"));
        }
        let shares: Vec<f64> = s.market_concentration.values().copied().collect();
        md.push_str(&format!(
            "\nHerfindahl-Hirschman index: {:.0}\n\n",
            herfindahl_index(&shares)
        ));
    }

    // Insights
    let i = &report.insights;
    if !i.trend_classification.is_empty() {
        md.push_str("## Investment Insights\n\n");
        md.push_str("| Category | Trend | Momentum % | Volatility |\n");
        md.push_str("| --- | --- | ---: | ---: |\n");
        for (category, trend) in &i.trend_classification {
            md.push_str(&format!(
                "| {category} | {trend} | {} | {} |\n",
                opt(i.growth_momentum.get(category).copied(), 2),
                opt(i.volatility_scores.get(category).copied().flatten(), 3),
            ));
        }
        md.push('\n');
        if !i.market_leaders.is_empty() {
            md.push_str("Market leaders: ");
            let leaders: Vec<String> = i
                .market_leaders
                .iter()
                .map(|l| format!("{} ({})", l.category, format_number(l.registrations as f64, 1)))
                .collect();
            md.push_str(&leaders.join(", "));
            md.push_str("\n\n");
        }
    }

    // Statistics
    let st = &report.statistics;
    md.push_str("## Dataset\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Records | {} |\n", st.total_records));
    if let Some(range) = &st.date_range {
        md.push_str(&format!("| Date Range | {} to {} |\n", range.start, range.end));
    }
    md.push_str(&format!("| States | {} |\n", st.states_covered));
    md.push_str(&format!("| Categories | {} |\n", st.categories_covered));
    md.push_str(&format!("| Mean per Row | {} |\n", opt(st.daily_average, 1)));
    if let Some(d) = &st.registrations_distribution {
        md.push_str(&format!(
            "| Distribution | median {:.1}, std {}, min {}, max {} |\n",
            d.median,
            opt(d.std, 1),
            d.min,
            d.max
        ));
    }
    md.push_str(&format!("| Outlier Rows (IQR) | {} |\n", st.outlier_rows));
    md.push('\n');

    // Quality
    let q = &report.quality;
    md.push_str("## Data Quality\n\n");
    md.push_str(&format!("- Completeness: {:.2}%\n", q.completeness_percentage));
    md.push_str(&format!("- Missing cells: {}\n", q.total_missing()));
    md.push_str(&format!("- Duplicate rows: {}\n", q.duplicate_rows));
    let negatives: usize = q.negative_values.values().sum();
    md.push_str(&format!("- Negative counts: {negatives}\n"));

    md
}
