//! `plan` command: one run through the pipeline, printed for a terminal.

use std::fmt::Write as _;

use geofence_core::{AppConfig, Table};
use geofence_pipeline::{DeliveryOutcome, PlanOutcome, PlanRequest, RoutePlanner};

pub(crate) async fn run_plan(
    config: &AppConfig,
    request: PlanRequest,
    json: bool,
) -> anyhow::Result<()> {
    let planner = RoutePlanner::from_config(config)?;
    let outcome = planner.plan(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", render_outcome(&outcome));
    }
    Ok(())
}

/// Table, totals, links, then one line per sink.
pub(crate) fn render_outcome(outcome: &PlanOutcome) -> String {
    let mut out = render_table(&outcome.preview);
    let route = &outcome.route;
    let meters = route.total_distance_meters;
    let _ = writeln!(
        out,
        "\n{} stops, {}.{} km, {} min",
        route.stops.len(),
        meters / 1000,
        meters % 1000 / 100,
        route.total_duration_seconds / 60,
    );
    if let Some(url) = &outcome.links.sheet_url {
        let _ = writeln!(out, "sheet: {url}");
    }
    if let Some(url) = &outcome.links.csv_url {
        let _ = writeln!(out, "csv:   {url}");
    }
    for report in &outcome.deliveries {
        let status = match &report.outcome {
            DeliveryOutcome::Delivered { .. } => "delivered".to_owned(),
            DeliveryOutcome::Skipped { reason } => format!("skipped ({reason})"),
            DeliveryOutcome::Failed { error } => format!("FAILED: {error}"),
        };
        let _ = writeln!(out, "{}: {status}", report.sink);
    }
    out
}

/// Left-aligned columns separated by two spaces. Empty tables print the
/// header row only.
pub(crate) fn render_table(table: &Table) -> String {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    push_line(&mut out, table.headers.iter().map(String::as_str), &widths);
    for row in &cells {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}
