//! Terminal rendering of a finished run

use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, CellAlignment, Color, Table};
use rust_decimal::Decimal;
use transeval_core::ScoreRow;
use transeval_metrics::{ColumnSummary, ScoreAggregator};
use transeval_workflow::EvaluationReport;

const HEADERS: [&str; 8] = ["Column", "Rows", "Failed", "Mean", "Median", "Std Dev", "Min", "Max"];

/// Per-column statistics table for the scored rows.
pub fn summary_table(rows: &[ScoreRow]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table.set_header(HEADERS.iter().map(|h| Cell::new(h).fg(Color::Cyan)));

    for summary in ScoreAggregator::summarize(rows) {
        table.add_row(summary_row(&summary));
    }

    table
}

fn summary_row(summary: &ColumnSummary) -> Vec<Cell> {
    let scores = &summary.scores;
    let failed = Cell::new(summary.failures).set_alignment(CellAlignment::Right);
    let failed = if summary.failures > 0 {
        failed.fg(Color::Yellow)
    } else {
        failed
    };

    vec![
        Cell::new(&summary.column),
        Cell::new(scores.count).set_alignment(CellAlignment::Right),
        failed,
        number(scores.mean),
        number(scores.median),
        number(scores.std_dev),
        number(scores.min),
        number(scores.max),
    ]
}

fn number(value: Decimal) -> Cell {
    Cell::new(value.round_dp(4)).set_alignment(CellAlignment::Right)
}

pub fn print_summary(report: &EvaluationReport) {
    let (rows, failures) = (&report.rows, &report.failures);
    if rows.is_empty() {
        println!("{}", "No rows scored.".dimmed());
        return;
    }

    println!("{}", summary_table(rows));
    println!(
        "\n{} {} row(s)",
        "Scored:".bold(),
        rows.len().to_string().green()
    );

    if !failures.is_empty() {
        println!(
            "{} {} metric computation(s) failed and were left empty",
            "⚠".yellow(),
            failures.len()
        );
    }
}
