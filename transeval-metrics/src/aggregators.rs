use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use transeval_core::ScoreRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedScores {
    pub mean: Decimal,
    pub median: Decimal,
    pub std_dev: Decimal,
    pub min: Decimal,
    pub max: Decimal,
    pub p90: Decimal,
    pub count: usize,
    pub sum: Decimal,
}

/// Aggregate of one metric column over a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub scores: AggregatedScores,
    /// Rows whose cell was nulled by a failed computation
    pub failures: usize,
}

pub struct ScoreAggregator;

impl ScoreAggregator {
    pub fn aggregate(values: &[f64]) -> AggregatedScores {
        if values.is_empty() {
            return Self::empty();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let sum: f64 = values.iter().sum();
        let mean = sum / values.len() as f64;
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;

        AggregatedScores {
            mean: Self::to_decimal(mean),
            median: Self::to_decimal(Self::median(&sorted)),
            std_dev: Self::to_decimal(variance.sqrt()),
            min: Self::to_decimal(sorted[0]),
            max: Self::to_decimal(sorted[sorted.len() - 1]),
            p90: Self::to_decimal(Self::percentile(&sorted, 90.0)),
            count: values.len(),
            sum: Self::to_decimal(sum),
        }
    }

    /// One summary per metric column, in column order. Null cells count as
    /// failures and are left out of the statistics.
    pub fn summarize(rows: &[ScoreRow]) -> Vec<ColumnSummary> {
        let mut columns: Vec<String> = Vec::new();
        for row in rows {
            for column in row.metric_columns() {
                if !columns.iter().any(|seen| seen == column) {
                    columns.push(column.to_string());
                }
            }
        }

        columns
            .into_iter()
            .map(|column| {
                let cells: Vec<Option<f64>> = rows.iter().filter_map(|row| row.get(&column)).collect();
                let values: Vec<f64> = cells.iter().flatten().copied().collect();
                ColumnSummary {
                    failures: cells.len() - values.len(),
                    scores: Self::aggregate(&values),
                    column,
                }
            })
            .collect()
    }

    fn to_decimal(value: f64) -> Decimal {
        Decimal::try_from(value).unwrap_or_default()
    }

    fn median(sorted_values: &[f64]) -> f64 {
        let mid = sorted_values.len() / 2;
        if sorted_values.len() % 2 == 0 {
            (sorted_values[mid - 1] + sorted_values[mid]) / 2.0
        } else {
            sorted_values[mid]
        }
    }

    fn percentile(sorted_values: &[f64], percentile: f64) -> f64 {
        if sorted_values.is_empty() {
            return 0.0;
        }
        let index = (percentile / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
        sorted_values[index.min(sorted_values.len() - 1)]
    }

    fn empty() -> AggregatedScores {
        AggregatedScores {
            mean: Decimal::ZERO,
            median: Decimal::ZERO,
            std_dev: Decimal::ZERO,
            min: Decimal::ZERO,
            max: Decimal::ZERO,
            p90: Decimal::ZERO,
            count: 0,
            sum: Decimal::ZERO,
        }
    }
}
