use std::fs;
use std::io;
use std::path::PathBuf;
use transeval_core::{EvalError, Result, ScoreRow};

/// Columns every results table starts with.
pub const BASE_COLUMNS: [&str; 3] = ["index", "sentence_references", "sentence_predictions"];

/// Serializes score rows to a flat CSV table
#[derive(Debug, Clone)]
pub struct ResultWriter {
    path: PathBuf,
    columns: Vec<String>,
}

impl ResultWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            columns: Vec::new(),
        }
    }

    /// Metric columns to emit even when no row carries them.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    /// Header for `rows`: the base columns, the declared metric columns,
    /// then any other metric column in first-seen order.
    pub fn header(&self, rows: &[ScoreRow]) -> Vec<String> {
        let mut header: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
        let declared = self.columns.iter().map(String::as_str);
        let observed = rows.iter().flat_map(|row| row.metric_columns());

        for column in declared.chain(observed) {
            if !header.iter().any(|seen| seen == column) {
                header.push(column.to_string());
            }
        }

        header
    }

    /// Write the table to any sink.
    pub fn write_to<W: io::Write>(&self, sink: W, rows: &[ScoreRow]) -> Result<()> {
        let header = self.header(rows);
        let mut writer = csv::Writer::from_writer(sink);

        writer.write_record(&header).map_err(csv_error)?;

        for row in rows {
            let mut record = Vec::with_capacity(header.len());
            record.push(row.index.to_string());
            record.push(row.sentence_references.clone());
            record.push(row.sentence_predictions.clone());
            for column in &header[BASE_COLUMNS.len()..] {
                record.push(match row.get(column).flatten() {
                    Some(value) => format_score(value),
                    None => String::new(),
                });
            }
            writer.write_record(&record).map_err(csv_error)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Write the table to the configured path and return it absolutised.
    pub fn write(&self, rows: &[ScoreRow]) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = fs::File::create(&self.path)?;
        self.write_to(io::BufWriter::new(file), rows)?;

        let absolute = fs::canonicalize(&self.path)?;
        tracing::info!(rows = rows.len(), path = %absolute.display(), "results written");
        Ok(absolute)
    }
}

/// Shortest round-trip decimal, with exponents signed and at least two
/// digits wide (`1e-07`, `1.5e+16`).
pub fn format_score(value: f64) -> String {
    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}

fn csv_error(err: csv::Error) -> EvalError {
    EvalError::Io(format!("CSV write failed: {}", err))
}
