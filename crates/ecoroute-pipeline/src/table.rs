// SPDX-FileCopyrightText: 2026 ecoroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delimited table input and output.
//!
//! Input tables are read whole before any record is processed, so a missing
//! file or column fails the run up front. Output tables are written once, at
//! the end of a run.

use std::path::Path;

use ecoroute_core::{AnswerRecord, EcorouteError, PromptRecord, StageDeltas};

use crate::benchmark::BenchmarkRecord;
use crate::evaluator::RatedRow;

/// Identifier of the summary row appended to the answer table.
pub const TOTAL_ROW_ID: &str = "TOTAL";

/// Header of the answer table.
pub const ANSWER_COLUMNS: [&str; 12] = [
    "sess_id",
    "prompt",
    "tier",
    "model",
    "complexity",
    "answer",
    "energy_switch1_kwh",
    "energy_complexity_kwh",
    "energy_switch2_kwh",
    "energy_answer_kwh",
    "energy_total_kwh",
    "status",
];

/// Columns appended to a rated table.
pub const RATING_COLUMNS: [&str; 5] = [
    "rating",
    "mean_score",
    "variance",
    "all_scores",
    "failed_trials",
];

/// Header of the benchmark table.
pub const BENCHMARK_COLUMNS: [&str; 8] = [
    "global_id",
    "prompt_id",
    "model",
    "prompt",
    "response",
    "energy_kwh",
    "duration_s",
    "timestamp",
];

/// Convert a configured delimiter string to the single byte csv expects.
pub fn delimiter_byte(delimiter: &str) -> Result<u8, EcorouteError> {
    match delimiter.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(EcorouteError::Config(format!(
            "delimiter must be a single ASCII character, got {delimiter:?}"
        ))),
    }
}

/// A delimited table held in memory as strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Read the whole table at `path`. Short rows are padded with empty cells.
    pub fn read(path: &Path, delimiter: u8) -> Result<Self, EcorouteError> {
        let source = path.display().to_string();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_path(path)
            .map_err(|e| table_error(format!("cannot open {source}"), e))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| table_error(format!("cannot read header of {source}"), e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record
                .map_err(|e| table_error(format!("cannot parse row {} of {source}", index + 1), e))?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len().max(row.len()), String::new());
            rows.push(row);
        }

        Ok(Self {
            source,
            headers,
            rows,
        })
    }

    /// Index of a required column.
    pub fn column(&self, name: &str) -> Result<usize, EcorouteError> {
        self.headers.iter().position(|h| h == name).ok_or_else(|| {
            EcorouteError::table(format!(
                "{} has no column '{name}' (found: {})",
                self.source,
                self.headers.join(", ")
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read the prompt table, keeping input order.
pub fn read_prompts(
    path: &Path,
    delimiter: u8,
    id_column: &str,
    prompt_column: &str,
) -> Result<Vec<PromptRecord>, EcorouteError> {
    let table = Table::read(path, delimiter)?;
    let id_idx = table.column(id_column)?;
    let prompt_idx = table.column(prompt_column)?;
    Ok(table
        .rows
        .iter()
        .map(|row| PromptRecord::new(row[id_idx].trim(), row[prompt_idx].as_str()))
        .collect())
}

/// Stage sums over completed records; failed records contribute nothing.
pub fn completed_totals(records: &[AnswerRecord]) -> StageDeltas {
    records
        .iter()
        .filter(|r| r.outcome.is_completed())
        .fold(StageDeltas::default(), |mut acc, r| {
            acc.switch1 += r.stage_deltas.switch1;
            acc.complexity += r.stage_deltas.complexity;
            acc.switch2 += r.stage_deltas.switch2;
            acc.answer += r.stage_deltas.answer;
            acc
        })
}

/// Write the answer table with its trailing `TOTAL` row.
pub fn write_answers(
    path: &Path,
    delimiter: u8,
    records: &[AnswerRecord],
) -> Result<(), EcorouteError> {
    let mut writer = open_writer(path, delimiter)?;
    write_row(&mut writer, path, ANSWER_COLUMNS)?;

    for record in records {
        let deltas = &record.stage_deltas;
        write_row(
            &mut writer,
            path,
            [
                record.prompt_id.clone(),
                record.prompt_text.clone(),
                record.tier_used.map(|t| t.to_string()).unwrap_or_default(),
                record.model_used.clone().unwrap_or_default(),
                record.complexity_cell(),
                record.answer.clone(),
                format_kwh(deltas.switch1),
                format_kwh(deltas.complexity),
                format_kwh(deltas.switch2),
                format_kwh(deltas.answer),
                format_kwh(record.total_kwh()),
                record.status(),
            ],
        )?;
    }

    let totals = completed_totals(records);
    write_row(
        &mut writer,
        path,
        [
            TOTAL_ROW_ID.to_string(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            format_kwh(totals.switch1),
            format_kwh(totals.complexity),
            format_kwh(totals.switch2),
            format_kwh(totals.answer),
            format_kwh(totals.total()),
            String::new(),
        ],
    )?;

    flush(writer, path)
}

/// Write the rated table: the original columns followed by [`RATING_COLUMNS`].
pub fn write_ratings(
    path: &Path,
    delimiter: u8,
    headers: &[String],
    rows: &[RatedRow],
) -> Result<(), EcorouteError> {
    let mut writer = open_writer(path, delimiter)?;
    write_row(
        &mut writer,
        path,
        headers
            .iter()
            .map(String::as_str)
            .chain(RATING_COLUMNS)
            .collect::<Vec<_>>(),
    )?;

    for row in rows {
        let aggregate = row.aggregate();
        let mut cells = row.cells.clone();
        cells.resize(headers.len(), String::new());
        cells.push(
            aggregate
                .map(|a| a.rating().to_string())
                .unwrap_or_else(|| ecoroute_core::types::NOT_AVAILABLE.to_string()),
        );
        cells.push(aggregate.map(|a| a.mean.to_string()).unwrap_or_default());
        cells.push(aggregate.map(|a| a.variance.to_string()).unwrap_or_default());
        cells.push(row.scores_cell());
        cells.push(row.failed_trials().to_string());
        write_row(&mut writer, path, cells)?;
    }

    flush(writer, path)
}

/// Write the per-model benchmark table.
pub fn write_benchmark(
    path: &Path,
    delimiter: u8,
    records: &[BenchmarkRecord],
) -> Result<(), EcorouteError> {
    let mut writer = open_writer(path, delimiter)?;
    write_row(&mut writer, path, BENCHMARK_COLUMNS)?;
    for record in records {
        write_row(
            &mut writer,
            path,
            [
                record.global_id.to_string(),
                record.prompt_id.clone(),
                record.model.clone(),
                record.prompt.clone(),
                record.response.clone(),
                format_kwh(record.energy_kwh),
                format!("{:.3}", record.duration_s),
                record.timestamp.to_rfc3339(),
            ],
        )?;
    }
    flush(writer, path)
}

/// kWh cell text. Shortest exact round-trip form, so stage cells read back
/// sum to the total cell.
pub fn format_kwh(kwh: f64) -> String {
    format!("{kwh}")
}

fn open_writer(path: &Path, delimiter: u8) -> Result<csv::Writer<std::fs::File>, EcorouteError> {
    csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| table_error(format!("cannot create {}", path.display()), e))
}

fn write_row<I, T>(
    writer: &mut csv::Writer<std::fs::File>,
    path: &Path,
    row: I,
) -> Result<(), EcorouteError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    writer
        .write_record(row)
        .map_err(|e| table_error(format!("cannot write to {}", path.display()), e))
}

fn flush(mut writer: csv::Writer<std::fs::File>, path: &Path) -> Result<(), EcorouteError> {
    writer.flush().map_err(|e| EcorouteError::Table {
        message: format!("cannot flush {}", path.display()),
        source: Some(Box::new(e)),
    })
}

fn table_error(message: String, e: csv::Error) -> EcorouteError {
    EcorouteError::Table {
        message: format!("{message}: {e}"),
        source: Some(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use ecoroute_core::types::error_marker;
    use ecoroute_core::{ComplexityScore, ModelTier, PipelineStage, RatingTrial, RecordOutcome};

    use super::*;

    fn completed(id: &str, kwh: f64) -> AnswerRecord {
        AnswerRecord {
            prompt_id: id.into(),
            prompt_text: format!("prompt {id}"),
            tier_used: Some(ModelTier::Small),
            model_used: Some("gemma3:1b".into()),
            complexity: ComplexityScore::Score(2),
            answer: "4".into(),
            stage_deltas: StageDeltas {
                switch1: kwh,
                complexity: kwh,
                switch2: kwh,
                answer: kwh,
            },
            failed_warmups: Vec::new(),
            outcome: RecordOutcome::Completed,
        }
    }

    fn failed(id: &str) -> AnswerRecord {
        AnswerRecord {
            prompt_id: id.into(),
            prompt_text: "p".into(),
            tier_used: Some(ModelTier::Large),
            model_used: Some("gemma3:4b".into()),
            complexity: ComplexityScore::Score(8),
            answer: error_marker("boom"),
            stage_deltas: StageDeltas {
                switch1: 0.5,
                complexity: 0.5,
                switch2: 0.5,
                answer: 0.0,
            },
            failed_warmups: vec![PipelineStage::Switch2],
            outcome: RecordOutcome::Failed {
                stage: PipelineStage::Answer,
                message: "boom".into(),
            },
        }
    }

    #[test]
    fn delimiter_must_be_single_ascii() {
        assert_eq!(delimiter_byte(";").unwrap(), b';');
        assert_eq!(delimiter_byte("\t").unwrap(), b'\t');
        assert!(delimiter_byte("").is_err());
        assert!(delimiter_byte(";;").is_err());
        assert!(delimiter_byte("§").is_err());
    }

    #[test]
    fn reads_prompts_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.csv");
        std::fs::write(
            &path,
            "sess_id;prompt;extra\ns1;What is 2+2?;x\ns2;\"Explain; in detail\";y\n",
        )
        .unwrap();

        let prompts = read_prompts(&path, b';', "sess_id", "prompt").unwrap();
        assert_eq!(
            prompts,
            vec![
                PromptRecord::new("s1", "What is 2+2?"),
                PromptRecord::new("s2", "Explain; in detail"),
            ]
        );
    }

    #[test]
    fn missing_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.csv");
        std::fs::write(&path, "id;text\n1;hi\n").unwrap();

        let err = read_prompts(&path, b';', "sess_id", "prompt").unwrap_err();
        assert!(matches!(err, EcorouteError::Table { .. }));
        let msg = err.to_string();
        assert!(msg.contains("sess_id"), "got: {msg}");
        assert!(msg.contains("found: id, text"), "got: {msg}");
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = Table::read(&dir.path().join("nope.csv"), b';').unwrap_err();
        assert!(matches!(err, EcorouteError::Table { .. }));
    }

    #[test]
    fn total_row_excludes_failed_records() {
        let records = vec![completed("s1", 0.25), failed("s2"), completed("s3", 0.5)];
        let totals = completed_totals(&records);
        assert!((totals.total() - 3.0).abs() < 1e-12);
        assert!((totals.switch1 - 0.75).abs() < 1e-12);
    }

    #[test]
    fn answer_table_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.csv");
        write_answers(&path, b';', &[completed("s1", 0.25), failed("s2")]).unwrap();

        let table = Table::read(&path, b';').unwrap();
        assert_eq!(table.headers, ANSWER_COLUMNS);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[0][2], "small");
        assert_eq!(table.rows[0][10], "1");
        assert_eq!(table.rows[0][11], "ok");
        assert_eq!(table.rows[1][5], "[inference error: boom]");
        assert_eq!(table.rows[1][9], "0");
        assert_eq!(table.rows[1][10], "1.5");
        assert_eq!(table.rows[1][11], "failed:answer (warm-up failed: switch2)");
        assert_eq!(table.rows[2][0], TOTAL_ROW_ID);
        assert_eq!(table.rows[2][10], "1");
    }

    #[test]
    fn written_stage_cells_sum_to_total_cell() {
        let mut record = completed("s1", 0.0);
        record.stage_deltas = StageDeltas {
            switch1: 0.000_000_000_4,
            complexity: 0.000_123_456_789_4,
            switch2: 0.000_000_000_4,
            answer: 0.001_987_654_321_4,
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.csv");
        write_answers(&path, b';', &[record]).unwrap();

        let table = Table::read(&path, b';').unwrap();
        let cells: Vec<f64> = table.rows[0][6..=10]
            .iter()
            .map(|c| c.parse().unwrap())
            .collect();
        let stages: f64 = cells[..4].iter().sum();
        assert!((stages - cells[4]).abs() < 1e-12, "{cells:?}");
        assert_eq!(cells[0], 0.000_000_000_4);
    }

    #[test]
    fn rating_table_appends_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.csv");
        let headers = vec!["sess_id".to_string(), "answer".to_string()];
        let rows = vec![
            RatedRow {
                cells: vec!["s1".into(), "4".into()],
                trials: vec![RatingTrial::Rated(8), RatingTrial::Rated(9)],
            },
            RatedRow {
                cells: vec!["s2".into(), "?".into()],
                trials: vec![RatingTrial::Unknown, RatingTrial::Failed("down".into())],
            },
        ];
        write_ratings(&path, b',', &headers, &rows).unwrap();

        let table = Table::read(&path, b',').unwrap();
        assert_eq!(
            table.headers,
            vec![
                "sess_id",
                "answer",
                "rating",
                "mean_score",
                "variance",
                "all_scores",
                "failed_trials"
            ]
        );
        assert_eq!(table.rows[0][2..], ["9", "8.5", "0.25", "[8, 9]", "0"]);
        assert_eq!(table.rows[1][2..], ["N/A", "", "", "[]", "1"]);
    }
}
