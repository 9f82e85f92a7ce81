//! Subcommand implementations.

use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use precheck_core::{Diagnostic, Outcome, ValidationStatus, Validator};

use crate::OutputFormat;

pub(crate) const EXIT_FAILED: u8 = 1;
pub(crate) const EXIT_INPUT_ERROR: u8 = 3;

/// One stored model response awaiting judging.
#[derive(Debug, Deserialize)]
pub(crate) struct Record {
    pub row_id: Value,
    pub task_key: String,
    pub model_response: String,
}

/// Verdict line written for each record.
#[derive(Debug, Serialize)]
pub(crate) struct RecordVerdict<'a> {
    pub row_id: &'a Value,
    pub task_key: &'a str,
    pub programmatic_validation: ValidationStatus,
    pub diagnostics: &'a [Diagnostic],
}

/// Verdict line for a line that is not a valid record.
#[derive(Debug, Serialize)]
pub(crate) struct MalformedRecord<'a> {
    pub line: usize,
    pub row_id: Option<&'a Value>,
    pub programmatic_validation: ValidationStatus,
    pub error: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct BatchSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Lines that could not be read as a record. Not validated.
    pub malformed: usize,
}

impl BatchSummary {
    fn record(&mut self, status: ValidationStatus) {
        match status {
            ValidationStatus::Passed => self.passed += 1,
            ValidationStatus::Failed => self.failed += 1,
            ValidationStatus::Skipped => self.skipped += 1,
        }
    }
}

pub(crate) fn validate(
    validator: &Validator,
    task: &str,
    file: Option<&Path>,
    output: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let text = match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };

    let outcome = validator.validate(task, &text);
    let mut stdout = io::stdout().lock();
    match output {
        OutputFormat::Text => write_text(&mut stdout, &outcome)?,
        OutputFormat::Json => write_json(&mut stdout, &outcome)?,
    }

    Ok(match outcome.status() {
        ValidationStatus::Failed => ExitCode::from(EXIT_FAILED),
        ValidationStatus::Passed | ValidationStatus::Skipped => ExitCode::SUCCESS,
    })
}

fn write_text(out: &mut impl Write, outcome: &Outcome) -> io::Result<()> {
    match outcome {
        Outcome::Skipped { task_type } => {
            writeln!(out, "skipped: no validator for task type '{}'", task_type)
        }
        Outcome::Checked(report) => {
            writeln!(out, "{}: {}", report.task_type, outcome.status())?;
            for diagnostic in &report.diagnostics {
                writeln!(out, "  {}", diagnostic)?;
            }
            Ok(())
        }
    }
}

fn write_json(out: &mut impl Write, outcome: &Outcome) -> anyhow::Result<()> {
    let value = match outcome {
        Outcome::Checked(report) => serde_json::to_value(report)?,
        Outcome::Skipped { task_type } => serde_json::json!({
            "task_type": task_type,
            "verdict": ValidationStatus::Skipped,
            "diagnostics": [],
        }),
    };
    serde_json::to_writer_pretty(&mut *out, &value)?;
    writeln!(out)?;
    Ok(())
}

pub(crate) fn batch(validator: &Validator, file: &Path) -> anyhow::Result<ExitCode> {
    let reader = BufReader::new(
        fs::File::open(file).with_context(|| format!("opening {}", file.display()))?,
    );
    let mut stdout = io::stdout().lock();
    let summary = run_batch(validator, reader, &mut stdout)?;

    eprintln!(
        "{} records: {} passed, {} failed, {} skipped",
        summary.passed + summary.failed + summary.skipped + summary.malformed,
        summary.passed,
        summary.failed,
        summary.skipped
    );
    if summary.malformed > 0 {
        eprintln!("{} malformed record lines", summary.malformed);
    }
    Ok(ExitCode::SUCCESS)
}

/// Validate every record line, writing one verdict line per record.
///
/// Blank lines are ignored. A line that is not a record is logged, gets a
/// `skipped` line carrying the parse error, and the batch continues.
pub(crate) fn run_batch(
    validator: &Validator,
    reader: impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: Record = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(line = index + 1, error = %e, "Malformed record");
                summary.malformed += 1;

                let partial = serde_json::from_str::<Value>(&line).ok();
                let verdict = MalformedRecord {
                    line: index + 1,
                    row_id: partial.as_ref().and_then(|v| v.get("row_id")),
                    programmatic_validation: ValidationStatus::Skipped,
                    error: e.to_string(),
                };
                serde_json::to_writer(&mut *out, &verdict)?;
                writeln!(out)?;
                continue;
            }
        };

        let outcome = validator.validate_record(&record.task_key, &record.model_response);
        let status = outcome.status();
        summary.record(status);

        let verdict = RecordVerdict {
            row_id: &record.row_id,
            task_key: &record.task_key,
            programmatic_validation: status,
            diagnostics: outcome.diagnostics(),
        };
        serde_json::to_writer(&mut *out, &verdict)?;
        writeln!(out)?;
    }

    Ok(summary)
}

pub(crate) fn schemas(validator: &Validator, show: Option<&str>) -> anyhow::Result<ExitCode> {
    let registry = validator.registry();
    let mut stdout = io::stdout().lock();

    match show {
        None => {
            for task_type in registry.task_types() {
                writeln!(stdout, "{}", task_type)?;
            }
        }
        Some(task_type) => {
            let Some(schema) = registry.lookup(task_type) else {
                bail!(
                    "unknown task type '{}'. Available: {:?}",
                    task_type,
                    registry.task_types()
                );
            };
            // Through serde_json so enums print as plain maps, not YAML tags.
            let value = serde_json::to_value(schema)?;
            write!(stdout, "{}", serde_yaml::to_string(&value)?)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use precheck_core::ValidatorConfig;

    const RECORDS: &str = r#"{"row_id": 1, "task_key": "elementalData-2025-06-15-10-12-01", "model_response": "{\"elements\":[\"fire\"],\"fire\":{\"RGB_COLOR\":[255,0,0],\"SOUND_LIB\":\"flaming\"}}"}

{"row_id": 2, "task_key": "spellScripting-2025-06-15-10-14-15", "model_response": "{\"friendlyName\": \"test\"}"}
{"row_id": 3, "task_key": "task1-2025-06-15-10-12-01", "model_response": "{\"text\": \"model 1 response to task 1\"}"}
"#;

    #[test]
    fn test_run_batch() {
        let validator = Validator::new();
        let mut out = Vec::new();
        let summary = run_batch(&validator, RECORDS.as_bytes(), &mut out).unwrap();

        assert_eq!(
            summary,
            BatchSummary {
                passed: 1,
                failed: 1,
                skipped: 1,
                malformed: 0,
            }
        );

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["programmatic_validation"], "Passed");
        assert_eq!(lines[1]["programmatic_validation"], "Failed");
        assert_eq!(lines[1]["diagnostics"][0]["kind"], "RootContractError");
        assert_eq!(lines[2]["programmatic_validation"], "skipped");
        assert_eq!(lines[2]["row_id"], 3);
    }

    #[test]
    fn test_malformed_record_line_does_not_abort_batch() {
        let records = r#"{"row_id": 1, "task_key": "elementalData-2025-06-15-10-12-01", "model_response": "{\"elements\":[\"fire\"],\"fire\":{\"RGB_COLOR\":[255,0,0],\"SOUND_LIB\":\"flaming\"}}"}
{"row_id": 2, "task_key": "spellScripting-2025-06-15-10-14-15", "model_response": null}
not json at all
{"row_id": 4, "task_key": "spellScripting-2025-06-15-10-14-15", "model_response": "{\"friendlyName\": \"test\"}"}
"#;
        let validator = Validator::new();
        let mut out = Vec::new();
        let summary = run_batch(&validator, records.as_bytes(), &mut out).unwrap();

        assert_eq!(
            summary,
            BatchSummary {
                passed: 1,
                failed: 1,
                skipped: 0,
                malformed: 2,
            }
        );

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["row_id"], 1);
        assert_eq!(lines[0]["programmatic_validation"], "Passed");
        assert_eq!(lines[1]["row_id"], 2);
        assert_eq!(lines[1]["line"], 2);
        assert_eq!(lines[1]["programmatic_validation"], "skipped");
        assert!(lines[1]["error"].is_string());
        assert_eq!(lines[2]["row_id"], Value::Null);
        assert_eq!(lines[2]["line"], 3);
        assert_eq!(lines[3]["row_id"], 4);
        assert_eq!(lines[3]["programmatic_validation"], "Failed");
    }

    #[test]
    fn test_text_output() {
        let validator = Validator::new().with_config(ValidatorConfig::default().fail_fast(true));
        let outcome = validator.validate("automataScripting", r##"{"name": "test", "color_hex": "#FFF", "behavior": {"actions": []}}"##);

        let mut out = Vec::new();
        write_text(&mut out, &outcome).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("automataScripting: Failed"));
        assert!(text.contains("RootContractError at $.color_hex"));
    }

    #[test]
    fn test_json_output_for_skipped() {
        let outcome = Validator::new().validate("unknownTask", "{}");
        let mut out = Vec::new();
        write_json(&mut out, &outcome).unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["verdict"], "skipped");
    }

    #[test]
    fn test_json_output_shares_status_strings() {
        let outcome = Validator::new().validate("spellScripting", "no json");
        let mut out = Vec::new();
        write_json(&mut out, &outcome).unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["verdict"], "Failed");
        assert_eq!(value["verdict"], outcome.status().as_str());
        assert_eq!(value["diagnostics"][0]["kind"], "ExtractionError");
    }
}
