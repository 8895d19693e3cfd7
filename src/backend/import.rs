//! Model import from CSV.
//!
//! Expected header (column order is free, extra columns are ignored):
//!
//! ```text
//! name,model_identifier,channel_id,display_name,context_window,max_tokens,
//! supports_tools,supports_vision,cost_input,cost_output,is_active
//! ```
//!
//! Only `name`, `model_identifier` and `channel_id` are required. Rows are
//! validated locally, grouped by channel, and created with one
//! `POST /api/models/batch` per channel. Row numbers in error messages count
//! the header as row 1.

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use csv::{ReaderBuilder, StringRecord, Trim};

use super::BackendClient;
use super::types::{ImportSummary, ModelBatchCreate, ModelSpec};

/// Rows that passed validation, grouped by channel, plus per-row errors.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedImport {
    pub batches: BTreeMap<i64, Vec<ModelSpec>>,
    pub errors: Vec<String>,
}

impl ParsedImport {
    pub fn row_count(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }
}

/// Parse and validate CSV text.
///
/// Quoted fields may span lines; a row is numbered by the line it starts on.
pub fn parse_csv(text: &str) -> ParsedImport {
    let mut parsed = ParsedImport::default();
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let columns: HashMap<String, usize> = match reader.headers() {
        Ok(header) => header
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.is_empty())
            .map(|(i, name)| (name.to_ascii_lowercase(), i))
            .collect(),
        Err(e) => {
            parsed.errors.push(format!("Invalid CSV header: {e}"));
            return parsed;
        }
    };
    if columns.is_empty() {
        parsed.errors.push("CSV is empty".to_string());
        return parsed;
    }

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line());
                parsed.errors.push(format!("Row {line}: {e}"));
                continue;
            }
        };
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());
        let row = Row {
            columns: &columns,
            record: &record,
        };
        match parse_row(&row) {
            Ok((channel_id, spec)) => parsed.batches.entry(channel_id).or_default().push(spec),
            Err(msg) => parsed.errors.push(format!("Row {line}: {msg}")),
        }
    }

    parsed
}

/// One data record, addressed by header name.
struct Row<'a> {
    columns: &'a HashMap<String, usize>,
    record: &'a StringRecord,
}

impl Row<'_> {
    /// Cell for `name`, `None` when the column is absent or blank.
    fn field(&self, name: &str) -> Option<&str> {
        self.columns
            .get(name)
            .and_then(|&i| self.record.get(i))
            .filter(|s| !s.is_empty())
    }
}

fn parse_row(row: &Row<'_>) -> Result<(i64, ModelSpec), String> {
    let (Some(name), Some(identifier), Some(channel)) = (
        row.field("name"),
        row.field("model_identifier"),
        row.field("channel_id"),
    ) else {
        return Err("Missing required fields (name, model_identifier, channel_id)".to_string());
    };

    let channel_id: i64 = channel
        .parse()
        .map_err(|_| format!("invalid channel_id '{channel}'"))?;

    let mut spec = ModelSpec::new(name, identifier);
    spec.display_name = row.field("display_name").map(str::to_string);
    spec.context_window = parse_opt(row.field("context_window"), "context_window")?;
    spec.max_tokens = parse_opt(row.field("max_tokens"), "max_tokens")?;
    spec.supports_tools = row.field("supports_tools").is_some_and(is_yes);
    spec.supports_vision = row.field("supports_vision").is_some_and(is_yes);
    spec.cost_input = parse_opt(row.field("cost_input"), "cost_input")?;
    spec.cost_output = parse_opt(row.field("cost_output"), "cost_output")?;
    spec.is_active = row.field("is_active").is_none_or(is_yes);

    Ok((channel_id, spec))
}

fn parse_opt<T: std::str::FromStr>(raw: Option<&str>, name: &str) -> Result<Option<T>, String> {
    raw.map(|v| v.parse::<T>().map_err(|_| format!("invalid {name} '{v}'")))
        .transpose()
}

fn is_yes(val: &str) -> bool {
    matches!(val.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// Parse `text` and create the valid rows on the backend.
///
/// A failing batch (e.g. unknown channel) is reported in the summary's
/// errors; the remaining channels are still imported.
pub fn import_models(client: &BackendClient, text: &str) -> Result<ImportSummary> {
    let parsed = parse_csv(text);
    let mut summary = ImportSummary {
        imported: 0,
        errors: parsed.errors,
    };

    for (channel_id, models) in parsed.batches {
        let count = models.len();
        let batch = ModelBatchCreate { channel_id, models };
        match client.create_models_batch(&batch) {
            Ok(created) => summary.imported += created.len(),
            Err(e) => {
                tracing::warn!(channel_id, error = %e, "model batch import failed");
                summary
                    .errors
                    .push(format!("Channel {channel_id}: {count} models not imported ({e})"));
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_rows_grouped_by_channel() {
        let csv = "name,model_identifier,channel_id,is_active\n\
                   gpt-4o,gpt-4o,1,true\n\
                   claude,claude-3-5-sonnet,2,no\n\
                   mini,gpt-4o-mini,1,\n";
        let parsed = parse_csv(csv);

        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        assert_eq!(parsed.row_count(), 3);
        assert_eq!(parsed.batches[&1].len(), 2);
        assert!(parsed.batches[&1][1].is_active);
        assert!(!parsed.batches[&2][0].is_active);
    }

    #[test]
    fn reports_missing_fields_with_row_numbers() {
        let csv = "name,model_identifier,channel_id\n\
                   ok,ok-id,1\n\
                   ,no-name,1\n\
                   bad,bad-id,abc\n";
        let parsed = parse_csv(csv);

        assert_eq!(parsed.row_count(), 1);
        assert_eq!(parsed.errors.len(), 2);
        assert!(parsed.errors[0].starts_with("Row 3: Missing required fields"));
        assert!(parsed.errors[1].starts_with("Row 4: invalid channel_id"));
    }

    #[test]
    fn parses_optional_metadata() {
        let csv = "channel_id,name,model_identifier,context_window,supports_tools,cost_input\n\
                   5,\"Qwen, large\",qwen-max,32768,YES,0.002\n";
        let parsed = parse_csv(csv);
        let spec = &parsed.batches[&5][0];

        assert_eq!(spec.name, "Qwen, large");
        assert_eq!(spec.context_window, Some(32768));
        assert!(spec.supports_tools);
        assert!(!spec.supports_vision);
        assert_eq!(spec.cost_input, Some(0.002));
    }

    #[test]
    fn rejects_non_numeric_metadata() {
        let csv = "name,model_identifier,channel_id,max_tokens\nm,m,1,lots\n";
        let parsed = parse_csv(csv);
        assert_eq!(parsed.errors, vec!["Row 2: invalid max_tokens 'lots'"]);
    }

    #[test]
    fn quoted_fields_may_span_lines() {
        let csv = "name,model_identifier,channel_id,display_name\n\
                   gpt,gpt-4o,1,\"GPT 4o\nflagship\"\n\
                   ,missing,1,\n";
        let parsed = parse_csv(csv);

        assert_eq!(parsed.row_count(), 1);
        assert_eq!(
            parsed.batches[&1][0].display_name.as_deref(),
            Some("GPT 4o\nflagship")
        );
        assert_eq!(
            parsed.errors,
            vec!["Row 4: Missing required fields (name, model_identifier, channel_id)"]
        );
    }

    #[test]
    fn escaped_quotes_and_blank_lines() {
        let csv = "name,model_identifier,channel_id\n\
                   \"say \"\"hi\"\"\",greeter,3\n\
                   \n\
                   other,other-id,3\n";
        let parsed = parse_csv(csv);

        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        assert_eq!(parsed.batches[&3][0].name, r#"say "hi""#);
        assert_eq!(parsed.batches[&3].len(), 2);
    }

    #[test]
    fn empty_input_is_an_error() {
        let parsed = parse_csv("");
        assert_eq!(parsed.errors, vec!["CSV is empty"]);
    }
}
