use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use tracing::debug;

use crate::document::parse_suggestion_records;
use crate::error::{RecoError, Result};
use crate::model::{EmployeeRecord, SuggestionRecord, TrainingRecord};

pub fn load_employees(path: &Path) -> Result<Vec<EmployeeRecord>> {
    read_json_array(path)
}

pub fn load_trainings(path: &Path) -> Result<Vec<TrainingRecord>> {
    read_json_array(path)
}

/// Loads a suggestions file, reporting absent fields by name instead of a bare
/// parse error.
pub fn load_suggestions(path: &Path) -> Result<Vec<SuggestionRecord>> {
    let values: Vec<Value> = read_json_array(path)?;
    parse_suggestion_records(&values)
}

/// Writes the records as one pretty-printed array (four-space indent, literal
/// UTF-8), replacing whatever was at `path`.
pub fn save_suggestions(path: &Path, records: &[SuggestionRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    {
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        records.serialize(&mut serializer)?;
    }
    writer.flush()?;
    debug!(path = %path.display(), records = records.len(), "suggestions written");
    Ok(())
}

fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(RecoError::Configuration(format!(
            "file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|err| RecoError::DataFormat(format!("{}: {err}", path.display())))
}
