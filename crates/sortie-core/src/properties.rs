//! Project property files
//!
//! One INI-style `key=value` document per project, written by the identify
//! stage and read back by the process stage. The file is meant to be
//! hand-editable, so comments are preserved as guidance for the operator and
//! tolerated on read.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SortieError};
use crate::models::{Coordinate, ProjectPropertiesRecord};

/// Written in place of a suggested landing location
pub const NO_SUGGESTION: &str = "None";

/// Separates the member logs of the `Files` entry
pub const FILES_SEPARATOR: &str = ",";

const EXTENSION: &str = "txt";

/// Serializes project property records to a directory
pub struct ProjectPropertiesWriter {
    dir: PathBuf,
}

impl ProjectPropertiesWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `<dir>/<project id>.txt` and return its path.
    pub fn write(&self, record: &ProjectPropertiesRecord) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}.{}", record.project_id, EXTENSION));
        fs::write(&path, render(record))?;
        tracing::debug!("Wrote project properties {}", path.display());
        Ok(path)
    }
}

/// Render a record in the property file format
pub fn render(record: &ProjectPropertiesRecord) -> String {
    let suggested = record
        .suggested_landing_location
        .map(|c| c.to_persisted())
        .unwrap_or_else(|| NO_SUGGESTION.to_string());
    let files: Vec<String> = record.files.iter().map(|f| f.display().to_string()).collect();

    let missing_note = if record.missing_gps == 0 {
        "# None of the files miss GPS".to_string()
    } else {
        format!("# (Missing GPS / num of files): ({}/{})", record.missing_gps, record.files.len())
    };

    format!(
        "[DEFAULT]\n\
         # Project Properties\n\
         ProjectID={id}\n\
         {missing_note}\n\
         Suggested_landing_location={suggested}\n\
         Files={files}\n\
         Pilot={pilot}\n\
         # Purpose(Training, Testing, or Commercial)\n\
         Purpose={purpose}\n\
         Client={client}\n",
        id = record.project_id,
        files = files.join(FILES_SEPARATOR),
        pilot = record.pilot,
        purpose = record.purpose,
        client = record.client,
    )
}

/// Parse the property file format; `path` is only used in error messages.
pub fn parse(path: &Path, content: &str) -> Result<ProjectPropertiesRecord> {
    let mut values: HashMap<&str, &str> = HashMap::new();
    let mut missing_note: Option<usize> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('[') {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#').or_else(|| line.strip_prefix(';')) {
            missing_note = missing_note.or_else(|| parse_missing_note(comment));
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            values.insert(key.trim(), value.trim());
        }
    }

    let project_id = match values.get("ProjectID") {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            return Err(SortieError::PropertiesInvalid {
                path: path.to_path_buf(),
                reason: "missing ProjectID".to_string(),
            })
        }
    };

    let files: Vec<PathBuf> = values
        .get("Files")
        .map(|files| {
            files
                .split(FILES_SEPARATOR)
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(PathBuf::from)
                .collect()
        })
        .unwrap_or_default();

    let suggested_landing_location = match values.get("Suggested_landing_location") {
        None => None,
        Some(raw) if raw.is_empty() || raw.eq_ignore_ascii_case(NO_SUGGESTION) => None,
        Some(raw) => {
            let parsed = Coordinate::parse_persisted(raw);
            if parsed.is_none() {
                tracing::warn!(
                    "Ignoring unusable Suggested_landing_location '{}' in {}",
                    raw,
                    path.display()
                );
            }
            parsed
        }
    };

    let text = |key: &str| values.get(key).map(|v| v.to_string()).unwrap_or_default();

    Ok(ProjectPropertiesRecord {
        project_id,
        missing_gps: missing_note.unwrap_or(0),
        files,
        suggested_landing_location,
        pilot: text("Pilot"),
        purpose: text("Purpose"),
        client: text("Client"),
    })
}

/// `(Missing GPS / num of files): (m/n)` -> `m`
fn parse_missing_note(comment: &str) -> Option<usize> {
    let (_, counts) = comment.split_once("):")?;
    let counts = counts.trim().trim_start_matches('(').trim_end_matches(')');
    let (missing, _) = counts.split_once('/')?;
    missing.trim().parse().ok()
}

/// Read a single property file
pub fn load(path: &Path) -> Result<ProjectPropertiesRecord> {
    let content = fs::read_to_string(path)?;
    parse(path, &content)
}

/// Read every property file in `dir`, ordered by file name.
pub fn load_all(dir: &Path) -> Result<Vec<ProjectPropertiesRecord>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_properties = path.extension().and_then(|e| e.to_str()) == Some(EXTENSION);
        if path.is_file() && is_properties {
            paths.push(path);
        }
    }
    paths.sort();

    paths.iter().map(|path| load(path)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record() -> ProjectPropertiesRecord {
        ProjectPropertiesRecord {
            project_id: "Project_2024-03-05".to_string(),
            files: vec![
                PathBuf::from("CSV LOGS/M300-2024-03-05-090000.csv"),
                PathBuf::from("CSV LOGS/M300-2024-03-05-093000.csv"),
            ],
            suggested_landing_location: Some(Coordinate::new(-8.5069, 115.2625)),
            missing_gps: 1,
            pilot: "A. Pilot".to_string(),
            purpose: "Testing".to_string(),
            client: "Harbour Authority".to_string(),
        }
    }

    #[test]
    fn test_render_format() {
        let expected = "\
[DEFAULT]
# Project Properties
ProjectID=Project_2024-03-05
# (Missing GPS / num of files): (1/2)
Suggested_landing_location=-8.5069,115.2625
Files=CSV LOGS/M300-2024-03-05-090000.csv,CSV LOGS/M300-2024-03-05-093000.csv
Pilot=A. Pilot
# Purpose(Training, Testing, or Commercial)
Purpose=Testing
Client=Harbour Authority
";
        assert_eq!(render(&record()), expected);
    }

    #[test]
    fn test_no_missing_gps_note() {
        let mut complete = record();
        complete.missing_gps = 0;
        complete.suggested_landing_location = None;

        let rendered = render(&complete);
        assert!(rendered.contains("# None of the files miss GPS\n"));
        assert!(rendered.contains("Suggested_landing_location=None\n"));
    }

    #[test]
    fn test_write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = ProjectPropertiesWriter::new(dir.path()).write(&record()).unwrap();
        assert_eq!(path, dir.path().join("Project_2024-03-05.txt"));

        assert_eq!(load(&path).unwrap(), record());
    }

    #[test]
    fn test_parse_hand_edited_file() {
        let content = "[DEFAULT]\n; edited by hand\nProjectID = Project_X\nFiles=a.csv, ,b.csv\nSuggested_landing_location=none\n";
        let parsed = parse(Path::new("x.txt"), content).unwrap();

        assert_eq!(parsed.project_id, "Project_X");
        assert_eq!(parsed.files, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
        assert_eq!(parsed.suggested_landing_location, None);
        assert_eq!(parsed.pilot, "");
    }

    #[test]
    fn test_missing_project_id() {
        let err = parse(Path::new("x.txt"), "[DEFAULT]\nFiles=a.csv\n").unwrap_err();
        assert!(matches!(err, SortieError::PropertiesInvalid { .. }));
    }

    #[test]
    fn test_load_all_is_sorted() {
        let dir = TempDir::new().unwrap();
        let writer = ProjectPropertiesWriter::new(dir.path());
        for id in ["Project_2024-03-06", "Project_2024-03-05_2", "Project_2024-03-05"] {
            let mut r = record();
            r.project_id = id.to_string();
            writer.write(&r).unwrap();
        }
        fs::write(dir.path().join("README.md"), "not a project").unwrap();

        let ids: Vec<String> = load_all(dir.path()).unwrap().into_iter().map(|r| r.project_id).collect();
        assert_eq!(ids, vec!["Project_2024-03-05", "Project_2024-03-05_2", "Project_2024-03-06"]);
    }
}
