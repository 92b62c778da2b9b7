// src/ingest/marks.rs
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::labels::MarkEntry;

const ENV_PATH: &str = "MATRIX_MARKS_PATH";

/// Load a mark list from an explicit path. Supports TOML or JSON formats.
pub fn load_marks_from(path: &Path) -> Result<Vec<MarkEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading mark list from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_marks(&content, ext.as_str())
}

/// Load the mark list using env var + fallbacks:
/// 1) $MATRIX_MARKS_PATH
/// 2) config/marks.toml
/// 3) config/marks.json
pub fn load_marks_default() -> Result<Vec<MarkEntry>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_marks_from(&pb);
        } else {
            return Err(anyhow!("MATRIX_MARKS_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/marks.toml");
    if toml_p.exists() {
        return load_marks_from(&toml_p);
    }
    let json_p = PathBuf::from("config/marks.json");
    if json_p.exists() {
        return load_marks_from(&json_p);
    }
    Ok(Vec::new())
}

/// Mark files are sometimes saved without a meaningful extension, so the
/// format is sniffed: a `.toml` extension or a `[[marks]]` table header means
/// TOML first, anything else tries JSON first. The other format is the fallback.
fn parse_marks(s: &str, hint_ext: &str) -> Result<Vec<MarkEntry>> {
    let try_toml = hint_ext == "toml" || s.contains("[[marks]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("mark list is neither TOML `[[marks]]` nor a JSON array"))
}

fn parse_toml(s: &str) -> Result<Vec<MarkEntry>> {
    #[derive(serde::Deserialize)]
    struct TomlMarks {
        #[serde(default)]
        marks: Vec<MarkEntry>,
    }
    let v: TomlMarks = toml::from_str(s)?;
    Ok(v.marks)
}

fn parse_json(s: &str) -> Result<Vec<MarkEntry>> {
    Ok(crate::labels::marks_from_json(s)?)
}
