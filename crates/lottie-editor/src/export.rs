use crate::errors::ExportError;
use lottie_data::model::LottieJson;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const JSON_MIME: &str = "application/json";

/// Canonical, 2-space indented JSON text of `doc`.
pub fn serialize(doc: &LottieJson) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Strips a trailing `.json` or `.lottie` from a source name.
pub fn file_stem(source_name: &str) -> &str {
    source_name
        .strip_suffix(".json")
        .or_else(|| source_name.strip_suffix(".lottie"))
        .unwrap_or(source_name)
}

/// `clip.json` -> `clip_modified.json`, `clip.lottie` -> `clip_modified.json`.
pub fn export_file_name(source_name: &str) -> String {
    let stem = match file_stem(source_name) {
        "" => "animation",
        stem => stem,
    };
    format!("{}_modified.json", stem)
}

/// A file ready to be handed to a download or written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub contents: Vec<u8>,
}

impl ExportArtifact {
    pub fn json(source_name: &str, doc: &LottieJson) -> Result<Self, ExportError> {
        Ok(Self {
            file_name: export_file_name(source_name),
            mime_type: JSON_MIME,
            contents: serialize(doc)?.into_bytes(),
        })
    }

    /// Writes the artifact into `dir` under its own file name.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.contents)?;
        Ok(path)
    }
}
