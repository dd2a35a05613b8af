use crate::catalog::FoundAnimation;
use crate::settings::Settings;
use lottie_data::model::{LottieJson, ModelError};
use lottie_editor::export::JSON_MIME;
use lottie_editor::ExportArtifact;
use thiserror::Error;
use tracing::{debug, instrument};

pub const ZIP_MIME: &str = "application/zip";

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Cannot resize {file_name}: {source}")]
    Invalid {
        file_name: String,
        #[source]
        source: ModelError,
    },
    #[error("Failed to encode resized document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Copy of `doc` scaled to `width`, height following the aspect ratio.
pub fn resized(doc: &LottieJson, width: u32) -> LottieJson {
    let mut out = doc.clone();
    let height = (width as f64 * doc.h as f64 / doc.w as f64).round() as u32;
    out.w = width;
    out.h = height.max(1);
    out
}

pub fn resized_file_name(file_name: &str, width: u32) -> String {
    let stem = file_name.strip_suffix(".json").unwrap_or(file_name);
    format!("resized_{}_{}w.json", stem, width)
}

fn fallback_name(item: &FoundAnimation) -> String {
    if !item.file_name.is_empty() {
        item.file_name.clone()
    } else if item.was_dot_lottie {
        "animation.lottie".to_string()
    } else {
        "animation.json".to_string()
    }
}

/// Turns fetched bytes into the file the user receives.
///
/// Packaged bundles are never touched. JSON is passed through unless a custom download
/// width is configured.
#[instrument(
    level = "debug",
    skip(bytes, settings),
    fields(file = %item.file_name, len = bytes.len())
)]
pub fn prepare_download(
    item: &FoundAnimation,
    bytes: Vec<u8>,
    settings: &Settings,
) -> Result<ExportArtifact, DownloadError> {
    let file_name = fallback_name(item);
    if item.was_dot_lottie {
        return Ok(ExportArtifact {
            file_name,
            mime_type: ZIP_MIME,
            contents: bytes,
        });
    }

    let Some(width) = settings.download_width() else {
        return Ok(ExportArtifact {
            file_name,
            mime_type: JSON_MIME,
            contents: bytes,
        });
    };

    let doc = LottieJson::from_json_slice(&bytes).map_err(|source| DownloadError::Invalid {
        file_name: file_name.clone(),
        source,
    })?;
    let out = resized(&doc, width);
    debug!(from_w = doc.w, from_h = doc.h, to_w = out.w, to_h = out.h, "Resized");

    Ok(ExportArtifact {
        file_name: resized_file_name(&file_name, width),
        mime_type: JSON_MIME,
        contents: serde_json::to_vec(&out)?,
    })
}
