use lottie_data::model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Invalid Lottie JSON: {0}")]
    Invalid(#[from] ModelError),
    #[error("Unsupported file type: {0}")]
    UnsupportedSource(String),
    #[error("Load superseded by a newer request")]
    Superseded,
}

/// Why an edit left the document unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("No document loaded")]
    NoDocument,
    #[error("Source is playback-only and cannot be edited")]
    NotEditable,
    #[error("A load is in progress")]
    LoadInProgress,
    #[error("Layer {index} out of range ({len} layers)")]
    LayerOutOfRange { index: usize, len: usize },
    #[error("Shape group {index} out of range ({len} groups on layer {layer})")]
    ShapeGroupOutOfRange { layer: usize, index: usize, len: usize },
    #[error("No editable color found in shape group {group} of layer {layer}")]
    NoEditableColor { layer: usize, group: usize },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No editable Lottie JSON data to export")]
    NoDocument,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
