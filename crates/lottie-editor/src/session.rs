//! The editing session: current document, its source, the user-facing notice, and the
//! revision counter the player keys on.
//!
//! Loads are bracketed by [`Session::begin_load`] and one of the `finish_*` calls. While a
//! load is pending every edit is refused, and a load finished with an outdated ticket is
//! dropped, so the newest load always wins.

use crate::errors::{EditError, ExportError, LoadError};
use crate::export::ExportArtifact;
use crate::mutator::Edit;
use crate::player::{PlayerEvent, PlayerInput, PlayerSource};
use crate::resolver::{self, ColorNodeRef};
use lottie_data::model::LottieJson;
use std::fmt;
use tracing::{debug, info, instrument, warn};

pub const NOTICE_INVALID_JSON: &str = "Error loading JSON. Make sure it is a valid Lottie JSON file.";
pub const NOTICE_PACKAGED: &str =
    "Editing .lottie files is not directly supported. Playback only. Modify original JSON if available.";
pub const NOTICE_UNSUPPORTED: &str = "Unsupported file type. Please upload .json or .lottie files.";

/// Opaque freshness token. Two different revisions mean two different documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Revision(u64);

impl Revision {
    fn next(self) -> Self {
        Revision(self.0 + 1)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Raw Lottie JSON; editable.
    Json,
    /// Packaged `.lottie` bundle; playback only.
    Packaged,
}

impl SourceKind {
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".json") {
            Some(SourceKind::Json)
        } else if name.ends_with(".lottie") {
            Some(SourceKind::Packaged)
        } else {
            None
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, SourceKind::Json)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub kind: SourceKind,
    /// Where the player can find a packaged bundle.
    pub locator: Option<String>,
}

/// Handle for one pending load. Only the most recent ticket can complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Default)]
pub struct Session {
    document: Option<LottieJson>,
    source: Option<Source>,
    notice: Option<String>,
    revision: Revision,
    pending: Option<LoadTicket>,
    tickets: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&LottieJson> {
        self.document.as_ref()
    }

    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether edit controls should be offered for the current content.
    pub fn is_editable(&self) -> bool {
        self.document.is_some() && self.source.as_ref().is_some_and(|s| s.kind.is_editable())
    }

    fn bump(&mut self) -> Revision {
        self.revision = self.revision.next();
        self.revision
    }

    fn replace(
        &mut self,
        document: Option<LottieJson>,
        source: Option<Source>,
        notice: Option<String>,
    ) -> Revision {
        self.document = document;
        self.source = source;
        self.notice = notice;
        self.bump()
    }

    /// Marks a load as started. Edits are refused until it finishes.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.tickets += 1;
        let ticket = LoadTicket(self.tickets);
        self.pending = Some(ticket);
        debug!(?ticket, "Load started");
        ticket
    }

    fn claim(&mut self, ticket: LoadTicket) -> Result<(), LoadError> {
        if self.pending != Some(ticket) {
            debug!(?ticket, "Dropping superseded load");
            return Err(LoadError::Superseded);
        }
        self.pending = None;
        Ok(())
    }

    /// Completes a load with the raw contents of a file, dispatching on its extension.
    #[instrument(level = "debug", skip(self, bytes), fields(len = bytes.len()))]
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        name: &str,
        bytes: &[u8],
    ) -> Result<Revision, LoadError> {
        self.claim(ticket)?;
        match SourceKind::from_file_name(name) {
            Some(SourceKind::Json) => match LottieJson::from_json_slice(bytes) {
                Ok(doc) => Ok(self.publish(name, doc)),
                Err(err) => {
                    warn!(name, error = %err, "Error parsing JSON file");
                    self.replace(None, None, Some(NOTICE_INVALID_JSON.to_string()));
                    Err(err.into())
                }
            },
            Some(SourceKind::Packaged) => Ok(self.publish_packaged(name, name)),
            None => {
                warn!(name, "Unsupported file type");
                self.replace(None, None, Some(NOTICE_UNSUPPORTED.to_string()));
                Err(LoadError::UnsupportedSource(name.to_string()))
            }
        }
    }

    /// Completes a load with a document the caller already parsed (e.g. a fetched URL).
    pub fn finish_load_document(
        &mut self,
        ticket: LoadTicket,
        name: &str,
        doc: LottieJson,
    ) -> Result<Revision, LoadError> {
        self.claim(ticket)?;
        Ok(self.publish(name, doc))
    }

    /// Completes a load that failed before any content arrived (read or fetch error).
    pub fn finish_load_failed(
        &mut self,
        ticket: LoadTicket,
        notice: &str,
    ) -> Result<Revision, LoadError> {
        self.claim(ticket)?;
        warn!(notice, "Load failed");
        Ok(self.replace(None, None, Some(notice.to_string())))
    }

    /// One-shot load from file contents.
    pub fn load_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<Revision, LoadError> {
        let ticket = self.begin_load();
        self.finish_load(ticket, name, bytes)
    }

    /// One-shot load of an already parsed document.
    pub fn load_document(&mut self, name: &str, doc: LottieJson) -> Revision {
        self.pending = None;
        self.publish(name, doc)
    }

    /// One-shot load of a packaged bundle, playback only.
    pub fn load_packaged(&mut self, name: &str, locator: &str) -> Revision {
        self.pending = None;
        self.publish_packaged(name, locator)
    }

    fn publish(&mut self, name: &str, doc: LottieJson) -> Revision {
        info!(name, version = ?doc.v, layers = doc.layers.len(), "Loaded Lottie JSON");
        let source = Source {
            name: name.to_string(),
            kind: SourceKind::Json,
            locator: None,
        };
        self.replace(Some(doc), Some(source), None)
    }

    fn publish_packaged(&mut self, name: &str, locator: &str) -> Revision {
        info!(name, "Loaded packaged animation for playback only");
        let source = Source {
            name: name.to_string(),
            kind: SourceKind::Packaged,
            locator: Some(locator.to_string()),
        };
        self.replace(None, Some(source), Some(NOTICE_PACKAGED.to_string()))
    }

    /// Drops everything and starts over.
    pub fn reset(&mut self) -> Revision {
        self.pending = None;
        self.replace(None, None, None)
    }

    /// Applies one edit. On success the document is replaced and a new revision issued;
    /// on failure nothing changes.
    #[instrument(level = "debug", skip(self))]
    pub fn apply(&mut self, edit: &Edit) -> Result<Revision, EditError> {
        if self.pending.is_some() {
            return Err(EditError::LoadInProgress);
        }
        let doc = match (&self.document, &self.source) {
            (Some(doc), _) => doc,
            (None, Some(source)) if !source.kind.is_editable() => {
                return Err(EditError::NotEditable)
            }
            (None, _) => return Err(EditError::NoDocument),
        };
        let next = edit.apply(doc)?;
        self.document = Some(next);
        Ok(self.bump())
    }

    pub fn toggle_layer_visibility(&mut self, layer: usize) -> Result<Revision, EditError> {
        self.apply(&Edit::ToggleVisibility { layer })
    }

    pub fn delete_layer(&mut self, layer: usize) -> Result<Revision, EditError> {
        self.apply(&Edit::DeleteLayer { layer })
    }

    pub fn set_shape_color(
        &mut self,
        layer: usize,
        group: usize,
        hex: &str,
    ) -> Result<Revision, EditError> {
        self.apply(&Edit::SetShapeColor {
            layer,
            group,
            hex: hex.to_string(),
        })
    }

    /// The editable color of a shape group, for display next to a color picker.
    pub fn shape_color(
        &self,
        layer: usize,
        group: usize,
    ) -> Result<ColorNodeRef<'_>, EditError> {
        let doc = self.document.as_ref().ok_or(EditError::NoDocument)?;
        resolver::resolve_group_color(doc, layer, group)
    }

    /// What the player should show right now, keyed by the current revision.
    pub fn player_input(&self) -> Option<PlayerInput> {
        let source = match (&self.document, &self.source) {
            (Some(doc), _) => PlayerSource::Document(doc.clone()),
            (None, Some(Source { locator: Some(locator), .. })) => {
                PlayerSource::Packaged(locator.clone())
            }
            _ => return None,
        };
        Some(PlayerInput {
            source,
            key: self.revision,
        })
    }

    /// Updates the notice from a player event.
    pub fn on_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Error => {
                let name = self.source.as_ref().map_or("unknown", |s| s.name.as_str());
                self.notice = Some(format!(
                    "Lottie player error. Source: {}. Is the file valid?",
                    name
                ));
            }
            // A ready player clears stale errors, but the packaged notice stays.
            PlayerEvent::Ready => {
                if self.notice.as_deref() != Some(NOTICE_PACKAGED) {
                    self.notice = None;
                }
            }
        }
    }

    /// Serializes the current document for download.
    pub fn export(&self) -> Result<ExportArtifact, ExportError> {
        let doc = self.document.as_ref().ok_or(ExportError::NoDocument)?;
        let name = self.source.as_ref().map_or("animation", |s| s.name.as_str());
        ExportArtifact::json(name, doc)
    }
}
