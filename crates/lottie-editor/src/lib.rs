//! # lottie-editor
//!
//! Edit engine for Lottie documents: find the color of a shape group, recolor it, hide or
//! delete layers, and export the result, without losing anything the engine does not
//! understand.
//!
//! ```rust
//! use lottie_editor::Session;
//!
//! let json = br#"{"v":"5.5.2","fr":30,"ip":0,"op":30,"w":100,"h":100,"layers":[
//!     {"ty":4,"shapes":[{"ty":"gr","it":[{"ty":"fl","c":{"a":0,"k":[0.8,0.2,0.2,1]}}]}]}
//! ]}"#;
//!
//! let mut session = Session::new();
//! session.load_bytes("ball.json", json).unwrap();
//! assert_eq!(session.shape_color(0, 0).unwrap().hex(), "#cc3333");
//!
//! session.set_shape_color(0, 0, "#00ff00").unwrap();
//! let artifact = session.export().unwrap();
//! assert_eq!(artifact.file_name, "ball_modified.json");
//! ```

/// `#rrggbb` <-> normalized color vectors.
pub mod color;

pub mod errors;

/// Serialization of the edited document.
pub mod export;

/// Pure document edits.
pub mod mutator;

/// Hand-off to the external player.
pub mod player;

/// Locating editable colors in shape trees.
pub mod resolver;

/// The stateful editing session.
pub mod session;

pub use color::HexColor;
pub use errors::{EditError, ExportError, LoadError};
pub use export::ExportArtifact;
pub use mutator::Edit;
pub use player::{Player, PlayerBinding, PlayerEvent, PlayerInput, PlayerSource};
pub use resolver::{ColorNodeRef, PaintKind, ShapePath};
pub use session::{LoadTicket, Revision, Session, Source, SourceKind};
