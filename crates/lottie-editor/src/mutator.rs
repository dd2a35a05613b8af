//! Single structural edits over a document.
//!
//! Every function takes the current document by reference and returns a new one. Layers
//! and shape nodes are reference counted, so the new document shares everything except
//! the path to the edited node with the old one, and the old one never changes.

use crate::color;
use crate::errors::EditError;
use crate::resolver::{self, ShapePath};
use lottie_data::model::{ColorProperty, ColorValue, Layer, LottieJson};
use std::sync::Arc;
use tracing::{debug, warn};

/// A single edit, as issued by a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    ToggleVisibility { layer: usize },
    DeleteLayer { layer: usize },
    SetShapeColor { layer: usize, group: usize, hex: String },
}

impl Edit {
    pub fn apply(&self, doc: &LottieJson) -> Result<LottieJson, EditError> {
        match self {
            Edit::ToggleVisibility { layer } => toggle_layer_visibility(doc, *layer),
            Edit::DeleteLayer { layer } => delete_layer(doc, *layer),
            Edit::SetShapeColor { layer, group, hex } => set_shape_color(doc, *layer, *group, hex),
        }
    }
}

fn check_layer(doc: &LottieJson, index: usize) -> Result<(), EditError> {
    if index < doc.layers.len() {
        Ok(())
    } else {
        Err(EditError::LayerOutOfRange {
            index,
            len: doc.layers.len(),
        })
    }
}

fn layer_mut(doc: &mut LottieJson, index: usize) -> &mut Layer {
    Arc::make_mut(&mut doc.layers[index])
}

/// Flips the hidden flag (`hd`) of a layer.
pub fn toggle_layer_visibility(
    doc: &LottieJson,
    layer: usize,
) -> Result<LottieJson, EditError> {
    check_layer(doc, layer)?;
    let mut next = doc.clone();
    let target = layer_mut(&mut next, layer);
    target.hd = !target.hd;
    debug!(layer, hidden = target.hd, "Toggled layer visibility");
    Ok(next)
}

/// Removes a layer; later layers shift down by one.
pub fn delete_layer(doc: &LottieJson, layer: usize) -> Result<LottieJson, EditError> {
    check_layer(doc, layer)?;
    let mut next = doc.clone();
    let removed = next.layers.remove(layer);
    debug!(layer, name = ?removed.nm, remaining = next.layers.len(), "Deleted layer");
    Ok(next)
}

/// Writes `hex` into the first static fill/stroke color of a shape group.
///
/// `hex` must be a well-formed `#rrggbb`. The stored vector always has four channels
/// with alpha 1.
pub fn set_shape_color(
    doc: &LottieJson,
    layer: usize,
    group: usize,
    hex: &str,
) -> Result<LottieJson, EditError> {
    let path: ShapePath = match resolver::resolve_group_color(doc, layer, group) {
        Ok(found) => found.path,
        Err(err) => {
            if matches!(err, EditError::NoEditableColor { .. }) {
                warn!(
                    layer,
                    group,
                    "Could not find a solid fill/stroke color for this shape group"
                );
            }
            return Err(err);
        }
    };

    let rgba = color::from_hex(hex);
    let mut next = doc.clone();
    let shapes = layer_mut(&mut next, layer)
        .shapes
        .as_mut()
        .ok_or(EditError::NoEditableColor { layer, group })?;
    let paint = resolver::paint_at_mut(shapes, &path)
        .ok_or(EditError::NoEditableColor { layer, group })?;

    let property = paint.c.get_or_insert_with(|| ColorProperty {
        k: None,
        extra: Default::default(),
    });
    property.k = Some(ColorValue::Static(rgba.to_vec()));
    debug!(layer, group, color = hex, ?path, "Set shape color");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> LottieJson {
        LottieJson::from_value(json!({
            "v": "5.5.2", "fr": 30, "ip": 0, "op": 30, "w": 100, "h": 100,
            "layers": [
                { "ty": 4, "nm": "A", "shapes": [
                    { "ty": "gr", "it": [{ "ty": "fl", "c": { "a": 0, "k": [0.8, 0.2, 0.2, 1], "ix": 4 } }] },
                    { "ty": "gr", "it": [{ "ty": "el" }] }
                ]},
                { "ty": 1, "nm": "B" },
                { "ty": 3, "nm": "C" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_toggle_is_an_involution() {
        let original = doc();
        for layer in 0..original.layers.len() {
            let once = toggle_layer_visibility(&original, layer).unwrap();
            assert!(once.layers[layer].hd);
            assert!(!original.layers[layer].hd);
            let twice = toggle_layer_visibility(&once, layer).unwrap();
            assert_eq!(twice, original);
        }
    }

    #[test]
    fn test_delete_preserves_order() {
        let original = doc();
        let next = delete_layer(&original, 1).unwrap();
        let names: Vec<_> = next.layers.iter().map(|l| l.nm.as_deref()).collect();
        assert_eq!(names, vec![Some("A"), Some("C")]);
        assert_eq!(original.layers.len(), 3);
    }

    #[test]
    fn test_out_of_range_layer() {
        let original = doc();
        assert_eq!(
            toggle_layer_visibility(&original, 3),
            Err(EditError::LayerOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            delete_layer(&original, 7),
            Err(EditError::LayerOutOfRange { index: 7, len: 3 })
        );
        assert_eq!(
            set_shape_color(&original, 9, 0, "#ffffff"),
            Err(EditError::LayerOutOfRange { index: 9, len: 3 })
        );
    }

    #[test]
    fn test_set_color_writes_vector_and_keeps_siblings() {
        let original = doc();
        let next = set_shape_color(&original, 0, 0, "#00ff00").unwrap();
        let raw = serde_json::to_value(&next).unwrap();
        let c = &raw["layers"][0]["shapes"][0]["it"][0]["c"];
        assert_eq!(c["k"], json!([0.0, 1.0, 0.0, 1.0]));
        assert_eq!(c["ix"], 4);
        assert_eq!(c["a"], 0);

        // untouched parts are shared, the old snapshot is unchanged
        assert!(Arc::ptr_eq(&original.layers[1], &next.layers[1]));
        assert_eq!(resolver::resolve_group_color(&original, 0, 0).unwrap().hex(), "#cc3333");
    }

    #[test]
    fn test_set_color_misses() {
        let original = doc();
        assert_eq!(
            set_shape_color(&original, 0, 1, "#ffffff"),
            Err(EditError::NoEditableColor { layer: 0, group: 1 })
        );
        assert_eq!(
            set_shape_color(&original, 0, 2, "#ffffff"),
            Err(EditError::ShapeGroupOutOfRange { layer: 0, index: 2, len: 2 })
        );
        assert_eq!(
            set_shape_color(&original, 1, 0, "#ffffff"),
            Err(EditError::ShapeGroupOutOfRange { layer: 1, index: 0, len: 0 })
        );
    }

    #[test]
    fn test_edit_dispatch() {
        let original = doc();
        let edit = Edit::SetShapeColor {
            layer: 0,
            group: 0,
            hex: "#0000ff".to_string(),
        };
        let next = edit.apply(&original).unwrap();
        assert_eq!(resolver::resolve_group_color(&next, 0, 0).unwrap().hex(), "#0000ff");
    }
}
