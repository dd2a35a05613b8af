//! Locating color-bearing nodes inside a shape tree.
//!
//! A single traversal drives both reading and writing: [`visit_color_nodes`] walks the
//! tree in pre-order and hands every static fill/stroke color to a callback, which
//! decides whether to keep going. The resulting [`ShapePath`] is what the mutator uses to
//! reach the same node for writing, so reads and writes agree on precedence.

use crate::color;
use crate::errors::EditError;
use lottie_data::model::{LottieJson, Nesting, PaintShape, ShapeNode};
use std::ops::ControlFlow;
use std::sync::Arc;

/// Position of a node: index into the root list, then one `(nesting, index)` per level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapePath {
    pub root: usize,
    pub steps: Vec<(Nesting, usize)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintKind {
    Fill,
    Stroke,
}

/// A static color found by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorNodeRef<'a> {
    pub path: ShapePath,
    pub kind: PaintKind,
    pub name: Option<&'a str>,
    pub color: &'a [f64],
}

impl ColorNodeRef<'_> {
    pub fn hex(&self) -> String {
        color::to_hex(self.color)
    }
}

/// Walks `nodes` depth-first, pre-order.
///
/// At each node: a fill or stroke with a static color is reported; otherwise legacy
/// children (`it`) are visited, then modern children (`shapes`). Animated colors are
/// never reported.
pub fn visit_color_nodes<'a, F>(nodes: &'a [Arc<ShapeNode>], mut visit: F) -> ControlFlow<()>
where
    F: FnMut(ColorNodeRef<'a>) -> ControlFlow<()>,
{
    let mut steps = Vec::new();
    for (root, node) in nodes.iter().enumerate() {
        walk(node, root, &mut steps, &mut visit)?;
    }
    ControlFlow::Continue(())
}

fn walk<'a, F>(
    node: &'a ShapeNode,
    root: usize,
    steps: &mut Vec<(Nesting, usize)>,
    visit: &mut F,
) -> ControlFlow<()>
where
    F: FnMut(ColorNodeRef<'a>) -> ControlFlow<()>,
{
    let kind = match node {
        ShapeNode::Fill(_) => Some(PaintKind::Fill),
        ShapeNode::Stroke(_) => Some(PaintKind::Stroke),
        _ => None,
    };
    if let (Some(kind), Some(color)) = (kind, node.paint().and_then(PaintShape::static_color)) {
        return visit(ColorNodeRef {
            path: ShapePath {
                root,
                steps: steps.clone(),
            },
            kind,
            name: node.name(),
            color,
        });
    }

    for nesting in [Nesting::Legacy, Nesting::Modern] {
        let Some(children) = node.children(nesting) else {
            continue;
        };
        for (index, child) in children.iter().enumerate() {
            steps.push((nesting, index));
            let flow = walk(child, root, steps, visit);
            steps.pop();
            flow?;
        }
    }
    ControlFlow::Continue(())
}

/// First static color in traversal order.
pub fn find_color_node(nodes: &[Arc<ShapeNode>]) -> Option<ColorNodeRef<'_>> {
    let mut found = None;
    let _ = visit_color_nodes(nodes, |node| {
        found = Some(node);
        ControlFlow::Break(())
    });
    found
}

/// Every static color in traversal order.
pub fn color_nodes(nodes: &[Arc<ShapeNode>]) -> Vec<ColorNodeRef<'_>> {
    let mut found = Vec::new();
    let _ = visit_color_nodes(nodes, |node| {
        found.push(node);
        ControlFlow::Continue(())
    });
    found
}

/// Resolves the editable color of shape group `group` on layer `layer`.
///
/// The group itself is the search root, so a top-level fill counts as well as one nested
/// inside the group. The returned path is relative to the layer's `shapes` list.
pub fn resolve_group_color(
    doc: &LottieJson,
    layer: usize,
    group: usize,
) -> Result<ColorNodeRef<'_>, EditError> {
    let target = doc.layer(layer).ok_or(EditError::LayerOutOfRange {
        index: layer,
        len: doc.layers.len(),
    })?;
    let groups = target.shape_groups();
    let scoped = groups
        .get(group..=group)
        .ok_or(EditError::ShapeGroupOutOfRange {
            layer,
            index: group,
            len: groups.len(),
        })?;

    let mut found = find_color_node(scoped).ok_or(EditError::NoEditableColor { layer, group })?;
    found.path.root += group;
    Ok(found)
}

/// Mutable access to the paint node at `path`.
///
/// Shared nodes along the path are cloned on the way down (`Arc::make_mut`), so any other
/// document holding the same nodes keeps seeing the old values.
pub fn paint_at_mut<'a>(
    nodes: &'a mut [Arc<ShapeNode>],
    path: &ShapePath,
) -> Option<&'a mut PaintShape> {
    let mut node: &mut ShapeNode = Arc::make_mut(nodes.get_mut(path.root)?);
    for &(nesting, index) in &path.steps {
        let child = node.children_mut(nesting)?.get_mut(index)?;
        node = Arc::make_mut(child);
    }
    node.paint_mut()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lottie_data::model::ColorValue;
    use serde_json::json;

    fn nodes(value: serde_json::Value) -> Vec<Arc<ShapeNode>> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_first_match_in_legacy_group() {
        let shapes = nodes(json!([
            { "ty": "gr", "it": [
                { "ty": "rc" },
                { "ty": "fl", "c": { "a": 0, "k": [0.8, 0.2, 0.2, 1] } },
                { "ty": "st", "c": { "a": 0, "k": [0, 0, 0, 1] } }
            ]}
        ]));
        let found = find_color_node(&shapes).unwrap();
        assert_eq!(found.hex(), "#cc3333");
        assert_eq!(found.kind, PaintKind::Fill);
        assert_eq!(
            found.path,
            ShapePath {
                root: 0,
                steps: vec![(Nesting::Legacy, 1)]
            }
        );
    }

    #[test]
    fn test_descends_modern_and_nested_groups() {
        let shapes = nodes(json!([
            { "ty": "gr", "shapes": [
                { "ty": "gr", "it": [
                    { "ty": "st", "nm": "Outline", "c": { "a": 0, "k": [0, 0, 1] } }
                ]}
            ]}
        ]));
        let found = find_color_node(&shapes).unwrap();
        assert_eq!(found.kind, PaintKind::Stroke);
        assert_eq!(found.name, Some("Outline"));
        assert_eq!(found.hex(), "#0000ff");
        assert_eq!(
            found.path.steps,
            vec![(Nesting::Modern, 0), (Nesting::Legacy, 0)]
        );
    }

    #[test]
    fn test_legacy_children_searched_before_modern() {
        let shapes = nodes(json!([
            { "ty": "gr",
              "shapes": [{ "ty": "fl", "c": { "a": 0, "k": [0, 1, 0, 1] } }],
              "it": [{ "ty": "fl", "c": { "a": 0, "k": [1, 0, 0, 1] } }]
            }
        ]));
        assert_eq!(find_color_node(&shapes).unwrap().hex(), "#ff0000");
        let all: Vec<_> = color_nodes(&shapes).iter().map(ColorNodeRef::hex).collect();
        assert_eq!(all, vec!["#ff0000", "#00ff00"]);
    }

    #[test]
    fn test_animated_colors_are_skipped() {
        let shapes = nodes(json!([
            { "ty": "gr", "it": [
                { "ty": "fl", "c": { "a": 1, "k": [
                    { "t": 0, "s": [1, 0, 0, 1] },
                    { "t": 10, "s": [0, 1, 0, 1] }
                ]}}
            ]}
        ]));
        assert!(find_color_node(&shapes).is_none());
        assert!(color_nodes(&shapes).is_empty());
    }

    #[test]
    fn test_animated_sibling_does_not_hide_static_one() {
        let shapes = nodes(json!([
            { "ty": "gr", "it": [
                { "ty": "st", "c": { "a": 1, "k": [{ "t": 0, "s": [1, 1, 1, 1] }] } },
                { "ty": "fl", "c": { "a": 0, "k": [0, 0, 0, 1] } }
            ]}
        ]));
        let found = find_color_node(&shapes).unwrap();
        assert_eq!(found.kind, PaintKind::Fill);
        assert_eq!(found.path.steps, vec![(Nesting::Legacy, 1)]);
    }

    #[test]
    fn test_no_paint_at_all() {
        let shapes = nodes(json!([{ "ty": "gr", "it": [{ "ty": "el" }, { "ty": "tr" }] }]));
        assert!(find_color_node(&shapes).is_none());
        assert!(find_color_node(&[]).is_none());
    }

    #[test]
    fn test_paint_at_mut_copies_shared_path() {
        let shapes = nodes(json!([
            { "ty": "gr", "it": [{ "ty": "fl", "c": { "a": 0, "k": [1, 1, 1, 1] } }] },
            { "ty": "gr", "it": [{ "ty": "fl", "c": { "a": 0, "k": [0, 0, 0, 1] } }] }
        ]));
        let mut edited = shapes.clone();
        let path = find_color_node(&shapes).unwrap().path;

        let paint = paint_at_mut(&mut edited, &path).unwrap();
        paint.c.as_mut().unwrap().k = Some(ColorValue::Static(vec![0.0, 0.0, 0.0, 1.0]));

        assert_eq!(find_color_node(&shapes).unwrap().hex(), "#ffffff");
        assert_eq!(find_color_node(&edited).unwrap().hex(), "#000000");
        // the untouched sibling is still shared
        assert!(Arc::ptr_eq(&shapes[1], &edited[1]));
        assert!(!Arc::ptr_eq(&shapes[0], &edited[0]));
    }
}
