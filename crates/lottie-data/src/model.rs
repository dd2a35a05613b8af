use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Keys the model does not interpret, kept verbatim for lossless round-trips.
pub type Extra = Map<String, JsonValue>;

pub const FILL: &str = "fl";
pub const STROKE: &str = "st";

#[derive(Error, Debug)]
pub enum ModelError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("canvas size must be positive (got {w}x{h})")]
    EmptyCanvas { w: u32, h: u32 },
    #[error("frame range is inverted (ip {ip} > op {op})")]
    InvertedFrameRange { ip: f64, op: f64 },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LottieJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<String>,
    pub fr: f64,
    pub ip: f64,
    pub op: f64,
    pub w: u32,
    pub h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<String>,
    pub layers: Vec<Arc<Layer>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl LottieJson {
    /// Parses a document from JSON text and checks the structural invariants.
    pub fn from_json_str(text: &str) -> Result<Self, ModelError> {
        let doc: LottieJson = serde_json::from_str(text)?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let doc: LottieJson = serde_json::from_slice(bytes)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Converts an already parsed JSON value into a document.
    pub fn from_value(value: JsonValue) -> Result<Self, ModelError> {
        let doc: LottieJson = serde_json::from_value(value)?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.w == 0 || self.h == 0 {
            return Err(ModelError::EmptyCanvas {
                w: self.w,
                h: self.h,
            });
        }
        if self.op < self.ip {
            return Err(ModelError::InvertedFrameRange {
                ip: self.ip,
                op: self.op,
            });
        }
        Ok(())
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index).map(Arc::as_ref)
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            version: self.v.clone(),
            name: self.nm.clone(),
            width: self.w,
            height: self.h,
            frame_rate: self.fr,
            num_frames: self.op - self.ip,
            num_layers: self.layers.len(),
        }
    }
}

/// Headline numbers shown next to a discovered or loaded animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    #[serde(rename = "bmVersion")]
    pub version: Option<String>,
    pub name: Option<String>,
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
    pub num_frames: f64,
    pub num_layers: usize,
}

// Layers

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Layer {
    pub ty: LayerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ind: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<String>,
    // `"hd": false` is the format default, so it is never written back.
    #[serde(default, skip_serializing_if = "is_false")]
    pub hd: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shapes: Option<Vec<Arc<ShapeNode>>>, // Shape Layer
    #[serde(flatten)]
    pub extra: Extra,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Layer {
    pub fn kind(&self) -> LayerKind {
        self.ty
    }

    pub fn is_hidden(&self) -> bool {
        self.hd
    }

    /// The layer's own name, or `Layer N` (1-based) when it has none.
    pub fn display_name(&self, index: usize) -> String {
        match &self.nm {
            Some(name) => name.clone(),
            None => format!("Layer {}", index + 1),
        }
    }

    /// Stable key for listings: `ind` when present, otherwise the position.
    pub fn key(&self, index: usize) -> LayerKey {
        match self.ind {
            Some(ind) if ind != 0 => LayerKey::Ind(ind),
            _ => LayerKey::Position(index),
        }
    }

    pub fn shape_groups(&self) -> &[Arc<ShapeNode>] {
        self.shapes.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKey {
    Ind(u32),
    Position(usize),
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKey::Ind(ind) => write!(f, "ind:{}", ind),
            LayerKey::Position(index) => write!(f, "#{}", index),
        }
    }
}

/// Numeric `ty` tag of a layer. Tags outside the known set are kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum LayerKind {
    Composition,
    Solid,
    Image,
    Null,
    Shape,
    Text,
    Audio,
    Data,
    Unknown(i64),
}

impl LayerKind {
    pub fn name(&self) -> &'static str {
        match self {
            LayerKind::Composition => "Composition",
            LayerKind::Solid => "Solid",
            LayerKind::Image => "Image",
            LayerKind::Null => "Null",
            LayerKind::Shape => "Shape",
            LayerKind::Text => "Text",
            LayerKind::Audio => "Audio",
            LayerKind::Data => "Data",
            LayerKind::Unknown(_) => "Unknown",
        }
    }
}

impl From<i64> for LayerKind {
    fn from(tag: i64) -> Self {
        match tag {
            0 => LayerKind::Composition,
            1 => LayerKind::Solid,
            2 => LayerKind::Image,
            3 => LayerKind::Null,
            4 => LayerKind::Shape,
            5 => LayerKind::Text,
            6 => LayerKind::Audio,
            13 => LayerKind::Data,
            other => LayerKind::Unknown(other),
        }
    }
}

impl From<LayerKind> for i64 {
    fn from(kind: LayerKind) -> Self {
        match kind {
            LayerKind::Composition => 0,
            LayerKind::Solid => 1,
            LayerKind::Image => 2,
            LayerKind::Null => 3,
            LayerKind::Shape => 4,
            LayerKind::Text => 5,
            LayerKind::Audio => 6,
            LayerKind::Data => 13,
            LayerKind::Unknown(tag) => tag,
        }
    }
}

// Shapes

/// Which key a container keeps its children under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nesting {
    /// `it`
    Legacy,
    /// `shapes`
    Modern,
}

impl Nesting {
    pub fn key(&self) -> &'static str {
        match self {
            Nesting::Legacy => "it",
            Nesting::Modern => "shapes",
        }
    }
}

/// A node of a shape layer's tree.
///
/// Fill and stroke nodes carry a color. Any node holding children under `it` or
/// `shapes` is a group, whatever its `ty`. Everything else is kept as raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeNode {
    Fill(PaintShape),
    Stroke(PaintShape),
    Group(GroupShape),
    Unknown(JsonValue),
}

impl ShapeNode {
    fn classify(value: JsonValue) -> Self {
        let tag = value.get("ty").and_then(JsonValue::as_str);
        let parsed = match tag {
            Some(FILL) => PaintShape::from_tagged(&value).map(ShapeNode::Fill),
            Some(STROKE) => PaintShape::from_tagged(&value).map(ShapeNode::Stroke),
            _ if GroupShape::has_children(&value) => {
                GroupShape::deserialize(&value).ok().map(ShapeNode::Group)
            }
            _ => None,
        };
        parsed.unwrap_or(ShapeNode::Unknown(value))
    }

    /// The `ty` tag, if the node has one.
    pub fn tag(&self) -> Option<&str> {
        match self {
            ShapeNode::Fill(_) => Some(FILL),
            ShapeNode::Stroke(_) => Some(STROKE),
            ShapeNode::Group(group) => group.ty.as_deref(),
            ShapeNode::Unknown(raw) => raw.get("ty").and_then(JsonValue::as_str),
        }
    }

    pub fn name(&self) -> Option<&str> {
        let extra = match self {
            ShapeNode::Fill(paint) | ShapeNode::Stroke(paint) => &paint.extra,
            ShapeNode::Group(group) => &group.extra,
            ShapeNode::Unknown(raw) => return raw.get("nm").and_then(JsonValue::as_str),
        };
        extra.get("nm").and_then(JsonValue::as_str)
    }

    pub fn paint(&self) -> Option<&PaintShape> {
        match self {
            ShapeNode::Fill(paint) | ShapeNode::Stroke(paint) => Some(paint),
            _ => None,
        }
    }

    pub fn paint_mut(&mut self) -> Option<&mut PaintShape> {
        match self {
            ShapeNode::Fill(paint) | ShapeNode::Stroke(paint) => Some(paint),
            _ => None,
        }
    }

    pub fn children(&self, nesting: Nesting) -> Option<&[Arc<ShapeNode>]> {
        match self {
            ShapeNode::Group(group) => group.children(nesting).map(Vec::as_slice),
            _ => None,
        }
    }

    pub fn children_mut(&mut self, nesting: Nesting) -> Option<&mut Vec<Arc<ShapeNode>>> {
        match self {
            ShapeNode::Group(group) => group.children_mut(nesting),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for ShapeNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = JsonValue::deserialize(deserializer)?;
        Ok(ShapeNode::classify(value))
    }
}

#[derive(Serialize)]
struct Tagged<'a, T> {
    ty: &'a str,
    #[serde(flatten)]
    body: &'a T,
}

impl Serialize for ShapeNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ShapeNode::Fill(paint) => Tagged { ty: FILL, body: paint }.serialize(serializer),
            ShapeNode::Stroke(paint) => Tagged { ty: STROKE, body: paint }.serialize(serializer),
            ShapeNode::Group(group) => group.serialize(serializer),
            ShapeNode::Unknown(raw) => raw.serialize(serializer),
        }
    }
}

/// Body of a fill (`fl`) or stroke (`st`) node; the tag lives on [`ShapeNode`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PaintShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<ColorProperty>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl PaintShape {
    fn from_tagged(value: &JsonValue) -> Option<Self> {
        let mut paint = PaintShape::deserialize(value).ok()?;
        paint.extra.remove("ty");
        Some(paint)
    }

    /// The static color vector, if the color is not animated.
    pub fn static_color(&self) -> Option<&[f64]> {
        match self.c.as_ref()?.k.as_ref()? {
            ColorValue::Static(rgba) => Some(rgba),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ColorProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<ColorValue>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// The `k` of a color property.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorValue {
    /// 3 or more normalized channels.
    Static(Vec<f64>),
    /// Keyframe objects, carried untouched.
    Animated(Vec<JsonValue>),
    Other(JsonValue),
}

impl ColorValue {
    pub fn is_animated(&self) -> bool {
        matches!(self, ColorValue::Animated(_))
    }
}

impl<'de> Deserialize<'de> for ColorValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = JsonValue::deserialize(deserializer)?;
        let JsonValue::Array(items) = value else {
            return Ok(ColorValue::Other(value));
        };

        if items.len() >= 3 && items.iter().all(JsonValue::is_number) {
            let channels = items.iter().filter_map(JsonValue::as_f64).collect();
            return Ok(ColorValue::Static(channels));
        }

        if !items.is_empty() && items.iter().all(JsonValue::is_object) {
            return Ok(ColorValue::Animated(items));
        }

        Ok(ColorValue::Other(JsonValue::Array(items)))
    }
}

impl Serialize for ColorValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ColorValue::Static(channels) => channels.serialize(serializer),
            ColorValue::Animated(keyframes) => keyframes.serialize(serializer),
            ColorValue::Other(raw) => raw.serialize(serializer),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GroupShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub it: Option<Vec<Arc<ShapeNode>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shapes: Option<Vec<Arc<ShapeNode>>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl GroupShape {
    fn has_children(value: &JsonValue) -> bool {
        [Nesting::Legacy, Nesting::Modern]
            .iter()
            .any(|nesting| value.get(nesting.key()).is_some_and(JsonValue::is_array))
    }

    pub fn children(&self, nesting: Nesting) -> Option<&Vec<Arc<ShapeNode>>> {
        match nesting {
            Nesting::Legacy => self.it.as_ref(),
            Nesting::Modern => self.shapes.as_ref(),
        }
    }

    pub fn children_mut(&mut self, nesting: Nesting) -> Option<&mut Vec<Arc<ShapeNode>>> {
        match nesting {
            Nesting::Legacy => self.it.as_mut(),
            Nesting::Modern => self.shapes.as_mut(),
        }
    }
}
