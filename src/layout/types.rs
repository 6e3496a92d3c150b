use serde::Serialize;

use crate::hierarchy::{LinkType, NodeId};

/// Horizontal distance between boxes.
pub const H_SPACING: f32 = 15.0;
/// Vertical distance between boxes.
pub const V_SPACING: f32 = 30.0;
/// Margin around the whole drawing.
pub const MARGIN: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub horizontal: bool,
    /// Grow towards negative coordinates (ancestors above a shared root).
    pub flip: bool,
    pub base_generation: i32,
    pub h_spacing: f32,
    pub v_spacing: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            horizontal: false,
            flip: false,
            base_generation: 0,
            h_spacing: H_SPACING,
            v_spacing: V_SPACING,
        }
    }
}

/// One person or family box inside a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntryBox {
    pub id: String,
    pub width: f32,
    pub height: f32,
    pub hidden_relatives: bool,
}

impl EntryBox {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionedNode {
    pub id: String,
    #[serde(skip)]
    pub node: NodeId,
    pub depth: usize,
    pub generation: i32,
    /// Centre of the node.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub indi: Option<EntryBox>,
    pub spouse: Option<EntryBox>,
    pub family: Option<EntryBox>,
    /// Index of the parent node in the same node list.
    pub parent: Option<usize>,
    pub link_from_parent: Option<LinkType>,
    pub additional_marriage: bool,
    pub duplicate_of: Option<String>,
    pub duplicated: bool,
    pub link_stubs: Vec<LinkType>,
    pub hidden_relatives: bool,
}

impl PositionedNode {
    pub fn person_ids(&self) -> impl Iterator<Item = &str> {
        self.indi
            .iter()
            .chain(self.spouse.iter())
            .map(|entry| entry.id.as_str())
    }

    pub fn left(&self) -> f32 {
        self.x - self.width / 2.0
    }

    pub fn top(&self) -> f32 {
        self.y - self.height / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkKind {
    Tree,
    AdditionalMarriage,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkLayout {
    /// Indices into the chart's node list.
    pub from: usize,
    pub to: usize,
    pub kind: LinkKind,
    pub points: Vec<(f32, f32)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartInfo {
    pub size: (f32, f32),
    /// Translation that moves every node into positive coordinates.
    pub origin: (f32, f32),
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartLayout {
    pub nodes: Vec<PositionedNode>,
    pub links: Vec<LinkLayout>,
    pub info: ChartInfo,
    pub horizontal: bool,
}

impl ChartLayout {
    pub fn find(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}
