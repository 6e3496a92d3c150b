mod circle;
mod detailed;
mod simple;

pub use circle::CircleRenderer;
pub use detailed::DetailedRenderer;
pub use simple::SimpleRenderer;

use serde::{Deserialize, Serialize};

use crate::data::DataProvider;
use crate::layout::{PositionedNode, composite};
use crate::text_metrics::TextMeasurer;
use crate::theme::Theme;

/// Sizes, anchors and draws chart nodes.
///
/// Positions returned by the anchor methods are relative to the node centre.
/// `render_node` draws in node-local coordinates with the origin at the
/// node's top-left corner.
pub trait NodeRenderer {
    fn preferred_indi_size(&mut self, data: &dyn DataProvider, id: &str) -> (f32, f32);

    fn preferred_fam_size(&mut self, _data: &dyn DataProvider, _id: &str) -> (f32, f32) {
        (0.0, 0.0)
    }

    /// Sets box and node sizes before placement.
    fn update_nodes(
        &mut self,
        nodes: &mut [PositionedNode],
        data: &dyn DataProvider,
        horizontal: bool,
    ) {
        composite::update_composite_nodes(self, nodes, data, horizontal);
    }

    fn indi_anchor(&self, node: &PositionedNode, horizontal: bool) -> (f32, f32) {
        composite::indi_anchor(node, horizontal)
    }

    fn spouse_anchor(&self, node: &PositionedNode, horizontal: bool) -> (f32, f32) {
        composite::spouse_anchor(node, horizontal)
    }

    fn family_anchor(&self, node: &PositionedNode, horizontal: bool) -> (f32, f32) {
        composite::family_anchor(node, horizontal)
    }

    fn render_node(
        &mut self,
        node: &PositionedNode,
        data: &dyn DataProvider,
        horizontal: bool,
    ) -> String;

    fn stylesheet(&self) -> String;

    /// Drops state kept between builds.
    fn reset(&mut self) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartColors {
    NoColor,
    #[default]
    ByGeneration,
    BySex,
    ByEthnicity,
    ByNrLanguages,
    ByLanguage,
}

impl ChartColors {
    pub fn class(self) -> &'static str {
        match self {
            ChartColors::NoColor => "nocolor",
            ChartColors::ByGeneration => "bygeneration",
            ChartColors::BySex => "bysex",
            ChartColors::ByEthnicity => "byethnicity",
            ChartColors::ByNrLanguages | ChartColors::ByLanguage => "bylanguages",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    #[default]
    Detailed,
    Simple,
    Circle,
}

#[derive(Debug, Clone, Default)]
pub struct RendererOptions {
    pub colors: ChartColors,
    pub selected_language: Option<String>,
    pub theme: Theme,
    pub fast_text_metrics: bool,
}

pub fn make_renderer(kind: RendererKind, options: RendererOptions) -> Box<dyn NodeRenderer> {
    let measurer = TextMeasurer::new(&options.theme.font_family, options.fast_text_metrics);
    match kind {
        RendererKind::Detailed => Box::new(DetailedRenderer::new(options, measurer)),
        RendererKind::Simple => Box::new(SimpleRenderer::new(options.theme, measurer)),
        RendererKind::Circle => Box::new(CircleRenderer::new(options.theme)),
    }
}

/// Text element with the given class, already escaped.
pub(crate) fn text_element(x: f32, y: f32, class: &str, anchor: Option<&str>, text: &str) -> String {
    let anchor = anchor
        .map(|value| format!(" text-anchor=\"{value}\""))
        .unwrap_or_default();
    format!(
        "<text class=\"{class}\"{anchor} transform=\"translate({x:.2}, {y:.2})\">{}</text>",
        crate::render::escape_xml(text)
    )
}
