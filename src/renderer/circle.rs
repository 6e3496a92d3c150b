use crate::data::DataProvider;
use crate::layout::PositionedNode;
use crate::theme::Theme;

use super::{NodeRenderer, text_element};

const COUPLE_DIAMETER: f32 = 90.0;
const SINGLE_DIAMETER: f32 = 60.0;

/// Person or married couple inside a circle, labelled with first names.
#[derive(Debug, Default)]
pub struct CircleRenderer {
    theme: Theme,
}

impl CircleRenderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }
}

fn first_name(data: &dyn DataProvider, id: Option<&str>) -> String {
    id.and_then(|id| data.indi(id))
        .and_then(|indi| indi.first_name())
        .and_then(|name| name.split(' ').next())
        .unwrap_or_default()
        .to_string()
}

impl NodeRenderer for CircleRenderer {
    fn preferred_indi_size(&mut self, _data: &dyn DataProvider, _id: &str) -> (f32, f32) {
        (SINGLE_DIAMETER, SINGLE_DIAMETER)
    }

    fn update_nodes(
        &mut self,
        nodes: &mut [PositionedNode],
        _data: &dyn DataProvider,
        _horizontal: bool,
    ) {
        for node in nodes {
            let diameter = if node.family.is_some() {
                COUPLE_DIAMETER
            } else {
                SINGLE_DIAMETER
            };
            node.width = diameter;
            node.height = diameter;
            for entry in [node.indi.as_mut(), node.spouse.as_mut(), node.family.as_mut()]
                .into_iter()
                .flatten()
            {
                entry.width = diameter;
                entry.height = diameter;
            }
        }
    }

    fn indi_anchor(&self, _node: &PositionedNode, _horizontal: bool) -> (f32, f32) {
        (0.0, 0.0)
    }

    fn spouse_anchor(&self, _node: &PositionedNode, _horizontal: bool) -> (f32, f32) {
        (0.0, 0.0)
    }

    fn family_anchor(&self, _node: &PositionedNode, _horizontal: bool) -> (f32, f32) {
        (0.0, 0.0)
    }

    fn render_node(
        &mut self,
        node: &PositionedNode,
        data: &dyn DataProvider,
        _horizontal: bool,
    ) -> String {
        let (cx, cy) = (node.width / 2.0, node.height / 2.0);
        let mut out = format!(
            "<g class=\"circle\"><circle r=\"{:.2}\" cx=\"{cx:.2}\" cy=\"{cy:.2}\"/>",
            node.width / 2.0
        );
        let indi = first_name(data, node.indi.as_ref().map(|entry| entry.id.as_str()));
        if node.family.is_some() {
            let spouse = first_name(data, node.spouse.as_ref().map(|entry| entry.id.as_str()));
            out.push_str(&text_element(cx, cy - 4.0, "name", Some("middle"), &indi));
            out.push_str(&text_element(cx, cy + 14.0, "name", Some("middle"), &spouse));
        } else {
            out.push_str(&text_element(cx, cy + 4.0, "name", Some("middle"), &indi));
        }
        out.push_str("</g>");
        out
    }

    fn stylesheet(&self) -> String {
        format!(
            "circle {{ fill: {fill}; stroke: {stroke}; stroke-width: 5px; }}\n\
             .circle text {{ font-family: {font}; font-size: 12px; fill: {text}; }}\n",
            fill = self.theme.box_color,
            stroke = self.theme.line_color,
            font = self.theme.font_family,
            text = self.theme.text_color,
        )
    }
}
