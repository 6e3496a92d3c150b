use crate::config::RenderConfig;
use crate::data::DataProvider;
use crate::hierarchy::LinkType;
use crate::layout::{ChartLayout, LinkKind, PositionedNode};
use crate::renderer::NodeRenderer;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const STUB_LENGTH: f32 = 8.0;
const STUB_GAP: f32 = 6.0;

pub fn render_svg(
    layout: &ChartLayout,
    data: &dyn DataProvider,
    renderer: &mut dyn NodeRenderer,
    theme: &Theme,
) -> String {
    let mut svg = String::new();
    let (width, height) = layout.info.size;
    let (origin_x, origin_y) = layout.info.origin;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    svg.push_str("<style>");
    svg.push_str(&format!(
        ".link {{ fill: none; stroke: {line}; stroke-width: 1px; }}\n\
         .link.additional-marriage {{ stroke-dasharray: 2; }}\n\
         .link-stub {{ stroke: {line}; stroke-width: 1px; }}\n",
        line = theme.line_color
    ));
    svg.push_str(&renderer.stylesheet());
    svg.push_str("</style>");

    svg.push_str(&format!(
        "<g transform=\"translate({origin_x:.2}, {origin_y:.2})\">"
    ));

    for link in &layout.links {
        let class = match link.kind {
            LinkKind::Tree => "link",
            LinkKind::AdditionalMarriage => "link additional-marriage",
        };
        svg.push_str(&format!(
            "<path class=\"{class}\" d=\"{}\"/>",
            points_to_path(&link.points)
        ));
    }

    for node in &layout.nodes {
        svg.push_str(&format!(
            "<g class=\"node generation{}\" transform=\"translate({:.2}, {:.2})\">",
            node.generation,
            node.left(),
            node.top()
        ));
        svg.push_str(&renderer.render_node(node, data, layout.horizontal));
        svg.push_str("</g>");
        for stub in &node.link_stubs {
            svg.push_str(&stub_svg(node, *stub, layout.horizontal));
        }
    }

    svg.push_str("</g></svg>");
    svg
}

/// Short dangling line showing that a relation exists but is not drawn.
/// Children stubs point down (right when horizontal), parents and siblings
/// up (left), on both sides of the chart.
fn stub_svg(node: &PositionedNode, link: LinkType, horizontal: bool) -> String {
    let forward = link == LinkType::Children;
    let lane = match link {
        LinkType::IndiParents | LinkType::IndiSiblings => -STUB_GAP,
        LinkType::SpouseParents | LinkType::SpouseSiblings => STUB_GAP,
        LinkType::Children => 0.0,
    };
    let points = if horizontal {
        let x = if forward { node.right() } else { node.left() };
        let end = if forward { x + STUB_LENGTH } else { x - STUB_LENGTH };
        [(x, node.y + lane), (end, node.y + lane)]
    } else {
        let y = if forward { node.bottom() } else { node.top() };
        let end = if forward { y + STUB_LENGTH } else { y - STUB_LENGTH };
        [(node.x + lane, y), (node.x + lane, end)]
    };
    format!(
        "<path class=\"link-stub\" d=\"{}\"/>",
        points_to_path(&points)
    )
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &opt)?;
    let scale = if render_cfg.scale > 0.0 { render_cfg.scale } else { 1.0 };
    let size = tree.size().to_int_size();
    let width = (size.width() as f32 * scale).ceil() as u32;
    let height = (size.height() as f32 * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartKind, ChartOptions, build_chart};
    use crate::data::RecordStore;
    use crate::hierarchy::EntryId;
    use crate::renderer::{RendererKind, RendererOptions, make_renderer};

    fn store() -> RecordStore {
        RecordStore::from_json(
            r#"{
              "indis": [
                {"id": "I1", "firstName": "Adam & Co", "fams": ["F1"]},
                {"id": "I2", "firstName": "Ewa", "fams": ["F1"]},
                {"id": "I3", "firstName": "Kain", "famc": "F1"}
              ],
              "fams": [{"id": "F1", "husb": "I1", "wife": "I2", "children": ["I3"]}]
            }"#,
        )
        .expect("valid records")
    }

    #[test]
    fn render_svg_basic() {
        let data = store();
        let mut renderer = make_renderer(
            RendererKind::Detailed,
            RendererOptions {
                fast_text_metrics: true,
                ..Default::default()
            },
        );
        let options = ChartOptions {
            kind: ChartKind::Descendants,
            start: Some(EntryId::indi("I1")),
            ..Default::default()
        };
        let layout = build_chart(&data, renderer.as_mut(), &options).expect("chart");
        let svg = render_svg(&layout, &data, renderer.as_mut(), &Theme::classic());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Adam &amp; Co"));
        assert!(svg.contains("Kain"));
        assert_eq!(svg.matches("class=\"link\"").count(), 1);
    }

    fn stub_node(generation: i32) -> PositionedNode {
        PositionedNode {
            id: "F0".to_string(),
            node: 1,
            depth: 1,
            generation,
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 10.0,
            indi: Some(crate::layout::EntryBox::new("I7")),
            spouse: None,
            family: None,
            parent: Some(0),
            link_from_parent: Some(LinkType::IndiParents),
            additional_marriage: false,
            duplicate_of: None,
            duplicated: false,
            link_stubs: Vec::new(),
            hidden_relatives: false,
        }
    }

    #[test]
    fn stubs_ignore_the_generation_base() {
        for generation in [-2, 0, 2, 3] {
            let node = stub_node(generation);
            assert_eq!(
                stub_svg(&node, LinkType::IndiSiblings, false),
                "<path class=\"link-stub\" d=\"M -6.00 -5.00 L -6.00 -13.00\"/>",
                "generation {generation}"
            );
            assert_eq!(
                stub_svg(&node, LinkType::Children, false),
                "<path class=\"link-stub\" d=\"M 0.00 5.00 L 0.00 13.00\"/>",
                "generation {generation}"
            );
            assert_eq!(
                stub_svg(&node, LinkType::IndiParents, true),
                "<path class=\"link-stub\" d=\"M -10.00 -6.00 L -18.00 -6.00\"/>",
                "generation {generation}"
            );
        }
    }

    #[test]
    fn path_from_points() {
        assert_eq!(points_to_path(&[]), "");
        assert_eq!(
            points_to_path(&[(0.0, 1.0), (2.5, 3.0)]),
            "M 0.00 1.00 L 2.50 3.00"
        );
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("<a href='x'>&</a>"), "&lt;a href=&apos;x&apos;&gt;&amp;&lt;/a&gt;");
    }
}
