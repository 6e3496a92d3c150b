//! Chart assemblers: pick the traversal policy for a chart kind, lay out the
//! trees that share the start node and join them into one chart.

mod hidden;

use serde::{Deserialize, Serialize};

use crate::data::DataProvider;
use crate::error::ChartError;
use crate::hierarchy::{EntryId, HierarchyFilters, LinkType, build_hierarchy};
use crate::layout::{ChartLayout, LayoutOptions, PositionedNode, chart_info, compute_links, lay_out_tree};
use crate::renderer::NodeRenderer;

pub(crate) use hidden::mark_hidden_relatives;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Ancestors above the start family, descendants below it.
    #[default]
    Hourglass,
    Ancestors,
    Descendants,
    /// Everyone reachable through parents, siblings, spouses and children.
    Relatives,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartOptions {
    pub kind: ChartKind,
    /// Individual or family the chart starts from. The first individual in
    /// the record set when unset.
    pub start: Option<EntryId>,
    pub layout: LayoutOptions,
}

pub fn build_chart(
    data: &dyn DataProvider,
    renderer: &mut dyn NodeRenderer,
    options: &ChartOptions,
) -> Result<ChartLayout, ChartError> {
    renderer.reset();
    let start = match &options.start {
        Some(start) => start.clone(),
        None => {
            let first = data.indis().next().ok_or_else(|| ChartError::missing_root(""))?;
            EntryId::indi(first.id.as_str())
        }
    };
    let filters = filters_for(data, options.kind, &start);
    let hierarchy = build_hierarchy(data, &start, &filters)?;

    let up = hierarchy.up_root.map(|root| {
        let layout = LayoutOptions {
            flip: true,
            ..options.layout
        };
        lay_out_tree(&hierarchy, root, renderer, data, &layout)
    });
    let down = hierarchy.down_root.map(|root| {
        let layout = LayoutOptions {
            flip: false,
            ..options.layout
        };
        lay_out_tree(&hierarchy, root, renderer, data, &layout)
    });

    let mut nodes = join_trees(up, down);
    if let Some(root) = nodes.first_mut() {
        root.link_stubs = hierarchy.root_stubs();
    }
    mark_hidden_relatives(&mut nodes, data);

    let links = compute_links(&nodes, renderer, options.layout.horizontal);
    let info = chart_info(&nodes);
    tracing::debug!(
        kind = ?options.kind,
        start = start.id(),
        nodes = nodes.len(),
        links = links.len(),
        width = info.size.0,
        height = info.size.1,
        "built chart"
    );
    Ok(ChartLayout {
        nodes,
        links,
        info,
        horizontal: options.layout.horizontal,
    })
}

fn filters_for(data: &dyn DataProvider, kind: ChartKind, start: &EntryId) -> HierarchyFilters {
    match kind {
        ChartKind::Ancestors => HierarchyFilters::ancestors(),
        ChartKind::Descendants => HierarchyFilters::descendants(),
        ChartKind::Relatives => HierarchyFilters::kinship(),
        ChartKind::Hourglass => {
            let mut filters = HierarchyFilters::hourglass();
            // With several marriages only one spouse sits in the start node;
            // showing that spouse's ancestry alone would be misleading.
            let remarried = match start {
                EntryId::Indi(id) => data.indi(id).is_some_and(|indi| indi.fams.len() > 1),
                EntryId::Fam(_) => false,
            };
            if remarried {
                filters.up = filters
                    .up
                    .map(|filter| filter.with(LinkType::SpouseParents, false));
            }
            filters
        }
    }
}

/// Joins the flipped tree and the growing tree on their common root. The
/// root keeps its place at index 0 and the id it was first given.
fn join_trees(
    up: Option<Vec<PositionedNode>>,
    down: Option<Vec<PositionedNode>>,
) -> Vec<PositionedNode> {
    match (up, down) {
        (Some(up), None) => up,
        (None, Some(down)) => down,
        (None, None) => Vec::new(),
        (Some(up), Some(mut down)) => {
            if up.is_empty() || down.is_empty() {
                return if up.is_empty() { down } else { up };
            }
            down[0].id = up[0].id.clone();
            let offset = down.len() - 1;
            // Up nodes move behind the down nodes; index 0 of both is the root.
            let remap = |index: usize| if index == 0 { 0 } else { index + offset };
            let mut nodes = down;
            nodes.extend(up.into_iter().skip(1).map(|mut node| {
                node.parent = node.parent.map(remap);
                node
            }));
            nodes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RecordStore;
    use crate::renderer::{RendererKind, RendererOptions, make_renderer};

    fn store() -> RecordStore {
        RecordStore::from_json(
            r#"{
              "indis": [
                {"id": "I0", "fams": ["F0"]},
                {"id": "I1", "famc": "F0", "fams": ["F1", "F2"]},
                {"id": "I2", "fams": ["F1"]},
                {"id": "I3", "famc": "F1"},
                {"id": "I4", "fams": ["F2"]}
              ],
              "fams": [
                {"id": "F0", "husb": "I0", "children": ["I1"]},
                {"id": "F1", "husb": "I1", "wife": "I2", "children": ["I3"]},
                {"id": "F2", "husb": "I1", "wife": "I4"}
              ]
            }"#,
        )
        .expect("valid records")
    }

    fn renderer() -> Box<dyn NodeRenderer> {
        make_renderer(
            RendererKind::Simple,
            RendererOptions {
                fast_text_metrics: true,
                ..Default::default()
            },
        )
    }

    #[test]
    fn joined_root_keeps_index_zero() {
        let data = store();
        let mut renderer = renderer();
        let options = ChartOptions {
            start: Some(EntryId::indi("I1")),
            ..Default::default()
        };
        let chart = build_chart(&data, renderer.as_mut(), &options).expect("chart");
        assert_eq!(chart.nodes[0].id, "F1");
        assert!(chart.nodes[0].parent.is_none());
        for (index, node) in chart.nodes.iter().enumerate().skip(1) {
            let parent = node.parent.expect("non-root nodes have a parent");
            assert!(parent < chart.nodes.len());
            assert_ne!(parent, index);
        }
        let ancestor = chart.find("F0").expect("parents of I1");
        assert_eq!(ancestor.generation, -1);
        assert_eq!(ancestor.parent, Some(0));
    }

    #[test]
    fn remarried_start_drops_spouse_ancestry() {
        let data = store();
        let filters = filters_for(&data, ChartKind::Hourglass, &EntryId::indi("I1"));
        let up = filters.up.expect("up filter");
        assert!(!up.accepts(LinkType::SpouseParents));
        assert!(up.accepts(LinkType::IndiParents));
        let filters = filters_for(&data, ChartKind::Hourglass, &EntryId::indi("I2"));
        assert!(filters.up.expect("up filter").accepts(LinkType::SpouseParents));
    }

    #[test]
    fn empty_store_has_no_root() {
        let data = RecordStore::default();
        let mut renderer = renderer();
        let err = build_chart(&data, renderer.as_mut(), &ChartOptions::default()).expect_err("no root");
        assert!(matches!(err, ChartError::MissingRoot { .. }));
    }

    #[test]
    fn single_tree_charts() {
        let data = store();
        let mut renderer = renderer();
        for kind in [ChartKind::Ancestors, ChartKind::Descendants] {
            let options = ChartOptions {
                kind,
                start: Some(EntryId::indi("I1")),
                ..Default::default()
            };
            let chart = build_chart(&data, renderer.as_mut(), &options).expect("chart");
            let expected = if kind == ChartKind::Ancestors { -1 } else { 1 };
            assert!(chart.nodes.iter().skip(1).all(|node| node.generation.signum() == expected));
        }
    }
}
