pub mod composite;
mod links;
mod tree;
pub(crate) mod types;
pub use links::compute_links;
pub use types::*;

use std::collections::HashMap;

use crate::data::DataProvider;
use crate::hierarchy::{Hierarchy, NodeId};
use crate::renderer::NodeRenderer;

/// Positions the tree under `root`. Nodes come back in breadth-first order
/// with `parent` pointing into the returned list.
pub fn lay_out_tree(
    hierarchy: &Hierarchy,
    root: NodeId,
    renderer: &mut dyn NodeRenderer,
    data: &dyn DataProvider,
    options: &LayoutOptions,
) -> Vec<PositionedNode> {
    let order = hierarchy.descendants(root);
    let index_of: HashMap<NodeId, usize> = order
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index))
        .collect();

    let mut nodes: Vec<PositionedNode> = Vec::with_capacity(order.len());
    for &id in &order {
        let tree_node = hierarchy.node(id);
        assert!(
            tree_node.indi.is_some() || tree_node.spouse.is_some() || tree_node.family.is_some(),
            "hierarchy node {} has no individual, spouse or family",
            tree_node.id
        );
        let parent = if id == root {
            None
        } else {
            tree_node.parent.and_then(|parent| index_of.get(&parent).copied())
        };
        let depth = parent.map(|parent| nodes[parent].depth + 1).unwrap_or(0);
        let sign = if options.flip { -1 } else { 1 };
        nodes.push(PositionedNode {
            id: tree_node.id.clone(),
            node: id,
            depth,
            generation: depth as i32 * sign + options.base_generation,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            indi: tree_node.indi.as_deref().map(EntryBox::new),
            spouse: tree_node.spouse.as_deref().map(EntryBox::new),
            family: tree_node.family.as_deref().map(EntryBox::new),
            parent,
            link_from_parent: tree_node.link_from_parent,
            additional_marriage: tree_node.is_additional_marriage(),
            duplicate_of: tree_node
                .duplicate_of
                .map(|original| hierarchy.node(original).id.clone()),
            duplicated: tree_node.duplicated,
            link_stubs: tree_node.link_stubs.clone(),
            hidden_relatives: tree_node.hidden_relatives,
        });
    }
    if nodes.is_empty() {
        return nodes;
    }

    renderer.update_nodes(&mut nodes, data, options.horizontal);

    let max_depth = nodes.iter().map(|node| node.depth).max().unwrap_or(0);
    let mut growth_sizes = vec![0.0f32; max_depth + 1];
    for node in &nodes {
        let size = if options.horizontal { node.width } else { node.height };
        growth_sizes[node.depth] = growth_sizes[node.depth].max(size);
    }
    for node in nodes.iter_mut() {
        if options.horizontal {
            node.width = growth_sizes[node.depth];
        } else {
            node.height = growth_sizes[node.depth];
        }
    }

    let parents: Vec<Option<usize>> = nodes.iter().map(|node| node.parent).collect();
    let extents: Vec<f32> = nodes
        .iter()
        .map(|node| if options.horizontal { node.height } else { node.width })
        .collect();
    let cross = tree::pack(&parents, &extents, options.h_spacing);
    let offsets = tree::depth_offsets(&growth_sizes, options.v_spacing);

    for (node, cross) in nodes.iter_mut().zip(cross) {
        let growth = if options.flip {
            -offsets[node.depth]
        } else {
            offsets[node.depth]
        };
        (node.x, node.y) = if options.horizontal {
            (growth, cross)
        } else {
            (cross, growth)
        };
    }
    tracing::debug!(
        nodes = nodes.len(),
        depth = max_depth,
        flip = options.flip,
        horizontal = options.horizontal,
        "laid out tree"
    );
    nodes
}

pub fn chart_info(nodes: &[PositionedNode]) -> ChartInfo {
    bounds(nodes, MARGIN)
}

pub fn chart_info_without_margin(nodes: &[PositionedNode]) -> ChartInfo {
    bounds(nodes, 0.0)
}

fn bounds(nodes: &[PositionedNode], margin: f32) -> ChartInfo {
    if nodes.is_empty() {
        return ChartInfo {
            size: (2.0 * margin, 2.0 * margin),
            origin: (margin, margin),
        };
    }
    let x0 = nodes.iter().map(PositionedNode::left).fold(f32::INFINITY, f32::min) - margin;
    let y0 = nodes.iter().map(PositionedNode::top).fold(f32::INFINITY, f32::min) - margin;
    let x1 = nodes.iter().map(PositionedNode::right).fold(f32::NEG_INFINITY, f32::max) + margin;
    let y1 = nodes.iter().map(PositionedNode::bottom).fold(f32::NEG_INFINITY, f32::max) + margin;
    ChartInfo {
        size: (x1 - x0, y1 - y0),
        origin: (-x0, -y0),
    }
}
