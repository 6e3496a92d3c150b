use crate::hierarchy::LinkType;
use crate::renderer::NodeRenderer;

use super::types::{LinkKind, LinkLayout, PositionedNode};

/// Paths connecting every node to its parent, or to the sibling that holds
/// the earlier marriage of the same person.
pub fn compute_links(
    nodes: &[PositionedNode],
    renderer: &dyn NodeRenderer,
    horizontal: bool,
) -> Vec<LinkLayout> {
    let mut links = Vec::new();
    for (index, node) in nodes.iter().enumerate() {
        let Some(parent) = node.parent else {
            continue;
        };
        if node.additional_marriage
            && let Some(link) = additional_marriage_link(nodes, index, parent, renderer, horizontal)
        {
            links.push(link);
            continue;
        }
        links.push(tree_link(nodes, parent, index, renderer, horizontal));
    }
    links
}

fn absolute(node: &PositionedNode, anchor: (f32, f32)) -> (f32, f32) {
    (node.x + anchor.0, node.y + anchor.1)
}

/// Anchor on the tree parent for a child reached through `link`.
fn parent_side_anchor(
    renderer: &dyn NodeRenderer,
    node: &PositionedNode,
    link: Option<LinkType>,
    horizontal: bool,
) -> (f32, f32) {
    match link {
        Some(LinkType::IndiParents | LinkType::IndiSiblings) => renderer.indi_anchor(node, horizontal),
        Some(LinkType::SpouseParents | LinkType::SpouseSiblings) => {
            renderer.spouse_anchor(node, horizontal)
        }
        Some(LinkType::Children) | None => renderer.family_anchor(node, horizontal),
    }
}

/// Anchor on the tree child reached through `link`.
fn child_side_anchor(
    renderer: &dyn NodeRenderer,
    node: &PositionedNode,
    link: Option<LinkType>,
    horizontal: bool,
) -> (f32, f32) {
    match link {
        Some(LinkType::IndiParents | LinkType::SpouseParents) => {
            renderer.family_anchor(node, horizontal)
        }
        _ => renderer.indi_anchor(node, horizontal),
    }
}

fn tree_link(
    nodes: &[PositionedNode],
    parent: usize,
    child: usize,
    renderer: &dyn NodeRenderer,
    horizontal: bool,
) -> LinkLayout {
    let (parent_node, child_node) = (&nodes[parent], &nodes[child]);
    let link = child_node.link_from_parent;
    let parent_point = absolute(
        parent_node,
        parent_side_anchor(renderer, parent_node, link, horizontal),
    );
    let child_point = absolute(
        child_node,
        child_side_anchor(renderer, child_node, link, horizontal),
    );

    // The path always runs from the older generation to the younger one.
    let ((s, (sx, sy)), (d, (dx, dy))) = if parent_node.generation > child_node.generation {
        ((child_node, child_point), (parent_node, parent_point))
    } else {
        ((parent_node, parent_point), (child_node, child_point))
    };

    let points = if horizontal {
        let mid = (s.right() + d.left()) / 2.0;
        vec![(sx, sy), (mid, sy), (mid, dy), (dx, dy)]
    } else {
        let mid = (s.bottom() + d.top()) / 2.0;
        vec![(sx, sy), (sx, mid), (dx, mid), (dx, dy)]
    };
    LinkLayout {
        from: parent,
        to: child,
        kind: LinkKind::Tree,
        points,
    }
}

fn slot_anchor(
    renderer: &dyn NodeRenderer,
    node: &PositionedNode,
    person: &str,
    horizontal: bool,
) -> (f32, f32) {
    if node.spouse.as_ref().is_some_and(|spouse| spouse.id == person)
        && node.indi.as_ref().is_none_or(|indi| indi.id != person)
    {
        return renderer.spouse_anchor(node, horizontal);
    }
    renderer.indi_anchor(node, horizontal)
}

fn additional_marriage_link(
    nodes: &[PositionedNode],
    index: usize,
    parent: usize,
    renderer: &dyn NodeRenderer,
    horizontal: bool,
) -> Option<LinkLayout> {
    let node = &nodes[index];
    let (sibling, person) = (0..index).rev().find_map(|candidate| {
        let other = &nodes[candidate];
        if other.parent != Some(parent) {
            return None;
        }
        node.person_ids()
            .find(|person| other.person_ids().any(|id| id == *person))
            .map(|person| (candidate, person.to_string()))
    })?;
    let start = absolute(node, slot_anchor(renderer, node, &person, horizontal));
    let end = absolute(
        &nodes[sibling],
        slot_anchor(renderer, &nodes[sibling], &person, horizontal),
    );
    Some(LinkLayout {
        from: index,
        to: sibling,
        kind: LinkKind::AdditionalMarriage,
        points: vec![start, end],
    })
}
