//! Geometry of nodes made of an individual box, an optional spouse box and
//! an optional family box. Person boxes sit side by side across the tree;
//! the family box follows them along the growth axis.

use std::collections::HashMap;

use crate::data::DataProvider;
use crate::renderer::NodeRenderer;

use super::types::{EntryBox, PositionedNode};

/// Asks the renderer for natural box sizes, aligns person boxes per depth
/// and sets the size of each whole node.
pub fn update_composite_nodes<R: NodeRenderer + ?Sized>(
    renderer: &mut R,
    nodes: &mut [PositionedNode],
    data: &dyn DataProvider,
    horizontal: bool,
) {
    let mut indi_v_size_per_depth: HashMap<usize, f32> = HashMap::new();
    for node in nodes.iter_mut() {
        for person in [node.indi.as_mut(), node.spouse.as_mut()].into_iter().flatten() {
            let (width, height) = renderer.preferred_indi_size(data, &person.id);
            person.width = width;
            person.height = height;
        }
        if let Some(family) = node.family.as_mut() {
            let (width, height) = renderer.preferred_fam_size(data, &family.id);
            family.width = width;
            family.height = height;
        }
        let size = indi_v_size(node, horizontal);
        let entry = indi_v_size_per_depth.entry(node.depth).or_insert(0.0);
        *entry = entry.max(size);
    }

    for node in nodes.iter_mut() {
        let v_size = indi_v_size_per_depth
            .get(&node.depth)
            .copied()
            .unwrap_or_default();
        for person in [node.indi.as_mut(), node.spouse.as_mut()].into_iter().flatten() {
            if horizontal {
                person.width = v_size;
            } else {
                person.height = v_size;
            }
        }
        let v = node_v_size(node, horizontal);
        let h = node_h_size(node, horizontal);
        (node.width, node.height) = if horizontal { (v, h) } else { (h, v) };
    }
}

fn width_of(entry: Option<&EntryBox>) -> f32 {
    entry.map(|e| e.width).unwrap_or(0.0)
}

fn height_of(entry: Option<&EntryBox>) -> f32 {
    entry.map(|e| e.height).unwrap_or(0.0)
}

/// Size of the person boxes along the growth axis.
pub fn indi_v_size(node: &PositionedNode, horizontal: bool) -> f32 {
    if horizontal {
        width_of(node.indi.as_ref()).max(width_of(node.spouse.as_ref()))
    } else {
        height_of(node.indi.as_ref()).max(height_of(node.spouse.as_ref()))
    }
}

pub fn fam_v_size(node: &PositionedNode, horizontal: bool) -> f32 {
    if horizontal {
        width_of(node.family.as_ref())
    } else {
        height_of(node.family.as_ref())
    }
}

pub fn node_v_size(node: &PositionedNode, horizontal: bool) -> f32 {
    indi_v_size(node, horizontal) + fam_v_size(node, horizontal)
}

pub fn node_h_size(node: &PositionedNode, horizontal: bool) -> f32 {
    if horizontal {
        return height_of(node.indi.as_ref()) + height_of(node.spouse.as_ref());
    }
    let persons = width_of(node.indi.as_ref()) + width_of(node.spouse.as_ref());
    persons.max(width_of(node.family.as_ref()))
}

/// Offset of the family box from the left edge of the person boxes
/// (vertical layout). Negative when the family box sticks out on the left.
pub fn fam_position_vertical(node: &PositionedNode) -> f32 {
    let indi_width = width_of(node.indi.as_ref());
    let spouse_width = width_of(node.spouse.as_ref());
    let family_width = width_of(node.family.as_ref());
    if node.indi.is_none() || node.spouse.is_none() || indi_width + spouse_width <= family_width {
        return (indi_width + spouse_width - family_width) / 2.0;
    }
    if family_width / 2.0 >= spouse_width {
        return indi_width + spouse_width - family_width;
    }
    if family_width / 2.0 >= indi_width {
        return 0.0;
    }
    indi_width - family_width / 2.0
}

/// Offset of the family box from the top edge of the person boxes
/// (horizontal layout).
pub fn fam_position_horizontal(node: &PositionedNode) -> f32 {
    let indi_height = height_of(node.indi.as_ref());
    let spouse_height = height_of(node.spouse.as_ref());
    let family_height = height_of(node.family.as_ref());
    if node.indi.is_none() || node.spouse.is_none() {
        return (indi_height + spouse_height - family_height) / 2.0;
    }
    indi_height - family_height / 2.0
}

/// Shift applied to the person boxes when the family box overhangs them.
pub fn persons_offset(node: &PositionedNode, horizontal: bool) -> f32 {
    if node.family.is_none() {
        return 0.0;
    }
    if horizontal {
        (-fam_position_horizontal(node)).max(0.0)
    } else {
        (-fam_position_vertical(node)).max(0.0)
    }
}

/// Top-left corner of the family box relative to the node's top-left corner.
pub fn family_box_origin(node: &PositionedNode, horizontal: bool) -> (f32, f32) {
    let along = node
        .indi
        .as_ref()
        .or(node.spouse.as_ref())
        .map(|person| if horizontal { person.width } else { person.height })
        .unwrap_or(0.0);
    if horizontal {
        (along, fam_position_horizontal(node).max(0.0))
    } else {
        (fam_position_vertical(node).max(0.0), along)
    }
}

/// Top-left corner of the spouse box relative to the node's top-left corner.
pub fn spouse_box_origin(node: &PositionedNode, horizontal: bool) -> (f32, f32) {
    let offset = persons_offset(node, horizontal);
    if horizontal {
        (0.0, height_of(node.indi.as_ref()) + offset)
    } else {
        (width_of(node.indi.as_ref()) + offset, 0.0)
    }
}

/// Top-left corner of the individual box relative to the node's top-left corner.
pub fn indi_box_origin(node: &PositionedNode, horizontal: bool) -> (f32, f32) {
    let offset = persons_offset(node, horizontal);
    if horizontal { (0.0, offset) } else { (offset, 0.0) }
}

pub fn family_anchor(node: &PositionedNode, horizontal: bool) -> (f32, f32) {
    let couple = node.indi.is_some() && node.spouse.is_some();
    if horizontal {
        let x = -node.width / 2.0 + indi_v_size(node, horizontal) / 2.0;
        let inner = if couple {
            node.height / 2.0 - height_of(node.indi.as_ref())
        } else {
            0.0
        };
        return (x, -inner + persons_offset(node, horizontal));
    }
    let inner = if couple {
        node.width / 2.0 - width_of(node.indi.as_ref())
    } else {
        0.0
    };
    let y = -node.height / 2.0 + indi_v_size(node, horizontal) / 2.0;
    (-inner + persons_offset(node, horizontal), y)
}

pub fn spouse_anchor(node: &PositionedNode, horizontal: bool) -> (f32, f32) {
    if horizontal {
        let x = -node.width / 2.0 + indi_v_size(node, horizontal) / 2.0;
        return (x, height_of(node.indi.as_ref()) / 2.0);
    }
    let y = -node.height / 2.0 + indi_v_size(node, horizontal) / 2.0;
    (width_of(node.indi.as_ref()) / 2.0, y)
}

pub fn indi_anchor(node: &PositionedNode, horizontal: bool) -> (f32, f32) {
    if horizontal {
        let x = -node.width / 2.0 + indi_v_size(node, horizontal) / 2.0;
        return (x, -height_of(node.spouse.as_ref()) / 2.0);
    }
    let y = -node.height / 2.0 + indi_v_size(node, horizontal) / 2.0;
    (-width_of(node.spouse.as_ref()) / 2.0, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(indi: Option<(f32, f32)>, spouse: Option<(f32, f32)>, family: Option<(f32, f32)>) -> PositionedNode {
        let entry = |id: &str, size: Option<(f32, f32)>| {
            size.map(|(width, height)| EntryBox {
                id: id.to_string(),
                width,
                height,
                hidden_relatives: false,
            })
        };
        PositionedNode {
            id: "n".to_string(),
            node: 0,
            depth: 0,
            generation: 0,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            indi: entry("I1", indi),
            spouse: entry("I2", spouse),
            family: entry("F1", family),
            parent: None,
            link_from_parent: None,
            additional_marriage: false,
            duplicate_of: None,
            duplicated: false,
            link_stubs: Vec::new(),
            hidden_relatives: false,
        }
    }

    #[test]
    fn family_wider_than_couple_is_centered() {
        let n = node(Some((40.0, 30.0)), Some((40.0, 30.0)), Some((100.0, 20.0)));
        assert_eq!(fam_position_vertical(&n), -10.0);
        assert_eq!(persons_offset(&n, false), 10.0);
    }

    #[test]
    fn family_box_clamps_towards_the_side_with_slack() {
        // Wide spouse: the family box starts at the indi/spouse boundary minus half its width.
        let n = node(Some((80.0, 30.0)), Some((80.0, 30.0)), Some((60.0, 20.0)));
        assert_eq!(fam_position_vertical(&n), 50.0);
        // Narrow spouse: the family box is pushed right so it ends with the spouse.
        let n = node(Some((80.0, 30.0)), Some((20.0, 30.0)), Some((60.0, 20.0)));
        assert_eq!(fam_position_vertical(&n), 40.0);
        // Narrow indi: the family box starts at the left edge.
        let n = node(Some((20.0, 30.0)), Some((80.0, 30.0)), Some((60.0, 20.0)));
        assert_eq!(fam_position_vertical(&n), 0.0);
    }

    #[test]
    fn sizes_stack_family_under_couple() {
        let n = node(Some((40.0, 30.0)), Some((50.0, 35.0)), Some((20.0, 10.0)));
        assert_eq!(node_h_size(&n, false), 90.0);
        assert_eq!(node_v_size(&n, false), 45.0);
        assert_eq!(node_h_size(&n, true), 65.0);
        assert_eq!(node_v_size(&n, true), 70.0);
    }

    #[test]
    fn anchors_of_a_couple() {
        let mut n = node(Some((40.0, 30.0)), Some((60.0, 30.0)), Some((20.0, 10.0)));
        n.width = node_h_size(&n, false);
        n.height = node_v_size(&n, false);
        assert_eq!(indi_anchor(&n, false), (-30.0, -5.0));
        assert_eq!(spouse_anchor(&n, false), (20.0, -5.0));
        assert_eq!(family_anchor(&n, false), (-10.0, -5.0));
    }
}
