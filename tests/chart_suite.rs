use std::collections::HashMap;
use std::path::Path;

use kinchart::chart::{ChartKind, ChartOptions, build_chart};
use kinchart::data::{DataProvider, RecordStore};
use kinchart::hierarchy::{
    ChildNodes, EntryId, Hierarchy, HierarchyFilters, LinkType, TreeNode, build_hierarchy,
};
use kinchart::layout::{ChartLayout, LayoutOptions, LinkKind, PositionedNode, lay_out_tree};
use kinchart::render::render_svg;
use kinchart::renderer::{NodeRenderer, RendererKind, RendererOptions, make_renderer};
use kinchart::theme::Theme;
use kinchart::ChartError;

const EPSILON: f32 = 0.01;

fn fixture(name: &str) -> RecordStore {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    RecordStore::from_path(&path).expect("fixture loads")
}

fn renderer(kind: RendererKind) -> Box<dyn NodeRenderer> {
    make_renderer(
        kind,
        RendererOptions {
            fast_text_metrics: true,
            ..Default::default()
        },
    )
}

fn chart(data: &RecordStore, kind: ChartKind, start: EntryId, horizontal: bool) -> ChartLayout {
    let mut renderer = renderer(RendererKind::Detailed);
    let options = ChartOptions {
        kind,
        start: Some(start),
        layout: LayoutOptions {
            horizontal,
            ..Default::default()
        },
    };
    build_chart(data, renderer.as_mut(), &options).expect("chart builds")
}

fn index_of(layout: &ChartLayout, id: &str) -> usize {
    layout
        .nodes
        .iter()
        .position(|node| node.id == id)
        .unwrap_or_else(|| panic!("node {id} missing"))
}

fn holds(node: &PositionedNode, person: &str) -> bool {
    node.person_ids().any(|id| id == person)
}

#[test]
fn nuclear_hourglass_generations() {
    let data = fixture("nuclear.json");
    let layout = chart(&data, ChartKind::Hourglass, EntryId::indi("I1"), false);

    let root = &layout.nodes[0];
    assert_eq!(root.generation, 0);
    assert!(holds(root, "I1") && holds(root, "I2"));
    assert_eq!(root.family.as_ref().map(|f| f.id.as_str()), Some("F1"));

    let grandparents = layout.find("F0").expect("ancestors shown");
    assert_eq!(grandparents.generation, -1);
    assert!(grandparents.y < root.y);

    for person in ["I3", "I4"] {
        let node = layout
            .nodes
            .iter()
            .find(|node| node.indi.as_ref().is_some_and(|indi| indi.id == person))
            .expect("child shown");
        assert_eq!(node.generation, 1, "{person}");
        assert!(node.y > root.y);
    }
    let grandchild = layout.find("I9").expect("grandchild shown");
    assert_eq!(grandchild.generation, 2);
}

#[test]
fn second_marriage_uses_dashed_link() {
    let data = fixture("nuclear.json");
    let layout = chart(&data, ChartKind::Hourglass, EntryId::indi("I1"), false);

    let first = index_of(&layout, "F2");
    let second = index_of(&layout, "F3");
    assert!(!layout.nodes[first].additional_marriage);
    assert!(layout.nodes[second].additional_marriage);
    assert!(holds(&layout.nodes[second], "I5"));
    assert!(holds(&layout.nodes[second], "I3"));

    let marriage_links: Vec<_> = layout
        .links
        .iter()
        .filter(|link| link.kind == LinkKind::AdditionalMarriage)
        .collect();
    assert_eq!(marriage_links.len(), 1);
    assert_eq!(marriage_links[0].from, second);
    assert_eq!(marriage_links[0].to, first);
    assert_eq!(marriage_links[0].points.len(), 2);

    assert!(
        !layout
            .links
            .iter()
            .any(|link| link.kind == LinkKind::Tree && link.to == second),
        "additional marriage must not get a tree edge"
    );
    for link in layout.links.iter().filter(|link| link.kind == LinkKind::Tree) {
        assert_eq!(link.points.len(), 4);
    }
}

#[test]
fn duplicate_convergence() {
    let data = fixture("cousins.json");
    let layout = chart(&data, ChartKind::Descendants, EntryId::indi("I1"), false);

    let copies: Vec<(usize, &PositionedNode)> = layout
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.family.as_ref().is_some_and(|fam| fam.id == "F4"))
        .collect();
    assert_eq!(copies.len(), 2);
    let (original_index, original) = copies[0];
    let (duplicate_index, duplicate) = copies[1];
    assert!(original.duplicated);
    assert!(original.duplicate_of.is_none());
    assert_eq!(duplicate.duplicate_of.as_deref(), Some(original.id.as_str()));

    let children_of = |index: usize| layout.nodes.iter().filter(|node| node.parent == Some(index)).count();
    assert_eq!(children_of(original_index), 1);
    assert_eq!(children_of(duplicate_index), 0);
}

#[test]
fn duplicates_point_at_matching_records() {
    let data = fixture("cousins.json");
    for kind in [ChartKind::Hourglass, ChartKind::Relatives, ChartKind::Descendants] {
        for indi in data.indis() {
            let hierarchy = build_hierarchy(&data, &EntryId::indi(indi.id.as_str()), &filters(kind))
                .expect("hierarchy builds");
            for node in &hierarchy.nodes {
                if let Some(original) = node.duplicate_of {
                    let original = hierarchy.node(original);
                    assert!(original.duplicated);
                    assert_eq!(original.entry, node.entry);
                }
            }
        }
    }
}

fn filters(kind: ChartKind) -> HierarchyFilters {
    match kind {
        ChartKind::Hourglass => HierarchyFilters::hourglass(),
        ChartKind::Ancestors => HierarchyFilters::ancestors(),
        ChartKind::Descendants => HierarchyFilters::descendants(),
        ChartKind::Relatives => HierarchyFilters::kinship(),
    }
}

#[test]
fn cyclic_records_terminate() {
    let data = fixture("cousins.json");
    let records = data.indis().count() + data.fams().count();
    for kind in [
        ChartKind::Hourglass,
        ChartKind::Ancestors,
        ChartKind::Descendants,
        ChartKind::Relatives,
    ] {
        for indi in data.indis() {
            let layout = chart(&data, kind, EntryId::indi(indi.id.as_str()), false);
            assert!(
                layout.nodes.len() <= 4 * records,
                "{kind:?} from {} produced {} nodes",
                indi.id,
                layout.nodes.len()
            );
        }
    }
}

#[test]
fn link_stubs_follow_the_filter() {
    let data = fixture("stubs.json");

    let ancestors = chart(&data, ChartKind::Ancestors, EntryId::indi("I1"), false);
    assert!(ancestors.nodes[0].link_stubs.contains(&LinkType::Children));
    assert!(ancestors.nodes[0].link_stubs.contains(&LinkType::IndiSiblings));

    let relatives = chart(&data, ChartKind::Relatives, EntryId::indi("I1"), false);
    assert!(!relatives.nodes[0].link_stubs.contains(&LinkType::Children));
    assert!(!relatives.nodes[0].link_stubs.contains(&LinkType::IndiParents));
    let children = relatives
        .nodes
        .iter()
        .filter(|node| node.parent == Some(0) && node.link_from_parent == Some(LinkType::Children))
        .count();
    assert_eq!(children, 3);
}

#[test]
fn hidden_relatives_marking() {
    let data = fixture("nuclear.json");

    let hourglass = chart(&data, ChartKind::Hourglass, EntryId::indi("I1"), false);
    assert!(hourglass.nodes.iter().all(|node| !node.hidden_relatives));

    let descendants = chart(&data, ChartKind::Descendants, EntryId::indi("I1"), false);
    let root = &descendants.nodes[0];
    assert!(root.hidden_relatives);
    assert!(root.indi.as_ref().expect("I1").hidden_relatives);
    assert!(!root.spouse.as_ref().expect("I2").hidden_relatives);
    let zofia = descendants.find("I4").expect("I4 shown");
    assert!(!zofia.hidden_relatives);

    let ancestors = chart(&data, ChartKind::Ancestors, EntryId::indi("I9"), false);
    // Zofia is a child of F1 but not an ancestor of Adam.
    let grandparents = ancestors.find("F1").expect("I9's grandparents");
    assert!(grandparents.hidden_relatives);
    assert!(grandparents.family.as_ref().expect("F1").hidden_relatives);
    assert!(!ancestors.find("F2").expect("I9's parents").hidden_relatives);
}

fn overlaps(a: (f32, f32), b: (f32, f32)) -> bool {
    a.0 < b.1 - EPSILON && b.0 < a.1 - EPSILON
}

#[test]
fn boxes_do_not_overlap() {
    for (file, start) in [("nuclear.json", "I1"), ("cousins.json", "I3"), ("stubs.json", "I1")] {
        let data = fixture(file);
        for horizontal in [false, true] {
            for kind in [ChartKind::Hourglass, ChartKind::Relatives] {
                let layout = chart(&data, kind, EntryId::indi(start), horizontal);
                for (i, a) in layout.nodes.iter().enumerate() {
                    for b in layout.nodes.iter().skip(i + 1) {
                        let x = overlaps((a.left(), a.right()), (b.left(), b.right()));
                        let y = overlaps((a.top(), a.bottom()), (b.top(), b.bottom()));
                        assert!(
                            !(x && y),
                            "{file} {kind:?} horizontal={horizontal}: {} overlaps {}",
                            a.id,
                            b.id
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn generations_share_their_growth_size() {
    let data = fixture("nuclear.json");
    let mut sizer = renderer(RendererKind::Detailed);
    for horizontal in [false, true] {
        let layout = chart(&data, ChartKind::Hourglass, EntryId::indi("I1"), horizontal);
        let growth = |(width, height): (f32, f32)| if horizontal { width } else { height };

        let mut person_sizes: HashMap<i32, f32> = HashMap::new();
        for node in &layout.nodes {
            for entry in [&node.indi, &node.spouse].into_iter().flatten() {
                let natural = growth(sizer.preferred_indi_size(&data, &entry.id));
                let size = person_sizes.entry(node.generation).or_insert(0.0);
                *size = size.max(natural);
            }
        }

        let mut largest: HashMap<i32, f32> = HashMap::new();
        for node in &layout.nodes {
            let persons = person_sizes.get(&node.generation).copied().unwrap_or(0.0);
            for entry in [&node.indi, &node.spouse].into_iter().flatten() {
                let laid_out = growth((entry.width, entry.height));
                assert!((laid_out - persons).abs() < EPSILON, "{} in {}", entry.id, node.id);
            }
            let has_persons = node.indi.is_some() || node.spouse.is_some();
            let family = node
                .family
                .as_ref()
                .map(|family| growth((family.width, family.height)))
                .unwrap_or(0.0);
            let natural = if has_persons { persons } else { 0.0 } + family;
            let size = largest.entry(node.generation).or_insert(0.0);
            *size = size.max(natural);
        }

        for node in &layout.nodes {
            let size = growth((node.width, node.height));
            let expected = largest[&node.generation];
            assert!(
                (expected - size).abs() < EPSILON,
                "generation {}: {} is {size}, largest natural size is {expected}",
                node.generation,
                node.id
            );
        }
    }
}

#[test]
fn orientation_keeps_sibling_order() {
    let data = fixture("nuclear.json");
    let vertical = chart(&data, ChartKind::Hourglass, EntryId::indi("I1"), false);
    let horizontal = chart(&data, ChartKind::Hourglass, EntryId::indi("I1"), true);

    let order = |layout: &ChartLayout, generation: i32, cross: fn(&PositionedNode) -> f32| {
        let mut nodes: Vec<&PositionedNode> = layout
            .nodes
            .iter()
            .filter(|node| node.generation == generation)
            .collect();
        nodes.sort_by(|a, b| cross(a).total_cmp(&cross(b)));
        nodes.into_iter().map(|node| node.id.clone()).collect::<Vec<_>>()
    };
    for generation in -1..=2 {
        assert_eq!(
            order(&vertical, generation, |node| node.x),
            order(&horizontal, generation, |node| node.y),
        );
    }
    for (v, h) in vertical.nodes.iter().zip(&horizontal.nodes) {
        assert_eq!(v.id, h.id);
        if let Some(parent) = v.parent {
            let grows_down = v.y > vertical.nodes[parent].y;
            let grows_right = h.x > horizontal.nodes[parent].x;
            assert_eq!(grows_down, grows_right, "{}", v.id);
        }
    }
}

#[test]
fn missing_start_is_reported() {
    let data = fixture("nuclear.json");
    let mut renderer = renderer(RendererKind::Simple);
    let options = ChartOptions {
        start: Some(EntryId::indi("I404")),
        ..Default::default()
    };
    let err = build_chart(&data, renderer.as_mut(), &options).expect_err("unknown start");
    assert!(matches!(err, ChartError::MissingRoot { ref id } if id == "I404"));
}

#[test]
fn start_from_family() {
    let data = fixture("nuclear.json");
    let layout = chart(&data, ChartKind::Hourglass, EntryId::fam("F2"), false);
    let root = &layout.nodes[0];
    assert_eq!(root.indi.as_ref().map(|e| e.id.as_str()), Some("I3"));
    assert_eq!(root.spouse.as_ref().map(|e| e.id.as_str()), Some("I6"));
    assert_eq!(layout.find("F1").expect("I3's parents").generation, -1);
}

#[test]
fn remarried_start_hides_spouse_ancestry() {
    let data = RecordStore::from_json(
        r#"{
          "indis": [
            {"id": "I1", "fams": ["F1", "F2"]},
            {"id": "I2", "famc": "F9", "fams": ["F1"]},
            {"id": "I3", "fams": ["F2"]},
            {"id": "I9", "fams": ["F9"]}
          ],
          "fams": [
            {"id": "F1", "husb": "I1", "wife": "I2"},
            {"id": "F2", "husb": "I1", "wife": "I3"},
            {"id": "F9", "husb": "I9", "children": ["I2"]}
          ]
        }"#,
    )
    .expect("valid records");
    let remarried = chart(&data, ChartKind::Hourglass, EntryId::indi("I1"), false);
    assert!(remarried.find("F9").is_none());
    let married_once = chart(&data, ChartKind::Hourglass, EntryId::indi("I2"), false);
    assert_eq!(married_once.find("F9").expect("I2's parents").generation, -1);
}

#[test]
fn ancestors_leave_out_step_parents() {
    // I7 remarried I20, whose parents are F8.
    let data = RecordStore::from_json(
        r#"{
          "indis": [
            {"id": "I1", "famc": "F0"},
            {"id": "I7", "fams": ["F0", "F9"]},
            {"id": "I8", "fams": ["F0"]},
            {"id": "I20", "famc": "F8", "fams": ["F9"]},
            {"id": "I21", "fams": ["F8"]},
            {"id": "I22", "fams": ["F8"]}
          ],
          "fams": [
            {"id": "F0", "husb": "I7", "wife": "I8", "children": ["I1"]},
            {"id": "F9", "husb": "I7", "wife": "I20"},
            {"id": "F8", "husb": "I21", "wife": "I22", "children": ["I20"]}
          ]
        }"#,
    )
    .expect("valid records");
    for kind in [ChartKind::Ancestors, ChartKind::Hourglass] {
        let layout = chart(&data, kind, EntryId::indi("I1"), false);
        assert_eq!(layout.find("F0").expect("I1's parents").generation, -1, "{kind:?}");
        assert!(layout.find("F9").is_none(), "{kind:?}: father's second marriage shown");
        assert!(layout.find("F8").is_none(), "{kind:?}: step-mother's parents shown");
    }
    let relatives = chart(&data, ChartKind::Relatives, EntryId::indi("I1"), false);
    assert!(relatives.find("F9").is_some());
}

#[test]
#[should_panic(expected = "has no individual, spouse or family")]
fn empty_node_is_a_builder_bug() {
    let data = fixture("nuclear.json");
    let hierarchy = Hierarchy {
        nodes: vec![TreeNode {
            id: "broken".to_string(),
            entry: EntryId::indi("I1"),
            indi: None,
            spouse: None,
            family: None,
            parent: None,
            link_from_parent: None,
            child_nodes: ChildNodes::default(),
            duplicate_of: None,
            duplicated: false,
            primary_marriage: None,
            link_stubs: Vec::new(),
            hidden_relatives: false,
        }],
        up_root: None,
        down_root: Some(0),
    };
    let mut renderer = renderer(RendererKind::Simple);
    lay_out_tree(&hierarchy, 0, renderer.as_mut(), &data, &LayoutOptions::default());
}

#[test]
fn render_all_fixtures() {
    for file in ["nuclear.json", "cousins.json", "stubs.json"] {
        let data = fixture(file);
        for kind in [RendererKind::Detailed, RendererKind::Simple, RendererKind::Circle] {
            let mut renderer = renderer(kind);
            let options = ChartOptions::default();
            let layout = build_chart(&data, renderer.as_mut(), &options).expect("chart builds");
            let svg = render_svg(&layout, &data, renderer.as_mut(), &Theme::classic());
            assert!(svg.contains("<svg"), "{file}: missing <svg tag");
            assert!(svg.contains("</svg>"), "{file}: missing </svg tag");
            assert_eq!(
                svg.matches("class=\"node ").count(),
                layout.nodes.len(),
                "{file} {kind:?}"
            );
        }
    }
}
