use std::collections::{HashMap, HashSet};

use crate::data::DataProvider;
use crate::layout::PositionedNode;

/// Parent and child links of every individual in the record set, restricted
/// to individuals that resolve in the store.
#[derive(Debug, Default)]
struct Relatives<'a> {
    parents: HashMap<&'a str, Vec<&'a str>>,
    children: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> Relatives<'a> {
    fn index(data: &'a dyn DataProvider) -> Self {
        let mut relatives = Relatives::default();
        for fam in data.fams() {
            let parents: Vec<&str> = [fam.husb.as_deref(), fam.wife.as_deref()]
                .into_iter()
                .flatten()
                .filter(|id| data.indi(id).is_some())
                .collect();
            for child in fam.children.iter().map(String::as_str) {
                if data.indi(child).is_none() {
                    continue;
                }
                relatives
                    .parents
                    .entry(child)
                    .or_default()
                    .extend(parents.iter().copied());
                for &parent in &parents {
                    relatives.children.entry(parent).or_default().push(child);
                }
            }
        }
        relatives
    }

    fn any_hidden(&self, id: &str, displayed: &HashSet<&str>) -> bool {
        let hidden = |map: &HashMap<&'a str, Vec<&'a str>>| {
            map.get(id)
                .is_some_and(|ids| ids.iter().any(|other| !displayed.contains(other)))
        };
        hidden(&self.parents) || hidden(&self.children)
    }
}

/// Flags every displayed person whose recorded parents or children are not
/// part of the chart. A family box is flagged when one of its children is
/// missing, and a node when any of its boxes is.
pub(crate) fn mark_hidden_relatives(nodes: &mut [PositionedNode], data: &dyn DataProvider) {
    let relatives = Relatives::index(data);
    let owned: Vec<String> = nodes
        .iter()
        .flat_map(|node| node.person_ids().map(str::to_string))
        .collect();
    let displayed: HashSet<&str> = owned.iter().map(String::as_str).collect();

    let mut flagged = 0usize;
    for node in nodes.iter_mut() {
        let mut any = false;
        for entry in [node.indi.as_mut(), node.spouse.as_mut()].into_iter().flatten() {
            entry.hidden_relatives = relatives.any_hidden(&entry.id, &displayed);
            any |= entry.hidden_relatives;
        }
        if let Some(family) = node.family.as_mut() {
            family.hidden_relatives = data.fam(&family.id).is_some_and(|fam| {
                fam.children
                    .iter()
                    .any(|child| data.indi(child).is_some() && !displayed.contains(child.as_str()))
            });
            any |= family.hidden_relatives;
        }
        node.hidden_relatives = any;
        flagged += usize::from(any);
    }
    tracing::debug!(nodes = nodes.len(), flagged, "marked hidden relatives");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RecordStore;
    use crate::layout::EntryBox;

    fn node(indi: &str, spouse: Option<&str>, family: Option<&str>) -> PositionedNode {
        PositionedNode {
            id: indi.to_string(),
            node: 0,
            depth: 0,
            generation: 0,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            indi: Some(EntryBox::new(indi)),
            spouse: spouse.map(EntryBox::new),
            family: family.map(EntryBox::new),
            parent: None,
            link_from_parent: None,
            additional_marriage: false,
            duplicate_of: None,
            duplicated: false,
            link_stubs: Vec::new(),
            hidden_relatives: false,
        }
    }

    fn store() -> RecordStore {
        RecordStore::from_json(
            r#"{
              "indis": [
                {"id": "I1", "fams": ["F1"]},
                {"id": "I2", "fams": ["F1"]},
                {"id": "I3", "famc": "F1"},
                {"id": "I4", "famc": "F1"},
                {"id": "I5", "famc": "F2"}
              ],
              "fams": [
                {"id": "F1", "husb": "I1", "wife": "I2", "children": ["I3", "I4"]},
                {"id": "F2", "husb": "I3", "children": ["I5", "I9"]}
              ]
            }"#,
        )
        .expect("valid records")
    }

    #[test]
    fn displayed_parents_clear_the_flag() {
        let data = store();
        let mut nodes = vec![
            node("I1", Some("I2"), Some("F1")),
            node("I4", None, None),
        ];
        mark_hidden_relatives(&mut nodes, &data);
        assert!(!nodes[1].hidden_relatives);
        // I3 is a child of F1 and is not shown.
        assert!(nodes[0].hidden_relatives);
        assert!(nodes[0].family.as_ref().expect("family").hidden_relatives);
    }

    #[test]
    fn missing_parent_flags_the_child() {
        let data = store();
        let mut nodes = vec![node("I3", None, None)];
        mark_hidden_relatives(&mut nodes, &data);
        assert!(nodes[0].hidden_relatives);
        assert!(nodes[0].indi.as_ref().expect("indi").hidden_relatives);
    }

    #[test]
    fn dangling_references_are_ignored() {
        let data = store();
        // I9 is listed as a child of F2 but has no record; F2 has no wife.
        let mut nodes = vec![node("I3", None, None), node("I5", None, None)];
        mark_hidden_relatives(&mut nodes, &data);
        assert!(!nodes[1].hidden_relatives);
        // I3 still misses both parents.
        assert!(nodes[0].hidden_relatives);
    }
}
