//! Turns the record graph into rooted, duplicate-aware display trees.
//!
//! Nodes are created breadth-first. Every individual or family gets a node
//! the first time it is reached; later encounters produce a copy that points
//! back at the first one through `duplicate_of` and is never expanded.

use crate::data::DataProvider;
use crate::error::ChartError;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

pub type NodeId = usize;

/// Id of an individual or a family record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryId {
    Indi(String),
    Fam(String),
}

impl EntryId {
    pub fn indi(id: impl Into<String>) -> Self {
        EntryId::Indi(id.into())
    }

    pub fn fam(id: impl Into<String>) -> Self {
        EntryId::Fam(id.into())
    }

    pub fn id(&self) -> &str {
        match self {
            EntryId::Indi(id) | EntryId::Fam(id) => id,
        }
    }

    pub fn is_fam(&self) -> bool {
        matches!(self, EntryId::Fam(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkType {
    IndiParents,
    IndiSiblings,
    SpouseParents,
    SpouseSiblings,
    Children,
}

impl LinkType {
    pub const ALL: [LinkType; 5] = [
        LinkType::IndiParents,
        LinkType::IndiSiblings,
        LinkType::SpouseParents,
        LinkType::SpouseSiblings,
        LinkType::Children,
    ];

    /// The relation seen from the other end of a link.
    pub fn other_side(self) -> LinkType {
        match self {
            LinkType::IndiParents | LinkType::SpouseParents => LinkType::Children,
            LinkType::IndiSiblings | LinkType::SpouseSiblings => LinkType::IndiSiblings,
            LinkType::Children => LinkType::IndiParents,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalFilter {
    pub indi_parents: bool,
    pub indi_siblings: bool,
    pub spouse_parents: bool,
    pub spouse_siblings: bool,
    pub children: bool,
}

impl TraversalFilter {
    pub fn all_accepting() -> Self {
        Self {
            indi_parents: true,
            indi_siblings: true,
            spouse_parents: true,
            spouse_siblings: true,
            children: true,
        }
    }

    pub fn all_rejecting() -> Self {
        Self {
            indi_parents: false,
            indi_siblings: false,
            spouse_parents: false,
            spouse_siblings: false,
            children: false,
        }
    }

    pub fn with(mut self, link: LinkType, accept: bool) -> Self {
        match link {
            LinkType::IndiParents => self.indi_parents = accept,
            LinkType::IndiSiblings => self.indi_siblings = accept,
            LinkType::SpouseParents => self.spouse_parents = accept,
            LinkType::SpouseSiblings => self.spouse_siblings = accept,
            LinkType::Children => self.children = accept,
        }
        self
    }

    pub fn accepts(&self, link: LinkType) -> bool {
        match link {
            LinkType::IndiParents => self.indi_parents,
            LinkType::IndiSiblings => self.indi_siblings,
            LinkType::SpouseParents => self.spouse_parents,
            LinkType::SpouseSiblings => self.spouse_siblings,
            LinkType::Children => self.children,
        }
    }
}

/// Filters for both roots and for everything reached below them.
/// A `None` root filter means that tree is not built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyFilters {
    pub up: Option<TraversalFilter>,
    pub down: Option<TraversalFilter>,
    pub up_indirect: TraversalFilter,
    pub down_indirect: TraversalFilter,
    /// Whether walking to a person's parents also reaches the parents'
    /// other marriages. Off, only the family the person was born into is shown.
    pub parent_remarriages: bool,
}

impl HierarchyFilters {
    fn parents_and_siblings() -> TraversalFilter {
        TraversalFilter::all_rejecting()
            .with(LinkType::IndiParents, true)
            .with(LinkType::SpouseParents, true)
            .with(LinkType::IndiSiblings, true)
            .with(LinkType::SpouseSiblings, true)
    }

    fn parents_only() -> TraversalFilter {
        TraversalFilter::all_rejecting()
            .with(LinkType::IndiParents, true)
            .with(LinkType::SpouseParents, true)
    }

    fn children_only() -> TraversalFilter {
        TraversalFilter::all_rejecting().with(LinkType::Children, true)
    }

    /// Full kinship: once the walk branches sideways everything reachable is shown.
    pub fn kinship() -> Self {
        Self {
            up: Some(Self::parents_and_siblings()),
            down: Some(Self::children_only()),
            up_indirect: TraversalFilter::all_accepting(),
            down_indirect: TraversalFilter::all_accepting(),
            parent_remarriages: true,
        }
    }

    /// Direct ancestors above the root, direct descendants below it.
    pub fn hourglass() -> Self {
        Self {
            up: Some(Self::parents_only()),
            down: Some(Self::children_only()),
            up_indirect: Self::parents_only(),
            down_indirect: Self::children_only(),
            parent_remarriages: false,
        }
    }

    pub fn ancestors() -> Self {
        Self {
            down: None,
            ..Self::hourglass()
        }
    }

    pub fn descendants() -> Self {
        Self {
            up: None,
            ..Self::hourglass()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildNodes {
    pub indi_parents: Vec<NodeId>,
    pub indi_siblings: Vec<NodeId>,
    pub spouse_parents: Vec<NodeId>,
    pub spouse_siblings: Vec<NodeId>,
    pub children: Vec<NodeId>,
}

impl ChildNodes {
    pub fn get(&self, link: LinkType) -> &[NodeId] {
        match link {
            LinkType::IndiParents => &self.indi_parents,
            LinkType::IndiSiblings => &self.indi_siblings,
            LinkType::SpouseParents => &self.spouse_parents,
            LinkType::SpouseSiblings => &self.spouse_siblings,
            LinkType::Children => &self.children,
        }
    }

    fn get_mut(&mut self, link: LinkType) -> &mut Vec<NodeId> {
        match link {
            LinkType::IndiParents => &mut self.indi_parents,
            LinkType::IndiSiblings => &mut self.indi_siblings,
            LinkType::SpouseParents => &mut self.spouse_parents,
            LinkType::SpouseSiblings => &mut self.spouse_siblings,
            LinkType::Children => &mut self.children,
        }
    }

    /// Child order used for layout: indi parents, indi siblings, spouse
    /// parents, spouse siblings, children.
    pub fn all(&self) -> impl Iterator<Item = NodeId> + '_ {
        LinkType::ALL
            .into_iter()
            .flat_map(move |link| self.get(link).iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        LinkType::ALL.iter().all(|link| self.get(*link).is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Synthetic id, unique within one build.
    pub id: String,
    pub entry: EntryId,
    pub indi: Option<String>,
    pub spouse: Option<String>,
    pub family: Option<String>,
    pub parent: Option<NodeId>,
    pub link_from_parent: Option<LinkType>,
    pub child_nodes: ChildNodes,
    pub duplicate_of: Option<NodeId>,
    pub duplicated: bool,
    pub primary_marriage: Option<NodeId>,
    pub link_stubs: Vec<LinkType>,
    pub hidden_relatives: bool,
}

impl TreeNode {
    fn new(entry: EntryId, parent: Option<NodeId>, link: Option<LinkType>) -> Self {
        let family = entry.is_fam().then(|| entry.id().to_string());
        Self {
            id: entry.id().to_string(),
            entry,
            indi: None,
            spouse: None,
            family,
            parent,
            link_from_parent: link,
            child_nodes: ChildNodes::default(),
            duplicate_of: None,
            duplicated: false,
            primary_marriage: None,
            link_stubs: Vec::new(),
            hidden_relatives: false,
        }
    }

    pub fn is_fam_node(&self) -> bool {
        self.family.is_some()
    }

    /// Whether this node is a later marriage of a person shown in an earlier sibling node.
    pub fn is_additional_marriage(&self) -> bool {
        self.primary_marriage.is_some()
    }

    /// Individuals displayed in this node.
    pub fn persons(&self) -> impl Iterator<Item = &str> {
        self.indi.iter().chain(self.spouse.iter()).map(String::as_str)
    }
}

/// Issues synthetic node ids: the first use of an id returns it unchanged,
/// later uses return `id:1`, `id:2`, ...
#[derive(Debug, Default)]
pub struct IdGenerator {
    counts: HashMap<String, usize>,
}

impl IdGenerator {
    pub fn get_id(&mut self, id: &str) -> String {
        let count = self.counts.entry(id.to_string()).or_insert(0);
        let result = if *count == 0 {
            id.to_string()
        } else {
            format!("{id}:{count}")
        };
        *count += 1;
        result
    }
}

#[derive(Debug, Clone)]
pub struct Hierarchy {
    pub nodes: Vec<TreeNode>,
    pub up_root: Option<NodeId>,
    pub down_root: Option<NodeId>,
}

impl Hierarchy {
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id].child_nodes.all().collect()
    }

    /// Nodes of the tree under `root` in breadth-first order, root first.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(self.nodes[id].child_nodes.all());
        }
        order
    }

    /// Stubs of the shared root: a relation counts as hidden only when
    /// neither tree shows it.
    pub fn root_stubs(&self) -> Vec<LinkType> {
        match (self.up_root, self.down_root) {
            (Some(up), Some(down)) => {
                let down_stubs = &self.nodes[down].link_stubs;
                self.nodes[up]
                    .link_stubs
                    .iter()
                    .copied()
                    .filter(|link| down_stubs.contains(link))
                    .collect()
            }
            (Some(root), None) | (None, Some(root)) => self.nodes[root].link_stubs.clone(),
            (None, None) => Vec::new(),
        }
    }
}

pub fn build_hierarchy<D: DataProvider + ?Sized>(
    data: &D,
    start: &EntryId,
    filters: &HierarchyFilters,
) -> Result<Hierarchy, ChartError> {
    HierarchyCreator::new(data).create(start, filters)
}

struct HierarchyCreator<'a, D: DataProvider + ?Sized> {
    data: &'a D,
    nodes: Vec<TreeNode>,
    queued_by_entry: HashMap<EntryId, NodeId>,
    ids: IdGenerator,
    parent_remarriages: bool,
}

impl<'a, D: DataProvider + ?Sized> HierarchyCreator<'a, D> {
    fn new(data: &'a D) -> Self {
        Self {
            data,
            nodes: Vec::new(),
            queued_by_entry: HashMap::new(),
            ids: IdGenerator::default(),
            parent_remarriages: true,
        }
    }

    /// Re-anchors a start individual on their first usable spousal family.
    fn expand_start(&self, start: &EntryId) -> Result<(EntryId, Option<String>), ChartError> {
        match start {
            EntryId::Fam(id) => {
                if self.data.fam(id).is_none() {
                    return Err(ChartError::missing_root(id));
                }
                Ok((start.clone(), None))
            }
            EntryId::Indi(id) => {
                let indi = self
                    .data
                    .indi(id)
                    .ok_or_else(|| ChartError::missing_root(id))?;
                let fams_id = indi
                    .fams
                    .iter()
                    .find(|fam_id| self.data.fam(fam_id).is_some_and(|fam| fam.has_parents()));
                match fams_id {
                    Some(fam_id) => Ok((EntryId::fam(fam_id.as_str()), Some(id.clone()))),
                    None => Ok((start.clone(), None)),
                }
            }
        }
    }

    fn create(mut self, start: &EntryId, filters: &HierarchyFilters) -> Result<Hierarchy, ChartError> {
        let (start_entry, start_indi) = self.expand_start(start)?;
        self.parent_remarriages = filters.parent_remarriages;
        let mut queue: VecDeque<(NodeId, TraversalFilter, TraversalFilter)> = VecDeque::new();

        let mut up_root = None;
        if let Some(filter) = filters.up {
            let root = self.create_root(&start_entry, start_indi.as_deref(), start)?;
            queue.push_back((root, filter, filters.up_indirect));
            up_root = Some(root);
        }
        let mut down_root = None;
        if let Some(filter) = filters.down {
            let root = self.create_root(&start_entry, start_indi.as_deref(), start)?;
            queue.push_back((root, filter, filters.down_indirect));
            down_root = Some(root);
        }

        while let Some((node, filter, indirect)) = queue.pop_front() {
            self.fill_node_data(node, &filter);
            for child in self.nodes[node].child_nodes.all() {
                queue.push_back((child, indirect, indirect));
            }
        }

        tracing::debug!(
            nodes = self.nodes.len(),
            duplicates = self.nodes.iter().filter(|n| n.duplicate_of.is_some()).count(),
            "hierarchy built"
        );
        Ok(Hierarchy {
            nodes: self.nodes,
            up_root,
            down_root,
        })
    }

    fn create_root(
        &mut self,
        entry: &EntryId,
        start_indi: Option<&str>,
        start: &EntryId,
    ) -> Result<NodeId, ChartError> {
        let root = self
            .id_to_node(entry.clone(), None, None, false)
            .ok_or_else(|| ChartError::missing_root(start.id()))?;
        self.nodes[root].indi = start_indi.map(str::to_string);
        Ok(root)
    }

    fn fill_node_data(&mut self, node_id: NodeId, filter: &TraversalFilter) {
        let data = self.data;
        let entry = self.nodes[node_id].entry.clone();
        let expand = self.nodes[node_id].duplicate_of.is_none();
        match &entry {
            EntryId::Fam(fam_id) => {
                let Some(fam) = data.fam(fam_id) else {
                    return;
                };
                let arrived_as_mother = self.nodes[node_id].indi.is_some()
                    && self.nodes[node_id].indi.as_deref() == fam.mother();
                let (indi, spouse) = if arrived_as_mother {
                    (fam.mother(), fam.father())
                } else {
                    (fam.father(), fam.mother())
                };
                let node = &mut self.nodes[node_id];
                node.id = self.ids.get_id(fam_id);
                node.indi = indi.map(str::to_string);
                node.spouse = spouse.map(str::to_string);
                if expand {
                    self.nodes[node_id].child_nodes =
                        self.child_nodes_for_fam(&fam.children, node_id, filter);
                }
            }
            EntryId::Indi(indi_id) => {
                let node = &mut self.nodes[node_id];
                node.id = self.ids.get_id(indi_id);
                node.indi = Some(indi_id.clone());
                if expand {
                    self.nodes[node_id].child_nodes = self.child_nodes_for_indi(indi_id, node_id, filter);
                }
            }
        }
        self.nodes[node_id].link_stubs = self.create_link_stubs(node_id);
        tracing::trace!(
            node = %self.nodes[node_id].id,
            children = self.nodes[node_id].child_nodes.all().count(),
            "filled node"
        );
    }

    fn child_nodes_for_fam(
        &mut self,
        children: &[String],
        parent: NodeId,
        filter: &TraversalFilter,
    ) -> ChildNodes {
        let indi = self.nodes[parent].indi.clone();
        let spouse = self.nodes[parent].spouse.clone();
        let (indi_parents, indi_siblings) = self.parents_and_siblings(indi.as_deref());
        let (spouse_parents, spouse_siblings) = self.parents_and_siblings(spouse.as_deref());

        let mut result = ChildNodes::default();
        if filter.indi_parents {
            result.indi_parents =
                self.fam_as_spouse_ids_to_nodes(&indi_parents, parent, LinkType::IndiParents);
        }
        if filter.indi_siblings {
            result.indi_siblings =
                self.indi_ids_to_fam_as_spouse_nodes(&indi_siblings, parent, LinkType::IndiSiblings);
        }
        if filter.spouse_parents {
            result.spouse_parents =
                self.fam_as_spouse_ids_to_nodes(&spouse_parents, parent, LinkType::SpouseParents);
        }
        if filter.spouse_siblings {
            result.spouse_siblings = self.indi_ids_to_fam_as_spouse_nodes(
                &spouse_siblings,
                parent,
                LinkType::SpouseSiblings,
            );
        }
        if filter.children {
            result.children =
                self.indi_ids_to_fam_as_spouse_nodes(children, parent, LinkType::Children);
        }
        result
    }

    fn child_nodes_for_indi(
        &mut self,
        indi_id: &str,
        parent: NodeId,
        filter: &TraversalFilter,
    ) -> ChildNodes {
        let (parents, siblings) = self.parents_and_siblings(Some(indi_id));
        let mut result = ChildNodes::default();
        if filter.indi_parents {
            *result.get_mut(LinkType::IndiParents) =
                self.fam_as_spouse_ids_to_nodes(&parents, parent, LinkType::IndiParents);
        }
        if filter.indi_siblings {
            *result.get_mut(LinkType::IndiSiblings) =
                self.indi_ids_to_fam_as_spouse_nodes(&siblings, parent, LinkType::IndiSiblings);
        }
        result
    }

    /// Families of the parents (the family as child first, then the
    /// parents' other marriages when enabled) and the ids of the siblings.
    fn parents_and_siblings(&self, indi_id: Option<&str>) -> (Vec<String>, Vec<String>) {
        let Some(indi) = indi_id.and_then(|id| self.data.indi(id)) else {
            return (Vec::new(), Vec::new());
        };
        let Some(famc_id) = indi.famc.as_deref() else {
            return (Vec::new(), Vec::new());
        };
        let Some(famc) = self.data.fam(famc_id) else {
            return (Vec::new(), Vec::new());
        };

        let mut parent_fams = vec![famc_id.to_string()];
        if self.parent_remarriages {
            for parent_id in [famc.father(), famc.mother()].into_iter().flatten() {
                if let Some(parent) = self.data.indi(parent_id) {
                    parent_fams.extend(parent.fams.iter().filter(|id| *id != famc_id).cloned());
                }
            }
        }

        let mut siblings = famc.children.clone();
        if let Some(pos) = siblings.iter().position(|id| *id == indi.id) {
            siblings.remove(pos);
        }
        (parent_fams, siblings)
    }

    fn parents_and_siblings_present(&self, indi_id: Option<&str>) -> (bool, bool) {
        let famc = indi_id
            .and_then(|id| self.data.indi(id))
            .and_then(|indi| indi.famc.as_deref())
            .and_then(|famc| self.data.fam(famc));
        match famc {
            Some(famc) => (famc.has_parents(), famc.children.len() > 1),
            None => (false, false),
        }
    }

    fn indi_ids_to_fam_as_spouse_nodes(
        &mut self,
        indi_ids: &[String],
        parent: NodeId,
        link: LinkType,
    ) -> Vec<NodeId> {
        indi_ids
            .iter()
            .flat_map(|id| self.indi_id_to_fam_as_spouse_nodes(id, parent, link))
            .collect()
    }

    fn indi_id_to_fam_as_spouse_nodes(
        &mut self,
        indi_id: &str,
        parent: NodeId,
        link: LinkType,
    ) -> Vec<NodeId> {
        if self.is_child_node_type_forbidden(Some(link), Some(parent)) {
            return Vec::new();
        }
        let data = self.data;
        let Some(indi) = data.indi(indi_id) else {
            tracing::debug!(indi = indi_id, "skipping dangling individual reference");
            return Vec::new();
        };
        let fams_ids: Vec<String> = indi
            .fams
            .iter()
            .filter(|id| data.fam(id).is_some_and(|fam| fam.has_parents()))
            .cloned()
            .collect();
        if fams_ids.is_empty() {
            return self
                .id_to_node(EntryId::indi(indi_id), Some(parent), Some(link), true)
                .into_iter()
                .collect();
        }

        let mut result: Vec<NodeId> = Vec::with_capacity(fams_ids.len());
        for fam_id in fams_ids {
            let entry = EntryId::fam(fam_id);
            let mut node = TreeNode::new(entry.clone(), Some(parent), Some(link));
            node.indi = Some(indi_id.to_string());
            node.primary_marriage = result.first().copied();
            let id = self.push_node(node);
            self.register(entry, id, true);
            result.push(id);
        }
        result
    }

    fn fam_as_spouse_ids_to_nodes(
        &mut self,
        fam_ids: &[String],
        parent: NodeId,
        link: LinkType,
    ) -> Vec<NodeId> {
        let nodes: Vec<NodeId> = fam_ids
            .iter()
            .filter_map(|id| self.id_to_node(EntryId::fam(id.as_str()), Some(parent), Some(link), true))
            .collect();
        if let Some((&first, rest)) = nodes.split_first() {
            for &node in rest {
                self.nodes[node].primary_marriage = Some(first);
            }
        }
        nodes
    }

    fn id_to_node(
        &mut self,
        entry: EntryId,
        parent: Option<NodeId>,
        link: Option<LinkType>,
        duplicate_check: bool,
    ) -> Option<NodeId> {
        if self.is_child_node_type_forbidden(link, parent) {
            return None;
        }
        match &entry {
            EntryId::Fam(id) => {
                let usable = self.data.fam(id).is_some_and(|fam| fam.has_parents());
                if !usable {
                    tracing::debug!(fam = %id, "skipping family without parents");
                    return None;
                }
            }
            EntryId::Indi(id) => {
                if self.data.indi(id).is_none() {
                    tracing::debug!(indi = %id, "skipping dangling individual reference");
                    return None;
                }
            }
        }
        let node = self.push_node(TreeNode::new(entry.clone(), parent, link));
        self.register(entry, node, duplicate_check);
        Some(node)
    }

    fn push_node(&mut self, node: TreeNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn register(&mut self, entry: EntryId, node: NodeId, duplicate_check: bool) {
        match self.queued_by_entry.get(&entry).copied() {
            Some(first) => {
                if duplicate_check {
                    tracing::debug!(entry = entry.id(), "duplicate node");
                    self.nodes[node].duplicate_of = Some(first);
                    self.nodes[first].duplicated = true;
                }
            }
            None => {
                self.queued_by_entry.insert(entry, node);
            }
        }
    }

    fn create_link_stubs(&self, node_id: NodeId) -> Vec<LinkType> {
        let node = &self.nodes[node_id];
        let (indi_parents, indi_siblings) = self.parents_and_siblings_present(node.indi.as_deref());
        let mut present = vec![(LinkType::IndiParents, indi_parents), (LinkType::IndiSiblings, indi_siblings)];
        if let Some(fam) = node.family.as_deref().and_then(|id| self.data.fam(id)) {
            let (spouse_parents, spouse_siblings) =
                self.parents_and_siblings_present(node.spouse.as_deref());
            present.push((LinkType::SpouseParents, spouse_parents));
            present.push((LinkType::SpouseSiblings, spouse_siblings));
            present.push((LinkType::Children, !fam.children.is_empty()));
        }
        present
            .into_iter()
            .filter(|(_, present)| *present)
            .map(|(link, _)| link)
            .filter(|link| {
                !self.is_child_node_type_forbidden(Some(*link), Some(node_id))
                    && node.child_nodes.get(*link).is_empty()
            })
            .collect()
    }

    /// Blocks walking straight back to where the parent node came from, and
    /// keeps later marriages from repeating a person's parents and siblings.
    fn is_child_node_type_forbidden(&self, link: Option<LinkType>, parent: Option<NodeId>) -> bool {
        let (Some(link), Some(parent)) = (link, parent) else {
            return false;
        };
        let parent = &self.nodes[parent];
        let Some(arrived) = parent.link_from_parent else {
            return false;
        };
        let upward = matches!(link, LinkType::IndiParents | LinkType::IndiSiblings);
        match arrived.other_side() {
            LinkType::IndiParents | LinkType::IndiSiblings => {
                if upward {
                    return true;
                }
            }
            LinkType::Children => {
                if parent.primary_marriage.is_none() && link == LinkType::Children {
                    return true;
                }
            }
            LinkType::SpouseParents | LinkType::SpouseSiblings => return false,
        }

        if let Some(primary) = parent.primary_marriage {
            let primary = &self.nodes[primary];
            let shared = |person: &Option<String>| {
                person.is_some() && (*person == primary.indi || *person == primary.spouse)
            };
            if shared(&parent.indi) {
                if upward {
                    return true;
                }
            } else if shared(&parent.spouse)
                && matches!(link, LinkType::SpouseParents | LinkType::SpouseSiblings)
            {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Family, Individual, JsonGedcomData, RecordStore};

    fn indi(id: &str, famc: Option<&str>, fams: &[&str]) -> Individual {
        Individual {
            id: id.to_string(),
            famc: famc.map(str::to_string),
            fams: fams.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn fam(id: &str, husb: Option<&str>, wife: Option<&str>, children: &[&str]) -> Family {
        Family {
            id: id.to_string(),
            husb: husb.map(str::to_string),
            wife: wife.map(str::to_string),
            children: children.iter().map(|s| s.to_string()).collect(),
            marriage: None,
        }
    }

    fn nuclear() -> RecordStore {
        RecordStore::new(JsonGedcomData {
            indis: vec![
                indi("I1", None, &["F1"]),
                indi("I2", None, &["F1"]),
                indi("I3", Some("F1"), &[]),
                indi("I4", Some("F1"), &[]),
            ],
            fams: vec![fam("F1", Some("I1"), Some("I2"), &["I3", "I4"])],
        })
    }

    #[test]
    fn id_generator_suffixes_repeats() {
        let mut ids = IdGenerator::default();
        assert_eq!(ids.get_id("F1"), "F1");
        assert_eq!(ids.get_id("F1"), "F1:1");
        assert_eq!(ids.get_id("F1"), "F1:2");
        assert_eq!(ids.get_id("I1"), "I1");
    }

    #[test]
    fn other_side_pairs() {
        assert_eq!(LinkType::IndiParents.other_side(), LinkType::Children);
        assert_eq!(LinkType::SpouseSiblings.other_side(), LinkType::IndiSiblings);
        assert_eq!(LinkType::Children.other_side(), LinkType::IndiParents);
    }

    #[test]
    fn start_individual_is_reanchored_on_family() {
        let store = nuclear();
        let hierarchy =
            build_hierarchy(&store, &EntryId::indi("I2"), &HierarchyFilters::kinship()).expect("built");
        let root = hierarchy.node(hierarchy.down_root.expect("down root"));
        assert_eq!(root.family.as_deref(), Some("F1"));
        assert_eq!(root.indi.as_deref(), Some("I2"));
        assert_eq!(root.spouse.as_deref(), Some("I1"));
        assert_eq!(root.child_nodes.children.len(), 2);
    }

    #[test]
    fn missing_start_is_an_error() {
        let store = nuclear();
        let err = build_hierarchy(&store, &EntryId::indi("I99"), &HierarchyFilters::kinship())
            .expect_err("missing root");
        assert!(matches!(err, ChartError::MissingRoot { ref id } if id == "I99"));
    }

    #[test]
    fn parentless_family_is_skipped() {
        let store = RecordStore::new(JsonGedcomData {
            indis: vec![indi("I1", Some("F0"), &[])],
            fams: vec![fam("F0", None, None, &["I1"])],
        });
        let hierarchy =
            build_hierarchy(&store, &EntryId::indi("I1"), &HierarchyFilters::kinship()).expect("built");
        let root = hierarchy.node(hierarchy.up_root.expect("up root"));
        assert!(root.family.is_none());
        assert!(root.child_nodes.is_empty());
    }

    #[test]
    fn parents_other_marriages_follow_the_policy() {
        let store = RecordStore::new(JsonGedcomData {
            indis: vec![
                indi("I1", Some("F0"), &[]),
                indi("I7", None, &["F0", "F9"]),
                indi("I8", None, &["F0"]),
                indi("I20", Some("F8"), &["F9"]),
                indi("I21", None, &["F8"]),
                indi("I22", None, &["F8"]),
            ],
            fams: vec![
                fam("F0", Some("I7"), Some("I8"), &["I1"]),
                fam("F9", Some("I7"), Some("I20"), &[]),
                fam("F8", Some("I21"), Some("I22"), &["I20"]),
            ],
        });
        let families = |filters: &HierarchyFilters| -> Vec<String> {
            build_hierarchy(&store, &EntryId::indi("I1"), filters)
                .expect("built")
                .nodes
                .iter()
                .filter_map(|node| node.family.clone())
                .collect()
        };
        assert_eq!(families(&HierarchyFilters::ancestors()), vec!["F0"]);
        assert_eq!(families(&HierarchyFilters::hourglass()), vec!["F0"]);
        assert!(families(&HierarchyFilters::kinship()).contains(&"F9".to_string()));
    }

    #[test]
    fn filter_modification() {
        let filter = TraversalFilter::all_rejecting().with(LinkType::Children, true);
        assert!(filter.accepts(LinkType::Children));
        assert!(!filter.accepts(LinkType::IndiParents));
        assert!(TraversalFilter::all_accepting().accepts(LinkType::SpouseSiblings));
    }
}
