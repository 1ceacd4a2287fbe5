use std::collections::{HashMap, HashSet};

use eframe::egui::Vec2;

/// Relation names used on canonical links.
pub mod relation {
    pub const DIRECTED: &str = "directed";
    pub const ACTED_IN: &str = "acted_in";
    pub const WROTE: &str = "wrote";
    pub const TRANSLATED: &str = "translated";
    pub const PERFORMED: &str = "performed";
    pub const WORKED_WITH: &str = "worked_with";
    pub const CO_ACTOR: &str = "co_actor";
    pub const CONTAINS: &str = "contains";
    pub const RELATED: &str = "related";
    pub const HAS_TAG: &str = "has_tag";
    pub const LINKED: &str = "linked";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Media,
    Creator,
    Organizational,
    Shelf,
    Tag,
}

impl NodeKind {
    pub const ALL: [Self; 5] = [
        Self::Media,
        Self::Creator,
        Self::Organizational,
        Self::Shelf,
        Self::Tag,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Media => "media",
            Self::Creator => "creator",
            Self::Organizational => "category",
            Self::Shelf => "shelf",
            Self::Tag => "tag",
        }
    }

    /// Anchor kinds keep their pin after a drag ends.
    pub fn is_anchor(self) -> bool {
        matches!(self, Self::Organizational)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShelfStatus {
    Wishlist,
    Progress,
    Complete,
    Dropped,
    Unknown,
}

impl ShelfStatus {
    pub const SENTINELS: [(&'static str, Self); 4] = [
        ("shelf_wishlist", Self::Wishlist),
        ("shelf_progress", Self::Progress),
        ("shelf_complete", Self::Complete),
        ("shelf_dropped", Self::Dropped),
    ];

    pub fn from_sentinel(id: &str) -> Option<Self> {
        Self::SENTINELS
            .iter()
            .find(|(sentinel, _)| *sentinel == id)
            .map(|(_, status)| *status)
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        let value = value.strip_prefix("shelf_").unwrap_or(&value);
        match value {
            "wishlist" => Some(Self::Wishlist),
            "progress" => Some(Self::Progress),
            "complete" => Some(Self::Complete),
            "dropped" => Some(Self::Dropped),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Wishlist => "wishlist",
            Self::Progress => "progress",
            Self::Complete => "complete",
            Self::Dropped => "dropped",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub category: Option<String>,
    pub rating: Option<f32>,
    pub shelf_status: Option<ShelfStatus>,
    pub url: Option<String>,
    pub pos: Vec2,
    pub velocity: Vec2,
    /// Fixed position overriding the simulation while set.
    pub pin: Option<Vec2>,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            category: None,
            rating: None,
            shelf_status: None,
            url: None,
            pos: Vec2::ZERO,
            velocity: Vec2::ZERO,
            pin: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn category_is(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(category))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Link {
    pub source_id: String,
    pub target_id: String,
    pub relation: String,
}

impl Link {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relation: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relation: relation.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkInsert {
    Inserted,
    Duplicate,
    MissingEndpoint,
}

/// Canonical node/link graph. Links can only be inserted between nodes that
/// already exist, and the same `(source, target, relation)` triple is stored
/// once, so both graph invariants hold for every value of this type.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    links: Vec<Link>,
    endpoints: Vec<(usize, usize)>,
    index_by_id: HashMap<String, usize>,
    link_keys: HashSet<(usize, usize, String)>,
    connected_pairs: HashSet<(usize, usize)>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `node` unless its id is already present; the first occurrence wins.
    pub fn push_node(&mut self, node: Node) -> bool {
        if self.index_by_id.contains_key(&node.id) {
            return false;
        }

        self.index_by_id.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn push_link(&mut self, link: Link) -> LinkInsert {
        let (Some(&source), Some(&target)) = (
            self.index_by_id.get(&link.source_id),
            self.index_by_id.get(&link.target_id),
        ) else {
            return LinkInsert::MissingEndpoint;
        };

        if !self
            .link_keys
            .insert((source, target, link.relation.clone()))
        {
            return LinkInsert::Duplicate;
        }

        self.connected_pairs
            .insert((source.min(target), source.max(target)));
        self.endpoints.push((source, target));
        self.links.push(link);
        LinkInsert::Inserted
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable access for position, pin and shelf updates; the node set itself is fixed.
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// `(source, target)` node indices, parallel to [`Graph::links`].
    pub fn endpoints(&self) -> &[(usize, usize)] {
        &self.endpoints
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn has_link(&self, source_id: &str, target_id: &str, relation: &str) -> bool {
        match (self.index_of(source_id), self.index_of(target_id)) {
            (Some(source), Some(target)) => {
                self.link_keys
                    .contains(&(source, target, relation.to_owned()))
            }
            _ => false,
        }
    }

    /// True when any link joins the two nodes, in either direction.
    pub fn connected(&self, a: usize, b: usize) -> bool {
        self.connected_pairs.contains(&(a.min(b), a.max(b)))
    }

    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0usize; self.nodes.len()];
        for &(source, target) in &self.endpoints {
            degrees[source] += 1;
            if target != source {
                degrees[target] += 1;
            }
        }
        degrees
    }

    /// Undirected adjacency: for every node, `(neighbor, link index)` pairs.
    pub fn adjacency(&self) -> Vec<Vec<(usize, usize)>> {
        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for (link_index, &(source, target)) in self.endpoints.iter().enumerate() {
            adjacency[source].push((target, link_index));
            if target != source {
                adjacency[target].push((source, link_index));
            }
        }
        adjacency
    }

    pub fn count_relation(&self, relation: &str) -> usize {
        self.links
            .iter()
            .filter(|link| link.relation == relation)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: &str) -> Node {
        Node::new(id, id, NodeKind::Media).with_category("movie")
    }

    #[test]
    fn first_node_with_an_id_wins() {
        let mut graph = Graph::new();
        assert!(graph.push_node(movie("m1")));
        assert!(!graph.push_node(Node::new("m1", "Other", NodeKind::Tag)));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.nodes()[0].kind, NodeKind::Media);
    }

    #[test]
    fn links_need_both_endpoints_and_are_unique() {
        let mut graph = Graph::new();
        graph.push_node(movie("m1"));
        graph.push_node(Node::new("director_x", "X", NodeKind::Creator));

        assert_eq!(
            graph.push_link(Link::new("director_x", "m1", relation::DIRECTED)),
            LinkInsert::Inserted
        );
        assert_eq!(
            graph.push_link(Link::new("director_x", "m1", relation::DIRECTED)),
            LinkInsert::Duplicate
        );
        assert_eq!(
            graph.push_link(Link::new("director_x", "m2", relation::DIRECTED)),
            LinkInsert::MissingEndpoint
        );
        assert_eq!(
            graph.push_link(Link::new("m1", "director_x", relation::RELATED)),
            LinkInsert::Inserted
        );

        assert_eq!(graph.link_count(), 2);
        assert!(graph.connected(0, 1));
        assert!(graph.connected(1, 0));
        assert_eq!(graph.degrees(), vec![2, 2]);
    }

    #[test]
    fn shelf_status_parsing_accepts_sentinels() {
        assert_eq!(
            ShelfStatus::from_sentinel("shelf_complete"),
            Some(ShelfStatus::Complete)
        );
        assert_eq!(ShelfStatus::from_sentinel("complete"), None);
        assert_eq!(
            ShelfStatus::parse("shelf_Wishlist"),
            Some(ShelfStatus::Wishlist)
        );
        assert_eq!(ShelfStatus::parse(" dropped "), Some(ShelfStatus::Dropped));
        assert_eq!(ShelfStatus::parse("later"), None);
    }
}
