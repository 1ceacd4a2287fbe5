use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, info};

use crate::util::stable_token;

use super::model::{Graph, Link, LinkInsert, Node, NodeKind, ShelfStatus, relation};
use super::normalize::{NormalizedRecord, normalize, slug};
use super::raw::{RawDocument, RawLink, RawTag};

/// Id of the account hub record; it and its links are left out of the graph.
pub const USER_HUB_ID: &str = "user";

/// Top-level categories of the overview scaffold, in ring order.
pub const ORGANIZATIONAL_CATEGORIES: [(&str, &str); 5] = [
    ("books", "Books"),
    ("movies", "Movies"),
    ("tv", "TV Series"),
    ("music", "Music"),
    ("podcasts", "Podcasts"),
];

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Synthesize one node per top-level category and link media to it.
    pub category_overview: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            category_overview: true,
        }
    }
}

/// Counters describing what the builder kept, repaired and dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub raw_nodes: usize,
    /// Nodes produced from records and their creators, before scaffolding.
    pub normalized_nodes: usize,
    pub skipped_nodes: usize,
    pub duplicate_nodes: usize,
    pub creator_nodes: usize,
    pub tag_nodes: usize,
    /// Links dropped because an endpoint is not in the node set.
    pub dropped_links: usize,
    pub skipped_user_links: usize,
    pub self_loops: usize,
    pub duplicate_links: usize,
    pub organizational_links: usize,
}

#[derive(Clone, Debug)]
pub struct BuildOutput {
    pub graph: Graph,
    pub report: BuildReport,
}

/// Organizational category a media category belongs to.
pub fn organizational_category(media_category: &str) -> Option<&'static str> {
    match media_category.to_ascii_lowercase().as_str() {
        "book" | "edition" | "books" => Some("books"),
        "movie" | "movies" => Some("movies"),
        "tv" | "tvseries" => Some("tv"),
        "music" | "album" => Some("music"),
        "podcast" | "podcasts" => Some("podcasts"),
        _ => None,
    }
}

#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
    options: BuildOptions,
}

impl GraphBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    /// Builds the canonical graph from normalized records and raw links.
    pub fn build(&self, records: Vec<NormalizedRecord>, raw_links: &[RawLink]) -> BuildOutput {
        self.assemble(records, raw_links, &HashMap::new(), &[], BuildReport::default())
    }

    /// Normalizes every record of `document`, then builds the graph including
    /// the optional shelf and tag sections.
    pub fn build_document(&self, document: &RawDocument) -> BuildOutput {
        let mut report = BuildReport::default();
        let mut records = Vec::with_capacity(document.nodes.len());
        for raw in &document.nodes {
            if raw.id().as_deref() == Some(USER_HUB_ID) {
                report.skipped_nodes += 1;
                continue;
            }
            records.push(normalize(raw));
        }
        report.raw_nodes = document.nodes.len();

        self.assemble(
            records,
            &document.links,
            &document.shelf_items,
            &document.tags,
            report,
        )
    }

    fn assemble(
        &self,
        records: Vec<NormalizedRecord>,
        raw_links: &[RawLink],
        shelf_items: &HashMap<String, ShelfStatus>,
        tags: &[RawTag],
        mut report: BuildReport,
    ) -> BuildOutput {
        if report.raw_nodes == 0 {
            report.raw_nodes = records.len();
        }

        let mut graph = Graph::new();
        let mut shelf_hints = HashMap::new();
        let mut creator_links = Vec::new();

        for record in records {
            let NormalizedRecord {
                node,
                creators,
                shelf_hint,
            } = record;

            let id = node.id.clone();
            if !graph.push_node(node) {
                report.duplicate_nodes += 1;
                continue;
            }
            if let Some(hint) = shelf_hint {
                shelf_hints.insert(id, hint);
            }

            for creator in creators {
                creator_links.push(Link::new(
                    creator.node.id.clone(),
                    creator.media_id,
                    creator.relation,
                ));
                if graph.push_node(creator.node) {
                    report.creator_nodes += 1;
                }
            }
        }

        report.normalized_nodes = graph.node_count();

        let shelf_edges = shelf_table(raw_links);
        for node in graph.nodes_mut() {
            if node.kind != NodeKind::Media {
                continue;
            }

            node.shelf_status = Some(
                shelf_edges
                    .get(node.id.as_str())
                    .or_else(|| shelf_items.get(&node.id))
                    .or_else(|| shelf_hints.get(&node.id))
                    .copied()
                    .unwrap_or(ShelfStatus::Unknown),
            );
        }

        for link in creator_links {
            insert_link(&mut graph, link, &mut report);
        }

        for raw in raw_links {
            if raw.source == USER_HUB_ID || raw.target == USER_HUB_ID {
                report.skipped_user_links += 1;
                continue;
            }
            if raw.source == raw.target {
                report.self_loops += 1;
                continue;
            }

            let relation = raw.kind.as_deref().unwrap_or(relation::LINKED);
            insert_link(
                &mut graph,
                Link::new(raw.source.as_str(), raw.target.as_str(), relation),
                &mut report,
            );
        }

        for tag in tags {
            add_tag(&mut graph, tag, &mut report);
        }

        if self.options.category_overview {
            add_organizational_scaffold(&mut graph, &mut report);
        }

        info!(
            nodes = graph.node_count(),
            links = graph.link_count(),
            creators = report.creator_nodes,
            dropped_links = report.dropped_links,
            duplicate_nodes = report.duplicate_nodes,
            "built canonical graph"
        );

        BuildOutput { graph, report }
    }
}

/// Shelf status per item id, read from edges touching a shelf sentinel.
fn shelf_table(raw_links: &[RawLink]) -> HashMap<&str, ShelfStatus> {
    let mut table = HashMap::new();
    for link in raw_links {
        if let Some(status) = ShelfStatus::from_sentinel(&link.source) {
            table.entry(link.target.as_str()).or_insert(status);
        } else if let Some(status) = ShelfStatus::from_sentinel(&link.target) {
            table.entry(link.source.as_str()).or_insert(status);
        }
    }
    table
}

fn insert_link(graph: &mut Graph, link: Link, report: &mut BuildReport) -> bool {
    match graph.push_link(link.clone()) {
        LinkInsert::Inserted => true,
        LinkInsert::Duplicate => {
            report.duplicate_links += 1;
            false
        }
        LinkInsert::MissingEndpoint => {
            debug!(
                source = link.source_id.as_str(),
                target = link.target_id.as_str(),
                relation = link.relation.as_str(),
                "dropping link with unknown endpoint"
            );
            report.dropped_links += 1;
            false
        }
    }
}

fn add_tag(graph: &mut Graph, tag: &RawTag, report: &mut BuildReport) {
    let tag_slug = slug(&tag.name);
    let id = if tag_slug.is_empty() {
        format!("tag_{}", stable_token(&[tag.name.as_str()]))
    } else {
        format!("tag_{tag_slug}")
    };

    if graph.push_node(Node::new(id.as_str(), tag.name.as_str(), NodeKind::Tag).with_category("tag")) {
        report.tag_nodes += 1;
    }

    for item in &tag.items {
        insert_link(
            graph,
            Link::new(item.as_str(), id.as_str(), relation::HAS_TAG),
            report,
        );
    }
}

fn add_organizational_scaffold(graph: &mut Graph, report: &mut BuildReport) {
    for (id, name) in ORGANIZATIONAL_CATEGORIES {
        graph.push_node(Node::new(id, name, NodeKind::Organizational).with_category("category"));
    }

    let memberships = graph
        .nodes()
        .iter()
        .filter(|node| node.kind == NodeKind::Media)
        .filter_map(|node| {
            let category = organizational_category(node.category.as_deref()?)?;
            Some(Link::new(category, node.id.as_str(), relation::CONTAINS))
        })
        .collect::<Vec<_>>();

    for link in memberships {
        if insert_link(graph, link, report) {
            report.organizational_links += 1;
        }
    }

    let count = ORGANIZATIONAL_CATEGORIES.len();
    for index in 0..count {
        let (from, _) = ORGANIZATIONAL_CATEGORIES[index];
        let (to, _) = ORGANIZATIONAL_CATEGORIES[(index + 1) % count];
        if insert_link(graph, Link::new(from, to, relation::RELATED), report) {
            report.organizational_links += 1;
        }
    }
}
