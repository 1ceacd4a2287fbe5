use std::collections::{BTreeMap, HashSet};

use tracing::info;

use super::model::{Graph, Link, LinkInsert, relation};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeriveSummary {
    pub worked_with: usize,
    pub co_actor: usize,
}

/// Adds `worked_with` and `co_actor` edges inferred from shared media.
/// Running it again on its own output adds nothing.
pub fn derive_relationships(mut graph: Graph) -> Graph {
    derive_in_place(&mut graph);
    graph
}

pub fn derive_in_place(graph: &mut Graph) -> DeriveSummary {
    let mut directed_by_director: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut cast_by_media: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

    for (link, &(source, target)) in graph.links().iter().zip(graph.endpoints()) {
        match link.relation.as_str() {
            relation::DIRECTED => directed_by_director.entry(source).or_default().push(target),
            relation::ACTED_IN => cast_by_media.entry(target).or_default().push(source),
            _ => {}
        }
    }

    let mut candidates = Vec::new();

    for (&director, movies) in &directed_by_director {
        for movie in movies {
            for &actor in cast_by_media.get(movie).into_iter().flatten() {
                if actor != director && !graph.connected(director, actor) {
                    candidates.push((director, actor, relation::WORKED_WITH));
                }
            }
        }
    }

    let mut seen_pairs = HashSet::new();
    for cast in cast_by_media.values() {
        for (position, &first) in cast.iter().enumerate() {
            for &second in &cast[position + 1..] {
                if first == second {
                    continue;
                }

                let (low, high) = ordered_pair(graph, first, second);
                if !seen_pairs.insert((low, high)) {
                    continue;
                }
                if has_co_actor(graph, low, high) {
                    continue;
                }
                candidates.push((low, high, relation::CO_ACTOR));
            }
        }
    }

    let mut summary = DeriveSummary::default();
    for (source, target, relation_name) in candidates {
        let link = Link::new(
            graph.nodes()[source].id.as_str(),
            graph.nodes()[target].id.as_str(),
            relation_name,
        );
        if graph.push_link(link) != LinkInsert::Inserted {
            continue;
        }
        if relation_name == relation::WORKED_WITH {
            summary.worked_with += 1;
        } else {
            summary.co_actor += 1;
        }
    }

    info!(
        worked_with = summary.worked_with,
        co_actor = summary.co_actor,
        "derived creator relationships"
    );
    summary
}

/// Canonical orientation for an unordered pair: lower id first.
fn ordered_pair(graph: &Graph, a: usize, b: usize) -> (usize, usize) {
    if graph.nodes()[a].id <= graph.nodes()[b].id {
        (a, b)
    } else {
        (b, a)
    }
}

fn has_co_actor(graph: &Graph, low: usize, high: usize) -> bool {
    let nodes = graph.nodes();
    graph.has_link(&nodes[low].id, &nodes[high].id, relation::CO_ACTOR)
        || graph.has_link(&nodes[high].id, &nodes[low].id, relation::CO_ACTOR)
}
