use std::collections::HashSet;

use media_graph::media::{MAIN_CAST_LIMIT, relation, slug};
use media_graph::{
    BuildOptions, GraphError, MalformedReason, NodeKind, ShelfStatus, derive_relationships,
    load_document, load_value,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};

const TYPES: [&str; 7] = ["movie", "book", "tv", "creator", "tag", "game", "podcast"];
const NAME_CHARS: [char; 14] = ['a', 'Z', 'q', '7', ' ', '-', '_', '!', 'é', '李', 'Ω', '.', 'x', '0'];

fn random_name(rng: &mut StdRng) -> String {
    let len = rng.random_range(0..32);
    (0..len)
        .map(|_| NAME_CHARS[rng.random_range(0..NAME_CHARS.len())])
        .collect()
}

fn random_document(rng: &mut StdRng) -> Value {
    let node_count = rng.random_range(1..40);
    let nodes = (0..node_count)
        .map(|index| {
            let mut node = json!({
                "id": format!("n{index}"),
                "name": random_name(rng),
                "type": TYPES[rng.random_range(0..TYPES.len())],
            });
            if rng.random_bool(0.3) {
                let cast = (0..rng.random_range(0..9))
                    .map(|_| Value::String(random_name(rng)))
                    .collect::<Vec<_>>();
                node["data"] = json!({ "cast": cast, "director": random_name(rng) });
            }
            node
        })
        .collect::<Vec<_>>();

    let endpoint = |rng: &mut StdRng| match rng.random_range(0..10) {
        0 => "user".to_owned(),
        1 => "shelf_complete".to_owned(),
        2 => format!("ghost{}", rng.random_range(0..5)),
        _ => format!("n{}", rng.random_range(0..node_count)),
    };
    let links = (0..rng.random_range(0..80))
        .map(|_| {
            json!({
                "source": endpoint(rng),
                "target": endpoint(rng),
                "type": (["linked", "acted_in", "directed", "similar"][rng.random_range(0..4)]),
            })
        })
        .collect::<Vec<_>>();

    json!({ "graph_data": { "nodes": nodes, "links": links } })
}

#[test]
fn every_link_resolves_and_is_unique() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..200 {
        let loaded = load_value(random_document(&mut rng), &BuildOptions::default())
            .expect("documents with named ids always load");
        let graph = &loaded.graph;

        let mut seen = HashSet::new();
        for (link, &(source, target)) in graph.links().iter().zip(graph.endpoints()) {
            assert!(graph.contains_node(&link.source_id), "{}", link.source_id);
            assert!(graph.contains_node(&link.target_id), "{}", link.target_id);
            assert_eq!(graph.nodes()[source].id, link.source_id);
            assert_eq!(graph.nodes()[target].id, link.target_id);
            assert_ne!(link.source_id, "user");
            assert!(seen.insert((&link.source_id, &link.target_id, &link.relation)));
        }

        let ids = graph.nodes().iter().map(|node| &node.id).collect::<HashSet<_>>();
        assert_eq!(ids.len(), graph.node_count());
    }
}

#[test]
fn slugs_are_stable_short_and_plain() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..500 {
        let name = random_name(&mut rng);
        let first = slug(&name);
        assert_eq!(first, slug(&name));
        assert!(first.len() <= 20);
        assert!(
            first
                .chars()
                .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
        );
        assert!(!first.starts_with('_'));
        assert!(!first.ends_with('_'));
        assert!(!first.contains("__"));
    }

    assert_eq!(slug("  The Dark Knight!! "), "the_dark_knight");
}

#[test]
fn cast_is_capped_to_main_cast() {
    let cast = (1..=9).map(|index| format!("Actor {index}")).collect::<Vec<_>>();
    let loaded = load_value(
        json!({
            "graph_data": {
                "nodes": [{ "id": "m1", "type": "movie", "name": "Crowd", "data": { "cast": cast } }]
            }
        }),
        &BuildOptions::default(),
    )
    .expect("loads");

    let graph = &loaded.graph;
    let acted = graph
        .links()
        .iter()
        .filter(|link| link.relation == relation::ACTED_IN && link.target_id == "m1")
        .count();
    assert_eq!(acted, MAIN_CAST_LIMIT);
    assert!(graph.contains_node("actor_actor_1"));
    assert!(graph.contains_node("actor_actor_5"));
    assert!(!graph.contains_node("actor_actor_6"));
}

#[test]
fn only_media_carry_shelf_status() {
    let loaded = load_value(
        json!({
            "graph_data": {
                "nodes": [
                    { "id": "b1", "type": "book", "name": "Dune" },
                    { "id": "b2", "type": "book", "name": "Emma", "shelf": "dropped" },
                    { "id": "shelf_progress", "type": "shelf", "name": "In progress" },
                    { "id": "t1", "type": "tag", "name": "Classics" }
                ],
                "links": [{ "source": "shelf_progress", "target": "b1" }]
            }
        }),
        &BuildOptions::default(),
    )
    .expect("loads");

    for node in loaded.graph.nodes() {
        assert_eq!(node.kind == NodeKind::Media, node.shelf_status.is_some(), "{}", node.id);
    }
    let status = |id: &str| loaded.graph.node(id).and_then(|node| node.shelf_status);
    assert_eq!(status("b1"), Some(ShelfStatus::Progress));
    assert_eq!(status("b2"), Some(ShelfStatus::Dropped));
}

#[test]
fn shared_cast_members_become_co_actors() {
    let loaded = load_value(
        json!({
            "graph_data": {
                "nodes": [
                    { "id": "m1", "type": "movie", "name": "One", "data": { "cast": ["Ann", "Bob"] } },
                    { "id": "m2", "type": "movie", "name": "Two", "data": { "cast": ["Bob", "Cid"] } }
                ]
            }
        }),
        &BuildOptions::default(),
    )
    .expect("loads");

    assert_eq!(loaded.derived.co_actor, 2);
    assert_eq!(loaded.derived.worked_with, 0);
    assert!(loaded.graph.has_link("actor_ann", "actor_bob", relation::CO_ACTOR));
    assert!(loaded.graph.has_link("actor_bob", "actor_cid", relation::CO_ACTOR));
    assert!(!loaded.graph.has_link("actor_ann", "actor_cid", relation::CO_ACTOR));
}

#[test]
fn directors_work_with_their_cast_once() {
    let loaded = load_value(
        json!({
            "graph_data": {
                "nodes": [
                    { "id": "m1", "type": "movie", "name": "Heat",
                      "data": { "director": "Michael Mann", "cast": ["Al Pacino", "Val Kilmer"] } },
                    { "id": "m2", "type": "movie", "name": "Insider",
                      "data": { "director": "Michael Mann", "cast": ["Al Pacino"] } }
                ]
            }
        }),
        &BuildOptions::default(),
    )
    .expect("loads");

    assert_eq!(loaded.derived.worked_with, 2);
    let graph = derive_relationships(loaded.graph);
    assert_eq!(graph.count_relation(relation::WORKED_WITH), 2);
    assert!(graph.has_link("director_michael_mann", "actor_al_pacino", relation::WORKED_WITH));
    assert!(graph.has_link("director_michael_mann", "actor_val_kilmer", relation::WORKED_WITH));
}

#[test]
fn structural_problems_are_rejected() {
    let options = BuildOptions::default();
    assert_eq!(
        load_value(json!({}), &options).unwrap_err(),
        GraphError::MalformedInput(MalformedReason::MissingGraphData)
    );
    assert!(matches!(
        load_document("{ not json", &options),
        Err(GraphError::MalformedInput(MalformedReason::InvalidJson(_)))
    ));
    assert_eq!(
        load_value(json!([1, 2]), &options).unwrap_err(),
        GraphError::MalformedInput(MalformedReason::NotAnObject)
    );
}
