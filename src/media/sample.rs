use serde_json::{Value, json};

/// Small built-in dataset offered when the real document cannot be loaded.
pub fn sample_document() -> Value {
    json!({
        "graph_data": {
            "nodes": [
                { "id": "movie1", "name": "The Shawshank Redemption", "type": "movie", "shelf": "complete" },
                { "id": "movie2", "name": "The Godfather", "type": "movie", "shelf": "complete" },
                { "id": "movie3", "name": "Pulp Fiction", "type": "movie", "shelf": "complete" },
                { "id": "movie4", "name": "Inception", "type": "movie", "shelf": "wishlist" },
                { "id": "creator1", "name": "Francis Ford Coppola", "type": "creator", "role": "director" },
                { "id": "creator2", "name": "Quentin Tarantino", "type": "creator", "role": "director" },
                { "id": "creator3", "name": "Christopher Nolan", "type": "creator", "role": "director" },
                { "id": "creator4", "name": "Al Pacino", "type": "creator", "role": "actor" },
                { "id": "creator5", "name": "Morgan Freeman", "type": "creator", "role": "actor" },
                { "id": "creator6", "name": "Leonardo DiCaprio", "type": "creator", "role": "actor" }
            ],
            "links": [
                { "source": "creator1", "target": "movie2", "type": "directed" },
                { "source": "creator2", "target": "movie3", "type": "directed" },
                { "source": "creator3", "target": "movie4", "type": "directed" },
                { "source": "creator4", "target": "movie2", "type": "acted_in" },
                { "source": "creator5", "target": "movie1", "type": "acted_in" },
                { "source": "creator6", "target": "movie4", "type": "acted_in" }
            ]
        },
        "metadata": { "username": "sample" }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::build::BuildOptions;
    use crate::media::model::{NodeKind, ShelfStatus, relation};
    use crate::media::pipeline::load_value;

    #[test]
    fn sample_loads_with_derived_edges() {
        let loaded = load_value(sample_document(), &BuildOptions::default()).expect("sample loads");
        let graph = &loaded.graph;

        assert_eq!(graph.node("creator1").map(|node| node.kind), Some(NodeKind::Creator));
        assert_eq!(
            graph.node("movie4").and_then(|node| node.shelf_status),
            Some(ShelfStatus::Wishlist)
        );
        assert!(graph.has_link("creator1", "creator4", relation::WORKED_WITH));
        assert!(graph.has_link("creator3", "creator6", relation::WORKED_WITH));
        assert_eq!(loaded.derived.worked_with, 2);
        assert_eq!(loaded.derived.co_actor, 0);
    }
}
