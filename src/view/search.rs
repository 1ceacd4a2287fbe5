use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::media::Graph;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Nodes whose name matches `query`, best first. Plain case-insensitive
/// substring hits always match and rank above fuzzy-only hits.
pub fn search_by_name(graph: &Graph, query: &str) -> Vec<usize> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default().ignore_case();
    let needle = query.to_lowercase();
    let mut scored = graph
        .nodes()
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let substring = node.name.to_lowercase().contains(&needle);
            let score = fuzzy_match_score(&matcher, &node.name, query);
            match (substring, score) {
                (true, score) => Some((index, true, score.unwrap_or(0))),
                (false, Some(score)) => Some((index, false, score)),
                (false, None) => None,
            }
        })
        .collect::<Vec<_>>();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)).then(a.0.cmp(&b.0)));
    scored.into_iter().map(|(index, _, _)| index).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{Node, NodeKind};

    fn graph(names: &[&str]) -> Graph {
        let mut graph = Graph::new();
        for (index, name) in names.iter().enumerate() {
            graph.push_node(Node::new(format!("n{index}"), *name, NodeKind::Media));
        }
        graph
    }

    #[test]
    fn substring_matches_are_case_insensitive_and_first() {
        let graph = graph(&["The Godfather", "Pulp Fiction", "Goodfellas"]);

        let matches = search_by_name(&graph, "GODFATHER");
        assert_eq!(matches.first(), Some(&0));
        assert!(!matches.contains(&1));

        assert!(search_by_name(&graph, "fiction").contains(&1));
        assert!(search_by_name(&graph, "   ").is_empty());
        assert!(search_by_name(&graph, "zzzz").is_empty());
    }

    #[test]
    fn fuzzy_hits_are_kept_after_substring_hits() {
        let graph = graph(&["Goodfellas", "The Good, the Bad and the Ugly"]);

        let matches = search_by_name(&graph, "gdfls");
        assert_eq!(matches, vec![0]);

        let matches = search_by_name(&graph, "good");
        assert_eq!(matches.len(), 2);
    }
}
