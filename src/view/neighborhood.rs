use std::collections::{BTreeSet, VecDeque};

/// Closed neighborhood of a node: the node itself, every node one link
/// away and the links joining them to it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Neighborhood {
    pub center: usize,
    pub nodes: BTreeSet<usize>,
    pub links: BTreeSet<usize>,
}

impl Neighborhood {
    /// `adjacency` is the undirected `(neighbor, link index)` list per node.
    pub fn collect(adjacency: &[Vec<(usize, usize)>], center: usize) -> Self {
        Self::collect_within(adjacency, center, 1)
    }

    pub fn collect_within(adjacency: &[Vec<(usize, usize)>], center: usize, depth: usize) -> Self {
        let mut nodes = BTreeSet::from([center]);
        let mut links = BTreeSet::new();
        let mut queue = VecDeque::from([(center, 0usize)]);

        while let Some((node, distance)) = queue.pop_front() {
            if distance >= depth {
                continue;
            }

            for &(next, link) in adjacency.get(node).into_iter().flatten() {
                links.insert(link);
                if nodes.insert(next) {
                    queue.push_back((next, distance + 1));
                }
            }
        }

        Self {
            center,
            nodes,
            links,
        }
    }

    pub fn contains_node(&self, index: usize) -> bool {
        self.nodes.contains(&index)
    }

    pub fn contains_link(&self, index: usize) -> bool {
        self.links.contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_direct_neighbors_only() {
        // 0 - 1 - 2, 0 - 3
        let adjacency = vec![
            vec![(1, 0), (3, 2)],
            vec![(0, 0), (2, 1)],
            vec![(1, 1)],
            vec![(0, 2)],
        ];

        let neighborhood = Neighborhood::collect(&adjacency, 0);
        assert_eq!(neighborhood.nodes, BTreeSet::from([0, 1, 3]));
        assert_eq!(neighborhood.links, BTreeSet::from([0, 2]));
        assert!(!neighborhood.contains_node(2));

        let wider = Neighborhood::collect_within(&adjacency, 0, 2);
        assert!(wider.contains_node(2));
        assert!(wider.contains_link(1));
    }
}
