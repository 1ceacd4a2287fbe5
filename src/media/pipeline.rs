use serde_json::Value;
use tracing::{info, warn};

use crate::error::{GraphError, Result};

use super::build::{BuildOptions, BuildReport, GraphBuilder};
use super::derive::{DeriveSummary, derive_in_place};
use super::model::Graph;
use super::raw::{DocumentMetadata, RawDocument, parse_document};

/// Result of one load cycle: the canonical graph plus what happened on the way.
#[derive(Clone, Debug)]
pub struct LoadedGraph {
    pub graph: Graph,
    pub report: BuildReport,
    pub derived: DeriveSummary,
    pub metadata: Option<DocumentMetadata>,
}

/// Raw JSON text to canonical graph: parse, normalize, build, derive.
pub fn load_document(raw: &str, options: &BuildOptions) -> Result<LoadedGraph> {
    let document = parse_document(raw).inspect_err(|error| warn!(%error, "rejecting input"))?;
    load_raw(document, options)
}

pub fn load_value(value: Value, options: &BuildOptions) -> Result<LoadedGraph> {
    let document =
        RawDocument::from_value(value).inspect_err(|error| warn!(%error, "rejecting input"))?;
    load_raw(document, options)
}

fn load_raw(document: RawDocument, options: &BuildOptions) -> Result<LoadedGraph> {
    let output = GraphBuilder::new(options.clone()).build_document(&document);
    if output.report.normalized_nodes == 0 {
        warn!("no nodes survived normalization");
        return Err(GraphError::EmptyGraph);
    }

    let mut graph = output.graph;
    let derived = derive_in_place(&mut graph);
    info!(
        nodes = graph.node_count(),
        links = graph.link_count(),
        "graph ready"
    );

    Ok(LoadedGraph {
        graph,
        report: output.report,
        derived,
        metadata: document.metadata,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::MalformedReason;

    #[test]
    fn empty_object_is_malformed() {
        let error = load_value(json!({}), &BuildOptions::default()).unwrap_err();
        assert_eq!(
            error,
            GraphError::MalformedInput(MalformedReason::MissingGraphData)
        );
    }

    #[test]
    fn graph_without_nodes_is_empty() {
        let options = BuildOptions::default();
        let error = load_value(json!({ "graph_data": { "nodes": [], "links": [] } }), &options)
            .unwrap_err();
        assert_eq!(error, GraphError::EmptyGraph);

        let only_user = json!({ "graph_data": { "nodes": [{ "id": "user" }] } });
        assert_eq!(load_value(only_user, &options).unwrap_err(), GraphError::EmptyGraph);
    }
}
