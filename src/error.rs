use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

/// Structural failures of a load cycle. Record-level problems never surface
/// here; they are repaired with placeholders and counted in the build report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("malformed input: {0}")]
    MalformedInput(MalformedReason),

    #[error("graph is empty after normalization")]
    EmptyGraph,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    #[error("document is not valid JSON ({0})")]
    InvalidJson(String),

    #[error("document root is not a JSON object")]
    NotAnObject,

    #[error("missing graph_data container")]
    MissingGraphData,

    #[error("graph_data.nodes is not an array")]
    InvalidNodes,

    #[error("graph_data.links is not an array")]
    InvalidLinks,
}

impl From<MalformedReason> for GraphError {
    fn from(reason: MalformedReason) -> Self {
        Self::MalformedInput(reason)
    }
}
