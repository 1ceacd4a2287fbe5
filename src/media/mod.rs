mod build;
mod derive;
mod model;
mod normalize;
mod pipeline;
mod raw;
mod sample;

pub use build::{
    BuildOptions, BuildOutput, BuildReport, GraphBuilder, ORGANIZATIONAL_CATEGORIES, USER_HUB_ID,
    organizational_category,
};
pub use derive::{DeriveSummary, derive_in_place, derive_relationships};
pub use model::{Graph, Link, LinkInsert, Node, NodeKind, ShelfStatus, relation};
pub use normalize::{
    CreatorRef, MAIN_CAST_LIMIT, NormalizedRecord, UNKNOWN_CATEGORY, UNNAMED, UNNAMED_MOVIE,
    infer_category, normalize, slug,
};
pub use pipeline::{LoadedGraph, load_document, load_value};
pub use raw::{DocumentMetadata, RawDocument, RawLink, RawNode, RawTag, endpoint_id, parse_document};
pub use sample::sample_document;
