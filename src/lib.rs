//! Media-consumption graph pipeline: normalize loosely structured records
//! into a canonical graph, lay it out with a force simulation and render the
//! visible part of it.

pub mod config;
pub mod error;
pub mod layout;
pub mod media;
pub mod util;
pub mod view;

pub use config::{ViewConfig, VisualizationConfig};
pub use error::{GraphError, MalformedReason, Result};
pub use layout::{LayoutConfig, LayoutEngine, LayoutState, ticks_to_converge};
pub use media::{
    BuildOptions, BuildReport, Graph, GraphBuilder, LoadedGraph, Node, NodeKind, ShelfStatus,
    derive_relationships, load_document, load_value, sample_document,
};
pub use view::{Camera, CullBudget, GraphView, PointerEvent, Surface, ViewportCuller};
