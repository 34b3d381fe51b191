pub mod error;
pub mod graph;
mod manifest;

pub use error::GraphError;
pub use graph::{WorkspaceGraph, discover_graph};
