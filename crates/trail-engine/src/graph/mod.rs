pub mod build;
pub mod layout;
pub mod model;
pub mod replay;
pub mod story;

pub use build::{build, BuildOutput};
pub use model::{Constellation, Edge, EdgeKind, Node, NodeMode};
