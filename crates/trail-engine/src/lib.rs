//! Constellation engine for TRAIL browsing history.
//!
//! Consumes an ordered sequence of [`trail_core::HistoryRecord`]s and
//! maintains a positioned graph of visits: temporal, semantic, and
//! wormhole edges, a force-directed layout relaxed one `step` at a
//! time, a pan/zoom viewport for a renderer, and a timeline replay
//! cursor. Rendering and storage are external; a UI shell drives the
//! [`Session`] and reads node/edge state back each frame.

pub mod graph;
pub mod render;
pub mod session;
pub mod util;

pub use graph::build::{BuildOutput, RandomProximity, SemanticProximity, WormholeHop};
pub use graph::model::{Constellation, Edge, EdgeKind, Node, NodeKey, NodeMode};
pub use graph::replay::ReplayState;
pub use render::camera::{Camera, Viewport};
pub use session::{EngineEvent, PointerGesture, Session, SessionStats};
pub use util::config::EngineConfig;
