use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use trail_core::Category;

/// How history records map onto nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeMode {
    /// Repeat visits to a domain collapse into one node; radius grows
    /// with visit count. The default.
    PerDomain,
    /// One node per history record; radius grows with dwell time.
    PerVisit,
}

impl Default for NodeMode {
    fn default() -> Self {
        Self::PerDomain
    }
}

/// Stable node identity, derived once at build time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Domain(String),
    Visit(u64),
}

/// One star in the constellation. Position and velocity belong to the
/// force simulator (or the pointer path while the node is pinned);
/// opacity belongs to replay.
#[derive(Debug, Clone)]
pub struct Node {
    pub key: NodeKey,
    pub label: String,
    pub url: String,
    pub domain: String,
    pub category: Category,
    pub color: &'static str,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub opacity: f32,
    pub visit_count: u32,
    pub dwell_seconds: f32,
    /// Index of the record that created this node, which is also the
    /// replay cursor position at which it lights up.
    pub first_record: usize,
    pub last_seen_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Consecutive visits within the temporal window; exerts spring force.
    Temporal,
    /// Inferred content relatedness; display only, no force.
    Semantic,
}

/// Connection between two nodes. Endpoints are indices into the node
/// vector, resolved at build time; an edge never stores a raw id.
#[derive(Debug, Clone)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    /// Always in (0, 1]; a candidate that clamps to zero is not created.
    pub strength: f32,
    pub kind: EdgeKind,
    /// Overlay flag for surprising category jumps; not exclusive with
    /// either kind.
    pub wormhole: bool,
}

impl Edge {
    pub fn touches(&self, a: usize, b: usize) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// The built graph. Rebuilt wholesale by each `build`; mutated in place
/// between builds by the simulator and replay.
#[derive(Debug, Default)]
pub struct Constellation {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    adjacency: Vec<SmallVec<[usize; 4]>>,
}

impl Constellation {
    pub fn push_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.adjacency.push(SmallVec::new());
        self.nodes.len() - 1
    }

    pub fn push_edge(&mut self, edge: Edge) -> usize {
        debug_assert!(edge.source < self.nodes.len() && edge.target < self.nodes.len());
        let idx = self.edges.len();
        self.adjacency[edge.source].push(idx);
        self.adjacency[edge.target].push(idx);
        self.edges.push(edge);
        idx
    }

    /// Edge of the given kind between an unordered pair, if any.
    pub fn edge_between(&self, a: usize, b: usize, kind: EdgeKind) -> Option<usize> {
        self.adjacency.get(a)?.iter().copied().find(|&e| {
            let edge = &self.edges[e];
            edge.kind == kind && edge.touches(a, b)
        })
    }

    /// Any edge between an unordered pair, regardless of kind.
    pub fn any_edge_between(&self, a: usize, b: usize) -> Option<usize> {
        self.adjacency
            .get(a)?
            .iter()
            .copied()
            .find(|&e| self.edges[e].touches(a, b))
    }

    /// Indices of edges incident to a node.
    pub fn edges_for_node(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency
            .get(node)
            .into_iter()
            .flat_map(|v| v.iter().copied())
    }

    pub fn wormhole_count(&self) -> usize {
        self.edges.iter().filter(|e| e.wormhole).count()
    }
}

/// Clamp an edge strength into (0, 1]. Returns `None` for strengths
/// that would round down to nothing.
pub fn clamp_strength(raw: f32) -> Option<f32> {
    if raw > 0.0 {
        Some(raw.min(1.0))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_node(domain: &str) -> Node {
        Node {
            key: NodeKey::Domain(domain.to_string()),
            label: domain.to_string(),
            url: String::new(),
            domain: domain.to_string(),
            category: Category::Other,
            color: Category::Other.color(),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            radius: 6.0,
            opacity: 1.0,
            visit_count: 1,
            dwell_seconds: 0.0,
            first_record: 0,
            last_seen_ms: 1,
        }
    }

    #[test]
    fn edge_lookup_is_orientation_agnostic() {
        let mut graph = Constellation::default();
        let a = graph.push_node(blank_node("a.com"));
        let b = graph.push_node(blank_node("b.com"));
        let c = graph.push_node(blank_node("c.com"));
        graph.push_edge(Edge {
            source: a,
            target: b,
            strength: 0.7,
            kind: EdgeKind::Temporal,
            wormhole: false,
        });

        assert!(graph.edge_between(a, b, EdgeKind::Temporal).is_some());
        assert!(graph.edge_between(b, a, EdgeKind::Temporal).is_some());
        assert!(graph.edge_between(a, b, EdgeKind::Semantic).is_none());
        assert!(graph.any_edge_between(a, c).is_none());
    }

    #[test]
    fn adjacency_tracks_incident_edges() {
        let mut graph = Constellation::default();
        let a = graph.push_node(blank_node("a.com"));
        let b = graph.push_node(blank_node("b.com"));
        let c = graph.push_node(blank_node("c.com"));
        graph.push_edge(Edge {
            source: a,
            target: b,
            strength: 0.5,
            kind: EdgeKind::Temporal,
            wormhole: false,
        });
        graph.push_edge(Edge {
            source: b,
            target: c,
            strength: 0.5,
            kind: EdgeKind::Semantic,
            wormhole: false,
        });

        assert_eq!(graph.edges_for_node(b).count(), 2);
        assert_eq!(graph.edges_for_node(a).count(), 1);
    }

    #[test]
    fn strength_clamps_into_unit_interval() {
        assert_eq!(clamp_strength(1.7), Some(1.0));
        assert_eq!(clamp_strength(0.3), Some(0.3));
        assert_eq!(clamp_strength(0.0), None);
        assert_eq!(clamp_strength(-0.2), None);
    }
}
