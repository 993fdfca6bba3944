use glam::Vec2;

use crate::graph::model::{Constellation, EdgeKind};
use crate::util::config::EngineConfig;

/// Advance the force-directed layout by one frame.
///
/// Three forces act per step: inverse-square repulsion between nearby
/// pairs, a spring along temporal edges, and a weak pull toward the
/// origin. Velocities damp every step so the layout settles instead of
/// oscillating. A pinned node (the one under the pointer) is excluded
/// from integration entirely; its position belongs to the pointer.
///
/// `dt` is the wall-clock frame delta in seconds. Displacement scales
/// with it, normalized to a 60 fps baseline and clamped so a stalled
/// frame cannot fling nodes across the world.
pub fn step(graph: &mut Constellation, cfg: &EngineConfig, pinned: Option<usize>, dt: f32) {
    let n = graph.nodes.len();
    if n == 0 {
        return;
    }
    let scale = (dt * 60.0).clamp(0.25, 3.0);
    let mut forces = vec![Vec2::ZERO; n];

    let reach = 2.0 * cfg.connection_distance;
    for a in 0..n {
        for b in (a + 1)..n {
            let delta = graph.nodes[b].position - graph.nodes[a].position;
            // Distance floor keeps coincident nodes from producing an
            // unnormalizable direction or an unbounded force.
            let dist = delta.length().max(1.0);
            if dist >= reach {
                continue;
            }
            let push = cfg.repulsion / (dist * dist);
            let dir = delta / dist;
            forces[a] -= dir * push;
            forces[b] += dir * push;
        }
    }

    // Semantic edges are display-only; springs act on temporal ones.
    for edge in &graph.edges {
        if edge.kind != EdgeKind::Temporal {
            continue;
        }
        let delta = graph.nodes[edge.target].position - graph.nodes[edge.source].position;
        let dist = delta.length().max(1.0);
        // Strength is a display weight; the pull depends only on the
        // stretch past rest length.
        let stretch = dist - cfg.spring_rest_length;
        let pull = cfg.spring * stretch;
        let dir = delta / dist;
        forces[edge.source] += dir * pull;
        forces[edge.target] -= dir * pull;
    }

    for (i, node) in graph.nodes.iter_mut().enumerate() {
        if pinned == Some(i) {
            continue;
        }
        let force = forces[i] - node.position * cfg.gravity;
        node.velocity = (node.velocity + force) * cfg.damping;
        node.position += node.velocity * scale;
    }
}
