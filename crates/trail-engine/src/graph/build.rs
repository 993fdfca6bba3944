use glam::Vec2;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;
use trail_core::{Category, HistoryRecord};

use crate::graph::model::{
    clamp_strength, Constellation, Edge, EdgeKind, Node, NodeKey, NodeMode,
};
use crate::util::config::EngineConfig;

/// Injected similarity capability. The engine never assumes anything
/// about the algorithm beyond a synchronous score in [0, 1]; a real
/// TF-IDF/cosine implementation slots in without touching the builder.
pub trait SemanticProximity {
    fn score(&self, a: &str, b: &str) -> f32;
}

/// Placeholder proximity scoring uniformly in [0.1, 0.9). A real
/// similarity implementation slots in via the session constructor.
pub struct RandomProximity;

impl SemanticProximity for RandomProximity {
    fn score(&self, _a: &str, _b: &str) -> f32 {
        rand::thread_rng().gen::<f32>() * 0.8 + 0.1
    }
}

/// Category transitions considered surprising enough to flag a fast
/// jump between them as a wormhole. Symmetric.
const SURPRISING_JUMPS: [(Category, Category); 5] = [
    (Category::Edu, Category::Entertainment),
    (Category::Tech, Category::Entertainment),
    (Category::News, Category::Shopping),
    (Category::Finance, Category::Entertainment),
    (Category::Social, Category::Edu),
];

pub fn is_surprising_jump(a: Category, b: Category) -> bool {
    SURPRISING_JUMPS
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

/// One detected wormhole hop, surfaced to the presentation layer as a
/// fire-and-forget notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WormholeHop {
    pub from: Category,
    pub to: Category,
}

#[derive(Debug, Default)]
pub struct BuildOutput {
    pub constellation: Constellation,
    pub wormholes: Vec<WormholeHop>,
    /// Malformed records dropped during the node pass.
    pub skipped: usize,
}

fn radius_for(cfg: &EngineConfig, mode: NodeMode, visit_count: u32, dwell_seconds: f32) -> f32 {
    let ratio = match mode {
        NodeMode::PerDomain => (visit_count as f32 / 10.0).min(1.0),
        NodeMode::PerVisit => (dwell_seconds / 300.0).min(1.0),
    };
    cfg.node_size_min + (cfg.node_size_max - cfg.node_size_min) * ratio
}

/// Spiral slot for the n-th created node, plus jitter so coincident
/// starts cannot feed zero separations into the simulator.
fn spiral_position(cfg: &EngineConfig, n: usize, rng: &mut StdRng) -> Vec2 {
    let angle = n as f32 * cfg.spiral_angle_step;
    let distance = cfg.spiral_base_radius + n as f32 * cfg.spiral_radius_step;
    let j = cfg.placement_jitter;
    let jitter = Vec2::new(rng.gen_range(-j..=j), rng.gen_range(-j..=j));
    Vec2::new(angle.cos(), angle.sin()) * distance + jitter
}

/// Build a constellation from an ordered history slice. Pure apart
/// from the injected proximity function and placement jitter drawn
/// from `rng`; with both fixed, the edge topology is deterministic.
pub fn build(
    records: &[HistoryRecord],
    cfg: &EngineConfig,
    proximity: &dyn SemanticProximity,
    rng: &mut StdRng,
) -> BuildOutput {
    let mut out = BuildOutput::default();
    if records.is_empty() {
        return out;
    }

    let graph = &mut out.constellation;
    // Well-formed records in input order, paired with their node index.
    let mut kept: Vec<(usize, usize)> = Vec::with_capacity(records.len());
    let mut by_domain: HashMap<String, usize> = HashMap::new();

    for (i, rec) in records.iter().enumerate() {
        if !rec.is_wellformed() {
            out.skipped += 1;
            continue;
        }

        let dwell = rec.dwell_time.unwrap_or(30.0);
        let node_idx = match cfg.node_mode {
            NodeMode::PerDomain => {
                let key = rec.domain_key();
                if let Some(&n) = by_domain.get(&key) {
                    let node = &mut graph.nodes[n];
                    node.visit_count += 1;
                    node.dwell_seconds += dwell;
                    node.last_seen_ms = rec.timestamp;
                    node.radius = radius_for(cfg, cfg.node_mode, node.visit_count, node.dwell_seconds);
                    n
                } else {
                    let n = create_node(graph, cfg, rec, i, NodeKey::Domain(key.clone()), dwell, rng);
                    by_domain.insert(key, n);
                    n
                }
            }
            NodeMode::PerVisit => {
                let key = NodeKey::Visit(rec.id.unwrap_or(i as u64));
                create_node(graph, cfg, rec, i, key, dwell, rng)
            }
        };
        kept.push((i, node_idx));
    }

    // Temporal edges between consecutive visits.
    for pair in kept.windows(2) {
        let (ri, a) = pair[0];
        let (rj, b) = pair[1];
        if a == b {
            continue;
        }
        let dt = records[rj].timestamp - records[ri].timestamp;
        if dt < 0 || dt >= cfg.temporal_window_ms {
            continue;
        }
        let raw = 1.0 - dt as f32 / cfg.temporal_window_ms as f32;
        let Some(strength) = clamp_strength(raw) else {
            continue;
        };
        match graph.edge_between(a, b, EdgeKind::Temporal) {
            Some(e) => {
                let edge = &mut graph.edges[e];
                edge.strength = edge.strength.max(strength);
            }
            None => {
                graph.push_edge(Edge {
                    source: a,
                    target: b,
                    strength,
                    kind: EdgeKind::Temporal,
                    wormhole: false,
                });
            }
        }
    }

    // Semantic edges for pairs inside the one-hour window but beyond
    // the temporal one. Timestamps ascend, so the inner loop breaks as
    // soon as the window is exceeded; the O(n^2) scan only touches
    // candidate pairs.
    for x in 0..kept.len() {
        let (ri, a) = kept[x];
        for &(rj, b) in &kept[x + 1..] {
            let dt = records[rj].timestamp - records[ri].timestamp;
            if dt >= cfg.semantic_window_ms {
                break;
            }
            if dt < cfg.temporal_window_ms || a == b {
                continue;
            }
            let (ta, tb) = (records[ri].text(), records[rj].text());
            if ta.len() <= 50 || tb.len() <= 50 {
                continue;
            }
            let score = proximity.score(ta, tb).clamp(0.0, 1.0);
            if score <= cfg.semantic_threshold {
                continue;
            }
            let Some(strength) = clamp_strength(score) else {
                continue;
            };
            match graph.edge_between(a, b, EdgeKind::Semantic) {
                Some(e) => {
                    let edge = &mut graph.edges[e];
                    edge.strength = edge.strength.max(strength);
                }
                None => {
                    graph.push_edge(Edge {
                        source: a,
                        target: b,
                        strength,
                        kind: EdgeKind::Semantic,
                        wormhole: false,
                    });
                }
            }
        }
    }

    // Wormholes: fast transitions across a surprising category pair.
    for pair in kept.windows(2) {
        let (ri, a) = pair[0];
        let (rj, b) = pair[1];
        if a == b {
            continue;
        }
        let dt = records[rj].timestamp - records[ri].timestamp;
        if dt < 0 || dt >= cfg.wormhole_window_ms {
            continue;
        }
        let from = records[ri].category();
        let to = records[rj].category();
        if from == to || !is_surprising_jump(from, to) {
            continue;
        }
        match graph.any_edge_between(a, b) {
            Some(e) => graph.edges[e].wormhole = true,
            None => {
                graph.push_edge(Edge {
                    source: a,
                    target: b,
                    strength: 0.5,
                    kind: EdgeKind::Temporal,
                    wormhole: true,
                });
            }
        }
        out.wormholes.push(WormholeHop { from, to });
    }

    if out.skipped > 0 {
        tracing::warn!(skipped = out.skipped, "dropped malformed history records");
    }
    tracing::debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        wormholes = out.wormholes.len(),
        "constellation built"
    );
    out
}

fn create_node(
    graph: &mut Constellation,
    cfg: &EngineConfig,
    rec: &HistoryRecord,
    record_index: usize,
    key: NodeKey,
    dwell: f32,
    rng: &mut StdRng,
) -> usize {
    let category = rec.category();
    let label = if rec.title.is_empty() {
        rec.domain_key()
    } else {
        rec.title.clone()
    };
    let position = spiral_position(cfg, graph.nodes.len(), rng);
    graph.push_node(Node {
        key,
        label,
        url: rec.url.clone(),
        domain: rec.domain_key(),
        category,
        color: category.color(),
        position,
        velocity: Vec2::ZERO,
        radius: radius_for(cfg, cfg.node_mode, 1, dwell),
        opacity: 1.0,
        visit_count: 1,
        dwell_seconds: dwell,
        first_record: record_index,
        last_seen_ms: rec.timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const MIN: i64 = 60 * 1000;

    fn rec(ts: i64, domain: &str, category: Category) -> HistoryRecord {
        HistoryRecord {
            id: None,
            url: format!("https://{domain}/"),
            domain: domain.to_string(),
            title: format!("{domain} page"),
            timestamp: ts,
            category: Some(category),
            content_snippet: None,
            dwell_time: Some(60.0),
        }
    }

    fn snippet(mut r: HistoryRecord, text: &str) -> HistoryRecord {
        r.content_snippet = Some(text.to_string());
        r
    }

    fn long_text(tag: &str) -> String {
        format!("{tag}: {}", "lorem ipsum dolor sit amet ".repeat(4))
    }

    /// Deterministic stand-in for the injected similarity function.
    struct Fixed(f32);

    impl SemanticProximity for Fixed {
        fn score(&self, _a: &str, _b: &str) -> f32 {
            self.0
        }
    }

    fn build_with(records: &[HistoryRecord], cfg: &EngineConfig, score: f32) -> BuildOutput {
        let mut rng = StdRng::seed_from_u64(7);
        build(records, cfg, &Fixed(score), &mut rng)
    }

    #[test]
    fn empty_input_builds_empty_graph() {
        let out = build_with(&[], &EngineConfig::default(), 0.0);
        assert!(out.constellation.nodes.is_empty());
        assert!(out.constellation.edges.is_empty());
        assert!(out.wormholes.is_empty());
    }

    #[test]
    fn fast_surprising_jump_flags_the_temporal_edge() {
        let records = vec![
            rec(1_000_000, "a.com", Category::Tech),
            rec(1_000_000 + 2 * MIN, "b.com", Category::Entertainment),
        ];
        let out = build_with(&records, &EngineConfig::default(), 0.0);

        assert_eq!(out.constellation.edges.len(), 1);
        let edge = &out.constellation.edges[0];
        assert_eq!(edge.kind, EdgeKind::Temporal);
        assert!(edge.wormhole);
        assert!((edge.strength - 0.8).abs() < 1e-6);
        assert_eq!(
            out.wormholes,
            vec![WormholeHop {
                from: Category::Tech,
                to: Category::Entertainment
            }]
        );
    }

    #[test]
    fn wormhole_without_prior_edge_synthesizes_half_strength() {
        // Shrink the temporal window below the wormhole one so the
        // jump has no edge to piggyback on.
        let mut cfg = EngineConfig::default();
        cfg.temporal_window_ms = MIN;
        let records = vec![
            rec(1_000_000, "a.com", Category::Finance),
            rec(1_000_000 + 2 * MIN, "b.com", Category::Entertainment),
        ];
        let out = build_with(&records, &cfg, 0.0);

        assert_eq!(out.constellation.edges.len(), 1);
        let edge = &out.constellation.edges[0];
        assert!(edge.wormhole);
        assert_eq!(edge.strength, 0.5);
        assert_eq!(edge.kind, EdgeKind::Temporal);
    }

    #[test]
    fn unsurprising_jump_is_not_a_wormhole() {
        let records = vec![
            rec(1_000_000, "a.com", Category::Tech),
            rec(1_000_000 + 2 * MIN, "b.com", Category::News),
        ];
        let out = build_with(&records, &EngineConfig::default(), 0.0);
        assert_eq!(out.constellation.edges.len(), 1);
        assert!(!out.constellation.edges[0].wormhole);
        assert!(out.wormholes.is_empty());
    }

    #[test]
    fn no_temporal_edge_beyond_window() {
        let records = vec![
            rec(1_000_000, "a.com", Category::Tech),
            rec(1_000_000 + 700_000, "b.com", Category::Tech),
        ];
        let out = build_with(&records, &EngineConfig::default(), 0.0);
        assert!(out.constellation.edges.is_empty());
    }

    #[test]
    fn temporal_strength_decreases_with_gap() {
        let records = vec![
            rec(1_000_000, "a.com", Category::Tech),
            rec(1_000_000 + MIN, "b.com", Category::Tech),
            rec(1_000_000 + 6 * MIN, "c.com", Category::Tech),
        ];
        let out = build_with(&records, &EngineConfig::default(), 0.0);
        let graph = &out.constellation;
        assert_eq!(graph.edges.len(), 2);

        let near = graph.edge_between(0, 1, EdgeKind::Temporal).expect("near edge");
        let far = graph.edge_between(1, 2, EdgeKind::Temporal).expect("far edge");
        assert!(graph.edges[near].strength > graph.edges[far].strength);
        assert!((graph.edges[near].strength - 0.9).abs() < 1e-6);
        assert!((graph.edges[far].strength - 0.5).abs() < 1e-6);
    }

    #[test]
    fn semantic_edge_requires_window_text_and_threshold() {
        let base = 1_000_000;
        let records = vec![
            snippet(rec(base, "a.com", Category::Tech), &long_text("a")),
            snippet(rec(base + 30 * MIN, "b.com", Category::Tech), &long_text("b")),
        ];

        let out = build_with(&records, &EngineConfig::default(), 0.9);
        assert_eq!(out.constellation.edges.len(), 1);
        let edge = &out.constellation.edges[0];
        assert_eq!(edge.kind, EdgeKind::Semantic);
        assert!((edge.strength - 0.9).abs() < 1e-6);

        // Below threshold: no edge.
        let out = build_with(&records, &EngineConfig::default(), 0.5);
        assert!(out.constellation.edges.is_empty());

        // Short text: no edge even with a high score.
        let short = vec![
            rec(base, "a.com", Category::Tech),
            rec(base + 30 * MIN, "b.com", Category::Tech),
        ];
        let out = build_with(&short, &EngineConfig::default(), 0.9);
        assert!(out.constellation.edges.is_empty());
    }

    #[test]
    fn semantic_pass_skips_pairs_inside_temporal_window() {
        let base = 1_000_000;
        let records = vec![
            snippet(rec(base, "a.com", Category::Tech), &long_text("a")),
            snippet(rec(base + 2 * MIN, "b.com", Category::Tech), &long_text("b")),
        ];
        let out = build_with(&records, &EngineConfig::default(), 0.9);
        assert_eq!(out.constellation.edges.len(), 1);
        assert_eq!(out.constellation.edges[0].kind, EdgeKind::Temporal);
    }

    #[test]
    fn per_domain_mode_aggregates_repeat_visits() {
        let base = 1_000_000;
        let records = vec![
            rec(base, "a.com", Category::Tech),
            rec(base + MIN, "b.com", Category::Tech),
            rec(base + 2 * MIN, "a.com", Category::Tech),
        ];
        let out = build_with(&records, &EngineConfig::default(), 0.0);
        let graph = &out.constellation;

        assert_eq!(graph.nodes.len(), 2);
        let a = &graph.nodes[0];
        assert_eq!(a.domain, "a.com");
        assert_eq!(a.visit_count, 2);
        assert_eq!(a.last_seen_ms, base + 2 * MIN);
        assert!(a.radius > graph.nodes[1].radius);
        // a->b and b->a resolve to the same unordered pair.
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn consecutive_visits_to_one_domain_make_no_self_edge() {
        let base = 1_000_000;
        let records = vec![
            rec(base, "a.com", Category::Tech),
            rec(base + MIN, "a.com", Category::Tech),
        ];
        let out = build_with(&records, &EngineConfig::default(), 0.0);
        assert_eq!(out.constellation.nodes.len(), 1);
        assert!(out.constellation.edges.is_empty());
    }

    #[test]
    fn per_visit_mode_keeps_every_record() {
        let mut cfg = EngineConfig::default();
        cfg.node_mode = NodeMode::PerVisit;
        let base = 1_000_000;
        let records = vec![
            rec(base, "a.com", Category::Tech),
            rec(base + MIN, "a.com", Category::Tech),
        ];
        let out = build_with(&records, &cfg, 0.0);
        assert_eq!(out.constellation.nodes.len(), 2);
        assert_eq!(out.constellation.edges.len(), 1);
    }

    #[test]
    fn per_visit_radius_tracks_dwell_time() {
        let mut cfg = EngineConfig::default();
        cfg.node_mode = NodeMode::PerVisit;
        let mut short = rec(1_000_000, "a.com", Category::Tech);
        short.dwell_time = Some(10.0);
        let mut long = rec(2_000_000_000, "b.com", Category::Tech);
        long.dwell_time = Some(900.0);

        let out = build_with(&[short, long], &cfg, 0.0);
        let nodes = &out.constellation.nodes;
        assert!(nodes[0].radius < nodes[1].radius);
        assert_eq!(nodes[1].radius, cfg.node_size_max);
        assert!(nodes[0].radius >= cfg.node_size_min);
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let base = 1_000_000;
        let records = vec![
            rec(base, "a.com", Category::Tech),
            HistoryRecord::default(),
            rec(base + MIN, "b.com", Category::Tech),
        ];
        let out = build_with(&records, &EngineConfig::default(), 0.0);
        assert_eq!(out.skipped, 1);
        assert_eq!(out.constellation.nodes.len(), 2);
        // The surviving neighbors still link up.
        assert_eq!(out.constellation.edges.len(), 1);
    }

    #[test]
    fn edges_never_dangle() {
        let base = 1_000_000;
        let records: Vec<_> = (0..20)
            .map(|i| {
                let cat = if i % 3 == 0 { Category::Tech } else { Category::Entertainment };
                snippet(
                    rec(base + i * 3 * MIN, &format!("site{}.com", i % 7), cat),
                    &long_text("t"),
                )
            })
            .collect();
        let out = build_with(&records, &EngineConfig::default(), 0.8);
        let graph = &out.constellation;
        for edge in &graph.edges {
            assert!(edge.source < graph.nodes.len());
            assert!(edge.target < graph.nodes.len());
            assert_ne!(edge.source, edge.target);
            assert!(edge.strength > 0.0 && edge.strength <= 1.0);
        }
    }

    #[test]
    fn topology_is_deterministic_with_fixed_inputs() {
        let base = 1_000_000;
        let records: Vec<_> = (0..12)
            .map(|i| {
                let cat = if i % 2 == 0 { Category::Edu } else { Category::Entertainment };
                snippet(
                    rec(base + i * 4 * MIN, &format!("site{i}.com"), cat),
                    &long_text("t"),
                )
            })
            .collect();

        let first = build_with(&records, &EngineConfig::default(), 0.7);
        let second = build_with(&records, &EngineConfig::default(), 0.7);

        let shape = |out: &BuildOutput| {
            out.constellation
                .edges
                .iter()
                .map(|e| (e.source, e.target, e.kind, e.wormhole))
                .collect::<Vec<_>>()
        };
        assert_eq!(shape(&first), shape(&second));
        assert_eq!(first.wormholes, second.wormholes);
    }

    #[test]
    fn surprising_jump_table_is_symmetric() {
        assert!(is_surprising_jump(Category::Edu, Category::Entertainment));
        assert!(is_surprising_jump(Category::Entertainment, Category::Edu));
        assert!(!is_surprising_jump(Category::Tech, Category::News));
        assert!(!is_surprising_jump(Category::Other, Category::Other));
    }
}
