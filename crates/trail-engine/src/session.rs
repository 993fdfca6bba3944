use crossbeam_channel::{Receiver, Sender};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use trail_core::{Category, HistoryRecord, TimeRange};

use crate::graph::build::{self, RandomProximity, SemanticProximity};
use crate::graph::layout;
use crate::graph::model::Constellation;
use crate::graph::replay::ReplayState;
use crate::graph::story;
use crate::render::camera::Viewport;
use crate::util::config::EngineConfig;

/// Engine → presentation notifications. Fire-and-forget; send errors
/// after the receiver is gone are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Wormhole { from: Category, to: Category },
    Journey(String),
}

/// Pointer input in screen coordinates. The shell translates its own
/// input events into these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerGesture {
    Down(Vec2),
    Move(Vec2),
    Up,
    Wheel { at: Vec2, delta: f32 },
}

#[derive(Debug, Default)]
struct DragState {
    /// Node pinned under the pointer. While set, the simulator skips
    /// it and only the pointer path writes its position.
    dragged: Option<usize>,
    panning: bool,
    last_screen: Vec2,
}

/// Cheap read for a stats panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    pub nodes: usize,
    pub edges: usize,
    pub wormholes: usize,
    pub skipped_records: usize,
    /// Most-visited domain and its visit count.
    pub top_domain: Option<(String, u32)>,
}

/// One engine instance: records in, positioned constellation out.
/// A shell calls `frame` and `replay_tick` from its loop, routes
/// pointer input through `handle_pointer`, and reads `graph` and
/// `viewport` back when drawing.
pub struct Session {
    pub cfg: EngineConfig,
    pub graph: Constellation,
    pub viewport: Viewport,
    pub replay: ReplayState,
    /// Full record set as loaded, before time-range filtering.
    records_all: Vec<HistoryRecord>,
    /// Records inside the active time range; what build and replay see.
    pub(crate) records: Vec<HistoryRecord>,
    drag: DragState,
    proximity: Box<dyn SemanticProximity + Send>,
    pub(crate) rng: StdRng,
    pub(crate) events: Sender<EngineEvent>,
    skipped_last_build: usize,
}

impl Session {
    pub fn new(cfg: EngineConfig, width: f32, height: f32) -> (Self, Receiver<EngineEvent>) {
        Self::with_proximity(cfg, width, height, Box::new(RandomProximity))
    }

    pub fn with_proximity(
        cfg: EngineConfig,
        width: f32,
        height: f32,
        proximity: Box<dyn SemanticProximity + Send>,
    ) -> (Self, Receiver<EngineEvent>) {
        let (events, receiver) = crossbeam_channel::unbounded();
        let rng = match cfg.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let viewport = Viewport::new(width, height, cfg.zoom_min, cfg.zoom_max);
        let replay = ReplayState::new(cfg.default_time_range);
        let session = Self {
            cfg,
            graph: Constellation::default(),
            viewport,
            replay,
            records_all: Vec::new(),
            records: Vec::new(),
            drag: DragState::default(),
            proximity,
            rng,
            events,
            skipped_last_build: 0,
        };
        (session, receiver)
    }

    /// Replace the history and rebuild the constellation wholesale.
    /// `now_ms` anchors the active time range.
    pub fn load_records(&mut self, records: Vec<HistoryRecord>, now_ms: i64) {
        self.records_all = records;
        self.refilter(now_ms);
        self.rebuild();
    }

    /// Switch the active time range and rebuild from the retained set.
    pub fn set_time_range(&mut self, range: TimeRange, now_ms: i64) {
        self.replay.time_range = range;
        self.refilter(now_ms);
        self.rebuild();
    }

    fn refilter(&mut self, now_ms: i64) {
        let cutoff = self.replay.time_range.cutoff(now_ms);
        self.records = self
            .records_all
            .iter()
            .filter(|r| r.timestamp >= cutoff)
            .cloned()
            .collect();
    }

    fn rebuild(&mut self) {
        let out = build::build(&self.records, &self.cfg, self.proximity.as_ref(), &mut self.rng);
        self.graph = out.constellation;
        self.skipped_last_build = out.skipped;
        for hop in out.wormholes {
            tracing::debug!("{}", story::wormhole_text(hop.from, hop.to));
            let _ = self.events.send(EngineEvent::Wormhole {
                from: hop.from,
                to: hop.to,
            });
        }

        // A shorter history invalidates the old cursor.
        self.drag = DragState::default();
        if self.records.is_empty() {
            self.replay.index = 0;
            self.replay.playing = false;
        } else {
            self.replay.index = self.replay.index.min(self.records.len() - 1);
        }
        self.apply_replay_opacity();
    }

    /// Advance the layout by one frame of `dt` seconds.
    pub fn frame(&mut self, dt: f32) {
        layout::step(&mut self.graph, &self.cfg, self.drag.dragged, dt);
    }

    pub fn set_view_size(&mut self, width: f32, height: f32) {
        self.viewport.set_size(width, height);
    }

    pub fn handle_pointer(&mut self, gesture: PointerGesture) {
        match gesture {
            PointerGesture::Down(screen) => {
                let world = self.viewport.screen_to_world(screen);
                match self.viewport.hit_test(world, &self.graph.nodes) {
                    Some(i) => {
                        self.graph.nodes[i].velocity = Vec2::ZERO;
                        self.drag.dragged = Some(i);
                    }
                    None => self.drag.panning = true,
                }
                self.drag.last_screen = screen;
            }
            PointerGesture::Move(screen) => {
                if let Some(i) = self.drag.dragged {
                    let node = &mut self.graph.nodes[i];
                    node.position = self.viewport.screen_to_world(screen);
                    node.velocity = Vec2::ZERO;
                } else if self.drag.panning {
                    self.viewport.pan(screen - self.drag.last_screen);
                }
                self.drag.last_screen = screen;
            }
            PointerGesture::Up => {
                self.drag.dragged = None;
                self.drag.panning = false;
            }
            PointerGesture::Wheel { at, delta } => {
                let factor = if delta > 0.0 { 0.9 } else { 1.1 };
                self.viewport.zoom_at(at, factor);
            }
        }
    }

    pub fn dragged_node(&self) -> Option<usize> {
        self.drag.dragged
    }

    pub fn stats(&self) -> SessionStats {
        let top_domain = self
            .graph
            .nodes
            .iter()
            .max_by_key(|n| n.visit_count)
            .map(|n| (n.domain.clone(), n.visit_count));
        SessionStats {
            nodes: self.graph.nodes.len(),
            edges: self.graph.edges.len(),
            wormholes: self.graph.wormhole_count(),
            skipped_records: self.skipped_last_build,
            top_domain,
        }
    }
}
