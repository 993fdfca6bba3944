use std::time::Instant;

use trail_core::TimeRange;

use crate::session::{EngineEvent, Session};

/// Timeline replay cursor. `index` points at the most recently revealed
/// record of the active (filtered) history; nodes whose first visit
/// lies beyond it render dimmed.
#[derive(Debug, Clone)]
pub struct ReplayState {
    pub index: usize,
    pub playing: bool,
    pub time_range: TimeRange,
    pub(crate) last_step: Option<Instant>,
}

impl ReplayState {
    pub fn new(time_range: TimeRange) -> Self {
        Self {
            index: 0,
            playing: false,
            time_range,
            last_step: None,
        }
    }

    /// Replay progress in [0, 1].
    pub fn fraction(&self, record_count: usize) -> f32 {
        if record_count < 2 {
            return 1.0;
        }
        self.index as f32 / (record_count - 1) as f32
    }
}

impl Session {
    /// Start (or resume) playback. Playing from the end restarts from
    /// the beginning.
    pub fn play(&mut self) {
        if self.records.is_empty() {
            return;
        }
        if self.replay.index >= self.records.len() - 1 {
            self.replay.index = 0;
            self.apply_replay_opacity();
        }
        self.replay.playing = true;
        self.replay.last_step = None;
    }

    pub fn pause(&mut self) {
        self.replay.playing = false;
    }

    /// Rewind to the beginning and play the whole pass.
    pub fn restart(&mut self) {
        self.replay.index = 0;
        self.replay.last_step = None;
        self.apply_replay_opacity();
        if !self.records.is_empty() {
            self.replay.playing = true;
        }
    }

    /// Jump the cursor to a fraction of the timeline. Out-of-range
    /// input clamps; playback state is untouched.
    pub fn scrub(&mut self, fraction: f32) {
        if self.records.is_empty() {
            return;
        }
        let last = self.records.len() - 1;
        self.replay.index = (fraction.clamp(0.0, 1.0) * last as f32).round() as usize;
        self.apply_replay_opacity();
    }

    /// Advance the cursor if playing and enough wall time has elapsed
    /// since the previous step. Call once per frame.
    pub fn replay_tick(&mut self, now: Instant) {
        if !self.replay.playing || self.records.is_empty() {
            return;
        }
        match self.replay.last_step {
            None => {
                self.replay.last_step = Some(now);
                self.replay_step();
            }
            Some(prev) => {
                if now.duration_since(prev).as_millis() as u64 >= self.cfg.replay_step_ms {
                    self.replay.last_step = Some(now);
                    self.replay_step();
                }
            }
        }
    }

    /// One replay step: advance, restyle nodes, and narrate every few
    /// steps. Stepping at the end pauses.
    pub fn replay_step(&mut self) {
        if self.records.is_empty() {
            return;
        }
        if self.replay.index >= self.records.len() - 1 {
            self.replay.playing = false;
            return;
        }
        self.replay.index += 1;
        self.apply_replay_opacity();

        // A zero interval from a hand-edited config narrates every step.
        if self.replay.index % self.cfg.summary_interval.max(1) == 0 {
            let seen = &self.records[..=self.replay.index];
            if let Some(text) = super::story::journey_summary(seen, &mut self.rng) {
                let _ = self.events.send(EngineEvent::Journey(text));
            }
        }
    }

    /// Dim every node the cursor has not reached yet.
    pub(crate) fn apply_replay_opacity(&mut self) {
        let index = self.replay.index;
        let dimmed = self.cfg.dimmed_opacity;
        for node in &mut self.graph.nodes {
            node.opacity = if node.first_record <= index { 1.0 } else { dimmed };
        }
    }
}
