use glam::Vec2;

use crate::graph::model::Node;

/// World-space camera center plus zoom factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: Vec2,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

/// Camera plus the screen it projects onto. Owns the pan/zoom rules so
/// callers only deal in screen coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub camera: Camera,
    pub size: Vec2,
    zoom_min: f32,
    zoom_max: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, zoom_min: f32, zoom_max: f32) -> Self {
        Self {
            camera: Camera::default(),
            size: Vec2::new(width, height),
            zoom_min,
            zoom_max,
        }
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.camera.center) * self.camera.zoom + self.size / 2.0
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.size / 2.0) / self.camera.zoom + self.camera.center
    }

    /// Drag the view by a screen-space pointer delta. The world appears
    /// to follow the pointer, so the camera moves against it.
    pub fn pan(&mut self, screen_delta: Vec2) {
        self.camera.center -= screen_delta / self.camera.zoom;
    }

    /// Multiply zoom by `factor`, clamped, keeping the world point
    /// under `screen` fixed on screen.
    pub fn zoom_at(&mut self, screen: Vec2, factor: f32) {
        let anchor = self.screen_to_world(screen);
        self.camera.zoom = (self.camera.zoom * factor).clamp(self.zoom_min, self.zoom_max);
        let drift = self.screen_to_world(screen) - anchor;
        self.camera.center -= drift;
    }

    /// Node under a world-space point, if any. The pick radius widens
    /// as zoom shrinks so small stars stay clickable when zoomed out.
    pub fn hit_test(&self, world: Vec2, nodes: &[Node]) -> Option<usize> {
        let slack = 20.0 / self.camera.zoom;
        nodes
            .iter()
            .position(|node| (node.position - world).length() < node.radius + slack)
    }
}
