use eframe::egui::{Pos2, Rect, Vec2, vec2};

/// Pan/zoom transform between graph space and the screen viewport.
/// Graph-space origin maps to the viewport centre plus `pan`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    viewport: Rect,
    pan: Vec2,
    zoom: f32,
    min_scale: f32,
    max_scale: f32,
}

impl Camera {
    pub fn new(viewport: Rect, min_scale: f32, max_scale: f32) -> Self {
        let min_scale = min_scale.max(f32::EPSILON);
        Self {
            viewport,
            pan: Vec2::ZERO,
            zoom: 1.0_f32.clamp(min_scale, max_scale.max(min_scale)),
            min_scale,
            max_scale: max_scale.max(min_scale),
        }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn scale_range(&self) -> (f32, f32) {
        (self.min_scale, self.max_scale)
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    pub fn world_to_screen(&self, world: Vec2) -> Pos2 {
        self.viewport.center() + self.pan + world * self.zoom
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Vec2 {
        (screen - self.viewport.center() - self.pan) / self.zoom
    }

    /// Graph-space rectangle covered by the viewport, grown by `margin`
    /// screen pixels on every side.
    pub fn visible_world_rect(&self, margin: f32) -> Rect {
        let grown = self.viewport.expand(margin.max(0.0));
        Rect::from_two_pos(
            self.screen_to_world(grown.min).to_pos2(),
            self.screen_to_world(grown.max).to_pos2(),
        )
    }

    /// Screen-pixel length expressed in graph units at the current zoom.
    pub fn screen_to_world_len(&self, pixels: f32) -> f32 {
        pixels / self.zoom
    }

    pub fn set_scale(&mut self, scale: f32) {
        let anchor = self.viewport.center();
        self.zoom_at(anchor, scale / self.zoom);
    }

    /// Multiplies the zoom by `factor`, keeping the graph point under
    /// `anchor` in place. The result is clamped to the scale range.
    pub fn zoom_at(&mut self, anchor: Pos2, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }

        let world_before = self.screen_to_world(anchor);
        self.zoom = (self.zoom * factor).clamp(self.min_scale, self.max_scale);
        self.pan = anchor - self.viewport.center() - (world_before * self.zoom);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Puts `world` at the viewport centre with the given scale.
    pub fn center_on(&mut self, world: Vec2, scale: f32) {
        self.zoom = scale.clamp(self.min_scale, self.max_scale);
        self.pan = -world * self.zoom;
    }

    pub fn reset(&mut self, scale: f32) {
        self.center_on(Vec2::ZERO, scale);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0)), 0.1, 8.0)
    }
}
