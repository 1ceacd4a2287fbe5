use std::time::Instant;

use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Stroke, Ui, vec2};
use media_graph::PointerEvent;

use super::ViewModel;

fn draw_background(painter: &Painter, rect: Rect, origin: Pos2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

impl ViewModel {
    fn forward_pointer(&mut self, ui: &Ui, response: &egui::Response, now: Instant) {
        let (hover, latest, moved, pressed, released, scroll) = ui.input(|input| {
            (
                input.pointer.hover_pos(),
                input.pointer.latest_pos(),
                input.pointer.delta() != egui::Vec2::ZERO,
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
                input.raw_scroll_delta.y,
            )
        });

        match hover {
            Some(at) if moved || pressed => {
                self.view.handle_pointer(PointerEvent::Moved(at), now);
            }
            None => {
                self.view.handle_pointer(PointerEvent::Left, now);
            }
            _ => {}
        }

        if pressed
            && response.hovered()
            && let Some(at) = hover
        {
            self.view.handle_pointer(PointerEvent::Pressed(at), now);
        }

        if released && let Some(at) = latest {
            self.view.handle_pointer(PointerEvent::Released(at), now);
        }

        if response.hovered()
            && scroll.abs() > f32::EPSILON
            && let Some(at) = hover
        {
            self.view
                .handle_pointer(PointerEvent::Scrolled { at, delta: scroll }, now);
        }
    }

    pub(super) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.view.set_viewport(rect);
        let mut painter = ui.painter_at(rect);

        let camera = self.view.camera();
        draw_background(&painter, rect, camera.world_to_screen(egui::Vec2::ZERO), camera.zoom());

        let now = Instant::now();
        self.forward_pointer(ui, &response, now);
        let animating = self.view.frame(now);
        self.view.paint(&mut painter);

        if let Some(node) = self.view.hovered() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
            let mut text = format!("{}  |  {}", node.name, node.kind.label());
            if let Some(rating) = node.rating {
                text.push_str(&format!("  |  rating {rating:.1}/10"));
            }
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if animating || response.dragged() {
            ui.ctx().request_repaint();
        }
    }
}
