use eframe::egui::{self, Color32, RichText, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(node) = self.view.selected() else {
            ui.label("Click a node to inspect its neighborhood.");
            return;
        };

        ui.label(RichText::new(node.name.as_str()).strong());
        ui.small(node.id.as_str());
        ui.add_space(6.0);

        ui.label(format!("Kind: {}", node.kind.label()));
        if let Some(category) = &node.category {
            ui.label(format!("Category: {category}"));
        }
        if let Some(status) = node.shelf_status {
            ui.label(format!("Shelf: {}", status.label()));
        }
        if let Some(rating) = node.rating {
            ui.label(format!("Rating: {rating:.1}/10"));
        }
        if let Some(url) = &node.url {
            ui.hyperlink(url);
        }

        let mut focus = None;
        ui.separator();
        ui.label(RichText::new("Connected").strong());
        if let Some(neighborhood) = self.view.emphasis().neighborhood() {
            let graph = self.view.graph();
            egui::ScrollArea::vertical().show(ui, |ui| {
                for link_index in &neighborhood.links {
                    let link = &graph.links()[*link_index];
                    let (other_id, outgoing) = if link.source_id == node.id {
                        (link.target_id.as_str(), true)
                    } else {
                        (link.source_id.as_str(), false)
                    };
                    let Some(other) = graph.index_of(other_id) else {
                        continue;
                    };
                    let arrow = if outgoing { "→" } else { "←" };
                    let text = format!("{arrow} {} ({})", graph.nodes()[other].name, link.relation);
                    let color = self.view.node_color(other).unwrap_or(Color32::GRAY);
                    if ui.link(RichText::new(text).color(color)).clicked() {
                        focus = Some(other);
                    }
                }
            });
        }

        if ui.button("Clear selection").clicked() {
            self.view.select(None);
            return;
        }
        if focus.is_some() {
            self.view.select(focus);
        }
    }
}
