use eframe::egui::{self, RichText, Ui};
use media_graph::NodeKind;
use media_graph::media::ORGANIZATIONAL_CATEGORIES;

use super::super::ViewModel;

const CATEGORY_CHOICES: [(&str, &str); 6] = [
    ("all", "All"),
    ("book", "Books"),
    ("movie", "Movies"),
    ("tv", "TV"),
    ("music", "Music"),
    ("podcast", "Podcasts"),
];

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("View");
        ui.horizontal(|ui| {
            if ui.button("Zoom in").clicked() {
                self.view.zoom_in();
            }
            if ui.button("Zoom out").clicked() {
                self.view.zoom_out();
            }
            if ui.button("Reset").clicked() {
                self.view.reset_view();
            }
        });
        ui.label(format!("zoom: {:.2}", self.view.camera().zoom()));
        ui.label(format!("layout: {:?}", self.view.layout_state()));

        ui.separator();
        ui.label(RichText::new("Search").strong());
        let search = ui.text_edit_singleline(&mut self.search);
        let submitted = search.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
        if submitted || ui.button("Find").clicked() {
            let hits = self.view.search_by_name(&self.search).len();
            self.search_hits = Some(hits);
        }
        match self.search_hits {
            Some(0) => {
                ui.label("No matches.");
            }
            Some(1) => {
                ui.label("1 match, centred.");
            }
            Some(hits) => {
                ui.label(format!("{hits} matches highlighted."));
            }
            None => {}
        }

        ui.separator();
        ui.label(RichText::new("Category").strong());
        let current = self.category.clone();
        egui::ComboBox::from_id_salt("category_filter")
            .selected_text(
                CATEGORY_CHOICES
                    .iter()
                    .find(|(value, _)| *value == current)
                    .map_or(current.as_str(), |(_, label)| *label),
            )
            .show_ui(ui, |ui| {
                for (value, label) in CATEGORY_CHOICES {
                    ui.selectable_value(&mut self.category, value.to_owned(), label);
                }
            });
        if self.category != current {
            self.view.filter_by_category(&self.category);
        }

        ui.label(RichText::new("Kind").strong());
        let mut kind = self.view.type_filter();
        ui.horizontal_wrapped(|ui| {
            ui.selectable_value(&mut kind, None, "any");
            for choice in NodeKind::ALL {
                ui.selectable_value(&mut kind, Some(choice), choice.label());
            }
        });
        if kind != self.view.type_filter() {
            self.view.filter_by_type(kind);
        }

        ui.separator();
        ui.label(RichText::new("Load summary").strong());
        ui.label(format!("records read: {}", self.report.raw_nodes));
        ui.label(format!("creators extracted: {}", self.report.creator_nodes));
        ui.label(format!("links dropped: {}", self.report.dropped_links));
        ui.label(format!("duplicates merged: {}", self.report.duplicate_nodes));
        ui.label(format!(
            "derived: {} worked_with, {} co_actor",
            self.derived.worked_with, self.derived.co_actor
        ));
        if self.report.organizational_links > 0 {
            ui.label(format!(
                "overview: {} categories, {} links",
                ORGANIZATIONAL_CATEGORIES.len(),
                self.report.organizational_links
            ));
        }
    }
}
