use eframe::egui::{self, Align, Context, Layout};
use media_graph::media::{DeriveSummary, DocumentMetadata};
use media_graph::{BuildReport, GraphView};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(
        view: GraphView,
        source_label: String,
        metadata: Option<DocumentMetadata>,
        report: BuildReport,
        derived: DeriveSummary,
    ) -> Self {
        Self {
            view,
            source_label,
            metadata,
            report,
            derived,
            search: String::new(),
            search_hits: None,
            category: "all".to_owned(),
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, reload_requested: &mut bool) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("media-graph");
                    ui.separator();
                    if let Some(username) = self
                        .metadata
                        .as_ref()
                        .and_then(|metadata| metadata.username.as_deref())
                    {
                        ui.label(format!("user: {username}"));
                    }
                    ui.label(format!("source: {}", self.source_label));
                    ui.label(format!("nodes: {}", self.view.graph().node_count()));
                    ui.label(format!("links: {}", self.view.graph().link_count()));
                    if ui.button("Reload").clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let culled = self.view.culled();
                        ui.label(format!(
                            "visible: {} nodes / {} links{}",
                            culled.nodes.len(),
                            culled.links.len(),
                            if culled.budget_applied { " (capped)" } else { "" }
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }
}
