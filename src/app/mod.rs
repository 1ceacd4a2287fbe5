use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use eframe::egui::{self, Context, Pos2, Rect, vec2};
use media_graph::media::{DeriveSummary, DocumentMetadata};
use media_graph::{
    BuildReport, GraphView, LoadedGraph, VisualizationConfig, load_document, load_value,
    sample_document,
};
use tracing::{error, info};

mod canvas;
mod ui;

pub struct MediaGraphApp {
    data_path: Option<PathBuf>,
    config: VisualizationConfig,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<LoadedGraph, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    view: GraphView,
    source_label: String,
    metadata: Option<DocumentMetadata>,
    report: BuildReport,
    derived: DeriveSummary,
    search: String,
    search_hits: Option<usize>,
    category: String,
}

impl MediaGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        data_path: Option<PathBuf>,
        config: VisualizationConfig,
    ) -> Self {
        let state = Self::start_load(data_path.clone(), &config);
        Self {
            data_path,
            config,
            state,
        }
    }

    fn spawn_load(path: PathBuf, config: &VisualizationConfig) -> Receiver<Result<LoadedGraph, String>> {
        let (tx, rx) = mpsc::channel();
        let options = config.build.clone();

        thread::spawn(move || {
            let result = fs::read_to_string(&path)
                .map_err(|error| format!("could not read {}: {error}", path.display()))
                .and_then(|text| load_document(&text, &options).map_err(|error| error.to_string()));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: Option<PathBuf>, config: &VisualizationConfig) -> AppState {
        match data_path {
            Some(path) => AppState::Loading {
                rx: Self::spawn_load(path, config),
            },
            None => Self::sample_state(config),
        }
    }

    fn sample_state(config: &VisualizationConfig) -> AppState {
        match load_value(sample_document(), &config.build) {
            Ok(loaded) => Self::ready_state(loaded, "built-in sample".to_owned(), config),
            Err(error) => AppState::Error(error.to_string()),
        }
    }

    fn ready_state(loaded: LoadedGraph, source_label: String, config: &VisualizationConfig) -> AppState {
        let viewport = Rect::from_min_size(
            Pos2::ZERO,
            vec2(config.view.width, config.view.height),
        );
        let LoadedGraph {
            graph,
            report,
            derived,
            metadata,
        } = loaded;

        match GraphView::init(graph, config, viewport) {
            Ok(view) => {
                info!(source = source_label.as_str(), "graph ready for display");
                AppState::Ready(Box::new(ViewModel::new(view, source_label, metadata, report, derived)))
            }
            Err(error) => AppState::Error(error.to_string()),
        }
    }

    fn source_label(&self) -> String {
        self.data_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "built-in sample".to_owned())
    }
}

impl eframe::App for MediaGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let source_label = self.source_label();

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(loaded) => Self::ready_state(loaded, source_label, &self.config),
                        Err(message) => {
                            error!(message = message.as_str(), "loading failed");
                            AppState::Error(message)
                        }
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading media graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Could not display the media graph");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if self.data_path.is_some() && ui.button("Retry").clicked() {
                            transition = Some(Self::start_load(self.data_path.clone(), &self.config));
                        }
                        if ui.button("Load sample data").clicked() {
                            transition = Some(Self::sample_state(&self.config));
                        }
                    });
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                model.show(ctx, &mut reload_requested);
                if reload_requested {
                    transition = Some(Self::start_load(self.data_path.clone(), &self.config));
                }
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
