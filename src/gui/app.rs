//! Dashboard Main Application
//! Main window with the top bar and the page viewer.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::data::{DataSource, DerivedTable};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::TopBottomPanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::{error, info};

/// Loading result from background thread
enum LoadResult {
    Progress(String),
    Complete(Arc<DerivedTable>),
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut app = Self {
            config,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        };

        let startup = app.config.data_path.clone();
        if startup.exists() {
            app.start_loading(startup);
        } else {
            app.control_panel
                .set_status(&format!("{} not found, browse for a survey file", startup.display()));
        }
        app
    }

    /// Handle data file selection
    fn handle_browse_data(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Survey Files", &["xlsx", "xls", "ods", "csv"])
            .pick_file()
        {
            self.start_loading(path);
        }
    }

    /// Read and derive the survey on a background thread.
    fn start_loading(&mut self, path: PathBuf) {
        self.chart_viewer.clear();
        self.control_panel.export_enabled = false;
        self.control_panel.data_path = Some(path.clone());
        self.control_panel.set_status("Loading survey...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress("Reading survey file...".to_string()));
            let responses = match DataSource::load(&path) {
                Ok(responses) => responses,
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                    return;
                }
            };

            let _ = tx.send(LoadResult::Progress("Deriving categories...".to_string()));
            match DerivedTable::from_responses(&responses) {
                Ok(table) => {
                    let _ = tx.send(LoadResult::Complete(Arc::new(table)));
                }
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                }
            }
        });
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.control_panel.set_status(&status);
                    }
                    LoadResult::Complete(table) => {
                        let rows = table.get_row_count();
                        match self.chart_viewer.set_table(
                            table,
                            self.config.survey_year,
                            &self.config.coverage,
                        ) {
                            Ok(()) => {
                                self.control_panel
                                    .set_status(&format!("Loaded {} respondents", rows));
                                self.control_panel.export_enabled = true;
                            }
                            Err(e) => {
                                error!(error = %e, "summarising survey failed");
                                self.control_panel.set_status(&format!("Error: {}", e));
                            }
                        }
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(e) => {
                        error!(error = %e, "loading survey failed");
                        self.control_panel.set_status(&format!("Error: {}", e));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Render every chart plus the summary into a chosen folder.
    fn handle_export_charts(&mut self) {
        let (Some(home), Some(overview)) = (&self.chart_viewer.home, &self.chart_viewer.overview)
        else {
            self.control_panel.set_status("No charts to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return;
        };

        let size = &self.config.export;
        let result = StaticChartRenderer::export_all(home, overview, &dir, size.width, size.height)
            .and_then(|charts| {
                StaticChartRenderer::write_summary(home, overview, &dir).map(|_| charts.len())
            });

        match result {
            Ok(count) => {
                info!(charts = count, dir = %dir.display(), "export finished");
                self.control_panel
                    .set_status(&format!("Exported {} charts to {}", count, dir.display()));
                if let Err(e) = open::that(&dir) {
                    error!(error = %e, "could not open export folder");
                }
            }
            Err(e) => {
                error!(error = %e, "export failed");
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        TopBottomPanel::top("control_panel").show(ctx, |ui| {
            ui.add_space(6.0);
            match self.control_panel.show(ui) {
                ControlPanelAction::BrowseData => self.handle_browse_data(),
                ControlPanelAction::ExportCharts => self.handle_export_charts(),
                ControlPanelAction::None => {}
            }
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let page = self.control_panel.page;
            self.chart_viewer.show(ui, page);
        });
    }
}
