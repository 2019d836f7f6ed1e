//! Control Panel Widget
//! Top bar with page navigation, data source and export controls.

use egui::{Color32, RichText};
use std::path::PathBuf;

/// Dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Overview,
}

impl Page {
    pub fn label(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Overview => "Overview",
        }
    }
}

/// Top bar with navigation and file controls.
pub struct ControlPanel {
    pub page: Page,
    pub data_path: Option<PathBuf>,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            page: Page::Home,
            data_path: None,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.horizontal(|ui| {
            ui.label(
                RichText::new("Non-Cash Dashboard")
                    .size(20.0)
                    .strong()
                    .color(Color32::from_rgb(166, 109, 212)),
            );
            ui.add_space(20.0);

            for page in [Page::Home, Page::Overview] {
                if ui
                    .selectable_label(self.page == page, RichText::new(page.label()).size(15.0))
                    .clicked()
                {
                    self.page = page;
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.add_enabled_ui(self.export_enabled, |ui| {
                    if ui.button("🖼 Export Charts").clicked() {
                        action = ControlPanelAction::ExportCharts;
                    }
                });
                if ui.button("📂 Browse").clicked() {
                    action = ControlPanelAction::BrowseData;
                }

                let path_text = self
                    .data_path
                    .as_ref()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "No file selected".to_string());
                ui.label(RichText::new(path_text).size(12.0).color(Color32::GRAY));

                let status_color = if self.status.starts_with("Error") {
                    Color32::from_rgb(220, 53, 69)
                } else {
                    Color32::GRAY
                };
                ui.label(RichText::new(&self.status).size(11.0).color(status_color));
            });
        });

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseData,
    ExportCharts,
}
