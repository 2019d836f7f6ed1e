//! Chart Viewer Widget
//! Central scrollable panel drawing the Home and Overview pages with egui_plot.

use crate::charts::{theme, ChartKind, ChartPlotter};
use crate::data::{schema, DerivedTable, EmploymentStatus, UsageType};
use crate::gui::control_panel::Page;
use crate::stats::{AggregateCalculator, HomeSummary, OverviewSummary, PipelineError};
use egui::{Color32, RichText, ScrollArea};
use std::sync::Arc;
use tracing::warn;

const CHART_SPACING: f32 = 15.0;
const CHART_HEIGHT: f32 = 380.0;
const KPI_HEIGHT: f32 = 90.0;

/// Holds the loaded table and the summaries drawn on both pages.
pub struct ChartViewer {
    table: Option<Arc<DerivedTable>>,
    pub home: Option<HomeSummary>,
    pub overview: Option<OverviewSummary>,

    gender_usage: UsageType,
    usage_options: Vec<UsageType>,
    employment_options: Vec<EmploymentStatus>,
    selected_usage: UsageType,
    selected_employment: EmploymentStatus,
    error: Option<String>,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            table: None,
            home: None,
            overview: None,
            gender_usage: UsageType::Cash,
            usage_options: Vec::new(),
            employment_options: Vec::new(),
            selected_usage: UsageType::Cash,
            selected_employment: EmploymentStatus::Employed,
            error: None,
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Install a freshly loaded table: build the Home summary, read the
    /// selector options from the data and compute the first Overview.
    pub fn set_table(
        &mut self,
        table: Arc<DerivedTable>,
        survey_year: u16,
        coverage: &str,
    ) -> Result<(), PipelineError> {
        let df = table.get_dataframe();
        self.usage_options = AggregateCalculator::distinct_values(df, schema::USAGE_TYPE)?
            .iter()
            .filter_map(|label| UsageType::from_label(label))
            .collect();
        self.employment_options =
            AggregateCalculator::distinct_values(df, schema::EMPLOYMENT_STATUS)?
                .iter()
                .filter_map(|label| EmploymentStatus::from_label(label))
                .collect();

        self.selected_usage = pick(&self.usage_options, UsageType::Cash);
        self.selected_employment = pick(&self.employment_options, EmploymentStatus::Employed);

        self.home = Some(HomeSummary::build(&table, survey_year, coverage)?);
        self.table = Some(table);
        self.error = None;
        self.refresh_overview();
        Ok(())
    }

    fn refresh_overview(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        match OverviewSummary::build(table, self.selected_usage, self.selected_employment) {
            Ok(summary) => {
                self.overview = Some(summary);
                self.error = None;
            }
            Err(e) => {
                warn!(error = %e, "overview recomputation failed");
                self.overview = None;
                self.error = Some(e.to_string());
            }
        }
    }

    /// Draw the active page
    pub fn show(&mut self, ui: &mut egui::Ui, page: Page) {
        if self.home.is_none() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        }

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match page {
                Page::Home => self.show_home(ui),
                Page::Overview => self.show_overview(ui),
            });
    }

    fn show_home(&mut self, ui: &mut egui::Ui) {
        let Some(home) = &self.home else {
            return;
        };
        page_heading(ui, "Payment Dashboard");
        let half = (ui.available_width() - CHART_SPACING) / 2.0;

        ui.horizontal(|ui| {
            let kpis = kpi_values(home);
            let card = (ui.available_width() - (kpis.len() - 1) as f32 * CHART_SPACING)
                / kpis.len() as f32;
            for (i, (title, value)) in kpis.iter().enumerate() {
                if i > 0 {
                    ui.add_space(CHART_SPACING);
                }
                kpi_card(ui, card, title, value);
            }
        });
        ui.add_space(CHART_SPACING);

        ui.horizontal(|ui| {
            chart_card(ui, half, &ChartKind::UsageDonut.title(), |ui| {
                ChartPlotter::draw_donut(
                    ui,
                    "usage_donut",
                    &home.usage,
                    Some(home.headline.respondents.to_string()),
                    ChartKind::UsageDonut.empty_title(),
                    CHART_HEIGHT,
                );
            });
            ui.add_space(CHART_SPACING);

            let gender_usage = &mut self.gender_usage;
            chart_card(ui, half, &ChartKind::GenderDonut(*gender_usage).title(), |ui| {
                usage_combo(ui, "gender_usage", gender_usage, &UsageType::ALL);
                ChartPlotter::draw_donut(
                    ui,
                    "gender_donut",
                    home.genders_for(*gender_usage),
                    None,
                    ChartKind::GenderDonut(*gender_usage).empty_title(),
                    CHART_HEIGHT - 30.0,
                );
            });
        });
        ui.add_space(CHART_SPACING);

        ui.horizontal(|ui| {
            chart_card(ui, half, &ChartKind::RegionBars.title(), |ui| {
                ChartPlotter::draw_share_bars(
                    ui,
                    "region_bars",
                    &home.region_non_cash_share,
                    CHART_HEIGHT,
                );
            });
            ui.add_space(CHART_SPACING);
            chart_card(ui, half, &ChartKind::IncomeLines.title(), |ui| {
                ChartPlotter::draw_income_lines(ui, "income_lines", &home.income_usage, CHART_HEIGHT);
            });
        });
    }

    fn show_overview(&mut self, ui: &mut egui::Ui) {
        page_heading(ui, "Behavioral Analysis of Cash vs Non-Cash Usage");
        let mut changed = false;
        ui.horizontal(|ui| {
            ui.label(RichText::new("Usage").size(14.0));
            changed |= usage_combo(ui, "overview_usage", &mut self.selected_usage, &self.usage_options);
            ui.add_space(20.0);
            ui.label(RichText::new("Employment").size(14.0));
            egui::ComboBox::from_id_salt("overview_employment")
                .selected_text(self.selected_employment.label())
                .show_ui(ui, |ui| {
                    for option in &self.employment_options {
                        changed |= ui
                            .selectable_value(&mut self.selected_employment, *option, option.label())
                            .changed();
                    }
                });
            if let Some(overview) = &self.overview {
                ui.add_space(20.0);
                ui.label(
                    RichText::new(format!("{} respondents", overview.respondents))
                        .size(13.0)
                        .color(Color32::GRAY),
                );
            }
        });
        if changed {
            self.refresh_overview();
        }
        ui.add_space(CHART_SPACING);

        if let Some(error) = &self.error {
            ui.label(
                RichText::new(format!("Error: {error}")).color(Color32::from_rgb(220, 53, 69)),
            );
        }
        let Some(overview) = &self.overview else {
            return;
        };
        let half = (ui.available_width() - CHART_SPACING) / 2.0;

        ui.horizontal(|ui| {
            chart_card(ui, half, &ChartKind::StorageDonut.title(), |ui| {
                ChartPlotter::draw_donut(
                    ui,
                    "storage_donut",
                    &overview.storage,
                    None,
                    ChartKind::StorageDonut.empty_title(),
                    CHART_HEIGHT,
                );
            });
            ui.add_space(CHART_SPACING);
            chart_card(ui, half, &ChartKind::BarrierBubbles.title(), |ui| {
                ChartPlotter::draw_barrier_bubbles(
                    ui,
                    "barrier_bubbles",
                    &overview.barriers,
                    CHART_HEIGHT,
                );
            });
        });
        ui.add_space(CHART_SPACING);

        let full = ui.available_width();
        chart_card(ui, full, &ChartKind::TransactionComparison.title(), |ui| {
            ChartPlotter::draw_transaction_comparison(
                ui,
                "transaction_comparison",
                &overview.transactions,
                CHART_HEIGHT,
            );
        });
    }
}

/// Keep `preferred` when the data offers it, otherwise fall back to the
/// first option.
fn pick<T: Copy + PartialEq>(options: &[T], preferred: T) -> T {
    if options.is_empty() || options.contains(&preferred) {
        preferred
    } else {
        options[0]
    }
}

fn usage_combo(
    ui: &mut egui::Ui,
    id: &str,
    selected: &mut UsageType,
    options: &[UsageType],
) -> bool {
    let mut changed = false;
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected.label())
        .show_ui(ui, |ui| {
            for option in options {
                changed |= ui
                    .selectable_value(selected, *option, option.label())
                    .changed();
            }
        });
    changed
}

/// Headline cards of the Home page, left to right.
fn kpi_values(home: &HomeSummary) -> Vec<(&'static str, String)> {
    vec![
        ("Respondents", home.headline.respondents.to_string()),
        ("Non-Cash Users", home.headline.non_cash.to_string()),
        ("Cash Users", home.headline.cash.to_string()),
        ("Survey Year", home.survey_year.to_string()),
        ("Coverage", home.coverage.clone()),
    ]
}

fn page_heading(ui: &mut egui::Ui, title: &str) {
    ui.label(
        RichText::new(title)
            .size(24.0)
            .strong()
            .color(ChartPlotter::color(theme::TEXT)),
    );
    ui.add_space(CHART_SPACING);
}

fn kpi_card(ui: &mut egui::Ui, width: f32, title: &str, value: &str) {
    egui::Frame::none()
        .fill(ChartPlotter::color(theme::CARD_BG))
        .rounding(8.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.set_width(width - 24.0);
            ui.set_min_height(KPI_HEIGHT - 24.0);
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(title).size(14.0).color(Color32::GRAY));
                ui.label(
                    RichText::new(value)
                        .size(28.0)
                        .strong()
                        .color(ChartPlotter::color(theme::PURPLE)),
                );
            });
        });
}

fn chart_card(ui: &mut egui::Ui, width: f32, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::none()
        .fill(ChartPlotter::color(theme::CARD_BG))
        .rounding(8.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.set_width(width - 24.0);
            ui.vertical(|ui| {
                ui.label(
                    RichText::new(title)
                        .size(16.0)
                        .strong()
                        .color(ChartPlotter::color(theme::TEXT)),
                );
                ui.add_space(8.0);
                add_contents(ui);
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{frame, Respondent};
    use crate::data::ResponseTable;

    #[test]
    fn gender_selector_starts_on_cash() {
        assert_eq!(ChartViewer::new().gender_usage, UsageType::Cash);
    }

    #[test]
    fn home_cards_show_user_counts() {
        let responses = ResponseTable::from_dataframe(frame(&[
            Respondent::cash(),
            Respondent::cash(),
            Respondent::non_cash(),
        ]))
        .unwrap();
        let table = DerivedTable::from_responses(&responses).unwrap();
        let home = HomeSummary::build(&table, 2023, "Nationwide").unwrap();

        let kpis = kpi_values(&home);
        let titles: Vec<&str> = kpis.iter().map(|(title, _)| *title).collect();
        assert_eq!(
            titles,
            ["Respondents", "Non-Cash Users", "Cash Users", "Survey Year", "Coverage"]
        );
        assert_eq!(kpis[0].1, "3");
        assert_eq!(kpis[1].1, "1");
        assert_eq!(kpis[2].1, "2");
    }

    #[test]
    fn pick_prefers_default_when_offered() {
        let options = [UsageType::NonCash, UsageType::Cash];
        assert_eq!(pick(&options, UsageType::Cash), UsageType::Cash);
    }

    #[test]
    fn pick_falls_back_to_first_option() {
        let options = [EmploymentStatus::Unemployed];
        assert_eq!(
            pick(&options, EmploymentStatus::Employed),
            EmploymentStatus::Unemployed
        );
        assert_eq!(pick(&[], UsageType::Cash), UsageType::Cash);
    }
}
