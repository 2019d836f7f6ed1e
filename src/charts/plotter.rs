//! Chart Plotter Module
//! Creates interactive dashboard charts using egui_plot.

use crate::charts::theme;
use crate::data::{IncomeGroup, UsageType};
use crate::stats::{AggregateResult, GroupShare, IncomeUsageCount, TransactionShare};
use egui::{Align2, Color32, RichText, Stroke};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text,
};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Inner radius of donut charts relative to the outer radius.
pub const DONUT_HOLE: f64 = 0.5;
/// Largest bubble radius in points.
const BUBBLE_MAX_RADIUS: f32 = 25.0;
/// Arc segments per full turn.
const RING_STEPS: f64 = 120.0;

/// Creates dashboard visualizations using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn color(rgb: (u8, u8, u8)) -> Color32 {
        Color32::from_rgb(rgb.0, rgb.1, rgb.2)
    }

    /// Split a ring slice into convex quads (egui fills convex shapes only).
    ///
    /// `start` and `end` are fractions of a full turn, measured clockwise
    /// from twelve o'clock.
    pub fn ring_segments(start: f64, end: f64, inner: f64, outer: f64) -> Vec<[[f64; 2]; 4]> {
        let span = end - start;
        if span <= 0.0 {
            return Vec::new();
        }
        let steps = ((span * RING_STEPS).ceil() as usize).max(1);
        let angle = |frac: f64| FRAC_PI_2 - TAU * frac;
        let point = |r: f64, a: f64| [r * a.cos(), r * a.sin()];

        (0..steps)
            .map(|i| {
                let a0 = angle(start + span * i as f64 / steps as f64);
                let a1 = angle(start + span * (i + 1) as f64 / steps as f64);
                [
                    point(outer, a0),
                    point(outer, a1),
                    point(inner, a1),
                    point(inner, a0),
                ]
            })
            .collect()
    }

    /// Label for an integer axis mark; blank between categories.
    pub fn category_label(labels: &[String], value: f64) -> String {
        let idx = value.round();
        if (value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }

    /// Radius for a bubble, scaled against the largest value.
    pub fn bubble_radius(value: f64, max_value: f64) -> f32 {
        if max_value <= 0.0 {
            return 0.0;
        }
        (BUBBLE_MAX_RADIUS * (value / max_value).sqrt() as f32).max(3.0)
    }

    fn category_marks(count: usize) -> Vec<GridMark> {
        (0..count)
            .map(|i| GridMark {
                value: i as f64,
                step_size: 1.0,
            })
            .collect()
    }

    /// "No data" card shown instead of an empty chart.
    pub fn draw_placeholder(ui: &mut egui::Ui, title: &str, height: f32) {
        egui::Frame::none()
            .fill(Self::color(theme::CHART_BG))
            .rounding(8.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_min_height(height);
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new(title).size(16.0).color(Color32::GRAY));
                });
            });
    }

    /// Donut chart of category shares, with an optional label in the hole.
    pub fn draw_donut(
        ui: &mut egui::Ui,
        id: &str,
        result: &AggregateResult,
        center_label: Option<String>,
        empty_title: &str,
        height: f32,
    ) {
        let AggregateResult::Categories(categories) = result else {
            Self::draw_placeholder(ui, empty_title, height);
            return;
        };

        Plot::new(id)
            .height(height)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .show_x(false)
            .show_y(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_x(-1.2)
            .include_x(1.2)
            .include_y(-1.1)
            .include_y(1.1)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                let mut start = 0.0;
                for (i, category) in categories.iter().enumerate() {
                    let end = start + category.percent / 100.0;
                    let color = Self::color(theme::series(i));
                    let name = format!("{} ({:.1}%)", category.label, category.percent);

                    for quad in Self::ring_segments(start, end, DONUT_HOLE, 1.0) {
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::from(quad.to_vec()))
                                .fill_color(color)
                                .stroke(Stroke::new(0.5, color))
                                .name(&name),
                        );
                    }
                    start = end;
                }

                if let Some(label) = center_label {
                    plot_ui.text(
                        Text::new(PlotPoint::new(0.0, 0.0), RichText::new(label).size(22.0))
                            .color(Color32::WHITE),
                    );
                }
            });
    }

    /// Horizontal bars of per-group percentages, colored on the brand scale.
    pub fn draw_share_bars(ui: &mut egui::Ui, id: &str, shares: &[GroupShare], height: f32) {
        if shares.is_empty() {
            Self::draw_placeholder(ui, "No region data available", height);
            return;
        }

        let labels: Vec<String> = shares.iter().map(|s| s.label.clone()).collect();
        let count = labels.len();
        let bars: Vec<Bar> = shares
            .iter()
            .enumerate()
            .map(|(i, share)| {
                Bar::new(i as f64, share.percent)
                    .name(format!("{}: {:.1}%", share.label, share.percent))
                    .fill(Self::color(theme::scale(share.percent / 100.0)))
                    .width(0.7)
            })
            .collect();

        Plot::new(id)
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_x(0.0)
            .include_x(110.0)
            .x_axis_label("Percent")
            .y_grid_spacer(move |_input| Self::category_marks(count))
            .y_axis_formatter(move |mark, _range| Self::category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).horizontal());
                for (i, share) in shares.iter().enumerate() {
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(share.percent + 1.0, i as f64),
                            format!("{:.1}%", share.percent),
                        )
                        .anchor(Align2::LEFT_CENTER)
                        .color(Color32::WHITE),
                    );
                }
            });
    }

    /// One line per usage type across the ordered income brackets.
    pub fn draw_income_lines(
        ui: &mut egui::Ui,
        id: &str,
        counts: &[IncomeUsageCount],
        height: f32,
    ) {
        let labels: Vec<String> = IncomeGroup::ALL
            .iter()
            .map(|g| g.label().to_string())
            .collect();
        let count = labels.len();

        Plot::new(id)
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_label("Income Group")
            .y_axis_label("Count")
            .legend(Legend::default())
            .x_grid_spacer(move |_input| Self::category_marks(count))
            .x_axis_formatter(move |mark, _range| Self::category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                for usage_type in [UsageType::NonCash, UsageType::Cash] {
                    let color = Self::color(Self::usage_color(usage_type));
                    let points: Vec<[f64; 2]> = IncomeGroup::ALL
                        .iter()
                        .enumerate()
                        .map(|(i, group)| {
                            let n = counts
                                .iter()
                                .find(|c| c.income_group == *group && c.usage_type == usage_type)
                                .map_or(0, |c| c.count);
                            [i as f64, n as f64]
                        })
                        .collect();

                    plot_ui.line(
                        Line::new(PlotPoints::from(points.clone()))
                            .color(color)
                            .width(2.5)
                            .name(usage_type.label()),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from(points))
                            .radius(4.0)
                            .color(color)
                            .name(usage_type.label()),
                    );
                }
            });
    }

    /// Bubble chart of barrier shares: x = percent, bubble size = percent.
    pub fn draw_barrier_bubbles(
        ui: &mut egui::Ui,
        id: &str,
        result: &AggregateResult,
        height: f32,
    ) {
        let AggregateResult::Categories(categories) = result else {
            Self::draw_placeholder(ui, "No barrier data available", height);
            return;
        };

        let labels: Vec<String> = categories.iter().map(|c| c.label.clone()).collect();
        let count = labels.len();
        let max = categories.iter().map(|c| c.percent).fold(0.0, f64::max);

        Plot::new(id)
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_x(0.0)
            .include_x(max * 1.2)
            .include_y(-0.5)
            .include_y(count as f64 - 0.5)
            .x_axis_label("Percent")
            .y_grid_spacer(move |_input| Self::category_marks(count))
            .y_axis_formatter(move |mark, _range| Self::category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                for (i, category) in categories.iter().enumerate() {
                    if category.count == 0 {
                        continue;
                    }
                    let color = Self::color(theme::scale(category.percent / max));
                    plot_ui.points(
                        Points::new(PlotPoints::from(vec![[category.percent, i as f64]]))
                            .radius(Self::bubble_radius(category.percent, max))
                            .color(color.gamma_multiply(0.8))
                            .name(format!("{}: {:.1}%", category.label, category.percent)),
                    );
                }
            });
    }

    /// Paired bubbles per transaction type for the two payment channels.
    pub fn draw_transaction_comparison(
        ui: &mut egui::Ui,
        id: &str,
        shares: &[TransactionShare],
        height: f32,
    ) {
        if shares.is_empty() {
            Self::draw_placeholder(ui, "No transaction data available", height);
            return;
        }

        let labels: Vec<String> = shares.iter().map(|s| s.transaction_type.clone()).collect();
        let count = labels.len();
        let max = shares
            .iter()
            .flat_map(|s| [s.banking_percent, s.wallet_percent])
            .fold(0.0, f64::max);

        Plot::new(id)
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_x(0.0)
            .include_x(max * 1.2)
            .include_y(-0.5)
            .include_y(count as f64 - 0.5)
            .x_axis_label("Տոկոս (%)")
            .legend(Legend::default())
            .y_grid_spacer(move |_input| Self::category_marks(count))
            .y_axis_formatter(move |mark, _range| Self::category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                let channels = [
                    ("Բանկային հավելված (%)", theme::PURPLE),
                    ("Էլեկտրոնային դրամապանակ (%)", theme::CYAN),
                ];
                for (channel, (name, rgb)) in channels.into_iter().enumerate() {
                    let color = Self::color(rgb);
                    for (i, share) in shares.iter().enumerate() {
                        let percent = if channel == 0 {
                            share.banking_percent
                        } else {
                            share.wallet_percent
                        };
                        if percent <= 0.0 {
                            continue;
                        }
                        plot_ui.points(
                            Points::new(PlotPoints::from(vec![[percent, i as f64]]))
                                .radius(Self::bubble_radius(percent, max))
                                .color(color.gamma_multiply(0.8))
                                .name(name),
                        );
                        plot_ui.text(
                            Text::new(
                                PlotPoint::new(percent, i as f64 + 0.3),
                                format!("{percent:.1}%"),
                            )
                            .color(Color32::WHITE),
                        );
                    }
                }
            });
    }

    /// Brand color of a usage type in every chart.
    pub fn usage_color(usage_type: UsageType) -> (u8, u8, u8) {
        match usage_type {
            UsageType::NonCash => theme::PURPLE,
            UsageType::Cash => theme::CYAN,
        }
    }
}
