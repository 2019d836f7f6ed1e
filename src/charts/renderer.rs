//! Static Chart Renderer
//! Renders the dashboard charts to PNG files with plotters.
//!
//! Every chart is drawn on the dark dashboard background:
//! 1. Title centered at the top
//! 2. Chart body (donut, horizontal bars, lines or bubbles)
//! 3. A "no data" placeholder when the aggregate is empty

use crate::charts::{theme, ChartPlotter};
use crate::data::{IncomeGroup, UsageType};
use crate::stats::{
    AggregateResult, GroupShare, HomeSummary, IncomeUsageCount, OverviewSummary,
    TransactionShare,
};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to prepare export directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to draw chart: {0}")]
    Draw(String),
    #[error("Failed to write summary: {0}")]
    Summary(#[from] serde_json::Error),
}

pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Serialize)]
struct SummaryFile<'a> {
    home: &'a HomeSummary,
    overview: &'a OverviewSummary,
}

trait Drawn<T> {
    fn drawn(self) -> Result<T, RenderError>;
}

impl<T, E: std::fmt::Display> Drawn<T> for Result<T, E> {
    fn drawn(self) -> Result<T, RenderError> {
        self.map_err(|e| RenderError::Draw(e.to_string()))
    }
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// The charts of both dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    UsageDonut,
    GenderDonut(UsageType),
    RegionBars,
    IncomeLines,
    StorageDonut,
    BarrierBubbles,
    TransactionComparison,
}

impl ChartKind {
    pub fn all() -> Vec<ChartKind> {
        vec![
            ChartKind::UsageDonut,
            ChartKind::GenderDonut(UsageType::Cash),
            ChartKind::GenderDonut(UsageType::NonCash),
            ChartKind::RegionBars,
            ChartKind::IncomeLines,
            ChartKind::StorageDonut,
            ChartKind::BarrierBubbles,
            ChartKind::TransactionComparison,
        ]
    }

    pub fn file_name(&self) -> String {
        let stem = match self {
            ChartKind::UsageDonut => "usage".to_string(),
            ChartKind::GenderDonut(UsageType::Cash) => "gender_cash".to_string(),
            ChartKind::GenderDonut(UsageType::NonCash) => "gender_non_cash".to_string(),
            ChartKind::RegionBars => "region".to_string(),
            ChartKind::IncomeLines => "income".to_string(),
            ChartKind::StorageDonut => "storage".to_string(),
            ChartKind::BarrierBubbles => "barriers".to_string(),
            ChartKind::TransactionComparison => "transactions".to_string(),
        };
        format!("{stem}.png")
    }

    pub fn title(&self) -> String {
        match self {
            ChartKind::UsageDonut => "Cash vs Non-Cash Usage".to_string(),
            ChartKind::GenderDonut(usage) => format!("Gender of {} Users", usage.label()),
            ChartKind::RegionBars => "Non-Cash Usage by Region".to_string(),
            ChartKind::IncomeLines => "Cash vs Non-Cash Usage by Income Group".to_string(),
            ChartKind::StorageDonut => "Preferred Storage Method".to_string(),
            ChartKind::BarrierBubbles => "Barriers to Non-Cash Usage".to_string(),
            ChartKind::TransactionComparison => "Անկանխիկ Գործարքների Համեմատություն".to_string(),
        }
    }

    /// Title drawn when the chart has nothing to show.
    pub fn empty_title(&self) -> &'static str {
        match self {
            ChartKind::StorageDonut => "No storage data available",
            ChartKind::BarrierBubbles => "No barrier data available",
            ChartKind::TransactionComparison => "No transaction data available",
            ChartKind::RegionBars => "No region data available",
            _ => "No data available",
        }
    }
}

fn rgb(c: (u8, u8, u8)) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

fn font(size: f64) -> TextStyle<'static> {
    ("sans-serif", size).into_font().color(&WHITE)
}

fn segment_label(labels: &[String], value: &SegmentValue<i32>) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

/// Generates PNG images of the dashboard charts.
pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every chart into `dir`, in parallel. Returns the written paths in
    /// [`ChartKind::all`] order.
    pub fn export_all(
        home: &HomeSummary,
        overview: &OverviewSummary,
        dir: &Path,
        width: u32,
        height: u32,
    ) -> Result<Vec<PathBuf>, RenderError> {
        fs::create_dir_all(dir)?;

        let paths = ChartKind::all()
            .par_iter()
            .map(|kind| {
                let path = dir.join(kind.file_name());
                Self::render(*kind, home, overview, &path, width, height)?;
                debug!(chart = ?kind, path = %path.display(), "rendered chart");
                Ok(path)
            })
            .collect::<Result<Vec<_>, RenderError>>()?;

        info!(charts = paths.len(), dir = %dir.display(), "exported dashboard charts");
        Ok(paths)
    }

    /// Write both page summaries as pretty JSON next to the images.
    pub fn write_summary(
        home: &HomeSummary,
        overview: &OverviewSummary,
        dir: &Path,
    ) -> Result<PathBuf, RenderError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(SUMMARY_FILE);
        let json = serde_json::to_string_pretty(&SummaryFile { home, overview })?;
        fs::write(&path, json)?;
        debug!(path = %path.display(), "wrote summary");
        Ok(path)
    }

    /// Render one chart to a PNG file.
    pub fn render(
        kind: ChartKind,
        home: &HomeSummary,
        overview: &OverviewSummary,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&rgb(theme::CHART_BG)).drawn()?;
        let body = root.titled(&kind.title(), font(26.0)).drawn()?;

        match kind {
            ChartKind::UsageDonut => Self::draw_donut(
                &body,
                &home.usage,
                Some(home.headline.respondents.to_string()),
                kind.empty_title(),
            )?,
            ChartKind::GenderDonut(usage) => {
                Self::draw_donut(&body, home.genders_for(usage), None, kind.empty_title())?
            }
            ChartKind::RegionBars => Self::draw_share_bars(&body, &home.region_non_cash_share)?,
            ChartKind::IncomeLines => Self::draw_income_lines(&body, &home.income_usage)?,
            ChartKind::StorageDonut => {
                Self::draw_donut(&body, &overview.storage, None, kind.empty_title())?
            }
            ChartKind::BarrierBubbles => Self::draw_bubbles(&body, &overview.barriers)?,
            ChartKind::TransactionComparison => {
                Self::draw_transactions(&body, &overview.transactions)?
            }
        }

        root.present().drawn()
    }

    fn draw_placeholder(area: &Area, title: &str) -> Result<(), RenderError> {
        let (w, h) = area.dim_in_pixel();
        let style = font(22.0)
            .color(&RGBColor(150, 150, 150))
            .pos(Pos::new(HPos::Center, VPos::Center));
        area.draw(&Text::new(title, ((w / 2) as i32, (h / 2) as i32), style))
            .drawn()
    }

    fn draw_donut(
        area: &Area,
        result: &AggregateResult,
        center_label: Option<String>,
        empty_title: &str,
    ) -> Result<(), RenderError> {
        let categories = result.categories();
        if categories.is_empty() {
            return Self::draw_placeholder(area, empty_title);
        }

        let (w, h) = area.dim_in_pixel();
        let center = ((w / 2) as i32, (h / 2) as i32);
        let radius = w.min(h) as f64 * 0.32;
        let sizes: Vec<f64> = categories.iter().map(|c| c.count as f64).collect();
        let colors: Vec<RGBColor> = (0..categories.len())
            .map(|i| rgb(theme::series(i)))
            .collect();
        let labels: Vec<String> = categories
            .iter()
            .map(|c| format!("{} {:.1}%", c.label, c.percent))
            .collect();

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.donut_hole(radius * crate::charts::plotter::DONUT_HOLE);
        pie.label_style(font(16.0));
        area.draw(&pie).drawn()?;

        if let Some(label) = center_label {
            let style = font(30.0).pos(Pos::new(HPos::Center, VPos::Center));
            area.draw(&Text::new(label, center, style)).drawn()?;
        }
        Ok(())
    }

    fn draw_share_bars(area: &Area, shares: &[GroupShare]) -> Result<(), RenderError> {
        if shares.is_empty() {
            return Self::draw_placeholder(area, ChartKind::RegionBars.empty_title());
        }

        let labels: Vec<String> = shares.iter().map(|s| s.label.clone()).collect();
        let n = shares.len() as i32;
        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(160)
            .build_cartesian_2d(0f64..115f64, (0..n).into_segmented())
            .drawn()?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(shares.len())
            .y_label_formatter(&|v: &SegmentValue<i32>| segment_label(&labels, v))
            .x_desc("Percent")
            .label_style(font(14.0))
            .axis_desc_style(font(14.0))
            .axis_style(WHITE.mix(0.6))
            .bold_line_style(WHITE.mix(0.1))
            .light_line_style(WHITE.mix(0.04))
            .draw()
            .drawn()?;

        chart
            .draw_series(shares.iter().enumerate().map(|(i, share)| {
                let i = i as i32;
                let color = rgb(theme::scale(share.percent / 100.0));
                let mut bar = Rectangle::new(
                    [
                        (0.0, SegmentValue::Exact(i)),
                        (share.percent, SegmentValue::Exact(i + 1)),
                    ],
                    color.filled(),
                );
                bar.set_margin(6, 6, 0, 0);
                bar
            }))
            .drawn()?;

        chart
            .draw_series(shares.iter().enumerate().map(|(i, share)| {
                Text::new(
                    format!("{:.1}%", share.percent),
                    (share.percent + 1.0, SegmentValue::CenterOf(i as i32)),
                    font(14.0),
                )
            }))
            .drawn()?;
        Ok(())
    }

    fn draw_income_lines(area: &Area, counts: &[IncomeUsageCount]) -> Result<(), RenderError> {
        let labels: Vec<String> = IncomeGroup::ALL
            .iter()
            .map(|g| g.label().to_string())
            .collect();
        let max = counts.iter().map(|c| c.count).max().unwrap_or(0).max(1) as f64;

        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(50)
            .build_cartesian_2d(
                (0..IncomeGroup::ALL.len() as i32).into_segmented(),
                0f64..max * 1.15,
            )
            .drawn()?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&|v: &SegmentValue<i32>| segment_label(&labels, v))
            .y_desc("Count")
            .label_style(font(12.0))
            .axis_desc_style(font(14.0))
            .axis_style(WHITE.mix(0.6))
            .bold_line_style(WHITE.mix(0.1))
            .light_line_style(WHITE.mix(0.04))
            .draw()
            .drawn()?;

        for usage_type in [UsageType::NonCash, UsageType::Cash] {
            let color = rgb(ChartPlotter::usage_color(usage_type));
            let points: Vec<(SegmentValue<i32>, f64)> = IncomeGroup::ALL
                .iter()
                .enumerate()
                .map(|(i, group)| {
                    let n = counts
                        .iter()
                        .find(|c| c.income_group == *group && c.usage_type == usage_type)
                        .map_or(0, |c| c.count);
                    (SegmentValue::CenterOf(i as i32), n as f64)
                })
                .collect();

            chart
                .draw_series(LineSeries::new(points.clone(), color.stroke_width(3)))
                .drawn()?
                .label(usage_type.label())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
            chart
                .draw_series(points.into_iter().map(|p| Circle::new(p, 5, color.filled())))
                .drawn()?;
        }

        chart
            .configure_series_labels()
            .background_style(rgb(theme::CARD_BG))
            .border_style(WHITE.mix(0.4))
            .label_font(font(14.0))
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .drawn()
    }

    fn draw_bubbles(area: &Area, result: &AggregateResult) -> Result<(), RenderError> {
        let categories = result.categories();
        if categories.is_empty() {
            return Self::draw_placeholder(area, ChartKind::BarrierBubbles.empty_title());
        }

        let labels: Vec<String> = categories.iter().map(|c| c.label.clone()).collect();
        let max = categories.iter().map(|c| c.percent).fold(0.0, f64::max);
        let mut chart = ChartBuilder::on(area)
            .margin(30)
            .x_label_area_size(40)
            .y_label_area_size(260)
            .build_cartesian_2d(0f64..max * 1.25, (0..labels.len() as i32).into_segmented())
            .drawn()?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(labels.len())
            .y_label_formatter(&|v: &SegmentValue<i32>| segment_label(&labels, v))
            .x_desc("Percent")
            .label_style(font(14.0))
            .axis_desc_style(font(14.0))
            .axis_style(WHITE.mix(0.6))
            .bold_line_style(WHITE.mix(0.1))
            .light_line_style(WHITE.mix(0.04))
            .draw()
            .drawn()?;

        chart
            .draw_series(
                categories
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.count > 0)
                    .map(|(i, c)| {
                        let color = rgb(theme::scale(c.percent / max));
                        let radius = (ChartPlotter::bubble_radius(c.percent, max) * 1.5) as i32;
                        Circle::new(
                            (c.percent, SegmentValue::CenterOf(i as i32)),
                            radius,
                            color.mix(0.85).filled(),
                        )
                    }),
            )
            .drawn()?;
        Ok(())
    }

    fn draw_transactions(area: &Area, shares: &[TransactionShare]) -> Result<(), RenderError> {
        if shares.is_empty() {
            return Self::draw_placeholder(area, ChartKind::TransactionComparison.empty_title());
        }

        let labels: Vec<String> = shares.iter().map(|s| s.transaction_type.clone()).collect();
        let max = shares
            .iter()
            .flat_map(|s| [s.banking_percent, s.wallet_percent])
            .fold(0.0, f64::max);
        let mut chart = ChartBuilder::on(area)
            .margin(30)
            .x_label_area_size(40)
            .y_label_area_size(220)
            .build_cartesian_2d(0f64..max * 1.25, (0..labels.len() as i32).into_segmented())
            .drawn()?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(labels.len())
            .y_label_formatter(&|v: &SegmentValue<i32>| segment_label(&labels, v))
            .x_desc("Տոկոս (%)")
            .label_style(font(14.0))
            .axis_desc_style(font(14.0))
            .axis_style(WHITE.mix(0.6))
            .bold_line_style(WHITE.mix(0.1))
            .light_line_style(WHITE.mix(0.04))
            .draw()
            .drawn()?;

        let channels: [(&str, (u8, u8, u8), fn(&TransactionShare) -> f64); 2] = [
            ("Բանկային հավելված (%)", theme::PURPLE, |s| s.banking_percent),
            ("Էլեկտրոնային դրամապանակ (%)", theme::CYAN, |s| s.wallet_percent),
        ];
        for (name, c, percent_of) in channels {
            let color = rgb(c);
            chart
                .draw_series(
                    shares
                        .iter()
                        .enumerate()
                        .filter(|(_, s)| percent_of(s) > 0.0)
                        .map(|(i, s)| {
                            let percent = percent_of(s);
                            let radius = (ChartPlotter::bubble_radius(percent, max) * 1.5) as i32;
                            Circle::new(
                                (percent, SegmentValue::CenterOf(i as i32)),
                                radius,
                                color.mix(0.85).filled(),
                            )
                        }),
                )
                .drawn()?
                .label(name)
                .legend(move |(x, y)| Circle::new((x + 10, y), 6, color.filled()));

            chart
                .draw_series(
                    shares
                        .iter()
                        .enumerate()
                        .filter(|(_, s)| percent_of(s) > 0.0)
                        .map(|(i, s)| {
                            Text::new(
                                format!("{:.1}%", percent_of(s)),
                                (percent_of(s), SegmentValue::Exact(i as i32)),
                                font(12.0),
                            )
                        }),
                )
                .drawn()?;
        }

        chart
            .configure_series_labels()
            .background_style(rgb(theme::CARD_BG))
            .border_style(WHITE.mix(0.4))
            .label_font(font(14.0))
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .drawn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{frame, Respondent};
    use crate::data::{DerivedTable, EmploymentStatus, ResponseTable};

    #[test]
    fn every_chart_has_a_distinct_file() {
        let kinds = ChartKind::all();
        let mut names: Vec<String> = kinds.iter().map(ChartKind::file_name).collect();
        names.sort();
        names.dedup();

        assert_eq!(names.len(), kinds.len());
        assert!(names.iter().all(|n| n.ends_with(".png")));
    }

    #[test]
    fn overview_placeholders_match_dashboard_wording() {
        assert_eq!(
            ChartKind::StorageDonut.empty_title(),
            "No storage data available"
        );
        assert_eq!(
            ChartKind::BarrierBubbles.empty_title(),
            "No barrier data available"
        );
    }

    fn summaries(usage: UsageType, employment: EmploymentStatus) -> (HomeSummary, OverviewSummary) {
        let responses = ResponseTable::from_dataframe(frame(&[
            Respondent::cash().with(|r| r.reasons = vec![0, 2]),
            Respondent::non_cash().with(|r| {
                r.banking = vec![0, 1];
                r.wallet = vec![1];
            }),
        ]))
        .unwrap();
        let table = DerivedTable::from_responses(&responses).unwrap();
        let home = HomeSummary::build(&table, 2023, "Nationwide").unwrap();
        let overview = OverviewSummary::build(&table, usage, employment).unwrap();
        (home, overview)
    }

    #[test]
    fn export_writes_every_chart() {
        let (home, overview) = summaries(UsageType::Cash, EmploymentStatus::Employed);
        let dir = tempfile::tempdir().unwrap();

        let paths = StaticChartRenderer::export_all(&home, &overview, dir.path(), 800, 600).unwrap();

        assert_eq!(paths.len(), ChartKind::all().len());
        for (path, kind) in paths.iter().zip(ChartKind::all()) {
            assert_eq!(path, &dir.path().join(kind.file_name()));
            assert!(fs::metadata(path).unwrap().len() > 0);
        }
    }

    #[test]
    fn empty_overview_renders_placeholders() {
        let (home, overview) = summaries(UsageType::NonCash, EmploymentStatus::Unemployed);
        assert_eq!(overview.respondents, 0);
        let dir = tempfile::tempdir().unwrap();

        for kind in [
            ChartKind::StorageDonut,
            ChartKind::BarrierBubbles,
            ChartKind::TransactionComparison,
        ] {
            let path = dir.path().join(kind.file_name());
            StaticChartRenderer::render(kind, &home, &overview, &path, 640, 480).unwrap();
            assert!(path.is_file());
        }
    }

    #[test]
    fn summary_holds_both_pages() {
        let (home, overview) = summaries(UsageType::Cash, EmploymentStatus::Employed);

        let dir = tempfile::tempdir().unwrap();
        let path = StaticChartRenderer::write_summary(&home, &overview, dir.path()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(path.file_name().unwrap(), SUMMARY_FILE);
        assert_eq!(json["home"]["headline"]["respondents"], 2);
        assert_eq!(json["overview"]["usage_type"], "Cash");
        assert_eq!(json["overview"]["respondents"], 1);
    }

    #[test]
    fn segment_labels_only_at_centers() {
        let labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(1)), "b");
        assert_eq!(segment_label(&labels, &SegmentValue::Exact(1)), "");
    }
}
