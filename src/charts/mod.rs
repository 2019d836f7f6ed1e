//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::ChartPlotter;
pub use renderer::{ChartKind, RenderError, StaticChartRenderer, SUMMARY_FILE};

/// Dashboard palette as RGB triples, shared by the interactive and static charts.
pub mod theme {
    pub const PURPLE: (u8, u8, u8) = (166, 109, 212); // #A66DD4
    pub const CYAN: (u8, u8, u8) = (79, 208, 233); // #4FD0E9
    pub const CHART_BG: (u8, u8, u8) = (18, 18, 18); // #121212
    pub const CARD_BG: (u8, u8, u8) = (26, 26, 26); // #1A1A1A
    pub const TEXT: (u8, u8, u8) = (255, 255, 255);

    /// Slice colors for categorical charts beyond the two brand colors.
    pub const SERIES: [(u8, u8, u8); 8] = [
        PURPLE,
        CYAN,
        (240, 98, 146),
        (255, 183, 77),
        (129, 199, 132),
        (121, 134, 203),
        (77, 182, 172),
        (186, 104, 200),
    ];

    pub fn series(index: usize) -> (u8, u8, u8) {
        SERIES[index % SERIES.len()]
    }

    /// Linear blend from purple (t = 0) to cyan (t = 1), the continuous scale
    /// used for percentage-colored bars and bubbles.
    pub fn scale(t: f64) -> (u8, u8, u8) {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        (
            mix(PURPLE.0, CYAN.0),
            mix(PURPLE.1, CYAN.1),
            mix(PURPLE.2, CYAN.2),
        )
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn scale_runs_from_purple_to_cyan() {
            assert_eq!(scale(0.0), PURPLE);
            assert_eq!(scale(1.0), CYAN);
            assert_eq!(scale(7.0), CYAN);
        }

        #[test]
        fn series_wraps_around() {
            assert_eq!(series(0), PURPLE);
            assert_eq!(series(SERIES.len() + 1), CYAN);
        }
    }
}
