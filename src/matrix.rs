//! Matrix chart geometry.
//!
//! `render_matrix` turns a topic snapshot plus the sidebar settings into a
//! declarative chart description (quadrant fills, axes, arrowheads and one
//! marker series per dimension). Rendering surfaces (the terminal canvas,
//! PNG/EPS export, JSON dump) only read this description.

use serde::Serialize;

use crate::palette::BackgroundTheme;
use crate::topic::{Dimension, Topic, SCORE_MAX, SCORE_MIN};

/// Where the axis lines end, past the data range so arrowheads have room.
pub const AXIS_END: f64 = 10.5;
/// Visible range of both axes.
pub const AXIS_RANGE: (f64, f64) = (-0.5, 11.0);
pub const AXIS_COLOR: &str = "#00AC97";
/// Marker diameter in chart units of the 800x800 surface.
pub const MARKER_SIZE: u32 = 18;
pub const CHART_SIZE: u32 = 800;
/// Series color when a group's first topic carries no color.
pub const MISSING_SERIES_COLOR: &str = "#888888";

pub const DEFAULT_THRESHOLD: f64 = 5.0;
pub const THRESHOLD_STEP: f64 = 0.5;

pub const X_AXIS_TITLE: &str = "财务重要性 (Financial Materiality)";
pub const Y_AXIS_TITLE: &str = "影响重要性 (Impact Materiality)";

/// One of the four regions split by the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Quadrant {
    /// Low financial, low impact.
    LowLow,
    /// Low financial, high impact.
    LowHigh,
    /// High financial, low impact.
    HighLow,
    /// Both above threshold: the priority quadrant.
    HighHigh,
}

impl Quadrant {
    pub const ALL: [Self; 4] = [Self::LowLow, Self::LowHigh, Self::HighLow, Self::HighHigh];

    pub fn opacity(self) -> f64 {
        match self {
            Self::LowLow => 0.05,
            Self::LowHigh | Self::HighLow => 0.12,
            Self::HighHigh => 0.25,
        }
    }

    /// Quadrant of a point. Scores equal to a threshold count as low.
    pub fn classify(
        financial: f64,
        impact: f64,
        threshold_financial: f64,
        threshold_impact: f64,
    ) -> Self {
        match (financial > threshold_financial, impact > threshold_impact) {
            (false, false) => Self::LowLow,
            (false, true) => Self::LowHigh,
            (true, false) => Self::HighLow,
            (true, true) => Self::HighHigh,
        }
    }

    /// Rectangle `(x0, y0, x1, y1)` of this quadrant inside the data square.
    pub fn bounds(self, threshold_financial: f64, threshold_impact: f64) -> (f64, f64, f64, f64) {
        let (tf, ti) = (threshold_financial, threshold_impact);
        match self {
            Self::LowLow => (SCORE_MIN, SCORE_MIN, tf, ti),
            Self::LowHigh => (SCORE_MIN, ti, tf, SCORE_MAX),
            Self::HighLow => (tf, SCORE_MIN, SCORE_MAX, ti),
            Self::HighHigh => (tf, ti, SCORE_MAX, SCORE_MAX),
        }
    }
}

/// Inputs of one render pass besides the topics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixParams {
    pub threshold_financial: f64,
    pub threshold_impact: f64,
    pub background: BackgroundTheme,
}

impl Default for MatrixParams {
    fn default() -> Self {
        Self {
            threshold_financial: DEFAULT_THRESHOLD,
            threshold_impact: DEFAULT_THRESHOLD,
            background: BackgroundTheme::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuadrantShape {
    pub quadrant: Quadrant,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub rgb: (u8, u8, u8),
    pub opacity: f64,
}

impl QuadrantShape {
    /// CSS style fill, e.g. `rgba(0, 150, 100, 0.25)`.
    pub fn fill_css(&self) -> String {
        let (r, g, b) = self.rgb;
        format!("rgba({}, {}, {}, {})", r, g, b, self.opacity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLine {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub color: &'static str,
    pub width: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArrowDirection {
    Right,
    Up,
}

/// Arrowhead annotation at the outer end of an axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrowhead {
    pub x: f64,
    pub y: f64,
    pub direction: ArrowDirection,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPoint {
    /// Label drawn centered on the marker.
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl MarkerPoint {
    /// Hover text: full name and both scores.
    pub fn hover_text(&self) -> String {
        format!("{}\n财务: {}\n影响: {}", self.name, self.x, self.y)
    }
}

/// All plotted topics of one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerSeries {
    pub dimension: Dimension,
    pub name: &'static str,
    pub color: String,
    pub marker_size: u32,
    pub points: Vec<MarkerPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLayout {
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    /// Both axes share one visual scale, so quadrants render square.
    pub equal_aspect: bool,
    pub show_ticks: bool,
    pub show_grid: bool,
    pub x_title: &'static str,
    pub y_title: &'static str,
    pub title_color: &'static str,
    pub width: u32,
    pub height: u32,
}

impl Default for AxisLayout {
    fn default() -> Self {
        Self {
            x_range: AXIS_RANGE,
            y_range: AXIS_RANGE,
            equal_aspect: true,
            show_ticks: false,
            show_grid: false,
            x_title: X_AXIS_TITLE,
            y_title: Y_AXIS_TITLE,
            title_color: AXIS_COLOR,
            width: CHART_SIZE,
            height: CHART_SIZE,
        }
    }
}

/// Complete chart description handed to a rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixChart {
    pub quadrants: Vec<QuadrantShape>,
    pub axes: Vec<AxisLine>,
    pub arrows: Vec<Arrowhead>,
    pub series: Vec<MarkerSeries>,
    pub layout: AxisLayout,
    pub threshold_financial: f64,
    pub threshold_impact: f64,
    pub background: &'static str,
}

impl MatrixChart {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    /// Every plotted point with its series color.
    pub fn points(&self) -> impl Iterator<Item = (&MarkerPoint, &str)> {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(move |p| (p, s.color.as_str())))
    }

    pub fn quadrant(&self, quadrant: Quadrant) -> Option<&QuadrantShape> {
        self.quadrants.iter().find(|q| q.quadrant == quadrant)
    }
}

/// A topic is plotted when its dimension is known and it carries a score.
pub fn is_plottable(topic: &Topic) -> bool {
    topic.dimension.is_some() && !topic.is_unscored()
}

fn quadrant_shapes(params: &MatrixParams) -> Vec<QuadrantShape> {
    if !params.background.fills_quadrants() {
        return Vec::new();
    }
    Quadrant::ALL
        .iter()
        .map(|&quadrant| {
            let (x0, y0, x1, y1) =
                quadrant.bounds(params.threshold_financial, params.threshold_impact);
            QuadrantShape {
                quadrant,
                x0,
                y0,
                x1,
                y1,
                rgb: params.background.rgb,
                opacity: quadrant.opacity(),
            }
        })
        .collect()
}

fn axes() -> (Vec<AxisLine>, Vec<Arrowhead>) {
    let line = |x1, y1| AxisLine {
        x0: 0.0,
        y0: 0.0,
        x1,
        y1,
        color: AXIS_COLOR,
        width: 2,
    };
    let lines = vec![line(AXIS_END, 0.0), line(0.0, AXIS_END)];
    let arrows = vec![
        Arrowhead {
            x: AXIS_END,
            y: 0.0,
            direction: ArrowDirection::Right,
            color: AXIS_COLOR,
        },
        Arrowhead {
            x: 0.0,
            y: AXIS_END,
            direction: ArrowDirection::Up,
            color: AXIS_COLOR,
        },
    ];
    (lines, arrows)
}

fn marker_series(topics: &[Topic]) -> Vec<MarkerSeries> {
    Dimension::ALL
        .iter()
        .filter_map(|&dimension| {
            let group: Vec<&Topic> = topics
                .iter()
                .filter(|t| t.dimension == Some(dimension) && is_plottable(t))
                .collect();
            let first = group.first()?;
            let color = if first.color.is_empty() {
                MISSING_SERIES_COLOR.to_string()
            } else {
                first.color.clone()
            };
            Some(MarkerSeries {
                dimension,
                name: dimension.label(),
                color,
                marker_size: MARKER_SIZE,
                points: group
                    .iter()
                    .map(|t| MarkerPoint {
                        id: t.id.clone(),
                        name: t.name.clone(),
                        x: t.financial_materiality,
                        y: t.impact_materiality,
                    })
                    .collect(),
            })
        })
        .collect()
}

/// Build the chart description for the current snapshot.
pub fn render_matrix(topics: &[Topic], params: &MatrixParams) -> MatrixChart {
    let (axes, arrows) = axes();
    MatrixChart {
        quadrants: quadrant_shapes(params),
        axes,
        arrows,
        series: marker_series(topics),
        layout: AxisLayout::default(),
        threshold_financial: params.threshold_financial,
        threshold_impact: params.threshold_impact,
        background: params.background.name,
    }
}

/// Clamp a threshold into the score range and snap it to the slider step.
pub fn snap_threshold(value: f64, step: f64) -> f64 {
    let step = if step > 0.0 { step } else { THRESHOLD_STEP };
    ((value / step).round() * step).clamp(SCORE_MIN, SCORE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{Palette, PRINT_BACKGROUND};
    use crate::store::TopicStore;

    fn topics() -> Vec<Topic> {
        TopicStore::new(
            vec![
                Topic::new("01", "Safety", Dimension::Social, 6.0, 7.0),
                Topic::new("02", "Quality", Dimension::Social, 2.0, 3.0),
                Topic::new("18", "Privacy", Dimension::Governance, 9.0, 1.0),
                Topic::new("00", "Placeholder", Dimension::Environmental, 0.0, 0.0),
            ],
            Palette::default(),
        )
        .topics()
        .to_vec()
    }

    #[test]
    fn test_quadrant_opacity_ordering() {
        assert!(Quadrant::LowLow.opacity() < Quadrant::LowHigh.opacity());
        assert_eq!(Quadrant::LowHigh.opacity(), Quadrant::HighLow.opacity());
        assert!(Quadrant::HighLow.opacity() < Quadrant::HighHigh.opacity());
    }

    #[test]
    fn test_four_quadrants_partition_square() {
        let params = MatrixParams {
            threshold_financial: 3.5,
            threshold_impact: 6.0,
            ..Default::default()
        };
        let chart = render_matrix(&[], &params);
        assert_eq!(chart.quadrants.len(), 4);
        let area: f64 = chart
            .quadrants
            .iter()
            .map(|q| (q.x1 - q.x0) * (q.y1 - q.y0))
            .sum();
        assert!((area - 100.0).abs() < 1e-9);
        let hh = chart.quadrant(Quadrant::HighHigh).unwrap();
        assert_eq!((hh.x0, hh.y0, hh.x1, hh.y1), (3.5, 6.0, 10.0, 10.0));
        assert_eq!(hh.fill_css(), "rgba(0, 150, 100, 0.25)");
    }

    #[test]
    fn test_print_background_has_no_fill() {
        let params = MatrixParams {
            background: BackgroundTheme::find(PRINT_BACKGROUND).unwrap(),
            ..Default::default()
        };
        let chart = render_matrix(&topics(), &params);
        assert!(chart.quadrants.is_empty());
        assert_eq!(chart.axes.len(), 2);
        assert_eq!(chart.point_count(), 3);
    }

    #[test]
    fn test_axes_and_arrows() {
        let chart = render_matrix(&[], &MatrixParams::default());
        assert_eq!(chart.axes[0].x1, AXIS_END);
        assert_eq!(chart.axes[1].y1, AXIS_END);
        assert_eq!(chart.arrows.len(), 2);
        assert_eq!(chart.arrows[0].direction, ArrowDirection::Right);
        assert_eq!(chart.arrows[1].direction, ArrowDirection::Up);
        assert_eq!(chart.layout.x_range, (-0.5, 11.0));
        assert!(chart.layout.equal_aspect);
        assert!(!chart.layout.show_ticks && !chart.layout.show_grid);
    }

    #[test]
    fn test_series_grouping_skips_empty_and_unscored() {
        let chart = render_matrix(&topics(), &MatrixParams::default());
        let dims: Vec<Dimension> = chart.series.iter().map(|s| s.dimension).collect();
        assert_eq!(dims, vec![Dimension::Social, Dimension::Governance]);
        assert_eq!(chart.series[0].points.len(), 2);
        assert_eq!(chart.series[0].color, "#FF8C66");
        assert!(chart.points().all(|(p, _)| p.id != "00"));
    }

    #[test]
    fn test_missing_dimension_not_plotted() {
        let mut t = Topic::blank();
        t.financial_materiality = 4.0;
        t.impact_materiality = 4.0;
        let chart = render_matrix(&[t], &MatrixParams::default());
        assert_eq!(chart.point_count(), 0);
        assert!(chart.series.is_empty());
    }

    #[test]
    fn test_classify_boundary_is_low() {
        assert_eq!(Quadrant::classify(7.0, 8.0, 5.0, 5.0), Quadrant::HighHigh);
        assert_eq!(Quadrant::classify(5.0, 8.0, 5.0, 5.0), Quadrant::LowHigh);
        assert_eq!(Quadrant::classify(8.0, 5.0, 5.0, 5.0), Quadrant::HighLow);
        assert_eq!(Quadrant::classify(1.0, 1.0, 5.0, 5.0), Quadrant::LowLow);
    }

    #[test]
    fn test_hover_text() {
        let p = MarkerPoint {
            id: "01".into(),
            name: "Safety".into(),
            x: 6.5,
            y: 7.0,
        };
        assert_eq!(p.hover_text(), "Safety\n财务: 6.5\n影响: 7");
    }

    #[test]
    fn test_snap_threshold() {
        assert_eq!(snap_threshold(5.2, 0.5), 5.0);
        assert_eq!(snap_threshold(5.3, 0.5), 5.5);
        assert_eq!(snap_threshold(12.0, 0.5), 10.0);
        assert_eq!(snap_threshold(-1.0, 0.5), 0.0);
        assert_eq!(snap_threshold(3.3, 0.0), 3.5);
    }
}
