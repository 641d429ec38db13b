//! Matrix export to PNG (plotters bitmap) and EPS (minimal PostScript, no deps).

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::matrix::{ArrowDirection, MatrixChart, AXIS_RANGE};
use crate::palette::{blend_over_white, parse_hex};
use crate::ChartFormat;

/// File stem used for in-app chart exports.
pub const CHART_FILE_STEM: &str = "Double_Materiality_Matrix";

/// Marker fill when a series color cannot be parsed.
const FALLBACK_RGB: (u8, u8, u8) = (0x88, 0x88, 0x88);
/// Length of an arrowhead along its axis, in data units.
const ARROW_LEN: f64 = 0.3;
const ARROW_HALF_WIDTH: f64 = 0.15;

/// Escape a string for PostScript ( and ) and \.
fn ps_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Standard fonts only cover ASCII; drop anything else from PostScript text.
fn ps_text(s: &str) -> String {
    ps_escape(&s.chars().filter(|c| c.is_ascii()).collect::<String>())
}

fn rgb_of(hex: &str) -> (u8, u8, u8) {
    parse_hex(hex).unwrap_or(FALLBACK_RGB)
}

/// Triangle `(tip, base_a, base_b)` of an arrowhead whose tip sits at (x, y).
fn arrow_triangle(x: f64, y: f64, direction: ArrowDirection) -> [(f64, f64); 3] {
    match direction {
        ArrowDirection::Right => [
            (x, y),
            (x - ARROW_LEN, y + ARROW_HALF_WIDTH),
            (x - ARROW_LEN, y - ARROW_HALF_WIDTH),
        ],
        ArrowDirection::Up => [
            (x, y),
            (x - ARROW_HALF_WIDTH, y - ARROW_LEN),
            (x + ARROW_HALF_WIDTH, y - ARROW_LEN),
        ],
    }
}

/// Write the matrix in the requested format.
pub fn write_matrix_chart(path: &Path, chart: &MatrixChart, format: ChartFormat) -> Result<()> {
    match format {
        ChartFormat::Png => write_matrix_png(path, chart)?,
        ChartFormat::Eps => write_matrix_eps(path, chart)?,
    }
    log::info!(
        "exported matrix ({} points) to {}",
        chart.point_count(),
        path.display()
    );
    Ok(())
}

/// Write the matrix to EPS (Encapsulated PostScript). Quadrant opacity is
/// pre-blended over white since PostScript has no alpha.
pub fn write_matrix_eps(path: &Path, chart: &MatrixChart) -> Result<()> {
    const SIZE: f64 = 400.0;
    const MARGIN: f64 = 30.0;
    const PLOT: f64 = SIZE - 2.0 * MARGIN;

    let (lo, hi) = AXIS_RANGE;
    let to_px = |v: f64| MARGIN + (v - lo) / (hi - lo) * PLOT;
    let scale = PLOT / (hi - lo);

    let mut f = File::create(path)?;

    writeln!(f, "%!PS-Adobe-3.0 EPSF-3.0")?;
    writeln!(f, "%%BoundingBox: 0 0 {} {}", SIZE as i32, SIZE as i32)?;
    writeln!(f, "%%Creator: materiality")?;
    writeln!(f, "%%EndComments")?;
    writeln!(f, "gsave")?;

    // Quadrant fills
    for q in &chart.quadrants {
        let (r, g, b) = blend_over_white(q.rgb, q.opacity);
        writeln!(
            f,
            "{} {} {} setrgbcolor",
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0
        )?;
        writeln!(
            f,
            "{} {} {} {} rectfill",
            to_px(q.x0),
            to_px(q.y0),
            (q.x1 - q.x0) * scale,
            (q.y1 - q.y0) * scale
        )?;
    }

    // Axis lines
    for axis in &chart.axes {
        let (r, g, b) = rgb_of(axis.color);
        writeln!(
            f,
            "{} {} {} setrgbcolor {} setlinewidth",
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0,
            axis.width
        )?;
        writeln!(
            f,
            "{} {} moveto {} {} lineto stroke",
            to_px(axis.x0),
            to_px(axis.y0),
            to_px(axis.x1),
            to_px(axis.y1)
        )?;
    }

    // Arrowheads
    for arrow in &chart.arrows {
        let [a, b, c] = arrow_triangle(arrow.x, arrow.y, arrow.direction);
        writeln!(
            f,
            "{} {} moveto {} {} lineto {} {} lineto closepath fill",
            to_px(a.0),
            to_px(a.1),
            to_px(b.0),
            to_px(b.1),
            to_px(c.0),
            to_px(c.1)
        )?;
    }

    // Axis titles
    writeln!(f, "/Helvetica findfont 9 scalefont setfont")?;
    writeln!(
        f,
        "{} {} moveto ({}) show",
        MARGIN + PLOT / 2.0 - 40.0,
        MARGIN / 2.0,
        ps_text(chart.layout.x_title).trim()
    )?;
    writeln!(f, "gsave")?;
    writeln!(f, "{} {} translate 90 rotate", MARGIN / 2.0, MARGIN + PLOT / 2.0 - 40.0)?;
    writeln!(f, "0 0 moveto ({}) show", ps_text(chart.layout.y_title).trim())?;
    writeln!(f, "grestore")?;

    // Markers with centered id labels
    let radius = chart
        .series
        .first()
        .map(|s| s.marker_size as f64 / 2.0)
        .unwrap_or(9.0)
        * SIZE
        / chart.layout.width as f64;
    writeln!(f, "/Helvetica-Bold findfont 6 scalefont setfont")?;
    for series in &chart.series {
        let (r, g, b) = rgb_of(&series.color);
        for p in &series.points {
            let (x, y) = (to_px(p.x), to_px(p.y));
            writeln!(
                f,
                "{} {} {} setrgbcolor",
                r as f64 / 255.0,
                g as f64 / 255.0,
                b as f64 / 255.0
            )?;
            writeln!(f, "{} {} {} 0 360 arc fill", x, y, radius)?;
            writeln!(f, "1 setgray 0.5 setlinewidth")?;
            writeln!(f, "{} {} {} 0 360 arc stroke", x, y, radius)?;
            let label = ps_text(&p.id);
            let label_w = label.chars().count() as f64 * 3.4;
            writeln!(
                f,
                "{} {} moveto ({}) show",
                x - label_w / 2.0,
                y - 2.0,
                label
            )?;
        }
    }

    writeln!(f, "grestore")?;
    writeln!(f, "%%EOF")?;
    f.sync_all()?;
    Ok(())
}

/// Write the matrix to PNG using plotters bitmap backend.
pub fn write_matrix_png(path: &Path, chart: &MatrixChart) -> Result<()> {
    use plotters::prelude::*;
    use plotters::style::text_anchor::{HPos, Pos, VPos};

    let size = (chart.layout.width, chart.layout.height);
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = chart.layout.x_range;
    let (y_lo, y_hi) = chart.layout.y_range;
    let mut plot = ChartBuilder::on(&root)
        .margin(40)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    for q in &chart.quadrants {
        let (r, g, b) = q.rgb;
        plot.draw_series(std::iter::once(Rectangle::new(
            [(q.x0, q.y0), (q.x1, q.y1)],
            RGBColor(r, g, b).mix(q.opacity).filled(),
        )))?;
    }

    for axis in &chart.axes {
        let (r, g, b) = rgb_of(axis.color);
        plot.draw_series(std::iter::once(PathElement::new(
            vec![(axis.x0, axis.y0), (axis.x1, axis.y1)],
            RGBColor(r, g, b).stroke_width(axis.width),
        )))?;
    }

    for arrow in &chart.arrows {
        let (r, g, b) = rgb_of(arrow.color);
        let triangle = arrow_triangle(arrow.x, arrow.y, arrow.direction);
        plot.draw_series(std::iter::once(Polygon::new(
            triangle.to_vec(),
            RGBColor(r, g, b).filled(),
        )))?;
    }

    let label_style = TextStyle::from(("sans-serif", 10).into_font())
        .color(&WHITE)
        .pos(Pos::new(HPos::Center, VPos::Center));
    for series in &chart.series {
        let (r, g, b) = rgb_of(&series.color);
        let color = RGBColor(r, g, b);
        let radius = (series.marker_size / 2) as i32;
        plot.draw_series(series.points.iter().map(|p| {
            EmptyElement::at((p.x, p.y))
                + Circle::new((0, 0), radius, color.filled())
                + Circle::new((0, 0), radius, WHITE.stroke_width(1))
                + Text::new(p.id.clone(), (0, 0), label_style.clone())
        }))?;
    }

    let (ar, ag, ab) = rgb_of(chart.layout.title_color);
    let title_color = RGBColor(ar, ag, ab);
    let (w, h) = (size.0 as i32, size.1 as i32);
    root.draw(&Text::new(
        chart.layout.x_title,
        (w / 2, h - 20),
        TextStyle::from(("sans-serif", 14).into_font())
            .color(&title_color)
            .pos(Pos::new(HPos::Center, VPos::Center)),
    ))?;
    root.draw(&Text::new(
        chart.layout.y_title,
        (16, h / 2),
        TextStyle::from(("sans-serif", 14).into_font().transform(FontTransform::Rotate270))
            .color(&title_color)
            .pos(Pos::new(HPos::Center, VPos::Center)),
    ))?;

    root.present()
        .map_err(|e| eyre!("Failed to write {}: {}", path.display(), e))?;
    Ok(())
}
