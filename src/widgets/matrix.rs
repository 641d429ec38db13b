//! Terminal rendering of a [`MatrixChart`].
//!
//! The plot is a square in data space mapped onto a grid of terminal cells.
//! Cells are roughly twice as tall as they are wide, so the grid uses two
//! columns per row to keep quadrants visually square.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::config::ColorParser;
use crate::matrix::{ArrowDirection, MatrixChart, MarkerPoint};
use crate::palette::{blend_over_white, parse_hex};

const PAPER_RGB: (u8, u8, u8) = (255, 255, 255);

/// Mapping between data coordinates and the cells of a plot area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotGrid {
    pub area: Rect,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl PlotGrid {
    /// Largest plot with a 2:1 column to row ratio, centered in `area`.
    pub fn fit(area: Rect, x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        let cols = area.width.min(area.height.saturating_mul(2));
        let rows = cols / 2;
        let plot = Rect::new(
            area.x + (area.width - cols) / 2,
            area.y + (area.height - rows) / 2,
            cols,
            rows,
        );
        Self {
            area: plot,
            x_range,
            y_range,
        }
    }

    /// Data coordinates at the center of the cell at (col, row), relative to the plot.
    pub fn data_at(&self, col: u16, row: u16) -> (f64, f64) {
        let (x0, x1) = self.x_range;
        let (y0, y1) = self.y_range;
        let x = x0 + (col as f64 + 0.5) / self.area.width as f64 * (x1 - x0);
        let y = y1 - (row as f64 + 0.5) / self.area.height as f64 * (y1 - y0);
        (x, y)
    }

    /// Absolute buffer position of the cell containing (x, y), if it is inside the plot.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<(u16, u16)> {
        let (x0, x1) = self.x_range;
        let (y0, y1) = self.y_range;
        if self.area.is_empty() || !(x0..=x1).contains(&x) || !(y0..=y1).contains(&y) {
            return None;
        }
        let col = ((x - x0) / (x1 - x0) * self.area.width as f64).floor() as u16;
        let row = ((y1 - y) / (y1 - y0) * self.area.height as f64).floor() as u16;
        Some((
            self.area.x + col.min(self.area.width - 1),
            self.area.y + row.min(self.area.height - 1),
        ))
    }
}

pub struct MatrixCanvas<'a> {
    chart: &'a MatrixChart,
    parser: &'a ColorParser,
    /// Id of the topic selected in the table; its marker is highlighted.
    selected: Option<&'a str>,
    border_color: Color,
}

impl<'a> MatrixCanvas<'a> {
    pub fn new(chart: &'a MatrixChart, parser: &'a ColorParser) -> Self {
        Self {
            chart,
            parser,
            selected: None,
            border_color: Color::Reset,
        }
    }

    pub fn with_selected(mut self, id: Option<&'a str>) -> Self {
        self.selected = id.filter(|id| !id.is_empty());
        self
    }

    pub fn with_border_color(mut self, color: Color) -> Self {
        self.border_color = color;
        self
    }

    fn rgb(&self, (r, g, b): (u8, u8, u8)) -> Color {
        self.parser.rgb(r, g, b)
    }

    fn hex(&self, hex: &str) -> Color {
        self.rgb(parse_hex(hex).unwrap_or((0x88, 0x88, 0x88)))
    }

    /// Background color of the cell centered at (x, y).
    fn cell_background(&self, x: f64, y: f64) -> Color {
        self.chart
            .quadrants
            .iter()
            .find(|q| x >= q.x0 && x <= q.x1 && y >= q.y0 && y <= q.y1)
            .map(|q| self.rgb(blend_over_white(q.rgb, q.opacity)))
            .unwrap_or_else(|| self.rgb(PAPER_RGB))
    }

    fn selected_point(&self) -> Option<&MarkerPoint> {
        let id = self.selected?;
        self.chart.points().map(|(p, _)| p).find(|p| p.id == id)
    }

    fn render_plot(&self, grid: &PlotGrid, buf: &mut Buffer) {
        let plot = grid.area;
        for row in 0..plot.height {
            for col in 0..plot.width {
                let (x, y) = grid.data_at(col, row);
                buf[(plot.x + col, plot.y + row)]
                    .set_symbol(" ")
                    .set_bg(self.cell_background(x, y));
            }
        }

        for axis in &self.chart.axes {
            let style = Style::default().fg(self.hex(axis.color));
            let (Some(start), Some(end)) = (
                grid.cell_at(axis.x0, axis.y0),
                grid.cell_at(axis.x1, axis.y1),
            ) else {
                continue;
            };
            if start.1 == end.1 {
                for x in start.0.min(end.0)..=start.0.max(end.0) {
                    buf[(x, start.1)].set_symbol("─").set_style(style);
                }
            } else {
                for y in start.1.min(end.1)..=start.1.max(end.1) {
                    buf[(start.0, y)].set_symbol("│").set_style(style);
                }
            }
        }
        if self.chart.axes.len() >= 2 {
            if let Some(origin) = grid.cell_at(0.0, 0.0) {
                buf[origin].set_symbol("└");
            }
        }

        for arrow in &self.chart.arrows {
            if let Some(cell) = grid.cell_at(arrow.x, arrow.y) {
                let symbol = match arrow.direction {
                    ArrowDirection::Right => "▶",
                    ArrowDirection::Up => "▲",
                };
                buf[cell]
                    .set_symbol(symbol)
                    .set_style(Style::default().fg(self.hex(arrow.color)));
            }
        }

        for (point, color) in self.chart.points() {
            let Some((col, row)) = grid.cell_at(point.x, point.y) else {
                continue;
            };
            let label = if point.id.is_empty() { "●" } else { point.id.as_str() };
            let width = label.chars().count() as u16;
            let start = col
                .saturating_sub(width.saturating_sub(1) / 2)
                .max(plot.x);
            let mut style = Style::default()
                .fg(Color::Black)
                .bg(self.hex(color))
                .add_modifier(Modifier::BOLD);
            if self.selected.is_some() && self.selected == Some(point.id.as_str()) {
                style = style.add_modifier(Modifier::REVERSED | Modifier::UNDERLINED);
            }
            buf.set_stringn(start, row, label, (plot.right() - start) as usize, style);
        }
    }
}

impl Widget for MatrixCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" 双重重要性矩阵 · {} ", self.chart.background))
            .border_style(Style::default().fg(self.border_color));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width < 4 || inner.height < 4 {
            return;
        }

        let [top, middle, bottom] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let layout = &self.chart.layout;
        let title_style = Style::default().fg(self.hex(layout.title_color));

        let mut legend: Vec<Span> = Vec::new();
        for series in &self.chart.series {
            legend.push(Span::styled("● ", Style::default().fg(self.hex(&series.color))));
            legend.push(Span::raw(format!("{}  ", series.name)));
        }
        let [y_title_area, legend_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(top);
        Paragraph::new(format!("▲ {}", layout.y_title))
            .style(title_style)
            .render(y_title_area, buf);
        Paragraph::new(Line::from(legend))
            .alignment(Alignment::Right)
            .render(legend_area, buf);

        let grid = PlotGrid::fit(middle, layout.x_range, layout.y_range);
        self.render_plot(&grid, buf);

        let [tooltip_area, x_title_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(bottom);
        if let Some(point) = self.selected_point() {
            Paragraph::new(point.hover_text().replace('\n', "  "))
                .style(Style::default().add_modifier(Modifier::BOLD))
                .render(tooltip_area, buf);
        }
        Paragraph::new(format!("{} ▶", layout.x_title))
            .style(title_style)
            .alignment(Alignment::Right)
            .render(x_title_area, buf);
    }
}
