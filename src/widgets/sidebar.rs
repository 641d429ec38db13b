use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, LineGauge, Paragraph, Widget},
};

use crate::topic::SCORE_MAX;

/// Controls in the sidebar, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SidebarItem {
    #[default]
    Palette,
    Background,
    ThresholdFinancial,
    ThresholdImpact,
}

impl SidebarItem {
    pub const ALL: [Self; 4] = [
        Self::Palette,
        Self::Background,
        Self::ThresholdFinancial,
        Self::ThresholdImpact,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Palette => "气泡配色",
            Self::Background => "背景主题",
            Self::ThresholdFinancial => "财务阈值 (X)",
            Self::ThresholdImpact => "影响阈值 (Y)",
        }
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Palette, background and threshold controls.
pub struct Sidebar<'a> {
    pub palette: &'a str,
    /// Swatches of the active palette, in dimension order.
    pub swatches: Vec<Color>,
    pub background: &'a str,
    pub threshold_financial: f64,
    pub threshold_impact: f64,
    pub selected: SidebarItem,
    pub focused: bool,
    pub active_color: Color,
    pub border_color: Color,
}

impl Sidebar<'_> {
    fn value_line(&self, item: SidebarItem) -> Line<'_> {
        match item {
            SidebarItem::Palette => {
                let mut spans = vec![Span::raw(format!("‹ {} › ", self.palette))];
                spans.extend(
                    self.swatches
                        .iter()
                        .map(|&c| Span::styled("██", Style::default().fg(c))),
                );
                Line::from(spans)
            }
            SidebarItem::Background => Line::from(format!("‹ {} ›", self.background)),
            SidebarItem::ThresholdFinancial => {
                Line::from(format!("{:.1}", self.threshold_financial))
            }
            SidebarItem::ThresholdImpact => Line::from(format!("{:.1}", self.threshold_impact)),
        }
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.focused {
            self.active_color
        } else {
            self.border_color
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" 设置 ")
            .border_style(Style::default().fg(border));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::vertical(SidebarItem::ALL.map(|item| match item {
            SidebarItem::ThresholdFinancial | SidebarItem::ThresholdImpact => {
                Constraint::Length(3)
            }
            _ => Constraint::Length(2),
        }))
        .split(inner);

        for (item, row) in SidebarItem::ALL.iter().zip(rows.iter()) {
            let selected = self.focused && *item == self.selected;
            let label_style = if selected {
                Style::default()
                    .fg(self.active_color)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            let marker = if selected { "▸ " } else { "  " };
            Paragraph::new(vec![
                Line::from(Span::styled(format!("{}{}", marker, item.label()), label_style)),
                self.value_line(*item),
            ])
            .render(*row, buf);

            let value = match item {
                SidebarItem::ThresholdFinancial => self.threshold_financial,
                SidebarItem::ThresholdImpact => self.threshold_impact,
                _ => continue,
            };
            if row.height >= 3 {
                let gauge_area = Rect::new(row.x, row.y + 2, row.width, 1);
                LineGauge::default()
                    .filled_style(Style::default().fg(if selected {
                        self.active_color
                    } else {
                        Color::Reset
                    }))
                    .label("")
                    .ratio((value / SCORE_MAX).clamp(0.0, 1.0))
                    .render(gauge_area, buf);
            }
        }
    }
}
