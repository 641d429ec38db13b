use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

/// Key hints while the topic table has focus
pub const TABLE_CONTROLS: &[(&str, &str)] = &[
    ("a", "Add"),
    ("d", "Delete"),
    ("Enter", "Edit"),
    ("Tab", "Sidebar"),
    ("e", "CSV"),
    ("p", "PNG"),
    ("?", "Help"),
    ("q", "Quit"),
];

/// Key hints while the sidebar has focus
pub const SIDEBAR_CONTROLS: &[(&str, &str)] = &[
    ("↑↓", "Select"),
    ("←→", "Change"),
    ("Tab", "Table"),
    ("e", "CSV"),
    ("p", "PNG"),
    ("?", "Help"),
    ("q", "Quit"),
];

/// Key hints while a cell is being edited
pub const EDIT_CONTROLS: &[(&str, &str)] = &[("Enter", "Apply"), ("Esc", "Cancel")];

pub struct Controls {
    pub hints: &'static [(&'static str, &'static str)],
    /// Right-aligned status text (row count, last export)
    pub status: Option<String>,
    pub dimmed: bool,
    pub bar_color: Color,
}

impl Controls {
    pub fn new(hints: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            hints,
            status: None,
            dimmed: false,
            bar_color: Color::DarkGray,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    pub fn with_bar_color(mut self, color: Color) -> Self {
        self.bar_color = color;
        self
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut constraints = self.hints.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let base_style = if self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        for (i, (key, action)) in self.hints.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(base_style.bg(self.bar_color))
                .render(layout[j + 1], buf);
        }

        let status = self.status.as_deref().unwrap_or("");
        Paragraph::new(status)
            .style(base_style.bg(self.bar_color).fg(if self.dimmed {
                Color::DarkGray
            } else {
                Color::White
            }))
            .right_aligned()
            .render(layout[self.hints.len() * 2], buf);
    }
}
