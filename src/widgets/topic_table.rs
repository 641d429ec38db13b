use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, StatefulWidget, Table, TableState},
};

use crate::topic::{Topic, TopicField};

/// Editable topic table. Selection (row and column) lives in a [`TableState`],
/// whose column index follows `TopicField::EDITABLE`. The derived color is
/// not a column.
pub struct TopicTable<'a> {
    topics: &'a [Topic],
    focused: bool,
    header_color: Color,
    border_color: Color,
    dimmed_color: Color,
}

impl<'a> TopicTable<'a> {
    pub fn new(topics: &'a [Topic]) -> Self {
        Self {
            topics,
            focused: true,
            header_color: Color::Reset,
            border_color: Color::Reset,
            dimmed_color: Color::DarkGray,
        }
    }

    pub fn with_focus(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn with_colors(mut self, header: Color, border: Color, dimmed: Color) -> Self {
        self.header_color = header;
        self.border_color = border;
        self.dimmed_color = dimmed;
        self
    }

    fn width(field: TopicField) -> Constraint {
        match field {
            TopicField::Id => Constraint::Length(4),
            TopicField::Name => Constraint::Fill(1),
            TopicField::Dimension => Constraint::Length(9),
            _ => Constraint::Length(10),
        }
    }

    fn row(&self, topic: &'a Topic) -> Row<'a> {
        let cells = TopicField::EDITABLE.iter().map(|&field| match field {
            TopicField::Dimension if topic.dimension.is_none() => {
                Cell::from("-").style(Style::default().fg(self.dimmed_color))
            }
            _ => Cell::from(topic.display(field)),
        });
        let row = Row::new(cells);
        // Unscored rows stay in the table but are never plotted
        if topic.is_unscored() {
            row.style(
                Style::default()
                    .fg(self.dimmed_color)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            row
        }
    }
}

impl StatefulWidget for TopicTable<'_> {
    type State = TableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut TableState) {
        let header = Row::new(TopicField::EDITABLE.iter().map(|f| Cell::from(f.header()))).style(
            Style::default()
                .fg(self.header_color)
                .add_modifier(Modifier::BOLD),
        );
        let widths: Vec<Constraint> = TopicField::EDITABLE
            .iter()
            .map(|&f| Self::width(f)).collect();
        let rows: Vec<Row> = self.topics.iter().map(|t| self.row(t)).collect();

        let border_style = if self.focused {
            Style::default().fg(self.border_color)
        } else {
            Style::default().fg(self.dimmed_color)
        };
        let mut table = Table::new(rows, widths)
            .header(header)
            .column_spacing(1)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" 议题数据表 ({}) ", self.topics.len()))
                    .border_style(border_style),
            )
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        if self.focused {
            table = table.cell_highlight_style(
                Style::default()
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                    .remove_modifier(Modifier::REVERSED),
            );
        }

        StatefulWidget::render(table, area, buf, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Palette;
    use crate::store::TopicStore;
    use crate::topic::Dimension;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    fn store() -> TopicStore {
        TopicStore::new(
            vec![
                Topic::new("01", "Safety", Dimension::Social, 6.0, 7.5),
                Topic::new("00", "Placeholder", Dimension::Governance, 0.0, 0.0),
            ],
            Palette::default(),
        )
    }

    #[test]
    fn test_renders_rows_with_scores() {
        let store = store();
        let area = Rect::new(0, 0, 80, 6);
        let mut buf = Buffer::empty(area);
        let mut state = TableState::default().with_selected(Some(0));
        TopicTable::new(store.topics()).render(area, &mut buf, &mut state);

        let first = row_text(&buf, 2);
        assert!(first.contains("01"), "{first}");
        assert!(first.contains("Safety"), "{first}");
        assert!(first.contains("6.0"), "{first}");
        assert!(first.contains("7.5"), "{first}");
        assert!(buf[(1, 2)].modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn test_unscored_row_is_dimmed() {
        let store = store();
        let area = Rect::new(0, 0, 80, 6);
        let mut buf = Buffer::empty(area);
        let mut state = TableState::default();
        TopicTable::new(store.topics()).render(area, &mut buf, &mut state);
        assert!(row_text(&buf, 3).contains("Placeholder"));
        assert!(buf[(1, 3)].modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_missing_dimension_shown_as_dash() {
        let mut store = store();
        store.add(Topic::blank());
        let area = Rect::new(0, 0, 80, 7);
        let mut buf = Buffer::empty(area);
        let mut state = TableState::default();
        TopicTable::new(store.topics()).render(area, &mut buf, &mut state);
        let text = row_text(&buf, 4);
        assert!(text.contains(" - "), "{text}");
        assert!(!text.contains("#999999"), "{text}");
    }

    #[test]
    fn test_derived_color_not_shown() {
        let store = TopicStore::new(
            vec![Topic::new("01", "Safety", Dimension::Social, 6.0, 7.0)],
            Palette::default(),
        );
        assert_eq!(store.topics()[0].color, "#FF8C66");
        let area = Rect::new(0, 0, 100, 6);
        let mut buf = Buffer::empty(area);
        let mut state = TableState::default();
        TopicTable::new(store.topics()).render(area, &mut buf, &mut state);

        let text: String = (0..area.height).map(|y| row_text(&buf, y)).collect();
        assert!(text.contains("ID"), "{text}");
        assert!(text.contains("Safety"), "{text}");
        assert!(!text.contains("Color"), "{text}");
        assert!(!text.contains("#FF8C66"), "{text}");
        assert!(!text.contains("██"), "{text}");
    }
}
