use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Widget},
};

use crate::category_list::CategoryList;
use crate::config::ColorParser;

/// One dimension's topic list, header tinted with the palette color.
pub struct CategoryListView<'a> {
    list: &'a CategoryList,
    parser: &'a ColorParser,
}

impl<'a> CategoryListView<'a> {
    pub fn new(list: &'a CategoryList, parser: &'a ColorParser) -> Self {
        Self { list, parser }
    }
}

impl Widget for CategoryListView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let header = &self.list.header;
        let header_color = self.parser.hex_or(&header.color, Color::DarkGray);
        let mut title_style = Style::default().fg(header_color);
        title_style = if header.muted {
            title_style.add_modifier(Modifier::DIM | Modifier::ITALIC)
        } else {
            title_style.add_modifier(Modifier::BOLD)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(header_color))
            .title(Span::styled(
                format!(" {} {} ", header.icon, header.title),
                title_style,
            ));

        let items: Vec<ListItem> = self
            .list
            .entries
            .iter()
            .map(|entry| {
                let color = self.parser.hex_or(&entry.color, Color::Reset);
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:>3} ", entry.id),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(entry.name.as_str()),
                ]))
            })
            .collect();

        Widget::render(List::new(items).block(block), area, buf);
    }
}
