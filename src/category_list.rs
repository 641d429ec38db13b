//! Per-dimension topic lists shown under the matrix.

use crate::palette::Palette;
use crate::topic::{Dimension, Topic};

/// Header color when no palette key matches the lookup keyword.
pub const UNMATCHED_HEADER_COLOR: &str = "#555555";
/// Header color of a list with no topics.
pub const MUTED_HEADER_COLOR: &str = "#bbbbbb";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListHeader {
    pub title: String,
    pub icon: &'static str,
    pub color: String,
    /// Rendered disabled: the dimension has no topics.
    pub muted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryList {
    pub dimension: Dimension,
    pub header: ListHeader,
    pub entries: Vec<ListEntry>,
}

/// Display title, icon and palette keyword of each dimension's list.
pub fn list_labels(dimension: Dimension) -> (&'static str, &'static str, &'static str) {
    match dimension {
        Dimension::Social => ("社会", "👥", "社会"),
        Dimension::Environmental => ("环境", "🌳", "环境"),
        Dimension::Governance => ("公司治理", "🏢", "治理"),
    }
}

/// Build the list for `dimension`.
///
/// Entries without an id are dropped; the rest are sorted by id as strings,
/// so "10" comes before "9". Each entry keeps its own derived color.
pub fn render_category_list(
    topics: &[Topic],
    dimension: Dimension,
    title: &str,
    icon: &'static str,
    keyword: &str,
    palette: &Palette,
) -> CategoryList {
    let in_dimension: Vec<&Topic> = topics
        .iter()
        .filter(|t| t.dimension == Some(dimension))
        .collect();

    if in_dimension.is_empty() {
        return CategoryList {
            dimension,
            header: ListHeader {
                title: format!("{}维度 (无)", title),
                icon,
                color: MUTED_HEADER_COLOR.to_string(),
                muted: true,
            },
            entries: Vec::new(),
        };
    }

    let color = palette
        .color_by_keyword(keyword)
        .unwrap_or(UNMATCHED_HEADER_COLOR)
        .to_string();

    let mut entries: Vec<ListEntry> = in_dimension
        .into_iter()
        .filter(|t| t.has_id())
        .map(|t| ListEntry {
            id: t.id.clone(),
            name: t.name.clone(),
            color: t.color.clone(),
        })
        .collect();
    entries.sort_by(|a, b| a.id.cmp(&b.id));

    CategoryList {
        dimension,
        header: ListHeader {
            title: format!("{}维度议题", title),
            icon,
            color,
            muted: false,
        },
        entries,
    }
}

/// The three lists in fixed dimension order.
pub fn standard_lists(topics: &[Topic], palette: &Palette) -> Vec<CategoryList> {
    Dimension::ALL
        .iter()
        .map(|&d| {
            let (title, icon, keyword) = list_labels(d);
            render_category_list(topics, d, title, icon, keyword, palette)
        })
        .collect()
}
