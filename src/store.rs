//! The in-memory topic table.
//!
//! Every mutation returns the updated snapshot so callers can run the
//! downstream renderers on it directly.

use rand::Rng;
use thiserror::Error;

use crate::palette::{resolve_color, Palette};
use crate::topic::{default_topics, Dimension, Topic, TopicField, SCORE_MAX, SCORE_MIN};

/// Rejected edits. Shown to the user, never fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Row {0} does not exist")]
    NoSuchRow(usize),

    #[error("Topic name must not be empty")]
    EmptyName,

    #[error("{0}")]
    UnknownDimension(String),

    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{0} is derived and cannot be edited")]
    ReadOnly(&'static str),
}

/// Source of truth for the topic rows of one session.
#[derive(Debug, Clone)]
pub struct TopicStore {
    topics: Vec<Topic>,
    palette: Palette,
}

impl TopicStore {
    /// Store over `topics`, deriving colors from `palette`.
    pub fn new(topics: Vec<Topic>, palette: Palette) -> Self {
        let mut store = Self { topics, palette };
        store.recolor_all();
        store
    }

    /// Store holding the default 22 topics with random scores.
    pub fn seeded<R: Rng + ?Sized>(rng: &mut R, palette: Palette) -> Self {
        Self::new(default_topics(rng), palette)
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn get(&self, index: usize) -> Option<&Topic> {
        self.topics.get(index)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Append a row. Its color is derived from the active palette.
    pub fn add(&mut self, mut topic: Topic) -> &[Topic] {
        topic.color = resolve_color(topic.dimension, &self.palette).to_string();
        log::debug!("add topic id='{}' name='{}'", topic.id, topic.name);
        self.topics.push(topic);
        &self.topics
    }

    /// Edit one field of row `index` from user text.
    pub fn update(
        &mut self,
        index: usize,
        field: TopicField,
        value: &str,
    ) -> Result<&[Topic], ValidationError> {
        let topic = self
            .topics
            .get_mut(index)
            .ok_or(ValidationError::NoSuchRow(index))?;

        match field {
            TopicField::Id => topic.id = value.trim().to_string(),
            TopicField::Name => {
                let name = value.trim();
                if name.is_empty() {
                    return Err(ValidationError::EmptyName);
                }
                topic.name = name.to_string();
            }
            TopicField::Dimension => {
                let trimmed = value.trim();
                topic.dimension = if trimmed.is_empty() {
                    None
                } else {
                    Some(
                        trimmed
                            .parse::<Dimension>()
                            .map_err(|e| ValidationError::UnknownDimension(e.to_string()))?,
                    )
                };
                topic.color = resolve_color(topic.dimension, &self.palette).to_string();
            }
            TopicField::FinancialMateriality => {
                topic.financial_materiality = parse_score(field, value)?;
            }
            TopicField::ImpactMateriality => {
                topic.impact_materiality = parse_score(field, value)?;
            }
            TopicField::Color => return Err(ValidationError::ReadOnly(field.header())),
        }

        log::debug!("update row {} {:?} = '{}'", index, field, value);
        Ok(&self.topics)
    }

    /// Cycle the dimension of row `index` (blank rows start at Social).
    pub fn cycle_dimension(&mut self, index: usize) -> Result<&[Topic], ValidationError> {
        let next = self
            .topics
            .get(index)
            .ok_or(ValidationError::NoSuchRow(index))?
            .dimension
            .map(Dimension::next)
            .unwrap_or(Dimension::Social);
        self.update(index, TopicField::Dimension, next.label())
    }

    /// Delete row `index`.
    pub fn remove(&mut self, index: usize) -> Result<&[Topic], ValidationError> {
        if index >= self.topics.len() {
            return Err(ValidationError::NoSuchRow(index));
        }
        let removed = self.topics.remove(index);
        log::debug!("remove row {} id='{}'", index, removed.id);
        Ok(&self.topics)
    }

    /// Switch palette and recompute every row's color.
    pub fn recolor(&mut self, palette: Palette) -> &[Topic] {
        log::info!("palette changed to '{}'", palette.name);
        self.palette = palette;
        self.recolor_all();
        &self.topics
    }

    fn recolor_all(&mut self) {
        for topic in &mut self.topics {
            topic.color = resolve_color(topic.dimension, &self.palette).to_string();
        }
    }
}

fn parse_score(field: TopicField, value: &str) -> Result<f64, ValidationError> {
    let trimmed = value.trim();
    let parsed: f64 = trimmed
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| ValidationError::NotANumber {
            field: field.header(),
            value: trimmed.to_string(),
        })?;
    if !(SCORE_MIN..=SCORE_MAX).contains(&parsed) {
        return Err(ValidationError::OutOfRange {
            field: field.header(),
            value: parsed,
            min: SCORE_MIN,
            max: SCORE_MAX,
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::FALLBACK_COLOR;

    fn store() -> TopicStore {
        TopicStore::new(
            vec![
                Topic::new("01", "Safety", Dimension::Social, 6.0, 7.0),
                Topic::new("10", "Climate", Dimension::Environmental, 8.0, 9.0),
            ],
            Palette::default(),
        )
    }

    #[test]
    fn test_new_derives_colors() {
        let s = store();
        assert_eq!(s.topics()[0].color, "#FF8C66");
        assert_eq!(s.topics()[1].color, "#00C49F");
    }

    #[test]
    fn test_add_blank_gets_fallback_color() {
        let mut s = store();
        let rows = s.add(Topic::blank());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].color, FALLBACK_COLOR);
    }

    #[test]
    fn test_update_dimension_recolors_row() {
        let mut s = store();
        let rows = s.update(0, TopicField::Dimension, "G").unwrap();
        assert_eq!(rows[0].dimension, Some(Dimension::Governance));
        assert_eq!(rows[0].color, "#1E90FF");
    }

    #[test]
    fn test_update_dimension_empty_clears() {
        let mut s = store();
        let rows = s.update(0, TopicField::Dimension, "  ").unwrap();
        assert_eq!(rows[0].dimension, None);
        assert_eq!(rows[0].color, FALLBACK_COLOR);
    }

    #[test]
    fn test_update_rejects_out_of_range() {
        let mut s = store();
        let err = s
            .update(0, TopicField::FinancialMateriality, "10.5")
            .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
        assert_eq!(s.topics()[0].financial_materiality, 6.0);

        let err = s.update(0, TopicField::ImpactMateriality, "-1").unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_update_rejects_non_numbers() {
        let mut s = store();
        for bad in ["abc", "", "NaN", "inf"] {
            let err = s.update(0, TopicField::ImpactMateriality, bad).unwrap_err();
            assert!(matches!(err, ValidationError::NotANumber { .. }), "{bad}");
        }
    }

    #[test]
    fn test_update_accepts_bounds() {
        let mut s = store();
        s.update(0, TopicField::FinancialMateriality, "0").unwrap();
        s.update(0, TopicField::ImpactMateriality, "10.0").unwrap();
        assert_eq!(s.topics()[0].financial_materiality, 0.0);
        assert_eq!(s.topics()[0].impact_materiality, 10.0);
    }

    #[test]
    fn test_update_name_required() {
        let mut s = store();
        assert_eq!(
            s.update(1, TopicField::Name, "   ").unwrap_err(),
            ValidationError::EmptyName
        );
        assert_eq!(s.topics()[1].name, "Climate");
    }

    #[test]
    fn test_update_color_is_read_only() {
        let mut s = store();
        assert!(matches!(
            s.update(0, TopicField::Color, "#000000"),
            Err(ValidationError::ReadOnly(_))
        ));
    }

    #[test]
    fn test_update_unknown_dimension_rejected() {
        let mut s = store();
        let err = s.update(0, TopicField::Dimension, "Economic").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownDimension(_)));
        assert_eq!(s.topics()[0].dimension, Some(Dimension::Social));
    }

    #[test]
    fn test_remove() {
        let mut s = store();
        assert_eq!(s.remove(5).unwrap_err(), ValidationError::NoSuchRow(5));
        let rows = s.remove(0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "10");
    }

    #[test]
    fn test_cycle_dimension() {
        let mut s = store();
        s.add(Topic::blank());
        s.cycle_dimension(2).unwrap();
        assert_eq!(s.topics()[2].dimension, Some(Dimension::Social));
        s.cycle_dimension(2).unwrap();
        assert_eq!(s.topics()[2].dimension, Some(Dimension::Environmental));
    }
}
