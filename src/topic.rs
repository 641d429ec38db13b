//! Topic rows and the ESG dimension enum.

use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Lower bound of both materiality scores.
pub const SCORE_MIN: f64 = 0.0;
/// Upper bound of both materiality scores.
pub const SCORE_MAX: f64 = 10.0;

/// Range used for the randomly generated default scores.
pub const SEED_SCORE_MIN: f64 = 2.0;
pub const SEED_SCORE_MAX: f64 = 9.0;

/// One of the three ESG pillars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Dimension {
    Social,
    Environmental,
    Governance,
}

impl Dimension {
    /// Fixed iteration order used by the chart and the lists.
    pub const ALL: [Self; 3] = [Self::Social, Self::Environmental, Self::Governance];

    /// Table / CSV / palette key label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Social => "社会 (S)",
            Self::Environmental => "环境 (E)",
            Self::Governance => "治理 (G)",
        }
    }

    pub fn letter(self) -> char {
        match self {
            Self::Social => 'S',
            Self::Environmental => 'E',
            Self::Governance => 'G',
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Social => Self::Environmental,
            Self::Environmental => Self::Governance,
            Self::Governance => Self::Social,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDimension(pub String);

impl fmt::Display for UnknownDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is not a dimension (expected {}, {} or {})",
            self.0,
            Dimension::Social.label(),
            Dimension::Environmental.label(),
            Dimension::Governance.label()
        )
    }
}

impl std::error::Error for UnknownDimension {}

impl FromStr for Dimension {
    type Err = UnknownDimension;

    /// Accepts the canonical label, the single letter or the English name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(d) = Self::ALL.iter().find(|d| d.label() == trimmed) {
            return Ok(*d);
        }
        match trimmed.to_lowercase().as_str() {
            "s" | "social" | "社会" => Ok(Self::Social),
            "e" | "environmental" | "environment" | "环境" => Ok(Self::Environmental),
            "g" | "governance" | "治理" => Ok(Self::Governance),
            _ => Err(UnknownDimension(trimmed.to_string())),
        }
    }
}

/// Editable (and derived) columns of the topic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicField {
    Id,
    Name,
    Dimension,
    FinancialMateriality,
    ImpactMateriality,
    Color,
}

impl TopicField {
    /// Columns in table / CSV order.
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::Name,
        Self::Dimension,
        Self::FinancialMateriality,
        Self::ImpactMateriality,
        Self::Color,
    ];

    /// Columns shown in the editing surface. `Color` is derived and hidden.
    pub const EDITABLE: [Self; 5] = [
        Self::Id,
        Self::Name,
        Self::Dimension,
        Self::FinancialMateriality,
        Self::ImpactMateriality,
    ];

    /// Column header used in the table and in the CSV export.
    pub fn header(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Name => "议题名称",
            Self::Dimension => "维度",
            Self::FinancialMateriality => "财务重要性",
            Self::ImpactMateriality => "影响重要性",
            Self::Color => "Color",
        }
    }

    pub fn editable(self) -> bool {
        self != Self::Color
    }

    pub fn is_score(self) -> bool {
        matches!(self, Self::FinancialMateriality | Self::ImpactMateriality)
    }
}

/// One row of the topic table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    /// `None` when missing or invalid; such rows are kept but never plotted or listed.
    pub dimension: Option<Dimension>,
    pub financial_materiality: f64,
    pub impact_materiality: f64,
    /// Derived from `dimension` and the active palette.
    pub color: String,
}

impl Topic {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        dimension: Dimension,
        financial_materiality: f64,
        impact_materiality: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dimension: Some(dimension),
            financial_materiality,
            impact_materiality,
            color: String::new(),
        }
    }

    /// Row created by the "add row" action before the user fills it in.
    pub fn blank() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            dimension: None,
            financial_materiality: SCORE_MIN,
            impact_materiality: SCORE_MIN,
            color: String::new(),
        }
    }

    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Both scores at zero marks an unscored placeholder.
    pub fn is_unscored(&self) -> bool {
        self.financial_materiality == 0.0 && self.impact_materiality == 0.0
    }

    /// Display text of one column, scores with one decimal.
    pub fn display(&self, field: TopicField) -> String {
        match field {
            TopicField::Id => self.id.clone(),
            TopicField::Name => self.name.clone(),
            TopicField::Dimension => self
                .dimension
                .map(|d| d.label().to_string())
                .unwrap_or_default(),
            TopicField::FinancialMateriality => format!("{:.1}", self.financial_materiality),
            TopicField::ImpactMateriality => format!("{:.1}", self.impact_materiality),
            TopicField::Color => self.color.clone(),
        }
    }
}

const SEED_TOPICS: [(&str, &str, Dimension); 22] = [
    ("01", "职业健康与安全", Dimension::Social),
    ("02", "产品和服务安全与质量", Dimension::Social),
    ("03", "创新驱动", Dimension::Social),
    ("04", "可持续供应链", Dimension::Social),
    ("05", "知识产权保护", Dimension::Social),
    ("06", "员工权益保障", Dimension::Social),
    ("07", "人力资本管理", Dimension::Social),
    ("08", "客户关系管理", Dimension::Social),
    ("09", "社区贡献与参与", Dimension::Social),
    ("10", "气候变化减缓与适应", Dimension::Environmental),
    ("11", "能源利用", Dimension::Environmental),
    ("12", "环境合规管理", Dimension::Environmental),
    ("13", "废弃物处理", Dimension::Environmental),
    ("14", "循环经济", Dimension::Environmental),
    ("15", "水资源利用", Dimension::Environmental),
    ("16", "生态系统和生物多样性", Dimension::Environmental),
    ("17", "污染物排放", Dimension::Environmental),
    ("18", "信息安全与隐私保护", Dimension::Governance),
    ("19", "利益相关方沟通", Dimension::Governance),
    ("20", "公司治理", Dimension::Governance),
    ("21", "风险管理", Dimension::Governance),
    ("22", "商业道德", Dimension::Governance),
];

/// Round to one decimal place.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn seed_score<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    round1(rng.gen_range(SEED_SCORE_MIN..=SEED_SCORE_MAX))
}

/// The 22 default topics with random scores in [2.0, 9.0]. Colors are left
/// empty; the store derives them.
pub fn default_topics<R: Rng + ?Sized>(rng: &mut R) -> Vec<Topic> {
    SEED_TOPICS
        .iter()
        .map(|(id, name, dimension)| {
            let financial = seed_score(rng);
            let impact = seed_score(rng);
            Topic::new(*id, *name, *dimension, financial, impact)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_dimension_parse() {
        assert_eq!("社会 (S)".parse::<Dimension>(), Ok(Dimension::Social));
        assert_eq!(" e ".parse::<Dimension>(), Ok(Dimension::Environmental));
        assert_eq!("Governance".parse::<Dimension>(), Ok(Dimension::Governance));
        assert!("Economic".parse::<Dimension>().is_err());
        assert!("".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_dimension_cycle() {
        let mut d = Dimension::Social;
        for _ in 0..3 {
            d = d.next();
        }
        assert_eq!(d, Dimension::Social);
    }

    #[test]
    fn test_default_topics_distribution() {
        let mut rng = StdRng::seed_from_u64(7);
        let topics = default_topics(&mut rng);
        assert_eq!(topics.len(), 22);
        let count = |d| topics.iter().filter(|t| t.dimension == Some(d)).count();
        assert_eq!(count(Dimension::Social), 9);
        assert_eq!(count(Dimension::Environmental), 8);
        assert_eq!(count(Dimension::Governance), 5);
    }

    #[test]
    fn test_default_scores_in_range_with_one_decimal() {
        let mut rng = StdRng::seed_from_u64(42);
        for t in default_topics(&mut rng) {
            for v in [t.financial_materiality, t.impact_materiality] {
                assert!((SEED_SCORE_MIN..=SEED_SCORE_MAX).contains(&v), "{v}");
                assert!((v * 10.0 - (v * 10.0).round()).abs() < 1e-9, "{v}");
            }
        }
    }

    #[test]
    fn test_blank_topic_is_incomplete() {
        let t = Topic::blank();
        assert!(t.dimension.is_none());
        assert!(!t.has_id());
        assert!(t.is_unscored());
        assert_eq!(t.display(TopicField::Dimension), "");
    }

    #[test]
    fn test_color_not_editable() {
        assert!(!TopicField::Color.editable());
        assert!(TopicField::EDITABLE.iter().all(|f| f.editable()));
    }
}
