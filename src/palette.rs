//! Bubble palettes, matrix background themes and the dimension color lookup.

use crate::topic::Dimension;

/// Color used when a dimension is missing or not mapped by the palette.
pub const FALLBACK_COLOR: &str = "#999999";

/// A named mapping from dimension label to hex color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub name: String,
    /// Ordered `(label, hex)` pairs; order matters for keyword lookup.
    pub entries: Vec<(String, String)>,
}

const PALETTE_PRESETS: [(&str, [&str; 3]); 5] = [
    ("GRI 标准 (橙/绿/蓝)", ["#FF8C66", "#00C49F", "#1E90FF"]),
    ("商务深沉 (红/墨绿/深蓝)", ["#D9534F", "#2E7D32", "#1565C0"]),
    ("清新马卡龙 (粉/青/紫)", ["#FF9AA2", "#B5EAD7", "#C7CEEA"]),
    ("高对比度 (黄/绿/紫)", ["#F1C40F", "#2ECC71", "#9B59B6"]),
    ("灰度单色 (不同深浅灰)", ["#95A5A6", "#7F8C8D", "#34495E"]),
];

impl Palette {
    /// Palette with one color per dimension, keyed by the dimension labels.
    pub fn new(name: impl Into<String>, social: &str, environmental: &str, governance: &str) -> Self {
        let entries = Dimension::ALL
            .iter()
            .zip([social, environmental, governance])
            .map(|(d, hex)| (d.label().to_string(), hex.to_string()))
            .collect();
        Self {
            name: name.into(),
            entries,
        }
    }

    /// The five built-in palettes, first one is the default.
    pub fn presets() -> Vec<Palette> {
        PALETTE_PRESETS
            .iter()
            .map(|(name, [s, e, g])| Palette::new(*name, s, e, g))
            .collect()
    }

    /// Exact lookup by key label.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First entry whose key contains `keyword`.
    ///
    /// Ambiguous when several keys share the substring; `resolve_color` is
    /// the enum-keyed alternative.
    pub fn color_by_keyword(&self, keyword: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.contains(keyword))
            .map(|(_, v)| v.as_str())
    }
}

impl Default for Palette {
    fn default() -> Self {
        let (name, [s, e, g]) = PALETTE_PRESETS[0];
        Palette::new(name, s, e, g)
    }
}

/// Color of `dimension` under `palette`, gray when unmapped or absent.
pub fn resolve_color(dimension: Option<Dimension>, palette: &Palette) -> &str {
    dimension
        .and_then(|d| palette.get(d.label()))
        .unwrap_or(FALLBACK_COLOR)
}

/// Named base color for the quadrant fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundTheme {
    pub name: &'static str,
    pub rgb: (u8, u8, u8),
    fill: bool,
}

/// Name of the print/whiteboard preset, which disables quadrant fill.
pub const PRINT_BACKGROUND: &str = "纯净白板 (打印)";

const BACKGROUND_PRESETS: [BackgroundTheme; 5] = [
    BackgroundTheme {
        name: "GRI 标准绿 (默认)",
        rgb: (0, 150, 100),
        fill: true,
    },
    BackgroundTheme {
        name: "商务冷灰 (专业)",
        rgb: (100, 100, 100),
        fill: true,
    },
    BackgroundTheme {
        name: "科技静谧蓝 (现代)",
        rgb: (65, 105, 225),
        fill: true,
    },
    BackgroundTheme {
        name: "暖色活力橙 (警示)",
        rgb: (255, 140, 0),
        fill: true,
    },
    BackgroundTheme {
        name: PRINT_BACKGROUND,
        rgb: (255, 255, 255),
        fill: false,
    },
];

impl BackgroundTheme {
    pub fn presets() -> &'static [BackgroundTheme] {
        &BACKGROUND_PRESETS
    }

    pub fn find(name: &str) -> Option<BackgroundTheme> {
        BACKGROUND_PRESETS.iter().find(|b| b.name == name).copied()
    }

    pub fn print() -> BackgroundTheme {
        BACKGROUND_PRESETS[BACKGROUND_PRESETS.len() - 1]
    }

    pub fn fills_quadrants(&self) -> bool {
        self.fill
    }

    /// `r, g, b` as written inside an `rgba(...)` color.
    pub fn rgb_string(&self) -> String {
        let (r, g, b) = self.rgb;
        format!("{r}, {g}, {b}")
    }
}

impl Default for BackgroundTheme {
    fn default() -> Self {
        BACKGROUND_PRESETS[0]
    }
}

/// Find a palette by name, falling back to the first one with a warning.
pub fn find_palette<'a>(palettes: &'a [Palette], name: &str) -> Option<&'a Palette> {
    match palettes.iter().find(|p| p.name == name) {
        Some(p) => Some(p),
        None => {
            let fallback = palettes.first();
            log::warn!(
                "palette '{}' not found, using '{}'",
                name,
                fallback.map(|p| p.name.as_str()).unwrap_or("-")
            );
            fallback
        }
    }
}

/// Parse `#rrggbb` into its components.
pub fn parse_hex(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Blend `rgb` over white with the given opacity.
pub fn blend_over_white(rgb: (u8, u8, u8), opacity: f64) -> (u8, u8, u8) {
    let a = opacity.clamp(0.0, 1.0);
    let mix = |c: u8| (c as f64 * a + 255.0 * (1.0 - a)).round() as u8;
    (mix(rgb.0), mix(rgb.1), mix(rgb.2))
}
