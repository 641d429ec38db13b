use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use supports_color::Stream;

use crate::matrix::{DEFAULT_THRESHOLD, THRESHOLD_STEP};
use crate::palette::{parse_hex, BackgroundTheme, Palette};
use crate::topic::{SCORE_MAX, SCORE_MIN};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file or subdirectory
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    /// Ensure the config directory exists
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub matrix: MatrixConfig,
    pub export: ExportConfig,
    /// User palettes, offered after the built-in ones
    pub palettes: Vec<PaletteConfig>,
    pub performance: PerformanceConfig,
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    pub palette: String,
    pub background: String,
    pub threshold_financial: f64,
    pub threshold_impact: f64,
    pub threshold_step: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory for in-app exports; current directory when unset
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteConfig {
    pub name: String,
    pub social: String,
    pub environmental: String,
    pub governance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub color_mode: String,
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub primary: String,
    pub secondary: String,
    pub error: String,
    pub dimmed: String,
    pub background: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub table_header: String,
    pub table_border: String,
    pub table_selected: String,
    pub sidebar_border: String,
    pub sidebar_active: String,
    pub modal_border: String,
    pub modal_border_error: String,
    pub chart_background: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

// Default implementations
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            matrix: MatrixConfig::default(),
            export: ExportConfig::default(),
            palettes: Vec::new(),
            performance: PerformanceConfig::default(),
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default().name,
            background: BackgroundTheme::default().name.to_string(),
            threshold_financial: DEFAULT_THRESHOLD,
            threshold_impact: DEFAULT_THRESHOLD,
            threshold_step: THRESHOLD_STEP,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            color_mode: "auto".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            primary: "cyan".to_string(),
            secondary: "yellow".to_string(),
            error: "red".to_string(),
            dimmed: "dark_gray".to_string(),
            background: "black".to_string(),
            controls_bg: "indexed(236)".to_string(),
            text_primary: "white".to_string(),
            text_secondary: "dark_gray".to_string(),
            table_header: "white".to_string(),
            table_border: "cyan".to_string(),
            table_selected: "reversed".to_string(),
            sidebar_border: "dark_gray".to_string(),
            sidebar_active: "yellow".to_string(),
            modal_border: "cyan".to_string(),
            modal_border_error: "red".to_string(),
            chart_background: "#ffffff".to_string(),
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let config_manager = ConfigManager::new(app_name)?;
        Self::load_from(&config_manager)
    }

    /// Load configuration using the given config directory
    pub fn load_from(config_manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();

        let user_config = Self::load_user_config(config_manager)?;
        config.merge(user_config);

        config.validate()?;

        Ok(config)
    }

    /// Load user configuration from <config_dir>/config.toml
    fn load_user_config(config_manager: &ConfigManager) -> Result<AppConfig> {
        let config_path = config_manager.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.matrix.merge(other.matrix);
        self.export.merge(other.export);
        if !other.palettes.is_empty() {
            self.palettes = other.palettes;
        }
        self.performance.merge(other.performance);
        self.theme.merge(other.theme);
        self.debug.merge(other.debug);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        self.matrix.validate()?;

        for palette in &self.palettes {
            palette.validate()?;
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        match self.theme.color_mode.as_str() {
            "light" | "dark" | "auto" => {}
            _ => {
                return Err(eyre!(
                    "Invalid color_mode: {}. Must be 'light', 'dark', or 'auto'",
                    self.theme.color_mode
                ))
            }
        }

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        Ok(())
    }

    /// Built-in palettes followed by the configured ones
    pub fn palettes(&self) -> Vec<Palette> {
        let mut palettes = Palette::presets();
        palettes.extend(self.palettes.iter().map(PaletteConfig::to_palette));
        palettes
    }
}

impl MatrixConfig {
    pub fn merge(&mut self, other: Self) {
        let default = MatrixConfig::default();
        if other.palette != default.palette {
            self.palette = other.palette;
        }
        if other.background != default.background {
            self.background = other.background;
        }
        if other.threshold_financial != default.threshold_financial {
            self.threshold_financial = other.threshold_financial;
        }
        if other.threshold_impact != default.threshold_impact {
            self.threshold_impact = other.threshold_impact;
        }
        if other.threshold_step != default.threshold_step {
            self.threshold_step = other.threshold_step;
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("threshold_financial", self.threshold_financial),
            ("threshold_impact", self.threshold_impact),
        ] {
            if !(SCORE_MIN..=SCORE_MAX).contains(&value) {
                return Err(eyre!(
                    "{} must be between {} and {}, got {}",
                    name,
                    SCORE_MIN,
                    SCORE_MAX,
                    value
                ));
            }
        }
        if !(self.threshold_step > 0.0 && self.threshold_step <= SCORE_MAX) {
            return Err(eyre!(
                "threshold_step must be greater than 0 and at most {}",
                SCORE_MAX
            ));
        }
        Ok(())
    }
}

impl ExportConfig {
    pub fn merge(&mut self, other: Self) {
        if other.directory.is_some() {
            self.directory = other.directory;
        }
    }
}

impl PaletteConfig {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(eyre!("Palette name must not be empty"));
        }
        for (field, value) in [
            ("social", &self.social),
            ("environmental", &self.environmental),
            ("governance", &self.governance),
        ] {
            if parse_hex(value).is_none() {
                return Err(eyre!(
                    "Invalid color for '{}' in palette '{}': '{}'. Expected #rrggbb",
                    field,
                    self.name,
                    value
                ));
            }
        }
        Ok(())
    }

    pub fn to_palette(&self) -> Palette {
        Palette::new(
            self.name.clone(),
            &self.social,
            &self.environmental,
            &self.governance,
        )
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PerformanceConfig::default();
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ThemeConfig::default();
        if other.color_mode != default.color_mode {
            self.color_mode = other.color_mode;
        }
        self.colors.merge(other.colors);
    }
}

/// Applies `$body` to every (name, field) pair of ColorConfig.
macro_rules! for_each_color {
    ($self:ident, $other:ident, $body:ident) => {
        $body!($self, $other, primary);
        $body!($self, $other, secondary);
        $body!($self, $other, error);
        $body!($self, $other, dimmed);
        $body!($self, $other, background);
        $body!($self, $other, controls_bg);
        $body!($self, $other, text_primary);
        $body!($self, $other, text_secondary);
        $body!($self, $other, table_header);
        $body!($self, $other, table_border);
        $body!($self, $other, table_selected);
        $body!($self, $other, sidebar_border);
        $body!($self, $other, sidebar_active);
        $body!($self, $other, modal_border);
        $body!($self, $other, modal_border_error);
        $body!($self, $other, chart_background);
    };
}

impl ColorConfig {
    /// Validate all color strings can be parsed
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        macro_rules! validate_color {
            ($config:ident, $parser:ident, $field:ident) => {
                $parser.parse(&$config.$field).map_err(|e| {
                    eyre!(
                        "Invalid color value for '{}': {}",
                        stringify!($field),
                        e
                    )
                })?;
            };
        }
        for_each_color!(self, parser, validate_color);
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        let default = ColorConfig::default();
        macro_rules! merge_color {
            ($config:ident, $other:ident, $field:ident) => {
                if $other.$field != default.$field {
                    $config.$field = $other.$field.clone();
                }
            };
        }
        for_each_color!(self, other, merge_color);
    }

    /// All (name, value) pairs
    fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut entries = Vec::new();
        macro_rules! push_color {
            ($config:ident, $out:ident, $field:ident) => {
                $out.push((stringify!($field), $config.$field.as_str()));
            };
        }
        for_each_color!(self, entries, push_color);
        entries
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DebugConfig::default();
        if other.enabled != default.enabled {
            self.enabled = other.enabled;
        }
    }
}

/// Color parser with terminal capability detection
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    /// Create a new ColorParser with automatic terminal capability detection
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Parser with fixed capabilities, for rendering tests
    pub fn with_capabilities(supports_true_color: bool, supports_256: bool) -> Self {
        Self {
            supports_true_color,
            supports_256,
            no_color: false,
        }
    }

    /// Parse a color string (hex or named) and convert to appropriate terminal color
    pub fn parse(&self, s: &str) -> Result<Color> {
        if self.no_color {
            return Ok(Color::Reset);
        }

        let trimmed = s.trim();

        // Hex format: "#ff0000" or "#FF0000" (6-character hex)
        if trimmed.starts_with('#') {
            let (r, g, b) = parse_hex(trimmed).ok_or_else(|| {
                eyre!(
                    "Invalid hex color format: '{}'. Expected format: #rrggbb",
                    trimmed
                )
            })?;
            return Ok(self.rgb(r, g, b));
        }

        // Indexed colors: "indexed(236)" for explicit 256-color palette
        if trimmed.to_lowercase().starts_with("indexed(") && trimmed.ends_with(')') {
            let num_str = &trimmed[8..trimmed.len() - 1];
            let num = num_str.parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            return Ok(Color::Indexed(num));
        }

        let lower = trimmed.to_lowercase();
        match lower.as_str() {
            "black" => Ok(Color::Black),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),

            "bright_black" | "bright black" => Ok(Color::Indexed(8)),
            "bright_red" | "bright red" => Ok(Color::Indexed(9)),
            "bright_green" | "bright green" => Ok(Color::Indexed(10)),
            "bright_yellow" | "bright yellow" => Ok(Color::Indexed(11)),
            "bright_blue" | "bright blue" => Ok(Color::Indexed(12)),
            "bright_magenta" | "bright magenta" => Ok(Color::Indexed(13)),
            "bright_cyan" | "bright cyan" => Ok(Color::Indexed(14)),
            "bright_white" | "bright white" => Ok(Color::Indexed(15)),

            "gray" | "grey" => Ok(Color::Indexed(8)),
            "dark_gray" | "dark gray" | "dark_grey" | "dark grey" => Ok(Color::Indexed(8)),
            "light_gray" | "light gray" | "light_grey" | "light grey" => Ok(Color::Indexed(7)),

            // Special modifiers (pass through as Reset - handled specially in rendering)
            "reset" | "reversed" => Ok(Color::Reset),

            _ => Err(eyre!(
                "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
                 bright variants (bright_red, etc.), or hex colors (#ff0000)",
                trimmed
            )),
        }
    }

    /// Terminal color for a topic hex color; `fallback` when it does not parse
    pub fn hex_or(&self, hex: &str, fallback: Color) -> Color {
        if self.no_color {
            return Color::Reset;
        }
        parse_hex(hex)
            .map(|(r, g, b)| self.rgb(r, g, b))
            .unwrap_or(fallback)
    }

    /// Convert RGB values to appropriate terminal color based on capabilities
    pub fn rgb(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert RGB to nearest 256-color palette index
/// Uses standard xterm 256-color palette
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    // Check if it's a gray shade (r ≈ g ≈ b)
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        if gray < 8 {
            return 16;
        } else if gray > 247 {
            return 231;
        } else {
            return 232 + ((gray - 8) * 24 / 240) as u8;
        }
    }

    // Map to 6x6x6 color cube (16-231)
    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;

    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// Convert RGB to nearest basic ANSI color (8 colors)
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let r_bright = r > 128;
    let g_bright = g > 128;
    let b_bright = b > 128;

    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r_bright, g_bright, b_bright) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    /// Create a Theme from a ThemeConfig by parsing all color strings
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let mut colors = HashMap::new();
        for (name, value) in config.colors.entries() {
            colors.insert(name.to_string(), parser.parse(value)?);
        }
        Ok(Self { colors })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    /// Get a color by name, returns None if not found
    pub fn get_optional(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default()).unwrap_or_else(|_| Self {
            colors: HashMap::new(),
        })
    }
}

// Default configuration template
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_parses_to_defaults() {
        let parsed: AppConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        let default = AppConfig::default();
        assert_eq!(parsed.version, default.version);
        assert_eq!(parsed.matrix.palette, default.matrix.palette);
        assert_eq!(parsed.matrix.background, default.matrix.background);
        assert_eq!(parsed.matrix.threshold_financial, 5.0);
        assert_eq!(parsed.matrix.threshold_step, 0.5);
        assert!(parsed.palettes.is_empty());
        assert_eq!(parsed.theme.colors.primary, default.theme.colors.primary);
    }

    #[test]
    fn test_color_entries_cover_all_fields() {
        let colors = ColorConfig::default();
        let entries = colors.entries();
        assert_eq!(entries.len(), 16);
        assert!(entries.contains(&("sidebar_active", "yellow")));
    }

    #[test]
    fn test_hex_or_fallback() {
        let parser = ColorParser::with_capabilities(true, true);
        assert_eq!(parser.hex_or("#FF8C66", Color::Gray), Color::Rgb(255, 140, 102));
        assert_eq!(parser.hex_or("", Color::Gray), Color::Gray);
        let parser = ColorParser::with_capabilities(false, true);
        assert!(matches!(parser.hex_or("#FF8C66", Color::Gray), Color::Indexed(_)));
    }

    #[test]
    fn test_palette_config_validation() {
        let good = PaletteConfig {
            name: "Mine".to_string(),
            social: "#010203".to_string(),
            environmental: "#040506".to_string(),
            governance: "#070809".to_string(),
        };
        assert!(good.validate().is_ok());
        let bad = PaletteConfig {
            governance: "blue".to_string(),
            ..good.clone()
        };
        assert!(bad.validate().is_err());
        assert_eq!(good.to_palette().get("治理 (G)"), Some("#070809"));
    }
}
