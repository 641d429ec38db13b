//! Shared CLI definitions for materiality.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Image format for chart export.
/// When `--chart-format` is not specified, format is detected from the file extension.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ChartFormat {
    /// Portable Network Graphics bitmap
    Png,
    /// Encapsulated PostScript (vector, print friendly)
    Eps,
}

impl ChartFormat {
    /// Detect chart format from path extension. Returns None when extension is missing or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Parse format from extension string (e.g. "png", "eps").
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "eps" | "ps" => Some(Self::Eps),
            _ => None,
        }
    }

    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Eps => "eps",
        }
    }
}

/// Command-line arguments for materiality
#[derive(Clone, Parser, Debug, Default)]
#[command(
    name = "materiality",
    version,
    about = "ESG double materiality matrix in the terminal",
    long_about = "Build and explore an ESG double materiality matrix.\n\n\
        Topics are scored on financial materiality (x axis) and impact materiality (y axis) \
        and split into four quadrants by adjustable thresholds. Edit topics in the table, \
        switch palettes and backgrounds in the sidebar, and export the table as CSV or the \
        matrix as an image. Export flags run without the terminal UI and exit."
)]
pub struct Args {
    /// Bubble palette to start with (name of a built-in or configured palette)
    #[arg(long = "palette", value_name = "NAME")]
    pub palette: Option<String>,

    /// Matrix background theme to start with
    #[arg(long = "background", value_name = "NAME")]
    pub background: Option<String>,

    /// Financial materiality threshold (x axis), 0 to 10
    #[arg(long = "threshold-financial", value_name = "SCORE")]
    pub threshold_financial: Option<f64>,

    /// Impact materiality threshold (y axis), 0 to 10
    #[arg(long = "threshold-impact", value_name = "SCORE")]
    pub threshold_impact: Option<f64>,

    /// Seed for the randomly generated default scores (reproducible sessions)
    #[arg(long = "seed", value_name = "N")]
    pub seed: Option<u64>,

    /// Write the topic table as CSV to PATH and exit
    #[arg(long = "export-csv", value_name = "PATH")]
    pub export_csv: Option<PathBuf>,

    /// Render the matrix to an image at PATH (png or eps) and exit
    #[arg(long = "export-chart", value_name = "PATH")]
    pub export_chart: Option<PathBuf>,

    /// Force the chart image format instead of detecting it from the extension
    #[arg(long = "chart-format", value_enum, requires = "export_chart")]
    pub chart_format: Option<ChartFormat>,

    /// Print the matrix chart description as JSON on stdout and exit
    #[arg(long = "dump-chart", action)]
    pub dump_chart: bool,

    /// Directory used by in-app exports (overrides config [export] directory)
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Clear all cache data (including the log file) and exit
    #[arg(long = "clear-cache", action)]
    pub clear_cache: bool,

    /// Generate default configuration file at ~/.config/materiality/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

impl Args {
    /// True when a flag asks for output without starting the terminal UI.
    pub fn is_headless(&self) -> bool {
        self.export_csv.is_some() || self.export_chart.is_some() || self.dump_chart
    }
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render command-line options as markdown.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    out.push_str(&cmd.render_usage().to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let mut parts = Vec::new();
        if let Some(s) = arg.get_short() {
            parts.push(format!("-{s}"));
        }
        if let Some(l) = arg.get_long() {
            parts.push(format!("--{l}"));
        }
        let op = parts.join(", ");
        let placeholder: String = if arg.get_action().takes_values() {
            arg.get_value_names()
                .map(|names| {
                    names
                        .iter()
                        .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default()
        } else {
            String::new()
        };
        let option_str = if placeholder.is_empty() {
            op
        } else {
            format!("{op} {placeholder}")
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_format_from_path() {
        assert_eq!(
            ChartFormat::from_path(Path::new("matrix.png")),
            Some(ChartFormat::Png)
        );
        assert_eq!(
            ChartFormat::from_path(Path::new("matrix.EPS")),
            Some(ChartFormat::Eps)
        );
        assert_eq!(ChartFormat::from_path(Path::new("matrix.svg")), None);
        assert_eq!(ChartFormat::from_path(Path::new("matrix")), None);
    }

    #[test]
    fn test_chart_format_extension() {
        assert_eq!(ChartFormat::Png.extension(), "png");
        assert_eq!(ChartFormat::Eps.extension(), "eps");
    }

    #[test]
    fn test_headless_flags() {
        let args = Args::parse_from(["materiality", "--export-csv", "out.csv"]);
        assert!(args.is_headless());
        let args = Args::parse_from(["materiality", "--palette", "GRI 标准 (橙/绿/蓝)"]);
        assert!(!args.is_headless());
        let args = Args::parse_from(["materiality", "--dump-chart"]);
        assert!(args.is_headless());
    }

    #[test]
    fn test_force_requires_generate_config() {
        assert!(Args::try_parse_from(["materiality", "--force"]).is_err());
        assert!(Args::try_parse_from(["materiality", "--generate-config", "--force"]).is_ok());
    }

    #[test]
    fn test_options_markdown_lists_flags() {
        let md = render_options_markdown();
        assert!(md.contains("--export-csv"));
        assert!(md.contains("--threshold-financial"));
        assert!(!md.contains("`--help`"));
    }
}
