//! One user's dashboard: the topic store, the sidebar settings and the
//! outputs derived from them.
//!
//! Every mutation goes through a method here and is followed by a full
//! recomputation pass (recolor, chart, lists), so `chart()` and `lists()`
//! always reflect the latest snapshot.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use rand::Rng;
use std::path::Path;

use crate::category_list::{standard_lists, CategoryList};
use crate::chart_export::write_matrix_chart;
use crate::config::AppConfig;
use crate::export::{export_csv, write_csv};
use crate::matrix::{render_matrix, snap_threshold, MatrixChart, MatrixParams};
use crate::palette::{BackgroundTheme, Palette};
use crate::store::{TopicStore, ValidationError};
use crate::topic::{default_topics, Topic, TopicField, SCORE_MAX, SCORE_MIN};
use crate::{Args, ChartFormat};

/// Starting sidebar state, from config with CLI overrides applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub palettes: Vec<Palette>,
    pub palette: String,
    pub background: String,
    pub threshold_financial: f64,
    pub threshold_impact: f64,
    pub threshold_step: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        let config = AppConfig::default();
        Self {
            palettes: config.palettes(),
            palette: config.matrix.palette,
            background: config.matrix.background,
            threshold_financial: config.matrix.threshold_financial,
            threshold_impact: config.matrix.threshold_impact,
            threshold_step: config.matrix.threshold_step,
        }
    }
}

impl SessionSettings {
    /// Layer CLI arguments over the loaded configuration.
    pub fn from_config(config: &AppConfig, args: &Args) -> Result<Self> {
        let threshold = |cli: Option<f64>, configured: f64, flag: &str| -> Result<f64> {
            match cli {
                Some(v) if !(SCORE_MIN..=SCORE_MAX).contains(&v) => Err(eyre!(
                    "--{} must be between {} and {}, got {}",
                    flag,
                    SCORE_MIN,
                    SCORE_MAX,
                    v
                )),
                Some(v) => Ok(v),
                None => Ok(configured),
            }
        };

        Ok(Self {
            palettes: config.palettes(),
            palette: args
                .palette
                .clone()
                .unwrap_or_else(|| config.matrix.palette.clone()),
            background: args
                .background
                .clone()
                .unwrap_or_else(|| config.matrix.background.clone()),
            threshold_financial: threshold(
                args.threshold_financial,
                config.matrix.threshold_financial,
                "threshold-financial",
            )?,
            threshold_impact: threshold(
                args.threshold_impact,
                config.matrix.threshold_impact,
                "threshold-impact",
            )?,
            threshold_step: config.matrix.threshold_step,
        })
    }
}

/// Position of `name` in `names`, or 0 with a warning.
fn index_or_first<'a>(mut names: impl Iterator<Item = &'a str>, name: &str, what: &str) -> usize {
    names.position(|n| n == name).unwrap_or_else(|| {
        log::warn!("{} '{}' not found, using the first preset", what, name);
        0
    })
}

pub struct Session {
    store: TopicStore,
    palettes: Vec<Palette>,
    palette_index: usize,
    background_index: usize,
    threshold_financial: f64,
    threshold_impact: f64,
    threshold_step: f64,
    chart: MatrixChart,
    lists: Vec<CategoryList>,
    recomputes: usize,
}

impl Session {
    pub fn new(topics: Vec<Topic>, settings: SessionSettings) -> Self {
        let mut palettes = settings.palettes;
        if palettes.is_empty() {
            palettes = Palette::presets();
        }
        let palette_index = index_or_first(
            palettes.iter().map(|p| p.name.as_str()),
            &settings.palette,
            "palette",
        );
        let background_index = index_or_first(
            BackgroundTheme::presets().iter().map(|b| b.name),
            &settings.background,
            "background",
        );
        let store = TopicStore::new(topics, palettes[palette_index].clone());
        let mut session = Self {
            store,
            palettes,
            palette_index,
            background_index,
            threshold_financial: settings.threshold_financial.clamp(SCORE_MIN, SCORE_MAX),
            threshold_impact: settings.threshold_impact.clamp(SCORE_MIN, SCORE_MAX),
            threshold_step: settings.threshold_step,
            chart: render_matrix(&[], &MatrixParams::default()),
            lists: Vec::new(),
            recomputes: 0,
        };
        session.recompute();
        session
    }

    /// Session over the 22 default topics with random scores.
    pub fn seeded<R: Rng + ?Sized>(rng: &mut R, settings: SessionSettings) -> Self {
        Self::new(default_topics(rng), settings)
    }

    /// Rebuild the chart and the lists from the store, whose rows are
    /// already colored for the active palette.
    fn recompute(&mut self) {
        self.chart = render_matrix(self.store.topics(), &self.params());
        self.lists = standard_lists(self.store.topics(), self.store.palette());
        self.recomputes += 1;
        log::debug!(
            "recompute #{}: {} topics, {} plotted",
            self.recomputes,
            self.store.len(),
            self.chart.point_count()
        );
    }

    pub fn params(&self) -> MatrixParams {
        MatrixParams {
            threshold_financial: self.threshold_financial,
            threshold_impact: self.threshold_impact,
            background: self.background(),
        }
    }

    pub fn topics(&self) -> &[Topic] {
        self.store.topics()
    }

    pub fn chart(&self) -> &MatrixChart {
        &self.chart
    }

    pub fn lists(&self) -> &[CategoryList] {
        &self.lists
    }

    pub fn palettes(&self) -> &[Palette] {
        &self.palettes
    }

    pub fn palette(&self) -> &Palette {
        self.store.palette()
    }

    pub fn background(&self) -> BackgroundTheme {
        BackgroundTheme::presets()[self.background_index]
    }

    pub fn threshold_financial(&self) -> f64 {
        self.threshold_financial
    }

    pub fn threshold_impact(&self) -> f64 {
        self.threshold_impact
    }

    /// Number of recomputation passes so far.
    pub fn recomputes(&self) -> usize {
        self.recomputes
    }

    pub fn add_topic(&mut self, topic: Topic) -> usize {
        self.store.add(topic);
        self.recompute();
        self.store.len() - 1
    }

    /// Append an empty row and return its index.
    pub fn add_blank(&mut self) -> usize {
        self.add_topic(Topic::blank())
    }

    pub fn update(
        &mut self,
        index: usize,
        field: TopicField,
        value: &str,
    ) -> Result<(), ValidationError> {
        self.store.update(index, field, value)?;
        self.recompute();
        Ok(())
    }

    pub fn cycle_dimension(&mut self, index: usize) -> Result<(), ValidationError> {
        self.store.cycle_dimension(index)?;
        self.recompute();
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<(), ValidationError> {
        self.store.remove(index)?;
        self.recompute();
        Ok(())
    }

    pub fn select_palette(&mut self, index: usize) {
        let Some(palette) = self.palettes.get(index) else {
            log::warn!("palette index {} out of range", index);
            return;
        };
        self.palette_index = index;
        self.store.recolor(palette.clone());
        self.recompute();
    }

    /// Move the palette selection by `delta`, wrapping around.
    pub fn cycle_palette(&mut self, delta: isize) {
        let next = wrap(self.palette_index, delta, self.palettes.len());
        self.select_palette(next);
    }

    pub fn select_background(&mut self, index: usize) {
        if index >= BackgroundTheme::presets().len() {
            log::warn!("background index {} out of range", index);
            return;
        }
        self.background_index = index;
        log::info!("background changed to '{}'", self.background().name);
        self.recompute();
    }

    pub fn cycle_background(&mut self, delta: isize) {
        let next = wrap(self.background_index, delta, BackgroundTheme::presets().len());
        self.select_background(next);
    }

    /// Set both thresholds, each snapped to the slider step.
    pub fn set_thresholds(&mut self, financial: f64, impact: f64) {
        self.threshold_financial = snap_threshold(financial, self.threshold_step);
        self.threshold_impact = snap_threshold(impact, self.threshold_step);
        self.thresholds_changed();
    }

    /// Move the financial threshold by `steps` slider steps. The impact
    /// threshold keeps its value even when it is off the step grid.
    pub fn nudge_threshold_financial(&mut self, steps: f64) {
        let value = self.threshold_financial + steps * self.threshold_step;
        self.threshold_financial = snap_threshold(value, self.threshold_step);
        self.thresholds_changed();
    }

    pub fn nudge_threshold_impact(&mut self, steps: f64) {
        let value = self.threshold_impact + steps * self.threshold_step;
        self.threshold_impact = snap_threshold(value, self.threshold_step);
        self.thresholds_changed();
    }

    fn thresholds_changed(&mut self) {
        log::debug!(
            "thresholds set to ({}, {})",
            self.threshold_financial,
            self.threshold_impact
        );
        self.recompute();
    }

    pub fn export_csv(&self) -> Result<Vec<u8>> {
        export_csv(self.topics())
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        write_csv(path, self.topics())
    }

    pub fn write_chart(&self, path: &Path, format: ChartFormat) -> Result<()> {
        write_matrix_chart(path, &self.chart, format)
    }

    /// Chart description as pretty JSON.
    pub fn chart_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.chart)
            .map_err(|e| eyre!("Failed to serialize chart: {}", e))
    }
}

fn wrap(index: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as isize + delta).rem_euclid(len as isize) as usize
}
