//! Font metrics table.
//!
//! Per-glyph widths measured once, offline, against the font the chat client
//! renders mrkdwn with. `letters` covers the list-marker alphabet; `spaces`
//! holds the whitespace glyphs indentation is built from.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Metrics compiled into the crate.
const BUNDLED_METRICS: &str = include_str!("../data/metrics.json");

/// Raw metrics as stored in the data file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontMetrics {
    #[serde(default)]
    pub letters: HashMap<char, f64>,
    #[serde(default)]
    pub spaces: HashMap<String, f64>,
}

impl FontMetrics {
    /// Parse and check a metrics document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let metrics: FontMetrics =
            serde_json::from_str(raw).context("Failed to parse font metrics JSON")?;
        metrics.check()?;
        Ok(metrics)
    }

    /// Load a metrics document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read font metrics: {}", path.display()))?;
        let metrics = Self::from_json(&raw)
            .with_context(|| format!("Invalid font metrics at: {}", path.display()))?;
        debug!(
            path = %path.display(),
            letters = metrics.letters.len(),
            spaces = metrics.spaces.len(),
            "Loaded font metrics"
        );
        Ok(metrics)
    }

    /// The metrics shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_METRICS).context("Bundled font metrics are invalid")
    }

    /// Widths must be positive and finite; a zero-width space glyph would
    /// never reduce the remaining width during indent synthesis.
    fn check(&self) -> Result<()> {
        for (ch, width) in &self.letters {
            if !width.is_finite() || *width < 0.0 {
                bail!("letter {ch:?} has invalid width {width}");
            }
        }
        for (glyph, width) in &self.spaces {
            if glyph.is_empty() {
                bail!("space glyph cannot be empty");
            }
            if !width.is_finite() || *width <= 0.0 {
                bail!("space glyph {glyph:?} has invalid width {width}");
            }
        }
        Ok(())
    }
}

/// Whitespace glyphs ordered widest first.
///
/// Glyphs sharing a width collapse into one entry (the lexically smallest
/// glyph wins), so the table is deterministic regardless of map order.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphTable {
    entries: Vec<(f64, String)>,
}

impl GlyphTable {
    pub fn from_metrics(metrics: &FontMetrics) -> Self {
        let mut entries: Vec<(f64, String)> = metrics
            .spaces
            .iter()
            .map(|(glyph, width)| (*width, glyph.clone()))
            .collect();
        entries.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        entries.dedup_by(|later, earlier| later.0 == earlier.0);
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &str)> {
        self.entries.iter().map(|(w, g)| (*w, g.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Width of the narrowest glyph, if any.
    pub fn narrowest(&self) -> Option<f64> {
        self.entries.last().map(|(w, _)| *w)
    }

    pub fn width_of(&self, glyph: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(_, g)| g == glyph)
            .map(|(w, _)| *w)
    }
}
