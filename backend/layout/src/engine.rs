//! Text measurement and indent synthesis.
//!
//! mrkdwn has no width units, so visual indentation is approximated by
//! concatenating whitespace glyphs of known rendered width. Widths are
//! decomposed greedily, widest glyph first, which is deterministic and cheap
//! but not guaranteed to hit the target exactly: the result never exceeds the
//! target and falls short of it by less than the narrowest glyph.

use crate::cache::LayoutCache;
use crate::metrics::{FontMetrics, GlyphTable};
use anyhow::Result;
use once_cell::sync::Lazy;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::trace;

/// Width assumed for characters missing from the letters table (an ordinary
/// space in the reference font).
pub const DEFAULT_WIDTH: f64 = 25.6;

/// Absorbs float error when a target is an exact multiple of a glyph width.
const WIDTH_EPSILON: f64 = 1e-6;

static SHARED: Lazy<Arc<LayoutEngine>> =
    Lazy::new(|| Arc::new(LayoutEngine::bundled().expect("bundled font metrics are valid")));

pub struct LayoutEngine {
    metrics: FontMetrics,
    glyphs: GlyphTable,
    fallback_width: f64,
    profile: u64,
    cache: Arc<LayoutCache>,
}

impl LayoutEngine {
    /// Engine with its own, empty cache.
    pub fn new(metrics: FontMetrics) -> Self {
        Self::with_cache(metrics, Arc::new(LayoutCache::new()))
    }

    /// Engine writing into an injected cache (shared per worker, or fresh per test).
    pub fn with_cache(metrics: FontMetrics, cache: Arc<LayoutCache>) -> Self {
        let glyphs = GlyphTable::from_metrics(&metrics);
        let profile = profile_of(&metrics, DEFAULT_WIDTH);
        Self {
            metrics,
            glyphs,
            fallback_width: DEFAULT_WIDTH,
            profile,
            cache,
        }
    }

    /// Override the width used for untabulated characters.
    ///
    /// Cache entries written under the previous width stay with the engines
    /// that still use it.
    pub fn with_fallback_width(mut self, width: f64) -> Self {
        self.fallback_width = width;
        self.profile = profile_of(&self.metrics, width);
        self
    }

    /// Engine over the metrics compiled into this crate.
    pub fn bundled() -> Result<Self> {
        Ok(Self::new(FontMetrics::bundled()?))
    }

    /// Process-wide engine over the bundled metrics, built on first use.
    pub fn shared() -> Arc<LayoutEngine> {
        Arc::clone(&SHARED)
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn glyphs(&self) -> &GlyphTable {
        &self.glyphs
    }

    pub fn fallback_width(&self) -> f64 {
        self.fallback_width
    }

    pub fn cache(&self) -> &LayoutCache {
        &self.cache
    }

    /// Fingerprint of the metrics and fallback width; scopes cache entries.
    pub fn profile(&self) -> u64 {
        self.profile
    }

    /// Rendered width of `text`, memoized per string.
    pub fn measure_width(&self, text: &str) -> f64 {
        if let Some(width) = self.cache.measured(self.profile, text) {
            return width;
        }
        let width = self.measure_uncached(text);
        trace!(text, width, "measured");
        self.cache.store_measured(self.profile, text, width);
        width
    }

    /// Same as [`measure_width`](Self::measure_width) without touching the cache.
    pub fn measure_uncached(&self, text: &str) -> f64 {
        text.chars()
            .map(|ch| {
                self.metrics
                    .letters
                    .get(&ch)
                    .copied()
                    .unwrap_or(self.fallback_width)
            })
            .sum()
    }

    /// Whitespace string approximating `width`, memoized per width.
    ///
    /// Non-positive (and NaN) widths yield an empty string.
    pub fn make_indent(&self, width: f64) -> String {
        if width.is_nan() || width <= 0.0 {
            return String::new();
        }
        if let Some(indent) = self.cache.indent(self.profile, width) {
            return indent;
        }
        let indent = self.compose_indent(width);
        trace!(width, glyphs = indent.chars().count(), "composed indent");
        self.cache.store_indent(self.profile, width, &indent);
        indent
    }

    /// Greedy largest-first decomposition of `width`, uncached.
    pub fn compose_indent(&self, width: f64) -> String {
        let mut indent = String::new();
        if width.is_nan() || width <= 0.0 {
            return indent;
        }
        let mut remaining = width;
        for (glyph_width, glyph) in self.glyphs.iter() {
            let count = ((remaining + WIDTH_EPSILON) / glyph_width).floor();
            if count >= 1.0 {
                indent.push_str(&glyph.repeat(count as usize));
                remaining -= count * glyph_width;
            }
        }
        indent
    }

    /// Rendered width of a string made of space glyphs; `None` if it holds
    /// anything else.
    pub fn indent_width(&self, indent: &str) -> Option<f64> {
        let mut buf = [0u8; 4];
        indent
            .chars()
            .map(|ch| self.glyphs.width_of(ch.encode_utf8(&mut buf)))
            .sum()
    }
}

fn profile_of(metrics: &FontMetrics, fallback_width: f64) -> u64 {
    let mut letters: Vec<(char, u64)> = metrics
        .letters
        .iter()
        .map(|(ch, w)| (*ch, w.to_bits()))
        .collect();
    letters.sort_unstable();
    let mut spaces: Vec<(&str, u64)> = metrics
        .spaces
        .iter()
        .map(|(glyph, w)| (glyph.as_str(), w.to_bits()))
        .collect();
    spaces.sort_unstable();

    let mut hasher = DefaultHasher::new();
    letters.hash(&mut hasher);
    spaces.hash(&mut hasher);
    fallback_width.to_bits().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn engine() -> LayoutEngine {
        LayoutEngine::bundled().unwrap()
    }

    #[test]
    fn measures_tabulated_letters() {
        let engine = engine();
        let a = engine.metrics().letters[&'a'];
        let b = engine.metrics().letters[&'b'];
        assert_eq!(engine.measure_width("ab"), a + b);
    }

    #[test]
    fn untabulated_chars_use_fallback() {
        let engine = engine();
        assert_eq!(engine.measure_width("中"), DEFAULT_WIDTH);
        assert_eq!(engine.measure_width(""), 0.0);
    }

    #[test]
    fn fallback_width_can_be_overridden() {
        let engine = engine().with_fallback_width(30.0);
        assert_eq!(engine.measure_width("中中"), 60.0);
    }

    #[test]
    fn measurement_is_memoized() {
        let engine = engine();
        let first = engine.measure_width("10.");
        assert_eq!(engine.cache().measured(engine.profile(), "10."), Some(first));
        assert_eq!(engine.measure_width("10."), first);
        assert_eq!(engine.cache().measured_len(), 1);
    }

    #[test]
    fn zero_width_indent_is_empty() {
        let engine = engine();
        assert_eq!(engine.make_indent(0.0), "");
        assert_eq!(engine.make_indent(-3.0), "");
        assert_eq!(engine.make_indent(f64::NAN), "");
    }

    #[test]
    fn single_glyph_widths_yield_single_glyph() {
        let engine = engine();
        for (width, glyph) in engine.glyphs().iter() {
            assert_eq!(engine.make_indent(width), glyph, "width {width}");
        }
    }

    #[test]
    fn greedy_takes_widest_glyphs_first() {
        let engine = engine();
        // 2 em + figure + hair
        let indent = engine.make_indent(266.33);
        assert_eq!(indent, "\u{2003}\u{2003}\u{2007}\u{200a}");
    }

    #[test]
    fn narrower_than_every_glyph_is_empty() {
        let engine = engine();
        assert_eq!(engine.make_indent(5.0), "");
    }

    #[test]
    fn injected_cache_is_shared_between_engines() {
        let cache = Arc::new(LayoutCache::new());
        let metrics = FontMetrics::bundled().unwrap();
        let first = LayoutEngine::with_cache(metrics.clone(), cache.clone());
        let second = LayoutEngine::with_cache(metrics, cache.clone());
        first.make_indent(100.0);
        assert_eq!(cache.indent_len(), 1);
        assert_eq!(second.make_indent(100.0), "\u{2003}");
        assert_eq!(cache.indent_len(), 1);
    }

    #[test]
    fn differently_configured_engines_keep_their_own_entries() {
        let cache = Arc::new(LayoutCache::new());
        let metrics = FontMetrics::bundled().unwrap();
        let a = LayoutEngine::with_cache(metrics.clone(), cache.clone());
        let b = LayoutEngine::with_cache(metrics, cache.clone()).with_fallback_width(40.0);
        assert_ne!(a.profile(), b.profile());

        assert_eq!(a.measure_width("中"), DEFAULT_WIDTH);
        assert_eq!(b.measure_width("中"), b.measure_uncached("中"));
        assert_eq!(b.measure_width("中"), 40.0);
        assert_eq!(a.measure_width("中"), DEFAULT_WIDTH);
        assert_eq!(cache.measured_len(), 2);
    }

    #[test]
    fn overriding_fallback_keeps_shared_entries() {
        let cache = Arc::new(LayoutCache::new());
        let metrics = FontMetrics::bundled().unwrap();
        let a = LayoutEngine::with_cache(metrics.clone(), cache.clone());
        a.make_indent(100.0);
        let _b = LayoutEngine::with_cache(metrics, cache.clone()).with_fallback_width(40.0);
        assert_eq!(cache.indent(a.profile(), 100.0).as_deref(), Some("\u{2003}"));
    }

    #[test]
    fn engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LayoutEngine>();
        assert_send_sync::<Arc<LayoutEngine>>();
        assert_send_sync::<LayoutCache>();
    }

    #[test]
    fn concurrent_measurement_matches_sequential() {
        let engine = Arc::new(engine());
        let inputs = ["1.", "10.", "中", "• ", "abc"];
        let expected: Vec<(f64, String)> = inputs
            .iter()
            .enumerate()
            .map(|(i, t)| (engine.measure_uncached(t), engine.compose_indent(50.0 * i as f64)))
            .collect();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    inputs
                        .iter()
                        .enumerate()
                        .map(|(i, t)| (engine.measure_width(t), engine.make_indent(50.0 * i as f64)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn shared_engine_is_reused() {
        assert!(Arc::ptr_eq(&LayoutEngine::shared(), &LayoutEngine::shared()));
    }

    proptest! {
        #[test]
        fn measure_is_cache_transparent(text in "\\PC{0,24}") {
            let engine = engine();
            let uncached = engine.measure_uncached(&text);
            prop_assert_eq!(engine.measure_width(&text), uncached);
            prop_assert_eq!(engine.measure_width(&text), uncached);
        }

        #[test]
        fn indent_uses_only_space_glyphs(width in 0.0f64..2000.0) {
            let engine = engine();
            let indent = engine.make_indent(width);
            prop_assert!(engine.indent_width(&indent).is_some());
        }

        #[test]
        fn indent_stays_within_one_narrow_glyph(width in 0.0f64..2000.0) {
            let engine = engine();
            let composed = engine.indent_width(&engine.make_indent(width)).unwrap();
            let narrowest = engine.glyphs().narrowest().unwrap();
            prop_assert!(composed <= width + 1e-3);
            prop_assert!(width - composed < narrowest + 1e-3);
        }

        #[test]
        fn indent_width_is_monotonic(a in 0.0f64..2000.0, b in 0.0f64..2000.0) {
            let engine = engine();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let lo_width = engine.indent_width(&engine.make_indent(lo)).unwrap();
            let hi_width = engine.indent_width(&engine.make_indent(hi)).unwrap();
            prop_assert!(lo_width <= hi_width + 1e-9);
        }

        #[test]
        fn indent_is_deterministic(width in 0.0f64..2000.0) {
            let engine = engine();
            let first = engine.make_indent(width);
            engine.cache().clear();
            prop_assert_eq!(engine.make_indent(width), first.clone());
            prop_assert_eq!(engine.compose_indent(width), first);
        }
    }
}
