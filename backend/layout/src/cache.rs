use std::collections::HashMap;
use std::sync::RwLock;

/// Memoization stores for the layout engine.
///
/// Every entry is keyed by the profile of the engine that computed it (a
/// fingerprint of its metrics and fallback width), so engines configured
/// differently can share one cache without reading each other's results.
///
/// Entries are never evicted: the distinct strings and widths seen while
/// rendering are bounded by the size of the input trees. Lock poisoning only
/// disables caching; lookups then fall through to recomputation.
#[derive(Debug, Default)]
pub struct LayoutCache {
    measurements: RwLock<HashMap<(u64, String), f64>>,
    indents: RwLock<HashMap<(u64, u64), String>>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measured(&self, profile: u64, text: &str) -> Option<f64> {
        self.measurements
            .read()
            .ok()
            .and_then(|m| m.get(&(profile, text.to_string())).copied())
    }

    pub fn store_measured(&self, profile: u64, text: &str, width: f64) {
        if let Ok(mut m) = self.measurements.write() {
            m.insert((profile, text.to_string()), width);
        }
    }

    pub fn indent(&self, profile: u64, width: f64) -> Option<String> {
        self.indents
            .read()
            .ok()
            .and_then(|m| m.get(&(profile, width.to_bits())).cloned())
    }

    pub fn store_indent(&self, profile: u64, width: f64, indent: &str) {
        if let Ok(mut m) = self.indents.write() {
            m.insert((profile, width.to_bits()), indent.to_string());
        }
    }

    /// Number of memoized measurements.
    pub fn measured_len(&self) -> usize {
        self.measurements.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Number of memoized indents.
    pub fn indent_len(&self) -> usize {
        self.indents.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut c) = self.measurements.write() {
            c.clear();
        }
        if let Ok(mut c) = self.indents.write() {
            c.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_clears() {
        let cache = LayoutCache::new();
        cache.store_measured(7, "1.", 80.6);
        cache.store_indent(7, 58.0, "\u{2007}");
        assert_eq!(cache.measured(7, "1."), Some(80.6));
        assert_eq!(cache.indent(7, 58.0).as_deref(), Some("\u{2007}"));
        assert_eq!((cache.measured_len(), cache.indent_len()), (1, 1));

        cache.clear();
        assert_eq!(cache.measured(7, "1."), None);
        assert_eq!(cache.indent_len(), 0);
    }

    #[test]
    fn entries_are_scoped_to_a_profile() {
        let cache = LayoutCache::new();
        cache.store_measured(1, "中", 25.6);
        cache.store_indent(1, 58.0, "\u{2007}");
        assert_eq!(cache.measured(2, "中"), None);
        assert_eq!(cache.indent(2, 58.0), None);
        cache.store_measured(2, "中", 40.0);
        assert_eq!(cache.measured(1, "中"), Some(25.6));
        assert_eq!(cache.measured(2, "中"), Some(40.0));
    }
}
