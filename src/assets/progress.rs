//! Download progress for an in-flight load.

/// How a percentage is derived from `loaded / total`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressFormula {
    /// `floor(loaded * 100 / total)`; reaches 100 only once everything has arrived
    #[default]
    Floor,
    /// `floor(loaded / total) * 100`; reports 0 until the load is complete.
    /// Overshoot (`loaded > total`) is held at 99 like [`ProgressFormula::Floor`].
    Legacy,
}

impl ProgressFormula {
    /// Integer percentage for the given byte counts. An unknown total (`0`) reports 0.
    pub fn percent(self, loaded: u64, total: u64) -> u8 {
        if total == 0 {
            return 0;
        }
        if loaded == total {
            return 100;
        }
        // Overshooting loaders never get to claim completion early
        let pct = match self {
            ProgressFormula::Floor => u128::from(loaded) * 100 / u128::from(total),
            ProgressFormula::Legacy => u128::from(loaded / total) * 100,
        };
        pct.min(99) as u8
    }
}

/// Byte counts of an in-flight load plus the derived percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: u64,
    pub percent: u8,
}

impl LoadProgress {
    pub fn new(loaded: u64, total: u64, formula: ProgressFormula) -> Self {
        Self {
            loaded,
            total,
            percent: formula.percent(loaded, total),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.loaded == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_never_rounds_up_to_complete() {
        let f = ProgressFormula::Floor;
        assert_eq!(f.percent(0, 200), 0);
        assert_eq!(f.percent(1, 3), 33);
        assert_eq!(f.percent(199, 200), 99);
        assert_eq!(f.percent(999_999, 1_000_000), 99);
        assert_eq!(f.percent(200, 200), 100);
        assert_eq!(f.percent(300, 200), 99);
    }

    #[test]
    fn test_legacy_is_binary() {
        let f = ProgressFormula::Legacy;
        assert_eq!(f.percent(0, 200), 0);
        assert_eq!(f.percent(150, 200), 0);
        assert_eq!(f.percent(200, 200), 100);
        assert_eq!(f.percent(300, 200), 99);
        assert_eq!(f.percent(400, 200), 99);
    }

    #[test]
    fn test_unknown_total() {
        assert_eq!(ProgressFormula::Floor.percent(512, 0), 0);
        assert_eq!(ProgressFormula::Legacy.percent(512, 0), 0);
        assert!(!LoadProgress::new(0, 0, ProgressFormula::Floor).is_complete());
    }

    #[test]
    fn test_hundred_only_when_complete() {
        for formula in [ProgressFormula::Floor, ProgressFormula::Legacy] {
            for loaded in (0..=200u64).chain([u64::MAX]) {
                let p = LoadProgress::new(loaded, 64, formula);
                assert_eq!(p.percent == 100, p.is_complete(), "{formula:?} at {loaded}");
            }
        }
    }
}
