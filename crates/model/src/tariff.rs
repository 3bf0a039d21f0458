use serde::{Deserialize, Serialize};

pub const DEFAULT_TARIFF_PER_KWH: f64 = 0.18895;

/// Price charged per kilowatt-hour.
///
/// Costs are always derived from the tariff in effect when they are computed,
/// never from the one that applied when a record was written.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tariff(f64);

impl Tariff {
    pub fn new(per_kwh: f64) -> Self {
        Self(per_kwh)
    }

    pub fn per_kwh(&self) -> f64 {
        self.0
    }

    pub fn cost(&self, kwh: f64) -> f64 {
        kwh * self.0
    }
}

impl Default for Tariff {
    fn default() -> Self {
        Self(DEFAULT_TARIFF_PER_KWH)
    }
}

impl From<f64> for Tariff {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_scales_with_rate() {
        let tariff = Tariff::new(0.5);
        assert_eq!(tariff.cost(3.0), 1.5);
    }

    #[test]
    fn default_rate() {
        assert_eq!(Tariff::default().per_kwh(), DEFAULT_TARIFF_PER_KWH);
    }
}
