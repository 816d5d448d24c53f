//! The fixed weighting of the five sub-risks.
//!
//! Unlike the lookup tables, weights are not loadable: every `RiskModel`
//! uses `RiskWeights::STANDARD`.

/// Per-factor weights applied to the clamped sub-risks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskWeights {
    pub age: f64,
    pub conditions: f64,
    pub labs: f64,
    pub allergies: f64,
    pub interactions: f64,
}

impl RiskWeights {
    pub const STANDARD: RiskWeights = RiskWeights {
        age: 0.20,
        conditions: 0.30,
        labs: 0.35,
        allergies: 0.10,
        interactions: 0.05,
    };

    pub fn sum(&self) -> f64 {
        self.age + self.conditions + self.labs + self.allergies + self.interactions
    }
}
