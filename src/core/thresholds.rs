use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Conservative,
    Moderate,
    Aggressive,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TierLimits {
    pub tier: Tier,
    pub front_end: f64,
    pub back_end: f64,
    pub net_worth: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CapKind {
    FrontEnd,
    BackEnd,
    NetWorth,
}

pub type ThresholdTable = [TierLimits; 3];

/// Illustrative approval ceilings, ordered from tightest to loosest.
pub const THRESHOLDS: ThresholdTable = [
    TierLimits {
        tier: Tier::Conservative,
        front_end: 0.28,
        back_end: 0.36,
        net_worth: 0.30,
    },
    TierLimits {
        tier: Tier::Moderate,
        front_end: 0.33,
        back_end: 0.43,
        net_worth: 0.50,
    },
    TierLimits {
        tier: Tier::Aggressive,
        front_end: 0.40,
        back_end: 0.45,
        net_worth: 0.65,
    },
];

impl TierLimits {
    pub fn cap(&self, kind: CapKind) -> f64 {
        match kind {
            CapKind::FrontEnd => self.front_end,
            CapKind::BackEnd => self.back_end,
            CapKind::NetWorth => self.net_worth,
        }
    }
}

impl Tier {
    pub fn limits(self) -> &'static TierLimits {
        match self {
            Tier::Conservative => &THRESHOLDS[0],
            Tier::Moderate => &THRESHOLDS[1],
            Tier::Aggressive => &THRESHOLDS[2],
        }
    }
}

/// Lowest tier whose cap the value satisfies, or `None` when it exceeds all.
pub fn classify(value: f64, kind: CapKind) -> Option<Tier> {
    THRESHOLDS
        .iter()
        .find(|limits| value <= limits.cap(kind))
        .map(|limits| limits.tier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_ordered_loosest_last() {
        for pair in THRESHOLDS.windows(2) {
            assert!(pair[0].front_end <= pair[1].front_end);
            assert!(pair[0].back_end <= pair[1].back_end);
            assert!(pair[0].net_worth <= pair[1].net_worth);
        }
    }

    #[test]
    fn classify_returns_the_lowest_satisfying_tier() {
        assert_eq!(classify(0.20, CapKind::FrontEnd), Some(Tier::Conservative));
        assert_eq!(classify(0.28, CapKind::FrontEnd), Some(Tier::Conservative));
        assert_eq!(classify(0.30, CapKind::FrontEnd), Some(Tier::Moderate));
        assert_eq!(classify(0.39, CapKind::FrontEnd), Some(Tier::Aggressive));
        assert_eq!(classify(0.41, CapKind::FrontEnd), None);
    }

    #[test]
    fn classify_honors_each_cap_kind() {
        assert_eq!(classify(0.44, CapKind::BackEnd), Some(Tier::Aggressive));
        assert_eq!(classify(0.46, CapKind::BackEnd), None);
        assert_eq!(classify(0.55, CapKind::NetWorth), Some(Tier::Aggressive));
        assert_eq!(classify(0.70, CapKind::NetWorth), None);
    }

    #[test]
    fn tier_limits_round_trip() {
        assert_eq!(Tier::Moderate.limits().tier, Tier::Moderate);
        assert!(Tier::Aggressive.limits().cap(CapKind::FrontEnd) == 0.40);
    }
}
