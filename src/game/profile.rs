//! Player IQ profile and play style classification

use serde::{Deserialize, Serialize};

use crate::consts::{STAT_DEFAULT, STAT_MAX, STAT_MIN};

/// The five tracked stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatCategory {
    Logic,
    Creativity,
    Empathy,
    Metacognition,
    Resilience,
}

impl StatCategory {
    pub const ALL: [StatCategory; 5] = [
        StatCategory::Logic,
        StatCategory::Creativity,
        StatCategory::Empathy,
        StatCategory::Metacognition,
        StatCategory::Resilience,
    ];

    /// Name used in the save document
    pub fn as_str(&self) -> &'static str {
        match self {
            StatCategory::Logic => "logicIQ",
            StatCategory::Creativity => "creativityIQ",
            StatCategory::Empathy => "empathyIQ",
            StatCategory::Metacognition => "metacognitionIQ",
            StatCategory::Resilience => "resilienceIQ",
        }
    }

    /// Accepts both the short name (`logic`) and the save name (`logicIQ`)
    pub fn parse_name(s: &str) -> Option<Self> {
        match s {
            "logic" | "logicIQ" => Some(StatCategory::Logic),
            "creativity" | "creativityIQ" => Some(StatCategory::Creativity),
            "empathy" | "empathyIQ" => Some(StatCategory::Empathy),
            "metacognition" | "metacognitionIQ" => Some(StatCategory::Metacognition),
            "resilience" | "resilienceIQ" => Some(StatCategory::Resilience),
            _ => None,
        }
    }
}

/// Dominant thinking style derived from logic/creativity/empathy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayStyle {
    #[default]
    Balanced,
    Analytical,
    Creative,
    Emotional,
}

impl PlayStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayStyle::Balanced => "balanced",
            PlayStyle::Analytical => "analytical",
            PlayStyle::Creative => "creative",
            PlayStyle::Emotional => "emotional",
        }
    }

    /// Strict maximum wins; any tie for the top is balanced
    pub fn classify(logic: u8, creativity: u8, empathy: u8) -> Self {
        if logic > creativity && logic > empathy {
            PlayStyle::Analytical
        } else if creativity > logic && creativity > empathy {
            PlayStyle::Creative
        } else if empathy > logic && empathy > creativity {
            PlayStyle::Emotional
        } else {
            PlayStyle::Balanced
        }
    }
}

/// Bounded stats plus the derived play style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    #[serde(rename = "logicIQ")]
    pub logic: u8,
    #[serde(rename = "creativityIQ")]
    pub creativity: u8,
    #[serde(rename = "empathyIQ")]
    pub empathy: u8,
    #[serde(rename = "metacognitionIQ")]
    pub metacognition: u8,
    #[serde(rename = "resilienceIQ")]
    pub resilience: u8,
    #[serde(rename = "playStyle")]
    pub play_style: PlayStyle,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            logic: STAT_DEFAULT,
            creativity: STAT_DEFAULT,
            empathy: STAT_DEFAULT,
            metacognition: STAT_DEFAULT,
            resilience: STAT_DEFAULT,
            play_style: PlayStyle::Balanced,
        }
    }
}

impl PlayerProfile {
    pub fn stat(&self, category: StatCategory) -> u8 {
        match category {
            StatCategory::Logic => self.logic,
            StatCategory::Creativity => self.creativity,
            StatCategory::Empathy => self.empathy,
            StatCategory::Metacognition => self.metacognition,
            StatCategory::Resilience => self.resilience,
        }
    }

    fn stat_mut(&mut self, category: StatCategory) -> &mut u8 {
        match category {
            StatCategory::Logic => &mut self.logic,
            StatCategory::Creativity => &mut self.creativity,
            StatCategory::Empathy => &mut self.empathy,
            StatCategory::Metacognition => &mut self.metacognition,
            StatCategory::Resilience => &mut self.resilience,
        }
    }

    /// Add `delta` to a stat, clamp to [0, 100] and reclassify play style.
    /// Returns the new value.
    pub fn apply_delta(&mut self, category: StatCategory, delta: i32) -> u8 {
        let stat = self.stat_mut(category);
        let next = (i64::from(*stat) + i64::from(delta)).clamp(i64::from(STAT_MIN), i64::from(STAT_MAX));
        *stat = next as u8;
        self.refresh_play_style();
        next as u8
    }

    pub fn refresh_play_style(&mut self) {
        self.play_style = PlayStyle::classify(self.logic, self.creativity, self.empathy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_category_names() {
        assert_eq!(StatCategory::parse_name("logic"), Some(StatCategory::Logic));
        assert_eq!(StatCategory::parse_name("resilienceIQ"), Some(StatCategory::Resilience));
        assert_eq!(StatCategory::parse_name("charisma"), None);
        assert_eq!(StatCategory::parse_name("LOGIC"), None);
        for category in StatCategory::ALL {
            assert_eq!(StatCategory::parse_name(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_classify_ties_are_balanced() {
        assert_eq!(PlayStyle::classify(50, 50, 50), PlayStyle::Balanced);
        assert_eq!(PlayStyle::classify(70, 70, 10), PlayStyle::Balanced);
        assert_eq!(PlayStyle::classify(10, 70, 70), PlayStyle::Balanced);
        assert_eq!(PlayStyle::classify(70, 10, 70), PlayStyle::Balanced);
    }

    #[test]
    fn test_classify_strict_maximum() {
        assert_eq!(PlayStyle::classify(51, 50, 50), PlayStyle::Analytical);
        assert_eq!(PlayStyle::classify(0, 1, 0), PlayStyle::Creative);
        assert_eq!(PlayStyle::classify(40, 60, 61), PlayStyle::Emotional);
    }

    #[test]
    fn test_stepwise_clamp_differs_from_summed() {
        let mut profile = PlayerProfile::default();
        profile.apply_delta(StatCategory::Logic, 80);
        assert_eq!(profile.logic, 100);
        profile.apply_delta(StatCategory::Logic, -80);
        // Summing first would give 50; clamping each step gives 20.
        assert_eq!(profile.logic, 20);
    }

    #[test]
    fn test_delta_reclassifies() {
        let mut profile = PlayerProfile::default();
        profile.apply_delta(StatCategory::Empathy, 5);
        assert_eq!(profile.play_style, PlayStyle::Emotional);
        profile.apply_delta(StatCategory::Empathy, -5);
        assert_eq!(profile.play_style, PlayStyle::Balanced);
        // Non-leading stats never change the style
        profile.apply_delta(StatCategory::Metacognition, 40);
        assert_eq!(profile.play_style, PlayStyle::Balanced);
    }

    #[test]
    fn test_extreme_deltas_do_not_overflow() {
        let mut profile = PlayerProfile::default();
        assert_eq!(profile.apply_delta(StatCategory::Resilience, i32::MAX), 100);
        assert_eq!(profile.apply_delta(StatCategory::Resilience, i32::MIN), 0);
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(PlayerProfile::default()).unwrap();
        assert_eq!(json["logicIQ"], 50);
        assert_eq!(json["metacognitionIQ"], 50);
        assert_eq!(json["playStyle"], "balanced");
    }

    proptest! {
        #[test]
        fn prop_stat_stays_in_range(deltas in proptest::collection::vec(any::<i32>(), 0..20)) {
            let mut profile = PlayerProfile::default();
            for delta in deltas {
                let value = profile.apply_delta(StatCategory::Creativity, delta);
                prop_assert!(value <= 100);
                prop_assert_eq!(value, profile.creativity);
            }
        }

        #[test]
        fn prop_play_style_is_pure(l in 0u8..=100, c in 0u8..=100, e in 0u8..=100) {
            let style = PlayStyle::classify(l, c, e);
            prop_assert_eq!(style, PlayStyle::classify(l, c, e));
            let max = l.max(c).max(e);
            let leaders = [l, c, e].iter().filter(|v| **v == max).count();
            if leaders > 1 {
                prop_assert_eq!(style, PlayStyle::Balanced);
            } else {
                prop_assert_ne!(style, PlayStyle::Balanced);
            }
        }
    }
}
