use serde::{Deserialize, Serialize};

/// Presentation bucket for a goal's pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Critical,
    Urgent,
    Medium,
    Comfortable,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Critical => "critical",
            Urgency::Urgent => "urgent",
            Urgency::Medium => "medium",
            Urgency::Comfortable => "comfortable",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a pressure reading. Rules are checked in order; first match wins.
pub fn urgency_tag(pressure: f64, days_left: u32) -> Urgency {
    if pressure > 70.0 || (pressure > 50.0 && days_left <= 7) {
        Urgency::Critical
    } else if pressure > 50.0 || days_left <= 14 {
        Urgency::Urgent
    } else if pressure > 30.0 || days_left <= 30 {
        Urgency::Medium
    } else {
        Urgency::Comfortable
    }
}

/// Dashboard line shown under the pressure gauge.
pub fn motivational_message(pressure: f64, days_left: u32) -> &'static str {
    if pressure > 70.0 {
        "Time to grind! You're falling behind."
    } else if pressure > 50.0 {
        "Keep the pace up to stay on track."
    } else if pressure > 30.0 {
        "You're on track. Keep going!"
    } else if days_left <= 3 {
        "Final stretch! You got this!"
    } else {
        "You're crushing it! Stay ahead!"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_pressure_wins_over_distance() {
        assert_eq!(urgency_tag(75.0, 20), Urgency::Critical);
        assert_eq!(urgency_tag(75.0, 200), Urgency::Critical);
    }

    #[test]
    fn moderate_pressure_turns_critical_inside_a_week() {
        assert_eq!(urgency_tag(55.0, 7), Urgency::Critical);
        assert_eq!(urgency_tag(55.0, 8), Urgency::Urgent);
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(urgency_tag(70.0, 100), Urgency::Urgent);
        assert_eq!(urgency_tag(50.0, 100), Urgency::Medium);
        assert_eq!(urgency_tag(30.0, 100), Urgency::Comfortable);
    }

    #[test]
    fn days_alone_raise_urgency() {
        assert_eq!(urgency_tag(0.0, 14), Urgency::Urgent);
        assert_eq!(urgency_tag(0.0, 30), Urgency::Medium);
        assert_eq!(urgency_tag(0.0, 31), Urgency::Comfortable);
        // Pressure 50 is exactly on pace and must not trip the `d <= 7` rule.
        assert_eq!(urgency_tag(50.0, 3), Urgency::Urgent);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Urgency::Comfortable).unwrap(),
            "\"comfortable\""
        );
        assert_eq!(Urgency::Critical.to_string(), "critical");
    }

    #[test]
    fn messages_follow_pressure_tiers() {
        assert_eq!(motivational_message(80.0, 1), "Time to grind! You're falling behind.");
        assert_eq!(motivational_message(20.0, 2), "Final stretch! You got this!");
        assert_eq!(motivational_message(20.0, 40), "You're crushing it! Stay ahead!");
    }
}
