use serde::Deserialize;

/// How safe the observed execution is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SafetyLevel {
    Safe,
    Caution,
    Dangerous,
}

impl SafetyLevel {
    pub const ALL: [SafetyLevel; 3] = [Self::Safe, Self::Caution, Self::Dangerous];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Caution => "Caution",
            Self::Dangerous => "Dangerous",
        }
    }

    /// Symbolic icon name for the safety badge.
    pub fn icon_name(self) -> &'static str {
        match self {
            Self::Safe => "security-high-symbolic",
            Self::Caution => "security-medium-symbolic",
            Self::Dangerous => "security-low-symbolic",
        }
    }

    /// CSS class used to tint the badge.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Safe => "success",
            Self::Caution => "warning",
            Self::Dangerous => "error",
        }
    }
}

/// Structured critique returned by the model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub exercise_name: String,
    /// Technique score, 1 to 10
    pub score: u8,
    pub good_points: Vec<String>,
    pub mistakes: Vec<String>,
    pub recommendations: Vec<String>,
    pub muscle_groups: Vec<String>,
    pub safety_level: SafetyLevel,
}

impl AnalysisResult {
    pub const MIN_SCORE: u8 = 1;
    pub const MAX_SCORE: u8 = 10;

    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::for_score(self.score)
    }

    /// "Quadriceps, Glutes"
    pub fn muscle_summary(&self) -> String {
        self.muscle_groups.join(", ")
    }
}

/// Coarse grading of a score, used for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub const ALL: [ScoreBand; 3] = [Self::Poor, Self::Fair, Self::Good];

    /// Highest score that still falls in this band.
    pub fn upper_bound(self) -> u8 {
        match self {
            Self::Poor => 4,
            Self::Fair => 7,
            Self::Good => AnalysisResult::MAX_SCORE,
        }
    }

    pub fn for_score(score: u8) -> Self {
        match score {
            8..=u8::MAX => Self::Good,
            5..=7 => Self::Fair,
            _ => Self::Poor,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Good => "success",
            Self::Fair => "warning",
            Self::Poor => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_camel_case_payload() {
        let json = r#"{
            "exerciseName": "Squat",
            "score": 7,
            "goodPoints": ["Good depth"],
            "mistakes": ["Knees cave in"],
            "recommendations": ["Widen stance"],
            "muscleGroups": ["Quadriceps", "Glutes"],
            "safetyLevel": "Caution"
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(
            result,
            AnalysisResult {
                exercise_name: "Squat".into(),
                score: 7,
                good_points: vec!["Good depth".into()],
                mistakes: vec!["Knees cave in".into()],
                recommendations: vec!["Widen stance".into()],
                muscle_groups: vec!["Quadriceps".into(), "Glutes".into()],
                safety_level: SafetyLevel::Caution,
            }
        );
        assert_eq!(result.muscle_summary(), "Quadriceps, Glutes");
    }

    #[test]
    fn missing_field_is_an_error() {
        let json = r#"{"exerciseName": "Squat", "score": 7}"#;
        assert!(serde_json::from_str::<AnalysisResult>(json).is_err());
    }

    #[test]
    fn unknown_safety_level_is_an_error() {
        let json = r#"{
            "exerciseName": "Deadlift", "score": 3, "goodPoints": [], "mistakes": [],
            "recommendations": [], "muscleGroups": [], "safetyLevel": "Risky"
        }"#;
        assert!(serde_json::from_str::<AnalysisResult>(json).is_err());
    }

    #[test]
    fn score_bands() {
        assert_eq!(ScoreBand::for_score(10), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(8), ScoreBand::Good);
        assert_eq!(ScoreBand::for_score(7), ScoreBand::Fair);
        assert_eq!(ScoreBand::for_score(5), ScoreBand::Fair);
        assert_eq!(ScoreBand::for_score(4), ScoreBand::Poor);
        assert_eq!(ScoreBand::for_score(1), ScoreBand::Poor);
    }

    #[test]
    fn band_bounds_agree_with_for_score() {
        let mut lower = AnalysisResult::MIN_SCORE;
        for band in ScoreBand::ALL {
            let upper = band.upper_bound();
            for score in lower..=upper {
                assert_eq!(ScoreBand::for_score(score), band, "score {score}");
            }
            lower = upper + 1;
        }
        assert_eq!(lower, AnalysisResult::MAX_SCORE + 1);
    }
}
