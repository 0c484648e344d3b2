//! Analysis results returned by the symptom analysis endpoint.
//!
//! The backend is not consistent about field casing (the AI path answers in
//! camelCase, older deployments in snake_case), so every field accepts both
//! and anything missing falls back to a default instead of failing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[serde(alias = "medium")]
    Moderate,
    #[serde(alias = "emergency", alias = "critical")]
    High,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionSeverity {
    Mild,
    Moderate,
    #[serde(alias = "severe", alias = "critical")]
    Serious,
    #[serde(other)]
    Unknown,
}

impl From<RiskLevel> for ConditionSeverity {
    fn from(risk: RiskLevel) -> Self {
        match risk {
            RiskLevel::High => Self::Serious,
            RiskLevel::Moderate => Self::Moderate,
            RiskLevel::Low | RiskLevel::Unknown => Self::Mild,
        }
    }
}

/// A candidate diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Option<ConditionSeverity>,
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationDetail {
    pub action: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub priority: Option<String>,
}

/// Either plain advice or a structured action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recommendation {
    Text(String),
    Detailed(RecommendationDetail),
}

impl Recommendation {
    /// One line of advice, if the entry carries any text.
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()).filter(|t| !t.trim().is_empty()),
            Self::Detailed(detail) => match (&detail.action, &detail.description) {
                (Some(action), Some(description)) => Some(format!("{action}: {description}")),
                (Some(text), None) | (None, Some(text)) => Some(text.clone()),
                (None, None) => None,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Specialist {
    pub specialty: Option<String>,
    pub specialties: Vec<String>,
    pub urgency: Option<String>,
    pub recommended: Option<bool>,
}

impl Specialist {
    pub fn primary_specialty(&self) -> Option<&str> {
        self.specialty
            .as_deref()
            .or_else(|| self.specialties.first().map(String::as_str))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarningFlagDetail {
    pub flag: String,
    pub severity: Option<String>,
    pub action: Option<String>,
}

/// The backend sends plain warning messages; structured flags are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WarningFlag {
    Text(String),
    Detailed(WarningFlagDetail),
}

impl WarningFlag {
    pub fn text(&self) -> Option<String> {
        let text = match self {
            Self::Text(text) => text.clone(),
            Self::Detailed(detail) => match &detail.action {
                Some(action) if !detail.flag.trim().is_empty() => format!("{}: {action}", detail.flag),
                Some(action) => action.clone(),
                None => detail.flag.clone(),
            },
        };
        Some(text).filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicationSuggestion {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    #[serde(alias = "modelUsed", alias = "model")]
    pub model_used: Option<String>,
    pub source: Option<String>,
    pub confidence: Option<f64>,
    #[serde(alias = "riskLevel")]
    pub risk_level: Option<RiskLevel>,
    #[serde(alias = "possibleConditions")]
    pub conditions: Vec<Condition>,
    pub recommendations: Vec<Recommendation>,
    #[serde(alias = "specialistRecommendation")]
    pub specialist: Option<Specialist>,
    #[serde(alias = "warningFlags")]
    pub warning_flags: Vec<WarningFlag>,
    #[serde(alias = "medicationSuggestions")]
    pub medication_suggestions: Vec<MedicationSuggestion>,
}

impl AnalysisResult {
    /// Confidence clamped to the 0–100 scale.
    pub fn confidence_percent(&self) -> Option<f64> {
        self.confidence
            .filter(|c| c.is_finite())
            .map(|c| c.clamp(0.0, 100.0))
    }

    /// Conditions with every display field filled in. A missing severity
    /// is taken from the overall risk level.
    pub fn derived_conditions(&self) -> Vec<Condition> {
        let fallback = ConditionSeverity::from(self.risk_level.unwrap_or(RiskLevel::Unknown));

        self.conditions
            .iter()
            .map(|condition| Condition {
                description: condition
                    .description
                    .clone()
                    .filter(|d| !d.trim().is_empty())
                    .or_else(|| Some("No description available".to_string())),
                severity: Some(match condition.severity {
                    Some(ConditionSeverity::Unknown) | None => fallback,
                    Some(severity) => severity,
                }),
                ..condition.clone()
            })
            .collect()
    }

    pub fn recommendation_lines(&self) -> Vec<String> {
        self.recommendations
            .iter()
            .filter_map(Recommendation::text)
            .collect()
    }

    pub fn warning_lines(&self) -> Vec<String> {
        self.warning_flags.iter().filter_map(WarningFlag::text).collect()
    }
}
