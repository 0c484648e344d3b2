//! Symptom and patient models sent to the analysis endpoint.
//!
//! Inputs arrive loosely shaped (a bare name, or a partial object typed into
//! a form) and are normalized so every field is present on the wire.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minimum length of the free-text description on the symptom entry page.
pub const MIN_SYMPTOM_TEXT_LEN: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    #[default]
    Moderate,
    Severe,
}

/// A single user-reported complaint, fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    pub name: String,
    pub severity: Severity,
    pub duration: Option<String>,
    pub description: Option<String>,
}

/// Partially filled symptom as typed into a form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartialSymptom {
    pub name: String,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Either a bare symptom name or a partial object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SymptomInput {
    Name(String),
    Partial(PartialSymptom),
}

impl From<&str> for SymptomInput {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for SymptomInput {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<PartialSymptom> for SymptomInput {
    fn from(partial: PartialSymptom) -> Self {
        Self::Partial(partial)
    }
}

impl SymptomInput {
    /// Fill the defaults. Returns `None` when the name is blank.
    pub fn normalize(self) -> Option<Symptom> {
        let partial = match self {
            Self::Name(name) => PartialSymptom {
                name,
                ..Default::default()
            },
            Self::Partial(partial) => partial,
        };

        let name = partial.name.trim();
        if name.is_empty() {
            return None;
        }

        Some(Symptom {
            name: name.to_string(),
            severity: partial.severity.unwrap_or_default(),
            duration: non_blank(partial.duration),
            description: non_blank(partial.description),
        })
    }
}

/// Normalize a batch of inputs, dropping blank names.
pub fn normalize_symptoms<I, S>(inputs: I) -> Result<Vec<Symptom>, ValidationError>
where
    I: IntoIterator<Item = S>,
    S: Into<SymptomInput>,
{
    let symptoms: Vec<Symptom> = inputs
        .into_iter()
        .filter_map(|input| input.into().normalize())
        .collect();

    if symptoms.is_empty() {
        return Err(ValidationError::EmptySymptoms);
    }
    Ok(symptoms)
}

/// Check the free-text description and split it into symptom names on
/// commas and newlines.
pub fn parse_symptom_text(text: &str) -> Result<Vec<SymptomInput>, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptySymptoms);
    }
    if trimmed.chars().count() < MIN_SYMPTOM_TEXT_LEN {
        return Err(ValidationError::SymptomsTooShort {
            min: MIN_SYMPTOM_TEXT_LEN,
        });
    }

    Ok(trimmed
        .split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(SymptomInput::from)
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

/// Optional patient metadata. Every field is always serialized, as `null`
/// or `[]` when unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientInfo {
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub medical_history: Vec<String>,
    pub allergies: Option<String>,
    pub medical_conditions: Option<String>,
}

impl PatientInfo {
    /// Treat zero ages and blank strings as unknown.
    pub fn normalized(self) -> Self {
        Self {
            age: self.age.filter(|age| *age > 0),
            gender: self.gender,
            medical_history: self
                .medical_history
                .into_iter()
                .map(|entry| entry.trim().to_string())
                .filter(|entry| !entry.is_empty())
                .collect(),
            allergies: non_blank(self.allergies),
            medical_conditions: non_blank(self.medical_conditions),
        }
    }
}

/// Body of `POST /symptoms/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub symptoms: Vec<Symptom>,
    #[serde(rename = "patientInfo")]
    pub patient_info: PatientInfo,
}

impl AnalyzeRequest {
    pub fn new<I, S>(symptoms: I, patient_info: Option<PatientInfo>) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<SymptomInput>,
    {
        Ok(Self {
            session_id: None,
            symptoms: normalize_symptoms(symptoms)?,
            patient_info: patient_info.unwrap_or_default().normalized(),
        })
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
