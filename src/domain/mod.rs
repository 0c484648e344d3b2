//! Domain types for the symptom-checker API.
//!
//! Request models normalize user input; response models mirror what the
//! backend returns, tolerating its inconsistent field shapes.

pub mod analysis;
pub mod doctors;
pub mod symptoms;

pub use analysis::{
    AnalysisResult, Condition, ConditionSeverity, Recommendation, RiskLevel, Specialist,
    WarningFlag,
};
pub use doctors::{Coordinates, Doctor, DoctorsQuery, DoctorsResponse, SearchLocation};
pub use symptoms::{AnalyzeRequest, Gender, PatientInfo, Severity, Symptom, SymptomInput};
