//! Plain-text rendering of page state for the terminal.

use std::fmt::Write;

use crate::domain::{AnalysisResult, Condition, ConditionSeverity, DoctorsResponse};
use crate::flow::symptom_entry::EXAMPLE_SYMPTOMS;
use crate::flow::{ActivePage, BackendStatus, FindDoctorsPage, LocationPermission, Notice, ResultsPage, SymptomEntryPage};

const DISCLAIMER: &str = "Disclaimer: this tool is for educational purposes only and is not medical advice. \
Always consult a healthcare professional for medical concerns.";

pub fn page(active: &ActivePage) -> String {
    match active {
        ActivePage::SymptomEntry(page) => symptom_entry(page),
        ActivePage::Results(page) => results(page),
        ActivePage::FindDoctors(page) => find_doctors(page),
    }
}

pub fn symptom_entry(page: &SymptomEntryPage) -> String {
    let mut out = String::new();
    heading(&mut out, "How are you feeling?", 1);
    backend_line(&mut out, page.backend());

    if !page.text().is_empty() {
        let _ = writeln!(out, "Current description ({}%): {}", page.progress(), page.text());
    }
    let _ = writeln!(out, "Examples:");
    for (i, example) in EXAMPLE_SYMPTOMS.iter().enumerate() {
        let _ = writeln!(out, "  :{} {}", i + 1, example);
    }
    notice(&mut out, page.notice());
    let _ = writeln!(out, "\n{DISCLAIMER}");
    out
}

pub fn results(page: &ResultsPage) -> String {
    let mut out = String::new();
    heading(&mut out, "Possible conditions", 2);
    backend_line(&mut out, page.backend());
    let _ = writeln!(out, "Symptoms: {}", page.symptoms());
    out.push_str(&analysis_summary(page.analysis(), page.conditions()));

    if !page.emergency_signs().is_empty() {
        let _ = writeln!(out, "\nSeek emergency care if you notice:");
        for sign in page.emergency_signs() {
            let _ = writeln!(out, "  ! {sign}");
        }
    }
    let _ = writeln!(out, "\n{DISCLAIMER}");
    out
}

pub fn find_doctors(page: &FindDoctorsPage) -> String {
    let mut out = String::new();
    heading(&mut out, "Doctors near you", 3);
    backend_line(&mut out, page.backend());

    match page.permission() {
        LocationPermission::Granted => {
            let _ = writeln!(out, "Based on your location");
        }
        LocationPermission::Pending => {}
        LocationPermission::Denied(reason) => {
            let _ = writeln!(out, "Tip: {} ({reason})", page.location_tip().unwrap_or_default());
        }
    }
    if let Some(specialty) = page.specialty() {
        let _ = writeln!(out, "Suggested specialist: {specialty}");
    }
    let address = if page.address().is_empty() { "-" } else { page.address() };
    let _ = writeln!(
        out,
        "Address: {address}   Radius: {} km   Limit: {}",
        page.radius_km(),
        page.limit()
    );
    notice(&mut out, page.notice());

    if let Some(response) = page.results() {
        out.push_str(&doctor_list(response));
    }
    out
}

/// Risk, confidence, conditions, advice and specialist.
pub fn analysis_summary(analysis: &AnalysisResult, conditions: &[Condition]) -> String {
    let mut out = String::new();

    if let Some(risk) = analysis.risk_level {
        let _ = writeln!(out, "Risk level: {}", format!("{risk:?}").to_lowercase());
    }
    if let Some(confidence) = analysis.confidence_percent() {
        let _ = writeln!(out, "Confidence: {confidence:.0}%");
    }
    if let Some(model) = analysis.model_used.as_deref().or(analysis.source.as_deref()) {
        let _ = writeln!(out, "Source: {model}");
    }

    if conditions.is_empty() {
        let _ = writeln!(out, "\nNo specific conditions were identified.");
    }
    for condition in conditions {
        let _ = write!(out, "\n[{}] {}", severity_label(condition.severity), condition.name);
        if let Some(p) = condition.probability {
            let _ = write!(out, " ({p:.0}%)");
        }
        let _ = writeln!(out);
        if let Some(description) = &condition.description {
            let _ = writeln!(out, "    {description}");
        }
    }

    let advice = analysis.recommendation_lines();
    if !advice.is_empty() {
        let _ = writeln!(out, "\nRecommendations:");
        for line in advice {
            let _ = writeln!(out, "  - {line}");
        }
    }
    for warning in analysis.warning_lines() {
        let _ = writeln!(out, "Warning: {warning}");
    }
    if !analysis.medication_suggestions.is_empty() {
        let names: Vec<String> = analysis
            .medication_suggestions
            .iter()
            .map(|m| match &m.dosage {
                Some(dosage) => format!("{} ({dosage})", m.name),
                None => m.name.clone(),
            })
            .collect();
        let _ = writeln!(out, "Common over-the-counter options: {}", names.join(", "));
    }
    if let Some(specialist) = &analysis.specialist {
        if let Some(specialty) = specialist.primary_specialty() {
            let urgency = specialist.urgency.as_deref().unwrap_or("routine");
            let _ = writeln!(out, "\nSee a specialist: {specialty} ({urgency})");
        }
    }
    out
}

pub fn doctor_list(response: &DoctorsResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n{} result(s) within {} km of {:.4}, {:.4}",
        response.total, response.radius_km, response.center.latitude, response.center.longitude
    );
    if response.doctors.is_empty() {
        let _ = writeln!(out, "No doctors found here. Try a larger radius or another address.");
    }
    for (i, doctor) in response.doctors.iter().enumerate() {
        let _ = write!(out, "{:>3}. {}", i + 1, doctor.name);
        if let Some(distance) = doctor.distance_label() {
            let _ = write!(out, " ({distance})");
        }
        let _ = writeln!(out);
        for detail in [&doctor.specialty, &doctor.address, &doctor.phone, &doctor.website]
            .into_iter()
            .flatten()
        {
            let _ = writeln!(out, "     {detail}");
        }
    }
    out
}

fn heading(out: &mut String, title: &str, step: u8) {
    let _ = writeln!(out, "\n== Step {step} of 3: {title} ==");
}

fn backend_line(out: &mut String, status: &BackendStatus) {
    let _ = match status {
        BackendStatus::Online => writeln!(out, "Backend server: online"),
        BackendStatus::Unknown => writeln!(out, "Backend server: checking"),
        BackendStatus::Offline(reason) => writeln!(out, "Backend server: offline ({reason})"),
    };
}

fn notice(out: &mut String, notice: Option<&Notice>) {
    if let Some(notice) = notice {
        let marker = if notice.inline { ">" } else { "!!" };
        let _ = writeln!(out, "{marker} {}", notice.message);
        if notice.retryable {
            let _ = writeln!(out, "   You can try again, or :r to recheck the backend.");
        }
    }
}

fn severity_label(severity: Option<ConditionSeverity>) -> &'static str {
    match severity {
        Some(ConditionSeverity::Mild) => "mild",
        Some(ConditionSeverity::Moderate) => "moderate",
        Some(ConditionSeverity::Serious) => "serious",
        Some(ConditionSeverity::Unknown) | None => "info",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, Doctor, RiskLevel};
    use crate::error::{PageError, ValidationError};

    #[test]
    fn summary_lists_conditions_and_advice() {
        let analysis: AnalysisResult = serde_json::from_value(serde_json::json!({
            "riskLevel": "high",
            "confidence": 82.4,
            "possibleConditions": [{"name": "Pneumonia", "probability": 40}],
            "recommendations": ["Seek medical attention promptly"],
            "specialistRecommendation": {"specialty": "Pulmonology"},
            "warningFlags": ["Seek emergency care for breathing difficulties"],
            "model": "Gemini AI",
            "source": "Google Gemini AI"
        }))
        .unwrap();
        assert_eq!(analysis.risk_level, Some(RiskLevel::High));

        let text = analysis_summary(&analysis, &analysis.derived_conditions());
        assert!(text.contains("Risk level: high"));
        assert!(text.contains("Confidence: 82%"));
        assert!(text.contains("[serious] Pneumonia (40%)"));
        assert!(text.contains("No description available"));
        assert!(text.contains("  - Seek medical attention promptly"));
        assert!(text.contains("See a specialist: Pulmonology (routine)"));
        assert!(text.contains("Warning: Seek emergency care for breathing difficulties"));
        assert!(text.contains("Source: Gemini AI"));
    }

    #[test]
    fn retry_hint_only_for_transient_failures() {
        let mut out = String::new();
        notice(&mut out, Some(&Notice::from(&PageError::BackendOffline)));
        assert!(out.starts_with("!! Backend server is not available"));
        assert!(out.contains("You can try again"));

        let mut out = String::new();
        notice(
            &mut out,
            Some(&Notice::from(&PageError::from(ValidationError::EmptySymptoms))),
        );
        assert_eq!(out, "> Please tell us how you're feeling\n");
    }

    #[test]
    fn doctor_list_shows_distance_and_contact() {
        let response = DoctorsResponse {
            center: Coordinates {
                latitude: 12.9716,
                longitude: 77.5946,
            },
            radius_km: 5.0,
            total: 1,
            doctors: vec![Doctor {
                name: "Heart Care Center".to_string(),
                specialty: Some("cardiology".to_string()),
                phone: None,
                website: None,
                address: Some("456 Cardiac Ave".to_string()),
                coordinates: Coordinates {
                    latitude: 12.9676,
                    longitude: 77.6006,
                },
                distance_km: Some(0.86),
            }],
        };

        let text = doctor_list(&response);
        assert!(text.contains("1 result(s) within 5 km"));
        assert!(text.contains("  1. Heart Care Center (0.9 km)"));
        assert!(text.contains("     cardiology"));
        assert!(text.contains("     456 Cardiac Ave"));
    }
}
