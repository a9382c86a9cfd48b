//! Plain-text rendering of backend results.

use facelens_core::{
    AnalysisOutcome, CompareResponse, DetectResponse, SecurityResponse, StatusView,
};

pub fn print_outcome(outcome: &AnalysisOutcome) {
    let text = match outcome {
        AnalysisOutcome::Compare(r) => format_compare(r),
        AnalysisOutcome::Security(r) => format_security(r),
        AnalysisOutcome::Detection(r) => format_detect(r),
    };
    println!("{text}");
}

pub fn format_compare(r: &CompareResponse) -> String {
    let mut out = String::new();
    let verdict = if r.is_match {
        "The faces match"
    } else {
        "The faces do not match"
    };
    out.push_str(&format!("{verdict}\n"));
    out.push_str(&format!("Similarity: {:.2}%\n", r.similarity * 100.0));
    if !r.model_details.is_empty() {
        out.push_str("Model details:\n");
        for (model, score) in &r.model_details {
            out.push_str(&format!("  {model}: {:.2}%\n", score * 100.0));
        }
    }
    out.trim_end().to_string()
}

pub fn format_security(r: &SecurityResponse) -> String {
    let mut out = String::new();
    let verdict = if r.is_real_face {
        "This appears to be a real face"
    } else {
        "This does NOT appear to be a real face"
    };
    out.push_str(&format!("{verdict}\n"));
    if let Some(liveness) = &r.liveness {
        let label = if liveness.is_live { "live face" } else { "not a live face" };
        out.push_str(&format!(
            "Liveness: {label} ({:.2}%)\n",
            liveness.score * 100.0
        ));
    }
    if let Some(deepfake) = &r.deepfake {
        let label = if deepfake.is_fake { "likely deepfake" } else { "not a deepfake" };
        out.push_str(&format!(
            "Deepfake: {label} ({:.2}%)\n",
            deepfake.score * 100.0
        ));
    }
    if let Some(spoofing) = &r.spoofing {
        let label = if spoofing.is_attack {
            "likely spoofing attack"
        } else {
            "not a spoofing attack"
        };
        out.push_str(&format!(
            "Spoofing: {label} ({:.2}%)\n",
            spoofing.score * 100.0
        ));
    }
    out.trim_end().to_string()
}

pub fn format_detect(r: &DetectResponse) -> String {
    let mut out = format!(
        "Found {} face{} in the image.",
        r.faces.len(),
        if r.faces.len() == 1 { "" } else { "s" }
    );
    for (i, face) in r.faces.iter().enumerate() {
        let [x, y, w, h] = face.bbox;
        out.push_str(&format!(
            "\nFace #{}: bbox [{x:.0}, {y:.0}, {w:.0}, {h:.0}], confidence {:.1}%",
            i + 1,
            face.confidence * 100.0
        ));
        if let Some(gender) = &face.gender {
            out.push_str(&format!(", gender {gender}"));
        }
        if let Some(age) = face.age {
            out.push_str(&format!(", age {age:.0}"));
        }
    }
    out
}

pub fn print_status(view: &StatusView) {
    println!("{}", format_status(view));
}

pub fn format_status(view: &StatusView) -> String {
    let snapshot = view.snapshot();
    let mut out = String::new();

    if let Some(error) = view.unreachable_error() {
        out.push_str(&format!("Backend unreachable: {error}\n\n"));
    }

    out.push_str(&format!(
        "{:<18} {:<8} {:<28} {}\n",
        "SERVICE", "STATUS", "MODELS", "VERSION"
    ));
    for (name, details) in &snapshot.services {
        let models = if details.models.is_empty() {
            "-".to_string()
        } else {
            details.models.join(", ")
        };
        out.push_str(&format!(
            "{:<18} {:<8} {:<28} {}\n",
            name,
            details.status.to_string(),
            models,
            details.version.as_deref().unwrap_or("-")
        ));
    }
    out.push_str(&format!(
        "\nLast updated: {}",
        snapshot.timestamp.to_rfc3339()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use facelens_core::wire::{offline_snapshot, Face, LivenessResult};
    use std::collections::BTreeMap;

    #[test]
    fn test_format_detect_zero_faces_has_no_face_lines() {
        let text = format_detect(&DetectResponse { faces: vec![] });
        assert_eq!(text, "Found 0 faces in the image.");
    }

    #[test]
    fn test_format_detect_with_attributes() {
        let r = DetectResponse {
            faces: vec![Face {
                bbox: [10.0, 20.0, 100.0, 120.0],
                confidence: 0.987,
                landmarks: None,
                gender: Some("female".into()),
                age: Some(31.0),
            }],
        };
        let text = format_detect(&r);
        assert!(text.starts_with("Found 1 face in the image."));
        assert!(text.contains("Face #1"));
        assert!(text.contains("gender female"));
        assert!(text.contains("age 31"));
    }

    #[test]
    fn test_format_compare_lists_model_details() {
        let mut model_details = BTreeMap::new();
        model_details.insert("arcface".to_string(), 0.91);
        let r = CompareResponse {
            is_match: true,
            similarity: 0.87,
            model_details,
        };
        let text = format_compare(&r);
        assert!(text.contains("The faces match"));
        assert!(text.contains("Similarity: 87.00%"));
        assert!(text.contains("arcface: 91.00%"));
    }

    #[test]
    fn test_format_security_partial() {
        let r = SecurityResponse {
            is_real_face: true,
            liveness: Some(LivenessResult {
                is_live: true,
                score: 0.93,
            }),
            deepfake: None,
            spoofing: None,
        };
        let text = format_security(&r);
        assert!(text.contains("real face"));
        assert!(text.contains("Liveness: live face (93.00%)"));
        assert!(!text.contains("Deepfake"));
        assert!(!text.contains("Spoofing"));
    }

    #[test]
    fn test_format_status_unreachable_shows_full_offline_table() {
        let view = StatusView::Unreachable {
            error: "connection refused".into(),
            snapshot: offline_snapshot(),
        };
        let text = format_status(&view);
        assert!(text.contains("Backend unreachable: connection refused"));
        for service in facelens_core::wire::KNOWN_SERVICES {
            assert!(text.contains(service), "missing {service}");
        }
        assert_eq!(text.matches("offline").count(), 4);
    }
}
