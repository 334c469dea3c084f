use serde::{Deserialize, Serialize};

const EXACT_CONFIDENCE: f64 = 0.95;
const FUZZY_SIMILARITY_THRESHOLD: f64 = 0.85;
const FUZZY_CONFIDENCE_FACTOR: f64 = 0.9;
const KEYWORD_CONFIDENCE: f64 = 0.6;

pub struct Certification {
    pub id: &'static str,
    pub name: &'static str,
    pub variations: &'static [&'static str],
    pub keywords: &'static [&'static str],
}

/// Knowledge base of certifications and standards commonly claimed on
/// supplier websites.
pub const CERTIFICATIONS: &[Certification] = &[
    Certification {
        id: "iso_9001",
        name: "ISO 9001",
        variations: &["iso 9001", "iso9001", "iso 9001:2015", "iso 9001:2008"],
        keywords: &["quality management system"],
    },
    Certification {
        id: "iso_14001",
        name: "ISO 14001",
        variations: &["iso 14001", "iso14001", "iso 14001:2015"],
        keywords: &["environmental management system"],
    },
    Certification {
        id: "iso_45001",
        name: "ISO 45001",
        variations: &["iso 45001", "iso45001", "ohsas 18001"],
        keywords: &["occupational health and safety"],
    },
    Certification {
        id: "iso_22000",
        name: "ISO 22000",
        variations: &["iso 22000", "iso22000", "fssc 22000"],
        keywords: &["food safety management"],
    },
    Certification {
        id: "ce_marking",
        name: "CE Marking",
        variations: &["ce marking", "ce marked", "ce certified", "ce certification"],
        keywords: &["european conformity"],
    },
    Certification {
        id: "fda",
        name: "FDA Registered",
        variations: &["fda registered", "fda approved", "fda certified"],
        keywords: &["food and drug administration"],
    },
    Certification {
        id: "haccp",
        name: "HACCP",
        variations: &["haccp", "haccp certified"],
        keywords: &["hazard analysis critical control"],
    },
    Certification {
        id: "gmp",
        name: "GMP",
        variations: &["gmp", "good manufacturing practice", "cgmp"],
        keywords: &["manufacturing practice"],
    },
    Certification {
        id: "halal",
        name: "Halal Certified",
        variations: &["halal certified", "halal certification"],
        keywords: &["halal"],
    },
    Certification {
        id: "kosher",
        name: "Kosher Certified",
        variations: &["kosher certified", "kosher certification"],
        keywords: &["kosher"],
    },
    Certification {
        id: "fsc",
        name: "FSC",
        variations: &["fsc certified", "forest stewardship council"],
        keywords: &["sustainable forestry"],
    },
    Certification {
        id: "rohs",
        name: "RoHS",
        variations: &["rohs", "rohs compliant", "rohs certified"],
        keywords: &["restriction of hazardous substances"],
    },
    Certification {
        id: "reach",
        name: "REACH",
        variations: &["reach compliant", "reach certified", "reach registered"],
        keywords: &["registration evaluation authorisation"],
    },
    Certification {
        id: "brc",
        name: "BRC",
        variations: &["brc certified", "brcgs", "brc global standard"],
        keywords: &["british retail consortium"],
    },
    Certification {
        id: "ul",
        name: "UL Listed",
        variations: &["ul listed", "ul certified"],
        keywords: &["underwriters laboratories"],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertDetectionMethod {
    ExactVariation,
    FuzzyMatch,
    Keyword,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificationDetection {
    pub certification_id: String,
    pub name: String,
    pub confidence: f64,
    pub matched_text: String,
    pub detection_method: CertDetectionMethod,
    pub contexts: Vec<String>,
}

/// Substring match constrained to word boundaries on both sides.
fn contains_word(haystack: &str, needle: &str) -> bool {
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();
        let boundary_before = start == 0
            || !haystack[..start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        let boundary_after = end == haystack.len()
            || !haystack[end..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric());
        if boundary_before && boundary_after {
            return true;
        }
        from = end;
    }
    false
}

/// Word windows of 1 to 4 words, for fuzzy comparison against variations.
fn word_windows(text: &str) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut windows = vec![];
    for len in 1..=4usize {
        for window in words.windows(len) {
            windows.push(window.join(" "));
        }
    }
    windows
}

/// Three decreasing-confidence tiers against a text blob: exact variation
/// (0.95), fuzzy window match at similarity >= 0.85 (ratio * 0.9, skipped
/// for already-exact-matched certifications), keyword (0.6, only if the
/// certification is not already claimed).
pub fn detect_from_text(text: &str, context: &str) -> Vec<CertificationDetection> {
    if text.is_empty() {
        return vec![];
    }
    let lowered = text.to_lowercase();
    let mut detected: Vec<CertificationDetection> = vec![];

    let already = |detected: &[CertificationDetection], id: &str| {
        detected.iter().any(|d| d.certification_id == id)
    };

    for cert in CERTIFICATIONS {
        for variation in cert.variations {
            if contains_word(&lowered, variation) {
                detected.push(CertificationDetection {
                    certification_id: cert.id.to_string(),
                    name: cert.name.to_string(),
                    confidence: EXACT_CONFIDENCE,
                    matched_text: variation.to_string(),
                    detection_method: CertDetectionMethod::ExactVariation,
                    contexts: vec![context.to_string()],
                });
                break;
            }
        }
    }

    let windows = word_windows(&lowered);
    for cert in CERTIFICATIONS {
        if already(&detected, cert.id) {
            continue;
        }
        'variations: for variation in cert.variations {
            for window in &windows {
                // Similarity >= 0.85 is impossible once lengths diverge by
                // more than 15%, so skip the edit-distance work.
                let max_len = window.chars().count().max(variation.chars().count());
                let len_diff =
                    window.chars().count().abs_diff(variation.chars().count());
                if len_diff as f64 > 0.15 * max_len as f64 {
                    continue;
                }
                let similarity = strsim::normalized_levenshtein(window, variation);
                if similarity >= FUZZY_SIMILARITY_THRESHOLD {
                    detected.push(CertificationDetection {
                        certification_id: cert.id.to_string(),
                        name: cert.name.to_string(),
                        confidence: similarity * FUZZY_CONFIDENCE_FACTOR,
                        matched_text: window.clone(),
                        detection_method: CertDetectionMethod::FuzzyMatch,
                        contexts: vec![context.to_string()],
                    });
                    break 'variations;
                }
            }
        }
    }

    for cert in CERTIFICATIONS {
        if already(&detected, cert.id) {
            continue;
        }
        for keyword in cert.keywords {
            if contains_word(&lowered, keyword) {
                detected.push(CertificationDetection {
                    certification_id: cert.id.to_string(),
                    name: cert.name.to_string(),
                    confidence: KEYWORD_CONFIDENCE,
                    matched_text: keyword.to_string(),
                    detection_method: CertDetectionMethod::Keyword,
                    contexts: vec![context.to_string()],
                });
                break;
            }
        }
    }

    detected
}

/// Merge detections of the same certification from several text sources.
/// Repeated independent detections boost confidence with diminishing
/// returns, capped at 1.0.
pub fn merge_detections(detections: Vec<CertificationDetection>) -> Vec<CertificationDetection> {
    let mut merged: Vec<CertificationDetection> = vec![];

    for detection in detections {
        match merged
            .iter_mut()
            .find(|d| d.certification_id == detection.certification_id)
        {
            Some(existing) => {
                let boost = 0.05 * (1.0 - existing.confidence);
                existing.confidence = (existing.confidence + boost).min(1.0);
                existing.contexts.extend(detection.contexts);
            }
            None => merged.push(detection),
        }
    }

    merged.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());
    merged
}

/// Certification names above the confidence floor, best first.
pub fn confident_names(detections: &[CertificationDetection], min_confidence: f64) -> Vec<String> {
    detections
        .iter()
        .filter(|d| d.confidence >= min_confidence)
        .map(|d| d.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_variation_detection() {
        let detections =
            detect_from_text("We are ISO 9001:2015 and HACCP certified.", "about_section");

        let iso = detections
            .iter()
            .find(|d| d.certification_id == "iso_9001")
            .unwrap();
        assert_eq!(iso.confidence, 0.95);
        assert_eq!(iso.detection_method, CertDetectionMethod::ExactVariation);

        assert!(detections.iter().any(|d| d.certification_id == "haccp"));
    }

    #[test]
    fn word_boundaries_prevent_substring_hits() {
        // "reach" may not fire inside "reachable".
        let detections = detect_from_text("Support is reachable by phone.", "footer");
        assert!(detections.iter().all(|d| d.certification_id != "reach"));
    }

    #[test]
    fn keyword_detection_has_lower_confidence() {
        let detections = detect_from_text(
            "Our quality management system covers every production step.",
            "about_section",
        );

        let iso = detections
            .iter()
            .find(|d| d.certification_id == "iso_9001")
            .unwrap();
        assert_eq!(iso.confidence, 0.6);
        assert_eq!(iso.detection_method, CertDetectionMethod::Keyword);
    }

    #[test]
    fn fuzzy_detection_scores_by_similarity() {
        let detections = detect_from_text("Certified to izo 9001 standards.", "title");

        let iso = detections
            .iter()
            .find(|d| d.certification_id == "iso_9001")
            .unwrap();
        assert_eq!(iso.detection_method, CertDetectionMethod::FuzzyMatch);
        assert!(iso.confidence >= 0.85 * 0.9 && iso.confidence < 0.95);
    }

    #[test]
    fn merge_boosts_confidence_with_diminishing_returns() {
        let one = detect_from_text("ISO 9001 certified.", "about_section");
        let two = detect_from_text("ISO 9001 on every datasheet.", "description");
        let merged = merge_detections([one, two].concat());

        let iso = &merged[0];
        assert_eq!(iso.certification_id, "iso_9001");
        assert!((iso.confidence - (0.95 + 0.05 * 0.05)).abs() < 1e-9);
        assert_eq!(iso.contexts, vec!["about_section", "description"]);
    }

    #[test]
    fn merged_confidence_never_exceeds_one() {
        let detections: Vec<_> = (0..50)
            .flat_map(|_| detect_from_text("ISO 9001 certified.", "page"))
            .collect();
        let merged = merge_detections(detections);

        assert_eq!(merged.len(), 1);
        assert!(merged[0].confidence <= 1.0);
    }

    #[test]
    fn confident_names_filters_by_floor() {
        let detections = detect_from_text(
            "ISO 9001 certified. Our quality management system is audited; \
             halal options available.",
            "page",
        );
        let merged = merge_detections(detections);
        let names = confident_names(&merged, 0.7);

        assert!(names.contains(&"ISO 9001".to_string()));
        assert!(!names.contains(&"Halal Certified".to_string()));
    }
}
