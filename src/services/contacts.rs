use once_cell::sync::Lazy;
use phonenumber::country;
use regex::Regex;
use strsim::jaro_winkler;

use super::Oracle;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").unwrap());

/// Broad international pattern: optional + or 00 prefix, 7 to 16 digits with
/// common separators and parentheses.
static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\+|00)?\s?(?:\d[\s().-]?){6,15}\d").unwrap());

static TEL_HREF_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)href=['"]tel:([^'"]+)['"]"#).unwrap());

static PHONE_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(phone|tel|telephone|contact|call|office|hq|switchboard)").unwrap()
});

static FAX_NEAR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)fax").unwrap());

static NON_PHONE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9+\s().-]").unwrap());

const TEL_HREF_SCORE: i32 = 5;
const ORACLE_SHORTLIST_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct PhoneCandidate {
    pub raw: String,
    pub cleaned: String,
    pub context: String,
    pub score: i32,
}

fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Canonical form of a visible phone string: phone characters only, `00`
/// international prefix folded into `+`, whitespace collapsed. Idempotent.
pub fn clean_visible_number(raw: &str) -> String {
    let cleaned = NON_PHONE_CHARS.replace_all(raw, "");
    let cleaned = cleaned.trim();
    let cleaned = match cleaned.strip_prefix("00") {
        Some(rest) => format!("+{}", rest),
        None => cleaned.to_string(),
    };
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Harvest e-mail addresses, deduplicated case-insensitively in first-seen
/// order.
pub fn extract_emails(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = vec![];
    for m in EMAIL_REGEX.find_iter(text) {
        let email = m.as_str().to_string();
        if seen.insert(email.to_lowercase()) {
            out.push(email);
        }
    }
    out
}

/// Snippet around a match, clamped to char boundaries.
fn context_window(text: &str, start: usize, end: usize, pad: usize) -> String {
    let mut from = start.saturating_sub(pad);
    while from > 0 && !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = (end + pad).min(text.len());
    while to < text.len() && !text.is_char_boundary(to) {
        to += 1;
    }
    text[from..to].to_string()
}

/// Harvest phone candidates from visible text, and `tel:` hrefs from raw
/// HTML when available. Candidates are merged by canonical digit sequence
/// (highest score kept) and returned best-first.
pub fn extract_candidate_phones(text: &str, raw_html: Option<&str>) -> Vec<PhoneCandidate> {
    let mut candidates = vec![];

    if let Some(html) = raw_html {
        for caps in TEL_HREF_REGEX.captures_iter(html) {
            let m = caps.get(1).unwrap();
            let cleaned = clean_visible_number(m.as_str());
            if !cleaned.is_empty() {
                candidates.push(PhoneCandidate {
                    raw: m.as_str().to_string(),
                    cleaned,
                    context: context_window(html, m.start(), m.end(), 80),
                    score: TEL_HREF_SCORE,
                });
            }
        }
    }

    for m in PHONE_REGEX.find_iter(text) {
        let cleaned = clean_visible_number(m.as_str());
        if cleaned.is_empty() {
            continue;
        }
        let context = context_window(text, m.start(), m.end(), 50);

        let mut score = 0;
        if PHONE_KEYWORDS.is_match(&context) {
            score += 3;
        }
        if FAX_NEAR_REGEX.is_match(&context) {
            score -= 4;
        }
        if digits_only(&cleaned).len() >= 10 {
            score += 1;
        }
        if cleaned.starts_with('+') {
            score += 1;
        }

        candidates.push(PhoneCandidate {
            raw: m.as_str().to_string(),
            cleaned,
            context,
            score,
        });
    }

    // Merge near-duplicates by digit equivalence, first-seen order kept so
    // the final sort stays deterministic.
    let mut merged: Vec<PhoneCandidate> = vec![];
    let mut index_by_digits = std::collections::HashMap::new();
    for candidate in candidates {
        let key = digits_only(&candidate.cleaned);
        if key.is_empty() {
            continue;
        }
        match index_by_digits.get(&key) {
            Some(&i) => {
                let existing: &mut PhoneCandidate = &mut merged[i];
                if candidate.score > existing.score {
                    *existing = candidate;
                }
            }
            None => {
                index_by_digits.insert(key, merged.len());
                merged.push(candidate);
            }
        }
    }

    merged.sort_by(|a, b| b.score.cmp(&a.score));
    merged
}

/// Escalate to the oracle when several plausible numbers survive or the best
/// one looks incomplete.
fn needs_oracle_selection(candidates: &[PhoneCandidate]) -> bool {
    match candidates {
        [] => false,
        [only] => digits_only(&only.cleaned).len() < 9,
        _ => true,
    }
}

async fn select_phone_via_oracle(
    oracle: &dyn Oracle,
    candidates: &[PhoneCandidate],
    link: &str,
    region: &str,
) -> Option<String> {
    let shortlist: Vec<String> = candidates
        .iter()
        .take(ORACLE_SHORTLIST_LEN)
        .enumerate()
        .map(|(i, c)| {
            let context: String = c
                .context
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .chars()
                .take(220)
                .collect();
            format!("{}. {}  | context: {}", i + 1, c.cleaned, context)
        })
        .collect();

    let question = format!(
        "You are validating contact phones on a supplier website.\n\
         Task:\n\
         - From the list below, choose the MAIN business phone number for the company.\n\
         - Prefer numbers labeled Phone/Tel/Contact/Office/HQ; avoid Fax/WhatsApp unless it's the only option.\n\
         - Prefer the most complete version (with country code).\n\
         - Use cues from the text, page language, the region '{}', and the domain '{}'.\n\
         - Return ONLY the chosen number, no extra words.",
        region, link,
    );

    match oracle.classify(&shortlist.join("\n"), &question).await {
        Ok(raw) => {
            let cleaned = clean_visible_number(&raw);
            match cleaned.is_empty() {
                true => None,
                false => Some(cleaned),
            }
        }
        Err(e) => {
            log::error!("Oracle phone selection error for {}: {:?}", link, e);
            None
        }
    }
}

/// Fuzzy-match a free-form region name to a phone numbering-plan region.
pub fn guess_region_code(region: &str) -> Option<country::Id> {
    use country::Id;
    const COUNTRY_REGIONS: &[(&str, Id)] = &[
        ("united states", Id::US),
        ("usa", Id::US),
        ("america", Id::US),
        ("united kingdom", Id::GB),
        ("uk", Id::GB),
        ("england", Id::GB),
        ("india", Id::IN),
        ("china", Id::CN),
        ("germany", Id::DE),
        ("france", Id::FR),
        ("italy", Id::IT),
        ("spain", Id::ES),
        ("portugal", Id::PT),
        ("netherlands", Id::NL),
        ("belgium", Id::BE),
        ("switzerland", Id::CH),
        ("austria", Id::AT),
        ("poland", Id::PL),
        ("sweden", Id::SE),
        ("norway", Id::NO),
        ("denmark", Id::DK),
        ("finland", Id::FI),
        ("ireland", Id::IE),
        ("greece", Id::GR),
        ("turkey", Id::TR),
        ("russia", Id::RU),
        ("ukraine", Id::UA),
        ("japan", Id::JP),
        ("south korea", Id::KR),
        ("taiwan", Id::TW),
        ("hong kong", Id::HK),
        ("singapore", Id::SG),
        ("malaysia", Id::MY),
        ("indonesia", Id::ID),
        ("thailand", Id::TH),
        ("vietnam", Id::VN),
        ("philippines", Id::PH),
        ("pakistan", Id::PK),
        ("bangladesh", Id::BD),
        ("sri lanka", Id::LK),
        ("australia", Id::AU),
        ("new zealand", Id::NZ),
        ("canada", Id::CA),
        ("mexico", Id::MX),
        ("brazil", Id::BR),
        ("argentina", Id::AR),
        ("chile", Id::CL),
        ("colombia", Id::CO),
        ("peru", Id::PE),
        ("south africa", Id::ZA),
        ("egypt", Id::EG),
        ("morocco", Id::MA),
        ("nigeria", Id::NG),
        ("kenya", Id::KE),
        ("ethiopia", Id::ET),
        ("united arab emirates", Id::AE),
        ("uae", Id::AE),
        ("saudi arabia", Id::SA),
        ("qatar", Id::QA),
        ("kuwait", Id::KW),
        ("israel", Id::IL),
    ];

    let needle = region.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    if let Some((_, id)) = COUNTRY_REGIONS.iter().find(|(name, _)| *name == needle) {
        return Some(*id);
    }

    COUNTRY_REGIONS
        .iter()
        .map(|(name, id)| (jaro_winkler(&needle, name), *id))
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap())
        .filter(|(similarity, _)| *similarity >= 0.85)
        .map(|(_, id)| id)
}

/// Validate and format through the numbering plan. `None` when the number
/// does not parse or is invalid for the guessed region.
fn format_with_numbering_plan(number: &str, region: Option<country::Id>) -> Option<String> {
    // The optional (0) trunk marker confuses parsing; strip it first.
    let to_parse = number.replace("(0)", "").replace(' ', "");
    let parsed = phonenumber::parse(region, &to_parse).ok()?;
    if !phonenumber::is_valid(&parsed) {
        return None;
    }
    Some(
        parsed
            .format()
            .mode(phonenumber::Mode::International)
            .to_string(),
    )
}

/// Layered contact extraction: regex harvest and scoring, oracle
/// disambiguation for ambiguous cases, numbering-plan normalization.
/// Returns `"Email: ...\nPhone: ..."` (either line optional) or an empty
/// string, never an error.
pub async fn extract_contact_details(
    oracle: &dyn Oracle,
    link: &str,
    region: &str,
    cleaned_text: &str,
    raw_html: Option<&str>,
) -> String {
    if cleaned_text.is_empty() && raw_html.is_none() {
        return String::new();
    }

    let emails = extract_emails(cleaned_text);
    let candidates = extract_candidate_phones(cleaned_text, raw_html);
    let region_code = guess_region_code(region);

    let mut chosen_phone = match candidates.first() {
        None => String::new(),
        Some(best) => match needs_oracle_selection(&candidates) {
            true => select_phone_via_oracle(oracle, &candidates, link, region)
                .await
                .unwrap_or_else(|| best.cleaned.clone()),
            false => best.cleaned.clone(),
        },
    };

    if !chosen_phone.is_empty() {
        if let Some(formatted) = format_with_numbering_plan(&chosen_phone, region_code) {
            let src_digits = digits_only(&chosen_phone);
            let fmt_digits = digits_only(&formatted);
            let same_base = fmt_digits.len() >= 8
                && src_digits.ends_with(&fmt_digits[fmt_digits.len() - 8..]);

            // Keep the source form when it carries a (0) trunk marker the
            // formatted output lost.
            let keep_source = same_base && chosen_phone.contains("(0)") && !formatted.contains("(0)");
            if !keep_source {
                chosen_phone = formatted;
            }
        }
    }

    let mut parts = vec![];
    if let Some(email) = emails.first() {
        parts.push(format!("Email: {}", email));
    }
    if !chosen_phone.is_empty() {
        parts.push(format!("Phone: {}", chosen_phone));
    }
    parts.join("\n")
}

/// Split a combined contact string back into (email, phone).
pub fn parse_contact_details(details: &str) -> (Option<String>, Option<String>) {
    let mut email = None;
    let mut phone = None;
    for line in details.lines() {
        if let Some(rest) = line.strip_prefix("Email:") {
            let rest = rest.trim();
            if !rest.is_empty() {
                email = Some(rest.to_string());
            }
        }
        if let Some(rest) = line.strip_prefix("Phone:") {
            let rest = rest.trim();
            if !rest.is_empty() {
                phone = Some(rest.to_string());
            }
        }
    }
    (email, phone)
}
