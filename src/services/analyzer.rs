use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::domain::{
    candidate, AboutInfo, ContactInfo, FreshnessSignals, QualitySignals, VisualElements,
    WebsiteData,
};

use super::{certification, contacts, fetcher};

/// Certifications below this confidence are not attributed to a supplier.
pub const CERT_CONFIDENCE_FLOOR: f64 = 0.7;

static FOUNDED_YEAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:founded|established|est\.?|since)\D{0,10}((?:19|20)\d{2})").unwrap()
});

static LOCATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Z][a-zA-Z]+,\s*[A-Z][a-zA-Z]+(?: [A-Z][a-zA-Z]+)?").unwrap()
});

/// Fetch-based website analysis feeding the evaluation scorer. Every
/// extraction is independent; a failed fetch flags `analysis_failed` and
/// leaves neutral defaults for the scorer to degrade over.
pub async fn analyze_website(client: &reqwest::Client, website_url: &str) -> WebsiteData {
    let Some(page) = fetcher::fetch_page(client, website_url).await else {
        log::error!("Website analysis failed for {}", website_url);
        return WebsiteData {
            analysis_failed: true,
            ..Default::default()
        };
    };

    let document = Html::parse_document(&page.raw_html);
    let text = &page.cleaned_text;

    let company_name = extract_company_name(&document)
        .unwrap_or_else(|| candidate::company_name_from_url(website_url));

    let emails = contacts::extract_emails(text);
    let phones = contacts::extract_candidate_phones(text, Some(&page.raw_html));
    let contact = ContactInfo {
        email: emails.first().cloned(),
        phone: phones.first().map(|c| c.cleaned.clone()),
    };

    let about = extract_about(text);

    let detections = certification::detect_from_text(text, "page_text");
    let merged = certification::merge_detections(detections);
    let certifications = certification::confident_names(&merged, CERT_CONFIDENCE_FLOOR);

    WebsiteData {
        company_name: Some(company_name),
        location: extract_location(text),
        contact,
        about,
        certifications,
        visual_elements: extract_visual_elements(&document),
        quality_signals: extract_quality_signals(website_url, text),
        freshness_signals: extract_freshness_signals(text),
        analysis_failed: false,
    }
}

/// Company name from the page title, trimmed at the usual separators.
fn extract_company_name(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").unwrap();
    let title: String = document
        .select(&title_selector)
        .next()?
        .text()
        .collect::<String>();

    let name = title
        .split(['|', '-', '—'])
        .next()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())?;

    Some(name.to_string())
}

fn extract_about(text: &str) -> AboutInfo {
    let founded_year = FOUNDED_YEAR_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok());

    let current_year = chrono::Utc::now().year();
    let years_in_business = founded_year
        .filter(|year| *year <= current_year)
        .map(|year| (current_year - year) as u32);

    AboutInfo {
        founded_year,
        years_in_business,
    }
}

fn extract_location(text: &str) -> Option<String> {
    LOCATION_REGEX
        .find(text)
        .map(|m| m.as_str().trim().to_string())
}

fn extract_visual_elements(document: &Html) -> VisualElements {
    let count = |selectors: &str| -> bool {
        Selector::parse(selectors)
            .map(|sel| document.select(&sel).next().is_some())
            .unwrap_or(false)
    };

    VisualElements {
        has_contact_form: count("form[action*=contact], form[class*=contact]"),
        has_social_media: count(
            "a[href*=linkedin], a[href*=facebook], a[href*=twitter], a[href*=instagram]",
        ),
        has_downloads: count("a[href$='.pdf'], a[download], [class*=download]"),
        has_news_section: count("[class*=news], [class*=blog], [class*=press]"),
        has_chat: count("[class*=chat], [id*=chat]"),
    }
}

fn extract_quality_signals(website_url: &str, text: &str) -> QualitySignals {
    let lowered = text.to_lowercase();
    QualitySignals {
        has_ssl: website_url.starts_with("https"),
        has_awards: ["award", "recognition", "winner"]
            .iter()
            .any(|kw| lowered.contains(kw)),
        has_partnerships: ["partner", "partnership", "collaboration"]
            .iter()
            .any(|kw| lowered.contains(kw)),
    }
}

fn extract_freshness_signals(text: &str) -> FreshnessSignals {
    let current_year = chrono::Utc::now().year();
    let recent_dates = [current_year, current_year - 1]
        .iter()
        .any(|year| text.contains(&year.to_string()));
    FreshnessSignals { recent_dates }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_name_comes_from_title_prefix() {
        let document =
            Html::parse_document("<html><head><title>Acme Tools | Industrial Supply</title></head></html>");
        assert_eq!(extract_company_name(&document).as_deref(), Some("Acme Tools"));
    }

    #[test]
    fn founded_year_derives_tenure() {
        let about = extract_about("Acme Tools was founded in 2008 in Hamburg.");
        assert_eq!(about.founded_year, Some(2008));
        assert!(about.years_in_business.unwrap() >= 15);

        let none = extract_about("We sell tools.");
        assert_eq!(none.founded_year, None);
        assert_eq!(none.years_in_business, None);
    }

    #[test]
    fn location_matches_city_country_pairs() {
        assert_eq!(
            extract_location("Visit us in Hamburg, Germany for a tour."),
            Some("Hamburg, Germany".to_string())
        );
        assert_eq!(extract_location("no location here"), None);
    }

    #[test]
    fn visual_elements_detect_social_and_forms() {
        let document = Html::parse_document(
            r#"<html><body>
              <form action="/contact-us" class="main"></form>
              <a href="https://www.linkedin.com/company/acme">LinkedIn</a>
              <a href="/catalog.pdf">Catalog</a>
            </body></html>"#,
        );
        let visual = extract_visual_elements(&document);

        assert!(visual.has_contact_form);
        assert!(visual.has_social_media);
        assert!(visual.has_downloads);
        assert!(!visual.has_chat);
    }

    #[test]
    fn quality_signals_reflect_transport_and_keywords() {
        let signals =
            extract_quality_signals("https://acme.example.com", "Award winning partner network");
        assert!(signals.has_ssl);
        assert!(signals.has_awards);
        assert!(signals.has_partnerships);

        let plain = extract_quality_signals("http://acme.example.com", "plain text");
        assert!(!plain.has_ssl);
    }
}
