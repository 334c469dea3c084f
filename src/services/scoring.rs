use serde::{Deserialize, Serialize};

use crate::domain::{MarketplacePresence, SentimentData, WebsiteData};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    pub points: f64,
    pub max_points: f64,
    pub percentage: f64,
    pub evidence: Vec<String>,
}

impl CategoryScore {
    fn new(points: f64, max_points: f64, evidence: Vec<String>) -> Self {
        CategoryScore {
            points,
            max_points,
            percentage: round1(points / max_points * 100.0),
            evidence,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub total: f64,
    pub grade: String,
    pub stars: u8,
    pub recommendation: String,
    pub narrative: String,
    pub supplier_selection: CategoryScore,
    pub company_info: CategoryScore,
    pub compliance_certs: CategoryScore,
    pub performance_metrics: CategoryScore,
    pub risk_profile: CategoryScore,
    pub document_repository: CategoryScore,
    pub engagement: CategoryScore,
}

impl ScoreBreakdown {
    pub fn categories(&self) -> [(&'static str, &CategoryScore); 7] {
        [
            ("supplier_selection", &self.supplier_selection),
            ("company_info", &self.company_info),
            ("compliance_certs", &self.compliance_certs),
            ("performance_metrics", &self.performance_metrics),
            ("risk_profile", &self.risk_profile),
            ("document_repository", &self.document_repository),
            ("engagement", &self.engagement),
        ]
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn effective_sentiment(sentiment: &SentimentData) -> i32 {
    match sentiment.sentiment_available {
        true => sentiment.sentiment_score,
        false => 50,
    }
}

/// Deterministic 25-point supplier evaluation over seven fixed-ceiling
/// categories. Missing signals degrade to neutral defaults; the function
/// never fails.
pub fn calculate_score(
    website_data: &WebsiteData,
    marketplace: &MarketplacePresence,
    sentiment: &SentimentData,
) -> ScoreBreakdown {
    let supplier_selection = score_supplier_selection(website_data);
    let company_info = score_company_info(website_data);
    let compliance_certs = score_compliance(website_data);
    let performance_metrics = score_performance(website_data, sentiment);
    let risk_profile = score_risk(website_data, sentiment, marketplace);
    let document_repository = score_documents(website_data);
    let engagement = score_engagement(website_data, marketplace);

    let total = round1(
        supplier_selection.points
            + company_info.points
            + compliance_certs.points
            + performance_metrics.points
            + risk_profile.points
            + document_repository.points
            + engagement.points,
    );
    let stars = star_rating(total);

    let mut breakdown = ScoreBreakdown {
        total,
        grade: letter_grade(total).to_string(),
        stars,
        recommendation: recommendation(total).to_string(),
        narrative: String::new(),
        supplier_selection,
        company_info,
        compliance_certs,
        performance_metrics,
        risk_profile,
        document_repository,
        engagement,
    };
    breakdown.narrative = build_narrative(&breakdown, website_data, marketplace, sentiment);
    breakdown
}

/// Supplier identification & data access (3 points).
fn score_supplier_selection(website_data: &WebsiteData) -> CategoryScore {
    let mut points = 0.0;
    let mut evidence = vec![];

    match website_data.company_name.as_deref() {
        Some(name) if name != "Unknown" => {
            points += 1.5;
            evidence.push("Supplier identified".to_string());
        }
        _ => evidence.push("Supplier identification unclear".to_string()),
    }

    match website_data.analysis_failed {
        false => {
            points += 1.5;
            evidence.push("Full access to supplier data".to_string());
        }
        true => evidence.push("Limited data access".to_string()),
    }

    CategoryScore::new(points, 3.0, evidence)
}

/// Company info & contact completeness (4 points).
fn score_company_info(website_data: &WebsiteData) -> CategoryScore {
    let mut points = 0.0;
    let mut evidence = vec![];

    if website_data.company_name.is_some() {
        points += 1.0;
        evidence.push("Company name present".to_string());
    }
    if website_data.contact.email.is_some() {
        points += 1.0;
        evidence.push("Email contact available".to_string());
    }
    if website_data.contact.phone.is_some() {
        points += 1.0;
        evidence.push("Phone contact available".to_string());
    }
    if website_data.location.is_some() {
        points += 1.0;
        evidence.push("Location/address verified".to_string());
    }

    CategoryScore::new(points, 4.0, evidence)
}

/// Certifications, tiered by count (4 points).
fn score_compliance(website_data: &WebsiteData) -> CategoryScore {
    let count = website_data.certifications.len();
    let points = match count {
        0 => 0.0,
        1 => 2.0,
        2 => 3.0,
        _ => 4.0,
    };
    let evidence = match count {
        0 => vec!["No certifications found".to_string()],
        n => vec![format!("{} certification(s) found", n)],
    };

    CategoryScore::new(points, 4.0, evidence)
}

/// Performance proxy from sentiment and tenure (5 points).
fn score_performance(website_data: &WebsiteData, sentiment: &SentimentData) -> CategoryScore {
    let mut points: f64 = 0.0;
    let mut evidence = vec![];
    let sentiment_score = effective_sentiment(sentiment);

    if sentiment_score >= 80 {
        points += 4.0;
        evidence.push("Excellent performance reputation".to_string());
    } else if sentiment_score >= 60 {
        points += 2.5;
        evidence.push("Good performance reputation".to_string());
    } else if sentiment_score >= 40 {
        points += 1.5;
        evidence.push("Moderate performance reputation".to_string());
    } else {
        evidence.push("Poor performance reputation".to_string());
    }

    match website_data.about.years_in_business {
        Some(years) if years >= 10 => {
            points += 1.0;
            evidence.push(format!("{}+ years in business", years));
        }
        Some(years) if years >= 5 => {
            points += 0.75;
            evidence.push(format!("{} years in business", years));
        }
        Some(years) => evidence.push(format!("Limited track record ({} years)", years)),
        None => {
            points += 0.5;
            evidence.push("Business history unknown".to_string());
        }
    }

    CategoryScore::new(points.min(5.0), 5.0, evidence)
}

/// Risk profile (4 points): starts at the ceiling, deducted for risks.
fn score_risk(
    website_data: &WebsiteData,
    sentiment: &SentimentData,
    marketplace: &MarketplacePresence,
) -> CategoryScore {
    let mut points: f64 = 4.0;
    let mut evidence = vec![];
    let sentiment_score = effective_sentiment(sentiment);

    if sentiment_score < 30 {
        points -= 2.0;
        evidence.push("High risk: negative sentiment".to_string());
    } else if sentiment_score < 50 {
        points -= 1.0;
        evidence.push("Moderate risk: mixed sentiment".to_string());
    } else {
        evidence.push("Low risk: positive sentiment".to_string());
    }

    match marketplace.alibaba_verified || marketplace.thomasnet_listed {
        true => evidence.push("Verified on B2B platform".to_string()),
        false => {
            points -= 1.0;
            evidence.push("Not verified on major platforms".to_string());
        }
    }

    if !website_data.quality_signals.has_ssl {
        points -= 1.0;
        evidence.push("No secure transport".to_string());
    }

    CategoryScore::new(points.max(0.0), 4.0, evidence)
}

/// Document repository & freshness signals (3 points).
fn score_documents(website_data: &WebsiteData) -> CategoryScore {
    let mut points = 0.0;
    let mut evidence = vec![];

    if website_data.visual_elements.has_downloads {
        points += 1.0;
        evidence.push("Downloadable documents available".to_string());
    }
    if website_data.about.founded_year.is_some() || website_data.about.years_in_business.is_some() {
        points += 1.0;
        evidence.push("Company information documented".to_string());
    }
    if website_data.freshness_signals.recent_dates {
        points += 1.0;
        evidence.push("Recent content updates".to_string());
    }

    CategoryScore::new(points, 3.0, evidence)
}

/// Engagement & activity (2 points).
fn score_engagement(
    website_data: &WebsiteData,
    marketplace: &MarketplacePresence,
) -> CategoryScore {
    let mut points = 0.0;
    let mut evidence = vec![];
    let visual = &website_data.visual_elements;

    if visual.has_social_media {
        points += 0.75;
        evidence.push("Active on social media".to_string());
    }
    if visual.has_contact_form || visual.has_chat {
        points += 0.75;
        evidence.push("Interactive communication available".to_string());
    }
    if marketplace.alibaba_verified || marketplace.thomasnet_listed {
        points += 0.5;
        evidence.push("Active on B2B marketplaces".to_string());
    }

    CategoryScore::new(points, 2.0, evidence)
}

/// Star rating: pure, total and non-overlapping over [0,25].
pub fn star_rating(total: f64) -> u8 {
    if total >= 22.0 {
        5
    } else if total >= 18.0 {
        4
    } else if total >= 13.0 {
        3
    } else if total >= 8.0 {
        2
    } else {
        1
    }
}

pub fn letter_grade(total: f64) -> &'static str {
    if total >= 24.0 {
        "A+"
    } else if total >= 22.0 {
        "A"
    } else if total >= 21.0 {
        "A-"
    } else if total >= 20.0 {
        "B+"
    } else if total >= 19.0 {
        "B"
    } else if total >= 18.0 {
        "B-"
    } else if total >= 16.0 {
        "C+"
    } else if total >= 15.0 {
        "C"
    } else if total >= 14.0 {
        "C-"
    } else if total >= 13.0 {
        "D+"
    } else if total >= 11.0 {
        "D"
    } else {
        "F"
    }
}

pub fn recommendation(total: f64) -> &'static str {
    if total >= 21.0 {
        "HIGHLY RECOMMENDED: Excellent supplier with strong credentials"
    } else if total >= 18.0 {
        "RECOMMENDED: Reliable supplier meeting quality standards"
    } else if total >= 14.0 {
        "ACCEPTABLE: Adequate supplier, monitor performance"
    } else if total >= 10.0 {
        "CAUTION: Marginal supplier, requires verification"
    } else {
        "NOT RECOMMENDED: Insufficient supplier credentials"
    }
}

struct NarrativeContext<'a> {
    breakdown: &'a ScoreBreakdown,
    website_data: &'a WebsiteData,
    marketplace: &'a MarketplacePresence,
    sentiment: &'a SentimentData,
}

type SectionBuilder = fn(&NarrativeContext) -> String;

/// One table entry per narrative section; each builder works purely off the
/// already-computed breakdown and inputs. No oracle calls.
const NARRATIVE_SECTIONS: &[(&str, SectionBuilder)] = &[
    ("QUALITY & STANDARDS COMPLIANCE", quality_section),
    ("BULK ORDER & PRODUCTION CAPACITY", production_section),
    ("DELIVERY & LOGISTICS", delivery_section),
    ("COMMUNICATION & SUPPORT", communication_section),
    ("MARKET REPUTATION", reputation_section),
    ("BUSINESS STABILITY", stability_section),
];

fn build_narrative(
    breakdown: &ScoreBreakdown,
    website_data: &WebsiteData,
    marketplace: &MarketplacePresence,
    sentiment: &SentimentData,
) -> String {
    let ctx = NarrativeContext {
        breakdown,
        website_data,
        marketplace,
        sentiment,
    };

    let mut sections = vec![executive_summary(&ctx)];
    for (title, builder) in NARRATIVE_SECTIONS {
        sections.push(format!("\n{}\n{}", title, builder(&ctx)));
    }
    sections.join("\n")
}

fn company_label(website_data: &WebsiteData) -> &str {
    website_data.company_name.as_deref().unwrap_or("This supplier")
}

fn executive_summary(ctx: &NarrativeContext) -> String {
    let total = ctx.breakdown.total;
    let name = company_label(ctx.website_data);

    let (classification, description) = if total >= 21.0 {
        (
            "TIER 1 - PREMIUM B2B SUPPLIER",
            format!(
                "{} demonstrates exceptional B2B capabilities with strong credentials \
                 for bulk orders and long-term partnerships.",
                name
            ),
        )
    } else if total >= 18.0 {
        (
            "TIER 2 - QUALIFIED B2B SUPPLIER",
            format!(
                "{} meets industry standards for B2B operations with reliable bulk \
                 order handling capabilities.",
                name
            ),
        )
    } else if total >= 14.0 {
        (
            "TIER 3 - STANDARD B2B SUPPLIER",
            format!(
                "{} meets baseline B2B requirements. Suitable for standard bulk orders \
                 with normal verification procedures.",
                name
            ),
        )
    } else if total >= 10.0 {
        (
            "TIER 4 - EMERGING SUPPLIER",
            format!(
                "{} shows limited B2B credentials. Recommended for small trial orders \
                 only; verify extensively before bulk commitments.",
                name
            ),
        )
    } else {
        (
            "NOT QUALIFIED FOR B2B",
            format!(
                "{} lacks minimum B2B supplier credentials and is not recommended for \
                 bulk orders.",
                name
            ),
        )
    };

    format!(
        "Supplier Classification: {}\nOverall Score: {} out of 25 points (Rating: {} out of 5 stars)\n\n{}",
        classification, total, ctx.breakdown.stars, description
    )
}

fn quality_section(ctx: &NarrativeContext) -> String {
    let certs = &ctx.website_data.certifications;
    let mut lines = vec![format!(
        "Quality certifications: {} identified",
        certs.len()
    )];
    match certs.len() {
        0 => lines.push("Request quality certificates before placing bulk orders".to_string()),
        _ => lines.push(format!("Certified: {}", certs.join(", "))),
    }
    lines.push(format!(
        "Compliance score: {}%",
        ctx.breakdown.compliance_certs.percentage
    ));
    lines.join("\n")
}

fn production_section(ctx: &NarrativeContext) -> String {
    let mut lines = vec![];
    if ctx.marketplace.alibaba_verified {
        lines.push("Verified supplier on Alibaba; bulk order handling demonstrated".to_string());
    } else if ctx.marketplace.thomasnet_listed {
        lines.push("Listed on ThomasNet; industrial supply capability confirmed".to_string());
    } else {
        lines.push("No major marketplace presence; verify production capacity and MOQ directly".to_string());
    }
    match ctx.website_data.about.years_in_business {
        Some(years) if years >= 10 => lines.push(format!(
            "{} years in operation; established capacity for consistent bulk supply",
            years
        )),
        Some(years) => lines.push(format!("{} years in operation", years)),
        None => lines.push("Years in operation not specified; request production history".to_string()),
    }
    lines.join("\n")
}

fn delivery_section(ctx: &NarrativeContext) -> String {
    let mut lines = vec![];
    if ctx.marketplace.alibaba_verified {
        lines.push("Experience with international bulk shipping via Alibaba".to_string());
    } else if ctx.marketplace.thomasnet_listed {
        lines.push("B2B distribution network present via ThomasNet".to_string());
    } else {
        lines.push("Verify shipping capabilities and lead times before ordering".to_string());
    }
    if let Some(location) = &ctx.website_data.location {
        lines.push(format!(
            "Operating location: {}; consider shipping costs and customs",
            location
        ));
    }
    lines.join("\n")
}

fn communication_section(ctx: &NarrativeContext) -> String {
    let contact = &ctx.website_data.contact;
    let visual = &ctx.website_data.visual_elements;

    let mut channels = vec![];
    if contact.email.is_some() {
        channels.push("Email");
    }
    if contact.phone.is_some() {
        channels.push("Phone");
    }
    if visual.has_contact_form {
        channels.push("Online inquiry form");
    }
    if visual.has_chat {
        channels.push("Live chat");
    }
    if visual.has_social_media {
        channels.push("Social media");
    }

    match channels.is_empty() {
        true => "Contact information not readily available; verify before engagement".to_string(),
        false => format!(
            "Available communication channels ({}): {}",
            channels.len(),
            channels.join(", ")
        ),
    }
}

fn reputation_section(ctx: &NarrativeContext) -> String {
    let mut lines = vec![];
    match ctx.sentiment.sentiment_available {
        true => {
            lines.push(format!(
                "Market reputation score: {}/100 ({}) from {} online mentions",
                ctx.sentiment.sentiment_score,
                ctx.sentiment.sentiment_label.to_uppercase(),
                ctx.sentiment.news_count
            ));
            if !ctx.sentiment.analysis_summary.is_empty() {
                lines.push(ctx.sentiment.analysis_summary.clone());
            }
        }
        false => lines.push("Limited online presence; may indicate an emerging business".to_string()),
    }
    if ctx.marketplace.alibaba_verified {
        lines.push("Platform verification: Alibaba".to_string());
    }
    if ctx.marketplace.thomasnet_listed {
        lines.push("Platform verification: ThomasNet".to_string());
    }
    lines.join("\n")
}

fn stability_section(ctx: &NarrativeContext) -> String {
    let mut lines = vec![];
    match ctx.website_data.about.years_in_business {
        Some(years) if years >= 15 => lines.push(format!("{} years in operation (well-established)", years)),
        Some(years) if years >= 5 => lines.push(format!("{} years in operation (established)", years)),
        Some(years) => lines.push(format!("{} years in operation (limited history)", years)),
        None => lines.push("Years in operation not specified".to_string()),
    }
    match ctx.website_data.freshness_signals.recent_dates {
        true => lines.push("Website recently updated; active business operations".to_string()),
        false => lines.push("Limited recent website activity".to_string()),
    }
    lines.push(format!(
        "Market engagement level: {}%",
        ctx.breakdown.engagement.percentage
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AboutInfo, ContactInfo, FreshnessSignals, QualitySignals, VisualElements,
    };

    fn strong_website_data() -> WebsiteData {
        WebsiteData {
            company_name: Some("Acme Tools".to_string()),
            location: Some("Hamburg, Germany".to_string()),
            contact: ContactInfo {
                email: Some("sales@acmetools.com".to_string()),
                phone: Some("+49 40 123456".to_string()),
            },
            about: AboutInfo {
                founded_year: Some(2008),
                years_in_business: Some(17),
            },
            certifications: vec![
                "ISO 9001".to_string(),
                "CE Marking".to_string(),
                "RoHS".to_string(),
            ],
            visual_elements: VisualElements {
                has_contact_form: true,
                has_social_media: true,
                has_downloads: true,
                has_news_section: true,
                has_chat: false,
            },
            quality_signals: QualitySignals {
                has_ssl: true,
                has_awards: true,
                has_partnerships: true,
            },
            freshness_signals: FreshnessSignals { recent_dates: true },
            analysis_failed: false,
        }
    }

    fn positive_sentiment() -> SentimentData {
        SentimentData {
            sentiment_available: true,
            sentiment_score: 85,
            sentiment_label: "positive".to_string(),
            news_count: 7,
            ..Default::default()
        }
    }

    fn verified_marketplace() -> MarketplacePresence {
        MarketplacePresence {
            alibaba_verified: true,
            alibaba_url: Some("https://acme.en.alibaba.com".to_string()),
            ..Default::default()
        }
    }

    fn assert_sum_rule(breakdown: &ScoreBreakdown) {
        let sum: f64 = breakdown.categories().iter().map(|(_, c)| c.points).sum();
        assert!(
            (breakdown.total - (sum * 10.0).round() / 10.0).abs() < 1e-9,
            "total {} must equal category sum {}",
            breakdown.total,
            sum
        );
        assert!(breakdown.total >= 0.0 && breakdown.total <= 25.0);
    }

    #[test]
    fn strong_supplier_scores_full_marks() {
        let breakdown = calculate_score(
            &strong_website_data(),
            &verified_marketplace(),
            &positive_sentiment(),
        );

        assert_sum_rule(&breakdown);
        assert_eq!(breakdown.total, 25.0);
        assert_eq!(breakdown.stars, 5);
        assert_eq!(breakdown.grade, "A+");
    }

    #[test]
    fn empty_inputs_still_score_consistently() {
        let breakdown = calculate_score(
            &WebsiteData::default(),
            &MarketplacePresence::default(),
            &SentimentData::default(),
        );

        assert_sum_rule(&breakdown);
        assert_eq!(breakdown.compliance_certs.points, 0.0);
        assert!(breakdown.stars >= 1);
    }

    #[test]
    fn unverified_marketplace_and_neutral_sentiment_deduct_risk() {
        // No certifications, no marketplace presence, neutral sentiment.
        let mut website_data = WebsiteData::default();
        website_data.company_name = Some("Plain Supplier".to_string());
        website_data.quality_signals.has_ssl = true;
        let sentiment = SentimentData {
            sentiment_available: true,
            sentiment_score: 50,
            ..Default::default()
        };

        let breakdown =
            calculate_score(&website_data, &MarketplacePresence::default(), &sentiment);

        assert_sum_rule(&breakdown);
        assert_eq!(breakdown.compliance_certs.points, 0.0);
        assert_eq!(breakdown.risk_profile.points, 3.0);
        assert!(breakdown
            .risk_profile
            .evidence
            .iter()
            .any(|e| e.contains("Not verified")));
    }

    #[test]
    fn certification_tiers() {
        let mut website_data = WebsiteData::default();

        website_data.certifications = vec!["ISO 9001".to_string()];
        assert_eq!(score_compliance(&website_data).points, 2.0);

        website_data.certifications.push("CE Marking".to_string());
        assert_eq!(score_compliance(&website_data).points, 3.0);

        website_data.certifications.push("RoHS".to_string());
        assert_eq!(score_compliance(&website_data).points, 4.0);

        website_data.certifications.push("REACH".to_string());
        assert_eq!(score_compliance(&website_data).points, 4.0);
    }

    #[test]
    fn star_rating_is_total_and_non_overlapping() {
        for tenths in 0..=250 {
            let score = tenths as f64 / 10.0;
            let stars = star_rating(score);
            assert!((1..=5).contains(&stars));
        }
        assert_eq!(star_rating(25.0), 5);
        assert_eq!(star_rating(22.0), 5);
        assert_eq!(star_rating(21.9), 4);
        assert_eq!(star_rating(18.0), 4);
        assert_eq!(star_rating(17.9), 3);
        assert_eq!(star_rating(13.0), 3);
        assert_eq!(star_rating(12.9), 2);
        assert_eq!(star_rating(8.0), 2);
        assert_eq!(star_rating(7.9), 1);
        assert_eq!(star_rating(0.0), 1);
    }

    #[test]
    fn letter_grades_follow_breakpoints() {
        assert_eq!(letter_grade(25.0), "A+");
        assert_eq!(letter_grade(24.0), "A+");
        assert_eq!(letter_grade(23.0), "A");
        assert_eq!(letter_grade(21.5), "A-");
        assert_eq!(letter_grade(20.0), "B+");
        assert_eq!(letter_grade(19.0), "B");
        assert_eq!(letter_grade(18.0), "B-");
        assert_eq!(letter_grade(16.0), "C+");
        assert_eq!(letter_grade(15.0), "C");
        assert_eq!(letter_grade(14.0), "C-");
        assert_eq!(letter_grade(13.0), "D+");
        assert_eq!(letter_grade(11.0), "D");
        assert_eq!(letter_grade(10.9), "F");
    }

    #[test]
    fn narrative_covers_every_section() {
        let breakdown = calculate_score(
            &strong_website_data(),
            &verified_marketplace(),
            &positive_sentiment(),
        );

        for (title, _) in NARRATIVE_SECTIONS {
            assert!(
                breakdown.narrative.contains(title),
                "narrative missing section {}",
                title
            );
        }
        assert!(breakdown.narrative.contains("TIER 1"));
    }
}
