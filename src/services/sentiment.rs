use serde::Deserialize;

use crate::domain::SentimentData;

use super::{Oracle, SearchProvider};

const MENTIONS_PER_QUERY: usize = 5;
const MAX_MENTIONS: usize = 10;

#[derive(Deserialize)]
struct OracleSentiment {
    sentiment_score: i32,
    #[serde(default)]
    positive_mentions: u32,
    #[serde(default)]
    negative_mentions: u32,
    #[serde(default)]
    neutral_mentions: u32,
    #[serde(default)]
    analysis_summary: String,
}

fn label_for(score: i32) -> &'static str {
    if score >= 70 {
        "positive"
    } else if score <= 30 {
        "negative"
    } else {
        "neutral"
    }
}

/// Online-reputation proxy: search news and reviews mentioning the company,
/// then have the oracle summarize the sentiment as a structured record.
/// Degrades to an unavailable/neutral result, never errors.
pub async fn analyze_sentiment(
    provider: &SearchProvider,
    oracle: &dyn Oracle,
    company_name: &str,
) -> SentimentData {
    if !provider.serper_configured() {
        log::error!("Sentiment analysis unavailable: no search provider key");
        return SentimentData::default();
    }

    let queries = [
        format!("\"{}\" news", company_name),
        format!("\"{}\" reviews", company_name),
    ];

    let mut mentions: Vec<(String, String)> = vec![];
    for query in &queries {
        mentions.extend(provider.search_mentions(query, MENTIONS_PER_QUERY).await);
    }

    // Deduplicate by title, first occurrence kept.
    let mut seen = std::collections::HashSet::new();
    mentions.retain(|(title, _)| seen.insert(title.clone()));
    mentions.truncate(MAX_MENTIONS);

    let mut result = SentimentData {
        sentiment_available: true,
        news_count: mentions.len() as u32,
        ..Default::default()
    };

    if mentions.is_empty() {
        result.analysis_summary = "No news or mentions found online".to_string();
        return result;
    }

    let news_text = mentions
        .iter()
        .map(|(title, snippet)| format!("Title: {}\nSnippet: {}", title, snippet))
        .collect::<Vec<_>>()
        .join("\n\n");

    let text = format!(
        "Analyze the sentiment of online mentions and news about \"{}\".\n\n\
         News and mentions:\n{}\n\n\
         Consider customer reviews, news coverage, controversies, awards and \
         general business reputation. The score runs 0 (very negative) to \
         100 (very positive), 50 is neutral.",
        company_name, news_text
    );
    let schema_hint = r#"{
  "sentiment_score": <number 0-100>,
  "positive_mentions": <number>,
  "negative_mentions": <number>,
  "neutral_mentions": <number>,
  "analysis_summary": "<brief 1-2 sentence summary>"
}"#;

    match oracle.extract_structured(&text, schema_hint).await {
        Ok(value) => match serde_json::from_value::<OracleSentiment>(value) {
            Ok(parsed) => {
                result.sentiment_score = parsed.sentiment_score.clamp(0, 100);
                result.sentiment_label = label_for(result.sentiment_score).to_string();
                result.positive_mentions = parsed.positive_mentions;
                result.negative_mentions = parsed.negative_mentions;
                result.neutral_mentions = parsed.neutral_mentions;
                result.analysis_summary = parsed.analysis_summary;
                log::info!(
                    "Sentiment for {}: {}/100 ({})",
                    company_name,
                    result.sentiment_score,
                    result.sentiment_label
                );
            }
            Err(e) => {
                log::error!("Sentiment response shape error for {}: {:?}", company_name, e);
            }
        },
        Err(e) => {
            log::error!("Sentiment analysis error for {}: {:?}", company_name, e);
        }
    }

    result
}
