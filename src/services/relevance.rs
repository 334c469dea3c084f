use super::Oracle;

/// Cleaned-text prefix handed to the oracle; keeps per-candidate latency and
/// cost bounded while leaving enough signal.
const RELEVANCE_TEXT_LIMIT: usize = 3500;

/// Ask the oracle whether a page is a genuine bulk-supplier website for the
/// product/region. Only a response of the exact shape `link: <url>` accepts;
/// `link: None` and every malformed response reject (fail-closed).
pub async fn is_relevant_supplier_page(
    oracle: &dyn Oracle,
    link: &str,
    product_name: &str,
    region: &str,
    cleaned_text: &str,
) -> bool {
    if cleaned_text.is_empty() {
        log::info!("REJECTED: {} - no page text", link);
        return false;
    }

    let truncated: String = cleaned_text.chars().take(RELEVANCE_TEXT_LIMIT).collect();

    let question = format!(
        "You are an expert at evaluating website content. Determine if the \
         website below is exclusively about suppliers for the following \
         product: {product} in {region}.\n\
         Instructions:\n\
         1. Analyze the page text provided.\n\
         2. Identify if the content is focused on supplying {product}.\n\
         3. Exclude blogs, insights, intelligence, reports, analysis, news, \
         and social media websites.\n\
         4. Exclude websites that sell small quantities; those are not bulk \
         suppliers.\n\
         Return format:\n\
         - If the website is about suppliers, return: link: {link}\n\
         - If not, return: link: None",
        product = product_name,
        region = region,
        link = link,
    );

    let response = match oracle.classify(&truncated, &question).await {
        Ok(response) => response,
        Err(e) => {
            log::error!("Relevance check error for {}: {:?}", link, e);
            return false;
        }
    };

    if response.contains("link: None") {
        log::info!("REJECTED: {} - {}", link, response);
        return false;
    }

    match response.split_once("link:") {
        Some(_) => {
            log::info!("ACCEPTED: {}", link);
            true
        }
        None => {
            log::info!("REJECTED: {} - invalid response format: {}", link, response);
            false
        }
    }
}

/// One-or-two sentence summary of why the page is a relevant bulk supplier.
/// Oracle failures collapse to `None`; summaries are an enrichment only.
pub async fn summarise_supplier(
    oracle: &dyn Oracle,
    link: &str,
    product_name: &str,
    region: &str,
    cleaned_text: &str,
) -> Option<String> {
    let truncated: String = cleaned_text.chars().take(2500).collect();

    let question = format!(
        "Write a concise professional summary (1 sentence, max 2) explaining \
         the key reason this page is a relevant bulk supplier for \
         '{product}' in '{region}'. Focus on the primary capability, product \
         fit, or scale; avoid fluff or marketing language.\n\nURL: {link}",
        product = product_name,
        region = region,
        link = link,
    );

    match oracle.classify(&truncated, &question).await {
        Ok(raw) => {
            let summary = truncate_to_two_sentences(&raw);
            match summary.is_empty() {
                true => None,
                false => Some(summary),
            }
        }
        Err(e) => {
            log::error!("Summary generation error for {}: {:?}", link, e);
            None
        }
    }
}

fn truncate_to_two_sentences(text: &str) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sentences = vec![];
    let mut current = String::new();
    for ch in normalized.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            sentences.push(current.trim().to_string());
            current.clear();
            if sentences.len() == 2 {
                break;
            }
        }
    }
    if sentences.len() < 2 && !current.trim().is_empty() {
        sentences.push(current.trim().to_string());
    }

    sentences.join(" ")
}

#[cfg(test)]
mod tests {
    use super::truncate_to_two_sentences;

    #[test]
    fn truncates_to_two_sentences() {
        let text = "Large-scale tea producer. Ships worldwide in bulk. Also sells mugs.";
        assert_eq!(
            truncate_to_two_sentences(text),
            "Large-scale tea producer. Ships worldwide in bulk."
        );
    }

    #[test]
    fn keeps_short_text_unchanged() {
        assert_eq!(
            truncate_to_two_sentences("One   short sentence"),
            "One short sentence"
        );
    }
}
