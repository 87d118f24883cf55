//! Instruction template for article analysis

use crate::analyzer::parse::{CATEGORIES, SUB_CATEGORIES};

/// System preamble sent with every analysis request
pub const ANALYSIS_PREAMBLE: &str = "You are an industry analyst covering personal-care small \
appliances (hair dryers, beauty devices, massagers) and the product line lead who decides \
what is worth acting on. You answer with a single JSON object and nothing else.";

/// Build the user prompt for one article
pub fn analysis_prompt(title: &str, text: &str) -> String {
    format!(
        r#"Analyze the following article.

Title: {title}
Article text (may be truncated):
{text}

Return a JSON object with exactly these fields:
- "category": one of {categories}. Use "irrelevant" when the article is not about personal-care appliances.
- "sub_category": one of {sub_categories}.
- "summary": a summary of at most 200 words covering the core content.
- "keywords": an array of 3 to 5 key terms.
- "value_score": an integer from 0 to 100 rating the business value of this article to a personal-care appliance maker.
- "value_reason": one sentence explaining the score.

Example:
{{"category": "technology", "sub_category": "hair dryer", "summary": "...", "keywords": ["...", "...", "..."], "value_score": 75, "value_reason": "..."}}"#,
        title = title,
        text = text,
        categories = quoted_list(CATEGORIES),
        sub_categories = quoted_list(SUB_CATEGORIES),
    )
}

fn quoted_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| format!("\"{}\"", i)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Cut `text` to at most `max_chars` characters on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
