//! Keyword classification of articles into topical domains.
//!
//! Matching is plain regex over lowercased text, not NLP. Every rule uses word
//! boundaries so short keywords such as `ai` or `dow` do not fire inside
//! longer words.

use regex::Regex;
use std::sync::LazyLock;

/// Tag used when nothing matches and the feed has no category.
pub const GENERAL_DOMAIN: &str = "general";

/// The closed set of tags the rules can produce, in evaluation order.
pub const DOMAIN_VOCABULARY: [&str; 8] = [
    "geopolitics",
    "trade",
    "sports",
    "economics",
    "share market",
    "finance",
    "marketing",
    "technology",
];

struct Rule {
    domain: &'static str,
    pattern: Regex,
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    [
        (
            "geopolitics",
            r"\b(war|sanction|diplomacy|election|border|conflict|geopolitic)",
        ),
        (
            "trade",
            r"\b(trade|tariff|export|import|supply chain|logistics)\b",
        ),
        (
            "sports",
            r"\b(sport|league|tournament|match|world cup|olympic)",
        ),
        (
            "economics",
            r"\b(gdp|inflation|recession|macro|economy|economic)\b",
        ),
        (
            "share market",
            r"\b(index|s&p|nasdaq|dow|ftse|nifty|sensex|stock market|equity|shares?)\b",
        ),
        (
            "finance",
            r"\b(bank|interest rates?|loan|funding|capital|investment|investor|finance)\b",
        ),
        (
            "marketing",
            r"\b(marketing|brand|campaign|advertis(ing|ement)|customer|consumer)\b",
        ),
        (
            "technology",
            r"\b(ai|artificial intelligence|machine learning|cloud|software|startup|tech)\b",
        ),
    ]
    .into_iter()
    .map(|(domain, pattern)| Rule {
        domain,
        pattern: Regex::new(pattern).expect("classifier rule must compile"),
    })
    .collect()
});

/// Classify an item from its title, body text and feed category.
///
/// All matching rules fire; the result follows rule order and is never empty.
/// With no match it falls back to the category, or `general` when the
/// category is missing or blank.
pub fn classify(title: &str, body: &str, category: Option<&str>) -> Vec<String> {
    let category = category.map(str::trim).filter(|c| !c.is_empty());
    let text = format!("{} {} {}", title, body, category.unwrap_or_default()).to_lowercase();

    let domains: Vec<String> = RULES
        .iter()
        .filter(|rule| rule.pattern.is_match(&text))
        .map(|rule| rule.domain.to_string())
        .collect();

    if domains.is_empty() {
        return vec![category.unwrap_or(GENERAL_DOMAIN).to_string()];
    }
    domains
}
