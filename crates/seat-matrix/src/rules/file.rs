use serde::{Deserialize, Serialize};

/// On-disk shape of a rule file. One file describes the mangling patterns of
/// one source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub version: String,
    pub categories: Vec<String>,
    #[serde(default)]
    pub header_sentinels: Vec<String>,
    pub suffixes: Vec<String>,
    pub fragments: Vec<FragmentRule>,
    pub placeholders: Vec<PlaceholderRule>,
}

/// A college-name cell that only carries the tail of a wrapped name.
///
/// Without `full_name` the fragment is continuation-only and gets appended to
/// the cursor. With `context` the entry applies only when a nearby raw row
/// mentions that text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentRule {
    pub fragment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// A generic college phrase resolved from the program name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderRule {
    pub phrase: String,
    pub keywords: Vec<KeywordRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub college: String,
}
