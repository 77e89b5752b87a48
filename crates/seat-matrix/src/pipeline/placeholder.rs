use crate::rules::ReconstructionRules;
use std::sync::Arc;

/// Outcome of resolving a generic placeholder phrase from program content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderDecision {
    Assigned {
        college: String,
        keyword: String,
    },
    Ambiguous {
        college: String,
        keyword: String,
        alternatives: Vec<String>,
    },
    NoMatch,
}

/// Replaceable heuristic for placeholder college cells. Implementations must
/// be deterministic; every decision they return is flagged as approximate.
pub trait PlaceholderPolicy {
    fn disambiguate(&self, placeholder: &str, program: &str) -> PlaceholderDecision;
}

/// Walks the placeholder's keyword table in order and matches keywords as
/// case-insensitive substrings of the program name.
#[derive(Debug, Clone)]
pub struct KeywordPolicy {
    rules: Arc<ReconstructionRules>,
}

impl KeywordPolicy {
    pub fn new(rules: Arc<ReconstructionRules>) -> Self {
        Self { rules }
    }
}

impl PlaceholderPolicy for KeywordPolicy {
    fn disambiguate(&self, placeholder: &str, program: &str) -> PlaceholderDecision {
        let Some(rule) = self.rules.placeholder(placeholder) else {
            return PlaceholderDecision::NoMatch;
        };

        let program = program.to_lowercase();
        let mut chosen: Option<(&str, &str)> = None;
        let mut alternatives: Vec<String> = Vec::new();

        for entry in &rule.keywords {
            if !program.contains(&entry.keyword.to_lowercase()) {
                continue;
            }
            match chosen {
                None => chosen = Some((entry.college.as_str(), entry.keyword.as_str())),
                Some((college, _)) => {
                    if entry.college != college && !alternatives.contains(&entry.college) {
                        alternatives.push(entry.college.clone());
                    }
                }
            }
        }

        match chosen {
            None => PlaceholderDecision::NoMatch,
            Some((college, keyword)) if alternatives.is_empty() => PlaceholderDecision::Assigned {
                college: college.to_string(),
                keyword: keyword.to_string(),
            },
            Some((college, keyword)) => PlaceholderDecision::Ambiguous {
                college: college.to_string(),
                keyword: keyword.to_string(),
                alternatives,
            },
        }
    }
}
