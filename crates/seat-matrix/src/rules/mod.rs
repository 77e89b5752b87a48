//! Document-specific reconstruction tables.
//!
//! The fragment table, suffix list and placeholder keyword tables depend on
//! how one particular PDF wraps its lines, so they are loaded from a versioned
//! JSON file instead of living in code. Loading validates the file; a run
//! never starts on an empty or corrupt table set.

mod file;

pub use file::{FragmentRule, KeywordRule, PlaceholderRule, RuleSet};

use crate::pipeline::text::{collapse_whitespace, is_parenthetical, normalize_key};
use crate::pipeline::ColumnSchema;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to read rule file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed rule file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("rule file has no version")]
    MissingVersion,
    #[error("rule table '{table}' is empty")]
    EmptyTable { table: &'static str },
    #[error("rule table '{table}' has a blank entry at position {position}")]
    BlankEntry {
        table: &'static str,
        position: usize,
    },
    #[error("category code '{code}' is listed twice")]
    DuplicateCategory { code: String },
    #[error("suffix '{suffix}' is not a single parenthetical token")]
    InvalidSuffix { suffix: String },
    #[error("fragment '{fragment}' is listed twice with the same context")]
    DuplicateFragment { fragment: String },
    #[error("placeholder '{phrase}' is listed twice")]
    DuplicatePlaceholder { phrase: String },
    #[error("placeholder '{phrase}' has no keyword rules")]
    PlaceholderWithoutKeywords { phrase: String },
}

/// Validated, lookup-ready form of a [`RuleSet`]. Immutable once built and
/// safe to share between concurrent runs.
#[derive(Debug, Clone)]
pub struct ReconstructionRules {
    version: String,
    categories: Vec<String>,
    sentinels: HashSet<String>,
    suffixes: HashMap<String, String>,
    fragments: HashMap<String, Vec<FragmentRule>>,
    placeholders: HashMap<String, PlaceholderRule>,
    full_names: HashSet<String>,
}

impl ReconstructionRules {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| RulesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RulesError> {
        let set: RuleSet = serde_json::from_reader(reader)?;
        Self::compile(set)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, RulesError> {
        let set: RuleSet = serde_json::from_str(raw)?;
        Self::compile(set)
    }

    pub fn compile(set: RuleSet) -> Result<Self, RulesError> {
        let version = collapse_whitespace(&set.version);
        if version.is_empty() {
            return Err(RulesError::MissingVersion);
        }

        let categories = compile_categories(&set.categories)?;

        let sentinels = set
            .header_sentinels
            .iter()
            .map(|sentinel| normalize_key(sentinel))
            .filter(|key| !key.is_empty())
            .collect();

        let suffixes = compile_suffixes(&set.suffixes)?;
        let fragments = compile_fragments(&set.fragments)?;
        let placeholders = compile_placeholders(&set.placeholders)?;

        let mut full_names = HashSet::new();
        for rule in &set.fragments {
            if let Some(full_name) = &rule.full_name {
                full_names.insert(normalize_key(full_name));
            }
        }
        for rule in &set.placeholders {
            for keyword in &rule.keywords {
                full_names.insert(normalize_key(&keyword.college));
            }
        }

        Ok(Self {
            version,
            categories,
            sentinels,
            suffixes,
            fragments,
            placeholders,
            full_names,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn schema(&self) -> ColumnSchema {
        ColumnSchema::new(self.categories.clone())
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.values().map(Vec::len).sum()
    }

    pub fn suffix_count(&self) -> usize {
        self.suffixes.len()
    }

    pub fn placeholder_count(&self) -> usize {
        self.placeholders.len()
    }

    pub fn keyword_count(&self) -> usize {
        self.placeholders
            .values()
            .map(|rule| rule.keywords.len())
            .sum()
    }

    pub(crate) fn is_header_sentinel(&self, cell: &str) -> bool {
        self.sentinels.contains(&normalize_key(cell))
    }

    /// Configured spelling of a suffix token, matched case-insensitively.
    pub(crate) fn canonical_suffix(&self, token: &str) -> Option<&str> {
        self.suffixes.get(&normalize_key(token)).map(String::as_str)
    }

    pub(crate) fn fragment_rules(&self, cell: &str) -> Option<&[FragmentRule]> {
        self.fragments.get(&normalize_key(cell)).map(Vec::as_slice)
    }

    pub(crate) fn placeholder(&self, cell: &str) -> Option<&PlaceholderRule> {
        self.placeholders.get(&normalize_key(cell))
    }

    pub(crate) fn is_known_full_name(&self, cell: &str) -> bool {
        self.full_names.contains(&normalize_key(cell))
    }
}

fn require_text(value: &str, table: &'static str, position: usize) -> Result<String, RulesError> {
    let collapsed = collapse_whitespace(value);
    if collapsed.is_empty() {
        return Err(RulesError::BlankEntry { table, position });
    }
    Ok(collapsed)
}

fn compile_categories(raw: &[String]) -> Result<Vec<String>, RulesError> {
    if raw.is_empty() {
        return Err(RulesError::EmptyTable { table: "categories" });
    }

    let mut seen = HashSet::new();
    let mut categories = Vec::with_capacity(raw.len());
    for (position, code) in raw.iter().enumerate() {
        let code = require_text(code, "categories", position)?;
        if !seen.insert(normalize_key(&code)) {
            return Err(RulesError::DuplicateCategory { code });
        }
        categories.push(code);
    }
    Ok(categories)
}

fn compile_suffixes(raw: &[String]) -> Result<HashMap<String, String>, RulesError> {
    if raw.is_empty() {
        return Err(RulesError::EmptyTable { table: "suffixes" });
    }

    let mut suffixes = HashMap::with_capacity(raw.len());
    for (position, suffix) in raw.iter().enumerate() {
        let suffix = require_text(suffix, "suffixes", position)?;
        if !is_parenthetical(&suffix) {
            return Err(RulesError::InvalidSuffix { suffix });
        }
        suffixes.insert(normalize_key(&suffix), suffix);
    }
    Ok(suffixes)
}

fn compile_fragments(raw: &[FragmentRule]) -> Result<HashMap<String, Vec<FragmentRule>>, RulesError> {
    if raw.is_empty() {
        return Err(RulesError::EmptyTable { table: "fragments" });
    }

    let mut fragments: HashMap<String, Vec<FragmentRule>> = HashMap::new();
    for (position, rule) in raw.iter().enumerate() {
        let fragment = require_text(&rule.fragment, "fragments", position)?;
        let full_name = rule
            .full_name
            .as_deref()
            .map(|name| require_text(name, "fragments", position))
            .transpose()?;
        let context = rule
            .context
            .as_deref()
            .map(|hint| require_text(hint, "fragments", position))
            .transpose()?;

        let entries = fragments.entry(normalize_key(&fragment)).or_default();
        let context_key = context.as_deref().map(normalize_key);
        if entries
            .iter()
            .any(|existing| existing.context.as_deref().map(normalize_key) == context_key)
        {
            return Err(RulesError::DuplicateFragment { fragment });
        }

        entries.push(FragmentRule {
            fragment,
            full_name,
            context,
        });
    }
    Ok(fragments)
}

fn compile_placeholders(
    raw: &[PlaceholderRule],
) -> Result<HashMap<String, PlaceholderRule>, RulesError> {
    if raw.is_empty() {
        return Err(RulesError::EmptyTable {
            table: "placeholders",
        });
    }

    let mut placeholders = HashMap::with_capacity(raw.len());
    for (position, rule) in raw.iter().enumerate() {
        let phrase = require_text(&rule.phrase, "placeholders", position)?;
        if rule.keywords.is_empty() {
            return Err(RulesError::PlaceholderWithoutKeywords { phrase });
        }

        let mut keywords = Vec::with_capacity(rule.keywords.len());
        for (position, keyword) in rule.keywords.iter().enumerate() {
            keywords.push(KeywordRule {
                keyword: require_text(&keyword.keyword, "placeholder keywords", position)?,
                college: require_text(&keyword.college, "placeholder keywords", position)?,
            });
        }

        let key = normalize_key(&phrase);
        if placeholders.contains_key(&key) {
            return Err(RulesError::DuplicatePlaceholder { phrase });
        }
        placeholders.insert(key, PlaceholderRule { phrase, keywords });
    }
    Ok(placeholders)
}

#[cfg(test)]
pub(crate) fn bundled_rules_for_tests() -> ReconstructionRules {
    ReconstructionRules::from_json_str(include_str!("../../rules/du-admissions.json"))
        .expect("bundled rule file is valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn minimal_set() -> RuleSet {
        RuleSet {
            version: "test-1".to_string(),
            categories: vec!["UR".to_string(), "OBC".to_string()],
            header_sentinels: vec!["S.NO.".to_string()],
            suffixes: vec!["(W)".to_string()],
            fragments: vec![FragmentRule {
                fragment: "Sciences".to_string(),
                full_name: Some("Bhaskaracharya College of Applied Sciences".to_string()),
                context: None,
            }],
            placeholders: vec![PlaceholderRule {
                phrase: "For Women (W)".to_string(),
                keywords: vec![KeywordRule {
                    keyword: "Psychology".to_string(),
                    college: "Jesus & Mary College for Women (W)".to_string(),
                }],
            }],
        }
    }

    #[test]
    fn bundled_rule_file_compiles() {
        let rules = bundled_rules_for_tests();
        assert_eq!(
            rules.categories(),
            ["UR", "OBC", "SC", "ST", "EWS", "SIKH", "PwBD"]
        );
        assert!(rules.is_header_sentinel("s. no."));
        assert_eq!(rules.canonical_suffix("(evening)"), Some("(Evening)"));
        assert!(rules.fragment_rules("sciences").is_some());
        assert!(rules.placeholder("FOR WOMEN (W)").is_some());
        assert!(rules.is_known_full_name("Delhi College of Arts and Commerce"));
        assert!(rules.keyword_count() >= rules.placeholder_count());
    }

    #[test]
    fn lookups_ignore_case_and_spacing() {
        let rules = ReconstructionRules::compile(minimal_set()).expect("valid set");
        assert!(rules.fragment_rules("  SCIENCES ").is_some());
        assert!(rules.is_known_full_name("bhaskaracharya  college of applied sciences"));
        assert_eq!(rules.canonical_suffix("(w)"), Some("(W)"));
        assert!(!rules.is_header_sentinel("12"));
    }

    #[test]
    fn empty_tables_are_rejected() {
        let mut set = minimal_set();
        set.fragments.clear();
        assert!(matches!(
            ReconstructionRules::compile(set),
            Err(RulesError::EmptyTable { table: "fragments" })
        ));

        let mut set = minimal_set();
        set.placeholders.clear();
        assert!(matches!(
            ReconstructionRules::compile(set),
            Err(RulesError::EmptyTable {
                table: "placeholders"
            })
        ));

        let mut set = minimal_set();
        set.categories.clear();
        assert!(matches!(
            ReconstructionRules::compile(set),
            Err(RulesError::EmptyTable { table: "categories" })
        ));
    }

    #[test]
    fn blank_and_duplicate_entries_are_rejected() {
        let mut set = minimal_set();
        set.fragments.push(FragmentRule {
            fragment: "  ".to_string(),
            full_name: None,
            context: None,
        });
        assert!(matches!(
            ReconstructionRules::compile(set),
            Err(RulesError::BlankEntry {
                table: "fragments",
                position: 1
            })
        ));

        let mut set = minimal_set();
        set.fragments.push(FragmentRule {
            fragment: "sciences".to_string(),
            full_name: Some("Another College of Sciences".to_string()),
            context: None,
        });
        assert!(matches!(
            ReconstructionRules::compile(set),
            Err(RulesError::DuplicateFragment { .. })
        ));

        let mut set = minimal_set();
        set.categories.push("ur".to_string());
        assert!(matches!(
            ReconstructionRules::compile(set),
            Err(RulesError::DuplicateCategory { .. })
        ));
    }

    #[test]
    fn fragments_may_repeat_with_distinct_context() {
        let mut set = minimal_set();
        set.fragments.push(FragmentRule {
            fragment: "Sciences".to_string(),
            full_name: Some("Institute of Home Sciences".to_string()),
            context: Some("Home".to_string()),
        });
        let rules = ReconstructionRules::compile(set).expect("context entries allowed");
        assert_eq!(rules.fragment_rules("Sciences").map(<[_]>::len), Some(2));
        assert_eq!(rules.fragment_count(), 2);
    }

    #[test]
    fn placeholders_need_keywords_and_suffixes_need_parentheses() {
        let mut set = minimal_set();
        set.placeholders[0].keywords.clear();
        assert!(matches!(
            ReconstructionRules::compile(set),
            Err(RulesError::PlaceholderWithoutKeywords { .. })
        ));

        let mut set = minimal_set();
        set.suffixes.push("Evening".to_string());
        assert!(matches!(
            ReconstructionRules::compile(set),
            Err(RulesError::InvalidSuffix { .. })
        ));

        let mut set = minimal_set();
        set.version = " ".to_string();
        assert!(matches!(
            ReconstructionRules::compile(set),
            Err(RulesError::MissingVersion)
        ));
    }

    #[test]
    fn from_path_reports_missing_and_malformed_files() {
        let error = ReconstructionRules::from_path("./does-not-exist.json")
            .expect_err("expected io error");
        match error {
            RulesError::Io { path, .. } => assert_eq!(path, PathBuf::from("./does-not-exist.json")),
            other => panic!("expected io error, got {other:?}"),
        }

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"{ \"version\": \"1\", ").expect("write");
        let error = ReconstructionRules::from_path(file.path()).expect_err("malformed json");
        assert!(matches!(error, RulesError::Parse(_)));
    }

    #[test]
    fn from_path_loads_a_valid_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let json = serde_json::to_string(&minimal_set()).expect("serialize");
        file.write_all(json.as_bytes()).expect("write");

        let rules = ReconstructionRules::from_path(file.path()).expect("loads");
        assert_eq!(rules.version(), "test-1");
        assert_eq!(rules.schema().arity(), 5);
    }
}
