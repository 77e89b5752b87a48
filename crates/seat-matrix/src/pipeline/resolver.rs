use super::classify::{classify, CellClass};
use super::diagnostics::{QualityWarning, WarningKind};
use super::placeholder::{PlaceholderDecision, PlaceholderPolicy};
use super::record::Resolution;
use super::table::{ColumnSchema, RawRow};
use super::text::{collapse_whitespace, normalize_key};
use super::validator::{parse_serial, CandidateRow};
use crate::rules::ReconstructionRules;
use tracing::{debug, warn};

/// College name chosen for one candidate row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub name: String,
    pub resolution: Resolution,
}

impl ResolvedName {
    fn new(name: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            name: name.into(),
            resolution,
        }
    }
}

/// The most recent full college name and where its run of records began.
/// Lives for exactly one `reconstruct` call.
#[derive(Debug, Default)]
struct Cursor {
    current: Option<String>,
    run_start: usize,
}

impl Cursor {
    fn enter(&mut self, name: String, position: usize) {
        if self.current.as_deref() != Some(name.as_str()) {
            self.run_start = position;
        }
        self.current = Some(name);
    }

    /// Completes the current name in place; the run keeps its start.
    fn extend(&mut self, name: String) {
        self.current = Some(name);
    }
}

/// Walks candidate rows in order and resolves every college-name cell to a
/// full name, carrying the last full name forward as a cursor.
pub struct NameReconstructor<'a, P: PlaceholderPolicy + ?Sized> {
    rules: &'a ReconstructionRules,
    policy: &'a P,
    context_lookback: usize,
}

impl<'a, P: PlaceholderPolicy + ?Sized> NameReconstructor<'a, P> {
    pub fn new(rules: &'a ReconstructionRules, policy: &'a P, context_lookback: usize) -> Self {
        Self {
            rules,
            policy,
            context_lookback,
        }
    }

    /// Returns one name per candidate, in candidate order. `rows` is the full
    /// raw table the candidates were taken from.
    pub fn reconstruct(
        &self,
        rows: &[RawRow],
        candidates: &[CandidateRow<'_>],
        warnings: &mut Vec<QualityWarning>,
    ) -> Vec<ResolvedName> {
        let mut cursor = Cursor::default();
        let mut resolved: Vec<ResolvedName> = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let cell = candidate.row.cell(ColumnSchema::COLLEGE);
            let name = match classify(cell, self.rules) {
                CellClass::Full(text) => {
                    cursor.enter(text.clone(), resolved.len());
                    ResolvedName::new(text, Resolution::Verbatim)
                }
                CellClass::Suffix(suffix) => self.resolve_suffix(&cursor, suffix, candidate, warnings),
                CellClass::Fragment(fragment) => self.resolve_fragment(
                    &mut cursor,
                    &mut resolved,
                    fragment,
                    rows,
                    candidate,
                    warnings,
                ),
                CellClass::Placeholder(placeholder) => {
                    self.resolve_placeholder(placeholder, candidate, warnings)
                }
                CellClass::Empty => match cursor.current.as_deref() {
                    Some(current) => ResolvedName::new(current, Resolution::Inherited),
                    None => {
                        warnings.push(QualityWarning::for_row(
                            candidate.index,
                            candidate.row.cells(),
                            WarningKind::EmptyWithoutCursor,
                        ));
                        ResolvedName::new(String::new(), Resolution::Unresolved)
                    }
                },
            };
            resolved.push(name);
        }

        resolved
    }

    fn resolve_suffix(
        &self,
        cursor: &Cursor,
        suffix: String,
        candidate: &CandidateRow<'_>,
        warnings: &mut Vec<QualityWarning>,
    ) -> ResolvedName {
        match cursor.current.as_deref() {
            Some(current) if ends_with_words(current, &suffix) => {
                ResolvedName::new(current, Resolution::Suffixed)
            }
            Some(current) => ResolvedName::new(format!("{current} {suffix}"), Resolution::Suffixed),
            None => {
                warn!(row = candidate.index, %suffix, "suffix without a preceding college");
                warnings.push(QualityWarning::for_row(
                    candidate.index,
                    candidate.row.cells(),
                    WarningKind::SuffixWithoutCursor {
                        suffix: suffix.clone(),
                    },
                ));
                ResolvedName::new(suffix, Resolution::Unresolved)
            }
        }
    }

    fn resolve_fragment(
        &self,
        cursor: &mut Cursor,
        resolved: &mut [ResolvedName],
        fragment: String,
        rows: &[RawRow],
        candidate: &CandidateRow<'_>,
        warnings: &mut Vec<QualityWarning>,
    ) -> ResolvedName {
        let current = cursor.current.clone();
        // A cursor that is already a complete listed name is never extended.
        let open = current
            .as_deref()
            .filter(|name| !self.rules.is_known_full_name(name));

        if let Some(full_name) = self.mapped_fragment(&fragment, open, rows, candidate.index) {
            match open {
                Some(open) if extends(&full_name, open) => {
                    self.complete_run(cursor, resolved, open, &full_name, Resolution::Mapped, candidate);
                    cursor.extend(full_name.clone());
                }
                _ => cursor.enter(full_name.clone(), resolved.len()),
            }
            return ResolvedName::new(full_name, Resolution::Mapped);
        }

        match current {
            Some(current) if ends_with_words(&current, &fragment) => {
                ResolvedName::new(current, Resolution::Continued)
            }
            Some(current) => {
                let completed = format!("{current} {fragment}");
                self.complete_run(cursor, resolved, &current, &completed, Resolution::Continued, candidate);
                cursor.extend(completed.clone());
                ResolvedName::new(completed, Resolution::Continued)
            }
            None => {
                warn!(row = candidate.index, %fragment, "unresolved college fragment");
                warnings.push(QualityWarning::for_row(
                    candidate.index,
                    candidate.row.cells(),
                    WarningKind::UnresolvedFragment {
                        fragment: fragment.clone(),
                    },
                ));
                ResolvedName::new(fragment, Resolution::Unresolved)
            }
        }
    }

    fn complete_run(
        &self,
        cursor: &Cursor,
        resolved: &mut [ResolvedName],
        truncated: &str,
        completed: &str,
        resolution: Resolution,
        candidate: &CandidateRow<'_>,
    ) {
        let start = cursor.run_start.min(resolved.len());
        let patched = back_patch(&mut resolved[start..], truncated, completed, resolution);
        debug!(
            row = candidate.index,
            %truncated,
            %completed,
            patched,
            "completed truncated college name"
        );
    }

    /// Full name for `fragment`.
    ///
    /// An entry whose full name continues an open cursor wins outright. Next, an
    /// entry whose context hint appears in the college cells above the row,
    /// searched no further back than the nearest preceding record. Last, the
    /// first entry without a hint.
    fn mapped_fragment(
        &self,
        fragment: &str,
        open: Option<&str>,
        rows: &[RawRow],
        index: usize,
    ) -> Option<String> {
        let entries = self.rules.fragment_rules(fragment)?;

        if let Some(current) = open {
            let continuing = entries.iter().find(|entry| {
                entry
                    .full_name
                    .as_deref()
                    .map(|full_name| extends(full_name, current))
                    .unwrap_or(false)
            });
            if let Some(entry) = continuing {
                return entry.full_name.clone();
            }
        }

        let window = context_window(rows, index, self.context_lookback);
        let contextual = entries.iter().find(|entry| {
            entry
                .context
                .as_deref()
                .map(|hint| window_mentions(window, hint))
                .unwrap_or(false)
        });
        let fallback = entries.iter().find(|entry| entry.context.is_none());

        contextual.or(fallback)?.full_name.clone()
    }

    fn resolve_placeholder(
        &self,
        placeholder: String,
        candidate: &CandidateRow<'_>,
        warnings: &mut Vec<QualityWarning>,
    ) -> ResolvedName {
        let program = collapse_whitespace(candidate.row.cell(ColumnSchema::PROGRAM));

        match self.policy.disambiguate(&placeholder, &program) {
            PlaceholderDecision::Assigned { college, keyword } => {
                debug!(row = candidate.index, %placeholder, %college, %keyword, "placeholder inferred");
                warnings.push(QualityWarning::for_row(
                    candidate.index,
                    candidate.row.cells(),
                    WarningKind::InferredPlaceholder {
                        placeholder,
                        keyword: keyword.clone(),
                        college: college.clone(),
                    },
                ));
                ResolvedName::new(college, Resolution::Inferred { keyword })
            }
            PlaceholderDecision::Ambiguous {
                college,
                keyword,
                alternatives,
            } => {
                warn!(
                    row = candidate.index,
                    %placeholder,
                    %college,
                    alternatives = alternatives.len(),
                    "ambiguous placeholder"
                );
                warnings.push(QualityWarning::for_row(
                    candidate.index,
                    candidate.row.cells(),
                    WarningKind::AmbiguousPlaceholder {
                        placeholder,
                        keyword: keyword.clone(),
                        college: college.clone(),
                        alternatives,
                    },
                ));
                ResolvedName::new(college, Resolution::Inferred { keyword })
            }
            PlaceholderDecision::NoMatch => {
                warn!(row = candidate.index, %placeholder, %program, "unresolved placeholder");
                warnings.push(QualityWarning::for_row(
                    candidate.index,
                    candidate.row.cells(),
                    WarningKind::UnresolvedPlaceholder {
                        placeholder: placeholder.clone(),
                        program,
                    },
                ));
                ResolvedName::new(placeholder, Resolution::Unresolved)
            }
        }
    }
}

/// True when `full` continues `truncated` past a word boundary.
fn extends(full: &str, truncated: &str) -> bool {
    let full = normalize_key(full);
    let truncated = normalize_key(truncated);
    full.len() > truncated.len()
        && full.starts_with(&truncated)
        && full[truncated.len()..].starts_with(' ')
}

/// True when `name` already ends with the whole words of `tail`.
fn ends_with_words(name: &str, tail: &str) -> bool {
    let name = normalize_key(name);
    let tail = normalize_key(tail);
    match name.strip_suffix(&tail) {
        Some(rest) => rest.is_empty() || rest.ends_with(' '),
        None => false,
    }
}

/// Raw rows above `index` that may describe its college: at most `lookback`
/// rows, ending at the nearest row that carries a serial number.
fn context_window(rows: &[RawRow], index: usize, lookback: usize) -> &[RawRow] {
    let floor = index.saturating_sub(lookback);
    let above = rows.get(floor..index).unwrap_or(&[]);
    match above
        .iter()
        .rposition(|row| parse_serial(row.cell(ColumnSchema::SERIAL)).is_some())
    {
        Some(nearest) => &above[nearest..],
        None => above,
    }
}

fn window_mentions(window: &[RawRow], hint: &str) -> bool {
    let hint = normalize_key(hint);
    window
        .iter()
        .any(|row| normalize_key(row.cell(ColumnSchema::COLLEGE)).contains(&hint))
}

/// Rewrites names in the current run that were built on the truncated
/// cursor. Verbatim entries take the resolution of the completing fragment.
fn back_patch(
    run: &mut [ResolvedName],
    truncated: &str,
    completed: &str,
    resolution: Resolution,
) -> usize {
    let mut patched = 0;
    for entry in run.iter_mut() {
        let Some(rest) = entry.name.strip_prefix(truncated) else {
            continue;
        };
        if !(rest.is_empty() || rest.starts_with(' ')) {
            continue;
        }
        entry.name = format!("{completed}{rest}");
        if entry.resolution == Resolution::Verbatim {
            entry.resolution = resolution.clone();
        }
        patched += 1;
    }
    patched
}
