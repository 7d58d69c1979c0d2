//! Discovery of the columns that belong to a competency.
//!
//! The survey has no fixed schema: the competency, the item label and the
//! category are all encoded in the header text. The rules below are pure
//! functions of the header and the catalog entry.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::*;

static BRACKET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(.*?)\]").expect("valid bracket pattern"));

/// The content of the first `[...]` segment of a header.
pub fn bracket_content(header: &str) -> Option<&str> {
    BRACKET
        .captures(header)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// The human-readable label of a column.
///
/// `Design and Analysis - Overall Ranking` is labelled `Design and Analysis`
/// and `Sub-competencies Assessment [Design Concept]` is labelled
/// `Design Concept`.
pub fn display_label(header: &str) -> String {
    if let Some(inner) = bracket_content(header) {
        return inner.to_string();
    }
    if let Some(name) = header.strip_suffix(OVERALL_SUFFIX) {
        return name.to_string();
    }
    let prefix = format!("{} [", SUB_COMPETENCY_MARKER);
    let stripped = header.strip_prefix(prefix.as_str()).unwrap_or(header);
    stripped.strip_suffix(']').unwrap_or(stripped).to_string()
}

fn mentions(header: &str, competency: &Competency) -> bool {
    if header.contains(competency.name.as_str()) {
        return true;
    }
    let lowered = header.to_lowercase();
    competency
        .fragments
        .iter()
        .any(|f| !f.is_empty() && lowered.contains(f.to_lowercase().as_str()))
}

/// Whether the header is a column of the given kind for the competency.
pub fn matches(
    header: &str,
    competency: &Competency,
    kind: ColumnKind,
    convention: HeaderConvention,
) -> bool {
    match (kind, convention) {
        (ColumnKind::Overall, _) => header == competency.overall_column,
        (ColumnKind::SubCompetency, HeaderConvention::Bracket) => {
            header.contains(competency.name.as_str())
                && bracket_content(header).is_some()
                && !header.starts_with(RELEVANCE_PREFIX)
        }
        (ColumnKind::Relevance, HeaderConvention::Bracket) => {
            header.contains(competency.name.as_str()) && header.starts_with(RELEVANCE_PREFIX)
        }
        (ColumnKind::SubCompetency, HeaderConvention::Curated) => {
            header.contains(SUB_COMPETENCY_MARKER) && mentions(header, competency)
        }
        (ColumnKind::Relevance, HeaderConvention::Curated) => {
            header.contains(RELEVANCE_CODES_MARKER) && mentions(header, competency)
        }
    }
}

/// The columns of the given kind for the competency, in header order.
///
/// An empty result means that there is nothing to plot for this
/// competency; it is not an error.
pub fn resolve<S: AsRef<str>>(
    headers: &[S],
    competency: &Competency,
    kind: ColumnKind,
    convention: HeaderConvention,
) -> Vec<String> {
    let res: Vec<String> = headers
        .iter()
        .map(|h| h.as_ref())
        .filter(|h| matches(h, competency, kind, convention))
        .map(|h| h.to_string())
        .collect();
    debug!(
        "resolve: {:?} {:?} {:?}: {} column(s)",
        competency.name,
        kind,
        convention,
        res.len()
    );
    res
}

/// The category of a column, if it belongs to any competency of the catalog.
pub fn categorize(
    header: &str,
    catalog: &Catalog,
    convention: HeaderConvention,
) -> Option<ColumnKind> {
    [
        ColumnKind::Overall,
        ColumnKind::Relevance,
        ColumnKind::SubCompetency,
    ]
    .into_iter()
    .find(|kind| {
        catalog
            .competencies
            .iter()
            .any(|c| matches(header, c, *kind, convention))
    })
}
