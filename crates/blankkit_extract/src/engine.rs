//! Heuristic extraction engine over loaded source workbooks.
//!
//! The engine is stateless: every call walks merged regions of the matching
//! sheets, applies the rule's shape filter and content matcher, and returns
//! deduplicated values in scan order. Unmatchable inputs yield empty output,
//! never errors.

use std::collections::BTreeSet;

use crate::spec::{
    EnumValueMatcher, SpecExtractedField, SpecExtractedValue, SpecExtractionRule,
    SpecSourceDocument, SpecSourceRegion, SpecSourceSheet,
};
use crate::util::{
    contains_normalized, derive_date_regex, find_date_tokens, match_keyword_row,
    normalize_cell_text,
};

////////////////////////////////////////////////////////////////////////////////
// #region ExtractionEntryPoints

/// Apply one rule to the whole document.
///
/// Returns an empty vector when nothing matched, or a single field holding
/// every deduplicated value otherwise.
pub fn extract(document: &SpecSourceDocument, rule: &SpecExtractionRule) -> Vec<SpecExtractedField> {
    let mut l_values: Vec<SpecExtractedValue> = Vec::new();
    let mut set_seen: BTreeSet<String> = BTreeSet::new();

    // Compiled once per call, shared by every candidate region.
    let regex_date = if matches!(rule.matcher, EnumValueMatcher::DatePattern) {
        match derive_date_regex() {
            Ok(regex) => Some(regex),
            Err(err) => {
                log::warn!("date matcher disabled: {err}");
                None
            }
        }
    } else {
        None
    };

    for sheet in &document.sheets {
        if let Some(c_filter) = &rule.sheet_name_filter
            && !contains_normalized(&sheet.name, c_filter)
        {
            continue;
        }
        collect_sheet_values(sheet, rule, regex_date.as_ref(), &mut l_values, &mut set_seen);
    }

    if l_values.is_empty() {
        return Vec::new();
    }
    vec![SpecExtractedField {
        name: rule.field_name.clone(),
        values: l_values,
    }]
}

/// Apply every rule to the document, keeping the rule order.
pub fn extract_all(
    document: &SpecSourceDocument,
    rules: &[SpecExtractionRule],
) -> Vec<SpecExtractedField> {
    rules
        .iter()
        .flat_map(|rule| extract(document, rule))
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RegionScanning

fn collect_sheet_values(
    sheet: &SpecSourceSheet,
    rule: &SpecExtractionRule,
    regex_date: Option<&regex::Regex>,
    l_values: &mut Vec<SpecExtractedValue>,
    set_seen: &mut BTreeSet<String>,
) {
    let mut l_regions: Vec<SpecSourceRegion> = sheet
        .merges
        .iter()
        .copied()
        .filter(|region| rule.region_shape.matches(region))
        .collect();
    l_regions.sort_by_key(|region| (region.row_start, region.col_start));

    for region in l_regions {
        if region.row_start >= sheet.rows.len() {
            log::debug!(
                "sheet {:?}: merged region anchor ({}, {}) outside the cell grid, skipped",
                sheet.name,
                region.row_start,
                region.col_start
            );
            continue;
        }

        for c_text in apply_matcher(sheet, &region, &rule.matcher, regex_date) {
            if set_seen.insert(c_text.clone()) {
                l_values.push(SpecExtractedValue {
                    text: c_text,
                    sheet_name: sheet.name.clone(),
                    region,
                });
            }
        }
    }
}

/// Candidate texts produced by one matcher for one region.
///
/// Date and first-non-empty matchers read the region's anchor cell; the
/// keyword matcher scans the whole candidate row with the first non-empty
/// cell kept as its fallback.
fn apply_matcher(
    sheet: &SpecSourceSheet,
    region: &SpecSourceRegion,
    matcher: &EnumValueMatcher,
    regex_date: Option<&regex::Regex>,
) -> Vec<String> {
    match matcher {
        EnumValueMatcher::DatePattern => {
            let c_anchor =
                normalize_cell_text(sheet.cell_text(region.row_start, region.col_start));
            if c_anchor.is_empty() {
                return Vec::new();
            }
            match regex_date {
                Some(regex) => find_date_tokens(regex, &c_anchor),
                None => Vec::new(),
            }
        }
        EnumValueMatcher::KeywordPrefix(l_keywords) => {
            match_keyword_row(&sheet.rows[region.row_start], l_keywords)
                .into_iter()
                .collect()
        }
        EnumValueMatcher::FirstNonEmpty => {
            let c_anchor =
                normalize_cell_text(sheet.cell_text(region.row_start, region.col_start));
            if c_anchor.is_empty() {
                Vec::new()
            } else {
                vec![c_anchor]
            }
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
