//! Source-document models and extraction rule specifications.

use std::fmt;

////////////////////////////////////////////////////////////////////////////////
// #region SourceDocumentModel

/// One merged rectangular region of a source sheet, 0-based inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecSourceRegion {
    /// First row of the region.
    pub row_start: usize,
    /// Last row of the region (inclusive).
    pub row_end: usize,
    /// First column of the region.
    pub col_start: usize,
    /// Last column of the region (inclusive).
    pub col_end: usize,
}

impl SpecSourceRegion {
    /// Number of rows covered by the region.
    pub fn n_rows(&self) -> usize {
        self.row_end.saturating_sub(self.row_start) + 1
    }

    /// Number of columns covered by the region.
    pub fn n_cols(&self) -> usize {
        self.col_end.saturating_sub(self.col_start) + 1
    }
}

/// One loaded source sheet: cell texts plus its merged regions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecSourceSheet {
    /// Sheet name as stored in the workbook.
    pub name: String,
    /// Dense cell text grid (rows of columns); empty cells hold "".
    pub rows: Vec<Vec<String>>,
    /// Merged regions in workbook order.
    pub merges: Vec<SpecSourceRegion>,
}

impl SpecSourceSheet {
    /// Cell text at `(row, col)`, or `""` when out of the stored grid.
    pub fn cell_text(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|l_row| l_row.get(col))
            .map_or("", String::as_str)
    }
}

/// A fully loaded source workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecSourceDocument {
    /// Sheets in workbook order.
    pub sheets: Vec<SpecSourceSheet>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExtractionRuleSpecification

/// Geometric filter describing which merged regions a rule inspects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecRegionShape {
    /// Only consider single-row regions.
    pub if_single_row: bool,
    /// Required first column of the region, if any.
    pub col_start_required: Option<usize>,
    /// Minimum column span (inclusive width) of the region.
    pub span_cols_min: usize,
}

impl SpecRegionShape {
    /// Whether a merged region satisfies this shape filter.
    pub fn matches(&self, region: &SpecSourceRegion) -> bool {
        if self.if_single_row && region.n_rows() != 1 {
            return false;
        }
        if let Some(n_col) = self.col_start_required
            && region.col_start != n_col
        {
            return false;
        }
        region.n_cols() >= self.span_cols_min
    }
}

/// Content matcher applied to the anchor text of a candidate region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumValueMatcher {
    /// Collect all date tokens (`d.m.yy` / `dd.mm.yyyy`) found in the text.
    DatePattern,
    /// Keep text after the first matching keyword prefix; keywords are
    /// tried in declaration order, case-insensitively.
    KeywordPrefix(Vec<String>),
    /// Take the first non-empty anchor text as-is.
    FirstNonEmpty,
}

/// One named extraction rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExtractionRule {
    /// Output field name.
    pub field_name: String,
    /// Case-insensitive substring filter on sheet names; `None` = all sheets.
    pub sheet_name_filter: Option<String>,
    /// Geometric region filter.
    pub region_shape: SpecRegionShape,
    /// Content matcher.
    pub matcher: EnumValueMatcher,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExtractionOutput

/// One extracted value with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExtractedValue {
    /// Normalized extracted text.
    pub text: String,
    /// Source sheet name.
    pub sheet_name: String,
    /// Source merged region the value came from.
    pub region: SpecSourceRegion,
}

/// One extracted field: a name plus its deduplicated values in scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExtractedField {
    /// Field name from the rule.
    pub name: String,
    /// Extracted values, first occurrence order, duplicates removed.
    pub values: Vec<SpecExtractedValue>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// One per-document assembly failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAssemblyError {
    /// Output identity of the failed document.
    pub identity: String,
    /// Error message text.
    pub exception: String,
}

impl fmt::Display for SpecAssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.identity, self.exception)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_shape_filters_by_rows_column_and_span() {
        let shape = SpecRegionShape {
            if_single_row: true,
            col_start_required: Some(0),
            span_cols_min: 4,
        };
        let region_good = SpecSourceRegion {
            row_start: 3,
            row_end: 3,
            col_start: 0,
            col_end: 5,
        };
        assert!(shape.matches(&region_good));

        let region_tall = SpecSourceRegion {
            row_end: 4,
            ..region_good
        };
        assert!(!shape.matches(&region_tall));

        let region_shifted = SpecSourceRegion {
            col_start: 1,
            ..region_good
        };
        assert!(!shape.matches(&region_shifted));

        let region_narrow = SpecSourceRegion {
            col_end: 2,
            ..region_good
        };
        assert!(!shape.matches(&region_narrow));
    }

    #[test]
    fn cell_text_is_total_over_out_of_grid_coordinates() {
        let sheet = SpecSourceSheet {
            name: "Лист1".to_string(),
            rows: vec![vec!["а".to_string(), "б".to_string()]],
            merges: Vec::new(),
        };
        assert_eq!(sheet.cell_text(0, 1), "б");
        assert_eq!(sheet.cell_text(0, 9), "");
        assert_eq!(sheet.cell_text(9, 0), "");
    }
}
