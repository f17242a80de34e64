//! Source workbook loading backed by `calamine`.

use std::path::Path;

use calamine::{Data, Dimensions, Range, Reader, Xlsx, open_workbook};

use crate::spec::{SpecSourceDocument, SpecSourceRegion, SpecSourceSheet};

////////////////////////////////////////////////////////////////////////////////
// #region DocumentLoading

/// Load a source workbook, degrading to an empty document on failure.
///
/// Extraction over a missing or unreadable source must yield empty fields,
/// not an error, so the failure is logged and swallowed here.
pub fn load_source_document(path: &Path) -> SpecSourceDocument {
    match try_load_source_document(path) {
        Ok(document) => document,
        Err(err) => {
            log::warn!("source workbook {} not loaded: {err}", path.display());
            SpecSourceDocument::default()
        }
    }
}

/// Load a source workbook or report why it could not be read.
pub fn try_load_source_document(path: &Path) -> Result<SpecSourceDocument, String> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|err| format!("failed to open workbook: {err}"))?;
    workbook
        .load_merged_regions()
        .map_err(|err| format!("failed to load merged regions: {err}"))?;

    let l_sheet_names = workbook.sheet_names();
    let mut l_sheets = Vec::with_capacity(l_sheet_names.len());
    for c_name in &l_sheet_names {
        let range = workbook
            .worksheet_range(c_name)
            .map_err(|err| format!("failed to read sheet {c_name:?}: {err}"))?;
        let l_merges = workbook
            .worksheet_merge_cells(c_name)
            .unwrap_or(Ok(Vec::new()))
            .unwrap_or_default();

        l_sheets.push(SpecSourceSheet {
            name: c_name.clone(),
            rows: derive_cell_grid(&range),
            merges: l_merges.iter().map(derive_source_region).collect(),
        });
    }

    Ok(SpecSourceDocument { sheets: l_sheets })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RangeConversion

/// Densify the used range into an absolute-coordinate text grid.
///
/// `calamine` ranges start at the first used cell; merged-region coordinates
/// are absolute, so the grid is padded back to the sheet origin.
fn derive_cell_grid(range: &Range<Data>) -> Vec<Vec<String>> {
    let Some((n_row_off, n_col_off)) = range.start() else {
        return Vec::new();
    };
    let n_row_off = n_row_off as usize;
    let n_col_off = n_col_off as usize;

    let mut l_rows: Vec<Vec<String>> = vec![Vec::new(); n_row_off];
    for l_range_row in range.rows() {
        let mut l_row = vec![String::new(); n_col_off];
        l_row.extend(l_range_row.iter().map(derive_cell_text));
        l_rows.push(l_row);
    }
    l_rows
}

fn derive_cell_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        _ => data.to_string(),
    }
}

fn derive_source_region(dimensions: &Dimensions) -> SpecSourceRegion {
    SpecSourceRegion {
        row_start: dimensions.start.0 as usize,
        row_end: dimensions.end.0 as usize,
        col_start: dimensions.start.1 as usize,
        col_end: dimensions.end.1 as usize,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_workbook_degrades_to_empty_document() {
        let path = PathBuf::from("/nonexistent/работа.xlsx");
        let document = load_source_document(&path);
        assert!(document.sheets.is_empty());
        assert!(try_load_source_document(&path).is_err());
    }

    #[test]
    fn dimensions_map_to_zero_based_inclusive_regions() {
        let region = derive_source_region(&Dimensions {
            start: (3, 0),
            end: (3, 5),
        });
        assert_eq!(
            region,
            SpecSourceRegion {
                row_start: 3,
                row_end: 3,
                col_start: 0,
                col_end: 5,
            }
        );
    }

    #[test]
    fn cell_grid_is_padded_back_to_the_sheet_origin() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("Заказчик: ООО «Тест»".to_string()));
        range.set_value((3, 2), Data::Float(42.0));
        let l_rows = derive_cell_grid(&range);
        assert_eq!(l_rows.len(), 4);
        assert!(l_rows[0].is_empty());
        assert_eq!(l_rows[2][1], "Заказчик: ООО «Тест»");
        assert_eq!(l_rows[3][2], "42");
        assert_eq!(l_rows[2][0], "");
    }
}
