//! XLSX render collaborator: serializes built sheet grids into a workbook.
//!
//! Rendering consumes [`SheetGrid`] values only; all layout decisions were
//! already made by the build kernel, so this module maps the model onto
//! worksheet calls one-to-one.

use std::collections::BTreeSet;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::spec::{
    EnumBorderLine, EnumMergeBorderMode, EnumPrintOrientation, SheetGrid, SpecCellStyle,
    SpecMergedRange,
};
use crate::util::sanitize_sheet_name;

////////////////////////////////////////////////////////////////////////////////
// #region SheetRendering

/// Render one built grid as a new worksheet in `workbook`.
pub fn render_sheet(workbook: &mut Workbook, grid: &SheetGrid) -> Result<(), String> {
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sanitize_sheet_name(&grid.sheet_name, "_"))
        .map_err(derive_xlsx_error_text)?;

    apply_column_widths(worksheet, grid)?;
    apply_row_heights(worksheet, grid)?;

    let set_covered = derive_merge_covered_cells(&grid.merges);
    for range in &grid.merges {
        write_merged_range(worksheet, grid, range)?;
    }
    for ((n_row, n_col), cell) in &grid.cells {
        if set_covered.contains(&(*n_row, *n_col)) {
            continue;
        }
        let fmt_cell = derive_rust_xlsx_format(&cell.style);
        if cell.text.is_empty() {
            worksheet
                .write_blank(cast_row_num(*n_row)?, cast_col_num(*n_col)?, &fmt_cell)
                .map_err(derive_xlsx_error_text)?;
        } else {
            worksheet
                .write_string_with_format(
                    cast_row_num(*n_row)?,
                    cast_col_num(*n_col)?,
                    &cell.text,
                    &fmt_cell,
                )
                .map_err(derive_xlsx_error_text)?;
        }
    }

    apply_print_settings(worksheet, grid);
    Ok(())
}

/// Render several grids into one fresh workbook and return the xlsx bytes.
pub fn render_workbook(grids: &[SheetGrid]) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();
    for grid in grids {
        render_sheet(&mut workbook, grid)?;
    }
    workbook.save_to_buffer().map_err(derive_xlsx_error_text)
}

fn apply_column_widths(worksheet: &mut Worksheet, grid: &SheetGrid) -> Result<(), String> {
    for (n_col, n_px) in grid.widths_px_by_col.iter().enumerate() {
        worksheet
            .set_column_width_pixels(cast_col_num(n_col)?, cast_px_num(*n_px)?)
            .map_err(derive_xlsx_error_text)?;
    }
    Ok(())
}

fn apply_row_heights(worksheet: &mut Worksheet, grid: &SheetGrid) -> Result<(), String> {
    let Some(n_row_max) = grid.row_max() else {
        return Ok(());
    };
    for n_row in 0..=n_row_max {
        let n_px = grid
            .heights_px_by_row
            .get(&n_row)
            .copied()
            .unwrap_or(grid.row_height_default_px);
        worksheet
            .set_row_height_pixels(cast_row_num(n_row)?, cast_px_num(n_px)?)
            .map_err(derive_xlsx_error_text)?;
    }
    Ok(())
}

fn write_merged_range(
    worksheet: &mut Worksheet,
    grid: &SheetGrid,
    range: &SpecMergedRange,
) -> Result<(), String> {
    let anchor = (range.row_start, range.col_start);
    let Some(cell_anchor) = grid.cells.get(&anchor) else {
        return Err(format!(
            "merged range {range:?} has no anchor cell in the grid"
        ));
    };

    // The merge format applies to every covered cell, so the per-cell edge
    // variants collapse into one style whose borders follow the range mode.
    let style_range = derive_merge_style(&cell_anchor.style, range.rule_border);
    let fmt_range = derive_rust_xlsx_format(&style_range);
    worksheet
        .merge_range(
            cast_row_num(range.row_start)?,
            cast_col_num(range.col_start)?,
            cast_row_num(range.row_end)?,
            cast_col_num(range.col_end)?,
            &cell_anchor.text,
            &fmt_range,
        )
        .map_err(derive_xlsx_error_text)?;
    Ok(())
}

fn derive_merge_style(style_anchor: &SpecCellStyle, rule_border: EnumMergeBorderMode) -> SpecCellStyle {
    let mut style = style_anchor.clone();
    match rule_border {
        EnumMergeBorderMode::None => {
            style.top = None;
            style.bottom = None;
            style.left = None;
            style.right = None;
        }
        EnumMergeBorderMode::Perimeter => {
            style.top = Some(EnumBorderLine::Thin);
            style.bottom = Some(EnumBorderLine::Thin);
            style.left = Some(EnumBorderLine::Thin);
            style.right = Some(EnumBorderLine::Thin);
        }
        EnumMergeBorderMode::BottomOnly => {
            style.top = None;
            style.left = None;
            style.right = None;
            style.bottom = Some(EnumBorderLine::Thin);
        }
    }
    style
}

fn derive_merge_covered_cells(merges: &[SpecMergedRange]) -> BTreeSet<(usize, usize)> {
    let mut set_covered = BTreeSet::new();
    for range in merges {
        for n_row in range.row_start..=range.row_end {
            for n_col in range.col_start..=range.col_end {
                set_covered.insert((n_row, n_col));
            }
        }
    }
    set_covered
}

fn apply_print_settings(worksheet: &mut Worksheet, grid: &SheetGrid) {
    match grid.print.orientation {
        EnumPrintOrientation::Landscape => worksheet.set_landscape(),
        EnumPrintOrientation::Portrait => worksheet.set_portrait(),
    };
    worksheet.set_print_fit_to_pages(grid.print.n_fit_width, grid.print.n_fit_height);
    // Header/footer margins stay at the worksheet defaults (-1.0).
    worksheet.set_margins(
        grid.print.margins_in.left,
        grid.print.margins_in.right,
        grid.print.margins_in.top,
        grid.print.margins_in.bottom,
        -1.0,
        -1.0,
    );
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FormatDerivation

/// Map a style descriptor onto a `rust_xlsxwriter` format.
pub fn derive_rust_xlsx_format(style: &SpecCellStyle) -> Format {
    let mut format = Format::new();

    if let Some(val) = &style.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = style.font_size {
        format = format.set_font_size(val as f64);
    }
    if style.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if let Some(val) = &style.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &style.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if style.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }
    if let Some(val) = style.rotation
        && val != 0
    {
        format = format.set_rotation(val);
    }

    if let Some(val) = style.top {
        format = format.set_border_top(derive_format_border(val));
    }
    if let Some(val) = style.bottom {
        format = format.set_border_bottom(derive_format_border(val));
    }
    if let Some(val) = style.left {
        format = format.set_border_left(derive_format_border(val));
    }
    if let Some(val) = style.right {
        format = format.set_border_right(derive_format_border(val));
    }

    format
}

fn derive_format_border(line: EnumBorderLine) -> FormatBorder {
    match line {
        EnumBorderLine::None => FormatBorder::None,
        EnumBorderLine::Thin => FormatBorder::Thin,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "justify" => Some(FormatAlign::Justify),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region NumericCasts

/// Cast a 0-based row index to the worksheet row type.
pub fn cast_row_num(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

/// Cast a 0-based column index to the worksheet column type.
pub fn cast_col_num(value: usize) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

fn cast_px_num(value: u32) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("pixel size overflow: {value}"))
}

/// Flatten a library error into the boundary error text.
pub fn derive_xlsx_error_text(err: XlsxError) -> String {
    format!("xlsx write error: {err}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_sheet;
    use crate::presets::derive_layout_radon;

    #[test]
    fn render_workbook_produces_xlsx_bytes() {
        let build = build_sheet(&derive_layout_radon()).unwrap();
        let v_bytes = render_workbook(&[build.grid]).unwrap();
        // xlsx is a zip container; check the local file header magic.
        assert_eq!(&v_bytes[..2], b"PK");
    }

    #[test]
    fn print_setup_with_explicit_margins_renders() {
        let mut build = build_sheet(&derive_layout_radon()).unwrap();
        build.grid.print.orientation = EnumPrintOrientation::Portrait;
        build.grid.print.margins_in = crate::spec::SpecPageMargins {
            left: 0.59,
            right: 0.39,
            top: 0.79,
            bottom: 0.39,
        };
        let v_bytes = render_workbook(&[build.grid]).unwrap();
        assert_eq!(&v_bytes[..2], b"PK");
    }

    #[test]
    fn merge_covered_cells_span_whole_ranges() {
        let set_covered = derive_merge_covered_cells(&[SpecMergedRange {
            row_start: 0,
            row_end: 1,
            col_start: 2,
            col_end: 3,
            rule_border: EnumMergeBorderMode::Perimeter,
        }]);
        assert_eq!(set_covered.len(), 4);
        assert!(set_covered.contains(&(1, 3)));
        assert!(!set_covered.contains(&(2, 2)));
    }

    #[test]
    fn merge_style_follows_border_mode() {
        let style_anchor = SpecCellStyle {
            top: Some(EnumBorderLine::Thin),
            left: Some(EnumBorderLine::Thin),
            ..Default::default()
        };
        let style_none = derive_merge_style(&style_anchor, EnumMergeBorderMode::None);
        assert_eq!(style_none.top, None);
        assert_eq!(style_none.left, None);

        let style_bottom = derive_merge_style(&style_anchor, EnumMergeBorderMode::BottomOnly);
        assert_eq!(style_bottom.bottom, Some(EnumBorderLine::Thin));
        assert_eq!(style_bottom.top, None);
    }

    #[test]
    fn casts_reject_out_of_range_indices() {
        assert!(cast_col_num(usize::from(u16::MAX) + 1).is_err());
        assert_eq!(cast_row_num(5).unwrap(), 5);
    }
}
