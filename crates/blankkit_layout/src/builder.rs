//! Sheet build kernel: one declarative layout in, one styled grid out.
//!
//! Every report type shares this single algorithm; report types differ only
//! in the [`SpecSheetLayout`] data they pass in (see `presets`).

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::conf::{EnumStyleArchetype, StyleCatalog};
use crate::spec::{
    EnumBorderLine, EnumMergeBorderMode, LayoutError, SheetBuild, SheetGrid, SpecCellStyle,
    SpecHeaderBlock, SpecMergedRange, SpecPrintSettings, SpecSheetLayout,
};
use crate::util::{cm_to_page_units, pixels_to_width_units};

////////////////////////////////////////////////////////////////////////////////
// #region BuildEntryPoints

/// Build one sheet from one layout, deterministically.
///
/// The style catalog is created fresh per call: no style state is shared
/// between builds, so repeated calls with an identical layout yield
/// structurally identical grids.
///
/// Steps:
/// 1. Validate the whole layout before any cell is written.
/// 2. Apply sheet-wide defaults (widths, heights, print setup).
/// 3. Materialize header blocks recursively (text, styles, merges, borders).
/// 4. Emit the numbered footer row under the deepest header row.
///
/// Returns the grid plus the first free row where data rows may begin.
pub fn build_sheet(layout: &SpecSheetLayout) -> Result<SheetBuild, LayoutError> {
    validate_layout(layout)?;

    let catalog = StyleCatalog::new();
    let mut grid = derive_empty_grid(layout);

    for block in &layout.blocks {
        materialize_block(&mut grid, block, &catalog)?;
    }

    let n_row_numbers = derive_row_below_blocks(&layout.blocks);
    let n_cols = derive_block_column_count(&layout.blocks);
    emit_numbered_row(&mut grid, n_row_numbers, n_cols, &catalog)?;

    Ok(SheetBuild {
        grid,
        row_data_start: n_row_numbers + 1,
    })
}

/// Build several independent report sheets in one batch.
///
/// Builds share no mutable state, so the batch runs on the rayon pool; the
/// output order matches the input order.
pub fn build_report_sheets(layouts: &[SpecSheetLayout]) -> Result<Vec<SheetBuild>, LayoutError> {
    layouts.par_iter().map(build_sheet).collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LayoutValidation

fn validate_layout(layout: &SpecSheetLayout) -> Result<(), LayoutError> {
    for block in &layout.blocks {
        validate_block_tree(block, layout.widths_px_by_col.len())?;
    }

    for (n_idx, block_first) in layout.blocks.iter().enumerate() {
        for block_second in layout.blocks.iter().skip(n_idx + 1) {
            let range_first = derive_block_extent(block_first);
            let range_second = derive_block_extent(block_second);
            if range_first.intersects(&range_second) {
                return Err(LayoutError::BlocksOverlap {
                    text_first: block_first.text.clone(),
                    text_second: block_second.text.clone(),
                });
            }
        }
    }

    Ok(())
}

fn validate_block_tree(block: &SpecHeaderBlock, n_cols: usize) -> Result<(), LayoutError> {
    if block.row_end < block.row_start || block.col_end < block.col_start {
        return Err(LayoutError::InvalidBlockGeometry {
            text: block.text.clone(),
            bounds: (block.row_start, block.row_end, block.col_start, block.col_end),
        });
    }
    if block.col_end >= n_cols {
        return Err(LayoutError::BlockOutsideWidthTable {
            text: block.text.clone(),
            col_end: block.col_end,
            n_cols,
        });
    }

    if block.children.is_empty() {
        return Ok(());
    }

    let mut l_children_sorted: Vec<&SpecHeaderBlock> = block.children.iter().collect();
    l_children_sorted.sort_by_key(|child| child.col_start);

    let mut n_col_expected = block.col_start;
    for child in &l_children_sorted {
        if child.row_start < block.row_start || child.row_end > block.row_end {
            return Err(LayoutError::ChildRowsOutsideParent {
                text_parent: block.text.clone(),
                text_child: child.text.clone(),
            });
        }
        if child.col_start != n_col_expected {
            return Err(LayoutError::ChildrenNotPartitioning {
                text_parent: block.text.clone(),
                detail: format!(
                    "expected child starting at column {n_col_expected}, found {:?} at {}",
                    child.text, child.col_start
                ),
            });
        }
        n_col_expected = child.col_end + 1;
    }
    if n_col_expected != block.col_end + 1 {
        return Err(LayoutError::ChildrenNotPartitioning {
            text_parent: block.text.clone(),
            detail: format!(
                "children end at column {}, parent ends at {}",
                n_col_expected - 1,
                block.col_end
            ),
        });
    }

    let n_row_child_min = derive_child_row_min(block);
    if n_row_child_min == block.row_start && !block.text.is_empty() {
        return Err(LayoutError::GroupRowConsumed {
            text_parent: block.text.clone(),
        });
    }

    for child in &block.children {
        validate_block_tree(child, n_cols)?;
    }
    Ok(())
}

fn derive_block_extent(block: &SpecHeaderBlock) -> SpecMergedRange {
    SpecMergedRange {
        row_start: block.row_start,
        row_end: block.row_end,
        col_start: block.col_start,
        col_end: block.col_end,
        rule_border: EnumMergeBorderMode::None,
    }
}

fn derive_child_row_min(block: &SpecHeaderBlock) -> usize {
    block
        .children
        .iter()
        .map(|child| child.row_start)
        .min()
        .unwrap_or(block.row_start)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region BlockMaterialization

fn derive_empty_grid(layout: &SpecSheetLayout) -> SheetGrid {
    SheetGrid {
        sheet_name: layout.sheet_name.clone(),
        cells: BTreeMap::new(),
        merges: Vec::new(),
        widths_px_by_col: layout.widths_px_by_col.clone(),
        widths_units_by_col: layout
            .widths_px_by_col
            .iter()
            .map(|n_px| pixels_to_width_units(*n_px))
            .collect(),
        row_height_default_px: layout.row_height_default_px,
        heights_px_by_row: layout.heights_px_by_row.clone(),
        print: SpecPrintSettings {
            orientation: layout.orientation,
            n_fit_width: 1,
            n_fit_height: 0,
            margins_in: crate::spec::SpecPageMargins {
                left: cm_to_page_units(layout.margins_cm.left),
                right: cm_to_page_units(layout.margins_cm.right),
                top: cm_to_page_units(layout.margins_cm.top),
                bottom: cm_to_page_units(layout.margins_cm.bottom),
            },
        },
    }
}

fn materialize_block(
    grid: &mut SheetGrid,
    block: &SpecHeaderBlock,
    catalog: &StyleCatalog,
) -> Result<(), LayoutError> {
    // A group's own cell occupies the rows above its topmost child; a group
    // whose children start at its first row contributes no cell of its own.
    let n_row_own_end = if block.children.is_empty() {
        Some(block.row_end)
    } else {
        let n_row_child_min = derive_child_row_min(block);
        (n_row_child_min > block.row_start).then(|| n_row_child_min - 1)
    };

    if let Some(n_row_end) = n_row_own_end {
        apply_region(
            grid,
            block.row_start,
            n_row_end,
            block.col_start,
            block.col_end,
            &block.text,
            block.archetype,
            catalog,
        )?;
    }

    for child in &block.children {
        materialize_block(grid, child, catalog)?;
    }
    Ok(())
}

/// Write text + styles for one rectangular region and register its merge.
///
/// Single-cell regions go through the same path as multi-cell regions and
/// produce no merge registration.
#[allow(clippy::too_many_arguments)]
fn apply_region(
    grid: &mut SheetGrid,
    row_start: usize,
    row_end: usize,
    col_start: usize,
    col_end: usize,
    text: &str,
    archetype: EnumStyleArchetype,
    catalog: &StyleCatalog,
) -> Result<(), LayoutError> {
    let style_base = catalog.style_for(archetype)?;
    let rule_border = derive_merge_border_mode(archetype);

    for n_row in row_start..=row_end {
        for n_col in col_start..=col_end {
            let style_cell = derive_cell_edge_style(
                catalog,
                &style_base,
                rule_border,
                n_row == row_start,
                n_row == row_end,
                n_col == col_start,
                n_col == col_end,
            );
            let c_text = if n_row == row_start && n_col == col_start {
                text.to_string()
            } else {
                String::new()
            };
            grid.set_cell(n_row, n_col, c_text, style_cell);
        }
    }

    if row_start < row_end || col_start < col_end {
        grid.register_merge(SpecMergedRange {
            row_start,
            row_end,
            col_start,
            col_end,
            rule_border,
        })?;
    }
    Ok(())
}

fn derive_merge_border_mode(archetype: EnumStyleArchetype) -> EnumMergeBorderMode {
    match archetype {
        EnumStyleArchetype::Title => EnumMergeBorderMode::None,
        EnumStyleArchetype::InstructionLine => EnumMergeBorderMode::BottomOnly,
        EnumStyleArchetype::HeaderHorizontal
        | EnumStyleArchetype::HeaderVertical
        | EnumStyleArchetype::HeaderNumbered => EnumMergeBorderMode::Perimeter,
    }
}

/// Per-cell border variant for one covered cell of a region.
///
/// Perimeter regions carry thin edges on their outer cells only, so adjacent
/// sibling regions render as internal gridlines between their own perimeters.
fn derive_cell_edge_style(
    catalog: &StyleCatalog,
    style_base: &SpecCellStyle,
    rule_border: EnumMergeBorderMode,
    if_top: bool,
    if_bottom: bool,
    if_left: bool,
    if_right: bool,
) -> SpecCellStyle {
    match rule_border {
        EnumMergeBorderMode::None => style_base.clone(),
        // Instruction-line archetype already carries its bottom edge.
        EnumMergeBorderMode::BottomOnly => style_base.clone(),
        EnumMergeBorderMode::Perimeter => catalog.variant(
            style_base,
            SpecCellStyle {
                top: if_top.then_some(EnumBorderLine::Thin),
                bottom: if_bottom.then_some(EnumBorderLine::Thin),
                left: if_left.then_some(EnumBorderLine::Thin),
                right: if_right.then_some(EnumBorderLine::Thin),
                ..Default::default()
            },
        ),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region NumberedFooterRow

fn derive_row_below_blocks(blocks: &[SpecHeaderBlock]) -> usize {
    blocks
        .iter()
        .map(|block| block.row_end)
        .max()
        .map_or(0, |n_row| n_row + 1)
}

fn derive_block_column_count(blocks: &[SpecHeaderBlock]) -> usize {
    blocks
        .iter()
        .map(|block| block.col_end)
        .max()
        .map_or(0, |n_col| n_col + 1)
}

fn emit_numbered_row(
    grid: &mut SheetGrid,
    n_row: usize,
    n_cols: usize,
    catalog: &StyleCatalog,
) -> Result<(), LayoutError> {
    for n_col in 0..n_cols {
        apply_region(
            grid,
            n_row,
            n_row,
            n_col,
            n_col,
            &(n_col + 1).to_string(),
            EnumStyleArchetype::HeaderNumbered,
            catalog,
        )?;
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{N_ROW_HEIGHT_DEFAULT_PX, derive_default_margins_cm};
    use crate::spec::EnumPrintOrientation;

    fn derive_test_layout() -> SpecSheetLayout {
        SpecSheetLayout {
            sheet_name: "Проба".to_string(),
            blocks: vec![
                SpecHeaderBlock::leaf((0, 0), (0, 3), "Заголовок", EnumStyleArchetype::Title),
                SpecHeaderBlock::leaf((1, 2), (0, 0), "№ п/п", EnumStyleArchetype::HeaderHorizontal),
                SpecHeaderBlock::group(
                    (1, 2),
                    (1, 2),
                    "Группа",
                    EnumStyleArchetype::HeaderHorizontal,
                    vec![
                        SpecHeaderBlock::leaf((2, 2), (1, 1), "а", EnumStyleArchetype::HeaderHorizontal),
                        SpecHeaderBlock::leaf((2, 2), (2, 2), "б", EnumStyleArchetype::HeaderHorizontal),
                    ],
                ),
                SpecHeaderBlock::leaf((1, 2), (3, 3), "Вывод", EnumStyleArchetype::HeaderVertical),
            ],
            widths_px_by_col: vec![33, 82, 82, 96],
            row_height_default_px: N_ROW_HEIGHT_DEFAULT_PX,
            heights_px_by_row: BTreeMap::new(),
            orientation: EnumPrintOrientation::Landscape,
            margins_cm: derive_default_margins_cm(),
        }
    }

    #[test]
    fn built_merges_never_overlap() {
        let build = build_sheet(&derive_test_layout()).unwrap();
        let l_merges = &build.grid.merges;
        for (n_idx, range_first) in l_merges.iter().enumerate() {
            for range_second in l_merges.iter().skip(n_idx + 1) {
                assert!(
                    !range_first.intersects(range_second),
                    "{range_first:?} overlaps {range_second:?}"
                );
            }
        }
    }

    #[test]
    fn group_own_cell_sits_above_children() {
        let build = build_sheet(&derive_test_layout()).unwrap();
        assert_eq!(build.grid.cells[&(1, 1)].text, "Группа");
        assert_eq!(build.grid.cells[&(2, 1)].text, "а");
        assert_eq!(build.grid.cells[&(2, 2)].text, "б");
        assert!(
            build
                .grid
                .merges
                .contains(&SpecMergedRange {
                    row_start: 1,
                    row_end: 1,
                    col_start: 1,
                    col_end: 2,
                    rule_border: EnumMergeBorderMode::Perimeter,
                })
        );
    }

    #[test]
    fn title_merge_carries_no_borders() {
        let build = build_sheet(&derive_test_layout()).unwrap();
        let range_title = build
            .grid
            .merges
            .iter()
            .find(|m| m.row_start == 0)
            .unwrap();
        assert_eq!(range_title.rule_border, EnumMergeBorderMode::None);
        let cell_title = &build.grid.cells[&(0, 0)];
        assert_eq!(cell_title.style.top, None);
        assert_eq!(cell_title.style.bottom, None);
    }

    #[test]
    fn perimeter_borders_follow_region_edges() {
        let build = build_sheet(&derive_test_layout()).unwrap();
        // "№ п/п" spans rows 1..=2 in column 0.
        let cell_top = &build.grid.cells[&(1, 0)];
        assert_eq!(cell_top.style.top, Some(EnumBorderLine::Thin));
        assert_eq!(cell_top.style.bottom, None);
        let cell_bottom = &build.grid.cells[&(2, 0)];
        assert_eq!(cell_bottom.style.top, None);
        assert_eq!(cell_bottom.style.bottom, Some(EnumBorderLine::Thin));
    }

    #[test]
    fn numbered_row_sits_under_deepest_header() {
        let build = build_sheet(&derive_test_layout()).unwrap();
        for n_col in 0..4 {
            assert_eq!(build.grid.cells[&(3, n_col)].text, (n_col + 1).to_string());
            assert_eq!(build.grid.cells[&(3, n_col)].style.text_wrap, Some(false));
        }
        assert_eq!(build.row_data_start, 4);
    }

    #[test]
    fn single_cell_block_produces_no_merge() {
        let layout = SpecSheetLayout {
            blocks: vec![SpecHeaderBlock::leaf(
                (0, 0),
                (0, 0),
                "Одна ячейка",
                EnumStyleArchetype::HeaderHorizontal,
            )],
            widths_px_by_col: vec![82],
            ..derive_test_layout()
        };
        let build = build_sheet(&layout).unwrap();
        assert!(build.grid.merges.is_empty());
        assert_eq!(build.grid.cells[&(0, 0)].text, "Одна ячейка");
        // Single cell keeps the full perimeter on every edge.
        assert_eq!(build.grid.cells[&(0, 0)].style.left, Some(EnumBorderLine::Thin));
        assert_eq!(build.grid.cells[&(0, 0)].style.right, Some(EnumBorderLine::Thin));
    }

    #[test]
    fn children_partition_gap_is_rejected_before_writes() {
        let mut layout = derive_test_layout();
        // Break the partition: second child shifted right, leaving a gap.
        layout.blocks[2].children[1].col_start = 3;
        layout.blocks[2].children[1].col_end = 3;
        let result = build_sheet(&layout);
        assert!(matches!(
            result,
            Err(LayoutError::ChildrenNotPartitioning { .. })
        ));
    }

    #[test]
    fn overlapping_top_level_blocks_are_rejected() {
        let mut layout = derive_test_layout();
        layout.blocks[1].col_end = 1;
        let result = build_sheet(&layout);
        assert!(matches!(result, Err(LayoutError::BlocksOverlap { .. })));
    }

    #[test]
    fn build_is_idempotent_for_identical_layouts() {
        let layout = derive_test_layout();
        let build_first = build_sheet(&layout).unwrap();
        let build_second = build_sheet(&layout).unwrap();
        assert_eq!(build_first, build_second);
    }

    #[test]
    fn batch_build_preserves_input_order() {
        let layout_first = derive_test_layout();
        let mut layout_second = derive_test_layout();
        layout_second.sheet_name = "Вторая".to_string();
        let l_builds = build_report_sheets(&[layout_first, layout_second]).unwrap();
        assert_eq!(l_builds[0].grid.sheet_name, "Проба");
        assert_eq!(l_builds[1].grid.sheet_name, "Вторая");
    }

    #[test]
    fn width_units_are_derived_from_pixels() {
        let build = build_sheet(&derive_test_layout()).unwrap();
        assert_eq!(build.grid.widths_units_by_col[0], 1206); // 33 px
        assert_eq!(build.grid.widths_units_by_col[1], 2998); // 82 px
    }
}
