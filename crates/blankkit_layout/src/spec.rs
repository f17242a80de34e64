//! Shared sheet-layout specification models and top-level error types.

use std::collections::BTreeMap;
use std::fmt;

////////////////////////////////////////////////////////////////////////////////
// #region CellStyleSpecification

/// Border line kind for one cell edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumBorderLine {
    /// No printed border.
    None,
    /// Thin solid border.
    Thin,
}

/// Cell style descriptor cloned from a named archetype and patched per use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellStyle {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Text wrap.
    pub text_wrap: Option<bool>,
    /// Text rotation in degrees (0 or 90).
    pub rotation: Option<i16>,

    /// Top border edge.
    pub top: Option<EnumBorderLine>,
    /// Bottom border edge.
    pub bottom: Option<EnumBorderLine>,
    /// Left border edge.
    pub left: Option<EnumBorderLine>,
    /// Right border edge.
    pub right: Option<EnumBorderLine>,
}

impl SpecCellStyle {
    /// Return a new style by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellStyle) -> SpecCellStyle {
        self.merge(&patch)
    }

    /// Merge two styles with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellStyle) -> SpecCellStyle {
        SpecCellStyle {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            text_wrap: other.text_wrap.or(self.text_wrap),
            rotation: other.rotation.or(self.rotation),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            left: other.left.or(self.left),
            right: other.right.or(self.right),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetLayoutSpecification

/// Page orientation for print setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumPrintOrientation {
    /// Landscape page orientation.
    Landscape,
    /// Portrait page orientation.
    Portrait,
}

/// Page margins. Unit depends on context: centimeters in
/// [`SpecSheetLayout`], inches in [`SpecPrintSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpecPageMargins {
    /// Left margin.
    pub left: f64,
    /// Right margin.
    pub right: f64,
    /// Top margin.
    pub top: f64,
    /// Bottom margin.
    pub bottom: f64,
}

/// One declarative title/header cell or merged region.
///
/// Coordinates are 0-based and inclusive. A block whose children are
/// non-empty is a column group: the children's column spans must exactly
/// partition the parent's span, and the parent's own cell occupies the rows
/// above the topmost child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecHeaderBlock {
    /// First grid row of the block.
    pub row_start: usize,
    /// Last grid row of the block (inclusive).
    pub row_end: usize,
    /// First grid column of the block.
    pub col_start: usize,
    /// Last grid column of the block (inclusive).
    pub col_end: usize,
    /// Display text written to the block's top-left cell.
    pub text: String,
    /// Named style archetype applied to every covered cell.
    pub archetype: crate::conf::EnumStyleArchetype,
    /// Child blocks partitioning this block's column span.
    pub children: Vec<SpecHeaderBlock>,
}

impl SpecHeaderBlock {
    /// Leaf block covering `rows` x `cols` (inclusive bounds) with no children.
    pub fn leaf(
        rows: (usize, usize),
        cols: (usize, usize),
        text: &str,
        archetype: crate::conf::EnumStyleArchetype,
    ) -> Self {
        Self {
            row_start: rows.0,
            row_end: rows.1,
            col_start: cols.0,
            col_end: cols.1,
            text: text.to_string(),
            archetype,
            children: Vec::new(),
        }
    }

    /// Column-group block with child blocks.
    pub fn group(
        rows: (usize, usize),
        cols: (usize, usize),
        text: &str,
        archetype: crate::conf::EnumStyleArchetype,
        children: Vec<SpecHeaderBlock>,
    ) -> Self {
        Self {
            children,
            ..Self::leaf(rows, cols, text, archetype)
        }
    }
}

/// Full declarative description of one report sheet. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetLayout {
    /// Sheet name (sanitized at render time).
    pub sheet_name: String,
    /// Top-level header blocks in reading order.
    pub blocks: Vec<SpecHeaderBlock>,
    /// Column widths in pixels, one entry per grid column.
    pub widths_px_by_col: Vec<u32>,
    /// Default row height in pixels.
    pub row_height_default_px: u32,
    /// Per-row height overrides in pixels.
    pub heights_px_by_row: BTreeMap<usize, u32>,
    /// Print orientation.
    pub orientation: EnumPrintOrientation,
    /// Page margins in centimeters.
    pub margins_cm: SpecPageMargins,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetGridModel

/// Border treatment recorded for one merged range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumMergeBorderMode {
    /// Merge without borders (title rows).
    None,
    /// Thin border around the region perimeter (header cells).
    Perimeter,
    /// Bottom edge only (instruction lines with a fill-in placeholder).
    BottomOnly,
}

/// One merged rectangular range, 0-based inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecMergedRange {
    /// First row of the range.
    pub row_start: usize,
    /// Last row of the range (inclusive).
    pub row_end: usize,
    /// First column of the range.
    pub col_start: usize,
    /// Last column of the range (inclusive).
    pub col_end: usize,
    /// Border treatment for the whole range.
    pub rule_border: EnumMergeBorderMode,
}

impl SpecMergedRange {
    /// Whether two ranges share at least one cell.
    pub fn intersects(&self, other: &SpecMergedRange) -> bool {
        self.row_start <= other.row_end
            && other.row_start <= self.row_end
            && self.col_start <= other.col_end
            && other.col_start <= self.col_end
    }
}

/// One populated grid cell: display text plus resolved style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetCell {
    /// Display text ("" for styled-but-empty cells).
    pub text: String,
    /// Resolved cell style.
    pub style: SpecCellStyle,
}

/// Print setup carried by a built sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecPrintSettings {
    /// Page orientation.
    pub orientation: EnumPrintOrientation,
    /// Fit-to-page width in pages (1 = fit all columns on one page).
    pub n_fit_width: u16,
    /// Fit-to-page height in pages (0 = unbounded).
    pub n_fit_height: u16,
    /// Page margins in inches.
    pub margins_in: SpecPageMargins,
}

/// Fully built sheet model handed to the render collaborator.
///
/// Owned exclusively by the build call that created it; the grid itself
/// performs no I/O.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    /// Sheet name.
    pub sheet_name: String,
    /// Sparse cell grid keyed by `(row, col)`.
    pub cells: BTreeMap<(usize, usize), SpecSheetCell>,
    /// Merged ranges, pairwise non-overlapping.
    pub merges: Vec<SpecMergedRange>,
    /// Column widths in pixels.
    pub widths_px_by_col: Vec<u32>,
    /// Column widths in character width units (see `pixels_to_width_units`).
    pub widths_units_by_col: Vec<u32>,
    /// Default row height in pixels.
    pub row_height_default_px: u32,
    /// Per-row height overrides in pixels.
    pub heights_px_by_row: BTreeMap<usize, u32>,
    /// Print setup.
    pub print: SpecPrintSettings,
}

impl SheetGrid {
    /// Set cell text + style at `(row, col)`.
    pub fn set_cell(&mut self, row: usize, col: usize, text: String, style: SpecCellStyle) {
        self.cells.insert((row, col), SpecSheetCell { text, style });
    }

    /// Register a merged range, rejecting overlap with existing ranges.
    pub fn register_merge(&mut self, range: SpecMergedRange) -> Result<(), LayoutError> {
        if let Some(existing) = self.merges.iter().find(|m| m.intersects(&range)) {
            return Err(LayoutError::MergeOverlap {
                first: *existing,
                second: range,
            });
        }
        self.merges.push(range);
        Ok(())
    }

    /// Last grid row carrying any cell, or `None` for an empty grid.
    pub fn row_max(&self) -> Option<usize> {
        self.cells.keys().map(|(row, _)| *row).max()
    }
}

/// Result of one sheet build: the grid plus the first free data row.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetBuild {
    /// Built sheet model.
    pub grid: SheetGrid,
    /// First row index below all emitted header content.
    pub row_data_start: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// "Build call failed" errors (layout validation stage).
///
/// Raised before any cell is written, so a failed build never leaves a
/// partially populated grid behind.
#[derive(Debug)]
pub enum LayoutError {
    /// Style archetype name not present in the catalog.
    UnknownArchetype(String),
    /// Block bounds are inverted (`end < start`).
    InvalidBlockGeometry {
        /// Block display text.
        text: String,
        /// `(row_start, row_end, col_start, col_end)` as declared.
        bounds: (usize, usize, usize, usize),
    },
    /// Block columns exceed the declared column-width table.
    BlockOutsideWidthTable {
        /// Block display text.
        text: String,
        /// Last block column (inclusive).
        col_end: usize,
        /// Declared column count.
        n_cols: usize,
    },
    /// Two top-level blocks cover a common cell.
    BlocksOverlap {
        /// First block text.
        text_first: String,
        /// Second block text.
        text_second: String,
    },
    /// Child block rows fall outside the parent block rows.
    ChildRowsOutsideParent {
        /// Parent block text.
        text_parent: String,
        /// Child block text.
        text_child: String,
    },
    /// Children column spans do not partition the parent span exactly.
    ChildrenNotPartitioning {
        /// Parent block text.
        text_parent: String,
        /// Gap/overlap description.
        detail: String,
    },
    /// Group block text has no row of its own above its children.
    GroupRowConsumed {
        /// Parent block text.
        text_parent: String,
    },
    /// Two merged ranges cover a common cell.
    MergeOverlap {
        /// Previously registered range.
        first: SpecMergedRange,
        /// Rejected range.
        second: SpecMergedRange,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownArchetype(name) => {
                write!(f, "Unknown style archetype: {name:?}")
            }
            Self::InvalidBlockGeometry { text, bounds } => {
                write!(
                    f,
                    "Invalid block geometry for {text:?}: rows/cols {bounds:?} must satisfy end >= start"
                )
            }
            Self::BlockOutsideWidthTable {
                text,
                col_end,
                n_cols,
            } => write!(
                f,
                "Block {text:?} ends at column {col_end} but only {n_cols} column widths are declared"
            ),
            Self::BlocksOverlap {
                text_first,
                text_second,
            } => write!(
                f,
                "Top-level blocks overlap: {text_first:?} and {text_second:?}"
            ),
            Self::ChildRowsOutsideParent {
                text_parent,
                text_child,
            } => write!(
                f,
                "Child block {text_child:?} rows fall outside parent {text_parent:?}"
            ),
            Self::ChildrenNotPartitioning {
                text_parent,
                detail,
            } => write!(
                f,
                "Children of {text_parent:?} do not partition its column span: {detail}"
            ),
            Self::GroupRowConsumed { text_parent } => write!(
                f,
                "Group block {text_parent:?} has text but its children start at its first row"
            ),
            Self::MergeOverlap { first, second } => write!(
                f,
                "Merged ranges overlap: {first:?} and {second:?}"
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

// #endregion
////////////////////////////////////////////////////////////////////////////////
