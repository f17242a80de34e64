//! Companion handoff-document assembly: one document per grouping value.

use std::collections::BTreeMap;
use std::fmt;

use blankkit_layout::conf::N_ROW_HEIGHT_DEFAULT_PX;
use blankkit_layout::{
    EnumBorderLine, EnumMergeBorderMode, EnumPrintOrientation, EnumStyleArchetype, SheetGrid,
    SpecCellStyle, SpecMergedRange, SpecPageMargins, SpecPrintSettings, StyleCatalog,
    cm_to_page_units, derive_default_margins_cm, pixels_to_width_units, render_workbook,
};

use crate::spec::SpecAssemblyError;

/// Column headers of the handoff table.
pub const TUP_COMPANION_HEADERS: [&str; 6] = [
    "№ п/п",
    "Объект",
    "Дата измерений",
    "Исполнитель",
    "Средство измерений",
    "Подпись",
];

const TUP_COMPANION_WIDTHS_PX: [u32; 6] = [33, 193, 99, 99, 193, 62];

////////////////////////////////////////////////////////////////////////////////
// #region AssemblyModels

/// Shared context duplicated into every assembled document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecHandoffContext {
    /// Measured object or site name.
    pub object_name: String,
    /// Performing specialist.
    pub performer: String,
    /// Measurement dates, already formatted.
    pub measurement_dates: Vec<String>,
    /// Instruments used, one table row each.
    pub instruments: Vec<String>,
}

/// One vertical merge over data rows (0-based, data-row relative).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecCompanionMerge {
    /// Table column.
    pub col: usize,
    /// First data row.
    pub row_start: usize,
    /// Last data row (inclusive).
    pub row_end: usize,
}

/// One assembled handoff document, still data-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCompanionDocument {
    /// Document title line.
    pub title: String,
    /// Grouping value the document belongs to ("" for the blank group).
    pub grouping_value: String,
    /// Unique output identity derived from the title base and grouping.
    pub output_identity: String,
    /// Column headers.
    pub headers: Vec<String>,
    /// Data rows.
    pub rows: Vec<Vec<String>>,
    /// Vertical merges over data rows.
    pub merges_vertical: Vec<SpecCompanionMerge>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region AssemblyReport

/// Aggregate counters and diagnostics for one assembly-and-write run.
#[derive(Debug, Default, Clone)]
pub struct ReportAssembly {
    /// Number of documents requested (one per grouping value).
    pub cnt_requested: u64,
    /// Number of documents rendered to bytes.
    pub cnt_rendered: u64,
    /// Number of documents that failed to render.
    pub cnt_failed: u64,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
    /// Per-document failures.
    pub errors: Vec<SpecAssemblyError>,
}

impl ReportAssembly {
    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_requested".to_string(), self.cnt_requested);
        dict_counts.insert("cnt_rendered".to_string(), self.cnt_rendered);
        dict_counts.insert("cnt_failed".to_string(), self.cnt_failed);
        dict_counts.insert("cnt_errors".to_string(), self.errors.len() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warnings.len() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} requested={} rendered={} failed={} errors={} warnings={}",
            dict_counts["cnt_requested"],
            dict_counts["cnt_rendered"],
            dict_counts["cnt_failed"],
            dict_counts["cnt_errors"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportAssembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[ASSEMBLE]"))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DocumentAssembly

/// Output identity for one document of an assembly batch.
///
/// A non-blank grouping value names the document directly; blank groupings in
/// a multi-document batch fall back to a 1-based ordinal suffix so identities
/// stay unique. A single blank grouping keeps the bare base.
pub fn derive_output_identity(
    base: &str,
    grouping: &str,
    n_ordinal_1based: usize,
    n_total: usize,
) -> String {
    if !grouping.trim().is_empty() {
        return format!("{base} {}", grouping.trim());
    }
    if n_total > 1 {
        return format!("{base} {n_ordinal_1based}");
    }
    base.to_string()
}

/// Assemble one handoff document per grouping value with the default
/// identity policy.
///
/// An empty grouping list still yields one document for the blank group.
pub fn assemble_companion_documents(
    ctx: &SpecHandoffContext,
    title_base: &str,
    grouping_values: &[String],
) -> Vec<SpecCompanionDocument> {
    assemble_companion_documents_with(ctx, title_base, grouping_values, |c_grouping, n_ordinal, n_total| {
        derive_output_identity(title_base, c_grouping, n_ordinal, n_total)
    })
}

/// Assemble with a caller-supplied identity resolver
/// `(grouping, ordinal_1based, total) -> identity`, so path and filename
/// policy can stay outside this crate.
pub fn assemble_companion_documents_with(
    ctx: &SpecHandoffContext,
    title_base: &str,
    grouping_values: &[String],
    resolve_identity: impl Fn(&str, usize, usize) -> String,
) -> Vec<SpecCompanionDocument> {
    let l_groupings: Vec<String> = if grouping_values.is_empty() {
        vec![String::new()]
    } else {
        grouping_values.to_vec()
    };
    let n_total = l_groupings.len();

    l_groupings
        .iter()
        .enumerate()
        .map(|(n_idx, c_grouping)| {
            derive_companion_document(
                ctx,
                title_base,
                c_grouping,
                resolve_identity(c_grouping, n_idx + 1, n_total),
            )
        })
        .collect()
}

fn derive_companion_document(
    ctx: &SpecHandoffContext,
    title_base: &str,
    grouping: &str,
    output_identity: String,
) -> SpecCompanionDocument {
    let c_dates = ctx.measurement_dates.join(", ");
    let n_rows = usize::max(1, ctx.instruments.len());

    let mut l_rows = Vec::with_capacity(n_rows);
    for n_idx in 0..n_rows {
        l_rows.push(vec![
            (n_idx + 1).to_string(),
            ctx.object_name.clone(),
            c_dates.clone(),
            ctx.performer.clone(),
            ctx.instruments.get(n_idx).cloned().unwrap_or_default(),
            String::new(),
        ]);
    }

    // Shared-context columns collapse into one merged cell per document.
    let l_merges_vertical = if n_rows > 1 {
        [1usize, 2, 3, 5]
            .iter()
            .map(|n_col| SpecCompanionMerge {
                col: *n_col,
                row_start: 0,
                row_end: n_rows - 1,
            })
            .collect()
    } else {
        Vec::new()
    };

    SpecCompanionDocument {
        title: title_base.to_string(),
        grouping_value: grouping.to_string(),
        output_identity,
        headers: TUP_COMPANION_HEADERS.iter().map(ToString::to_string).collect(),
        rows: l_rows,
        merges_vertical: l_merges_vertical,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DocumentRendering

/// Render every document to xlsx bytes, isolating per-document failures.
///
/// Returns `(identity, bytes)` pairs for the documents that rendered, plus
/// the run report with counters and collected errors.
pub fn write_companion_documents(
    documents: &[SpecCompanionDocument],
) -> (Vec<(String, Vec<u8>)>, ReportAssembly) {
    let mut report = ReportAssembly {
        cnt_requested: documents.len() as u64,
        ..ReportAssembly::default()
    };
    let mut l_outputs = Vec::with_capacity(documents.len());

    for document in documents {
        match render_companion_document(document) {
            Ok(v_bytes) => {
                report.cnt_rendered += 1;
                l_outputs.push((document.output_identity.clone(), v_bytes));
            }
            Err(exception) => {
                log::warn!(
                    "companion document {:?} not rendered: {exception}",
                    document.output_identity
                );
                report.cnt_failed += 1;
                report.errors.push(SpecAssemblyError {
                    identity: document.output_identity.clone(),
                    exception,
                });
            }
        }
    }

    (l_outputs, report)
}

fn render_companion_document(document: &SpecCompanionDocument) -> Result<Vec<u8>, String> {
    let grid = derive_companion_grid(document).map_err(|err| err.to_string())?;
    render_workbook(&[grid])
}

fn derive_companion_grid(
    document: &SpecCompanionDocument,
) -> Result<SheetGrid, blankkit_layout::LayoutError> {
    let catalog = StyleCatalog::new();
    let n_cols = document.headers.len();
    let margins_cm = derive_default_margins_cm();

    let mut grid = SheetGrid {
        sheet_name: document.output_identity.clone(),
        cells: BTreeMap::new(),
        merges: Vec::new(),
        widths_px_by_col: TUP_COMPANION_WIDTHS_PX.to_vec(),
        widths_units_by_col: TUP_COMPANION_WIDTHS_PX
            .iter()
            .map(|n_px| pixels_to_width_units(*n_px))
            .collect(),
        row_height_default_px: N_ROW_HEIGHT_DEFAULT_PX,
        heights_px_by_row: BTreeMap::from([(0, 30u32)]),
        print: SpecPrintSettings {
            orientation: EnumPrintOrientation::Landscape,
            n_fit_width: 1,
            n_fit_height: 0,
            margins_in: SpecPageMargins {
                left: cm_to_page_units(margins_cm.left),
                right: cm_to_page_units(margins_cm.right),
                top: cm_to_page_units(margins_cm.top),
                bottom: cm_to_page_units(margins_cm.bottom),
            },
        },
    };

    let style_title = catalog.style_for(EnumStyleArchetype::Title)?;
    let style_header = catalog.style_for(EnumStyleArchetype::HeaderHorizontal)?;
    let style_cell = catalog.variant(
        &style_header,
        SpecCellStyle {
            top: Some(EnumBorderLine::Thin),
            bottom: Some(EnumBorderLine::Thin),
            left: Some(EnumBorderLine::Thin),
            right: Some(EnumBorderLine::Thin),
            ..Default::default()
        },
    );

    // Row 0: title across all columns.
    grid.set_cell(0, 0, document.title.clone(), style_title.clone());
    for n_col in 1..n_cols {
        grid.set_cell(0, n_col, String::new(), style_title.clone());
    }
    if n_cols > 1 {
        grid.register_merge(SpecMergedRange {
            row_start: 0,
            row_end: 0,
            col_start: 0,
            col_end: n_cols - 1,
            rule_border: EnumMergeBorderMode::None,
        })?;
    }

    // Row 1: column headers.
    for (n_col, c_header) in document.headers.iter().enumerate() {
        grid.set_cell(1, n_col, c_header.clone(), style_cell.clone());
    }

    // Rows 2..: data rows, then the shared-context vertical merges.
    let n_row_data_start = 2;
    for (n_row, l_row) in document.rows.iter().enumerate() {
        for (n_col, c_text) in l_row.iter().enumerate() {
            grid.set_cell(n_row_data_start + n_row, n_col, c_text.clone(), style_cell.clone());
        }
    }
    for merge in &document.merges_vertical {
        grid.register_merge(SpecMergedRange {
            row_start: n_row_data_start + merge.row_start,
            row_end: n_row_data_start + merge.row_end,
            col_start: merge.col,
            col_end: merge.col,
            rule_border: EnumMergeBorderMode::Perimeter,
        })?;
    }

    Ok(grid)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
