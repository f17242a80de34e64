//! `blankkit_layout` v1:
//! Declarative sheet-layout kernel for measurement-protocol report blanks.
//!
//! Module layout:
//! - `conf`    : constants and the named style-archetype catalog
//! - `spec`    : layout specs, grid models, error types
//! - `util`    : pure geometry and name helpers
//! - `builder` : build kernel turning layouts into styled grids
//! - `presets` : the six report-sheet layout factories
//! - `writer`  : XLSX render collaborator
pub mod builder;
pub mod conf;
pub mod presets;
pub mod spec;
pub mod util;
pub mod writer;

pub use builder::{build_report_sheets, build_sheet};
pub use conf::{
    C_FONT_NAME_DEFAULT, EnumStyleArchetype, N_LEN_EXCEL_SHEET_NAME_MAX, StyleCatalog,
    TUP_EXCEL_ILLEGAL, derive_default_margins_cm,
};
pub use presets::{
    derive_all_report_layouts, derive_layout_gamma_indoor, derive_layout_gamma_outdoor,
    derive_layout_illumination, derive_layout_noise, derive_layout_radon,
    derive_layout_ventilation,
};
pub use spec::{
    EnumBorderLine, EnumMergeBorderMode, EnumPrintOrientation, LayoutError, SheetBuild,
    SheetGrid, SpecCellStyle, SpecHeaderBlock, SpecMergedRange, SpecPageMargins,
    SpecPrintSettings, SpecSheetCell, SpecSheetLayout,
};
pub use util::{cm_to_page_units, pixels_to_points, pixels_to_width_units, sanitize_sheet_name};
pub use writer::{derive_rust_xlsx_format, render_sheet, render_workbook};
