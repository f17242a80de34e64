//! `blankkit_extract` v1:
//! Heuristic field extraction from existing protocol workbooks plus
//! companion handoff-document assembly.
//!
//! Module layout:
//! - `conf`     : date pattern, keyword tables, default rule set
//! - `spec`     : source models, rules, extraction output, errors
//! - `util`     : pure text matching helpers
//! - `loader`   : `calamine`-backed workbook loading
//! - `engine`   : stateless merged-region extraction engine
//! - `assemble` : companion-document assembly and rendering
pub mod assemble;
pub mod conf;
pub mod engine;
pub mod loader;
pub mod spec;
pub mod util;

pub use assemble::{
    ReportAssembly, SpecCompanionDocument, SpecCompanionMerge, SpecHandoffContext,
    TUP_COMPANION_HEADERS, assemble_companion_documents, assemble_companion_documents_with,
    derive_output_identity, write_companion_documents,
};
pub use conf::{
    C_PATTERN_DATE, N_SPAN_COLS_MIN_DEFAULT, TUP_KEYWORDS_APPLICATION, TUP_KEYWORDS_CUSTOMER,
    TUP_KEYWORDS_PROTOCOL, derive_default_extraction_rules,
};
pub use engine::{extract, extract_all};
pub use loader::{load_source_document, try_load_source_document};
pub use spec::{
    EnumValueMatcher, SpecAssemblyError, SpecExtractedField, SpecExtractedValue,
    SpecExtractionRule, SpecRegionShape, SpecSourceDocument, SpecSourceRegion, SpecSourceSheet,
};
pub use util::{
    contains_normalized, derive_date_regex, find_date_tokens, match_keyword_prefix,
    match_keyword_row, normalize_cell_text, strip_keyword_prefix,
};
