//! Extraction constants: date token pattern, keyword tables, default rules.

use crate::spec::{EnumValueMatcher, SpecExtractionRule, SpecRegionShape};

/// Date token: `d.m.yy` through `dd.mm.yyyy`, bounded on both sides.
pub const C_PATTERN_DATE: &str = r"\b\d{1,2}\.\d{1,2}\.\d{2,4}\b";

/// Keyword prefixes marking the customer-name line, in priority order.
pub const TUP_KEYWORDS_CUSTOMER: [&str; 2] = ["наименование заказчика", "заказчик"];
/// Keyword prefixes marking the protocol-number line.
pub const TUP_KEYWORDS_PROTOCOL: [&str; 3] = ["№ протокола", "номер протокола", "протокол №"];
/// Keyword prefixes marking the application-number line.
pub const TUP_KEYWORDS_APPLICATION: [&str; 3] = ["№ заявки", "номер заявки", "заявка"];

/// Minimum column span for a merged region to count as a header line.
/// Narrow merges are table cells, not document header lines.
pub const N_SPAN_COLS_MIN_DEFAULT: usize = 4;

fn derive_header_line_shape() -> SpecRegionShape {
    SpecRegionShape {
        if_single_row: true,
        col_start_required: Some(0),
        span_cols_min: N_SPAN_COLS_MIN_DEFAULT,
    }
}

/// Default rule set for measurement protocol workbooks.
pub fn derive_default_extraction_rules() -> Vec<SpecExtractionRule> {
    vec![
        SpecExtractionRule {
            field_name: "customer".to_string(),
            sheet_name_filter: None,
            region_shape: derive_header_line_shape(),
            matcher: EnumValueMatcher::KeywordPrefix(
                TUP_KEYWORDS_CUSTOMER.iter().map(ToString::to_string).collect(),
            ),
        },
        SpecExtractionRule {
            field_name: "protocol_no".to_string(),
            sheet_name_filter: None,
            region_shape: derive_header_line_shape(),
            matcher: EnumValueMatcher::KeywordPrefix(
                TUP_KEYWORDS_PROTOCOL.iter().map(ToString::to_string).collect(),
            ),
        },
        SpecExtractionRule {
            field_name: "application_no".to_string(),
            sheet_name_filter: None,
            region_shape: derive_header_line_shape(),
            matcher: EnumValueMatcher::KeywordPrefix(
                TUP_KEYWORDS_APPLICATION.iter().map(ToString::to_string).collect(),
            ),
        },
        SpecExtractionRule {
            field_name: "measurement_dates".to_string(),
            sheet_name_filter: None,
            region_shape: derive_header_line_shape(),
            matcher: EnumValueMatcher::DatePattern,
        },
    ]
}
