//! Stateless geometry helpers shared by the build and render kernels.

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL, TUP_PX_WIDTH_OFFSET};

////////////////////////////////////////////////////////////////////////////////
// #region GeometryConversions

/// Convert a pixel column width to character-based width units.
///
/// `units = (px / 7) * 256 + TUP_PX_WIDTH_OFFSET[px % 7]`. The offset table
/// reproduces the fixed width encoding exactly for every pixel value.
pub fn pixels_to_width_units(px: u32) -> u32 {
    (px / 7) * 256 + TUP_PX_WIDTH_OFFSET[(px % 7) as usize]
}

/// Convert a pixel row height to points.
pub fn pixels_to_points(px: u32) -> f64 {
    f64::from(px) * 0.75
}

/// Convert centimeters to page units (inches) used by print margins.
pub fn cm_to_page_units(cm: f64) -> f64 {
    cm / 2.54
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to a valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels_to_width_units_matches_reference_table() {
        let tup_fixtures: [(u32, u32); 19] = [
            (19, 694),
            (20, 731),
            (30, 1097),
            (33, 1206),
            (46, 1682),
            (48, 1755),
            (62, 2267),
            (74, 2706),
            (82, 2998),
            (88, 3218),
            (96, 3510),
            (99, 3620),
            (193, 7058),
            (231, 8448),
            (245, 8960),
            (259, 9472),
            (380, 13897),
            (485, 17737),
            (550, 20114),
        ];
        for (n_px, n_units) in tup_fixtures {
            assert_eq!(pixels_to_width_units(n_px), n_units, "px={n_px}");
        }
    }

    #[test]
    fn pixels_to_width_units_formula_shape() {
        assert_eq!(
            pixels_to_width_units(33),
            (33 / 7) * 256 + TUP_PX_WIDTH_OFFSET[33 % 7]
        );
        assert_eq!(pixels_to_width_units(0), 0);
    }

    #[test]
    fn pixels_to_points_is_three_quarters() {
        assert_eq!(pixels_to_points(20), 15.0);
        assert_eq!(pixels_to_points(0), 0.0);
    }

    #[test]
    fn cm_to_page_units_is_inches() {
        assert_eq!(cm_to_page_units(2.54), 1.0);
        assert_eq!(cm_to_page_units(0.0), 0.0);
    }

    #[test]
    fn sanitize_sheet_name_replaces_illegal_and_caps_length() {
        assert_eq!(sanitize_sheet_name("a/b:c", "_"), "a_b_c");
        assert_eq!(sanitize_sheet_name("   ", "_"), "Sheet");
        let c_long = "x".repeat(40);
        assert_eq!(sanitize_sheet_name(&c_long, "_").chars().count(), 31);
    }
}
