//! Layout constants and the named style-archetype catalog.

use std::collections::BTreeMap;

use crate::spec::{EnumBorderLine, LayoutError, SpecCellStyle, SpecPageMargins};

/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Pixel remainder offsets of the character-based column-width encoding.
/// Index is `px % 7`; the encoding is exact, not approximate.
pub const TUP_PX_WIDTH_OFFSET: [u32; 7] = [0, 36, 73, 109, 146, 182, 219];

/// Font family used by all report-sheet archetypes.
pub const C_FONT_NAME_DEFAULT: &str = "Times New Roman";
/// Body/header font size in points.
pub const N_FONT_SIZE_DEFAULT: i64 = 10;
/// Title font size in points.
pub const N_FONT_SIZE_TITLE: i64 = 12;
/// Default row height in pixels when a layout declares no override.
pub const N_ROW_HEIGHT_DEFAULT_PX: u32 = 20;

/// Default page margins for report sheets, centimeters.
pub const fn derive_default_margins_cm() -> SpecPageMargins {
    SpecPageMargins {
        left: 1.5,
        right: 1.0,
        top: 2.0,
        bottom: 1.0,
    }
}

/// Canonical style archetype keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumStyleArchetype {
    /// Sheet title line, merged without borders.
    Title,
    /// Horizontal header cell with thin perimeter.
    HeaderHorizontal,
    /// Vertical (rotated 90°) header cell with thin perimeter.
    HeaderVertical,
    /// Numbered footer cell: header variant with wrap off.
    HeaderNumbered,
    /// Free-text instruction line with a bottom border only.
    InstructionLine,
}

impl EnumStyleArchetype {
    /// Catalog lookup key for this archetype.
    pub fn key(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::HeaderHorizontal => "header-horizontal",
            Self::HeaderVertical => "header-vertical",
            Self::HeaderNumbered => "header-numbered",
            Self::InstructionLine => "instruction-line",
        }
    }
}

/// Read-only catalog of named style archetypes.
///
/// Built fresh per sheet build so later adjustment of one sheet's styles can
/// never leak into another sheet.
#[derive(Debug, Clone)]
pub struct StyleCatalog {
    dict_styles: BTreeMap<String, SpecCellStyle>,
}

impl StyleCatalog {
    /// Build the catalog with all named archetypes.
    pub fn new() -> Self {
        Self {
            dict_styles: derive_archetype_styles(),
        }
    }

    /// Look up an archetype by name.
    pub fn archetype(&self, name: &str) -> Result<SpecCellStyle, LayoutError> {
        self.dict_styles
            .get(name)
            .cloned()
            .ok_or_else(|| LayoutError::UnknownArchetype(name.to_string()))
    }

    /// Typed archetype lookup.
    pub fn style_for(&self, archetype: EnumStyleArchetype) -> Result<SpecCellStyle, LayoutError> {
        self.archetype(archetype.key())
    }

    /// Clone-and-patch: returns a new style, never mutates `base`.
    pub fn variant(&self, base: &SpecCellStyle, patch: SpecCellStyle) -> SpecCellStyle {
        base.with_(patch)
    }
}

impl Default for StyleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the named archetype presets used by [`StyleCatalog`].
fn derive_archetype_styles() -> BTreeMap<String, SpecCellStyle> {
    let cfg_base_style = SpecCellStyle {
        font_name: Some(C_FONT_NAME_DEFAULT.to_string()),
        font_size: Some(N_FONT_SIZE_DEFAULT),
        bold: Some(false),
        align: Some("center".to_string()),
        valign: Some("vcenter".to_string()),
        text_wrap: Some(true),
        rotation: Some(0),
        ..Default::default()
    };

    let style_header_horizontal = cfg_base_style.clone();

    let mut dict_styles = BTreeMap::new();
    dict_styles.insert(
        EnumStyleArchetype::Title.key().to_string(),
        cfg_base_style.with_(SpecCellStyle {
            font_size: Some(N_FONT_SIZE_TITLE),
            bold: Some(true),
            ..Default::default()
        }),
    );
    dict_styles.insert(
        EnumStyleArchetype::HeaderHorizontal.key().to_string(),
        style_header_horizontal.clone(),
    );
    dict_styles.insert(
        EnumStyleArchetype::HeaderVertical.key().to_string(),
        style_header_horizontal.with_(SpecCellStyle {
            rotation: Some(90),
            ..Default::default()
        }),
    );
    // The numbered footer is the header archetype with wrap switched off.
    dict_styles.insert(
        EnumStyleArchetype::HeaderNumbered.key().to_string(),
        style_header_horizontal.with_(SpecCellStyle {
            text_wrap: Some(false),
            ..Default::default()
        }),
    );
    dict_styles.insert(
        EnumStyleArchetype::InstructionLine.key().to_string(),
        cfg_base_style.with_(SpecCellStyle {
            align: Some("left".to_string()),
            bottom: Some(EnumBorderLine::Thin),
            ..Default::default()
        }),
    );

    dict_styles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archetype_lookup_is_structural_and_repeatable() {
        let catalog = StyleCatalog::new();
        let style_first = catalog.archetype("header-horizontal").unwrap();
        let style_second = catalog.archetype("header-horizontal").unwrap();
        assert_eq!(style_first, style_second);
    }

    #[test]
    fn unknown_archetype_name_is_rejected() {
        let catalog = StyleCatalog::new();
        let result = catalog.archetype("header-diagonal");
        assert!(matches!(result, Err(LayoutError::UnknownArchetype(_))));
    }

    #[test]
    fn variant_patches_without_mutating_base() {
        let catalog = StyleCatalog::new();
        let base = catalog.style_for(EnumStyleArchetype::HeaderHorizontal).unwrap();
        let patched = catalog.variant(
            &base,
            SpecCellStyle {
                text_wrap: Some(false),
                ..Default::default()
            },
        );
        assert_eq!(base.text_wrap, Some(true));
        assert_eq!(patched.text_wrap, Some(false));
        assert_eq!(patched.font_name, base.font_name);
    }

    #[test]
    fn numbered_archetype_is_header_with_wrap_off() {
        let catalog = StyleCatalog::new();
        let header = catalog.style_for(EnumStyleArchetype::HeaderHorizontal).unwrap();
        let numbered = catalog.style_for(EnumStyleArchetype::HeaderNumbered).unwrap();
        assert_eq!(
            numbered,
            header.with_(SpecCellStyle {
                text_wrap: Some(false),
                ..Default::default()
            })
        );
    }

    #[test]
    fn vertical_archetype_rotates_ninety_degrees() {
        let catalog = StyleCatalog::new();
        let vertical = catalog.style_for(EnumStyleArchetype::HeaderVertical).unwrap();
        assert_eq!(vertical.rotation, Some(90));
    }
}
