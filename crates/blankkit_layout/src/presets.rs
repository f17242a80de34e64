//! Declarative layouts for the six regulated report-sheet types.
//!
//! Every factory returns data only; the shared build kernel in `builder`
//! turns each layout into a styled grid. Texts and column widths follow the
//! established wording of the measurement protocol forms.

use std::collections::BTreeMap;

use crate::conf::{
    EnumStyleArchetype, N_ROW_HEIGHT_DEFAULT_PX, derive_default_margins_cm,
};
use crate::spec::{EnumPrintOrientation, SpecHeaderBlock, SpecSheetLayout};

fn derive_layout_base(sheet_name: &str, widths_px_by_col: Vec<u32>) -> SpecSheetLayout {
    SpecSheetLayout {
        sheet_name: sheet_name.to_string(),
        blocks: Vec::new(),
        widths_px_by_col,
        row_height_default_px: N_ROW_HEIGHT_DEFAULT_PX,
        heights_px_by_row: BTreeMap::new(),
        orientation: EnumPrintOrientation::Landscape,
        margins_cm: derive_default_margins_cm(),
    }
}

/// Radon EEC protocol table.
pub fn derive_layout_radon() -> SpecSheetLayout {
    let mut layout = derive_layout_base("ЭРОА радона", vec![33, 193, 82, 82, 74, 96]);
    layout.blocks = vec![
        SpecHeaderBlock::leaf(
            (0, 0),
            (0, 5),
            "Результаты измерений ЭРОА изотопов радона",
            EnumStyleArchetype::Title,
        ),
        SpecHeaderBlock::leaf((1, 2), (0, 0), "№ п/п", EnumStyleArchetype::HeaderHorizontal),
        SpecHeaderBlock::leaf(
            (1, 2),
            (1, 1),
            "Место проведения измерений",
            EnumStyleArchetype::HeaderHorizontal,
        ),
        SpecHeaderBlock::group(
            (1, 2),
            (2, 3),
            "ЭРОА радона, Бк/м³",
            EnumStyleArchetype::HeaderHorizontal,
            vec![
                SpecHeaderBlock::leaf(
                    (2, 2),
                    (2, 2),
                    "измеренное значение",
                    EnumStyleArchetype::HeaderHorizontal,
                ),
                SpecHeaderBlock::leaf(
                    (2, 2),
                    (3, 3),
                    "расширенная неопределённость",
                    EnumStyleArchetype::HeaderHorizontal,
                ),
            ],
        ),
        SpecHeaderBlock::leaf(
            (1, 2),
            (4, 4),
            "Допустимый уровень, Бк/м³",
            EnumStyleArchetype::HeaderHorizontal,
        ),
        SpecHeaderBlock::leaf(
            (1, 2),
            (5, 5),
            "Вывод о соответствии",
            EnumStyleArchetype::HeaderHorizontal,
        ),
    ];
    layout.heights_px_by_row = BTreeMap::from([(0, 30), (1, 48), (2, 64)]);
    layout
}

/// Gamma dose-rate table for indoor measurement points.
pub fn derive_layout_gamma_indoor() -> SpecSheetLayout {
    let mut layout = derive_layout_base(
        "МЭД в помещениях",
        vec![33, 193, 30, 82, 82, 74, 96],
    );
    layout.blocks = vec![
        SpecHeaderBlock::leaf(
            (0, 0),
            (0, 6),
            "Результаты измерений МЭД гамма-излучения в помещениях",
            EnumStyleArchetype::Title,
        ),
        SpecHeaderBlock::leaf((1, 2), (0, 0), "№ п/п", EnumStyleArchetype::HeaderHorizontal),
        SpecHeaderBlock::leaf(
            (1, 2),
            (1, 1),
            "Наименование помещения",
            EnumStyleArchetype::HeaderHorizontal,
        ),
        SpecHeaderBlock::leaf((1, 2), (2, 2), "Этаж", EnumStyleArchetype::HeaderVertical),
        SpecHeaderBlock::group(
            (1, 2),
            (3, 4),
            "МЭД гамма-излучения, мкЗв/ч",
            EnumStyleArchetype::HeaderHorizontal,
            vec![
                SpecHeaderBlock::leaf(
                    (2, 2),
                    (3, 3),
                    "измеренное значение",
                    EnumStyleArchetype::HeaderHorizontal,
                ),
                SpecHeaderBlock::leaf(
                    (2, 2),
                    (4, 4),
                    "расширенная неопределённость",
                    EnumStyleArchetype::HeaderHorizontal,
                ),
            ],
        ),
        SpecHeaderBlock::leaf(
            (1, 2),
            (5, 5),
            "Допустимый уровень, мкЗв/ч",
            EnumStyleArchetype::HeaderHorizontal,
        ),
        SpecHeaderBlock::leaf(
            (1, 2),
            (6, 6),
            "Вывод о соответствии",
            EnumStyleArchetype::HeaderHorizontal,
        ),
    ];
    layout.heights_px_by_row = BTreeMap::from([(0, 30), (1, 48), (2, 64)]);
    layout
}

/// Gamma dose-rate table for outdoor (territory) measurement points.
pub fn derive_layout_gamma_outdoor() -> SpecSheetLayout {
    let mut layout = derive_layout_base("МЭД на территории", vec![33, 231, 82, 82, 74, 96]);
    layout.blocks = vec![
        SpecHeaderBlock::leaf(
            (0, 0),
            (0, 5),
            "Результаты измерений МЭД гамма-излучения на территории",
            EnumStyleArchetype::Title,
        ),
        SpecHeaderBlock::leaf((1, 2), (0, 0), "№ п/п", EnumStyleArchetype::HeaderHorizontal),
        SpecHeaderBlock::leaf(
            (1, 2),
            (1, 1),
            "Точка измерения на территории",
            EnumStyleArchetype::HeaderHorizontal,
        ),
        SpecHeaderBlock::group(
            (1, 2),
            (2, 3),
            "МЭД гамма-излучения, мкЗв/ч",
            EnumStyleArchetype::HeaderHorizontal,
            vec![
                SpecHeaderBlock::leaf(
                    (2, 2),
                    (2, 2),
                    "измеренное значение",
                    EnumStyleArchetype::HeaderHorizontal,
                ),
                SpecHeaderBlock::leaf(
                    (2, 2),
                    (3, 3),
                    "расширенная неопределённость",
                    EnumStyleArchetype::HeaderHorizontal,
                ),
            ],
        ),
        SpecHeaderBlock::leaf(
            (1, 2),
            (4, 4),
            "Допустимый уровень, мкЗв/ч",
            EnumStyleArchetype::HeaderHorizontal,
        ),
        SpecHeaderBlock::leaf(
            (1, 2),
            (5, 5),
            "Вывод о соответствии",
            EnumStyleArchetype::HeaderHorizontal,
        ),
    ];
    layout.heights_px_by_row = BTreeMap::from([(0, 30), (1, 48), (2, 64)]);
    layout
}

/// Artificial illumination table.
pub fn derive_layout_illumination() -> SpecSheetLayout {
    let mut layout = derive_layout_base("Освещённость", vec![33, 193, 62, 74, 74, 96]);
    layout.blocks = vec![
        SpecHeaderBlock::leaf(
            (0, 0),
            (0, 5),
            "Результаты измерений искусственной освещённости",
            EnumStyleArchetype::Title,
        ),
        SpecHeaderBlock::leaf((1, 2), (0, 0), "№ п/п", EnumStyleArchetype::HeaderHorizontal),
        SpecHeaderBlock::leaf(
            (1, 2),
            (1, 1),
            "Место проведения измерений",
            EnumStyleArchetype::HeaderHorizontal,
        ),
        SpecHeaderBlock::leaf(
            (1, 2),
            (2, 2),
            "Плоскость нормирования",
            EnumStyleArchetype::HeaderVertical,
        ),
        SpecHeaderBlock::group(
            (1, 2),
            (3, 4),
            "Освещённость, лк",
            EnumStyleArchetype::HeaderHorizontal,
            vec![
                SpecHeaderBlock::leaf(
                    (2, 2),
                    (3, 3),
                    "измеренное значение",
                    EnumStyleArchetype::HeaderHorizontal,
                ),
                SpecHeaderBlock::leaf(
                    (2, 2),
                    (4, 4),
                    "нормируемое значение",
                    EnumStyleArchetype::HeaderHorizontal,
                ),
            ],
        ),
        SpecHeaderBlock::leaf(
            (1, 2),
            (5, 5),
            "Вывод о соответствии",
            EnumStyleArchetype::HeaderHorizontal,
        ),
    ];
    layout.heights_px_by_row = BTreeMap::from([(0, 30), (1, 48), (2, 64)]);
    layout
}

/// Air-exchange rate table, preceded by a hand-filled instruction line.
pub fn derive_layout_ventilation() -> SpecSheetLayout {
    let mut layout = derive_layout_base("Воздухообмен", vec![33, 193, 62, 74, 74, 74, 88]);
    layout.blocks = vec![
        SpecHeaderBlock::leaf(
            (0, 0),
            (0, 6),
            "Объект: ",
            EnumStyleArchetype::InstructionLine,
        ),
        SpecHeaderBlock::leaf(
            (1, 1),
            (0, 6),
            "Результаты измерений кратности воздухообмена",
            EnumStyleArchetype::Title,
        ),
        SpecHeaderBlock::leaf((2, 3), (0, 0), "№ п/п", EnumStyleArchetype::HeaderHorizontal),
        SpecHeaderBlock::leaf(
            (2, 3),
            (1, 1),
            "Наименование помещения",
            EnumStyleArchetype::HeaderHorizontal,
        ),
        SpecHeaderBlock::leaf(
            (2, 3),
            (2, 2),
            "Объём помещения, м³",
            EnumStyleArchetype::HeaderVertical,
        ),
        SpecHeaderBlock::group(
            (2, 3),
            (3, 4),
            "Кратность воздухообмена, ч⁻¹",
            EnumStyleArchetype::HeaderHorizontal,
            vec![
                SpecHeaderBlock::leaf((3, 3), (3, 3), "приток", EnumStyleArchetype::HeaderHorizontal),
                SpecHeaderBlock::leaf((3, 3), (4, 4), "вытяжка", EnumStyleArchetype::HeaderHorizontal),
            ],
        ),
        SpecHeaderBlock::leaf(
            (2, 3),
            (5, 5),
            "Нормируемое значение",
            EnumStyleArchetype::HeaderHorizontal,
        ),
        SpecHeaderBlock::leaf(
            (2, 3),
            (6, 6),
            "Вывод о соответствии",
            EnumStyleArchetype::HeaderHorizontal,
        ),
    ];
    layout.heights_px_by_row = BTreeMap::from([(0, 24), (1, 30), (2, 48), (3, 64)]);
    layout
}

/// Noise-level table: a single header row with no column groups.
pub fn derive_layout_noise() -> SpecSheetLayout {
    let mut layout = derive_layout_base("Уровни шума", vec![33, 193, 82, 82, 74, 96]);
    layout.blocks = vec![
        SpecHeaderBlock::leaf(
            (0, 0),
            (0, 5),
            "Результаты измерений уровней шума",
            EnumStyleArchetype::Title,
        ),
        SpecHeaderBlock::leaf((1, 1), (0, 0), "№ п/п", EnumStyleArchetype::HeaderHorizontal),
        SpecHeaderBlock::leaf(
            (1, 1),
            (1, 1),
            "Место проведения измерений",
            EnumStyleArchetype::HeaderHorizontal,
        ),
        SpecHeaderBlock::leaf(
            (1, 1),
            (2, 2),
            "Эквивалентный уровень звука, дБА",
            EnumStyleArchetype::HeaderHorizontal,
        ),
        SpecHeaderBlock::leaf(
            (1, 1),
            (3, 3),
            "Максимальный уровень звука, дБА",
            EnumStyleArchetype::HeaderHorizontal,
        ),
        SpecHeaderBlock::leaf(
            (1, 1),
            (4, 4),
            "Допустимый уровень, дБА",
            EnumStyleArchetype::HeaderHorizontal,
        ),
        SpecHeaderBlock::leaf(
            (1, 1),
            (5, 5),
            "Вывод о соответствии",
            EnumStyleArchetype::HeaderHorizontal,
        ),
    ];
    layout.heights_px_by_row = BTreeMap::from([(0, 30), (1, 80)]);
    layout
}

/// All six report layouts in report order.
pub fn derive_all_report_layouts() -> Vec<SpecSheetLayout> {
    vec![
        derive_layout_radon(),
        derive_layout_gamma_indoor(),
        derive_layout_gamma_outdoor(),
        derive_layout_illumination(),
        derive_layout_ventilation(),
        derive_layout_noise(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_report_sheets, build_sheet};
    use crate::spec::EnumMergeBorderMode;

    #[test]
    fn every_preset_builds_without_overlapping_merges() {
        for layout in derive_all_report_layouts() {
            let build = build_sheet(&layout)
                .unwrap_or_else(|err| panic!("{}: {err}", layout.sheet_name));
            let l_merges = &build.grid.merges;
            for (n_idx, range_first) in l_merges.iter().enumerate() {
                for range_second in l_merges.iter().skip(n_idx + 1) {
                    assert!(
                        !range_first.intersects(range_second),
                        "{}: {range_first:?} overlaps {range_second:?}",
                        layout.sheet_name
                    );
                }
            }
        }
    }

    #[test]
    fn ventilation_instruction_line_has_bottom_only_merge() {
        let build = build_sheet(&derive_layout_ventilation()).unwrap();
        let range_instruction = build
            .grid
            .merges
            .iter()
            .find(|m| m.row_start == 0)
            .unwrap();
        assert_eq!(range_instruction.rule_border, EnumMergeBorderMode::BottomOnly);
        assert_eq!(build.grid.cells[&(0, 0)].text, "Объект: ");
        assert_eq!(build.row_data_start, 5);
    }

    #[test]
    fn noise_sheet_degenerates_to_single_header_row() {
        let build = build_sheet(&derive_layout_noise()).unwrap();
        // Title merge plus no header merges: every header block is one cell.
        assert_eq!(build.grid.merges.len(), 1);
        assert_eq!(build.row_data_start, 3);
    }

    #[test]
    fn batch_build_of_all_presets_keeps_sheet_names() {
        let l_layouts = derive_all_report_layouts();
        let l_builds = build_report_sheets(&l_layouts).unwrap();
        let l_names: Vec<&str> = l_builds
            .iter()
            .map(|build| build.grid.sheet_name.as_str())
            .collect();
        assert_eq!(
            l_names,
            vec![
                "ЭРОА радона",
                "МЭД в помещениях",
                "МЭД на территории",
                "Освещённость",
                "Воздухообмен",
                "Уровни шума"
            ]
        );
    }

    #[test]
    fn presets_are_idempotent_data() {
        assert_eq!(derive_layout_radon(), derive_layout_radon());
        assert_eq!(
            build_sheet(&derive_layout_gamma_indoor()).unwrap(),
            build_sheet(&derive_layout_gamma_indoor()).unwrap()
        );
    }
}
