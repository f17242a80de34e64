//! Pure text helpers for heuristic header-line matching.

use regex::Regex;

use crate::conf::C_PATTERN_DATE;

////////////////////////////////////////////////////////////////////////////////
// #region TextNormalization

/// Collapse whitespace runs (including NBSP) into single spaces and trim.
pub fn normalize_cell_text(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Case-insensitive substring test over normalized text.
pub fn contains_normalized(haystack: &str, needle: &str) -> bool {
    normalize_cell_text(haystack)
        .to_lowercase()
        .contains(&normalize_cell_text(needle).to_lowercase())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DateTokens

/// Compile the date token pattern.
pub fn derive_date_regex() -> Result<Regex, String> {
    Regex::new(C_PATTERN_DATE).map_err(|err| format!("Invalid date pattern: {err}"))
}

/// All date tokens in `text`, in appearance order.
pub fn find_date_tokens(regex_date: &Regex, text: &str) -> Vec<String> {
    regex_date
        .find_iter(&normalize_cell_text(text))
        .map(|m| m.as_str().to_string())
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region KeywordPrefixMatching

/// Extract the payload after the first matching keyword prefix.
///
/// Keywords are tried in declaration order; the first keyword found anywhere
/// in the normalized text wins. Returns `None` when no keyword occurs.
pub fn match_keyword_prefix(text: &str, keywords: &[String]) -> Option<String> {
    let c_text = normalize_cell_text(text);
    for keyword in keywords {
        if let Some(c_payload) = strip_keyword_prefix(&c_text, keyword) {
            return Some(c_payload);
        }
    }
    None
}

/// Keyword-prefix scan over one row of cells, left to right.
///
/// The first non-empty cell is remembered as the fallback. The first cell
/// containing any keyword yields the stripped payload; a row with no keyword
/// hit (or an empty payload) yields the fallback text verbatim.
pub fn match_keyword_row(cells: &[String], keywords: &[String]) -> Option<String> {
    let mut c_fallback: Option<String> = None;
    for c_cell in cells {
        let c_text = normalize_cell_text(c_cell);
        if c_text.is_empty() {
            continue;
        }
        if c_fallback.is_none() {
            c_fallback = Some(c_text.clone());
        }
        if let Some(c_payload) = match_keyword_prefix(&c_text, keywords) {
            return Some(c_payload);
        }
    }
    c_fallback
}

/// Text after `keyword` inside `text`, cleaned up for use as a field value.
///
/// The payload stops at the first comma: header lines append secondary
/// details ("ООО Ромашка, г. Москва") after the value proper.
pub fn strip_keyword_prefix(text: &str, keyword: &str) -> Option<String> {
    let n_start = find_lowercase(text, keyword)? + keyword.chars().count();
    let c_tail: String = text.chars().skip(n_start).collect();
    let c_payload = c_tail
        .trim_start_matches([':', ';', '-', '–', '—', '.', ' ', '\t'])
        .split(',')
        .next()
        .unwrap_or("")
        .trim()
        .to_string();
    if c_payload.is_empty() {
        None
    } else {
        Some(c_payload)
    }
}

/// Char offset of the case-insensitive `needle` inside `haystack`.
fn find_lowercase(haystack: &str, needle: &str) -> Option<usize> {
    let l_haystack: Vec<char> = haystack.to_lowercase().chars().collect();
    let l_needle: Vec<char> = needle.to_lowercase().chars().collect();
    if l_needle.is_empty() || l_needle.len() > l_haystack.len() {
        return None;
    }
    (0..=l_haystack.len() - l_needle.len())
        .find(|n_idx| l_haystack[*n_idx..n_idx + l_needle.len()] == l_needle[..])
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_nbsp_and_whitespace_runs() {
        assert_eq!(
            normalize_cell_text("  Заказчик:\u{a0}\u{a0}ООО  «Ромашка» \t"),
            "Заказчик: ООО «Ромашка»"
        );
        assert_eq!(normalize_cell_text(""), "");
    }

    #[test]
    fn contains_normalized_ignores_case_and_spacing() {
        assert!(contains_normalized("НАИМЕНОВАНИЕ  ЗАКАЗЧИКА: ...", "наименование заказчика"));
        assert!(!contains_normalized("Исполнитель: Иванов", "заказчик"));
    }

    #[test]
    fn date_tokens_are_found_in_order() {
        let regex_date = derive_date_regex().unwrap();
        assert_eq!(
            find_date_tokens(&regex_date, "Измерения 05.03.2024 и 6.3.24 г."),
            vec!["05.03.2024".to_string(), "6.3.24".to_string()]
        );
        assert!(find_date_tokens(&regex_date, "версия 1.2.3.4.5").is_empty());
    }

    #[test]
    fn keyword_payload_is_trimmed_and_cut_at_first_comma() {
        let l_keywords = vec!["заказчик".to_string()];
        assert_eq!(
            match_keyword_prefix("Заказчик: ООО «Ромашка», г. Москва", &l_keywords),
            Some("ООО «Ромашка»".to_string())
        );
        assert_eq!(
            match_keyword_prefix("заказчик — ИП Иванов", &l_keywords),
            Some("ИП Иванов".to_string())
        );
        assert_eq!(match_keyword_prefix("Исполнитель: Иванов", &l_keywords), None);
    }

    #[test]
    fn longer_keyword_wins_when_listed_first() {
        let l_keywords = vec![
            "наименование заказчика".to_string(),
            "заказчик".to_string(),
        ];
        assert_eq!(
            match_keyword_prefix("Наименование заказчика: АО «Вектор»", &l_keywords),
            Some("АО «Вектор»".to_string())
        );
    }

    #[test]
    fn row_scan_falls_back_to_first_non_empty_cell() {
        let l_keywords = vec!["заказчик".to_string()];
        let l_row_hit = vec![
            String::new(),
            "Заказчик: ООО «Ромашка», доп. текст".to_string(),
        ];
        assert_eq!(
            match_keyword_row(&l_row_hit, &l_keywords),
            Some("ООО «Ромашка»".to_string())
        );

        let l_row_miss = vec![String::new(), "Протокол № 12".to_string()];
        assert_eq!(
            match_keyword_row(&l_row_miss, &l_keywords),
            Some("Протокол № 12".to_string())
        );

        let l_row_empty = vec![String::new(), "  \u{a0} ".to_string()];
        assert_eq!(match_keyword_row(&l_row_empty, &l_keywords), None);
    }

    #[test]
    fn keyword_with_empty_payload_matches_nothing() {
        let l_keywords = vec!["№ заявки".to_string()];
        assert_eq!(match_keyword_prefix("№ заявки:  ", &l_keywords), None);
        assert_eq!(
            match_keyword_prefix("№ заявки: 123-А от 01.02.2024", &l_keywords),
            Some("123-А от 01.02.2024".to_string())
        );
    }
}
