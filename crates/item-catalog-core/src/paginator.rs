//! Localized paginator text.

use serde::Deserialize;

/// UI language for paginator labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "pt-BR")]
    PtBr,
}

/// Fixed paginator labels for a locale.
#[derive(Debug, Clone, Copy)]
pub struct PaginatorLabels {
    pub items_per_page: &'static str,
    of: &'static str,
}

impl PaginatorLabels {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => Self {
                items_per_page: "Items per page:",
                of: "of",
            },
            Locale::PtBr => Self {
                items_per_page: "Itens por página:",
                of: "de",
            },
        }
    }

    /// `"{start} – {end} of {length}"` for a zero-based `page`.
    ///
    /// When `page` starts past the end, `end` is `start + page_size` rather
    /// than being clamped.
    pub fn range_label(&self, page: usize, page_size: usize, length: usize) -> String {
        if length == 0 || page_size == 0 {
            return format!("0 {} {}", self.of, length);
        }
        let start = page.saturating_mul(page_size);
        let end = if start < length {
            start.saturating_add(page_size).min(length)
        } else {
            start.saturating_add(page_size)
        };
        format!("{} – {} {} {}", start.saturating_add(1), end, self.of, length)
    }
}

/// Hint shown while the search box holds fewer than `min_chars` characters.
///
/// Returns `None` when the box is empty or already long enough.
pub fn search_hint(raw: &str, min_chars: usize, locale: Locale) -> Option<String> {
    let len = raw.chars().count();
    if len == 0 || len >= min_chars {
        return None;
    }
    let missing = min_chars - len;
    Some(match locale {
        Locale::En => format!("Type {} more character(s)", missing),
        Locale::PtBr => format!("Digite mais {} caractere(s)", missing),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_label_en() {
        let labels = PaginatorLabels::for_locale(Locale::En);
        assert_eq!(labels.range_label(0, 10, 25), "1 – 10 of 25");
        assert_eq!(labels.range_label(2, 10, 25), "21 – 25 of 25");
        assert_eq!(labels.range_label(0, 10, 0), "0 of 0");
        assert_eq!(labels.range_label(5, 10, 25), "51 – 60 of 25");
    }

    #[test]
    fn test_range_label_pt_br() {
        let labels = PaginatorLabels::for_locale(Locale::PtBr);
        assert_eq!(labels.range_label(1, 5, 7), "6 – 7 de 7");
        assert_eq!(labels.range_label(0, 0, 7), "0 de 7");
        assert_eq!(labels.items_per_page, "Itens por página:");
    }

    #[test]
    fn test_search_hint() {
        assert_eq!(search_hint("", 3, Locale::En), None);
        assert_eq!(
            search_hint("re", 3, Locale::En).as_deref(),
            Some("Type 1 more character(s)")
        );
        assert_eq!(
            search_hint("r", 3, Locale::PtBr).as_deref(),
            Some("Digite mais 2 caractere(s)")
        );
        assert_eq!(search_hint("red", 3, Locale::En), None);
    }
}
