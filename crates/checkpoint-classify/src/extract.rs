// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text normalization and detail extraction.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Upper bound on an extracted reason, in characters.
pub const MAX_REASON_CHARS: usize = 500;

static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:script|style)\b[^>]*>.*?</(?:script|style)\s*>").unwrap()
});

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)<\s*/?\s*(?:br|p|div|li|tr|td|th|h[1-6]|table|ul|ol|section|article|header|footer)\b[^>]*>",
    )
    .unwrap()
});

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2})\.(\d{2})\.(\d{4})\b").unwrap());

/// A 12-digit number shortly after an INN label.
pub(crate) static LABELLED_INN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:инн|inn)\D{0,20}\b(\d{12})\b").unwrap());

static DEFAULT_REASON_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)причин[аы]\s*[:\-–—]\s*([^\n]+)").unwrap(),
        Regex::new(r"(?i)основани[ея]\s*[:\-–—]\s*([^\n]+)").unwrap(),
        Regex::new(r"(?i)reason\s*[:\-–—]\s*([^\n]+)").unwrap(),
    ]
});

const ENTITIES: [(&str, &str); 9] = [
    ("&nbsp;", " "),
    ("&laquo;", "«"),
    ("&raquo;", "»"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    // Last, so `&amp;lt;` decodes to `&lt;` rather than `<`.
    ("&amp;", "&"),
];

/// Reduce HTML to plain text: one logical block per line, whitespace collapsed.
///
/// Plain text passes through with only whitespace normalization.
pub fn strip_markup(raw: &str) -> String {
    let text = SCRIPT_STYLE.replace_all(raw, " ");
    let text = COMMENT.replace_all(&text, " ");
    let text = BLOCK_TAG.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, " ");

    let mut decoded = text.into_owned();
    for (entity, replacement) in ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, replacement);
        }
    }

    decoded
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First calendar-valid `DD.MM.YYYY` date in `text`.
pub fn extract_expiry(text: &str) -> Option<NaiveDate> {
    DATE.captures_iter(text).find_map(|caps| {
        let day = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

/// The taxpayer number following the first INN label in `text`.
///
/// Unlabelled 12-digit numbers (application or reference numbers) are
/// never returned.
pub fn extract_inn(text: &str) -> Option<String> {
    LABELLED_INN.captures(text).map(|caps| caps[1].to_string())
}

/// Pulls the free-text reason and expiry date out of a positive response.
#[derive(Debug, Clone)]
pub struct DetailExtractor {
    reason_patterns: Vec<Regex>,
    max_reason_chars: usize,
}

impl Default for DetailExtractor {
    fn default() -> Self {
        Self {
            reason_patterns: DEFAULT_REASON_PATTERNS.clone(),
            max_reason_chars: MAX_REASON_CHARS,
        }
    }
}

impl DetailExtractor {
    /// Use `patterns` (each with one capture group) instead of the defaults.
    pub fn with_reason_patterns(patterns: Vec<Regex>) -> Self {
        Self {
            reason_patterns: patterns,
            ..Self::default()
        }
    }

    /// First labelled reason, trimmed and bounded.
    pub fn reason(&self, text: &str) -> Option<String> {
        let raw = self.reason_patterns.iter().find_map(|re| {
            re.captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
        })?;

        let trimmed = raw.trim().trim_end_matches(['.', ';', ',']).trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.chars().take(self.max_reason_chars).collect())
    }

    pub fn expiry(&self, text: &str) -> Option<NaiveDate> {
        extract_expiry(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_scripts() {
        let html = "<html><head><style>p{color:red}</style><script>var x = '<b>';</script></head>\
                    <body><div>Запрет&nbsp;на въезд</div><p>Причина: <b>депортация</b></p></body></html>";
        let text = strip_markup(html);
        assert_eq!(text, "Запрет на въезд\nПричина: депортация");
    }

    #[test]
    fn plain_text_only_collapses_whitespace() {
        assert_eq!(strip_markup("  Данных   нет \n\n  "), "Данных нет");
    }

    #[test]
    fn ampersand_decoded_once() {
        assert_eq!(strip_markup("a &amp;lt; b"), "a &lt; b");
    }

    #[test]
    fn first_valid_date_is_iso() {
        assert_eq!(
            extract_expiry("выдан 31.02.2020, действует до 15.06.2026 и 01.01.2030"),
            NaiveDate::from_ymd_opt(2026, 6, 15)
        );
        assert_eq!(extract_expiry("no dates"), None);
        assert_eq!(
            extract_expiry("до: 31.12.2025.")
                .map(|d| d.format("%Y-%m-%d").to_string())
                .as_deref(),
            Some("2025-12-31")
        );
    }

    #[test]
    fn inn_requires_exactly_twelve_digits() {
        assert_eq!(
            extract_inn("ИНН: 770123456789"),
            Some("770123456789".to_string())
        );
        assert_eq!(extract_inn("ИНН 1234567890123"), None);
        assert_eq!(extract_inn("ИНН 12345678901"), None);
    }

    #[test]
    fn inn_skips_unlabelled_numbers_before_the_label() {
        let text = "Заявление № 123456789012 принято.\nИНН: 770123456789";
        assert_eq!(extract_inn(text).as_deref(), Some("770123456789"));
        assert_eq!(extract_inn("Заявление № 123456789012 принято."), None);
    }

    #[test]
    fn reason_is_labelled_trimmed_and_bounded() {
        let ex = DetailExtractor::default();
        assert_eq!(
            ex.reason("Запрет. Причина: административное выдворение.").as_deref(),
            Some("административное выдворение")
        );
        assert_eq!(
            ex.reason("Основание - решение суда").as_deref(),
            Some("решение суда")
        );
        assert_eq!(ex.reason("без метки"), None);

        let long = format!("Причина: {}", "я".repeat(MAX_REASON_CHARS + 50));
        assert_eq!(
            ex.reason(&long).map(|r| r.chars().count()),
            Some(MAX_REASON_CHARS)
        );
    }

    #[test]
    fn custom_reason_patterns() {
        let ex = DetailExtractor::with_reason_patterns(vec![Regex::new(r"why=(\w+)").unwrap()]);
        assert_eq!(ex.reason("why=because").as_deref(), Some("because"));
        assert_eq!(ex.reason("Причина: x"), None);
    }

    proptest::proptest! {
        #[test]
        fn strip_markup_is_idempotent(s in "[a-zа-я <>/;.\\n]{0,80}") {
            let once = strip_markup(&s);
            proptest::prop_assert_eq!(strip_markup(&once), once);
        }
    }
}
