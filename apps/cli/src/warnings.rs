//! Critical-warning preview shown before generation.

use schoolprompt_shared::CountryRecord;

/// A warning containing any of these is critical.
const CRITICAL_MARKERS: [&str; 3] = ["⚠️", "CRITICAL", "重要"];

/// Warnings shown when none is marked critical.
const PREVIEW_FALLBACK_COUNT: usize = 2;

/// Japanese display names used in the preview heading.
const JAPANESE_NAMES: [(&str, &str); 10] = [
    ("China", "中国"),
    ("Korea", "韓国"),
    ("Vietnam", "ベトナム"),
    ("Taiwan", "台湾"),
    ("Thailand", "タイ"),
    ("Indonesia", "インドネシア"),
    ("Malaysia", "マレーシア"),
    ("Philippines", "フィリピン"),
    ("India", "インド"),
    ("Japan", "日本"),
];

/// Marked warnings, else the first few. Empty for the fallback record.
pub(crate) fn critical_warnings(record: &CountryRecord) -> Vec<&str> {
    if record.is_fallback() {
        return Vec::new();
    }

    let marked: Vec<&str> = record
        .warnings
        .iter()
        .map(String::as_str)
        .filter(|w| CRITICAL_MARKERS.iter().any(|m| w.contains(m)))
        .collect();

    if marked.is_empty() {
        record
            .warnings
            .iter()
            .take(PREVIEW_FALLBACK_COUNT)
            .map(String::as_str)
            .collect()
    } else {
        marked
    }
}

/// Heading for the preview, e.g. `マレーシア の重要な注意点`.
pub(crate) fn preview_title(key: &str) -> String {
    let name = JAPANESE_NAMES
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(key, |(_, name)| *name);
    format!("{name} の重要な注意点")
}

#[cfg(test)]
mod tests {
    use schoolprompt_core::ReferenceTable;

    use super::*;

    fn table() -> ReferenceTable {
        ReferenceTable::embedded().expect("embedded reference data")
    }

    #[test]
    fn malaysia_shows_only_critical_line() {
        let table = table();
        assert_eq!(
            critical_warnings(table.lookup("Malaysia")),
            ["⚠️ CRITICAL: SPM alone (Form 5) = only 11 years - NOT sufficient for Standard A"]
        );
    }

    #[test]
    fn china_marker_without_icon_counts() {
        let table = table();
        let preview = critical_warnings(table.lookup("China"));
        assert_eq!(preview.len(), 1);
        assert!(preview[0].starts_with("CRITICAL:"));
    }

    #[test]
    fn unmarked_country_shows_first_two() {
        let table = table();
        assert_eq!(
            critical_warnings(table.lookup("Japan")),
            [
                "Japan domestic schools have specific eligibility categories",
                "各種学校 (Miscellaneous School) category often includes international schools",
            ]
        );
    }

    #[test]
    fn fallback_has_no_preview() {
        let table = table();
        assert!(critical_warnings(table.fallback()).is_empty());
        assert!(critical_warnings(table.lookup("Atlantis")).is_empty());
    }

    #[test]
    fn title_uses_japanese_name() {
        assert_eq!(preview_title("Philippines"), "フィリピン の重要な注意点");
        assert_eq!(preview_title("Atlantis"), "Atlantis の重要な注意点");
    }
}
