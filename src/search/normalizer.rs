//! Result normalization
//!
//! Maps collection-native JSON records onto [`AggregatedResult`]. Field selection
//! is fixed per [`SourceKind`]; localized fields prefer the active locale, then the
//! counterpart language, then empty. Only a record without any usable identifier is
//! rejected; every other gap degrades to a best-effort value.

use crate::models::{AggregatedResult, DisplayLocale, SourceKind};
use crate::sources::RawItem;
use chrono::{DateTime, NaiveDate};
use serde_json::Value;

/// Separator between subtitle segments
pub const SUBTITLE_SEPARATOR: &str = " · ";

/// Why a single record could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationDefect {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("record has no usable id")]
    MissingId,
}

/// Normalize one raw record of the given kind
pub fn normalize(
    kind: SourceKind,
    raw: &RawItem,
    locale: DisplayLocale,
) -> Result<AggregatedResult, NormalizationDefect> {
    if !raw.is_object() {
        return Err(NormalizationDefect::NotAnObject);
    }
    let entity_id = entity_id(raw).ok_or(NormalizationDefect::MissingId)?;

    let (title, subtitle) = match kind {
        SourceKind::Report => {
            let title = localized(raw, "title", locale);
            let date = text(raw, "incident_date").map(|d| format_incident_date(&d, locale));
            (title, join_segments([localized(raw, "location", locale), date]))
        }
        SourceKind::Individual => {
            let title = localized(raw, "name", locale);
            let organization = localized(raw, "organization", locale).or_else(|| {
                raw.get("organization")
                    .filter(|o| o.is_object())
                    .and_then(|o| localized(o, "name", locale))
            });
            (title, join_segments([localized(raw, "role", locale), organization]))
        }
        SourceKind::Organization => {
            let title = localized(raw, "name", locale);
            (
                title,
                join_segments([
                    localized(raw, "category", locale),
                    localized(raw, "location", locale),
                ]),
            )
        }
    };

    Ok(AggregatedResult::new(
        kind,
        &entity_id,
        title.unwrap_or_default(),
        subtitle,
    ))
}

/// Stable entity identifier: `id` (string or number), else `slug`
fn entity_id(raw: &Value) -> Option<String> {
    ["id", "slug"].iter().find_map(|key| text(raw, key))
}

/// Non-empty, trimmed text value; numbers are rendered
fn text(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `<base>_<locale>`, falling back to the counterpart language
fn localized(raw: &Value, base: &str, locale: DisplayLocale) -> Option<String> {
    [locale, locale.counterpart()]
        .iter()
        .find_map(|l| text(raw, &format!("{}_{}", base, l.suffix())))
}

fn join_segments<const N: usize>(segments: [Option<String>; N]) -> Option<String> {
    let present: Vec<String> = segments.into_iter().flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.join(SUBTITLE_SEPARATOR))
    }
}

/// Render an incident date for display
///
/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates; anything else is shown
/// as given.
pub fn format_incident_date(raw: &str, locale: DisplayLocale) -> String {
    let raw = raw.trim();
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));

    match date {
        Ok(date) => match locale {
            DisplayLocale::En => date.format("%-d %b %Y").to_string(),
            DisplayLocale::Fa => date.format("%Y/%m/%d").to_string(),
        },
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_prefers_active_locale() {
        let raw = json!({
            "id": 12,
            "title_en": "Protest at bazaar",
            "title_fa": "تجمع در بازار",
            "location_en": "Tehran",
            "incident_date": "2024-03-01"
        });

        let en = normalize(SourceKind::Report, &raw, DisplayLocale::En).unwrap();
        assert_eq!(en.id, "report-12");
        assert_eq!(en.title, "Protest at bazaar");
        assert_eq!(en.subtitle.as_deref(), Some("Tehran · 1 Mar 2024"));
        assert_eq!(en.url, "/reports/12");

        let fa = normalize(SourceKind::Report, &raw, DisplayLocale::Fa).unwrap();
        assert_eq!(fa.title, "تجمع در بازار");
        // location falls back to English, date uses the Persian layout
        assert_eq!(fa.subtitle.as_deref(), Some("Tehran · 2024/03/01"));
    }

    #[test]
    fn test_title_falls_back_to_counterpart_then_empty() {
        let only_fa = json!({"id": "r1", "title_fa": "گزارش"});
        let result = normalize(SourceKind::Report, &only_fa, DisplayLocale::En).unwrap();
        assert_eq!(result.title, "گزارش");

        let none = json!({"id": "r2", "title_en": "   "});
        let result = normalize(SourceKind::Report, &none, DisplayLocale::En).unwrap();
        assert_eq!(result.title, "");
        assert!(result.subtitle.is_none());
    }

    #[test]
    fn test_report_subtitle_omits_absent_segments() {
        let raw = json!({"id": 1, "incident_date": "2023-11-20T08:30:00Z"});
        let result = normalize(SourceKind::Report, &raw, DisplayLocale::En).unwrap();
        assert_eq!(result.subtitle.as_deref(), Some("20 Nov 2023"));
    }

    #[test]
    fn test_individual_subtitle_joins_role_and_organization() {
        let flat = json!({
            "id": 7,
            "name_en": "Sara Ahmadi",
            "role_en": "Spokesperson",
            "organization_en": "Red Crescent"
        });
        let result = normalize(SourceKind::Individual, &flat, DisplayLocale::En).unwrap();
        assert_eq!(result.id, "individual-7");
        assert_eq!(
            result.subtitle.as_deref(),
            Some("Spokesperson · Red Crescent")
        );

        let nested = json!({
            "id": 8,
            "name_en": "Ali",
            "organization": {"name_en": "Teachers Union"}
        });
        let result = normalize(SourceKind::Individual, &nested, DisplayLocale::En).unwrap();
        assert_eq!(result.subtitle.as_deref(), Some("Teachers Union"));
    }

    #[test]
    fn test_organization_fields() {
        let raw = json!({
            "slug": "bar-association",
            "name_fa": "کانون وکلا",
            "category_en": "Professional body"
        });
        let result = normalize(SourceKind::Organization, &raw, DisplayLocale::En).unwrap();
        assert_eq!(result.id, "organization-bar-association");
        assert_eq!(result.title, "کانون وکلا");
        assert_eq!(result.subtitle.as_deref(), Some("Professional body"));
        assert_eq!(result.url, "/organizations/bar-association");
    }

    #[test]
    fn test_malformed_fields_degrade() {
        let raw = json!({"id": 3, "name_en": ["not", "text"], "role_en": 5});
        let result = normalize(SourceKind::Individual, &raw, DisplayLocale::En).unwrap();
        assert_eq!(result.title, "");
        assert_eq!(result.subtitle.as_deref(), Some("5"));
    }

    #[test]
    fn test_defects() {
        assert_eq!(
            normalize(SourceKind::Report, &json!("oops"), DisplayLocale::En),
            Err(NormalizationDefect::NotAnObject)
        );
        assert_eq!(
            normalize(SourceKind::Report, &json!({"title_en": "x"}), DisplayLocale::En),
            Err(NormalizationDefect::MissingId)
        );
    }

    #[test]
    fn test_unparseable_date_passes_through() {
        assert_eq!(
            format_incident_date(" last spring ", DisplayLocale::En),
            "last spring"
        );
    }
}
