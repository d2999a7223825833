use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// A queryable collection behind the search box
///
/// Declaration order is the display priority: reports first, then individuals,
/// then organizations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceKind {
    Report,
    Individual,
    Organization,
}

impl SourceKind {
    /// All kinds in priority order
    pub const ALL: [SourceKind; 3] = [
        SourceKind::Report,
        SourceKind::Individual,
        SourceKind::Organization,
    ];

    /// Number of collections queried per round
    pub const COUNT: usize = Self::ALL.len();

    /// Position in the result list (lower = shown first)
    pub fn priority(&self) -> usize {
        match self {
            SourceKind::Report => 0,
            SourceKind::Individual => 1,
            SourceKind::Organization => 2,
        }
    }

    /// Detail-view URL template; `{id}` is replaced with the entity id
    pub fn url_template(&self) -> &'static str {
        match self {
            SourceKind::Report => "/reports/{id}",
            SourceKind::Individual => "/individuals/{id}",
            SourceKind::Organization => "/organizations/{id}",
        }
    }

    /// Build the detail-view URL for an entity, percent-encoding the id
    pub fn detail_url(&self, entity_id: &str) -> String {
        self.url_template()
            .replace("{id}", &urlencoding::encode(entity_id))
    }
}

/// Active display locale
///
/// Collection records carry paired `<field>_en` / `<field>_fa` columns; the active
/// locale picks which one is preferred.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DisplayLocale {
    #[default]
    En,
    Fa,
}

impl DisplayLocale {
    /// Field suffix used by collection records
    pub fn suffix(&self) -> &'static str {
        match self {
            DisplayLocale::En => "en",
            DisplayLocale::Fa => "fa",
        }
    }

    /// The other language of the pair
    pub fn counterpart(&self) -> DisplayLocale {
        match self {
            DisplayLocale::En => DisplayLocale::Fa,
            DisplayLocale::Fa => DisplayLocale::En,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_priority_matches_declaration_order() {
        let mut kinds = vec![
            SourceKind::Organization,
            SourceKind::Report,
            SourceKind::Individual,
        ];
        kinds.sort_by_key(|k| k.priority());
        assert_eq!(kinds, SourceKind::ALL.to_vec());
    }

    #[test]
    fn test_detail_url() {
        assert_eq!(SourceKind::Report.detail_url("42"), "/reports/42");
        assert_eq!(
            SourceKind::Organization.detail_url("acme"),
            "/organizations/acme"
        );
    }

    #[test]
    fn test_detail_url_encodes_id() {
        assert_eq!(
            SourceKind::Report.detail_url("a b/c?d"),
            "/reports/a%20b%2Fc%3Fd"
        );
        assert_eq!(
            SourceKind::Organization.detail_url("red-crescent_1.0~x"),
            "/organizations/red-crescent_1.0~x"
        );
    }

    #[test]
    fn test_kind_round_trips_through_strings() {
        assert_eq!(SourceKind::Individual.to_string(), "individual");
        assert_eq!(
            SourceKind::from_str("organization").unwrap(),
            SourceKind::Organization
        );
        assert!(SourceKind::from_str("people").is_err());
    }

    #[test]
    fn test_locale_counterpart() {
        assert_eq!(DisplayLocale::En.counterpart(), DisplayLocale::Fa);
        assert_eq!(DisplayLocale::Fa.counterpart(), DisplayLocale::En);
        assert_eq!(DisplayLocale::from_str("FA").unwrap(), DisplayLocale::Fa);
    }
}
