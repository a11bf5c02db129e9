use serde::{Deserialize, Serialize};

/// Publication category, decided purely by whether a journal field was present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublicationType {
    Journal,
    #[default]
    Conference,
}

impl PublicationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationType::Journal => "Journal",
            PublicationType::Conference => "Conference",
        }
    }
}

impl std::fmt::Display for PublicationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Journal iff the source entry carried a journal field. Content is never inspected.
pub fn classify(has_journal_field: bool) -> PublicationType {
    if has_journal_field {
        PublicationType::Journal
    } else {
        PublicationType::Conference
    }
}

/// Numeric value of a year cell. Blank or unparsable cells are missing, never zero.
pub fn parse_year_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Integer year, accepting spreadsheet-style `2019.0`.
pub fn parse_year(raw: &str) -> Option<i32> {
    let n = parse_year_number(raw)?;
    if n.fract() != 0.0 || n < i32::MIN as f64 || n > i32::MAX as f64 {
        return None;
    }
    Some(n as i32)
}

/// One normalized publication entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub title: String,
    pub author: String,
    /// Kept as text so verbatim source values survive; see [`CanonicalRecord::year_value`].
    pub year: String,
    pub venue: String,
    #[serde(rename = "type")]
    pub pub_type: PublicationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_name: Option<String>,
}

impl CanonicalRecord {
    pub fn year_value(&self) -> Option<i32> {
        parse_year(&self.year)
    }

    pub fn with_faculty(mut self, name: impl Into<String>) -> Self {
        self.faculty_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_is_presence_rule() {
        assert_eq!(classify(true), PublicationType::Journal);
        assert_eq!(classify(false), PublicationType::Conference);
    }

    #[test]
    fn test_publication_type_display() {
        assert_eq!(PublicationType::Journal.to_string(), "Journal");
        assert_eq!(PublicationType::Conference.to_string(), "Conference");
    }

    #[test]
    fn test_parse_year_variants() {
        assert_eq!(parse_year("2019"), Some(2019));
        assert_eq!(parse_year(" 2019 "), Some(2019));
        assert_eq!(parse_year("2019.0"), Some(2019));
        assert_eq!(parse_year("2019.5"), None);
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("   "), None);
        assert_eq!(parse_year("in press"), None);
        assert_eq!(parse_year("NaN"), None);
    }

    #[test]
    fn test_parse_year_number_keeps_fraction() {
        assert_eq!(parse_year_number("2019.5"), Some(2019.5));
        assert_eq!(parse_year_number(""), None);
    }

    #[test]
    fn test_record_serializes_type_field() {
        let record = CanonicalRecord {
            title: "On Graphs".into(),
            pub_type: PublicationType::Journal,
            ..Default::default()
        }
        .with_faculty("Zoë Ångström");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "Journal");
        assert_eq!(json["faculty_name"], "Zoë Ångström");
    }
}
