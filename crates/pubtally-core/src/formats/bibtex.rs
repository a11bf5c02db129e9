use std::path::Path;

use biblatex::{Bibliography, ChunksExt, Entry};

use crate::error::{PubtallyError, Result};
use crate::models::{CanonicalRecord, classify};

/// A BibTeX entry mapped to the canonical shape, plus its optional `faculty` tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    pub record: CanonicalRecord,
    pub faculty: Option<String>,
}

pub fn parse_bibtex_file(path: &Path) -> Result<Vec<ParsedEntry>> {
    let src = std::fs::read_to_string(path)?;
    parse_bibtex(&src)
}

/// One record per entry. `venue` prefers `journal` over `booktitle`; the type is
/// Journal exactly when a `journal` field exists, whatever its content.
pub fn parse_bibtex(src: &str) -> Result<Vec<ParsedEntry>> {
    let bib = Bibliography::parse(src).map_err(|e| PubtallyError::Bibtex(e.to_string()))?;

    let entries = bib
        .iter()
        .map(|entry| {
            let journal = field(entry, "journal");
            let has_journal = journal.is_some();
            let venue = journal
                .or_else(|| field(entry, "booktitle"))
                .unwrap_or_default();

            ParsedEntry {
                record: CanonicalRecord {
                    title: field(entry, "title").unwrap_or_default(),
                    author: field(entry, "author").unwrap_or_default(),
                    year: field(entry, "year").unwrap_or_default(),
                    venue,
                    pub_type: classify(has_journal),
                    faculty_name: None,
                },
                faculty: field(entry, "faculty").filter(|f| !f.trim().is_empty()),
            }
        })
        .collect();

    Ok(entries)
}

fn field(entry: &Entry, name: &str) -> Option<String> {
    entry
        .fields
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, chunks)| chunks.format_verbatim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PublicationType, Table, TableOrigin};
    use crate::queries::{CountEntry, count_by_type};

    const SAMPLE: &str = r#"
@article{smith2019,
  title = {Graph Neural Networks for Proteins},
  author = {Smith, John and Doe, Jane},
  year = {2019},
  journal = {Bioinformatics}
}

@inproceedings{lee2020,
  title = {Fast Sparse Attention},
  author = {Lee, Min},
  year = {2020},
  booktitle = {Proceedings of NeurIPS}
}

@misc{noyear,
  title = {Notes on Everything}
}
"#;

    #[test]
    fn test_journal_presence_decides_type() {
        let entries = parse_bibtex(SAMPLE).unwrap();
        let by_title = |t: &str| {
            entries
                .iter()
                .find(|e| e.record.title == t)
                .map(|e| e.record.clone())
                .unwrap()
        };

        let journal = by_title("Graph Neural Networks for Proteins");
        assert_eq!(journal.pub_type, PublicationType::Journal);
        assert_eq!(journal.venue, "Bioinformatics");
        assert_eq!(journal.year, "2019");

        let conf = by_title("Fast Sparse Attention");
        assert_eq!(conf.pub_type, PublicationType::Conference);
        assert_eq!(conf.venue, "Proceedings of NeurIPS");

        let misc = by_title("Notes on Everything");
        assert_eq!(misc.pub_type, PublicationType::Conference);
        assert_eq!(misc.venue, "");
        assert_eq!(misc.author, "");
        assert_eq!(misc.year, "");
        assert_eq!(misc.year_value(), None);
    }

    #[test]
    fn test_type_tally_matches_hand_count() {
        let records: Vec<_> = parse_bibtex(SAMPLE)
            .unwrap()
            .into_iter()
            .map(|e| e.record.with_faculty("Ada"))
            .collect();
        let table = Table::from_records(&records, "Faculty Name", TableOrigin::Parsed);

        // Hand count: only smith2019 carries a journal field.
        assert_eq!(
            count_by_type(&table),
            vec![
                CountEntry { key: "Conference".into(), count: 2 },
                CountEntry { key: "Journal".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_author_is_verbatim() {
        let entries = parse_bibtex(SAMPLE).unwrap();
        assert_eq!(entries[0].record.author, "Smith, John and Doe, Jane");
        assert!(entries.iter().all(|e| e.faculty.is_none()));
    }

    #[test]
    fn test_non_ascii_passes_through() {
        let src = "@article{k, title = {Über Graphen}, journal = {Zeitschrift für Ñ}, faculty = {Zoë Ångström}}";
        let entries = parse_bibtex(src).unwrap();
        assert_eq!(entries[0].record.title, "Über Graphen");
        assert_eq!(entries[0].record.venue, "Zeitschrift für Ñ");
        assert_eq!(entries[0].faculty.as_deref(), Some("Zoë Ångström"));
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        let err = parse_bibtex("@article{broken, title = {unterminated").unwrap_err();
        assert!(matches!(err, PubtallyError::Bibtex(_)));
    }
}
