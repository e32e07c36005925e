//! Field normalization
//!
//! Maps a [`RawRow`] with arbitrary column labels onto a [`CanonicalRecord`]
//! using an [`AliasTable`]. Normalization never fails: absent fields take
//! their defaults, and columns not consumed by a canonical field are kept in
//! `metadata` under their original label.

use crate::models::{AliasTable, CanonicalField, CanonicalRecord, RawRow, DEFAULT_GENUS};

/// Field normalizer
#[derive(Debug, Clone, Default)]
pub struct FieldNormalizer {
    aliases: AliasTable,
}

impl FieldNormalizer {
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    /// Normalize one row
    ///
    /// A record without a cultivar name is still returned; dropping it is the
    /// caller's decision.
    pub fn normalize(&self, row: &RawRow) -> CanonicalRecord {
        let mut consumed = vec![false; row.len()];
        let mut record = CanonicalRecord {
            genus: String::new(),
            ..Default::default()
        };

        for field in CanonicalField::ALL {
            if let Some((idx, value)) = lookup(row, self.aliases.aliases(field)) {
                consumed[idx] = true;
                *field_mut(&mut record, field) = value.to_string();
            }
        }

        // Combined "Genus species" column only fills what is still missing
        if record.genus.is_empty() || record.species.is_empty() {
            if let Some((idx, taxon)) = lookup(row, self.aliases.taxon_aliases()) {
                let mut tokens = taxon.split_whitespace();
                let genus = tokens.next().unwrap_or_default();
                let species = tokens.collect::<Vec<_>>().join(" ");

                let mut used = false;
                if record.genus.is_empty() && !genus.is_empty() {
                    record.genus = genus.to_string();
                    used = true;
                }
                if record.species.is_empty() && !species.is_empty() {
                    record.species = species;
                    used = true;
                }
                if used {
                    consumed[idx] = true;
                }
            }
        }

        if record.genus.is_empty() {
            record.genus = DEFAULT_GENUS.to_string();
        }

        for ((label, value), used) in row.columns().iter().zip(&consumed) {
            if !used {
                record
                    .metadata
                    .entry(label.clone())
                    .or_insert_with(|| value.clone());
            }
        }

        record
    }
}

/// First alias (in priority order) matching a column with a non-empty value
///
/// For each alias an exact label match anywhere in the row beats a
/// trimmed, case-folded one. Returns the column index and the trimmed value.
fn lookup<'r>(row: &'r RawRow, aliases: &[String]) -> Option<(usize, &'r str)> {
    aliases.iter().find_map(|alias| {
        find_column(row, |label| label == alias).or_else(|| {
            find_column(row, |label| label.trim().eq_ignore_ascii_case(alias.trim()))
        })
    })
}

fn find_column<'r>(row: &'r RawRow, matches: impl Fn(&str) -> bool) -> Option<(usize, &'r str)> {
    row.columns()
        .iter()
        .enumerate()
        .find_map(|(idx, (label, value))| {
            let value = value.trim();
            if !value.is_empty() && matches(label) {
                Some((idx, value))
            } else {
                None
            }
        })
}

fn field_mut(record: &mut CanonicalRecord, field: CanonicalField) -> &mut String {
    match field {
        CanonicalField::AccessionCode => &mut record.accession_code,
        CanonicalField::CultivarName => &mut record.cultivar_name,
        CanonicalField::AccessionNumber => &mut record.accession_number,
        CanonicalField::Genus => &mut record.genus,
        CanonicalField::Species => &mut record.species,
        CanonicalField::Country => &mut record.country,
        CanonicalField::Province => &mut record.province,
        CanonicalField::City => &mut record.city,
        CanonicalField::PedigreeDescription => &mut record.pedigree_description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        RawRow::from_pairs("test.csv", 1, pairs.iter().copied())
    }

    #[test]
    fn test_basic_mapping() {
        let normalizer = FieldNormalizer::default();
        let record = normalizer.normalize(&row(&[
            ("ACNO", "MAL0100"),
            ("CULTIVAR NAME", "Honeycrisp"),
            ("E_ORIGIN_COUNTRY", "USA"),
        ]));

        assert_eq!(record.accession_code, "MAL0100");
        assert_eq!(record.cultivar_name, "Honeycrisp");
        assert_eq!(record.country, "USA");
        assert_eq!(record.genus, "Malus");
        assert_eq!(record.species, "");
        assert!(record.metadata.is_empty());
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let record = FieldNormalizer::default().normalize(&row(&[("GENUS", "  "), ("CULTIVAR", "Gala")]));
        assert_eq!(record.genus, "Malus");
        assert_eq!(record.species, "");
        assert_eq!(record.province, "");
        assert_eq!(record.city, "");
        assert_eq!(record.pedigree_description, "");
    }

    #[test]
    fn test_earlier_alias_wins() {
        let record = FieldNormalizer::default().normalize(&row(&[
            ("CN NUMBER", "LATE"),
            ("AC_NO", "MIDDLE"),
            ("ACNO", "EARLY"),
        ]));
        assert_eq!(record.accession_code, "EARLY");
        // Losing aliases are not consumed and stay in metadata
        assert_eq!(record.metadata.get("CN NUMBER").map(String::as_str), Some("LATE"));
        assert_eq!(record.metadata.get("AC_NO").map(String::as_str), Some("MIDDLE"));
        assert!(!record.metadata.contains_key("ACNO"));
    }

    #[test]
    fn test_exact_label_beats_earlier_case_folded_column() {
        let record = FieldNormalizer::default().normalize(&row(&[
            ("acno", "LOWER"),
            ("ACNO", "UPPER"),
            ("CULTIVAR NAME", "Gala"),
        ]));
        assert_eq!(record.accession_code, "UPPER");
        assert_eq!(record.metadata.get("acno").map(String::as_str), Some("LOWER"));
        assert!(!record.metadata.contains_key("ACNO"));
    }

    #[test]
    fn test_case_folded_match_used_without_exact_label() {
        let record = FieldNormalizer::default().normalize(&row(&[
            ("Cn Number", "LATE"),
            ("Acno", "EARLY"),
        ]));
        assert_eq!(record.accession_code, "EARLY");
    }

    #[test]
    fn test_empty_alias_falls_through() {
        let record = FieldNormalizer::default().normalize(&row(&[("ACNO", ""), ("AC_NO", "MAL0622")]));
        assert_eq!(record.accession_code, "MAL0622");
        assert_eq!(record.metadata.get("ACNO").map(String::as_str), Some(""));
    }

    #[test]
    fn test_label_match_ignores_case_and_padding() {
        let record = FieldNormalizer::default().normalize(&row(&[(" Cultivar Name ", " Fuji ")]));
        assert_eq!(record.cultivar_name, "Fuji");
    }

    #[test]
    fn test_taxon_fallback() {
        let record = FieldNormalizer::default().normalize(&row(&[
            ("Taxon", "Malus  sieversii var. kirghisorum"),
            ("CULTIVAR NAME", "Wild"),
        ]));
        assert_eq!(record.genus, "Malus");
        assert_eq!(record.species, "sieversii var. kirghisorum");
        assert!(!record.metadata.contains_key("Taxon"));
    }

    #[test]
    fn test_explicit_genus_species_beat_taxon() {
        let record = FieldNormalizer::default().normalize(&row(&[
            ("TAXON", "Pyrus communis"),
            ("GENUS", "Malus"),
            ("SPECIES", "domestica"),
        ]));
        assert_eq!(record.genus, "Malus");
        assert_eq!(record.species, "domestica");
        assert_eq!(record.metadata.get("TAXON").map(String::as_str), Some("Pyrus communis"));
    }

    #[test]
    fn test_taxon_fills_only_missing_species() {
        let record = FieldNormalizer::default().normalize(&row(&[
            ("GENUS", "Malus"),
            ("TAXON", "Malus baccata"),
        ]));
        assert_eq!(record.species, "baccata");
    }

    #[test]
    fn test_unmapped_columns_round_trip_into_metadata() {
        let record = FieldNormalizer::default().normalize(&row(&[
            ("CULTIVAR NAME", "Gala"),
            ("Fruit Colour ", "  red blush"),
            ("harvest_WEEK", "37"),
        ]));
        assert_eq!(record.metadata.len(), 2);
        assert_eq!(record.metadata.get("Fruit Colour ").map(String::as_str), Some("  red blush"));
        assert_eq!(record.metadata.get("harvest_WEEK").map(String::as_str), Some("37"));
    }

    #[test]
    fn test_missing_cultivar_still_normalizes() {
        let record = FieldNormalizer::default().normalize(&row(&[("ACNO", "MAL0999")]));
        assert!(!record.has_cultivar_name());
        assert_eq!(record.accession_code, "MAL0999");
    }

    #[test]
    fn test_custom_alias_table() {
        let aliases = AliasTable::empty()
            .with_aliases(CanonicalField::CultivarName, &["Sorte"])
            .with_aliases(CanonicalField::Country, &["Land"]);
        let normalizer = FieldNormalizer::new(aliases);

        let record = normalizer.normalize(&row(&[
            ("Sorte", "Boskoop"),
            ("Land", "NL"),
            ("CULTIVAR NAME", "ignored"),
        ]));
        assert_eq!(record.cultivar_name, "Boskoop");
        assert_eq!(record.country, "NL");
        assert_eq!(record.metadata.get("CULTIVAR NAME").map(String::as_str), Some("ignored"));
    }
}
