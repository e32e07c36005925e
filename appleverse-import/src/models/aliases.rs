//! Column alias table
//!
//! Every canonical field has an ordered list of column labels it has been
//! published under across dataset revisions. Order is priority: when several
//! aliases carry a value in the same row, the earliest one wins.

/// Canonical record fields filled from source columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalField {
    AccessionCode,
    CultivarName,
    AccessionNumber,
    Genus,
    Species,
    Country,
    Province,
    City,
    PedigreeDescription,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 9] = [
        CanonicalField::AccessionCode,
        CanonicalField::CultivarName,
        CanonicalField::AccessionNumber,
        CanonicalField::Genus,
        CanonicalField::Species,
        CanonicalField::Country,
        CanonicalField::Province,
        CanonicalField::City,
        CanonicalField::PedigreeDescription,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CanonicalField::AccessionCode => "accessionCode",
            CanonicalField::CultivarName => "cultivarName",
            CanonicalField::AccessionNumber => "accessionNumber",
            CanonicalField::Genus => "genus",
            CanonicalField::Species => "species",
            CanonicalField::Country => "country",
            CanonicalField::Province => "province",
            CanonicalField::City => "city",
            CanonicalField::PedigreeDescription => "pedigreeDescription",
        }
    }
}

/// Historical column labels per canonical field, highest priority first
pub static DEFAULT_FIELD_ALIASES: &[(CanonicalField, &[&str])] = &[
    (
        CanonicalField::AccessionCode,
        &[
            "ACNO",
            "acno",
            "AC_NO",
            "CN NUMBER",
            "ACCESSION CODE",
            "ACCESSION_CODE",
            "accessionCode",
        ],
    ),
    (
        CanonicalField::CultivarName,
        &[
            "CULTIVAR NAME",
            "CULTIVAR_NAME",
            "cultivarName",
            "CULTIVAR",
            "PLANT NAME",
            "PLANT_NAME",
            "NAME",
        ],
    ),
    (
        CanonicalField::AccessionNumber,
        &[
            "ACCESSION NUMBER",
            "ACCESSION_NUMBER",
            "accessionNumber",
            "ACCESSION",
            "ACCESSION_NO",
            "PI NUMBER",
        ],
    ),
    (CanonicalField::Genus, &["GENUS", "E_GENUS", "genus"]),
    (CanonicalField::Species, &["SPECIES", "E_SPECIES", "species"]),
    (
        CanonicalField::Country,
        &[
            "E_ORIGIN_COUNTRY",
            "ORIGIN COUNTRY",
            "ORIGIN_COUNTRY",
            "COUNTRY",
            "country",
        ],
    ),
    (
        CanonicalField::Province,
        &[
            "E_ORIGIN_PROVINCE",
            "E_ORIGIN_STATE",
            "ORIGIN PROVINCE",
            "PROVINCE",
            "STATE",
            "province",
        ],
    ),
    (
        CanonicalField::City,
        &["E_ORIGIN_CITY", "ORIGIN CITY", "CITY", "city"],
    ),
    (
        CanonicalField::PedigreeDescription,
        &[
            "PEDIGREE DESCRIPTION",
            "PEDIGREE_DESCRIPTION",
            "pedigreeDescription",
            "PEDIGREE",
            "E_PEDIGREE",
        ],
    ),
];

/// Combined "Genus species" columns, used only as a fallback
pub static DEFAULT_TAXON_ALIASES: &[&str] = &["TAXON", "TAXONOMY", "taxon"];

/// Ordered alias lists for every canonical field plus the taxon fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    fields: Vec<(CanonicalField, Vec<String>)>,
    taxon: Vec<String>,
}

impl AliasTable {
    /// Table with no aliases at all
    pub fn empty() -> Self {
        Self {
            fields: CanonicalField::ALL
                .iter()
                .map(|field| (*field, Vec::new()))
                .collect(),
            taxon: Vec::new(),
        }
    }

    /// Aliases for `field`, highest priority first
    pub fn aliases(&self, field: CanonicalField) -> &[String] {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, aliases)| aliases.as_slice())
            .unwrap_or(&[])
    }

    pub fn taxon_aliases(&self) -> &[String] {
        &self.taxon
    }

    /// Append an alias at the lowest priority for `field`
    pub fn push_alias(&mut self, field: CanonicalField, alias: impl Into<String>) {
        let alias = alias.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some((_, aliases)) => aliases.push(alias),
            None => self.fields.push((field, vec![alias])),
        }
    }

    pub fn push_taxon_alias(&mut self, alias: impl Into<String>) {
        self.taxon.push(alias.into());
    }

    /// Builder form of [`push_alias`](Self::push_alias)
    pub fn with_aliases(mut self, field: CanonicalField, aliases: &[&str]) -> Self {
        for alias in aliases {
            self.push_alias(field, *alias);
        }
        self
    }

    pub fn with_taxon_aliases(mut self, aliases: &[&str]) -> Self {
        for alias in aliases {
            self.push_taxon_alias(*alias);
        }
        self
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        let table = DEFAULT_FIELD_ALIASES
            .iter()
            .fold(AliasTable::empty(), |table, (field, aliases)| {
                table.with_aliases(*field, aliases)
            });
        table.with_taxon_aliases(DEFAULT_TAXON_ALIASES)
    }
}
