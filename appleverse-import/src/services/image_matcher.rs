//! Image-to-record matching
//!
//! Links loose image files to records by substring containment over three
//! identifiers, tried in priority order:
//! 1. accession code in the lowercased, extension-less filename
//! 2. cultivar name (alphanumerics only) in the filename (alphanumerics only),
//!    when the trimmed cultivar name is longer than 2 characters
//! 3. accession number in the lowercased, extension-less filename
//!
//! Every image is checked against every record. One image may link to many
//! records; an image matching none stays unlinked.

use crate::models::record::strip_extension;
use crate::models::{CanonicalRecord, ImageFile};
use serde::{Deserialize, Serialize};

/// Cultivar names shorter than this are never substring-matched
const MIN_CULTIVAR_MATCH_LEN: usize = 3;

/// Rule that linked an image to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    AccessionCode,
    CultivarName,
    AccessionNumber,
}

/// Matching statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    pub images_scanned: usize,
    /// Images linked to at least one record
    pub images_linked: usize,
    /// Entries appended across all records
    pub links_added: usize,
}

impl MatchStats {
    pub fn display_string(&self) -> String {
        format!(
            "{} of {} images linked ({} links)",
            self.images_linked, self.images_scanned, self.links_added
        )
    }
}

/// Lowercased keys compared for one image
struct ImageKeys {
    plain: String,
    alnum: String,
}

impl ImageKeys {
    fn new(image: &ImageFile) -> Self {
        let plain = strip_extension(&image.name).to_lowercase();
        let alnum = alphanumeric_lower(&plain);
        Self { plain, alnum }
    }
}

/// Lowercased keys compared for one record
struct RecordKeys {
    accession_code: String,
    cultivar: String,
    cultivar_len: usize,
    accession_number: String,
}

impl RecordKeys {
    fn new(record: &CanonicalRecord) -> Self {
        Self {
            accession_code: record.accession_code.trim().to_lowercase(),
            cultivar: alphanumeric_lower(&record.cultivar_name),
            cultivar_len: record.cultivar_name.trim().chars().count(),
            accession_number: record.accession_number.trim().to_lowercase(),
        }
    }

    fn matches(&self, image: &ImageKeys) -> Option<MatchRule> {
        if !self.accession_code.is_empty() && image.plain.contains(&self.accession_code) {
            return Some(MatchRule::AccessionCode);
        }
        if self.cultivar_len >= MIN_CULTIVAR_MATCH_LEN
            && !self.cultivar.is_empty()
            && image.alnum.contains(&self.cultivar)
        {
            return Some(MatchRule::CultivarName);
        }
        if !self.accession_number.is_empty() && image.plain.contains(&self.accession_number) {
            return Some(MatchRule::AccessionNumber);
        }
        None
    }
}

fn alphanumeric_lower(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Which rule, if any, links `image` to `record`
pub fn match_rule(image: &ImageFile, record: &CanonicalRecord) -> Option<MatchRule> {
    RecordKeys::new(record).matches(&ImageKeys::new(image))
}

/// Image matcher
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageMatcher;

impl ImageMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Append matching image paths to each record's `images`
    pub fn link_images(&self, records: &mut [CanonicalRecord], images: &[ImageFile]) -> MatchStats {
        let record_keys: Vec<RecordKeys> = records.iter().map(RecordKeys::new).collect();
        let mut stats = MatchStats {
            images_scanned: images.len(),
            ..Default::default()
        };

        for image in images {
            let image_keys = ImageKeys::new(image);
            let mut linked = false;

            for (record, keys) in records.iter_mut().zip(&record_keys) {
                if let Some(rule) = keys.matches(&image_keys) {
                    linked = true;
                    if record.add_image(&image.path) {
                        stats.links_added += 1;
                        tracing::trace!(
                            image = %image.name,
                            record = %record.display_name(),
                            ?rule,
                            "Linked image"
                        );
                    }
                }
            }

            if linked {
                stats.images_linked += 1;
            }
        }

        stats
    }
}
