// MangaShelf - core/metadata.rs
//
// Metadata editing: a draft copy of an entry that is validated before it
// replaces the original. Also the seam for an external synopsis generator.

use crate::core::model::{LibraryEntry, TagCategory};
use crate::util::constants::{
    ADULT_TAG, MAX_RATING, MAX_TAGS_PER_CATEGORY, MAX_TAG_LENGTH, SYNOPSIS_MAX_WORDS,
};
use crate::util::error::MetadataError;

/// Produces descriptive text for an entry. Implementations talk to whatever
/// text-generation service the host application provides.
pub trait SynopsisGenerator {
    fn generate(&self, prompt: &str) -> Result<String, MetadataError>;
}

/// Editable copy of an entry. Changes do not touch the collection until
/// `finish` succeeds and the caller swaps the entry in with `replace_entry`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataDraft {
    entry: LibraryEntry,
}

impl MetadataDraft {
    pub fn new(entry: &LibraryEntry) -> Self {
        Self {
            entry: entry.clone(),
        }
    }

    pub fn entry(&self) -> &LibraryEntry {
        &self.entry
    }

    pub fn set_title(&mut self, title: &str) {
        self.entry.title = title.to_string();
    }

    pub fn set_description(&mut self, description: &str) {
        self.entry.description = description.to_string();
    }

    pub fn set_series(&mut self, series: Option<&str>) {
        self.entry.series = series
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    pub fn set_rating(&mut self, rating: f32) -> Result<(), MetadataError> {
        check_rating(rating)?;
        self.entry.rating = rating;
        Ok(())
    }

    /// Add a tag after trimming. Empty input and duplicates are ignored.
    /// Returns true if the tag was added.
    pub fn add_tag(&mut self, category: TagCategory, tag: &str) -> Result<bool, MetadataError> {
        let tag = tag.trim();
        if tag.is_empty() || self.entry.tags.contains(category, tag) {
            return Ok(false);
        }
        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(MetadataError::TagTooLong {
                tag: tag.to_string(),
                max_length: MAX_TAG_LENGTH,
            });
        }
        if self.entry.tags.len(category) >= MAX_TAGS_PER_CATEGORY {
            return Err(MetadataError::TooManyTags {
                category: category.label(),
                max: MAX_TAGS_PER_CATEGORY,
            });
        }
        Ok(self.entry.tags.insert(category, tag))
    }

    pub fn remove_tag(&mut self, category: TagCategory, tag: &str) -> bool {
        self.entry.tags.remove(category, tag)
    }

    pub fn is_adult(&self) -> bool {
        self.entry.is_adult()
    }

    /// Flip the adult-content marker. Returns the new state.
    pub fn toggle_adult(&mut self) -> bool {
        if self.entry.tags.remove(TagCategory::General, ADULT_TAG) {
            false
        } else {
            self.entry.tags.insert(TagCategory::General, ADULT_TAG);
            true
        }
    }

    /// Validate and hand back the edited entry.
    pub fn finish(self) -> Result<LibraryEntry, MetadataError> {
        let mut entry = self.entry;
        let title = entry.title.trim();
        if title.is_empty() {
            return Err(MetadataError::EmptyTitle { id: entry.id });
        }
        entry.title = title.to_string();
        check_rating(entry.rating)?;
        Ok(entry)
    }
}

fn check_rating(rating: f32) -> Result<(), MetadataError> {
    if rating.is_finite() && (0.0..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(MetadataError::InvalidRating {
            value: rating,
            max: MAX_RATING,
        })
    }
}

/// New collection with the entry sharing `edited.id` replaced.
/// If no entry has that id the collection is returned unchanged.
pub fn replace_entry(library: &[LibraryEntry], edited: LibraryEntry) -> Vec<LibraryEntry> {
    let mut edited = Some(edited);
    let updated: Vec<LibraryEntry> = library
        .iter()
        .map(|e| {
            if edited.as_ref().is_some_and(|new| new.id == e.id) {
                if let Some(new) = edited.take() {
                    return new;
                }
            }
            e.clone()
        })
        .collect();
    if let Some(unused) = edited {
        tracing::debug!(id = %unused.id, "Edited entry not in library; nothing replaced");
    }
    updated
}

/// Prompt sent to the synopsis generator.
pub fn synopsis_prompt(draft: &MetadataDraft) -> String {
    let entry = draft.entry();
    format!(
        "Write a compelling, professional, and concise synopsis (max {SYNOPSIS_MAX_WORDS} words) \
         for the manga series \"{}\". Context: \"{}\". Tags: {}.",
        entry.title,
        entry.description,
        entry.tags.general.join(", ")
    )
}

/// Ask `generator` for a new description. On failure the draft is left as it
/// was and the error is returned for the caller to report.
pub fn enhance_description(
    draft: &mut MetadataDraft,
    generator: &dyn SynopsisGenerator,
) -> Result<(), MetadataError> {
    let prompt = synopsis_prompt(draft);
    match generator.generate(&prompt) {
        Ok(text) if !text.trim().is_empty() => {
            draft.set_description(text.trim());
            tracing::debug!(id = %draft.entry().id, "Description replaced by generated synopsis");
            Ok(())
        }
        Ok(_) => {
            tracing::debug!(id = %draft.entry().id, "Generator returned no text; description kept");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(id = %draft.entry().id, error = %e, "Synopsis generation failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Format;

    struct Fixed(&'static str);

    impl SynopsisGenerator for Fixed {
        fn generate(&self, _prompt: &str) -> Result<String, MetadataError> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    impl SynopsisGenerator for Failing {
        fn generate(&self, _prompt: &str) -> Result<String, MetadataError> {
            Err(MetadataError::GenerationFailed {
                reason: "offline".to_string(),
            })
        }
    }

    fn sample() -> LibraryEntry {
        let mut e = LibraryEntry::new("1", "Sakura Blooming Days", Format::Cbz);
        e.description = "A young girl discovers her power.".to_string();
        e.tags.general = vec!["Fantasy".to_string(), "Magic".to_string()];
        e
    }

    #[test]
    fn test_add_tag_trims_and_dedupes() {
        let mut draft = MetadataDraft::new(&sample());
        assert!(draft.add_tag(TagCategory::Authors, "  Aiko Tanaka ").unwrap());
        assert!(!draft.add_tag(TagCategory::Authors, "Aiko Tanaka").unwrap());
        assert!(!draft.add_tag(TagCategory::Authors, "   ").unwrap());
        assert_eq!(draft.entry().tags.authors, vec!["Aiko Tanaka"]);
        assert!(draft.remove_tag(TagCategory::Authors, "Aiko Tanaka"));
    }

    #[test]
    fn test_add_tag_rejects_overlong() {
        let mut draft = MetadataDraft::new(&sample());
        let long = "x".repeat(MAX_TAG_LENGTH + 1);
        assert!(matches!(
            draft.add_tag(TagCategory::General, &long),
            Err(MetadataError::TagTooLong { .. })
        ));
    }

    #[test]
    fn test_toggle_adult() {
        let mut draft = MetadataDraft::new(&sample());
        assert!(!draft.is_adult());
        assert!(draft.toggle_adult());
        assert!(draft.is_adult());
        assert!(!draft.toggle_adult());
        assert_eq!(draft.entry().tags.general, vec!["Fantasy", "Magic"]);
    }

    #[test]
    fn test_finish_validates() {
        let mut draft = MetadataDraft::new(&sample());
        draft.set_title("   ");
        assert!(matches!(draft.finish(), Err(MetadataError::EmptyTitle { .. })));

        let mut draft = MetadataDraft::new(&sample());
        assert!(draft.set_rating(6.0).is_err());
        assert!(draft.set_rating(f32::NAN).is_err());
        draft.set_rating(4.5).unwrap();
        draft.set_title("  Renamed ");
        let entry = draft.finish().unwrap();
        assert_eq!(entry.title, "Renamed");
        assert_eq!(entry.rating, 4.5);
    }

    #[test]
    fn test_replace_entry() {
        let library = vec![sample(), LibraryEntry::new("2", "Other", Format::Zip)];
        let mut draft = MetadataDraft::new(&library[0]);
        draft.set_series(Some("Chronicles of the Heart"));
        let updated = replace_entry(&library, draft.finish().unwrap());
        assert_eq!(updated.len(), 2);
        assert_eq!(updated[0].series.as_deref(), Some("Chronicles of the Heart"));
        assert_eq!(updated[1], library[1]);

        let stray = LibraryEntry::new("9", "Stray", Format::Pdf);
        assert_eq!(replace_entry(&library, stray), library);
    }

    #[test]
    fn test_synopsis_prompt_mentions_title_and_tags() {
        let draft = MetadataDraft::new(&sample());
        let prompt = synopsis_prompt(&draft);
        assert!(prompt.contains("\"Sakura Blooming Days\""));
        assert!(prompt.contains("Tags: Fantasy, Magic."));
        assert!(prompt.contains("max 100 words"));
    }

    #[test]
    fn test_enhance_description() {
        let mut draft = MetadataDraft::new(&sample());
        enhance_description(&mut draft, &Fixed(" A new synopsis. ")).unwrap();
        assert_eq!(draft.entry().description, "A new synopsis.");

        let before = draft.clone();
        assert!(enhance_description(&mut draft, &Failing).is_err());
        assert_eq!(draft, before);
    }
}
