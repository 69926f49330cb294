// MangaShelf - core/reader.rs
//
// Reader navigation state: page turning, tap zones, progress slider, and
// chapter-to-chapter stepping. Rendering is someone else's job; this module
// only decides which page or chapter comes next.

use crate::core::model::{Chapter, LibraryEntry};
use crate::util::constants::{PAGES_PER_CHAPTER, READER_NEXT_ZONE, READER_PREV_ZONE};
use serde::{Deserialize, Serialize};

/// How pages are laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    /// One page at a time, tap zones turn pages.
    #[default]
    Horizontal,
    /// Continuous scroll; progress tracked as a percentage.
    Vertical,
}

/// Result of a page-turn request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderStep {
    /// Moved to this zero-based page.
    Page(usize),
    /// Past the last page: the caller should open the next chapter.
    NextChapter,
    /// Before the first page: the caller should open the previous chapter.
    PrevChapter,
}

/// What a tap on the page area did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    ClosedSettings,
    ToggledControls,
    Turned(ReaderStep),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderState {
    pub mode: ReadMode,
    /// Zero-based current page (horizontal mode).
    pub page: usize,
    pub page_count: usize,
    /// 0.0 to 100.0 (vertical mode).
    pub scroll_progress: f32,
    pub controls_visible: bool,
    pub settings_open: bool,
}

impl Default for ReaderState {
    fn default() -> Self {
        Self::new(PAGES_PER_CHAPTER)
    }
}

impl ReaderState {
    pub fn new(page_count: usize) -> Self {
        Self {
            mode: ReadMode::Horizontal,
            page: 0,
            page_count: page_count.max(1),
            scroll_progress: 0.0,
            controls_visible: true,
            settings_open: false,
        }
    }

    /// Back to the first page; called whenever the chapter changes.
    pub fn reset(&mut self) {
        self.page = 0;
        self.scroll_progress = 0.0;
    }

    pub fn set_mode(&mut self, mode: ReadMode) {
        self.mode = mode;
    }

    pub fn toggle_controls(&mut self) {
        self.controls_visible = !self.controls_visible;
    }

    pub fn next_page(&mut self) -> ReaderStep {
        if self.page + 1 < self.page_count {
            self.page += 1;
            ReaderStep::Page(self.page)
        } else {
            ReaderStep::NextChapter
        }
    }

    pub fn prev_page(&mut self) -> ReaderStep {
        if self.page > 0 {
            self.page -= 1;
            ReaderStep::Page(self.page)
        } else {
            ReaderStep::PrevChapter
        }
    }

    /// Handle a tap at horizontal position `x` within a page area `width` wide.
    pub fn tap(&mut self, x: f32, width: f32) -> TapOutcome {
        if self.settings_open {
            self.settings_open = false;
            return TapOutcome::ClosedSettings;
        }
        if self.mode == ReadMode::Vertical || width <= 0.0 {
            self.toggle_controls();
            return TapOutcome::ToggledControls;
        }

        let fraction = x / width;
        if fraction <= READER_PREV_ZONE {
            TapOutcome::Turned(self.prev_page())
        } else if fraction >= READER_NEXT_ZONE {
            TapOutcome::Turned(self.next_page())
        } else {
            self.toggle_controls();
            TapOutcome::ToggledControls
        }
    }

    /// Apply a slider value: a page index in horizontal mode, a percentage
    /// in vertical mode. Values are clamped to the valid range.
    pub fn set_slider(&mut self, value: f32) {
        if !value.is_finite() {
            return;
        }
        match self.mode {
            ReadMode::Horizontal => {
                let last = self.page_count.saturating_sub(1) as f32;
                self.page = value.round().clamp(0.0, last) as usize;
            }
            ReadMode::Vertical => {
                self.scroll_progress = value.clamp(0.0, 100.0);
            }
        }
    }

    /// Update vertical progress from a scroll position. Content that fits in
    /// the viewport leaves progress unchanged.
    pub fn scroll(&mut self, scroll_top: f32, scroll_height: f32, client_height: f32) {
        if scroll_height <= client_height {
            return;
        }
        let progress = scroll_top / (scroll_height - client_height) * 100.0;
        self.scroll_progress = progress.clamp(0.0, 100.0);
    }

    /// "page / count" indicator text, one-based.
    pub fn page_indicator(&self) -> String {
        format!("{} / {}", self.page + 1, self.page_count)
    }
}

// =============================================================================
// Chapter order
// =============================================================================

/// The chapter reading starts with: the first one in stored order.
pub fn first_chapter(entry: &LibraryEntry) -> Option<&Chapter> {
    entry.chapters.first()
}

/// The chapter with the smallest number greater than `current_id`'s.
pub fn next_chapter<'a>(entry: &'a LibraryEntry, current_id: &str) -> Option<&'a Chapter> {
    let current = entry.chapter(current_id)?.number;
    entry
        .chapters
        .iter()
        .filter(|c| c.number > current)
        .min_by_key(|c| c.number)
}

/// The chapter with the largest number smaller than `current_id`'s.
pub fn prev_chapter<'a>(entry: &'a LibraryEntry, current_id: &str) -> Option<&'a Chapter> {
    let current = entry.chapter(current_id)?.number;
    entry
        .chapters
        .iter()
        .filter(|c| c.number < current)
        .max_by_key(|c| c.number)
}

/// Mark a chapter read and remember it as the last one read.
/// Returns false if the chapter is not part of the entry.
pub fn mark_chapter_read(entry: &mut LibraryEntry, chapter_id: &str) -> bool {
    let Some(chapter) = entry.chapters.iter_mut().find(|c| c.id == chapter_id) else {
        return false;
    };
    chapter.read = true;
    entry.last_read_chapter_id = Some(chapter_id.to_string());
    true
}
