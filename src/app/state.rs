// MangaShelf - app/state.rs
//
// Application state management. A single owner holds the collection, the
// active view, the open dialog, view options and the library selection.
// Every change goes through `AppState::apply`, which returns a `Notice` for
// the front-end to show (or a confirmation it must ask for).

use crate::core::browse;
use crate::core::filter::{self, LibraryFilter};
use crate::core::merge;
use crate::core::metadata;
use crate::core::model::{Chapter, LibraryEntry};
use crate::core::reader::{self, ReaderState, ReaderStep};
use crate::core::selection::{BatchAction, Selection};
use crate::core::sort::{self, SortRule};
use crate::platform::config::AppConfig;
use crate::util::constants::MERGE_NEEDS_TWO_MESSAGE;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Views, dialogs and preferences
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Home,
    Library,
    Detail,
    Reader,
    Settings,
    Browse,
    History,
}

impl View {
    /// Map a navigation tab to its view. Unknown tabs return `None`.
    pub fn from_tab(tab: &str) -> Option<View> {
        match tab {
            "home" => Some(View::Home),
            "library" => Some(View::Library),
            "browse" => Some(View::Browse),
            "read" | "history" => Some(View::History),
            "settings" => Some(View::Settings),
            _ => None,
        }
    }
}

/// The dialog currently open over the active view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modal {
    EditMetadata {
        entry_id: String,
    },
    /// Candidate ids in the order they were offered; `target` is one of them.
    Merge {
        candidates: Vec<String>,
        target: String,
    },
    AddChapters {
        entry_id: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Fluent,
    Pink,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fluent" => Ok(Theme::Fluent),
            "pink" => Ok(Theme::Pink),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Fluent => "fluent",
            Theme::Pink => "pink",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    #[default]
    Comfortable,
    Compact,
}

impl FromStr for Density {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "comfortable" => Ok(Density::Comfortable),
            "compact" => Ok(Density::Compact),
            other => Err(format!("unknown density '{other}'")),
        }
    }
}

/// Start-up preferences, normally taken from `config.toml`.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub adult_mode: bool,
    pub theme: Theme,
    pub dark_mode: bool,
    pub density: Density,
    pub sort_rules: Vec<SortRule>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            adult_mode: false,
            theme: Theme::default(),
            dark_mode: false,
            density: Density::default(),
            sort_rules: sort::default_rules(),
        }
    }
}

impl Preferences {
    /// Config values are validated at load time; anything unparseable here
    /// falls back to the default.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            adult_mode: config.show_adult,
            theme: config.theme.parse().unwrap_or_default(),
            dark_mode: config.dark_mode,
            density: config.density.parse().unwrap_or_default(),
            sort_rules: config.sort_rules.clone(),
        }
    }
}

// =============================================================================
// Actions and notices
// =============================================================================

/// Entries of the per-item context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextAction {
    Read,
    Edit,
    Detail,
    Delete,
    AddChapters,
}

/// A destructive action waiting for the user's approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingConfirm {
    /// Remove these entries from the collection (files on disk are untouched).
    DeleteEntries(Vec<String>),
}

impl PendingConfirm {
    /// Question to put to the user.
    pub fn message(&self, library: &[LibraryEntry]) -> String {
        match self {
            PendingConfirm::DeleteEntries(ids) => match ids.as_slice() {
                [id] => {
                    let title = library
                        .iter()
                        .find(|e| &e.id == id)
                        .map_or(id.as_str(), |e| e.title.as_str());
                    format!("Delete \"{title}\"?")
                }
                _ => format!("Are you sure you want to delete {} items?", ids.len()),
            },
        }
    }
}

/// Everything that can change the state.
#[derive(Debug, Clone)]
pub enum Action {
    // -- Navigation --
    ChangeTab(String),
    OpenEntry(String),
    StartReading(String),
    OpenChapter(String),
    CloseReader,
    BackToLibrary,
    NextPage,
    PrevPage,

    // -- Settings --
    SetAdultMode(bool),
    SetTheme(Theme),
    ToggleDarkMode,
    SetDensity(Density),

    // -- View options --
    SetSearch(String),
    SetFilter(LibraryFilter),
    SetSortRules(Vec<SortRule>),
    UpdateSortRule(usize, SortRule),

    // -- Selection --
    EnterSelection,
    ExitSelection,
    ToggleSelectionMode,
    ToggleSelected(String),
    ToggleSelectAll,
    Batch(BatchAction),
    Confirmed(PendingConfirm),

    Context(ContextAction, String),

    // -- Merge --
    RequestMerge(Vec<String>),
    ChooseMergeTarget(String),
    ConfirmMerge,
    OpenAddChapters,
    ConfirmAddChapters(Vec<String>),

    // -- Metadata --
    OpenEditor,
    SaveMetadata(LibraryEntry),
    CloseModal,

    MarkChapterRead(String),

    /// Add entries built by the file-system browser; known ids are skipped.
    Import(Vec<LibraryEntry>),

    // -- Refresh --
    RefreshStarted,
    RefreshFinished(Option<Vec<LibraryEntry>>),
}

/// What the front-end should tell the user after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Nothing to report.
    Quiet,
    /// Informational status line.
    Info(String),
    /// The action was refused; show the reason.
    Rejected(String),
    /// Ask the user, then dispatch `Action::Confirmed` if they agree.
    NeedsConfirmation(PendingConfirm),
}

// =============================================================================
// State
// =============================================================================

/// Top-level application state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    /// The collection.
    pub library: Vec<LibraryEntry>,

    pub view: View,
    pub active_tab: String,

    /// Entry shown in the detail view and the reader.
    pub selected_id: Option<String>,

    /// Chapter open in the reader.
    pub current_chapter_id: Option<String>,

    pub modal: Option<Modal>,

    pub adult_mode: bool,
    pub theme: Theme,
    pub dark_mode: bool,
    pub density: Density,

    /// Whether a reload from the data source is running.
    pub refreshing: bool,

    /// Current filter. Rebuilt from defaults after deserialisation.
    #[serde(skip)]
    pub filter: LibraryFilter,

    pub sort_rules: Vec<SortRule>,

    /// Indices into `library` of the displayed entries, in display order.
    #[serde(skip)]
    pub visible: Vec<usize>,

    /// Library-view batch selection.
    pub selection: Selection,

    pub reader: ReaderState,

    /// Status message for the status line.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(library: Vec<LibraryEntry>, prefs: Preferences) -> Self {
        let filter = LibraryFilter {
            show_adult: prefs.adult_mode,
            ..Default::default()
        };
        let mut state = Self {
            library,
            view: View::Home,
            active_tab: "home".to_string(),
            selected_id: None,
            current_chapter_id: None,
            modal: None,
            adult_mode: prefs.adult_mode,
            theme: prefs.theme,
            dark_mode: prefs.dark_mode,
            density: prefs.density,
            refreshing: false,
            filter,
            sort_rules: prefs.sort_rules,
            visible: Vec::new(),
            selection: Selection::default(),
            reader: ReaderState::default(),
            status_message: None,
        };
        state.refresh_view();
        state
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn entry(&self, id: &str) -> Option<&LibraryEntry> {
        self.library.iter().find(|e| e.id == id)
    }

    pub fn selected_entry(&self) -> Option<&LibraryEntry> {
        self.selected_id.as_deref().and_then(|id| self.entry(id))
    }

    pub fn current_chapter(&self) -> Option<&Chapter> {
        let id = self.current_chapter_id.as_deref()?;
        self.selected_entry()?.chapter(id)
    }

    /// Displayed entries in display order.
    pub fn visible_entries(&self) -> Vec<&LibraryEntry> {
        self.visible.iter().map(|&i| &self.library[i]).collect()
    }

    pub fn visible_ids(&self) -> Vec<&str> {
        self.visible
            .iter()
            .map(|&i| self.library[i].id.as_str())
            .collect()
    }

    /// The collection with the adult gate applied, in library order. Used by
    /// the home and history views.
    pub fn gated_library(&self) -> Vec<LibraryEntry> {
        self.library
            .iter()
            .filter(|e| self.adult_mode || !e.is_adult())
            .cloned()
            .collect()
    }

    /// Recompute the displayed list and drop selected ids that left it.
    pub fn refresh_view(&mut self) {
        // The filter is not serialised; the adult gate follows the setting.
        self.filter.show_adult = self.adult_mode;
        self.visible = filter::derive_view(&self.library, &self.filter, &self.sort_rules);
        let visible: Vec<&str> = self
            .visible
            .iter()
            .map(|&i| self.library[i].id.as_str())
            .collect();
        let pruned = self.selection.retain_visible(&visible);
        if pruned > 0 {
            tracing::debug!(pruned, "Selection pruned to visible entries");
        }
    }

    // -------------------------------------------------------------------------
    // Reducer
    // -------------------------------------------------------------------------

    /// Apply an action using today's UTC date for merges.
    pub fn apply(&mut self, action: Action) -> Notice {
        self.apply_on(action, chrono::Utc::now().date_naive())
    }

    /// Apply an action; `today` dates chapters created by merges.
    pub fn apply_on(&mut self, action: Action, today: NaiveDate) -> Notice {
        tracing::trace!(?action, "Applying action");
        let notice = match action {
            Action::ChangeTab(tab) => {
                self.change_tab(&tab);
                Notice::Quiet
            }
            Action::OpenEntry(id) => {
                self.open_entry(&id);
                Notice::Quiet
            }
            Action::StartReading(id) => {
                self.start_reading(&id);
                Notice::Quiet
            }
            Action::OpenChapter(chapter_id) => {
                let known = self
                    .selected_entry()
                    .is_some_and(|e| e.chapter(&chapter_id).is_some());
                if known {
                    self.current_chapter_id = Some(chapter_id);
                    self.view = View::Reader;
                    self.reader.reset();
                }
                Notice::Quiet
            }
            Action::CloseReader => {
                self.view = View::Detail;
                self.current_chapter_id = None;
                Notice::Quiet
            }
            Action::BackToLibrary => {
                self.view = View::Library;
                self.active_tab = "library".to_string();
                self.selected_id = None;
                self.current_chapter_id = None;
                Notice::Quiet
            }
            Action::NextPage => {
                let step = self.reader.next_page();
                self.follow_reader_step(step);
                Notice::Quiet
            }
            Action::PrevPage => {
                let step = self.reader.prev_page();
                self.follow_reader_step(step);
                Notice::Quiet
            }

            Action::SetAdultMode(on) => {
                self.adult_mode = on;
                self.filter.show_adult = on;
                self.refresh_view();
                Notice::Quiet
            }
            Action::SetTheme(theme) => {
                self.theme = theme;
                Notice::Quiet
            }
            Action::ToggleDarkMode => {
                self.dark_mode = !self.dark_mode;
                Notice::Quiet
            }
            Action::SetDensity(density) => {
                self.density = density;
                Notice::Quiet
            }

            Action::SetSearch(text) => {
                self.filter.text_search = text;
                self.refresh_view();
                Notice::Quiet
            }
            Action::SetFilter(mut filter) => {
                // The adult gate follows the settings toggle, not the filter panel.
                filter.show_adult = self.adult_mode;
                self.filter = filter;
                self.refresh_view();
                Notice::Quiet
            }
            Action::SetSortRules(rules) => {
                self.sort_rules = rules;
                self.refresh_view();
                Notice::Quiet
            }
            Action::UpdateSortRule(index, rule) => {
                match self.sort_rules.get_mut(index) {
                    Some(slot) => *slot = rule,
                    None => self.sort_rules.push(rule),
                }
                self.refresh_view();
                Notice::Quiet
            }

            Action::EnterSelection => {
                self.selection.enter();
                Notice::Quiet
            }
            Action::ExitSelection => {
                self.selection.exit();
                Notice::Quiet
            }
            Action::ToggleSelectionMode => {
                self.selection.toggle_mode();
                Notice::Quiet
            }
            Action::ToggleSelected(id) => {
                if self.selection.is_active() && self.visible_ids().contains(&id.as_str()) {
                    self.selection.toggle(&id);
                }
                Notice::Quiet
            }
            Action::ToggleSelectAll => {
                if self.selection.is_active() {
                    let visible: Vec<String> =
                        self.visible_ids().into_iter().map(str::to_string).collect();
                    let refs: Vec<&str> = visible.iter().map(String::as_str).collect();
                    self.selection.toggle_all(&refs);
                }
                Notice::Quiet
            }
            Action::Batch(batch) => self.batch(batch),
            Action::Confirmed(pending) => self.confirmed(pending),

            Action::Context(action, id) => self.context(action, id),

            Action::RequestMerge(ids) => self.request_merge(&ids),
            Action::ChooseMergeTarget(id) => {
                if let Some(Modal::Merge { candidates, target }) = &mut self.modal {
                    if candidates.contains(&id) {
                        *target = id;
                    }
                }
                Notice::Quiet
            }
            Action::ConfirmMerge => self.confirm_merge(today),
            Action::OpenAddChapters => {
                if let Some(id) = self.selected_entry().map(|e| e.id.clone()) {
                    self.modal = Some(Modal::AddChapters { entry_id: id });
                }
                Notice::Quiet
            }
            Action::ConfirmAddChapters(source_ids) => self.confirm_add_chapters(&source_ids, today),

            Action::OpenEditor => {
                if let Some(id) = self.selected_entry().map(|e| e.id.clone()) {
                    self.modal = Some(Modal::EditMetadata { entry_id: id });
                }
                Notice::Quiet
            }
            Action::SaveMetadata(entry) => {
                let title = entry.title.clone();
                self.library = metadata::replace_entry(&self.library, entry);
                if matches!(self.modal, Some(Modal::EditMetadata { .. })) {
                    self.modal = None;
                }
                self.refresh_view();
                Notice::Info(format!("Saved \"{title}\""))
            }
            Action::CloseModal => {
                self.modal = None;
                Notice::Quiet
            }

            Action::MarkChapterRead(chapter_id) => {
                let selected = self.selected_id.clone();
                if let Some(entry) = self
                    .library
                    .iter_mut()
                    .find(|e| Some(&e.id) == selected.as_ref())
                {
                    reader::mark_chapter_read(entry, &chapter_id);
                }
                Notice::Quiet
            }

            Action::Import(entries) => {
                if entries.is_empty() {
                    return Notice::Quiet;
                }
                let offered = entries.len();
                let (library, added) = browse::merge_imported(&self.library, entries);
                self.library = library;
                self.refresh_view();
                tracing::info!(offered, added, "Imported entries");
                Notice::Info(format!("Imported {added} of {offered} items."))
            }

            Action::RefreshStarted => {
                self.refreshing = true;
                Notice::Quiet
            }
            Action::RefreshFinished(reloaded) => {
                self.refreshing = false;
                match reloaded {
                    Some(library) => {
                        let count = library.len();
                        self.replace_library(library);
                        Notice::Info(format!("Library refreshed ({count} items)"))
                    }
                    None => Notice::Rejected("Refresh failed; showing the previous library.".to_string()),
                }
            }
        };

        if let Notice::Info(ref msg) | Notice::Rejected(ref msg) = notice {
            self.status_message = Some(msg.clone());
        }
        notice
    }

    // -------------------------------------------------------------------------
    // Navigation helpers
    // -------------------------------------------------------------------------

    fn change_tab(&mut self, tab: &str) {
        match View::from_tab(tab) {
            Some(view) => {
                self.active_tab = tab.to_string();
                self.view = view;
                self.selected_id = None;
                self.current_chapter_id = None;
            }
            None => {
                tracing::debug!(tab, "Unknown tab; going home");
                self.active_tab = "home".to_string();
                self.view = View::Home;
            }
        }
    }

    fn open_entry(&mut self, id: &str) {
        if self.entry(id).is_some() {
            self.selected_id = Some(id.to_string());
            self.current_chapter_id = None;
            self.view = View::Detail;
        }
    }

    fn start_reading(&mut self, id: &str) {
        let Some(first) = self
            .entry(id)
            .and_then(reader::first_chapter)
            .map(|c| c.id.clone())
        else {
            tracing::debug!(id, "Nothing to read");
            return;
        };
        self.selected_id = Some(id.to_string());
        self.current_chapter_id = Some(first);
        self.view = View::Reader;
        self.reader.reset();
    }

    fn follow_reader_step(&mut self, step: ReaderStep) {
        let (Some(entry), Some(current)) = (self.selected_entry(), self.current_chapter_id.as_deref())
        else {
            return;
        };
        let next = match step {
            ReaderStep::Page(_) => return,
            ReaderStep::NextChapter => reader::next_chapter(entry, current),
            ReaderStep::PrevChapter => reader::prev_chapter(entry, current),
        };
        if let Some(chapter) = next.map(|c| c.id.clone()) {
            self.current_chapter_id = Some(chapter);
            self.reader.reset();
        }
    }

    // -------------------------------------------------------------------------
    // Batch and context actions
    // -------------------------------------------------------------------------

    fn batch(&mut self, action: BatchAction) -> Notice {
        if let Err(rejection) = self.selection.check_batch(action) {
            return match rejection.message() {
                Some(msg) => Notice::Rejected(msg.to_string()),
                None => Notice::Quiet,
            };
        }

        let ids = self
            .selection
            .selected_in_order(self.library.iter().map(|e| e.id.as_str()));

        match action {
            BatchAction::MarkRead => {
                for entry in self.library.iter_mut().filter(|e| ids.contains(&e.id)) {
                    entry.mark_all_read();
                }
                self.selection.exit();
                Notice::Info(format!("Marked {} items as read.", ids.len()))
            }
            BatchAction::Merge => {
                let notice = self.request_merge(&ids);
                self.selection.exit();
                notice
            }
            BatchAction::Delete => Notice::NeedsConfirmation(PendingConfirm::DeleteEntries(ids)),
        }
    }

    fn confirmed(&mut self, pending: PendingConfirm) -> Notice {
        match pending {
            PendingConfirm::DeleteEntries(ids) => {
                let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
                let before = self.library.len();
                self.library.retain(|e| !doomed.contains(e.id.as_str()));
                let removed = before - self.library.len();

                if self
                    .selected_id
                    .as_deref()
                    .is_some_and(|id| doomed.contains(id))
                {
                    self.selected_id = None;
                    self.current_chapter_id = None;
                    self.modal = None;
                    if matches!(self.view, View::Detail | View::Reader) {
                        self.view = View::Library;
                        self.active_tab = "library".to_string();
                    }
                }
                self.selection.exit();
                self.refresh_view();

                tracing::info!(removed, "Entries deleted from library");
                Notice::Info(format!("Deleted {removed} items."))
            }
        }
    }

    fn context(&mut self, action: ContextAction, id: String) -> Notice {
        if self.entry(&id).is_none() {
            return Notice::Quiet;
        }
        match action {
            ContextAction::Read => self.start_reading(&id),
            ContextAction::Detail => self.open_entry(&id),
            ContextAction::Edit => {
                self.selected_id = Some(id.clone());
                self.modal = Some(Modal::EditMetadata { entry_id: id });
            }
            ContextAction::AddChapters => {
                self.selected_id = Some(id.clone());
                self.modal = Some(Modal::AddChapters { entry_id: id });
            }
            ContextAction::Delete => {
                return Notice::NeedsConfirmation(PendingConfirm::DeleteEntries(vec![id]));
            }
        }
        Notice::Quiet
    }

    // -------------------------------------------------------------------------
    // Merge helpers
    // -------------------------------------------------------------------------

    /// Candidates keep the order `ids` were supplied in; unknown and
    /// repeated ids are dropped.
    fn request_merge(&mut self, ids: &[String]) -> Notice {
        let mut candidates: Vec<LibraryEntry> = Vec::with_capacity(ids.len());
        for id in ids {
            if candidates.iter().any(|c| &c.id == id) {
                continue;
            }
            if let Some(entry) = self.entry(id) {
                candidates.push(entry.clone());
            }
        }
        if candidates.len() < 2 {
            return Notice::Rejected(MERGE_NEEDS_TWO_MESSAGE.to_string());
        }
        let Some(target) = merge::default_merge_target(&candidates).map(str::to_string) else {
            return Notice::Quiet;
        };
        self.modal = Some(Modal::Merge {
            candidates: candidates.into_iter().map(|e| e.id).collect(),
            target,
        });
        Notice::Quiet
    }

    fn confirm_merge(&mut self, today: NaiveDate) -> Notice {
        let Some(Modal::Merge { candidates, target }) = self.modal.take() else {
            return Notice::Quiet;
        };
        let sources = merge::merge_sources(&candidates, &target);
        self.merge_into(&target, &sources, today)
    }

    fn confirm_add_chapters(&mut self, source_ids: &[String], today: NaiveDate) -> Notice {
        let Some(Modal::AddChapters { entry_id }) = self.modal.take() else {
            return Notice::Quiet;
        };
        self.merge_into(&entry_id, source_ids, today)
    }

    fn merge_into(&mut self, target_id: &str, source_ids: &[String], today: NaiveDate) -> Notice {
        match merge::merge_entries(&self.library, target_id, source_ids, today) {
            Some(outcome) => {
                let before = self.entry(target_id).map_or(0, LibraryEntry::chapter_count);
                let added = outcome.target.chapter_count().saturating_sub(before);
                let title = outcome.target.title.clone();
                self.library = outcome.library;
                self.refresh_view();
                Notice::Info(format!("Merged into \"{title}\": added {added} chapters"))
            }
            None => Notice::Quiet,
        }
    }

    fn replace_library(&mut self, library: Vec<LibraryEntry>) {
        self.library = library;
        if self.selected_entry().is_none() {
            self.selected_id = None;
            self.current_chapter_id = None;
            if matches!(self.view, View::Detail | View::Reader) {
                self.view = View::Library;
            }
        }
        self.refresh_view();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::library_mgr::{LibrarySource, SampleLibrary};
    use crate::core::model::Format;
    use crate::core::sort::{SortDirection, SortField};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn sample_state() -> AppState {
        let (library, _) = SampleLibrary.load().unwrap();
        AppState::new(library, Preferences::default())
    }

    fn small_state() -> AppState {
        let mut a = LibraryEntry::new("A", "Alpha", Format::Cbz);
        a.chapters.push(Chapter {
            id: "A-1".to_string(),
            number: 1,
            title: "Chapter 1".to_string(),
            date: today(),
            read: false,
            size: None,
        });
        let mut b = LibraryEntry::new("B", "X", Format::Zip);
        b.file_size = "10 MB".to_string();
        let c = LibraryEntry::new("C", "Y", Format::Pdf);
        AppState::new(vec![a, b, c], Preferences::default())
    }

    #[test]
    fn test_adult_entries_hidden_until_enabled() {
        let mut state = sample_state();
        assert_eq!(state.visible.len(), 7);
        state.apply(Action::SetAdultMode(true));
        assert_eq!(state.visible.len(), 12);
    }

    #[test]
    fn test_change_tab() {
        let mut state = sample_state();
        state.apply(Action::OpenEntry("1".to_string()));
        assert_eq!(state.view, View::Detail);

        state.apply(Action::ChangeTab("library".to_string()));
        assert_eq!(state.view, View::Library);
        assert!(state.selected_id.is_none());

        state.apply(Action::ChangeTab("nowhere".to_string()));
        assert_eq!(state.view, View::Home);
    }

    #[test]
    fn test_start_reading_opens_first_stored_chapter() {
        let mut state = sample_state();
        state.apply(Action::StartReading("1".to_string()));
        assert_eq!(state.view, View::Reader);
        assert_eq!(state.current_chapter_id.as_deref(), Some("1-ch-12"));

        let mut empty = small_state();
        empty.apply(Action::StartReading("B".to_string()));
        assert_eq!(empty.view, View::Home, "no chapters, no change");
    }

    #[test]
    fn test_reader_crosses_chapter_boundary() {
        let mut state = sample_state();
        state.apply(Action::OpenEntry("9".to_string()));
        state.apply(Action::OpenChapter("9-ch-1".to_string()));
        state.reader.set_slider(99.0);
        state.apply(Action::NextPage);
        assert_eq!(state.current_chapter_id.as_deref(), Some("9-ch-2"));
        assert_eq!(state.reader.page, 0);
    }

    #[test]
    fn test_batch_merge_needs_two() {
        let mut state = small_state();
        state.apply(Action::EnterSelection);
        state.apply(Action::ToggleSelected("A".to_string()));
        let notice = state.apply(Action::Batch(BatchAction::Merge));
        assert_eq!(notice, Notice::Rejected(MERGE_NEEDS_TWO_MESSAGE.to_string()));
        assert!(state.modal.is_none());

        state.apply(Action::ExitSelection);
        assert_eq!(state.apply(Action::Batch(BatchAction::Delete)), Notice::Quiet);
    }

    #[test]
    fn test_merge_flow() {
        let mut state = small_state();
        state.apply(Action::EnterSelection);
        state.apply(Action::ToggleSelectAll);
        assert_eq!(state.selection.len(), 3);
        state.apply(Action::Batch(BatchAction::Merge));
        assert!(!state.selection.is_active());
        assert_eq!(
            state.modal,
            Some(Modal::Merge {
                candidates: vec!["A".into(), "B".into(), "C".into()],
                target: "A".into(),
            })
        );

        state.apply_on(Action::ConfirmMerge, today());
        assert!(state.modal.is_none());
        assert_eq!(state.library.len(), 1);
        let a = state.entry("A").unwrap();
        let numbers: Vec<u32> = a.chapters.iter().map(|c| c.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(a.chapters[1].id, "B");
        assert_eq!(a.chapters[1].title, "X");
        assert_eq!(a.chapters[1].size.as_deref(), Some("10 MB"));
        assert_eq!(a.chapters[2].id, "C");
    }

    #[test]
    fn test_merge_keeps_supplied_source_order() {
        let mut state = small_state();
        state.apply(Action::RequestMerge(vec!["A".into(), "C".into(), "B".into()]));
        assert_eq!(
            state.modal,
            Some(Modal::Merge {
                candidates: vec!["A".into(), "C".into(), "B".into()],
                target: "A".into(),
            })
        );
        let notice = state.apply_on(Action::ConfirmMerge, today());
        assert_eq!(notice, Notice::Info("Merged into \"Alpha\": added 2 chapters".into()));

        let a = state.entry("A").unwrap();
        let chapters: Vec<(&str, u32)> = a.chapters.iter().map(|c| (c.id.as_str(), c.number)).collect();
        assert_eq!(chapters, vec![("A-1", 1), ("C", 2), ("B", 3)]);
    }

    #[test]
    fn test_choose_merge_target() {
        let mut state = small_state();
        state.apply(Action::RequestMerge(vec!["B".into(), "C".into()]));
        state.apply(Action::ChooseMergeTarget("C".into()));
        state.apply(Action::ChooseMergeTarget("A".into()));
        state.apply_on(Action::ConfirmMerge, today());
        let c = state.entry("C").unwrap();
        assert_eq!(c.chapters.len(), 1);
        assert_eq!(c.chapters[0].id, "B");
        assert!(state.entry("A").is_some());
    }

    #[test]
    fn test_add_chapters_refreshes_selected_entry() {
        let mut state = small_state();
        state.apply(Action::OpenEntry("A".into()));
        state.apply(Action::OpenAddChapters);
        state.apply_on(Action::ConfirmAddChapters(vec!["C".into()]), today());
        assert!(state.modal.is_none());
        assert_eq!(state.selected_entry().unwrap().chapter_count(), 2);
        assert_eq!(state.library.last().unwrap().id, "A");
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut state = small_state();
        let notice = state.apply(Action::Context(ContextAction::Delete, "B".into()));
        let pending = match notice {
            Notice::NeedsConfirmation(p) => p,
            other => panic!("expected a confirmation request, got {other:?}"),
        };
        assert_eq!(pending.message(&state.library), "Delete \"X\"?");
        assert_eq!(state.library.len(), 3);

        state.apply(Action::Confirmed(pending));
        assert_eq!(state.library.len(), 2);
        assert!(state.entry("B").is_none());
    }

    #[test]
    fn test_batch_mark_read() {
        let mut state = small_state();
        state.apply(Action::EnterSelection);
        state.apply(Action::ToggleSelected("A".into()));
        let notice = state.apply(Action::Batch(BatchAction::MarkRead));
        assert_eq!(notice, Notice::Info("Marked 1 items as read.".into()));
        assert_eq!(state.entry("A").unwrap().unread_count(), 0);
        assert!(!state.selection.is_active());
    }

    #[test]
    fn test_view_change_prunes_selection() {
        let mut state = small_state();
        state.apply(Action::EnterSelection);
        state.apply(Action::ToggleSelectAll);
        state.apply(Action::SetSearch("alp".into()));
        assert_eq!(state.visible_ids(), vec!["A"]);
        assert_eq!(state.selection.ids().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn test_sort_rules_update_view() {
        let mut state = small_state();
        state.apply(Action::SetSortRules(vec![SortRule::new(
            SortField::Title,
            SortDirection::Desc,
        )]));
        assert_eq!(state.visible_ids(), vec!["C", "B", "A"]);
        state.apply(Action::UpdateSortRule(
            0,
            SortRule::new(SortField::Title, SortDirection::Asc),
        ));
        assert_eq!(state.visible_ids(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_save_metadata_and_mark_chapter_read() {
        let mut state = small_state();
        state.apply(Action::OpenEntry("A".into()));
        state.apply(Action::OpenEditor);
        let mut edited = state.selected_entry().unwrap().clone();
        edited.title = "Alpha Prime".into();
        state.apply(Action::SaveMetadata(edited));
        assert!(state.modal.is_none());
        assert_eq!(state.selected_entry().unwrap().title, "Alpha Prime");

        state.apply(Action::MarkChapterRead("A-1".into()));
        let a = state.selected_entry().unwrap();
        assert_eq!(a.last_read_chapter_id.as_deref(), Some("A-1"));
    }

    #[test]
    fn test_refresh_keeps_library_on_failure() {
        let mut state = small_state();
        state.apply(Action::RefreshStarted);
        assert!(state.refreshing);
        state.apply(Action::RefreshFinished(None));
        assert!(!state.refreshing);
        assert_eq!(state.library.len(), 3);

        state.apply(Action::RefreshFinished(Some(Vec::new())));
        assert!(state.library.is_empty());
        assert!(state.visible.is_empty());
    }

    #[test]
    fn test_import_skips_known_ids() {
        let mut state = small_state();
        let fresh = LibraryEntry::new("/comics/New.cbz", "New", Format::Cbz);
        let dupe = LibraryEntry::new("A", "Alpha again", Format::Cbz);
        let notice = state.apply(Action::Import(vec![fresh, dupe]));
        assert_eq!(notice, Notice::Info("Imported 1 of 2 items.".into()));
        assert_eq!(state.library.len(), 4);
        assert_eq!(state.entry("A").unwrap().title, "Alpha");
    }

    #[test]
    fn test_state_round_trip_keeps_adult_gate() {
        let mut adult = LibraryEntry::new("R", "Night Shift", Format::Cbz);
        adult.tags.insert(crate::core::model::TagCategory::General, "R18");
        let plain = LibraryEntry::new("P", "Day Shift", Format::Cbz);
        let prefs = Preferences {
            adult_mode: true,
            ..Preferences::default()
        };
        let state = AppState::new(vec![adult, plain], prefs);
        assert_eq!(state.visible.len(), 2);

        let json = serde_json::to_string(&state).unwrap();
        let mut back: AppState = serde_json::from_str(&json).unwrap();
        back.refresh_view();
        assert!(back.adult_mode);
        assert_eq!(back.visible.len(), 2);
    }

    #[test]
    fn test_state_serialises() {
        let state = small_state();
        let json = serde_json::to_string(&state).unwrap();
        let mut back: AppState = serde_json::from_str(&json).unwrap();
        back.refresh_view();
        assert_eq!(back.library, state.library);
        assert_eq!(back.visible, state.visible);
    }
}
