// MangaShelf - tests/e2e_library.rs
//
// End-to-end tests for the library pipeline.
//
// These tests exercise the real filesystem, real JSON loading and saving,
// real walkdir traversal and the controller with its reducer. They cover the
// path from a directory of archives or a library file on disk to the
// filtered, sorted and merged collection a front-end displays.

use chrono::NaiveDate;
use mangashelf::app::controller::Controller;
use mangashelf::app::library_mgr::{self, JsonLibrary, LibrarySource, SampleLibrary};
use mangashelf::app::prompt::AutoConfirm;
use mangashelf::app::state::{Action, AppState, Modal, Notice, Preferences, View};
use mangashelf::core::browse::{self, BrowseConfig, ItemKind};
use mangashelf::core::export;
use mangashelf::core::filter::LibraryFilter;
use mangashelf::core::model::{Chapter, Format, LibraryEntry, ReadingStatus};
use mangashelf::core::selection::{BatchAction, Selection};
use mangashelf::core::sort;
use mangashelf::platform::config;
use std::fs;

// =============================================================================
// Helpers
// =============================================================================

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn entry(id: &str, title: &str) -> LibraryEntry {
    let mut e = LibraryEntry::new(id, title, Format::Cbz);
    e.file_size = format!("{id} MB");
    e
}

fn chapter(id: &str, number: u32) -> Chapter {
    Chapter {
        id: id.to_string(),
        number,
        title: format!("Chapter {number}"),
        date: day(1),
        read: false,
        size: None,
    }
}

fn controller_for(library: Vec<LibraryEntry>, dir: &tempfile::TempDir) -> Controller {
    let path = dir.path().join("library.json");
    library_mgr::save_library(&library, &path).unwrap();
    let (c, problems) = Controller::start(
        Box::new(JsonLibrary::new(&path)),
        Box::new(AutoConfirm(true)),
        Preferences::default(),
    )
    .unwrap();
    assert!(problems.is_empty(), "unexpected problems: {problems:?}");
    c
}

// =============================================================================
// Sample collection
// =============================================================================

/// The bundled sample hides its adult titles until adult mode is on.
#[test]
fn e2e_sample_library_respects_adult_gate() {
    let (library, problems) = SampleLibrary.load().unwrap();
    assert!(problems.is_empty());
    assert_eq!(library.len(), 12);

    let state = AppState::new(library.clone(), Preferences::default());
    let visible = state.visible_ids();
    assert_eq!(visible.len(), 7);
    for adult in ["2", "5", "7", "10", "12"] {
        assert!(!visible.contains(&adult), "adult entry {adult} should be hidden");
    }

    let prefs = Preferences {
        adult_mode: true,
        ..Preferences::default()
    };
    let state = AppState::new(library, prefs);
    assert_eq!(state.visible_ids().len(), 12);
}

// =============================================================================
// Merge
// =============================================================================

/// Merging B and C into A turns them into chapters 2 and 3 of A.
#[test]
fn e2e_merge_appends_sources_as_chapters() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = entry("A", "Alpha");
    a.chapters.push(chapter("A-1", 1));
    let mut c = controller_for(vec![a, entry("B", "Beta"), entry("C", "Gamma")], &dir);

    c.dispatch(Action::RequestMerge(vec!["A".into(), "B".into(), "C".into()]));
    assert!(matches!(c.state().modal, Some(Modal::Merge { .. })));
    c.dispatch(Action::ChooseMergeTarget("A".into()));
    let notice = c.dispatch(Action::ConfirmMerge);
    assert!(matches!(notice, Notice::Info(_)), "got {notice:?}");

    let state = c.state();
    assert_eq!(state.library.len(), 1);
    let merged = state.entry("A").unwrap();
    let numbers: Vec<u32> = merged.chapters.iter().map(|ch| ch.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(merged.chapters[1].id, "B");
    assert_eq!(merged.chapters[1].title, "Beta");
    assert_eq!(merged.chapters[1].size.as_deref(), Some("B MB"));
    assert!(!merged.chapters[2].read);
    assert!(state.modal.is_none());
}

/// A merge request with fewer than two known entries is refused.
#[test]
fn e2e_merge_needs_two_entries() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = controller_for(vec![entry("A", "Alpha"), entry("B", "Beta")], &dir);

    let notice = c.dispatch(Action::RequestMerge(vec!["A".into(), "missing".into()]));
    assert!(matches!(notice, Notice::Rejected(_)));
    assert_eq!(c.state().library.len(), 2);
}

// =============================================================================
// Filter and sort
// =============================================================================

/// Title sorting ignores case.
#[test]
fn e2e_title_sort_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = controller_for(
        vec![entry("1", "banana"), entry("2", "Cherry"), entry("3", "apple")],
        &dir,
    );

    let rules = sort::parse_sort_rules("title:asc").unwrap();
    c.dispatch(Action::SetSortRules(rules));
    let titles: Vec<&str> = c
        .state()
        .visible_entries()
        .iter()
        .map(|e| e.title.as_str())
        .collect();
    assert_eq!(titles, vec!["apple", "banana", "Cherry"]);

    c.dispatch(Action::SetSortRules(sort::parse_sort_rules("title:desc").unwrap()));
    assert_eq!(c.state().visible_ids(), vec!["2", "1", "3"]);
}

/// Status, chapter threshold and search combine; the selection follows the
/// visible list.
#[test]
fn e2e_filters_combine_and_prune_selection() {
    let dir = tempfile::tempdir().unwrap();
    let mut reading = entry("1", "Blue Period");
    reading.status = Some(ReadingStatus::Reading);
    reading.chapters = vec![chapter("1-1", 1), chapter("1-2", 2)];
    let mut short = entry("2", "Blue Lock");
    short.status = Some(ReadingStatus::Reading);
    short.chapters = vec![chapter("2-1", 1)];
    let mut done = entry("3", "Blue Giant");
    done.status = Some(ReadingStatus::Completed);
    done.chapters = vec![chapter("3-1", 1), chapter("3-2", 2)];
    let mut c = controller_for(vec![reading, short, done], &dir);

    c.dispatch(Action::ChangeTab("library".into()));
    c.dispatch(Action::EnterSelection);
    c.dispatch(Action::ToggleSelectAll);
    assert_eq!(c.state().selection.len(), 3);

    let filter = LibraryFilter {
        status: Some(ReadingStatus::Reading),
        min_chapters: 2,
        text_search: "blue".into(),
        ..Default::default()
    };
    c.dispatch(Action::SetFilter(filter));
    assert_eq!(c.state().visible_ids(), vec!["1"]);
    assert_eq!(c.state().selection.ids().collect::<Vec<_>>(), vec!["1"]);
}

// =============================================================================
// Browse and import
// =============================================================================

/// Listing a directory puts folders first and imports comic items only.
#[test]
fn e2e_browse_and_import_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("comics");
    fs::create_dir_all(root.join("Loose Pages")).unwrap();
    fs::write(root.join("Loose Pages").join("001.jpg"), vec![0u8; 2048]).unwrap();
    fs::write(root.join("Vinland Saga v01.cbz"), vec![0u8; 4096]).unwrap();
    fs::write(root.join("notes.txt"), b"not a comic").unwrap();

    let (items, warnings) = browse::list_directory(&root, &BrowseConfig::default()).unwrap();
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].kind, ItemKind::Folder);
    assert_eq!(items[0].name, "Loose Pages");

    let mut selection = Selection::default();
    selection.enter();
    selection.select_all(items.iter().map(|i| i.id.as_str()));
    let chosen = browse::selected_items(&items, &selection);
    let (imported, warnings) = browse::import_items(&chosen, day(5));
    assert_eq!(imported.len(), 2);
    assert_eq!(warnings.len(), 1, "notes.txt should be skipped");

    let library_dir = tempfile::tempdir().unwrap();
    let mut c = controller_for(Vec::new(), &library_dir);
    let notice = c.dispatch(Action::Import(imported.clone()));
    assert_eq!(notice, Notice::Info("Imported 2 of 2 items.".into()));

    // A second import of the same items adds nothing.
    let notice = c.dispatch(Action::Import(imported));
    assert_eq!(notice, Notice::Info("Imported 0 of 2 items.".into()));

    let titles: Vec<&str> = c.state().library.iter().map(|e| e.title.as_str()).collect();
    assert!(titles.contains(&"Vinland Saga v01"));
    assert!(titles.contains(&"Loose Pages"));
}

/// A recursive scan finds archives in nested folders.
#[test]
fn e2e_scan_finds_nested_archives() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("series").join("volume 2");
    fs::create_dir_all(&nested).unwrap();
    fs::create_dir_all(dir.path().join(".git")).unwrap();
    fs::write(nested.join("ch01.cbz"), b"x").unwrap();
    fs::write(dir.path().join("series").join("extra.pdf"), b"x").unwrap();
    fs::write(dir.path().join(".git").join("hidden.cbz"), b"x").unwrap();

    let (found, _) = browse::scan_for_media(dir.path(), &BrowseConfig::default()).unwrap();
    let mut names: Vec<&str> = found.iter().map(|i| i.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["ch01.cbz", "extra.pdf"]);
}

// =============================================================================
// Persistence and config
// =============================================================================

/// Changes survive a save and reload through the JSON source.
#[test]
fn e2e_save_and_reload_library() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = entry("A", "Alpha");
    a.chapters = vec![chapter("A-1", 1), chapter("A-2", 2)];
    a.date_added = Some(day(3));
    let mut c = controller_for(vec![a, entry("B", "Beta")], &dir);

    c.dispatch(Action::ChangeTab("library".into()));
    c.dispatch(Action::EnterSelection);
    c.dispatch(Action::ToggleSelected("A".into()));
    let notice = c.dispatch(Action::Batch(BatchAction::MarkRead));
    assert_eq!(notice, Notice::Info("Marked 1 items as read.".into()));

    let path = dir.path().join("library.json");
    library_mgr::save_library(&c.state().library, &path).unwrap();

    let (reloaded, problems) = JsonLibrary::new(&path).load().unwrap();
    assert!(problems.is_empty());
    assert_eq!(reloaded, c.state().library);
    let a = reloaded.iter().find(|e| e.id == "A").unwrap();
    assert_eq!(a.unread_count(), 0);
    assert_eq!(a.date_added, Some(day(3)));
}

/// Config values reach the application preferences.
#[test]
fn e2e_config_drives_preferences() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "[library]\nshow_adult = true\n\n[ui]\ntheme = \"pink\"\nsort = \"rating:desc\"\n",
    )
    .unwrap();

    let (cfg, warnings) = config::load_config(dir.path());
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    let prefs = Preferences::from_config(&cfg);
    assert!(prefs.adult_mode);
    assert_eq!(prefs.theme.to_string().to_lowercase(), "pink");
    assert_eq!(prefs.sort_rules, sort::parse_sort_rules("rating:desc").unwrap());
}

// =============================================================================
// Delete and export
// =============================================================================

/// Deleting the open entry returns to the library; files on disk stay.
#[test]
fn e2e_delete_flow_keeps_files() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("alpha.cbz");
    fs::write(&archive, b"x").unwrap();
    let mut a = entry("A", "Alpha");
    a.path = archive.display().to_string();
    let mut c = controller_for(vec![a, entry("B", "Beta")], &dir);

    c.dispatch(Action::OpenEntry("A".into()));
    assert_eq!(c.state().view, View::Detail);
    c.dispatch(Action::ChangeTab("library".into()));
    c.dispatch(Action::EnterSelection);
    c.dispatch(Action::ToggleSelected("A".into()));
    let notice = c.dispatch(Action::Batch(BatchAction::Delete));
    assert!(matches!(notice, Notice::Info(_)), "got {notice:?}");

    assert!(c.state().entry("A").is_none());
    assert!(c.state().selected_id.is_none());
    assert!(!c.state().selection.is_active());
    assert!(archive.exists());
}

/// CSV export writes one row per visible entry.
#[test]
fn e2e_export_visible_entries() {
    let dir = tempfile::tempdir().unwrap();
    let c = controller_for(vec![entry("A", "Alpha"), entry("B", "Beta")], &dir);

    let out = dir.path().join("out.csv");
    let file = fs::File::create(&out).unwrap();
    let written = export::export_csv(&c.state().visible_entries(), file, &out).unwrap();
    assert_eq!(written, 2);

    let text = fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("id,title,format"));
    assert_eq!(lines.count(), 2);
}
