// MangaShelf - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading and logging initialisation (debug mode support)
// 3. Collection loading (JSON file or the embedded sample)
// 4. Running the chosen subcommand through the controller

use clap::{Parser, Subcommand, ValueEnum};
use mangashelf::app::controller::Controller;
use mangashelf::app::library_mgr::{self, JsonLibrary, LibrarySource, SampleLibrary};
use mangashelf::app::prompt::{AutoConfirm, ConfirmPrompt, TerminalPrompt};
use mangashelf::app::state::{Action, AppState, Notice, Preferences};
use mangashelf::core::browse::{self, BrowseAction, BrowseItem, ItemKind};
use mangashelf::core::export;
use mangashelf::core::filter::LibraryFilter;
use mangashelf::core::home::{self, LibraryStats};
use mangashelf::core::metadata::MetadataDraft;
use mangashelf::core::model::{Format, LibraryEntry, ReadingStatus, TagCategory};
use mangashelf::core::selection::{BatchAction, Selection};
use mangashelf::core::sort;
use mangashelf::platform::config::{self, AppConfig, PlatformPaths};
use mangashelf::util::error::{ExportError, ShelfError};
use mangashelf::util::{constants, logging};
use std::fmt;
use std::path::{Path, PathBuf};

/// MangaShelf - manga and comic library manager.
///
/// Browse, merge, tag and read a local comic collection. Without --library
/// the built-in sample collection is used.
#[derive(Parser, Debug)]
#[command(name = "mangashelf", version, about)]
struct Cli {
    /// Library JSON file (overrides [library] path in config.toml).
    #[arg(short = 'l', long = "library", global = true)]
    library: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Include adult-tagged titles.
    #[arg(long = "adult", global = true)]
    adult: bool,

    /// Answer yes to every confirmation.
    #[arg(short = 'y', long = "yes", global = true)]
    yes: bool,

    /// Write changes back to the library file.
    #[arg(long = "save", global = true)]
    save: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the library, filtered and sorted.
    List {
        /// Case-insensitive title search.
        #[arg(short = 's', long)]
        search: Option<String>,
        /// reading, completed or plan-to-read.
        #[arg(long)]
        status: Option<ReadingStatus>,
        /// Only entries with at least this many chapters.
        #[arg(long, default_value_t = 0)]
        min_chapters: usize,
        /// Formats to include; repeatable.
        #[arg(short = 'f', long = "format")]
        formats: Vec<Format>,
        /// Title regex.
        #[arg(short = 'r', long)]
        regex: Option<String>,
        /// Sort rules, e.g. "rating:desc,title:asc".
        #[arg(long)]
        sort: Option<String>,
    },
    /// Show one entry with its tags and chapters.
    Show { id: String },
    /// Open an entry in the reader and mark the chapter read.
    Read {
        id: String,
        /// Chapter id; defaults to the first stored chapter.
        chapter: Option<String>,
    },
    /// Merge source entries into a target as new chapters.
    Merge {
        target: String,
        #[arg(required = true)]
        sources: Vec<String>,
    },
    /// Edit an entry's metadata.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Series name; an empty string clears it.
        #[arg(long)]
        series: Option<String>,
        #[arg(long)]
        rating: Option<f32>,
        /// Flip the adult-content tag.
        #[arg(long)]
        toggle_adult: bool,
    },
    /// Add (or with --remove, remove) a tag.
    Tag {
        id: String,
        category: TagCategory,
        tag: String,
        #[arg(long)]
        remove: bool,
    },
    /// Continue-reading, recently-added and library totals.
    Home,
    /// Recently opened entries.
    History,
    /// List a directory.
    Browse { dir: PathBuf },
    /// Import items of a directory (all comic items when no names are given).
    Import {
        dir: PathBuf,
        names: Vec<String>,
    },
    /// Search for comic archives under a directory or its named folders.
    Scan {
        dir: PathBuf,
        names: Vec<String>,
        /// Import everything found.
        #[arg(long)]
        import: bool,
    },
    /// Remove entries from the library (files on disk are kept).
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Mark every chapter of the given entries as read.
    MarkRead {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Export the current view.
    Export { format: ExportFormat, file: PathBuf },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

/// Failures surfaced to the terminal.
#[derive(Debug)]
enum CliError {
    Shelf(ShelfError),
    Usage(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shelf(e) => write!(f, "{e}"),
            Self::Usage(msg) => f.write_str(msg),
        }
    }
}

impl From<ShelfError> for CliError {
    fn from(e: ShelfError) -> Self {
        Self::Shelf(e)
    }
}

fn main() {
    let cli = Cli::parse();

    // Config first: it may set the log level and log file.
    let platform_paths = PlatformPaths::resolve();
    let (app_config, config_warnings) = config::load_config(&platform_paths.config_dir);

    logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "MangaShelf starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    if let Err(e) = run(cli, &platform_paths, &app_config) {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Library file to use: CLI flag, then config, then the platform default if
/// it exists. `None` selects the sample collection.
fn library_location(cli: &Cli, paths: &PlatformPaths, config: &AppConfig) -> Option<PathBuf> {
    cli.library
        .clone()
        .or_else(|| config.library_path.clone())
        .or_else(|| {
            let default = paths.library_file();
            default.exists().then_some(default)
        })
}

fn run(cli: Cli, paths: &PlatformPaths, config: &AppConfig) -> Result<(), CliError> {
    let location = library_location(&cli, paths, config);
    let source: Box<dyn LibrarySource> = match &location {
        Some(path) => Box::new(JsonLibrary::new(path)),
        None => Box::new(SampleLibrary),
    };
    let prompt: Box<dyn ConfirmPrompt> = if cli.yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(TerminalPrompt::stdio())
    };

    let mut prefs = Preferences::from_config(config);
    prefs.adult_mode |= cli.adult;

    let (mut controller, problems) =
        Controller::start(source, prompt, prefs).map_err(ShelfError::from)?;
    for problem in &problems {
        tracing::warn!(error = %problem, "Library load problem");
        eprintln!("Warning: {problem}");
    }

    let before = controller.state().library.clone();
    execute(&mut controller, cli.command, config)?;

    let state = controller.into_state();
    if state.library == before {
        return Ok(());
    }
    if cli.save {
        let target = location.unwrap_or_else(|| paths.library_file());
        library_mgr::save_library(&state.library, &target).map_err(ShelfError::from)?;
        println!("Saved {} entries to {}", state.library.len(), target.display());
    } else {
        eprintln!("Changes were not saved; pass --save to write them.");
    }
    Ok(())
}

/// Import and merge dates use the UTC calendar day.
fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

// =============================================================================
// Subcommands
// =============================================================================

fn execute(c: &mut Controller, command: Command, config: &AppConfig) -> Result<(), CliError> {
    match command {
        Command::List {
            search,
            status,
            min_chapters,
            formats,
            regex,
            sort: sort_spec,
        } => {
            let mut filter = LibraryFilter {
                status,
                min_chapters,
                formats: formats.into_iter().collect(),
                text_search: search.unwrap_or_default(),
                ..Default::default()
            };
            if let Some(pattern) = regex {
                filter.set_regex(&pattern).map_err(ShelfError::from)?;
            }
            c.dispatch(Action::SetFilter(filter));
            if let Some(spec) = sort_spec {
                let rules = sort::parse_sort_rules(&spec).map_err(ShelfError::from)?;
                c.dispatch(Action::SetSortRules(rules));
            }

            let entries = c.state().visible_entries();
            for entry in &entries {
                print_row(entry);
            }
            println!("{} of {} entries", entries.len(), c.state().library.len());
            Ok(())
        }

        Command::Show { id } => {
            print_details(require(c.state(), &id)?);
            Ok(())
        }

        Command::Read { id, chapter } => {
            require(c.state(), &id)?;
            match chapter {
                Some(chapter_id) => {
                    c.dispatch(Action::OpenEntry(id));
                    c.dispatch(Action::OpenChapter(chapter_id));
                }
                None => {
                    c.dispatch(Action::StartReading(id));
                }
            }
            let state = c.state();
            let (Some(entry), Some(chapter)) = (state.selected_entry(), state.current_chapter())
            else {
                return Err(CliError::Usage("Nothing to read.".to_string()));
            };
            println!(
                "Reading {}: {} (page {})",
                entry.title,
                chapter.title,
                state.reader.page_indicator()
            );
            let chapter_id = chapter.id.clone();
            c.dispatch(Action::MarkChapterRead(chapter_id));
            Ok(())
        }

        Command::Merge { target, sources } => {
            require(c.state(), &target)?;
            let mut ids = vec![target.clone()];
            ids.extend(sources);
            report(c.dispatch(Action::RequestMerge(ids)))?;
            c.dispatch(Action::ChooseMergeTarget(target));
            report(c.dispatch(Action::ConfirmMerge))
        }

        Command::Edit {
            id,
            title,
            description,
            series,
            rating,
            toggle_adult,
        } => {
            let mut draft = MetadataDraft::new(require(c.state(), &id)?);
            if let Some(title) = title {
                draft.set_title(&title);
            }
            if let Some(description) = description {
                draft.set_description(&description);
            }
            if let Some(series) = series {
                draft.set_series(Some(&series));
            }
            if let Some(rating) = rating {
                draft.set_rating(rating).map_err(ShelfError::from)?;
            }
            if toggle_adult {
                draft.toggle_adult();
            }
            save_draft(c, id, draft)
        }

        Command::Tag {
            id,
            category,
            tag,
            remove,
        } => {
            let mut draft = MetadataDraft::new(require(c.state(), &id)?);
            let changed = if remove {
                draft.remove_tag(category, &tag)
            } else {
                draft.add_tag(category, &tag).map_err(ShelfError::from)?
            };
            if !changed {
                println!("No change.");
                return Ok(());
            }
            save_draft(c, id, draft)
        }

        Command::Home => {
            let gated = c.state().gated_library();
            let stats = LibraryStats::collect(&gated);
            println!(
                "{} titles: {} reading, {} completed, {} planned; {} of {} chapters unread",
                stats.total,
                stats.reading,
                stats.completed,
                stats.planned,
                stats.unread,
                stats.chapters
            );
            println!("\nContinue reading:");
            for entry in home::continue_reading(&gated) {
                print_row(entry);
            }
            println!("\nRecently added:");
            for entry in home::recently_added(&gated) {
                print_row(entry);
            }
            Ok(())
        }

        Command::History => {
            let gated = c.state().gated_library();
            let history = home::reading_history(&gated);
            if history.is_empty() {
                println!("No reading history yet.");
            }
            for entry in history {
                println!(
                    "{:<6} {:<36} {}",
                    entry.id,
                    clip(&entry.title, 36),
                    entry.last_opened.as_deref().unwrap_or("")
                );
            }
            Ok(())
        }

        Command::Browse { dir } => {
            let (items, warnings) = browse::list_directory(&dir, &config.browse_config())
                .map_err(ShelfError::from)?;
            print_warnings(&warnings);
            for item in &items {
                print_item(item);
            }
            println!("{} items", items.len());
            Ok(())
        }

        Command::Import { dir, names } => {
            let (items, warnings) = browse::list_directory(&dir, &config.browse_config())
                .map_err(ShelfError::from)?;
            print_warnings(&warnings);
            let selection = select_items(&items, &names);
            browse_batch(c, BrowseAction::Import, &items, &selection, config)
        }

        Command::Scan { dir, names, import } => {
            let found = if names.is_empty() {
                let (found, warnings) = browse::scan_for_media(&dir, &config.browse_config())
                    .map_err(ShelfError::from)?;
                print_warnings(&warnings);
                for item in &found {
                    print_item(item);
                }
                println!("{} archives found", found.len());
                found
            } else {
                let (items, warnings) = browse::list_directory(&dir, &config.browse_config())
                    .map_err(ShelfError::from)?;
                print_warnings(&warnings);
                let selection = select_items(&items, &names);
                scan_selected(&items, &selection, config)?
            };

            if !import {
                return Ok(());
            }
            let mut everything = Selection::default();
            everything.enter();
            everything.select_all(found.iter().map(|i| i.id.as_str()));
            browse_batch(c, BrowseAction::Import, &found, &everything, config)
        }

        Command::Delete { ids } => {
            select_entries(c, &ids);
            report(c.dispatch(Action::Batch(BatchAction::Delete)))
        }

        Command::MarkRead { ids } => {
            select_entries(c, &ids);
            report(c.dispatch(Action::Batch(BatchAction::MarkRead)))
        }

        Command::Export { format, file } => {
            let entries = c.state().visible_entries();
            let handle = std::fs::File::create(&file).map_err(|e| {
                ShelfError::from(ExportError::Io {
                    path: file.clone(),
                    source: e,
                })
            })?;
            let writer = std::io::BufWriter::new(handle);
            let count = match format {
                ExportFormat::Csv => export::export_csv(&entries, writer, &file),
                ExportFormat::Json => export::export_json(&entries, writer, &file),
            }
            .map_err(ShelfError::from)?;
            println!("Exported {count} entries to {}", file.display());
            Ok(())
        }
    }
}

fn require<'a>(state: &'a AppState, id: &str) -> Result<&'a LibraryEntry, CliError> {
    state
        .entry(id)
        .ok_or_else(|| CliError::Usage(format!("No entry with id '{id}'.")))
}

/// Print a notice. Rejections become errors.
fn report(notice: Notice) -> Result<(), CliError> {
    match notice {
        Notice::Info(msg) => {
            println!("{msg}");
            Ok(())
        }
        Notice::Rejected(msg) => Err(CliError::Usage(msg)),
        // The controller resolves confirmations before returning.
        Notice::Quiet | Notice::NeedsConfirmation(_) => Ok(()),
    }
}

fn save_draft(c: &mut Controller, id: String, draft: MetadataDraft) -> Result<(), CliError> {
    let edited = draft.finish().map_err(ShelfError::from)?;
    c.dispatch(Action::OpenEntry(id));
    c.dispatch(Action::OpenEditor);
    report(c.dispatch(Action::SaveMetadata(edited)))
}

/// Select the given ids in the library view. Ids that are hidden or unknown
/// are reported and left out.
fn select_entries(c: &mut Controller, ids: &[String]) {
    c.dispatch(Action::EnterSelection);
    for id in ids {
        c.dispatch(Action::ToggleSelected(id.clone()));
        if !c.state().selection.contains(id) {
            eprintln!("Warning: '{id}' is not in the library view (adult titles need --adult).");
        }
    }
}

/// Select browse items by name; no names selects everything.
fn select_items(items: &[BrowseItem], names: &[String]) -> Selection {
    let mut selection = Selection::default();
    selection.enter();
    if names.is_empty() {
        selection.select_all(items.iter().map(|i| i.id.as_str()));
        return selection;
    }
    for name in names {
        match items.iter().find(|i| &i.name == name) {
            Some(item) => {
                selection.toggle(&item.id);
            }
            None => eprintln!("Warning: '{name}' is not in this directory."),
        }
    }
    selection
}

/// Run a browser batch action over the selected items.
fn browse_batch(
    c: &mut Controller,
    action: BrowseAction,
    items: &[BrowseItem],
    selection: &Selection,
    config: &AppConfig,
) -> Result<(), CliError> {
    if selection.is_empty() {
        println!("Nothing selected.");
        return Ok(());
    }
    match action {
        BrowseAction::Import => {
            let chosen = browse::selected_items(items, selection);
            let (entries, warnings) = browse::import_items(&chosen, today());
            print_warnings(&warnings);
            report(c.dispatch(Action::Import(entries)))
        }
        BrowseAction::Scan => {
            scan_selected(items, selection, config)?;
            Ok(())
        }
    }
}

/// Scan each selected folder for archives and print what was found.
fn scan_selected(
    items: &[BrowseItem],
    selection: &Selection,
    config: &AppConfig,
) -> Result<Vec<BrowseItem>, CliError> {
    let mut found = Vec::new();
    for item in browse::selected_items(items, selection) {
        if item.kind != ItemKind::Folder {
            continue;
        }
        let (archives, warnings) = browse::scan_for_media(&item.path, &config.browse_config())
            .map_err(ShelfError::from)?;
        print_warnings(&warnings);
        found.extend(archives);
    }
    for item in &found {
        print_item(item);
    }
    println!("{} archives found", found.len());
    Ok(found)
}

// =============================================================================
// Output
// =============================================================================

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
        clipped.push('~');
        clipped
    }
}

fn print_row(entry: &LibraryEntry) {
    println!(
        "{:<6} {:<36} {:<6} {:<12} {:>3} ch  {:.1}",
        entry.id,
        clip(&entry.title, 36),
        entry.format.label(),
        entry.status.map_or("-", |s| s.label()),
        entry.chapter_count(),
        entry.rating
    );
}

fn print_details(entry: &LibraryEntry) {
    println!("{}", entry.title);
    if let Some(series) = &entry.series {
        println!("  Series:   {series}");
    }
    println!(
        "  Status:   {}",
        entry.status.map_or("-", |s| s.label())
    );
    println!("  Format:   {} ({})", entry.format, entry.file_size);
    println!("  Rating:   {:.1}", entry.rating);
    if let Some(added) = entry.date_added {
        println!("  Added:    {added}");
    }
    if !entry.path.is_empty() {
        println!("  Path:     {}", entry.path);
    }
    for category in TagCategory::all() {
        let tags = entry.tags.get(*category);
        if !tags.is_empty() {
            println!("  {:<9} {}", format!("{category}:"), tags.join(", "));
        }
    }
    if !entry.description.is_empty() {
        println!("\n{}", entry.description);
    }
    println!(
        "\n{} chapters, {} unread",
        entry.chapter_count(),
        entry.unread_count()
    );
    for chapter in &entry.chapters {
        println!(
            "  [{}] {:<10} {:<32} {}",
            if chapter.read { "x" } else { " " },
            chapter.id,
            clip(&chapter.title, 32),
            chapter.date
        );
    }
}

fn print_item(item: &BrowseItem) {
    let marker = match item.kind {
        ItemKind::Folder => "DIR ",
        ItemKind::File => "    ",
    };
    println!("{marker} {:<40} {:>8}  {}", clip(&item.name, 40), item.size_label, display(&item.path));
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("Warning: {warning}");
    }
}
