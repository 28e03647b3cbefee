use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::category;
use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::filter::FilterMark;
use crate::output::{self, OutputFormat};
use crate::pagination::{ControlKind, DEFAULT_GROUP_SIZE, DEFAULT_ITEMS_PER_PAGE};
use crate::query::ViewMode;
use crate::session::{self, FavoritesBackend, Options, Session};
use crate::source::{RecordSource, DEFAULT_SOURCE_URL};
use crate::state::{AppState, Event, PageView};

const HELP_TEXT: &str = "\
Commands:
  f <label>        cycle a category filter (neutral -> included -> excluded)
  clear            reset all category filters
  s [keyword]      search name, target, details and notes (empty clears)
  view all|fav     switch between all services and favorites
  star <n>         toggle favorite for the n-th service on the page
  open <n>         show or hide details of the n-th service
  p <n>            go to page n
  first|prev|next|last
                   page navigation (prev/next jump a whole group)
  cats             list filter categories with their marks
  help             show this help
  q                quit
";

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

#[derive(Clone, Debug, Default)]
struct OneShot {
    include: Vec<String>,
    exclude: Vec<String>,
    search: Option<String>,
    favorites_only: bool,
    page: usize,
    output: Option<String>,
    output_format: Option<String>,
}

#[derive(Clone, Debug)]
struct RunConfig {
    source: RecordSource,
    favorites: FavoritesBackend,
    timeout: u64,
    retries: u32,
    retry_backoff_ms: u64,
    proxy: Option<String>,
    items_per_page: usize,
    group_size: usize,
    no_color: bool,
    verbose: u8,
    once: Option<OneShot>,
}

impl RunConfig {
    fn session_options(&self) -> Options {
        Options {
            source: self.source.clone(),
            favorites: self.favorites.clone(),
            timeout_seconds: self.timeout,
            retry: session::retry_policy(self.retries, self.retry_backoff_ms),
            proxy: self.proxy.clone(),
            items_per_page: self.items_per_page,
            group_size: self.group_size,
        }
    }
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let source = if let Some(file) = args.file.as_deref() {
        RecordSource::File(config::expand_tilde_string(file))
    } else if let Some(url) = args.url.clone() {
        RecordSource::Url(url)
    } else if let Some(file) = cfg.file.as_deref() {
        RecordSource::File(config::expand_tilde_string(file))
    } else {
        let url = cfg
            .source_url
            .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());
        reqwest::Url::parse(&url).map_err(|e| format!("invalid source_url '{url}': {e}"))?;
        RecordSource::Url(url)
    };

    let favorites = if args.no_persist {
        FavoritesBackend::Memory
    } else {
        let path = args
            .favorites_path
            .or(cfg.favorites_path)
            .map(|p| config::expand_tilde(&p))
            .or_else(config::default_favorites_path);
        match path {
            Some(path) => FavoritesBackend::File(path),
            None => {
                tracing::warn!("no home directory, favorites will not be persisted");
                FavoritesBackend::Memory
            }
        }
    };

    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    let retries = args.retries.or(cfg.retries).unwrap_or(3);
    if retries == 0 {
        return Err("invalid retries, expected at least 1 attempt".to_string());
    }
    let retry_backoff_ms = args
        .retry_backoff_ms
        .or(cfg.retry_backoff_ms)
        .unwrap_or(500);
    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());

    let items_per_page = args
        .items_per_page
        .or(cfg.items_per_page)
        .unwrap_or(DEFAULT_ITEMS_PER_PAGE);
    if items_per_page == 0 {
        return Err("invalid items-per-page, expected positive integer".to_string());
    }
    let group_size = args
        .group_size
        .or(cfg.group_size)
        .unwrap_or(DEFAULT_GROUP_SIZE);
    if group_size == 0 {
        return Err("invalid group-size, expected positive integer".to_string());
    }

    let once = if args.once {
        Some(OneShot {
            include: args.include,
            exclude: args.exclude,
            search: args.search,
            favorites_only: args.favorites_only,
            page: args.page.unwrap_or(1),
            output: args.output.map(|p| config::expand_tilde_string(&p)),
            output_format: args.output_format,
        })
    } else {
        None
    };

    Ok(RunConfig {
        source,
        favorites,
        timeout,
        retries,
        retry_backoff_ms,
        proxy,
        items_per_page,
        group_size,
        no_color,
        verbose: args.verbose,
        once,
    })
}

/// Maps user input onto a catalog label when one matches, otherwise keeps
/// the trimmed input as a free-form label.
fn resolve_label(input: &str) -> String {
    category::find_catalog_label(input)
        .map(str::to_string)
        .unwrap_or_else(|| input.trim().to_string())
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Command {
    Filter(String),
    Clear,
    Search(String),
    View(ViewMode),
    Star(usize),
    Open(usize),
    Page(usize),
    Nav(ControlKind),
    Catalog,
    Help,
    Quit,
    Redraw,
}

fn parse_position(arg: &str, what: &str) -> Result<usize, String> {
    arg.trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| format!("{what} expects a positive number"))
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    match head.to_lowercase().as_str() {
        "" => Ok(Command::Redraw),
        "f" | "filter" => {
            if rest.is_empty() {
                Err("filter expects a category label".to_string())
            } else {
                Ok(Command::Filter(resolve_label(rest)))
            }
        }
        "clear" => Ok(Command::Clear),
        "s" | "search" => Ok(Command::Search(rest.to_string())),
        "view" | "v" => ViewMode::parse(rest)
            .map(Command::View)
            .ok_or_else(|| "view expects 'all' or 'fav'".to_string()),
        "star" | "fav" => parse_position(rest, "star").map(Command::Star),
        "open" | "o" => parse_position(rest, "open").map(Command::Open),
        "p" | "page" => parse_position(rest, "page").map(Command::Page),
        "first" => Ok(Command::Nav(ControlKind::First)),
        "prev" => Ok(Command::Nav(ControlKind::PreviousGroup)),
        "next" => Ok(Command::Nav(ControlKind::NextGroup)),
        "last" => Ok(Command::Nav(ControlKind::Last)),
        "cats" | "categories" => Ok(Command::Catalog),
        "help" | "h" | "?" => Ok(Command::Help),
        "q" | "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}', type 'help'")),
    }
}

/// Turns a command into a state event using the page currently shown.
fn command_event(command: Command, view: &PageView<'_>) -> Result<Option<Event>, String> {
    let item_id = |n: usize| {
        view.items
            .iter()
            .find(|i| i.position == n)
            .map(|i| i.record.id.clone())
            .ok_or_else(|| format!("no service #{n} on this page"))
    };
    let event = match command {
        Command::Filter(label) => Event::ToggleFilter(label),
        Command::Clear => Event::ClearFilters,
        Command::Search(keyword) => Event::Search(keyword),
        Command::View(mode) => Event::SetView(mode),
        Command::Star(n) => Event::ToggleFavorite(item_id(n)?),
        Command::Open(n) => Event::ToggleExpanded(item_id(n)?),
        Command::Page(n) => Event::GoToPage(n),
        Command::Nav(kind) => match view.plan.control(kind) {
            Some(control) if !control.disabled => Event::GoToPage(control.target),
            _ => return Err("not available on this page".to_string()),
        },
        Command::Catalog | Command::Help | Command::Quit | Command::Redraw => return Ok(None),
    };
    Ok(Some(event))
}

fn loading_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(output::LOADING_MESSAGE);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_view(state: &AppState) {
    println!();
    print!("{}", output::render_text(&state.page_view(), false));
}

async fn run_interactive(session: Session) -> Result<(), String> {
    let pb = loading_spinner();
    let (mut state, _) = session.start().await;
    pb.finish_and_clear();

    print_view(&state);
    println!("{}", "type 'help' for commands".dimmed());

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    loop {
        print!("> ");
        // prompt flush failures are cosmetic
        let _ = std::io::Write::flush(&mut std::io::stdout());
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Err(format!("failed to read input: {e}")),
        };
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e.yellow());
                continue;
            }
        };
        match command {
            Command::Quit => break,
            Command::Help => {
                print!("{HELP_TEXT}");
                continue;
            }
            Command::Catalog => {
                print!("{}", output::render_catalog(state.filters()));
                continue;
            }
            _ => {}
        }
        let event = {
            let view = state.page_view();
            command_event(command, &view)
        };
        match event {
            Ok(Some(event)) => {
                if let Err(e) = state.apply(event) {
                    tracing::warn!(error = %e, "favorites not saved");
                    println!("{}", format!("favorites not saved: {e}").red());
                }
            }
            Ok(None) => {}
            Err(e) => {
                println!("{}", e.yellow());
                continue;
            }
        }
        print_view(&state);
    }
    Ok(())
}

fn apply_one_shot(state: &mut AppState, once: &OneShot) -> Result<(), String> {
    let events = once
        .include
        .iter()
        .map(|l| Event::SetFilter(resolve_label(l), FilterMark::Included))
        .chain(
            once.exclude
                .iter()
                .map(|l| Event::SetFilter(resolve_label(l), FilterMark::Excluded)),
        )
        .chain(once.search.clone().map(Event::Search))
        .chain(once.favorites_only.then_some(Event::SetView(ViewMode::Favorites)))
        .chain(std::iter::once(Event::GoToPage(once.page)));
    for event in events {
        state
            .apply(event)
            .map_err(|e| format!("failed to apply option: {e}"))?;
    }
    Ok(())
}

async fn run_once(session: Session, once: OneShot) -> Result<(), String> {
    let (mut state, _) = session.start().await;
    apply_one_shot(&mut state, &once)?;
    let view = state.page_view();

    let Some(outfile_path) = once.output.as_ref() else {
        print!("{}", output::render_text(&view, true));
        return Ok(());
    };

    let output_format = once
        .output_format
        .as_deref()
        .and_then(OutputFormat::parse)
        .or_else(|| output::infer_format_from_path(outfile_path))
        .unwrap_or(OutputFormat::Text);
    let rendered = match output_format {
        OutputFormat::Text => {
            colored::control::set_override(false);
            output::render_text(&view, true).into_bytes()
        }
        OutputFormat::Json => output::render_json(&output::build_page(&view)),
    };

    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(outfile_path)
        .await
        .map_err(|e| format!("failed to open output file: {e}"))?;
    outfile
        .write_all(&rendered)
        .await
        .map_err(|_| "failed to write output file".to_string())?;

    format_kv_line("Results", &view.result_count.to_string());
    format_kv_line("Written", outfile_path);
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    let session = Session::new(run.session_options()).map_err(|e| e.to_string())?;
    tracing::debug!(source = %session.options().source.describe(), "session ready");

    match run.once {
        Some(once) => run_once(session, once).await,
        None => run_interactive(session).await,
    }
}

fn config_path(args: &CliArgs) -> Option<(PathBuf, bool)> {
    match args.config.as_deref() {
        Some(p) => Some((config::expand_tilde(p), false)),
        None => config::default_config_path().map(|p| (p, true)),
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    crate::logging::init_logging(args.verbose, !args.no_color);

    if args.init_config {
        let (path, _) =
            config_path(&args).ok_or_else(|| "cannot determine config path".to_string())?;
        config::ensure_default_config_file(&path)?;
        format_kv_line("Config", &path.display().to_string());
        return Ok(());
    }

    let cfg = match config_path(&args) {
        Some((path, allow_missing)) => config::load_config(&path, allow_missing)?,
        None => ConfigFile::default(),
    };

    let run = build_run_config(args, cfg)?;
    tracing::debug!(verbose = run.verbose, "configuration resolved");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::{FavoritesStore, MemoryStore};
    use crate::record::Record;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(args)
    }

    #[test]
    fn defaults_use_remote_source() {
        let run = build_run_config(parse(&["welfare-finder"]), ConfigFile::default()).unwrap();
        assert!(matches!(run.source, RecordSource::Url(ref u) if u == DEFAULT_SOURCE_URL));
        assert_eq!(run.items_per_page, 5);
        assert_eq!(run.group_size, 10);
        assert_eq!(run.retries, 3);
        assert!(run.once.is_none());
    }

    #[test]
    fn cli_overrides_config() {
        let cfg = ConfigFile {
            items_per_page: Some(8),
            group_size: Some(4),
            file: Some("./from-config.json".to_string()),
            ..ConfigFile::default()
        };
        let run = build_run_config(
            parse(&["welfare-finder", "--items-per-page", "3", "--file", "./cli.json"]),
            cfg,
        )
        .unwrap();
        assert_eq!(run.items_per_page, 3);
        assert_eq!(run.group_size, 4);
        assert!(matches!(run.source, RecordSource::File(ref p) if p == "./cli.json"));
    }

    #[test]
    fn one_shot_flags_require_once() {
        let err = build_run_config(
            parse(&["welfare-finder", "--include", "청년"]),
            ConfigFile::default(),
        )
        .unwrap_err();
        assert!(err.contains("--once"));

        let run = build_run_config(
            parse(&["welfare-finder", "--once", "-I", "청년", "-X", "장애인", "-P", "2"]),
            ConfigFile::default(),
        )
        .unwrap();
        let once = run.once.unwrap();
        assert_eq!(once.include, vec!["청년"]);
        assert_eq!(once.exclude, vec!["장애인"]);
        assert_eq!(once.page, 2);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(build_run_config(
            parse(&["welfare-finder", "--group-size", "0"]),
            ConfigFile::default()
        )
        .is_err());
        let cfg = ConfigFile {
            retries: Some(0),
            ..ConfigFile::default()
        };
        assert!(build_run_config(parse(&["welfare-finder"]), cfg).is_err());
    }

    #[test]
    fn no_persist_keeps_favorites_in_memory() {
        let run = build_run_config(
            parse(&["welfare-finder", "--no-persist"]),
            ConfigFile::default(),
        )
        .unwrap();
        assert!(matches!(run.favorites, FavoritesBackend::Memory));
    }

    #[test]
    fn commands_parse() {
        assert_eq!(
            parse_command("f 청년").unwrap(),
            Command::Filter("청년".to_string())
        );
        assert_eq!(
            parse_command("search  월세 지원 ").unwrap(),
            Command::Search("월세 지원".to_string())
        );
        assert_eq!(parse_command("s").unwrap(), Command::Search(String::new()));
        assert_eq!(
            parse_command("view fav").unwrap(),
            Command::View(ViewMode::Favorites)
        );
        assert_eq!(parse_command("p 3").unwrap(), Command::Page(3));
        assert_eq!(
            parse_command("next").unwrap(),
            Command::Nav(ControlKind::NextGroup)
        );
        assert_eq!(parse_command("").unwrap(), Command::Redraw);
        assert!(parse_command("p 0").is_err());
        assert!(parse_command("f").is_err());
        assert!(parse_command("dance").is_err());
    }

    fn state_with(n: usize) -> AppState {
        let favs = FavoritesStore::load(Box::new(MemoryStore::new()));
        let mut state = AppState::new(favs, 5, 2);
        let records = (0..n)
            .map(|i| Record {
                id: format!("service {i}"),
                service_id: None,
                title: format!("service {i}"),
                categories: vec!["청년".to_string()],
                support_target: String::new(),
                details: String::new(),
                notes: String::new(),
                link: String::new(),
            })
            .collect();
        state.apply(Event::Loaded(records)).unwrap();
        state
    }

    #[test]
    fn star_targets_the_visible_record() {
        let mut state = state_with(12);
        state.apply(Event::GoToPage(2)).unwrap();
        let event = command_event(Command::Star(2), &state.page_view()).unwrap();
        assert!(matches!(event, Some(Event::ToggleFavorite(ref id)) if id == "service 6"));
        assert!(command_event(Command::Star(9), &state.page_view()).is_err());
    }

    #[test]
    fn navigation_respects_disabled_controls() {
        let mut state = state_with(30);
        // 6 pages in groups of 2
        assert!(command_event(Command::Nav(ControlKind::First), &state.page_view()).is_err());
        let next = command_event(Command::Nav(ControlKind::NextGroup), &state.page_view()).unwrap();
        assert!(matches!(next, Some(Event::GoToPage(3))));
        state.apply(Event::GoToPage(6)).unwrap();
        assert!(command_event(Command::Nav(ControlKind::Last), &state.page_view()).is_err());
        let prev =
            command_event(Command::Nav(ControlKind::PreviousGroup), &state.page_view()).unwrap();
        assert!(matches!(prev, Some(Event::GoToPage(4))));
    }

    #[test]
    fn one_shot_options_become_events() {
        let mut state = state_with(12);
        let once = OneShot {
            include: vec!["청년".to_string()],
            exclude: vec!["노인".to_string()],
            search: Some("service 1".to_string()),
            favorites_only: false,
            page: 1,
            ..OneShot::default()
        };
        apply_one_shot(&mut state, &once).unwrap();
        assert_eq!(state.filters().included(), vec!["청년"]);
        assert_eq!(state.filters().excluded(), vec!["노인"]);
        // service 1, 10, 11
        assert_eq!(state.page_view().result_count, 3);
    }
}
