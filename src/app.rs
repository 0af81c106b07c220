use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::catalog::{Catalog, CatalogError};
use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::fetcher::{HttpPageSource, PageFetcher, DEFAULT_MAX_PAGES};
use crate::logging;
use crate::output::{self, OutputFormat};
use crate::runner::{Options, Runner, DEFAULT_START_URL};
use crate::session::{Command, Session, SessionError, HELP};
use crate::utils;
use crate::view::{ViewState, DEFAULT_PAGE_SIZE};

fn print_banner() {
    const BANNER: &str = r#"
    ____        ____           ____
   / __ \____  / / /________ _/ / /
  / /_/ / __ \/ / / ___/ __ `/ / /
 / _, _/ /_/ / / / /__/ /_/ / / /
/_/ |_|\____/_/_/\___/\__,_/_/_/
       v0.1.0 - every page, one roster
    "#;
    print!("{}", BANNER.magenta());
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn format_opt_value<'a>(v: &'a str, default: &'a str) -> &'a str {
    if v.trim().is_empty() {
        default
    } else {
        v
    }
}

#[derive(Clone, Debug)]
struct RunConfig {
    options: Options,
    format: OutputFormat,
    output: Option<String>,
    no_color: bool,
    interactive: bool,
    genders_only: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };
    let interactive = args.interactive || cfg.interactive.unwrap_or(false);

    let start_url = args
        .url
        .or(cfg.url)
        .map(|u| u.trim().to_string())
        .unwrap_or_else(|| DEFAULT_START_URL.to_string());
    utils::parse_listing_url(&start_url).map_err(|e| format!("invalid url '{start_url}': {e}"))?;

    let page_size = args.page_size.or(cfg.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err("invalid page_size, expected positive integer".to_string());
    }
    let max_pages = args.max_pages.or(cfg.max_pages).unwrap_or(DEFAULT_MAX_PAGES);
    if max_pages == 0 {
        return Err("invalid max_pages, expected positive integer".to_string());
    }
    let rate = args.rate.or(cfg.rate).unwrap_or(0);
    let timeout_seconds = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout_seconds == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());
    let header = args.header.or(cfg.header).filter(|h| !h.trim().is_empty());

    let output = args
        .output
        .or(cfg.output)
        .filter(|p| !p.trim().is_empty())
        .map(|p| config::expand_tilde_string(&p));
    let format = match args.format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw).ok_or_else(|| {
            format!("invalid output format '{raw}', expected text, json, or names")
        })?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    let mut view = ViewState::default();
    if let Some(term) = args.search {
        view.set_search(term);
    }
    if let Some(gender) = args.gender {
        view.set_gender(utils::gender_from_input(&gender));
    }
    view.page_number = args.page.unwrap_or(1);

    Ok(RunConfig {
        options: Options {
            start_url,
            page_size,
            view,
            rate,
            timeout_seconds,
            proxy,
            header,
            max_pages,
        },
        format,
        output,
        no_color,
        interactive,
        genders_only: args.genders,
    })
}

fn print_settings(run: &RunConfig) {
    let view = &run.options.view;
    format_kv_line("URL", &run.options.start_url);
    format_kv_line("Page size", &run.options.page_size.to_string());
    format_kv_line("Search", format_opt_value(&view.search_term, "-"));
    format_kv_line(
        "Gender",
        view.gender_filter
            .as_deref()
            .map(utils::gender_label)
            .unwrap_or("-"),
    );
    format_kv_line("Timeout", &format!("{}s", run.options.timeout_seconds));
    if run.options.rate > 0 {
        format_kv_line("Rate", &format!("{}/s", run.options.rate));
    }
    println!();
}

fn loading_spinner() -> Result<ProgressBar, String> {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(
        ProgressStyle::with_template(":: {spinner} Loading :: {msg} :: [{elapsed_precise}]")
            .map_err(|e| format!("failed to build progress bar style: {e}"))?,
    );
    pb.set_message("page 1");
    Ok(pb)
}

async fn write_output(path: Option<&str>, bytes: &[u8]) -> Result<(), String> {
    match path {
        Some(path) => tokio::fs::write(path, bytes)
            .await
            .map_err(|e| format!("failed to write output file {path}: {e}")),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(bytes)
                .and_then(|_| stdout.flush())
                .map_err(|e| format!("failed to write output: {e}"))
        }
    }
}

async fn run_once(run: RunConfig) -> Result<(), String> {
    let show_chrome = run.format == OutputFormat::Text && run.output.is_none();
    if show_chrome {
        print_banner();
        print_settings(&run);
    }

    let runner = Runner::new(run.options.clone()).map_err(|e| e.to_string())?;
    let fetcher = runner.fetcher().map_err(|e| e.to_string())?;

    let pb = loading_spinner()?;
    let result = runner
        .run_with_progress(&fetcher, |page, total| {
            pb.set_message(format!("page {page} :: {total} records"));
        })
        .await;
    pb.finish_and_clear();
    let result = result.map_err(|e| e.to_string())?;

    if run.genders_only {
        print!("{}", output::render_gender_options(&result.gender_options));
        return Ok(());
    }

    let bytes = output::render(run.format, &result.projected, &run.options.view);
    write_output(run.output.as_deref(), &bytes).await?;

    if show_chrome {
        println!(
            ":: Completed :: {} records loaded in {}s ::",
            result.records.len(),
            result.elapsed.as_secs()
        );
    } else if let Some(path) = run.output.as_deref() {
        eprintln!(":: Wrote page {} to {path}", result.projected.page_number);
    }
    Ok(())
}

fn prompt() {
    print!("{} ", "rollcall>".magenta().bold());
    let _ = std::io::stdout().flush();
}

async fn show_page(catalog: &Catalog, session: &mut Session, format: OutputFormat) {
    let records = catalog.snapshot().await;
    let projected = session.project(&records);
    let bytes = output::render(format, &projected, session.view_state());
    let _ = write_output(None, &bytes).await;
}

async fn print_status(catalog: &Catalog, session: &mut Session) {
    let records = catalog.snapshot().await;
    let projected = session.project(&records);
    let state = if catalog.is_loading() {
        "loading".yellow().to_string()
    } else {
        "idle".green().to_string()
    };
    format_kv_line("State", &state);
    format_kv_line("Records", &records.len().to_string());
    format_kv_line("Matching", &projected.total_matching.to_string());
    format_kv_line(
        "Page",
        &format!("{}/{}", projected.page_number, projected.total_pages),
    );
}

fn start_load(
    catalog: &Arc<Catalog>,
    fetcher: &Arc<PageFetcher<HttpPageSource>>,
    url: &str,
    done: &mpsc::Sender<Result<usize, CatalogError>>,
) {
    let catalog = Arc::clone(catalog);
    let fetcher = Arc::clone(fetcher);
    let url = url.to_string();
    let done = done.clone();
    tokio::spawn(async move {
        let outcome = catalog.load(&*fetcher, &url).await;
        let _ = done.send(outcome).await;
    });
}

async fn run_interactive(run: RunConfig) -> Result<(), String> {
    print_banner();
    print_settings(&run);

    let runner = Runner::new(run.options.clone()).map_err(|e| e.to_string())?;
    let fetcher = Arc::new(runner.fetcher().map_err(|e| e.to_string())?);
    let catalog = Arc::new(Catalog::new());
    let mut session = Session::with_view(run.options.view.clone(), run.options.page_size);
    let (done_tx, mut done_rx) = mpsc::channel::<Result<usize, CatalogError>>(4);
    let mut load_started = Instant::now();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("No data yet. Type 'load' to fetch the listing, 'help' for commands.");
    prompt();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => return Err(format!("failed to read input: {e}")),
                };
                match Command::parse(&line) {
                    Err(SessionError::Empty) => {}
                    Err(e) => println!("{}", e.to_string().yellow()),
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(Command::Status) => print_status(&catalog, &mut session).await,
                    Ok(Command::Load) => {
                        if catalog.is_loading() {
                            println!("{}", "A load is already in progress.".yellow());
                        } else {
                            session.begin_load();
                            load_started = Instant::now();
                            println!(":: Loading {} ...", run.options.start_url);
                            start_load(&catalog, &fetcher, &run.options.start_url, &done_tx);
                        }
                    }
                    Ok(Command::Genders) => {
                        let records = catalog.snapshot().await;
                        let options = crate::view::gender_options(&records);
                        print!("{}", output::render_gender_options(&options));
                    }
                    Ok(command) => {
                        if catalog.is_empty().await {
                            println!("No data yet. Type 'load' first.");
                        } else {
                            let records = catalog.snapshot().await;
                            if session.apply(&command, &records) {
                                show_page(&catalog, &mut session, run.format).await;
                            } else {
                                println!("{}", "Already at that page.".dimmed());
                            }
                        }
                    }
                }
                prompt();
            }
            Some(outcome) = done_rx.recv() => {
                println!();
                match outcome {
                    Ok(count) => {
                        session.finish_load();
                        println!(
                            ":: Loaded {count} records in {}s ::",
                            load_started.elapsed().as_secs()
                        );
                        show_page(&catalog, &mut session, run.format).await;
                    }
                    Err(CatalogError::LoadInProgress) => {
                        println!("{}", "A load is already in progress.".yellow());
                    }
                    Err(e) => {
                        println!(
                            "{} {e} (keeping {} previously loaded records)",
                            "load failed:".red().bold(),
                            catalog.len().await
                        );
                    }
                }
                prompt();
            }
        }
    }

    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    if run.interactive {
        run_interactive(run).await
    } else {
        run_once(run).await
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));

    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "could not determine a config path".to_string())?;
        if config::ensure_default_config_file(&path)? {
            println!("Wrote default config to {}", path.display());
        } else {
            println!("Config already exists at {}", path.display());
        }
        return Ok(());
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args.clone(), cfg)?;
    logging::init_logging(args.verbose, !run.no_color);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> CliArgs {
        let mut argv = vec!["rollcall"];
        argv.extend_from_slice(args);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn defaults_point_at_people_listing() {
        let run = build_run_config(parse(&[]), ConfigFile::default()).unwrap();
        assert_eq!(run.options.start_url, DEFAULT_START_URL);
        assert_eq!(run.options.page_size, 12);
        assert_eq!(run.options.view, ViewState::default());
        assert_eq!(run.format, OutputFormat::Text);
        assert!(!run.interactive);
    }

    #[test]
    fn cli_flags_override_config_file() {
        let cfg = ConfigFile {
            url: Some("http://localhost:8000/people/".to_string()),
            page_size: Some(5),
            rate: Some(3),
            ..ConfigFile::default()
        };
        let run = build_run_config(parse(&["--page-size", "20"]), cfg).unwrap();
        assert_eq!(run.options.start_url, "http://localhost:8000/people/");
        assert_eq!(run.options.page_size, 20);
        assert_eq!(run.options.rate, 3);
    }

    #[test]
    fn view_flags_build_view_state() {
        let run = build_run_config(
            parse(&["-s", "sky", "-g", "unspecified", "-p", "2"]),
            ConfigFile::default(),
        )
        .unwrap();
        assert_eq!(run.options.view.search_term, "sky");
        assert_eq!(run.options.view.gender_filter.as_deref(), Some("n/a"));
        assert_eq!(run.options.view.page_number, 2);
    }

    #[test]
    fn format_is_inferred_from_output_path() {
        let run = build_run_config(parse(&["-o", "people.json"]), ConfigFile::default()).unwrap();
        assert_eq!(run.format, OutputFormat::Json);
        let run = build_run_config(
            parse(&["-o", "people.json", "-f", "names"]),
            ConfigFile::default(),
        )
        .unwrap();
        assert_eq!(run.format, OutputFormat::Names);
    }

    #[test]
    fn bad_config_values_are_rejected() {
        let cfg = ConfigFile {
            output_format: Some("yaml".to_string()),
            ..ConfigFile::default()
        };
        assert!(build_run_config(parse(&[]), cfg).is_err());

        let cfg = ConfigFile {
            page_size: Some(0),
            ..ConfigFile::default()
        };
        assert!(build_run_config(parse(&[]), cfg).is_err());

        let cfg = ConfigFile {
            url: Some("mailto:someone".to_string()),
            ..ConfigFile::default()
        };
        assert!(build_run_config(parse(&[]), cfg).is_err());

        let cfg = ConfigFile {
            timeout: Some(0),
            ..ConfigFile::default()
        };
        assert!(build_run_config(parse(&[]), cfg.clone()).is_err());
        assert_eq!(
            build_run_config(parse(&["--timeout", "4"]), cfg)
                .unwrap()
                .options
                .timeout_seconds,
            4
        );
    }

    #[test]
    fn color_flag_beats_no_color_config() {
        let cfg = ConfigFile {
            no_color: Some(true),
            ..ConfigFile::default()
        };
        assert!(build_run_config(parse(&[]), cfg.clone()).unwrap().no_color);
        assert!(!build_run_config(parse(&["--color"]), cfg).unwrap().no_color);
    }
}
