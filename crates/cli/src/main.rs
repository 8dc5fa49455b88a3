//! gramdex CLI: exact-match n-gram phrase lookup.
//!
//! Three modes:
//! - **Shell mode**: `gramdex [flags] COMMAND` runs a single command and exits
//! - **REPL mode**: `gramdex [flags]` gives an interactive prompt (if stdin is a TTY)
//! - **Pipe mode**: `echo "query the cat" | gramdex` runs line-by-line from stdin
//!
//! `init` and `build` run before the engine is opened; everything else runs
//! against an opened engine.

mod commands;
mod corpus;
mod format;
mod parse;
mod repl;
mod state;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;

use tracing::Level;

use gramdex_engine::{discard_order, NgramConfig, NgramLookup, CONFIG_FILE_NAME};

use commands::build_cli;
use corpus::Corpus;
use format::{format_error, format_output, OutputMode};
use parse::matches_to_action;
use state::{Output, SessionState};

fn main() {
    let cli = build_cli();
    let matches = cli.get_matches();

    init_logging(&matches);

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    if matches.subcommand_name() == Some("init") {
        process::exit(run_init(&config_path));
    }

    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_error(&e, output_mode));
            process::exit(1);
        }
    };

    let corpus = match matches.get_one::<String>("corpus") {
        Some(path) => match Corpus::read(Path::new(path)) {
            Ok(corpus) => Some(corpus),
            Err(e) => {
                eprintln!("(error) {}", e);
                process::exit(1);
            }
        },
        None => None,
    };

    if let Some(("build", sub)) = matches.subcommand() {
        let code = run_build(config, corpus, sub.get_flag("force"), output_mode);
        process::exit(code);
    }

    let opened = {
        let texts = corpus.as_ref().map(Corpus::texts);
        NgramLookup::open(&config, texts.as_deref())
    };
    let lookup = match opened {
        Ok(lookup) => lookup,
        Err(e) => {
            eprintln!("{}", format_error(&e, output_mode));
            process::exit(1);
        }
    };
    let state = SessionState::new(lookup, corpus);

    if matches.subcommand().is_some() {
        let exit_code = run_shell_mode(&matches, &state, output_mode);
        process::exit(exit_code);
    } else if std::io::stdin().is_terminal() {
        repl::run_repl(&state, output_mode);
    } else {
        let exit_code = repl::run_pipe(&state, output_mode);
        process::exit(exit_code);
    }
}

/// Logs go to stderr so stdout stays clean for results.
fn init_logging(matches: &clap::ArgMatches) {
    let level = if matches.get_flag("quiet") {
        Level::ERROR
    } else {
        match matches.get_count("verbose") {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

/// Read the config file if present, else defaults, with artifact paths
/// relative to the file's directory.
fn load_config(path: &Path) -> gramdex_core::Result<NgramConfig> {
    let config = if path.exists() {
        NgramConfig::from_file(path)?
    } else {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        NgramConfig::default()
    };
    let base = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok(config.resolve_paths(base))
}

fn run_init(path: &Path) -> i32 {
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return 0;
    }
    match NgramConfig::write_default_if_missing(path) {
        Ok(()) => {
            println!("Wrote default config to {}", path.display());
            0
        }
        Err(e) => {
            eprintln!("(error) {}", e);
            1
        }
    }
}

fn run_build(
    config: NgramConfig,
    corpus: Option<Corpus>,
    force: bool,
    mode: OutputMode,
) -> i32 {
    let Some(corpus) = corpus else {
        eprintln!("(error) build needs --corpus");
        return 2;
    };
    let config = NgramConfig {
        save: true,
        load_only: false,
        ..config
    };

    if force {
        if let Err(e) = discard_all(&config) {
            eprintln!("{}", format_error(&e, mode));
            return 1;
        }
    }

    let texts = corpus.texts();
    match NgramLookup::open(&config, Some(texts.as_slice())) {
        Ok(lookup) => {
            let output = Output::Stats {
                vocab_size: lookup.vocabulary().size(),
                doc_count: lookup.doc_count(),
                orders: lookup.stats(),
            };
            println!("{}", format_output(&output, mode));
            0
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            1
        }
    }
}

/// Remove the vocabulary and every configured order.
fn discard_all(config: &NgramConfig) -> gramdex_core::Result<()> {
    let vocab = config.vocab_file();
    if vocab.exists() {
        std::fs::remove_file(&vocab)?;
        tracing::warn!(path = %vocab.display(), "Discarded vocabulary");
    }
    for order in config.orders()?.iter() {
        discard_order(config, order)?;
    }
    Ok(())
}

fn run_shell_mode(matches: &clap::ArgMatches, state: &SessionState, mode: OutputMode) -> i32 {
    let action = match matches_to_action(matches) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("(error) {}", e);
            return 2;
        }
    };
    match state.execute(action) {
        Ok(output) => {
            let formatted = format_output(&output, mode);
            if !formatted.is_empty() {
                println!("{}", formatted);
            }
            0
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            1
        }
    }
}
