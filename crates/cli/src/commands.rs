//! Clap command tree definition.
//!
//! Builds the full `clap::Command` tree used by both shell mode (directly)
//! and REPL mode (via `try_get_matches_from`).

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("gramdex")
        .about("Exact-match n-gram phrase lookup over a document corpus")
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .help("Config file (default: gramdex.toml)")
                .global(true),
        )
        .arg(
            Arg::new("corpus")
                .long("corpus")
                .value_name("PATH")
                .help("Corpus file: .jsonl with {id, document} objects, or one document per line")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("More log output on stderr (repeat for more)")
                .action(ArgAction::Count)
                .conflicts_with("quiet")
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only log errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_init())
        .subcommand(build_build())
        .subcommand(build_query())
        .subcommand(build_scan())
        .subcommand(build_count())
        .subcommand(build_vocab())
        .subcommand(build_stats())
}

/// Build a command tree for REPL mode (no global flags).
pub fn build_repl_cmd() -> Command {
    Command::new("repl")
        .multicall(true)
        .subcommand_required(true)
        .subcommand(build_query())
        .subcommand(build_scan())
        .subcommand(build_count())
        .subcommand(build_vocab())
        .subcommand(build_stats())
}

fn build_init() -> Command {
    Command::new("init").about("Write a commented default config file if none exists")
}

fn build_build() -> Command {
    Command::new("build")
        .about("Build the vocabulary and every configured order from --corpus")
        .arg(
            Arg::new("force")
                .long("force")
                .short('f')
                .help("Discard existing artifacts first")
                .action(ArgAction::SetTrue),
        )
}

fn text_arg() -> Arg {
    Arg::new("text")
        .required(true)
        .num_args(1..)
        .value_name("TEXT")
        .help("Text to look up (words are joined with spaces)")
}

fn order_arg() -> Arg {
    Arg::new("order")
        .long("order")
        .short('n')
        .required(true)
        .value_name("N")
        .value_parser(value_parser!(usize))
        .help("Window size in words")
}

fn build_query() -> Command {
    Command::new("query")
        .about("Find the documents containing a phrase")
        .arg(text_arg())
}

fn build_scan() -> Command {
    Command::new("scan")
        .about("Look up every N-word window of a text")
        .arg(text_arg())
        .arg(order_arg())
}

fn build_count() -> Command {
    Command::new("count")
        .about("Count every N-word window of a text inside one corpus document")
        .arg(text_arg())
        .arg(order_arg())
        .arg(
            Arg::new("document")
                .long("document")
                .short('d')
                .required(true)
                .value_name("INDEX")
                .value_parser(value_parser!(u32))
                .help("Document index in the corpus"),
        )
}

fn build_vocab() -> Command {
    Command::new("vocab")
        .about("Show ids and frequencies of words (all words when none given)")
        .arg(
            Arg::new("words")
                .num_args(0..)
                .value_name("WORD")
                .help("Words to look up"),
        )
        .arg(
            Arg::new("limit")
                .long("limit")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("List at most N entries"),
        )
}

fn build_stats() -> Command {
    Command::new("stats").about("Per-order index statistics")
}
