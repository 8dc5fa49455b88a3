//! ArgMatches → CliAction conversion.
//!
//! Meta-commands (`help`, `quit`, `clear`) are recognized before clap sees
//! the line; everything else goes through the shared command tree.

use clap::ArgMatches;

use gramdex_core::{DocIdx, GramOrder};

/// REPL-only commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    Quit,
    Clear,
    Help { command: Option<String> },
}

/// A parsed, ready-to-run request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Query {
        text: String,
    },
    Scan {
        text: String,
        order: GramOrder,
    },
    Count {
        text: String,
        document: DocIdx,
        order: GramOrder,
    },
    Vocab {
        words: Vec<String>,
        limit: Option<usize>,
    },
    Stats,
}

/// Check if a line is a meta-command.
pub fn check_meta_command(line: &str) -> Option<MetaCommand> {
    let mut parts = line.trim().splitn(2, char::is_whitespace);
    match parts.next()? {
        "quit" | "exit" => Some(MetaCommand::Quit),
        "clear" => Some(MetaCommand::Clear),
        "help" => Some(MetaCommand::Help {
            command: parts
                .next()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }),
        _ => None,
    }
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (sub_name, sub_matches) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    match sub_name {
        "query" => Ok(CliAction::Query {
            text: joined_text(sub_matches),
        }),
        "scan" => Ok(CliAction::Scan {
            text: joined_text(sub_matches),
            order: order(sub_matches)?,
        }),
        "count" => Ok(CliAction::Count {
            text: joined_text(sub_matches),
            order: order(sub_matches)?,
            document: sub_matches
                .get_one::<u32>("document")
                .copied()
                .ok_or_else(|| "Missing --document".to_string())?,
        }),
        "vocab" => Ok(CliAction::Vocab {
            words: sub_matches
                .get_many::<String>("words")
                .map(|w| w.cloned().collect())
                .unwrap_or_default(),
            limit: sub_matches.get_one::<usize>("limit").copied(),
        }),
        "stats" => Ok(CliAction::Stats),
        other => Err(format!("'{}' is not available here", other)),
    }
}

fn joined_text(matches: &ArgMatches) -> String {
    matches
        .get_many::<String>("text")
        .map(|parts| parts.map(String::as_str).collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn order(matches: &ArgMatches) -> Result<GramOrder, String> {
    matches
        .get_one::<usize>("order")
        .copied()
        .ok_or_else(|| "Missing --order".to_string())
}
