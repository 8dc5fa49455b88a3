//! REPL loop with rustyline.
//!
//! Interactive mode: prompt, meta-commands, history, TAB completion.
//! Pipe mode: read lines from stdin, execute each.

use std::io::{self, BufRead};

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, Editor, Helper};

use crate::commands::build_repl_cmd;
use crate::format::{format_error, format_output, OutputMode};
use crate::parse::{check_meta_command, matches_to_action, MetaCommand};
use crate::state::SessionState;

/// Run the interactive REPL.
pub fn run_repl(state: &SessionState, mode: OutputMode) {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();

    let mut rl: Editor<GramdexHelper, _> = match Editor::with_config(config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("(error) Failed to start line editor: {}", e);
            return;
        }
    };
    rl.set_helper(Some(GramdexHelper));

    let history_path = history_file();
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    loop {
        match rl.readline(&state.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                if let Some(meta) = check_meta_command(trimmed) {
                    match meta {
                        MetaCommand::Quit => break,
                        MetaCommand::Clear => print!("\x1B[2J\x1B[1;1H"),
                        MetaCommand::Help { command } => print_help(command.as_deref()),
                    }
                    continue;
                }

                if let Err(e) = execute_line(trimmed, state, mode) {
                    eprintln!("{}", e);
                }
            }
            // Ctrl-C: new prompt
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("(error) {:?}", err);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }
}

/// Run in pipe mode: read lines from stdin, execute each.
///
/// Blank lines and `#` comments are skipped. Returns 1 if any line failed.
pub fn run_pipe(state: &SessionState, mode: OutputMode) -> i32 {
    let stdin = io::stdin();
    let mut exit_code = 0;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Err(e) = execute_line(trimmed, state, mode) {
            eprintln!("{}", e);
            exit_code = 1;
        }
    }

    exit_code
}

/// Tokenize, parse and run one line, printing its output.
///
/// Parse failures come back as the message to show; engine errors are
/// formatted here and also count as failures.
fn execute_line(line: &str, state: &SessionState, mode: OutputMode) -> Result<(), String> {
    let tokens = shlex::split(line).ok_or_else(|| format!("(error) Invalid quoting: {}", line))?;
    if tokens.is_empty() {
        return Ok(());
    }

    let matches = build_repl_cmd()
        .try_get_matches_from(tokens)
        .map_err(|e| e.to_string())?;
    let action = matches_to_action(&matches).map_err(|e| format!("(error) {}", e))?;

    match state.execute(action) {
        Ok(output) => {
            let formatted = format_output(&output, mode);
            if !formatted.is_empty() {
                println!("{}", formatted);
            }
            Ok(())
        }
        Err(e) => Err(format_error(&e, mode)),
    }
}

fn history_file() -> Option<String> {
    std::env::var("HOME")
        .ok()
        .map(|h| format!("{}/.gramdex_history", h))
}

fn print_help(command: Option<&str>) {
    if let Some(cmd) = command {
        match build_repl_cmd().try_get_matches_from(vec![cmd, "--help"]) {
            Ok(_) => {}
            Err(e) => println!("{}", e),
        }
    } else {
        println!("Available commands:");
        println!("  query <text>                       Documents containing the phrase");
        println!("  scan <text> -n N                   Look up every N-word window");
        println!("  count <text> -n N -d INDEX         Count N-word windows in one document");
        println!("  vocab [word ...] [--limit N]       Word ids and frequencies");
        println!("  stats                              Per-order index statistics");
        println!();
        println!("Meta-commands:");
        println!("  help [command]         Show help");
        println!("  quit / exit            Exit REPL");
        println!("  clear                  Clear screen");
    }
}

// =========================================================================
// TAB Completion
// =========================================================================

const TOP_LEVEL_COMMANDS: &[&str] = &[
    "query", "scan", "count", "vocab", "stats", "help", "quit", "exit", "clear",
];

struct GramdexHelper;

impl Helper for GramdexHelper {}
impl Validator for GramdexHelper {}
impl Highlighter for GramdexHelper {}
impl Hinter for GramdexHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Completer for GramdexHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_pos = &line[..pos];
        let parts: Vec<&str> = line_to_pos.split_whitespace().collect();
        let trailing_space = line_to_pos.ends_with(' ');

        // Only the command word completes; the rest is free text.
        if parts.is_empty() || (parts.len() == 1 && !trailing_space) {
            let prefix = parts.first().copied().unwrap_or("");
            let start = pos - prefix.len();
            let candidates = TOP_LEVEL_COMMANDS
                .iter()
                .filter(|cmd| cmd.starts_with(prefix))
                .map(|cmd| Pair {
                    display: cmd.to_string(),
                    replacement: cmd.to_string(),
                })
                .collect();
            Ok((start, candidates))
        } else {
            Ok((pos, vec![]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gramdex_core::OrderRange;
    use gramdex_engine::NgramLookup;

    fn state() -> SessionState {
        let lookup = NgramLookup::build(
            &["The cat sat.", "The dog ran."],
            OrderRange::new(1, 2).unwrap(),
            None,
            false,
        )
        .unwrap();
        SessionState::new(lookup, None)
    }

    #[test]
    fn test_execute_line_ok() {
        let state = state();
        assert!(execute_line("query the cat", &state, OutputMode::Human).is_ok());
        assert!(execute_line("stats", &state, OutputMode::Json).is_ok());
    }

    #[test]
    fn test_execute_line_failures() {
        let state = state();
        assert!(execute_line("query \"unterminated", &state, OutputMode::Human).is_err());
        assert!(execute_line("frobnicate", &state, OutputMode::Human).is_err());
        let err = execute_line("query the cat sat", &state, OutputMode::Human).unwrap_err();
        assert!(err.starts_with("(error)"), "{}", err);
    }
}
