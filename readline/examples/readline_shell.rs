// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A tiny shell on top of the line editor. Run it with:
//!
//! ```sh
//! cargo run --example readline_shell -- --edit-mode vi --log-file /tmp/readline.log
//! ```
//!
//! Commands: `help`, `history`, `sleep <ms>`, `exit`. Tab completes command names. Tab
//! after `slow ` completes after a delay, to show a deferred completion.

use std::{rc::{Rc, Weak},
          str::FromStr,
          time::Duration};

use clap::Parser;
use miette::IntoDiagnostic;
use r3bl_readline::{ActionContext, BellStyle, CandidateCompletionHandler, CompleteOutcome,
                    CompletionHandler, Connection, EditModeKind, HISTORY_SIZE_MAX, Readline,
                    ReadlineConfig, TerminalConnection, TracingConfig, WordListCompleter,
                    ok, setup_default_miette_global_report_handler,
                    try_initialize_logging_global};
use tracing_core::LevelFilter;

const COMMANDS: [&str; 5] = ["exit", "help", "history", "sleep", "slow"];

#[derive(Debug, Parser)]
#[command(version, about = "Interactive demo of r3bl_readline")]
struct CliArgs {
    /// Key bindings to use: emacs or vi.
    #[arg(long, default_value = "emacs", value_parser = EditModeKind::from_str)]
    edit_mode: EditModeKind,

    /// Write debug logs to this file.
    #[arg(long)]
    log_file: Option<String>,

    /// Number of lines to remember.
    #[arg(long, default_value_t = HISTORY_SIZE_MAX)]
    history_size: usize,

    /// Don't ring the bell.
    #[arg(long)]
    no_bell: bool,
}

impl From<&CliArgs> for ReadlineConfig {
    fn from(cli_args: &CliArgs) -> Self {
        ReadlineConfig::default()
            .with_edit_mode(cli_args.edit_mode)
            .with_history_size(cli_args.history_size)
            .with_bell_style(if cli_args.no_bell {
                BellStyle::None
            } else {
                BellStyle::Audible
            })
    }
}

fn main() -> miette::Result<()> {
    setup_default_miette_global_report_handler(
        "https://github.com/r3bl-org/r3bl-open-core/issues/new",
    );
    let cli_args = CliArgs::parse();

    if let Some(log_file) = &cli_args.log_file {
        try_initialize_logging_global(TracingConfig::new_file(
            Some(log_file.clone()),
            LevelFilter::DEBUG,
        ))?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;
    let local_set = tokio::task::LocalSet::new();
    local_set.block_on(&runtime, run(cli_args))
}

async fn run(cli_args: CliArgs) -> miette::Result<()> {
    let conn = Rc::new(TerminalConnection::try_new()?);
    let readline = Readline::new(ReadlineConfig::from(&cli_args));
    tracing::info!(?cli_args, "start");

    conn.write("Type `help` for commands.\n");
    prompt(&readline, &conn)?;
    conn.run().await?;

    tracing::info!("stop");
    ok!()
}

fn prompt(readline: &Readline, conn: &Rc<TerminalConnection>) -> miette::Result<()> {
    let (readline_clone, conn_clone) = (readline.clone(), conn.clone());
    let handler = ShellCompletion {
        words: CandidateCompletionHandler::new(WordListCompleter::new(COMMANDS)),
        readline: readline.clone(),
        conn: Rc::downgrade(conn),
    };
    readline.readline_with_completion(
        conn.clone(),
        "\x1b[1;32m$\x1b[0m ",
        move |maybe_line| {
            if let Err(report) = on_line(&readline_clone, &conn_clone, maybe_line) {
                tracing::error!(?report, "command failed");
                conn_clone.close();
            }
        },
        handler,
    )?;
    ok!()
}

fn on_line(
    readline: &Readline,
    conn: &Rc<TerminalConnection>,
    maybe_line: Option<String>,
) -> miette::Result<()> {
    let Some(line) = maybe_line else {
        conn.write("\n");
        conn.close();
        return ok!();
    };

    let mut words = line.split_whitespace();
    match words.next() {
        None => prompt(readline, conn),
        Some("exit") => {
            conn.close();
            ok!()
        }
        Some("help") => {
            conn.write(&format!("commands: {}\n", COMMANDS.join(", ")));
            prompt(readline, conn)
        }
        Some("history") => {
            let entries = readline.with_history(|history| {
                (0..history.len())
                    .filter_map(|index| history.get(index).map(str::to_owned))
                    .collect::<Vec<_>>()
            })?;
            for (index, entry) in entries.iter().enumerate() {
                conn.write(&format!("{index:>4}  {entry}\n"));
            }
            prompt(readline, conn)
        }
        Some("sleep") => {
            let millis = words
                .next()
                .and_then(|it| it.parse::<u64>().ok())
                .unwrap_or(1000);
            let (readline_clone, conn_clone) = (readline.clone(), conn.clone());
            conn.schedule(
                Box::new(move || {
                    conn_clone.write(&format!("slept {millis}ms\n"));
                    if let Err(report) = prompt(&readline_clone, &conn_clone) {
                        tracing::error!(?report, "can't prompt");
                        conn_clone.close();
                    }
                }),
                Duration::from_millis(millis),
            );
            ok!()
        }
        Some(other) => {
            conn.write(&format!("unknown command: {other}\n"));
            prompt(readline, conn)
        }
    }
}

/// Completes command names right away, and anything after `slow ` half a second later.
struct ShellCompletion {
    words: CandidateCompletionHandler,
    readline: Readline,
    conn: Weak<TerminalConnection>,
}

impl std::fmt::Debug for ShellCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellCompletion")
            .field("words", &self.words)
            .finish_non_exhaustive()
    }
}

impl CompletionHandler for ShellCompletion {
    fn complete(&mut self, cx: &mut ActionContext<'_>) -> CompleteOutcome {
        if !cx.interaction.buffer().text().starts_with("slow ") {
            return self.words.complete(cx);
        }
        let Some(conn) = self.conn.upgrade() else {
            return CompleteOutcome::Completed;
        };
        let readline = self.readline.clone();
        conn.schedule(
            Box::new(move || {
                let result = readline
                    .with_interaction(|interaction| {
                        let mut update = interaction.buffer().clone();
                        update.move_to_end();
                        if update.insert_str("and steady").is_ok() {
                            interaction.refresh(update);
                        }
                    })
                    .and_then(|()| readline.resume());
                if let Err(err) = result {
                    tracing::warn!(%err, "deferred completion");
                }
            }),
            Duration::from_millis(500),
        );
        CompleteOutcome::Deferred
    }

    fn ask_display_completion(&self) -> bool { self.words.ask_display_completion() }

    fn set_ask_display_completion(&mut self, ask: bool) {
        self.words.set_ask_display_completion(ask);
    }
}
