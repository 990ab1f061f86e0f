//! Terminal shell for the reports panel.
//!
//! Prints the panel to stdout whenever the core asks for a render and reads
//! intents from stdin, one per line:
//!
//! ```text
//! link <report-id> <case-id>
//! reload
//! dismiss
//! quit
//! ```

use std::io::Write as _;
use std::process::ExitCode;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use reports_core::config::DEFAULT_LOG_FILTER;
use reports_core::shell::{ReqwestTransport, Shell};
use reports_core::{render_text, Config, Event};

#[derive(Debug)]
enum Command {
    Event(Event),
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };

    let command = match verb {
        "link" => {
            let report_id = parts.next().ok_or("usage: link <report-id> <case-id>")?;
            let case_id = parts.next().unwrap_or_default();
            Command::Event(Event::CaseSelected {
                report_id: report_id.to_string(),
                case_id: case_id.to_string(),
            })
        }
        "reload" => Command::Event(Event::Reload),
        "dismiss" => Command::Event(Event::DismissToast),
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {other}")),
    };

    if parts.next().is_some() {
        return Err(format!("too many arguments for {verb}"));
    }

    Ok(Some(command))
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn flush_render<T: reports_core::shell::Transport + 'static>(shell: &mut Shell<T>) {
    if shell.take_render() {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", render_text(&shell.view()));
        let _ = stdout.flush();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("reports-panel: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.log_filter);

    let transport = match ReqwestTransport::new() {
        Ok(transport) => transport,
        Err(e) => {
            error!(error = %e, "cannot create HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let (mut shell, mut notifications) = Shell::new(transport);
    shell.dispatch(Event::Mounted(config.api));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        flush_render(&mut shell);
        while let Ok(toast) = notifications.try_recv() {
            eprintln!("notice: {}", toast.message);
        }

        tokio::select! {
            _ = shell.next_completion(), if shell.in_flight() > 0 => {}
            line = lines.next_line() => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(Some(Command::Event(event))) => shell.dispatch(event),
                    Ok(Some(Command::Quit)) => break,
                    Ok(None) => {}
                    Err(message) => eprintln!("{message}"),
                },
                Ok(None) => {
                    shell.settle().await;
                    flush_render(&mut shell);
                    while let Ok(toast) = notifications.try_recv() {
                        eprintln!("notice: {}", toast.message);
                    }
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "stdin closed");
                    break;
                }
            },
        }
    }

    ExitCode::SUCCESS
}
