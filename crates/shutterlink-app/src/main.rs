#![warn(missing_docs)]
//! # shutterlink binary
//!
//! Terminal entry point: renders the current screen and reads one action
//! keyword per line from stdin.

use std::io::{self, BufRead, Write};

use shutterlink_app::{
    AppConfig, Capabilities, CaptureWorkflow, SystemClock, app_version, init_logging,
    project_status,
};
use shutterlink_ui::{Locale, Notice, UserAction, render_notice, render_view};

/// CLI entry point.
fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("shutterlink: {error}");
            std::process::exit(2);
        }
    };

    let log_file = init_logging(&config.log_dir);
    // Must run before any thread exists.
    let clock = SystemClock::detect();
    tracing::info!(
        stage = "app",
        action = "startup",
        version = app_version(),
        endpoint = %config.upload_endpoint,
        locale = ?config.locale
    );

    let caps = match Capabilities::real(&config, clock) {
        Ok(caps) => caps,
        Err(error) => {
            tracing::error!(stage = "app", action = "startup", %error, "capability setup failed");
            eprintln!("shutterlink: {error}");
            std::process::exit(1);
        }
    };

    println!("shutterlink {}", app_version());
    if let Some(path) = log_file {
        println!("log: {}", path.display());
    }

    let mut workflow = CaptureWorkflow::start(caps);
    if let Err(error) = run(&mut workflow, config.locale) {
        tracing::error!(stage = "app", action = "terminal", %error, "terminal i/o failed");
        eprintln!("shutterlink: {error}");
        std::process::exit(1);
    }
    tracing::info!(stage = "app", action = "shutdown");
}

fn run(workflow: &mut CaptureWorkflow, locale: Locale) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        draw(workflow, locale)?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let Some(action) = UserAction::parse(&line) else {
            let keywords: Vec<&str> = UserAction::ALL.iter().map(|action| action.keyword()).collect();
            println!("unknown action '{}'; try one of: {}", line.trim(), keywords.join(", "));
            continue;
        };

        let notice = match action {
            UserAction::Quit if workflow.view().accepts(UserAction::Quit) => {
                if let Err(error) = workflow.shutdown() {
                    eprintln!("shutterlink: {error}");
                }
                break;
            }
            UserAction::Continue if workflow.view().accepts(UserAction::Continue) => {
                if workflow.begin_upload() {
                    draw(workflow, locale)?;
                }
                match workflow.complete_upload() {
                    Ok(_) => Some(Notice::UploadSucceeded),
                    Err(error) => error.notice(),
                }
            }
            action => workflow.dispatch(action),
        };

        if let Some(notice) = notice {
            println!("\n{}", render_notice(notice, locale));
            io::stdout().flush()?;
            if lines.next().transpose()?.is_none() {
                break;
            }
        }
    }

    Ok(())
}

fn draw(workflow: &CaptureWorkflow, locale: Locale) -> io::Result<()> {
    let status = project_status(workflow);
    let mut stdout = io::stdout().lock();
    writeln!(stdout)?;
    writeln!(
        stdout,
        "-- {} | camera {} | library {} | upload {} --",
        status.view, status.camera_permission, status.library_permission, status.upload
    )?;
    writeln!(
        stdout,
        "{}",
        render_view(workflow.view(), workflow.camera_config(), locale)
    )?;
    write!(stdout, "> ")?;
    stdout.flush()
}
