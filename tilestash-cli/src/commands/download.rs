//! Download commands - fetch the world preset or a city into a package.

use std::io;
use std::thread;
use std::time::Duration;

use clap::Subcommand;
use console::{style, Term};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use tilestash::download::{DownloadJob, JobState};
use tilestash::MapSession;

use crate::error::CliError;

/// Download subcommands.
#[derive(Debug, Subcommand)]
pub enum DownloadCommands {
    /// Download the low-zoom world package
    World {
        /// Replace an existing package without asking
        #[arg(long)]
        force: bool,
    },

    /// Download the area around a city
    City {
        /// City name (e.g., "Montpellier")
        name: String,

        /// Replace an existing package without asking
        #[arg(long)]
        force: bool,
    },
}

/// Run a download subcommand and wait for it to finish.
pub fn run(session: &mut MapSession, command: DownloadCommands) -> Result<(), CliError> {
    let job = match command {
        DownloadCommands::World { force } => {
            start_with_confirm(session, force, |s, force| s.download_world(force))?
        }
        DownloadCommands::City { name, force } => {
            start_with_confirm(session, force, |s, force| s.prepare_city_download(&name, force))?
        }
    };

    wait_for(session, &job)
}

/// Start a download, asking before replacing an existing package.
fn start_with_confirm<F>(session: &mut MapSession, force: bool, mut start: F) -> Result<DownloadJob, CliError>
where
    F: FnMut(&mut MapSession, bool) -> tilestash::Result<DownloadJob>,
{
    match start(session, force) {
        Ok(job) => Ok(job),
        Err(e) if e.is_conflict() && !force => {
            if let Some(status) = session.status() {
                eprintln!("{}", style(status).yellow());
            }
            if !confirm_override()? {
                return Err(CliError::Cancelled("existing package kept".to_string()));
            }
            Ok(start(session, true)?)
        }
        Err(e) => Err(e.into()),
    }
}

fn confirm_override() -> Result<bool, CliError> {
    if !Term::stderr().is_term() {
        return Ok(false);
    }
    Confirm::new()
        .with_prompt("File already exists. Do you want to override?")
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e.to_string())))
}

/// Drive the session clock until the download's watcher finishes.
fn wait_for(session: &mut MapSession, job: &DownloadJob) -> Result<(), CliError> {
    let interval = session.config().poll_interval;
    let name = job
        .destination()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let bar = ProgressBar::new(job.total());
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len} tiles ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar.set_message(name.clone());

    tracing::info!(package = %name, total = job.total(), "Waiting for download");

    while session.has_running_downloads() {
        thread::sleep(Duration::from_secs_f64(interval));
        session.tick(interval);
        bar.set_position(job.poll_status().rendered);
    }

    let status = job.poll_status();
    bar.set_position(status.rendered);
    match status.state {
        JobState::Completed => {
            bar.finish_with_message(format!("{} done", name));
            println!("Saved {}", job.destination().display());
            Ok(())
        }
        JobState::Failed(reason) => {
            bar.abandon_with_message(format!("{} failed", name));
            Err(CliError::DownloadFailed(format!(
                "{} ({}/{} tiles)",
                reason, status.rendered, status.total
            )))
        }
        JobState::Running => Err(CliError::DownloadFailed(
            "download stopped being watched before it finished".to_string(),
        )),
    }
}
