//! Repeating evaluation loop.
//!
//! The loop owns the controller for its whole lifetime and receives every
//! command through one channel, so ticks and toggles never overlap. Dropping
//! all [`DaemonHandle`]s or sending [`DaemonCommand::Shutdown`] ends it.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::appearance::{AppearancePair, AppearanceService};
use crate::controller::{ControllerError, ControllerResult, TickOutcome, ToggleController};
use crate::error::AppResult;
use crate::schedule::{Clock, Window};
use crate::storage::SettingsStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonCommand {
    Tick,
    Toggle,
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct DaemonHandle {
    tx: Sender<DaemonCommand>,
}

impl DaemonHandle {
    /// Returns false once the loop has stopped listening.
    pub fn send(&self, command: DaemonCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn toggle(&self) -> bool {
        self.send(DaemonCommand::Toggle)
    }

    pub fn tick(&self) -> bool {
        self.send(DaemonCommand::Tick)
    }

    pub fn shutdown(&self) -> bool {
        self.send(DaemonCommand::Shutdown)
    }
}

pub fn channel() -> (DaemonHandle, Receiver<DaemonCommand>) {
    let (tx, rx) = mpsc::channel();
    (DaemonHandle { tx }, rx)
}

pub fn run_loop<A, S, C, F>(
    controller: &mut ToggleController<A, S>,
    clock: &C,
    interval: Duration,
    commands: &Receiver<DaemonCommand>,
    mut on_toggle: F,
) -> AppResult<()>
where
    A: AppearanceService,
    S: SettingsStore,
    C: Clock,
    F: FnMut(Window, &AppearancePair),
{
    tracing::info!(interval_secs = interval.as_secs(), "scheduler started");
    run_tick(controller, clock)?;

    // Commands must not push the timer back.
    let mut deadline = Instant::now() + interval;
    loop {
        let wait = deadline.saturating_duration_since(Instant::now());
        match commands.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {
                deadline = Instant::now() + interval;
                if let Err(err) = controller.reload() {
                    tracing::warn!(%err, "failed to reload settings; keeping in-memory values");
                }
                run_tick(controller, clock)?;
            }
            Ok(DaemonCommand::Tick) => run_tick(controller, clock)?,
            Ok(DaemonCommand::Toggle) => {
                let toggled = controller.manual_toggle();
                if let Some(window) = tolerate(toggled)? {
                    on_toggle(window, &controller.settings().pair_for(window));
                }
            }
            Ok(DaemonCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    tracing::info!("scheduler stopped");
    Ok(())
}

fn run_tick<A, S, C>(controller: &mut ToggleController<A, S>, clock: &C) -> AppResult<()>
where
    A: AppearanceService,
    S: SettingsStore,
    C: Clock,
{
    let now = clock.now();
    if let Some(outcome) = tolerate(controller.tick(now))? {
        if !matches!(outcome, TickOutcome::Disabled | TickOutcome::Unchanged { .. }) {
            tracing::debug!(%now, ?outcome, "tick");
        }
    }
    Ok(())
}

/// A misconfigured schedule skips the tick; a failing appearance host ends
/// the loop. Failed saves never get here: the controller keeps them pending
/// and the next timer firing retries them.
fn tolerate<T>(result: ControllerResult<T>) -> AppResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ControllerError::Schedule(err)) => {
            tracing::warn!(%err, "schedule misconfigured; skipping");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

pub fn parse_command(line: &str) -> Option<DaemonCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "toggle" | "t" => Some(DaemonCommand::Toggle),
        "tick" | "update" => Some(DaemonCommand::Tick),
        "quit" | "exit" | "q" => Some(DaemonCommand::Shutdown),
        _ => None,
    }
}

/// Forward commands typed on stdin to the loop. Stops at EOF or once the
/// loop is gone.
pub fn spawn_stdin_reader(handle: DaemonHandle) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Some(command) => {
                    if !handle.send(command) {
                        break;
                    }
                }
                None => tracing::warn!(input = %line.trim(), "unknown command; expected toggle, tick or quit"),
            }
        }
        tracing::debug!("stdin reader finished");
    })
}
