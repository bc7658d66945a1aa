use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{at, never, select, tick, unbounded, Receiver};
use crossterm::event::{self, Event};

use crate::config::AutoSaveConfig;

const INPUT_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Input(Event),
    AutosaveTick,
    NotificationDeadline,
}

/// Owns the autosave ticker and merges it with terminal input.
pub struct Scheduler {
    autosave: Receiver<Instant>,
    interval: Option<Duration>,
}

impl Scheduler {
    pub fn new(config: &AutoSaveConfig) -> Self {
        Self::with_interval(config.enabled.then(|| config.interval()))
    }

    pub fn with_interval(interval: Option<Duration>) -> Self {
        let autosave = match interval {
            Some(every) => {
                tracing::debug!(?every, "autosave timer started");
                tick(every)
            }
            None => never(),
        };
        Self { autosave, interval }
    }

    pub fn is_autosave_active(&self) -> bool {
        self.interval.is_some()
    }

    /// Stops autosave ticks. Ticks already queued are dropped with the channel.
    pub fn cancel_autosave(&mut self) {
        if self.interval.take().is_some() {
            self.autosave = never();
            tracing::debug!("autosave timer cancelled");
        }
    }

    /// Blocks until input arrives, an autosave tick fires, or `deadline`
    /// passes.
    pub fn wait(&self, input: &Receiver<Event>, deadline: Option<Instant>) -> Result<AppEvent> {
        let deadline_rx = deadline.map(at).unwrap_or_else(never);
        select! {
            recv(input) -> event => event
                .map(AppEvent::Input)
                .map_err(|_| anyhow!("terminal input reader stopped")),
            recv(self.autosave) -> _ => Ok(AppEvent::AutosaveTick),
            recv(deadline_rx) -> _ => Ok(AppEvent::NotificationDeadline),
        }
    }
}

/// Background thread forwarding crossterm events over a channel.
pub struct InputPump {
    events: Receiver<Event>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InputPump {
    pub fn spawn() -> Result<Self> {
        let (tx, events) = unbounded();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("notty-input".into())
            .spawn(move || {
                while !flag.load(Ordering::Relaxed) {
                    match event::poll(INPUT_POLL) {
                        Ok(false) => continue,
                        Ok(true) => {}
                        Err(err) => {
                            tracing::error!(?err, "polling terminal input failed");
                            break;
                        }
                    }
                    match event::read() {
                        Ok(event) => {
                            if tx.send(event).is_err() {
                                break;
                            }
                        }
                        Err(err) => {
                            tracing::error!(?err, "reading terminal input failed");
                            break;
                        }
                    }
                }
            })
            .context("spawning terminal input thread")?;
        Ok(Self {
            events,
            stop,
            handle: Some(handle),
        })
    }

    pub fn events(&self) -> &Receiver<Event> {
        &self.events
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("terminal input thread panicked");
            }
        }
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        self.stop();
    }
}
