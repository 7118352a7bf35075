//! Async loop that runs one session to the end.
//!
//! Combines a [`TickSource`], a channel of user [`Input`], a [`Navigator`]
//! and a [`ProfileStore`]. Every event, rejected command and save result is
//! forwarded to the update channel for rendering.
//!
//! Whenever a command retires or arms a countdown (`skip`, `complete`,
//! `ready`) the tick source is reset, so a tick that was already due cannot
//! land on the phase that follows.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::SessionError;
use crate::events::Event;
use crate::navigation::{Navigator, Route};
use crate::profile::ProfileStore;
use crate::results::{save_results, SaveStatus};
use crate::session::{Command, Input, Session};
use crate::ticks::TickSource;

/// Something the owner should render.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Event(Event),
    Rejected(SessionError),
    Saved(SaveStatus),
}

/// Why the driver returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Completed, feedback captured and a save attempted.
    Finished,
    /// The user left before completion.
    Abandoned,
    /// The input channel closed (the owner went away).
    Detached,
}

#[derive(Debug)]
pub struct Outcome<S> {
    pub session: S,
    pub exit: Exit,
    /// Result of the save attempt, when one was made.
    pub save: Option<SaveStatus>,
}

pub struct SessionDriver<'a, S, T, N, P> {
    session: S,
    ticks: T,
    navigator: N,
    store: &'a P,
    updates: mpsc::UnboundedSender<Update>,
}

impl<'a, S, T, N, P> SessionDriver<'a, S, T, N, P>
where
    S: Session,
    T: TickSource,
    N: Navigator,
    P: ProfileStore,
{
    pub fn new(
        session: S,
        ticks: T,
        navigator: N,
        store: &'a P,
        updates: mpsc::UnboundedSender<Update>,
    ) -> Self {
        Self {
            session,
            ticks,
            navigator,
            store,
            updates,
        }
    }

    /// Run until the session finishes, is abandoned or loses its input.
    ///
    /// `inputs` is only borrowed, so the owner can keep reading from it
    /// afterwards (for example to offer a save retry).
    pub async fn run(mut self, inputs: &mut mpsc::Receiver<Input>) -> Outcome<S> {
        let kind = self.session.kind();
        self.navigator.navigate(Route::Session { kind });
        self.emit(Update::Event(self.session.snapshot()));

        loop {
            let timer_running = self.session.timer_id().is_some();
            tokio::select! {
                biased;

                input = inputs.recv() => match input {
                    None => {
                        self.ticks.reset();
                        debug!("input closed, detaching session");
                        return self.finish(Exit::Detached, None);
                    }
                    Some(Input::Exit) => {
                        self.ticks.reset();
                        info!(?kind, "session abandoned");
                        self.navigator.navigate(Route::after(kind));
                        return self.finish(Exit::Abandoned, None);
                    }
                    Some(Input::Command(command)) => {
                        let feedback = matches!(command, Command::Feedback(_));
                        let armed = self.session.timer_id();
                        match self.session.apply(command) {
                            Ok(events) => {
                                // A new countdown starts a full period away.
                                if self.session.timer_id() != armed {
                                    self.ticks.reset();
                                }
                                for event in events {
                                    self.emit(Update::Event(event));
                                }
                                if feedback && self.session.is_completed() {
                                    let save = self.save().await;
                                    self.navigator.navigate(Route::after(kind));
                                    return self.finish(Exit::Finished, Some(save));
                                }
                            }
                            Err(e) => self.emit(Update::Rejected(e)),
                        }
                    }
                },

                tick = self.ticks.next_tick(), if timer_running => {
                    if tick.is_none() {
                        // Tick source gone: nothing can advance the countdown any more.
                        return self.finish(Exit::Detached, None);
                    }
                    if let Some(event) = self.session.tick() {
                        self.emit(Update::Event(event));
                    }
                    self.emit(Update::Event(self.session.snapshot()));
                }
            }
        }
    }

    async fn save(&mut self) -> SaveStatus {
        let status = save_results(self.store, &self.session.summary()).await;
        self.emit(Update::Saved(status.clone()));
        status
    }

    fn emit(&self, update: Update) {
        // The owner may stop listening; the session still runs to its end.
        let _ = self.updates.send(update);
    }

    fn finish(self, exit: Exit, save: Option<SaveStatus>) -> Outcome<S> {
        Outcome {
            session: self.session,
            exit,
            save,
        }
    }
}
