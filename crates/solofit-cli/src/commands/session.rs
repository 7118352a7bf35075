//! Interactive workout and evaluation runs.
//!
//! Commands are read line by line from stdin on a helper thread, the
//! countdown ticks once per second, and every update is printed as it
//! arrives (or as JSON lines with `--json`).

use std::io::BufRead;

use clap::Args;
use solofit_core::session::Upcoming;
use solofit_core::{
    format_clock, save_results, Command, Config, Database, EvaluationSession, Event, Exit, Input,
    IntervalTicks, Navigator, Phase, ProfileStore, Program, Route, SaveStatus, Session,
    SessionDriver, SessionKind, SessionSummary, Update, WorkoutSession,
};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Args)]
pub struct SessionArgs {
    /// Print updates as JSON lines
    #[arg(long)]
    json: bool,
}

pub fn run_workout(args: SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let program = config.workout_program()?;
    let session = WorkoutSession::new(program.clone(), config.timer_settings());
    run_session(session, program, args.json)
}

pub fn run_evaluation(args: SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let program = Program::evaluation();
    let session = EvaluationSession::new(program.clone(), config.timer_settings());
    run_session(session, program, args.json)
}

fn run_session<S: Session>(
    session: S,
    program: Program,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    db.ensure_profile()?;
    let renderer = Renderer {
        program,
        kind: session.kind(),
        json,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let (input_tx, mut inputs) = mpsc::channel(16);
        let (update_tx, mut updates) = mpsc::unbounded_channel();
        spawn_input_reader(input_tx);

        let printer = tokio::spawn(async move {
            while let Some(update) = updates.recv().await {
                renderer.render(&update);
            }
            renderer
        });

        let driver = SessionDriver::new(
            session,
            IntervalTicks::every_second(),
            Terminal { json },
            &db,
            update_tx,
        );
        let outcome = driver.run(&mut inputs).await;
        let renderer = printer.await?;

        match outcome.exit {
            Exit::Finished => {
                let summary = outcome.session.summary();
                retry_failed_save(&db, &summary, outcome.save, &mut inputs, |u| {
                    renderer.render(u)
                })
                .await;
            }
            Exit::Abandoned => println!("Session abandoned. Nothing was saved."),
            Exit::Detached => {
                debug!(phase = ?outcome.session.phase().kind(), "input closed");
                if !outcome.session.is_completed() {
                    println!("Session ended before completion. Nothing was saved.");
                }
            }
        }
        Ok(())
    })
}

/// Offer to retry a failed save until it goes through, the user quits or
/// input ends. Returns the last save status.
async fn retry_failed_save<P: ProfileStore>(
    store: &P,
    summary: &SessionSummary,
    mut status: Option<SaveStatus>,
    inputs: &mut mpsc::Receiver<Input>,
    render: impl Fn(&Update),
) -> Option<SaveStatus> {
    while let Some(SaveStatus::Failed { reason }) = &status {
        eprintln!("Results not saved: {reason}. Type 'done' to retry or 'quit' to leave.");
        match inputs.recv().await {
            Some(Input::Command(Command::Complete)) => {
                let retry = save_results(store, summary).await;
                render(&Update::Saved(retry.clone()));
                status = Some(retry);
            }
            Some(Input::Exit) => {
                println!("Leaving. Nothing was saved.");
                break;
            }
            Some(_) => {}
            None => break,
        }
    }
    status
}

/// Forward parsed stdin lines until EOF or until nobody listens.
fn spawn_input_reader(tx: mpsc::Sender<Input>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Input>() {
                Ok(input) => {
                    if tx.blocking_send(input).is_err() {
                        break;
                    }
                }
                Err(e) => eprintln!("! {e}"),
            }
        }
    });
}

struct Terminal {
    json: bool,
}

impl Navigator for Terminal {
    fn navigate(&mut self, route: Route) {
        debug!(?route, "navigate");
        if self.json {
            return;
        }
        match route {
            Route::Session { .. } => {}
            Route::Home => println!("Back to home."),
            Route::Training => println!("Back to training."),
        }
    }
}

struct Renderer {
    program: Program,
    kind: SessionKind,
    json: bool,
}

impl Renderer {
    fn render(&self, update: &Update) {
        if self.json {
            self.render_json(update);
        } else {
            self.render_text(update);
        }
    }

    fn render_json(&self, update: &Update) {
        let line = match update {
            Update::Event(event) => serde_json::to_string(event),
            Update::Rejected(e) => serde_json::to_string(&serde_json::json!({
                "type": "Rejected",
                "message": e.to_string(),
            })),
            Update::Saved(status) => serde_json::to_string(status),
        };
        match line {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("! {e}"),
        }
    }

    fn render_text(&self, update: &Update) {
        match update {
            Update::Event(event) => self.render_event(event),
            Update::Rejected(e) => eprintln!("! {e}"),
            Update::Saved(SaveStatus::Saved { profile, .. }) => {
                println!("Saved. Rank {}, {} points.", profile.rank, profile.points)
            }
            Update::Saved(SaveStatus::ProfileOnly { reason, .. }) => {
                println!("Points saved, but the history entry was lost: {reason}")
            }
            Update::Saved(SaveStatus::Failed { .. }) => {}
        }
    }

    fn name(&self, index: usize) -> &str {
        self.program.get(index).map_or("?", |e| e.name.as_str())
    }

    fn render_event(&self, event: &Event) {
        match event {
            Event::PhaseChanged { to, timer_secs, .. } => self.render_phase(to, *timer_secs),
            Event::StateSnapshot {
                phase: Phase::WarmUp,
                remaining_secs,
                max_secs,
                ..
            } if remaining_secs == max_secs => {
                println!(
                    "{}: warm-up {} (type 'skip' to start now)",
                    self.program.name(),
                    format_clock(*remaining_secs)
                );
            }
            Event::StateSnapshot {
                remaining_secs,
                paused: false,
                ..
            } if *remaining_secs > 0 && (*remaining_secs <= 3 || remaining_secs % 30 == 0) => {
                println!("  {}", format_clock(*remaining_secs));
            }
            Event::StateSnapshot { .. } => {}
            Event::TimerPaused { remaining_secs, .. } => {
                println!("Paused at {}. Type 'resume' to continue.", format_clock(*remaining_secs))
            }
            Event::TimerResumed { .. } => println!("Resumed."),
            Event::SetCompleted {
                exercise_id,
                set,
                completion_pct,
                ..
            } => println!("Set {} of {exercise_id} done ({completion_pct}%).", set + 1),
            Event::RepsChanged { reps, .. } => println!("  reps: {reps}"),
            Event::VariantSelected { variant, .. } => println!("Variant: {variant}"),
            Event::FeedbackRecorded { .. } => {}
        }
    }

    fn render_phase(&self, phase: &Phase, timer_secs: Option<u32>) {
        let clock = timer_secs.map(format_clock).unwrap_or_default();
        match phase {
            Phase::WarmUp => println!("Warm-up {clock}"),
            Phase::ReadyPrompt { exercise } => {
                let def = self.program.get(*exercise);
                println!("Next: {}", self.name(*exercise));
                if let Some(def) = def.filter(|d| !d.description.is_empty()) {
                    println!("  {}", def.description);
                }
                match def.filter(|d| !d.variants.is_empty()) {
                    Some(d) => println!(
                        "  Choose with 'variant <{}>', then type 'ready'.",
                        d.variants.join("|")
                    ),
                    None => println!("  Type 'ready' to start."),
                }
            }
            Phase::Active { at } => match self.kind {
                SessionKind::Workout => {
                    let sets = self.program.get(at.exercise).map_or(0, |e| e.sets);
                    let reps = self.program.get(at.exercise).map_or(0, |e| e.reps);
                    println!(
                        "Set {}/{sets}: {} x {reps}. Type 'done' when finished.",
                        at.set + 1,
                        self.name(at.exercise)
                    );
                }
                SessionKind::Evaluation => println!(
                    "{}: go! {clock}. '+'/'-' to count, 'done' to finish early.",
                    self.name(at.exercise)
                ),
            },
            Phase::Resting { upcoming, .. } => {
                let next = match upcoming {
                    Upcoming::Next(c) => format!("next: {}", self.name(c.exercise)),
                    Upcoming::Finish => "last one".to_string(),
                };
                println!("Rest {clock} ({next}). Type 'skip' to move on.");
                if self.kind == SessionKind::Evaluation {
                    println!("  Correct the count with 'reps <n>'.");
                }
            }
            Phase::Completed { score } => {
                println!(
                    "Completed! {} reps, {}%, {} points. {}",
                    score.total_reps, score.completion_pct, score.points, score.badge.label
                );
                if let Some(rank) = score.rank {
                    println!("Rank: {rank}");
                }
                println!("How did it feel? 'feedback <tired|motivated|too-easy|too-hard>' or 'feedback none'.");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solofit_core::{Exercise, FeedbackTag, MemoryStore, Profile, TimerSettings};

    fn finished_summary() -> SessionSummary {
        let program =
            Program::new("One", vec![Exercise::new("crunches", "Crunches", 1, 10)]).unwrap();
        let mut session = WorkoutSession::new(program, TimerSettings::default());
        for command in [
            Command::Skip,
            Command::Complete,
            Command::Skip,
            Command::Feedback(Some(FeedbackTag::Tired)),
        ] {
            session.apply(command).unwrap();
        }
        session.summary()
    }

    fn failed() -> Option<SaveStatus> {
        Some(SaveStatus::Failed {
            reason: "database is locked".into(),
        })
    }

    #[tokio::test]
    async fn quit_leaves_without_retrying() {
        let store = MemoryStore::with_profile(Profile::new("user-1"));
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(Input::Exit).await.unwrap();
        tx.send(Input::Command(Command::Complete)).await.unwrap();

        let status =
            retry_failed_save(&store, &finished_summary(), failed(), &mut rx, |_| {}).await;

        assert!(status.unwrap().can_retry());
        assert!(store.records().is_empty());
        assert_eq!(store.profile().unwrap().points, 0);
    }

    #[tokio::test]
    async fn done_retries_until_saved() {
        let store = MemoryStore::with_profile(Profile::new("user-1"));
        store.fail_next(1);
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(Input::Command(Command::Increment)).await.unwrap();
        tx.send(Input::Command(Command::Complete)).await.unwrap();
        tx.send(Input::Command(Command::Complete)).await.unwrap();
        drop(tx);

        let status =
            retry_failed_save(&store, &finished_summary(), failed(), &mut rx, |_| {}).await;

        assert!(status.unwrap().is_saved());
        assert_eq!(store.records().len(), 1);
    }

    #[tokio::test]
    async fn closed_input_stops_asking() {
        let store = MemoryStore::with_profile(Profile::new("user-1"));
        let (tx, mut rx) = mpsc::channel::<Input>(1);
        drop(tx);

        let status =
            retry_failed_save(&store, &finished_summary(), failed(), &mut rx, |_| {}).await;
        assert!(status.unwrap().can_retry());
    }
}
