//! End-to-end session runs through the async driver, with manual ticks.

use solofit_core::session::RepSource;
use solofit_core::{
    Command, EvaluationSession, Event, Exercise, Exit, FeedbackTag, Input, ManualTicks,
    MemoryStore, PhaseKind, Profile, Program, Rank, Route, RouteLog, SaveStatus, Session,
    SessionDriver, SessionError, SessionKind, TimerSettings, Update, WorkoutSession,
};
use tokio::sync::mpsc;

fn timers() -> TimerSettings {
    TimerSettings {
        warmup_secs: 2,
        rest_secs: 3,
        exercise_secs: 5,
    }
}

fn two_sets() -> Program {
    Program::new("Quick", vec![Exercise::new("pushups", "Push-ups", 2, 10)]).unwrap()
}

async fn wait_for(
    updates: &mut mpsc::UnboundedReceiver<Update>,
    pred: impl Fn(&Update) -> bool,
) -> Update {
    loop {
        let update = updates
            .recv()
            .await
            .expect("driver stopped before the expected update");
        if pred(&update) {
            return update;
        }
    }
}

fn entered(kind: PhaseKind) -> impl Fn(&Update) -> bool {
    move |u| matches!(u, Update::Event(Event::PhaseChanged { to, .. }) if to.kind() == kind)
}

fn saved(u: &Update) -> bool {
    matches!(u, Update::Saved(_))
}

#[tokio::test]
async fn workout_runs_to_completion_and_saves() {
    let store = MemoryStore::with_profile(Profile::new("user-1"));
    let mut routes = RouteLog::default();
    let (ticks, handle) = ManualTicks::new();
    let (input_tx, mut input_rx) = mpsc::channel(8);
    let (update_tx, mut updates) = mpsc::unbounded_channel();

    let session = WorkoutSession::new(two_sets(), timers());
    let driver = SessionDriver::new(session, ticks, &mut routes, &store, update_tx);

    let script = async {
        handle.tick_n(2);
        wait_for(&mut updates, entered(PhaseKind::Active)).await;
        input_tx.send(Input::Command(Command::Complete)).await.unwrap();
        wait_for(&mut updates, entered(PhaseKind::Resting)).await;
        handle.tick_n(3);
        wait_for(&mut updates, entered(PhaseKind::Active)).await;
        input_tx.send(Input::Command(Command::Complete)).await.unwrap();
        wait_for(&mut updates, entered(PhaseKind::Resting)).await;
        handle.tick_n(3);
        wait_for(&mut updates, entered(PhaseKind::Completed)).await;
        input_tx
            .send(Input::Command(Command::Feedback(Some(FeedbackTag::Motivated))))
            .await
            .unwrap();
        wait_for(&mut updates, saved).await
    };

    let (outcome, last) = tokio::join!(driver.run(&mut input_rx), script);

    assert_eq!(outcome.exit, Exit::Finished);
    assert!(matches!(last, Update::Saved(SaveStatus::Saved { .. })));
    assert!(outcome.session.is_completed());
    assert_eq!(outcome.session.completion_pct(), 100);
    // WarmUp, Active, Resting, Active, Resting, Completed
    assert_eq!(outcome.session.transitions(), 5);

    let profile = store.profile().unwrap();
    assert_eq!(profile.points, 15);
    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].feedback, Some(FeedbackTag::Motivated));
    assert_eq!(records[0].exercises[0].completed_sets, 2);

    assert_eq!(
        routes.routes,
        [
            Route::Session {
                kind: SessionKind::Workout
            },
            Route::Training
        ]
    );
}

#[tokio::test]
async fn evaluation_with_variant_and_manual_reps() {
    let store = MemoryStore::with_profile(Profile::new("user-1"));
    let mut routes = RouteLog::default();
    let (ticks, handle) = ManualTicks::new();
    let (input_tx, mut input_rx) = mpsc::channel(8);
    let (update_tx, mut updates) = mpsc::unbounded_channel();

    let program = Program::new(
        "Eval",
        vec![Exercise::new("pushups", "Push-ups", 1, 0).with_variants(["regular", "knee"])],
    )
    .unwrap();
    let session = EvaluationSession::new(program, timers());
    let driver = SessionDriver::new(session, ticks, &mut routes, &store, update_tx);

    let script = async {
        handle.tick_n(2);
        wait_for(&mut updates, entered(PhaseKind::ReadyPrompt)).await;

        input_tx.send(Input::Command(Command::ConfirmReady)).await.unwrap();
        let rejected = wait_for(&mut updates, |u| matches!(u, Update::Rejected(_))).await;
        assert!(matches!(
            rejected,
            Update::Rejected(SessionError::VariantRequired { .. })
        ));

        input_tx.send(Input::Command(Command::SelectVariant("Knee".into()))).await.unwrap();
        input_tx.send(Input::Command(Command::ConfirmReady)).await.unwrap();
        wait_for(&mut updates, entered(PhaseKind::Active)).await;

        for _ in 0..3 {
            input_tx.send(Input::Command(Command::Increment)).await.unwrap();
        }
        input_tx.send(Input::Command(Command::Complete)).await.unwrap();
        wait_for(&mut updates, entered(PhaseKind::Resting)).await;

        input_tx.send(Input::Command(Command::EnterReps("12".into()))).await.unwrap();
        wait_for(&mut updates, |u| {
            matches!(u, Update::Event(Event::RepsChanged { source: RepSource::Manual, .. }))
        })
        .await;

        handle.tick_n(3);
        wait_for(&mut updates, entered(PhaseKind::Completed)).await;
        input_tx.send(Input::Command(Command::Feedback(None))).await.unwrap();
        wait_for(&mut updates, saved).await;
    };

    let (outcome, ()) = tokio::join!(driver.run(&mut input_rx), script);

    assert_eq!(outcome.exit, Exit::Finished);
    assert_eq!(outcome.session.reps(0), Some(12));
    assert_eq!(outcome.session.variant(0), Some("knee"));

    let profile = store.profile().unwrap();
    assert_eq!(profile.rank, Rank::E);
    assert_eq!(profile.points, 1);
    let record = &store.records()[0];
    assert_eq!(record.kind, SessionKind::Evaluation);
    assert_eq!(record.exercises[0].reps_done, 12);
    assert_eq!(record.exercises[0].rep_source, Some(RepSource::Manual));
    assert_eq!(record.exercises[0].variant.as_deref(), Some("knee"));

    assert_eq!(routes.routes.last(), Some(&Route::Home));
}

#[tokio::test]
async fn tick_queued_before_complete_does_not_reach_the_rest_countdown() {
    let store = MemoryStore::with_profile(Profile::new("user-1"));
    let (ticks, handle) = ManualTicks::new();
    let (input_tx, mut input_rx) = mpsc::channel(8);
    let (update_tx, mut updates) = mpsc::unbounded_channel();

    let program = Program::new("Eval", vec![Exercise::new("squats", "Squats", 1, 0)]).unwrap();
    let session = EvaluationSession::new(program, timers());
    let driver = SessionDriver::new(session, ticks, RouteLog::default(), &store, update_tx);

    let script = async {
        input_tx.send(Input::Command(Command::Skip)).await.unwrap();
        wait_for(&mut updates, entered(PhaseKind::ReadyPrompt)).await;
        input_tx.send(Input::Command(Command::ConfirmReady)).await.unwrap();
        wait_for(&mut updates, entered(PhaseKind::Active)).await;

        // Both arrive before the driver wakes up.
        handle.tick();
        input_tx.send(Input::Command(Command::Complete)).await.unwrap();
        wait_for(&mut updates, entered(PhaseKind::Resting)).await;
        input_tx.send(Input::Exit).await.unwrap();
    };

    let (outcome, ()) = tokio::join!(driver.run(&mut input_rx), script);

    assert_eq!(outcome.exit, Exit::Abandoned);
    assert_eq!(outcome.session.phase().kind(), PhaseKind::Resting);
    assert_eq!(outcome.session.countdown().remaining_secs(), 3);
    assert!(outcome.save.is_none());
}

#[tokio::test]
async fn tick_due_at_the_ready_prompt_does_not_reach_the_exercise_countdown() {
    let store = MemoryStore::with_profile(Profile::new("user-1"));
    let (ticks, handle) = ManualTicks::new();
    let (input_tx, mut input_rx) = mpsc::channel(8);
    let (update_tx, mut updates) = mpsc::unbounded_channel();

    let program = Program::new("Eval", vec![Exercise::new("squats", "Squats", 1, 0)]).unwrap();
    let session = EvaluationSession::new(program, timers());
    let driver = SessionDriver::new(session, ticks, RouteLog::default(), &store, update_tx);

    let script = async {
        input_tx.send(Input::Command(Command::Skip)).await.unwrap();
        wait_for(&mut updates, entered(PhaseKind::ReadyPrompt)).await;

        // Falls due while no countdown is armed.
        handle.tick();
        input_tx.send(Input::Command(Command::ConfirmReady)).await.unwrap();
        wait_for(&mut updates, entered(PhaseKind::Active)).await;
        input_tx.send(Input::Exit).await.unwrap();
    };

    let (outcome, ()) = tokio::join!(driver.run(&mut input_rx), script);

    assert_eq!(outcome.exit, Exit::Abandoned);
    assert_eq!(outcome.session.phase().kind(), PhaseKind::Active);
    assert_eq!(outcome.session.countdown().remaining_secs(), 5);
}

#[tokio::test]
async fn abandoning_navigates_back_without_saving() {
    let store = MemoryStore::with_profile(Profile::new("user-1"));
    let mut routes = RouteLog::default();
    let (ticks, _handle) = ManualTicks::new();
    let (input_tx, mut input_rx) = mpsc::channel(8);
    let (update_tx, _updates) = mpsc::unbounded_channel();

    let session = WorkoutSession::new(two_sets(), timers());
    let driver = SessionDriver::new(session, ticks, &mut routes, &store, update_tx);

    input_tx.send(Input::Command(Command::Skip)).await.unwrap();
    input_tx.send(Input::Exit).await.unwrap();
    let outcome = driver.run(&mut input_rx).await;

    assert_eq!(outcome.exit, Exit::Abandoned);
    assert_eq!(outcome.session.phase().kind(), PhaseKind::Active);
    assert!(store.records().is_empty());
    assert_eq!(routes.routes.last(), Some(&Route::Training));
}

#[tokio::test]
async fn closing_the_input_detaches() {
    let store = MemoryStore::new();
    let (ticks, _handle) = ManualTicks::new();
    let (input_tx, mut input_rx) = mpsc::channel::<Input>(1);
    let (update_tx, _updates) = mpsc::unbounded_channel();

    let session = WorkoutSession::new(two_sets(), timers());
    let driver = SessionDriver::new(session, ticks, RouteLog::default(), &store, update_tx);
    drop(input_tx);

    let outcome = driver.run(&mut input_rx).await;
    assert_eq!(outcome.exit, Exit::Detached);
    assert_eq!(outcome.session.phase().kind(), PhaseKind::WarmUp);
}

#[tokio::test]
async fn failed_save_keeps_the_score_and_can_be_retried() {
    let store = MemoryStore::with_profile(Profile::new("user-1"));
    store.fail_next(1);
    let (ticks, _handle) = ManualTicks::new();
    let (input_tx, mut input_rx) = mpsc::channel(8);
    let (update_tx, _updates) = mpsc::unbounded_channel();

    let program = Program::new("One", vec![Exercise::new("crunches", "Crunches", 1, 10)]).unwrap();
    let session = WorkoutSession::new(program, timers());
    let driver = SessionDriver::new(session, ticks, RouteLog::default(), &store, update_tx);

    for command in [
        Command::Skip,
        Command::Complete,
        Command::Skip,
        Command::Feedback(Some(FeedbackTag::TooEasy)),
    ] {
        input_tx.send(Input::Command(command)).await.unwrap();
    }
    let outcome = driver.run(&mut input_rx).await;

    assert_eq!(outcome.exit, Exit::Finished);
    let status = outcome.save.unwrap();
    assert!(status.can_retry());
    assert!(outcome.session.is_completed());
    assert!(store.records().is_empty());

    let retry = solofit_core::save_results(&store, &outcome.session.summary()).await;
    assert!(retry.is_saved());
    assert_eq!(store.records().len(), 1);
}
