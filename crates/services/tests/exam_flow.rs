//! End-to-end exam flow over in-memory stores: register, sit the exam,
//! survive a process restart, submit, and read the result back.

use chrono::Duration;
use exam_core::Clock;
use exam_core::model::SessionCommand;
use exam_core::time::{fixed_clock, fixed_now};
use services::{
    AccountService, ExamConfig, ExamFlowError, ExamFlowService, LoginDestination, ResultView,
    SessionClockService,
};
use storage::Stores;

fn flow_at(stores: &Stores, clock: Clock) -> ExamFlowService {
    ExamFlowService::new(clock, stores.session.clone(), ExamConfig::default())
}

#[tokio::test]
async fn full_attempt_from_login_to_result() {
    let stores = Stores::in_memory();
    let accounts = AccountService::new(stores.session.clone(), stores.credentials.clone());
    accounts
        .register("Ada", "ada@example.com", "longenough", "longenough")
        .await
        .unwrap();
    let outcome = accounts.login("ada@example.com", "longenough").await.unwrap();
    assert_eq!(outcome.destination, LoginDestination::Exam);

    let flow = flow_at(&stores, fixed_clock());
    let mut attempt = flow.start_or_resume().await.unwrap();
    assert_eq!(attempt.session.total(), 15);

    // answer the first three questions with their keys (3, 3, 4 -> 0-based)
    for (index, choice) in [(0, 2), (1, 2), (2, 3)] {
        attempt.session.go_to(index);
        attempt
            .session
            .apply(SessionCommand::SelectChoice(choice))
            .unwrap();
    }
    flow.autosave(&attempt.session).await.unwrap();

    let submit = flow_at(
        &stores,
        Clock::fixed(fixed_now() + Duration::seconds(300)),
    );
    let report = submit.finalize(&mut attempt).await.unwrap();
    assert_eq!(report.result.correct, 3);
    assert_eq!(report.result.incorrect, 12);
    assert_eq!(report.result.percent, 20);
    assert_eq!(report.time_taken_seconds, 300);
    assert_eq!(report.student_name.as_deref(), Some("Ada"));

    // the result page projects the stored report
    let stored = submit.report().await.unwrap().unwrap();
    let view = ResultView::from_report(&stored);
    assert_eq!(view.percent, 20);
    assert_eq!(view.label, "Keep Practicing");
    assert_eq!(view.time_taken, "5m 00s");

    // a later login now routes to the result page
    let outcome = accounts.login("ada@example.com", "longenough").await.unwrap();
    assert_eq!(outcome.destination, LoginDestination::Result);
}

#[tokio::test]
async fn restart_mid_attempt_keeps_answers_and_deadline() {
    let stores = Stores::in_memory();
    let flow = flow_at(&stores, fixed_clock());
    let mut attempt = flow.start_or_resume().await.unwrap();

    attempt.session.apply(SessionCommand::SelectChoice(0)).unwrap();
    attempt.session.apply(SessionCommand::JumpTo(9)).unwrap();
    attempt.session.apply(SessionCommand::ToggleMark).unwrap();
    flow.autosave(&attempt.session).await.unwrap();
    drop(attempt);

    // the process dies; five minutes later a new one comes up on the same
    // store and the countdown has kept running
    let later_clock = Clock::fixed(fixed_now() + Duration::seconds(300));
    let later = flow_at(&stores, later_clock);
    let resumed = later.start_or_resume().await.unwrap();

    assert_eq!(resumed.session.current_index(), 9);
    assert_eq!(resumed.session.states()[0].answer, Some(0));
    assert!(resumed.session.states()[9].marked);

    let tick = SessionClockService::new(later_clock, stores.session.clone()).tick(&resumed.clock);
    assert_eq!(tick.remaining_secs, 1800 - 300);
    assert!(!tick.expired);
}

#[tokio::test]
async fn expiry_and_submit_race_finalizes_once() {
    let stores = Stores::in_memory();
    let flow = flow_at(&stores, fixed_clock());
    let mut attempt = flow.start_or_resume().await.unwrap();
    attempt.session.apply(SessionCommand::SelectChoice(2)).unwrap();

    let at_deadline = flow_at(
        &stores,
        Clock::fixed(fixed_now() + Duration::seconds(1800)),
    );
    let first = at_deadline.finalize(&mut attempt).await.unwrap();

    // the "manual submit" arriving a beat later gets the same report back
    let late_submit = flow_at(
        &stores,
        Clock::fixed(fixed_now() + Duration::seconds(1802)),
    );
    let second = late_submit.finalize(&mut attempt).await.unwrap();
    assert_eq!(second, first);
    assert_eq!(second.time_taken_seconds, 1800);

    // answers are frozen after finalize
    assert!(attempt.session.apply(SessionCommand::SelectChoice(1)).is_err());
}

#[tokio::test]
async fn finished_session_refuses_to_reopen_until_reset() {
    let stores = Stores::in_memory();
    let flow = flow_at(&stores, fixed_clock());
    let mut attempt = flow.start_or_resume().await.unwrap();
    flow.finalize(&mut attempt).await.unwrap();

    let err = flow.start_or_resume().await.unwrap_err();
    assert!(matches!(err, ExamFlowError::AlreadySubmitted));

    flow.reset().await.unwrap();
    let fresh = flow.start_or_resume().await.unwrap();
    assert_eq!(fresh.session.unanswered_count(), 15);
    assert_eq!(fresh.clock.deadline(), fixed_now().timestamp() + 1800);
}
