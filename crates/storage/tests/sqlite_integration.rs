use std::sync::Arc;

use exam_core::model::{ExamSession, SessionClock, default_question_set, grade};
use exam_core::time::fixed_now;
use storage::{KeyValueStore, SessionStore, SqliteStore, Stores, keys};

#[tokio::test]
async fn session_keys_round_trip_through_sqlite() {
    let stores = Stores::sqlite("sqlite:file:memdb_session_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let store = &stores.session;

    let questions = default_question_set();
    store.save_questions(&questions).await.expect("save questions");

    let mut session = ExamSession::new(questions.clone()).expect("build session");
    session.set_answer(0, 2).expect("answer");
    session.toggle_mark(5).expect("mark");
    store
        .save_state_snapshot(&session.snapshot())
        .await
        .expect("save snapshot");
    store.save_current_index(5).await.expect("save index");

    let clock = SessionClock::start(fixed_now(), 30 * 60).expect("start clock");
    store.save_clock(&clock).await.expect("save clock");
    store.set_started().await.expect("set started");

    // read everything back as a fresh page load would
    assert_eq!(store.questions().await.expect("questions").unwrap(), questions);
    let snapshot = store
        .state_snapshot()
        .await
        .expect("snapshot")
        .expect("snapshot present");
    assert_eq!(snapshot.len(), 15);
    assert_eq!(snapshot[0].answer, Some(2));
    assert!(snapshot[5].marked);
    assert_eq!(store.current_index().await.expect("index"), Some(5));
    assert_eq!(store.clock().await.expect("clock"), Some(clock));
    assert!(store.started().await.expect("started"));
    assert!(!store.finished().await.expect("finished"));
}

#[tokio::test]
async fn grade_report_round_trips_and_clear_drops_session_only() {
    let stores = Stores::sqlite("sqlite:file:memdb_report_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");

    stores
        .credentials
        .save_identity(&storage::Identity {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "longenough".into(),
        })
        .await
        .expect("save identity");

    let questions = default_question_set();
    let mut session = ExamSession::new(questions.clone()).expect("build session");
    session.set_answer(0, 2).expect("answer");

    let result = grade(session.questions(), session.states());
    let report = exam_core::model::GradeReport::new(
        result,
        120,
        Some("Ada".into()),
        None,
        fixed_now().timestamp() + 120,
    );
    stores.session.save_report(&report).await.expect("save report");

    let loaded = stores
        .session
        .report()
        .await
        .expect("load report")
        .expect("report present");
    assert_eq!(loaded, report);

    stores.session.clear().await.expect("clear session");
    assert!(stores.session.report().await.expect("report").is_none());
    assert!(
        stores
            .credentials
            .identity()
            .await
            .expect("identity")
            .is_some()
    );
}

#[tokio::test]
async fn corrupted_values_degrade_to_defaults() {
    let pool = SqliteStore::connect("sqlite:file:memdb_corrupt_values?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    SqliteStore::migrate(&pool).await.expect("migrate");
    let raw = SqliteStore::session(pool);

    // write garbage under the real keys, then read through the typed facade
    raw.put(keys::QUESTIONS, "{not json").await.expect("put");
    raw.put(keys::END_TIME, "not-a-number").await.expect("put");
    raw.put(keys::CURRENT_INDEX, "-4").await.expect("put");

    let store = SessionStore::new(Arc::new(raw));
    assert!(store.questions().await.expect("questions").is_none());
    assert!(store.clock().await.expect("clock").is_none());
    assert_eq!(store.current_index().await.expect("index"), None);
    assert_eq!(store.submit_time().await.expect("submit"), None);
}
