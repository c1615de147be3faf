use std::time::Duration;

use screener_engine::{
    BackendSettings, EngineEvent, EngineHandle, EngineSettings, JobFetchOutcome,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> EngineSettings {
    EngineSettings {
        backend: BackendSettings {
            base_url: server.uri(),
            // Nothing listens here; the push channel keeps re-dialing in the
            // background while polling drives the loop.
            ws_url: "ws://127.0.0.1:9/ws".to_string(),
            connect_timeout: Duration::from_millis(500),
            request_timeout: Duration::from_secs(2),
        },
        poll_interval: Duration::from_millis(50),
    }
}

async fn next_event(engine: &EngineHandle) -> Option<EngineEvent> {
    for _ in 0..400 {
        if let Some(event) = engine.try_recv() {
            return Some(event);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    None
}

async fn drain(engine: &EngineHandle, window: Duration) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    let deadline = tokio::time::Instant::now() + window;
    while tokio::time::Instant::now() < deadline {
        while let Some(event) = engine.try_recv() {
            events.push(event);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    events
}

#[tokio::test(flavor = "multi_thread")]
async fn polling_emits_snapshots_until_stopped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/7"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"resumes": [{"id": 1, "filename": "a.pdf"}]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let engine = EngineHandle::new(settings(&server));
    engine.start_sync("7");

    for _ in 0..2 {
        let event = next_event(&engine).await.expect("poll event");
        let EngineEvent::JobFetched { job_id, outcome } = event else {
            panic!("expected JobFetched, got {event:?}");
        };
        assert_eq!(job_id, "7");
        let JobFetchOutcome::Fetched(detail) = outcome else {
            panic!("expected a snapshot");
        };
        assert_eq!(detail.resumes.len(), 1);
        assert!(!detail.resumes[0].is_analyzed());
    }

    engine.stop_sync();
    // Let the teardown land and in-flight events drain, then the line must
    // stay quiet: a leaked timer would keep polling the stale job.
    drain(&engine, Duration::from_millis(300)).await;
    let late = drain(&engine, Duration::from_millis(250)).await;
    assert!(late.is_empty(), "events after teardown: {late:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn a_missing_job_ends_the_loop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let engine = EngineHandle::new(settings(&server));
    engine.start_sync("gone");

    let event = next_event(&engine).await.expect("poll event");
    assert!(matches!(
        event,
        EngineEvent::JobFetched {
            outcome: JobFetchOutcome::NotFound,
            ..
        }
    ));

    let late = drain(&engine, Duration::from_millis(300)).await;
    assert!(late.is_empty(), "loop kept polling after 404: {late:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn transient_failures_keep_the_loop_alive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/7"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let engine = EngineHandle::new(settings(&server));
    engine.start_sync("7");

    for _ in 0..3 {
        let event = next_event(&engine).await.expect("poll event");
        assert!(matches!(
            event,
            EngineEvent::JobFetched {
                outcome: JobFetchOutcome::Transport(_),
                ..
            }
        ));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn a_new_job_replaces_the_old_loop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"resumes": []}"#, "application/json"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"resumes": []}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let engine = EngineHandle::new(settings(&server));
    engine.start_sync("1");
    let event = next_event(&engine).await.expect("first job event");
    assert!(matches!(event, EngineEvent::JobFetched { ref job_id, .. } if job_id.as_str() == "1"));

    engine.start_sync("2");
    // Once the replacement settles in, only the new job id may appear.
    loop {
        let event = next_event(&engine).await.expect("second job event");
        let EngineEvent::JobFetched { job_id, .. } = event else {
            continue;
        };
        if job_id == "2" {
            break;
        }
    }
    let tail = drain(&engine, Duration::from_millis(300)).await;
    for event in &tail {
        assert!(
            matches!(event, EngineEvent::JobFetched { job_id, .. } if job_id.as_str() == "2"),
            "stale event from the replaced job: {event:?}"
        );
    }
}
