use std::sync::Arc;
use std::time::Duration;

use policylens::rag::Endpoint;
use policylens::session::{OVERVIEW_ERROR, OverviewPhase};
use policylens::test_utils::test_helpers::*;
use policylens::viewer::ViewerCapability;
use policylens::App;
use policylens::event_source::KeyCode;
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn test_upload_requests_overview_and_shows_answer() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "policy.pdf");
    let backend = Arc::new(
        ScriptedBackend::new().answer(Endpoint::Overview, "This is a Summary of Benefits..."),
    );
    let (mut app, mut terminal) = app_with_backend(backend.clone());

    app.open_document(&pdf);
    assert!(app.overview().is_loading());
    assert_eq!(app.overview().file_name(), Some("policy.pdf"));

    terminal.draw(|f| app.draw(f)).unwrap();
    assert!(capture_terminal_state(&terminal).contains("Generating overview for policy.pdf"));

    assert!(wait_until(&mut app, WAIT, |app| !app.overview().is_loading()));
    assert_eq!(
        app.overview().text(),
        Some("This is a Summary of Benefits...")
    );

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, Endpoint::Overview);
    assert_eq!(requests[0].1.file_name.as_deref(), Some("policy.pdf"));
    assert!(requests[0].1.question.contains("policy.pdf"));

    terminal.draw(|f| app.draw(f)).unwrap();
    assert!(capture_terminal_state(&terminal).contains("This is a Summary of Benefits..."));
}

#[test]
fn test_server_error_shows_fixed_message() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "policy.pdf");
    let backend = Arc::new(ScriptedBackend::new().status(Endpoint::Overview, 500));
    let (mut app, _terminal) = app_with_backend(backend);

    app.open_document(&pdf);
    assert!(wait_until(&mut app, WAIT, |app| !app.overview().is_loading()));

    assert_eq!(app.overview().error(), Some(OVERVIEW_ERROR));
    assert_eq!(app.overview().text(), None);

    // wide enough for the message to sit on one line of the side panel
    let mut terminal = create_test_terminal(200, 30);
    terminal.draw(|f| app.draw(f)).unwrap();
    let screen = capture_terminal_state(&terminal);
    assert!(screen.contains(OVERVIEW_ERROR), "{screen}");
    assert!(!screen.contains("Generating overview"));
}

#[test]
fn test_reupload_keeps_latest_file() {
    let dir = TempDir::new().unwrap();
    let first = write_pdf(dir.path(), "first.pdf");
    let second = write_pdf(dir.path(), "second.pdf");
    let (backend, release_first) = ScriptedBackend::new()
        .echo_file_name(Endpoint::Overview)
        .hold_file("first.pdf");
    let backend = Arc::new(backend);
    let (mut app, mut terminal) = app_with_backend(backend.clone());

    app.open_document(&first);
    app.open_document(&second);
    assert_eq!(app.overview().file_name(), Some("second.pdf"));

    assert!(wait_until(&mut app, WAIT, |app| {
        app.overview().text() == Some("Overview of second.pdf")
    }));
    assert_eq!(backend.answered(), 1);

    // the reply for the replaced file arrives last
    release_first.send(()).unwrap();
    assert!(wait_until(&mut app, WAIT, |_| backend.answered() == 2));
    std::thread::sleep(Duration::from_millis(50));
    app.poll_backend();

    assert_eq!(app.overview().file_name(), Some("second.pdf"));
    assert_eq!(
        app.overview().phase(),
        &OverviewPhase::Ready("Overview of second.pdf".to_string())
    );
    terminal.draw(|f| app.draw(f)).unwrap();
    let screen = capture_terminal_state(&terminal);
    assert!(screen.contains("Overview of second.pdf"));
    assert!(!screen.contains("Overview of first.pdf"));
}

#[test]
fn test_side_panel_scroll_stops_at_last_line() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "policy.pdf");
    let answer = (1..=60)
        .map(|i| format!("Line {i}"))
        .collect::<Vec<_>>()
        .join("\n\n");
    let backend = Arc::new(ScriptedBackend::new().answer(Endpoint::Overview, &answer));
    let (mut app, mut terminal) = app_with_backend(backend);

    app.open_document(&pdf);
    assert!(wait_until(&mut app, WAIT, |app| app.overview().text().is_some()));

    for _ in 0..200 {
        app.handle_event(&key(KeyCode::Char('J')));
    }
    terminal.draw(|f| app.draw(f)).unwrap();
    let limit = app.side_scroll();
    assert!(limit > 0 && limit < 200, "scroll {limit}");
    assert!(capture_terminal_state(&terminal).contains("Line 60"));

    app.handle_event(&key(KeyCode::Char('J')));
    terminal.draw(|f| app.draw(f)).unwrap();
    assert_eq!(app.side_scroll(), limit);

    app.handle_event(&key(KeyCode::Char('K')));
    terminal.draw(|f| app.draw(f)).unwrap();
    assert_eq!(app.side_scroll(), limit - 1);
}

#[test]
fn test_short_overview_does_not_scroll() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "policy.pdf");
    let backend = Arc::new(ScriptedBackend::new().answer(Endpoint::Overview, "Short answer"));
    let (mut app, mut terminal) = app_with_backend(backend);

    app.open_document(&pdf);
    assert!(wait_until(&mut app, WAIT, |app| app.overview().text().is_some()));
    for _ in 0..5 {
        app.handle_event(&key(KeyCode::Char('J')));
    }
    terminal.draw(|f| app.draw(f)).unwrap();

    assert_eq!(app.side_scroll(), 0);
    assert!(capture_terminal_state(&terminal).contains("Short answer"));
}

#[test]
fn test_non_pdf_is_rejected_without_request() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "not a policy").unwrap();
    let backend = Arc::new(ScriptedBackend::new().answer(Endpoint::Overview, "unused"));
    let (mut app, _terminal) = app_with_backend(backend.clone());

    app.open_document(&notes);

    assert_eq!(app.overview().phase(), &OverviewPhase::NoDocument);
    assert_eq!(app.notifications.count(), 1);
    assert!(app.viewer().unwrap().file_name().is_none());
    std::thread::sleep(Duration::from_millis(50));
    assert!(backend.requests().is_empty());
}

#[test]
fn test_file_opened_before_viewer_ready_is_loaded_once_resolved() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "policy.pdf");
    let backend = Arc::new(ScriptedBackend::new().answer(Endpoint::Overview, "ok"));
    let mut app = App::new(backend);

    app.open_document(&pdf);
    assert!(app.viewer_pending());
    assert_eq!(app.overview().phase(), &OverviewPhase::NoDocument);

    app.resolve_viewer(&ViewerCapability {
        pdf_engine: false,
        screen: None,
    });

    assert!(!app.viewer_pending());
    assert_eq!(app.overview().file_name(), Some("policy.pdf"));
    // no engine: the file counts as loaded but has no readable pages
    assert_eq!(app.viewer().unwrap().page_count(), None);
    assert!(wait_until(&mut app, WAIT, |app| app.overview().text() == Some("ok")));
}
