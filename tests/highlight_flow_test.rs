use std::sync::Arc;
use std::time::Duration;

use policylens::event_source::KeyCode;
use policylens::rag::Endpoint;
use policylens::session::{HIGHLIGHT_APOLOGY, HighlightPhase, Role};
use policylens::test_utils::test_helpers::*;
use policylens::{App, FocusedPanel};
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

// Row 3 of the fake policy sits at screen row 4 inside the viewer border.
const COINSURANCE_START: (u16, u16) = (1, 4);
const COINSURANCE_END: (u16, u16) = (33, 4);

fn feed(app: &mut App, scenario: TestScenarioBuilder) {
    for event in scenario.events() {
        app.handle_event(event);
    }
}

fn open_policy(app: &mut App, dir: &TempDir) {
    let pdf = write_pdf(dir.path(), "policy.pdf");
    app.open_document(&pdf);
}

#[test]
fn test_selection_asks_about_passage() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(
        ScriptedBackend::new()
            .answer(Endpoint::Overview, "Overview")
            .answer(Endpoint::Highlight, "You pay **20%** of the cost."),
    );
    let (mut app, mut terminal) = app_with_backend(backend.clone());
    open_policy(&mut app, &dir);

    feed(
        &mut app,
        TestScenarioBuilder::new().drag_select(COINSURANCE_START, COINSURANCE_END),
    );

    assert_eq!(
        app.highlight().selected(),
        Some("Coinsurance: 20% after deductible")
    );
    assert_eq!(app.highlight().phase(), HighlightPhase::AwaitingAnswer);

    assert!(wait_until(&mut app, WAIT, |app| app.highlight().messages().len() == 1));
    let reply = &app.highlight().messages()[0];
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.content, "You pay **20%** of the cost.");

    let highlight_request = backend
        .requests()
        .into_iter()
        .find(|(endpoint, _)| *endpoint == Endpoint::Highlight)
        .unwrap();
    assert!(
        highlight_request
            .1
            .question
            .contains("Coinsurance: 20% after deductible")
    );

    terminal.draw(|f| app.draw(f)).unwrap();
    let screen = capture_terminal_state(&terminal);
    assert!(screen.contains("Selected text:"));
    assert!(screen.contains("│ Coinsurance: 20% after deductible"));
    assert!(screen.contains("You pay 20% of the cost."));
}

#[test]
fn test_follow_up_question_is_shown_before_reply() {
    let dir = TempDir::new().unwrap();
    let (backend, gate) = ScriptedBackend::new()
        .answer(Endpoint::Overview, "Overview")
        .answer(Endpoint::Highlight, "Answer")
        .gated();
    let backend = Arc::new(backend);
    let (mut app, _terminal) = app_with_backend(backend.clone());
    open_policy(&mut app, &dir);
    feed(
        &mut app,
        TestScenarioBuilder::new().drag_select(COINSURANCE_START, COINSURANCE_END),
    );
    gate.send(()).unwrap();
    gate.send(()).unwrap();
    assert!(wait_until(&mut app, WAIT, |app| app.highlight().messages().len() == 1));

    feed(
        &mut app,
        TestScenarioBuilder::new()
            .press_char('i')
            .type_text("Does this apply to generics?")
            .press_enter(),
    );
    assert_eq!(app.focused_panel, FocusedPanel::FollowUp);

    // the backend is still held at the gate
    let messages = app.highlight().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[1].content, "Does this apply to generics?");
    assert!(app.highlight().is_waiting());

    gate.send(()).unwrap();
    assert!(wait_until(&mut app, WAIT, |app| app.highlight().messages().len() == 3));
    assert_eq!(app.highlight().messages()[2].role, Role::Assistant);
    assert_eq!(app.highlight().phase(), HighlightPhase::Conversing);

    let (_, follow_up) = backend.requests().pop().unwrap();
    assert!(follow_up.question.contains("Coinsurance: 20% after deductible"));
    assert!(follow_up.question.ends_with("Does this apply to generics?"));
}

#[test]
fn test_blank_follow_up_is_ignored() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(
        ScriptedBackend::new()
            .answer(Endpoint::Overview, "Overview")
            .answer(Endpoint::Highlight, "Answer"),
    );
    let (mut app, _terminal) = app_with_backend(backend.clone());
    open_policy(&mut app, &dir);
    feed(
        &mut app,
        TestScenarioBuilder::new().drag_select(COINSURANCE_START, COINSURANCE_END),
    );
    assert!(wait_until(&mut app, WAIT, |app| {
        app.highlight().messages().len() == 1 && app.overview().text().is_some()
    }));
    let sent = backend.requests().len();

    app.submit_follow_up("   ");

    assert_eq!(app.highlight().messages().len(), 1);
    assert!(!app.highlight().is_waiting());
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(backend.requests().len(), sent);
}

#[test]
fn test_failed_highlight_shows_apology() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(
        ScriptedBackend::new()
            .answer(Endpoint::Overview, "Overview")
            .status(Endpoint::Highlight, 502),
    );
    let (mut app, _terminal) = app_with_backend(backend);
    open_policy(&mut app, &dir);
    feed(
        &mut app,
        TestScenarioBuilder::new().drag_select(COINSURANCE_START, COINSURANCE_END),
    );

    assert!(wait_until(&mut app, WAIT, |app| app.highlight().messages().len() == 1));
    assert_eq!(app.highlight().messages()[0].content, HIGHLIGHT_APOLOGY);
}

#[test]
fn test_clicking_blank_space_returns_to_overview() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(
        ScriptedBackend::new()
            .answer(Endpoint::Overview, "Plan overview")
            .answer(Endpoint::Highlight, "Answer"),
    );
    let (mut app, mut terminal) = app_with_backend(backend);
    open_policy(&mut app, &dir);
    feed(
        &mut app,
        TestScenarioBuilder::new()
            .drag_select(COINSURANCE_START, COINSURANCE_END)
            .press_char('i'),
    );
    assert_eq!(app.focused_panel, FocusedPanel::FollowUp);
    feed(&mut app, TestScenarioBuilder::new().press_esc());
    assert_eq!(app.focused_panel, FocusedPanel::Viewer);

    // row 2 of the document is blank
    feed(&mut app, TestScenarioBuilder::new().click(5, 3));

    assert_eq!(app.highlight().selected(), None);
    assert!(app.highlight().messages().is_empty());
    assert!(app.viewer().unwrap().highlight().is_none());

    assert!(wait_until(&mut app, WAIT, |app| app.overview().text().is_some()));
    terminal.draw(|f| app.draw(f)).unwrap();
    let screen = capture_terminal_state(&terminal);
    assert!(!screen.contains("Selected text:"));
    assert!(screen.contains("Plan overview"));
}

#[test]
fn test_follow_up_needs_a_selection() {
    let backend = Arc::new(ScriptedBackend::new());
    let (mut app, _terminal) = app_with_backend(backend);

    app.handle_event(&key(KeyCode::Char('i')));

    assert_eq!(app.focused_panel, FocusedPanel::Viewer);
    app.submit_follow_up("What is a copay?");
    assert!(app.highlight().messages().is_empty());
}
