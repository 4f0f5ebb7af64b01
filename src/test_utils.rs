pub mod test_helpers {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use crate::event_source::{Event, KeyCode, KeyEvent, KeyModifiers, SimulatedEventSource};
    use crate::main_app::App;
    use crate::rag::{BackendError, Endpoint, RagBackend, RagRequest, RagResponse};
    use crate::viewer::{DocumentError, DocumentViewer, PageText, PdfTextExtractor};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// Builder for creating test scenarios with simulated user input
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl Default for TestScenarioBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self { events: Vec::new() }
        }

        /// Add a character key press
        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        /// Add a Ctrl+character key press
        pub fn press_ctrl_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::ctrl_char_key(c));
            self
        }

        pub fn press_key(mut self, code: KeyCode) -> Self {
            self.events
                .push(SimulatedEventSource::key_event(code, KeyModifiers::empty()));
            self
        }

        pub fn press_enter(self) -> Self {
            self.press_key(KeyCode::Enter)
        }

        pub fn press_esc(self) -> Self {
            self.press_key(KeyCode::Esc)
        }

        /// Type each character of `text`
        pub fn type_text(mut self, text: &str) -> Self {
            for c in text.chars() {
                self.events.push(SimulatedEventSource::char_key(c));
            }
            self
        }

        /// Press, drag and release the left button
        pub fn drag_select(mut self, from: (u16, u16), to: (u16, u16)) -> Self {
            self.events.push(SimulatedEventSource::mouse_down(from.0, from.1));
            self.events.push(SimulatedEventSource::mouse_drag(to.0, to.1));
            self.events.push(SimulatedEventSource::mouse_up(to.0, to.1));
            self
        }

        pub fn click(mut self, column: u16, row: u16) -> Self {
            self.events.push(SimulatedEventSource::mouse_down(column, row));
            self.events.push(SimulatedEventSource::mouse_up(column, row));
            self
        }

        /// Quit the application (press 'q')
        pub fn quit(mut self) -> Self {
            self.events.push(SimulatedEventSource::char_key('q'));
            self
        }

        /// Events collected so far, for feeding to [`App::handle_event`]
        pub fn events(&self) -> &[Event] {
            &self.events
        }

        /// Build the simulated event source
        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    /// Extractor returning fixed page text, or a failure
    pub struct FakeExtractor {
        pages: Option<Vec<PageText>>,
    }

    impl FakeExtractor {
        pub fn with_pages(pages: Vec<PageText>) -> Self {
            Self { pages: Some(pages) }
        }

        pub fn failing() -> Self {
            Self { pages: None }
        }
    }

    impl PdfTextExtractor for FakeExtractor {
        fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, DocumentError> {
            if !path.exists() {
                return Err(DocumentError::generic(format!("{path:?} does not exist")));
            }
            self.pages
                .clone()
                .ok_or_else(|| DocumentError::generic("corrupt document"))
        }
    }

    /// One-page policy used across the tests.
    ///
    /// Rows: 0 header, 1 "Deductible: $1,500", 2 blank,
    /// 3 "Coinsurance: 20% after deductible", 4 "Copay: $30"
    pub fn policy_pages() -> Vec<PageText> {
        vec![PageText::new([
            "Deductible: $1,500",
            "",
            "Coinsurance: 20% after deductible",
            "Copay: $30",
        ])]
    }

    pub fn fake_viewer() -> DocumentViewer {
        DocumentViewer::new(Box::new(FakeExtractor::with_pages(policy_pages())))
    }

    /// Canned reply for one endpoint
    #[derive(Clone, Debug)]
    pub enum Scripted {
        Answer(String),
        /// "Overview of <file_name>", so replies can be told apart
        EchoFileName,
        Status(u16),
    }

    /// Backend answering from a script and recording what it was asked.
    ///
    /// With a gate, every call blocks until the test sends on the gate.
    /// A held file blocks only the calls naming that file.
    pub struct ScriptedBackend {
        replies: HashMap<Endpoint, Scripted>,
        requests: Mutex<Vec<(Endpoint, RagRequest)>>,
        gate: Option<flume::Receiver<()>>,
        held: Option<(String, flume::Receiver<()>)>,
        answered: AtomicUsize,
    }

    impl ScriptedBackend {
        pub fn new() -> Self {
            Self {
                replies: HashMap::new(),
                requests: Mutex::new(Vec::new()),
                gate: None,
                held: None,
                answered: AtomicUsize::new(0),
            }
        }

        pub fn answer(mut self, endpoint: Endpoint, text: &str) -> Self {
            self.replies
                .insert(endpoint, Scripted::Answer(text.to_string()));
            self
        }

        pub fn echo_file_name(mut self, endpoint: Endpoint) -> Self {
            self.replies.insert(endpoint, Scripted::EchoFileName);
            self
        }

        pub fn status(mut self, endpoint: Endpoint, status: u16) -> Self {
            self.replies.insert(endpoint, Scripted::Status(status));
            self
        }

        /// Hold every call until a unit is sent on the returned channel
        pub fn gated(mut self) -> (Self, flume::Sender<()>) {
            let (tx, rx) = flume::unbounded();
            self.gate = Some(rx);
            (self, tx)
        }

        /// Hold calls for `file_name` until a unit is sent on the returned channel
        pub fn hold_file(mut self, file_name: &str) -> (Self, flume::Sender<()>) {
            let (tx, rx) = flume::unbounded();
            self.held = Some((file_name.to_string(), rx));
            (self, tx)
        }

        /// Calls that have returned
        pub fn answered(&self) -> usize {
            self.answered.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<(Endpoint, RagRequest)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Default for ScriptedBackend {
        fn default() -> Self {
            Self::new()
        }
    }

    impl RagBackend for ScriptedBackend {
        fn ask(
            &self,
            endpoint: Endpoint,
            request: &RagRequest,
        ) -> Result<RagResponse, BackendError> {
            self.requests
                .lock()
                .unwrap()
                .push((endpoint, request.clone()));
            if let Some(gate) = &self.gate {
                let _ = gate.recv();
            }
            if let Some((file_name, gate)) = &self.held {
                if request.file_name.as_deref() == Some(file_name.as_str()) {
                    let _ = gate.recv();
                }
            }
            let reply = self.reply(endpoint, request);
            self.answered.fetch_add(1, Ordering::SeqCst);
            reply
        }
    }

    impl ScriptedBackend {
        fn reply(
            &self,
            endpoint: Endpoint,
            request: &RagRequest,
        ) -> Result<RagResponse, BackendError> {
            match self.replies.get(&endpoint) {
                Some(Scripted::Answer(text)) => Ok(RagResponse {
                    answer: text.clone(),
                    chunks: vec![],
                }),
                Some(Scripted::EchoFileName) => Ok(RagResponse {
                    answer: format!(
                        "Overview of {}",
                        request.file_name.as_deref().unwrap_or("selection")
                    ),
                    chunks: vec![],
                }),
                Some(Scripted::Status(status)) => Err(BackendError::Status {
                    endpoint: endpoint.path(),
                    status: *status,
                }),
                None => Err(BackendError::generic("no scripted reply")),
            }
        }
    }

    /// App with a fake viewer, drawn once so mouse hit testing works
    pub fn app_with_backend(
        backend: Arc<dyn RagBackend>,
    ) -> (App, Terminal<TestBackend>) {
        let mut app = App::with_viewer(backend, fake_viewer());
        let mut terminal = create_test_terminal(120, 30);
        terminal.draw(|f| app.draw(f)).unwrap();
        (app, terminal)
    }

    /// Poll the backend until `done` holds or the timeout passes
    pub fn wait_until(app: &mut App, timeout: Duration, done: impl Fn(&App) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            app.poll_backend();
            if done(app) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    /// Write a stand-in PDF into `dir`
    pub fn write_pdf(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"%PDF-1.4\n% test fixture\n%%EOF\n").unwrap();
        path
    }

    /// Create a test terminal for snapshot testing
    pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        Terminal::new(backend).unwrap()
    }

    /// Capture the current terminal buffer as a string
    pub fn capture_terminal_state(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                line.push_str(buffer[(x, y)].symbol());
            }
            // Trim trailing whitespace from each line
            lines.push(line.trim_end().to_string());
        }

        lines.join("\n")
    }

    pub fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }
}
