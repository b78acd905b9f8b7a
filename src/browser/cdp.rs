// src/browser/cdp.rs
//! Headless Chromium driven over the Chrome DevTools Protocol.
//!
//! The engine is spawned with a throwaway profile and `--remote-debugging-port=0`;
//! the websocket URL it prints on stderr is the only discovery step. All traffic
//! is synchronous: one command in flight, events observed while waiting for replies.

use std::collections::HashSet;
use std::io::{BufRead, BufReader, ErrorKind};
use std::net::TcpStream;
use std::process::{Child, ChildStderr, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::{Value, json};
use tempfile::TempDir;
use tracing::{debug, trace, warn};
use tungstenite::{Message, WebSocket};
use url::Url;

use super::{Browser, BrowserError, Launcher, SelectorWait};

const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
const STARTUP_TIMEOUT: Duration = Duration::from_secs(20);
const POLL: Duration = Duration::from_millis(100);
/// No requests in flight for this long counts as network idle.
const NETWORK_QUIET: Duration = Duration::from_millis(500);
const DEVTOOLS_BANNER: &str = "DevTools listening on ";

const CHROME_FLAGS: &[&str] = &[
    "--headless=new",
    "--remote-debugging-port=0",
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-gpu",
    "--disable-extensions",
    "--mute-audio",
];

/// Incoming frame: either a reply (`id` set) or an event (`method` set).
#[derive(Debug, Deserialize)]
struct CdpMessage {
    id: Option<u64>,
    result: Option<Value>,
    error: Option<CdpErrorBody>,
    method: Option<String>,
    params: Option<Value>,
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CdpErrorBody {
    code: i64,
    message: String,
}

/// Spawns a local Chromium/Chrome binary.
#[derive(Clone, Debug)]
pub struct ChromeLauncher {
    executable: String,
    extra_args: Vec<String>,
}

impl ChromeLauncher {
    pub fn new(executable: impl Into<String>) -> Self {
        Self { executable: executable.into(), extra_args: Vec::new() }
    }

    /// Extra command-line flags, e.g. `--no-sandbox` inside containers.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }
}

impl Launcher for ChromeLauncher {
    type Page = ChromePage;

    fn launch(&self) -> Result<ChromePage, BrowserError> {
        let profile = tempfile::Builder::new().prefix("pv_logger-").tempdir()?;

        let mut child = Command::new(&self.executable)
            .args(CHROME_FLAGS)
            .args(&self.extra_args)
            .arg(format!("--user-data-dir={}", profile.path().display()))
            .arg("about:blank")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BrowserError::Launch(format!("{}: {e}", self.executable)))?;

        let connected = child
            .stderr
            .take()
            .ok_or_else(|| BrowserError::Launch(s!("stderr not captured")))
            .and_then(|stderr| wait_for_endpoint(stderr, STARTUP_TIMEOUT))
            .and_then(|endpoint| connect(&endpoint));

        let ws = match connected {
            Ok(ws) => ws,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        let mut page = ChromePage::new(ws, Some(child), profile);
        // On error `page` drops here, which tears the engine down.
        page.open_isolated_target()?;
        Ok(page)
    }
}

/// Read stderr until Chrome prints its DevTools endpoint.
/// The reader thread keeps draining afterwards so the pipe never fills.
fn wait_for_endpoint(stderr: ChildStderr, timeout: Duration) -> Result<String, BrowserError> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut tx = Some(tx);
        for line in BufReader::new(stderr).lines() {
            let Ok(line) = line else { break };
            if let Some(url) = parse_devtools_line(&line) {
                if let Some(tx) = tx.take() {
                    let _ = tx.send(s!(url));
                }
            }
        }
    });

    rx.recv_timeout(timeout)
        .map_err(|_| BrowserError::Launch(s!("browser did not report a DevTools endpoint")))
}

pub fn parse_devtools_line(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix(DEVTOOLS_BANNER)?;
    rest.starts_with("ws://").then_some(rest)
}

fn connect(endpoint: &str) -> Result<WebSocket<TcpStream>, BrowserError> {
    let url = Url::parse(endpoint)?;
    let host = url
        .host_str()
        .ok_or_else(|| BrowserError::Launch(format!("no host in {endpoint}")))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| BrowserError::Launch(format!("no port in {endpoint}")))?;

    let stream = TcpStream::connect((host, port))?;
    stream.set_read_timeout(Some(COMMAND_TIMEOUT))?;
    let (ws, _) = tungstenite::client(endpoint, stream)
        .map_err(|e| BrowserError::WebSocket(e.to_string()))?;
    debug!(%endpoint, "connected to browser");
    Ok(ws)
}

/// JSON string literal, which is also a valid JS string literal.
fn js_str(s: &str) -> String {
    Value::String(s!(s)).to_string()
}

/// One page in its own browser context, owning the engine process.
pub struct ChromePage {
    ws: WebSocket<TcpStream>,
    child: Option<Child>,
    _profile: TempDir,
    next_id: u64,
    session_id: String,
    context_id: String,
    main_frame: Option<String>,
    /// Requests seen in `requestWillBeSent` without a matching finish/fail.
    inflight: HashSet<String>,
    /// Main frame between lifecycle `init` and `networkIdle`.
    loading: bool,
    /// Last user action or network event; idle needs `NETWORK_QUIET` after it.
    last_activity: Instant,
    closed: bool,
}

impl ChromePage {
    fn new(ws: WebSocket<TcpStream>, child: Option<Child>, profile: TempDir) -> Self {
        Self {
            ws,
            child,
            _profile: profile,
            next_id: 1,
            session_id: s!(),
            context_id: s!(),
            main_frame: None,
            inflight: HashSet::new(),
            loading: false,
            last_activity: Instant::now(),
            closed: false,
        }
    }

    fn open_isolated_target(&mut self) -> Result<(), BrowserError> {
        let ctx = self.call("Target.createBrowserContext", json!({}), None, COMMAND_TIMEOUT)?;
        self.context_id = string_field(&ctx, "browserContextId")?;

        let target = self.call(
            "Target.createTarget",
            json!({ "url": "about:blank", "browserContextId": self.context_id }),
            None,
            COMMAND_TIMEOUT,
        )?;
        let target_id = string_field(&target, "targetId")?;

        let attached = self.call(
            "Target.attachToTarget",
            json!({ "targetId": target_id, "flatten": true }),
            None,
            COMMAND_TIMEOUT,
        )?;
        self.session_id = string_field(&attached, "sessionId")?;

        self.page_call("Page.enable", json!({}), COMMAND_TIMEOUT)?;
        self.page_call("Page.setLifecycleEventsEnabled", json!({ "enabled": true }), COMMAND_TIMEOUT)?;
        self.page_call("Network.enable", json!({}), COMMAND_TIMEOUT)?;
        debug!(target = %target_id, "isolated page ready");
        Ok(())
    }

    fn page_call(&mut self, method: &str, params: Value, timeout: Duration) -> Result<Value, BrowserError> {
        let session = self.session_id.clone();
        self.call(method, params, Some(&session), timeout)
    }

    /// Send one command and block for its reply, observing events on the way.
    fn call(
        &mut self,
        method: &str,
        params: Value,
        session: Option<&str>,
        timeout: Duration,
    ) -> Result<Value, BrowserError> {
        if self.closed {
            return Err(BrowserError::Closed);
        }
        let id = self.next_id;
        self.next_id += 1;

        let mut request = json!({ "id": id, "method": method, "params": params });
        if let Some(session) = session {
            request["sessionId"] = json!(session);
        }
        trace!(%method, id, "CDP send");
        self.ws.send(Message::text(request.to_string()))?;

        let deadline = Instant::now() + timeout;
        loop {
            let Some(msg) = self.read_until(deadline)? else {
                return Err(BrowserError::Timeout(format!("{method} got no reply")));
            };
            if msg.id != Some(id) {
                self.observe(&msg);
                continue;
            }
            if let Some(err) = msg.error {
                return Err(BrowserError::Protocol { code: err.code, message: err.message });
            }
            return Ok(msg.result.unwrap_or(Value::Null));
        }
    }

    /// Next protocol message, or `None` once `deadline` passes.
    fn read_until(&mut self, deadline: Instant) -> Result<Option<CdpMessage>, BrowserError> {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            self.ws.get_mut().set_read_timeout(Some(remaining))?;

            match self.ws.read() {
                Ok(Message::Text(text)) => return Ok(Some(serde_json::from_str(text.as_str())?)),
                Ok(Message::Close(_)) => return Err(BrowserError::Closed),
                Ok(_) => continue,
                Err(tungstenite::Error::Io(e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Track in-flight requests and main-frame lifecycle for network-idle waits.
    fn observe(&mut self, msg: &CdpMessage) {
        if msg.session_id.as_deref() != Some(self.session_id.as_str()) {
            return;
        }
        let (Some(method), Some(params)) = (msg.method.as_deref(), &msg.params) else {
            return;
        };
        match method {
            "Network.requestWillBeSent" => {
                // Long-lived streams never finish.
                if params["type"].as_str() == Some("EventSource") {
                    return;
                }
                if let Some(id) = params["requestId"].as_str() {
                    self.inflight.insert(s!(id));
                }
            }
            "Network.loadingFinished" | "Network.loadingFailed" => {
                if let Some(id) = params["requestId"].as_str() {
                    self.inflight.remove(id);
                }
            }
            "Page.lifecycleEvent" if self.is_main_frame(params["frameId"].as_str()) => {
                match params["name"].as_str() {
                    Some("init") => self.loading = true,
                    Some("networkIdle") => self.loading = false,
                    _ => return,
                }
            }
            _ => return,
        }
        trace!(%method, inflight = self.inflight.len(), "network activity");
        self.last_activity = Instant::now();
    }

    fn is_main_frame(&self, frame: Option<&str>) -> bool {
        match (self.main_frame.as_deref(), frame) {
            (Some(main), Some(frame)) => main == frame,
            _ => true,
        }
    }

    fn evaluate(&mut self, expression: &str, timeout: Duration) -> Result<Value, BrowserError> {
        let result = self.page_call(
            "Runtime.evaluate",
            json!({ "expression": expression, "returnByValue": true, "awaitPromise": true }),
            timeout,
        )?;
        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["text"].as_str().unwrap_or("unknown error");
            return Err(BrowserError::JavaScript(s!(text)));
        }
        Ok(result["result"]["value"].clone())
    }

    /// Wait (bounded) until `selector` matches, then run `body(el)`; body must return true.
    fn on_element(&mut self, selector: &str, body: &str) -> Result<(), BrowserError> {
        if self.wait_for_selector(selector, COMMAND_TIMEOUT)? == SelectorWait::TimedOut {
            return Err(BrowserError::ElementNotFound(s!(selector)));
        }
        let script = format!(
            "(() => {{ const el = document.querySelector({}); if (!el) return false; {body} return true; }})()",
            js_str(selector)
        );
        match self.evaluate(&script, COMMAND_TIMEOUT)? {
            Value::Bool(true) => Ok(()),
            _ => Err(BrowserError::ElementNotFound(s!(selector))),
        }
    }
}

impl Browser for ChromePage {
    fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        self.last_activity = Instant::now();
        let nav = self.page_call("Page.navigate", json!({ "url": url }), timeout)?;
        if let Some(reason) = nav.get("errorText").and_then(Value::as_str) {
            return Err(BrowserError::Navigation { url: s!(url), reason: s!(reason) });
        }
        if let Some(frame) = nav["frameId"].as_str() {
            self.main_frame = Some(s!(frame));
        }

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(BrowserError::Timeout(format!("loading {url}")));
            }
            // A JS error here means the old document was torn down mid-call; poll again.
            match self.evaluate("document.readyState", remaining) {
                Ok(state) if state.as_str() == Some("complete") => break,
                Ok(_) | Err(BrowserError::JavaScript(_)) => thread::sleep(POLL),
                Err(e) => return Err(e),
            }
        }
        debug!(%url, "page loaded");
        Ok(())
    }

    fn fill(&mut self, selector: &str, value: &str) -> Result<(), BrowserError> {
        let body = format!(
            "el.focus(); el.value = {}; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }}));",
            js_str(value)
        );
        self.on_element(selector, &body)
    }

    fn click(&mut self, selector: &str) -> Result<(), BrowserError> {
        self.on_element(selector, "el.click();")?;
        self.last_activity = Instant::now();
        Ok(())
    }

    fn wait_for_network_idle(&mut self, timeout: Duration) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            let quiet_at = self.last_activity + NETWORK_QUIET;
            let settled = !self.loading && self.inflight.is_empty();
            if settled && now >= quiet_at {
                return Ok(());
            }
            if now >= deadline {
                return Err(BrowserError::Timeout(format!(
                    "waiting for network idle ({} requests in flight)",
                    self.inflight.len()
                )));
            }
            let until = if settled { quiet_at.min(deadline) } else { deadline };
            if let Some(msg) = self.read_until(until)? {
                self.observe(&msg);
            }
        }
    }

    fn wait_for_selector(&mut self, selector: &str, timeout: Duration)
        -> Result<SelectorWait, BrowserError>
    {
        let deadline = Instant::now() + timeout;
        let probe = format!("document.querySelector({}) !== null", js_str(selector));
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(SelectorWait::TimedOut);
            }
            match self.evaluate(&probe, remaining.min(COMMAND_TIMEOUT)) {
                Ok(Value::Bool(true)) => return Ok(SelectorWait::Ready),
                Ok(_) | Err(BrowserError::JavaScript(_)) => {}
                Err(BrowserError::Timeout(_)) => return Ok(SelectorWait::TimedOut),
                Err(e) => return Err(e),
            }
            thread::sleep(POLL.min(deadline.saturating_duration_since(Instant::now())));
        }
    }

    fn text_content(&mut self, selector: &str) -> Result<Option<String>, BrowserError> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); return el ? el.innerText : null; }})()",
            js_str(selector)
        );
        match self.evaluate(&script, COMMAND_TIMEOUT)? {
            Value::String(text) => Ok(Some(text)),
            Value::Null => Ok(None),
            other => Ok(Some(other.to_string())),
        }
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }

        let mut first_err = None;
        if !self.context_id.is_empty() {
            let ctx = self.context_id.clone();
            if let Err(e) = self.call("Target.disposeBrowserContext", json!({ "browserContextId": ctx }), None, COMMAND_TIMEOUT) {
                first_err.get_or_insert(e);
            }
        }
        // Browser.close never gets a reply once the process is gone; don't wait on it.
        let _ = self.ws.send(Message::text(json!({ "id": self.next_id, "method": "Browser.close" }).to_string()));
        self.closed = true;

        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            if let Err(e) = child.wait() {
                first_err.get_or_insert(e.into());
            }
        }
        debug!("browser closed");

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("browser teardown: {e}");
        }
    }
}

fn string_field(v: &Value, key: &str) -> Result<String, BrowserError> {
    v[key]
        .as_str()
        .map(String::from)
        .ok_or_else(|| BrowserError::InvalidResponse(format!("missing {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};

    /// What the fake DevTools endpoint does in answer to one command.
    enum Step {
        Send(Value),
        Sleep(u64),
    }

    fn reply(req: &Value, result: Value) -> Step {
        Step::Send(json!({ "id": req["id"], "result": result }))
    }

    fn value(req: &Value, v: Value) -> Step {
        reply(req, json!({ "result": { "type": "object", "value": v } }))
    }

    fn event(method: &str, params: Value) -> Step {
        Step::Send(json!({ "method": method, "params": params, "sessionId": "S" }))
    }

    fn expression(req: &Value) -> &str {
        req["params"]["expression"].as_str().unwrap_or_default()
    }

    /// Page attached to an in-process DevTools endpoint driven by `script`.
    fn fake_page<F>(mut script: F) -> ChromePage
    where
        F: FnMut(&Value) -> Vec<Step> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut ws = tungstenite::accept(stream).unwrap();
            while let Ok(msg) = ws.read() {
                let Message::Text(text) = msg else { continue };
                let req: Value = serde_json::from_str(text.as_str()).unwrap();
                for step in script(&req) {
                    match step {
                        Step::Sleep(ms) => thread::sleep(Duration::from_millis(ms)),
                        Step::Send(v) => {
                            if ws.send(Message::text(v.to_string())).is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        });

        let ws = connect(&format!("ws://{addr}/devtools/browser/test")).unwrap();
        let mut page = ChromePage::new(ws, None, tempfile::tempdir().unwrap());
        page.session_id = s!("S");
        page
    }

    /// Answers element probes and scripts with `true`, everything else with `{}`.
    fn cooperative(req: &Value) -> Vec<Step> {
        match req["method"].as_str() {
            Some("Runtime.evaluate") => vec![value(req, json!(true))],
            _ => vec![reply(req, json!({}))],
        }
    }

    #[test]
    fn devtools_banner_is_recognised() {
        let line = "DevTools listening on ws://127.0.0.1:40123/devtools/browser/abc-def\n";
        assert_eq!(
            parse_devtools_line(line),
            Some("ws://127.0.0.1:40123/devtools/browser/abc-def")
        );
        assert_eq!(parse_devtools_line("[0101/000000.0:ERROR] something"), None);
        assert_eq!(parse_devtools_line("DevTools listening on http://x"), None);
    }

    #[test]
    fn js_strings_are_escaped() {
        assert_eq!(js_str(r#"input[name='a"b']"#), r#""input[name='a\"b']""#);
    }

    #[test]
    fn missing_binary_is_a_launch_error() {
        let err = ChromeLauncher::new("/nonexistent/pv-logger-browser").launch().err();
        assert!(matches!(err, Some(BrowserError::Launch(_))));
    }

    #[test]
    fn idle_after_click_waits_for_the_next_document() {
        let mut page = fake_page(|req| {
            if expression(req).contains("el.click()") {
                vec![
                    value(req, json!(true)),
                    Step::Sleep(300),
                    event("Page.lifecycleEvent", json!({ "frameId": "F", "name": "init" })),
                    Step::Sleep(500),
                    event("Page.lifecycleEvent", json!({ "frameId": "F", "name": "networkIdle" })),
                ]
            } else {
                cooperative(req)
            }
        });

        page.click(".login-btnArea button").unwrap();
        let started = Instant::now();
        page.wait_for_network_idle(Duration::from_secs(5)).unwrap();
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(900), "idle after {waited:?}");
    }

    #[test]
    fn idle_waits_for_in_flight_fetch() {
        let mut page = fake_page(|req| {
            if expression(req).contains("el.click()") {
                vec![
                    value(req, json!(true)),
                    Step::Sleep(100),
                    event("Network.requestWillBeSent", json!({ "requestId": "r1", "type": "Fetch" })),
                    Step::Sleep(600),
                    event("Network.loadingFinished", json!({ "requestId": "r1" })),
                ]
            } else {
                cooperative(req)
            }
        });

        page.click("button").unwrap();
        let started = Instant::now();
        page.wait_for_network_idle(Duration::from_secs(5)).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert!(page.inflight.is_empty());
    }

    #[test]
    fn idle_wait_expires_while_a_request_hangs() {
        let mut page = fake_page(|req| {
            if expression(req).contains("el.click()") {
                vec![
                    value(req, json!(true)),
                    event("Network.requestWillBeSent", json!({ "requestId": "r1", "type": "XHR" })),
                ]
            } else {
                cooperative(req)
            }
        });

        page.click("button").unwrap();
        let err = page.wait_for_network_idle(Duration::from_millis(700)).unwrap_err();
        assert!(matches!(err, BrowserError::Timeout(_)));
    }

    #[test]
    fn goto_polls_until_document_complete() {
        let polls = Arc::new(Mutex::new(0));
        let seen = polls.clone();
        let mut page = fake_page(move |req| match req["method"].as_str() {
            Some("Page.navigate") => vec![reply(req, json!({ "frameId": "F" }))],
            Some("Runtime.evaluate") => {
                let mut n = seen.lock().unwrap();
                *n += 1;
                let state = if *n < 3 { "loading" } else { "complete" };
                vec![value(req, json!(state))]
            }
            _ => vec![reply(req, json!({}))],
        });

        page.goto("https://example.test/", Duration::from_secs(5)).unwrap();
        assert_eq!(*polls.lock().unwrap(), 3);
        assert_eq!(page.main_frame.as_deref(), Some("F"));
    }

    #[test]
    fn goto_reports_navigation_error_text() {
        let mut page = fake_page(|req| match req["method"].as_str() {
            Some("Page.navigate") => {
                vec![reply(req, json!({ "frameId": "F", "errorText": "net::ERR_NAME_NOT_RESOLVED" }))]
            }
            _ => cooperative(req),
        });

        let err = page.goto("https://nowhere.test/", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(
            err,
            BrowserError::Navigation { ref reason, .. } if reason == "net::ERR_NAME_NOT_RESOLVED"
        ));
    }

    #[test]
    fn selector_wait_expiry_is_an_outcome() {
        let mut page = fake_page(|req| vec![value(req, json!(false))]);

        let started = Instant::now();
        let outcome = page.wait_for_selector("span.value.todayGeneratedPower", Duration::from_millis(300));
        assert_eq!(outcome.unwrap(), SelectorWait::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[test]
    fn fill_on_vanished_element_is_element_not_found() {
        // The presence probe succeeds, the element is gone by the time the script runs.
        let mut page = fake_page(|req| {
            let found = expression(req).ends_with("!== null");
            vec![value(req, json!(found))]
        });

        let err = page.fill("input[name='username']", "user").unwrap_err();
        assert!(matches!(err, BrowserError::ElementNotFound(ref sel) if sel == "input[name='username']"));
    }

    #[test]
    fn text_content_of_absent_element_is_none() {
        let mut page = fake_page(|req| {
            let v = if expression(req).contains("missing") { Value::Null } else { json!("1.2") };
            vec![value(req, v)]
        });

        assert_eq!(page.text_content(".missing").unwrap(), None);
        assert_eq!(page.text_content(".present").unwrap(), Some(s!("1.2")));
    }

    #[test]
    fn close_is_idempotent() {
        let methods = Arc::new(Mutex::new(Vec::new()));
        let log = methods.clone();
        let mut page = fake_page(move |req| {
            log.lock().unwrap().push(s!(req["method"].as_str().unwrap_or_default()));
            cooperative(req)
        });
        page.context_id = s!("C");

        page.close().unwrap();
        page.close().unwrap();
        assert!(matches!(page.text_content("body"), Err(BrowserError::Closed)));

        // Browser.close is fire-and-forget; give the endpoint a moment to log it.
        thread::sleep(Duration::from_millis(100));
        assert_eq!(
            *methods.lock().unwrap(),
            vec![s!("Target.disposeBrowserContext"), s!("Browser.close")]
        );
    }
}
