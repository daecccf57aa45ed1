//! Single-writer HTTP queue with retry and exponential-ish back-off (§4.5).
//!
//! Only POST + `application/json` is supported — anything else is a
//! programmer error, not a runtime one, so it panics rather than returning
//! `TransportError`.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::SinkTunables;

pub type Callback = Box<dyn Fn(&str) + Send + 'static>;

pub struct Request {
    pub endpoint: String,
    pub body: Value,
    pub on_success: Option<Callback>,
    pub on_error: Option<Callback>,
}

impl Request {
    pub fn new(endpoint: impl Into<String>, body: Value) -> Self {
        Self {
            endpoint: endpoint.into(),
            body,
            on_success: None,
            on_error: None,
        }
    }

    pub fn on_success(mut self, cb: impl Fn(&str) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(cb));
        self
    }

    pub fn on_error(mut self, cb: impl Fn(&str) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(cb));
        self
    }
}

struct State {
    queue: VecDeque<Request>,
    delaying: bool,
    consecutive_fails: u32,
}

pub struct HttpSink {
    base_url: String,
    client: Client,
    tunables: SinkTunables,
    state: Mutex<State>,
    cv: Condvar,
}

impl HttpSink {
    pub fn new(base_url: String, tunables: SinkTunables) -> Arc<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(tunables.tls_insecure)
            .build()
            .expect("reqwest client builds with static config");

        Arc::new(Self {
            base_url,
            client,
            tunables,
            state: Mutex::new(State {
                queue: VecDeque::new(),
                delaying: false,
                consecutive_fails: 0,
            }),
            cv: Condvar::new(),
        })
    }

    /// Enqueue a POST request. Always `Content-Type: application/json`.
    pub fn enqueue(&self, request: Request) {
        let mut state = self.state.lock().expect("sink mutex poisoned");
        state.queue.push_back(request);
        self.cv.notify_all();
    }

    /// Run the single background worker. Intended to be the body of its own
    /// dedicated thread; never returns under normal operation.
    pub fn run(self: &Arc<Self>) {
        loop {
            let request = {
                let mut state = self.state.lock().expect("sink mutex poisoned");
                loop {
                    if !state.delaying {
                        if let Some(req) = state.queue.pop_front() {
                            break req;
                        }
                    }
                    state = self.cv.wait(state).expect("sink mutex poisoned");
                }
            };

            self.send(request);
        }
    }

    fn send(self: &Arc<Self>, request: Request) {
        let url = format!("{}{}", self.base_url, request.endpoint);
        let result = self
            .client
            .post(&url)
            .header("Accept", "text/plain")
            .json(&request.body)
            .send();

        match result {
            Ok(resp) if resp.status().is_success() => {
                let body = resp.text().unwrap_or_default();
                if let Some(cb) = &request.on_success {
                    cb(&body);
                }
                let mut state = self.state.lock().expect("sink mutex poisoned");
                state.consecutive_fails = 0;
            }
            Ok(resp) => {
                let body = resp.text().unwrap_or_default();
                self.handle_failure(request, &body);
            }
            Err(e) => {
                let body = e.to_string();
                self.handle_failure(request, &body);
            }
        }
    }

    fn handle_failure(self: &Arc<Self>, mut request: Request, body: &str) {
        if let Some(cb) = request.on_error.take() {
            cb(body);
        }

        let mut state = self.state.lock().expect("sink mutex poisoned");
        // Re-enqueue minus the callbacks we already ran — keep the original
        // request alive so re-delivery retries the same body.
        request.on_error = None;
        state.queue.push_back(request);
        state.consecutive_fails += 1;

        if state.consecutive_fails >= self.tunables.fail_threshold {
            warn!(
                "http sink: {} consecutive failures, entering {}s delay",
                state.consecutive_fails, self.tunables.delay_secs
            );
            state.delaying = true;
            self.spawn_delay_timer();
        }
    }

    fn spawn_delay_timer(self: &Arc<Self>) {
        let delay_secs = self.tunables.delay_secs;
        let sink = self.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(delay_secs));
            let mut guard = sink.state.lock().expect("sink mutex poisoned");
            guard.delaying = false;
            info!("http sink: delay elapsed, resuming");
            sink.cv.notify_all();
        });
    }
}
