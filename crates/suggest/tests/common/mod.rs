#![allow(dead_code)]

use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use bus::{CoreCommand, CoreEvent};
use core_types::{RequestId, ResourceKind};
use suggest::{FieldBinding, FieldEvent, InputId, Key, OptionsOverride, SuggestEngine};

/// Engine plus a hand-advanced clock and the receiving end of its command
/// channel, standing in for the network runtime.
pub struct Harness {
    pub engine: SuggestEngine,
    pub commands: Receiver<CoreCommand>,
    pub now: Instant,
}

/// A `Fetch` the engine sent.
#[derive(Clone, Debug)]
pub struct Sent {
    pub request_id: RequestId,
    pub kind: ResourceKind,
    pub url: String,
}

impl Harness {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            engine: SuggestEngine::new(tx),
            commands: rx,
            now: Instant::now(),
        }
    }

    /// Bind a search field and let it become managed.
    pub fn managed_suggest(&mut self, raw: u64, overrides: OptionsOverride) -> (InputId, FieldBinding) {
        let input = InputId::from_raw(raw);
        let binding = self.engine.bind_suggest(input, overrides);
        self.focus(input);
        (input, binding)
    }

    pub fn managed_select(&mut self, raw: u64, overrides: OptionsOverride) -> (InputId, FieldBinding) {
        let input = InputId::from_raw(raw);
        let binding = self.engine.bind_select(input, overrides);
        self.focus(input);
        (input, binding)
    }

    pub fn focus(&mut self, input: InputId) {
        self.engine.focus(input, self.now);
        self.advance(Duration::from_millis(200));
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
        self.engine.tick(self.now);
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Run every pending timer.
    pub fn settle(&mut self) {
        for _ in 0..32 {
            let Some(due) = self.engine.next_deadline() else {
                return;
            };
            // don't run into request timeouts or error expiry
            if due > self.now + Duration::from_secs(1) {
                return;
            }
            self.now = self.now.max(due);
            self.engine.tick(self.now);
        }
    }

    pub fn type_str(&mut self, input: InputId, text: &str) {
        for c in text.chars() {
            self.engine
                .key(input, Key::Char(c), self.now)
                .expect("bound field");
        }
    }

    pub fn press(&mut self, input: InputId, key: Key) -> suggest::KeyDisposition {
        self.engine.key(input, key, self.now).expect("bound field")
    }

    /// Drain the command channel, keeping only fetches.
    pub fn fetches(&self) -> Vec<Sent> {
        self.commands
            .try_iter()
            .filter_map(|cmd| match cmd {
                CoreCommand::Fetch {
                    request_id,
                    kind,
                    url,
                } => Some(Sent {
                    request_id,
                    kind,
                    url,
                }),
                CoreCommand::CancelRequest { .. } => None,
            })
            .collect()
    }

    pub fn commands(&self) -> Vec<CoreCommand> {
        self.commands.try_iter().collect()
    }

    /// Answer `sent` with a 200 and `body`.
    pub fn reply(&mut self, sent: &Sent, body: &str) {
        self.engine.on_core_event(
            CoreEvent::FetchDone {
                request_id: sent.request_id,
                kind: sent.kind,
                url: sent.url.clone(),
                status: 200,
                body: body.to_string(),
            },
            self.now,
        );
    }

    pub fn fail(&mut self, sent: &Sent, error: &str) {
        self.engine.on_core_event(
            CoreEvent::FetchError {
                request_id: sent.request_id,
                kind: sent.kind,
                url: sent.url.clone(),
                error: error.to_string(),
            },
            self.now,
        );
    }

    pub fn events(&mut self) -> Vec<FieldEvent> {
        self.engine.take_events()
    }
}

/// Search envelope around `items` (a JSON array).
pub fn search_body(items: &str) -> String {
    format!(r#"{{"status":"200 OK","result":{items}}}"#)
}

pub fn blurb_body(text: &str) -> String {
    format!(r#"{{"status":"200 OK","result":{{"body":"{text}"}}}}"#)
}

pub fn mqlread_body(items: &str) -> String {
    format!(r#"{{"query":{{"code":"/api/status/ok","result":{items}}}}}"#)
}

pub fn no_flyout() -> OptionsOverride {
    OptionsOverride {
        show_flyout: Some(false),
        ..OptionsOverride::default()
    }
}
