//! Scripted [`SnapshotSource`] for aggregator and scheduler tests.
//!
//! Each `fetch()` pops the next scripted result; once the script is empty
//! it returns the events registered for the category (or the default
//! events). Fetches can be delayed to exercise single-flight and timeouts.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{Category, Event};
use crate::error::Error;
use crate::port::outbound::source::SnapshotSource;

type Scripted = std::result::Result<Vec<Event>, String>;

pub struct ScriptedSource {
    name: String,
    cost: u32,
    delay: Option<Duration>,
    script: Mutex<VecDeque<Scripted>>,
    by_category: HashMap<Category, Vec<Event>>,
    default_events: Vec<Event>,
    remaining: Mutex<Option<u32>>,
    calls: Arc<AtomicU32>,
}

impl ScriptedSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cost: 1,
            delay: None,
            script: Mutex::new(VecDeque::new()),
            by_category: HashMap::new(),
            default_events: Vec::new(),
            remaining: Mutex::new(None),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Events returned for any category once the script is exhausted.
    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.default_events = events;
        self
    }

    /// Events returned for `category` once the script is exhausted.
    pub fn with_category_events(mut self, category: impl Into<Category>, events: Vec<Event>) -> Self {
        self.by_category.insert(category.into(), events);
        self
    }

    /// Queue a successful fetch.
    pub fn then_ok(self, events: Vec<Event>) -> Self {
        self.script.lock().push_back(Ok(events));
        self
    }

    /// Queue a failed fetch.
    pub fn then_fail(self, reason: impl Into<String>) -> Self {
        self.script.lock().push_back(Err(reason.into()));
        self
    }

    /// Sleep this long inside every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    /// Budget the source claims the provider has left.
    pub fn with_reported_remaining(self, remaining: u32) -> Self {
        *self.remaining.lock() = Some(remaining);
        self
    }

    /// Shared fetch counter.
    pub fn calls(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.calls)
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for ScriptedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn request_cost(&self, _category: &Category) -> u32 {
        self.cost
    }

    async fn fetch(&self, category: &Category) -> Result<Vec<Event>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.script.lock().pop_front();
        match scripted {
            Some(Ok(events)) => Ok(events),
            Some(Err(reason)) => Err(Error::Source {
                name: self.name.clone(),
                reason,
            }),
            None => Ok(self
                .by_category
                .get(category)
                .unwrap_or(&self.default_events)
                .clone()),
        }
    }

    fn reported_remaining(&self) -> Option<u32> {
        *self.remaining.lock()
    }
}
