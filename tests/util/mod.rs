use hwconsole_search::model::types::{EntityType, Query, ResultItem, SearchResponse};
use hwconsole_search::search::fallback::default_entity_types;
use hwconsole_search::search::gateway::{GatewayError, SearchGateway};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: Arc<Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        let buf = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Assert that the captured log output contains the provided substring.
    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

#[allow(dead_code)]
pub struct EnvGuard {
    key: String,
    prev: Option<String>,
}

#[allow(dead_code)]
impl EnvGuard {
    pub fn set(key: &str, val: impl AsRef<str>) -> Self {
        let prev = std::env::var(key).ok();
        unsafe { std::env::set_var(key, val.as_ref()) };
        Self {
            key: key.to_string(),
            prev,
        }
    }

    pub fn unset(key: &str) -> Self {
        let prev = std::env::var(key).ok();
        unsafe { std::env::remove_var(key) };
        Self {
            key: key.to_string(),
            prev,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => unsafe { std::env::set_var(&self.key, v) },
            None => unsafe { std::env::remove_var(&self.key) },
        }
    }
}

#[allow(dead_code)]
struct TestWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.0.lock().unwrap();
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// -------- Scripted gateway --------

#[derive(Clone, Debug)]
#[allow(dead_code)]
pub enum Outcome {
    Items(Vec<ResultItem>),
    /// Fails with this HTTP status.
    Fail(u16),
    /// Never answers.
    Hang,
}

#[derive(Clone, Debug)]
#[allow(dead_code)]
pub struct Reply {
    pub delay: Duration,
    pub outcome: Outcome,
}

#[allow(dead_code)]
impl Reply {
    pub fn items(items: Vec<ResultItem>) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Outcome::Items(items),
        }
    }

    pub fn fail(status: u16) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Outcome::Fail(status),
        }
    }

    pub fn hang() -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Outcome::Hang,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Gateway double: answers per query text, records every call it receives.
#[allow(dead_code)]
pub struct ScriptedGateway {
    replies: Mutex<HashMap<String, Reply>>,
    default_reply: Reply,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            default_reply: Reply::items(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(self, text: &str, reply: Reply) -> Self {
        self.replies.lock().unwrap().insert(text.to_string(), reply);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Query texts in the order the gateway saw them.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(&self, text: &str) -> Result<Vec<ResultItem>, GatewayError> {
        self.calls.lock().unwrap().push(text.to_string());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.default_reply.clone());
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        match reply.outcome {
            Outcome::Items(items) => Ok(items),
            Outcome::Fail(status) => Err(GatewayError::Status(status)),
            Outcome::Hang => std::future::pending().await,
        }
    }
}

impl SearchGateway for ScriptedGateway {
    async fn search(&self, query: &Query) -> Result<SearchResponse, GatewayError> {
        let items = self.answer(query.text.trim()).await?;
        Ok(SearchResponse {
            query: query.text.clone(),
            total_results: items.len() as u64,
            results: items,
            ..SearchResponse::default()
        })
    }

    async fn quick_search(&self, text: &str, limit: usize) -> Result<Vec<ResultItem>, GatewayError> {
        let mut items = self.answer(text).await?;
        items.truncate(limit);
        Ok(items)
    }

    async fn entity_types(&self) -> Result<Vec<EntityType>, GatewayError> {
        Ok(default_entity_types())
    }
}

// -------- Fixtures --------

#[allow(dead_code)]
pub fn led_items() -> Vec<ResultItem> {
    vec![
        ResultItem::new("7", "HardwareOutput", "LED Strip", 0.93)
            .with_action("view", "https://api.local/api/hardware-outputs/7"),
        ResultItem::new("12", "HardwareOutputType", "LED Generic Indicator", 0.81)
            .with_action("view", "https://api.local/api/hardware-output-types/12"),
        ResultItem::new("31", "HardwareInput", "LED Test Button", 0.55)
            .with_action("view", "https://api.local/api/hardware-inputs/31"),
    ]
}

#[allow(dead_code)]
pub fn panel_items(label: &str, count: usize) -> Vec<ResultItem> {
    (1..=count)
        .map(|n| {
            ResultItem::new(n.to_string(), "HardwarePanel", format!("{label} {n}"), 0.9)
                .with_action("view", format!("/api/hardware-panels/{n}"))
        })
        .collect()
}
