//! In-memory transport used by the gateway tests.

use super::factory::TransportFactory;
use super::transport::{Transport, TransportEvent, TransportHandle};
use crate::types::{GatewayError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Test-side view of one created transport
#[derive(Clone)]
pub(crate) struct MockRemote {
    pub endpoint: String,
    pub delay: Duration,
    events: mpsc::UnboundedSender<TransportEvent>,
    open: Arc<AtomicBool>,
    sent: Arc<Mutex<Vec<String>>>,
    close_requests: Arc<Mutex<u32>>,
}

impl MockRemote {
    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
        let _ = self.events.send(TransportEvent::Opened);
    }

    pub fn message(&self, text: &str) {
        let _ = self.events.send(TransportEvent::Message(text.to_string()));
    }

    pub fn error(&self, message: &str) {
        let _ = self
            .events
            .send(TransportEvent::Error(GatewayError::Transport(message.to_string())));
    }

    pub fn close(&self, code: u16, reason: &str) {
        self.open.store(false, Ordering::SeqCst);
        let _ = self.events.send(TransportEvent::Closed {
            code,
            reason: reason.to_string(),
        });
    }

    /// Flip the open flag without producing any event
    pub fn set_open(&self, open: bool) {
        self.open.store(open, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_ops(&self) -> Vec<i64> {
        self.sent()
            .iter()
            .map(|text| {
                let value: serde_json::Value = serde_json::from_str(text).unwrap();
                value["op"].as_i64().unwrap()
            })
            .collect()
    }

    pub fn close_requests(&self) -> u32 {
        *self.close_requests.lock().unwrap()
    }

    pub fn is_subscribed(&self) -> bool {
        !self.events.is_closed()
    }
}

struct MockTransport {
    open: Arc<AtomicBool>,
    sent: Arc<Mutex<Vec<String>>>,
    close_requests: Arc<Mutex<u32>>,
}

impl Transport for MockTransport {
    fn send(&mut self, text: String) -> Result<()> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(GatewayError::NotConnected);
        }
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    fn close(&mut self) {
        *self.close_requests.lock().unwrap() += 1;
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Factory recording every transport it creates
#[derive(Clone, Default)]
pub(crate) struct MockFactory {
    created: Arc<Mutex<Vec<MockRemote>>>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn remote(&self, index: usize) -> MockRemote {
        self.created.lock().unwrap()[index].clone()
    }

    pub fn last(&self) -> MockRemote {
        self.created
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no transport created")
    }
}

impl TransportFactory for MockFactory {
    fn create(&self, endpoint: &str, delay: Duration) -> TransportHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));
        let sent = Arc::new(Mutex::new(Vec::new()));
        let close_requests = Arc::new(Mutex::new(0));

        self.created.lock().unwrap().push(MockRemote {
            endpoint: endpoint.to_string(),
            delay,
            events: events_tx,
            open: Arc::clone(&open),
            sent: Arc::clone(&sent),
            close_requests: Arc::clone(&close_requests),
        });

        TransportHandle {
            transport: Box::new(MockTransport {
                open,
                sent,
                close_requests,
            }),
            events: events_rx,
        }
    }
}
