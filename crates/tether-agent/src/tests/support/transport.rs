//! Recording transport doubles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tether_config::ServerUrl;

use crate::dispatch::Command;
use crate::transport::{
    OutboundMessage, Transport, TransportError, TransportEvents, TransportFactory,
};

use super::journal::{Entry, Journal};

/// How the fake server behaves on connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectBehaviour {
    /// Connects and raises the connected event.
    #[default]
    Announce,
    /// Connects without raising the connected event.
    Silent,
    /// Refuses the connection.
    Refuse,
    /// Takes the given time to connect, then raises the connected event.
    Slow(Duration),
}

pub struct RecordingTransport {
    journal: Journal,
    events: Arc<dyn TransportEvents>,
    behaviour: ConnectBehaviour,
    open: AtomicBool,
    closed: AtomicBool,
}

impl RecordingTransport {
    /// Whether a connection is established and not yet closed.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Delivers a command as if the server had sent it.
    pub fn deliver(&self, kind: &str, payload: &str, correlation_id: i64) {
        self.events
            .on_command(Command::new(kind, payload, correlation_id));
    }

    /// Closes the connection from the server side.
    pub fn drop_connection(&self) {
        self.close();
    }
}

impl Transport for RecordingTransport {
    fn connect(&self, server: &ServerUrl, session_id: &str) -> Result<(), TransportError> {
        match self.behaviour {
            ConnectBehaviour::Refuse => {
                return Err(TransportError::Handshake {
                    url: server.to_string(),
                    message: "connection refused".to_owned(),
                });
            }
            ConnectBehaviour::Slow(delay) => thread::sleep(delay),
            ConnectBehaviour::Announce | ConnectBehaviour::Silent => {}
        }
        self.open.store(true, Ordering::SeqCst);
        self.journal.record(Entry::Connected {
            server: server.to_string(),
            session: session_id.to_owned(),
        });
        if self.behaviour != ConnectBehaviour::Silent {
            self.events.on_connected();
        }
        Ok(())
    }

    fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }
        self.journal
            .record(Entry::sent(message.kind(), message.correlation_id()));
        Ok(())
    }

    /// Journals every close that finds the connection open, plus the first.
    fn close(&self) {
        let was_open = self.open.swap(false, Ordering::SeqCst);
        if !self.closed.swap(true, Ordering::SeqCst) || was_open {
            self.journal.record(Entry::TransportClosed);
            self.events.on_closed();
        }
    }
}

#[derive(Default)]
pub struct RecordingTransportFactory {
    journal: Journal,
    behaviour: ConnectBehaviour,
    created: Mutex<Vec<Arc<RecordingTransport>>>,
}

impl RecordingTransportFactory {
    pub fn new(journal: Journal, behaviour: ConnectBehaviour) -> Self {
        Self {
            journal,
            behaviour,
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn created(&self) -> usize {
        self.created.lock().expect("factory lock").len()
    }

    /// The most recently created transport.
    pub fn transport(&self) -> Arc<RecordingTransport> {
        self.created
            .lock()
            .expect("factory lock")
            .last()
            .cloned()
            .expect("no transport created")
    }
}

impl TransportFactory for RecordingTransportFactory {
    fn create(&self, events: Arc<dyn TransportEvents>) -> Arc<dyn Transport> {
        let transport = Arc::new(RecordingTransport {
            journal: self.journal.clone(),
            events,
            behaviour: self.behaviour,
            open: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        });
        self.created
            .lock()
            .expect("factory lock")
            .push(Arc::clone(&transport));
        transport
    }
}
