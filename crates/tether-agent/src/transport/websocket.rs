//! Blocking WebSocket client transport.

use std::io;
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};
use tungstenite::{Message, WebSocket};

use tether_config::ServerUrl;

use super::{
    OutboundMessage, TRANSPORT_TARGET, Transport, TransportError, TransportEvents,
    TransportFactory, parse_command,
};

const READ_TIMEOUT: Duration = Duration::from_millis(25);
const READ_BACKOFF: Duration = Duration::from_millis(5);

type Socket = WebSocket<TcpStream>;

/// WebSocket transport for `ws://` orchestration servers.
pub struct WebSocketTransport {
    shared: Arc<Shared>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

struct Shared {
    socket: Mutex<Option<Socket>>,
    events: Arc<dyn TransportEvents>,
    shutdown: AtomicBool,
    closed_notified: AtomicBool,
}

impl Shared {
    fn lock_socket(&self) -> MutexGuard<'_, Option<Socket>> {
        self.socket.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify_closed(&self) {
        if !self.closed_notified.swap(true, Ordering::SeqCst) {
            self.events.on_closed();
        }
    }

    fn deliver(&self, text: &str) {
        match parse_command(text) {
            Ok(command) => self.events.on_command(command),
            Err(error) => warn!(
                target: TRANSPORT_TARGET,
                error = %error,
                "discarding malformed message"
            ),
        }
    }
}

impl WebSocketTransport {
    /// Builds an unconnected transport reporting to `events`.
    #[must_use]
    pub fn new(events: Arc<dyn TransportEvents>) -> Self {
        Self {
            shared: Arc::new(Shared {
                socket: Mutex::new(None),
                events,
                shutdown: AtomicBool::new(false),
                closed_notified: AtomicBool::new(false),
            }),
            reader: Mutex::new(None),
        }
    }

    fn lock_reader(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.reader.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open(server: &ServerUrl) -> Result<Socket, TransportError> {
        if server.is_secure() {
            return Err(TransportError::UnsupportedScheme {
                scheme: server.scheme().to_owned(),
                url: server.to_string(),
            });
        }
        let endpoint = format!("{}:{}", server.host(), server.port());
        let stream = TcpStream::connect(endpoint.as_str())
            .map_err(|source| TransportError::Connect { endpoint, source })?;
        let (socket, _response) = tungstenite::client::client(server.as_str(), stream).map_err(
            |error| TransportError::Handshake {
                url: server.to_string(),
                message: error.to_string(),
            },
        )?;
        Ok(socket)
    }

    fn write(socket: &mut Socket, message: &OutboundMessage) -> Result<(), TransportError> {
        let text = message.to_json()?;
        socket
            .send(Message::text(text))
            .map_err(|source| TransportError::Send {
                source: Box::new(source),
            })
    }
}

impl Transport for WebSocketTransport {
    fn connect(&self, server: &ServerUrl, session_id: &str) -> Result<(), TransportError> {
        let mut socket = Self::open(server)?;
        Self::write(&mut socket, &OutboundMessage::login(session_id))?;
        socket
            .get_ref()
            .set_read_timeout(Some(READ_TIMEOUT))
            .map_err(|source| TransportError::Configure { source })?;
        {
            let mut slot = self.shared.lock_socket();
            if self.shared.shutdown.load(Ordering::SeqCst) {
                drop(slot);
                debug!(target: TRANSPORT_TARGET, "closed while connecting");
                if let Err(error) = socket.close(None).and_then(|()| socket.flush()) {
                    debug!(
                        target: TRANSPORT_TARGET,
                        error = %error,
                        "close handshake incomplete"
                    );
                }
                return Err(TransportError::Closed);
            }
            *slot = Some(socket);
        }

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("tether-transport".to_owned())
            .spawn(move || run_reader(&shared))
            .map_err(|source| {
                self.shared.lock_socket().take();
                TransportError::Spawn { source }
            })?;
        *self.lock_reader() = Some(handle);

        info!(
            target: TRANSPORT_TARGET,
            server = %server,
            session = session_id,
            "connected to orchestration server"
        );
        self.shared.events.on_connected();
        Ok(())
    }

    fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        let mut guard = self.shared.lock_socket();
        let socket = guard.as_mut().ok_or(TransportError::Closed)?;
        Self::write(socket, message)?;
        debug!(
            target: TRANSPORT_TARGET,
            kind = message.kind(),
            correlation_id = message.correlation_id(),
            "message sent"
        );
        Ok(())
    }

    fn close(&self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        if let Some(mut socket) = self.shared.lock_socket().take() {
            if let Err(error) = socket.close(None).and_then(|()| socket.flush()) {
                debug!(
                    target: TRANSPORT_TARGET,
                    error = %error,
                    "close handshake incomplete"
                );
            }
        }
        if let Some(handle) = self.lock_reader().take() {
            if handle.thread().id() != thread::current().id() && handle.join().is_err() {
                warn!(target: TRANSPORT_TARGET, "transport reader panicked");
            }
        }
        self.shared.notify_closed();
    }
}

fn run_reader(shared: &Shared) {
    while !shared.shutdown.load(Ordering::SeqCst) {
        let outcome = {
            let mut guard = shared.lock_socket();
            let Some(socket) = guard.as_mut() else {
                break;
            };
            socket.read()
        };
        match outcome {
            Ok(Message::Text(text)) => shared.deliver(text.as_str()),
            Ok(Message::Close(_)) => {
                info!(target: TRANSPORT_TARGET, "server closed the connection");
                break;
            }
            Ok(_) => {}
            Err(tungstenite::Error::Io(error)) if is_timeout(&error) => {
                thread::sleep(READ_BACKOFF);
            }
            Err(error) => {
                if !shared.shutdown.load(Ordering::SeqCst) {
                    warn!(
                        target: TRANSPORT_TARGET,
                        error = %error,
                        "transport read failed"
                    );
                }
                break;
            }
        }
    }
    shared.lock_socket().take();
    shared.notify_closed();
}

fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Builds [`WebSocketTransport`] instances.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketTransportFactory;

impl TransportFactory for WebSocketTransportFactory {
    fn create(&self, events: Arc<dyn TransportEvents>) -> Arc<dyn Transport> {
        Arc::new(WebSocketTransport::new(events))
    }
}
