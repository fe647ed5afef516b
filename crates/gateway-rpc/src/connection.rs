//! One persistent, multiplexed connection to a backend service.
//!
//! Many concurrent calls share a single socket. A writer task owns the
//! sink and drains an mpsc queue; a reader task routes every response to
//! the caller waiting on the same correlation id. No lock is held while a
//! caller waits for its reply.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::codec::PacketCodec;
use crate::command::ServiceTag;
use crate::packet::{RequestPacket, ResponsePacket};
use crate::transport::{RawReply, TransportError};

/// Outbound queue depth per connection.
const OUTBOUND_BUFFER: usize = 256;

type PendingMap = DashMap<Uuid, oneshot::Sender<ResponsePacket>>;

/// A live link to one backend.
#[derive(Debug)]
pub struct Connection {
    service: ServiceTag,
    outbound: mpsc::Sender<RequestPacket>,
    pending: Arc<PendingMap>,
    open: Arc<AtomicBool>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl Connection {
    /// Dials `address` and starts the reader and writer tasks.
    pub async fn connect(
        service: ServiceTag,
        address: &str,
        connect_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let connect_error = |reason: String| TransportError::Connect {
            service,
            address: address.to_string(),
            reason,
        };

        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(address))
            .await
            .map_err(|_| connect_error(format!("timed out after {} ms", connect_timeout.as_millis())))?
            .map_err(|e| connect_error(e.to_string()))?;
        stream
            .set_nodelay(true)
            .map_err(|e| connect_error(e.to_string()))?;

        info!(service = %service, address, "Backend connection established");
        Ok(Self::start(
            service,
            Framed::new(stream, PacketCodec::<ResponsePacket>::new()),
        ))
    }

    /// Starts the reader and writer tasks over an established link.
    fn start(service: ServiceTag, framed: Framed<TcpStream, PacketCodec<ResponsePacket>>) -> Self {
        let (mut sink, mut stream) = framed.split();
        let (outbound, mut queue) = mpsc::channel::<RequestPacket>(OUTBOUND_BUFFER);
        let pending: Arc<PendingMap> = Arc::new(DashMap::new());
        let open = Arc::new(AtomicBool::new(true));

        let writer = {
            let open = Arc::clone(&open);
            let pending = Arc::clone(&pending);
            tokio::spawn(async move {
                while let Some(packet) = queue.recv().await {
                    if let Err(e) = sink.send(packet).await {
                        warn!(service = %service, error = %e, "Backend write failed");
                        break;
                    }
                }
                close(service, &open, &pending);
            })
        };

        let reader = {
            let open = Arc::clone(&open);
            let pending = Arc::clone(&pending);
            tokio::spawn(async move {
                while let Some(frame) = stream.next().await {
                    match frame {
                        Ok(packet) => dispatch(service, &pending, packet),
                        Err(e) => {
                            warn!(service = %service, error = %e, "Backend read failed");
                            break;
                        }
                    }
                }
                close(service, &open, &pending);
            })
        };

        Self {
            service,
            outbound,
            pending,
            open,
            reader,
            writer,
        }
    }

    /// Whether the link is still usable for new calls.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst) && !self.outbound.is_closed()
    }

    /// Sends one request and waits, without bound, for its correlated reply.
    ///
    /// Callers bound the wait externally; dropping the returned future
    /// unregisters the call so a late reply is discarded.
    pub async fn request(&self, route: String, data: Value) -> Result<RawReply, TransportError> {
        let closed = |reason: &str| TransportError::Closed {
            service: self.service,
            reason: reason.to_string(),
        };

        if !self.is_open() {
            return Err(closed("connection is closed"));
        }

        let id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);
        let _registration = Registration {
            id,
            pending: &self.pending,
        };

        if !self.open.load(Ordering::SeqCst) {
            return Err(closed("connection is closed"));
        }

        debug!(service = %self.service, request_id = %id, pattern = %route, "Sending backend request");
        self.outbound
            .send(RequestPacket {
                id,
                pattern: route,
                data,
            })
            .await
            .map_err(|_| closed("writer stopped"))?;

        let packet = rx
            .await
            .map_err(|_| closed("connection dropped before the reply arrived"))?;
        Ok(RawReply::from(packet))
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

/// Removes a pending entry when its caller stops waiting.
struct Registration<'a> {
    id: Uuid,
    pending: &'a PendingMap,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.pending.remove(&self.id);
    }
}

/// Marks the link closed and fails every call still waiting on it.
fn close(service: ServiceTag, open: &AtomicBool, pending: &PendingMap) {
    // Closed must be visible before pending is drained so callers
    // registering afterwards observe it.
    let was_open = open.swap(false, Ordering::SeqCst);
    let orphaned = pending.len();
    pending.clear();
    if was_open {
        info!(service = %service, orphaned, "Backend connection closed");
    }
}

fn dispatch(service: ServiceTag, pending: &PendingMap, packet: ResponsePacket) {
    if !packet.is_terminal() {
        return;
    }
    match pending.remove(&packet.id) {
        Some((_, waiter)) => {
            // The caller may have given up between removal and send.
            let _ = waiter.send(packet);
        }
        None => {
            debug!(service = %service, request_id = %packet.id, "Discarding reply with no waiting caller");
        }
    }
}
