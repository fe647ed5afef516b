//! # gateway-rpc
//!
//! The Service Proxy: sends correlated commands to named backend services
//! over one persistent TCP connection per service, bounds every wait with a
//! per-command timeout, and classifies each reply into a success payload or
//! one of the backend error kinds.
//!
//! ## Modules
//!
//! - `command` — service tags, routing patterns, and the per-command catalog
//! - `packet` — request/response packets exchanged with backends
//! - `codec` — `<length>#<json>` framing
//! - `connection` — one shared, multiplexed backend connection
//! - `transport` — the transport seam and its TCP implementation
//! - `reply` — reply classification
//! - `proxy` — the `ServiceProxy` entry point

pub mod codec;
pub mod command;
pub mod connection;
pub mod packet;
pub mod proxy;
pub mod reply;
pub mod transport;

pub use command::{Command, Pattern, ReplyContract, ServiceTag};
pub use proxy::{PingReport, RetryPolicy, ServiceProxy};
pub use reply::BackendReply;
pub use transport::{RawReply, TcpTransport, Transport, TransportError};
