//! The Service Proxy: timeout-bounded, classified calls to backends.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use gateway_core::config::{RetryConfig, ServicesConfig};
use gateway_core::error::AppError;
use gateway_core::result::AppResult;

use crate::command::{self, Command, ServiceTag};
use crate::reply::{self, BackendReply};
use crate::transport::{RawReply, TcpTransport, Transport, TransportError};

/// Bounded retry for calls whose link could not be established.
///
/// Only failures to establish the link are retried, since in that case
/// the request never left the gateway. Timeouts and dropped links are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const fn none() -> Self {
        Self {
            max_attempts: 0,
            backoff: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }
}

/// Bound on establishing a backend link when none is configured.
///
/// Kept below the shortest reply bound in the command catalog.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(1_500);

/// Result of a liveness probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PingReport {
    /// Whatever the backend answered.
    pub message: Value,
    /// Round-trip time in milliseconds.
    pub duration: u64,
}

/// Routes commands to backend transports and classifies their replies.
#[derive(Debug, Clone)]
pub struct ServiceProxy {
    transports: HashMap<ServiceTag, Arc<dyn Transport>>,
    retry: RetryPolicy,
    connect_timeout: Duration,
}

impl ServiceProxy {
    /// Creates a proxy with no bound transports.
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            transports: HashMap::new(),
            retry,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Bounds how long a call may spend establishing its link.
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Binds every service to a TCP transport from configuration.
    pub fn from_config(config: &ServicesConfig) -> Self {
        let connect_timeout = Duration::from_millis(config.connect_timeout_ms);
        let endpoints = [
            (ServiceTag::Identity, &config.identity),
            (ServiceTag::Catalog, &config.catalog),
            (ServiceTag::Ordering, &config.ordering),
        ];

        endpoints.into_iter().fold(
            Self::new(RetryPolicy::from(&config.retry)).with_connect_timeout(connect_timeout),
            |proxy, (service, endpoint)| {
                proxy.with_transport(
                    service,
                    Arc::new(TcpTransport::new(
                        service,
                        endpoint.address(),
                        connect_timeout,
                    )),
                )
            },
        )
    }

    /// Binds `service` to `transport`, replacing any previous binding.
    pub fn with_transport(mut self, service: ServiceTag, transport: Arc<dyn Transport>) -> Self {
        self.transports.insert(service, transport);
        self
    }

    /// Calls `command` with its catalog timeout.
    pub async fn call(&self, command: &Command, payload: Value) -> AppResult<Value> {
        self.call_with_timeout(command, payload, command.timeout)
            .await
    }

    /// Calls `command`, waiting at most `timeout` for the reply.
    ///
    /// The link is established first, bounded by the connect timeout; a
    /// backend that cannot be reached fails as `BackendUnavailable` and
    /// never consumes the reply bound. On timeout the backend is not told
    /// to stop; it may still apply the command after the caller has
    /// received `BackendTimeout`.
    pub async fn call_with_timeout(
        &self,
        command: &Command,
        payload: Value,
        timeout: Duration,
    ) -> AppResult<Value> {
        let transport = match self.ready(command.service).await {
            Ok(transport) => transport,
            Err(e) => {
                warn!(service = %command.service, cmd = command.pattern.cmd, error = %e, "Backend unavailable");
                return Err(e.into());
            }
        };

        let started = Instant::now();
        let outcome =
            tokio::time::timeout(timeout, transport.send(&command.pattern, payload)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let raw = match outcome {
            Err(_) => {
                warn!(
                    service = %command.service,
                    cmd = command.pattern.cmd,
                    timeout_ms = timeout.as_millis() as u64,
                    "Backend call timed out"
                );
                return Err(AppError::backend_timeout(format!(
                    "{} did not answer '{}' within {} ms",
                    command.service,
                    command.pattern.cmd,
                    timeout.as_millis()
                )));
            }
            Ok(Err(e)) => {
                warn!(service = %command.service, cmd = command.pattern.cmd, error = %e, "Backend unavailable");
                return Err(e.into());
            }
            Ok(Ok(raw)) => raw,
        };

        match reply::classify(raw, command) {
            BackendReply::Ok(body) => {
                debug!(service = %command.service, cmd = command.pattern.cmd, duration_ms = elapsed_ms, "Backend call succeeded");
                Ok(body)
            }
            BackendReply::Err { kind, message } => {
                warn!(
                    service = %command.service,
                    cmd = command.pattern.cmd,
                    duration_ms = elapsed_ms,
                    error = %message,
                    "Backend reported failure"
                );
                Err(AppError::new(kind, message))
            }
        }
    }

    /// Probes `service` with its ping command.
    pub async fn ping(&self, service: ServiceTag) -> AppResult<PingReport> {
        let started = Instant::now();
        let message = self
            .call(&command::ping_command(service), Value::Object(Default::default()))
            .await?;
        Ok(PingReport {
            message,
            duration: started.elapsed().as_millis() as u64,
        })
    }

    /// Dials every bound backend and returns the ones that could not be reached.
    pub async fn warm_up(&self) -> Vec<(ServiceTag, TransportError)> {
        let mut failures = Vec::new();
        for (service, transport) in &self.transports {
            if let Err(e) = self.dial(*service, transport.as_ref()).await {
                failures.push((*service, e));
            }
        }
        failures
    }

    /// Returns the transport for `service` with its link established,
    /// retrying connect failures within the policy.
    async fn ready(&self, service: ServiceTag) -> Result<&Arc<dyn Transport>, TransportError> {
        let transport = self
            .transports
            .get(&service)
            .ok_or(TransportError::Unbound(service))?;

        let mut attempt = 0;
        loop {
            match self.dial(service, transport.as_ref()).await {
                Ok(()) => return Ok(transport),
                Err(e) if e.is_safe_to_retry() && attempt < self.retry.max_attempts => {
                    attempt += 1;
                    warn!(service = %service, attempt, error = %e, "Backend connect failed, retrying");
                    tokio::time::sleep(self.retry.backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn dial(&self, service: ServiceTag, transport: &dyn Transport) -> Result<(), TransportError> {
        tokio::time::timeout(self.connect_timeout, transport.warm_up())
            .await
            .unwrap_or_else(|_| {
                Err(TransportError::DialTimeout {
                    service,
                    after_ms: self.connect_timeout.as_millis() as u64,
                })
            })
    }
}
