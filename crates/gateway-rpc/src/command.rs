//! Command envelopes and the catalog of commands the gateway issues.
//!
//! A [`Command`] is the static half of a call: which backend owns it, the
//! `(role, cmd)` routing key, how long to wait, and how to read the reply.
//! The payload is supplied per call.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Logical name of a backend service, resolved to a host/port at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceTag {
    /// Users, credentials, addresses.
    Identity,
    /// Products and categories.
    Catalog,
    /// Orders.
    Ordering,
}

impl ServiceTag {
    /// Return the tag as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Catalog => "catalog",
            Self::Ordering => "ordering",
        }
    }
}

impl fmt::Display for ServiceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing key understood by backend message handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pattern {
    /// Domain tag, e.g. `"user"` or `"category"`.
    pub role: &'static str,
    /// Command name, e.g. `"sign-in"`.
    pub cmd: &'static str,
}

impl Pattern {
    /// Serializes the pattern into the route string backends match on:
    /// a JSON object with its keys in sorted order.
    pub fn route(&self) -> String {
        #[derive(Serialize)]
        struct Route<'a> {
            cmd: &'a str,
            role: &'a str,
        }

        serde_json::to_string(&Route {
            cmd: self.cmd,
            role: self.role,
        })
        .unwrap_or_else(|_| format!("{{\"cmd\":\"{}\",\"role\":\"{}\"}}", self.cmd, self.role))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.role, self.cmd)
    }
}

/// How a backend signals failure for a given command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyContract {
    /// Failure is `status == "error"` or a numeric status outside 2xx.
    Status,
    /// As [`ReplyContract::Status`], and any top-level `message` field also
    /// marks failure. Used by identity lookups that answer "not found" with
    /// a bare message object.
    MessageMarker,
}

/// The static description of one backend command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// Owning backend.
    pub service: ServiceTag,
    /// Routing key.
    pub pattern: Pattern,
    /// Upper bound on the wait for a reply.
    pub timeout: Duration,
    /// Failure-marker convention of the reply.
    pub contract: ReplyContract,
    /// Message reported when the backend answers with nothing.
    pub fallback: &'static str,
}

impl Command {
    /// Defines a command with the standard status contract.
    pub const fn new(
        service: ServiceTag,
        role: &'static str,
        cmd: &'static str,
        timeout_ms: u64,
        fallback: &'static str,
    ) -> Self {
        Self {
            service,
            pattern: Pattern { role, cmd },
            timeout: Duration::from_millis(timeout_ms),
            contract: ReplyContract::Status,
            fallback,
        }
    }

    /// Switches the reply contract to [`ReplyContract::MessageMarker`].
    pub const fn with_message_marker(mut self) -> Self {
        self.contract = ReplyContract::MessageMarker;
        self
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service, self.pattern)
    }
}

/// Commands served by the identity backend.
pub mod identity {
    use super::{Command, ServiceTag::Identity};

    pub const PING: Command = Command::new(Identity, "user", "ping", 5_000, "No answer.");
    pub const SIGN_IN: Command =
        Command::new(Identity, "user", "sign-in", 2_000, "User not found.").with_message_marker();
    pub const FIND_BY_EMAIL: Command =
        Command::new(Identity, "user", "find-by-email", 2_000, "User not found.")
            .with_message_marker();
    pub const CREATE_USER: Command = Command::new(
        Identity,
        "user",
        "create-user",
        2_000,
        "Could not create a user.",
    );
    pub const SHOW_USER: Command =
        Command::new(Identity, "user", "show-user", 2_000, "Could not find a user.");
    pub const UPDATE_PROFILE: Command = Command::new(
        Identity,
        "user",
        "update-user-profile",
        2_000,
        "Could not find a user.",
    );
    pub const UPDATE_PASSWORD: Command = Command::new(
        Identity,
        "user",
        "update-user-password",
        2_000,
        "Could not find a user.",
    );
    pub const UPDATE_ADDRESS: Command = Command::new(
        Identity,
        "user",
        "update-user-address",
        2_000,
        "Could not find a user.",
    );
    pub const DELETE_USER: Command = Command::new(
        Identity,
        "user",
        "delete-user",
        2_000,
        "Could not delete a user.",
    );
}

/// Commands served by the catalog backend.
pub mod catalog {
    use super::{Command, ServiceTag::Catalog};

    pub const PING: Command = Command::new(Catalog, "product", "ping", 5_000, "No answer.");
    pub const CREATE_PRODUCT: Command = Command::new(
        Catalog,
        "product",
        "create-product",
        2_000,
        "Could not create a product.",
    );
    pub const UPDATE_PRODUCT: Command = Command::new(
        Catalog,
        "product",
        "update-product",
        5_000,
        "Could not update a product.",
    );
    pub const FIND_PRODUCT_BY_ID: Command = Command::new(
        Catalog,
        "product",
        "find-product-by-id",
        5_000,
        "Could not find the product.",
    );
    pub const FIND_PRODUCTS_BY_FIELDS: Command = Command::new(
        Catalog,
        "product",
        "find-products-by-fields",
        5_000,
        "Could not find products with the given fields.",
    );
    pub const DELETE_PRODUCT: Command = Command::new(
        Catalog,
        "product",
        "delete-product",
        5_000,
        "Could not delete the product.",
    );
    pub const CREATE_CATEGORY: Command = Command::new(
        Catalog,
        "category",
        "create-category",
        5_000,
        "Could not create a category.",
    );
    pub const UPDATE_CATEGORY: Command = Command::new(
        Catalog,
        "category",
        "update-category",
        5_000,
        "Could not update the category.",
    );
    pub const DELETE_CATEGORY: Command = Command::new(
        Catalog,
        "category",
        "delete-category",
        5_000,
        "Could not delete the category.",
    );
}

/// Commands served by the ordering backend.
pub mod ordering {
    use super::{Command, ServiceTag::Ordering};

    pub const PING: Command = Command::new(Ordering, "order", "ping", 5_000, "No answer.");
    pub const CREATE_ORDER: Command = Command::new(
        Ordering,
        "order",
        "create-order",
        100_000,
        "Could not create an order.",
    );
    pub const UPDATE_ORDER_STATUS: Command = Command::new(
        Ordering,
        "order",
        "update-order-status",
        20_000,
        "Could not update the order.",
    );
    pub const FIND_ORDER_BY_ID: Command = Command::new(
        Ordering,
        "order",
        "find-order-by-id",
        20_000,
        "Could not find the order.",
    );
    pub const FIND_ORDERS_BY_FIELDS: Command = Command::new(
        Ordering,
        "order",
        "find-orders-by-fields",
        100_000,
        "Could not find orders with the given fields.",
    );
}

/// The ping command for a service.
pub fn ping_command(service: ServiceTag) -> Command {
    match service {
        ServiceTag::Identity => identity::PING,
        ServiceTag::Catalog => catalog::PING,
        ServiceTag::Ordering => ordering::PING,
    }
}
