//! Operation-to-roles policy table.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use gateway_core::types::Role;

/// Every operation the gateway exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    // Auth
    /// Exchange credentials for a token.
    Login,
    /// Request a password-reset link.
    ForgotPassword,
    /// Read the caller's own session.
    Profile,

    // Liveness
    /// Probe the identity backend.
    PingIdentity,
    /// Probe the catalog backend.
    PingCatalog,
    /// Probe the ordering backend.
    PingOrdering,

    // Users
    /// Register a user.
    CreateUser,
    /// Read a user.
    ShowUser,
    /// Update name and contact fields.
    UpdateUserProfile,
    /// Replace a user's address.
    UpdateUserAddress,
    /// Change the caller's password.
    UpdateUserPassword,
    /// Remove a user.
    DeleteUser,

    // Products
    /// Add a product.
    CreateProduct,
    /// Search products.
    FindProducts,
    /// Read a product.
    FindProductById,
    /// Edit a product.
    UpdateProduct,
    /// Remove a product.
    DeleteProduct,

    // Categories
    /// Add a category.
    CreateCategory,
    /// Edit a category.
    UpdateCategory,
    /// Remove a category.
    DeleteCategory,

    // Orders
    /// Place an order.
    CreateOrder,
    /// Move an order to a new status.
    UpdateOrderStatus,
    /// Read an order.
    FindOrderById,
    /// Search orders.
    FindOrders,
}

impl Operation {
    /// Return the operation as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::ForgotPassword => "forgot_password",
            Self::Profile => "profile",
            Self::PingIdentity => "ping_identity",
            Self::PingCatalog => "ping_catalog",
            Self::PingOrdering => "ping_ordering",
            Self::CreateUser => "create_user",
            Self::ShowUser => "show_user",
            Self::UpdateUserProfile => "update_user_profile",
            Self::UpdateUserAddress => "update_user_address",
            Self::UpdateUserPassword => "update_user_password",
            Self::DeleteUser => "delete_user",
            Self::CreateProduct => "create_product",
            Self::FindProducts => "find_products",
            Self::FindProductById => "find_product_by_id",
            Self::UpdateProduct => "update_product",
            Self::DeleteProduct => "delete_product",
            Self::CreateCategory => "create_category",
            Self::UpdateCategory => "update_category",
            Self::DeleteCategory => "delete_category",
            Self::CreateOrder => "create_order",
            Self::UpdateOrderStatus => "update_order_status",
            Self::FindOrderById => "find_order_by_id",
            Self::FindOrders => "find_orders",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static mapping from operation to the roles allowed to invoke it.
///
/// Built once at startup and never mutated afterwards. An operation with
/// no entry is public.
#[derive(Debug, Clone, Default)]
pub struct RolePolicy {
    rules: HashMap<Operation, HashSet<Role>>,
}

impl RolePolicy {
    /// Creates an empty table: every operation is public.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The gateway's policy table.
    pub fn new() -> Self {
        use Operation::*;

        let admin = [Role::Admin];
        let members = [Role::Customer, Role::Admin];

        let mut policy = Self::empty();
        for op in [
            Profile,
            ShowUser,
            UpdateUserProfile,
            UpdateUserAddress,
            UpdateUserPassword,
            FindProducts,
            FindProductById,
            CreateOrder,
            UpdateOrderStatus,
            FindOrderById,
            FindOrders,
        ] {
            policy = policy.with_rule(op, members);
        }
        for op in [
            DeleteUser,
            CreateProduct,
            UpdateProduct,
            DeleteProduct,
            CreateCategory,
            UpdateCategory,
            DeleteCategory,
        ] {
            policy = policy.with_rule(op, admin);
        }
        policy
    }

    /// Attaches `roles` to `operation`, replacing any previous rule.
    pub fn with_rule(mut self, operation: Operation, roles: impl IntoIterator<Item = Role>) -> Self {
        self.rules.insert(operation, roles.into_iter().collect());
        self
    }

    /// Roles allowed for `operation`, or `None` if it is public.
    pub fn required_roles(&self, operation: Operation) -> Option<&HashSet<Role>> {
        self.rules.get(&operation)
    }

    /// Whether `operation` has a rule attached.
    pub fn is_protected(&self, operation: Operation) -> bool {
        self.rules.contains_key(&operation)
    }
}
