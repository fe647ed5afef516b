//! HTTP request handlers organized by domain.

pub mod auth;
pub mod category;
pub mod health;
pub mod order;
pub mod product;
pub mod user;
