//! Request DTOs with validation.
//!
//! Field names follow what the backends expect on the wire, so validated
//! bodies are forwarded by re-serializing them.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email.
    #[validate(email(message = "email must be an email"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Forgot-password request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    /// Email to send the reset link to.
    #[validate(email(message = "email must be an email"))]
    pub email: String,
}

/// Postal address.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    /// Street.
    pub street: String,
    /// Eight-digit postal code.
    #[validate(custom(function = "validate_postal_code"))]
    pub postal_code: String,
    /// House number.
    pub number: i64,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Neighborhood.
    pub neighborhood: String,
    /// Complement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email.
    #[validate(email(message = "email must be an email"))]
    pub email: String,
    /// Address.
    #[validate(nested)]
    pub address: AddressRequest,
}

/// Profile update body. Only present fields are forwarded.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// New email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "email must be an email"))]
    pub email: Option<String>,
    /// New first name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// New last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Password change body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    /// New password.
    #[validate(length(min = 1, message = "password should not be empty"))]
    pub password: String,
}

/// Product search query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FindProductsQuery {
    /// Name filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Category filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

/// Multipart text fields of a product write.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductForm {
    /// Name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Stock keeping unit.
    #[validate(length(min = 1))]
    pub sku: String,
    /// Description.
    pub description: String,
    /// Price as a decimal string.
    #[validate(custom(function = "validate_number_string"))]
    pub price: String,
    /// Owning category id.
    #[serde(default)]
    #[validate(custom(function = "validate_integer_string"))]
    pub category_id: Option<String>,
}

/// Multipart text fields of a category write.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryForm {
    /// Name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

/// Order creation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    /// Customer placing the order.
    pub customer_id: i64,
}

/// Order status change body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateOrderStatusRequest {
    /// Target status code.
    #[validate(length(min = 1, message = "status should not be empty"))]
    pub status: String,
}

fn validate_postal_code(code: &str) -> Result<(), ValidationError> {
    if code.len() == 8 && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("postal_code"))
    }
}

fn validate_number_string(value: &str) -> Result<(), ValidationError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("number_string"))
}

fn validate_integer_string(value: &str) -> Result<(), ValidationError> {
    value
        .trim()
        .parse::<i64>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("integer_string"))
}
