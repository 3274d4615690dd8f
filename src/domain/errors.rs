use thiserror::Error;

/// Failure taxonomy surfaced by the order core.
///
/// `EmptyCart`, `InsufficientStock` and `BadRequest` are user-correctable;
/// `Validation` carries a storage constraint message; `Internal` is opaque to
/// callers and logged with context where it is raised.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("cannot create an order from an empty cart, add products to the cart first")]
    EmptyCart,

    #[error("product '{0}' does not have enough stock, reduce the quantity in your cart")]
    InsufficientStock(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}
