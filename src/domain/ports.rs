//! Storage and collaborator interfaces the order core depends on.
//!
//! Transactional methods take an explicit `&mut PgConnection`: the caller
//! owns the transaction and every storage call inside it shares the same
//! connection, so a rollback undoes all of them together.

use diesel::pg::PgConnection;
use uuid::Uuid;

use super::cart::CartView;
use super::errors::DomainError;
use super::order::{NewOrderHeader, OrderLineSpec, OrderStatus, OrderView};
use super::user::{AddressView, UserView};

pub trait CartStore: Send + Sync + 'static {
    fn find_by_user(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Option<CartView>, DomainError>;

    /// Upsert a (product, quantity) line, creating the user's cart if it does
    /// not exist yet.
    fn set_line(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartView, DomainError>;

    fn remove_line(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), DomainError>;

    /// Remove every line but keep the cart row for reuse.
    fn drain(&self, conn: &mut PgConnection, cart_id: Uuid) -> Result<(), DomainError>;
}

pub trait InventoryLedger: Send + Sync + 'static {
    /// Atomic conditional decrement: applies only when current stock covers
    /// `amount`, as a single guarded UPDATE. Returns `false` (no row
    /// affected) on insufficient stock — a hard abort signal for the caller,
    /// not a retry condition.
    fn decrease_stock(
        &self,
        conn: &mut PgConnection,
        product_id: Uuid,
        amount: i32,
    ) -> Result<bool, DomainError>;
}

pub trait AddressDirectory: Send + Sync + 'static {
    fn find_by_id_and_user(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<AddressView>, DomainError>;

    fn list_by_user(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<AddressView>, DomainError>;
}

pub trait UserDirectory: Send + Sync + 'static {
    fn find_by_id(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<UserView>, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Insert the order header and one priced line per `OrderLineSpec`.
    /// Product price and discount are read on `conn`, i.e. inside the
    /// caller's transaction, and frozen into `total_price`.
    fn create(
        &self,
        conn: &mut PgConnection,
        header: &NewOrderHeader,
        lines: &[OrderLineSpec],
    ) -> Result<OrderView, DomainError>;

    /// Ownership-filtered lookup: an order belonging to another user is
    /// indistinguishable from a missing one.
    fn find_by_id_and_user(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OrderView>, DomainError>;

    fn find_by_user(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<OrderView>, DomainError>;

    fn update_status(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        status: OrderStatus,
        is_paid: bool,
    ) -> Result<OrderView, DomainError>;

    fn delete(&self, conn: &mut PgConnection, id: Uuid) -> Result<bool, DomainError>;
}

/// External notification sender. Fire-and-forget: callers log failures and
/// never let them affect an already committed order.
pub trait Notifier: Send + Sync + 'static {
    fn send(&self, to_email: &str, subject: &str, body: &str) -> Result<(), DomainError>;
}

impl<N: Notifier> Notifier for std::sync::Arc<N> {
    fn send(&self, to_email: &str, subject: &str, body: &str) -> Result<(), DomainError> {
        (**self).send(to_email, subject, body)
    }
}
