//! The order orchestrator: everything between "buyer clicks checkout" and a
//! committed, immutable order.

use bigdecimal::BigDecimal;
use diesel::Connection;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    CancelOutcome, NewOrderHeader, OrderLineSpec, OrderStatus, OrderView,
};
use crate::domain::ports::{
    AddressDirectory, CartStore, InventoryLedger, Notifier, OrderRepository, UserDirectory,
};

pub struct OrderService<C, L, A, U, O, N> {
    pool: DbPool,
    carts: C,
    inventory: L,
    addresses: A,
    users: U,
    orders: O,
    notifier: N,
}

impl<C, L, A, U, O, N> OrderService<C, L, A, U, O, N>
where
    C: CartStore,
    L: InventoryLedger,
    A: AddressDirectory,
    U: UserDirectory,
    O: OrderRepository,
    N: Notifier,
{
    pub fn new(
        pool: DbPool,
        carts: C,
        inventory: L,
        addresses: A,
        users: U,
        orders: O,
        notifier: N,
    ) -> Self {
        Self {
            pool,
            carts,
            inventory,
            addresses,
            users,
            orders,
            notifier,
        }
    }

    /// Create an order from the user's cart.
    ///
    /// Stock decrements, address resolution, order + line inserts and the
    /// cart drain all share one transaction; Diesel rolls it back on any
    /// `Err`, so a failure on the third line undoes the first two decrements.
    /// The confirmation email happens after commit and is best effort.
    pub fn create_order(
        &self,
        user_id: Uuid,
        is_paid: bool,
        address_id: Option<Uuid>,
    ) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        let user = self
            .users
            .find_by_id(&mut conn, user_id)?
            .ok_or(DomainError::NotFound)?;

        let cart = self
            .carts
            .find_by_user(&mut conn, user_id)?
            .ok_or(DomainError::EmptyCart)?;
        if cart.lines.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        let order = conn.transaction::<_, DomainError, _>(|conn| {
            for line in &cart.lines {
                let decremented =
                    self.inventory
                        .decrease_stock(conn, line.product_id, line.quantity)?;
                if !decremented {
                    // Hard abort: the rollback undoes every decrement applied
                    // so far.
                    return Err(DomainError::InsufficientStock(line.product_name.clone()));
                }
            }

            let address = match address_id {
                Some(id) => self
                    .addresses
                    .find_by_id_and_user(conn, id, user_id)?
                    .ok_or_else(|| {
                        DomainError::BadRequest(
                            "the provided address does not exist for this user".to_string(),
                        )
                    })?,
                None => self
                    .addresses
                    .list_by_user(conn, user_id)?
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        DomainError::BadRequest(
                            "the user has no saved addresses, add one before ordering"
                                .to_string(),
                        )
                    })?,
            };

            let header = NewOrderHeader {
                user_id,
                address_id: address.id,
                status: OrderStatus::Processed,
                is_paid,
            };
            let specs: Vec<OrderLineSpec> = cart
                .lines
                .iter()
                .map(|l| OrderLineSpec {
                    product_id: l.product_id,
                    quantity: l.quantity,
                })
                .collect();

            let order = self.orders.create(conn, &header, &specs)?;
            self.carts.drain(conn, cart.id)?;
            Ok(order)
        })?;

        let (subject, body) = confirmation_email(&order);
        if let Err(e) = self.notifier.send(&user.email, &subject, &body) {
            log::warn!(
                "failed to send order confirmation for order {}: {}",
                order.id,
                e
            );
        }

        Ok(order)
    }

    pub fn get_order(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;
        self.orders.find_by_id_and_user(&mut conn, id, user_id)
    }

    pub fn list_orders(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;
        self.orders.find_by_user(&mut conn, user_id)
    }

    /// Move an order along `processed` → `outForDelivery` → `delivered`.
    ///
    /// The transition is validated against the *persisted* status, and
    /// `is_paid` is monotonic: once true it stays true regardless of the
    /// incoming flag.
    pub fn update_order(
        &self,
        id: Uuid,
        user_id: Uuid,
        new_status: OrderStatus,
        is_paid: bool,
    ) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        let existing = self
            .orders
            .find_by_id_and_user(&mut conn, id, user_id)?
            .ok_or(DomainError::NotFound)?;

        let is_paid = is_paid || existing.is_paid;
        OrderStatus::validate_transition(existing.status, new_status, is_paid)?;

        self.orders.update_status(&mut conn, id, new_status, is_paid)
    }

    /// Cancel (delete) an order, allowed only while it is still `processed`.
    /// Unknown orders and orders owned by someone else report
    /// `NotCancellable` rather than leaking their existence.
    pub fn cancel_order(&self, id: Uuid, user_id: Uuid) -> Result<CancelOutcome, DomainError> {
        let mut conn = self.pool.get()?;

        let existing = match self.orders.find_by_id_and_user(&mut conn, id, user_id)? {
            Some(order) => order,
            None => return Ok(CancelOutcome::NotCancellable),
        };
        if existing.status != OrderStatus::Processed {
            return Ok(CancelOutcome::NotCancellable);
        }

        if self.orders.delete(&mut conn, id)? {
            Ok(CancelOutcome::Cancelled)
        } else {
            Ok(CancelOutcome::NotCancellable)
        }
    }
}

fn confirmation_email(order: &OrderView) -> (String, String) {
    let mut body = String::from("Thank you for your order!\n\n");
    body.push_str(&format!("Order ID: {}\n\nItems:\n", order.id));
    let mut total = BigDecimal::from(0);
    for line in &order.lines {
        body.push_str(&format!(
            "  - {} x{} = {}\n",
            line.product_name, line.quantity, line.total_price
        ));
        total = total + &line.total_price;
    }
    body.push_str(&format!("\nTotal: {}\n", total));
    ("Order Confirmation".to_string(), body)
}
