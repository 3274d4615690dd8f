use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::InventoryLedger;
use crate::schema::products;

/// Stock ledger backed by the `products.stock` column.
#[derive(Debug, Clone, Copy, Default)]
pub struct DieselInventoryLedger;

impl InventoryLedger for DieselInventoryLedger {
    /// Compare-and-subtract in a single guarded UPDATE:
    ///
    /// `UPDATE products SET stock = stock - $n WHERE id = $id AND stock >= $n`
    ///
    /// Two buyers racing for the last unit both reach this statement, but the
    /// row lock serializes them and the second one re-evaluates the predicate
    /// against the decremented value, affecting zero rows.
    fn decrease_stock(
        &self,
        conn: &mut PgConnection,
        product_id: Uuid,
        amount: i32,
    ) -> Result<bool, DomainError> {
        let affected = diesel::update(
            products::table
                .filter(products::id.eq(product_id))
                .filter(products::stock.ge(amount)),
        )
        .set(products::stock.eq(products::stock - amount))
        .execute(conn)?;

        Ok(affected == 1)
    }
}
