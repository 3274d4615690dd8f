use bigdecimal::BigDecimal;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    NewOrderHeader, OrderLineSpec, OrderLineView, OrderStatus, OrderView,
};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_lines, orders, products};

use super::models::{NewOrderLineRow, NewOrderRow, OrderLineRow, OrderRow};

#[derive(Debug, Clone, Copy, Default)]
pub struct DieselOrderRepository;

/// price × quantity × (100 − discount)/100, frozen into the order line.
fn line_total(price: &BigDecimal, quantity: i32, discount_rate: i32) -> BigDecimal {
    price * BigDecimal::from(quantity) * BigDecimal::from(100 - discount_rate)
        / BigDecimal::from(100)
}

fn to_view(row: OrderRow, lines: Vec<OrderLineView>) -> Result<OrderView, DomainError> {
    let status = OrderStatus::parse(&row.status).ok_or_else(|| {
        DomainError::Internal(format!("unknown order status '{}' in storage", row.status))
    })?;
    Ok(OrderView {
        id: row.id,
        user_id: row.user_id,
        address_id: row.address_id,
        status,
        is_paid: row.is_paid,
        created_at: row.created_at,
        lines,
    })
}

impl DieselOrderRepository {
    fn load_lines(
        &self,
        conn: &mut PgConnection,
        order_id: Uuid,
    ) -> Result<Vec<OrderLineView>, DomainError> {
        let rows: Vec<(OrderLineRow, String)> = order_lines::table
            .inner_join(products::table)
            .filter(order_lines::order_id.eq(order_id))
            .order(order_lines::created_at.asc())
            .select((OrderLineRow::as_select(), products::name))
            .load(conn)?;

        Ok(rows
            .into_iter()
            .map(|(line, product_name)| OrderLineView {
                id: line.id,
                product_id: line.product_id,
                product_name,
                quantity: line.quantity,
                total_price: line.total_price,
            })
            .collect())
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(
        &self,
        conn: &mut PgConnection,
        header: &NewOrderHeader,
        lines: &[OrderLineSpec],
    ) -> Result<OrderView, DomainError> {
        let order_row: OrderRow = diesel::insert_into(orders::table)
            .values(&NewOrderRow {
                id: Uuid::new_v4(),
                user_id: header.user_id,
                address_id: header.address_id,
                status: header.status.as_str().to_string(),
                is_paid: header.is_paid,
            })
            .get_result(conn)?;

        // Price and discount are read on this connection, inside the
        // caller's transaction: the snapshot reflects what was true when the
        // order committed, and later catalog edits do not touch it.
        let mut new_rows = Vec::with_capacity(lines.len());
        let mut views = Vec::with_capacity(lines.len());
        for spec in lines {
            let (name, price, discount_rate): (String, BigDecimal, Option<i32>) =
                products::table
                    .find(spec.product_id)
                    .select((products::name, products::price, products::discount_rate))
                    .first(conn)?;
            let total_price = line_total(&price, spec.quantity, discount_rate.unwrap_or(0));
            let id = Uuid::new_v4();
            new_rows.push(NewOrderLineRow {
                id,
                order_id: order_row.id,
                product_id: spec.product_id,
                quantity: spec.quantity,
                total_price: total_price.clone(),
            });
            views.push(OrderLineView {
                id,
                product_id: spec.product_id,
                product_name: name,
                quantity: spec.quantity,
                total_price,
            });
        }
        diesel::insert_into(order_lines::table)
            .values(&new_rows)
            .execute(conn)?;

        to_view(order_row, views)
    }

    fn find_by_id_and_user(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OrderView>, DomainError> {
        let row = orders::table
            .filter(orders::id.eq(id))
            .filter(orders::user_id.eq(user_id))
            .select(OrderRow::as_select())
            .first(conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines = self.load_lines(conn, row.id)?;
        to_view(row, lines).map(Some)
    }

    fn find_by_user(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<OrderView>, DomainError> {
        let rows = orders::table
            .filter(orders::user_id.eq(user_id))
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load(conn)?;

        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = self.load_lines(conn, row.id)?;
            views.push(to_view(row, lines)?);
        }
        Ok(views)
    }

    fn update_status(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        status: OrderStatus,
        is_paid: bool,
    ) -> Result<OrderView, DomainError> {
        let row: OrderRow = diesel::update(orders::table.filter(orders::id.eq(id)))
            .set((
                orders::status.eq(status.as_str()),
                orders::is_paid.eq(is_paid),
                orders::updated_at.eq(diesel::dsl::now),
            ))
            .get_result(conn)?;

        let lines = self.load_lines(conn, row.id)?;
        to_view(row, lines)
    }

    fn delete(&self, conn: &mut PgConnection, id: Uuid) -> Result<bool, DomainError> {
        let deleted =
            diesel::delete(orders::table.filter(orders::id.eq(id))).execute(conn)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use uuid::Uuid;

    use super::DieselOrderRepository;
    use crate::domain::order::{NewOrderHeader, OrderLineSpec, OrderStatus};
    use crate::domain::ports::OrderRepository;
    use crate::test_support::{seed_address, seed_product, seed_user, setup_db};

    fn header(user_id: Uuid, address_id: Uuid) -> NewOrderHeader {
        NewOrderHeader {
            user_id,
            address_id,
            status: OrderStatus::Processed,
            is_paid: false,
        }
    }

    #[tokio::test]
    async fn create_freezes_the_discounted_total() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn");
        let repo = DieselOrderRepository;
        let user_id = seed_user(&mut conn, "buyer@example.com");
        let address_id = seed_address(&mut conn, user_id);
        let product_id = seed_product(&mut conn, "Headphones", "10", 10, Some(10));

        let order = repo
            .create(
                &mut conn,
                &header(user_id, address_id),
                &[OrderLineSpec {
                    product_id,
                    quantity: 2,
                }],
            )
            .expect("create failed");

        assert_eq!(order.status, OrderStatus::Processed);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].quantity, 2);
        // 10 * 2 * (100 - 10)/100 = 18
        assert_eq!(order.lines[0].total_price, BigDecimal::from(18));
    }

    #[tokio::test]
    async fn missing_discount_means_full_price() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn");
        let repo = DieselOrderRepository;
        let user_id = seed_user(&mut conn, "fullprice@example.com");
        let address_id = seed_address(&mut conn, user_id);
        let product_id = seed_product(&mut conn, "Speaker", "25", 10, None);

        let order = repo
            .create(
                &mut conn,
                &header(user_id, address_id),
                &[OrderLineSpec {
                    product_id,
                    quantity: 3,
                }],
            )
            .expect("create failed");

        assert_eq!(order.lines[0].total_price, BigDecimal::from(75));
    }

    #[tokio::test]
    async fn lookup_is_scoped_to_the_owner() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn");
        let repo = DieselOrderRepository;
        let owner = seed_user(&mut conn, "owner@example.com");
        let stranger = seed_user(&mut conn, "stranger@example.com");
        let address_id = seed_address(&mut conn, owner);
        let product_id = seed_product(&mut conn, "Webcam", "40", 10, None);

        let order = repo
            .create(
                &mut conn,
                &header(owner, address_id),
                &[OrderLineSpec {
                    product_id,
                    quantity: 1,
                }],
            )
            .expect("create failed");

        assert!(repo
            .find_by_id_and_user(&mut conn, order.id, owner)
            .expect("find failed")
            .is_some());
        assert!(
            repo.find_by_id_and_user(&mut conn, order.id, stranger)
                .expect("find failed")
                .is_none(),
            "non-owners must see not-found"
        );
    }

    #[tokio::test]
    async fn update_status_persists_status_and_paid_flag() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn");
        let repo = DieselOrderRepository;
        let user_id = seed_user(&mut conn, "updater@example.com");
        let address_id = seed_address(&mut conn, user_id);
        let product_id = seed_product(&mut conn, "Router", "55", 10, None);

        let order = repo
            .create(
                &mut conn,
                &header(user_id, address_id),
                &[OrderLineSpec {
                    product_id,
                    quantity: 1,
                }],
            )
            .expect("create failed");

        let updated = repo
            .update_status(&mut conn, order.id, OrderStatus::OutForDelivery, true)
            .expect("update failed");

        assert_eq!(updated.status, OrderStatus::OutForDelivery);
        assert!(updated.is_paid);
        assert_eq!(updated.lines.len(), 1);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn");
        let repo = DieselOrderRepository;
        let user_id = seed_user(&mut conn, "deleter@example.com");
        let address_id = seed_address(&mut conn, user_id);
        let product_id = seed_product(&mut conn, "Switch", "30", 10, None);

        let order = repo
            .create(
                &mut conn,
                &header(user_id, address_id),
                &[OrderLineSpec {
                    product_id,
                    quantity: 1,
                }],
            )
            .expect("create failed");

        assert!(repo.delete(&mut conn, order.id).expect("delete failed"));
        assert!(!repo.delete(&mut conn, order.id).expect("delete failed"));
        assert!(repo
            .find_by_id_and_user(&mut conn, order.id, user_id)
            .expect("find failed")
            .is_none());
    }
}
