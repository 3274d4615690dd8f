use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::cart::{CartLineView, CartView};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartStore;
use crate::schema::{cart_lines, carts, products};

use super::models::{NewCartLineRow, NewCartRow};

#[derive(Debug, Clone, Copy, Default)]
pub struct DieselCartStore;

impl DieselCartStore {
    fn load_lines(
        &self,
        conn: &mut PgConnection,
        cart_id: Uuid,
    ) -> Result<Vec<CartLineView>, DomainError> {
        let rows: Vec<(Uuid, String, i32)> = cart_lines::table
            .inner_join(products::table)
            .filter(cart_lines::cart_id.eq(cart_id))
            .order(cart_lines::created_at.asc())
            .select((cart_lines::product_id, products::name, cart_lines::quantity))
            .load(conn)?;

        Ok(rows
            .into_iter()
            .map(|(product_id, product_name, quantity)| CartLineView {
                product_id,
                product_name,
                quantity,
            })
            .collect())
    }

    /// The cart row itself, created on first use. `carts.user_id` is UNIQUE,
    /// so a concurrent first write loses the race and falls back to the
    /// existing row via the conflict target.
    fn find_or_create_cart(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Uuid, DomainError> {
        if let Some(id) = carts::table
            .filter(carts::user_id.eq(user_id))
            .select(carts::id)
            .first::<Uuid>(conn)
            .optional()?
        {
            return Ok(id);
        }

        diesel::insert_into(carts::table)
            .values(&NewCartRow {
                id: Uuid::new_v4(),
                user_id,
            })
            .on_conflict(carts::user_id)
            .do_nothing()
            .execute(conn)?;

        let id = carts::table
            .filter(carts::user_id.eq(user_id))
            .select(carts::id)
            .first::<Uuid>(conn)?;
        Ok(id)
    }
}

impl CartStore for DieselCartStore {
    fn find_by_user(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Option<CartView>, DomainError> {
        let cart_id = carts::table
            .filter(carts::user_id.eq(user_id))
            .select(carts::id)
            .first::<Uuid>(conn)
            .optional()?;

        let Some(cart_id) = cart_id else {
            return Ok(None);
        };

        let lines = self.load_lines(conn, cart_id)?;
        Ok(Some(CartView {
            id: cart_id,
            user_id,
            lines,
        }))
    }

    fn set_line(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartView, DomainError> {
        if quantity < 1 {
            return Err(DomainError::BadRequest(
                "cart line quantity must be at least 1".to_string(),
            ));
        }

        let cart_id = self.find_or_create_cart(conn, user_id)?;

        diesel::insert_into(cart_lines::table)
            .values(&NewCartLineRow {
                id: Uuid::new_v4(),
                cart_id,
                product_id,
                quantity,
            })
            .on_conflict((cart_lines::cart_id, cart_lines::product_id))
            .do_update()
            .set(cart_lines::quantity.eq(quantity))
            .execute(conn)?;

        let lines = self.load_lines(conn, cart_id)?;
        Ok(CartView {
            id: cart_id,
            user_id,
            lines,
        })
    }

    fn remove_line(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), DomainError> {
        let cart_id = carts::table
            .filter(carts::user_id.eq(user_id))
            .select(carts::id)
            .first::<Uuid>(conn)
            .optional()?;

        if let Some(cart_id) = cart_id {
            diesel::delete(
                cart_lines::table
                    .filter(cart_lines::cart_id.eq(cart_id))
                    .filter(cart_lines::product_id.eq(product_id)),
            )
            .execute(conn)?;
        }
        Ok(())
    }

    fn drain(&self, conn: &mut PgConnection, cart_id: Uuid) -> Result<(), DomainError> {
        diesel::delete(cart_lines::table.filter(cart_lines::cart_id.eq(cart_id)))
            .execute(conn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use diesel::prelude::*;
    use uuid::Uuid;

    use super::DieselCartStore;
    use crate::domain::errors::DomainError;
    use crate::domain::ports::CartStore;
    use crate::schema::carts;
    use crate::test_support::{seed_product, seed_user, setup_db};

    #[tokio::test]
    async fn set_line_creates_the_cart_lazily() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn");
        let store = DieselCartStore;
        let user_id = seed_user(&mut conn, "lazy@example.com");
        let product_id = seed_product(&mut conn, "Desk", "120.00", 5, None);

        assert!(store
            .find_by_user(&mut conn, user_id)
            .expect("find failed")
            .is_none());

        let cart = store
            .set_line(&mut conn, user_id, product_id, 2)
            .expect("set_line failed");

        assert_eq!(cart.user_id, user_id);
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 2);
        assert_eq!(cart.lines[0].product_name, "Desk");
    }

    #[tokio::test]
    async fn set_line_overwrites_the_quantity_for_an_existing_product() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn");
        let store = DieselCartStore;
        let user_id = seed_user(&mut conn, "repeat@example.com");
        let product_id = seed_product(&mut conn, "Lamp", "35.00", 5, None);

        store
            .set_line(&mut conn, user_id, product_id, 1)
            .expect("set_line failed");
        let cart = store
            .set_line(&mut conn, user_id, product_id, 3)
            .expect("set_line failed");

        assert_eq!(cart.lines.len(), 1, "same product must stay a single line");
        assert_eq!(cart.lines[0].quantity, 3);
    }

    #[tokio::test]
    async fn one_cart_per_user() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn");
        let store = DieselCartStore;
        let user_id = seed_user(&mut conn, "single@example.com");
        let a = seed_product(&mut conn, "Pen", "2.00", 10, None);
        let b = seed_product(&mut conn, "Notebook", "5.00", 10, None);

        let first = store
            .set_line(&mut conn, user_id, a, 1)
            .expect("set_line failed");
        let second = store
            .set_line(&mut conn, user_id, b, 1)
            .expect("set_line failed");

        assert_eq!(first.id, second.id);
        let cart_count: i64 = carts::table
            .filter(carts::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)
            .expect("count failed");
        assert_eq!(cart_count, 1);
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn");
        let store = DieselCartStore;
        let user_id = seed_user(&mut conn, "zero@example.com");
        let product_id = seed_product(&mut conn, "Cable", "9.00", 10, None);

        let err = store
            .set_line(&mut conn, user_id, product_id, 0)
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));
    }

    #[tokio::test]
    async fn remove_line_deletes_only_that_product() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn");
        let store = DieselCartStore;
        let user_id = seed_user(&mut conn, "remove@example.com");
        let a = seed_product(&mut conn, "Chair", "80.00", 10, None);
        let b = seed_product(&mut conn, "Table", "150.00", 10, None);

        store
            .set_line(&mut conn, user_id, a, 1)
            .expect("set_line failed");
        store
            .set_line(&mut conn, user_id, b, 2)
            .expect("set_line failed");
        store
            .remove_line(&mut conn, user_id, a)
            .expect("remove_line failed");

        let cart = store
            .find_by_user(&mut conn, user_id)
            .expect("find failed")
            .expect("cart should exist");
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].product_id, b);
    }

    #[tokio::test]
    async fn drain_empties_the_cart_but_keeps_it() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn");
        let store = DieselCartStore;
        let user_id = seed_user(&mut conn, "drain@example.com");
        let product_id = seed_product(&mut conn, "Shelf", "60.00", 10, None);

        let cart = store
            .set_line(&mut conn, user_id, product_id, 2)
            .expect("set_line failed");
        store.drain(&mut conn, cart.id).expect("drain failed");

        let drained = store
            .find_by_user(&mut conn, user_id)
            .expect("find failed")
            .expect("cart row must survive a drain");
        assert_eq!(drained.id, cart.id);
        assert!(drained.lines.is_empty());
    }

    #[tokio::test]
    async fn remove_line_without_a_cart_is_a_no_op() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn");
        let store = DieselCartStore;
        let user_id = seed_user(&mut conn, "nocart@example.com");

        store
            .remove_line(&mut conn, user_id, Uuid::new_v4())
            .expect("remove_line should not error");
    }
}
