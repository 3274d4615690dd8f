use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{AddressDirectory, UserDirectory};
use crate::domain::user::{AddressView, UserView};
use crate::schema::{addresses, users};

use super::models::{AddressRow, UserRow};

#[derive(Debug, Clone, Copy, Default)]
pub struct DieselAddressDirectory;

fn to_view(row: AddressRow) -> AddressView {
    AddressView {
        id: row.id,
        user_id: row.user_id,
        street: row.street,
        city: row.city,
        country: row.country,
        postal_code: row.postal_code,
    }
}

impl AddressDirectory for DieselAddressDirectory {
    fn find_by_id_and_user(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<AddressView>, DomainError> {
        let row = addresses::table
            .filter(addresses::id.eq(id))
            .filter(addresses::user_id.eq(user_id))
            .select(AddressRow::as_select())
            .first(conn)
            .optional()?;
        Ok(row.map(to_view))
    }

    fn list_by_user(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<AddressView>, DomainError> {
        let rows = addresses::table
            .filter(addresses::user_id.eq(user_id))
            .order(addresses::created_at.asc())
            .select(AddressRow::as_select())
            .load(conn)?;
        Ok(rows.into_iter().map(to_view).collect())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DieselUserDirectory;

impl UserDirectory for DieselUserDirectory {
    fn find_by_id(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<UserView>, DomainError> {
        let row = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(conn)
            .optional()?;
        Ok(row.map(|u| UserView {
            id: u.id,
            email: u.email,
            name: u.name,
        }))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{DieselAddressDirectory, DieselUserDirectory};
    use crate::domain::ports::{AddressDirectory, UserDirectory};
    use crate::test_support::{seed_address, seed_user, setup_db};

    #[tokio::test]
    async fn address_lookup_is_scoped_to_its_owner() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn");
        let owner = seed_user(&mut conn, "owner@example.com");
        let other = seed_user(&mut conn, "other@example.com");
        let address_id = seed_address(&mut conn, owner);

        let found = DieselAddressDirectory
            .find_by_id_and_user(&mut conn, address_id, owner)
            .expect("lookup failed");
        assert!(found.is_some());

        let hidden = DieselAddressDirectory
            .find_by_id_and_user(&mut conn, address_id, other)
            .expect("lookup failed");
        assert!(hidden.is_none(), "another user's address must not resolve");
    }

    #[tokio::test]
    async fn list_returns_addresses_in_creation_order() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn");
        let user_id = seed_user(&mut conn, "lister@example.com");
        let first = seed_address(&mut conn, user_id);
        let second = seed_address(&mut conn, user_id);

        let listed = DieselAddressDirectory
            .list_by_user(&mut conn, user_id)
            .expect("list failed");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first);
        assert_eq!(listed[1].id, second);
    }

    #[tokio::test]
    async fn unknown_user_resolves_to_none() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn");

        let user = DieselUserDirectory
            .find_by_id(&mut conn, Uuid::new_v4())
            .expect("lookup failed");
        assert!(user.is_none());
    }
}
