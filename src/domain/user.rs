use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// A saved shipping address. Orders reference an address by id rather than
/// snapshotting its fields, so edits to a saved address are visible on
/// historical orders.
#[derive(Debug, Clone)]
pub struct AddressView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub street: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
}
