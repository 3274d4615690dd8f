use uuid::Uuid;

/// One (product, quantity) pairing inside a user's cart, joined with the
/// product name so stock failures can name the offending product.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
}

/// A user's cart. At most one exists per user; it is created lazily on the
/// first line write and survives a drain with zero lines.
#[derive(Debug, Clone)]
pub struct CartView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lines: Vec<CartLineView>,
}
