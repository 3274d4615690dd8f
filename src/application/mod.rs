pub mod order_service;

use crate::infrastructure::cart_store::DieselCartStore;
use crate::infrastructure::directory::{DieselAddressDirectory, DieselUserDirectory};
use crate::infrastructure::inventory::DieselInventoryLedger;
use crate::infrastructure::notifier::LogNotifier;
use crate::infrastructure::order_repo::DieselOrderRepository;

pub use order_service::OrderService;

/// The production wiring: Diesel-backed stores plus the log notifier.
pub type AppOrderService = OrderService<
    DieselCartStore,
    DieselInventoryLedger,
    DieselAddressDirectory,
    DieselUserDirectory,
    DieselOrderRepository,
    LogNotifier,
>;

impl AppOrderService {
    pub fn with_defaults(pool: crate::db::DbPool) -> Self {
        OrderService::new(
            pool,
            DieselCartStore,
            DieselInventoryLedger,
            DieselAddressDirectory,
            DieselUserDirectory,
            DieselOrderRepository,
            LogNotifier,
        )
    }
}
