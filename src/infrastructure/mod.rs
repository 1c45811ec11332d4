pub mod binance;
pub mod core;
pub mod mock;
pub mod observability;
pub mod persistence;
pub mod repositories;

pub use binance::BinanceMarketDataService;
pub use mock::MockMarketDataService;
pub use persistence::JsonModelRepository;
pub use repositories::InMemoryModelRepository;
