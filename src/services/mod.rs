pub mod exchange_rate_service;
pub mod pin_service;
pub mod redemption_targets;
pub mod wallet_service;

pub use exchange_rate_service::*;
pub use pin_service::*;
pub use redemption_targets::*;
pub use wallet_service::*;
