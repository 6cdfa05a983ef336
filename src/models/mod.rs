pub mod common;
pub mod exchange_rate;
pub mod pagination;
pub mod wallet;
pub mod wallet_pin;

pub use common::*;
pub use exchange_rate::*;
pub use pagination::*;
pub use wallet::*;
pub use wallet_pin::*;
