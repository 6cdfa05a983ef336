pub mod exchange_rate;
pub mod wallet;
pub mod wallet_pin;

pub use exchange_rate::exchange_rate_config;
pub use wallet::wallet_config;
