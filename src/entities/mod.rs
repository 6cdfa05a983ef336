pub mod exchange_rates;
pub mod orders;
pub mod registrations;
pub mod wallet_pins;
pub mod wallet_transactions;
pub mod wallets;

pub use exchange_rates as exchange_rate_entity;
pub use orders as order_entity;
pub use registrations as registration_entity;
pub use wallet_pins as wallet_pin_entity;
pub use wallet_transactions as wallet_transaction_entity;
pub use wallets as wallet_entity;

pub use wallet_pins::{PinStatus, RedemptionTarget};
pub use wallet_transactions::{ReferenceKind, TransactionType};
pub use wallets::OwnerType;
