pub mod code_generator;
pub mod jwt;

pub use code_generator::{PIN_CODE_LENGTH, generate_pin_code, mask_pin_code, normalize_pin_code};
pub use jwt::*;
