use rand::Rng;

pub const PIN_CODE_LENGTH: usize = 6;
const PIN_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 生成 6 位大写字母数字 PIN 码（唯一性由调用方对照数据库保证）
pub fn generate_pin_code() -> String {
    let mut rng = rand::thread_rng();
    (0..PIN_CODE_LENGTH)
        .map(|_| PIN_CODE_CHARSET[rng.gen_range(0..PIN_CODE_CHARSET.len())] as char)
        .collect()
}

/// 用户输入的 PIN 码不区分大小写
pub fn normalize_pin_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// 只保留前两位，其余打码
pub fn mask_pin_code(code: &str) -> String {
    let prefix: String = code.chars().take(2).collect();
    format!("{prefix}****")
}
