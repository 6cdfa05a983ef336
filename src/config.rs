use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// 只校验外部用户服务签发的 access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// PIN 有效期（分钟）
    #[serde(default = "default_pin_ttl_minutes")]
    pub pin_ttl_minutes: i64,
    /// 过期扫描间隔（秒）
    #[serde(default = "default_pin_expiry_interval_secs")]
    pub pin_expiry_interval_secs: u64,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// 生成 PIN 码时碰撞重试上限
    #[serde(default = "default_pin_code_max_attempts")]
    pub pin_code_max_attempts: u32,
}

fn default_pin_ttl_minutes() -> i64 {
    15
}

fn default_pin_expiry_interval_secs() -> u64 {
    60
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_pin_code_max_attempts() -> u32 {
    10
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            pin_ttl_minutes: default_pin_ttl_minutes(),
            pin_expiry_interval_secs: default_pin_expiry_interval_secs(),
            default_currency: default_currency(),
            pin_code_max_attempts: default_pin_code_max_attempts(),
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("解析配置文件失败: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                    },
                    wallet: WalletConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("无法读取配置文件 {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 环境变量覆盖（即便文件存在时也覆盖）
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.access_token_expires_in = n;
        }

        // Wallet
        if let Ok(v) = env::var("WALLET_PIN_TTL_MINUTES")
            && let Ok(n) = v.parse()
        {
            self.wallet.pin_ttl_minutes = n;
        }
        if let Ok(v) = env::var("WALLET_PIN_EXPIRY_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            self.wallet.pin_expiry_interval_secs = n;
        }
        if let Ok(v) = env::var("WALLET_DEFAULT_CURRENCY") {
            self.wallet.default_currency = v.to_uppercase();
        }
        if let Ok(v) = env::var("WALLET_PIN_CODE_MAX_ATTEMPTS")
            && let Ok(n) = v.parse()
        {
            self.wallet.pin_code_max_attempts = n;
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.wallet.pin_ttl_minutes <= 0 {
            return Err("wallet.pin_ttl_minutes 必须大于 0".to_string());
        }
        if self.wallet.pin_expiry_interval_secs == 0 {
            return Err("wallet.pin_expiry_interval_secs 必须大于 0".to_string());
        }
        if self.wallet.pin_code_max_attempts == 0 {
            return Err("wallet.pin_code_max_attempts 必须大于 0".to_string());
        }
        if self.wallet.default_currency.len() != 3 {
            return Err("wallet.default_currency 必须是 3 位币种代码".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_section_is_optional() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [database]
            url = "postgres://localhost/wallet"
            max_connections = 5

            [jwt]
            secret = "secret"
            access_token_expires_in = 3600
            "#,
        )
        .unwrap();

        assert_eq!(config.wallet.pin_ttl_minutes, 15);
        assert_eq!(config.wallet.pin_expiry_interval_secs, 60);
        assert_eq!(config.wallet.default_currency, "USD");
        assert_eq!(config.wallet.pin_code_max_attempts, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_wallet_section_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [database]
            url = "postgres://localhost/wallet"
            max_connections = 5

            [jwt]
            secret = "secret"
            access_token_expires_in = 3600

            [wallet]
            pin_ttl_minutes = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.wallet.pin_expiry_interval_secs, 60);
        assert!(config.validate().is_err());
    }
}
