//! Background scheduled tasks for the application.
//!
//! Call `spawn_all` once during startup to launch them.

use crate::config::WalletConfig;
use crate::services::PinService;

/// Spawn all background tasks.
///
/// The PIN expiry sweep is idempotent; running it on several instances at once is safe
/// because each PIN is expired under its own row lock.
pub fn spawn_all(pin_service: PinService, wallet_config: &WalletConfig) {
    // PIN 过期扫描（默认每分钟）
    {
        let svc = pin_service.clone();
        let interval = std::time::Duration::from_secs(wallet_config.pin_expiry_interval_secs);
        tokio::spawn(async move {
            loop {
                match svc.expire_stale_pins().await {
                    Ok(n) if n > 0 => log::info!("Expired wallet PINs processed: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to expire wallet PINs: {e:?}"),
                }
                tokio::time::sleep(interval).await;
            }
        });
    }
}
