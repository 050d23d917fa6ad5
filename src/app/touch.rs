use embassy_time::{Duration, Ticker};
use esp_hal::{gpio::Input, i2c::master::I2c, Blocking};
use log::{info, warn};
use tdeck_touch::{
    platform::{EmbassyClock, HalRegisterBus},
    touch::config::TOUCH_POLL_INTERVAL_MS,
    TouchDriver,
};

use super::config::GESTURES;

pub(crate) type TouchBus = HalRegisterBus<I2c<'static, Blocking>>;
pub(crate) type TouchInput = TouchDriver<TouchBus, EmbassyClock, Input<'static>>;

pub(crate) fn log_controller_identity(driver: &mut TouchInput) {
    match driver.product_id() {
        Ok(id) => info!(
            "touch: ready addr=0x{:02x} product={}{}{}",
            driver.address(),
            id[0] as char,
            id[1] as char,
            id[2] as char
        ),
        Err(_) => warn!(
            "touch: product id read failed addr=0x{:02x}",
            driver.address()
        ),
    }
}

#[embassy_executor::task]
pub(crate) async fn touch_poll_task(mut driver: TouchInput) {
    let mut ticker = Ticker::every(Duration::from_millis(TOUCH_POLL_INTERVAL_MS));

    loop {
        ticker.next().await;
        let gesture = driver.read();
        if gesture.is_none() {
            continue;
        }
        // Keep the poll cadence; a stalled consumer loses gestures, not timing.
        if GESTURES.try_send(gesture).is_err() {
            warn!("touch: gesture queue full, dropped {}", gesture.kind_label());
        }
    }
}
