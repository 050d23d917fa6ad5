mod config;
mod launcher;
mod touch;

use embedded_hal::delay::DelayNs;
use esp_hal::{
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    i2c::master::{Config as I2cConfig, I2c},
    time::Rate,
    timer::timg::TimerGroup,
};
use log::{info, warn};
use tdeck_touch::{
    platform::{EmbassyClock, HalRegisterBus, NoPin},
    touch::{active_config, TouchLines},
    TouchDriver,
};

use self::config::{I2C_FREQ_KHZ, LOG_LEVEL, PERIPHERAL_POWER_SETTLE_MS};

pub(crate) fn run() -> ! {
    esp_println::logger::init_logger(LOG_LEVEL);

    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let mut delay = Delay::new();
    // Held high for the lifetime of the firmware; `run` never returns.
    let _peripheral_power = Output::new(peripherals.GPIO10, Level::High, OutputConfig::default());
    delay.delay_ms(PERIPHERAL_POWER_SETTLE_MS);

    let i2c_cfg = I2cConfig::default().with_frequency(Rate::from_khz(I2C_FREQ_KHZ));
    let i2c = match I2c::new(peripherals.I2C0, i2c_cfg) {
        Ok(i2c) => i2c
            .with_sda(peripherals.GPIO18)
            .with_scl(peripherals.GPIO8),
        Err(_) => {
            warn!("touch: I2C0 config rejected");
            halt_forever();
        }
    };
    let touch_irq = Input::new(
        peripherals.GPIO16,
        InputConfig::default().with_pull(Pull::Up),
    );

    let lines = TouchLines {
        interrupt: Some(touch_irq),
        reset: None::<NoPin>,
    };
    let mut driver = match TouchDriver::with_lines(
        HalRegisterBus::new(i2c),
        EmbassyClock,
        *active_config(),
        lines,
        &mut delay,
    ) {
        Ok(driver) => driver,
        Err(_) => halt_forever(),
    };
    touch::log_controller_identity(&mut driver);
    info!("app: starting tasks");

    let mut executor = esp_rtos::embassy::Executor::new();
    let executor = unsafe { make_static(&mut executor) };
    executor.run(move |spawner| {
        spawner.must_spawn(touch::touch_poll_task(driver));
        spawner.must_spawn(launcher::launcher_task());
    });
}

unsafe fn make_static<T>(value: &mut T) -> &'static mut T {
    unsafe { core::mem::transmute(value) }
}

fn halt_forever() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
