//! `serve` subcommand — run the UDP controller until restart or shutdown.

use super::{Config, RUNNING, Result};
use stripd_lib::StripdError;
use stripd_lib::dispatch::Dispatcher;
use stripd_lib::driver::{self, DriverOptions};
use stripd_lib::listener::{ExitReason, Listener};
use stripd_lib::pixels::PixelBuffer;
use stripd_lib::signal::StatusFlasher;

pub(super) fn cmd_serve(config: &Config) -> Result<()> {
    if let Err(errors) = config.validate() {
        let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        return Err(StripdError::Config(msgs.join("; ")));
    }

    let store = config.settings_store();
    if !store.exists() {
        log::warn!(
            "[settings] {} not found, using defaults",
            store.path().display()
        );
    }
    let settings = store.load()?;
    log::info!(
        "[settings] {} pixels, brightness {} (from {})",
        settings.pixel_count,
        settings.brightness,
        store.path().display()
    );

    let driver = driver::allocate(
        DriverOptions {
            pixel_count: settings.pixel_count,
            brightness: settings.brightness,
            protocol: config.driver.clone(),
        },
        config.output_path().as_deref(),
    )?;

    let dispatcher = Dispatcher::new(
        PixelBuffer::new(settings.pixel_count, driver),
        store,
        StatusFlasher::new(config.flash_durations()),
    );
    let mut listener = Listener::new(dispatcher);
    listener.bind(config.bind_addr()?)?;

    match listener.run(&RUNNING)? {
        ExitReason::Restart => log::info!("restart() received, exiting for respawn"),
        ExitReason::Shutdown => log::info!("stopped"),
    }
    Ok(())
}
