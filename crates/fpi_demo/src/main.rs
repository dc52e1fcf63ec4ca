//! Frame loop over the device layer: pull a snapshot, react to it, push outputs.
//!
//! Usage: `fpi_demo [config.json]`. Escape quits, the triggers drive the rumble
//! motors and stick deflection is logged.

use std::path::Path;
use std::process::ExitCode;

use fpi_core::{load_config_from_path, Device, DeviceConfig, Key};

fn load_config() -> Result<DeviceConfig, String> {
    match std::env::args().nth(1) {
        Some(path) => load_config_from_path(Path::new(&path)).map_err(|e| e.to_string()),
        None => {
            let mut config = DeviceConfig::default();
            config.window.size = [960, 540];
            Ok(config)
        }
    }
}

fn report(device: &Device) {
    let stick = &device.gamepad().left_thumb_stick;
    if stick.x != 0.0 {
        log::info!("Left stick x: {}", stick.x);
    }
    if stick.y != 0.0 {
        log::info!("Left stick y: {}", stick.y);
    }
    let stick = &device.gamepad().right_thumb_stick;
    if stick.x != 0.0 {
        log::info!("Right stick x: {}", stick.x);
    }
    if stick.y != 0.0 {
        log::info!("Right stick y: {}", stick.y);
    }
    if device.window().resized {
        log::info!(
            "Window resized to {}x{}",
            device.window().size.x,
            device.window().size.y
        );
    }
    if let Some(text) = device.text() {
        log::info!("Text: {text:?}");
    }
    if device.in_modal_loop() {
        log::debug!("Frame cut short by modal loop");
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("FPI demo starting...");

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };
    let backends = match fpi_platform::desktop_backends() {
        Ok(backends) => backends,
        Err(e) => {
            log::error!("Failed to create platform backends: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut device = Device::new(config, backends);
    if device.initialize().is_err() {
        device.exit_with_error();
    }
    if let Some(warning) = device.warning() {
        log::warn!("{warning}");
    }

    while device.pull() {
        if device.keyboard().is_pressed(Key::ESCAPE) {
            device.request_quit();
        }
        report(&device);

        let gamepad = device.gamepad();
        let (left, right) = (gamepad.left_trigger.value, gamepad.right_trigger.value);
        device.set_motor_speeds(left, right);

        device.push();
    }

    log::info!("Ran for {:.2}s", device.time().seconds);
    ExitCode::SUCCESS
}
