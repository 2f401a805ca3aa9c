//! `config` subcommand — show daemon configuration and strip settings, or
//! write a default config file with `--init`.

use std::path::Path;

use super::{Config, ConfigOutput, Result, kv, kv_indent, kv_width, load_config, print_json};
use stripd_lib::StripdError;
use stripd_lib::color::format_color;

pub(super) fn cmd_config_init(custom_path: Option<&Path>) -> Result<()> {
    let Some(path) = custom_path.map(|p| p.to_path_buf()).or_else(Config::path) else {
        return Err(StripdError::Config(
            "no config directory; pass --config <path>".into(),
        ));
    };
    if path.exists() {
        return Err(StripdError::Config(format!(
            "{} already exists",
            path.display()
        )));
    }
    Config::default().save_to(&path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

pub(super) fn cmd_config(json: bool, custom_path: Option<&Path>) -> Result<()> {
    let config = load_config(custom_path);
    let config_path = custom_path.map(|p| p.to_path_buf()).or_else(Config::path);
    let config_exists = config_path.as_ref().is_some_and(|p| p.exists());

    let store = config.settings_store();
    let settings_exists = store.exists();
    let (settings, settings_error) = match store.load() {
        Ok(s) => (Some(s), None),
        Err(e) => (None, Some(e.to_string())),
    };

    if json {
        let output = ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            settings_file: store.path().display().to_string(),
            settings_file_exists: settings_exists,
            daemon: config,
            settings,
            settings_error,
        };
        return print_json(&output);
    }

    // Human-readable output
    let w = kv_width(
        &["Config file:", "Settings file:"],
        &[
            "bind:",
            "output:",
            "ready_flash_ms:",
            "error_flash_ms:",
            "driver:",
            "brightness:",
            "pixel_count:",
        ],
    );

    match &config_path {
        Some(p) if config_exists => kv("Config file:", format_args!("{} (loaded)", p.display()), w),
        Some(p) => kv(
            "Config file:",
            format_args!("{} (not found, using defaults)", p.display()),
            w,
        ),
        None => kv("Config file:", "(no config directory)", w),
    }
    println!();

    println!("Daemon:");
    kv_indent("bind:", &config.bind, w);
    let output = match config.output_path() {
        Some(p) => p.display().to_string(),
        None => "(log only)".to_string(),
    };
    kv_indent("output:", output, w);
    kv_indent("ready_flash_ms:", config.ready_flash_ms, w);
    kv_indent("error_flash_ms:", config.error_flash_ms, w);
    let d = &config.driver;
    kv_indent(
        "driver:",
        format_args!(
            "{:?} on GPIO {}, DMA {}, {} Hz{}",
            d.strip_type,
            d.gpio,
            d.dma,
            d.frequency,
            if d.invert { ", inverted" } else { "" }
        ),
        w,
    );
    println!();

    let status = if settings_exists {
        "present"
    } else {
        "not found, using defaults"
    };
    kv(
        "Settings file:",
        format_args!("{} ({status})", store.path().display()),
        w,
    );
    match (&settings, &settings_error) {
        (Some(s), _) => {
            kv_indent("brightness:", s.brightness, w);
            kv_indent("pixel_count:", s.pixel_count, w);
            kv_indent(
                "status flash:",
                format_args!(
                    "{} ready / {} error on slot 0",
                    format_color(stripd_lib::color::GREEN),
                    format_color(stripd_lib::color::RED)
                ),
                w,
            );
        }
        (None, Some(e)) => kv_indent("error:", e, w),
        (None, None) => {}
    }
    Ok(())
}
