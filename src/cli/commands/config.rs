use anyhow::Result;

use crate::chat::ui;
use crate::config::{ConfigManager, Configuration};
use crate::ui::Style;

/// Shows, resets or locates the saved generation configuration.
pub fn run_config(reset: bool, path: bool) -> Result<()> {
    run_config_with(&ConfigManager::new(), reset, path)
}

fn run_config_with(store: &ConfigManager, reset: bool, path: bool) -> Result<()> {
    if path {
        println!("{}", store.config_path().display());
        return Ok(());
    }

    if reset {
        store.save(&Configuration::default())?;
        ui::print_saved_config(store.config_path());
        return Ok(());
    }

    let config = store.load_merged(&Configuration::default())?;
    ui::print_config(&config);
    if store.config_path().exists() {
        crate::status!(
            "{} {}",
            Style::label("Loaded from:"),
            Style::value(store.config_path().display())
        );
    } else {
        crate::status!("{}", Style::secondary("Nothing saved yet, showing defaults."));
    }
    Ok(())
}
