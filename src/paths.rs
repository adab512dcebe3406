//! XDG-style path utilities.
//!
//! The configuration directory follows XDG Base Directory conventions on
//! every platform rather than the OS-specific location.

use std::path::PathBuf;

const APP_DIR: &str = "llama-chat";

/// Returns the configuration directory.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/llama-chat` if `XDG_CONFIG_HOME` is set
/// 2. `~/.config/llama-chat` otherwise
/// 3. `./.llama-chat` if the home directory cannot be determined
pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME").map_or_else(
        |_| {
            dirs::home_dir().map_or_else(
                || PathBuf::from(format!(".{APP_DIR}")),
                |home| home.join(".config").join(APP_DIR),
            )
        },
        |xdg| PathBuf::from(xdg).join(APP_DIR),
    )
}
