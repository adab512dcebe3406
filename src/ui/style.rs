//! Consistent styling for console output.
//!
//! Colors come from owo-colors and are dropped entirely when the output
//! configuration disables them.

use owo_colors::OwoColorize;
use std::fmt::Display;

use crate::output;

fn paint<T: Display, S: Display>(text: T, styled: impl FnOnce(&T) -> S) -> String {
    if output::is_no_color() {
        text.to_string()
    } else {
        styled(&text).to_string()
    }
}

/// Styles for different semantic elements.
pub struct Style;

impl Style {
    /// Section headers ("Configuration", "Available commands").
    pub fn header<T: Display>(text: T) -> String {
        paint(text, |t| t.bold().to_string())
    }

    /// Keys in key/value listings.
    pub fn label<T: Display>(text: T) -> String {
        paint(text, |t| t.dimmed().to_string())
    }

    /// Configuration values, paths, model names.
    pub fn value<T: Display>(text: T) -> String {
        paint(text, |t| t.cyan().to_string())
    }

    /// Descriptions and timestamps.
    pub fn secondary<T: Display>(text: T) -> String {
        paint(text, |t| t.dimmed().to_string())
    }

    pub fn success<T: Display>(text: T) -> String {
        paint(text, |t| t.green().to_string())
    }

    pub fn error<T: Display>(text: T) -> String {
        paint(text, |t| t.red().bold().to_string())
    }

    pub fn warning<T: Display>(text: T) -> String {
        paint(text, |t| t.yellow().to_string())
    }

    /// Slash commands in help output.
    pub fn command<T: Display>(text: T) -> String {
        paint(text, |t| t.green().to_string())
    }

    /// The "You" label in history listings.
    pub fn user<T: Display>(text: T) -> String {
        paint(text, |t| t.blue().bold().to_string())
    }

    /// The "AI" label in history listings and before replies.
    pub fn assistant<T: Display>(text: T) -> String {
        paint(text, |t| t.magenta().bold().to_string())
    }

    pub fn hint<T: Display>(text: T) -> String {
        paint(text, |t| t.dimmed().italic().to_string())
    }

    pub fn version<T: Display>(text: T) -> String {
        paint(text, |t| t.dimmed().to_string())
    }
}
