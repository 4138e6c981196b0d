//! Terminal user interface components for rulekeeper
//!
//! - Status icons and rule lines
//! - Diff rendering
//! - Spinners
//! - Message helpers shared by every command

pub mod diffviewer;
pub mod icons;
pub mod progress;

pub use diffviewer::DiffViewer;
pub use icons::{Icons, StatusIcon, rule_line};
pub use progress::create_spinner;

use owo_colors::OwoColorize;

/// Print a success line
pub fn success(message: &str) {
    println!("{} {}", StatusIcon::Success.colored(), message.green());
}

/// Print a warning line
pub fn warn(message: &str) {
    println!("{} {}", StatusIcon::Warning.colored(), message.yellow());
}

/// Print an error line without aborting
pub fn error(message: &str) {
    println!("{} {}", StatusIcon::Error.colored(), message.red());
}

/// Print an informational line
pub fn info(message: &str) {
    println!("{} {message}", StatusIcon::Info.colored());
}

/// Print a bold section header surrounded by blank lines
pub fn header(text: &str) {
    println!();
    println!("{}", text.bold());
    println!();
}

/// Format a shell command for display
pub fn command(cmd: &str) -> String {
    format!("`{cmd}`").cyan().to_string()
}

/// `1 rule` / `2 rules`
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "rule"), "1 rule");
        assert_eq!(plural(0, "rule"), "0 rules");
        assert_eq!(plural(3, "issue"), "3 issues");
    }
}
