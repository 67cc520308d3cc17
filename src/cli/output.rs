//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print label/value pair (green label, indented)
pub fn field(label: &str, value: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}: {}", label.green(), value);
}

/// Print one listed node, indented by `level`; unlinked nodes are dimmed
pub fn node_line(level: usize, label: &str, linked: bool, distance: Option<usize>) {
    let indent = "  ".repeat(level);
    let label = if linked {
        label.normal()
    } else {
        label.dimmed()
    };
    match distance {
        Some(d) => println!("{}{} {}", indent, label, format!("[{d}]").yellow()),
        None => println!("{}{}", indent, label),
    }
}

/// Print plain output (no color, for data/JSON)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}
