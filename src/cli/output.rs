//! Colored terminal output for reports and walkthrough summaries
//!
//! `colored` honors NO_COLOR, CLICOLOR and CLICOLOR_FORCE on its own.

use colored::Colorize;

/// Error line on stderr, red bold "error:" prefix
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Warning line on stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// A passing file or a reached solution
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// A file that failed validation or could not be read
pub fn failure(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✗".red(), msg);
}

/// One defect, listed under its file
pub fn defect(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("    {} {}", "-".red(), msg);
}

/// One lint warning, listed under its file
pub fn lint(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("    {} {}", "!".yellow(), msg);
}

pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Uncolored data: JSON reports, rendered trees, TOML
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}
