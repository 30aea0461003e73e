//! Logger module
//!
//! Provides logging utilities for the server:
//! - Startup banner and shutdown notice
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;

/// Width of the banner rule
const RULE_WIDTH: usize = 40;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write_info(message: &str) {
    println!("{message}");
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Lines of the startup banner for a server bound to `port`
pub fn banner_lines(title: &str, port: u16) -> Vec<String> {
    let rule = "=".repeat(RULE_WIDTH);
    vec![
        title.to_string(),
        rule.clone(),
        format!("Serving at http://localhost:{port}"),
        format!("Open http://localhost:{port}/index.html in your browser"),
        "Press Ctrl+C to stop".to_string(),
        rule,
    ]
}

/// Print the startup banner
///
/// The banner always goes to stdout, even when logs go to files.
pub fn log_server_start(addr: &SocketAddr, title: &str) {
    for line in banner_lines(title, addr.port()) {
        write_info(&line);
    }
}

pub fn log_root(root: &std::path::Path) {
    write_access(&format!("[INFO] Serving files from {}", root.display()));
}

pub fn log_shutdown_requested(signal: &str) {
    write_error(&format!("[SIGNAL] {signal} received, no longer accepting connections"));
}

pub fn log_shutdown() {
    write_info("\nServer stopped.");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve connection: {err}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
