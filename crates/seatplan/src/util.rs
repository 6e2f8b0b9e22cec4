use std::fs;
use std::io::IsTerminal;
use std::path::Path;

use chrono::{Local, NaiveDate};
use tracing_subscriber::EnvFilter;

use crate::error::Result;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "SEATPLAN_LOG";

/// Install the stderr log subscriber. Filter directives come from
/// [`LOG_ENV`] and default to `warn`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}

#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

pub fn write_string(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Print the outcome of a command, as a JSON line when `json` is set.
pub fn emit(json: bool, command: &str, message: &str) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "command": command,
                "message": message,
            })
        );
    } else {
        println!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_string_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out/print/chart.html");
        write_string(&path, "<html></html>").expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "<html></html>");
    }

    #[test]
    fn write_string_replaces_existing_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("chart.html");
        write_string(&path, "first").expect("write");
        write_string(&path, "x").expect("rewrite");
        assert_eq!(fs::read_to_string(&path).expect("read"), "x");
    }
}
