//! Output formatting module for azprov
//!
//! Human output is colored text and tables; JSON mode prints one document per
//! command on stdout and keeps spinners and banners off.

use azprov::modules::{ModuleOutput, ModuleStatus};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;

/// Output formatter for different output modes
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// JSON output mode
    json_mode: bool,
    /// Verbosity level
    verbosity: u8,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, json_mode: bool, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();
        if !use_color {
            colored::control::set_override(false);
        }

        Self {
            use_color,
            json_mode,
            verbosity,
        }
    }

    pub fn is_json(&self) -> bool {
        self.json_mode
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        if self.json_mode {
            return;
        }

        if self.use_color {
            println!("\n{}", title.cyan().bold());
            println!("{}", "-".repeat(title.len()).cyan());
        } else {
            println!("\n{}", title);
            println!("{}", "-".repeat(title.len()));
        }
    }

    /// Print a task header
    pub fn task_header(&self, task_name: &str) {
        if self.json_mode {
            return;
        }

        let header = format!("TASK [{}]", task_name);
        let stars = "*".repeat(72_usize.saturating_sub(header.len()));

        if self.use_color {
            println!(
                "\n{} {}",
                header.bright_white().bold(),
                stars.bright_black()
            );
        } else {
            println!("\n{} {}", header, stars);
        }
    }

    /// Print a module result line
    pub fn module_result(&self, output: &ModuleOutput) {
        if self.json_mode {
            return;
        }

        let status = output.status.to_string();
        let status = if self.use_color {
            match output.status {
                ModuleStatus::Ok => status.green().to_string(),
                ModuleStatus::Changed => status.yellow().to_string(),
                ModuleStatus::Failed => status.red().bold().to_string(),
            }
        } else {
            status
        };
        println!("{}: {}", status, output.msg);

        if self.verbosity >= 1 {
            let mut keys: Vec<&String> = output.data.keys().collect();
            keys.sort();
            for key in keys {
                let value = serde_json::to_string(&output.data[key]).unwrap_or_default();
                if self.use_color {
                    println!("    {}: {}", key.bright_black(), value);
                } else {
                    println!("    {}: {}", key, value);
                }
            }
        }
    }

    /// Print a recap line
    pub fn recap(&self, ok: usize, changed: usize, failed: usize) {
        if self.json_mode {
            return;
        }

        let header = "RECAP";
        let stars = "*".repeat(72 - header.len());
        let line = format!("ok={:<4} changed={:<4} failed={:<4}", ok, changed, failed);

        if self.use_color {
            println!("\n{} {}", header.bright_white().bold(), stars.bright_black());
            if failed > 0 {
                println!("{}", line.red());
            } else if changed > 0 {
                println!("{}", line.yellow());
            } else {
                println!("{}", line.green());
            }
        } else {
            println!("\n{} {}", header, stars);
            println!("{}", line);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.json_mode {
            let err = serde_json::json!({
                "type": "error",
                "message": message
            });
            eprintln!("{}", err);
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "ERROR:".red().bold(), message);
        } else {
            eprintln!("ERROR: {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.json_mode {
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "WARNING:".yellow().bold(), message);
        } else {
            eprintln!("WARNING: {}", message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.json_mode {
            return;
        }

        if self.use_color {
            println!("{} {}", "OK:".green().bold(), message);
        } else {
            println!("OK: {}", message);
        }
    }

    /// Print an informational message (only with -v)
    pub fn info(&self, message: &str) {
        if self.verbosity < 1 || self.json_mode {
            return;
        }

        if self.use_color {
            println!("{} {}", "INFO:".blue(), message);
        } else {
            println!("INFO: {}", message);
        }
    }

    /// Print a value as pretty JSON on stdout
    pub fn json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let text = serde_json::to_string_pretty(value)?;
        println!("{}", text);
        Ok(())
    }

    /// Create a spinner for indeterminate progress
    pub fn create_spinner(&self, message: &str) -> Option<ProgressBar> {
        if self.json_mode {
            return None;
        }

        let sp = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            sp.set_style(style);
        }
        sp.set_message(message.to_string());
        sp.enable_steady_tick(Duration::from_millis(100));

        Some(sp)
    }

    /// Print a table
    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        if self.json_mode {
            return;
        }

        // Calculate column widths
        let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.len());
                }
            }
        }

        let header_line = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" | ");

        if self.use_color {
            println!("{}", header_line.bright_white().bold());
        } else {
            println!("{}", header_line);
        }

        let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        if self.use_color {
            println!("{}", sep.join("-+-").bright_black());
        } else {
            println!("{}", sep.join("-+-"));
        }

        for row in rows {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join(" | ");
            println!("{}", line.trim_end());
        }
    }

    /// Flush stdout
    pub fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_mode_has_no_spinner() {
        let formatter = OutputFormatter::new(false, true, 0);
        assert!(formatter.create_spinner("working").is_none());
        assert!(formatter.is_json());
    }

    #[test]
    fn test_human_mode_spinner() {
        let formatter = OutputFormatter::new(false, false, 0);
        let spinner = formatter.create_spinner("working").unwrap();
        spinner.finish_and_clear();
    }
}
