use std::env;

use color_eyre::owo_colors::OwoColorize;
use pyfind_core::CommandStatus;

pub struct Style {
    enabled: bool,
}

impl Style {
    pub fn new(force_no_color: bool, is_tty: bool) -> Self {
        let env_no_color = env::var_os("NO_COLOR").is_some();
        Self {
            enabled: !(force_no_color || env_no_color) && is_tty,
        }
    }

    pub fn status(&self, status: &CommandStatus, text: &str) -> String {
        let (symbol, tone) = match status {
            CommandStatus::Ok => ("✔", Tone::Green),
            CommandStatus::UserError => ("✗", Tone::Yellow),
            CommandStatus::Failure => ("✖", Tone::Red),
        };
        self.paint(&format!("{symbol} {text}"), tone)
    }

    pub fn hint(&self, text: &str) -> String {
        self.paint(&format!("Hint: {text}"), Tone::Cyan)
    }

    /// Candidate rows are dimmed unless they were selected.
    pub fn candidate(&self, line: &str) -> String {
        if !self.enabled {
            return line.to_string();
        }
        if line.ends_with("selected") || line.contains("selected (") {
            line.green().bold().to_string()
        } else {
            line.dimmed().to_string()
        }
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.enabled {
            return text.to_string();
        }
        match tone {
            Tone::Green => text.green().bold().to_string(),
            Tone::Yellow => text.yellow().bold().to_string(),
            Tone::Red => text.red().bold().to_string(),
            Tone::Cyan => text.cyan().to_string(),
        }
    }
}

enum Tone {
    Green,
    Yellow,
    Red,
    Cyan,
}
