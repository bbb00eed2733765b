use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::core::message::{Message, TranscriptRole};

/// Where diagnostic logs go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Stderr,
    /// Used while the terminal UI owns the screen.
    File(PathBuf),
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_directive` when set.
pub fn init_tracing(
    destination: LogDestination,
    default_directive: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let result = match destination {
        LogDestination::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
        LogDestination::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    result.map_err(|err| err.to_string().into())
}

/// Plain-text transcript of the chat, appended as turns complete.
pub struct LoggingState {
    file_path: Option<String>,
}

impl LoggingState {
    /// Fails when `log_file` cannot be opened for appending.
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        if let Some(path) = log_file.as_deref() {
            OpenOptions::new().create(true).append(true).open(path)?;
        }
        Ok(LoggingState {
            file_path: log_file,
        })
    }

    /// Append one transcript entry for the space named `space_name`.
    pub fn log_message(
        &self,
        space_name: &str,
        message: &Message,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = self.file_path.as_deref() else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        let prefix = match message.role {
            TranscriptRole::User => format!("You → {space_name}: "),
            TranscriptRole::Assistant => format!("{space_name}: "),
            TranscriptRole::AppError => format!("## {space_name}: "),
        };

        let mut lines = message.content.lines();
        writeln!(writer, "{prefix}{}", lines.next().unwrap_or_default())?;
        for line in lines {
            writeln!(writer, "{line}")?;
        }

        // Blank line between entries, as on screen
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn get_status_string(&self) -> String {
        match &self.file_path {
            None => "disabled".to_string(),
            Some(path) => format!(
                "active ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn disabled_logging_writes_nothing() {
        let logging = LoggingState::new(None).unwrap();
        assert_eq!(logging.get_status_string(), "disabled");
        logging
            .log_message("Al Mada", &Message::user("ignored"))
            .unwrap();
    }

    #[test]
    fn transcript_entries_are_appended() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("chat.log");
        let logging = LoggingState::new(Some(path.to_string_lossy().to_string())).unwrap();
        assert_eq!(logging.get_status_string(), "active (chat.log)");

        logging
            .log_message("Al Mada", &Message::user("What changed?"))
            .unwrap();
        logging
            .log_message("Al Mada", &Message::assistant("Two things.\nFirst, x."))
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "You → Al Mada: What changed?\n\nAl Mada: Two things.\nFirst, x.\n\n"
        );
    }

    #[test]
    fn errors_are_marked_in_the_transcript_log() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("chat.log");
        let logging = LoggingState::new(Some(path.to_string_lossy().to_string())).unwrap();

        logging
            .log_message("3F Pharma", &Message::app_error("Error: timeout"))
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "## 3F Pharma: Error: timeout\n\n");
    }

    #[test]
    fn unwritable_log_path_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("chat.log");
        assert!(LoggingState::new(Some(path.to_string_lossy().to_string())).is_err());
    }
}
