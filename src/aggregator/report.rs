use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

/// Writes the aggregator's progress lines.
///
/// Normal output goes to stdout or an append-only log file; errors always go
/// to stderr.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    log_file: Option<PathBuf>,
}

impl Reporter {
    pub fn new(log_file: Option<PathBuf>) -> Self {
        Self { log_file }
    }

    pub fn info(&self, msg: &str) {
        tracing::debug!("{}", msg);
        let line = Self::stamp(msg);

        if let Some(ref log_path) = self.log_file {
            if let Ok(mut file) = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)
            {
                let _ = writeln!(file, "{}", line);
                return;
            }
        }

        println!("{}", line);
    }

    pub fn error(&self, msg: &str) {
        tracing::debug!("cycle error: {}", msg);
        eprintln!("{}", Self::stamp(msg));
    }

    fn stamp(msg: &str) -> String {
        format!("[{}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_appends_to_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agg.log");
        let reporter = Reporter::new(Some(path.clone()));

        reporter.info("Fetching: Boot.dev (https://blog.boot.dev/index.xml)");
        reporter.info("Saved 3 new posts from Boot.dev");

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[1].ends_with("Saved 3 new posts from Boot.dev"));
    }
}
