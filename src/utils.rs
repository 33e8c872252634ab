use crate::error::ConfigError;
use std::fmt;
use std::time::Duration;

pub fn parse_headers(headers: &[String]) -> Result<Vec<(String, String)>, ConfigError> {
    let mut parsed = Vec::with_capacity(headers.len());

    for header in headers {
        let parts: Vec<&str> = header.splitn(2, ':').collect();
        if parts.len() != 2 || parts[0].trim().is_empty() {
            return Err(ConfigError::InvalidHeader(header.clone()));
        }

        let key = parts[0].trim().to_string();
        let value = parts[1].trim().to_string();
        parsed.push((key, value));
    }

    Ok(parsed)
}

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Byte count rendered with binary units, e.g. `1.50MB`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ByteSize(pub f64);

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut size = self.0;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }
        write!(f, "{:.2}{}", size, UNITS[unit])
    }
}

pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos >= 1_000_000_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if nanos >= 1_000_000 {
        format!("{:.2}ms", nanos as f64 / 1_000_000.0)
    } else if nanos >= 1_000 {
        format!("{:.2}µs", nanos as f64 / 1_000.0)
    } else {
        format!("{}ns", nanos)
    }
}
