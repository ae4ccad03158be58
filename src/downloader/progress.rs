// Progress relay: raw engine callbacks -> uniform progress events

use super::models::{Phase, ProgressEvent};

/// What the engine's progress callback actually carries. Every field is
/// best-effort; the relay decides what is usable.
#[derive(Debug, Clone, Default)]
pub struct RawProgress {
    pub finished: bool,
    pub downloaded_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
    pub total_bytes_estimate: Option<u64>,
    pub percent: Option<String>,
    pub speed: Option<String>,
    pub eta: Option<String>,
}

impl RawProgress {
    pub fn finished() -> Self {
        Self {
            finished: true,
            ..Self::default()
        }
    }
}

/// Receiver for orchestration events. One implementation decorates a
/// console, another serializes to a parent process.
pub trait ProgressSink {
    /// A batch item is about to start.
    fn item_started(&mut self, _index: usize, _total: usize, _url: &str) {}

    fn progress(&mut self, event: &ProgressEvent);
}

/// Normalize one raw callback into an event.
///
/// Percent prefers the downloaded/total byte ratio when a total (or an
/// estimate) is known and falls back to the engine's percent string.
/// Returns `None` when neither is usable — the event is dropped, never
/// surfaced as an error.
pub fn normalize(raw: &RawProgress) -> Option<ProgressEvent> {
    if raw.finished {
        return Some(ProgressEvent::finished());
    }

    Some(ProgressEvent {
        phase: Phase::Downloading,
        percent: percent_of(raw)?,
        speed: label(raw.speed.as_deref()),
        eta: label(raw.eta.as_deref()),
    })
}

fn percent_of(raw: &RawProgress) -> Option<u8> {
    let total = raw.total_bytes.or(raw.total_bytes_estimate).unwrap_or(0);
    if total > 0 {
        let downloaded = raw.downloaded_bytes.unwrap_or(0);
        let ratio = (downloaded as f64 / total as f64) * 100.0;
        return Some(ratio.clamp(0.0, 100.0) as u8);
    }

    let text = raw.percent.as_deref()?;
    let value: f64 = text.trim().trim_end_matches('%').trim().parse().ok()?;
    Some(value.clamp(0.0, 100.0) as u8)
}

fn label(value: Option<&str>) -> String {
    match value {
        Some(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_ratio_wins_over_percent_string() {
        let raw = RawProgress {
            downloaded_bytes: Some(250),
            total_bytes: Some(1000),
            percent: Some("99.9%".to_string()),
            speed: Some("1.00MiB/s".to_string()),
            eta: Some("00:05".to_string()),
            ..RawProgress::default()
        };
        let event = normalize(&raw).unwrap();
        assert_eq!(event.phase, Phase::Downloading);
        assert_eq!(event.percent, 25);
        assert_eq!(event.speed, "1.00MiB/s");
        assert_eq!(event.eta, "00:05");
    }

    #[test]
    fn estimate_substitutes_for_missing_total() {
        let raw = RawProgress {
            downloaded_bytes: Some(500),
            total_bytes_estimate: Some(1000),
            ..RawProgress::default()
        };
        assert_eq!(normalize(&raw).unwrap().percent, 50);
    }

    #[test]
    fn percent_string_is_the_fallback() {
        let raw = RawProgress {
            percent: Some("  42.7% ".to_string()),
            ..RawProgress::default()
        };
        assert_eq!(normalize(&raw).unwrap().percent, 42);
    }

    #[test]
    fn unparsable_progress_is_swallowed() {
        let raw = RawProgress {
            percent: Some("N/A".to_string()),
            ..RawProgress::default()
        };
        assert!(normalize(&raw).is_none());
        assert!(normalize(&RawProgress::default()).is_none());
    }

    #[test]
    fn percent_never_exceeds_one_hundred() {
        // Totals can be underestimates; the ratio still clamps.
        let raw = RawProgress {
            downloaded_bytes: Some(1500),
            total_bytes: Some(1000),
            ..RawProgress::default()
        };
        assert_eq!(normalize(&raw).unwrap().percent, 100);
    }

    #[test]
    fn finished_forces_terminal_values() {
        let raw = RawProgress {
            finished: true,
            downloaded_bytes: Some(1),
            total_bytes: Some(1000),
            speed: Some("3.2MiB/s".to_string()),
            ..RawProgress::default()
        };
        let event = normalize(&raw).unwrap();
        assert_eq!(event, ProgressEvent::finished());
    }

    #[test]
    fn missing_labels_read_not_available() {
        let raw = RawProgress {
            downloaded_bytes: Some(10),
            total_bytes: Some(100),
            ..RawProgress::default()
        };
        let event = normalize(&raw).unwrap();
        assert_eq!(event.speed, "N/A");
        assert_eq!(event.eta, "N/A");
    }
}
