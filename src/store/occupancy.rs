//! Occupancy window: a single durable expiry instant.
//!
//! A motion event arms (or re-arms) the window for the configured duration;
//! re-triggering resets the full duration rather than extending the old
//! expiry. Reads are lazy-expiring: asking past the expiry deletes the
//! backing file and reports inactive. No history is kept.
//!
//! Stored on disk as a scalar float of epoch seconds.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use log::warn;

pub struct OccupancyWindow {
    path: PathBuf,
    expiry: Option<DateTime<Utc>>,
}

impl OccupancyWindow {
    /// Open the window, loading a persisted expiry if one exists.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let expiry = match fs::read_to_string(&path) {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs as i64, 0)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("occupancy file unreadable: {e}");
                None
            }
        };
        Self { path, expiry }
    }

    /// Arm the window: expiry = `now + duration`, overwriting any prior
    /// window unconditionally. Returns the new expiry.
    pub fn trigger(&mut self, duration: Duration, now: DateTime<Utc>) -> DateTime<Utc> {
        let expiry = now + duration;
        self.expiry = Some(expiry);

        let epoch = expiry.timestamp() as f64;
        if let Err(e) = fs::write(&self.path, format!("{epoch}\n")) {
            warn!("occupancy write failed: {e}");
        }
        expiry
    }

    /// Whether the window is active at `now`. An expired window is deleted
    /// as a side effect and reported inactive.
    pub fn is_active(&mut self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) if now < expiry => true,
            Some(_) => {
                self.expiry = None;
                match fs::remove_file(&self.path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => warn!("occupancy delete failed: {e}"),
                }
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_until_triggered() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = OccupancyWindow::open(dir.path().join("occupied.expiry"));
        assert!(!w.is_active(Utc::now()));
    }

    #[test]
    fn active_within_window_inactive_after() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = OccupancyWindow::open(dir.path().join("occupied.expiry"));
        let now = Utc::now();

        w.trigger(Duration::hours(24), now);
        assert!(w.is_active(now + Duration::hours(23)));
        assert!(!w.is_active(now + Duration::hours(25)));
    }

    #[test]
    fn expiry_deletes_backing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occupied.expiry");
        let mut w = OccupancyWindow::open(&path);
        let now = Utc::now();

        w.trigger(Duration::hours(1), now);
        assert!(path.exists());
        assert!(!w.is_active(now + Duration::hours(2)));
        assert!(!path.exists(), "expired window must be deleted on read");
    }

    #[test]
    fn retrigger_resets_full_duration() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = OccupancyWindow::open(dir.path().join("occupied.expiry"));
        let now = Utc::now();

        w.trigger(Duration::hours(24), now);
        // 20 hours later a second motion event restarts the clock.
        let retrigger_at = now + Duration::hours(20);
        w.trigger(Duration::hours(24), retrigger_at);

        assert!(w.is_active(retrigger_at + Duration::hours(23)));
        assert!(!w.is_active(retrigger_at + Duration::hours(25)));
    }

    #[test]
    fn window_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occupied.expiry");
        let now = Utc::now();
        {
            let mut w = OccupancyWindow::open(&path);
            w.trigger(Duration::hours(24), now);
        }
        let mut w = OccupancyWindow::open(&path);
        assert!(w.is_active(now + Duration::hours(1)));
    }
}
