//! Log buffer: the ordered, append-only store of received lines.

use std::ops::Index;

/// Ordered, append-only sequence of log lines.
///
/// An index, once assigned, always refers to the same line: lines are
/// never reordered or removed.
#[derive(Debug, Default, Clone)]
pub struct LogBuffer {
    lines: Vec<String>,
}

impl LogBuffer {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Append a line at the next index and return that index.
    pub fn push(&mut self, line: String) -> usize {
        self.lines.push(line);
        self.lines.len() - 1
    }

    /// Number of lines received so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing has been received yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line at `index`, if it has been received.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Iterate over lines in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

impl Index<usize> for LogBuffer {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.lines[index]
    }
}

impl<S: Into<String>> FromIterator<S> for LogBuffer {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Cumulative count of UTF-8 bytes received.
///
/// Only ever grows. Used for a coarse progress estimate, not an exact
/// transfer size.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ByteCounter(u64);

impl ByteCounter {
    /// Add the encoded length of `line`.
    #[inline]
    pub fn record(&mut self, line: &str) {
        self.0 = self.0.saturating_add(line.len() as u64);
    }

    /// Total bytes recorded.
    #[inline]
    pub const fn total(self) -> u64 {
        self.0
    }
}

/// Percentage of `expected_total` covered by `received`, rounded to two
/// decimal places.
///
/// A zero expected total yields `0.0`. Values past 100 are returned as
/// they are; callers that draw a bar clamp it themselves.
#[allow(clippy::cast_precision_loss)]
pub fn progress_percent(received: u64, expected_total: u64) -> f64 {
    if expected_total == 0 {
        return 0.0;
    }
    let percent = received as f64 / expected_total as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_arrival_order() {
        let mut log = LogBuffer::new();
        let messages = ["first", "", "third line", "first"];
        for (i, m) in messages.iter().enumerate() {
            assert_eq!(log.push((*m).to_string()), i);
        }
        assert_eq!(log.len(), messages.len());
        for (i, m) in messages.iter().enumerate() {
            assert_eq!(&log[i], *m);
        }
        assert!(log.get(messages.len()).is_none());
    }

    #[test]
    fn test_byte_counter_uses_utf8_length() {
        let mut bytes = ByteCounter::default();
        bytes.record("abc");
        bytes.record("héllo");
        bytes.record("日本");
        assert_eq!(bytes.total(), 3 + 6 + 6);
    }

    #[test]
    fn test_progress_percent_bounds() {
        assert!((progress_percent(0, 1_060_000_000) - 0.0).abs() < f64::EPSILON);
        assert!((progress_percent(1_060_000_000, 1_060_000_000) - 100.0).abs() < f64::EPSILON);
        assert!((progress_percent(5, 0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_progress_percent_rounds_not_truncates() {
        // 2/3 = 66.666..% rounds up to 66.67, truncation would give 66.66
        assert!((progress_percent(2, 3) - 66.67).abs() < 1e-9);
        // 1/8 = 12.5%
        assert!((progress_percent(1, 8) - 12.5).abs() < 1e-9);
        // 1/1000 = 0.1%, 1/100000 = 0.001% rounds to 0.0
        assert!((progress_percent(1, 1000) - 0.1).abs() < 1e-9);
        assert!(progress_percent(1, 100_000).abs() < 1e-9);
    }
}
