//! Per-robot information feed.
//!
//! Resolvers append lines and sensor snapshots to a robot's live feed while a
//! round resolves. At the end of the round the coordinator publishes the live
//! feed into the robot's report, which the participant drains between rounds.
//! Undrained reports accumulate across rounds.

use std::fmt;

use rubble::{CellReading, Signal, SignalReading};
use serde::{Deserialize, Serialize};

/// One item delivered to a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedEntry {
    /// A human-readable line
    Text(String),
    /// Signal levels from a sensor
    Signal {
        /// Which signal
        signal: Signal,
        /// The levels
        reading: SignalReading,
    },
    /// Occupants revealed by a sensor or by end-of-round vision
    Cells(CellReading),
}

impl FeedEntry {
    /// The text of a [`FeedEntry::Text`], if it is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeedEntry::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for FeedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedEntry::Text(text) => f.write_str(text),
            FeedEntry::Signal { signal, reading } => {
                writeln!(f, "{} levels:", signal.name())?;
                write!(f, "{reading}")
            }
            FeedEntry::Cells(reading) => write!(f, "{reading}"),
        }
    }
}

/// Double-buffered feed: live entries for the resolving round and the
/// published report of finished rounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    live: Vec<FeedEntry>,
    report: Vec<FeedEntry>,
}

impl Feed {
    /// Append an entry to the live feed.
    pub fn push(&mut self, entry: FeedEntry) {
        self.live.push(entry);
    }

    /// Append a text line to the live feed.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.live.push(FeedEntry::Text(text.into()));
    }

    /// Entries written during the resolving round.
    #[must_use]
    pub fn live(&self) -> &[FeedEntry] {
        &self.live
    }

    /// Move the live entries into the report.
    pub fn publish(&mut self) {
        self.report.append(&mut self.live);
    }

    /// Take the published report, leaving it empty.
    pub fn drain(&mut self) -> Vec<FeedEntry> {
        std::mem::take(&mut self.report)
    }

    /// Live text lines, for assertions and logs.
    pub fn live_texts(&self) -> impl Iterator<Item = &str> {
        self.live.iter().filter_map(FeedEntry::as_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_then_drain() {
        let mut feed = Feed::default();
        feed.push_text("Move to (1, 2)");
        assert!(feed.drain().is_empty());

        feed.publish();
        assert!(feed.live().is_empty());
        let report = feed.drain();
        assert_eq!(report, vec![FeedEntry::Text("Move to (1, 2)".into())]);
        assert!(feed.drain().is_empty());
    }

    #[test]
    fn undrained_reports_accumulate() {
        let mut feed = Feed::default();
        feed.push_text("a");
        feed.publish();
        feed.push_text("b");
        feed.publish();
        let texts: Vec<String> = feed.drain().iter().map(ToString::to_string).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn live_texts_skip_snapshots() {
        let mut feed = Feed::default();
        feed.push_text("weapon missed!");
        feed.push(FeedEntry::Cells(rubble::RegionSnapshot::sample(
            rubble::Region::square(glam::IVec2::ZERO, 0),
            |_| rubble::Glyph::Empty,
        )));
        assert_eq!(feed.live_texts().collect::<Vec<_>>(), vec!["weapon missed!"]);
    }
}
