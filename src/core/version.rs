use crate::domain::model::Entry;

/// Publish state of a management-level entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// Edits exist past the last published version (or it was never published).
    Stale { latest: u32, published: Option<u32> },
    Current { published: u32 },
}

impl Staleness {
    pub fn of(entry: &Entry) -> Self {
        let latest = entry.latest_version();
        match entry.published_version() {
            Some(published) if published >= latest => Staleness::Current { published },
            published => Staleness::Stale { latest, published },
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Staleness::Stale { .. })
    }
}

/// `published < latest`, with a missing published version counting as the minimum.
pub fn is_stale(entry: &Entry) -> bool {
    Staleness::of(entry).is_stale()
}
