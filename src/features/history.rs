use crate::types::DataUri;
use serde::{Deserialize, Serialize};

pub const HISTORY_LIMIT: usize = 50;

/// Generated images, newest first, without duplicates, at most `HISTORY_LIMIT`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<DataUri>", into = "Vec<DataUri>")]
pub struct ImageHistory {
    entries: Vec<DataUri>,
}

impl ImageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, image: DataUri) {
        self.entries.retain(|entry| entry != &image);
        self.entries.insert(0, image);
        self.entries.truncate(HISTORY_LIMIT);
    }

    /// Returns whether the entry was present.
    pub fn remove(&mut self, image: &DataUri) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry != image);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, image: &DataUri) -> bool {
        self.entries.contains(image)
    }

    pub fn entries(&self) -> &[DataUri] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Stored lists are re-normalised on load, so hand-edited data cannot break the
// ordering or size guarantees.
impl From<Vec<DataUri>> for ImageHistory {
    fn from(entries: Vec<DataUri>) -> Self {
        let mut normalised: Vec<DataUri> = Vec::with_capacity(entries.len().min(HISTORY_LIMIT));
        for entry in entries {
            if normalised.len() == HISTORY_LIMIT {
                break;
            }
            if !normalised.contains(&entry) {
                normalised.push(entry);
            }
        }
        Self {
            entries: normalised,
        }
    }
}

impl From<ImageHistory> for Vec<DataUri> {
    fn from(history: ImageHistory) -> Self {
        history.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(n: usize) -> DataUri {
        DataUri::from_base64("image/jpeg", &format!("img{n}"))
    }

    #[test]
    fn newest_first_and_capped() {
        let mut history = ImageHistory::new();
        for n in 0..60 {
            history.push(uri(n));
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.entries()[0], uri(59));
        assert!(!history.contains(&uri(9)));
        assert!(history.contains(&uri(10)));
    }

    #[test]
    fn duplicate_moves_to_front() {
        let mut history = ImageHistory::new();
        history.push(uri(1));
        history.push(uri(2));
        history.push(uri(1));
        assert_eq!(history.entries(), &[uri(1), uri(2)]);
    }

    #[test]
    fn loading_normalises_stored_list() {
        let stored: Vec<DataUri> = (0..70).map(|n| uri(n % 55)).collect();
        let history: ImageHistory = serde_json::from_str(&serde_json::to_string(&stored).unwrap()).unwrap();
        assert_eq!(history.len(), HISTORY_LIMIT);
        let mut seen = history.entries().to_vec();
        seen.dedup();
        assert_eq!(seen.len(), HISTORY_LIMIT);
    }

    #[test]
    fn remove_reports_presence() {
        let mut history = ImageHistory::new();
        history.push(uri(1));
        assert!(history.remove(&uri(1)));
        assert!(!history.remove(&uri(1)));
        assert!(history.is_empty());
    }
}
