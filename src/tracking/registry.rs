use std::collections::HashMap;
use std::fmt;

use super::{MarkerId, PositionHistory, TrackingError, DEFAULT_LABEL};

/// Ordered set of per-marker histories, addressable by sequence index
/// (registration order) or by external marker identifier.
///
/// Like [`PositionHistory`], this is mutated only from the tracker's frame
/// path and is not safe for concurrent mutation.
#[derive(Clone, Debug)]
pub struct MarkerRegistry {
    capacity: usize,
    markers: Vec<PositionHistory>,
    /// Inverse of `markers[i].id()`.
    index_map: HashMap<MarkerId, usize>,
}

impl MarkerRegistry {
    /// Registers each identifier in order. `labels[i]` names `identifiers[i]`;
    /// identifiers past the end of `labels` get [`DEFAULT_LABEL`].
    ///
    /// Returns `Err(TrackingError::InvalidConfiguration)` when `capacity` is zero.
    pub fn new<I, S>(identifiers: I, capacity: usize, labels: &[S]) -> Result<Self, TrackingError>
    where
        I: IntoIterator<Item = MarkerId>,
        S: AsRef<str>,
    {
        if capacity < 1 {
            return Err(TrackingError::InvalidConfiguration(
                "history capacity must be at least 1".to_string(),
            ));
        }

        let mut registry = Self {
            capacity,
            markers: Vec::new(),
            index_map: HashMap::new(),
        };

        for (i, id) in identifiers.into_iter().enumerate() {
            let label = labels.get(i).map(|l| l.as_ref()).unwrap_or(DEFAULT_LABEL);
            registry.add(id, label);
        }

        Ok(registry)
    }

    /// Registry whose markers all carry [`DEFAULT_LABEL`].
    pub fn unlabelled<I>(identifiers: I, capacity: usize) -> Result<Self, TrackingError>
    where
        I: IntoIterator<Item = MarkerId>,
    {
        Self::new(identifiers, capacity, &[] as &[&str])
    }

    /// Starts tracking `id`. An empty label falls back to [`DEFAULT_LABEL`].
    ///
    /// Registering an id that is already tracked replaces its history in
    /// place with a fresh one: the sequence position is kept and the old
    /// points are discarded.
    pub fn add(&mut self, id: MarkerId, label: &str) -> &mut PositionHistory {
        let label = if label.is_empty() { DEFAULT_LABEL } else { label };
        let history = PositionHistory::with_valid_capacity(self.capacity, id, label.to_string());

        let idx = match self.index_map.get(&id) {
            Some(&idx) => {
                log::warn!(
                    "marker id={} registered again; resetting its history (label={})",
                    id,
                    label
                );
                self.markers[idx] = history;
                idx
            }
            None => {
                let idx = self.markers.len();
                self.markers.push(history);
                self.index_map.insert(id, idx);
                idx
            }
        };

        &mut self.markers[idx]
    }

    /// History for the marker with external identifier `id`.
    pub fn get(&self, id: MarkerId) -> Result<&PositionHistory, TrackingError> {
        self.index_map
            .get(&id)
            .map(|&idx| &self.markers[idx])
            .ok_or(TrackingError::UnknownMarker(id))
    }

    /// History at sequence position `index` (registration order).
    pub fn get_by_index(&self, index: usize) -> Result<&PositionHistory, TrackingError> {
        self.markers.get(index).ok_or(TrackingError::IndexOutOfRange {
            index: index as i64,
            len: self.markers.len(),
        })
    }

    pub fn contains(&self, id: MarkerId) -> bool {
        self.index_map.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Capacity given to every history in this registry.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tracked identifiers in registration order.
    pub fn identifiers(&self) -> impl Iterator<Item = MarkerId> + '_ {
        self.markers.iter().map(|m| m.id())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PositionHistory> {
        self.markers.iter()
    }

    /// Frame ingestion is the only caller allowed to mutate histories.
    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, PositionHistory> {
        self.markers.iter_mut()
    }
}

impl fmt::Display for MarkerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Markers({})", self.len())
    }
}

impl<'a> IntoIterator for &'a MarkerRegistry {
    type Item = &'a PositionHistory;
    type IntoIter = std::slice::Iter<'a, PositionHistory>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}
