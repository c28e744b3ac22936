use std::fmt;

use super::{FillState, MarkerId, Point3, TrackingError, DEFAULT_LABEL};

/// Keeps the last `capacity` positions of a single marker.
///
/// Storage grows until it reaches capacity; from then on every insert
/// overwrites the oldest point in place. Once full, a history stays full.
///
/// Not safe for concurrent mutation. Histories are only mutated from the
/// tracker's frame path; read queries may be called from the frame callback.
#[derive(Clone, Debug)]
pub struct PositionHistory {
    capacity: usize,
    id: MarkerId,
    label: String,
    storage: Vec<Point3>,
    /// Slot of the most recent insert. Meaningless while empty.
    cursor: usize,
}

impl PositionHistory {
    /// Returns `Err(TrackingError::InvalidConfiguration)` when `capacity` is zero.
    pub fn new(
        capacity: usize,
        id: MarkerId,
        label: impl Into<String>,
    ) -> Result<Self, TrackingError> {
        if capacity < 1 {
            return Err(TrackingError::InvalidConfiguration(format!(
                "history capacity must be at least 1 (marker id={})",
                id
            )));
        }

        Ok(Self::with_valid_capacity(capacity, id, label.into()))
    }

    /// Caller guarantees `capacity >= 1`.
    pub(super) fn with_valid_capacity(capacity: usize, id: MarkerId, label: String) -> Self {
        Self {
            capacity,
            id,
            label,
            storage: Vec::with_capacity(capacity),
            cursor: 0,
        }
    }

    pub fn with_default_label(capacity: usize, id: MarkerId) -> Result<Self, TrackingError> {
        Self::new(capacity, id, DEFAULT_LABEL)
    }

    /// Records a new position, overwriting the oldest one once full.
    pub fn insert(&mut self, point: Point3) {
        let count = self.storage.len();
        if count < self.capacity {
            self.storage.push(point);
            self.cursor = count;
            return;
        }

        self.cursor = (self.cursor + 1) % self.capacity;
        self.storage[self.cursor] = point;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of points currently retained: 0, the fill count, or capacity.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.storage.len() == self.capacity
    }

    pub fn fill_state(&self) -> FillState {
        match self.storage.len() {
            0 => FillState::Empty,
            n if n == self.capacity => FillState::Full,
            n => FillState::Partial(n),
        }
    }

    /// Returns the point in storage slot `index`.
    ///
    /// Once full, any index wraps around the ring and negative indices count
    /// back from the end of storage. While partially filled only
    /// `[-len, len)` is accepted; anything else would name a slot that holds
    /// no point yet and fails with `IndexOutOfRange`.
    pub fn get(&self, index: i64) -> Result<Point3, TrackingError> {
        let len = self.storage.len();
        if len == 0 {
            return Err(TrackingError::EmptyHistory);
        }

        let slot = if self.is_full() {
            index.rem_euclid(len as i64)
        } else if (-(len as i64)..0).contains(&index) {
            index + len as i64
        } else if (0..len as i64).contains(&index) {
            index
        } else {
            return Err(TrackingError::IndexOutOfRange { index, len });
        };
        Ok(self.storage[slot as usize])
    }

    /// The most recently inserted point.
    pub fn last(&self) -> Result<Point3, TrackingError> {
        self.get(self.cursor as i64)
    }

    /// The oldest point still held in the ring.
    pub fn first(&self) -> Result<Point3, TrackingError> {
        if self.is_full() {
            self.get(self.cursor as i64 + 1)
        } else {
            self.get(0)
        }
    }

    /// The point inserted just before [`last`](Self::last). With a single
    /// point retained this is that same point.
    pub fn prev(&self) -> Result<Point3, TrackingError> {
        self.get(self.cursor as i64 - 1)
    }

    /// Single-frame finite difference `last - prev`, not scaled by time.
    /// Callers convert to per-second units using their frame rate.
    pub fn velocity(&self) -> Result<Point3, TrackingError> {
        match self.len() {
            0 => Err(TrackingError::EmptyHistory),
            1 => Ok(Point3::ORIGIN),
            _ => Ok(self.last()? - self.prev()?),
        }
    }

    /// Net displacement across the retained window (oldest to newest), not
    /// the cumulative path length.
    pub fn distance(&self) -> Result<f64, TrackingError> {
        match self.len() {
            0 => Err(TrackingError::EmptyHistory),
            1 => Ok(0.0),
            _ => Ok(self.last()?.distance_to(&self.first()?)),
        }
    }

    /// Retained points in chronological order, oldest first.
    pub fn iter(&self) -> HistoryIter<'_> {
        let start = if self.is_full() {
            (self.cursor + 1) % self.capacity
        } else {
            0
        };

        HistoryIter {
            storage: &self.storage,
            start,
            offset: 0,
        }
    }
}

impl fmt::Display for PositionHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PositionHistory({}, {}, {})", self.capacity, self.id, self.label)
    }
}

impl<'a> IntoIterator for &'a PositionHistory {
    type Item = Point3;
    type IntoIter = HistoryIter<'a>;

    fn into_iter(self) -> HistoryIter<'a> {
        self.iter()
    }
}

/// Chronological iterator over a [`PositionHistory`].
#[derive(Clone, Debug)]
pub struct HistoryIter<'a> {
    storage: &'a [Point3],
    start: usize,
    offset: usize,
}

impl Iterator for HistoryIter<'_> {
    type Item = Point3;

    fn next(&mut self) -> Option<Point3> {
        if self.offset >= self.storage.len() {
            return None;
        }
        let slot = (self.start + self.offset) % self.storage.len();
        self.offset += 1;
        Some(self.storage[slot])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.storage.len() - self.offset;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HistoryIter<'_> {}
