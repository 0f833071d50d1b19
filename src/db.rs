//! Spatial connection databases: per-kind collections sorted by y.
//!
//! Each workspace keeps one database per connection kind. Entries stay
//! sorted by ascending y; entries with equal y are contiguous but otherwise
//! unordered, which is all the removal and neighbour scans rely on.

use std::collections::HashSet;

use crate::connection::{ConnectionId, ConnectionKind};

/// Violations of the database invariants. These indicate a bug in the
/// caller's bookkeeping, not a recoverable condition.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("connection {0} is already in the database")]
    AlreadyPresent(ConnectionId),
    #[error("connection {0} is not in the database")]
    NotFound(ConnectionId),
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: ConnectionId,
    x: f64,
    y: f64,
}

/// A position-sorted collection of connections of one kind.
#[derive(Debug, Default)]
pub struct ConnectionDatabase {
    entries: Vec<Entry>,
    present: HashSet<ConnectionId>,
}

impl ConnectionDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.present.contains(&id)
    }

    /// Insert a connection at its sorted position.
    pub fn add(&mut self, id: ConnectionId, x: f64, y: f64) -> Result<(), DatabaseError> {
        if self.present.contains(&id) {
            return Err(DatabaseError::AlreadyPresent(id));
        }
        let index = self.index_for_y(y);
        self.entries.insert(index, Entry { id, x, y });
        self.present.insert(id);
        Ok(())
    }

    /// Remove a connection. `y` must be the y it was inserted with.
    pub fn remove(&mut self, id: ConnectionId, y: f64) -> Result<(), DatabaseError> {
        if !self.present.contains(&id) {
            return Err(DatabaseError::NotFound(id));
        }
        let index = self
            .find_index(id, y)
            .ok_or(DatabaseError::NotFound(id))?;
        self.entries.remove(index);
        self.present.remove(&id);
        Ok(())
    }

    /// All connections within `max_radius` of `(x, y)`, in no particular
    /// order. Performs no compatibility filtering.
    pub fn neighbours(&self, x: f64, y: f64, max_radius: f64) -> Vec<ConnectionId> {
        let mut found = Vec::new();
        if self.entries.is_empty() {
            return found;
        }
        let start = self.index_for_y(y).min(self.entries.len() - 1);

        // Expand outward from the y neighbourhood. The vertical distance is
        // the cheap exit test; the full distance decides inclusion.
        let mut check = |entry: &Entry| -> bool {
            if (y - entry.y).abs() > max_radius {
                return false;
            }
            let dx = x - entry.x;
            let dy = y - entry.y;
            if (dx * dx + dy * dy).sqrt() <= max_radius {
                found.push(entry.id);
            }
            true
        };

        for entry in self.entries[..=start].iter().rev() {
            if !check(entry) {
                break;
            }
        }
        for entry in &self.entries[start + 1..] {
            if !check(entry) {
                break;
            }
        }
        found
    }

    /// Binary search for the insertion index of `y`. Lands somewhere inside
    /// a run of equal y values rather than at its edge; exact order among
    /// equal entries does not matter.
    fn index_for_y(&self, y: f64) -> usize {
        let mut min = 0;
        let mut max = self.entries.len();
        while min < max {
            let mid = (min + max) / 2;
            if self.entries[mid].y < y {
                min = mid + 1;
            } else if self.entries[mid].y > y {
                max = mid;
            } else {
                min = mid;
                break;
            }
        }
        min
    }

    /// Locate the exact entry for `id`: binary search to the y
    /// neighbourhood, then scan outward across the equal-y run. Two phases
    /// because siblings in one row commonly share a y.
    fn find_index(&self, id: ConnectionId, y: f64) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let start = self.index_for_y(y).min(self.entries.len() - 1);

        for i in (0..=start).rev() {
            if self.entries[i].y != y {
                break;
            }
            if self.entries[i].id == id {
                return Some(i);
            }
        }
        for i in start + 1..self.entries.len() {
            if self.entries[i].y != y {
                break;
            }
            if self.entries[i].id == id {
                return Some(i);
            }
        }
        None
    }

    #[cfg(test)]
    fn ys(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.y).collect()
    }
}

/// The four per-kind databases owned by one workspace.
#[derive(Debug, Default)]
pub struct ConnectionDbSet {
    previous: ConnectionDatabase,
    next: ConnectionDatabase,
    output: ConnectionDatabase,
    input: ConnectionDatabase,
}

impl ConnectionDbSet {
    pub fn for_kind(&self, kind: ConnectionKind) -> &ConnectionDatabase {
        match kind {
            ConnectionKind::PreviousStatement => &self.previous,
            ConnectionKind::NextStatement => &self.next,
            ConnectionKind::OutputValue => &self.output,
            ConnectionKind::InputValue => &self.input,
        }
    }

    pub fn for_kind_mut(&mut self, kind: ConnectionKind) -> &mut ConnectionDatabase {
        match kind {
            ConnectionKind::PreviousStatement => &mut self.previous,
            ConnectionKind::NextStatement => &mut self.next,
            ConnectionKind::OutputValue => &mut self.output,
            ConnectionKind::InputValue => &mut self.input,
        }
    }

    /// The database a connection of `kind` searches when looking for a
    /// partner.
    pub fn opposite_of(&self, kind: ConnectionKind) -> &ConnectionDatabase {
        self.for_kind(kind.opposite())
    }
}
