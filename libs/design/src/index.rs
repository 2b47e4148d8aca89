//! Pin ID resolution.

use arcstr::ArcStr;
use geometry::prelude::Point;
use indexmap::{IndexMap, IndexSet};

use crate::{Cell, Net};

/// A pin ID resolved to its owning cell and absolute position.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ResolvedPin {
    /// The index of the owning cell in the cell list.
    pub cell: usize,
    /// The index of the pin within its cell.
    pub pin: usize,
    /// The absolute position of the pin.
    pub position: Point,
}

/// Maps pin IDs to absolute positions.
///
/// Built once per solver invocation. If two pins share an ID,
/// the first one (in cell order, then pin order) wins.
/// Pins whose absolute position overflows are recorded but not resolvable.
#[derive(Debug, Clone, Default)]
pub struct PinIndex {
    pins: IndexMap<ArcStr, ResolvedPin>,
    overflowed: IndexSet<ArcStr>,
    duplicates: Vec<ArcStr>,
}

impl PinIndex {
    /// Indexes every pin of the given cells.
    pub fn new(cells: &[Cell]) -> Self {
        let mut pins = IndexMap::new();
        let mut overflowed = IndexSet::new();
        let mut duplicates = Vec::new();
        for (i, cell) in cells.iter().enumerate() {
            for (j, pin) in cell.pins.iter().enumerate() {
                if pins.contains_key(&pin.id) || overflowed.contains(&pin.id) {
                    duplicates.push(pin.id.clone());
                    continue;
                }
                match cell.absolute(pin) {
                    Some(position) => {
                        pins.insert(
                            pin.id.clone(),
                            ResolvedPin {
                                cell: i,
                                pin: j,
                                position,
                            },
                        );
                    }
                    None => {
                        overflowed.insert(pin.id.clone());
                    }
                }
            }
        }
        Self {
            pins,
            overflowed,
            duplicates,
        }
    }

    /// Looks up a pin by ID.
    #[inline]
    pub fn get(&self, id: &str) -> Option<&ResolvedPin> {
        self.pins.get(id)
    }

    /// The absolute position of the pin with the given ID.
    #[inline]
    pub fn position(&self, id: &str) -> Option<Point> {
        self.get(id).map(|p| p.position)
    }

    /// Resolves every pin of `net`, in net order.
    ///
    /// Dangling and overflowed pin IDs resolve to [`None`].
    pub fn resolve<'a>(
        &'a self,
        net: &'a Net,
    ) -> impl Iterator<Item = (&'a ArcStr, Option<Point>)> + 'a {
        net.pins.iter().map(|id| (id, self.position(id)))
    }

    /// Returns `true` if `id` names a pin whose absolute position overflows.
    #[inline]
    pub fn is_overflowed(&self, id: &str) -> bool {
        self.overflowed.contains(id)
    }

    /// IDs that were defined more than once.
    pub fn duplicates(&self) -> &[ArcStr] {
        &self.duplicates
    }

    /// The number of distinct pin IDs.
    #[inline]
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// Returns `true` if no pins were indexed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}
