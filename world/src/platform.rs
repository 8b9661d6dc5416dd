//! Launch platform slot table.

use blockfire_core::{ShooterId, SlotError, SlotIndex, SlotOccupancy, SlotSnapshot, MAX_PLATFORMS};

/// Ordered launch platforms. Slots reference shooters by id only.
#[derive(Clone, Debug, Default)]
pub(crate) struct PlatformSlots {
    slots: Vec<SlotOccupancy>,
}

impl PlatformSlots {
    pub(crate) fn new(count: u32) -> Self {
        let count = usize::try_from(count.min(MAX_PLATFORMS)).unwrap_or(0);
        Self {
            slots: vec![SlotOccupancy::Empty; count],
        }
    }

    /// Number of platforms.
    pub(crate) fn len(&self) -> u32 {
        u32::try_from(self.slots.len()).unwrap_or(u32::MAX)
    }

    pub(crate) fn can_occupy(&self, slot: SlotIndex) -> bool {
        matches!(self.slots.get(slot.index()), Some(SlotOccupancy::Empty))
    }

    /// Reserves a free slot for a shooter that starts travelling towards it.
    pub(crate) fn reserve(&mut self, slot: SlotIndex, shooter: ShooterId) -> Result<(), SlotError> {
        let count = self.len();
        let Some(entry) = self.slots.get_mut(slot.index()) else {
            return Err(SlotError::OutOfRange { slot, count });
        };
        match *entry {
            SlotOccupancy::Empty => {
                *entry = SlotOccupancy::Reserved(shooter);
                Ok(())
            }
            SlotOccupancy::Reserved(_) => Err(SlotError::Reserved { slot }),
            SlotOccupancy::Occupied(_) => Err(SlotError::Occupied { slot }),
        }
    }

    /// Turns a reservation into an occupied slot, yielding the arriving shooter.
    pub(crate) fn complete(&mut self, slot: SlotIndex) -> Option<ShooterId> {
        let entry = self.slots.get_mut(slot.index())?;
        match *entry {
            SlotOccupancy::Reserved(shooter) => {
                *entry = SlotOccupancy::Occupied(shooter);
                Some(shooter)
            }
            SlotOccupancy::Empty | SlotOccupancy::Occupied(_) => None,
        }
    }

    /// Frees the slot. Returns `false` when it was already free.
    pub(crate) fn release(&mut self, slot: SlotIndex) -> bool {
        match self.slots.get_mut(slot.index()) {
            Some(entry) if *entry != SlotOccupancy::Empty => {
                *entry = SlotOccupancy::Empty;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn occupant(&self, slot: SlotIndex) -> Option<ShooterId> {
        match self.slots.get(slot.index()) {
            Some(SlotOccupancy::Occupied(shooter)) => Some(*shooter),
            _ => None,
        }
    }

    /// Lowest-index slot that may be reserved.
    pub(crate) fn first_free(&self) -> Option<SlotIndex> {
        (0..self.slots.len())
            .filter_map(|index| u32::try_from(index).ok().map(SlotIndex::new))
            .find(|slot| self.can_occupy(*slot))
    }

    /// Occupied slots in slot order.
    pub(crate) fn occupied(&self) -> impl Iterator<Item = (SlotIndex, ShooterId)> + '_ {
        self.iter().filter_map(|snapshot| match snapshot.occupancy {
            SlotOccupancy::Occupied(shooter) => Some((snapshot.slot, shooter)),
            _ => None,
        })
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = SlotSnapshot> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, occupancy)| {
            u32::try_from(index).ok().map(|index| SlotSnapshot {
                slot: SlotIndex::new(index),
                occupancy: *occupancy,
            })
        })
    }
}
