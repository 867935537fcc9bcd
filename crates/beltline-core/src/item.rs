use crate::fixed::Fixed64;
use crate::id::BoxId;

/// A box travelling through the line.
///
/// `size` is measured in belt slots and governs the spacing a belt keeps
/// between this box and the one behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxItem {
    pub id: BoxId,
    pub size: Fixed64,
}

impl BoxItem {
    /// A box of the default one-slot size.
    pub fn new(id: BoxId) -> Self {
        Self {
            id,
            size: Fixed64::ONE,
        }
    }

    pub fn with_size(id: BoxId, size: Fixed64) -> Self {
        Self { id, size }
    }
}
