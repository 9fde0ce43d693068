use crate::room::RoomId;

use fnv::FnvHashMap;

/// A map keyed by an unordered pair of rooms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SymmetricMap<T> {
    map: FnvHashMap<(RoomId, RoomId), T>,
}

impl<T> SymmetricMap<T> {
    pub fn new() -> Self {
        SymmetricMap {
            map: FnvHashMap::default(),
        }
    }

    fn order_ids(a: RoomId, b: RoomId) -> (RoomId, RoomId) {
        if a > b {
            (b, a)
        } else {
            (a, b)
        }
    }

    pub fn get(&self, a: RoomId, b: RoomId) -> Option<&T> {
        self.map.get(&Self::order_ids(a, b))
    }
}

impl<T: Default> SymmetricMap<T> {
    pub fn get_or_default(&mut self, a: RoomId, b: RoomId) -> &mut T {
        self.map.entry(Self::order_ids(a, b)).or_default()
    }
}
