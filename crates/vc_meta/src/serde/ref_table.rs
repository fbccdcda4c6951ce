use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;

use crate::hash::HashMap;
use crate::info::MetaId;

// -----------------------------------------------------------------------------
// WriteRefTable

/// Object ids handed out during one serialization call.
///
/// Keyed by allocation address; the retained handles keep every allocation
/// alive until the call ends so an address is never reused for another
/// object within the call.
pub(crate) struct WriteRefTable {
    ids: HashMap<usize, u64>,
    retained: Vec<Box<dyn Any>>,
    next: u64,
}

impl WriteRefTable {
    pub(crate) fn new() -> Self {
        Self {
            ids: HashMap::default(),
            retained: Vec::new(),
            next: 1,
        }
    }

    #[inline]
    pub(crate) fn get(&self, address: usize) -> Option<u64> {
        self.ids.get(&address).copied()
    }

    /// Assigns the next sequential id to `address`.
    pub(crate) fn assign(&mut self, address: usize, handle: Box<dyn Any>) -> u64 {
        let id = self.next;
        self.next += 1;
        self.ids.insert(address, id);
        self.retained.push(handle);
        id
    }
}

// -----------------------------------------------------------------------------
// ReadRefTable

/// Objects constructed during one deserialization call, by id.
pub(crate) struct ReadRefTable {
    objects: HashMap<u64, (Rc<dyn Any>, MetaId)>,
}

impl ReadRefTable {
    pub(crate) fn new() -> Self {
        Self {
            objects: HashMap::default(),
        }
    }

    #[inline]
    pub(crate) fn insert(&mut self, id: u64, handle: Rc<dyn Any>, concrete: MetaId) {
        self.objects.insert(id, (handle, concrete));
    }

    #[inline]
    pub(crate) fn get(&self, id: u64) -> Option<(Rc<dyn Any>, MetaId)> {
        self.objects
            .get(&id)
            .map(|(handle, concrete)| (Rc::clone(handle), *concrete))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_from_one() {
        let mut table = WriteRefTable::new();
        assert_eq!(table.assign(0x10, Box::new(())), 1);
        assert_eq!(table.assign(0x20, Box::new(())), 2);
        assert_eq!(table.get(0x10), Some(1));
        assert_eq!(table.get(0x30), None);
    }
}
