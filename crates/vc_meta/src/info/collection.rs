use alloc::boxed::Box;
use alloc::collections::{BTreeSet, LinkedList, VecDeque};
use alloc::vec::Vec;
use core::any::{Any, type_name};
use core::marker::PhantomData;

use crate::ReflectError;
use crate::value::{downcast_mut, downcast_ref};

// -----------------------------------------------------------------------------
// Collection

/// A sequence-valued type the drivers can walk and refill.
///
/// Iteration order is the container's own order; reading a collection
/// clears it first and then inserts every element at the end.
///
/// # Examples
///
/// ```
/// use vc_meta::info::Collection;
///
/// #[derive(Default)]
/// struct Stack(Vec<u32>);
///
/// impl Collection for Stack {
///     type Item = u32;
///
///     fn items(&self) -> Box<dyn Iterator<Item = &u32> + '_> {
///         Box::new(self.0.iter())
///     }
///
///     fn insert_at_end(&mut self, item: u32) {
///         self.0.push(item);
///     }
///
///     fn clear_all(&mut self) {
///         self.0.clear();
///     }
/// }
/// ```
pub trait Collection: Any {
    type Item: Any;

    fn items(&self) -> Box<dyn Iterator<Item = &Self::Item> + '_>;

    fn insert_at_end(&mut self, item: Self::Item);

    fn clear_all(&mut self);
}

impl<T: Any> Collection for Vec<T> {
    type Item = T;

    fn items(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.iter())
    }

    #[inline]
    fn insert_at_end(&mut self, item: T) {
        self.push(item);
    }

    #[inline]
    fn clear_all(&mut self) {
        self.clear();
    }
}

impl<T: Any> Collection for VecDeque<T> {
    type Item = T;

    fn items(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.iter())
    }

    #[inline]
    fn insert_at_end(&mut self, item: T) {
        self.push_back(item);
    }

    #[inline]
    fn clear_all(&mut self) {
        self.clear();
    }
}

impl<T: Any> Collection for LinkedList<T> {
    type Item = T;

    fn items(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.iter())
    }

    #[inline]
    fn insert_at_end(&mut self, item: T) {
        self.push_back(item);
    }

    #[inline]
    fn clear_all(&mut self) {
        self.clear();
    }
}

/// Sets iterate in key order, so insertion lands where `Ord` puts it.
impl<T: Any + Ord> Collection for BTreeSet<T> {
    type Item = T;

    fn items(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.iter())
    }

    #[inline]
    fn insert_at_end(&mut self, item: T) {
        self.insert(item);
    }

    #[inline]
    fn clear_all(&mut self) {
        self.clear();
    }
}

// -----------------------------------------------------------------------------
// CollectionAdapter

/// The type-erased form of [`Collection`] stored in a metatype.
pub trait CollectionAdapter: Send + Sync {
    /// Iterates the elements of `collection` in container order.
    fn iter<'a>(
        &self,
        collection: &'a dyn Any,
    ) -> Result<Box<dyn Iterator<Item = &'a dyn Any> + 'a>, ReflectError>;

    /// Appends `item`, which must hold the element type.
    fn insert_at_end(&self, collection: &mut dyn Any, item: Box<dyn Any>)
    -> Result<(), ReflectError>;

    fn clear(&self, collection: &mut dyn Any) -> Result<(), ReflectError>;
}

pub(crate) struct TypedAdapter<C>(PhantomData<fn(&C)>);

impl<C: Collection> TypedAdapter<C> {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<C: Collection> CollectionAdapter for TypedAdapter<C> {
    fn iter<'a>(
        &self,
        collection: &'a dyn Any,
    ) -> Result<Box<dyn Iterator<Item = &'a dyn Any> + 'a>, ReflectError> {
        let collection = downcast_ref::<C>(collection)?;
        Ok(Box::new(collection.items().map(|item| item as &dyn Any)))
    }

    fn insert_at_end(
        &self,
        collection: &mut dyn Any,
        item: Box<dyn Any>,
    ) -> Result<(), ReflectError> {
        let collection = downcast_mut::<C>(collection)?;
        match item.downcast::<C::Item>() {
            Ok(item) => {
                collection.insert_at_end(*item);
                Ok(())
            }
            Err(_) => Err(ReflectError::mismatch(
                type_name::<C::Item>(),
                "<erased>",
            )),
        }
    }

    fn clear(&self, collection: &mut dyn Any) -> Result<(), ReflectError> {
        downcast_mut::<C>(collection)?.clear_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_keeps_container_order() {
        let adapter = TypedAdapter::<VecDeque<u8>>::new();
        let mut deque = VecDeque::from([3_u8, 1]);

        adapter.insert_at_end(&mut deque, Box::new(2_u8)).unwrap();
        let seen: Vec<u8> = adapter
            .iter(&deque)
            .unwrap()
            .map(|item| *item.downcast_ref::<u8>().unwrap())
            .collect();
        assert_eq!(seen, [3, 1, 2]);

        assert!(adapter.insert_at_end(&mut deque, Box::new(2_u16)).is_err());
        assert!(adapter.clear(&mut Vec::<u8>::new()).is_err());

        adapter.clear(&mut deque).unwrap();
        assert!(deque.is_empty());
    }

    #[test]
    fn sets_and_lists() {
        let set_adapter = TypedAdapter::<BTreeSet<i32>>::new();
        let mut set = BTreeSet::new();
        for item in [5, -1, 3] {
            set_adapter.insert_at_end(&mut set, Box::new(item)).unwrap();
        }
        let seen: Vec<i32> = set.items().copied().collect();
        assert_eq!(seen, [-1, 3, 5]);

        let mut list = LinkedList::new();
        list.insert_at_end('a');
        list.insert_at_end('b');
        assert_eq!(list.items().collect::<String>(), "ab");
        list.clear_all();
        assert!(list.is_empty());
    }
}
