//! Refcounted slot heap
//!
//! Objects live in a vector of slots addressed by [`HostRef`]. A slot is
//! freed when its reference count reaches zero; freeing releases the
//! references the object owns, iteratively, so deep structures do not
//! recurse. Recycled slots bump their generation so stale references are
//! detected instead of aliasing a new object.

use tether_sdk::HostRef;
use thiserror::Error;

use crate::object::Object;

/// Heap failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeapError {
    /// Configured object limit reached
    #[error("object limit of {limit} reached")]
    LimitReached {
        /// The configured limit
        limit: usize,
    },

    /// No more encodable slot indices
    #[error("host heap exhausted")]
    Exhausted,
}

struct Slot {
    generation: u32,
    refcount: usize,
    object: Option<Object>,
}

/// Object heap
pub struct Heap {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    /// Maximum number of live objects (None = unlimited)
    limit: Option<usize>,
}

impl Heap {
    /// Create an empty heap
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            limit,
        }
    }

    /// Change the object limit
    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    /// Number of live objects
    pub fn live(&self) -> usize {
        self.live
    }

    /// Store an object with a reference count of one.
    ///
    /// On failure the object is dropped and the references it owned are
    /// released.
    pub fn alloc(&mut self, object: Object) -> Result<HostRef, HeapError> {
        let index = match self.reserve() {
            Ok(index) => index,
            Err(err) => {
                for child in object.children() {
                    self.decref(child);
                }
                return Err(err);
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.refcount = 1;
        slot.object = Some(object);
        self.live += 1;
        Ok(HostRef::from_parts(index, slot.generation))
    }

    fn reserve(&mut self) -> Result<u32, HeapError> {
        if let Some(limit) = self.limit {
            if self.live >= limit {
                return Err(HeapError::LimitReached { limit });
            }
        }
        if let Some(index) = self.free.pop() {
            return Ok(index);
        }
        let index = u32::try_from(self.slots.len()).map_err(|_| HeapError::Exhausted)?;
        if index > HostRef::MAX_INDEX {
            return Err(HeapError::Exhausted);
        }
        self.slots.push(Slot {
            generation: 0,
            refcount: 0,
            object: None,
        });
        Ok(index)
    }

    /// Is `obj` a live reference
    pub fn contains(&self, obj: HostRef) -> bool {
        self.slots
            .get(obj.index() as usize)
            .map(|slot| slot.generation == obj.generation() && slot.object.is_some())
            .unwrap_or(false)
    }

    /// Borrow a live object.
    ///
    /// # Panics
    /// Panics on a freed or foreign reference.
    pub fn get(&self, obj: HostRef) -> &Object {
        match self.slot(obj).object.as_ref() {
            Some(object) => object,
            None => panic!("use of freed host object {:?}", obj),
        }
    }

    /// Mutably borrow a live object.
    ///
    /// # Panics
    /// Panics on a freed or foreign reference.
    pub fn get_mut(&mut self, obj: HostRef) -> &mut Object {
        match self.slot_mut(obj).object.as_mut() {
            Some(object) => object,
            None => panic!("use of freed host object {:?}", obj),
        }
    }

    /// Add one reference
    pub fn incref(&mut self, obj: HostRef) {
        self.slot_mut(obj).refcount += 1;
    }

    /// Drop one reference, freeing everything that becomes unreachable
    pub fn decref(&mut self, obj: HostRef) {
        let mut pending = vec![obj];
        while let Some(obj) = pending.pop() {
            let slot = self.slot_mut(obj);
            slot.refcount -= 1;
            if slot.refcount > 0 {
                continue;
            }
            let object = slot.object.take();
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(obj.index());
            self.live -= 1;
            if let Some(object) = object {
                pending.extend(object.children());
            }
        }
    }

    /// Current reference count
    pub fn refcount(&self, obj: HostRef) -> usize {
        self.slot(obj).refcount
    }

    fn slot(&self, obj: HostRef) -> &Slot {
        match self.slots.get(obj.index() as usize) {
            Some(slot) if slot.generation == obj.generation() && slot.object.is_some() => slot,
            _ => panic!("use of freed host object {:?}", obj),
        }
    }

    fn slot_mut(&mut self, obj: HostRef) -> &mut Slot {
        match self.slots.get_mut(obj.index() as usize) {
            Some(slot) if slot.generation == obj.generation() && slot.object.is_some() => slot,
            _ => panic!("use of freed host object {:?}", obj),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_free() {
        let mut heap = Heap::new(None);
        let s = heap.alloc(Object::Str("hi".into())).unwrap();
        assert_eq!(heap.live(), 1);
        assert_eq!(heap.refcount(s), 1);
        heap.incref(s);
        heap.decref(s);
        assert!(heap.contains(s));
        heap.decref(s);
        assert!(!heap.contains(s));
        assert_eq!(heap.live(), 0);
    }

    #[test]
    fn test_freeing_container_releases_children() {
        let mut heap = Heap::new(None);
        let a = heap.alloc(Object::Int(1)).unwrap();
        let b = heap.alloc(Object::Int(2)).unwrap();
        let list = heap.alloc(Object::List(vec![a, b])).unwrap();
        heap.incref(a);
        heap.decref(list);
        assert!(heap.contains(a));
        assert!(!heap.contains(b));
        assert_eq!(heap.live(), 1);
    }

    #[test]
    fn test_recycled_slot_changes_generation() {
        let mut heap = Heap::new(None);
        let first = heap.alloc(Object::None).unwrap();
        heap.decref(first);
        let second = heap.alloc(Object::None).unwrap();
        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());
        assert!(!heap.contains(first));
    }

    #[test]
    fn test_limit() {
        let mut heap = Heap::new(Some(1));
        let a = heap.alloc(Object::Int(1)).unwrap();
        assert_eq!(
            heap.alloc(Object::Int(2)),
            Err(HeapError::LimitReached { limit: 1 })
        );
        heap.decref(a);
        assert!(heap.alloc(Object::Int(3)).is_ok());
    }

    #[test]
    fn test_failed_alloc_releases_children() {
        let mut heap = Heap::new(Some(2));
        let a = heap.alloc(Object::Int(1)).unwrap();
        let b = heap.alloc(Object::Int(2)).unwrap();
        heap.incref(a);
        assert!(heap.alloc(Object::List(vec![a])).is_err());
        assert_eq!(heap.refcount(a), 1);
        heap.decref(b);
        assert_eq!(heap.live(), 1);
    }

    #[test]
    #[should_panic(expected = "use of freed host object")]
    fn test_stale_reference_panics() {
        let mut heap = Heap::new(None);
        let a = heap.alloc(Object::Int(1)).unwrap();
        heap.decref(a);
        heap.incref(a);
    }
}
