use std::{collections::HashMap, fmt, num::NonZeroU32, rc::Rc};

/// A handle to an interned identifier. To retrieve the `&str`, use
/// [`Interner::get`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interned {
    // NonZeroU32 keeps `Option<Interned>` the size of a `u32`.
    handle: NonZeroU32,
}

impl fmt::Debug for Interned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interned({})", self.handle)
    }
}

impl From<&Interned> for Interned {
    fn from(value: &Interned) -> Self {
        *value
    }
}

/// Identifier table shared by the parser, which interns every name it reads,
/// and the later stages, which only look names up.
#[derive(Default)]
pub struct Interner {
    map: HashMap<Rc<str>, Interned>,
    vec: Vec<Rc<str>>,
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (i, interned) in self.vec.iter().enumerate() {
            map.entry(&(i + 1), &interned);
        }
        map.finish()
    }
}

impl Interner {
    pub fn with_capacity(capacity: usize) -> Self {
        Interner {
            map: HashMap::with_capacity(capacity),
            vec: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    /// Interns the provided name, returning a handle which can be used to
    /// retrieve it later.
    pub fn intern(&mut self, name: &str) -> Interned {
        if let Some(handle) = self.map.get(name) {
            return *handle;
        }
        let handle = u32::try_from(self.vec.len())
            .ok()
            .and_then(|len| NonZeroU32::new(len + 1))
            .expect("interner out of capacity");
        let handle = Interned { handle };
        let key: Rc<str> = Rc::from(name);
        self.vec.push(Rc::clone(&key));
        self.map.insert(key, handle);
        handle
    }

    /// Returns the handle of an already interned name, without interning it.
    pub fn lookup(&self, name: &str) -> Option<Interned> {
        self.map.get(name).copied()
    }

    /// Returns the corresponding name for the provided [`Interned`] handle.
    /// Panics if not found.
    pub fn get(&self, handle: impl Into<Interned>) -> &str {
        let handle: Interned = handle.into();
        &self.vec[handle.handle.get() as usize - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interner() {
        let mut i = Interner::with_capacity(3);

        let hello1 = i.intern("hello");
        let world1 = i.intern("world");
        let dotted = i.intern("console");

        let hello2 = i.intern("hello");
        let world2 = i.intern("world");

        assert_eq!(hello1, hello2);
        assert_eq!(world1, world2);
        assert_ne!(hello1, world1);

        assert_eq!(i.get(hello1), "hello");
        assert_eq!(i.get(&world2), "world");
        assert_eq!(i.get(dotted), "console");
        assert_eq!(i.len(), 3);

        assert_eq!(i.lookup("world"), Some(world1));
        assert_eq!(i.lookup("missing"), None);
        assert_eq!(i.len(), 3);
    }
}
