/// Generational handle: a slot index plus the generation it was issued under.
///
/// A handle whose generation no longer matches its slot refers to a freed
/// object and must be treated as dangling.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub const fn index(&self) -> u32 {
        self.index
    }

    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// The handle the same slot receives after it is freed and reused.
    pub const fn next_generation(&self) -> Self {
        Self::new(self.index, self.generation.wrapping_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::Handle;

    #[test]
    fn reused_slot_gets_distinct_handle() {
        let a = Handle::new(3, 0);
        let b = a.next_generation();
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert_eq!(b.generation(), 1);
    }
}
