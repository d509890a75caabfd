/// Generational handle: a slot index plus the generation the slot had when the
/// handle was issued.
///
/// A handle is only valid while its owner still reports the same generation for
/// that slot. Owners bump the generation when they destroy what the slot held, so
/// stale handles are detected instead of aliasing new contents.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::Handle;

    #[test]
    fn handles_differ_by_generation() {
        let a = Handle::new(3, 0);
        let b = Handle::new(3, 1);
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert_eq!(b.generation(), 1);
    }
}
