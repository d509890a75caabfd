use foundation::handles::Handle;

/// Weak reference to a marker in the [`MarkerRegistry`](crate::registry::MarkerRegistry).
///
/// The generation is the registry's display-set epoch; every recompute bumps it,
/// so ids issued before a recompute never resolve afterwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub Handle);

impl MarkerId {
    pub fn index(&self) -> u32 {
        self.0.index()
    }

    pub fn generation(&self) -> u32 {
        self.0.generation()
    }
}
