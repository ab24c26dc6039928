/// Generational handle: (slot index, generation).
///
/// A slot can be reused after its occupant is freed; the generation tells a
/// stale handle apart from the slot's current occupant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32, u32);

impl Handle {
    pub const fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }

    pub const fn index(self) -> u32 {
        self.0
    }

    pub const fn generation(self) -> u32 {
        self.1
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.0, self.1)
    }
}
