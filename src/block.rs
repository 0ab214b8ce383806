/// Cache storage entities.
/// A `Block` is the smallest unit of storage: one cache line's worth of
/// simulated words plus the bookkeeping the replacement policy needs.
/// A `Set` is the fixed run of blocks a given address can map to.

/// Recency value of a block that has never held data.
pub const RECENCY_EMPTY: i64 = -1;

/// Recency value of the most-recently-used block in a set.
pub const RECENCY_FRESH: i64 = 0;

/// One cache line slot.
///
/// `recency` is a relative ordering counter, not a timestamp: `-1` means the
/// slot has never been used, `0` means most-recently-used, and larger values
/// mean older. A block with `recency == -1` is always invalid.
#[derive(Debug, Clone)]
pub struct Block {
    /// Which memory line currently occupies this slot
    pub tag: u64,
    /// Whether the slot holds live data
    pub valid: bool,
    /// LRU ordering counter (-1 = empty, 0 = freshest, larger = older)
    pub recency: i64,
    /// Simulated stored words, length = block size.
    /// Seeded at insertion as a consecutive run starting at the accessed
    /// address; hit detection searches these values (see `Cache`).
    pub contents: Vec<u64>,
}

impl Block {
    /// An empty slot holding `block_size` placeholder words.
    pub fn empty(block_size: usize) -> Self {
        Block {
            tag: 0,
            valid: false,
            recency: RECENCY_EMPTY,
            contents: vec![0; block_size],
        }
    }

    /// Overwrite this slot in place with a freshly inserted line.
    /// The stored words are `block_size` consecutive integers starting at the
    /// raw accessed address.
    pub fn fill(&mut self, addr: u64, tag: u64) {
        for (i, word) in self.contents.iter_mut().enumerate() {
            *word = addr + i as u64;
        }
        self.tag = tag;
        self.valid = true;
        self.recency = RECENCY_FRESH;
    }

    /// Whether this slot has never held data.
    pub fn is_empty(&self) -> bool {
        self.recency == RECENCY_EMPTY
    }
}

/// A fixed-length run of blocks (length = associativity).
/// Search is always linear in slot order; there is no ordering invariant
/// beyond slot identity.
#[derive(Debug, Clone)]
pub struct Set {
    pub blocks: Vec<Block>,
}

impl Set {
    /// A set of `associativity` empty slots.
    pub fn new(associativity: usize, block_size: usize) -> Self {
        Set {
            blocks: (0..associativity).map(|_| Block::empty(block_size)).collect(),
        }
    }

    /// True if at least one slot has never been filled.
    pub fn has_space(&self) -> bool {
        self.blocks.iter().any(|b| !b.valid)
    }
}
