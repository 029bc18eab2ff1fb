use crate::PageId;

/// The three-way error taxonomy the queue surfaces to its caller.
///
/// Contract violations (bad arguments, misuse of `reclaim`, re-entering a
/// drain) are not part of this enum — those are programmer errors and are
/// raised with `assert!`/`debug_assert!` at the call site instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io error")]
    Io(#[from] std::io::Error),

    /// A durability-breaking inconsistency was observed on disk. Callers
    /// must abort the transaction and mark the database non-writable.
    #[error("corrupt database: {0}")]
    Corrupt(#[from] Corruption),
}

#[derive(thiserror::Error, Debug)]
pub enum Corruption {
    #[error("page {page} is out of bounds")]
    PageOutOfBounds { page: PageId },

    #[error("doubly freed page {page}")]
    DoublyFreedPage { page: PageId },

    #[error("doubly freed node {node}")]
    DoublyFreedNode { node: PageId },
}

pub type Result<T> = std::result::Result<T, Error>;
