pub(crate) mod checkpoint_repository;
pub(crate) mod leaf_repository;
pub(crate) mod unspent_repository;

/// Rows per INSERT statement.
pub(crate) const INSERT_CHUNK_SIZE: usize = 500;
