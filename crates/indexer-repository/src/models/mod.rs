pub(crate) mod leaf;
pub(crate) mod sync_checkpoint;
pub(crate) mod unspent;
