/// Durable marker of sync progress.
///
/// `last_indexed_block` is the resume cursor: the first block of the next range
/// the sync engine will fetch. Every block strictly below it has been fetched and
/// handed to the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Checkpoint {
    pub last_indexed_block: u64,
    pub latest_observed_block: u64,
}

impl Checkpoint {
    pub fn new(last_indexed_block: u64, latest_observed_block: u64) -> Self {
        Self {
            last_indexed_block,
            latest_observed_block,
        }
    }

    /// Number of observed blocks not yet covered by the cursor.
    pub fn difference(&self) -> u64 {
        self.latest_observed_block
            .saturating_sub(self.last_indexed_block)
    }
}
