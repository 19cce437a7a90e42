/// Account number of slot 0.
pub const ACCOUNT_NUMBER_START: i64 = 901;

/// Number of slots in the account table.
pub const NUM_ACCOUNTS: usize = 50;

/// Size of the input line buffer. One byte is reserved, so a line carries at most
/// `INPUT_BUFFER_LEN - 1` bytes of user text.
pub const INPUT_BUFFER_LEN: usize = 256;

/// Shape of the account table: where numbering starts and how many slots exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub first_number: i64,
    pub capacity: usize,
}

impl Layout {
    pub fn new(first_number: i64, capacity: usize) -> Self {
        Self {
            first_number,
            capacity,
        }
    }

    /// One past the highest valid account number.
    pub fn end_number(&self) -> i64 {
        self.first_number + self.capacity as i64
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(ACCOUNT_NUMBER_START, NUM_ACCOUNTS)
    }
}
