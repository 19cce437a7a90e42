use crate::domain::AccountNumber;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error("Failed to read the amount")]
    FailedToReadDouble,

    #[error("Cannot get a negative amount")]
    NegativeInput,

    #[error("Invalid account number {0}")]
    BadRange(i64),

    #[error("Account {0} is closed")]
    AccountClosed(AccountNumber),

    #[error("Cannot withdraw more than the balance")]
    NoFunds,

    #[error("There are no free accounts to use")]
    NoFreeAccount,

    #[error("Invalid transaction type: {0:?}")]
    InvalidCommand(String),

    #[error("Amount is out of the representable range")]
    Overflow,

    #[error("Input ended")]
    EndOfInput,
}

impl Error {
    /// Domain failures are reported to the user and the menu carries on. Running out of
    /// input or failing to talk to the terminal ends the session.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::IO(_) | Error::EndOfInput)
    }
}
