use std::str::FromStr;

use crate::domain::Error;

/// One entry of the transaction menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Open,
    Balance,
    Deposit,
    Withdraw,
    Interest,
    Close,
    Print,
    Exit,
}

impl Command {
    pub const USAGE: &'static str = "Please choose a transaction type:\n \
        O-Open Account\n \
        B-Balance Inquiry\n \
        D-Deposit\n \
        W-Withdrawal\n \
        C-Close Account\n \
        I-Interest\n \
        P-Print\n \
        E-Exit\n";
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = match s.trim().to_ascii_uppercase().as_str() {
            "O" => Command::Open,
            "B" => Command::Balance,
            "D" => Command::Deposit,
            "W" => Command::Withdraw,
            "I" => Command::Interest,
            "C" => Command::Close,
            "P" => Command::Print,
            "E" => Command::Exit,
            other => return Err(Error::InvalidCommand(other.to_string())),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_letters_case_insensitively() {
        assert_eq!("o".parse::<Command>().unwrap(), Command::Open);
        assert_eq!("B".parse::<Command>().unwrap(), Command::Balance);
        assert_eq!("d\n".parse::<Command>().unwrap(), Command::Deposit);
        assert_eq!("  w  ".parse::<Command>().unwrap(), Command::Withdraw);
        assert_eq!("I".parse::<Command>().unwrap(), Command::Interest);
        assert_eq!("c".parse::<Command>().unwrap(), Command::Close);
        assert_eq!("p".parse::<Command>().unwrap(), Command::Print);
        assert_eq!("E".parse::<Command>().unwrap(), Command::Exit);
    }

    #[test]
    fn rejects_anything_else() {
        for input in ["", "x", "OO", "open", "1"] {
            assert!(matches!(
                input.parse::<Command>(),
                Err(Error::InvalidCommand(_))
            ));
        }
    }

    #[test]
    fn usage_lists_every_letter() {
        for letter in ["O-", "B-", "D-", "W-", "C-", "I-", "P-", "E-"] {
            assert!(Command::USAGE.contains(letter));
        }
    }
}
