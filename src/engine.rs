use std::io::Write;

use tracing::{debug, warn};

use crate::domain::{AccountNumber, Command, Error, LineSource};
use crate::input;
use crate::ledger::AccountTable;

/// The interactive menu: reads commands from `input`, runs them against the account
/// table and writes every prompt and outcome to `out`.
#[derive(Debug)]
pub struct Bank<I, W>
where
    I: LineSource,
    W: Write,
{
    input: I,
    table: AccountTable,
    out: W,
}

impl<I, W> Bank<I, W>
where
    I: LineSource,
    W: Write,
{
    pub fn new(input: I, table: AccountTable, out: W) -> Self {
        Self { input, table, out }
    }

    /// Runs the menu until `E` or the end of input. Only terminal I/O failures are
    /// returned; every other error is shown to the user.
    pub async fn run(&mut self) -> Result<(), Error> {
        let mut lines = self.input.lines();

        loop {
            write!(self.out, "\n{}", Command::USAGE)?;
            self.out.flush()?;

            let line = match input::read_line(&mut lines).await {
                Ok(line) => line,
                Err(Error::EndOfInput) => break,
                Err(e) => return Err(e),
            };

            let outcome = match line.parse::<Command>() {
                Ok(Command::Exit) => break,
                Ok(command) => {
                    debug!(?command, "dispatching");
                    self.dispatch(command, &mut lines).await
                }
                Err(e) => {
                    warn!(error = %e, "rejected menu input");
                    write!(self.out, "Invalid transaction type").map_err(Error::from)
                }
            };

            match outcome {
                Ok(()) => {}
                Err(Error::EndOfInput) => break,
                Err(e) => return Err(e),
            }
            writeln!(self.out)?;
        }

        self.table.close_all();
        self.out.flush()?;
        Ok(())
    }

    async fn dispatch(&mut self, command: Command, lines: &mut I::Lines) -> Result<(), Error> {
        match command {
            Command::Open => self.open(lines).await,
            Command::Balance => self.balance(lines).await,
            Command::Deposit => self.deposit(lines).await,
            Command::Withdraw => self.withdraw(lines).await,
            Command::Interest => self.interest(lines).await,
            Command::Close => self.close(lines).await,
            Command::Print => self.print(),
            Command::Exit => Ok(()),
        }
    }

    async fn open(&mut self, lines: &mut I::Lines) -> Result<(), Error> {
        if self.table.next_closed_slot().is_none() {
            write!(self.out, "{}", Error::NoFreeAccount)?;
            return Ok(());
        }

        self.prompt("Please enter amount for deposit: ")?;
        let deposit = match input::read_positive_amount(lines).await {
            Err(e) if !e.is_recoverable() => return Err(e),
            other => other,
        };

        let opened = match self.table.open(deposit) {
            Ok(opened) => opened,
            Err(e) => {
                write!(self.out, "{}", e)?;
                return Ok(());
            }
        };

        match opened.deposit {
            Ok(_) => write!(self.out, "New account number is: {}", opened.number)?,
            Err(e) => self.report_amount_error(&e, "deposit")?,
        }
        Ok(())
    }

    async fn balance(&mut self, lines: &mut I::Lines) -> Result<(), Error> {
        let Some(number) = self.open_account_number(lines, true).await? else {
            return Ok(());
        };
        let balance = self.table.balance(number)?;
        write!(
            self.out,
            "The balance of account number {} is: {}",
            number, balance
        )?;
        Ok(())
    }

    async fn deposit(&mut self, lines: &mut I::Lines) -> Result<(), Error> {
        let Some(number) = self.open_account_number(lines, true).await? else {
            return Ok(());
        };

        self.prompt("Please enter amount for deposit: ")?;
        let result = match input::read_positive_amount(lines).await {
            Ok(amount) => self.table.deposit(number, amount),
            Err(e) => Err(e),
        };

        match result {
            Ok(balance) => write!(self.out, "The new balance is: {}", balance)?,
            Err(e) if e.is_recoverable() => self.report_amount_error(&e, "deposit")?,
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn withdraw(&mut self, lines: &mut I::Lines) -> Result<(), Error> {
        let Some(number) = self.open_account_number(lines, true).await? else {
            return Ok(());
        };

        self.prompt("Please enter the amount to withdraw: ")?;
        let result = match input::read_positive_amount(lines).await {
            Ok(amount) => self.table.withdraw(number, amount),
            Err(e) => Err(e),
        };

        match result {
            Ok(balance) => write!(self.out, "The new balance is: {}", balance)?,
            Err(e) if e.is_recoverable() => self.report_amount_error(&e, "withdraw")?,
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn interest(&mut self, lines: &mut I::Lines) -> Result<(), Error> {
        self.prompt("Please enter interest rate: ")?;
        let result = match input::read_positive_amount(lines).await {
            Ok(percent) => self.table.apply_interest(percent),
            Err(e) => Err(e),
        };

        match result {
            Ok(_) => {}
            Err(Error::FailedToReadDouble) => {
                write!(self.out, "Failed to read the interest rate")?
            }
            Err(Error::NegativeInput) => write!(self.out, "Invalid interest rate")?,
            Err(e) if e.is_recoverable() => write!(self.out, "{}", e)?,
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn close(&mut self, lines: &mut I::Lines) -> Result<(), Error> {
        let Some(number) = self.account_number(lines, true).await? else {
            return Ok(());
        };

        match self.table.close(number) {
            Ok(()) => write!(self.out, "Closed account number {}", number)?,
            Err(Error::AccountClosed(_)) => write!(self.out, "This account is already closed")?,
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn print(&mut self) -> Result<(), Error> {
        let mut first = true;
        for (number, balance) in self.table.open_accounts() {
            if !first {
                writeln!(self.out)?;
            }
            write!(
                self.out,
                "The balance of account number {} is: {}",
                number, balance
            )?;
            first = false;
        }
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> Result<(), Error> {
        write!(self.out, "{}", text)?;
        self.out.flush()?;
        Ok(())
    }

    /// Prompts for a range-checked account number. `Ok(None)` means the number was
    /// rejected and the transaction is over; when `verbose`, the user was told why.
    async fn account_number(
        &mut self,
        lines: &mut I::Lines,
        verbose: bool,
    ) -> Result<Option<AccountNumber>, Error> {
        if verbose {
            self.prompt("Please enter account number: ")?;
        }

        let result = input::read_account_number(lines, &self.table).await;
        match result {
            Ok(number) => Ok(Some(number)),
            Err(e) if e.is_recoverable() => {
                if verbose {
                    self.report_account_error(&e)?;
                }
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Like [`Self::account_number`], and the account must also be open.
    async fn open_account_number(
        &mut self,
        lines: &mut I::Lines,
        verbose: bool,
    ) -> Result<Option<AccountNumber>, Error> {
        if verbose {
            self.prompt("Please enter account number: ")?;
        }

        let result = input::read_open_account_number(lines, &self.table).await;
        match result {
            Ok(number) => Ok(Some(number)),
            Err(e) if e.is_recoverable() => {
                // A closed account is reported even when quiet.
                if verbose || matches!(e, Error::AccountClosed(_)) {
                    self.report_account_error(&e)?;
                }
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn report_account_error(&mut self, error: &Error) -> Result<(), Error> {
        match error {
            Error::BadRange(_) => write!(self.out, "Invalid account number")?,
            Error::FailedToReadDouble => write!(self.out, "Failed to read the account number")?,
            Error::AccountClosed(_) => write!(self.out, "This account is closed")?,
            other => write!(self.out, "{}", other)?,
        }
        Ok(())
    }

    fn report_amount_error(&mut self, error: &Error, action: &str) -> Result<(), Error> {
        match error {
            Error::FailedToReadDouble => write!(self.out, "Failed to read the amount")?,
            Error::NegativeInput => write!(self.out, "Cannot {} a negative amount", action)?,
            Error::NoFunds => write!(self.out, "Cannot withdraw more than the balance")?,
            other => write!(self.out, "{}", other)?,
        }
        Ok(())
    }
}
