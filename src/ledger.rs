use tracing::{debug, info};

use crate::config::Layout;
use crate::domain::{Account, AccountNumber, AccountStatus, Error, Money};

/// Result of opening an account. The slot is open even when the initial deposit failed.
#[derive(Debug)]
pub struct Opened {
    pub number: AccountNumber,
    pub deposit: Result<Money, Error>,
}

/// Fixed-size pool of account slots. Owns every balance in the bank.
#[derive(Debug)]
pub struct AccountTable {
    layout: Layout,
    slots: Vec<Account>,
}

impl AccountTable {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            slots: vec![Account::new(); layout.capacity],
        }
    }

    /// Bounds-checked access to a slot by index.
    pub fn slot(&self, index: usize) -> Result<&Account, Error> {
        self.slots
            .get(index)
            .ok_or(Error::BadRange(index as i64))
    }

    pub fn slot_mut(&mut self, index: usize) -> Result<&mut Account, Error> {
        self.slots
            .get_mut(index)
            .ok_or(Error::BadRange(index as i64))
    }

    pub fn slot_to_account_number(&self, index: usize) -> AccountNumber {
        AccountNumber(self.layout.first_number + index as i64)
    }

    /// Offset of `number` from the first slot. Only a real index once validated.
    pub fn account_number_to_slot(&self, number: AccountNumber) -> i64 {
        number.0 - self.layout.first_number
    }

    pub fn validate_account_number(&self, number: i64) -> Result<AccountNumber, Error> {
        if number >= self.layout.first_number && number < self.layout.end_number() {
            Ok(AccountNumber(number))
        } else {
            Err(Error::BadRange(number))
        }
    }

    pub fn validate_account_open(&self, number: AccountNumber) -> Result<(), Error> {
        let account = self.account(number)?;
        if account.is_open() {
            Ok(())
        } else {
            Err(Error::AccountClosed(number))
        }
    }

    fn index_of(&self, number: AccountNumber) -> Result<usize, Error> {
        self.validate_account_number(number.0)?;
        Ok(self.account_number_to_slot(number) as usize)
    }

    fn account(&self, number: AccountNumber) -> Result<&Account, Error> {
        let index = self.index_of(number)?;
        self.slot(index)
    }

    fn open_account_mut(&mut self, number: AccountNumber) -> Result<&mut Account, Error> {
        self.validate_account_open(number)?;
        let index = self.index_of(number)?;
        self.slot_mut(index)
    }

    /// First closed slot in ascending order.
    pub fn next_closed_slot(&self) -> Option<usize> {
        self.slots.iter().position(|account| !account.is_open())
    }

    pub fn open(&mut self, deposit: Result<Money, Error>) -> Result<Opened, Error> {
        let index = self.next_closed_slot().ok_or(Error::NoFreeAccount)?;
        let number = self.slot_to_account_number(index);

        let account = self.slot_mut(index)?;
        account.status = AccountStatus::Open;
        account.balance = Money::zero();

        let deposit = deposit.and_then(|amount| {
            if amount.is_negative() {
                return Err(Error::NegativeInput);
            }
            account.balance = amount;
            Ok(amount)
        });

        match &deposit {
            Ok(amount) => info!(account = %number, balance = %amount, "opened account"),
            Err(e) => info!(account = %number, error = %e, "opened account without deposit"),
        }

        Ok(Opened { number, deposit })
    }

    pub fn deposit(&mut self, number: AccountNumber, amount: Money) -> Result<Money, Error> {
        if amount.is_negative() {
            return Err(Error::NegativeInput);
        }

        let account = self.open_account_mut(number)?;
        account.balance = account.balance.checked_add(amount).ok_or(Error::Overflow)?;

        debug!(account = %number, amount = %amount, balance = %account.balance, "deposit");
        Ok(account.balance)
    }

    pub fn withdraw(&mut self, number: AccountNumber, amount: Money) -> Result<Money, Error> {
        if amount.is_negative() {
            return Err(Error::NegativeInput);
        }

        let account = self.open_account_mut(number)?;
        if amount > account.balance {
            return Err(Error::NoFunds);
        }
        account.balance = account.balance.checked_sub(amount).ok_or(Error::Overflow)?;

        debug!(account = %number, amount = %amount, balance = %account.balance, "withdrawal");
        Ok(account.balance)
    }

    /// Adds `percent`% to every open account. All or nothing: if any balance would
    /// overflow, no account changes.
    pub fn apply_interest(&mut self, percent: Money) -> Result<usize, Error> {
        if percent.is_negative() {
            return Err(Error::NegativeInput);
        }

        let mut updated = Vec::new();
        for (index, account) in self.slots.iter().enumerate() {
            if account.is_open() {
                let balance = account
                    .balance
                    .percent_of(percent)
                    .and_then(|interest| account.balance.checked_add(interest))
                    .ok_or(Error::Overflow)?;
                updated.push((index, balance));
            }
        }

        for (index, balance) in &updated {
            self.slots[*index].balance = *balance;
        }

        info!(percent = %percent, accounts = updated.len(), "applied interest");
        Ok(updated.len())
    }

    pub fn balance(&self, number: AccountNumber) -> Result<Money, Error> {
        self.validate_account_open(number)?;
        Ok(self.account(number)?.balance)
    }

    /// Closes an open account. The balance is left in place but no longer meaningful.
    pub fn close(&mut self, number: AccountNumber) -> Result<(), Error> {
        let account = self.open_account_mut(number)?;
        account.status = AccountStatus::Closed;

        info!(account = %number, "closed account");
        Ok(())
    }

    pub fn close_all(&mut self) {
        for account in &mut self.slots {
            account.status = AccountStatus::Closed;
        }
        debug!(slots = self.slots.len(), "closed all accounts");
    }

    /// Open accounts in ascending slot order.
    pub fn open_accounts(&self) -> impl Iterator<Item = (AccountNumber, Money)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, account)| account.is_open())
            .map(|(index, account)| (self.slot_to_account_number(index), account.balance))
    }
}

impl Default for AccountTable {
    fn default() -> Self {
        Self::new(Layout::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ACCOUNT_NUMBER_START, NUM_ACCOUNTS};
    use rust_decimal::Decimal;

    fn money(s: &str) -> Money {
        Money::parse_prefix(s).unwrap()
    }

    fn small_table() -> AccountTable {
        AccountTable::new(Layout::new(901, 2))
    }

    #[test]
    fn starts_with_every_slot_closed() {
        let table = AccountTable::default();
        assert!(table.slot(NUM_ACCOUNTS).is_err());
        for index in 0..NUM_ACCOUNTS {
            let account = table.slot(index).unwrap();
            assert_eq!(account.status, AccountStatus::Closed);
            assert_eq!(account.balance, Money::zero());
        }
        assert_eq!(table.open_accounts().count(), 0);
    }

    #[test]
    fn slot_and_account_number_are_inverse() {
        let table = AccountTable::default();
        for index in 0..NUM_ACCOUNTS {
            let number = table.slot_to_account_number(index);
            assert_eq!(number.0, ACCOUNT_NUMBER_START + index as i64);
            assert_eq!(table.account_number_to_slot(number), index as i64);
        }
    }

    #[test]
    fn slot_access_is_bounds_checked() {
        let mut table = small_table();
        assert!(table.slot(1).is_ok());
        assert!(matches!(table.slot(2), Err(Error::BadRange(2))));
        assert!(matches!(table.slot_mut(7), Err(Error::BadRange(7))));
    }

    #[test]
    fn validates_account_number_range() {
        let table = AccountTable::default();
        let end = ACCOUNT_NUMBER_START + NUM_ACCOUNTS as i64;
        for n in (ACCOUNT_NUMBER_START - 5)..(end + 5) {
            let valid = (ACCOUNT_NUMBER_START..end).contains(&n);
            assert_eq!(table.validate_account_number(n).is_ok(), valid, "number {n}");
        }
        assert!(matches!(
            table.validate_account_number(i64::MIN),
            Err(Error::BadRange(_))
        ));
    }

    #[test]
    fn validate_open_checks_range_before_status() {
        let mut table = small_table();
        table.open(Ok(money("1"))).unwrap();

        assert!(table.validate_account_open(AccountNumber(901)).is_ok());
        assert!(matches!(
            table.validate_account_open(AccountNumber(902)),
            Err(Error::AccountClosed(AccountNumber(902)))
        ));
        assert!(matches!(
            table.validate_account_open(AccountNumber(903)),
            Err(Error::BadRange(903))
        ));
    }

    #[test]
    fn open_takes_first_closed_slot() {
        let mut table = small_table();
        let first = table.open(Ok(money("100"))).unwrap();
        assert_eq!(first.number, AccountNumber(901));
        assert_eq!(first.deposit.unwrap(), money("100"));

        let second = table.open(Ok(money("50"))).unwrap();
        assert_eq!(second.number, AccountNumber(902));

        assert!(matches!(table.open(Ok(money("1"))), Err(Error::NoFreeAccount)));

        table.close(AccountNumber(901)).unwrap();
        let reopened = table.open(Ok(money("5"))).unwrap();
        assert_eq!(reopened.number, AccountNumber(901));
        assert_eq!(table.balance(AccountNumber(901)).unwrap(), money("5"));
    }

    #[test]
    fn open_with_failed_deposit_still_opens_with_zero_balance() {
        let mut table = small_table();
        table.open(Ok(money("70"))).unwrap();
        table.close(AccountNumber(901)).unwrap();

        let opened = table.open(Err(Error::FailedToReadDouble)).unwrap();
        assert_eq!(opened.number, AccountNumber(901));
        assert!(matches!(opened.deposit, Err(Error::FailedToReadDouble)));
        assert_eq!(table.balance(AccountNumber(901)).unwrap(), Money::zero());

        let opened = table.open(Ok(money("-5"))).unwrap();
        assert!(matches!(opened.deposit, Err(Error::NegativeInput)));
        assert!(table.slot(1).unwrap().is_open());
        assert_eq!(table.balance(AccountNumber(902)).unwrap(), Money::zero());
    }

    #[test]
    fn deposit_adds_to_open_accounts_only() {
        let mut table = small_table();
        table.open(Ok(money("10"))).unwrap();

        assert_eq!(
            table.deposit(AccountNumber(901), money("2.5")).unwrap(),
            money("12.5")
        );
        assert!(matches!(
            table.deposit(AccountNumber(902), money("1")),
            Err(Error::AccountClosed(_))
        ));
        assert!(matches!(
            table.deposit(AccountNumber(901), money("-1")),
            Err(Error::NegativeInput)
        ));
        assert_eq!(table.balance(AccountNumber(901)).unwrap(), money("12.5"));
    }

    #[test]
    fn withdrawal_never_overdraws() {
        let mut table = small_table();
        table.open(Ok(money("50"))).unwrap();

        assert!(matches!(
            table.withdraw(AccountNumber(901), money("50.01")),
            Err(Error::NoFunds)
        ));
        assert_eq!(table.balance(AccountNumber(901)).unwrap(), money("50"));

        assert_eq!(
            table.withdraw(AccountNumber(901), money("50")).unwrap(),
            Money::zero()
        );
    }

    #[test]
    fn interest_applies_to_open_accounts_and_counts_them() {
        let mut table = AccountTable::new(Layout::new(901, 3));
        table.open(Ok(money("100"))).unwrap();
        table.open(Ok(money("40"))).unwrap();
        table.open(Ok(money("60"))).unwrap();
        table.close(AccountNumber(902)).unwrap();

        assert_eq!(table.apply_interest(money("2.5")).unwrap(), 2);
        assert_eq!(table.balance(AccountNumber(901)).unwrap(), money("102.5"));
        assert_eq!(table.balance(AccountNumber(903)).unwrap(), money("61.5"));
        assert_eq!(table.slot(1).unwrap().balance, money("40"));
    }

    #[test]
    fn interest_overflow_changes_nothing() {
        let mut table = small_table();
        table.open(Ok(money("1"))).unwrap();
        table.open(Ok(Money(Decimal::MAX))).unwrap();

        assert!(matches!(
            table.apply_interest(money("100")),
            Err(Error::Overflow)
        ));
        assert_eq!(table.balance(AccountNumber(901)).unwrap(), money("1"));
    }

    #[test]
    fn deposit_overflow_changes_nothing() {
        let mut table = small_table();
        table.open(Ok(Money(Decimal::MAX))).unwrap();

        assert!(matches!(
            table.deposit(AccountNumber(901), money("1")),
            Err(Error::Overflow)
        ));
        assert_eq!(table.balance(AccountNumber(901)).unwrap(), Money(Decimal::MAX));
    }

    #[test]
    fn close_keeps_balance_and_rejects_closed_accounts() {
        let mut table = small_table();
        table.open(Ok(money("30"))).unwrap();

        table.close(AccountNumber(901)).unwrap();
        assert_eq!(table.slot(0).unwrap().status, AccountStatus::Closed);
        assert_eq!(table.slot(0).unwrap().balance, money("30"));

        assert!(matches!(
            table.close(AccountNumber(901)),
            Err(Error::AccountClosed(_))
        ));
        assert_eq!(table.slot(0).unwrap().balance, money("30"));
        assert!(matches!(
            table.close(AccountNumber(900)),
            Err(Error::BadRange(900))
        ));
    }

    #[test]
    fn close_all_closes_every_slot() {
        let mut table = small_table();
        table.open(Ok(money("1"))).unwrap();
        table.open(Ok(money("2"))).unwrap();

        table.close_all();
        assert_eq!(table.open_accounts().count(), 0);
        assert_eq!(table.next_closed_slot(), Some(0));
    }

    #[test]
    fn pool_of_two_scenario() {
        let mut table = small_table();

        assert_eq!(table.open(Ok(money("100"))).unwrap().number, AccountNumber(901));
        assert_eq!(table.open(Ok(money("50"))).unwrap().number, AccountNumber(902));
        assert!(matches!(table.open(Ok(money("1"))), Err(Error::NoFreeAccount)));

        assert_eq!(
            table.withdraw(AccountNumber(901), money("30")).unwrap().to_string(),
            "70.00"
        );
        assert!(matches!(
            table.withdraw(AccountNumber(902), money("1000")),
            Err(Error::NoFunds)
        ));
        assert_eq!(table.balance(AccountNumber(902)).unwrap().to_string(), "50.00");

        assert_eq!(table.apply_interest(money("10")).unwrap(), 2);
        assert_eq!(table.balance(AccountNumber(901)).unwrap().to_string(), "77.00");
        assert_eq!(table.balance(AccountNumber(902)).unwrap().to_string(), "55.00");

        table.close(AccountNumber(901)).unwrap();
        let open: Vec<_> = table
            .open_accounts()
            .map(|(number, balance)| (number.0, balance.to_string()))
            .collect();
        assert_eq!(open, vec![(902, "55.00".to_string())]);
    }
}
