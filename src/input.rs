use std::pin::Pin;

use futures::StreamExt;
use futures::stream::{self, Stream};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

use crate::config::INPUT_BUFFER_LEN;
use crate::domain::{AccountNumber, Error, LineSource, Money};
use crate::ledger::AccountTable;

pub struct LineReader<R> {
    reader: Option<R>,
}

impl<R> LineReader<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }
}

impl LineReader<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> LineSource for LineReader<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    type Lines = Pin<Box<dyn Stream<Item = Result<String, Error>> + Send>>;

    fn lines(&mut self) -> Self::Lines {
        let reader = match self.reader.take() {
            Some(r) => r,
            None => {
                // Already consumed; nothing left to read.
                return Box::pin(stream::empty());
            }
        };

        Box::pin(stream::unfold(reader, |mut reader| async move {
            let mut buf = Vec::new();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => None,
                Ok(_) => Some((Ok(decode_line(&buf)), reader)),
                Err(e) => Some((Err(Error::from(e)), reader)),
            }
        }))
    }
}

/// Keeps what fits the input buffer and drops the line terminator. Bytes that are not
/// UTF-8 are replaced rather than rejected; they can never start a number anyway.
fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len().min(INPUT_BUFFER_LEN - 1);
    // Never split a character: back off while the first dropped byte continues one.
    while end > 0 && end < raw.len() && raw[end] & 0xC0 == 0x80 {
        end -= 1;
    }
    let raw = &raw[..end];
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

pub async fn read_line<S>(lines: &mut S) -> Result<String, Error>
where
    S: Stream<Item = Result<String, Error>> + Unpin,
{
    lines.next().await.unwrap_or(Err(Error::EndOfInput))
}

pub async fn read_double<S>(lines: &mut S) -> Result<Money, Error>
where
    S: Stream<Item = Result<String, Error>> + Unpin,
{
    let line = read_line(lines).await?;
    parse_double(&line)
}

pub async fn read_positive_amount<S>(lines: &mut S) -> Result<Money, Error>
where
    S: Stream<Item = Result<String, Error>> + Unpin,
{
    let amount = read_double(lines).await?;
    if amount.is_negative() {
        return Err(Error::NegativeInput);
    }
    Ok(amount)
}

pub async fn read_account_number<S>(
    lines: &mut S,
    table: &AccountTable,
) -> Result<AccountNumber, Error>
where
    S: Stream<Item = Result<String, Error>> + Unpin,
{
    let value = read_double(lines).await?;
    to_account_number(value, table)
}

pub async fn read_open_account_number<S>(
    lines: &mut S,
    table: &AccountTable,
) -> Result<AccountNumber, Error>
where
    S: Stream<Item = Result<String, Error>> + Unpin,
{
    let number = read_account_number(lines, table).await?;
    table.validate_account_open(number)?;
    Ok(number)
}

pub fn parse_double(line: &str) -> Result<Money, Error> {
    Money::parse_prefix(line).ok_or(Error::FailedToReadDouble)
}

/// Truncates toward zero and checks the result names a slot of `table`.
fn to_account_number(value: Money, table: &AccountTable) -> Result<AccountNumber, Error> {
    let number = value.trunc_to_i64().unwrap_or(if value.is_negative() {
        i64::MIN
    } else {
        i64::MAX
    });
    table.validate_account_number(number)
}
