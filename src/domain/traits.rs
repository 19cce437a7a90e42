use futures::Stream;

use crate::domain::Error;

/// Where the menu reads its lines from: stdin in the binary, memory in tests.
pub trait LineSource {
    type Lines: Stream<Item = Result<String, Error>> + Send + Unpin + 'static;
    fn lines(&mut self) -> Self::Lines;
}
