pub mod fmt;
pub mod intern;
#[cfg(test)]
pub(crate) mod test_utils;

/// Extension for iterators that should stop right after a sentinel item, such
/// as the lexer, which yields end-of-input tokens forever.
pub trait BreakableIteratorExt<I>: Iterator
where
    I: Iterator,
{
    /// Yields items up to, and including, the first one that matches
    /// `stop_predicate`.
    fn up_to<P>(self, stop_predicate: P) -> UpTo<I, P>
    where
        P: FnMut(&I::Item) -> bool;
}

impl<I> BreakableIteratorExt<I> for I
where
    I: Iterator,
{
    fn up_to<P>(self, stop_predicate: P) -> UpTo<I, P>
    where
        P: FnMut(&I::Item) -> bool,
    {
        UpTo {
            iter: self,
            stop_predicate,
            done: false,
        }
    }
}

pub struct UpTo<I, P> {
    iter: I,
    stop_predicate: P,
    done: bool,
}

impl<I, P> Iterator for UpTo<I, P>
where
    I: Iterator,
    P: FnMut(&I::Item) -> bool,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.iter.next()?;
        self.done = (self.stop_predicate)(&item);
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use crate::{lexer::Lexer, token::Token, util::BreakableIteratorExt};

    #[test]
    fn test_up_to() {
        let items: Vec<_> = (0..10).up_to(|x| *x == 5).collect();
        assert_eq!(items, [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_up_to_infinite_lexer() {
        let tokens: Vec<_> = Lexer::new("a b").up_to(Token::is_eof).collect();
        assert_eq!(tokens.len(), 3);
        assert!(tokens[2].is_eof());
    }
}
