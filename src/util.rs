pub trait OnlyIterable: Iterator where Self: Sized {
    /// Consumes the iterator, expecting at most one element.
    fn only(mut self) -> Option<Self::Item> {
        let result = self.next();
        if self.next().is_some() {
            panic!("Unexpected second value in OnlyIterator!");
        }
        result
    }
}

impl<I> OnlyIterable for I where I: Iterator {}
