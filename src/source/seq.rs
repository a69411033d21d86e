use crate::error::Result;
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::stream::Stream;
use crate::source::Source;

impl Source {
    /// Pulls from a fallible iterator. The first `Err` stops the source and
    /// becomes the pipeline error.
    ///
    /// The iterator is advanced on the runtime's worker threads, so each
    /// `next` should be cheap.
    pub fn from_seq2<T, I>(self, seq: I) -> Stream<T>
    where
        T: Send + 'static,
        I: IntoIterator<Item = Result<T>>,
        I::IntoIter: Send + 'static,
    {
        let seq = seq.into_iter();
        self.launch("from_seq", move |outlet, cancel| async move {
            for item in seq {
                outlet.push(&cancel, item?).await?;
            }
            Ok(())
        })
    }

    pub fn from_seq<T, I>(self, seq: I) -> Stream<T>
    where
        T: Send + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        self.from_seq2(seq.into_iter().map(Ok))
    }
}

impl<T: Send + 'static> Stream<T> {
    pub fn from_seq<I>(cancel: &CancelToken, seq: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Source::new(cancel).from_seq(seq)
    }

    pub fn from_seq2<I>(cancel: &CancelToken, seq: I) -> Self
    where
        I: IntoIterator<Item = Result<T>>,
        I::IntoIter: Send + 'static,
    {
        Source::new(cancel).from_seq2(seq)
    }
}
