use super::Row;

use std::{
    collections::VecDeque,
    fmt, mem,
    pin::Pin,
    task::{Context, Poll},
};
use tokio_stream::{Stream, StreamExt};

/// An asynchronous, forward-only sequence of rows.
#[derive(Default)]
pub struct RowStream {
    buffer: Buffer,
    stream: Option<DynStream>,
}

#[derive(Debug)]
struct Iter<I> {
    iter: I,
}

#[derive(Clone, Default)]
enum Buffer {
    #[default]
    Empty,
    One(Row),
    Many(VecDeque<Row>),
}

type DynStream = Pin<Box<dyn Stream<Item = crate::Result<Row>> + Send + 'static>>;

impl RowStream {
    pub fn from_row(row: Row) -> Self {
        Self {
            buffer: Buffer::One(row),
            stream: None,
        }
    }

    pub fn from_stream<T: Stream<Item = crate::Result<Row>> + Send + 'static>(stream: T) -> Self {
        Self {
            buffer: Buffer::Empty,
            stream: Some(Box::pin(stream)),
        }
    }

    pub fn from_vec(rows: Vec<Row>) -> Self {
        Self {
            buffer: Buffer::Many(rows.into()),
            stream: None,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_iter<I>(iter: I) -> Self
    where
        I: Iterator<Item = crate::Result<Row>> + Send + 'static,
    {
        Self::from_stream(Iter { iter })
    }

    /// Returns the next row in the stream
    pub async fn next(&mut self) -> Option<crate::Result<Row>> {
        StreamExt::next(self).await
    }

    /// Peek at the next row in the stream.
    ///
    /// Returning `None` here is the "no more rows" signal of the row source
    /// contract.
    pub async fn peek(&mut self) -> Option<crate::Result<&Row>> {
        if self.buffer.is_empty() {
            match self.next().await {
                Some(Ok(row)) => self.buffer.push(row),
                Some(Err(e)) => return Some(Err(e)),
                None => return None,
            }
        }

        self.buffer.first().map(Ok)
    }

    /// The stream will contain at least this number of rows
    pub fn min_len(&self) -> usize {
        let (ret, _) = self.size_hint();
        ret
    }

    pub async fn collect(mut self) -> crate::Result<Vec<Row>> {
        let mut ret = Vec::with_capacity(self.min_len());

        while let Some(res) = self.next().await {
            ret.push(res?);
        }

        Ok(ret)
    }
}

impl Stream for RowStream {
    type Item = crate::Result<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if let Some(next) = self.buffer.next() {
            Poll::Ready(Some(Ok(next)))
        } else if let Some(stream) = self.stream.as_mut() {
            Pin::new(stream).poll_next(cx)
        } else {
            Poll::Ready(None)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (mut low, mut high) = match &self.stream {
            Some(stream) => stream.size_hint(),
            None => (0, Some(0)),
        };

        let buffered = self.buffer.len();

        low += buffered;

        if let Some(high) = high.as_mut() {
            *high += buffered;
        }

        (low, high)
    }
}

impl From<Row> for RowStream {
    fn from(src: Row) -> Self {
        Self::from_row(src)
    }
}

impl From<Vec<Row>> for RowStream {
    fn from(rows: Vec<Row>) -> Self {
        Self::from_vec(rows)
    }
}

impl<I> Unpin for Iter<I> {}

impl<I> Stream for Iter<I>
where
    I: Iterator<Item = crate::Result<Row>>,
{
    type Item = crate::Result<Row>;

    fn poll_next(mut self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.iter.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl fmt::Debug for RowStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowStream").finish()
    }
}

impl Buffer {
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Many(v) => v.len(),
        }
    }

    fn first(&self) -> Option<&Row> {
        match self {
            Self::Empty => None,
            Self::One(row) => Some(row),
            Self::Many(rows) => rows.front(),
        }
    }

    fn next(&mut self) -> Option<Row> {
        match self {
            Self::Empty => None,
            Self::One(_) => {
                let Self::One(row) = mem::take(self) else {
                    panic!()
                };
                Some(row)
            }
            Self::Many(rows) => rows.pop_front(),
        }
    }

    fn push(&mut self, row: Row) {
        match self {
            Self::Empty => {
                *self = Self::One(row);
            }
            Self::One(_) => {
                let Self::One(first) = mem::replace(self, Self::Many(VecDeque::with_capacity(2)))
                else {
                    panic!()
                };
                let Self::Many(rows) = self else { panic!() };
                rows.push_back(first);
                rows.push_back(row);
            }
            Self::Many(rows) => rows.push_back(row),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::{RowSchema, Value};

    fn rows(n: i64) -> Vec<Row> {
        let schema = RowSchema::new(["id"]);
        (0..n)
            .map(|i| Row::new(schema.clone(), vec![Value::I64(i)]).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn next_drains_buffer_then_stream() {
        let mut stream = RowStream::from_vec(rows(2));
        assert_eq!(
            stream.next().await.unwrap().unwrap().get("id"),
            Some(&Value::I64(0))
        );
        assert_eq!(
            stream.next().await.unwrap().unwrap().get("id"),
            Some(&Value::I64(1))
        );
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn peek_does_not_consume() {
        let mut stream = RowStream::from_iter(rows(1).into_iter().map(Ok));
        assert!(stream.peek().await.is_some());
        assert!(stream.peek().await.is_some());
        assert!(stream.next().await.is_some());
        assert!(stream.peek().await.is_none());
    }

    #[tokio::test]
    async fn collect_preserves_order() {
        let collected = RowStream::from_vec(rows(3)).collect().await.unwrap();
        let ids: Vec<_> = collected
            .iter()
            .map(|r| r.get("id").unwrap().clone())
            .collect();
        assert_eq!(ids, vec![Value::I64(0), Value::I64(1), Value::I64(2)]);
    }
}
