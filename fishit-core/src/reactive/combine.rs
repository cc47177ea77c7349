//! Combine-latest over a fixed number of streams.
//!
//! Nothing is emitted until every input has produced a value. After that,
//! each item from any input produces one output built from the latest value
//! of every input. The combined stream ends once all inputs have ended.
//!
//! Only the arities the home screen needs exist; wider fan-ins are built as
//! a tree of these over named intermediate types.

use futures::stream::{BoxStream, Stream, StreamExt};

/// Combine-latest of three streams.
pub fn combine3<A, B, C, R, F>(
    a: impl Stream<Item = A> + Send + 'static,
    b: impl Stream<Item = B> + Send + 'static,
    c: impl Stream<Item = C> + Send + 'static,
    mut transform: F,
) -> BoxStream<'static, R>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
    R: Send + 'static,
    F: FnMut(A, B, C) -> R + Send + 'static,
{
    async_stream::stream! {
        let (mut a, mut b, mut c) = (a.boxed(), b.boxed(), c.boxed());
        let (mut latest_a, mut latest_b, mut latest_c) = (None, None, None);
        let (mut a_done, mut b_done, mut c_done) = (false, false, false);

        loop {
            tokio::select! {
                item = a.next(), if !a_done => match item {
                    Some(value) => latest_a = Some(value),
                    None => { a_done = true; continue; }
                },
                item = b.next(), if !b_done => match item {
                    Some(value) => latest_b = Some(value),
                    None => { b_done = true; continue; }
                },
                item = c.next(), if !c_done => match item {
                    Some(value) => latest_c = Some(value),
                    None => { c_done = true; continue; }
                },
                else => break,
            }

            if let (Some(va), Some(vb), Some(vc)) =
                (&latest_a, &latest_b, &latest_c)
            {
                yield transform(va.clone(), vb.clone(), vc.clone());
            }
        }
    }
    .boxed()
}

/// Combine-latest of four streams.
pub fn combine4<A, B, C, D, R, F>(
    a: impl Stream<Item = A> + Send + 'static,
    b: impl Stream<Item = B> + Send + 'static,
    c: impl Stream<Item = C> + Send + 'static,
    d: impl Stream<Item = D> + Send + 'static,
    mut transform: F,
) -> BoxStream<'static, R>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
    D: Clone + Send + 'static,
    R: Send + 'static,
    F: FnMut(A, B, C, D) -> R + Send + 'static,
{
    async_stream::stream! {
        let (mut a, mut b, mut c, mut d) =
            (a.boxed(), b.boxed(), c.boxed(), d.boxed());
        let (mut latest_a, mut latest_b, mut latest_c, mut latest_d) =
            (None, None, None, None);
        let (mut a_done, mut b_done, mut c_done, mut d_done) =
            (false, false, false, false);

        loop {
            tokio::select! {
                item = a.next(), if !a_done => match item {
                    Some(value) => latest_a = Some(value),
                    None => { a_done = true; continue; }
                },
                item = b.next(), if !b_done => match item {
                    Some(value) => latest_b = Some(value),
                    None => { b_done = true; continue; }
                },
                item = c.next(), if !c_done => match item {
                    Some(value) => latest_c = Some(value),
                    None => { c_done = true; continue; }
                },
                item = d.next(), if !d_done => match item {
                    Some(value) => latest_d = Some(value),
                    None => { d_done = true; continue; }
                },
                else => break,
            }

            if let (Some(va), Some(vb), Some(vc), Some(vd)) =
                (&latest_a, &latest_b, &latest_c, &latest_d)
            {
                yield transform(va.clone(), vb.clone(), vc.clone(), vd.clone());
            }
        }
    }
    .boxed()
}
