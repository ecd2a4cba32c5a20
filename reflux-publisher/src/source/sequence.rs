// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::PullSource;
use reflux_core::Signal;
use std::iter::Peekable;

/// Emits the items of an iterator, looking one item ahead to detect the end.
pub(crate) struct SequenceSource<I: Iterator> {
    items: Peekable<I>,
}

impl<I: Iterator> SequenceSource<I> {
    pub(crate) fn new(items: I) -> Self {
        Self {
            items: items.peekable(),
        }
    }
}

impl<I> PullSource<I::Item> for SequenceSource<I>
where
    I: Iterator + Send,
    I::Item: Send,
{
    fn pull(&mut self) -> Signal<I::Item> {
        self.items.next().map_or(Signal::Complete, Signal::Value)
    }

    fn terminal(&mut self) -> Option<Signal<I::Item>> {
        self.items.peek().is_none().then_some(Signal::Complete)
    }
}
