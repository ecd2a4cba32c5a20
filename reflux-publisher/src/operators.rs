// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

// Operators shared by `Flux` and `Mono`. Each shape wraps a `SharedPublisher` in a
// field named `publisher` and provides `from_shared`.
macro_rules! define_shared_operators {
    ($shape:ident) => {
        impl<T: Send + 'static> $shape<T> {
            /// Applies `mapper` to every value.
            ///
            /// A panic inside `mapper` becomes a `CallbackPanic` error and cancels
            /// upstream, unless a downstream `on_error_continue` accepts it.
            ///
            /// `T: Clone` is required because a continue handler receives the element
            /// that failed, and `mapper` consumes it. The clone is only taken when a
            /// downstream `on_error_continue` is present. Wrap elements that cannot be
            /// cloned in an `Arc`.
            pub fn map<U, F>(self, mapper: F) -> $shape<U>
            where
                T: Clone,
                U: Send + 'static,
                F: Fn(T) -> U + Send + Sync + 'static,
            {
                $shape::from_shared($crate::map::map_stage(
                    self.publisher,
                    ::std::sync::Arc::new(move |value: T| {
                        Ok::<U, ::reflux_core::RefluxError>(mapper(value))
                    }),
                ))
            }

            /// Applies a fallible `mapper`; an `Err` terminates the sequence unless a
            /// downstream `on_error_continue` accepts it.
            ///
            /// Requires `T: Clone` for the same reason as [`map`](Self::map).
            pub fn try_map<U, F>(self, mapper: F) -> $shape<U>
            where
                T: Clone,
                U: Send + 'static,
                F: Fn(T) -> ::std::result::Result<U, ::reflux_core::RefluxError>
                    + Send
                    + Sync
                    + 'static,
            {
                $shape::from_shared($crate::map::map_stage(
                    self.publisher,
                    ::std::sync::Arc::new(mapper),
                ))
            }

            /// Runs `hook` with the upstream subscription before it reaches downstream.
            pub fn do_on_subscribe<F>(self, hook: F) -> Self
            where
                F: Fn(&dyn ::reflux_core::Subscription) + Send + Sync + 'static,
            {
                self.peek($crate::do_on::PeekHooks {
                    on_subscribe: Some(::std::sync::Arc::new(hook)),
                    ..Default::default()
                })
            }

            /// Runs `hook` with every downstream request before forwarding it.
            pub fn do_on_request<F>(self, hook: F) -> Self
            where
                F: Fn(u64) + Send + Sync + 'static,
            {
                self.peek($crate::do_on::PeekHooks {
                    on_request: Some(::std::sync::Arc::new(hook)),
                    ..Default::default()
                })
            }

            /// Runs `hook` with every value before it is delivered.
            pub fn do_on_next<F>(self, hook: F) -> Self
            where
                F: Fn(&T) + Send + Sync + 'static,
            {
                self.peek($crate::do_on::PeekHooks {
                    on_next: Some(::std::sync::Arc::new(hook)),
                    ..Default::default()
                })
            }

            /// Runs `hook` with the terminal error before it is delivered.
            pub fn do_on_error<F>(self, hook: F) -> Self
            where
                F: Fn(&::reflux_core::RefluxError) + Send + Sync + 'static,
            {
                self.peek($crate::do_on::PeekHooks {
                    on_error: Some(::std::sync::Arc::new(hook)),
                    ..Default::default()
                })
            }

            /// Runs `hook` before completion is delivered.
            pub fn do_on_complete<F>(self, hook: F) -> Self
            where
                F: Fn() + Send + Sync + 'static,
            {
                self.peek($crate::do_on::PeekHooks {
                    on_complete: Some(::std::sync::Arc::new(hook)),
                    ..Default::default()
                })
            }

            /// Runs `hook` when the downstream cancels.
            pub fn do_on_cancel<F>(self, hook: F) -> Self
            where
                F: Fn() + Send + Sync + 'static,
            {
                self.peek($crate::do_on::PeekHooks {
                    on_cancel: Some(::std::sync::Arc::new(hook)),
                    ..Default::default()
                })
            }

            /// Logs every signal, request and cancellation passing through, under `category`.
            pub fn log(self, category: impl Into<String>) -> Self
            where
                T: ::std::fmt::Debug,
            {
                self.peek($crate::do_on::PeekHooks::logging(category))
            }

            fn peek(self, hooks: $crate::do_on::PeekHooks<T>) -> Self {
                Self::from_shared($crate::do_on::peek_stage(self.publisher, hooks))
            }

            /// Switches to the publisher returned by `fallback` when an error arrives.
            ///
            /// At most one switch happens per subscription; an error from the fallback
            /// reaches downstream unchanged.
            pub fn on_error_resume<F>(self, fallback: F) -> Self
            where
                F: Fn(&::reflux_core::RefluxError) -> Self + Send + Sync + 'static,
            {
                Self::from_shared($crate::on_error_return::on_error_resume_stage(
                    self.publisher,
                    ::std::sync::Arc::new(move |error: &::reflux_core::RefluxError| {
                        Some(fallback(error).publisher)
                    }),
                ))
            }

            /// Replaces any error with `fallback` followed by completion.
            pub fn on_error_return(self, fallback: T) -> Self
            where
                T: Clone + Sync,
            {
                self.on_error_return_if(|_: &::reflux_core::RefluxError| true, fallback)
            }

            /// Replaces errors accepted by `predicate` with `fallback` followed by
            /// completion; other errors pass through unchanged.
            pub fn on_error_return_if<P>(self, predicate: P, fallback: T) -> Self
            where
                T: Clone + Sync,
                P: Fn(&::reflux_core::RefluxError) -> bool + Send + Sync + 'static,
            {
                Self::from_shared($crate::on_error_return::on_error_resume_stage(
                    self.publisher,
                    ::std::sync::Arc::new(move |error: &::reflux_core::RefluxError| {
                        predicate(error).then(|| $crate::source::just(fallback.clone()))
                    }),
                ))
            }

            /// Replaces errors wrapping a user error of type `E` with `fallback`.
            pub fn on_error_return_kind<E>(self, fallback: T) -> Self
            where
                T: Clone + Sync,
                E: ::std::error::Error + 'static,
            {
                self.on_error_return_if(::reflux_core::RefluxError::is::<E>, fallback)
            }

            /// Drops elements whose processing fails in an upstream mapping stage,
            /// reporting each error with the raw element to `handler`, and continues.
            pub fn on_error_continue<H>(self, handler: H) -> Self
            where
                H: Fn(&::reflux_core::RefluxError, &dyn ::std::any::Any) + Send + Sync + 'static,
            {
                self.on_error_continue_if(|_: &::reflux_core::RefluxError| true, handler)
            }

            /// Like [`on_error_continue`](Self::on_error_continue), restricted to user
            /// errors of type `E`. Other errors go to the next handler downstream.
            pub fn on_error_continue_kind<E, H>(self, handler: H) -> Self
            where
                E: ::std::error::Error + 'static,
                H: Fn(&::reflux_core::RefluxError, &dyn ::std::any::Any) + Send + Sync + 'static,
            {
                self.on_error_continue_if(::reflux_core::RefluxError::is::<E>, handler)
            }

            /// Like [`on_error_continue`](Self::on_error_continue), restricted to errors
            /// accepted by `predicate`.
            pub fn on_error_continue_if<P, H>(self, predicate: P, handler: H) -> Self
            where
                P: Fn(&::reflux_core::RefluxError) -> bool + Send + Sync + 'static,
                H: Fn(&::reflux_core::RefluxError, &dyn ::std::any::Any) + Send + Sync + 'static,
            {
                Self::from_shared($crate::on_error_continue::on_error_continue_stage(
                    self.publisher,
                    ::std::sync::Arc::new(predicate),
                    ::std::sync::Arc::new(handler),
                ))
            }

            /// Delivers every downstream signal on one worker of `scheduler`.
            pub fn publish_on(self, scheduler: ::reflux_scheduler::Scheduler) -> Self {
                self.publish_on_with_prefetch(scheduler, $crate::publish_on::DEFAULT_PREFETCH)
            }

            /// [`publish_on`](Self::publish_on) with an explicit upstream prefetch window.
            ///
            /// At most `prefetch` elements are requested ahead of delivery, and never
            /// more than the downstream itself requested.
            pub fn publish_on_with_prefetch(
                self,
                scheduler: ::reflux_scheduler::Scheduler,
                prefetch: usize,
            ) -> Self {
                Self::from_shared($crate::publish_on::publish_on_stage(
                    self.publisher,
                    scheduler,
                    prefetch,
                ))
            }

            /// Consumes the sequence with `on_next`, requesting unbounded demand.
            ///
            /// An error is reported to the process-wide `on_error_dropped` hook.
            pub fn subscribe<N>(&self, on_next: N) -> ::reflux_core::Disposable
            where
                N: FnMut(T) + Send + 'static,
            {
                $crate::subscribe::subscribe_lambda(&*self.publisher, Box::new(on_next), None, None)
            }

            /// Consumes the sequence with value and error callbacks.
            pub fn subscribe_with_error<N, E>(&self, on_next: N, on_error: E) -> ::reflux_core::Disposable
            where
                N: FnMut(T) + Send + 'static,
                E: FnMut(::reflux_core::RefluxError) + Send + 'static,
            {
                $crate::subscribe::subscribe_lambda(
                    &*self.publisher,
                    Box::new(on_next),
                    Some(Box::new(on_error)),
                    None,
                )
            }

            /// Consumes the sequence with value, error and completion callbacks.
            pub fn subscribe_with_complete<N, E, C>(
                &self,
                on_next: N,
                on_error: E,
                on_complete: C,
            ) -> ::reflux_core::Disposable
            where
                N: FnMut(T) + Send + 'static,
                E: FnMut(::reflux_core::RefluxError) + Send + 'static,
                C: FnMut() + Send + 'static,
            {
                $crate::subscribe::subscribe_lambda(
                    &*self.publisher,
                    Box::new(on_next),
                    Some(Box::new(on_error)),
                    Some(Box::new(on_complete)),
                )
            }

            /// Attaches a hand-written subscriber.
            pub fn subscribe_with<S>(&self, subscriber: S)
            where
                S: ::reflux_core::Subscriber<T> + 'static,
            {
                ::reflux_core::Publisher::attach(&*self.publisher, Box::new(subscriber));
            }

            /// The underlying publisher chain.
            pub fn as_publisher(&self) -> ::reflux_core::SharedPublisher<T> {
                self.publisher.clone()
            }
        }

        impl<T> Clone for $shape<T> {
            fn clone(&self) -> Self {
                Self {
                    publisher: self.publisher.clone(),
                }
            }
        }

        impl<T> ::std::fmt::Debug for $shape<T> {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($shape)).finish_non_exhaustive()
            }
        }

        impl<T: Send + 'static> ::reflux_core::Publisher<T> for $shape<T> {
            fn attach(&self, subscriber: ::reflux_core::BoxSubscriber<T>) {
                ::reflux_core::Publisher::attach(&*self.publisher, subscriber);
            }
        }
    };
}
