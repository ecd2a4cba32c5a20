// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities for the reflux workspace.
//!
//! # Overview
//!
//! - [`StepVerifier`] - scripted verification of a publisher's signals with demand
//!   control and a bounded wait per step
//! - [`TestProbe`] - recording subscriber driven by hand (request, cancel, wait)
//! - [`error_injecting`] - a `Flux` that fails after a given number of values
//! - typed test errors ([`IllegalArgument`], [`IllegalState`]) for kind-based recovery
//! - fixtures in [`test_data`] and assertion helpers in [`helpers`]
//!
//! # Verifying a sequence
//!
//! ```rust
//! use reflux_publisher::Flux;
//! use reflux_test_utils::StepVerifier;
//! use reflux_test_utils::test_data::words;
//!
//! let flux = Flux::from_sequence(words());
//!
//! StepVerifier::create(flux)
//!     .expect_next("asd".to_string())
//!     .expect_next_all(["sdf", "dfg", "fgh"].map(String::from))
//!     .expect_next_sequence(["ghj", "hjk", "jl"].map(String::from))
//!     .verify_complete()
//!     .unwrap();
//! ```
//!
//! # Driving demand by hand
//!
//! ```rust
//! use reflux_publisher::Flux;
//! use reflux_test_utils::TestProbe;
//!
//! let probe = TestProbe::attach(&Flux::range(1, 10));
//! assert!(probe.values().is_empty());
//!
//! probe.request(3);
//! assert_eq!(probe.values(), vec![1, 2, 3]);
//! ```
//!
//! # Module Organization
//!
//! - `step_verifier` - `StepVerifier` and `VerificationError`
//! - `test_probe` - `TestProbe` and its subscriber half
//! - `test_error` - typed errors used by recovery tests
//! - `error_injection` - failing publishers
//! - `test_data` - value fixtures
//! - `helpers` - timing assertions

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod error_injection;
pub mod helpers;
pub mod step_verifier;
pub mod test_data;
pub mod test_error;
pub mod test_probe;

pub use error_injection::error_injecting;
pub use helpers::{assert_no_signal_within, wait_until};
pub use step_verifier::{StepVerifier, VerificationError};
pub use test_error::{IllegalArgument, IllegalState};
pub use test_probe::{ProbeSubscriber, TestProbe};
