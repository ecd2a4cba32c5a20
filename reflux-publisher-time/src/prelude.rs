// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Prelude module re-exporting the time-based operator traits.
//!
//! ```ignore
//! use reflux_publisher_time::prelude::*;
//!
//! let delayed = flux.delay_elements(Duration::from_millis(100));
//! ```

pub use crate::delay_elements::DelayElementsExt;
