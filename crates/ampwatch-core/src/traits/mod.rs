// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the poller and its collaborators.

pub mod store;

pub use store::LogStore;
