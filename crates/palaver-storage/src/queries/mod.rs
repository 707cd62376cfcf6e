// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules over the [`crate::database::Database`] handle.

pub mod messages;
pub mod participants;
