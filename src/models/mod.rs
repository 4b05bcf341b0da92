// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod alert;
pub mod contact;
pub mod user;

pub use alert::Alert;
pub use contact::TrustedContact;
pub use user::{EmailClaim, User, UserResponse};
