//! Request handlers

pub mod accounting;
pub mod health;
pub mod rules;
