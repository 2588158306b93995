//! Enumeration algorithms over concrete [`crate::element::ElementOps`] elements.

pub mod froidure_pin;
