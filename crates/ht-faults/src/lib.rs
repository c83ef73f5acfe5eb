//! Fault injection for degraded-equipment studies.
//!
//! A fault is a pure transformation of a scenario configuration: applying
//! one returns a mutated copy and leaves the input untouched, so a healthy
//! baseline config can seed any number of degraded variants. Faults compose
//! by sequential application; when two faults touch the same field, the
//! last application wins.

pub mod fault;

pub use fault::{Fault, apply_all};
