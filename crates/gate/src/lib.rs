//! The gate: outbound relay control and the controller that owns it.
//!
//! This crate holds the only code in the workspace allowed to request a
//! physical lock-state change, and the only code allowed to append to the
//! ledger. Everything outbound goes through the [`Actuator`] trait so the
//! transport can be swapped (or mocked) without touching the controller.

#![warn(missing_docs)]

mod actuator;
mod controller;

pub use actuator::{
    Actuator, MockActuator, MosquittoActuator, RelayCommand, DEFAULT_PUBLISH_TIMEOUT,
};
pub use controller::{GateController, Transition, DEFAULT_CHANNEL};
