//! Concrete page objects of the cockpit console.

pub mod diagram;

pub use diagram::DiagramPage;
