//! Step definitions for completion notification scenarios.

mod given;
mod when;
