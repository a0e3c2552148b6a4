//! Step definitions for task ordering scenarios.

mod given;
