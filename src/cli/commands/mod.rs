//! Subcommand implementations.

/// Side-by-side comparison of two texts.
pub mod compare;

/// Engine listing.
pub mod engines;

/// Article translation (the default command).
pub mod translate;
