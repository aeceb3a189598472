//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so release
//! builds remain quiet. They only gate caller-side logging (engine, binaries);
//! the analysis stages never log.

/// Emit one line per finished engine job (symbol, duration, overlay count).
pub const PRINT_ENGINE_JOBS: bool = true;

/// Emit per-lookback pivot/candidate/retained counts after each pipeline run.
pub const PRINT_PIPELINE_SUMMARY: bool = false;

/// Emit every ranked overlay (role, score, span) after each pipeline run.
pub const PRINT_OVERLAYS: bool = false;

/// Emit details while loading and saving series files.
pub const PRINT_SERDE: bool = false;
