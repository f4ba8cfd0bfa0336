//! Error types for the host-facing boundary
//!
//! Internal fitters never return `Err`: a failed fit is `None` and is
//! silently excluded by the selector (spec.md §7, kinds 1-2). State-machine
//! misuse and pointer-tracker misuse are likewise never rejected (spec.md
//! §7, kinds 3-4). `CoreError` exists only for the small number of
//! operations a host can genuinely misuse, such as asking to re-fit an
//! empty history.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("cannot fit an empty stroke history")]
    EmptyHistory,

    #[error("stroke has no points to fit")]
    EmptyStroke,
}
