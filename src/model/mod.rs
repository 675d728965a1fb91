//! Data model: date window, quiet-hours gate, and the reconciled view model.

pub mod dates;
pub mod quiet;
pub mod view;
