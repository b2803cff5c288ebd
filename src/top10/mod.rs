//! Top-10 lists
//!
//! Users order ten candidates of a themed category and submit the list as a
//! single record.

pub mod category;
pub mod draft;
pub mod submission;

pub use category::{sport_label, Top10CategoryView, Top10Kind};
pub use draft::{DraftState, Top10Draft};
pub use submission::{validate_submission, Top10Service};
