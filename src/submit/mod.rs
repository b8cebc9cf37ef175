pub mod form;
pub mod handler;

pub use form::{SaleForm, SaleSubmission};
pub use handler::{SubmissionHandler, SubmitRequest};
