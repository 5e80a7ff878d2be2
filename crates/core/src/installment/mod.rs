//! Installment obligations.
//!
//! An installment tracks a debt paid off in monthly amounts. Recording a
//! payment does not move money out of any wallet; members record the
//! matching expense transaction themselves.

pub mod error;
pub mod service;
pub mod types;

pub use error::InstallmentError;
pub use service::InstallmentService;
pub use types::{InstallmentDraft, InstallmentProgress, InstallmentStatus};
