pub mod submission_client;

pub use submission_client::{SubmissionApi, SubmissionClient, SubmissionPayload};
