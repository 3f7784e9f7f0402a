pub mod step;
pub mod validation;
pub mod wizard;

pub use step::WizardStep;
pub use validation::{validate_step, ValidationError};
pub use wizard::{Advance, Notice, SubmitResult, Wizard, WizardState, MAX_SUPPORTING_FILES};
