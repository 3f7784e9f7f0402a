pub mod draft;
pub mod file_kind;
pub mod journal;
pub mod loaders;
pub mod orcid;
pub mod requirements;
pub mod rich_text;

pub use draft::{AuthorInfo, CoAuthor, Metadata, OrcidChoice, SubmissionDraft, UploadedFile};
pub use journal::{Journal, JournalCatalog};
pub use loaders::{load_draft_file, load_uploaded_file, DraftFile, LoadedDraft};
pub use requirements::SUBMISSION_REQUIREMENTS;
