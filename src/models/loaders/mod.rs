pub mod toml_loader;

pub use toml_loader::{load_draft_file, load_uploaded_file, DraftFile, LoadedDraft};
