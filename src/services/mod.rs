pub mod metadata;
pub mod review_copy;
pub mod verification;

pub use metadata::{
    extractor_for, LocalMetadataExtractor, MetadataExtractor, MetadataTrigger,
    RemoteMetadataExtractor,
};
pub use review_copy::{
    LocalPaginator, PreviewError, PreviewState, RemoteConverter, ReviewCopy, ReviewCopyGenerator,
};
pub use verification::{VerificationError, VerificationFlow, VerificationStage};
