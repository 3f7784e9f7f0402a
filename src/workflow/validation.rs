//! 每一步的校验条件
//!
//! 校验失败只会阻止翻页，不会修改草稿

use thiserror::Error;

use crate::models::draft::OrcidChoice;
use crate::models::{rich_text, JournalCatalog, SubmissionDraft, SUBMISSION_REQUIREMENTS};

use super::WizardStep;

/// 校验/编辑失败，文本即为展示给用户的提示
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a journal to continue.")]
    JournalMissing,
    #[error("This journal is not accepting submissions yet.")]
    JournalUnavailable,
    #[error("Please accept all requirements to continue.")]
    RequirementsIncomplete,
    #[error("Unknown submission requirement.")]
    UnknownRequirement,
    #[error("Please provide your full name and email to continue.")]
    AuthorIncomplete,
    #[error("Please indicate whether you have an ORCID ID.")]
    OrcidChoiceMissing,
    #[error("Please provide your ORCID ID.")]
    OrcidMissing,
    #[error("Please verify your email address to continue.")]
    EmailNotVerified,
    #[error("Co-author full name and email are required.")]
    CoAuthorIncomplete,
    #[error("Please upload your manuscript file.")]
    ManuscriptMissing,
    #[error("Manuscript must be a .docx file.")]
    ManuscriptNotDocx,
    #[error("You can attach at most {max} supporting files.")]
    TooManySupportingFiles { max: usize },
    #[error("Please provide a cover letter.")]
    CoverLetterMissing,
    #[error("Please provide manuscript title and abstract.")]
    MetadataIncomplete,
    #[error("Please confirm that all information is correct.")]
    NotConfirmed,
    #[error("This manuscript has already been submitted.")]
    Locked,
}

fn journal(draft: &SubmissionDraft, catalog: &JournalCatalog) -> Result<(), ValidationError> {
    if draft.journal.trim().is_empty() {
        return Err(ValidationError::JournalMissing);
    }
    if !catalog.is_selectable(&draft.journal) {
        return Err(ValidationError::JournalUnavailable);
    }
    Ok(())
}

fn requirements(draft: &SubmissionDraft) -> Result<(), ValidationError> {
    let all_accepted = SUBMISSION_REQUIREMENTS
        .iter()
        .all(|r| draft.requirements.iter().any(|accepted| accepted == r));
    if draft.requirements.len() == SUBMISSION_REQUIREMENTS.len() && all_accepted {
        Ok(())
    } else {
        Err(ValidationError::RequirementsIncomplete)
    }
}

/// 第 3 步；ORCID=No 时是否需要邮箱验证由向导判断
fn author(draft: &SubmissionDraft) -> Result<(), ValidationError> {
    let author = &draft.author;
    if author.full_name.trim().is_empty() || author.email.trim().is_empty() {
        return Err(ValidationError::AuthorIncomplete);
    }

    match draft.orcid_choice {
        OrcidChoice::Unset => Err(ValidationError::OrcidChoiceMissing),
        OrcidChoice::Yes => match author.orcid.as_deref().map(str::trim) {
            None | Some("") => Err(ValidationError::OrcidMissing),
            Some(_) => Ok(()),
        },
        OrcidChoice::No => Ok(()),
    }
}

fn uploads(draft: &SubmissionDraft) -> Result<(), ValidationError> {
    if draft.manuscript.is_none() {
        return Err(ValidationError::ManuscriptMissing);
    }
    if rich_text::is_blank(&draft.cover_letter) {
        return Err(ValidationError::CoverLetterMissing);
    }
    Ok(())
}

fn metadata(draft: &SubmissionDraft) -> Result<(), ValidationError> {
    if draft.metadata.title.trim().is_empty() || rich_text::is_blank(&draft.metadata.abstract_text)
    {
        return Err(ValidationError::MetadataIncomplete);
    }
    Ok(())
}

fn review(draft: &SubmissionDraft) -> Result<(), ValidationError> {
    if draft.confirmed {
        Ok(())
    } else {
        Err(ValidationError::NotConfirmed)
    }
}

/// 校验某一步能否离开
pub fn validate_step(
    step: WizardStep,
    draft: &SubmissionDraft,
    catalog: &JournalCatalog,
) -> Result<(), ValidationError> {
    match step {
        WizardStep::Journal => journal(draft, catalog),
        WizardStep::Requirements => requirements(draft),
        WizardStep::AuthorInfo => author(draft),
        WizardStep::CoAuthors => Ok(()),
        WizardStep::Uploads => uploads(draft),
        WizardStep::Metadata => metadata(draft),
        WizardStep::Review => review(draft),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Journal, UploadedFile};

    fn catalog() -> JournalCatalog {
        JournalCatalog::new(vec![
            Journal::new("Journal A", "", false),
            Journal::new("Journal B", "", true),
        ])
    }

    #[test]
    fn test_journal_gate() {
        let mut draft = SubmissionDraft::default();
        let check = |d: &SubmissionDraft| validate_step(WizardStep::Journal, d, &catalog());
        assert_eq!(check(&draft), Err(ValidationError::JournalMissing));
        draft.journal = "Journal B".to_string();
        assert_eq!(check(&draft), Err(ValidationError::JournalUnavailable));
        draft.journal = "Journal A".to_string();
        assert_eq!(check(&draft), Ok(()));
    }

    #[test]
    fn test_requirements_all_or_nothing() {
        let mut draft = SubmissionDraft::default();
        draft.requirements = SUBMISSION_REQUIREMENTS[..4]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            validate_step(WizardStep::Requirements, &draft, &catalog()),
            Err(ValidationError::RequirementsIncomplete)
        );
        draft.requirements.push(SUBMISSION_REQUIREMENTS[4].to_string());
        assert_eq!(
            validate_step(WizardStep::Requirements, &draft, &catalog()),
            Ok(())
        );
    }

    #[test]
    fn test_author_gate() {
        let mut draft = SubmissionDraft::default();
        let check = |d: &SubmissionDraft| validate_step(WizardStep::AuthorInfo, d, &catalog());

        draft.author.full_name = "Jane Doe".to_string();
        assert_eq!(check(&draft), Err(ValidationError::AuthorIncomplete));
        draft.author.email = "jane@x.com".to_string();
        assert_eq!(check(&draft), Err(ValidationError::OrcidChoiceMissing));

        draft.orcid_choice = OrcidChoice::Yes;
        assert_eq!(check(&draft), Err(ValidationError::OrcidMissing));
        draft.author.orcid = Some("   ".to_string());
        assert_eq!(check(&draft), Err(ValidationError::OrcidMissing));
        // 只要求填写，不要求 16 位完整
        draft.author.orcid = Some("0000-0001".to_string());
        assert_eq!(check(&draft), Ok(()));

        draft.orcid_choice = OrcidChoice::No;
        draft.author.orcid = None;
        assert_eq!(check(&draft), Ok(()));
    }

    #[test]
    fn test_uploads_metadata_review_gates() {
        let mut draft = SubmissionDraft::default();
        let check =
            |step, d: &SubmissionDraft| validate_step(step, d, &catalog());

        assert_eq!(check(WizardStep::CoAuthors, &draft), Ok(()));
        assert_eq!(
            check(WizardStep::Uploads, &draft),
            Err(ValidationError::ManuscriptMissing)
        );
        draft.manuscript = Some(UploadedFile::new("paper.docx", vec![1]));
        draft.cover_letter = "<p><br></p>".to_string();
        assert_eq!(
            check(WizardStep::Uploads, &draft),
            Err(ValidationError::CoverLetterMissing)
        );
        draft.cover_letter = "<p>Please review</p>".to_string();
        assert_eq!(check(WizardStep::Uploads, &draft), Ok(()));

        draft.metadata.title = "T".to_string();
        assert_eq!(
            check(WizardStep::Metadata, &draft),
            Err(ValidationError::MetadataIncomplete)
        );
        draft.metadata.abstract_text = "A".to_string();
        assert_eq!(check(WizardStep::Metadata, &draft), Ok(()));

        assert_eq!(
            check(WizardStep::Review, &draft),
            Err(ValidationError::NotConfirmed)
        );
        draft.confirmed = true;
        assert_eq!(check(WizardStep::Review, &draft), Ok(()));
    }
}
