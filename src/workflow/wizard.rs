//! 投稿向导 - 流程层
//!
//! 核心职责：持有草稿和当前位置，决定何时翻页、何时进入邮箱验证、何时提交
//!
//! 状态：
//! - `At(step)`：停在第 1..7 步
//! - `Verifying(flow)`：停在第 3 步，邮箱验证弹窗打开
//! - `Submitted`：提交成功（终态）
//!
//! 所有失败都会把控制权交还给当前步骤，草稿保持不变

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clients::{SubmissionApi, SubmissionPayload};
use crate::error::AppResult;
use crate::models::draft::OrcidChoice;
use crate::models::{
    file_kind, orcid, requirements, AuthorInfo, CoAuthor, JournalCatalog, Metadata,
    SubmissionDraft, UploadedFile,
};
use crate::services::{
    MetadataExtractor, MetadataTrigger, PreviewError, PreviewState, RemoteConverter,
    RemoteMetadataExtractor, VerificationError, VerificationFlow,
};
use crate::utils::logging::log_step;

use super::validation::{validate_step, ValidationError};
use super::WizardStep;

/// 后端允许的补充材料数量上限
pub const MAX_SUPPORTING_FILES: usize = 10;

pub const SUBMIT_SUCCESS_MESSAGE: &str = "Manuscript submitted successfully!";
pub const SUBMIT_FAILURE_MESSAGE: &str = "Error submitting manuscript. Please try again.";

/// 向导状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    At(WizardStep),
    /// 第 3 步上的邮箱验证
    Verifying(VerificationFlow),
    Submitted,
}

/// `next()` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// 已进入新的一步
    Moved(WizardStep),
    /// 需要先完成邮箱验证，位置不变
    VerificationRequired,
    /// 已在最后一步，等待提交
    ReadyToSubmit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    /// 不在第 7 步或未勾选确认，未发送
    NotReady,
    /// 前面某一步的条件在第 7 步被改坏了，未发送
    Invalid(ValidationError),
    Submitted,
}

/// 副作用产生的提示（相当于界面上的 alert）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ExtractionFailed,
    VerificationFailed(String),
    PreviewFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ExtractionFailed => write!(
                f,
                "Failed to extract metadata. Please fill in the fields manually."
            ),
            Notice::VerificationFailed(message) => write!(f, "{}", message),
            Notice::PreviewFailed => write!(f, "Failed to generate PDF. Please try again."),
        }
    }
}

/// 投稿向导
pub struct Wizard {
    api: Arc<dyn SubmissionApi>,
    extractor: Arc<dyn MetadataExtractor>,
    converter: RemoteConverter,
    catalog: JournalCatalog,
    draft: SubmissionDraft,
    state: WizardState,
    /// 已通过验证的邮箱
    verified_email: Option<String>,
    metadata_trigger: MetadataTrigger,
    preview: PreviewState,
    message: Option<String>,
    notices: Vec<Notice>,
}

impl Wizard {
    pub fn new(
        api: Arc<dyn SubmissionApi>,
        extractor: Arc<dyn MetadataExtractor>,
        catalog: JournalCatalog,
    ) -> Self {
        Self {
            converter: RemoteConverter::new(api.clone()),
            api,
            extractor,
            catalog,
            draft: SubmissionDraft::default(),
            state: WizardState::At(WizardStep::FIRST),
            verified_email: None,
            metadata_trigger: MetadataTrigger::new(),
            preview: PreviewState::Idle,
            message: None,
            notices: Vec::new(),
        }
    }

    /// 使用后端提取元数据、默认期刊列表
    pub fn with_api(api: Arc<dyn SubmissionApi>) -> Self {
        let extractor = Arc::new(RemoteMetadataExtractor::new(api.clone()));
        Self::new(api, extractor, JournalCatalog::default())
    }

    // ========== 查询 ==========

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// 当前所在步骤（验证弹窗打开时仍是第 3 步）
    pub fn current_step(&self) -> WizardStep {
        match self.state {
            WizardState::At(step) => step,
            WizardState::Verifying(_) => WizardStep::AuthorInfo,
            WizardState::Submitted => WizardStep::LAST,
        }
    }

    pub fn draft(&self) -> &SubmissionDraft {
        &self.draft
    }

    pub fn catalog(&self) -> &JournalCatalog {
        &self.catalog
    }

    pub fn verification(&self) -> Option<&VerificationFlow> {
        match &self.state {
            WizardState::Verifying(flow) => Some(flow),
            _ => None,
        }
    }

    /// 当前作者邮箱是否已验证
    pub fn is_email_verified(&self) -> bool {
        let email = self.draft.author.email.trim();
        !email.is_empty()
            && self
                .verified_email
                .as_deref()
                .is_some_and(|verified| verified.eq_ignore_ascii_case(email))
    }

    pub fn is_submitted(&self) -> bool {
        self.state == WizardState::Submitted
    }

    pub fn preview(&self) -> &PreviewState {
        &self.preview
    }

    /// 提交结果的行内提示
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ========== 编辑草稿 ==========

    fn editable(&mut self) -> Result<&mut SubmissionDraft, ValidationError> {
        if self.is_submitted() {
            return Err(ValidationError::Locked);
        }
        Ok(&mut self.draft)
    }

    /// 选择期刊（禁用的期刊不可选）
    pub fn select_journal(&mut self, name: &str) -> Result<(), ValidationError> {
        if !self.catalog.is_selectable(name) {
            return Err(ValidationError::JournalUnavailable);
        }
        self.editable()?.journal = name.to_string();
        Ok(())
    }

    pub fn set_requirement(&mut self, text: &str, accepted: bool) -> Result<(), ValidationError> {
        if !requirements::is_known_requirement(text) {
            return Err(ValidationError::UnknownRequirement);
        }
        let draft = self.editable()?;
        let present = draft.requirements.iter().any(|r| r == text);
        if accepted && !present {
            draft.requirements.push(text.to_string());
        } else if !accepted {
            draft.requirements.retain(|r| r != text);
        }
        Ok(())
    }

    pub fn accept_all_requirements(&mut self) -> Result<(), ValidationError> {
        for requirement in requirements::SUBMISSION_REQUIREMENTS {
            self.set_requirement(requirement, true)?;
        }
        Ok(())
    }

    /// 设置作者姓名、邮箱、电话（ORCID 单独设置）
    pub fn set_author(
        &mut self,
        full_name: &str,
        email: &str,
        phone: Option<&str>,
    ) -> Result<(), ValidationError> {
        let author = &mut self.editable()?.author;
        author.full_name = full_name.trim().to_string();
        author.email = email.trim().to_string();
        author.phone = phone
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        Ok(())
    }

    pub fn set_orcid_choice(&mut self, choice: OrcidChoice) -> Result<(), ValidationError> {
        self.editable()?.orcid_choice = choice;
        Ok(())
    }

    /// 输入 ORCID，按 4 位一组格式化
    pub fn set_orcid(&mut self, raw: &str) -> Result<(), ValidationError> {
        let formatted = orcid::format_orcid(raw);
        self.editable()?.author.orcid = (!formatted.is_empty()).then_some(formatted);
        Ok(())
    }

    pub fn add_co_author(&mut self, co_author: CoAuthor) -> Result<(), ValidationError> {
        if co_author.full_name.trim().is_empty() || co_author.email.trim().is_empty() {
            return Err(ValidationError::CoAuthorIncomplete);
        }
        let orcid = co_author
            .orcid
            .as_deref()
            .map(orcid::format_orcid)
            .filter(|o| !o.is_empty());
        self.editable()?.co_authors.push(CoAuthor {
            full_name: co_author.full_name.trim().to_string(),
            email: co_author.email.trim().to_string(),
            orcid,
        });
        Ok(())
    }

    pub fn remove_co_author(&mut self, index: usize) -> Result<Option<CoAuthor>, ValidationError> {
        let co_authors = &mut self.editable()?.co_authors;
        Ok((index < co_authors.len()).then(|| co_authors.remove(index)))
    }

    /// 上传（或替换）稿件，只接受 .docx
    ///
    /// 替换后元数据自动提取会重新生效，已生成的预览作废
    pub fn attach_manuscript(&mut self, file: UploadedFile) -> Result<(), ValidationError> {
        if !file_kind::is_manuscript(&file.file_name) {
            return Err(ValidationError::ManuscriptNotDocx);
        }
        let draft = self.editable()?;
        debug!("稿件: {:?}", file);
        draft.manuscript = Some(file);
        draft.manuscript_revision += 1;
        self.preview = PreviewState::Idle;
        Ok(())
    }

    pub fn add_supporting_file(&mut self, file: UploadedFile) -> Result<(), ValidationError> {
        let draft = self.editable()?;
        if draft.supporting_files.len() >= MAX_SUPPORTING_FILES {
            return Err(ValidationError::TooManySupportingFiles {
                max: MAX_SUPPORTING_FILES,
            });
        }
        draft.supporting_files.push(file);
        Ok(())
    }

    pub fn remove_supporting_file(
        &mut self,
        index: usize,
    ) -> Result<Option<UploadedFile>, ValidationError> {
        let files = &mut self.editable()?.supporting_files;
        Ok((index < files.len()).then(|| files.remove(index)))
    }

    pub fn set_cover_letter(&mut self, html: &str) -> Result<(), ValidationError> {
        self.editable()?.cover_letter = html.to_string();
        Ok(())
    }

    pub fn set_metadata(&mut self, metadata: Metadata) -> Result<(), ValidationError> {
        self.editable()?.metadata = metadata;
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), ValidationError> {
        self.editable()?.metadata.title = title.to_string();
        Ok(())
    }

    pub fn set_abstract(&mut self, html: &str) -> Result<(), ValidationError> {
        self.editable()?.metadata.abstract_text = html.to_string();
        Ok(())
    }

    pub fn set_confirmed(&mut self, confirmed: bool) -> Result<(), ValidationError> {
        self.editable()?.confirmed = confirmed;
        Ok(())
    }

    // ========== 翻页 ==========

    /// 校验当前步骤并前进一步
    ///
    /// 校验失败时位置不变；第 3 步选择了没有 ORCID 且邮箱未验证时打开验证弹窗
    pub async fn next(&mut self) -> Result<Advance, ValidationError> {
        let step = match &self.state {
            WizardState::At(step) => *step,
            WizardState::Verifying(_) => return Ok(Advance::VerificationRequired),
            WizardState::Submitted => return Err(ValidationError::Locked),
        };

        if let Err(e) = validate_step(step, &self.draft, &self.catalog) {
            warn!("⚠️  第 {} 步未通过校验: {}", step.index(), e);
            return Err(e);
        }

        if step == WizardStep::AuthorInfo
            && self.draft.orcid_choice == OrcidChoice::No
            && !self.is_email_verified()
        {
            info!("🔐 作者没有 ORCID，需要先验证邮箱");
            self.state =
                WizardState::Verifying(VerificationFlow::new(self.draft.author.email.trim()));
            return Ok(Advance::VerificationRequired);
        }

        match step.next() {
            Some(next) => {
                self.enter(next).await;
                Ok(Advance::Moved(next))
            }
            None => Ok(Advance::ReadyToSubmit),
        }
    }

    /// 后退一步，不做校验；第 1 步时无操作
    pub async fn previous(&mut self) -> WizardStep {
        if self.is_submitted() {
            return WizardStep::LAST;
        }
        let step = self.current_step();
        match step.previous() {
            Some(previous) => {
                self.enter(previous).await;
                previous
            }
            None => step,
        }
    }

    async fn enter(&mut self, step: WizardStep) {
        self.state = WizardState::At(step);
        log_step(step);

        if step == WizardStep::Metadata {
            self.run_metadata_trigger().await;
        }
    }

    async fn run_metadata_trigger(&mut self) {
        match self
            .metadata_trigger
            .run(&mut self.draft, self.extractor.as_ref())
            .await
        {
            Ok(true) => info!("✓ 已自动填充元数据"),
            Ok(false) => {}
            Err(_) => self.notices.push(Notice::ExtractionFailed),
        }
    }

    // ========== 邮箱验证 ==========

    fn flow_mut(&mut self) -> Result<&mut VerificationFlow, VerificationError> {
        match &mut self.state {
            WizardState::Verifying(flow) => Ok(flow),
            _ => Err(VerificationError::NotVerifying),
        }
    }

    fn record_verification_failure(&mut self, err: VerificationError) -> VerificationError {
        if matches!(err, VerificationError::Backend(_)) {
            self.notices
                .push(Notice::VerificationFailed(err.to_string()));
        }
        err
    }

    /// 发送（或重新发送）验证码
    pub async fn send_verification_code(&mut self) -> Result<(), VerificationError> {
        let api = self.api.clone();
        let result = self.flow_mut()?.send_code(api.as_ref()).await;
        result.map_err(|e| self.record_verification_failure(e))
    }

    pub fn enter_verification_code(&mut self, code: &str) -> Result<(), VerificationError> {
        self.flow_mut()?.enter_code(code)
    }

    /// 校验已输入的验证码；失败时弹窗保持打开
    pub async fn verify_code(&mut self) -> Result<(), VerificationError> {
        let api = self.api.clone();
        let flow = self.flow_mut()?;
        match flow.verify(api.as_ref()).await {
            Ok(()) => {
                let email = flow.email().to_string();
                self.verified_email = Some(email);
                Ok(())
            }
            Err(e) => Err(self.record_verification_failure(e)),
        }
    }

    /// 验证完成后确认，关闭弹窗并执行被推迟的 `next()`
    ///
    /// 外层错误表示验证本身未完成；内层是被推迟的 `next()` 的结果。
    /// 验证期间第 3 步被改坏时，弹窗关闭、停在第 3 步，邮箱仍记为已验证
    pub async fn acknowledge_verification(
        &mut self,
    ) -> Result<Result<Advance, ValidationError>, VerificationError> {
        match &self.state {
            WizardState::Verifying(flow) if flow.is_verified() => {}
            WizardState::Verifying(_) => return Err(VerificationError::NotVerified),
            _ => return Err(VerificationError::NotVerifying),
        }

        self.state = WizardState::At(WizardStep::AuthorInfo);
        let advance = self.next().await;
        if let Err(e) = &advance {
            warn!("⚠️  验证后无法继续: {}", e);
        }
        Ok(advance)
    }

    /// 关闭验证弹窗，停留在第 3 步
    ///
    /// 验证成功后只能确认，不能取消
    pub fn cancel_verification(&mut self) -> bool {
        match &self.state {
            WizardState::Verifying(flow) if !flow.is_verified() => {
                info!("验证已取消，停留在第 3 步");
                self.state = WizardState::At(WizardStep::AuthorInfo);
                true
            }
            _ => false,
        }
    }

    // ========== 预览与提交 ==========

    /// 在第 7 步生成带行号的 PDF 预览，返回托管地址
    pub async fn generate_preview(&mut self) -> Result<String, PreviewError> {
        if self.state != WizardState::At(WizardStep::Review) {
            return Err(PreviewError::NotOnReview);
        }
        let Some(manuscript) = self.draft.manuscript.as_ref() else {
            return Err(PreviewError::NoManuscript);
        };

        let result = self.preview.generate(&self.converter, manuscript).await;
        if result.is_err() {
            self.notices.push(Notice::PreviewFailed);
        }
        result
    }

    /// 第 1..6 步的条件在第 7 步仍然成立（含 ORCID=No 时的邮箱验证）
    fn check_earlier_steps(&self) -> Result<(), ValidationError> {
        for step in WizardStep::ALL.into_iter().filter(|s| *s != WizardStep::Review) {
            validate_step(step, &self.draft, &self.catalog)?;
        }
        if self.draft.orcid_choice == OrcidChoice::No && !self.is_email_verified() {
            return Err(ValidationError::EmailNotVerified);
        }
        Ok(())
    }

    /// 提交稿件
    ///
    /// 只有在第 7 步、已勾选确认且前面各步仍然有效时才会发送；失败时草稿和位置不变，可以再次提交
    pub async fn submit(&mut self) -> AppResult<SubmitResult> {
        if self.state != WizardState::At(WizardStep::Review) || !self.draft.confirmed {
            debug!("未满足提交条件，忽略");
            return Ok(SubmitResult::NotReady);
        }
        if let Err(e) = self.check_earlier_steps() {
            warn!("⚠️  提交前校验失败: {}", e);
            self.message = Some(e.to_string());
            return Ok(SubmitResult::Invalid(e));
        }
        let Some(payload) = SubmissionPayload::from_draft(&self.draft) else {
            return Ok(SubmitResult::NotReady);
        };

        info!("📤 正在提交稿件到 {}", payload.journal_selection);
        match self.api.submit(&payload).await {
            Ok(()) => {
                self.state = WizardState::Submitted;
                self.message = Some(SUBMIT_SUCCESS_MESSAGE.to_string());
                info!("✓ {}", SUBMIT_SUCCESS_MESSAGE);
                Ok(SubmitResult::Submitted)
            }
            Err(e) => {
                warn!("⚠️  提交失败: {}", e);
                self.message = Some(
                    e.user_message()
                        .unwrap_or(SUBMIT_FAILURE_MESSAGE)
                        .to_string(),
                );
                Err(e)
            }
        }
    }

    /// 供界面展示的作者信息
    pub fn author(&self) -> &AuthorInfo {
        &self.draft.author
    }
}
