//! 单份草稿处理 - 编排层
//!
//! 把 TOML 草稿填入向导，从第 1 步一路走到第 7 步：
//! 需要邮箱验证时通过 [`CodePrompt`] 询问验证码，最后提交

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use crate::models::LoadedDraft;
use crate::services::VerificationError;
use crate::utils::logging::log_outcome;
use crate::workflow::{Advance, SubmitResult, Wizard};

/// 验证码输入来源
#[async_trait]
pub trait CodePrompt: Send {
    /// 读取一次输入
    ///
    /// `None` 表示放弃验证；空字符串表示重新发送验证码
    async fn read_code(&mut self, email: &str) -> Result<Option<String>>;
}

/// 从标准输入读取验证码
pub struct StdinPrompt {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinPrompt {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CodePrompt for StdinPrompt {
    async fn read_code(&mut self, email: &str) -> Result<Option<String>> {
        info!(
            "✉️  请输入发送到 {} 的验证码（直接回车重新发送，输入 q 放弃）:",
            email
        );
        let line = self.lines.next_line().await.context("读取验证码失败")?;
        Ok(line.filter(|l| !l.trim().eq_ignore_ascii_case("q")))
    }
}

/// 处理结果
#[derive(Debug, Clone)]
pub struct DraftOutcome {
    pub title: String,
    pub journal: String,
    pub message: String,
    pub preview_url: Option<String>,
}

/// 把草稿内容填入向导
pub fn apply_draft(wizard: &mut Wizard, loaded: &LoadedDraft) -> Result<()> {
    let spec = &loaded.spec;

    wizard
        .select_journal(&spec.journal)
        .with_context(|| format!("无法选择期刊: {}", spec.journal))?;

    if spec.accept_all_requirements {
        wizard.accept_all_requirements()?;
    } else {
        for requirement in &spec.requirements {
            wizard
                .set_requirement(requirement, true)
                .with_context(|| format!("未知的投稿须知: {}", requirement))?;
        }
    }

    wizard.set_author(
        &spec.author.full_name,
        &spec.author.email,
        spec.author.phone.as_deref(),
    )?;
    wizard.set_orcid_choice(spec.author.orcid_choice())?;
    if let Some(orcid) = spec.author.orcid.as_deref() {
        wizard.set_orcid(orcid)?;
    }

    for co_author in &spec.co_authors {
        let co_author = co_author.to_co_author();
        if let Some(url) = co_author.orcid_profile_url() {
            info!("👥 合著者 {} ORCID: {}", co_author.full_name, url);
        }
        let name = co_author.full_name.clone();
        wizard
            .add_co_author(co_author)
            .with_context(|| format!("合著者信息不完整: {}", name))?;
    }

    wizard.attach_manuscript(loaded.manuscript.clone())?;
    for file in &loaded.supporting_files {
        wizard.add_supporting_file(file.clone())?;
    }
    wizard.set_cover_letter(&spec.cover_letter)?;

    if let Some(metadata) = &spec.metadata {
        wizard.set_metadata(metadata.to_metadata())?;
    }
    wizard.set_confirmed(spec.confirmed)?;

    Ok(())
}

fn report_notices(wizard: &mut Wizard) {
    for notice in wizard.take_notices() {
        warn!("⚠️  {}", notice);
    }
}

/// 完成邮箱验证并执行被推迟的翻页
async fn verify_email(wizard: &mut Wizard, prompt: &mut dyn CodePrompt) -> Result<()> {
    wizard.send_verification_code().await?;

    loop {
        let email = wizard
            .verification()
            .map(|flow| flow.email().to_string())
            .unwrap_or_default();

        let Some(input) = prompt.read_code(&email).await? else {
            wizard.cancel_verification();
            bail!("邮箱验证已放弃，停留在第 3 步");
        };

        let code = input.trim();
        if code.is_empty() {
            wizard.send_verification_code().await?;
            continue;
        }

        wizard.enter_verification_code(code)?;
        match wizard.verify_code().await {
            Ok(()) => break,
            Err(VerificationError::Backend(e)) => {
                report_notices(wizard);
                warn!("⚠️  验证码错误，请重试: {}", e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    let advance = wizard
        .acknowledge_verification()
        .await?
        .context("验证后第 3 步未通过校验")?;
    info!("✓ 邮箱验证完成: {:?}", advance);
    Ok(())
}

/// 从当前位置走到第 7 步
pub async fn drive_to_review(wizard: &mut Wizard, prompt: &mut dyn CodePrompt) -> Result<()> {
    loop {
        let step = wizard.current_step();
        let advance = wizard
            .next()
            .await
            .with_context(|| format!("第 {} 步未通过校验", step))?;
        report_notices(wizard);

        match advance {
            Advance::Moved(_) => {}
            Advance::VerificationRequired => verify_email(wizard, prompt).await?,
            Advance::ReadyToSubmit => return Ok(()),
        }
    }
}

/// 处理一份草稿：填入、翻页、（可选）预览、提交
pub async fn process_draft(
    wizard: &mut Wizard,
    loaded: &LoadedDraft,
    prompt: &mut dyn CodePrompt,
    generate_preview: bool,
) -> Result<DraftOutcome> {
    info!("📁 处理草稿: {}", loaded.file_path.display());
    apply_draft(wizard, loaded)?;
    drive_to_review(wizard, prompt).await?;

    let preview_url = if generate_preview {
        match wizard.generate_preview().await {
            Ok(url) => {
                info!("🔗 预览地址: {}", url);
                Some(url)
            }
            Err(e) => {
                report_notices(wizard);
                warn!("⚠️  预览生成失败，继续提交: {}", e);
                None
            }
        }
    } else {
        None
    };

    match wizard.submit().await {
        Ok(SubmitResult::Submitted) => {}
        Ok(SubmitResult::NotReady) => bail!("稿件未确认（confirmed = false），未提交"),
        Ok(SubmitResult::Invalid(e)) => bail!("提交前校验失败: {}", e),
        Err(e) => {
            let message = wizard.message().unwrap_or_default().to_string();
            return Err(anyhow::Error::new(e).context(message));
        }
    }

    let draft = wizard.draft();
    let outcome = DraftOutcome {
        title: draft.metadata.title.clone(),
        journal: draft.journal.clone(),
        message: wizard.message().unwrap_or_default().to_string(),
        preview_url,
    };
    log_outcome(&outcome.title, &outcome.journal, &outcome.message);
    Ok(outcome)
}
