//! 邮箱验证子流程
//!
//! 作者声明没有 ORCID 时，必须先验证邮箱才能离开第 3 步：
//!
//! ```text
//! Pending --send_code--> EnteringCode --verify(ok)--> Done
//!              ^              |
//!              +--send_code---+   （重新发送，清空已输入的验证码）
//! ```

use thiserror::Error;
use tracing::{info, warn};

use crate::clients::SubmissionApi;
use crate::error::AppError;

/// 子流程所处阶段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStage {
    /// 等待发送验证码
    Pending,
    /// 验证码已发送，等待输入
    EnteringCode { code: String },
    /// 已验证，等待用户确认后继续
    Done,
}

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Please request a verification code first.")]
    CodeNotRequested,
    #[error("Please enter the verification code.")]
    EmptyCode,
    #[error("Email is already verified.")]
    AlreadyVerified,
    #[error("Please verify your email first.")]
    NotVerified,
    #[error("No email verification is in progress.")]
    NotVerifying,
    #[error("{}", .0.user_message().unwrap_or("Email verification failed. Please try again."))]
    Backend(#[from] AppError),
}

/// 一次邮箱验证
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationFlow {
    email: String,
    stage: VerificationStage,
}

impl VerificationFlow {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            stage: VerificationStage::Pending,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn stage(&self) -> &VerificationStage {
        &self.stage
    }

    pub fn is_verified(&self) -> bool {
        self.stage == VerificationStage::Done
    }

    /// 请求（或重新请求）验证码
    ///
    /// 发送失败时阶段不变
    pub async fn send_code(&mut self, api: &dyn SubmissionApi) -> Result<(), VerificationError> {
        if self.is_verified() {
            return Err(VerificationError::AlreadyVerified);
        }

        info!("📧 发送验证码: {}", self.email);
        if let Err(e) = api.send_verification(&self.email).await {
            warn!("⚠️  验证码发送失败: {}", e);
            return Err(e.into());
        }

        self.stage = VerificationStage::EnteringCode {
            code: String::new(),
        };
        info!("✓ 验证码已发送");
        Ok(())
    }

    /// 记录输入的验证码
    pub fn enter_code(&mut self, input: &str) -> Result<(), VerificationError> {
        match &mut self.stage {
            VerificationStage::EnteringCode { code } => {
                *code = input.trim().to_string();
                Ok(())
            }
            VerificationStage::Pending => Err(VerificationError::CodeNotRequested),
            VerificationStage::Done => Err(VerificationError::AlreadyVerified),
        }
    }

    /// 向后端校验当前输入的验证码；失败时保留输入，可直接重试
    pub async fn verify(&mut self, api: &dyn SubmissionApi) -> Result<(), VerificationError> {
        let code = match &self.stage {
            VerificationStage::EnteringCode { code } if code.is_empty() => {
                return Err(VerificationError::EmptyCode)
            }
            VerificationStage::EnteringCode { code } => code.clone(),
            VerificationStage::Pending => return Err(VerificationError::CodeNotRequested),
            VerificationStage::Done => return Err(VerificationError::AlreadyVerified),
        };

        if let Err(e) = api.verify_code(&self.email, &code).await {
            warn!("⚠️  验证码校验失败: {}", e);
            return Err(e.into());
        }

        self.stage = VerificationStage::Done;
        info!("✓ 邮箱已验证: {}", self.email);
        Ok(())
    }
}
