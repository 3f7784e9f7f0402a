use tracing::{info, warn};

use crate::error::AppResult;
use crate::models::SubmissionDraft;

use super::MetadataExtractor;

/// 元数据自动提取的一次性开关
///
/// 同一份稿件（同一 revision）只尝试一次；更换稿件后重新生效
#[derive(Debug, Clone, Default)]
pub struct MetadataTrigger {
    attempted_revision: Option<u64>,
}

impl MetadataTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 有稿件、标题和摘要都为空、且本 revision 未尝试过
    pub fn should_fire(&self, draft: &SubmissionDraft) -> bool {
        draft.manuscript.is_some()
            && draft.metadata.is_empty()
            && self.attempted_revision != Some(draft.manuscript_revision)
    }

    /// 条件满足时提取并覆盖草稿中的元数据
    ///
    /// 返回 `Ok(true)` 表示已填充；失败时元数据保持为空
    pub async fn run(
        &mut self,
        draft: &mut SubmissionDraft,
        extractor: &dyn MetadataExtractor,
    ) -> AppResult<bool> {
        if !self.should_fire(draft) {
            return Ok(false);
        }
        let Some(manuscript) = draft.manuscript.as_ref() else {
            return Ok(false);
        };

        self.attempted_revision = Some(draft.manuscript_revision);
        match extractor.extract(manuscript).await {
            Ok(metadata) => {
                info!(
                    "✓ 元数据提取完成: title={:?}, keywords={:?}",
                    metadata.title, metadata.keywords
                );
                draft.metadata = metadata;
                Ok(true)
            }
            Err(e) => {
                warn!("⚠️  元数据提取失败: {}", e);
                Err(e)
            }
        }
    }
}
