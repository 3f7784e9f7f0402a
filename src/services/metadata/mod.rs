//! 稿件元数据提取
//!
//! - [`MetadataTrigger`]：进入第 6 步时的一次性自动提取
//! - [`MetadataExtractor`]：提取方式（后端接口 / 本地启发式）

mod local;
mod trigger;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::clients::SubmissionApi;
use crate::config::{Config, ExtractionMode};
use crate::error::AppResult;
use crate::models::{Metadata, UploadedFile};

pub use local::LocalMetadataExtractor;
pub use trigger::MetadataTrigger;

#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    async fn extract(&self, manuscript: &UploadedFile) -> AppResult<Metadata>;
}

/// 调用后端 extract-metadata 接口
pub struct RemoteMetadataExtractor {
    api: Arc<dyn SubmissionApi>,
}

impl RemoteMetadataExtractor {
    pub fn new(api: Arc<dyn SubmissionApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl MetadataExtractor for RemoteMetadataExtractor {
    async fn extract(&self, manuscript: &UploadedFile) -> AppResult<Metadata> {
        info!("🔍 请求后端提取元数据: {}", manuscript.file_name);
        self.api.extract_metadata(manuscript).await
    }
}

/// 按配置选择提取方式
pub fn extractor_for(config: &Config, api: Arc<dyn SubmissionApi>) -> Arc<dyn MetadataExtractor> {
    match config.metadata_extraction {
        ExtractionMode::Remote => Arc::new(RemoteMetadataExtractor::new(api)),
        ExtractionMode::Local => Arc::new(LocalMetadataExtractor),
    }
}
