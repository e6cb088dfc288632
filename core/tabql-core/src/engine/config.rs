// Engine configuration
//
// Layering: defaults → load_from_file → load_from_env

use crate::error::{TabqlError, TabqlResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;

/// WHERE 평가 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhereMode {
    /// `AND` binds tighter than `OR`, evaluated as a tree
    #[default]
    Boolean,

    /// Every comparison is AND-ed, whichever connective was written
    Conjunctive,
}

impl WhereMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhereMode::Boolean => "boolean",
            WhereMode::Conjunctive => "conjunctive",
        }
    }

    /// 문자열에서 WhereMode 파싱
    pub fn parse_mode(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boolean" => Some(WhereMode::Boolean),
            "conjunctive" => Some(WhereMode::Conjunctive),
            _ => None,
        }
    }
}

/// 엔진 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How AND/OR in WHERE are combined
    pub where_mode: WhereMode,

    /// LIKE ignores case
    pub like_case_insensitive: bool,

    /// NULLs sort before other values in ascending order
    pub nulls_first: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            where_mode: WhereMode::Boolean,
            like_case_insensitive: false,
            nulls_first: true,
        }
    }
}

impl EngineConfig {
    pub const ENV_WHERE_MODE: &'static str = "TABQL_WHERE_MODE";
    pub const ENV_LIKE_CASE_INSENSITIVE: &'static str = "TABQL_LIKE_CASE_INSENSITIVE";
    pub const ENV_NULLS_FIRST: &'static str = "TABQL_NULLS_FIRST";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_where_mode(mut self, mode: WhereMode) -> Self {
        self.where_mode = mode;
        self
    }

    pub fn with_like_case_insensitive(mut self, enabled: bool) -> Self {
        self.like_case_insensitive = enabled;
        self
    }

    pub fn with_nulls_first(mut self, enabled: bool) -> Self {
        self.nulls_first = enabled;
        self
    }

    /// 파일에서 로드 (없는 필드는 기본값)
    pub fn load_from_file(path: impl AsRef<Path>) -> TabqlResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| TabqlError::Config(format!("{}: {e}", path.display())))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// 파일에 저장
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> TabqlResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;

        // 디렉토리 생성
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, json)?;
        Ok(())
    }

    /// 환경 변수 적용 (설정된 변수만 덮어씀)
    pub fn load_from_env(mut self) -> Self {
        if let Ok(value) = env::var(Self::ENV_WHERE_MODE) {
            match WhereMode::parse_mode(&value) {
                Some(mode) => self.where_mode = mode,
                None => warn!(var = Self::ENV_WHERE_MODE, value = %value, "ignoring unknown WHERE mode"),
            }
        }
        if let Some(enabled) = env_flag(Self::ENV_LIKE_CASE_INSENSITIVE) {
            self.like_case_insensitive = enabled;
        }
        if let Some(enabled) = env_flag(Self::ENV_NULLS_FIRST) {
            self.nulls_first = enabled;
        }
        self
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = env::var(name).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => {
            warn!(var = name, value = %value, "ignoring non-boolean flag");
            None
        }
    }
}
