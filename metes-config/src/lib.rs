use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub jurisdiction: JurisdictionConfig,
    #[serde(default)]
    pub composition: CompositionConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 自动发现配置文件：优先读取环境变量 `METES_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os("METES_CONFIG") {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 描述文本中固定出现的行政区划。`city` 为空字符串时省略城市子句。
#[derive(Debug, Clone, Deserialize)]
pub struct JurisdictionConfig {
    #[serde(default = "JurisdictionConfig::default_city")]
    pub city: String,
    #[serde(default = "JurisdictionConfig::default_county")]
    pub county: String,
    #[serde(default = "JurisdictionConfig::default_state")]
    pub state: String,
}

impl JurisdictionConfig {
    fn default_city() -> String {
        "NORTH LITTLE ROCK".to_string()
    }

    fn default_county() -> String {
        "PULASKI".to_string()
    }

    fn default_state() -> String {
        "ARKANSAS".to_string()
    }
}

impl Default for JurisdictionConfig {
    fn default() -> Self {
        Self {
            city: Self::default_city(),
            county: Self::default_county(),
            state: Self::default_state(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TangentMode {
    #[default]
    Frozen,
    Threaded,
}

/// 负角方位的换算方式：`reflect` 保持既有文本，`normalize` 归一化到 `[0, 2π)`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleMode {
    #[default]
    Reflect,
    Normalize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompositionConfig {
    #[serde(default)]
    pub tangent_tracking: TangentMode,
    #[serde(default)]
    pub negative_angles: AngleMode,
    #[serde(default = "CompositionConfig::default_tolerance")]
    pub tangency_tolerance: f64,
}

impl CompositionConfig {
    fn default_tolerance() -> f64 {
        1e-9
    }
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            tangent_tracking: TangentMode::default(),
            negative_angles: AngleMode::default(),
            tangency_tolerance: Self::default_tolerance(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// 引测段（命令行给出的方位与距离）使用的长度单位。
    #[serde(default = "ReportConfig::default_unit")]
    pub default_unit: String,
}

impl ReportConfig {
    fn default_unit() -> String {
        "FEET".to_string()
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_unit: Self::default_unit(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}
