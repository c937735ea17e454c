//! 平台配置

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

/// 全局配置实例
static CONFIG: OnceLock<Config> = OnceLock::new();

/// 平台配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 服务配置
    pub http: HttpConfig,
    /// 数据库配置
    pub database: DatabaseConfig,
    /// JWT 配置
    pub jwt: JwtConfig,
    /// 账号配置
    pub auth: AuthConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 二维码图片配置
    pub qrcode: QrCodeConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// 绑定地址
    pub bind_address: String,
    /// HTTP 服务端口
    pub port: u16,
    /// 请求超时时间（秒）
    pub timeout_seconds: u64,
}

/// 数据库配置，`url` 为空时使用内存存储
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    /// 启动时执行内置建表语句
    pub apply_schema: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
    /// 注册时自动授予 admin 角色的用户名
    pub admin_usernames: Vec<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志文件路径
    pub log_path: PathBuf,
    /// 日志文件名前缀
    pub file_prefix: String,
    /// 是否启用控制台输出
    pub console_output: bool,
    /// 是否写入滚动日志文件
    pub file_output: bool,
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QrCodeConfig {
    pub image_dir: PathBuf,
    /// 图片边长（像素）
    pub image_size: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            timeout_seconds: 30,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 20,
            min_connections: 5,
            acquire_timeout_seconds: 8,
            apply_schema: false,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_token_ttl_seconds: 2 * 60 * 60,
            refresh_token_ttl_seconds: 7 * 24 * 60 * 60,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: 10,
            admin_usernames: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("./logs"),
            file_prefix: "office-platform".to_string(),
            console_output: true,
            file_output: false,
            level: "info".to_string(),
        }
    }
}

impl Default for QrCodeConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("/tmp/qrcodes"),
            image_size: 256,
        }
    }
}

impl Config {
    /// 从配置文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::FileWrite(e.to_string()))?;
        }

        fs::write(path.as_ref(), content).map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// 用环境变量覆盖文件中的值
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = Some(url);
        }
        if let Some(secret) = lookup("JWT_SECRET").filter(|v| !v.is_empty()) {
            self.jwt.secret = secret;
        }
        if let Some(host) = lookup("SERVER_HOST").filter(|v| !v.is_empty()) {
            self.http.bind_address = host;
        }
        if let Some(port) = lookup("SERVER_PORT").and_then(|v| v.parse().ok()) {
            self.http.port = port;
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Validation("HTTP端口必须大于0".to_string()));
        }
        if self.http.bind_address.is_empty() {
            return Err(ConfigError::Validation("绑定地址不能为空".to_string()));
        }
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::Validation("JWT密钥不能为空".to_string()));
        }
        if self.jwt.access_token_ttl_seconds <= 0 || self.jwt.refresh_token_ttl_seconds <= 0 {
            return Err(ConfigError::Validation("令牌有效期必须大于0".to_string()));
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(ConfigError::Validation(format!(
                "无效的 bcrypt cost: {}，有效范围 4-31",
                self.auth.bcrypt_cost
            )));
        }
        if self.qrcode.image_size == 0 {
            return Err(ConfigError::Validation("二维码尺寸必须大于0".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "无效的日志级别: {}，有效值: {:?}",
                self.logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("文件读取错误: {0}")]
    FileRead(String),
    #[error("文件写入错误: {0}")]
    FileWrite(String),
    #[error("配置解析错误: {0}")]
    Parse(String),
    #[error("配置序列化错误: {0}")]
    Serialize(String),
    #[error("配置验证错误: {0}")]
    Validation(String),
}

/// 初始化全局配置
pub fn init_config() -> Result<&'static Config, ConfigError> {
    let config = load_config()?;
    config.validate()?;

    CONFIG
        .set(config)
        .map_err(|_| ConfigError::Validation("配置已经初始化".to_string()))?;

    get_config()
}

/// 从文件或默认值加载配置，再叠加环境变量
pub fn load_config() -> Result<Config, ConfigError> {
    let mut config_paths = vec![
        PathBuf::from("config.toml"),
        PathBuf::from("./config/config.toml"),
    ];
    if let Ok(path) = std::env::var("OFFICE_CONFIG") {
        config_paths.insert(0, PathBuf::from(path));
    }

    let mut config = match config_paths.iter().find(|path| path.exists()) {
        Some(path) => {
            info!(path = %path.display(), "从配置文件加载");
            Config::load_from_file(path)?
        }
        None => {
            info!("未找到配置文件，使用默认配置");
            Config::default()
        }
    };
    config.apply_env_overrides();
    Ok(config)
}

/// 获取全局配置实例
pub fn get_config() -> Result<&'static Config, ConfigError> {
    CONFIG
        .get()
        .ok_or_else(|| ConfigError::Validation("配置未初始化，请先调用 init_config()".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.jwt.access_token_ttl_seconds, 7200);
        assert_eq!(config.qrcode.image_size, 256);
        assert!(config.database.url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.jwt.secret.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.auth.bcrypt_cost = 2;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.http.port = 9000;
        config.auth.admin_usernames = vec!["root".to_string()];
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.http.port, 9000);
        assert_eq!(loaded.auth.admin_usernames, vec!["root".to_string()]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[jwt]\nsecret = \"s3cret\"\n").unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.jwt.secret, "s3cret");
        assert_eq!(loaded.jwt.refresh_token_ttl_seconds, 604800);
        assert_eq!(loaded.http.port, 8080);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/office".to_string()),
            "SERVER_PORT" => Some("9100".to_string()),
            "JWT_SECRET" => Some(String::new()),
            _ => None,
        });
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://localhost/office")
        );
        assert_eq!(config.http.port, 9100);
        assert_eq!(config.jwt.secret, JwtConfig::default().secret);
    }
}
