use std::fmt;

#[derive(Debug, Clone)]
pub enum LinkvaultError {
    AlreadyExists(String),
    NotFound(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Serialization(String),
    Validation(String),
    PipelineClosed(String),
}

impl LinkvaultError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkvaultError::AlreadyExists(_) => "E001",
            LinkvaultError::NotFound(_) => "E002",
            LinkvaultError::DatabaseConfig(_) => "E003",
            LinkvaultError::DatabaseConnection(_) => "E004",
            LinkvaultError::DatabaseOperation(_) => "E005",
            LinkvaultError::FileOperation(_) => "E006",
            LinkvaultError::Serialization(_) => "E007",
            LinkvaultError::Validation(_) => "E008",
            LinkvaultError::PipelineClosed(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkvaultError::AlreadyExists(_) => "Already Exists",
            LinkvaultError::NotFound(_) => "Resource Not Found",
            LinkvaultError::DatabaseConfig(_) => "Database Configuration Error",
            LinkvaultError::DatabaseConnection(_) => "Database Connection Error",
            LinkvaultError::DatabaseOperation(_) => "Database Operation Error",
            LinkvaultError::FileOperation(_) => "File Operation Error",
            LinkvaultError::Serialization(_) => "Serialization Error",
            LinkvaultError::Validation(_) => "Validation Error",
            LinkvaultError::PipelineClosed(_) => "Deletion Pipeline Closed",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkvaultError::AlreadyExists(msg)
            | LinkvaultError::NotFound(msg)
            | LinkvaultError::DatabaseConfig(msg)
            | LinkvaultError::DatabaseConnection(msg)
            | LinkvaultError::DatabaseOperation(msg)
            | LinkvaultError::FileOperation(msg)
            | LinkvaultError::Serialization(msg)
            | LinkvaultError::Validation(msg)
            | LinkvaultError::PipelineClosed(msg) => msg,
        }
    }

    /// 重复写入（短 ID 已被占用），调用方应返回已有短链接而不是报错
    pub fn is_already_exists(&self) -> bool {
        matches!(self, LinkvaultError::AlreadyExists(_))
    }

    /// 存储后端不可用（连接或文件系统故障）
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(
            self,
            LinkvaultError::DatabaseConfig(_)
                | LinkvaultError::DatabaseConnection(_)
                | LinkvaultError::FileOperation(_)
        )
    }

    /// 格式化为彩色输出（用于 serve 模式启动失败）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkvaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkvaultError {}

// 便捷的构造函数
impl LinkvaultError {
    pub fn already_exists<T: Into<String>>(msg: T) -> Self {
        LinkvaultError::AlreadyExists(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkvaultError::NotFound(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkvaultError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkvaultError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkvaultError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LinkvaultError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkvaultError::Serialization(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkvaultError::Validation(msg.into())
    }

    pub fn pipeline_closed<T: Into<String>>(msg: T) -> Self {
        LinkvaultError::PipelineClosed(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LinkvaultError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkvaultError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for LinkvaultError {
    fn from(err: std::io::Error) -> Self {
        LinkvaultError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkvaultError {
    fn from(err: serde_json::Error) -> Self {
        LinkvaultError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkvaultError>;
