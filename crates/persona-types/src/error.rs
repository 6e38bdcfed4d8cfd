use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersonaError {
    #[error("No API credential configured")]
    MissingCredential,

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Response parse error: {0}")]
    ResponseParse(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Name is empty")]
    InvalidName,
}

/// Coarse failure class, ordered by what the user sees first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Authorization,
    Parse,
    Transport,
}

impl PersonaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PersonaError::MissingCredential | PersonaError::InvalidName => ErrorKind::Configuration,
            PersonaError::Authorization(_) => ErrorKind::Authorization,
            PersonaError::ResponseParse(_) => ErrorKind::Parse,
            PersonaError::Transport(_) | PersonaError::Timeout(_) => ErrorKind::Transport,
        }
    }

    /// Text for the error banner.
    pub fn user_message(&self) -> String {
        match self {
            PersonaError::MissingCredential => {
                "未配置 API 密钥，请在设置中填写后重试".to_string()
            }
            PersonaError::Authorization(_) => {
                "API 密钥无效或没有访问权限，请检查密钥配置".to_string()
            }
            PersonaError::ResponseParse(_) => "AI 响应解析失败".to_string(),
            PersonaError::Timeout(ms) => {
                format!("请求超时（{} 秒），请稍后再试", ms / 1000)
            }
            PersonaError::InvalidName => "请输入名字".to_string(),
            PersonaError::Transport(_) => {
                "由于网络或配置原因，无法获取灵感".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for PersonaError {
    fn from(e: serde_json::Error) -> Self {
        PersonaError::ResponseParse(e.to_string())
    }
}
