//! 模块：本地会话 (占位登录)
//!
//! **注意**: 这不是认证模型。
//! - 登录只检查邮箱和密码非空，不会请求任何服务器；
//! - 令牌是随机生成的不透明字符串，没有签名、没有过期；
//! - 判断"已登录"的唯一依据是令牌键是否存在。

use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// 令牌所在的固定键
pub const TOKEN_KEY: &str = "authToken";
const SESSION_KEY: &str = "session";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    pub email: String,
    /// Unix 时间戳 (秒)
    pub logged_in_at: i64,
}

/// 基于 sled 的本地键值存储，程序重启后会话依然在
pub struct SessionStore {
    db: sled::Db,
}

impl SessionStore {
    pub fn open(path: &str) -> Result<Self, SessionError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// 只在存储目录已存在时打开；从未登录过则返回 None，且不在磁盘上创建任何东西
    pub fn open_existing(path: &str) -> Result<Option<Self>, SessionError> {
        if !std::path::Path::new(path).exists() {
            return Ok(None);
        }
        Self::open(path).map(Some)
    }

    /// 临时存储，进程退出即删除
    pub fn temporary() -> Result<Self, SessionError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// 假登录：两项都非空即成功
    pub fn login(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        let email = email.trim();
        if email.is_empty() || password.trim().is_empty() {
            return Err(SessionError::InvalidCredentials);
        }

        let session = Session {
            name: display_name(email),
            email: email.to_string(),
            logged_in_at: chrono::Utc::now().timestamp(),
        };

        // 1. 先写会话记录，再写令牌：令牌存在时记录一定存在
        self.db.insert(SESSION_KEY, serde_json::to_vec(&session)?)?;
        self.db.insert(TOKEN_KEY, generate_token().as_bytes())?;
        self.db.flush()?;

        info!("🔑 已登录: email={}", session.email);
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.db.remove(TOKEN_KEY)?;
        self.db.remove(SESSION_KEY)?;
        self.db.flush()?;
        info!("🔒 已退出登录");
        Ok(())
    }

    pub fn is_logged_in(&self) -> Result<bool, SessionError> {
        Ok(self.db.contains_key(TOKEN_KEY)?)
    }

    /// 当前会话；没有令牌时为 None
    pub fn current(&self) -> Result<Option<Session>, SessionError> {
        if !self.is_logged_in()? {
            return Ok(None);
        }

        match self.db.get(SESSION_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            // 只有令牌没有记录 (例如被外部写入的旧令牌)，给一个占位用户
            None => Ok(Some(Session {
                name: "Guest".to_string(),
                email: String::new(),
                logged_in_at: 0,
            })),
        }
    }

    /// 原样返回令牌，供需要带令牌的调用方使用
    pub fn token(&self) -> Result<Option<String>, SessionError> {
        Ok(self
            .db
            .get(TOKEN_KEY)?
            .map(|raw| String::from_utf8_lossy(&raw).into_owned()))
    }
}

// 邮箱 @ 前的部分作为显示名
fn display_name(email: &str) -> String {
    email
        .split('@')
        .next()
        .filter(|local| !local.is_empty())
        .unwrap_or(email)
        .to_string()
}

fn generate_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("local-{}", hex::encode(bytes))
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Please enter valid credentials")]
    InvalidCredentials,
    #[error("session storage failure: {0}")]
    Storage(#[from] sled::Error),
    #[error("session record corrupted: {0}")]
    Codec(#[from] serde_json::Error),
}
