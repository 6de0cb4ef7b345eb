//! 账号凭证存储 (auth.json)
//!
//! 单账号模型: 一个登录代码 + 密码, 可选的营收 PIN。
//! 密码以 PBKDF2-HMAC-SHA256 (200 000 次, 16 字节盐, 32 字节输出) 保存,
//! 所有读写经由同一把 `tokio::sync::Mutex` 串行化。

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::db::maintenance::with_suffix;

const PBKDF2_ITERATIONS: u32 = 200_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const FILE_VERSION: u32 = 1;

/// 凭证错误
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("account is not initialized")]
    NotInitialized,

    #[error("account is already initialized")]
    AlreadyInitialized,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("credential file is malformed: {0}")]
    Malformed(String),

    #[error("random generator failure")]
    Crypto,

    #[error("credential file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::NotInitialized => AppError::new(ErrorCode::AccountNotInitialized),
            CredentialError::AlreadyInitialized => {
                AppError::new(ErrorCode::AccountAlreadyInitialized)
            }
            CredentialError::InvalidCredentials => AppError::invalid_credentials(),
            CredentialError::Validation(msg) => AppError::validation(msg),
            CredentialError::Malformed(msg) => {
                AppError::with_message(ErrorCode::InvalidFormat, format!("auth.json: {msg}"))
            }
            CredentialError::Crypto => AppError::internal("random generator failure"),
            CredentialError::Io(e) => AppError::storage(e.to_string()),
        }
    }
}

/// 盐 + 哈希 (base64)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecretHash {
    pub salt: String,
    pub hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub code: String,
    pub salt: String,
    pub hash: String,
}

impl UserRecord {
    fn secret(&self) -> SecretHash {
        SecretHash {
            salt: self.salt.clone(),
            hash: self.hash.clone(),
        }
    }
}

/// auth.json 文件结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CredentialFile {
    #[serde(default = "default_version")]
    pub version: u32,
    pub user: UserRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpi_pin: Option<SecretHash>,
}

fn default_version() -> u32 {
    FILE_VERSION
}

impl CredentialFile {
    fn is_complete(&self) -> bool {
        !self.user.code.is_empty() && !self.user.salt.is_empty() && !self.user.hash.is_empty()
    }
}

/// 账号修改请求 (空白字段保持原值)
#[derive(Debug, Clone, Default)]
pub struct AccountChange {
    pub current_password: String,
    pub new_code: Option<String>,
    pub new_password: Option<String>,
    pub new_kpi_pin: Option<String>,
}

/// 解析凭证文件内容 (备份恢复前校验)
pub fn parse_credential_bytes(bytes: &[u8]) -> Result<CredentialFile, CredentialError> {
    let file: CredentialFile =
        serde_json::from_slice(bytes).map_err(|e| CredentialError::Malformed(e.to_string()))?;
    if !file.is_complete() {
        return Err(CredentialError::Malformed(
            "user.code, user.salt and user.hash are required".into(),
        ));
    }
    Ok(file)
}

/// 为明文生成新盐并计算哈希
pub fn hash_secret(secret: &str) -> Result<SecretHash, CredentialError> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| CredentialError::Crypto)?;

    let mut hash = [0u8; HASH_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations(),
        &salt,
        secret.as_bytes(),
        &mut hash,
    );

    Ok(SecretHash {
        salt: STANDARD.encode(salt),
        hash: STANDARD.encode(hash),
    })
}

/// 常量时间比较
pub fn verify_secret(stored: &SecretHash, secret: &str) -> bool {
    let (Ok(salt), Ok(hash)) = (STANDARD.decode(&stored.salt), STANDARD.decode(&stored.hash))
    else {
        return false;
    };
    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations(),
        &salt,
        secret.as_bytes(),
        &hash,
    )
    .is_ok()
}

fn iterations() -> NonZeroU32 {
    NonZeroU32::new(PBKDF2_ITERATIONS).unwrap_or(NonZeroU32::MIN)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// 凭证存储
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文件存在、可解析且账号字段完整
    pub async fn is_initialized(&self) -> bool {
        let _guard = self.lock.lock().await;
        self.load().await.is_some_and(|f| f.is_complete())
    }

    /// 首次设置账号, 返回去除空白后的代码
    pub async fn setup(&self, code: &str, password: &str) -> Result<String, CredentialError> {
        let code = code.trim();
        if code.is_empty() || password.trim().is_empty() {
            return Err(CredentialError::Validation(
                "code and password are required".into(),
            ));
        }

        let _guard = self.lock.lock().await;
        if self.load().await.is_some_and(|f| f.is_complete()) {
            return Err(CredentialError::AlreadyInitialized);
        }

        let secret = hash_secret(password)?;
        let file = CredentialFile {
            version: FILE_VERSION,
            user: UserRecord {
                code: code.to_string(),
                salt: secret.salt,
                hash: secret.hash,
            },
            kpi_pin: None,
        };
        self.save(&file).await?;
        tracing::info!(code = %code, "Account initialized");
        Ok(code.to_string())
    }

    /// 校验登录; 文件缺失或不可读时为 false
    pub async fn verify(&self, code: &str, password: &str) -> bool {
        let _guard = self.lock.lock().await;
        match self.load().await {
            Some(file) if file.is_complete() => {
                file.user.code == code.trim() && verify_secret(&file.user.secret(), password)
            }
            _ => false,
        }
    }

    /// 营收二次验证: 有 PIN 时校验 PIN, 否则校验账号密码
    pub async fn verify_revenue_secret(&self, secret: &str) -> bool {
        let _guard = self.lock.lock().await;
        let Some(file) = self.load().await.filter(|f| f.is_complete()) else {
            return false;
        };
        match &file.kpi_pin {
            Some(pin) => verify_secret(pin, secret),
            None => verify_secret(&file.user.secret(), secret),
        }
    }

    /// 修改账号代码 / 密码 / PIN, 返回修改后的代码
    pub async fn change_account(&self, change: AccountChange) -> Result<String, CredentialError> {
        let _guard = self.lock.lock().await;
        let mut file = self
            .load()
            .await
            .filter(|f| f.is_complete())
            .ok_or(CredentialError::NotInitialized)?;

        if !verify_secret(&file.user.secret(), &change.current_password) {
            return Err(CredentialError::InvalidCredentials);
        }

        if let Some(code) = non_blank(change.new_code) {
            file.user.code = code.trim().to_string();
        }
        if let Some(password) = non_blank(change.new_password) {
            let secret = hash_secret(&password)?;
            file.user.salt = secret.salt;
            file.user.hash = secret.hash;
        }
        if let Some(pin) = non_blank(change.new_kpi_pin) {
            file.kpi_pin = Some(hash_secret(&pin)?);
        }

        self.save(&file).await?;
        tracing::info!(code = %file.user.code, "Account updated");
        Ok(file.user.code)
    }

    /// 原始文件内容 (备份用); 未初始化时为 None
    pub async fn read_raw(&self) -> Result<Option<Vec<u8>>, CredentialError> {
        let _guard = self.lock.lock().await;
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 用备份内容整体替换 (先校验格式)
    pub async fn replace_from_bytes(&self, bytes: &[u8]) -> Result<(), CredentialError> {
        let file = parse_credential_bytes(bytes)?;
        let _guard = self.lock.lock().await;
        self.save(&file).await?;
        tracing::info!(code = %file.user.code, "Credentials restored from backup");
        Ok(())
    }

    /// 读取文件; 损坏时改名为 `.broken` 并视为不存在
    async fn load(&self) -> Option<CredentialFile> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Cannot read credential file");
                return None;
            }
        };

        match serde_json::from_slice::<CredentialFile>(&bytes) {
            Ok(file) => Some(file),
            Err(e) => {
                let broken = with_suffix(&self.path, ".broken");
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Credential file is corrupt, moving it aside"
                );
                if let Err(e) = tokio::fs::rename(&self.path, &broken).await {
                    tracing::error!(error = %e, "Failed to rename corrupt credential file");
                }
                None
            }
        }
    }

    /// 先写临时文件再改名
    async fn save(&self, file: &CredentialFile) -> Result<(), CredentialError> {
        let json =
            serde_json::to_vec_pretty(file).map_err(|e| CredentialError::Malformed(e.to_string()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = with_suffix(&self.path, ".tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("auth.json"))
    }

    #[tokio::test]
    async fn test_setup_and_verify() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(!store.is_initialized().await);
        assert!(!store.verify("boss", "pw").await);

        let code = store.setup("  boss ", "s3cret").await.unwrap();
        assert_eq!(code, "boss");
        assert!(store.is_initialized().await);
        assert!(store.verify("boss", "s3cret").await);
        assert!(store.verify(" boss", "s3cret").await);
        assert!(!store.verify("boss", "wrong").await);
        assert!(!store.verify("other", "s3cret").await);

        assert!(matches!(
            store.setup("boss", "again").await,
            Err(CredentialError::AlreadyInitialized)
        ));
    }

    #[tokio::test]
    async fn test_setup_requires_fields() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(matches!(
            store.setup("  ", "pw").await,
            Err(CredentialError::Validation(_))
        ));
        assert!(matches!(
            store.setup("boss", "").await,
            Err(CredentialError::Validation(_))
        ));
        assert!(!store.is_initialized().await);
    }

    #[tokio::test]
    async fn test_file_format() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.setup("boss", "pw").await.unwrap();

        let raw = std::fs::read(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["user"]["code"], "boss");
        assert!(value.get("kpi_pin").is_none());

        let salt = STANDARD.decode(value["user"]["salt"].as_str().unwrap()).unwrap();
        let hash = STANDARD.decode(value["user"]["hash"].as_str().unwrap()).unwrap();
        assert_eq!(salt.len(), SALT_LEN);
        assert_eq!(hash.len(), HASH_LEN);
        assert!(parse_credential_bytes(&raw).is_ok());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_moved_aside() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::write(store.path(), b"{not json").unwrap();

        assert!(!store.is_initialized().await);
        assert!(!store.path().exists());
        assert!(dir.path().join("auth.json.broken").exists());

        store.setup("boss", "pw").await.unwrap();
        assert!(store.verify("boss", "pw").await);
    }

    #[tokio::test]
    async fn test_change_account() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.setup("boss", "old").await.unwrap();

        let err = store
            .change_account(AccountChange {
                current_password: "bad".into(),
                new_code: Some("chef".into()),
                ..Default::default()
            })
            .await;
        assert!(matches!(err, Err(CredentialError::InvalidCredentials)));

        let code = store
            .change_account(AccountChange {
                current_password: "old".into(),
                new_code: Some(" chef ".into()),
                new_password: Some("   ".into()),
                new_kpi_pin: None,
            })
            .await
            .unwrap();
        assert_eq!(code, "chef");
        assert!(store.verify("chef", "old").await);

        store
            .change_account(AccountChange {
                current_password: "old".into(),
                new_password: Some("new".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(store.verify("chef", "new").await);
        assert!(!store.verify("chef", "old").await);
    }

    #[tokio::test]
    async fn test_revenue_secret_prefers_pin() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.setup("boss", "pw").await.unwrap();
        assert!(store.verify_revenue_secret("pw").await);

        store
            .change_account(AccountChange {
                current_password: "pw".into(),
                new_kpi_pin: Some("1234".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(store.verify_revenue_secret("1234").await);
        assert!(!store.verify_revenue_secret("pw").await);
    }

    #[tokio::test]
    async fn test_replace_from_bytes_validates() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.replace_from_bytes(b"[]").await.is_err());
        assert!(
            store
                .replace_from_bytes(br#"{"version":1,"user":{"code":"","salt":"","hash":""}}"#)
                .await
                .is_err()
        );

        let other_dir = TempDir::new().unwrap();
        let other = CredentialStore::new(other_dir.path().join("auth.json"));
        other.setup("boss", "pw").await.unwrap();
        let raw = other.read_raw().await.unwrap().unwrap();

        store.replace_from_bytes(&raw).await.unwrap();
        assert!(store.verify("boss", "pw").await);
    }
}
