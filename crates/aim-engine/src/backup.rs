use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::RngExt;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use aim_core::rating::clamp_rating;
use aim_core::{Leaderboard, LeaderboardEntry};

use crate::error::BackupError;
use crate::profile;
use crate::store::KeyValueStore;

pub const BACKUP_VERSION: u32 = 1;
pub const PBKDF2_ITERATIONS: u32 = 150_000;

const SALT_LEN: usize = 16;
const IV_LEN: usize = 12;
const KEY_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupFile {
    pub version: u32,
    /// Creation time, epoch milliseconds.
    pub created: i64,
    pub enc: SealedPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedPayload {
    pub salt: String,
    pub iv: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupPayload {
    #[serde(default)]
    pub elo: Option<i32>,
    #[serde(default)]
    pub leaderboard: Option<Vec<LeaderboardEntry>>,
}

impl BackupFile {
    pub fn to_json(&self) -> Result<String, BackupError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, BackupError> {
        let file: BackupFile = serde_json::from_str(text)?;
        if file.version != BACKUP_VERSION {
            return Err(BackupError::UnsupportedVersion(file.version));
        }
        Ok(file)
    }
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

/// Encrypt `plaintext` under a fresh salt and IV.
pub fn seal<R: RngExt + ?Sized>(
    plaintext: &[u8],
    password: &str,
    rng: &mut R,
) -> Result<SealedPayload, BackupError> {
    let salt: [u8; SALT_LEN] = rng.random();
    let iv: [u8; IV_LEN] = rng.random();
    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    let data = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| BackupError::Decryption)?;
    Ok(SealedPayload {
        salt: STANDARD.encode(salt),
        iv: STANDARD.encode(iv),
        data: STANDARD.encode(data),
    })
}

/// Decrypt a sealed payload. Any authentication failure is `Decryption`.
pub fn open(sealed: &SealedPayload, password: &str) -> Result<Vec<u8>, BackupError> {
    let salt = STANDARD.decode(&sealed.salt)?;
    let iv = STANDARD.decode(&sealed.iv)?;
    let data = STANDARD.decode(&sealed.data)?;
    if iv.len() != IV_LEN {
        return Err(BackupError::Decryption);
    }
    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    cipher
        .decrypt(Nonce::from_slice(&iv), data.as_slice())
        .map_err(|_| BackupError::Decryption)
}

/// Snapshot the stored rating and leaderboard into an encrypted backup.
pub async fn create_backup<S: KeyValueStore, R: RngExt + ?Sized>(
    store: &S,
    password: &str,
    capacity: usize,
    rng: &mut R,
) -> Result<BackupFile, BackupError> {
    let payload = BackupPayload {
        elo: Some(profile::load_rating(store).await?),
        leaderboard: profile::load_leaderboard(store, capacity)
            .await?
            .map(Leaderboard::into_entries),
    };
    let plaintext = serde_json::to_vec(&payload)?;
    let enc = seal(&plaintext, password, rng)?;
    log::info!("backup created");
    Ok(BackupFile {
        version: BACKUP_VERSION,
        created: chrono::Utc::now().timestamp_millis(),
        enc,
    })
}

/// Decrypt and apply a backup. The payload is validated first and then
/// written in one `set_many`, so a failed restore leaves the store as it was.
pub async fn restore_backup<S: KeyValueStore>(
    store: &S,
    backup: &BackupFile,
    password: &str,
    capacity: usize,
) -> Result<BackupPayload, BackupError> {
    if backup.version != BACKUP_VERSION {
        return Err(BackupError::UnsupportedVersion(backup.version));
    }
    let plaintext = match open(&backup.enc, password) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("restore rejected: {}", e);
            return Err(e);
        }
    };
    let mut payload: BackupPayload = serde_json::from_slice(&plaintext)?;
    payload.elo = payload.elo.map(clamp_rating);
    payload.leaderboard = payload
        .leaderboard
        .map(|entries| Leaderboard::from_entries(entries, capacity).into_entries());

    let mut writes = Vec::new();
    if let Some(elo) = payload.elo {
        writes.push((profile::RATING_KEY, elo.to_string()));
    }
    if let Some(entries) = &payload.leaderboard {
        writes.push((profile::LEADERBOARD_KEY, serde_json::to_string(entries)?));
    }
    if !writes.is_empty() {
        store.set_many(&writes).await?;
    }
    log::info!("backup restored (rating {:?})", payload.elo);
    Ok(payload)
}
