use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, Write},
    path::Path,
};

/// Reads the token file if it exists, returning Ok(Some(token)) or Ok(None).
pub fn load_token(path: &Path) -> io::Result<Option<String>> {
    if path.exists() {
        let token = fs::read_to_string(path)?.trim().to_string();
        Ok(Some(token))
    } else {
        Ok(None)
    }
}

/// Writes `token` to the file, creating parent dirs and setting 0o600 perms on Unix.
pub fn save_token(path: &Path, token: &str) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(token.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = file.metadata()?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

/// Deletes the token file if it exists.
pub fn clear_token(path: &Path) -> io::Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Locally cached platform connections, refreshed after every `connect` and
/// `disconnect` so `accounts --cached` works offline.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AccountsCache {
    #[serde(default)]
    pub accounts: Vec<CachedAccount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAccount {
    pub platform: String,
    pub username: Option<String>,
    pub connected_at: String,
}

impl AccountsCache {
    /// Inserts the account, replacing a previous entry for the same platform.
    pub fn upsert(&mut self, account: CachedAccount) {
        match self
            .accounts
            .iter_mut()
            .find(|existing| existing.platform == account.platform)
        {
            Some(existing) => *existing = account,
            None => self.accounts.push(account),
        }
    }

    pub fn remove(&mut self, platform: &str) {
        self.accounts.retain(|account| account.platform != platform);
    }
}

/// Reads the accounts cache; a missing file is an empty cache.
pub fn load_accounts(path: &Path) -> io::Result<AccountsCache> {
    if !path.exists() {
        return Ok(AccountsCache::default());
    }
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub fn save_accounts(path: &Path, cache: &AccountsCache) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let content =
        toml::to_string_pretty(cache).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, content)
}
