//! Translation service secrets kept in the OS keyring.
//!
//! With `baidu.use_keyring = true` the Baidu secret is read from the
//! keyring entry `papertrans.translator.baidu` / `<app_id>`. A `secret_key`
//! still present in the config file is copied into the keyring the first
//! time it is missing there, after which it can be removed from the file.

use keyring::Entry;
use log::{info, warn};

use crate::config::BaiduConfig;

const BAIDU_KEYRING_SERVICE: &str = "papertrans.translator.baidu";

/// Storage for per-account secrets.
pub trait SecretStore {
    fn load(&self, account: &str) -> Result<Option<String>, String>;
    fn store(&self, account: &str, secret: &str) -> Result<(), String>;
}

/// Secret store backed by the platform keyring.
pub struct KeyringSecretStore;

impl KeyringSecretStore {
    fn entry(account: &str) -> Result<Entry, String> {
        Entry::new(BAIDU_KEYRING_SERVICE, account).map_err(|err| {
            describe_keyring_failure("open keyring entry", account, &err.to_string())
        })
    }
}

impl SecretStore for KeyringSecretStore {
    fn load(&self, account: &str) -> Result<Option<String>, String> {
        match Self::entry(account)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(describe_keyring_failure(
                "read Baidu secret",
                account,
                &err.to_string(),
            )),
        }
    }

    fn store(&self, account: &str, secret: &str) -> Result<(), String> {
        Self::entry(account)?
            .set_password(secret)
            .map_err(|err| describe_keyring_failure("save Baidu secret", account, &err.to_string()))
    }
}

fn describe_keyring_failure(operation: &str, account: &str, detail: &str) -> String {
    let message = format!("could not {operation} for app id '{account}': {detail}");
    if detail.contains("org.freedesktop.DBus.Error.ServiceUnknown") {
        format!(
            "{message} (no Secret Service provider is running; start GNOME Keyring or \
             KeePassXC, or set baidu.use_keyring = false and keep secret_key in the config file)"
        )
    } else {
        message
    }
}

/// Returns the Baidu secret for `baidu.app_id`, taken from the config file
/// or, with `use_keyring`, from `store`. A config secret missing from the
/// keyring is saved there.
pub fn resolve_baidu_secret(store: &dyn SecretStore, baidu: &BaiduConfig) -> Result<String, String> {
    let app_id = baidu.app_id.trim();
    let config_secret = baidu.secret_key.trim();
    if !baidu.use_keyring {
        if config_secret.is_empty() {
            return Err("app_id and secret_key are required".to_string());
        }
        return Ok(config_secret.to_string());
    }

    if let Some(secret) = store.load(app_id)? {
        if !config_secret.is_empty() && config_secret != secret {
            warn!("baidu.secret_key differs from the keyring entry; using the keyring entry");
        }
        return Ok(secret);
    }
    if config_secret.is_empty() {
        return Err(format!(
            "no Baidu secret stored in the system keyring for app id '{app_id}'; \
             set baidu.secret_key once to save it there"
        ));
    }
    match store.store(app_id, config_secret) {
        Ok(()) => info!(
            "Saved Baidu secret to the system keyring; baidu.secret_key can now be removed from the config file"
        ),
        Err(err) => warn!("{}", err),
    }
    Ok(config_secret.to_string())
}
