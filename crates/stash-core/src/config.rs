use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{
    domain::{ChatId, Recipient},
    errors::Error,
    Result,
};

/// Typed configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    pub save_path: PathBuf,
    /// Public base URL (scheme included, no trailing slash).
    pub domain: String,
    pub enable_groups: Vec<i64>,
    pub info_channel: Recipient,
    /// 0 lets the OS pick.
    pub port: u16,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `load()` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            lookup(key).and_then(non_empty).ok_or_else(|| {
                Error::Config(format!("{key} environment variable is required"))
            })
        };

        let bot_token = required("BOT_TOKEN")?;
        let save_path = PathBuf::from(required("FILE_SAVE_PATH")?);
        let domain = normalize_domain(&required("DOMAIN")?);

        let enable_groups = parse_csv_i64(Some(required("ENABLE_GROUPS")?));
        if enable_groups.is_empty() {
            return Err(Error::Config(
                "ENABLE_GROUPS must list at least one chat id".to_string(),
            ));
        }

        let raw_channel = required("INFO_CHANNEL")?;
        let info_channel = Recipient::parse(&raw_channel)
            .ok_or_else(|| Error::Config(format!("INFO_CHANNEL is invalid: {raw_channel}")))?;

        let port = match lookup("PORT").and_then(non_empty) {
            Some(p) => p
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {p}")))?,
            None => 0,
        };

        fs::create_dir_all(&save_path)?;

        Ok(Self {
            bot_token,
            save_path,
            domain,
            enable_groups,
            info_channel,
            port,
        })
    }

    pub fn is_enabled_chat(&self, chat_id: ChatId) -> bool {
        self.enable_groups.contains(&chat_id.0)
    }

    /// Button presses are honored in allow-listed chats and in the audit channel.
    pub fn admits_callback(&self, chat_id: ChatId, username: Option<&str>) -> bool {
        self.is_enabled_chat(chat_id) || self.info_channel.matches(chat_id, username)
    }

    /// Public URL under which the static server exposes a stored file.
    pub fn public_file_url(&self, name: &str) -> String {
        format!("{}/files/{name}", self.domain)
    }
}

fn normalize_domain(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, unquote(v.trim()));
    }
}

fn unquote(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        &val[1..val.len() - 1]
    } else {
        val
    }
}

fn parse_csv_i64(v: Option<String>) -> Vec<i64> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<i64>().ok())
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
