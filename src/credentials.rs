//! Provider credential persistence and the `config` subcommand.
//!
//! Credentials live in one JSON file keyed by provider name. A value is
//! either a bare API key or an id/secret pair, mirroring what each provider
//! expects. The store is loaded once per invocation and only the `config`
//! subcommand mutates it.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{analyzer, cli::ConfigArgs, table};

const MASK_VISIBLE_CHARS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Credential {
    Key(String),
    Pair {
        client_id: String,
        client_secret: String,
    },
}

impl Credential {
    pub fn is_blank(&self) -> bool {
        match self {
            Credential::Key(key) => key.trim().is_empty(),
            Credential::Pair {
                client_id,
                client_secret,
            } => client_id.trim().is_empty() || client_secret.trim().is_empty(),
        }
    }

    fn masked(&self) -> String {
        match self {
            Credential::Key(key) => mask(key),
            Credential::Pair {
                client_id,
                client_secret,
            } => format!("{} / {}", client_id, mask(client_secret)),
        }
    }
}

fn mask(secret: &str) -> String {
    let trimmed = secret.trim();
    let visible: String = trimmed.chars().take(MASK_VISIBLE_CHARS).collect();
    if trimmed.chars().count() > MASK_VISIBLE_CHARS {
        format!("{visible}...")
    } else {
        visible
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialStore {
    entries: BTreeMap<String, Credential>,
}

impl CredentialStore {
    /// Reads the store from disk; a missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Reading credential file {path:?}"))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Parsing credential file {path:?}"))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating credential directory {parent:?}"))?;
        }
        let contents = serde_json::to_string_pretty(&self.entries)
            .context("Serializing credential store")?;
        fs::write(path, contents).with_context(|| format!("Writing credential file {path:?}"))
    }

    pub fn get(&self, provider: &str) -> Option<&Credential> {
        self.entries.get(provider)
    }

    pub fn set(&mut self, provider: &str, credential: Credential) {
        self.entries.insert(provider.to_string(), credential);
    }

    pub fn remove(&mut self, provider: &str) -> bool {
        self.entries.remove(provider).is_some()
    }

    pub fn is_configured(&self, provider: &str) -> bool {
        self.entries
            .get(provider)
            .is_some_and(|credential| !credential.is_blank())
    }

    pub fn providers(&self) -> impl Iterator<Item = (&str, &Credential)> {
        self.entries
            .iter()
            .map(|(provider, credential)| (provider.as_str(), credential))
    }
}

pub fn default_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("csv-insight").join("credentials.json"))
        .ok_or_else(|| anyhow!("Could not determine the user configuration directory"))
}

pub fn resolve_path(flag: Option<&Path>) -> Result<PathBuf> {
    match flag {
        Some(path) => Ok(path.to_path_buf()),
        None => default_path(),
    }
}

pub fn execute(args: &ConfigArgs) -> Result<()> {
    let path = resolve_path(args.credentials.as_deref())?;
    let mut store = CredentialStore::load(&path)?;

    if args.list {
        let headers = ["provider", "configured", "credential"]
            .map(String::from)
            .to_vec();
        let rows = analyzer::PROVIDERS
            .iter()
            .map(|provider| {
                let credential = store
                    .get(provider)
                    .map(Credential::masked)
                    .unwrap_or_default();
                vec![
                    provider.to_string(),
                    store.is_configured(provider).to_string(),
                    credential,
                ]
            })
            .collect::<Vec<_>>();
        table::print_table(&headers, &rows);
        return Ok(());
    }

    let provider = args
        .provider
        .as_deref()
        .ok_or_else(|| anyhow!("--provider is required unless --list is given"))?;
    if !analyzer::PROVIDERS.contains(&provider) {
        return Err(anyhow!(
            "Unknown provider '{provider}' (expected one of: {})",
            analyzer::PROVIDERS.join(", ")
        ));
    }

    if args.clear {
        if store.remove(provider) {
            store.save(&path)?;
            info!("Removed credential for '{provider}' from {path:?}");
        } else {
            info!("No credential stored for '{provider}'");
        }
        return Ok(());
    }

    let credential = build_credential(args)?;
    store.set(provider, credential);
    store.save(&path)?;
    info!("Stored credential for '{provider}' in {path:?}");
    Ok(())
}

fn build_credential(args: &ConfigArgs) -> Result<Credential> {
    match (&args.api_key, &args.client_id, &args.client_secret) {
        (Some(key), None, None) => Ok(Credential::Key(key.trim().to_string())),
        (None, Some(id), Some(secret)) => Ok(Credential::Pair {
            client_id: id.trim().to_string(),
            client_secret: secret.trim().to_string(),
        }),
        _ => Err(anyhow!(
            "Supply --api-key, or both --client-id and --client-secret"
        )),
    }
}
