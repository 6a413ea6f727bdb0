//! Storage connection string handling
//!
//! Turns an Azure Storage connection string into the account name, the
//! credentials and the blob endpoint the SDK client builder needs.

use azure_storage::{CloudLocation, StorageCredentials};
use azure_storage_blobs::prelude::ClientBuilder;
use base64::Engine;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;
use url::Url;

use crate::error::{QuickblobError, Result};

const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";
const EMULATOR_ACCOUNT: &str = "devstoreaccount1";
const EMULATOR_ADDRESS: &str = "127.0.0.1";
const EMULATOR_BLOB_PORT: u16 = 10000;

/// Well-known setting names, lowercased for case-insensitive lookup
mod keys {
    pub const PROTOCOL: &str = "defaultendpointsprotocol";
    pub const ACCOUNT_NAME: &str = "accountname";
    pub const ACCOUNT_KEY: &str = "accountkey";
    pub const SAS: &str = "sharedaccesssignature";
    pub const ENDPOINT_SUFFIX: &str = "endpointsuffix";
    pub const BLOB_ENDPOINT: &str = "blobendpoint";
    pub const USE_DEV_STORAGE: &str = "usedevelopmentstorage";
}

/// Split a connection string into its settings.
///
/// Keys are lowercased. Values are split at the first `=` only, so SAS
/// tokens keep their own `=` characters.
pub fn parse_connection_string(connection_string: &str) -> Result<HashMap<String, String>> {
    let mut params = HashMap::new();

    for segment in connection_string.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let (key, value) = segment.split_once('=').ok_or_else(|| {
            QuickblobError::invalid_connection_string(format!(
                "setting '{segment}' is not of the form Key=Value"
            ))
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(QuickblobError::invalid_connection_string(
                "setting with an empty key",
            ));
        }

        let normalized = key.to_lowercase();
        if params.contains_key(&normalized) {
            return Err(QuickblobError::invalid_connection_string(format!(
                "setting '{key}' appears more than once"
            )));
        }
        params.insert(normalized, value.trim().to_string());
    }

    if params.is_empty() {
        return Err(QuickblobError::MissingConnectionString);
    }

    Ok(params)
}

/// How the account is authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    SharedKey,
    SharedAccessSignature,
    Emulator,
}

/// Where the blob service lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobLocation {
    /// `https://{account}.blob.core.windows.net`
    Public,
    /// Local storage emulator
    Emulator { address: String, port: u16 },
    /// Any other endpoint, given as a base URI without trailing slash
    Custom { uri: String },
}

/// A parsed, ready-to-use storage connection
#[derive(Clone)]
pub struct StorageConnection {
    account: String,
    credentials: StorageCredentials,
    credential_kind: CredentialKind,
    location: BlobLocation,
}

impl fmt::Debug for StorageConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConnection")
            .field("account", &self.account)
            .field("credential_kind", &self.credential_kind)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl StorageConnection {
    /// Parse a connection string.
    ///
    /// Fails with `MissingConnectionString` for blank input and with
    /// `InvalidConnectionString` for anything that cannot be used to reach
    /// the blob service with write access.
    pub fn parse(connection_string: &str) -> Result<Self> {
        if connection_string.trim().is_empty() {
            return Err(QuickblobError::MissingConnectionString);
        }

        let params = parse_connection_string(connection_string)?;

        if let Some(value) = setting(&params, keys::USE_DEV_STORAGE) {
            if parse_bool(value)? {
                debug!("Connection string targets the local storage emulator");
                return Ok(Self::emulator());
            }
        }

        let protocol = match setting(&params, keys::PROTOCOL) {
            None => "https".to_string(),
            Some(p) => {
                let p = p.to_lowercase();
                if p != "http" && p != "https" {
                    return Err(QuickblobError::invalid_connection_string(format!(
                        "DefaultEndpointsProtocol must be http or https, got '{p}'"
                    )));
                }
                p
            }
        };

        let (account, location) = match setting(&params, keys::BLOB_ENDPOINT) {
            Some(endpoint) => {
                let (derived, uri) = parse_blob_endpoint(endpoint)?;
                let account = match setting(&params, keys::ACCOUNT_NAME) {
                    Some(name) => name.to_string(),
                    None => derived.ok_or_else(|| {
                        QuickblobError::invalid_connection_string(
                            "AccountName is required when it cannot be derived from BlobEndpoint",
                        )
                    })?,
                };
                (account, BlobLocation::Custom { uri })
            }
            None => {
                let account = setting(&params, keys::ACCOUNT_NAME).ok_or_else(|| {
                    QuickblobError::invalid_connection_string(
                        "AccountName or BlobEndpoint is required",
                    )
                })?;
                let suffix = setting(&params, keys::ENDPOINT_SUFFIX).unwrap_or(DEFAULT_ENDPOINT_SUFFIX);
                let location = if suffix.eq_ignore_ascii_case(DEFAULT_ENDPOINT_SUFFIX)
                    && protocol == "https"
                {
                    BlobLocation::Public
                } else {
                    BlobLocation::Custom {
                        uri: format!("{protocol}://{account}.blob.{suffix}"),
                    }
                };
                (account.to_string(), location)
            }
        };

        let (credentials, credential_kind) = if let Some(key) = setting(&params, keys::ACCOUNT_KEY) {
            if setting(&params, keys::ACCOUNT_NAME).is_none() {
                return Err(QuickblobError::invalid_connection_string(
                    "AccountKey requires AccountName",
                ));
            }
            base64::engine::general_purpose::STANDARD
                .decode(key)
                .map_err(|e| {
                    QuickblobError::invalid_connection_string(format!(
                        "AccountKey is not valid base64: {e}"
                    ))
                })?;
            (
                StorageCredentials::access_key(account.clone(), key.to_string()),
                CredentialKind::SharedKey,
            )
        } else if let Some(sas) = setting(&params, keys::SAS) {
            let credentials = StorageCredentials::sas_token(sas.trim_start_matches('?')).map_err(|e| {
                QuickblobError::invalid_connection_string(format!(
                    "SharedAccessSignature could not be parsed: {e}"
                ))
            })?;
            (credentials, CredentialKind::SharedAccessSignature)
        } else {
            return Err(QuickblobError::invalid_connection_string(
                "either AccountKey or SharedAccessSignature is required",
            ));
        };

        for key in params.keys() {
            if !is_known_key(key) {
                debug!("Ignoring connection string setting '{}'", key);
            }
        }

        Ok(Self {
            account,
            credentials,
            credential_kind,
            location,
        })
    }

    /// Connection to the local storage emulator with its well-known account
    pub fn emulator() -> Self {
        Self {
            account: EMULATOR_ACCOUNT.to_string(),
            credentials: StorageCredentials::emulator(),
            credential_kind: CredentialKind::Emulator,
            location: BlobLocation::Emulator {
                address: EMULATOR_ADDRESS.to_string(),
                port: EMULATOR_BLOB_PORT,
            },
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn credential_kind(&self) -> CredentialKind {
        self.credential_kind
    }

    pub fn location(&self) -> &BlobLocation {
        &self.location
    }

    /// Base URL of the blob service for this connection
    pub fn blob_endpoint(&self) -> String {
        match &self.location {
            BlobLocation::Public => {
                format!("https://{}.blob.{}", self.account, DEFAULT_ENDPOINT_SUFFIX)
            }
            BlobLocation::Emulator { address, port } => {
                format!("http://{}:{}/{}", address, port, self.account)
            }
            BlobLocation::Custom { uri } => uri.clone(),
        }
    }

    /// SDK client builder for this connection
    pub fn client_builder(&self) -> ClientBuilder {
        let cloud_location = match &self.location {
            BlobLocation::Public => CloudLocation::Public {
                account: self.account.clone(),
            },
            BlobLocation::Emulator { address, port } => CloudLocation::Emulator {
                address: address.clone(),
                port: *port,
            },
            BlobLocation::Custom { uri } => CloudLocation::Custom {
                account: self.account.clone(),
                uri: uri.clone(),
            },
        };
        ClientBuilder::with_location(cloud_location, self.credentials.clone())
    }
}

/// Non-empty value of a setting
fn setting<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(QuickblobError::invalid_connection_string(format!(
            "UseDevelopmentStorage must be true or false, got '{other}'"
        ))),
    }
}

/// Validate a BlobEndpoint URL and derive the account name from it when
/// possible (first host label, or first path segment for IP hosts as used
/// by the emulator).
fn parse_blob_endpoint(endpoint: &str) -> Result<(Option<String>, String)> {
    let url = Url::parse(endpoint).map_err(|e| {
        QuickblobError::invalid_connection_string(format!("BlobEndpoint '{endpoint}' is not a URL: {e}"))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(QuickblobError::invalid_connection_string(format!(
            "BlobEndpoint must use http or https, got '{}'",
            url.scheme()
        )));
    }

    let account = match url.host() {
        Some(url::Host::Domain(domain)) if domain.contains('.') => {
            domain.split('.').next().map(str::to_string)
        }
        Some(_) => url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        None => {
            return Err(QuickblobError::invalid_connection_string(format!(
                "BlobEndpoint '{endpoint}' has no host"
            )))
        }
    };

    Ok((account, endpoint.trim_end_matches('/').to_string()))
}

fn is_known_key(key: &str) -> bool {
    [
        keys::PROTOCOL,
        keys::ACCOUNT_NAME,
        keys::ACCOUNT_KEY,
        keys::SAS,
        keys::ENDPOINT_SUFFIX,
        keys::BLOB_ENDPOINT,
        keys::USE_DEV_STORAGE,
    ]
    .contains(&key)
}
