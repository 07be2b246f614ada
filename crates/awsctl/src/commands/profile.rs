//! Profile management command implementations

use awsctl_core::Profile;
use awsctl_core::config::CredentialStore;
use colored::Colorize;
use serde_json::{Value, json};
use tracing::{debug, info, trace};

use crate::cli::{OutputFormat as CliOutputFormat, ProfileCommands};
use crate::connection::ConnectionManager;
use crate::error::{AwsCtlError, Result as CliResult};
use crate::output::{self, OutputFormat};

/// Handle profile management commands
pub fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &ConnectionManager,
    output_format: CliOutputFormat,
) -> CliResult<()> {
    match profile_cmd {
        ProfileCommands::List => handle_list(conn_mgr, output_format),
        ProfileCommands::Path => handle_path(conn_mgr, output_format),
        ProfileCommands::Show { name } => handle_show(conn_mgr, name, output_format),
        ProfileCommands::Set {
            name,
            region,
            endpoint_url,
            access_key_id,
            secret_access_key,
            session_token,
            timeout_secs,
            default,
            #[cfg(feature = "secure-storage")]
            use_keyring,
        } => {
            let update = ProfileUpdate {
                region: region.clone(),
                endpoint_url: endpoint_url.clone(),
                access_key_id: access_key_id.clone(),
                secret_access_key: secret_access_key.clone(),
                session_token: session_token.clone(),
                timeout_secs: *timeout_secs,
            };
            #[cfg(feature = "secure-storage")]
            let use_keyring = *use_keyring;
            #[cfg(not(feature = "secure-storage"))]
            let use_keyring = false;
            handle_set(conn_mgr, name, update, *default, use_keyring)
        }
        ProfileCommands::Remove { name } => handle_remove(conn_mgr, name),
        ProfileCommands::Default { name } => handle_default(conn_mgr, name),
    }
}

/// Settings given to `profile set`; `None` keeps the stored value
#[derive(Debug, Default)]
struct ProfileUpdate {
    region: Option<String>,
    endpoint_url: Option<String>,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    session_token: Option<String>,
    timeout_secs: Option<u64>,
}

impl ProfileUpdate {
    fn apply(self, mut profile: Profile) -> Profile {
        if self.region.is_some() {
            profile.region = self.region;
        }
        if self.endpoint_url.is_some() {
            profile.endpoint_url = self.endpoint_url;
        }
        if self.access_key_id.is_some() {
            profile.access_key_id = self.access_key_id;
        }
        if self.secret_access_key.is_some() {
            profile.secret_access_key = self.secret_access_key;
        }
        if self.session_token.is_some() {
            profile.session_token = self.session_token;
        }
        if self.timeout_secs.is_some() {
            profile.timeout_secs = self.timeout_secs;
        }
        profile
    }
}

fn credential_storage(profile: &Profile) -> &'static str {
    match profile.secret_access_key.as_deref() {
        Some(secret) if CredentialStore::is_keyring_reference(secret) => "keyring",
        Some(_) => "plaintext",
        None => "none",
    }
}

/// Hide all but the last four characters; keyring references are not secret
fn mask_secret(value: &str) -> String {
    if CredentialStore::is_keyring_reference(value) {
        return value.to_string();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

fn profile_summary(conn_mgr: &ConnectionManager, name: &str, profile: &Profile) -> Value {
    json!({
        "name": name,
        "default": conn_mgr.config.default_profile.as_deref() == Some(name),
        "region": profile.region,
        "endpoint_url": profile.endpoint_url,
        "credentials": credential_storage(profile),
    })
}

fn handle_list(conn_mgr: &ConnectionManager, output_format: CliOutputFormat) -> CliResult<()> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();
    trace!("Found {} profiles", profiles.len());

    let format = OutputFormat::resolve(output_format, OutputFormat::Table);
    if profiles.is_empty() && format == OutputFormat::Table {
        println!("No profiles configured.");
        println!(
            "Create one with: {}",
            "awsctl profile set <name> --region <region>".cyan()
        );
        return Ok(());
    }

    let rows: Vec<Value> = profiles
        .iter()
        .map(|(name, profile)| profile_summary(conn_mgr, name, profile))
        .collect();
    output::print_output(rows, format, None)?;
    Ok(())
}

fn handle_path(conn_mgr: &ConnectionManager, output_format: CliOutputFormat) -> CliResult<()> {
    let path = conn_mgr.active_config_path()?;
    match output_format {
        CliOutputFormat::Json | CliOutputFormat::Yaml => {
            let format = OutputFormat::resolve(output_format, OutputFormat::Json);
            output::print_output(json!({ "path": path.display().to_string() }), format, None)?;
        }
        _ => println!("{}", path.display()),
    }
    Ok(())
}

fn handle_show(
    conn_mgr: &ConnectionManager,
    name: &str,
    output_format: CliOutputFormat,
) -> CliResult<()> {
    debug!("Showing profile {}", name);
    let profile = conn_mgr.config.profile(name)?;

    let mut details = profile_summary(conn_mgr, name, profile);
    details["access_key_id"] = json!(profile.access_key_id);
    details["secret_access_key"] = json!(profile.secret_access_key.as_deref().map(mask_secret));
    details["session_token"] = json!(profile.session_token.as_deref().map(mask_secret));
    details["timeout_secs"] = json!(profile.timeout_secs);

    let format = OutputFormat::resolve(output_format, OutputFormat::Table);
    output::print_output(details, format, None)?;
    Ok(())
}

fn handle_set(
    conn_mgr: &ConnectionManager,
    name: &str,
    mut update: ProfileUpdate,
    make_default: bool,
    use_keyring: bool,
) -> CliResult<()> {
    debug!("Setting profile {} [credentials redacted]", name);

    if use_keyring {
        let store = CredentialStore::new();
        info!("Storing secrets with the {} backend", store.storage_backend());
        if let Some(secret) = update.secret_access_key.take() {
            update.secret_access_key =
                Some(store.store_credential(&format!("{}-secret-access-key", name), &secret)?);
        }
        if let Some(token) = update.session_token.take() {
            update.session_token =
                Some(store.store_credential(&format!("{}-session-token", name), &token)?);
        }
    }

    let mut updated = conn_mgr.clone();
    let existing = updated.config.profiles.get(name).cloned();
    let is_new = existing.is_none();
    let profile = update.apply(existing.unwrap_or_default());
    updated.config.set_profile(name.to_string(), profile);
    if make_default || updated.config.default_profile.is_none() {
        updated.config.default_profile = Some(name.to_string());
    }
    updated.save_config()?;

    if is_new {
        println!("Profile '{}' created", name);
    } else {
        println!("Profile '{}' updated", name);
    }
    if updated.config.default_profile.as_deref() == Some(name) {
        println!("Default profile: {}", name);
    }
    Ok(())
}

fn handle_remove(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    let mut updated = conn_mgr.clone();
    let removed = updated
        .config
        .remove_profile(name)
        .ok_or_else(|| AwsCtlError::ProfileNotFound {
            name: name.to_string(),
        })?;
    updated.save_config()?;

    let keyring_keys: Vec<&str> = [&removed.secret_access_key, &removed.session_token]
        .into_iter()
        .flatten()
        .filter_map(|value| value.strip_prefix("keyring:"))
        .collect();
    if !keyring_keys.is_empty() {
        let store = CredentialStore::new();
        for key in keyring_keys {
            if let Err(e) = store.delete_credential(key) {
                debug!("Could not delete keyring entry {}: {}", key, e);
            }
        }
    }

    println!("Profile '{}' removed", name);
    Ok(())
}

fn handle_default(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    let mut updated = conn_mgr.clone();
    updated.config.profile(name)?;
    updated.config.default_profile = Some(name.to_string());
    updated.save_config()?;
    println!("Default profile: {}", name);
    Ok(())
}
