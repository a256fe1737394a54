//! recli demo - edits a reverse proxy configuration stored as TOML.
//!
//! The document is read from `$RECLI_CONFIG`, or from `recli/proxy.toml` in
//! the XDG config directory. Every field of it is reachable as a command,
//! e.g. `recli backends add --hostname b2.com` or `recli auth set ldap`.
//! The file is written back only when a command changed the document.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    env,
    error::Error,
    fmt, fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    process,
    rc::Rc,
    str::FromStr,
};

use recli::{CliService, Config, Constructor, RecliError, cli::formatting::format_error, defaults, tracing_config};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// How clients authenticate against the proxy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum AuthMode {
    #[default]
    Static,
    Ldap,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuthMode::Static => "static",
            AuthMode::Ldap => "ldap",
        })
    }
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(AuthMode::Static),
            "ldap" => Ok(AuthMode::Ldap),
            other => Err(format!("unknown auth mode '{other}', expected static or ldap")),
        }
    }
}

recli::text_scalar!(AuthMode);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct Backend {
    hostname: String,
    port: u16,
    weight: u32,
    tags: Vec<String>,
}

recli::record!(Backend {
    hostname [recli = "id", usage = "Backend host name"],
    port [default = "2019", usage = "Backend port"],
    weight [default = "1", usage = "Relative share of traffic"],
    tags [usage = "Free-form labels"],
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct Tls {
    enabled: bool,
    certificate: String,
    min_version: String,
}

recli::record!(Tls {
    enabled [usage = "Terminate TLS on the listener"],
    certificate [usage = "Path to the PEM certificate chain"],
    min_version [default = "1.2", usage = "Lowest accepted protocol version"],
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct ProxyConfig {
    version: u32,
    address: String,
    auth: AuthMode,
    timeout_secs: f64,
    max_body_mb: u32,
    tls: Tls,
    headers: BTreeMap<String, String>,
    backends: Vec<Backend>,
}

recli::record!(ProxyConfig {
    version [recli = "readonly", default = "1", usage = "Document format version"],
    address [default = "0.0.0.0:8080", usage = "Listen address"],
    auth [default = "static", usage = "Client authentication mode"],
    timeout_secs [default = "30", usage = "Upstream timeout in seconds"],
    max_body_mb [default = "10", usage = "Largest accepted request body"],
    tls [usage = "Listener TLS settings"],
    headers [usage = "Headers added to every upstream request"],
    backends [usage = "Upstream servers"],
});

fn main() {
    if let Err(e) = tracing_config::init() {
        eprintln!("{}", format_error(&format!("Failed to initialize logging: {e}")));
    }

    if let Err(e) = run() {
        eprintln!("{}", format_error(&e.to_string()));
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let path = config_path()?;
    let original = load(&path)?;
    let proxy = Rc::new(RefCell::new(original.clone()));

    let tree = Constructor::new(Config::standard()).construct(&proxy)?;
    match CliService::new("recli", tree).execute(env::args_os()) {
        Ok(()) => {}
        Err(RecliError::Usage(e)) => e.exit(),
        Err(e) => return Err(e.into()),
    }

    let updated = proxy.borrow();
    if *updated != original {
        save(&path, &updated)?;
    }

    Ok(())
}

/// Location of the proxy document.
///
/// # Errors
/// Returns an error if none of `RECLI_CONFIG`, `XDG_CONFIG_HOME` and `HOME` is set
fn config_path() -> Result<PathBuf, io::Error> {
    if let Ok(path) = env::var("RECLI_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let config_home = env::var("XDG_CONFIG_HOME")
        .or_else(|_| env::var("HOME").map(|home| format!("{home}/.config")))
        .map_err(|_| {
            io::Error::new(
                ErrorKind::NotFound,
                "Neither RECLI_CONFIG, XDG_CONFIG_HOME nor HOME environment variable found",
            )
        })?;

    Ok(PathBuf::from(config_home).join("recli").join("proxy.toml"))
}

#[instrument]
fn load(path: &Path) -> Result<ProxyConfig, Box<dyn Error>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(toml::from_str(&text)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No config at {}, starting from defaults", path.display());
            let mut config = ProxyConfig::default();
            defaults::apply(&mut config, Config::standard().default_tag_name)?;
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}

fn save(path: &Path, config: &ProxyConfig) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }

    fs::write(path, toml::to_string_pretty(config)?)?;
    debug!(path = %path.display(), "Saved config");

    Ok(())
}
