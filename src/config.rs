use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ETC_CONFIG: &str = "/etc/repreport.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scan: ScanConfig,

    #[serde(default)]
    pub alerts: AlertThresholds,

    /// Only required when the report is mailed; validated via `require_email`.
    pub email: Option<EmailConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Name shown in the report banner and email subject.
    pub instance_name: String,
    /// Root of the customer/host tree.
    pub basepath: PathBuf,
    /// Regex a customer or host directory name must match in full.
    pub dirmatch: String,
    /// Customer names to drop from the report.
    #[serde(default)]
    pub ignore_customers: Vec<String>,
    /// Marker whose mtime records the last replication start.
    pub bwtest_file: String,
    /// Run log whose mtime records the last completion and whose content
    /// carries the rate line.
    pub lastlog_file: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// Alert when free space is at or below this percent of allocation.
    pub free_percent: u8,
    /// Alert when free space is at or below this many GB.
    pub free_gb: u64,
    /// Alert when the last completion is at least this old, in seconds.
    pub stale_secs: i64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        // Daily replication with a few hours of slack.
        Self { free_percent: 10, free_gb: 5, stale_secs: 90_000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub from: String,
    pub to: Vec<String>,
}

impl EmailConfig {
    /// Recipients, allowing comma-separated lists inside single entries.
    pub fn recipients(&self) -> Vec<&str> {
        self.to
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .collect()
    }
}

impl Config {
    /// Load from an explicit `--config` path, the user config dir, or
    /// `/etc/repreport.toml`, in that order. Any failure here is a
    /// configuration error and aborts before scanning.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("cannot read configuration file {}", path.display()))?;
        let cfg: Config = toml::from_str(&text)
            .with_context(|| format!("bad configuration in {}", path.display()))?;
        Ok(cfg)
    }

    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("repreport").join("repreport.toml"))
    }

    fn default_path() -> Result<PathBuf> {
        if let Some(user) = Self::user_config_path() {
            if user.is_file() {
                return Ok(user);
            }
        }
        let etc = PathBuf::from(ETC_CONFIG);
        if etc.is_file() {
            return Ok(etc);
        }
        bail!(
            "no configuration file found (searched {} and {})",
            Self::user_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<no user config dir>".into()),
            ETC_CONFIG
        );
    }

    /// Compile `dirmatch` anchored to the whole directory name.
    pub fn compiled_dirmatch(&self) -> Result<Regex> {
        Regex::new(&format!("^(?:{})$", self.scan.dirmatch))
            .with_context(|| format!("invalid dirmatch pattern '{}'", self.scan.dirmatch))
    }

    /// Validate the SMTP settings, reporting every missing item at once.
    pub fn require_email(&self) -> Result<&EmailConfig> {
        let Some(email) = &self.email else {
            bail!("email reporting needs an [email] section with smtp_server, from and to");
        };
        let mut missing = Vec::new();
        if email.smtp_server.trim().is_empty() {
            missing.push("smtp_server");
        }
        if email.from.trim().is_empty() {
            missing.push("from");
        }
        if email.recipients().is_empty() {
            missing.push("to");
        }
        if !missing.is_empty() {
            bail!("email reporting needs [email] settings: {}", missing.join(", "));
        }
        Ok(email)
    }

    /// "instance (hostname)" banner for the report and email subject.
    pub fn instance_banner(&self) -> String {
        let host = nix::unistd::gethostname()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string());
        format!("{} ({})", self.scan.instance_name, host)
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    const MINIMAL: &str = r#"
        [scan]
        instance_name = "backups"
        basepath = "/srv/replication"
        dirmatch = "[A-Za-z0-9_-]+"
        bwtest_file = "bwtest.log"
        lastlog_file = "last.log"
    "#;

    #[test]
    fn minimal_config_parses_with_default_thresholds() {
        let cfg: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(cfg.scan.instance_name, "backups");
        assert!(cfg.scan.ignore_customers.is_empty());
        assert_eq!(cfg.alerts.free_percent, 10);
        assert_eq!(cfg.alerts.free_gb, 5);
        assert_eq!(cfg.alerts.stale_secs, 90_000);
        assert!(cfg.email.is_none());
    }

    #[test]
    fn missing_required_scan_key_is_a_parse_error() {
        let broken = r#"
            [scan]
            instance_name = "backups"
            basepath = "/srv/replication"
        "#;
        assert!(toml::from_str::<Config>(broken).is_err());
    }

    #[test]
    fn thresholds_and_ignores_override_defaults() {
        let text = format!(
            "{MINIMAL}\n[alerts]\nfree_percent = 20\nfree_gb = 50\nstale_secs = 7200\n"
        );
        let text = text.replace(
            "lastlog_file = \"last.log\"",
            "lastlog_file = \"last.log\"\nignore_customers = [\"_staging\"]",
        );
        let cfg: Config = toml::from_str(&text).unwrap();
        assert_eq!(cfg.alerts.free_percent, 20);
        assert_eq!(cfg.alerts.free_gb, 50);
        assert_eq!(cfg.alerts.stale_secs, 7200);
        assert_eq!(cfg.scan.ignore_customers, vec!["_staging"]);
    }

    #[test]
    fn require_email_lists_every_missing_setting() {
        let mut cfg: Config = toml::from_str(MINIMAL).unwrap();
        assert!(cfg.require_email().is_err());

        let with_email = format!(
            "{MINIMAL}\n[email]\nsmtp_server = \"\"\nfrom = \"\"\nto = []\n"
        );
        cfg = toml::from_str(&with_email).unwrap();
        let err = cfg.require_email().unwrap_err().to_string();
        assert!(err.contains("smtp_server"));
        assert!(err.contains("from"));
        assert!(err.contains("to"));
    }

    #[test]
    fn recipients_split_comma_packed_entries() {
        let text = format!(
            "{MINIMAL}\n[email]\nsmtp_server = \"relay\"\nfrom = \"r@x\"\nto = [\"a@x, b@x\", \"c@x\"]\n"
        );
        let cfg: Config = toml::from_str(&text).unwrap();
        let email = cfg.require_email().unwrap();
        assert_eq!(email.recipients(), vec!["a@x", "b@x", "c@x"]);
    }

    #[test]
    fn dirmatch_is_anchored_when_compiled() {
        let cfg: Config = toml::from_str(MINIMAL).unwrap();
        let re = cfg.compiled_dirmatch().unwrap();
        assert!(re.is_match("acme-01"));
        assert!(!re.is_match("acme 01"));

        let bad = MINIMAL.replace("[A-Za-z0-9_-]+", "([unclosed");
        let cfg: Config = toml::from_str(&bad).unwrap();
        assert!(cfg.compiled_dirmatch().is_err());
    }
}
