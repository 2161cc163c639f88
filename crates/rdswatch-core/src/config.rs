use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_SUBJECT: &str = "Weekly RDS Maintenance Report";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_IMAP_HOST: &str = "imap.gmail.com";
pub const DEFAULT_IMAP_PORT: u16 = 993;

/// Top-level config (rdswatch.toml + RDSWATCH_* env overrides).
///
/// Loaded once at process start and passed into each component; never
/// mutated afterwards. Credentials live in [`Secrets`], not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RdswatchConfig {
    pub aws: AwsConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(default = "default_region")]
    pub region: String,
    /// Exact RDS instance identifier to describe.
    pub instance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default = "default_imap_host")]
    pub imap_host: String,
    #[serde(default = "default_imap_port")]
    pub imap_port: u16,
    /// Mandatory recipients — always present in the send-envelope even
    /// when a reply carries a different display To/Cc.
    #[serde(default)]
    pub recipients: Vec<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: DEFAULT_SMTP_PORT,
            imap_host: default_imap_host(),
            imap_port: DEFAULT_IMAP_PORT,
            recipients: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Fixed subject line. The mailbox search keys on this string, so
    /// changing it starts a fresh thread.
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            subject: default_subject(),
        }
    }
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}
fn default_subject() -> String {
    DEFAULT_SUBJECT.to_string()
}
fn default_smtp_host() -> String {
    DEFAULT_SMTP_HOST.to_string()
}
fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}
fn default_imap_host() -> String {
    DEFAULT_IMAP_HOST.to_string()
}
fn default_imap_port() -> u16 {
    DEFAULT_IMAP_PORT
}

impl RdswatchConfig {
    /// Load config from a TOML file with RDSWATCH_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.rdswatch/rdswatch.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: RdswatchConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("RDSWATCH_").split("_"))
            .extract()
            .map_err(|e| crate::error::RdswatchError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configs the run cannot meaningfully execute with.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.aws.instance.trim().is_empty() {
            return Err(crate::error::RdswatchError::Config(
                "aws.instance must name an RDS instance identifier".into(),
            ));
        }
        if self.mail.recipients.is_empty() {
            return Err(crate::error::RdswatchError::Config(
                "mail.recipients must list at least one address".into(),
            ));
        }
        if self.report.subject.trim().is_empty() {
            return Err(crate::error::RdswatchError::Config(
                "report.subject must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.rdswatch/rdswatch.toml", home)
}

/// Credentials resolved from process environment variables only.
///
/// The process fails fast (non-zero exit) when any of these is absent —
/// a half-configured run would either fetch nothing or send nothing.
#[derive(Debug, Clone)]
pub struct Secrets {
    /// Mail account address; also the report sender and its own copy
    /// recipient, so the next run can find this message in the inbox.
    pub email_user: String,
    pub email_pass: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
}

impl Secrets {
    pub fn from_env() -> crate::error::Result<Self> {
        Ok(Self {
            email_user: require_env("EMAIL_USER")?,
            email_pass: require_env("EMAIL_PASS")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
        })
    }
}

fn require_env(name: &'static str) -> crate::error::Result<String> {
    std::env::var(name).map_err(|_| crate::error::RdswatchError::MissingSecret(name))
}
