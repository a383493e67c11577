use clap::{Parser, Subcommand, ValueEnum};
use shortly_registry::{CorruptStatePolicy, DEFAULT_STORAGE_KEY};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const STORE_DIR_ENV: &str = "SHORTLY_STORE_DIR";
pub const STORAGE_KEY_ENV: &str = "SHORTLY_STORAGE_KEY";
pub const BASE_URL_ENV: &str = "SHORTLY_BASE_URL";
pub const ON_CORRUPT_ENV: &str = "SHORTLY_ON_CORRUPT";
pub const LOG_FORMAT_ENV: &str = "SHORTLY_LOG_FORMAT";

pub const DEFAULT_STORE_DIR: &str = ".shortly";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnCorruptArg {
    #[value(name = "fail")]
    Fail,
    #[value(name = "reset")]
    Reset,
}

impl From<OnCorruptArg> for CorruptStatePolicy {
    fn from(value: OnCorruptArg) -> Self {
        match value {
            OnCorruptArg::Fail => CorruptStatePolicy::Fail,
            OnCorruptArg::Reset => CorruptStatePolicy::Reset,
        }
    }
}

impl Display for OnCorruptArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OnCorruptArg::Fail => write!(f, "fail"),
            OnCorruptArg::Reset => write!(f, "reset"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Text => write!(f, "text"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "shortly", about = "Local link shortener")]
pub struct CLI {
    #[arg(long, global = true, env = STORE_DIR_ENV, default_value = DEFAULT_STORE_DIR)]
    pub store_dir: PathBuf,

    #[arg(long, global = true, env = STORAGE_KEY_ENV, default_value = DEFAULT_STORAGE_KEY)]
    pub storage_key: String,

    #[arg(long, global = true, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(
        long,
        global = true,
        env = ON_CORRUPT_ENV,
        value_enum,
        default_value_t = OnCorruptArg::Fail
    )]
    pub on_corrupt: OnCorruptArg,

    #[arg(
        long,
        global = true,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Text
    )]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shorten a URL, optionally under a custom slug.
    Shorten {
        url: String,
        #[arg(long)]
        slug: Option<String>,
    },
    /// Run the safety checklist against a URL without storing it.
    Check { url: String },
    /// List stored links, newest first.
    List,
    /// Resolve a slug or share URL to its original URL.
    Open {
        target: String,
        /// Hand the URL to the system's default handler.
        #[arg(long)]
        launch: bool,
    },
    /// Delete a stored link.
    Delete {
        slug: String,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },
}
