use crate::cli::Cli;
use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::path::Path;
use tracing::Level;

const TRACE_LEVELS: [&'static str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

pub static SETTINGS: Lazy<Settings> = Lazy::new(|| Settings::new());

// Settings are a singleton generated at runtime. All settings may be
// configured via environment variables. Example:
// STORE_API_TOKEN="xxx" would set store_api_token to the xxx value.
#[derive(Deserialize, Debug)]
pub struct Settings {
    #[serde(default = "default_trace_level")]
    trace_level: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_store_base_url")]
    pub store_base_url: String,
    pub store_api_token: String,
    #[serde(default = "default_store_api_timeout_sec")]
    pub store_api_timeout_sec: u64,
    // Hours added to UTC before rendering the snapshot timestamp
    #[serde(default = "default_timezone_hours_offset")]
    pub timezone_hours_offset: i64,
    #[serde(default = "default_snapshot_ttl_sec")]
    pub snapshot_ttl_sec: u64,
}

impl Settings {
    pub fn new() -> Self {
        let local_settings_yaml_file = ".env.local.yaml";
        let settings: Settings = match Path::new(local_settings_yaml_file).exists() {
            true => {
                println!(
                    "\n######################################\n\
                       ##   Found '.env.local.yaml' file,  ##\n\
                       ##   loading local configuration.   ##\n\
                       ######################################\n\
                    "
                );
                Figment::new()
                    .merge(Yaml::file(local_settings_yaml_file))
                    .merge(Env::raw())
                    .merge(Serialized::defaults(Cli::parse()))
                    .extract()
                    .unwrap()
            }
            false => Figment::new()
                .merge(Env::raw())
                .merge(Serialized::defaults(Cli::parse()))
                .extract()
                .unwrap(),
        };

        settings
    }

    pub fn get_trace_level(&self) -> Level {
        get_trace_level(&self.trace_level)
    }
}

fn get_trace_level(level_str: &str) -> Level {
    match level_str {
        level if level == TRACE_LEVELS[0] => Level::TRACE,
        level if level == TRACE_LEVELS[1] => Level::DEBUG,
        level if level == TRACE_LEVELS[2] => Level::INFO,
        level if level == TRACE_LEVELS[3] => Level::WARN,
        level if level == TRACE_LEVELS[4] => Level::ERROR,
        // Default trace level
        _ => Level::INFO,
    }
}

fn default_trace_level() -> String {
    "INFO".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_store_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_store_api_timeout_sec() -> u64 {
    5
}

fn default_timezone_hours_offset() -> i64 {
    0
}

fn default_snapshot_ttl_sec() -> u64 {
    60
}
