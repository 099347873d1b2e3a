use std::env;
use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};
use tracing::warn;

pub const DEFAULT_CLINIC_NAME: &str = "MediQueue Clinic";
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub clinic_name: String,
    pub clinic_utc_offset_minutes: i32,
    pub export_dir: PathBuf,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            clinic_name: DEFAULT_CLINIC_NAME.to_string(),
            clinic_utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            export_dir: PathBuf::from("exports"),
            server_port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            clinic_name: env::var("CLINIC_NAME")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_NAME not set, using default");
                    defaults.clinic_name.clone()
                }),
            clinic_utc_offset_minutes: parse_var("CLINIC_UTC_OFFSET_MINUTES", defaults.clinic_utc_offset_minutes),
            export_dir: env::var("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    warn!("EXPORT_DIR not set, using default");
                    defaults.export_dir.clone()
                }),
            server_port: parse_var("SERVER_PORT", defaults.server_port),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    /// Offset used for every patient-facing date. Out-of-range values fall back to UTC.
    pub fn clinic_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.clinic_utc_offset_minutes * 60).unwrap_or_else(|| {
            warn!(
                "CLINIC_UTC_OFFSET_MINUTES out of range ({}), using UTC",
                self.clinic_utc_offset_minutes
            );
            Utc.fix()
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", name, raw, default);
            default
        }),
        Err(_) => {
            warn!("{} not set, using default", name);
            default
        }
    }
}
