pub mod analysis;
pub mod domain;
pub mod storage;

pub mod config {
    use anyhow::Context;
    use std::str::FromStr;

    use crate::analysis::metrics::{Assumptions, DEFAULT_APPRECIATION_RATE, DEFAULT_VACANCY_RATE};

    pub const DEFAULT_PORT: u16 = 5001;
    pub const DEFAULT_WS_BROADCAST_CAPACITY: usize = 1024;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub port: u16,
        pub sentry_dsn: Option<String>,
        pub static_dir: Option<String>,
        pub vacancy_rate: f64,
        pub appreciation_rate: f64,
        pub ws_broadcast_capacity: usize,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                port: DEFAULT_PORT,
                sentry_dsn: None,
                static_dir: None,
                vacancy_rate: DEFAULT_VACANCY_RATE,
                appreciation_rate: DEFAULT_APPRECIATION_RATE,
                ws_broadcast_capacity: DEFAULT_WS_BROADCAST_CAPACITY,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        /// Builds settings from an arbitrary key lookup; blank values count as unset.
        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
            let defaults = Self::default();

            Ok(Self {
                port: parse_or(get("PORT"), "PORT", defaults.port)?,
                sentry_dsn: get("SENTRY_DSN"),
                static_dir: get("STATIC_DIR"),
                vacancy_rate: parse_or(
                    get("ANALYSIS_VACANCY_RATE"),
                    "ANALYSIS_VACANCY_RATE",
                    defaults.vacancy_rate,
                )?,
                appreciation_rate: parse_or(
                    get("ANALYSIS_APPRECIATION_RATE"),
                    "ANALYSIS_APPRECIATION_RATE",
                    defaults.appreciation_rate,
                )?,
                ws_broadcast_capacity: parse_or(
                    get("WS_BROADCAST_CAPACITY"),
                    "WS_BROADCAST_CAPACITY",
                    defaults.ws_broadcast_capacity,
                )?,
            })
        }

        pub fn assumptions(&self) -> Assumptions {
            Assumptions {
                vacancy_rate: self.vacancy_rate,
                appreciation_rate: self.appreciation_rate,
            }
        }
    }

    fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match raw {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("{key} is not a valid value: {v}")),
            None => Ok(default),
        }
    }

}
