use std::net::SocketAddr;

use llm_common::openai::OpenAiClientConfig;

use crate::error::AppError;

const DEFAULT_ADDR: &str = "127.0.0.1:5001";

/// Service configuration, read once from the environment at startup.
///
/// Optional:
/// - `SEO_SERVICE_ADDR`: listen address (default `127.0.0.1:5001`)
/// - `SEO_SERVICE_CORS`: `false`/`0`/`off` disables the permissive CORS layer
/// - the `LLM_*` / `GEMINI_API_KEY` variables read by [`OpenAiClientConfig::from_env`]
#[derive(Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_enabled: bool,
    pub llm: OpenAiClientConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let listen_addr = parse_listen_addr(std::env::var("SEO_SERVICE_ADDR").ok().as_deref())?;
        let cors_enabled = parse_flag(std::env::var("SEO_SERVICE_CORS").ok().as_deref(), true);

        Ok(Self {
            listen_addr,
            cors_enabled,
            llm: OpenAiClientConfig::from_env(),
        })
    }
}

fn parse_listen_addr(raw: Option<&str>) -> Result<SocketAddr, AppError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_ADDR);
    raw.parse().map_err(|e| {
        AppError::Config(format!(
            "SEO_SERVICE_ADDR {raw:?} is not a socket address: {e}"
        ))
    })
}

fn parse_flag(raw: Option<&str>, default: bool) -> bool {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_addr_defaults_when_unset_or_blank() {
        let expected: SocketAddr = DEFAULT_ADDR.parse().unwrap();
        assert_eq!(parse_listen_addr(None).unwrap(), expected);
        assert_eq!(parse_listen_addr(Some("  ")).unwrap(), expected);
    }

    #[test]
    fn listen_addr_parses_override() {
        let addr = parse_listen_addr(Some("0.0.0.0:8080")).unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn listen_addr_rejects_garbage() {
        let err = parse_listen_addr(Some("localhost")).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("SEO_SERVICE_ADDR")));
    }

    #[test]
    fn flag_parsing() {
        assert!(parse_flag(None, true));
        assert!(!parse_flag(Some("off"), true));
        assert!(parse_flag(Some(" TRUE "), false));
        assert!(parse_flag(Some("maybe"), true));
    }
}
