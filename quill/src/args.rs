use std::path::PathBuf;

use clap::Parser;

/// Quill speech-to-text relay
#[derive(Debug, Parser)]
#[command(name = "quill", about = "Relay audio uploads to a hosted speech-to-text API")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "quill.toml", env = "QUILL_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "QUILL_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,

    /// Log filter directive (e.g. "info" or "stt=debug,info")
    #[arg(long, default_value = "info", env = "QUILL_LOG")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["quill"]).unwrap();

        assert_eq!(args.config, PathBuf::from("quill.toml"));
        assert!(args.listen.is_none());
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn overrides() {
        let args = Args::try_parse_from([
            "quill",
            "--config",
            "/etc/quill/quill.toml",
            "--listen",
            "127.0.0.1:9000",
            "--log-level",
            "stt=debug",
        ])
        .unwrap();

        assert_eq!(args.config, PathBuf::from("/etc/quill/quill.toml"));
        assert_eq!(args.listen, Some("127.0.0.1:9000".parse().unwrap()));
        assert_eq!(args.log_level, "stt=debug");
    }
}
