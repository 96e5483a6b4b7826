//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use imapdown_imap::{Config, Security};

/// Archive every mailbox of an IMAP account into a directory, one file per
/// distinct Message-ID. Messages already in the directory are not
/// downloaded again.
#[derive(Debug, Parser)]
#[command(name = "imapdown", version)]
pub struct Cli {
    /// Server as host[:port]; the port defaults to 993 (143 with --plaintext).
    #[arg(long, value_name = "HOST[:PORT]", value_parser = parse_host)]
    pub host: HostPort,

    /// User name to log in as.
    #[arg(long, env = "IMAPDOWN_USER")]
    pub user: String,

    /// Password.
    #[arg(long, env = "IMAPDOWN_PASS", hide_env_values = true)]
    pub pass: String,

    /// Directory to store messages in; created if missing.
    #[arg(long, value_name = "DIR")]
    pub store: PathBuf,

    /// Log progress to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// File holding a 32-byte secret for keyed file names.
    #[arg(long, value_name = "PATH")]
    pub key_file: Option<PathBuf>,

    /// Connect without TLS. Only for local test servers.
    #[arg(long)]
    pub plaintext: bool,

    /// Seconds allowed for connecting and the TLS handshake.
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub connect_timeout: u64,
}

impl Cli {
    /// Connection settings for the chosen server.
    #[must_use]
    pub fn connection_config(&self) -> Config {
        let security = if self.plaintext {
            Security::None
        } else {
            Security::Implicit
        };
        let mut builder = Config::builder(&self.host.host)
            .security(security)
            .connect_timeout(Duration::from_secs(self.connect_timeout));
        if let Some(port) = self.host.port {
            builder = builder.port(port);
        }
        builder.build()
    }
}

/// Server host with an optional port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPort {
    /// Host name or IP address, without brackets.
    pub host: String,
    /// Port, when given.
    pub port: Option<u16>,
}

/// Parses `host`, `host:port`, `[v6]` or `[v6]:port`. A bare IPv6 address
/// is taken whole.
pub fn parse_host(s: &str) -> Result<HostPort, String> {
    let (host, port) = if let Some(rest) = s.strip_prefix('[') {
        let (host, after) = rest
            .split_once(']')
            .ok_or_else(|| format!("unclosed '[' in {s:?}"))?;
        match after {
            "" => (host, None),
            _ => {
                let port = after
                    .strip_prefix(':')
                    .ok_or_else(|| format!("unexpected {after:?} after ']'"))?;
                (host, Some(port))
            }
        }
    } else {
        match s.split_once(':') {
            Some((host, port)) if !port.contains(':') => (host, Some(port)),
            _ => (s, None),
        }
    };

    if host.is_empty() {
        return Err("empty host".to_string());
    }
    let port = port
        .map(|p| p.parse::<u16>().map_err(|_| format!("invalid port {p:?}")))
        .transpose()?;
    Ok(HostPort {
        host: host.to_string(),
        port,
    })
}
