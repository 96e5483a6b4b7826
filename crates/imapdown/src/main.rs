//! `imapdown` - archive IMAP mailboxes into a content-addressed directory.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;

use std::path::Path;

use anyhow::{Context, bail};
use clap::Parser;
use imapdown_core::{ArchiveOptions, Archiver, FsStore, ImapConnection, KEY_LEN, KeyDeriver};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let deriver = match &cli.key_file {
        Some(path) => KeyDeriver::keyed(read_secret(path).await?),
        None => KeyDeriver::new(),
    };
    let store = FsStore::open(&cli.store).await?;

    let (handle, cancel) = imapdown_core::cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted; stopping once the current fetch has drained");
            handle.cancel();
        }
    });

    let mut session = ImapConnection::connect(&cli.connection_config())
        .await?
        .login(&cli.user, &cli.pass)
        .await?;

    let archiver = Archiver::with_options(
        store,
        ArchiveOptions {
            deriver,
            ..ArchiveOptions::default()
        },
    );
    let summary = archiver.run(&mut session, &cancel).await?;
    tracing::debug!(
        mailboxes = summary.mailboxes.len(),
        written = summary.written(),
        store = %cli.store.display(),
        "done"
    );
    Ok(())
}

/// Logs to stderr. `RUST_LOG` wins; otherwise `--verbose` enables debug
/// output for this workspace and the default is warnings only.
fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "warn,imapdown=debug,imapdown_core=debug,imapdown_imap=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn read_secret(path: &Path) -> anyhow::Result<[u8; KEY_LEN]> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("read key file {}", path.display()))?;
    let Ok(secret) = <[u8; KEY_LEN]>::try_from(bytes.as_slice()) else {
        bail!(
            "key file {} holds {} bytes, expected {KEY_LEN}",
            path.display(),
            bytes.len()
        );
    };
    Ok(secret)
}
