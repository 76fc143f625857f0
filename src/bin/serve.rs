//! Web server for flair prediction

use std::{net::SocketAddr, path::PathBuf};

use anyhow::Result;
use flair_classifier::server::{self, ServerConfig};
use pico_args::Arguments;

const HELP: &str = "\
Usage: serve [OPTIONS]

Options:
  -h, --help                   Print help
  -a, --artifact-dir           Directory with the model artifacts (env: FLAIR_ARTIFACT_DIR)
  -b, --bind                   Address to listen on (env: FLAIR_BIND)
  --timeout-secs               Per-request timeout in seconds (env: FLAIR_TIMEOUT_SECS)
  --resolve-concurrency        URLs resolved at once for uploads (env: FLAIR_RESOLVE_CONCURRENCY)
";

#[derive(Debug)]
struct Args {
    /// Prints the usage menu
    help: bool,

    /// Directory with the model artifacts
    artifact_dir: Option<PathBuf>,

    /// Address to listen on
    bind: Option<SocketAddr>,

    /// Per-request timeout
    timeout_secs: Option<u64>,

    /// URLs resolved at once for uploads
    resolve_concurrency: Option<usize>,
}

fn parse_args() -> Result<Args, pico_args::Error> {
    let mut pargs = Arguments::from_env();

    let args = Args {
        help: pargs.contains(["-h", "--help"]),
        artifact_dir: pargs.opt_value_from_str(["-a", "--artifact-dir"])?,
        bind: pargs.opt_value_from_str(["-b", "--bind"])?,
        timeout_secs: pargs.opt_value_from_str("--timeout-secs")?,
        resolve_concurrency: pargs.opt_value_from_str("--resolve-concurrency")?,
    };

    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = parse_args()?;

    if args.help {
        println!("{}", HELP);
        return Ok(());
    }

    let mut config = ServerConfig::from_env()?;

    if let Some(artifact_dir) = args.artifact_dir {
        config.artifact_dir = artifact_dir;
    }

    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    if let Some(timeout_secs) = args.timeout_secs {
        config.timeout_secs = timeout_secs;
    }

    if let Some(resolve_concurrency) = args.resolve_concurrency {
        config.resolve_concurrency = resolve_concurrency;
    }

    server::serve(config).await
}
