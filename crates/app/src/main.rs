// CLI modules
mod cli;
mod error;
mod logging;
mod state;
mod version;

use std::path::Path;
use std::process::ExitCode;

use common::resolver::{ResolutionRequest, Resolver};
use common::transport::LocalTransport;

use cli::args::{Args, Parser};
use cli::op::{IoOptions, Op, OpContext};
use cli::Operation;
use error::{ExitStatus, RnidError, ToExitStatus};
use state::AppState;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version come through here too
            let status = if e.use_stderr() {
                ExitStatus::Usage
            } else {
                ExitStatus::Success
            };
            let _ = e.print();
            return status.into();
        }
    };

    let level = logging::log_level(args.verbose, args.quiet, args.stdout);
    let _guard = logging::init_logging(level);
    version::report_build_info();

    match run(args).await {
        Ok(()) => ExitStatus::Success.into(),
        Err(e) => {
            tracing::error!("{}", e);
            e.exit_status().into()
        }
    }
}

async fn run(args: Args) -> Result<(), RnidError> {
    // Fail on conflicting flags before touching the network or any file
    let operation = Operation::from_args(&args)?;

    let state = AppState::load(args.config.clone())?;
    tracing::debug!(
        "using rnid directory {} (config {})",
        state.rnid_dir.display(),
        state.config_path.display()
    );
    let known = state.known_identities()?;
    let timeout = match args.timeout {
        Some(timeout) => timeout,
        None => state.config.request_timeout()?,
    };

    // Only an address lookup with -R ever needs the shared instance
    let transport = if args.request && !Path::new(&args.identity).is_file() {
        let addr = state.config.shared_instance_addr();
        match LocalTransport::connect(addr, known.clone()).await {
            Ok(transport) => transport,
            Err(e) => {
                tracing::warn!("could not connect to shared instance at {}: {}", addr, e);
                LocalTransport::offline(known)
            }
        }
    } else {
        LocalTransport::offline(known)
    };

    let request = ResolutionRequest::new(args.identity.clone())
        .allow_network_request(args.request)
        .timeout(timeout);
    let identity = Resolver::new(&transport)
        .with_poll_interval(state.config.poll_interval())
        .resolve(&request)
        .await?;

    let ctx = OpContext::new(identity, IoOptions::from(&args));
    let output = operation.execute(&ctx).await?.to_string();
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}
