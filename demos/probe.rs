//! Connects to a 4DIAC runtime, sends a greeting and a packed float, and
//! prints an analysis of everything that goes over the wire.

use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fordiac::analysis::pack_f32;
use fordiac::{Client, Timeouts, FORTE_PORT};

#[derive(Parser, Debug)]
#[clap(about = "Probe a 4DIAC runtime with raw TCP payloads")]
struct Args {
    /// Target runtime as `hostname[:port]`.
    ///
    /// The port defaults to 61499, the standard FORTE port.
    #[clap(default_value = "localhost")]
    target: Target,

    /// greeting sent first
    #[clap(long, default_value = "Hello 4DIAC!")]
    message: String,

    /// float sent second, packed as 4 big-endian bytes
    #[clap(long, default_value = "123.456")]
    value: f32,

    /// connect/read/write timeout in seconds (default: wait forever)
    #[clap(long)]
    timeout: Option<u64>,
}

/// Target spec: host plus optional port.
#[derive(Debug)]
struct Target {
    host: String,
    port: Option<u16>,
}

impl FromStr for Target {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rx = regex::Regex::new("^(?P<host>[^:/]+)(:(?P<port>\\d+))?$").unwrap();
        match rx.captures(s) {
            None => Err("target format is host[:port]"),
            Some(cap) => Ok(Target {
                host: cap["host"].into(),
                port: cap.name("port")
                         .map(|p| p.as_str().parse().map_err(|_| "invalid port number"))
                         .transpose()?,
            }),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
                         .unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if let Err(e) = main_inner(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn main_inner(args: Args) -> fordiac::Result<()> {
    let timeouts = match args.timeout {
        Some(secs) => Timeouts::new(Duration::from_secs(secs)),
        None => Timeouts::none(),
    };
    let mut client = Client::new(args.target.host, args.target.port.unwrap_or(FORTE_PORT))
        .with_timeouts(timeouts);

    client.connect()?;
    // From here on, dropping the client closes the connection, also when one
    // of the steps fails.
    client.send(args.message.as_bytes())?;
    client.receive_default()?;
    client.send(&pack_f32(args.value))?;
    client.receive_default()?;
    client.disconnect();
    Ok(())
}
