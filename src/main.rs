use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use inquire::{InquireError, Select, Text};
use modbus_rtu_term::{
    config::{DEFAULT_CONFIG_FILE, Settings},
    input::{Command, parse_line},
    report::{format_bytes, report},
    session::Session,
    transport::{SerialTransport, Transport},
};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "modbus-rtu-term", about = "Send raw Modbus RTU requests over a serial port")]
struct Args {
    /// JSON file holding Port, Baud and Timeout.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Override the configured port.
    #[arg(long)]
    port: Option<String>,
    #[arg(long)]
    baud: Option<u32>,
    /// Per-read timeout in milliseconds.
    #[arg(long)]
    timeout: Option<u32>,
    /// Pick the port from the ones found on this machine.
    #[arg(long, conflicts_with = "port")]
    select: bool,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}

fn select_port() -> Result<String, Box<dyn std::error::Error>> {
    let ports = serialport::available_ports()?;
    if ports.is_empty() {
        return Err("No serial ports found".into());
    }

    let port_names: Vec<String> = ports.into_iter().map(|p| p.port_name).collect();
    Ok(Select::new("Select a serial port:", port_names).prompt()?)
}

fn run<T: Transport>(session: &mut Session<T>) {
    loop {
        let line = match Text::new("Enter request using spaces without CRC:").prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => {
                error!(%err, "unable to read input");
                break;
            }
        };

        let payload = match parse_line(&line) {
            Command::Exit => break,
            Command::Send { payload, rejected } => {
                for err in rejected {
                    println!("{err}");
                }
                payload
            }
        };

        match session.submit(&payload) {
            Ok(outcome) => {
                println!("Request:{}", format_bytes(&outcome.request));
                println!("{}\n", report(&outcome));
            }
            Err(err) => println!("{err}\nResult: false\n"),
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let mut settings = Settings::load_or_default(&args.config);
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(baud) = args.baud {
        settings.baud = baud;
    }
    if let Some(timeout) = args.timeout {
        settings.timeout = timeout;
    }
    if args.select {
        match select_port() {
            Ok(port) => settings.port = port,
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        }
    }

    println!(
        "Port settings: {} {} {}",
        settings.port, settings.baud, settings.timeout
    );

    let transport = match SerialTransport::open(
        &settings.port,
        settings.baud,
        settings.read_timeout(),
        settings.delivery_mode(),
    ) {
        Ok(transport) => transport,
        Err(err) => {
            error!(port = %settings.port, %err, "unable to open serial port");
            eprintln!("Unable to open {}: {err}", settings.port);
            return ExitCode::FAILURE;
        }
    };

    let mut session: Session<SerialTransport> =
        Session::with_policy(transport, settings.read_policy());
    info!(policy = ?session.policy(), "session ready");

    run(&mut session);

    session.into_transport().close();
    ExitCode::SUCCESS
}
