extern crate clap;
use crossbeam_channel::{bounded, select, unbounded, Receiver};
use log::{error, info, warn};
use std::io::{self, BufRead, Write};

mod backend;
mod config;
mod error;
mod session;

use backend::Backend;
use config::{Config, Mode};
use error::AppError;
use fzoom_core::{Coprocessor, FrameGeometry, Navigation, RegisterWindow};
use session::{Command, Flow, Session, HELP};

/// Command-line interface definition
fn get_cli_app<'a, 'b>() -> clap::App<'a, 'b> {
    let description = "Host control for the FPGA image zoom coprocessor";
    clap::App::new("fzoom")
        .version("0.1")
        .about(description)
        .arg(
            clap::Arg::with_name("simulate")
                .long("simulate")
                .help("Drive the software model instead of /dev/mem"),
        )
        .arg(
            clap::Arg::with_name("sim-latency")
                .long("sim-latency")
                .takes_value(true)
                .value_name("N")
                .help("Busy flag reads before the simulator completes an instruction"),
        )
        .arg(
            clap::Arg::with_name("base")
                .long("base")
                .takes_value(true)
                .value_name("ADDR")
                .help("Physical address of the register window [default: 0xFF200000]"),
        )
        .arg(
            clap::Arg::with_name("span")
                .long("span")
                .takes_value(true)
                .value_name("BYTES")
                .help("Size of the register window [default: 0x1000]"),
        )
        .arg(
            clap::Arg::with_name("device")
                .long("device")
                .takes_value(true)
                .value_name("PATH")
                .help("Memory device to map [default: /dev/mem]"),
        )
        .arg(
            clap::Arg::with_name("pan-step")
                .long("pan-step")
                .takes_value(true)
                .value_name("N")
                .help("Pixels moved per pan command [default: 10]"),
        )
        .arg(
            clap::Arg::with_name("poll-limit")
                .long("poll-limit")
                .takes_value(true)
                .value_name("N")
                .help("Give up after N busy flag reads (diagnostics only)"),
        )
        .subcommand(
            clap::SubCommand::with_name("interactive").about("Line-mode menu (default)"),
        )
        .subcommand(
            clap::SubCommand::with_name("load")
                .about("Load a bitmap and display it")
                .arg(clap::Arg::with_name("FILE").required(true).index(1)),
        )
        .subcommand(
            clap::SubCommand::with_name("reset").about("Restore the loaded image and recentre"),
        )
}

fn main() {
    env_logger::init();

    // Ctrl-C is forwarded to the menu loop
    let (signal_sender, signal_receiver) = bounded(1);
    let handler_result = ctrlc::set_handler(move || {
        if signal_sender.is_full() {
            std::process::exit(-1); // second Ctrl-C while the first is pending
        }
        let _send_result = signal_sender.send(());
    });

    if let Err(e) = handler_result {
        error!("{}", AppError::from(e));
        std::process::exit(1);
    }

    let matches = get_cli_app().get_matches();
    if let Err(e) = run(&matches, signal_receiver) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(matches: &clap::ArgMatches, signals: Receiver<()>) -> Result<(), AppError> {
    let config = Config::from_matches(matches)?;
    let geometry = FrameGeometry::DEFAULT;

    let backend = Backend::open(&config.window, geometry)?;
    let navigation = Navigation::new(geometry, config.pan_step);
    let coproc =
        Coprocessor::with_navigation(backend, navigation).with_poll_limit(config.poll_limit);
    let mut session = Session::new(coproc);

    match config.mode {
        Mode::Load(path) => {
            session.load_image(&path)?;
            Ok(())
        }
        Mode::Reset => session.execute(Command::Reset).map(|_| ()),
        Mode::Interactive => interactive(&mut session, signals),
    }
}

/// Read menu lines on a helper thread; all register access stays here
fn interactive<W: RegisterWindow>(
    session: &mut Session<W>,
    signals: Receiver<()>,
) -> Result<(), AppError> {
    let (line_sender, lines) = unbounded();
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if line_sender.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });

    println!("{}", HELP);
    loop {
        print!("> ");
        let _flush_result = io::stdout().flush();

        let line = select! {
            recv(signals) -> _ => {
                info!("Interrupted");
                None
            }
            recv(lines) -> line => line.ok(), // Err once stdin closes
        };
        let line = match line {
            Some(line) => line,
            None => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let result = line
            .parse::<Command>()
            .and_then(|command| session.execute(command));
        match result {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => error!("{}", e),
        }
    }
    Ok(())
}
