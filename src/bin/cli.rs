//! spec20log command line interface.

use std::process;

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_t, App, AppSettings::*, Arg,
    ArgMatches,
};
use console::style;
use log::{debug, trace, LevelFilter};
use serialport::{DataBits, FlowControl, Parity, StopBits};
use simplelog::*;

use spec20log::{
    self as s20,
    hal::{Level, ModemLine},
    Supervisor,
};

fn main() {
    println!("[S20] spec20log v{}", crate_version!());

    ctrlc::set_handler(move || {
        println!("🛑 received Ctrl+C!");
        process::exit(0);
    })
    .expect("Failed to install the Ctrl-C handler!");

    let matches = App::new(crate_name!())
        .version(format!("v{}", crate_version!()).as_str())
        .author(crate_authors!())
        .about(crate_description!())
        .long_about(
            "\n\
            spec20log listens to a Spectronic 20 spectrophotometer on its \
            RS-232 port. Every record the instrument prints (e.g. \
            `630NM  -0.15 A`) is decoded into a wavelength, a value and a \
            reading mode, and published as a JSON event on a webhook \
            channel.\n\
            \n\
            A push button wired to one of the modem status lines of the same \
            serial adapter (CTS, DSR, CD or RI) can be used to tag the \
            readings that follow each push with a new sample number.\n\
            \n\
            spec20log can be started before the adapter is plugged and \
            handles unplugging and re-plugging of the USB cable.\
        ",
        )
        .max_term_width(80)
        .setting(ColoredHelp)
        .setting(NextLineHelp)
        .arg(
            Arg::with_name("DEVICE_TTY")
                .help("the USB tty device to use")
                .long_help(
                    "the USB tty device the spectrophotometer is connected \
                     to; when not set, `spec20log` lets you select one of the \
                     connected serial ports.",
                )
                .short("-t")
                .long("--tty")
                .takes_value(true)
                .require_equals(true),
        )
        .arg(
            Arg::with_name("BAUD_RATE")
                .help("serial port baud rate")
                .short("-b")
                .long("--baud-rate")
                .takes_value(true)
                .default_value("1200")
                .require_equals(true),
        )
        .arg(
            Arg::with_name("DATA_BITS")
                .help("number of bits per character")
                .short("-d")
                .long("--data-bits")
                .takes_value(true)
                .possible_values(&["5", "6", "7", "8"])
                .default_value("8")
                .require_equals(true),
        )
        .arg(
            Arg::with_name("STOP_BITS")
                .help("number of stop bits per byte")
                .short("-s")
                .long("--stop-bits")
                .takes_value(true)
                .possible_values(&["1", "2"])
                .default_value("1")
                .require_equals(true),
        )
        .arg(
            Arg::with_name("PARITY")
                .help("parity checking protocol")
                .short("-p")
                .long("--parity")
                .takes_value(true)
                .possible_values(&["none", "odd", "even"])
                .default_value("none")
                .require_equals(true),
        )
        .arg(
            Arg::with_name("FLOW_CONTROL")
                .help("flow control mode")
                .short("-f")
                .long("--flow-control")
                .takes_value(true)
                .possible_values(&["none", "soft", "hard"])
                .default_value("none")
                .require_equals(true),
        )
        .arg(
            Arg::with_name("BUTTON_LINE")
                .help("modem status line the push button is wired to")
                .long("--button")
                .takes_value(true)
                .possible_values(&["cts", "dsr", "cd", "ri"])
                .require_equals(true),
        )
        .arg(
            Arg::with_name("ACTIVE_LOW")
                .help("the button pulls the line low when pushed")
                .long("--active-low"),
        )
        .arg(
            Arg::with_name("DEBOUNCE_MS")
                .help("button debounce window in milliseconds")
                .long("--debounce")
                .takes_value(true)
                .default_value("20")
                .require_equals(true),
        )
        .arg(
            Arg::with_name("WEBHOOK")
                .help("webhook channel name (12 characters at most)")
                .short("-w")
                .long("--webhook")
                .takes_value(true)
                .default_value("spec20")
                .require_equals(true),
        )
        .arg(
            Arg::with_name("COUNT")
                .help("stop after that many readings")
                .short("-n")
                .long("--count")
                .takes_value(true)
                .require_equals(true),
        )
        .arg(Arg::with_name("v").short("v").multiple(true).help(
            "Sets the logging level of verbosity, repeat several times for \
                higher verbosity",
        ))
        .get_matches();

    // Vary the output based on how many times the user used the "verbose" flag
    // (i.e. 'spec20log -v -v -v' or 'spec20log -vvv' vs 'spec20log -v')
    let log_level = match matches.occurrences_of("v") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    TermLogger::init(log_level, Config::default(), TerminalMode::Mixed).unwrap();

    trace!("{:#?}", matches);

    // Arguments with default values ===========================================

    // Values with defaults are always present, so unwrapping them is safe.

    let baud_rate = numeric_arg::<u32>(&matches, "BAUD_RATE", "baud-rate");
    let debounce_ms = numeric_arg::<u64>(&matches, "DEBOUNCE_MS", "debounce");

    let data_bits = match matches.value_of("DATA_BITS").unwrap() {
        "5" => DataBits::Five,
        "6" => DataBits::Six,
        "7" => DataBits::Seven,
        "8" => DataBits::Eight,
        _ => unreachable!(),
    };

    let stop_bits = match matches.value_of("STOP_BITS").unwrap() {
        "1" => StopBits::One,
        "2" => StopBits::Two,
        _ => unreachable!(),
    };

    let parity = match matches.value_of("PARITY").unwrap() {
        "none" => Parity::None,
        "even" => Parity::Even,
        "odd" => Parity::Odd,
        _ => unreachable!(),
    };

    let flow_control = match matches.value_of("FLOW_CONTROL").unwrap() {
        "none" => FlowControl::None,
        "soft" => FlowControl::Software,
        "hard" => FlowControl::Hardware,
        _ => unreachable!(),
    };

    let active_level = if matches.is_present("ACTIVE_LOW") {
        Level::Low
    } else {
        Level::High
    };

    // END - Arguments with default values =====================================

    let mut builder = s20::SettingsBuilder::new()
        .baud_rate(baud_rate)
        .data_bits(data_bits)
        .stop_bits(stop_bits)
        .parity(parity)
        .flow_control(flow_control)
        .button_active_level(active_level)
        .debounce_ms(debounce_ms)
        .webhook(matches.value_of("WEBHOOK").unwrap());

    // START - Arguments with NO default values ================================

    if let Some(path) = matches.value_of("DEVICE_TTY") {
        builder = builder.path(path);
    }

    if let Some(line) = matches.value_of("BUTTON_LINE") {
        builder = builder.button_line(match line {
            "cts" => ModemLine::Cts,
            "dsr" => ModemLine::Dsr,
            "cd" => ModemLine::Cd,
            "ri" => ModemLine::Ri,
            _ => unreachable!(),
        });
    }

    if matches.is_present("COUNT") {
        builder = builder.max_readings(numeric_arg::<usize>(&matches, "COUNT", "count"));
    }

    // END - Arguments =========================================================

    let settings = builder.finalize();
    if let Err(e) = s20::webhook::Webhook::new(&settings.webhook, s20::webhook::LogPublisher) {
        println!("{}: {}", style("error").red(), e);
        process::exit(-1);
    }

    // Run the state machine ===================================================

    let mut supervisor = s20::supervisor(settings);
    let exit_code = supervisor.run();
    debug!("exit code: {}", exit_code);
    std::process::exit(exit_code.into());
}

/// Parse a numeric argument, exiting with a friendly message when it is not a
/// number.
fn numeric_arg<T: std::str::FromStr>(matches: &ArgMatches, name: &str, flag: &str) -> T {
    value_t!(matches.value_of(name), T).unwrap_or_else(|_| {
        println!(
            "{}: `{}` needs to be a numeric value",
            style("error").red(),
            style(flag).cyan()
        );
        println!(
            "   {} `{}` is not a valid value",
            style("-->").cyan(),
            style(matches.value_of(name).unwrap_or_default()).on_red()
        );
        process::exit(-1);
    })
}
