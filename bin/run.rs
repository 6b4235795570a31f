use std::fmt;
use std::io::Write;

use clap::{App, Arg, ArgMatches};
use slog::{o, Discard, Drain, Level, Logger};
use slog_term::{FullFormat, TermDecorator};

use ls8::{
    emulator::{Emulator, StdIo},
    error::{EmulationError, LoadError},
    program::Program,
};

enum Error {
    MissingProgramFile,
    Load(LoadError),
    Execution(EmulationError),
    IO(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::IO(e)
    }
}

impl From<LoadError> for Error {
    fn from(e: LoadError) -> Error {
        Error::Load(e)
    }
}

impl From<EmulationError> for Error {
    fn from(e: EmulationError) -> Error {
        Error::Execution(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingProgramFile => write!(f, "No program file provided"),
            Error::Load(err) => write!(f, "Load error: {}", err),
            Error::Execution(err) => write!(f, "Execution error: {}", err),
            Error::IO(err) => write!(f, "IO error: {}", err),
        }
    }
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("ls8run")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Utility for executing LS-8 programs")
        .arg(Arg::with_name("program")
             .help("File containing the program, one binary byte per line")
             .value_name("PROGRAM")
             .index(1))
        .arg(Arg::with_name("verbose")
             .help("Log halts and errors, twice to trace every instruction")
             .short("v")
             .long("verbose")
             .multiple(true))
        .arg(Arg::with_name("disassemble")
             .help("Print an annotated listing of the program instead of running it")
             .short("d")
             .long("disassemble"))
        .get_matches()
}

fn build_logger(verbosity: u64) -> Logger {
    let level = match verbosity {
        0 => return Logger::root(Discard, o!()),
        1 => Level::Debug,
        _ => Level::Trace,
    };

    let decorator = TermDecorator::new().stderr().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().filter_level(level).fuse();

    Logger::root(drain, o!())
}

fn main() {
    let args = parse_arguments();

    let result = {
        let logger = build_logger(args.occurrences_of("verbose"));

        run(args.value_of("program"), args.is_present("disassemble"), logger)
    };

    if let Err(err) = result {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run(file_path: Option<&str>, disassemble: bool, logger: Logger) -> Result<(), Error> {
    let file_path = file_path.ok_or(Error::MissingProgramFile)?;
    let source = std::fs::read_to_string(file_path)?;
    let program = Program::parse(&source)?;

    if disassemble {
        print!("{}", program.to_source());
        return Ok(());
    }

    let mut emulator = Emulator::new(&program, StdIo);
    emulator.set_logger(logger);

    let result = emulator.run();
    std::io::stdout().flush()?;

    result.map_err(Error::from)
}
