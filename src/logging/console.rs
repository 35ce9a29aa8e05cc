use crate::config::handler::ConsoleStream;
use std::fmt::Debug;
use std::io::{IsTerminal, Write};

/// Access to the process console streams.
pub trait ConsoleProvider: Debug + Send + Sync {
    fn writer(&self, stream: ConsoleStream) -> Box<dyn Write + '_>;

    fn is_terminal(&self, stream: ConsoleStream) -> bool;
}

/// The real standard output and standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl ConsoleProvider for StdConsole {
    fn writer(&self, stream: ConsoleStream) -> Box<dyn Write + '_> {
        match stream {
            ConsoleStream::Stdout => Box::new(std::io::stdout().lock()),
            ConsoleStream::Stderr => Box::new(std::io::stderr().lock()),
        }
    }

    fn is_terminal(&self, stream: ConsoleStream) -> bool {
        match stream {
            ConsoleStream::Stdout => std::io::stdout().is_terminal(),
            ConsoleStream::Stderr => std::io::stderr().is_terminal(),
        }
    }
}
