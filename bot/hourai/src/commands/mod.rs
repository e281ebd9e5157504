pub mod prelude;

use thiserror::Error;
pub use twilight_command_parser::{Command, CommandParserConfig, Parser};

/// The sum type of all errors that might result from parsing a command
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid Argument: {}", .0)]
    InvalidArgument(String),
    #[error("Missing argument")]
    MissingArgument,
}

/// Builds a parser for text commands of the form `<prefix><command> <args...>`.
pub fn parser(prefix: impl Into<String>, commands: &[&str]) -> Parser<'static> {
    let mut config = CommandParserConfig::new();
    config.add_prefix(prefix.into());
    for command in commands {
        config.add_command(*command, false);
    }
    Parser::new(config)
}
