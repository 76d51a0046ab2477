use thiserror::Error;

use crate::ranking::{CategoryFilter, RankMode};

pub const HELP: &str = "\
commands:
  category <All|Politicians|Executives|Influencers|Historical|Fictional>
  country [text]     filter Politicians by country (empty clears)
  rank <percent|resonate|reject>
  reload
  help
  quit";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Category(CategoryFilter),
    Country(String),
    Rank(RankMode),
    Reload,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("{0}")]
    BadArgument(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "category" | "cat" => rest
                .parse()
                .map(Command::Category)
                .map_err(CommandError::BadArgument),
            // the text is kept as typed; matching ignores case later
            "country" => Ok(Command::Country(rest.to_string())),
            "rank" => rest
                .parse()
                .map(Command::Rank)
                .map_err(CommandError::BadArgument),
            "reload" => Ok(Command::Reload),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(word.to_string())),
        }
    }
}
