use scan_core::Msg;
use thiserror::Error;

/// One parsed line of operator input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dispatch(Msg),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command {0:?} (type `help`)")]
    UnknownCommand(String),
    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("{0:?} is not a row number")]
    InvalidRow(String),
}

/// Parses a line. Blank lines yield `Ok(None)`.
///
/// Values keep their inner spacing; only the separator after the keyword (and
/// the row number) is consumed, so `url` with no value clears the field.
pub fn parse_command(line: &str) -> Result<Option<Command>, InputError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.trim().is_empty() {
        return Ok(None);
    }

    let (keyword, rest) = split_word(trimmed);
    let command = match keyword.to_ascii_lowercase().as_str() {
        "url" => Command::Dispatch(Msg::BaseUrlChanged(rest.trim().to_string())),
        "set" => {
            let (row, value) = split_word(rest);
            if row.is_empty() {
                return Err(InputError::MissingArgument {
                    command: "set",
                    argument: "a row number",
                });
            }
            let index = row
                .parse::<usize>()
                .map_err(|_| InputError::InvalidRow(row.to_string()))?;
            Command::Dispatch(Msg::EndpointChanged {
                index,
                value: value.trim().to_string(),
            })
        }
        "add" => Command::Dispatch(Msg::EndpointAdded),
        "submit" | "scan" => Command::Dispatch(Msg::SubmitClicked),
        "cancel" => Command::Dispatch(Msg::CancelClicked),
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err(InputError::UnknownCommand(keyword.to_string())),
    };
    Ok(Some(command))
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest),
        None => (text, ""),
    }
}
