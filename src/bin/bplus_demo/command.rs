use log::{error, warn};

/// One parsed console line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Command {
    Add(Vec<i32>),
    Remove(Vec<i32>),
    Contains(Vec<i32>),
    Print,
    Clear,
    First,
    Last,
    Is(Vec<Condition>),
    SetVerbose(bool),
    Exit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Condition {
    Empty,
}

impl Command {
    /// Parses a whitespace separated line. Keywords are case-insensitive.
    ///
    /// Returns `None` for blank lines and for lines that do nothing, which are reported through the log:
    /// unknown commands and unknown `SET` parameters at warn level. Operands that are not integers are logged at
    /// error level and dropped without rejecting the rest of the line.
    pub(crate) fn parse(line: &str) -> Option<Command> {
        let mut tokens = line.split_whitespace();
        let keyword = tokens.next()?;
        let command = match keyword.to_ascii_uppercase().as_str() {
            "EXIT" | "QUIT" => Command::Exit,
            "PRINT" => Command::Print,
            "CLEAR" => Command::Clear,
            "FIRST" => Command::First,
            "LAST" => Command::Last,
            "ADD" => Command::Add(parse_values(tokens)),
            "REMOVE" => Command::Remove(parse_values(tokens)),
            "CONTAINS" => Command::Contains(parse_values(tokens)),
            "IS" => Command::Is(tokens.filter_map(parse_condition).collect()),
            "SET" => {
                let param = tokens.next()?;
                match param.to_ascii_uppercase().as_str() {
                    "VERBOSE" => Command::SetVerbose(true),
                    "NOVERBOSE" => Command::SetVerbose(false),
                    _ => {
                        warn!("No such parameter: {param}");
                        return None;
                    }
                }
            }
            _ => {
                warn!("Unknown command: {keyword}");
                return None;
            }
        };
        Some(command)
    }

    /// `true` for commands that change the set, after which verbose mode prints the tree.
    pub(crate) fn is_mutating(&self) -> bool {
        matches!(self, Command::Add(_) | Command::Remove(_) | Command::Clear)
    }
}

fn parse_values<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<i32> {
    tokens
        .filter_map(|token| match token.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                error!("Invalid integer: {token}");
                None
            }
        })
        .collect()
}

fn parse_condition(token: &str) -> Option<Condition> {
    if token.eq_ignore_ascii_case("EMPTY") {
        Some(Condition::Empty)
    } else {
        warn!("Unknown condition: {token}");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_ignore_case() {
        assert_eq!(Command::parse("print"), Some(Command::Print));
        assert_eq!(Command::parse("  Clear  "), Some(Command::Clear));
        assert_eq!(Command::parse("quit"), Some(Command::Exit));
        assert_eq!(Command::parse("EXIT now"), Some(Command::Exit));
        assert_eq!(Command::parse("first"), Some(Command::First));
        assert_eq!(Command::parse("Last"), Some(Command::Last));
    }

    #[test]
    fn blank_lines_do_nothing() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse(" \t "), None);
    }

    #[test]
    fn invalid_integers_are_skipped() {
        assert_eq!(Command::parse("add 5 x 7 3.5 -2"), Some(Command::Add(vec![5, 7, -2])));
        assert_eq!(Command::parse("REMOVE 99999999999 1"), Some(Command::Remove(vec![1])));
        assert_eq!(Command::parse("contains"), Some(Command::Contains(vec![])));
    }

    #[test]
    fn is_keeps_known_conditions() {
        assert_eq!(Command::parse("is empty full EMPTY"), Some(Command::Is(vec![Condition::Empty, Condition::Empty])));
        assert_eq!(Command::parse("IS"), Some(Command::Is(vec![])));
    }

    #[test]
    fn set_toggles_verbosity() {
        assert_eq!(Command::parse("set verbose"), Some(Command::SetVerbose(true)));
        assert_eq!(Command::parse("SET NoVerbose"), Some(Command::SetVerbose(false)));
        assert_eq!(Command::parse("SET"), None);
        assert_eq!(Command::parse("SET loud"), None);
    }

    #[test]
    fn unknown_commands_do_nothing() {
        assert_eq!(Command::parse("INSERT 1"), None);
    }

    #[test]
    fn only_add_remove_and_clear_mutate() {
        assert!(Command::Add(vec![]).is_mutating());
        assert!(Command::Remove(vec![1]).is_mutating());
        assert!(Command::Clear.is_mutating());
        assert!(!Command::Print.is_mutating());
        assert!(!Command::Contains(vec![1]).is_mutating());
        assert!(!Command::SetVerbose(true).is_mutating());
    }
}
