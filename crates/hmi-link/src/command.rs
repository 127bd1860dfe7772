use crate::ProtocolError;
use station_config::SetKey;

/// A parsed display command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// `SET <key> <value>`, value in inches.
    Set { key: SetKey, value_in: f64 },
    Save,
    ReqTargets,
    ReqOffsets,
    Dump,
}

impl Command {
    /// Parse one frame's text. Command tokens are uppercase and
    /// case-sensitive; anything outside the grammar is rejected.
    pub fn parse(line: &str) -> Result<Command, ProtocolError> {
        let mut tokens = line.split_ascii_whitespace();
        let head = tokens.next().ok_or(ProtocolError::Empty)?;
        match head {
            "SET" => {
                let key_tok = tokens.next().ok_or(ProtocolError::MissingArgument("SET key"))?;
                let key = SetKey::from_token(key_tok)
                    .ok_or_else(|| ProtocolError::UnknownKey(key_tok.to_string()))?;
                let val_tok = tokens
                    .next()
                    .ok_or(ProtocolError::MissingArgument("SET value"))?;
                let value_in: f64 = val_tok
                    .parse()
                    .map_err(|_| ProtocolError::BadNumber(val_tok.to_string()))?;
                if !value_in.is_finite() {
                    return Err(ProtocolError::BadNumber(val_tok.to_string()));
                }
                Ok(Command::Set { key, value_in })
            }
            "SAVE" => Ok(Command::Save),
            "REQ" => match tokens.next() {
                Some("TARGETS") => Ok(Command::ReqTargets),
                Some("OFFSETS") => Ok(Command::ReqOffsets),
                Some(other) => Err(ProtocolError::UnknownCommand(format!("REQ {other}"))),
                None => Err(ProtocolError::MissingArgument("REQ subject")),
            },
            "DUMP" => Ok(Command::Dump),
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_parses_key_and_inches() {
        let cmd = Command::parse("SET d1t 1.234").unwrap();
        assert_eq!(
            cmd,
            Command::Set {
                key: SetKey::D1Target,
                value_in: 1.234
            }
        );
    }

    #[test]
    fn simple_commands() {
        assert_eq!(Command::parse("SAVE").unwrap(), Command::Save);
        assert_eq!(Command::parse("DUMP").unwrap(), Command::Dump);
        assert_eq!(Command::parse("REQ TARGETS").unwrap(), Command::ReqTargets);
        assert_eq!(Command::parse("REQ OFFSETS").unwrap(), Command::ReqOffsets);
    }

    #[test]
    fn commands_are_case_sensitive() {
        assert!(matches!(
            Command::parse("set d1t 1.0"),
            Err(ProtocolError::UnknownCommand(_))
        ));
        assert!(matches!(
            Command::parse("REQ targets"),
            Err(ProtocolError::UnknownCommand(_))
        ));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert_eq!(
            Command::parse("SET bogus 1.0"),
            Err(ProtocolError::UnknownKey("bogus".to_string()))
        );
    }

    #[test]
    fn bad_numbers_are_rejected() {
        assert!(matches!(
            Command::parse("SET d1t abc"),
            Err(ProtocolError::BadNumber(_))
        ));
        assert!(matches!(
            Command::parse("SET d1t NaN"),
            Err(ProtocolError::BadNumber(_))
        ));
        assert!(matches!(
            Command::parse("SET d1t"),
            Err(ProtocolError::MissingArgument(_))
        ));
    }

    #[test]
    fn whitespace_splitting_is_forgiving() {
        let cmd = Command::parse("  SET   off3   -0.010 ").unwrap();
        assert_eq!(
            cmd,
            Command::Set {
                key: SetKey::Offset(3),
                value_in: -0.010
            }
        );
    }

    #[test]
    fn garbage_is_unknown() {
        assert!(matches!(
            Command::parse("HELLO"),
            Err(ProtocolError::UnknownCommand(_))
        ));
        assert_eq!(Command::parse("   "), Err(ProtocolError::Empty));
    }
}
