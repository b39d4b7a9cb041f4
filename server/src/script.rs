//! Line-based event script for driving the simulated engine
//!
//! ```text
//! connect 1 1 Alice      # id, team index, name
//! team 1 2
//! chat 1 /ready
//! teamchat 2 /r
//! spawn 1
//! death 1
//! status playing
//! map dalian_plant
//! restart
//! disconnect 1
//! rcon warmup enable 0   # <module> <subcommand> <args>
//! ```
//!
//! Blank lines and lines starting with `#` parse to `None`.

use std::str::FromStr;
use thiserror::Error;
use warmup_shared::{ChatChannel, GameStatus, PlayerId, Team};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("unknown script command '{0}'")]
    UnknownCommand(String),

    #[error("'{command}' expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("'{0}' is not a player id")]
    InvalidId(String),

    #[error("{0}")]
    InvalidStatus(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    Connect {
        id: PlayerId,
        team: Team,
        name: String,
    },
    Disconnect {
        id: PlayerId,
    },
    Team {
        id: PlayerId,
        team: Team,
    },
    Chat {
        id: PlayerId,
        channel: ChatChannel,
        text: String,
    },
    Spawn {
        id: PlayerId,
    },
    Death {
        id: PlayerId,
    },
    Status {
        status: GameStatus,
    },
    Map {
        name: String,
    },
    Restart,
    Console {
        module: String,
        args: String,
    },
}

impl ScriptCommand {
    /// Parses one script line, skipping blanks and comments.
    pub fn parse_line(line: &str) -> Result<Option<Self>, ScriptError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        line.parse().map(Some)
    }
}

fn next_word<'a>(
    rest: &'a str,
    command: &'static str,
    expected: &'static str,
) -> Result<(&'a str, &'a str), ScriptError> {
    let rest = rest.trim_start();
    if rest.is_empty() {
        return Err(ScriptError::MissingArgument { command, expected });
    }
    Ok(match rest.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (rest, ""),
    })
}

fn parse_id(word: &str) -> Result<PlayerId, ScriptError> {
    word.parse()
        .map_err(|_| ScriptError::InvalidId(word.to_string()))
}

fn parse_team(word: &str) -> Team {
    Team::from_index(word.parse().unwrap_or(0))
}

impl FromStr for ScriptCommand {
    type Err = ScriptError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (verb, rest) = next_word(line, "", "a command")?;

        match verb.to_ascii_lowercase().as_str() {
            "connect" => {
                let expected = "<id> <team> <name>";
                let (id, rest) = next_word(rest, "connect", expected)?;
                let (team, rest) = next_word(rest, "connect", expected)?;
                let name = rest.trim();
                if name.is_empty() {
                    return Err(ScriptError::MissingArgument {
                        command: "connect",
                        expected,
                    });
                }
                Ok(Self::Connect {
                    id: parse_id(id)?,
                    team: parse_team(team),
                    name: name.to_string(),
                })
            }
            "disconnect" => {
                let (id, _) = next_word(rest, "disconnect", "<id>")?;
                Ok(Self::Disconnect { id: parse_id(id)? })
            }
            "team" => {
                let (id, rest) = next_word(rest, "team", "<id> <team>")?;
                let (team, _) = next_word(rest, "team", "<id> <team>")?;
                Ok(Self::Team {
                    id: parse_id(id)?,
                    team: parse_team(team),
                })
            }
            "chat" | "teamchat" => {
                let channel = if verb.eq_ignore_ascii_case("chat") {
                    ChatChannel::Global
                } else {
                    ChatChannel::Team
                };
                let (id, text) = next_word(rest, "chat", "<id> <text>")?;
                Ok(Self::Chat {
                    id: parse_id(id)?,
                    channel,
                    text: text.trim().to_string(),
                })
            }
            "spawn" => {
                let (id, _) = next_word(rest, "spawn", "<id>")?;
                Ok(Self::Spawn { id: parse_id(id)? })
            }
            "death" => {
                let (id, _) = next_word(rest, "death", "<id>")?;
                Ok(Self::Death { id: parse_id(id)? })
            }
            "status" => {
                let (status, _) = next_word(rest, "status", "<status>")?;
                let status: GameStatus = status.parse().map_err(ScriptError::InvalidStatus)?;
                Ok(Self::Status { status })
            }
            "map" => {
                let (name, _) = next_word(rest, "map", "<name>")?;
                Ok(Self::Map {
                    name: name.to_string(),
                })
            }
            "restart" => Ok(Self::Restart),
            "rcon" => {
                let (module, args) = next_word(rest, "rcon", "<module> <args>")?;
                Ok(Self::Console {
                    module: module.to_string(),
                    args: args.trim().to_string(),
                })
            }
            other => Err(ScriptError::UnknownCommand(other.to_string())),
        }
    }
}
