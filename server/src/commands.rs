//! Remote-console and chat command parsing
//!
//! Console commands arrive as `<module> <subcommand> <args>`. Each module
//! exposes a table mapping [`Subcommand`] values to typed handlers; the
//! table lookup replaces string-keyed method dispatch. Chat commands are
//! slash-prefixed tokens matched case-insensitively.

use thiserror::Error;
use warmup_shared::ChatChannel;

/// Collects the text a console command writes back to its caller.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConsoleContext {
    output: String,
}

impl ConsoleContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("no argument ({usage}) specified")]
    MissingArgument { usage: &'static str },

    #[error("'{0}' is not an integer")]
    InvalidInteger(String),

    #[error("'{0}' is not a number")]
    InvalidFloat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    /// `enable <0|1>`
    Enable,
    /// `height <float>`
    Height,
}

impl Subcommand {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "enable" => Some(Self::Enable),
            "height" => Some(Self::Height),
            _ => None,
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            Self::Enable => "enable <0|1>",
            Self::Height => "height <float>",
        }
    }
}

pub type Handler<M> = fn(&mut M, &mut ConsoleContext, &str);

/// Splits `"<subcommand> <rest>"` at the first run of whitespace.
pub fn split_subcommand(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (input, ""),
    }
}

/// Looks up the subcommand in `table` and runs its handler. Unknown names
/// produce an error line listing what the module supports.
pub fn exec_subcommand<M>(
    module: &mut M,
    table: &[(Subcommand, Handler<M>)],
    ctx: &mut ConsoleContext,
    input: &str,
) {
    let (name, args) = split_subcommand(input);
    let handler = Subcommand::from_name(name)
        .and_then(|sub| table.iter().find(|(entry, _)| *entry == sub))
        .map(|(_, handler)| *handler);

    match handler {
        Some(handler) => handler(module, ctx, args),
        None => {
            let usage: Vec<&str> = table.iter().map(|(sub, _)| sub.usage()).collect();
            ctx.write(&format!(
                "Error: unknown sub command '{}', expected one of: {}\n",
                name,
                usage.join("; ")
            ));
        }
    }
}

/// Parses the first argument as an integer switch; any non-zero value enables.
pub fn parse_enable(args: &str) -> Result<i64, CommandError> {
    let arg = args
        .split_whitespace()
        .next()
        .ok_or(CommandError::MissingArgument { usage: "0 or 1" })?;
    arg.parse::<i64>()
        .map_err(|_| CommandError::InvalidInteger(arg.to_string()))
}

pub fn parse_height(args: &str) -> Result<f32, CommandError> {
    let arg = args
        .split_whitespace()
        .next()
        .ok_or(CommandError::MissingArgument { usage: "height" })?;
    arg.parse::<f32>()
        .ok()
        .filter(|h| h.is_finite())
        .ok_or_else(|| CommandError::InvalidFloat(arg.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Ready,
    NotReady,
    Stream,
    Disable,
    Help,
    /// Dump the player's position with a comment, for building waypoint tables
    Pos(String),
    SetPos,
    MapName,
}

impl ChatCommand {
    /// Parses a chat line after removing the channel marker. Anything that is
    /// not a known slash command yields `None`.
    pub fn parse(channel: ChatChannel, text: &str) -> Option<Self> {
        let text = channel.strip_prefix(text).to_lowercase();
        if !text.starts_with('/') {
            return None;
        }

        let (token, rest) = match text.split_once(char::is_whitespace) {
            Some((token, rest)) => (token, rest.trim()),
            None => (text.as_str(), ""),
        };

        match token {
            "/ready" | "/r" => Some(Self::Ready),
            "/notready" | "/nr" => Some(Self::NotReady),
            "/stream" => Some(Self::Stream),
            "/disable" => Some(Self::Disable),
            "/help" => Some(Self::Help),
            "/pos" => Some(Self::Pos(rest.to_string())),
            "/set_pos" => Some(Self::SetPos),
            "/mapname" => Some(Self::MapName),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        enabled: i64,
        height: f32,
    }

    fn enable(counter: &mut Counter, ctx: &mut ConsoleContext, args: &str) {
        match parse_enable(args) {
            Ok(value) => {
                counter.enabled = value;
                ctx.write("ok\n");
            }
            Err(e) => ctx.write(&format!("Error: {}\n", e)),
        }
    }

    fn height(counter: &mut Counter, ctx: &mut ConsoleContext, args: &str) {
        if let Ok(value) = parse_height(args) {
            counter.height = value;
            ctx.write("ok\n");
        }
    }

    const TABLE: &[(Subcommand, Handler<Counter>)] =
        &[(Subcommand::Enable, enable), (Subcommand::Height, height)];

    #[test]
    fn test_split_subcommand() {
        assert_eq!(split_subcommand("enable 1"), ("enable", "1"));
        assert_eq!(split_subcommand("  height   12.5  "), ("height", "12.5"));
        assert_eq!(split_subcommand("enable"), ("enable", ""));
        assert_eq!(split_subcommand(""), ("", ""));
    }

    #[test]
    fn test_dispatch_known_subcommand() {
        let mut counter = Counter::default();
        let mut ctx = ConsoleContext::new();
        exec_subcommand(&mut counter, TABLE, &mut ctx, "ENABLE 1");
        assert_eq!(counter.enabled, 1);
        assert_eq!(ctx.output(), "ok\n");

        exec_subcommand(&mut counter, TABLE, &mut ctx, "height 400.5");
        assert_eq!(counter.height, 400.5);
    }

    #[test]
    fn test_dispatch_unknown_subcommand() {
        let mut counter = Counter::default();
        let mut ctx = ConsoleContext::new();
        exec_subcommand(&mut counter, TABLE, &mut ctx, "teleport 1");
        assert!(ctx.output().starts_with("Error: unknown sub command 'teleport'"));
        assert!(ctx.output().contains("enable <0|1>; height <float>"));
    }

    #[test]
    fn test_subcommand_missing_from_table() {
        let mut counter = Counter::default();
        let mut ctx = ConsoleContext::new();
        let table: &[(Subcommand, Handler<Counter>)] = &[(Subcommand::Enable, enable)];
        exec_subcommand(&mut counter, table, &mut ctx, "height 3");
        assert!(ctx.output().starts_with("Error"));
        assert_eq!(counter.height, 0.0);
    }

    #[test]
    fn test_parse_enable() {
        assert_eq!(parse_enable("1"), Ok(1));
        assert_eq!(parse_enable("0 extra"), Ok(0));
        assert_eq!(
            parse_enable(""),
            Err(CommandError::MissingArgument { usage: "0 or 1" })
        );
        assert_eq!(
            parse_enable("yes"),
            Err(CommandError::InvalidInteger("yes".to_string()))
        );
    }

    #[test]
    fn test_parse_height() {
        assert_eq!(parse_height("390"), Ok(390.0));
        assert_eq!(parse_height("-12.5"), Ok(-12.5));
        assert_eq!(
            parse_height("high"),
            Err(CommandError::InvalidFloat("high".to_string()))
        );
        assert_eq!(
            parse_height("NaN"),
            Err(CommandError::InvalidFloat("NaN".to_string()))
        );
    }

    #[test]
    fn test_chat_commands() {
        let global = ChatChannel::Global;
        assert_eq!(ChatCommand::parse(global, "/ready"), Some(ChatCommand::Ready));
        assert_eq!(ChatCommand::parse(global, "/R"), Some(ChatCommand::Ready));
        assert_eq!(ChatCommand::parse(global, "/NotReady"), Some(ChatCommand::NotReady));
        assert_eq!(ChatCommand::parse(global, "/nr"), Some(ChatCommand::NotReady));
        assert_eq!(ChatCommand::parse(global, "/stream"), Some(ChatCommand::Stream));
        assert_eq!(ChatCommand::parse(global, "/disable"), Some(ChatCommand::Disable));
        assert_eq!(ChatCommand::parse(global, "/help"), Some(ChatCommand::Help));
        assert_eq!(ChatCommand::parse(global, "/set_pos"), Some(ChatCommand::SetPos));
        assert_eq!(ChatCommand::parse(global, "/mapname"), Some(ChatCommand::MapName));
    }

    #[test]
    fn test_chat_pos_comment() {
        assert_eq!(
            ChatCommand::parse(ChatChannel::Global, "/pos Burning Car"),
            Some(ChatCommand::Pos("burning car".to_string()))
        );
        assert_eq!(
            ChatCommand::parse(ChatChannel::Global, "/pos"),
            Some(ChatCommand::Pos(String::new()))
        );
    }

    #[test]
    fn test_chat_with_channel_prefix() {
        assert_eq!(
            ChatCommand::parse(ChatChannel::Team, "HUD_TEXT_CHAT_TEAM/ready"),
            Some(ChatCommand::Ready)
        );
    }

    #[test]
    fn test_chat_ignores_other_text() {
        assert_eq!(ChatCommand::parse(ChatChannel::Global, "ready"), None);
        assert_eq!(ChatCommand::parse(ChatChannel::Global, "/teleport"), None);
        assert_eq!(ChatCommand::parse(ChatChannel::Global, ""), None);
        assert_eq!(ChatCommand::parse(ChatChannel::Global, "/readyy"), None);
    }
}
