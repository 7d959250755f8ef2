//! Line-oriented operator console.
//!
//! ```text
//! q                 quit
//! i                 print the roster
//! h                 help
//! m / c             announce monster / character names as a toast
//! say <phrase>      run a spoken phrase, e.g. `say monster adam 2 damage 3`
//! ci <name> <n>     set a character's initiative by name
//! ch <name> <n>     set a character's health by name
//! <command>         any tokenized command, e.g. `set-initiative(1, 35)`
//! ```

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use xhaven_domain::HealthChange;

use crate::app::App;
use crate::use_cases::phrases::resolve_character;
use crate::use_cases::{interpret, Command, CommandError};

const PROMPT: &str = "> ";

const HELP: &str = "\
Available commands:
  q                 quit
  i                 print character and monster information
  h                 this help
  m                 announce monster names
  c                 announce character names
  say <phrase>      run a spoken phrase
  ci <name> <n>     set character initiative
  ch <name> <n>     set character health
  set-initiative(slot, value)
  adjust-monster(slot, standee, amount, relative[, condition])
  adjust-character(slot, amount, relative)
  character-condition(slot, code, add|remove)
  monster-condition(slot, standee, code, add|remove)
  toast(text)
  query-roster()";

/// What to do after one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Print(String),
    Quit,
}

pub struct Repl {
    app: Arc<App>,
}

impl Repl {
    pub fn new(app: Arc<App>) -> Self {
        Self { app }
    }

    /// Reads lines until `q`, end of input or cancellation.
    pub async fn run<R, W>(
        &self,
        input: R,
        mut output: W,
        cancel: CancellationToken,
    ) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let line = tokio::select! {
                _ = cancel.cancelled() => break,
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                break;
            };

            match self.handle_line(&line) {
                Reply::Quit => break,
                Reply::Print(text) if text.is_empty() => {}
                Reply::Print(text) => {
                    output.write_all(text.as_bytes()).await?;
                    output.write_all(b"\n").await?;
                }
            }
        }
        output.write_all(b"Exiting\n").await?;
        output.flush().await
    }

    pub fn handle_line(&self, line: &str) -> Reply {
        let line = line.trim();
        let reply = match line {
            "" => Ok(String::new()),
            "q" => return Reply::Quit,
            "h" => Ok(HELP.to_string()),
            "i" => Ok(self.app.store.roster().to_string()),
            "m" => self.announce_monsters(),
            "c" => self.announce_characters(),
            _ => self.dispatch(line),
        };

        match reply {
            Ok(text) => Reply::Print(text),
            Err(e) => {
                tracing::warn!(input = %line, error = %e, "Command failed");
                Reply::Print(format!("Error: {}", e))
            }
        }
    }

    fn dispatch(&self, line: &str) -> Result<String, CommandError> {
        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let command = match head {
            "say" => interpret(rest, &self.app.store.roster())?,
            "ci" => {
                let (name, initiative) = name_and_number(rest)?;
                Command::SetInitiative {
                    character: resolve_character(name, &self.app.store.roster())?,
                    initiative,
                }
            }
            "ch" => {
                let (name, health) = name_and_number(rest)?;
                Command::AdjustCharacter {
                    character: resolve_character(name, &self.app.store.roster())?,
                    change: HealthChange::Absolute(health),
                }
            }
            _ => line.parse()?,
        };
        self.execute(command)
    }

    fn announce_monsters(&self) -> Result<String, CommandError> {
        let roster = self.app.store.roster();
        let message = if roster.monsters.is_empty() {
            "There are no monsters".to_string()
        } else {
            format!("The monsters are: {}", roster.monster_names())
        };
        self.execute(Command::Toast { message })
    }

    fn announce_characters(&self) -> Result<String, CommandError> {
        let roster = self.app.store.roster();
        let message = if roster.characters.is_empty() {
            "There are no characters".to_string()
        } else {
            format!("The characters are: {}", roster.character_names())
        };
        self.execute(Command::Toast { message })
    }

    fn execute(&self, command: Command) -> Result<String, CommandError> {
        let outcome = self.app.use_cases.commands.execute(command)?;
        Ok(outcome.to_string())
    }
}

/// `<name words...> <number>`
fn name_and_number(args: &str) -> Result<(&str, i32), CommandError> {
    let (name, number) = args
        .trim()
        .rsplit_once(char::is_whitespace)
        .ok_or_else(|| CommandError::Parse("expected <name> <number>".into()))?;
    let number = number
        .parse()
        .map_err(|_| CommandError::Parse(format!("expected a number, got {:?}", number)))?;
    Ok((name.trim(), number))
}
