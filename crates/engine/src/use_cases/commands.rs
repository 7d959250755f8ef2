//! Tokenized commands and their dispatch to the state store.
//!
//! ```text
//! set-initiative(1, 35)
//! adjust-monster(2, 1, -3, true, p)
//! adjust-character(1, 8, false)
//! character-condition(1, w, add)
//! monster-condition(2, 1, poison, remove)
//! toast(Round two, watch out)
//! query-roster()
//! ```
//!
//! Slots are roster numbers, never names. Resolving names is the phrase
//! interpreter's job.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use xhaven_domain::{
    CharacterNumber, Condition, ConditionToggle, HealthChange, HealthUpdate, MonsterNumber,
    StandeeNumber,
};

use crate::stores::{RosterView, StateStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Invalid command: {0}")]
    Parse(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CommandError {
    fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetInitiative {
        character: CharacterNumber,
        initiative: i32,
    },
    AdjustMonster {
        monster: MonsterNumber,
        standee: StandeeNumber,
        change: HealthChange,
        /// Condition code or name, resolved by the store.
        condition: Option<String>,
    },
    AdjustCharacter {
        character: CharacterNumber,
        change: HealthChange,
    },
    CharacterCondition {
        character: CharacterNumber,
        condition: String,
        toggle: ConditionToggle,
    },
    MonsterCondition {
        monster: MonsterNumber,
        standee: StandeeNumber,
        condition: String,
        toggle: ConditionToggle,
    },
    Toast {
        message: String,
    },
    QueryRoster,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, rest) = s
            .split_once('(')
            .ok_or_else(|| CommandError::parse(format!("expected name(args), got {:?}", s)))?;
        let inner = rest
            .strip_suffix(')')
            .ok_or_else(|| CommandError::parse("missing closing parenthesis"))?;
        let name = name.trim().to_ascii_lowercase();

        if name == "toast" {
            return Ok(Self::Toast {
                message: inner.trim().to_string(),
            });
        }

        let args: Vec<&str> = if inner.trim().is_empty() {
            Vec::new()
        } else {
            inner.split(',').map(str::trim).collect()
        };

        match (name.as_str(), args.as_slice()) {
            ("set-initiative", [slot, value]) => Ok(Self::SetInitiative {
                character: number(slot, "character slot")?,
                initiative: number(value, "initiative")?,
            }),
            ("adjust-monster", [slot, standee, amount, relative, rest @ ..]) if rest.len() <= 1 => {
                Ok(Self::AdjustMonster {
                    monster: number(slot, "monster slot")?,
                    standee: number(standee, "standee")?,
                    change: HealthChange::new(number(amount, "amount")?, flag(relative)?),
                    condition: rest
                        .first()
                        .filter(|code| !code.is_empty())
                        .map(|code| code.to_string()),
                })
            }
            ("adjust-character", [slot, amount, relative]) => Ok(Self::AdjustCharacter {
                character: number(slot, "character slot")?,
                change: HealthChange::new(number(amount, "amount")?, flag(relative)?),
            }),
            ("character-condition", [slot, code, toggle]) => Ok(Self::CharacterCondition {
                character: number(slot, "character slot")?,
                condition: code.to_string(),
                toggle: toggle.parse().map_err(|e| CommandError::parse(format!("{}", e)))?,
            }),
            ("monster-condition", [slot, standee, code, toggle]) => Ok(Self::MonsterCondition {
                monster: number(slot, "monster slot")?,
                standee: number(standee, "standee")?,
                condition: code.to_string(),
                toggle: toggle.parse().map_err(|e| CommandError::parse(format!("{}", e)))?,
            }),
            ("query-roster", []) => Ok(Self::QueryRoster),
            (
                "set-initiative" | "adjust-monster" | "adjust-character" | "character-condition"
                | "monster-condition" | "query-roster",
                _,
            ) => Err(CommandError::parse(format!(
                "wrong number of arguments for {}",
                name
            ))),
            _ => Err(CommandError::parse(format!("unknown command {:?}", name))),
        }
    }
}

fn number<T: FromStr>(raw: &str, what: &str) -> Result<T, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::parse(format!("{} must be a number, got {:?}", what, raw)))
}

fn flag(raw: &str) -> Result<bool, CommandError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "relative" | "rel" | "1" => Ok(true),
        "false" | "absolute" | "abs" | "0" => Ok(false),
        _ => Err(CommandError::parse(format!(
            "expected true or false, got {:?}",
            raw
        ))),
    }
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Changed {
        index: i64,
        description: String,
    },
    MonsterHealth {
        index: i64,
        description: String,
        update: HealthUpdate,
        removed: bool,
    },
    Roster(RosterView),
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Changed { index, description } => write!(f, "[{}] {}", index, description),
            Self::MonsterHealth {
                index,
                description,
                update,
                ..
            } if update.was_clamped() && !update.is_depleted() => {
                write!(f, "[{}] {} (clamped)", index, description)
            }
            Self::MonsterHealth {
                index, description, ..
            } => write!(f, "[{}] {}", index, description),
            Self::Roster(view) => write!(f, "{}", view),
        }
    }
}

/// Runs parsed commands against the shared store.
pub struct ExecuteCommand {
    store: Arc<StateStore>,
}

impl ExecuteCommand {
    pub fn new(store: Arc<StateStore>) -> Self {
        Self { store }
    }

    pub fn execute(&self, command: Command) -> Result<CommandOutcome, CommandError> {
        tracing::debug!(command = ?command, "Executing command");
        let outcome = match command {
            Command::SetInitiative {
                character,
                initiative,
            } => {
                let mutation = self.store.set_initiative(character, initiative)?;
                changed(mutation.index, mutation.description)
            }
            Command::AdjustMonster {
                monster,
                standee,
                change,
                condition,
            } => {
                let mutation =
                    self.store
                        .adjust_monster(monster, standee, change, condition.as_deref())?;
                CommandOutcome::MonsterHealth {
                    index: mutation.index,
                    description: mutation.description,
                    update: mutation.detail.update,
                    removed: mutation.detail.removed,
                }
            }
            Command::AdjustCharacter { character, change } => {
                let mutation = self.store.adjust_character_health(character, change)?;
                changed(mutation.index, mutation.description)
            }
            Command::CharacterCondition {
                character,
                condition,
                toggle,
            } => {
                let condition = resolve_condition(&condition)?;
                let mutation = self
                    .store
                    .toggle_character_condition(character, condition, toggle)?;
                changed(mutation.index, mutation.description)
            }
            Command::MonsterCondition {
                monster,
                standee,
                condition,
                toggle,
            } => {
                let condition = resolve_condition(&condition)?;
                let mutation = self
                    .store
                    .toggle_monster_condition(monster, standee, condition, toggle)?;
                changed(mutation.index, mutation.description)
            }
            Command::Toast { message } => {
                let mutation = self.store.set_toast_message(&message)?;
                changed(mutation.index, mutation.description)
            }
            Command::QueryRoster => CommandOutcome::Roster(self.store.roster()),
        };
        Ok(outcome)
    }

    /// Parses and runs one line of command text.
    pub fn execute_text(&self, text: &str) -> Result<CommandOutcome, CommandError> {
        self.execute(text.parse()?)
    }
}

fn changed(index: i64, description: String) -> CommandOutcome {
    CommandOutcome::Changed { index, description }
}

fn resolve_condition(code: &str) -> Result<Condition, CommandError> {
    Condition::from_str(code).map_err(|e| CommandError::Store(e.into()))
}
