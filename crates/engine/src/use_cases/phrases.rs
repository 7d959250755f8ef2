//! Spoken-phrase interpreter.
//!
//! Turns a transcribed phrase into a numbered [`Command`] by matching names
//! against the current roster:
//!
//! - `player <name> <initiative>` or `player <initiative> <name>`
//! - `monster <name> <standee> damage|minus <n>`
//! - `monster <name> <standee> plus|heal <n>`
//! - `monster <name> <standee> dead|death`
//! - `monster <name> <standee> <n>` sets health outright
//! - `monster <name> <standee> <condition>` adds a condition
//!
//! Monster names may be the type, id, alias or call sign (`Adam`, `Bertil`,
//! ...). Swedish keywords from the original voice setup are accepted too.

use xhaven_domain::{
    CharacterNumber, Condition, ConditionToggle, HealthChange, MonsterNumber, StandeeNumber,
};

use super::commands::{Command, CommandError};
use crate::stores::{RosterView, StoreError};

const DAMAGE_WORDS: &[&str] = &["damage", "minus", "skada"];
const HEAL_WORDS: &[&str] = &["plus", "heal", "hela"];
const DEATH_WORDS: &[&str] = &["dead", "death", "död", "döda"];

/// Spoken aliases for conditions that speech recognition garbles.
fn spoken_condition(word: &str) -> Option<Condition> {
    match word {
        "gift" | "poisin" => Some(Condition::Poison),
        _ => Condition::from_name(word),
    }
}

pub fn interpret(phrase: &str, roster: &RosterView) -> Result<Command, CommandError> {
    let words: Vec<String> = phrase
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect();
    let words: Vec<&str> = words.iter().map(String::as_str).collect();

    match words.as_slice() {
        ["player" | "spelare", rest @ ..] => player(rest, roster),
        ["monster", rest @ ..] => monster(rest, roster),
        _ => Err(CommandError::Parse(format!(
            "not a player or monster phrase: {:?}",
            phrase
        ))),
    }
}

fn player(words: &[&str], roster: &RosterView) -> Result<Command, CommandError> {
    let (name, initiative) = match words {
        [name, value] => match value.parse::<i32>() {
            Ok(initiative) => (*name, initiative),
            Err(_) => (*value, parse_int(name)?),
        },
        _ => {
            return Err(CommandError::Parse(
                "expected player <name> <initiative>".into(),
            ))
        }
    };

    Ok(Command::SetInitiative {
        character: resolve_character(name, roster)?,
        initiative,
    })
}

fn monster(words: &[&str], roster: &RosterView) -> Result<Command, CommandError> {
    let [name, standee, action, rest @ ..] = words else {
        return Err(CommandError::Parse(
            "expected monster <name> <standee> <action>".into(),
        ));
    };
    let monster = resolve_monster(name, roster)?;
    let standee = StandeeNumber::new(parse_int(standee)?);

    let adjust = |change: HealthChange| Command::AdjustMonster {
        monster,
        standee,
        change,
        condition: None,
    };

    let command = match (*action, rest) {
        (word, [amount]) if DAMAGE_WORDS.contains(&word) => {
            let damage = parse_int::<i32>(amount)?.checked_neg().ok_or_else(|| {
                CommandError::Parse(format!("damage out of range: {}", amount))
            })?;
            adjust(HealthChange::Relative(damage))
        }
        (word, [amount]) if HEAL_WORDS.contains(&word) => {
            adjust(HealthChange::Relative(parse_int(amount)?))
        }
        (word, []) if DEATH_WORDS.contains(&word) => adjust(HealthChange::Absolute(0)),
        (word, []) => match (word.parse::<i32>(), spoken_condition(word)) {
            (Ok(health), _) => adjust(HealthChange::Absolute(health)),
            (Err(_), Some(condition)) => Command::MonsterCondition {
                monster,
                standee,
                condition: condition.name().to_string(),
                toggle: ConditionToggle::Add,
            },
            (Err(_), None) => {
                return Err(CommandError::Parse(format!("unknown monster action {:?}", word)))
            }
        },
        (word, _) => {
            return Err(CommandError::Parse(format!(
                "unexpected words after {:?}",
                word
            )))
        }
    };
    Ok(command)
}

fn parse_int<T: std::str::FromStr>(word: &str) -> Result<T, CommandError> {
    word.parse()
        .map_err(|_| CommandError::Parse(format!("expected a number, got {:?}", word)))
}

/// First character whose names contain `name`.
pub fn resolve_character(name: &str, roster: &RosterView) -> Result<CharacterNumber, CommandError> {
    roster
        .characters
        .iter()
        .find(|c| c.matches(name))
        .map(|c| c.number)
        .ok_or_else(|| not_found("Character", name))
}

/// Exact call sign first, then the first monster whose names contain `name`.
pub fn resolve_monster(name: &str, roster: &RosterView) -> Result<MonsterNumber, CommandError> {
    roster
        .monsters
        .iter()
        .find(|m| m.call_sign.is_some_and(|sign| sign.eq_ignore_ascii_case(name)))
        .or_else(|| roster.monsters.iter().find(|m| m.matches(name)))
        .map(|m| m.number)
        .ok_or_else(|| not_found("Monster", name))
}

fn not_found(entity_type: &'static str, name: &str) -> CommandError {
    CommandError::Store(StoreError::NotFound {
        entity_type,
        id: name.to_string(),
    })
}
