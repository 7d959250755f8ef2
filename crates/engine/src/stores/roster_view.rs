//! Read-only roster summaries for prompts, the REPL and the phrase interpreter.

use std::fmt;

use xhaven_domain::{
    Character, CharacterNumber, Condition, ConditionList, GameState, Monster, MonsterInstance,
    MonsterNumber, StandeeNumber,
};

/// The numbered roster at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterView {
    pub index: i64,
    pub round: Option<i32>,
    pub characters: Vec<CharacterSummary>,
    pub monsters: Vec<MonsterSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSummary {
    pub number: CharacterNumber,
    pub id: Option<String>,
    pub display: Option<String>,
    pub alias: Option<String>,
    pub label: String,
    pub initiative: Option<i32>,
    pub health: Option<i32>,
    pub max_health: Option<i32>,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonsterSummary {
    pub number: MonsterNumber,
    pub id: Option<String>,
    pub monster_type: Option<String>,
    pub alias: Option<String>,
    pub call_sign: Option<&'static str>,
    pub label: String,
    pub is_ally: bool,
    pub standees: Vec<StandeeSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandeeSummary {
    pub standee_nr: Option<StandeeNumber>,
    pub health: Option<i32>,
    pub max_health: Option<i32>,
    pub conditions: Vec<Condition>,
}

impl RosterView {
    pub fn from_state(state: &GameState, index: i64) -> Self {
        Self {
            index,
            round: state.session.round.value(),
            characters: state
                .roster
                .characters()
                .map(|(number, character)| CharacterSummary::new(number, character))
                .collect(),
            monsters: state
                .roster
                .monsters()
                .map(|(number, monster)| MonsterSummary::new(number, monster))
                .collect(),
        }
    }

    pub fn character(&self, number: CharacterNumber) -> Option<&CharacterSummary> {
        self.characters.iter().find(|c| c.number == number)
    }

    pub fn monster(&self, number: MonsterNumber) -> Option<&MonsterSummary> {
        self.monsters.iter().find(|m| m.number == number)
    }

    /// Comma-separated character labels, as announced in a toast.
    pub fn character_names(&self) -> String {
        self.characters
            .iter()
            .map(|c| c.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Comma-separated `call sign: label` pairs, as announced in a toast.
    pub fn monster_names(&self) -> String {
        self.monsters
            .iter()
            .map(|m| match m.call_sign {
                Some(sign) => format!("{}: {}", sign, m.label),
                None => m.label.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn conditions_of(list: Option<&ConditionList>) -> Vec<Condition> {
    list.map(|list| list.conditions().collect())
        .unwrap_or_default()
}

impl CharacterSummary {
    fn new(number: CharacterNumber, character: &Character) -> Self {
        let state = &character.character_state;
        Self {
            number,
            id: character.id.get().cloned(),
            display: state.display.get().cloned(),
            alias: character.alias.clone(),
            label: character.label().to_string(),
            initiative: state.initiative.value(),
            health: state.health.value(),
            max_health: state.max_health.value(),
            conditions: conditions_of(state.conditions.get()),
        }
    }

    /// Case-insensitive substring match on id, display label or alias.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        [
            self.id.as_deref(),
            self.display.as_deref(),
            self.alias.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|name| name.to_lowercase().contains(&query))
    }
}

impl MonsterSummary {
    fn new(number: MonsterNumber, monster: &Monster) -> Self {
        Self {
            number,
            id: monster.id.get().cloned(),
            monster_type: monster.monster_type.get().cloned(),
            alias: monster.alias.clone(),
            call_sign: monster.call_sign,
            label: monster.label().to_string(),
            is_ally: monster.is_ally.value().unwrap_or(false),
            standees: monster
                .monster_instances
                .iter()
                .map(StandeeSummary::new)
                .collect(),
        }
    }

    /// Case-insensitive substring match on id, type, alias or call sign.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        [
            self.id.as_deref(),
            self.monster_type.as_deref(),
            self.alias.as_deref(),
            self.call_sign,
        ]
        .into_iter()
        .flatten()
        .any(|name| name.to_lowercase().contains(&query))
    }
}

impl StandeeSummary {
    fn new(instance: &MonsterInstance) -> Self {
        Self {
            standee_nr: instance.standee_nr.value(),
            health: instance.health.value(),
            max_health: instance.max_health.value(),
            conditions: conditions_of(instance.conditions.get()),
        }
    }
}

fn health(f: &mut fmt::Formatter<'_>, health: Option<i32>, max: Option<i32>) -> fmt::Result {
    match (health, max) {
        (Some(h), Some(m)) => write!(f, "{}/{}", h, m),
        (Some(h), None) => write!(f, "{}", h),
        _ => f.write_str("?"),
    }
}

fn conditions(f: &mut fmt::Formatter<'_>, conditions: &[Condition]) -> fmt::Result {
    if conditions.is_empty() {
        return Ok(());
    }
    let names: Vec<_> = conditions.iter().map(|c| c.name()).collect();
    write!(f, " [{}]", names.join(", "))
}

impl fmt::Display for CharacterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{} {}", self.number, self.label)?;
        if let Some(initiative) = self.initiative {
            write!(f, " init {}", initiative)?;
        }
        f.write_str(" hp ")?;
        health(f, self.health, self.max_health)?;
        conditions(f, &self.conditions)
    }
}

impl fmt::Display for StandeeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.standee_nr {
            Some(nr) => write!(f, "#{} ", nr)?,
            None => f.write_str("#? ")?,
        }
        health(f, self.health, self.max_health)?;
        conditions(f, &self.conditions)
    }
}

impl fmt::Display for MonsterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{} {}", self.number, self.label)?;
        if let Some(sign) = self.call_sign {
            write!(f, " ({})", sign)?;
        }
        if self.is_ally {
            f.write_str(" ally")?;
        }
        if self.standees.is_empty() {
            return f.write_str(": no standees");
        }
        f.write_str(":")?;
        for standee in &self.standees {
            write!(f, " {};", standee)?;
        }
        Ok(())
    }
}

impl fmt::Display for RosterView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index {}", self.index)?;
        if let Some(round) = self.round {
            write!(f, ", round {}", round)?;
        }
        for character in &self.characters {
            write!(f, "\n  {}", character)?;
        }
        for monster in &self.monsters {
            write!(f, "\n  {}", monster)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xhaven_domain::NameTable;

    fn view() -> RosterView {
        let json = r#"{
            "round": 2,
            "currentList": [
                {"id": "Boneshaper", "characterState": {"display": "Boneshaper", "initiative": 12,
                 "health": 6, "maxHealth": 6, "conditions": [3]}},
                {"id": "Frost Demon", "type": "Frost Demon", "monsterInstances": [
                    {"standeeNr": 2, "health": 5, "maxHealth": 8}
                ]},
                {"id": "Blinkblade", "characterState": {"health": 10, "maxHealth": 10}}
            ]
        }"#;
        let mut state = GameState::from_json(json).unwrap().state;
        let mut names = NameTable::default();
        names
            .character_names
            .insert("Boneshaper".into(), "Bones".into());
        state.roster.apply_names(&names);
        RosterView::from_state(&state, 7)
    }

    #[test]
    fn numbers_follow_document_order_per_kind() {
        let view = view();
        assert_eq!(view.characters.len(), 2);
        assert_eq!(view.characters[1].id.as_deref(), Some("Blinkblade"));
        assert_eq!(view.characters[1].number, CharacterNumber::new(2));
        assert_eq!(view.monsters[0].number, MonsterNumber::new(1));
        assert_eq!(view.monsters[0].call_sign, Some("Adam"));
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let view = view();
        assert!(view.characters[0].matches("bones"));
        assert!(view.characters[0].matches("SHAPER"));
        assert!(view.monsters[0].matches("adam"));
        assert!(view.monsters[0].matches("demon"));
        assert!(!view.monsters[0].matches("guard"));
    }

    #[test]
    fn renders_one_line_per_entry() {
        let rendered = view().to_string();
        assert_eq!(
            rendered,
            "index 7, round 2\n  C1 Bones init 12 hp 6/6 [wound]\n  C2 Blinkblade hp 10/10\n  M1 Frost Demon (Adam): #2 5/8;"
        );
    }

    #[test]
    fn toast_name_lists() {
        let view = view();
        assert_eq!(view.character_names(), "Bones, Blinkblade");
        assert_eq!(view.monster_names(), "Adam: Frost Demon");
    }
}
