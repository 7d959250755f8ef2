//! Value objects - Immutable objects defined by their attributes

mod condition;
mod field;
mod health;
mod names;

pub use condition::{Condition, ConditionList, ConditionToggle};
pub use field::Field;
pub use health::{HealthChange, HealthUpdate};
pub use names::{call_sign, NameTable, CALL_SIGNS};
