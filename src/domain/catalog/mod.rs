//! Rules catalog domain: rule definitions, packs, and the latest pointer

mod entities;

pub use entities::{LatestPointerPayload, RuleDefinition, RulesLatestRecord, RulesPackPayload, RulesPackRecord};
