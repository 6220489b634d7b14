//! User-authored business rules forwarded into repair prompts.
//!
//! Rules are never executed by the validation engine. They carry a scope
//! (one table or all of them), an optional field, a priority from 1 to 10
//! and a free-text instruction that is passed to the oracle verbatim.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sheet_model::EntityType;

use crate::error::{RepairError, Result};

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 10;

/// Which tables a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RuleScope {
    All,
    Entity(EntityType),
}

impl RuleScope {
    pub fn applies_to(self, entity: EntityType) -> bool {
        match self {
            Self::All => true,
            Self::Entity(scope) => scope == entity,
        }
    }
}

impl fmt::Display for RuleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Entity(entity) => write!(f, "{entity}"),
        }
    }
}

impl FromStr for RuleScope {
    type Err = RepairError;

    fn from_str(value: &str) -> Result<Self> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        value
            .parse::<EntityType>()
            .map(Self::Entity)
            .map_err(|_| RepairError::InvalidScope(value.to_string()))
    }
}

impl TryFrom<String> for RuleScope {
    type Error = RepairError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RuleScope> for String {
    fn from(scope: RuleScope) -> Self {
        scope.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub scope: RuleScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub rule: String,
    pub is_active: bool,
    pub priority: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when authoring a rule; id and timestamps are assigned.
#[derive(Debug, Clone)]
pub struct NewRule {
    pub name: String,
    pub description: String,
    pub scope: RuleScope,
    pub field: Option<String>,
    pub rule: String,
    pub is_active: bool,
    pub priority: u8,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct RuleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub scope: Option<RuleScope>,
    pub field: Option<Option<String>>,
    pub rule: Option<String>,
    pub is_active: Option<bool>,
    pub priority: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCategory {
    pub id: String,
    pub name: String,
    pub description: String,
    pub color: String,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// The persisted collection of rules and categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleBook {
    #[serde(default)]
    pub rules: Vec<BusinessRule>,
    #[serde(default = "default_categories")]
    pub categories: Vec<RuleCategory>,
}

impl Default for RuleBook {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            categories: default_categories(),
        }
    }
}

impl RuleBook {
    /// A book with no rules and the default categories.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            categories: default_categories(),
        }
    }

    pub fn rule(&self, id: &str) -> Option<&BusinessRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn add_rule(&mut self, new: NewRule) -> Result<&BusinessRule> {
        check_priority(new.priority)?;
        let now = Utc::now();
        let id = next_id(now, |candidate| self.rule(candidate).is_some());
        self.rules.push(BusinessRule {
            id,
            name: new.name,
            description: new.description,
            scope: new.scope,
            field: new.field,
            rule: new.rule,
            is_active: new.is_active,
            priority: new.priority,
            created_at: now,
            updated_at: now,
        });
        let added = &self.rules[self.rules.len() - 1];
        tracing::debug!(id = %added.id, name = %added.name, "added business rule");
        Ok(added)
    }

    pub fn update_rule(&mut self, id: &str, update: RuleUpdate) -> Result<&BusinessRule> {
        if let Some(priority) = update.priority {
            check_priority(priority)?;
        }
        let rule = self.rule_mut(id)?;
        if let Some(name) = update.name {
            rule.name = name;
        }
        if let Some(description) = update.description {
            rule.description = description;
        }
        if let Some(scope) = update.scope {
            rule.scope = scope;
        }
        if let Some(field) = update.field {
            rule.field = field;
        }
        if let Some(text) = update.rule {
            rule.rule = text;
        }
        if let Some(active) = update.is_active {
            rule.is_active = active;
        }
        if let Some(priority) = update.priority {
            rule.priority = priority;
        }
        rule.updated_at = Utc::now();
        Ok(rule)
    }

    pub fn delete_rule(&mut self, id: &str) -> Result<BusinessRule> {
        let index = self
            .rules
            .iter()
            .position(|rule| rule.id == id)
            .ok_or_else(|| RepairError::RuleNotFound(id.to_string()))?;
        Ok(self.rules.remove(index))
    }

    /// Flip a rule's active flag, returning the new state.
    pub fn toggle_rule(&mut self, id: &str) -> Result<bool> {
        let rule = self.rule_mut(id)?;
        rule.is_active = !rule.is_active;
        rule.updated_at = Utc::now();
        Ok(rule.is_active)
    }

    /// Active rules relevant to `entity`, highest priority first.
    ///
    /// With no entity every active rule is returned. Rules of equal
    /// priority keep their book order.
    pub fn active_rules(&self, entity: Option<EntityType>) -> Vec<&BusinessRule> {
        let mut active: Vec<&BusinessRule> = self
            .rules
            .iter()
            .filter(|rule| rule.is_active)
            .filter(|rule| entity.is_none_or(|entity| rule.scope.applies_to(entity)))
            .collect();
        active.sort_by(|a, b| b.priority.cmp(&a.priority));
        active
    }

    pub fn category(&self, id: &str) -> Option<&RuleCategory> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn add_category(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        color: impl Into<String>,
    ) -> &RuleCategory {
        let id = next_id(Utc::now(), |candidate| self.category(candidate).is_some());
        self.categories.push(RuleCategory {
            id,
            name: name.into(),
            description: description.into(),
            color: color.into(),
        });
        &self.categories[self.categories.len() - 1]
    }

    pub fn update_category(&mut self, id: &str, update: CategoryUpdate) -> Result<&RuleCategory> {
        let category = self
            .categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or_else(|| RepairError::CategoryNotFound(id.to_string()))?;
        if let Some(name) = update.name {
            category.name = name;
        }
        if let Some(description) = update.description {
            category.description = description;
        }
        if let Some(color) = update.color {
            category.color = color;
        }
        Ok(category)
    }

    pub fn delete_category(&mut self, id: &str) -> Result<RuleCategory> {
        let index = self
            .categories
            .iter()
            .position(|category| category.id == id)
            .ok_or_else(|| RepairError::CategoryNotFound(id.to_string()))?;
        Ok(self.categories.remove(index))
    }

    fn rule_mut(&mut self, id: &str) -> Result<&mut BusinessRule> {
        self.rules
            .iter_mut()
            .find(|rule| rule.id == id)
            .ok_or_else(|| RepairError::RuleNotFound(id.to_string()))
    }
}

fn check_priority(priority: u8) -> Result<()> {
    if (MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        Ok(())
    } else {
        Err(RepairError::InvalidPriority(priority))
    }
}

/// Millisecond timestamp id, bumped until it is unused.
fn next_id(now: DateTime<Utc>, taken: impl Fn(&str) -> bool) -> String {
    let mut millis = now.timestamp_millis();
    loop {
        let candidate = millis.to_string();
        if !taken(&candidate) {
            return candidate;
        }
        millis += 1;
    }
}

pub fn default_rules() -> Vec<BusinessRule> {
    let now = Utc::now();
    [
        (
            "1",
            "Client Priority Validation",
            "Ensure client priority levels are between 1-5",
            EntityType::Clients,
            "PriorityLevel",
            "Priority levels must be between 1 and 5. If outside this range, set to 3 as default.",
            8,
        ),
        (
            "2",
            "Worker Skills Format",
            "Ensure worker skills are properly formatted as comma-separated values",
            EntityType::Workers,
            "Skills",
            "Skills should be comma-separated. If semicolons are used, convert to commas. Remove any empty entries.",
            6,
        ),
        (
            "3",
            "Task Duration Validation",
            "Ensure task durations are positive numbers",
            EntityType::Tasks,
            "Duration",
            "Task duration must be a positive number. If zero or negative, set to 1 as minimum.",
            7,
        ),
    ]
    .into_iter()
    .map(
        |(id, name, description, entity, field, rule, priority)| BusinessRule {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            scope: RuleScope::Entity(entity),
            field: Some(field.to_string()),
            rule: rule.to_string(),
            is_active: true,
            priority,
            created_at: now,
            updated_at: now,
        },
    )
    .collect()
}

pub fn default_categories() -> Vec<RuleCategory> {
    [
        (
            "data-quality",
            "Data Quality",
            "Rules for ensuring data accuracy and consistency",
            "#3B82F6",
        ),
        (
            "business-logic",
            "Business Logic",
            "Rules based on business requirements and constraints",
            "#10B981",
        ),
        (
            "formatting",
            "Formatting",
            "Rules for data formatting and presentation",
            "#F59E0B",
        ),
        (
            "validation",
            "Validation",
            "Rules for data validation and integrity",
            "#EF4444",
        ),
    ]
    .into_iter()
    .map(|(id, name, description, color)| RuleCategory {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        color: color.to_string(),
    })
    .collect()
}
