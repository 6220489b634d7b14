//! The repair oracle boundary and the service that drives it.

use serde_json::Value;
use sheet_model::EntityType;
use sheet_validate::Workspace;

use crate::error::{OracleFailure, Result};
use crate::prompt::{PromptBuilder, RepairPrompt, lookup_row};
use crate::response::{
    Suggestion, normalize_response, parse_row, parse_suggestions, parse_table_rows,
};
use crate::review::RepairReview;
use crate::rules::RuleBook;

/// Produces a raw response for a repair prompt.
///
/// Implementations own transport, credentials and timeouts. The response
/// may be any JSON value, including a provider envelope or model text as a
/// JSON string.
pub trait RepairOracle {
    fn complete(&self, prompt: &RepairPrompt) -> std::result::Result<Value, OracleFailure>;
}

impl<F> RepairOracle for F
where
    F: Fn(&RepairPrompt) -> std::result::Result<Value, OracleFailure>,
{
    fn complete(&self, prompt: &RepairPrompt) -> std::result::Result<Value, OracleFailure> {
        self(prompt)
    }
}

/// Replays a previously captured response for every prompt.
#[derive(Debug, Clone)]
pub struct ReplayOracle {
    response: Value,
}

impl ReplayOracle {
    pub fn new(response: Value) -> Self {
        Self { response }
    }
}

impl RepairOracle for ReplayOracle {
    fn complete(&self, _prompt: &RepairPrompt) -> std::result::Result<Value, OracleFailure> {
        Ok(self.response.clone())
    }
}

/// Builds prompts from workspace state, calls the oracle and turns its
/// output into suggestions or reviews.
///
/// Unusable output is logged and reported as "nothing to suggest"; only
/// oracle failures and bad row indices are errors.
pub struct RepairService<'a, O> {
    oracle: O,
    prompts: PromptBuilder<'a>,
}

impl<'a, O: RepairOracle> RepairService<'a, O> {
    pub fn new(oracle: O, rules: &'a RuleBook) -> Self {
        Self {
            oracle,
            prompts: PromptBuilder::new(rules),
        }
    }

    /// Replacement values for one cell; empty when the oracle gave nothing usable.
    pub fn suggest_cell(
        &self,
        workspace: &Workspace,
        entity: EntityType,
        row_index: usize,
        field: &str,
    ) -> Result<Vec<Suggestion>> {
        let prompt = self.prompts.cell(workspace, entity, row_index, field)?;
        let suggestions = self
            .ask(&prompt)?
            .map(|payload| parse_suggestions(&payload))
            .unwrap_or_default();
        tracing::debug!(
            entity = %entity,
            row = row_index,
            field,
            count = suggestions.len(),
            "cell suggestions received"
        );
        Ok(suggestions)
    }

    pub fn fix_row(
        &self,
        workspace: &Workspace,
        entity: EntityType,
        row_index: usize,
    ) -> Result<Option<RepairReview>> {
        let prompt = self.prompts.row(workspace, entity, row_index)?;
        let Some(suggested) = self.ask(&prompt)?.as_ref().and_then(parse_row) else {
            tracing::warn!(entity = %entity, row = row_index, "oracle returned no usable row");
            return Ok(None);
        };
        let current = lookup_row(workspace, entity, row_index)?;
        Ok(Some(RepairReview::for_row(
            entity, row_index, current, suggested,
        )))
    }

    pub fn fix_table(
        &self,
        workspace: &Workspace,
        entity: EntityType,
    ) -> Result<Option<RepairReview>> {
        let prompt = self.prompts.table(workspace, entity)?;
        let Some(suggested) = self.ask(&prompt)?.as_ref().and_then(parse_table_rows) else {
            tracing::warn!(entity = %entity, "oracle returned no usable table");
            return Ok(None);
        };
        let review = RepairReview::for_table(entity, workspace.rows(entity), suggested);
        if !review.row_count_matches() {
            tracing::warn!(
                entity = %entity,
                expected = review.current_rows,
                actual = review.suggested_rows().len(),
                "suggested table changed the row count"
            );
        }
        Ok(Some(review))
    }

    fn ask(&self, prompt: &RepairPrompt) -> Result<Option<Value>> {
        let response = self.oracle.complete(prompt)?;
        Ok(normalize_response(response))
    }
}
