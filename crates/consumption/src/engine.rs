use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use resortstock_core::{
    ConsumptionId, Document, DocumentKind, DocumentStore, DomainResult, ItemId,
    NumberSequenceGenerator, ResortId, StoreId, UserId,
};
use resortstock_ledger::{AdjustmentBatch, StockEntry, StockKey, StockLedger};
use resortstock_recipes::{ExpansionMode, RecipeResolver, RecipeStore};

use crate::consumption::{Consumption, ConsumptionKind, ConsumptionLine};

/// Payload: a consumption to post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionDraft {
    pub kind: ConsumptionKind,
    pub resort: ResortId,
    pub store: StoreId,
    pub posted_by: UserId,
    pub lines: Vec<ConsumptionLine>,
}

/// Result of a successful posting.
#[derive(Debug, Clone)]
pub struct PostedConsumption {
    pub consumption: Consumption,
    /// Post-application ledger rows, one per touched key.
    pub entries: Vec<StockEntry>,
    pub skipped_lines: u32,
}

/// Validates and posts consumption events as ledger decrements.
///
/// Every line is resolved before anything is committed; the resulting
/// deltas go to the ledger as one batch, so a failing line leaves every
/// other line unapplied and no record behind.
pub struct ConsumptionEngine<C, S> {
    consumptions: C,
    resolver: RecipeResolver<S>,
    ledger: Arc<StockLedger>,
    sequences: Arc<NumberSequenceGenerator>,
}

impl<C, S> ConsumptionEngine<C, S>
where
    C: DocumentStore<Consumption>,
    S: RecipeStore,
{
    pub fn new(
        consumptions: C,
        resolver: RecipeResolver<S>,
        ledger: Arc<StockLedger>,
        sequences: Arc<NumberSequenceGenerator>,
    ) -> Self {
        Self {
            consumptions,
            resolver,
            ledger,
            sequences,
        }
    }

    /// Post a consumption.
    ///
    /// Skip policy: a line missing its reference for the draft's kind, or
    /// carrying a non-positive quantity, is skipped and counted — not an
    /// error. An unknown recipe reference IS an error (`RecipeNotFound`).
    pub fn post(&self, draft: ConsumptionDraft) -> DomainResult<PostedConsumption> {
        let id = ConsumptionId::new();
        let mut skipped = 0u32;
        let mut consumed: Vec<(ItemId, Decimal)> = Vec::new();

        for line in &draft.lines {
            if line.qty <= Decimal::ZERO {
                skipped += 1;
                continue;
            }
            match draft.kind {
                ConsumptionKind::Lumpsum => match &line.item {
                    Some(item) => consumed.push((item.clone(), line.qty)),
                    None => skipped += 1,
                },
                ConsumptionKind::RecipeLumpsum | ConsumptionKind::RecipePortion => {
                    let Some(recipe) = &line.recipe else {
                        skipped += 1;
                        continue;
                    };
                    let mode = match draft.kind {
                        ConsumptionKind::RecipePortion => ExpansionMode::Portion,
                        _ => ExpansionMode::Lumpsum,
                    };
                    consumed.extend(self.resolver.expand(recipe, line.qty, mode)?);
                }
            }
        }

        // One batch, token = consumption id: all lines or none, replays
        // cannot double-decrement.
        let mut batch = AdjustmentBatch::with_token(*id.as_uuid());
        for (item, qty) in &consumed {
            batch.push(
                StockKey::new(draft.resort.clone(), draft.store.clone(), item.clone()),
                -*qty,
            );
        }
        let applied = self.ledger.apply(batch)?;

        let consumption = Consumption::new(
            id,
            self.sequences.next(DocumentKind::Consumption),
            draft.kind,
            draft.resort,
            draft.store,
            draft.lines,
            consumed,
            skipped,
            draft.posted_by,
            Utc::now(),
        );
        self.consumptions.insert(consumption.clone())?;

        if skipped > 0 {
            warn!(id = %consumption.id(), skipped, "consumption lines skipped");
        }
        info!(
            id = %consumption.id(),
            number = consumption.sequence_number(),
            entries = applied.entries().len(),
            "consumption posted"
        );
        Ok(PostedConsumption {
            entries: applied.entries().to_vec(),
            skipped_lines: skipped,
            consumption,
        })
    }
}
