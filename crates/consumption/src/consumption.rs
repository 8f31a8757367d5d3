use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use resortstock_core::{ConsumptionId, Document, ItemId, RecipeId, ResortId, StoreId, UserId};

/// How the lines of a consumption are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionKind {
    /// Lines reference items directly; quantities are applied as given.
    Lumpsum,
    /// Lines reference recipes; one batch per line, quantity ignored.
    RecipeLumpsum,
    /// Lines reference recipes; ingredient quantities scale by line quantity.
    RecipePortion,
}

/// One consumption line. Which reference is read depends on the kind;
/// a line missing its reference (or with a non-positive quantity) is
/// skipped, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionLine {
    pub item: Option<ItemId>,
    pub recipe: Option<RecipeId>,
    pub qty: Decimal,
    pub remark: Option<String>,
}

impl ConsumptionLine {
    pub fn item(item: impl Into<ItemId>, qty: Decimal) -> Self {
        Self {
            item: Some(item.into()),
            recipe: None,
            qty,
            remark: None,
        }
    }

    pub fn recipe(recipe: RecipeId, qty: Decimal) -> Self {
        Self {
            item: None,
            recipe: Some(recipe),
            qty,
            remark: None,
        }
    }
}

/// A posted consumption record.
///
/// Stores what was asked for (`lines`) and what actually left the ledger
/// (`consumed`, positive quantities per item), plus how many lines the skip
/// policy dropped. Created only by the engine, after the ledger batch
/// committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumption {
    id: ConsumptionId,
    number: String,
    kind: ConsumptionKind,
    resort: ResortId,
    store: StoreId,
    lines: Vec<ConsumptionLine>,
    consumed: Vec<(ItemId, Decimal)>,
    skipped_lines: u32,
    posted_by: UserId,
    posted_at: DateTime<Utc>,
}

impl Consumption {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: ConsumptionId,
        number: String,
        kind: ConsumptionKind,
        resort: ResortId,
        store: StoreId,
        lines: Vec<ConsumptionLine>,
        consumed: Vec<(ItemId, Decimal)>,
        skipped_lines: u32,
        posted_by: UserId,
        posted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            number,
            kind,
            resort,
            store,
            lines,
            consumed,
            skipped_lines,
            posted_by,
            posted_at,
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn kind(&self) -> ConsumptionKind {
        self.kind
    }

    pub fn resort(&self) -> &ResortId {
        &self.resort
    }

    pub fn store(&self) -> &StoreId {
        &self.store
    }

    pub fn lines(&self) -> &[ConsumptionLine] {
        &self.lines
    }

    /// Positive per-item quantities that left the ledger.
    pub fn consumed(&self) -> &[(ItemId, Decimal)] {
        &self.consumed
    }

    pub fn skipped_lines(&self) -> u32 {
        self.skipped_lines
    }

    pub fn posted_by(&self) -> &UserId {
        &self.posted_by
    }

    pub fn posted_at(&self) -> DateTime<Utc> {
        self.posted_at
    }
}

impl Document for Consumption {
    type Id = ConsumptionId;

    fn id(&self) -> ConsumptionId {
        self.id
    }

    fn sequence_number(&self) -> &str {
        &self.number
    }
}
