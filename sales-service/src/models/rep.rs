//! Sales representative model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sales representative with the monthly quota set by an administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRep {
    pub id: String,
    pub name: String,
    pub monthly_target: Option<Decimal>,
}

impl SalesRep {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            monthly_target: None,
        }
    }

    pub fn with_target(mut self, target: Decimal) -> Self {
        self.monthly_target = Some(target);
        self
    }

    /// Effective target; absent or negative quotas count as zero.
    pub fn target(&self) -> Decimal {
        self.monthly_target
            .filter(|t| *t > Decimal::ZERO)
            .unwrap_or(Decimal::ZERO)
    }
}
