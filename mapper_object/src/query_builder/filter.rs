//! Predicate groups
//!
//! Every where call contributes one group; groups are always ANDed together
//! and the predicates inside a group use the join the call asked for.

use crate::condition::Predicate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

impl LogicalOperator {
    pub fn to_sql(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredicateGroup {
    pub predicates: Vec<Predicate>,
    pub join: LogicalOperator,
}

impl PredicateGroup {
    pub fn new(predicates: Vec<Predicate>, join: LogicalOperator) -> Self {
        Self { predicates, join }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}
