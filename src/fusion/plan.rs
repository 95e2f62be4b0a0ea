//! Query plans: the ordered set of variants retrieved for one request.

use serde::{Deserialize, Serialize};

use crate::query::Query;

/// One unit of a plan: a unit query plus its expansion variants.
///
/// Variant order is retrieval priority order: the unit itself first, then
/// its step-back restatement, then its paraphrases. The variant set has set
/// semantics over query text: a variant that duplicates an earlier one
/// (e.g. a step-back stage that fell back to the original) is not added,
/// since retrieving the same text twice buys nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanUnit {
    queries: Vec<Query>,
}

impl PlanUnit {
    /// Create a unit with no expansions yet.
    pub fn new(unit: Query) -> Self {
        Self {
            queries: vec![unit],
        }
    }

    /// Append an expansion variant. Returns false (and drops the variant)
    /// when its text is already present in this unit.
    pub fn push(&mut self, query: Query) -> bool {
        if self.queries.iter().any(|q| q.text() == query.text()) {
            return false;
        }
        self.queries.push(query);
        true
    }

    /// The unit query itself.
    pub fn unit(&self) -> &Query {
        &self.queries[0]
    }

    /// All queries of this unit in priority order.
    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    /// Number of queries in this unit (the unit plus its variants).
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// A unit always contains at least its own query.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// The ordered set of queries retrieved for a single request.
///
/// Built once per request and discarded after retrieval; it has no
/// persistence beyond the request that created it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    units: Vec<PlanUnit>,
}

impl QueryPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit; units keep their insertion order.
    pub fn push_unit(&mut self, unit: PlanUnit) {
        self.units.push(unit);
    }

    /// Units in plan order.
    pub fn units(&self) -> &[PlanUnit] {
        &self.units
    }

    /// True when the request decomposed into more than one unit.
    pub fn is_compound(&self) -> bool {
        self.units.len() > 1
    }

    /// All queries across all units, in retrieval priority order.
    pub fn queries(&self) -> impl Iterator<Item = &Query> {
        self.units.iter().flat_map(|unit| unit.queries().iter())
    }

    /// Total number of queries across all units.
    pub fn len(&self) -> usize {
        self.units.iter().map(PlanUnit::len).sum()
    }

    /// True when the plan holds no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Owned flattened copy of the plan, for the observability surface.
    pub fn to_queries(&self) -> Vec<Query> {
        self.queries().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryOrigin;

    #[test]
    fn test_unit_priority_order() {
        let original = Query::user("what is rust?");
        let mut unit = PlanUnit::new(original.clone());
        assert!(unit.push(Query::step_back("what are programming languages?", &original)));
        assert!(unit.push(Query::paraphrase("explain the rust language", &original)));

        let origins: Vec<_> = unit.queries().iter().map(|q| q.origin()).collect();
        assert_eq!(
            origins,
            vec![
                QueryOrigin::User,
                QueryOrigin::StepBack,
                QueryOrigin::MultiQuery
            ]
        );
    }

    #[test]
    fn test_duplicate_text_not_added() {
        let original = Query::user("what is rust?");
        let mut unit = PlanUnit::new(original.clone());
        assert!(!unit.push(Query::step_back("what is rust?", &original)));
        assert_eq!(unit.len(), 1);
    }

    #[test]
    fn test_plan_flattening_keeps_unit_order() {
        let original = Query::user("compare rust and go");
        let first = Query::sub_query("rust overview", &original);
        let second = Query::sub_query("go overview", &original);

        let mut plan = QueryPlan::new();
        let mut unit_a = PlanUnit::new(first.clone());
        unit_a.push(Query::paraphrase("about rust", &first));
        plan.push_unit(unit_a);
        plan.push_unit(PlanUnit::new(second.clone()));

        let texts: Vec<_> = plan.queries().map(Query::text).collect();
        assert_eq!(texts, vec!["rust overview", "about rust", "go overview"]);
        assert_eq!(plan.len(), 3);
        assert!(plan.is_compound());
    }

    #[test]
    fn test_single_unit_plan_is_not_compound() {
        let mut plan = QueryPlan::new();
        plan.push_unit(PlanUnit::new(Query::user("one question")));
        assert!(!plan.is_compound());
    }
}
