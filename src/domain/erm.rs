//! ERM Combiner - merges the two one-sided cardinality edges of an entity pair
//!
//! Field scans see each side of an association separately (`Car.seats` gives Car→Seat
//! exactly-one-to-many, `Seat.car` gives Seat→Car exactly-one-to-unknown). A fixed table folds
//! such pairs into one edge. Pairs the table does not cover stay as they are and are reported.

use crate::domain::graph::RelationGraph;
use crate::domain::relation::{Cardinality, Relation, RelationKey, RelationKind};
use std::collections::BTreeMap;
use tracing::{debug, warn};

struct Rule {
    first: &'static [Cardinality],
    second: &'static [Cardinality],
    merged: Cardinality,
}

impl Rule {
    fn matches(&self, a: Cardinality, b: Cardinality) -> bool {
        self.first.contains(&a) && self.second.contains(&b)
    }
}

const TABLE: &[Rule] = &[
    Rule {
        first: &[Cardinality::ONE_TO_MANY],
        second: &[Cardinality::ONE_TO_UNKNOWN, Cardinality::MANY_TO_ONE],
        merged: Cardinality::ONE_TO_MANY,
    },
    Rule {
        first: &[Cardinality::ONE_TO_MANY, Cardinality::ONE_TO_ONE_OR_MANY],
        second: &[Cardinality::ONE_OR_MANY_TO_ONE],
        merged: Cardinality::ONE_TO_ONE_OR_MANY,
    },
    Rule {
        first: &[Cardinality::ONE_TO_ONE_OR_MANY],
        second: &[Cardinality::ONE_TO_UNKNOWN],
        merged: Cardinality::ONE_TO_ONE_OR_MANY,
    },
    Rule {
        first: &[Cardinality::ZERO_OR_ONE_TO_MANY, Cardinality::ONE_TO_MANY],
        second: &[Cardinality::ZERO_OR_ONE_TO_UNKNOWN],
        merged: Cardinality::ZERO_OR_ONE_TO_MANY,
    },
    Rule {
        first: &[Cardinality::ZERO_OR_ONE_TO_MANY],
        second: &[Cardinality::ONE_TO_UNKNOWN],
        merged: Cardinality::ZERO_OR_ONE_TO_MANY,
    },
    Rule {
        first: &[Cardinality::ZERO_OR_ONE_TO_ONE_OR_MANY, Cardinality::ONE_TO_ONE_OR_MANY],
        second: &[Cardinality::ZERO_OR_ONE_TO_UNKNOWN],
        merged: Cardinality::ZERO_OR_ONE_TO_ONE_OR_MANY,
    },
    Rule {
        first: &[Cardinality::ONE_TO_UNKNOWN],
        second: &[Cardinality::ONE_TO_UNKNOWN],
        merged: Cardinality::ONE_TO_ONE,
    },
    Rule {
        first: &[Cardinality::ONE_TO_UNKNOWN],
        second: &[Cardinality::ZERO_OR_ONE_TO_UNKNOWN],
        merged: Cardinality::ONE_TO_ZERO_OR_ONE,
    },
    Rule {
        first: &[Cardinality::ZERO_OR_ONE_TO_UNKNOWN],
        second: &[Cardinality::ZERO_OR_ONE_TO_UNKNOWN],
        merged: Cardinality::ZERO_OR_ONE_TO_ZERO_OR_ONE,
    },
    Rule {
        first: &[Cardinality::ONE_TO_MANY, Cardinality::ZERO_OR_ONE_TO_MANY],
        second: &[Cardinality::ONE_TO_MANY, Cardinality::ZERO_OR_ONE_TO_MANY],
        merged: Cardinality::MANY_TO_MANY,
    },
    Rule {
        first: &[Cardinality::ONE_TO_ONE_OR_MANY],
        second: &[Cardinality::ONE_TO_ONE_OR_MANY],
        merged: Cardinality::ONE_OR_MANY_TO_ONE_OR_MANY,
    },
];

fn lookup(a: Cardinality, b: Cardinality) -> Option<Cardinality> {
    TABLE.iter().find(|r| r.matches(a, b)).map(|r| r.merged)
}

/// Outcome of one combining pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombineReport {
    pub merged: usize,
    /// One line per pair the table could not merge
    pub unmatched: Vec<String>,
}

/// Merge complementary cardinality pairs in place.
pub fn combine(graph: &mut RelationGraph) -> CombineReport {
    let mut pairs: BTreeMap<(String, String), Vec<(RelationKey, Cardinality)>> = BTreeMap::new();
    for relation in graph.relations() {
        let (RelationKind::Cardinality(c), Some(source)) = (relation.kind, relation.source_type())
        else {
            continue;
        };
        let target = relation.target.as_str();
        let pair = if source <= target {
            (source.to_string(), target.to_string())
        } else {
            (target.to_string(), source.to_string())
        };
        pairs.entry(pair).or_default().push((relation.key(), c));
    }

    let mut report = CombineReport::default();
    for (pair, mut edges) in pairs {
        if edges.len() != 2 {
            continue;
        }
        edges.sort();
        let (first_key, first) = edges[0].clone();
        let (second_key, second) = edges[1].clone();

        let oriented = match lookup(first, second) {
            Some(merged) => Some((&first_key, merged)),
            None => lookup(second, first).map(|merged| (&second_key, merged)),
        };

        match oriented {
            Some((key, merged)) => {
                let source = key.from.name().to_string();
                let target = key.to.name().to_string();
                graph.remove(&first_key);
                graph.remove(&second_key);
                graph.insert(Relation::new(source, target, RelationKind::Cardinality(merged)));
                debug!(a = %pair.0, b = %pair.1, %merged, "Combined cardinality pair");
                report.merged += 1;
            }
            None => {
                let line = format!(
                    "cannot combine {} {} {} with {} {} {}",
                    first_key.from.name(),
                    first,
                    first_key.to.name(),
                    second_key.from.name(),
                    second,
                    second_key.to.name()
                );
                warn!("{line}");
                report.unmatched.push(line);
            }
        }
    }
    report
}
