//! Entity and attribute re-identification scoring
//!
//! Assignment edges form a bipartite graph between encoded-side and
//! plaintext-side nodes. Each connected component is classified by the
//! sizes of its two sides (`1-1`, `1-m`, `m-1`, `m-m`) and, unless every
//! encoded node in it is correctly linked, suffixed `-p` (some correct) or
//! `-w` (none correct).
//!
//! Entity scoring uses record ids on both sides. Attribute scoring uses the
//! encoded bit vectors against the guessed values.

use super::union_find::UnionFind;
use crate::core::attack::AssignmentEdge;
use crate::domain::{BitVector, RecordId};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

/// Component shape by side sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Shape {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl Shape {
    pub const ALL: [Shape; 4] = [
        Shape::OneToOne,
        Shape::OneToMany,
        Shape::ManyToOne,
        Shape::ManyToMany,
    ];

    fn of(encoded: usize, plaintext: usize) -> Self {
        match (encoded > 1, plaintext > 1) {
            (false, false) => Self::OneToOne,
            (false, true) => Self::OneToMany,
            (true, false) => Self::ManyToOne,
            (true, true) => Self::ManyToMany,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneToOne => "1-1",
            Self::OneToMany => "1-m",
            Self::ManyToOne => "m-1",
            Self::ManyToMany => "m-m",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// How many encoded nodes of a component are correctly linked
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Correctness {
    All,
    Partial,
    None,
}

impl Correctness {
    pub const ALL: [Correctness; 3] = [Correctness::All, Correctness::Partial, Correctness::None];

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::All => "",
            Self::Partial => "-p",
            Self::None => "-w",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Component counts per shape and correctness, plus the flat per-node tally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComponentSummary {
    buckets: [[usize; 3]; 4],
    correct_nodes: [usize; 4],
    wrong_nodes: usize,
    pub encoded_nodes: usize,
    pub plaintext_nodes: usize,
}

impl ComponentSummary {
    /// Number of components in one bucket
    pub fn bucket(&self, shape: Shape, correctness: Correctness) -> usize {
        self.buckets[shape.index()][correctness.index()]
    }

    /// Correctly linked encoded nodes in components of one shape
    pub fn correct_nodes(&self, shape: Shape) -> usize {
        self.correct_nodes[shape.index()]
    }

    /// Wrongly linked encoded nodes over all components
    pub fn wrong_nodes(&self) -> usize {
        self.wrong_nodes
    }

    /// Total number of components
    pub fn components(&self) -> usize {
        self.buckets.iter().flatten().sum()
    }

    /// Bucket counts keyed by label, such as `1-m-p`
    pub fn labelled(&self) -> BTreeMap<String, usize> {
        let mut out = BTreeMap::new();
        for shape in Shape::ALL {
            for correctness in Correctness::ALL {
                out.insert(
                    format!("{}{}", shape.label(), correctness.suffix()),
                    self.bucket(shape, correctness),
                );
            }
        }
        out
    }

    /// Bucket counts in shape then correctness order, followed by the flat
    /// per-node tally (`single-<shape>` and `wrng`)
    pub fn columns(&self) -> Vec<(String, usize)> {
        let mut out = Vec::with_capacity(17);
        for shape in Shape::ALL {
            for correctness in Correctness::ALL {
                out.push((
                    format!("{}{}", shape.label(), correctness.suffix()),
                    self.bucket(shape, correctness),
                ));
            }
        }
        for shape in Shape::ALL {
            out.push((format!("single-{}", shape.label()), self.correct_nodes(shape)));
        }
        out.push(("wrng".to_string(), self.wrong_nodes));
        out
    }
}

impl Serialize for ComponentSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = self.columns();
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for (label, count) in &columns {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// Probability-of-suspicion statistics over correctly self-assigned records
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SuspicionStats {
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    pub median: f64,
    /// Records identified uniquely and correctly
    pub marketer: usize,
}

/// Scores of one reconstruction pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReidentificationScore {
    pub entity: ComponentSummary,
    pub attribute: ComponentSummary,
    pub suspicion: SuspicionStats,
    pub elapsed_secs: f64,
}

/// Groups a bipartite edge list into components and classifies them
///
/// `is_correct` decides, for an encoded node, whether it is correctly linked
/// given the plaintext nodes of its component.
pub fn classify_components<E, P>(
    edges: impl IntoIterator<Item = (E, P)>,
    is_correct: impl Fn(&E, &BTreeSet<&P>) -> bool,
) -> ComponentSummary
where
    E: Ord + Clone,
    P: Ord + Clone,
{
    let edges: Vec<(E, P)> = edges.into_iter().collect();
    let encoded: BTreeMap<&E, usize> = edges
        .iter()
        .map(|(e, _)| e)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(i, e)| (e, i))
        .collect();
    let plaintext: BTreeMap<&P, usize> = edges
        .iter()
        .map(|(_, p)| p)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(i, p)| (p, i + encoded.len()))
        .collect();

    let mut uf = UnionFind::new(encoded.len() + plaintext.len());
    for (e, p) in &edges {
        uf.union(encoded[e], plaintext[p]);
    }

    let mut components: BTreeMap<usize, (Vec<&E>, BTreeSet<&P>)> = BTreeMap::new();
    for (&e, &idx) in &encoded {
        components.entry(uf.find(idx)).or_default().0.push(e);
    }
    for (&p, &idx) in &plaintext {
        components.entry(uf.find(idx)).or_default().1.insert(p);
    }

    let mut summary = ComponentSummary {
        encoded_nodes: encoded.len(),
        plaintext_nodes: plaintext.len(),
        ..Default::default()
    };

    for (enc_nodes, plain_nodes) in components.values() {
        let shape = Shape::of(enc_nodes.len(), plain_nodes.len());
        let correct = enc_nodes.iter().filter(|&&e| is_correct(e, plain_nodes)).count();
        let wrong = enc_nodes.len() - correct;
        let correctness = match (correct, wrong) {
            (_, 0) => Correctness::All,
            (0, _) => Correctness::None,
            _ => Correctness::Partial,
        };
        summary.buckets[shape.index()][correctness.index()] += 1;
        summary.correct_nodes[shape.index()] += correct;
        summary.wrong_nodes += wrong;
    }

    summary
}

/// Probability of suspicion of each encoded id linked to its own plaintext id
///
/// With `f` linked plaintext ids and population `m` it is
/// `(1/f - 1/m) / (1 - 1/m)`; a population of one makes every such link
/// certain.
pub fn suspicion_stats(
    assignments: &BTreeMap<&RecordId, BTreeSet<&RecordId>>,
    population: usize,
) -> SuspicionStats {
    let m = population as f64;
    let mut values: Vec<f64> = assignments
        .iter()
        .filter(|(enc, plain)| plain.contains(*enc))
        .map(|(_, plain)| {
            let f = plain.len() as f64;
            if population <= 1 {
                1.0
            } else {
                ((1.0 / f) - (1.0 / m)) / (1.0 - 1.0 / m)
            }
        })
        .collect();

    if values.is_empty() {
        return SuspicionStats::default();
    }

    values.sort_by(f64::total_cmp);
    let n = values.len();
    let median = if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    };
    let marketer = assignments
        .iter()
        .filter(|(enc, plain)| plain.len() == 1 && plain.contains(*enc))
        .count();

    SuspicionStats {
        max: values[n - 1],
        min: values[0],
        mean: values.iter().sum::<f64>() / n as f64,
        median,
        marketer,
    }
}

/// Scores assignment edges at entity and attribute level
///
/// `population` is the number of plaintext records the guesses were drawn
/// from.
pub fn score(edges: &[AssignmentEdge], population: usize) -> ReidentificationScore {
    let started = Instant::now();

    let entity = classify_components(
        edges.iter().map(|e| (&e.encoded_id, &e.plaintext_id)),
        |enc, plain| plain.contains(enc),
    );

    let mut true_values: BTreeMap<&BitVector, BTreeSet<&str>> = BTreeMap::new();
    for e in edges {
        true_values
            .entry(&e.encoded_value)
            .or_default()
            .insert(e.true_value.as_str());
    }
    let attribute = classify_components(
        edges.iter().map(|e| (&e.encoded_value, e.guessed_value.as_str())),
        |enc, plain| {
            true_values
                .get(enc)
                .is_some_and(|truths| truths.iter().any(|t| plain.contains(t)))
        },
    );

    let mut assignments: BTreeMap<&RecordId, BTreeSet<&RecordId>> = BTreeMap::new();
    for e in edges {
        assignments
            .entry(&e.encoded_id)
            .or_default()
            .insert(&e.plaintext_id);
    }
    let suspicion = suspicion_stats(&assignments, population);

    let elapsed_secs = started.elapsed().as_secs_f64();
    tracing::info!(
        entity_components = entity.components(),
        attribute_components = attribute.components(),
        marketer = suspicion.marketer,
        mean_suspicion = format!("{:.3}", suspicion.mean),
        "Re-identification scoring complete"
    );

    ReidentificationScore {
        entity,
        attribute,
        suspicion,
        elapsed_secs,
    }
}
