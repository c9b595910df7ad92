//! Declarative stat computation. A registry is an ordered list of named
//! definitions evaluated sequentially over one raw log record; each definition
//! sees only the stats computed before it, so registration order is a hard
//! dependency order. Reading a not-yet-computed stat, a duplicate name, or a
//! missing raw field is a configuration error and fails the run immediately.

use std::fmt;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::model::{ClassType, GameResult, Team};

pub type LogId = u64;

/// A single computed scalar. Closed set: every stat a definition can produce
/// is one of these shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum StatScalar {
    Number(f64),
    Side(Team),
    /// `None` means the match had no winner (equal scores).
    WinningSide(Option<Team>),
    Role(ClassType),
    Outcome(GameResult),
}

impl StatScalar {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StatScalar::Number(v) => Some(*v),
            _ => None,
        }
    }
}

/// A computed value with full provenance: which definition produced it and
/// from which log.
#[derive(Debug, Clone, PartialEq)]
pub struct StatValue {
    pub name: String,
    pub value: StatScalar,
    pub log_id: LogId,
}

type ComputeFn = Box<dyn Fn(&StatSet, &Value) -> Result<StatScalar> + Send + Sync>;

pub struct StatDefinition {
    pub name: &'static str,
    compute: ComputeFn,
}

impl StatDefinition {
    pub fn new(
        name: &'static str,
        compute: impl Fn(&StatSet, &Value) -> Result<StatScalar> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            compute: Box::new(compute),
        }
    }

    /// A plain extractor: read one numeric field straight out of the raw record.
    pub fn raw_number(name: &'static str, field: &'static str) -> Self {
        Self::new(name, move |_, raw| {
            let value = raw
                .get(field)
                .and_then(Value::as_f64)
                .with_context(|| format!("raw field `{field}` missing or not numeric"))?;
            Ok(StatScalar::Number(value))
        })
    }

    pub fn calc_value(&self, log_id: LogId, prior: &StatSet, raw: &Value) -> Result<StatValue> {
        let value = (self.compute)(prior, raw)
            .with_context(|| format!("stat definition `{}` failed", self.name))?;
        Ok(StatValue {
            name: self.name.to_string(),
            value,
            log_id,
        })
    }
}

impl fmt::Debug for StatDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatDefinition")
            .field("name", &self.name)
            .finish()
    }
}

/// Insertion-ordered stat accumulator. During evaluation it only ever holds
/// the results of earlier definitions, which is what enforces the
/// no-forward-reference invariant by construction.
#[derive(Debug, Clone, Default)]
pub struct StatSet {
    values: Vec<StatValue>,
}

impl StatSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: StatValue) -> Result<()> {
        if self.values.iter().any(|v| v.name == value.name) {
            bail!("duplicate stat definition `{}`", value.name);
        }
        self.values.push(value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&StatValue> {
        self.values.iter().find(|v| v.name == name).with_context(|| {
            format!("stat `{name}` not computed yet; definitions may only read earlier entries")
        })
    }

    pub fn number(&self, name: &str) -> Result<f64> {
        match &self.get(name)?.value {
            StatScalar::Number(v) => Ok(*v),
            other => bail!("stat `{name}` is not a number: {other:?}"),
        }
    }

    pub fn side(&self, name: &str) -> Result<Team> {
        match &self.get(name)?.value {
            StatScalar::Side(team) => Ok(*team),
            other => bail!("stat `{name}` is not a side: {other:?}"),
        }
    }

    pub fn winning_side(&self, name: &str) -> Result<Option<Team>> {
        match &self.get(name)?.value {
            StatScalar::WinningSide(team) => Ok(*team),
            other => bail!("stat `{name}` is not a winning side: {other:?}"),
        }
    }

    pub fn role(&self, name: &str) -> Result<ClassType> {
        match &self.get(name)?.value {
            StatScalar::Role(class) => Ok(*class),
            other => bail!("stat `{name}` is not a role: {other:?}"),
        }
    }

    pub fn outcome(&self, name: &str) -> Result<GameResult> {
        match &self.get(name)?.value {
            StatScalar::Outcome(result) => Ok(*result),
            other => bail!("stat `{name}` is not an outcome: {other:?}"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Rename every entry with a prefix. Used to hand game-level stats to the
    /// player registry without name clashes.
    pub fn into_prefixed(self, prefix: &str) -> Self {
        Self {
            values: self
                .values
                .into_iter()
                .map(|mut v| {
                    v.name = format!("{prefix}{}", v.name);
                    v
                })
                .collect(),
        }
    }
}

/// Evaluate a registry in registration order, threading the accumulator
/// through so each definition can read everything computed so far.
pub fn evaluate(
    defs: &[StatDefinition],
    log_id: LogId,
    raw: &Value,
    seed: StatSet,
) -> Result<StatSet> {
    let mut stats = seed;
    for def in defs {
        let value = def.calc_value(log_id, &stats, raw)?;
        stats.insert(value)?;
    }
    Ok(stats)
}
