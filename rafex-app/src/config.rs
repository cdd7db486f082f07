use anyhow::{Context, Result, bail};
use rafex_core::TrialConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use toml::{Table, Value};

/// A session file: shared `[defaults]` and one `[[trials]]` entry per trial.
#[derive(Debug, Default, Deserialize)]
struct RawSession {
    #[serde(default)]
    defaults: Table,
    #[serde(default)]
    trials: Vec<Table>,
}

/// Reads the session file at `path`.
pub fn load(path: &Path) -> Result<Vec<TrialConfig>> {
    let raw = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    parse(&raw).with_context(|| format!("invalid session file {}", path.display()))
}

/// Parses a session file. Each trial is its `[[trials]]` entry laid over
/// `[defaults]`; nested tables are merged key by key.
pub fn parse(raw: &str) -> Result<Vec<TrialConfig>> {
    let session: RawSession = toml::from_str(raw)?;
    if session.trials.is_empty() {
        bail!("no [[trials]] entries");
    }
    session
        .trials
        .into_iter()
        .enumerate()
        .map(|(i, trial)| {
            let mut merged = session.defaults.clone();
            merge(&mut merged, trial);
            Value::Table(merged)
                .try_into::<TrialConfig>()
                .with_context(|| format!("trial {i}"))
        })
        .collect()
}

fn merge(base: &mut Table, over: Table) {
    for (key, value) in over {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(inner)), Value::Table(value)) => merge(inner, value),
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
