//! Layered configuration table and the merge engine
//!
//! A [`ConfigTable`] is an ordered stack of [`Layer`]s, lowest precedence
//! first. Lookups walk the stack from the top, so a key defined in several
//! layers resolves to the highest one. Within a layer the last write wins.

use super::mirror::{non_blank, EnvMirror};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use tabled::Tabled;
use tracing::debug;

/// Remove every double quote from a value.
///
/// Applied to every value written to a table so lookups return normalized
/// text.
pub fn normalize_value(value: &str) -> String {
    value.replace('"', "")
}

/// Where a layer's values came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum Source {
    /// Caller-supplied defaults
    Defaults,
    /// A JSON settings file
    Json(PathBuf),
    /// A `.env` file
    Dotenv(PathBuf),
    /// The live environment at construction time
    Environment,
    /// Values written with `Resolver::set`
    Override,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Defaults => write!(f, "defaults"),
            Source::Json(path) => write!(f, "json ({})", path.display()),
            Source::Dotenv(path) => write!(f, "dotenv ({})", path.display()),
            Source::Environment => write!(f, "environment"),
            Source::Override => write!(f, "override"),
        }
    }
}

/// Values contributed by a single source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    source: Source,
    values: BTreeMap<String, String>,
}

impl Layer {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            values: BTreeMap::new(),
        }
    }

    /// Build a layer from pairs in order; later duplicates replace earlier ones.
    pub fn from_pairs<I, K, V>(source: Source, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut layer = Self::new(source);
        for (key, value) in pairs {
            layer.insert(key, value.as_ref());
        }
        layer
    }

    /// Insert a normalized value, returning the one it replaced.
    pub fn insert<K: Into<String>>(&mut self, key: K, value: &str) -> Option<String> {
        self.values.insert(key.into(), normalize_value(value))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A resolved key with its winning value and source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ResolvedEntry {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: Source,
}

/// Ordered stack of layers, lowest precedence first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigTable {
    layers: Vec<Layer>,
}

impl ConfigTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a layer above every existing one.
    pub fn push_layer(&mut self, layer: Layer) {
        debug!("Adding {} layer with {} entries", layer.source, layer.len());
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Winning value and source for `key`.
    pub fn resolve(&self, key: &str) -> Option<(&str, &Source)> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.get(key).map(|value| (value, &layer.source)))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.resolve(key).map(|(value, _)| value)
    }

    pub fn source_of(&self, key: &str) -> Option<&Source> {
        self.resolve(key).map(|(_, source)| source)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.layers.iter().any(|layer| layer.contains_key(key))
    }

    /// Every key defined in any layer, sorted.
    pub fn keys(&self) -> BTreeSet<&str> {
        self.layers
            .iter()
            .flat_map(|layer| layer.iter().map(|(key, _)| key))
            .collect()
    }

    /// Winning entry for every key, sorted by key.
    pub fn entries(&self) -> Vec<ResolvedEntry> {
        self.keys()
            .into_iter()
            .filter_map(|key| {
                self.resolve(key).map(|(value, source)| ResolvedEntry {
                    key: key.to_string(),
                    value: value.to_string(),
                    source: source.clone(),
                })
            })
            .collect()
    }

    /// Write `value` into the override layer at the top of the stack,
    /// creating it on first use. Returns the previously resolved value.
    pub fn set_override(&mut self, key: &str, value: &str) -> Option<String> {
        let previous = self.get(key).map(str::to_string);

        let needs_layer =
            !matches!(self.layers.last(), Some(layer) if layer.source == Source::Override);
        if needs_layer {
            self.layers.push(Layer::new(Source::Override));
        }
        if let Some(layer) = self.layers.last_mut() {
            layer.insert(key, value);
        }

        previous
    }

    /// Propagate every winning value into `mirror`.
    ///
    /// Keys won by the environment layer already hold that value and are
    /// left untouched.
    pub fn mirror_into(&self, mirror: &dyn EnvMirror) {
        let mut written = 0usize;
        for key in self.keys() {
            if let Some((value, source)) = self.resolve(key) {
                if *source != Source::Environment {
                    mirror.set(key, value);
                    written += 1;
                }
            }
        }
        debug!("Mirrored {} resolved values into the environment", written);
    }
}

/// Inputs to [`merge`], one field per source kind.
#[derive(Debug, Clone, Default)]
pub struct MergeInputs {
    /// Caller-supplied defaults
    pub defaults: Vec<(String, String)>,
    /// JSON files, lowest precedence first
    pub json: Vec<(PathBuf, BTreeMap<String, String>)>,
    /// The `.env` file and its pairs in file order
    pub dotenv: Option<(PathBuf, Vec<(String, String)>)>,
}

/// Combine sources into one table.
///
/// Precedence, lowest first: defaults, JSON files in the order given, the
/// `.env` file, then the live environment. The environment layer only holds
/// keys some lower layer defines and whose live value is not blank; other
/// variables stay reachable through the resolver's live lookup.
pub fn merge(inputs: MergeInputs, live_env: &dyn EnvMirror) -> ConfigTable {
    let mut table = ConfigTable::new();

    table.push_layer(Layer::from_pairs(Source::Defaults, inputs.defaults));

    for (path, values) in inputs.json {
        table.push_layer(Layer::from_pairs(Source::Json(path), values));
    }

    if let Some((path, pairs)) = inputs.dotenv {
        table.push_layer(Layer::from_pairs(Source::Dotenv(path), pairs));
    }

    let live: Vec<(String, String)> = table
        .keys()
        .into_iter()
        .filter_map(|key| non_blank(live_env, key).map(|value| (key.to_string(), value)))
        .collect();
    table.push_layer(Layer::from_pairs(Source::Environment, live));

    table
}
