//! Analyzer configuration: header synonyms and weak-point thresholds.
//!
//! Defaults reproduce the canonical behavior. A YAML file may override any
//! subset of keys; omitted keys keep their defaults.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::resolver::Field;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub synonyms: Synonyms,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Synonyms {
    pub views: Vec<String>,
    pub likes: Vec<String>,
    pub comments: Vec<String>,
    pub ctr: Vec<String>,
    pub watch_time: Vec<String>,
    pub publish_time: Vec<String>,
}

impl Synonyms {
    pub fn candidates(&self, field: Field) -> &[String] {
        match field {
            Field::Views => &self.views,
            Field::Likes => &self.likes,
            Field::Comments => &self.comments,
            Field::Ctr => &self.ctr,
            Field::WatchTime => &self.watch_time,
            Field::PublishTime => &self.publish_time,
        }
    }
}

impl Default for Synonyms {
    fn default() -> Self {
        let owned = |field: Field| -> Vec<String> {
            field
                .default_candidates()
                .iter()
                .map(|c| c.to_string())
                .collect()
        };
        Self {
            views: owned(Field::Views),
            likes: owned(Field::Likes),
            comments: owned(Field::Comments),
            ctr: owned(Field::Ctr),
            watch_time: owned(Field::WatchTime),
            publish_time: owned(Field::PublishTime),
        }
    }
}

/// A metric strictly below its threshold is reported as a weak point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub ctr: f64,
    pub watch_time: f64,
    pub engagement: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            ctr: 5.0,
            watch_time: 30.0,
            engagement: 2.0,
        }
    }
}

impl AnalyzerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: AnalyzerConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config file {path:?}"))?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating config file {path:?}"))?;
        serde_yaml::to_writer(file, self)
            .with_context(|| format!("Writing config file {path:?}"))?;
        Ok(())
    }
}
