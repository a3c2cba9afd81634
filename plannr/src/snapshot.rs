use std::fs;

use anyhow::Context;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::data::{Calendar, Event};

/// The events and calendars handed over by the UI, as one JSON document.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub calendars: Vec<Calendar>,
}

impl Snapshot {
    pub fn from_file(path: &Utf8Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path.as_std_path())
            .with_context(|| format!("couldn't read `{path}`"))?;
        Self::from_json(&data).with_context(|| format!("couldn't parse `{path}`"))
    }

    pub fn from_json(data: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
