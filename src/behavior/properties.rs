use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use glam::{DVec2, Vec3};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::PropertyError;

/// Value type of a declared property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Float,
    Integer,
    Vector2,
    Color,
    Select(&'static [&'static str]),
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Float => f.write_str("float"),
            Self::Integer => f.write_str("integer"),
            Self::Vector2 => f.write_str("vector2"),
            Self::Color => f.write_str("color"),
            Self::Select(choices) => write!(f, "one of [{}]", choices.join(", ")),
        }
    }
}

/// Entry of a behavior's property sheet as shown to content authors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDef {
    pub name: &'static str,
    pub kind: PropertyKind,
    /// Default in the same textual form the scene file uses; `None` when
    /// the property has no default.
    pub default: Option<&'static str>,
    pub description: &'static str,
}

/// Raw property values attached to a behavior in the scene description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySheet {
    values: BTreeMap<String, String>,
}

impl PropertySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Logs every property that the behavior does not declare.
    pub fn warn_unknown(&self, behavior: &str, defs: &[PropertyDef]) {
        for name in self.values.keys() {
            if !defs.iter().any(|def| def.name == name.as_str()) {
                warn!("{behavior}: ignoring unknown property `{name}`");
            }
        }
    }

    /// Identifier-like value with surrounding whitespace removed.
    pub fn required_string(&self, name: &str) -> Result<String, PropertyError> {
        self.get(name)
            .map(|value| value.trim().to_string())
            .ok_or_else(|| PropertyError::Missing(name.to_string()))
    }

    pub fn string(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }

    pub fn f32(&self, name: &str) -> Result<Option<f32>, PropertyError> {
        self.parse_with(name, "a number", |value| value.parse::<f32>().ok())
    }

    pub fn f64(&self, name: &str) -> Result<Option<f64>, PropertyError> {
        self.parse_with(name, "a number", |value| value.parse::<f64>().ok())
    }

    pub fn u32(&self, name: &str) -> Result<Option<u32>, PropertyError> {
        self.parse_with(name, "an integer", |value| value.parse::<u32>().ok())
    }

    pub fn vec2(&self, name: &str) -> Result<Option<DVec2>, PropertyError> {
        self.parse_with(name, "two numbers", |value| {
            let [x, y] = parse_components::<f64, 2>(value)?;
            Some(DVec2::new(x, y))
        })
    }

    pub fn vec3(&self, name: &str) -> Result<Option<Vec3>, PropertyError> {
        self.parse_with(name, "three numbers", |value| {
            let [x, y, z] = parse_components::<f32, 3>(value)?;
            Some(Vec3::new(x, y, z))
        })
    }

    pub fn choice<T>(&self, name: &str) -> Result<Option<T>, PropertyError>
    where
        T: FromStr<Err = PropertyError>,
    {
        self.get(name).map(|value| value.parse::<T>()).transpose()
    }

    fn parse_with<T>(
        &self,
        name: &str,
        expected: &'static str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<Option<T>, PropertyError> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        parse(value.trim())
            .map(Some)
            .ok_or_else(|| PropertyError::Malformed {
                name: name.to_string(),
                expected,
                value: value.to_string(),
            })
    }
}

fn parse_components<T, const N: usize>(value: &str) -> Option<[T; N]>
where
    T: FromStr + Default + Copy,
{
    let mut out = [T::default(); N];
    let mut numbers = value.split_whitespace().map(str::parse::<T>);
    for slot in out.iter_mut() {
        *slot = numbers.next()?.ok()?;
    }
    numbers.next().is_none().then_some(out)
}
