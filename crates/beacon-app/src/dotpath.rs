// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

pub const DOT_PATH_SEPARATOR: char = '@';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DotPathSource {
    #[default]
    Empty,
    Payload,
    Profile,
    Event,
    Session,
    Flow,
}

impl DotPathSource {
    pub const ALL: [Self; 6] = [
        Self::Empty,
        Self::Payload,
        Self::Profile,
        Self::Event,
        Self::Session,
        Self::Flow,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "",
            Self::Payload => "payload",
            Self::Profile => "profile",
            Self::Event => "event",
            Self::Session => "session",
            Self::Flow => "flow",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "" => Some(Self::Empty),
            "payload" => Some(Self::Payload),
            "profile" => Some(Self::Profile),
            "event" => Some(Self::Event),
            "session" => Some(Self::Session),
            "flow" => Some(Self::Flow),
            _ => None,
        }
    }

    pub fn rotate(self, delta: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let current = Self::ALL
            .iter()
            .position(|source| *source == self)
            .unwrap_or(0) as isize;
        Self::ALL[(current + delta).rem_euclid(len) as usize]
    }
}

/// A data source plus a nested property path, stored as `source@path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DotPath {
    pub source: DotPathSource,
    pub path: String,
}

impl DotPath {
    pub fn new(source: DotPathSource, path: impl Into<String>) -> Self {
        Self {
            source,
            path: path.into(),
        }
    }

    /// Splits at the first separator. Without a separator, or with a prefix
    /// that is not a known source, the whole value is the path.
    pub fn decode(raw: &str) -> Self {
        if let Some((source, path)) = raw.split_once(DOT_PATH_SEPARATOR)
            && let Some(source) = DotPathSource::parse(source)
        {
            return Self::new(source, path);
        }
        Self::new(DotPathSource::Empty, raw)
    }

    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            self.source.as_str(),
            DOT_PATH_SEPARATOR,
            self.path
        )
    }
}

impl fmt::Display for DotPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
