//! Endpoint syntax: one or more coordinates plus an optional main class.
//!
//! `org.example:app:1.0+org.example:plugin:1.0@org.example.Main` names two root
//! coordinates and the class to launch. The historical form without `@`, where the last
//! coordinate's trailing token is a class name (`org.example:app:1.0:org.example.Main`),
//! is still accepted.

use super::Coordinate;
use super::heuristics::{
    KNOWN_PACKAGINGS, looks_like_classifier, looks_like_main_class, looks_like_version,
};
use crate::core::MvnrError;
use std::fmt;
use std::str::FromStr;

/// Parsed endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub coordinates: Vec<Coordinate>,
    pub main_class: Option<String>,
}

impl Endpoint {
    /// Parse `coord(+coord)*[@MainClass]`.
    ///
    /// # Errors
    ///
    /// Fails if any coordinate is malformed or the main class is not a Java identifier.
    pub fn parse(text: &str) -> Result<Self, MvnrError> {
        let trimmed = text.trim();
        let (coordinates_text, explicit_main) = match trimmed.rsplit_once('@') {
            Some((coords, main)) => {
                let main = main.trim();
                if !looks_like_main_class(main) {
                    return Err(MvnrError::MalformedCoordinate {
                        coordinate: text.to_string(),
                        reason: format!("'{main}' is not a valid main class name"),
                    });
                }
                (coords, Some(main.to_string()))
            }
            None => (trimmed, None),
        };

        let segments: Vec<&str> = coordinates_text.split('+').map(str::trim).collect();
        let mut coordinates = Vec::with_capacity(segments.len());
        let mut main_class = explicit_main;

        for (index, segment) in segments.iter().enumerate() {
            let is_last = index + 1 == segments.len();
            if is_last && main_class.is_none() {
                if let Some((coordinate_text, class)) = split_trailing_main_class(segment) {
                    coordinates.push(Coordinate::parse(&coordinate_text)?);
                    main_class = Some(class);
                    continue;
                }
            }
            coordinates.push(Coordinate::parse(segment)?);
        }

        Ok(Self {
            coordinates,
            main_class,
        })
    }
}

/// Split off a trailing token that can only be a class name.
///
/// A raw marker (`!`) at the end stays with the coordinate.
fn split_trailing_main_class(segment: &str) -> Option<(String, String)> {
    let (body, raw) = match segment.strip_suffix('!') {
        Some(body) => (body, true),
        None => (segment, false),
    };
    let (head, last) = body.rsplit_once(':')?;
    // groupId:artifactId must remain
    if head.split(':').count() < 2 {
        return None;
    }
    let last = last.trim();
    let is_class = !looks_like_version(last)
        && !looks_like_classifier(last)
        && !KNOWN_PACKAGINGS.contains(&last.to_ascii_lowercase().as_str())
        && looks_like_main_class(last);
    if !is_class {
        return None;
    }
    let coordinate = if raw { format!("{head}!") } else { head.to_string() };
    Some((coordinate, last.to_string()))
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, coordinate) in self.coordinates.iter().enumerate() {
            if index > 0 {
                f.write_str("+")?;
            }
            write!(f, "{coordinate}")?;
        }
        if let Some(main_class) = &self.main_class {
            write!(f, "@{main_class}")?;
        }
        Ok(())
    }
}

impl FromStr for Endpoint {
    type Err = MvnrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
