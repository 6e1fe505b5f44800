//! JSON value locator.
//!
//! A key path is a short walk from the document root to the displayed value:
//! `dataSetCount`, `data.0.Temperature` or `data[0].Temperature`. Numeric
//! segments index arrays; on objects they fall back to a string key lookup.

use core::fmt;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Parsed key path. Always contains at least one [`Segment::Key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    /// Parse the dotted / bracketed text form. Returns `None` for empty
    /// segments, malformed brackets, or a path with no key at all.
    pub fn parse(text: &str) -> Option<Self> {
        let mut segments = Vec::new();

        for part in text.split('.') {
            if part.is_empty() {
                return None;
            }
            let (name, mut rest) = match part.find('[') {
                Some(open) => part.split_at(open),
                None => (part, ""),
            };

            if !name.is_empty() {
                if name.bytes().all(|b| b.is_ascii_digit()) {
                    segments.push(Segment::Index(name.parse().ok()?));
                } else {
                    segments.push(Segment::Key(name.to_owned()));
                }
            }

            while !rest.is_empty() {
                let inner = rest.strip_prefix('[')?;
                let close = inner.find(']')?;
                segments.push(Segment::Index(inner[..close].parse().ok()?));
                rest = &inner[close + 1..];
            }
        }

        if !segments.iter().any(|s| matches!(s, Segment::Key(_))) {
            return None;
        }
        Some(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The last named key: the literal the fallback scanner searches for.
    pub fn leaf_key(&self) -> &str {
        self.segments
            .iter()
            .rev()
            .find_map(|s| match s {
                Segment::Key(k) => Some(k.as_str()),
                Segment::Index(_) => None,
            })
            .unwrap_or_default()
    }

    /// Walk `root` along the path.
    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments.iter().try_fold(root, |node, seg| match (seg, node) {
            (Segment::Key(k), Value::Object(map)) => map.get(k),
            (Segment::Index(i), Value::Array(items)) => items.get(*i),
            (Segment::Index(i), Value::Object(map)) => map.get(&i.to_string()),
            _ => None,
        })
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                Segment::Key(k) if i == 0 => write!(f, "{k}")?,
                Segment::Key(k) => write!(f, ".{k}")?,
                Segment::Index(n) => write!(f, "[{n}]")?,
            }
        }
        Ok(())
    }
}
