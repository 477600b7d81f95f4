// Envelope resolution: find the result list inside a vendor payload.

use serde_json::Value;

/// One outer wrapper a vendor may put around its result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// The payload itself is the list.
    Bare,
    /// `{ "<key>": [...] }`
    Key(&'static str),
    /// `{ "<outer>": { "<inner>": [...] } }`
    Nested(&'static str, &'static str),
}

/// Tried in order; the first shape that yields an array wins.
pub const ENVELOPES: &[Envelope] = &[
    Envelope::Bare,
    Envelope::Key("items"),
    Envelope::Key("data"),
    Envelope::Nested("data", "items"),
    Envelope::Key("posts"),
    Envelope::Key("tweets"),
    Envelope::Key("videos"),
    Envelope::Key("results"),
    Envelope::Key("organic"),
];

impl Envelope {
    pub fn extract<'a>(&self, raw: &'a Value) -> Option<&'a Vec<Value>> {
        match self {
            Envelope::Bare => raw.as_array(),
            Envelope::Key(key) => raw.get(key)?.as_array(),
            Envelope::Nested(outer, inner) => raw.get(outer)?.get(inner)?.as_array(),
        }
    }
}

/// The first envelope that resolves, with its list. `None` means the shape is
/// unknown; callers treat that as zero results.
pub fn resolve(raw: &Value) -> Option<(Envelope, &Vec<Value>)> {
    ENVELOPES
        .iter()
        .find_map(|env| env.extract(raw).map(|items| (*env, items)))
}
