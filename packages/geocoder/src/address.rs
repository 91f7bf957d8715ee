//! Place description normalization.
//!
//! Labelled incidents describe places in free text, often with noise the
//! geocoder cannot use:
//! - Estimation markers: `"Oxford Circus (oszacowano)"`
//! - Label prefixes: `"Street: Brixton Road"`
//! - Verbose intersections: `"Intersection of Old Kent Road and Asylum Road"`
//!
//! This module rewrites these into a free-form query suitable for
//! Nominatim.

use regex::Regex;
use std::sync::LazyLock;

/// Regex for the parenthetical estimation marker the labeller appends when
/// it had to guess the place.
static ESTIMATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\((?:oszacowano|estimated)\)").expect("valid regex")
});

/// Regex for one or more leading `"<word>:"` labels (e.g. `"Street: "`,
/// `"Miejsce: Station: "`).
static LABEL_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\w+:\s?)+").expect("valid regex"));

/// Regex for runs of whitespace left behind by removals.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Literal noise the geocoder trips over.
const INTERSECTION_OF: &str = "Intersection of";

/// Normalizes a labelled place description into a geocoder query.
///
/// Total and deterministic; running it on its own output is a no-op.
#[must_use]
pub fn normalize_place(raw: &str) -> String {
    let mut current = clean(raw);
    // A removal can expose new noise (e.g. a label right after
    // "Intersection of"), so repeat until nothing changes. Every pass that
    // changes the text shortens it or only rewrites whitespace.
    loop {
        let next = clean(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean(raw: &str) -> String {
    let addr = ESTIMATED_RE.replace_all(raw, "");
    let addr = LABEL_PREFIX_RE.replace(&addr, "");
    let addr = addr.replace(INTERSECTION_OF, "");
    let addr = addr.replace(" and ", " & ");
    let addr = WHITESPACE_RE.replace_all(&addr, " ");

    addr.trim().to_string()
}
