//! Lookaround support data and the resolver that turns occurrences into
//! diagnostics.

use crate::browsers::{BrowserTarget, Version};
use crate::diagnostic::Diagnostic;
use crate::scanner::{Direction, LookaroundKind};
use crate::settings::Settings;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// (family, first version with lookahead, first version with lookbehind).
/// Families are keyed by lowercased canonical name; `None` means never.
const SUPPORT: &[(&str, Option<&str>, Option<&str>)] = &[
    ("internet explorer", Some("5.5"), None),
    ("edge", Some("12"), Some("79")),
    ("firefox", Some("1"), Some("78")),
    ("chrome", Some("1"), Some("62")),
    ("safari", Some("3.1"), Some("16.4")),
    ("opera", Some("9.5"), Some("49")),
    ("ios safari", Some("3.2"), Some("16.4")),
    ("opera mini", Some("0"), None),
    ("android browser", Some("2.1"), Some("62")),
    ("chrome for android", Some("18"), Some("62")),
    ("firefox for android", Some("4"), Some("78")),
    ("samsung internet", Some("1"), Some("8.2")),
    ("node.js", Some("0.10"), Some("8.10")),
];

/// Minimum supporting version per (family, direction). Read-only once built.
#[derive(Debug, Default)]
pub struct CompatibilityTable {
    minimum: FxHashMap<Direction, FxHashMap<&'static str, Version>>,
}

static TABLE: OnceLock<CompatibilityTable> = OnceLock::new();

impl CompatibilityTable {
    /// The bundled dataset.
    pub fn bundled() -> &'static CompatibilityTable {
        TABLE.get_or_init(|| {
            let mut minimum: FxHashMap<Direction, FxHashMap<&'static str, Version>> =
                FxHashMap::default();
            for &(family, lookahead, lookbehind) in SUPPORT {
                let entries = [
                    (Direction::Lookahead, lookahead),
                    (Direction::Lookbehind, lookbehind),
                ];
                for (direction, version) in entries {
                    if let Some(v) = version.and_then(Version::parse) {
                        minimum.entry(direction).or_default().insert(family, v);
                    }
                }
            }
            CompatibilityTable { minimum }
        })
    }

    pub fn minimum_version(&self, family: &str, direction: Direction) -> Option<&Version> {
        self.minimum.get(&direction)?.get(family)
    }

    /// Unknown families and versions below the minimum are unsupported.
    pub fn supports(&self, target: &BrowserTarget, direction: Direction) -> bool {
        self.minimum_version(&target.family(), direction)
            .is_some_and(|min| target.parsed_version() >= min)
    }
}

/// Decides, per occurrence, whether it is reported and with which message.
#[derive(Debug, Clone)]
pub struct Resolver {
    targets: Vec<BrowserTarget>,
    table: &'static CompatibilityTable,
}

impl Resolver {
    /// An empty target list selects unconditional mode.
    pub fn new(targets: Vec<BrowserTarget>) -> Self {
        Self {
            targets,
            table: CompatibilityTable::bundled(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.targets())
    }

    pub fn is_unconditional(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[BrowserTarget] {
        &self.targets
    }

    pub fn resolve(&self, kind: LookaroundKind, position: usize) -> Option<Diagnostic> {
        if self.is_unconditional() {
            return Some(Diagnostic::disallowed(kind, position));
        }
        let direction = kind.direction();
        let unsupported: Vec<&BrowserTarget> = self
            .targets
            .iter()
            .filter(|t| !self.table.supports(t, direction))
            .collect();
        if unsupported.is_empty() {
            None
        } else {
            Some(Diagnostic::unsupported(&unsupported, direction, position))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browsers::parse_target_list;

    fn resolver(list: &str) -> Resolver {
        Resolver::new(parse_target_list(list))
    }

    fn message(r: &Resolver, kind: LookaroundKind) -> Option<String> {
        r.resolve(kind, 0).map(|d| d.message)
    }

    #[test]
    fn unconditional_labels() {
        let r = Resolver::new(Vec::new());
        assert!(r.is_unconditional());
        let cases = [
            (LookaroundKind::Lookahead, "lookahead"),
            (LookaroundKind::NegativeLookahead, "negative lookahead"),
            (LookaroundKind::Lookbehind, "lookbehind"),
            (LookaroundKind::NegativeLookbehind, "negative lookbehind"),
        ];
        for (kind, label) in cases {
            assert_eq!(
                message(&r, kind).unwrap(),
                format!("Disallowed {label} match group at position 0")
            );
        }
    }

    #[test]
    fn single_unsupported_target() {
        assert_eq!(
            message(&resolver("Safari 15"), LookaroundKind::Lookbehind).unwrap(),
            "Safari 15: unsupported lookbehind match group at position 0"
        );
        assert_eq!(
            message(&resolver("Chrome 61"), LookaroundKind::Lookbehind).unwrap(),
            "Chrome 61: unsupported lookbehind match group at position 0"
        );
    }

    #[test]
    fn only_unsupported_targets_are_listed() {
        assert_eq!(
            message(&resolver("ie 11, Chrome 96, safari 13"), LookaroundKind::Lookbehind).unwrap(),
            "Internet Explorer 11, Safari 13: unsupported lookbehind match group at position 0"
        );
    }

    #[test]
    fn supported_everywhere_yields_nothing() {
        let r = resolver("Chrome 96, Firefox 96");
        for kind in [
            LookaroundKind::Lookahead,
            LookaroundKind::NegativeLookahead,
            LookaroundKind::Lookbehind,
            LookaroundKind::NegativeLookbehind,
        ] {
            assert_eq!(r.resolve(kind, 3), None);
        }
    }

    #[test]
    fn negation_collapses_to_direction() {
        assert_eq!(
            message(&resolver("Safari 16.3"), LookaroundKind::NegativeLookbehind).unwrap(),
            "Safari 16.3: unsupported lookbehind match group at position 0"
        );
        assert_eq!(message(&resolver("Safari 16.4"), LookaroundKind::NegativeLookbehind), None);
    }

    #[test]
    fn lookahead_support() {
        assert_eq!(message(&resolver("ie 11"), LookaroundKind::Lookahead), None);
        assert_eq!(
            message(&resolver("ie 5"), LookaroundKind::NegativeLookahead).unwrap(),
            "Internet Explorer 5: unsupported lookahead match group at position 0"
        );
        assert_eq!(message(&resolver("op_mini 1"), LookaroundKind::Lookahead), None);
    }

    #[test]
    fn unknown_family_is_unsupported() {
        assert_eq!(
            message(&resolver("Netscape 4"), LookaroundKind::Lookahead).unwrap(),
            "Netscape 4: unsupported lookahead match group at position 0"
        );
    }

    #[test]
    fn table_lookups() {
        let table = CompatibilityTable::bundled();
        assert_eq!(
            table.minimum_version("chrome", Direction::Lookbehind),
            Version::parse("62").as_ref()
        );
        assert_eq!(table.minimum_version("internet explorer", Direction::Lookbehind), None);
    }
}
