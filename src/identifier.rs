//! Canonical record identifiers and the legacy check-digit scheme.
//!
//! Each institution source has its own prefix scheme for bib, item, and
//! holding identifiers (e.g. `b10010064` for an NYPL bib, `pi123` for a
//! Princeton partner item). The off-site registry additionally requires
//! NYPL bib numbers in their legacy `.b{id}{check}` form, where the check
//! character is a mod-11 weighted checksum.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// The three record kinds in the catalog domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A bibliographic description.
    Bib,
    /// A physical or electronic copy.
    Item,
    /// An aggregate holdings statement.
    Holding,
}

/// Identifier prefixes for one institution source.
#[derive(Debug, Clone, Copy)]
struct SourcePrefixes {
    bib: &'static str,
    item: &'static str,
    /// Only the home institution tracks holdings.
    holding: Option<&'static str>,
}

lazy_static! {
    /// Prefix table keyed by institution source tag.
    static ref SOURCE_PREFIXES: HashMap<&'static str, SourcePrefixes> = {
        let mut m = HashMap::new();
        m.insert(
            "sierra-nypl",
            SourcePrefixes {
                bib: "b",
                item: "i",
                holding: Some("h"),
            },
        );
        m.insert(
            "recap-pul",
            SourcePrefixes {
                bib: "pb",
                item: "pi",
                holding: None,
            },
        );
        m.insert(
            "recap-cul",
            SourcePrefixes {
                bib: "cb",
                item: "ci",
                holding: None,
            },
        );
        m.insert(
            "recap-hl",
            SourcePrefixes {
                bib: "hb",
                item: "hi",
                holding: None,
            },
        );
        m
    };
}

/// Derive the canonical prefixed identifier for a record.
///
/// Returns `None` if `source` is not a recognized institution source tag,
/// or if the source has no prefix for the requested kind (partners do not
/// track holdings). Callers must treat `None` as "cannot build identifier",
/// not as an error.
///
/// # Examples
///
/// ```
/// use discovery_indexer::identifier::{identifier_for, RecordKind};
///
/// assert_eq!(
///     identifier_for("sierra-nypl", "10010064", RecordKind::Bib),
///     Some("b10010064".to_string())
/// );
/// assert_eq!(
///     identifier_for("recap-pul", "99999", RecordKind::Item),
///     Some("pi99999".to_string())
/// );
/// assert_eq!(identifier_for("unknown-source", "1", RecordKind::Bib), None);
/// ```
#[must_use]
pub fn identifier_for(source: &str, raw_id: &str, kind: RecordKind) -> Option<String> {
    let prefixes = SOURCE_PREFIXES.get(source)?;
    let prefix = match kind {
        RecordKind::Bib => prefixes.bib,
        RecordKind::Item => prefixes.item,
        RecordKind::Holding => prefixes.holding?,
    };
    Some(format!("{prefix}{raw_id}"))
}

/// Whether a source tag belongs to a cooperating partner institution
/// rather than the home institution.
#[must_use]
pub fn is_partner_source(source: &str) -> bool {
    !source.contains("nypl")
}

/// Compute the legacy check digit for a numeric record id.
///
/// Digits are read in reverse and multiplied by increasing weights starting
/// at 2; the checksum is the sum mod 11. Remainder 10 encodes as `'x'`,
/// remainder 11 as `'0'`, otherwise the remainder digit itself. Returns
/// `None` for an empty id or one containing non-digits.
///
/// # Examples
///
/// ```
/// use discovery_indexer::identifier::check_digit;
///
/// // The legacy scheme for `.b158301717`-style identifiers:
/// assert_eq!(check_digit("15830171"), Some('7'));
/// ```
#[must_use]
pub fn check_digit(id: &str) -> Option<char> {
    if id.is_empty() {
        return None;
    }

    let mut sum: u32 = 0;
    let mut weight: u32 = 2;
    for ch in id.chars().rev() {
        let digit = ch.to_digit(10)?;
        sum += digit * weight;
        weight += 1;
    }

    match sum % 11 {
        10 => Some('x'),
        11 => Some('0'),
        r => char::from_digit(r, 10),
    }
}

/// A bib number with its check digit appended, e.g. `"158301717"` for
/// `"15830171"`. Returns `None` if no check digit can be computed.
#[must_use]
pub fn bnumber_with_check_digit(id: &str) -> Option<String> {
    check_digit(id).map(|c| format!("{id}{c}"))
}
