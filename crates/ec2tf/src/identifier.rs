//! turn human labels into block symbols
use hcl::Identifier;

/// Symbol used when a label has nothing left after sanitizing
pub const FALLBACK_SYMBOL: &str = "instance";

/// Sanitize an arbitrary label into a symbol usable as a block label and in traversals.
///
/// - lower-cased
/// - every character that is neither alphanumeric nor `_` becomes `_`
/// - empty input yields [FALLBACK_SYMBOL]
///
/// The result then goes through [Identifier::sanitized], which prefixes a leading digit with `_` and replaces
/// the alphanumeric characters HCL does not accept in identifiers (`½`, `²`, ...).
///
/// Lower-casing happens first: some characters lower-case into sequences that would otherwise survive the
/// replacement step and break idempotence.
pub fn sanitize(label: &str) -> Identifier {
    let symbol: String = label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if symbol.is_empty() {
        return Identifier::unchecked(FALLBACK_SYMBOL);
    }

    Identifier::sanitized(symbol)
}
