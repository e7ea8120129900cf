//! NIST SP 800-171 control families, keyed by two-segment identifier prefix.

/// Family name for identifiers whose prefix is not in [`CONTROL_FAMILIES`].
pub const UNKNOWN_FAMILY: &str = "Unknown";

/// Prefix → family name, in publication order.
pub const CONTROL_FAMILIES: &[(&str, &str)] = &[
    ("3.1", "AC - Access Control"),
    ("3.2", "AT - Awareness and Training"),
    ("3.3", "AU - Audit and Accountability"),
    ("3.4", "CM - Configuration Management"),
    ("3.5", "IA - Identification and Authentication"),
    ("3.6", "IR - Incident Response"),
    ("3.7", "MA - Maintenance"),
    ("3.8", "MP - Media Protection"),
    ("3.9", "PS - Personnel Security"),
    ("3.10", "PE - Physical Protection"),
    ("3.11", "RA - Risk Assessment"),
    ("3.12", "SA - Security Assessment"),
    ("3.13", "SC - System and Communications Protection"),
    ("3.14", "SI - System and Information Integrity"),
];

/// First two dot-separated segments of a control identifier.
///
/// "3.1.1" → "3.1", "3.10.2" → "3.10", "3" → "3"
pub fn prefix(control_id: &str) -> String {
    control_id
        .trim()
        .split('.')
        .take(2)
        .collect::<Vec<_>>()
        .join(".")
}

/// Full family name for a control identifier, or [`UNKNOWN_FAMILY`].
pub fn family_for(control_id: &str) -> &'static str {
    let prefix = prefix(control_id);
    CONTROL_FAMILIES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN_FAMILY)
}

/// Short key of a family name: the part before `" - "`.
///
/// "AC - Access Control" → "AC", "Unknown" → "Unknown"
pub fn family_key(family_name: &str) -> &str {
    family_name
        .split_once(" - ")
        .map(|(key, _)| key)
        .unwrap_or(family_name)
}

/// Short family key for a control identifier.
pub fn family_key_for(control_id: &str) -> &'static str {
    family_key(family_for(control_id))
}
