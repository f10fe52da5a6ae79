// ── IP address validation ──

/// Check whether `candidate` is a literal dotted-quad IPv4 address.
///
/// Purely syntactic: four dot-separated groups of 1-3 decimal digits,
/// each group in [0, 255]. Leading zeros are accepted and no
/// canonicalization is performed ("010.1.1.1" passes, and is sent to the
/// limiter exactly as typed). Private/reserved ranges are not special --
/// the operator may legitimately block anything.
pub fn validate_ipv4(candidate: &str) -> bool {
    let mut groups = 0u8;

    for group in candidate.split('.') {
        groups += 1;
        if groups > 4 {
            return false;
        }
        if group.is_empty() || group.len() > 3 {
            return false;
        }
        if !group.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        // 1-3 ASCII digits always fit in u16.
        let value: u16 = match group.parse() {
            Ok(v) => v,
            Err(_) => return false,
        };
        if value > 255 {
            return false;
        }
    }

    groups == 4
}
