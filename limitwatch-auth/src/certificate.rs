/// Subject attribute prefixes that carry the tenancy OCID, in order of preference.
const TENANCY_PREFIXES: [&[u8]; 2] = [b"opc-tenant:", b"opc-identity:"];

/// ASN.1 string tags the provider uses for subject attributes.
const UTF8_STRING: u8 = 0x0c;
const PRINTABLE_STRING: u8 = 0x13;
const IA5_STRING: u8 = 0x16;

/// Extract the tenancy OCID from a DER-encoded instance certificate.
///
/// Instance certificates carry the tenancy as an `OU=opc-tenant:<ocid>` (or, on older images,
/// `O=opc-identity:<ocid>`) subject attribute. Rather than decoding the whole certificate, this locates the attribute
/// value and reads back the enclosing string element's tag and length. The scan does not know where the subject
/// ends, so a matching string elsewhere in the certificate (an issuer attribute or an extension value) is accepted
/// too.
pub fn tenancy_from_certificate(der: &[u8]) -> Option<String> {
    for prefix in TENANCY_PREFIXES {
        let mut start = 0;
        while let Some(offset) = find(&der[start..], prefix) {
            let pos = start + offset;
            if let Some(value) = string_value_at(der, pos) {
                if let Some(tenancy) = value.strip_prefix(prefix) {
                    if !tenancy.is_empty() {
                        return String::from_utf8(tenancy.to_vec()).ok();
                    }
                }
            }
            start = pos + 1;
        }
    }

    None
}

/// If `pos` is the first content byte of a DER string element, return that element's content.
fn string_value_at(der: &[u8], pos: usize) -> Option<&[u8]> {
    if pos < 2 {
        return None;
    }

    let (tag, len) = match der[pos - 2] {
        // Long form with a single length byte.
        0x81 if pos >= 3 => (der[pos - 3], der[pos - 1] as usize),
        tag if der[pos - 1] < 0x80 => (tag, der[pos - 1] as usize),
        _ => return None,
    };

    if !matches!(tag, UTF8_STRING | PRINTABLE_STRING | IA5_STRING) {
        return None;
    }

    der.get(pos..pos + len)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
