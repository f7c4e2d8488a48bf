//! Dotted-decimal and colon-hex text forms.

use crate::error::{IpError, Result};

const V6_GROUPS: usize = 8;

/// Parse strict dotted-decimal: four decimal octets, each 0-255.
pub(crate) fn parse_v4(s: &str) -> Result<u32> {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() != 4 {
        return Err(IpError::format(s, "expected 4 dot-separated octets"));
    }
    let mut bits = 0u32;
    for part in parts {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IpError::format(s, "octet is not a decimal number"));
        }
        let octet: u8 = part
            .parse()
            .map_err(|_| IpError::format(s, "octet out of range 0-255"))?;
        bits = (bits << 8) | u32::from(octet);
    }
    Ok(bits)
}

pub(crate) fn render_v4(bits: u32) -> String {
    let [a, b, c, d] = bits.to_be_bytes();
    format!("{a}.{b}.{c}.{d}")
}

/// Parse colon-hex, with at most one `::` and an optional dotted-decimal tail.
pub(crate) fn parse_v6(s: &str) -> Result<u128> {
    let groups = match s.split_once("::") {
        None => {
            let groups = parse_groups(s, s, true)?;
            if groups.len() != V6_GROUPS {
                return Err(IpError::format(s, "expected 8 colon-separated groups"));
            }
            groups
        }
        Some((head, tail)) => {
            if tail.contains("::") {
                return Err(IpError::format(s, "more than one '::'"));
            }
            let mut groups = parse_groups(head, s, false)?;
            let tail = parse_groups(tail, s, true)?;
            if groups.len() + tail.len() >= V6_GROUPS {
                return Err(IpError::format(s, "'::' must stand for at least one group"));
            }
            groups.resize(V6_GROUPS - tail.len(), 0);
            groups.extend(tail);
            groups
        }
    };
    Ok(groups
        .iter()
        .fold(0u128, |acc, &group| (acc << 16) | u128::from(group)))
}

fn parse_groups(part: &str, input: &str, allow_v4_tail: bool) -> Result<Vec<u16>> {
    if part.is_empty() {
        return Ok(Vec::new());
    }
    let tokens: Vec<&str> = part.split(':').collect();
    let mut groups = Vec::with_capacity(V6_GROUPS);
    for (i, token) in tokens.iter().enumerate() {
        let last = i + 1 == tokens.len();
        if last && allow_v4_tail && token.contains('.') {
            let v4 = parse_v4(token)
                .map_err(|_| IpError::format(input, "invalid embedded IPv4 suffix"))?;
            groups.push((v4 >> 16) as u16);
            groups.push(v4 as u16);
        } else {
            groups.push(parse_hex_group(token, input)?);
        }
    }
    Ok(groups)
}

fn parse_hex_group(token: &str, input: &str) -> Result<u16> {
    if token.is_empty() || token.len() > 4 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(IpError::format(input, "group is not 1-4 hex digits"));
    }
    u16::from_str_radix(token, 16).map_err(|_| IpError::format(input, "group out of range"))
}

/// Canonical form: lower-case hex, leftmost longest zero run (of 2+) as `::`.
pub(crate) fn render_v6(bits: u128) -> String {
    let groups: Vec<u16> = (0..V6_GROUPS)
        .map(|i| (bits >> (16 * (V6_GROUPS - 1 - i))) as u16)
        .collect();

    let mut best: Option<(usize, usize)> = None;
    let mut i = 0;
    while i < V6_GROUPS {
        if groups[i] != 0 {
            i += 1;
            continue;
        }
        let start = i;
        while i < V6_GROUPS && groups[i] == 0 {
            i += 1;
        }
        let len = i - start;
        if len > 1 && best.map_or(true, |(_, best_len)| len > best_len) {
            best = Some((start, len));
        }
    }

    let join = |gs: &[u16]| {
        gs.iter()
            .map(|g| format!("{g:x}"))
            .collect::<Vec<String>>()
            .join(":")
    };
    match best {
        Some((start, len)) => format!(
            "{}::{}",
            join(&groups[..start]),
            join(&groups[start + len..])
        ),
        None => join(&groups),
    }
}
