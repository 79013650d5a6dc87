// MAC / IPv4 input helpers
//
// Pure functions shared by the device forms and the CLI.

const MAC_LEN: usize = 17;

/// Normalize free-form MAC input: drop everything that is not a hex
/// digit, uppercase, insert a colon between pairs, cap at 17 characters.
///
/// ```
/// use wakelan_core::validate::format_mac;
/// assert_eq!(format_mac("aa-bb-cc-dd-ee-ff"), "AA:BB:CC:DD:EE:FF");
/// assert_eq!(format_mac("not-hex!!"), "E");
/// assert_eq!(format_mac("xyz!!"), "");
/// ```
pub fn format_mac(input: &str) -> String {
    let digits: Vec<char> = input
        .chars()
        .filter(char::is_ascii_hexdigit)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let mut out = String::with_capacity(MAC_LEN);
    for (i, pair) in digits.chunks(2).enumerate() {
        if i > 0 {
            out.push(':');
        }
        out.extend(pair);
    }
    out.truncate(MAC_LEN);
    out
}

/// `true` iff `mac` is six uppercase hex pairs separated by colons.
pub fn validate_mac(mac: &str) -> bool {
    let groups: Vec<&str> = mac.split(':').collect();
    groups.len() == 6
        && groups.iter().all(|g| {
            g.len() == 2
                && g
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        })
}

/// `true` for blank input or a dotted-quad IPv4 address with each octet
/// in 0–255 (leading zeros allowed, at most three digits).
pub fn validate_ip(ip: &str) -> bool {
    let ip = ip.trim();
    if ip.is_empty() {
        return true;
    }

    let octets: Vec<&str> = ip.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|o| {
            (1..=3).contains(&o.len())
                && o.chars().all(|c| c.is_ascii_digit())
                && o.parse::<u16>().is_ok_and(|v| v <= 255)
        })
}
