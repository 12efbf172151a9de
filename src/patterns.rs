//! Shared regular expressions for address and host validation

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Dotted-quad IPv4, each octet 0-255.
    pub static ref IPV4_PATTERN: Regex = Regex::new(
        r"^(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$"
    )
    .unwrap();

    /// Full and compressed IPv6, link-local with zone id, and IPv4-mapped forms.
    pub static ref IPV6_PATTERN: Regex = Regex::new(concat!(
        r"^(([0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}|",
        r"([0-9a-fA-F]{1,4}:){1,7}:|",
        r"([0-9a-fA-F]{1,4}:){1,6}:[0-9a-fA-F]{1,4}|",
        r"([0-9a-fA-F]{1,4}:){1,5}(:[0-9a-fA-F]{1,4}){1,2}|",
        r"([0-9a-fA-F]{1,4}:){1,4}(:[0-9a-fA-F]{1,4}){1,3}|",
        r"([0-9a-fA-F]{1,4}:){1,3}(:[0-9a-fA-F]{1,4}){1,4}|",
        r"([0-9a-fA-F]{1,4}:){1,2}(:[0-9a-fA-F]{1,4}){1,5}|",
        r"[0-9a-fA-F]{1,4}:((:[0-9a-fA-F]{1,4}){1,6})|",
        r":((:[0-9a-fA-F]{1,4}){1,7}|:)|",
        r"fe80:(:[0-9a-fA-F]{0,4}){0,4}%[0-9a-zA-Z]+|",
        r"::(ffff(:0{1,4})?:)?((25[0-5]|(2[0-4]|1?[0-9])?[0-9])\.){3}(25[0-5]|(2[0-4]|1?[0-9])?[0-9])|",
        r"([0-9a-fA-F]{1,4}:){1,4}:((25[0-5]|(2[0-4]|1?[0-9])?[0-9])\.){3}(25[0-5]|(2[0-4]|1?[0-9])?[0-9]))$"
    ))
    .unwrap();

    /// RFC 1123 host name: dot-separated labels of 1-63 alphanumerics or inner hyphens.
    pub static ref HOSTNAME_PATTERN: Regex = Regex::new(
        r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)*[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$"
    )
    .unwrap();
}

pub const MAX_HOSTNAME_LEN: usize = 253;

pub fn is_valid_hostname(host: &str) -> bool {
    host.len() <= MAX_HOSTNAME_LEN && HOSTNAME_PATTERN.is_match(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4() {
        for ip in ["192.168.0.1", "255.255.255.255", "0.0.0.0"] {
            assert!(IPV4_PATTERN.is_match(ip), "{}", ip);
        }
        for ip in ["256.1.1.1", "1.2.3", "1.2.3.4.5", "a.b.c.d", ""] {
            assert!(!IPV4_PATTERN.is_match(ip), "{}", ip);
        }
    }

    #[test]
    fn test_ipv6() {
        for ip in [
            "2001:0db8:85a3:0000:0000:8a2e:0370:7334",
            "fe80::1ff:fe23:4567:890a",
            "::1",
            "::",
            "2001:0db8:85a3::8a2e:0370:7334",
            "::ffff:192.168.1.1",
            "fe80::1%eth0",
        ] {
            assert!(IPV6_PATTERN.is_match(ip), "{}", ip);
        }
        for ip in ["2001:db8::g", "1:2:3:4:5:6:7:8:9", "192.168.0.1", ":::"] {
            assert!(!IPV6_PATTERN.is_match(ip), "{}", ip);
        }
    }

    #[test]
    fn test_hostname() {
        assert!(is_valid_hostname("example.com"));
        assert!(is_valid_hostname("localhost"));
        assert!(is_valid_hostname("a-b.c-d.io"));
        assert!(!is_valid_hostname("-bad.com"));
        assert!(!is_valid_hostname("bad..com"));
        assert!(!is_valid_hostname("rm -rf"));
        assert!(!is_valid_hostname("host;reboot"));
        assert!(!is_valid_hostname(&"a".repeat(254)));
    }
}
