use chrono::NaiveDate;
use utilkit::{collections, dates, strings};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encoding_round_trip() {
        for input in ["plain", "a b&c=d", "päth/ünïcode", "100% sure?", "日本語"] {
            let encoded = strings::url_encode(input);
            assert!(encoded.is_ascii(), "{}", encoded);
            assert_eq!(strings::url_decode(&encoded).unwrap(), input);
        }
        assert_eq!(strings::url_encode("a b"), "a%20b");
    }

    #[test]
    fn test_url_decode_rejects_bad_utf8() {
        assert!(strings::url_decode("%FF%FE").is_err());
    }

    #[test]
    fn test_capitalize_and_validity() {
        assert_eq!(strings::capitalize("hello world"), "Hello world");
        assert_eq!(strings::capitalize("éclair"), "Éclair");
        assert_eq!(strings::capitalize(""), "");

        assert!(strings::is_valid_string("x"));
        assert!(!strings::is_valid_string("   "));
        assert!(!strings::is_valid_string(None));
    }

    #[test]
    fn test_case_conversions_agree() {
        assert_eq!(strings::to_camel_case("user_account-id"), "userAccountId");
        assert_eq!(strings::to_snake_case("userAccountId"), "user_account_id");
        assert_eq!(strings::to_camel_case(&strings::to_snake_case("retryCount")), "retryCount");
    }

    #[test]
    fn test_unix_timestamp_round_trip() {
        let moment = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(13, 45, 7)
            .unwrap();
        let seconds = dates::to_unix_timestamp(&moment);

        assert_eq!(seconds, 1_709_214_307);
        assert_eq!(dates::from_unix_timestamp(seconds).unwrap(), moment);
        assert_eq!(
            dates::from_unix_timestamp_to_date(seconds).unwrap(),
            moment.date()
        );
    }

    #[test]
    fn test_words_grouped_by_initial() {
        let words = ["apple", "avocado", "banana", "blueberry", "cherry"];
        let grouped = collections::group_by(&words, |w| w.chars().next().unwrap_or_default());

        let keys: Vec<char> = grouped.keys().copied().collect();
        assert_eq!(keys, vec!['a', 'b', 'c']);
        assert_eq!(grouped[&'b'], vec!["banana", "blueberry"]);
        assert_eq!(collections::join(&words[..2], ", "), "apple, avocado");
    }
}
