use proptest::prelude::*;

use eduverify_types::Identity;

proptest! {
    /// Display then parse yields the same identity for any 20 bytes.
    #[test]
    fn identity_display_parses_back(bytes in proptest::array::uniform20(any::<u8>())) {
        let id = Identity::new(bytes);
        let parsed = Identity::parse(&id.to_string()).unwrap();
        prop_assert_eq!(parsed, id);
    }

    /// Upper-casing the hex digits never changes which identity is parsed.
    #[test]
    fn identity_comparison_ignores_case(bytes in proptest::array::uniform20(any::<u8>())) {
        let id = Identity::new(bytes);
        let shouted = format!("0x{}", id.to_string()[2..].to_uppercase());
        prop_assert_eq!(Identity::parse(&shouted).unwrap(), id);
    }

    /// Any string of the wrong length is rejected.
    #[test]
    fn identity_rejects_wrong_length(digits in "[0-9a-f]{0,39}") {
        let raw = format!("0x{digits}");
        prop_assert!(Identity::parse(&raw).is_err());
    }
}
