//! Typed ID definitions for eventboard resources.

use crate::define_id;

define_id!(EventId, "event");
define_id!(UserId, "user");

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_event_id_roundtrip() {
        let id = EventId::parse("665f1c2ab8e4d91f3c0a7e21").unwrap();
        let parsed: EventId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_event_id_empty() {
        let result: Result<EventId, _> = "".parse();
        assert!(matches!(result.unwrap_err(), crate::IdError::Empty));
    }

    #[test]
    fn test_event_id_whitespace() {
        let result: Result<EventId, _> = "e 1".parse();
        assert!(matches!(result.unwrap_err(), crate::IdError::Whitespace(_)));
    }

    #[test]
    fn test_event_id_reserved_character() {
        let result: Result<EventId, _> = "e1/../admin".parse();
        assert_eq!(
            result.unwrap_err(),
            crate::IdError::ReservedCharacter {
                character: '/',
                id: "e1/../admin".to_string(),
            }
        );
    }

    #[test]
    fn test_user_id_json_roundtrip() {
        let id = UserId::parse("u1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"u1\"");
        let parsed: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        let result: Result<EventId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_borrow_as_str_for_map_lookup() {
        let mut map = std::collections::HashMap::new();
        map.insert(EventId::parse("e1").unwrap(), true);
        assert_eq!(map.get("e1"), Some(&true));
    }

    proptest! {
        #[test]
        fn prop_valid_ids_roundtrip(raw in "[A-Za-z0-9_.:-]{1,32}") {
            let id = EventId::parse(&raw).unwrap();
            prop_assert_eq!(id.as_str(), raw.as_str());
            let json = serde_json::to_string(&id).unwrap();
            let back: EventId = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back, id);
        }

        #[test]
        fn prop_ids_with_reserved_chars_rejected(
            prefix in "[a-z0-9]{0,8}",
            reserved in proptest::sample::select(crate::RESERVED_CHARS.to_vec()),
            suffix in "[a-z0-9]{0,8}",
        ) {
            let raw = format!("{prefix}{reserved}{suffix}");
            prop_assert!(EventId::parse(&raw).is_err());
        }
    }
}
