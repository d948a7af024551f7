// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tempmail::models::MailMessage;
    use tempmail::session::merge_messages;

    fn message(id: &str) -> MailMessage {
        MailMessage {
            id: id.to_string(),
            from_address: "sender@example.com".to_string(),
            subject: format!("Subject {}", id),
            preview: String::new(),
            body: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    fn ids(inbox: &[MailMessage]) -> Vec<&str> {
        inbox.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_new_messages_go_on_top_in_batch_order() {
        let mut inbox = vec![message("m1")];
        let added = merge_messages(&mut inbox, vec![message("m3"), message("m2"), message("m1")]);
        assert_eq!(added, 2);
        assert_eq!(ids(&inbox), vec!["m3", "m2", "m1"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut inbox = Vec::new();
        let batch = vec![message("m2"), message("m1")];
        assert_eq!(merge_messages(&mut inbox, batch.clone()), 2);
        assert_eq!(merge_messages(&mut inbox, batch), 0);
        assert_eq!(ids(&inbox), vec!["m2", "m1"]);
    }

    #[test]
    fn test_duplicates_within_batch_are_dropped() {
        let mut inbox = Vec::new();
        let added = merge_messages(&mut inbox, vec![message("a"), message("a"), message("b")]);
        assert_eq!(added, 2);
        assert_eq!(ids(&inbox), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_batch_leaves_inbox_alone() {
        let mut inbox = vec![message("m1")];
        assert_eq!(merge_messages(&mut inbox, Vec::new()), 0);
        assert_eq!(ids(&inbox), vec!["m1"]);
    }
}
