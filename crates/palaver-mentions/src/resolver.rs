// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mention parsing and responder selection.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use palaver_core::error::PalaverError;
use palaver_core::types::{BotProfile, ChatRoster, UserId};

/// Label that addresses every bot participant in the chat at once.
const EVERYONE_LABEL: &str = "@Everyone";

fn markdown_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Markdown link span: [label](url). Labels and urls never nest here.
    RE.get_or_init(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid literal regex"))
}

/// Resolves which bots must reply to an incoming message.
///
/// Mentions must be in-app links: a `[@Name](url)` span only counts when
/// the url's origin matches this application's own site origin, so links
/// into other sites can never trigger a bot.
pub struct MentionResolver {
    site_origin: url::Origin,
}

impl MentionResolver {
    /// Creates a resolver anchored at the application's own site URL.
    pub fn new(site_url: &str) -> Result<Self, PalaverError> {
        let url = Url::parse(site_url)
            .map_err(|e| PalaverError::Config(format!("invalid site url {site_url}: {e}")))?;
        Ok(Self {
            site_origin: url.origin(),
        })
    }

    /// Determines which bots must reply to `message_text`.
    ///
    /// Returns an empty list when the chat is absent, the text is blank,
    /// the sender is not the current user (only the user's own sends
    /// trigger bot replies), or the chat has no bot participants. A 1:1
    /// chat with a single bot always answers; anything else requires an
    /// explicit mention.
    pub fn determine_responding_bots(
        &self,
        message_text: Option<&str>,
        sender_id: Option<&UserId>,
        chat: Option<&ChatRoster>,
        bots: &[BotProfile],
        current_user_id: &UserId,
    ) -> Vec<UserId> {
        let Some(chat) = chat else {
            return Vec::new();
        };
        let text = match message_text {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Vec::new(),
        };
        if sender_id != Some(current_user_id) {
            return Vec::new();
        }
        if chat.bot_participant_ids.is_empty() {
            return Vec::new();
        }

        // 1:1 chat with a single bot: that bot always responds.
        if chat.bot_participant_ids.len() == 1 && chat.participants_count == 2 {
            return vec![chat.bot_participant_ids[0].clone()];
        }

        self.process_mentions(text, chat, bots)
    }

    /// Extracts in-app `@` mentions from markdown link spans.
    ///
    /// `@Everyone` yields the chat's full bot roster regardless of other
    /// mentions. Otherwise each `@Name` label is matched case-sensitively
    /// against the provided bots' display names; unmatched labels are
    /// dropped silently, and the final id list is deduplicated in order.
    pub fn process_mentions(
        &self,
        message_text: &str,
        chat: &ChatRoster,
        bots: &[BotProfile],
    ) -> Vec<UserId> {
        let mut labels = Vec::new();
        for caps in markdown_link_re().captures_iter(message_text) {
            let label = &caps[1];
            let link = &caps[2];
            if !label.starts_with('@') {
                continue;
            }
            match Url::parse(link) {
                Ok(url) if url.origin() == self.site_origin => labels.push(label.to_string()),
                Ok(_) => debug!(label = label, link = link, "mention link origin mismatch"),
                Err(_) => debug!(label = label, link = link, "unparseable mention link"),
            }
        }

        if labels.iter().any(|l| l == EVERYONE_LABEL) {
            return chat.bot_participant_ids.clone();
        }

        let mut seen = HashSet::new();
        let mut responders = Vec::new();
        for label in &labels {
            let name = &label[1..];
            if let Some(bot) = bots.iter().find(|b| b.name == name)
                && seen.insert(bot.id.clone())
            {
                responders.push(bot.id.clone());
            }
        }
        responders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = "https://thisapp.example";

    fn bot(id: &str, name: &str) -> BotProfile {
        BotProfile {
            id: UserId(id.to_string()),
            name: name.to_string(),
            is_bot: true,
            settings: None,
        }
    }

    fn roster(bot_ids: &[&str], participants_count: usize) -> ChatRoster {
        ChatRoster {
            bot_participant_ids: bot_ids.iter().map(|id| UserId(id.to_string())).collect(),
            participants_count,
        }
    }

    fn resolver() -> MentionResolver {
        MentionResolver::new(SITE).unwrap()
    }

    #[test]
    fn invalid_site_url_is_a_config_error() {
        assert!(MentionResolver::new("not a url").is_err());
    }

    #[test]
    fn origin_mismatch_excludes_mention() {
        let r = resolver();
        let chat = roster(&["a", "b"], 4);
        let bots = [bot("a", "Alice"), bot("b", "Bob")];
        let text = "[@Alice](https://thisapp.example/u/alice) [@Bob](https://otherapp.example/u/bob)";

        let ids = r.process_mentions(text, &chat, &bots);
        assert_eq!(ids, vec![UserId("a".into())]);
    }

    #[test]
    fn everyone_returns_full_bot_roster() {
        let r = resolver();
        let chat = roster(&["a", "b", "c"], 5);
        let bots = [bot("a", "Alice"), bot("b", "Bob")];
        let text = "[@Alice](https://thisapp.example/u/alice) [@Everyone](https://thisapp.example/all)";

        let ids = r.process_mentions(text, &chat, &bots);
        assert_eq!(
            ids,
            vec![UserId("a".into()), UserId("b".into()), UserId("c".into())]
        );
    }

    #[test]
    fn everyone_with_foreign_origin_does_not_count() {
        let r = resolver();
        let chat = roster(&["a", "b"], 4);
        let bots = [bot("a", "Alice")];
        let text = "[@Everyone](https://otherapp.example/all)";

        let ids = r.process_mentions(text, &chat, &bots);
        assert!(ids.is_empty());
    }

    #[test]
    fn name_match_is_case_sensitive() {
        let r = resolver();
        let chat = roster(&["a"], 3);
        let bots = [bot("a", "Alice")];
        let text = "[@alice](https://thisapp.example/u/alice)";

        assert!(r.process_mentions(text, &chat, &bots).is_empty());
    }

    #[test]
    fn duplicate_mentions_are_deduplicated() {
        let r = resolver();
        let chat = roster(&["a"], 3);
        let bots = [bot("a", "Alice")];
        let text =
            "[@Alice](https://thisapp.example/u/alice) hi [@Alice](https://thisapp.example/u/alice)";

        assert_eq!(
            r.process_mentions(text, &chat, &bots),
            vec![UserId("a".into())]
        );
    }

    #[test]
    fn labels_without_at_prefix_are_ignored() {
        let r = resolver();
        let chat = roster(&["a"], 3);
        let bots = [bot("a", "Alice")];
        let text = "[Alice](https://thisapp.example/u/alice)";

        assert!(r.process_mentions(text, &chat, &bots).is_empty());
    }

    #[test]
    fn unparseable_link_is_dropped_silently() {
        let r = resolver();
        let chat = roster(&["a"], 3);
        let bots = [bot("a", "Alice")];
        let text = "[@Alice](not a url)";

        assert!(r.process_mentions(text, &chat, &bots).is_empty());
    }

    #[test]
    fn one_on_one_chat_with_bot_always_responds() {
        let r = resolver();
        let chat = roster(&["a"], 2);
        let bots = [bot("a", "Alice")];
        let user = UserId("user-1".into());

        let ids = r.determine_responding_bots(
            Some("no mention at all"),
            Some(&user),
            Some(&chat),
            &bots,
            &user,
        );
        assert_eq!(ids, vec![UserId("a".into())]);
    }

    #[test]
    fn group_chat_requires_mention() {
        let r = resolver();
        let chat = roster(&["a"], 3);
        let bots = [bot("a", "Alice")];
        let user = UserId("user-1".into());

        let ids = r.determine_responding_bots(
            Some("no mention at all"),
            Some(&user),
            Some(&chat),
            &bots,
            &user,
        );
        assert!(ids.is_empty());

        let ids = r.determine_responding_bots(
            Some("[@Alice](https://thisapp.example/u/alice)"),
            Some(&user),
            Some(&chat),
            &bots,
            &user,
        );
        assert_eq!(ids, vec![UserId("a".into())]);
    }

    #[test]
    fn early_exits_return_empty() {
        let r = resolver();
        let chat = roster(&["a"], 2);
        let bots = [bot("a", "Alice")];
        let user = UserId("user-1".into());
        let other = UserId("user-2".into());

        // Chat absent.
        assert!(r
            .determine_responding_bots(Some("hi"), Some(&user), None, &bots, &user)
            .is_empty());
        // Blank text after trimming.
        assert!(r
            .determine_responding_bots(Some("   \n"), Some(&user), Some(&chat), &bots, &user)
            .is_empty());
        assert!(r
            .determine_responding_bots(None, Some(&user), Some(&chat), &bots, &user)
            .is_empty());
        // Sender is not the current user.
        assert!(r
            .determine_responding_bots(Some("hi"), Some(&other), Some(&chat), &bots, &user)
            .is_empty());
        assert!(r
            .determine_responding_bots(Some("hi"), None, Some(&chat), &bots, &user)
            .is_empty());
        // No bot participants.
        let empty_chat = roster(&[], 2);
        assert!(r
            .determine_responding_bots(Some("hi"), Some(&user), Some(&empty_chat), &bots, &user)
            .is_empty());
    }
}
