use {
    relay_channels::{MediaKind, Payload},
    relay_common::Role,
    relay_config::LabelsConfig,
};

/// Telegram's message text limit, in UTF-16 code units.
pub const MAX_TEXT_LEN: usize = 4096;
/// Telegram's media caption limit, in UTF-16 code units.
pub const MAX_CAPTION_LEN: usize = 1024;

const ELLIPSIS: char = '…';

/// The copy to deliver to the counterpart chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Text(String),
    /// Same attachment by file id. The caption always carries the role prefix.
    Media {
        media: MediaKind,
        file_id: String,
        caption: String,
    },
}

/// Label shown in front of everything sent on behalf of `role`.
#[must_use]
pub fn prefix_for(role: Role, labels: &LabelsConfig) -> &str {
    match role {
        Role::Customer => &labels.customer,
        Role::Executor => &labels.executor,
    }
}

/// Build the forwarded copy of `payload`, sent on behalf of `role`.
#[must_use]
pub fn plan_forward(payload: &Payload, role: Role, labels: &LabelsConfig) -> Outgoing {
    let prefix = prefix_for(role, labels);
    match payload {
        Payload::Text { text } => Outgoing::Text(prefixed(prefix, text, MAX_TEXT_LEN)),
        Payload::Media {
            media,
            file_id,
            caption,
        } => {
            let body = non_empty(caption.as_deref()).unwrap_or(labels.media_placeholder.as_str());
            Outgoing::Media {
                media: *media,
                file_id: file_id.clone(),
                caption: prefixed(prefix, body, MAX_CAPTION_LEN),
            }
        },
        Payload::Unknown { text, caption } => {
            let body = non_empty(text.as_deref())
                .or_else(|| non_empty(caption.as_deref()))
                .unwrap_or(labels.unknown_placeholder.as_str());
            Outgoing::Text(prefixed(prefix, body, MAX_TEXT_LEN))
        },
    }
}

/// `"{prefix} {body}"`, cut to `limit` UTF-16 units with a trailing
/// ellipsis when the body is too long.
fn prefixed(prefix: &str, body: &str, limit: usize) -> String {
    let full = format!("{prefix} {body}");
    if full.encode_utf16().count() <= limit {
        return full;
    }

    let budget = limit.saturating_sub(ELLIPSIS.len_utf16());
    let mut used = 0;
    let mut out: String = full
        .chars()
        .take_while(|c| {
            used += c.len_utf16();
            used <= budget
        })
        .collect();
    out.push(ELLIPSIS);
    out
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case::executor(Role::Executor, "🧑‍🎨 Команда: hi")]
    #[case::customer(Role::Customer, "👤 Клиент: hi")]
    fn text_is_prefixed(#[case] role: Role, #[case] expected: &str) {
        let out = plan_forward(&Payload::text("hi"), role, &LabelsConfig::default());
        assert_eq!(out, Outgoing::Text(expected.into()));
    }

    #[test]
    fn media_keeps_kind_and_file_id() {
        let payload = Payload::media(MediaKind::Document, "doc-1", Some("contract".into()));
        let out = plan_forward(&payload, Role::Customer, &LabelsConfig::default());
        assert_eq!(out, Outgoing::Media {
            media: MediaKind::Document,
            file_id: "doc-1".into(),
            caption: "👤 Клиент: contract".into(),
        });
    }

    #[rstest]
    #[case::none(None)]
    #[case::empty(Some(String::new()))]
    fn media_without_caption_uses_placeholder(#[case] caption: Option<String>) {
        let payload = Payload::media(MediaKind::Voice, "v-1", caption);
        let Outgoing::Media { caption, .. } =
            plan_forward(&payload, Role::Executor, &LabelsConfig::default())
        else {
            panic!("expected media");
        };
        assert_eq!(caption, "🧑‍🎨 Команда: (вложение)");
    }

    #[rstest]
    #[case::text(Some("loc"), None, "👤 Клиент: loc")]
    #[case::caption(None, Some("cap"), "👤 Клиент: cap")]
    #[case::text_wins(Some("t"), Some("c"), "👤 Клиент: t")]
    #[case::neither(None, None, "👤 Клиент: (неизвестный тип сообщения)")]
    fn unknown_falls_back_to_text(
        #[case] text: Option<&str>,
        #[case] caption: Option<&str>,
        #[case] expected: &str,
    ) {
        let payload = Payload::Unknown {
            text: text.map(Into::into),
            caption: caption.map(Into::into),
        };
        let out = plan_forward(&payload, Role::Customer, &LabelsConfig::default());
        assert_eq!(out, Outgoing::Text(expected.into()));
    }

    fn utf16_len(s: &str) -> usize {
        s.encode_utf16().count()
    }

    #[test]
    fn long_text_is_cut_to_the_message_limit() {
        let body = "я".repeat(5000);
        let Outgoing::Text(out) =
            plan_forward(&Payload::text(body), Role::Customer, &LabelsConfig::default())
        else {
            panic!("expected text");
        };
        assert_eq!(utf16_len(&out), MAX_TEXT_LEN);
        assert!(out.starts_with("👤 Клиент: яяя"));
        assert!(out.ends_with('…'));
    }

    #[test]
    fn long_caption_is_cut_to_the_caption_limit() {
        let payload = Payload::media(MediaKind::Photo, "p-1", Some("x".repeat(2000)));
        let Outgoing::Media { caption, .. } =
            plan_forward(&payload, Role::Executor, &LabelsConfig::default())
        else {
            panic!("expected media");
        };
        assert_eq!(utf16_len(&caption), MAX_CAPTION_LEN);
        assert!(caption.starts_with("🧑‍🎨 Команда: x"));
        assert!(caption.ends_with('…'));
    }

    #[test]
    fn text_at_the_limit_is_untouched() {
        let labels = LabelsConfig::default();
        let prefix_len = utf16_len(prefix_for(Role::Customer, &labels)) + 1;
        let body = "b".repeat(MAX_TEXT_LEN - prefix_len);
        let out = plan_forward(&Payload::text(body.clone()), Role::Customer, &labels);
        assert_eq!(out, Outgoing::Text(format!("👤 Клиент: {body}")));
    }

    #[test]
    fn cut_never_splits_a_surrogate_pair() {
        let out = prefixed("p", &"😀".repeat(10), 8);
        // "p " is 2 units, each emoji 2, ellipsis 1: a third emoji would make 9.
        assert_eq!(out, "p 😀😀…");
    }

    #[test]
    fn custom_labels_apply() {
        let labels = LabelsConfig {
            customer: "C:".into(),
            ..LabelsConfig::default()
        };
        assert_eq!(prefix_for(Role::Customer, &labels), "C:");
        assert_eq!(
            plan_forward(&Payload::text("x"), Role::Customer, &labels),
            Outgoing::Text("C: x".into())
        );
    }
}
