//! Message Formatting
//!
//! Renders alerts and announcements for a chat destination that parses
//! legacy Markdown.

use crate::model::AlertRecord;

/// Markdown-significant characters and their look-alike replacements
const SUBSTITUTIONS: [(char, char); 10] = [
    ('-', '–'),
    ('*', '•'),
    ('_', '‗'),
    ('[', '⟦'),
    (']', '⟧'),
    ('(', '❨'),
    (')', '❩'),
    ('~', '˜'),
    ('\\', '⧵'),
    ('`', 'ˋ'),
];

/// Replace every Markdown-significant character with a look-alike
///
/// Each character is mapped exactly once, so replacements are never
/// re-escaped and the text length in characters is preserved.
pub fn escape_markdown(text: &str) -> String {
    text.chars()
        .map(|c| {
            SUBSTITUTIONS
                .iter()
                .find(|(special, _)| *special == c)
                .map_or(c, |(_, replacement)| *replacement)
        })
        .collect()
}

/// Render one alert as a chat message
pub fn format_alert(alert: &AlertRecord) -> String {
    let mut out = String::from("🚨 *Alert!* 🚨\n\n");
    push_field(&mut out, "Name", &alert.name);
    push_field(&mut out, "Summary", &alert.summary);
    if !alert.description.is_empty() {
        push_field(&mut out, "Description", &alert.description);
    }
    out.push('\n');
    push_field(&mut out, "Instance", &alert.instance);
    push_field(&mut out, "Job", &alert.job);
    push_field(&mut out, "Severity", &alert.severity);
    push_field(&mut out, "State", &alert.state);
    push_field(&mut out, "Active Since", &alert.active_since);
    out
}

fn push_field(out: &mut String, label: &str, value: &str) {
    out.push('*');
    out.push_str(label);
    out.push_str(":* ");
    out.push_str(&escape_markdown(value));
    out.push('\n');
}

/// Fixed announcement texts
pub mod messages {
    use super::escape_markdown;

    /// Sent once the bridge is up and polling
    pub const STARTUP: &str = "🤖 Alert bridge started and is monitoring the system.";

    /// Sent when every previously firing alert has cleared
    pub const RESOLVED: &str = "🛠️ All problems have been successfully resolved.";

    /// Sent right after [`RESOLVED`]
    pub const STABLE: &str = "✅ All systems are operating normally.";

    /// Sent when the pre-flight check against the alert source fails
    pub fn service_down(reason: &str) -> String {
        format!("❌ Service unavailable: {}", escape_markdown(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SPECIALS: &str = "-*_[]()~\\`";

    fn sample_alert() -> AlertRecord {
        AlertRecord {
            name: "CPUHigh".into(),
            instance: "db1:9100".into(),
            job: "node".into(),
            severity: "critical".into(),
            state: "firing".into(),
            summary: "CPU above 90%".into(),
            description: String::new(),
            active_since: "2024-05-01T10:00:00Z".into(),
            value: None,
        }
    }

    /// Field values of a rendered alert, in order, without the label framing
    fn field_values(message: &str) -> Vec<String> {
        message
            .lines()
            .filter_map(|line| line.split_once(":* "))
            .map(|(_, value)| value.to_string())
            .collect()
    }

    #[test]
    fn test_escape_every_special_character() {
        assert_eq!(escape_markdown(SPECIALS), "–•‗⟦⟧❨❩˜⧵ˋ");
    }

    #[test]
    fn test_escape_stray_backtick() {
        assert_eq!(escape_markdown("disk `/var full"), "disk ˋ/var full");
    }

    #[test]
    fn test_escape_leaves_plain_text() {
        assert_eq!(escape_markdown("disk full on db1:9100"), "disk full on db1:9100");
        assert_eq!(escape_markdown(""), "");
    }

    #[test]
    fn test_format_alert_layout() {
        let message = format_alert(&sample_alert());
        let expected = "🚨 *Alert!* 🚨\n\n\
            *Name:* CPUHigh\n\
            *Summary:* CPU above 90%\n\
            \n\
            *Instance:* db1:9100\n\
            *Job:* node\n\
            *Severity:* critical\n\
            *State:* firing\n\
            *Active Since:* 2024–05–01T10:00:00Z\n";
        assert_eq!(message, expected);
    }

    #[test]
    fn test_format_alert_with_description() {
        let alert = AlertRecord {
            description: "load_avg > 4".into(),
            ..sample_alert()
        };
        let message = format_alert(&alert);
        assert!(message.contains("*Description:* load‗avg > 4\n"));
    }

    #[test]
    fn test_format_escapes_each_field() {
        let alert = AlertRecord {
            name: "[Disk]".into(),
            instance: "web-01".into(),
            job: "node_exporter".into(),
            summary: "*80%* (root)".into(),
            ..sample_alert()
        };
        let values = field_values(&format_alert(&alert));
        assert_eq!(values[0], "⟦Disk⟧");
        assert_eq!(values[1], "•80%• ❨root❩");
        assert_eq!(values[2], "web–01");
        assert_eq!(values[3], "node‗exporter");
    }

    #[test]
    fn test_service_down_message() {
        assert_eq!(
            messages::service_down("http://prom:9090 is down"),
            "❌ Service unavailable: http://prom:9090 is down"
        );
    }

    proptest! {
        #[test]
        fn escaped_text_has_no_specials(text in ".*") {
            let escaped = escape_markdown(&text);
            prop_assert!(!escaped.chars().any(|c| SPECIALS.contains(c)));
            prop_assert_eq!(escaped.chars().count(), text.chars().count());
        }

        #[test]
        fn formatting_preserves_fields_in_order(
            name in "[a-zA-Z0-9 *_()~-]{1,12}",
            summary in "[a-zA-Z0-9 `\\[\\]\\\\-]{1,24}",
            instance in "[a-z0-9.:_-]{1,16}",
        ) {
            let alert = AlertRecord {
                name: name.clone(),
                summary: summary.clone(),
                instance: instance.clone(),
                ..sample_alert()
            };
            let values = field_values(&format_alert(&alert));
            prop_assert_eq!(values.len(), 7);
            prop_assert_eq!(&values[0], &escape_markdown(&name));
            prop_assert_eq!(&values[1], &escape_markdown(&summary));
            prop_assert_eq!(&values[2], &escape_markdown(&instance));
            for value in &values {
                prop_assert!(!value.chars().any(|c| SPECIALS.contains(c)));
            }
        }
    }
}
