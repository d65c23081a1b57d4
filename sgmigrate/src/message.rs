use std::fmt::Display;

const LIST_SEPARATOR: &str = ", ";
const KEY_VALUE_SEPARATOR: &str = ": ";
const SENTENCE_END: &str = ".";

/// Composes one report message from sentences, key/value pairs and lists.
///
/// [`MessageBuilder::finalize`] takes the builder by value, so a finished
/// message can be neither finalized again nor extended.
#[derive(Debug, Default)]
pub struct MessageBuilder {
    text: String,
    pending: Option<&'static str>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, part: impl AsRef<str>) -> &mut Self {
        let part = part.as_ref();
        if part.is_empty() {
            return self;
        }
        if let Some(separator) = self.pending.take() {
            self.text.push_str(separator);
        }
        self.text.push_str(part);
        self
    }

    /// `a, b, c`
    pub fn append_separated<I>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let joined = items
            .into_iter()
            .map(|item| item.to_string())
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR);
        self.append(joined)
    }

    /// `key: value`
    pub fn append_key_value(&mut self, key: impl AsRef<str>, value: impl Display) -> &mut Self {
        self.append(key)
            .append(KEY_VALUE_SEPARATOR)
            .append(value.to_string())
    }

    /// `singular: a` for one item, `plural: a, b` for more.
    pub fn append_key_value_separated<T: Display>(
        &mut self,
        singular: impl AsRef<str>,
        plural: impl AsRef<str>,
        items: &[T],
    ) -> &mut Self {
        let key = if items.len() == 1 {
            singular.as_ref()
        } else {
            plural.as_ref()
        };
        self.append(key)
            .append(KEY_VALUE_SEPARATOR)
            .append_separated(items)
    }

    pub fn next_sentence(&mut self) -> &mut Self {
        self.close_sentence();
        self.pending = Some(" ");
        self
    }

    pub fn next_line(&mut self) -> &mut Self {
        self.close_sentence();
        self.pending = Some("\n");
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn finalize(mut self) -> String {
        self.close_sentence();
        self.text
    }

    fn close_sentence(&mut self) {
        if !self.text.is_empty() && !self.text.ends_with(SENTENCE_END) {
            self.text.push_str(SENTENCE_END);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MessageBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn composes_sentences_with_key_values() {
        let mut builder = MessageBuilder::new();
        builder
            .append_key_value("These scopes exist", "SUB, ONE")
            .next_sentence()
            .append("The scope was omitted");
        assert_eq!(
            builder.finalize(),
            "These scopes exist: SUB, ONE. The scope was omitted."
        );
    }

    #[test]
    fn singular_and_plural_lists() {
        let mut one = MessageBuilder::new();
        one.append_key_value_separated("Unknown privilege", "Unknown privileges", &["a"]);
        assert_eq!(one.finalize(), "Unknown privilege: a.");

        let mut many = MessageBuilder::new();
        many.append_key_value_separated("Unknown privilege", "Unknown privileges", &["a", "b"]);
        assert_eq!(many.finalize(), "Unknown privileges: a, b.");
    }

    #[test]
    fn next_line_separates_without_double_periods() {
        let mut builder = MessageBuilder::new();
        builder.append("First.").next_line().append("Second").next_sentence();
        assert_eq!(builder.finalize(), "First.\nSecond.");
    }

    #[test]
    fn empty_builder_finalizes_to_empty_text() {
        assert_eq!(MessageBuilder::new().finalize(), "");
    }
}
