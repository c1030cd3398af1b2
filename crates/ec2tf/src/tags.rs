//! key/value tags and their `tags = { ... }` rendering
use crate::syntax;
use hcl_edit::expr::Expression;
use hcl_edit::structure::Attribute;
use hcl_edit::Ident;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct Tag {
    #[serde(alias = "Key")]
    pub key: String,
    #[serde(alias = "Value", default)]
    pub value: String,
}

/// Tags in the order the upstream API returned them
///
/// That order is not stable between calls, so nothing may be rendered from it directly. Use [Tags::sorted].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(Vec<Tag>);

impl Tags {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value.as_str())
    }

    /// Tags ordered by ascending key. Should a key repeat, the first occurrence wins.
    pub fn sorted(&self) -> Vec<&Tag> {
        let mut sorted: Vec<&Tag> = self.0.iter().collect();
        // stable sort keeps the first duplicate in front
        sorted.sort_by(|a, b| a.key.cmp(&b.key));
        sorted.dedup_by(|next, previous| next.key == previous.key);
        sorted
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Tags(
            iter.into_iter()
                .map(|(key, value)| Tag::new(key.into(), value.into()))
                .collect(),
        )
    }
}

/// The `tags` object attribute for a body at `indent`
///
/// Entries are emitted by ascending key. An empty set renders as `tags = {}`.
pub fn tags_attribute(tags: &Tags, indent: usize) -> Attribute {
    let entries: Vec<_> = tags
        .sorted()
        .into_iter()
        .map(|tag| (syntax::object_key(&tag.key), Expression::from(tag.value.as_str())))
        .collect();

    tracing::trace!(count = entries.len(), "formatting tags");
    Attribute::new(Ident::new("tags"), syntax::object(entries, indent))
}

/// Render tags as a `tags` object attribute, indented by `indent` spaces
pub fn format_tags(tags: &Tags, indent: usize) -> String {
    syntax::render_at(tags_attribute(tags, indent), indent)
}
