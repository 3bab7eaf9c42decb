use crate::bson::Document;

/// The key of a command document's verb, i.e. its first key.
pub(crate) fn first_key(document: &Document) -> Option<&str> {
    document.keys().next().map(String::as_str)
}
