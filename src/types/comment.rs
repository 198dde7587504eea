/// Kind of comment event pushed for the active coin context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentKind {
    NewComment,
    CommentLiked,
}

/// A comment event delivered to the callback registered for the active coin.
///
/// Comment frames carry no coin identifier on the wire: the backend scopes
/// them to the session's `set_coin` context, and routing on this side is
/// purely by the local active coin. That is a protocol invariant the backend
/// must uphold. The payload shape is owned by the comments service, so it is
/// surfaced as raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentEvent {
    pub kind: CommentKind,
    pub body: serde_json::Map<String, serde_json::Value>,
}
