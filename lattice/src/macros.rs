/// Creates a single transcript [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use lattice::{Role, lt_msg};
///
/// let message = lt_msg!(assistant => "Done.");
/// assert_eq!(message.role(), Role::Assistant);
/// assert_eq!(message.content(), "Done.");
///
/// let result = lt_msg!(tool["call_1"] => "hello");
/// assert_eq!(result.tool_call_id(), Some("call_1"));
/// ```
#[macro_export]
macro_rules! lt_msg {
    (system => $content:expr $(,)?) => {
        $crate::Message::system($content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Message::user($content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::assistant($content)
    };
    (tool[$call_id:expr] => $content:expr $(,)?) => {
        $crate::Message::tool($call_id, $content)
    };
    (tool => $content:expr $(,)?) => {
        compile_error!("tool messages need a call id: tool[\"call_1\"] => content");
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, assistant, or tool[id]");
    };
}

/// Creates a `Vec<Message>` from role/content pairs.
///
/// ```rust
/// use lattice::{Role, lt_messages};
///
/// let messages = lt_messages![
///     system => "You are concise.",
///     user => "Read x.txt.",
/// ];
///
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[0].role(), Role::System);
/// assert_eq!(messages[1].role(), Role::User);
/// ```
#[macro_export]
macro_rules! lt_messages {
    () => {
        Vec::<$crate::Message>::new()
    };
    ($($role:ident $([$call_id:expr])? => $content:expr),+ $(,)?) => {
        vec![$($crate::lt_msg!($role $([$call_id])? => $content)),+]
    };
}

/// Creates a [`ChatPolicy`](crate::ChatPolicy), optionally with a system prompt and round limit.
///
/// ```rust
/// use lattice::lt_policy;
///
/// let policy = lt_policy!("gpt-4o-mini", "Be concise.", rounds = 4);
/// assert_eq!(policy.system_prompt, "Be concise.");
/// assert_eq!(policy.max_rounds, Some(4));
///
/// let unbounded = lt_policy!("gpt-4o-mini", rounds = unbounded);
/// assert_eq!(unbounded.max_rounds, None);
/// ```
#[macro_export]
macro_rules! lt_policy {
    ($model:expr $(,)?) => {
        $crate::ChatPolicy::new($model)
    };
    ($model:expr, rounds = unbounded $(,)?) => {
        $crate::ChatPolicy::new($model).unbounded()
    };
    ($model:expr, rounds = $rounds:expr $(,)?) => {
        $crate::ChatPolicy::new($model).with_max_rounds($rounds)
    };
    ($model:expr, $system_prompt:expr $(,)?) => {
        $crate::ChatPolicy::new($model).with_system_prompt($system_prompt)
    };
    ($model:expr, $system_prompt:expr, rounds = unbounded $(,)?) => {
        $crate::ChatPolicy::new($model)
            .with_system_prompt($system_prompt)
            .unbounded()
    };
    ($model:expr, $system_prompt:expr, rounds = $rounds:expr $(,)?) => {
        $crate::ChatPolicy::new($model)
            .with_system_prompt($system_prompt)
            .with_max_rounds($rounds)
    };
}
