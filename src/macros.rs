#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).expect("regex literal must compile"));
        &*RE
    }};
}

/// Declare a [`Rule`](crate::Rule).
///
/// ```
/// let rule = fastcontext::context_rule! {
///     id: 1,
///     pattern: "no evidence of",
///     category: "NEG",
///     direction: Forward,
///     window: 8,
/// };
/// assert_eq!(rule.determinants(), vec!["fNEG".to_string()]);
/// ```
#[macro_export]
macro_rules! context_rule {
    (@kind) => {
        $crate::TriggerKind::Trigger
    };
    (@kind $kind:ident) => {
        $crate::TriggerKind::$kind
    };
    (
        id: $id:expr,
        pattern: $pattern:expr,
        category: $category:expr,
        direction: $direction:ident
        $(, kind: $kind:ident)?
        $(, window: $window:expr)?
        $(,)?
    ) => {{
        let rule = $crate::Rule::new(
            $id,
            $pattern,
            $category,
            $crate::Direction::$direction,
            $crate::context_rule!(@kind $($kind)?),
        );
        $(let rule = rule.with_window($window);)?
        rule
    }};
}
