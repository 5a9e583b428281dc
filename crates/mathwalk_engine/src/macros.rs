/// Declare a rewrite rule as a unit struct plus its `Rule` impl.
///
/// ```ignore
/// define_rule!(
///     AddZeroRule,
///     "Remove Addition of Zero",
///     ChangeKind::Arithmetic,
///     |ctx, expr| { ... }
/// );
/// ```
#[macro_export]
macro_rules! define_rule {
    (
        $(#[$meta:meta])*
        $struct_name:ident,
        $name_str:expr,
        $kind:expr,
        | $ctx:ident, $expr:ident | $body:block
    ) => {
        $(#[$meta])*
        pub struct $struct_name;

        impl $crate::rule::Rule for $struct_name {
            fn name(&self) -> &'static str {
                $name_str
            }

            fn change_kind(&self) -> $crate::change::ChangeKind {
                $kind
            }

            fn apply(
                &self,
                $ctx: &mut mathwalk_ast::Context,
                $expr: mathwalk_ast::ExprId,
            ) -> Option<$crate::rule::Rewrite> {
                $body
            }
        }
    };
}
