/// Build a `Document` from `key => value` pairs, in order.
///
/// ```ignore
/// let selector = doc! { "age" => doc! { "$gt" => 18 }, "name" => "Bob" };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::value::Document::new()
    };
    ( $( $key:expr => $value:expr ),+ $(,)? ) => {{
        let mut document = $crate::value::Document::new();
        $( document.insert($key, $value); )+
        document
    }};
}
