// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!

    // Zero-arg → String::new()
    () => {
        ::std::string::String::new()
    };
    // Any single expression: literals, consts, or vars
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

#[macro_export]
macro_rules! join {
    // String-type concatenation shorthand!
    ($first:expr $(, $rest:expr)+ $(,)?) => {{
        let mut s = ::std::string::String::from($first);
        $(
            s.push_str($rest);
        )+
        s
    }};
}

#[macro_export]
macro_rules! pct {
    // Share of `part` in `total` as "12.3%"; 0 total → "0.0%"
    ($part:expr, $total:expr) => {{
        let total = $total as f64;
        let part = $part as f64;
        let v = if total > 0.0 { part * 100.0 / total } else { 0.0 };
        format!("{:.1}%", v)
    }};
}
