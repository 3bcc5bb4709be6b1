//! Type descriptor and generic signature scanning

use regex::Regex;
use std::sync::OnceLock;

/// Convert an internal name (`com/example/Foo`) to binary form (`com.example.Foo`)
pub fn to_binary_name(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Object types mentioned by a field or method descriptor, in binary form.
///
/// Primitives and `void` contribute nothing; an array contributes its
/// element type when that is an object. Malformed input stops the scan and
/// returns what was collected so far.
pub fn object_types(descriptor: &str) -> Vec<String> {
    let mut types = Vec::new();
    let bytes = descriptor.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'(' | b')' | b'[' => i += 1,
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b'V' => i += 1,
            b'L' => match descriptor[i + 1..].find(';') {
                Some(end) => {
                    let name = &descriptor[i + 1..i + 1 + end];
                    if !name.is_empty() {
                        types.push(to_binary_name(name));
                    }
                    i += end + 2;
                }
                None => break,
            },
            _ => break,
        }
    }

    types
}

fn signature_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"L([^;<]+);").expect("static pattern"))
}

/// Every `L<classname>;` token of a generic signature, in binary form.
///
/// `(Ljava/lang/String;)Lkotlin/Result<Lcom/example/Product;>;` yields
/// `java.lang.String` and `com.example.Product`; a parameterized outer type is
/// left to the plain descriptor.
pub fn signature_types(signature: &str) -> Vec<String> {
    signature_pattern()
        .captures_iter(signature)
        .map(|caps| to_binary_name(&caps[1]))
        .collect()
}
