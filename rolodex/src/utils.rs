use serde::Serialize;
use std::num::Wrapping;

/// djb2 over the raw query text. This is the starting value for
/// [`progressive_hash`](fn.progressive_hash.html).
pub fn query_key(query: &str) -> u32 {
    let mut h = Wrapping(5381u32);
    for byte in query.bytes() {
        h = (h << 5) + h + Wrapping(byte as u32);
    }
    h.0
}

/// When we have separate values it's useful to run a progressive
/// version of djb2 where we pretend that we're still looping over
/// the same value
pub fn progressive_hash<V: Serialize>(h: u32, x: &V) -> Result<u64, bincode::Error> {
    let x = bincode::serialize(x)?;

    let mut h = Wrapping(h as u64);

    for byte in x {
        h = (h << 5) + h + Wrapping(byte as u64)
    }

    Ok(h.0)
}

#[cfg(test)]
mod test {
    use super::{progressive_hash, query_key};
    use serde_json::json;

    #[test]
    fn query_key_depends_on_text() {
        assert_eq!(query_key("{ people { id } }"), query_key("{ people { id } }"));
        assert_ne!(query_key("{ people { id } }"), query_key("{ people { name } }"));
    }

    #[test]
    fn progressive_hash_includes_variables() {
        let key = query_key("mutation { editPerson { id } }");
        let a = progressive_hash(key, &json!({ "id": "1" })).unwrap();
        let b = progressive_hash(key, &json!({ "id": "2" })).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, progressive_hash(key, &json!({ "id": "1" })).unwrap());
    }
}
