//! Request codec vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use rpcgate_core::protocol::codec::decode_request;

mod vector_loader;
use vector_loader::TestVector;

fn load(name: &str) -> TestVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

#[test]
fn request_vectors() {
    let files = [
        "request_min.json",
        "request_full.json",
        "request_empty_name.json",
        "request_unknown_field.json",
        "request_bad_role.json",
        "request_not_utf8.json",
        "request_too_large.json",
    ];

    for f in files {
        let v = load(f);
        let raw = v.frame.decode();
        let res = decode_request(&raw, v.max_frame_bytes.unwrap_or(64 * 1024));

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.client_code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let req = res.expect("expected ok request");
        let ex = v.expect.expect("missing expect block");

        assert_eq!(req.name(), ex["name"].as_str().unwrap(), "vector={}", v.description);
        assert_eq!(serde_json::to_value(req.args()).unwrap(), ex["args"], "vector={}", v.description);
        assert_eq!(
            serde_json::to_value(req.metadata()).unwrap(),
            ex["metadata"],
            "vector={}",
            v.description
        );
    }
}
