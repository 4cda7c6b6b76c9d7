//! Envelope construction and response encoding.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_json::json;

use rpcgate_core::protocol::codec::{decode_response, encode_request, encode_response, decode_request};
use rpcgate_core::{Caller, RequestEnvelope, ResponseEnvelope, Role, UserIdentity};

#[test]
fn empty_name_is_refused_by_constructor() {
    let err = RequestEnvelope::new("", vec![], None).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn failure_never_carries_result() {
    let resp = ResponseEnvelope::failure("Invalid method: nope");
    assert!(resp.is_error());
    assert!(resp.result().is_none());
    assert_eq!(resp.error(), Some("Invalid method: nope"));
}

#[test]
fn failure_encodes_null_result() {
    let resp = ResponseEnvelope::failure("Permission denied: Invalid or expired token.");
    let bytes = encode_response(&resp).unwrap();
    let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        v,
        json!({ "result": null, "error": "Permission denied: Invalid or expired token." })
    );
}

#[test]
fn success_decodes_back() {
    let resp = ResponseEnvelope::success(json!({ "username": "alice" }));
    let back = decode_response(&encode_response(&resp).unwrap()).unwrap();
    assert_eq!(back, resp);
    assert_eq!(back.into_result().unwrap()["username"], "alice");
}

#[test]
fn request_with_caller_survives_encoding() {
    let caller = Caller {
        user: UserIdentity { id: "root".into(), role: Role::Admin },
        token: "abc".into(),
    };
    let req = RequestEnvelope::new("get_user", vec![json!("alice")], Some(caller.clone())).unwrap();
    let frame = encode_request(&req).unwrap();
    let back = decode_request(&frame, 1024).unwrap();
    assert_eq!(back.metadata(), Some(&caller));
    assert_eq!(back.args(), &[json!("alice")]);
}
