//! Generates the 4-byte method selectors from canonical function signatures.
//!
//! The dispatch table in `src/contracts/abi/definitions.rs` includes the generated file, so a
//! selector can never drift from the signature it was derived from.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use alloy_primitives::keccak256;

/// (constant prefix, canonical signature)
const SIGNATURES: &[(&str, &str)] = &[
    ("GET_POSTS_COUNT", "getPostsCount()"),
    ("GET_POST", "getPost(uint256)"),
    ("CREATE_POST", "createPost(string)"),
    ("LIKE_POST", "likePost(uint256)"),
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let mut out = String::from("// @generated by build.rs from canonical signatures. Do not edit.\n\n");
    for (prefix, signature) in SIGNATURES {
        let hash = keccak256(signature.as_bytes());
        let selector = &hash.0[..4];

        writeln!(out, "pub const {prefix}_SIGNATURE: &str = \"{signature}\";").unwrap();
        writeln!(
            out,
            "pub const {prefix}_SELECTOR: [u8; 4] = [0x{:02x}, 0x{:02x}, 0x{:02x}, 0x{:02x}];\n",
            selector[0], selector[1], selector[2], selector[3]
        )
        .unwrap();
    }

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest = Path::new(&out_dir).join("selectors.rs");
    fs::write(&dest, out).expect("write generated selectors");
}
