use crate::contracts::encoding::traits::{Field, ParamKind};
use crate::error::{SocialError, SocialResult};

mod generated {
    include!(concat!(env!("OUT_DIR"), "/selectors.rs"));
}

pub use generated::*;

/// Read methods go through `eth_call`; write methods are signed and mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: &'static str,
    pub signature: &'static str,
    pub selector: [u8; 4],
    pub kind: MethodKind,
    pub arguments: &'static [ParamKind],
    pub results: &'static [Field],
}

pub const GET_POSTS_COUNT: MethodSpec = MethodSpec {
    name: "getPostsCount",
    signature: GET_POSTS_COUNT_SIGNATURE,
    selector: GET_POSTS_COUNT_SELECTOR,
    kind: MethodKind::Read,
    arguments: &[],
    results: &[Field::new("count", ParamKind::Uint256)],
};

pub const GET_POST: MethodSpec = MethodSpec {
    name: "getPost",
    signature: GET_POST_SIGNATURE,
    selector: GET_POST_SELECTOR,
    kind: MethodKind::Read,
    arguments: &[ParamKind::Uint256],
    results: &[
        Field::new("author", ParamKind::Address),
        Field::new("content", ParamKind::String),
        Field::new("timestamp", ParamKind::Uint256),
        Field::new("likes", ParamKind::Uint256),
    ],
};

pub const CREATE_POST: MethodSpec = MethodSpec {
    name: "createPost",
    signature: CREATE_POST_SIGNATURE,
    selector: CREATE_POST_SELECTOR,
    kind: MethodKind::Write,
    arguments: &[ParamKind::String],
    results: &[],
};

pub const LIKE_POST: MethodSpec = MethodSpec {
    name: "likePost",
    signature: LIKE_POST_SIGNATURE,
    selector: LIKE_POST_SELECTOR,
    kind: MethodKind::Write,
    arguments: &[ParamKind::Uint256],
    results: &[],
};

/// Every method the client may invoke. Adding one means adding its signature to `build.rs`
/// and an entry here.
pub static METHODS: &[MethodSpec] = &[GET_POSTS_COUNT, GET_POST, CREATE_POST, LIKE_POST];

/// Name → method lookup over the fixed table.
pub struct MethodTable {
    methods: &'static [MethodSpec],
}

impl MethodTable {
    pub fn new() -> Self {
        Self { methods: METHODS }
    }

    pub fn get(&self, name: &str) -> SocialResult<&'static MethodSpec> {
        self.methods
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| SocialError::UnknownMethod(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static MethodSpec> {
        self.methods.iter()
    }
}

impl Default for MethodTable {
    fn default() -> Self {
        Self::new()
    }
}
