//! Scripted in-memory wallet used by the orchestrator and service tests.
//!
//! Behaves like a wallet connected to a node running the microblog contract: posts and likes sent
//! through `eth_sendTransaction` are applied to an in-memory ledger once their receipt is released.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::contracts::abi::{CREATE_POST, GET_POST, GET_POSTS_COUNT, LIKE_POST};
use crate::contracts::encoding::codec::{
    chain_id_to_hex, hex_to_bytes, hex_to_chain_id, uint_to_u64, word_bytes_to_uint,
};
use crate::contracts::encoding::encoder::encode_dynamic_body;
use crate::contracts::encoding::{decode_result, Field, ParamKind};
use crate::contracts::execution::traits::{methods, ProviderError, WalletProvider};

pub const TEST_ACCOUNT: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

#[derive(Debug, Clone)]
pub struct MockPost {
    pub author: Address,
    pub content: String,
    pub timestamp: u64,
    pub likes: u64,
}

#[derive(Debug, Clone)]
enum PendingEffect {
    Create(String),
    Like(u64),
}

#[derive(Debug)]
struct MockState {
    accounts: Vec<String>,
    chain_id: u64,
    known_chains: HashSet<u64>,
    switch_error: Option<ProviderError>,
    add_error: Option<ProviderError>,
    add_switches: bool,
    send_error: Option<ProviderError>,
    polls_before_receipt: u32,
    receipt_status: String,
    posts: Vec<MockPost>,
    pending: HashMap<String, (u32, PendingEffect)>,
    sent: u64,
    requests: Vec<(String, Value)>,
}

pub struct MockWallet {
    state: Mutex<MockState>,
    latency: Option<Duration>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl MockWallet {
    /// A wallet on `chain_id` with one unlocked account and an empty ledger.
    pub fn new(chain_id: u64) -> Self {
        Self {
            state: Mutex::new(MockState {
                accounts: vec![TEST_ACCOUNT.to_string()],
                chain_id,
                known_chains: HashSet::from([chain_id]),
                switch_error: None,
                add_error: None,
                add_switches: true,
                send_error: None,
                polls_before_receipt: 0,
                receipt_status: "0x1".to_string(),
                posts: Vec::new(),
                pending: HashMap::new(),
                sent: 0,
                requests: Vec::new(),
            }),
            latency: None,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    pub fn with_accounts(self, accounts: &[&str]) -> Self {
        self.state.lock().unwrap().accounts = accounts.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_known_chain(self, chain_id: u64) -> Self {
        self.state.lock().unwrap().known_chains.insert(chain_id);
        self
    }

    pub fn with_switch_error(self, error: ProviderError) -> Self {
        self.state.lock().unwrap().switch_error = Some(error);
        self
    }

    pub fn with_add_error(self, error: ProviderError) -> Self {
        self.state.lock().unwrap().add_error = Some(error);
        self
    }

    /// Registration succeeds but leaves the wallet on its current chain.
    pub fn without_switch_on_add(self) -> Self {
        self.state.lock().unwrap().add_switches = false;
        self
    }

    pub fn with_send_error(self, error: ProviderError) -> Self {
        self.state.lock().unwrap().send_error = Some(error);
        self
    }

    /// Receipt polls answer `null` this many times before the receipt is released.
    pub fn with_polls_before_receipt(self, polls: u32) -> Self {
        self.state.lock().unwrap().polls_before_receipt = polls;
        self
    }

    pub fn with_receipt_status(self, status: &str) -> Self {
        self.state.lock().unwrap().receipt_status = status.to_string();
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_posts(self, posts: Vec<MockPost>) -> Self {
        self.state.lock().unwrap().posts = posts;
        self
    }

    /// `count` posts by the test account, post `i` reading `post #i`.
    pub fn with_numbered_posts(self, count: u64) -> Self {
        let author = TEST_ACCOUNT.parse().unwrap();
        let posts = (0..count)
            .map(|i| MockPost {
                author,
                content: format!("post #{}", i),
                timestamp: 1_700_000_000 + i,
                likes: i % 3,
            })
            .collect();
        self.with_posts(posts)
    }

    pub fn chain_id(&self) -> u64 {
        self.state.lock().unwrap().chain_id
    }

    pub fn posts(&self) -> Vec<MockPost> {
        self.state.lock().unwrap().posts.clone()
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    /// Highest number of requests observed in progress at the same time.
    pub fn max_concurrent_requests(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    fn answer(&self, method: &str, params: &Value) -> Result<Value, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push((method.to_string(), params.clone()));

        match method {
            methods::REQUEST_ACCOUNTS | methods::ACCOUNTS => Ok(json!(state.accounts)),
            methods::CHAIN_ID => Ok(json!(chain_id_to_hex(state.chain_id))),
            methods::SWITCH_CHAIN => {
                if let Some(error) = state.switch_error.clone() {
                    return Err(error);
                }
                let target = requested_chain(params)?;
                if !state.known_chains.contains(&target) {
                    return Err(ProviderError::new(
                        ProviderError::UNRECOGNIZED_CHAIN,
                        format!("Unrecognized chain ID \"{}\"", chain_id_to_hex(target)),
                    ));
                }
                state.chain_id = target;
                Ok(Value::Null)
            }
            methods::ADD_CHAIN => {
                if let Some(error) = state.add_error.clone() {
                    return Err(error);
                }
                let target = requested_chain(params)?;
                state.known_chains.insert(target);
                if state.add_switches {
                    state.chain_id = target;
                }
                Ok(Value::Null)
            }
            methods::CALL => {
                let data = call_data(params)?;
                state.eth_call(&data)
            }
            methods::SEND_TRANSACTION => {
                if let Some(error) = state.send_error.clone() {
                    return Err(error);
                }
                let data = call_data(params)?;
                let effect = state.effect_of(&data)?;
                state.sent += 1;
                let hash = format!("0x{:064x}", state.sent);
                let polls = state.polls_before_receipt;
                state.pending.insert(hash.clone(), (polls, effect));
                Ok(json!(hash))
            }
            methods::GET_RECEIPT => {
                let hash = params[0].as_str().unwrap_or_default().to_string();
                state.poll_receipt(&hash)
            }
            other => Err(ProviderError::new(
                ProviderError::UNSUPPORTED_METHOD,
                format!("method {} not supported", other),
            )),
        }
    }
}

impl MockState {
    fn eth_call(&self, data: &[u8]) -> Result<Value, ProviderError> {
        let (selector, args) = data.split_at(4.min(data.len()));
        if selector == GET_POSTS_COUNT.selector {
            return Ok(json!(word_hex(self.posts.len() as u64)));
        }
        if selector == GET_POST.selector {
            let index = uint_argument(args)?;
            let post = self
                .posts
                .get(index as usize)
                .ok_or_else(|| ProviderError::new(-32000, "execution reverted: bad id"))?;
            return Ok(json!(format!("0x{}", hex::encode(encode_post_return(post)))));
        }
        Err(ProviderError::new(-32000, "execution reverted"))
    }

    fn effect_of(&self, data: &[u8]) -> Result<PendingEffect, ProviderError> {
        let (selector, args) = data.split_at(4.min(data.len()));
        if selector == CREATE_POST.selector {
            const CONTENT: &[Field] = &[Field::new("content", ParamKind::String)];
            let decoded = decode_result(args, CONTENT)
                .map_err(|e| ProviderError::new(-32602, e.to_string()))?;
            let content = decoded
                .string("content")
                .map_err(|e| ProviderError::new(-32602, e.to_string()))?;
            return Ok(PendingEffect::Create(content.to_string()));
        }
        if selector == LIKE_POST.selector {
            return Ok(PendingEffect::Like(uint_argument(args)?));
        }
        Err(ProviderError::new(-32000, "execution reverted"))
    }

    fn poll_receipt(&mut self, hash: &str) -> Result<Value, ProviderError> {
        let Some((remaining, _)) = self.pending.get_mut(hash) else {
            return Ok(Value::Null);
        };
        if *remaining > 0 {
            *remaining -= 1;
            return Ok(Value::Null);
        }

        if let Some((_, effect)) = self.pending.remove(hash) {
            if self.receipt_status != "0x0" {
                self.apply(effect);
            }
        }
        Ok(json!({
            "transactionHash": hash,
            "blockNumber": "0x10",
            "gasUsed": "0x5208",
            "status": self.receipt_status,
        }))
    }

    fn apply(&mut self, effect: PendingEffect) {
        match effect {
            PendingEffect::Create(content) => {
                let author = self.accounts.first().and_then(|a| a.parse().ok()).unwrap_or_default();
                let timestamp = 1_700_000_000 + self.posts.len() as u64;
                self.posts.push(MockPost {
                    author,
                    content,
                    timestamp,
                    likes: 0,
                });
            }
            PendingEffect::Like(id) => {
                if let Some(post) = self.posts.get_mut(id as usize) {
                    post.likes += 1;
                }
            }
        }
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let result = self.answer(method, &params);
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn description(&self) -> &str {
        "MockWallet: scripted in-memory wallet"
    }
}

/// `getPost` return data: author | offset 0x80 | timestamp | likes | content body.
pub fn encode_post_return(post: &MockPost) -> Vec<u8> {
    let mut data = vec![0u8; 12];
    data.extend_from_slice(post.author.as_slice());
    data.extend_from_slice(&U256::from(0x80u64).to_be_bytes::<32>());
    data.extend_from_slice(&U256::from(post.timestamp).to_be_bytes::<32>());
    data.extend_from_slice(&U256::from(post.likes).to_be_bytes::<32>());
    data.extend(encode_dynamic_body(post.content.as_bytes()).unwrap());
    data
}

fn word_hex(value: u64) -> String {
    format!("0x{}", hex::encode(U256::from(value).to_be_bytes::<32>()))
}

fn requested_chain(params: &Value) -> Result<u64, ProviderError> {
    params[0]["chainId"]
        .as_str()
        .and_then(|hex| hex_to_chain_id(hex).ok())
        .ok_or_else(|| ProviderError::new(-32602, "chainId must be a 0x-prefixed hex string"))
}

fn call_data(params: &Value) -> Result<Vec<u8>, ProviderError> {
    params[0]["data"]
        .as_str()
        .and_then(|data| hex_to_bytes(data).ok())
        .ok_or_else(|| ProviderError::new(-32602, "missing call data"))
}

fn uint_argument(args: &[u8]) -> Result<u64, ProviderError> {
    let word: [u8; 32] = args
        .get(..32)
        .and_then(|w| w.try_into().ok())
        .ok_or_else(|| ProviderError::new(-32602, "missing uint256 argument"))?;
    uint_to_u64(word_bytes_to_uint(&word))
        .map_err(|_| ProviderError::new(-32000, "execution reverted: bad id"))
}
