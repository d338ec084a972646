//! An in-memory model of the balance contract's action allowlist
//!
//! Used to dry-run approval plans and to check the on-chain lookup against a
//! known-good reference. Lookups follow the contract's precedence: a contract
//! grant allows any call, then a function grant allows any arguments, then a
//! parameter grant allows the call if the argument word at any registered
//! index hashes to a pinned value.

use std::collections::{BTreeMap, HashMap, HashSet};

use alloy_primitives::{Address, Selector, B256};

use crate::{
    calldata::CallData,
    types::{ActionDescriptor, ActionType},
};

/// The approvals granted for a single `(target, selector)` pair, keyed by
/// the constrained argument word index
type ParamGrants = BTreeMap<usize, HashSet<B256>>;

/// The set of approvals currently in force
#[derive(Clone, Debug, Default)]
pub struct ApprovalRegistry {
    /// Targets approved for any call
    contracts: HashSet<Address>,
    /// Functions approved for any arguments
    functions: HashSet<(Address, Selector)>,
    /// Functions approved only for pinned argument values
    parameters: HashMap<(Address, Selector), ParamGrants>,
}

impl ApprovalRegistry {
    /// Construct an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a grant or revocation
    pub fn apply(&mut self, descriptor: &ActionDescriptor) {
        let ActionDescriptor {
            action_type,
            target,
            selector,
            param_index,
            param_hash,
            status,
        } = *descriptor;

        match (action_type, status) {
            (ActionType::Contract, true) => {
                self.contracts.insert(target);
            }
            (ActionType::Contract, false) => {
                self.contracts.remove(&target);
            }
            (ActionType::Function, true) => {
                self.functions.insert((target, selector));
            }
            (ActionType::Function, false) => {
                self.functions.remove(&(target, selector));
            }
            (ActionType::Parameter, true) => {
                self.parameters
                    .entry((target, selector))
                    .or_default()
                    .entry(param_index)
                    .or_default()
                    .insert(param_hash);
            }
            (ActionType::Parameter, false) => self.revoke_parameter(target, selector, param_index, param_hash),
        }
    }

    /// Apply every descriptor in order
    pub fn apply_all<'a>(&mut self, descriptors: impl IntoIterator<Item = &'a ActionDescriptor>) {
        descriptors.into_iter().for_each(|d| self.apply(d));
    }

    /// Whether the balance contract would relay `data` to `target`
    pub fn is_action_allowed(&self, target: Address, data: &[u8]) -> bool {
        if self.contracts.contains(&target) {
            return true;
        }

        let Ok(call) = CallData::new(data) else {
            return false;
        };
        let key = (target, call.selector());
        if self.functions.contains(&key) {
            return true;
        }

        let Some(grants) = self.parameters.get(&key) else {
            return false;
        };
        grants.iter().any(|(slot, hashes)| {
            call.word_hash(*slot).is_some_and(|hash| hashes.contains(&hash))
        })
    }

    /// Whether no approvals are in force
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty() && self.functions.is_empty() && self.parameters.is_empty()
    }

    /// Remove a single pinned value, pruning emptied entries
    fn revoke_parameter(
        &mut self,
        target: Address,
        selector: Selector,
        param_index: usize,
        param_hash: B256,
    ) {
        let key = (target, selector);
        let Some(grants) = self.parameters.get_mut(&key) else {
            return;
        };

        if let Some(hashes) = grants.get_mut(&param_index) {
            hashes.remove(&param_hash);
            if hashes.is_empty() {
                grants.remove(&param_index);
            }
        }
        if grants.is_empty() {
            self.parameters.remove(&key);
        }
    }
}
