//! Approval plans: batches of allowlist grants and revocations read from JSON
//!
//! A plan entry names its target and pinned values either by hex address or by
//! a name resolved through an [`AddressBook`], e.g. a well-known token or a
//! key in the deployments file. Each entry may carry a sample call which is
//! checked against the allowlist after the entry is applied.

use std::{fs, path::Path};

use action_codec::{
    calldata::encode_call, ActionDescriptor, ActionType, ApprovalRegistry, FieldLocator,
};
use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

use crate::errors::ScriptError;

/// A source of named addresses
pub trait AddressBook {
    /// Look up the address registered under `name`
    fn lookup(&self, name: &str) -> Option<Address>;

    /// Resolve a hex address or a registered name
    fn resolve(&self, value: &str) -> Result<Address, ScriptError> {
        value
            .parse::<Address>()
            .ok()
            .or_else(|| self.lookup(value))
            .ok_or_else(|| ScriptError::InvalidArgument(format!("unknown address `{value}`")))
    }

    /// Replace registered names with their addresses, leaving other values as given
    ///
    /// Names are replaced wherever they appear as an element of a tuple or array
    /// literal, e.g. `(whype,balance_contract,3000)`
    fn substitute(&self, value: &str) -> String {
        value
            .split_inclusive(is_delimiter)
            .map(|piece| {
                let (token, delimiter) = match piece.char_indices().last() {
                    Some((i, c)) if is_delimiter(c) => piece.split_at(i),
                    _ => (piece, ""),
                };
                match self.lookup(token.trim()) {
                    Some(address) => format!("{address}{delimiter}"),
                    None => piece.to_string(),
                }
            })
            .collect()
    }
}

/// Whether `c` separates the elements of a tuple or array literal
fn is_delimiter(c: char) -> bool {
    matches!(c, '(' | ')' | '[' | ']' | ',')
}

/// A batch of approvals applied in order
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ApprovalPlan {
    /// The approvals to apply
    pub approvals: Vec<PlanEntry>,
}

/// A sample call checked against the allowlist
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanCheck {
    /// The call's arguments, formatted for the entry's signature
    pub args: Vec<String>,
    /// Whether the call is expected to be allowed
    #[serde(default = "default_expect")]
    pub expect: bool,
}

/// Sample calls are expected to be allowed unless stated otherwise
fn default_expect() -> bool {
    true
}

/// A single grant or revocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// The scope of the approval
    pub scope: ActionType,
    /// The contract the approval applies to
    pub target: String,
    /// The canonical signature of the approved function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// The location of the pinned argument, `<argument>` or `<argument>.<field>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
    /// The pinned argument value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Whether to revoke rather than grant
    #[serde(default)]
    pub revoke: bool,
    /// A sample call to check after applying
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<PlanCheck>,
}

impl PlanEntry {
    /// The entry's function signature, required outside of contract scope
    fn signature(&self) -> Result<&str, ScriptError> {
        self.signature.as_deref().ok_or_else(|| {
            ScriptError::InvalidArgument(format!("{} approval needs a signature", self.scope))
        })
    }

    /// Build the descriptor this entry sends to the allowlist
    pub fn descriptor(&self, book: &impl AddressBook) -> Result<ActionDescriptor, ScriptError> {
        let target = book.resolve(&self.target)?;
        let descriptor = match self.scope {
            ActionType::Contract => ActionDescriptor::contract(target),
            ActionType::Function => ActionDescriptor::for_function(target, self.signature()?)?,
            ActionType::Parameter => {
                let locator: FieldLocator = self
                    .locator
                    .as_deref()
                    .ok_or_else(|| {
                        ScriptError::InvalidArgument("parameter approval needs a locator".into())
                    })?
                    .parse()?;
                let value = self.value.as_deref().ok_or_else(|| {
                    ScriptError::InvalidArgument("parameter approval needs a value".into())
                })?;

                ActionDescriptor::for_parameter(
                    target,
                    self.signature()?,
                    locator,
                    &book.substitute(value),
                )?
            }
        };

        Ok(if self.revoke { descriptor.revoked() } else { descriptor })
    }

    /// Encode the entry's sample call, if it has one
    pub fn check_calldata(&self, book: &impl AddressBook) -> Result<Option<Bytes>, ScriptError> {
        let Some(check) = &self.check else {
            return Ok(None);
        };

        let args: Vec<String> = check.args.iter().map(|arg| book.substitute(arg)).collect();
        Ok(Some(encode_call(self.signature()?, &args)?))
    }
}

/// The outcome of a sample call check
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckOutcome {
    /// The index of the plan entry
    pub entry: usize,
    /// Whether the call was allowed
    pub allowed: bool,
    /// Whether the call was expected to be allowed
    pub expected: bool,
}

impl CheckOutcome {
    /// Whether the allowlist behaved as expected
    pub fn passed(&self) -> bool {
        self.allowed == self.expected
    }
}

impl ApprovalPlan {
    /// Read a plan from a JSON file
    pub fn read(path: &Path) -> Result<Self, ScriptError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ScriptError::ReadPlan(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| ScriptError::ReadPlan(format!("{}: {}", path.display(), e)))
    }

    /// Build every descriptor in the plan, failing on the first invalid entry
    pub fn descriptors(
        &self,
        book: &impl AddressBook,
    ) -> Result<Vec<ActionDescriptor>, ScriptError> {
        self.approvals.iter().map(|entry| entry.descriptor(book)).collect()
    }

    /// Apply the plan to `registry`, checking each sample call after its entry
    pub fn dry_run(
        &self,
        registry: &mut ApprovalRegistry,
        book: &impl AddressBook,
    ) -> Result<Vec<CheckOutcome>, ScriptError> {
        let mut outcomes = Vec::new();
        for (i, entry) in self.approvals.iter().enumerate() {
            let descriptor = entry.descriptor(book)?;
            registry.apply(&descriptor);

            if let (Some(data), Some(check)) = (entry.check_calldata(book)?, &entry.check) {
                outcomes.push(CheckOutcome {
                    entry: i,
                    allowed: registry.is_action_allowed(descriptor.target, &data),
                    expected: check.expect,
                });
            }
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use action_codec::{hashing::address_param_hash, selector::function_selector};
    use alloy::primitives::address;

    use super::*;
    use crate::config::HYPEREVM_MAINNET;

    /// The wrapped native token
    const WHYPE: Address = address!("5555555555555555555555555555555555555555");
    /// A swap router
    const ROUTER: Address = address!("4E2960a8cd19B467b82d26D83fAcb0fAE26b094D");
    /// The fund contract
    const FUND: Address = address!("Fde5B0626fC80E36885e2fA9cD5ad9d7768D725c");
    /// The balance contract
    const BALANCE: Address = address!("543303266113B64d03Ec17B7ec3829f8CddADaC4");

    impl AddressBook for HashMap<&'static str, Address> {
        fn lookup(&self, name: &str) -> Option<Address> {
            self.get(name).copied()
        }
    }

    /// An address book with a few named contracts
    fn book() -> HashMap<&'static str, Address> {
        HashMap::from([
            ("whype", WHYPE),
            ("hyperswap_router", ROUTER),
            ("fund_contract", FUND),
            ("balance_contract", BALANCE),
        ])
    }

    /// A plan approving the router as a spender and the fund's withdrawal hook
    const PLAN: &str = r#"{
        "approvals": [
            {
                "scope": "parameter",
                "target": "whype",
                "signature": "approve(address,uint256)",
                "locator": "0",
                "value": "hyperswap_router",
                "check": { "args": ["hyperswap_router", "1"] }
            },
            {
                "scope": "function",
                "target": "fund_contract",
                "signature": "acquireWithdrawalFunds(uint256,address[],uint256[])",
                "check": { "args": ["1000", "[]", "[]"] }
            },
            {
                "scope": "parameter",
                "target": "whype",
                "signature": "approve(address,uint256)",
                "locator": "0",
                "value": "hyperswap_router",
                "revoke": true,
                "check": { "args": ["hyperswap_router", "1"], "expect": false }
            }
        ]
    }"#;

    #[test]
    fn test_parse_plan() {
        let plan: ApprovalPlan = serde_json::from_str(PLAN).unwrap();
        assert_eq!(plan.approvals.len(), 3);
        assert_eq!(plan.approvals[0].scope, ActionType::Parameter);
        assert!(plan.approvals[1].check.as_ref().unwrap().expect);
        assert!(plan.approvals[2].revoke);
    }

    #[test]
    fn test_plan_descriptors() {
        let plan: ApprovalPlan = serde_json::from_str(PLAN).unwrap();
        let descriptors = plan.descriptors(&book()).unwrap();

        let approve = function_selector("approve(address,uint256)");
        assert_eq!(
            descriptors[0],
            ActionDescriptor::parameter(WHYPE, approve, 0, address_param_hash(ROUTER))
        );
        assert_eq!(descriptors[1].action_type, ActionType::Function);
        assert_eq!(descriptors[1].target, FUND);
        assert_eq!(descriptors[2], descriptors[0].revoked());
    }

    #[test]
    fn test_plan_dry_run() {
        let plan: ApprovalPlan = serde_json::from_str(PLAN).unwrap();
        let mut registry = ApprovalRegistry::new();
        let outcomes = plan.dry_run(&mut registry, &book()).unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(CheckOutcome::passed));
        assert!(outcomes[0].allowed);
        assert!(!outcomes[2].allowed);
    }

    #[test]
    fn test_entry_missing_fields() {
        let entry = PlanEntry {
            scope: ActionType::Parameter,
            target: "whype".to_string(),
            signature: Some("approve(address,uint256)".to_string()),
            locator: None,
            value: None,
            revoke: false,
            check: None,
        };
        assert!(matches!(entry.descriptor(&book()), Err(ScriptError::InvalidArgument(_))));

        let entry = PlanEntry { target: "nowhere".to_string(), ..entry };
        assert!(entry.descriptor(&book()).is_err());
    }

    #[test]
    fn test_contract_scope_ignores_signature() {
        let entry = PlanEntry {
            scope: ActionType::Contract,
            target: FUND.to_string(),
            signature: None,
            locator: None,
            value: None,
            revoke: false,
            check: None,
        };
        assert_eq!(entry.descriptor(&book()).unwrap(), ActionDescriptor::contract(FUND));
    }

    #[test]
    fn test_substitute_inside_literals() {
        let book = book();
        assert_eq!(book.substitute("whype"), WHYPE.to_string());
        assert_eq!(book.substitute("1000"), "1000");
        assert_eq!(
            book.substitute("(whype, 3000,balance_contract)"),
            format!("({WHYPE}, 3000,{BALANCE})")
        );
        assert_eq!(
            book.substitute("[whype,fund_contract]"),
            format!("[{WHYPE},{FUND}]")
        );
        assert_eq!(book.substitute("(unknown,[])"), "(unknown,[])");
    }

    #[test]
    fn test_dry_run_struct_recipient_by_name() {
        let plan: ApprovalPlan = serde_json::from_str(
            r#"{
                "approvals": [
                    {
                        "scope": "parameter",
                        "target": "hyperswap_router",
                        "signature": "exactInputSingle((address,address,uint24,address,uint256,uint256,uint256,uint160))",
                        "locator": "0.3",
                        "value": "balance_contract",
                        "check": { "args": ["(whype,whype,3000,balance_contract,0,1,0,0)"] }
                    },
                    {
                        "scope": "parameter",
                        "target": "hyperswap_router",
                        "signature": "exactInputSingle((address,address,uint24,address,uint256,uint256,uint256,uint160))",
                        "locator": "0.3",
                        "value": "balance_contract",
                        "check": {
                            "args": ["(whype,whype,3000,fund_contract,0,1,0,0)"],
                            "expect": false
                        }
                    }
                ]
            }"#,
        )
        .unwrap();

        let outcomes = plan.dry_run(&mut ApprovalRegistry::new(), &book()).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].allowed);
        assert!(!outcomes[1].allowed);
        assert!(outcomes.iter().all(CheckOutcome::passed));
    }

    #[test]
    fn test_mainnet_plan_dry_run() {
        let plan: ApprovalPlan =
            serde_json::from_str(include_str!("../plans/hyperevm-mainnet.json")).unwrap();

        let mut book: HashMap<&'static str, Address> =
            HYPEREVM_MAINNET.addresses.iter().copied().collect();
        book.extend([("balance_contract", BALANCE), ("fund_contract", FUND)]);

        let mut registry = ApprovalRegistry::new();
        let outcomes = plan.dry_run(&mut registry, &book).unwrap();

        let failed = outcomes.iter().filter(|o| !o.passed()).map(|o| o.entry).collect::<Vec<_>>();
        assert!(failed.is_empty(), "unexpected outcomes for entries {failed:?}");
        assert_eq!(outcomes.len(), plan.approvals.len());
        assert!(outcomes.iter().any(|o| !o.expected));
    }
}
