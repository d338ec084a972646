//! Types describing entries of the balance contract's action allowlist

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use alloy_primitives::{Address, Selector, B256, U256};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{ZERO_PARAM_HASH, ZERO_SELECTOR},
    errors::CodecError,
    hashing::dyn_param_hash,
    locator::FieldLocator,
    selector::{checked_selector, parse_signature},
    solidity::approveActionCall,
};

/// The scope of an approval
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Any call to the target is allowed
    Contract,
    /// Any call to the target with a given selector is allowed
    Function,
    /// Calls to the target with a given selector are allowed only when one
    /// argument word hashes to a pinned value
    Parameter,
}

impl From<ActionType> for u8 {
    fn from(action_type: ActionType) -> Self {
        match action_type {
            ActionType::Contract => 0,
            ActionType::Function => 1,
            ActionType::Parameter => 2,
        }
    }
}

impl TryFrom<u8> for ActionType {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ActionType::Contract),
            1 => Ok(ActionType::Function),
            2 => Ok(ActionType::Parameter),
            _ => Err(CodecError::InvalidActionType(value.to_string())),
        }
    }
}

impl Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::Contract => write!(f, "contract"),
            ActionType::Function => write!(f, "function"),
            ActionType::Parameter => write!(f, "parameter"),
        }
    }
}

impl FromStr for ActionType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "contract" => Ok(ActionType::Contract),
            "function" => Ok(ActionType::Function),
            "parameter" => Ok(ActionType::Parameter),
            _ => Err(CodecError::InvalidActionType(s.to_string())),
        }
    }
}

/// The tuple the approval registry is keyed by
pub type RegistryKey = (Address, Selector, usize, B256);

/// A request to grant or revoke an approval in the allowlist
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    /// The scope of the approval
    pub action_type: ActionType,
    /// The contract the approved calls are directed at
    pub target: Address,
    /// The selector of the approved function, zero for contract scope
    pub selector: Selector,
    /// The index of the constrained argument word, zero unless parameter scope
    pub param_index: usize,
    /// The hash of the pinned argument word, zero unless parameter scope
    pub param_hash: B256,
    /// Whether the approval is granted or revoked
    pub status: bool,
}

impl ActionDescriptor {
    /// Approve every call to `target`
    pub const fn contract(target: Address) -> Self {
        Self {
            action_type: ActionType::Contract,
            target,
            selector: ZERO_SELECTOR,
            param_index: 0,
            param_hash: ZERO_PARAM_HASH,
            status: true,
        }
    }

    /// Approve every call to `target` dispatching on `selector`
    pub const fn function(target: Address, selector: Selector) -> Self {
        Self {
            action_type: ActionType::Function,
            target,
            selector,
            param_index: 0,
            param_hash: ZERO_PARAM_HASH,
            status: true,
        }
    }

    /// Approve calls to `target` dispatching on `selector` whose argument
    /// word at `param_index` hashes to `param_hash`
    pub const fn parameter(
        target: Address,
        selector: Selector,
        param_index: usize,
        param_hash: B256,
    ) -> Self {
        Self {
            action_type: ActionType::Parameter,
            target,
            selector,
            param_index,
            param_hash,
            status: true,
        }
    }

    /// Approve every call to `target` matching a canonical function signature
    pub fn for_function(target: Address, signature: &str) -> Result<Self, CodecError> {
        Ok(Self::function(target, checked_selector(signature)?))
    }

    /// Approve calls to `target` matching a canonical function signature whose
    /// located argument equals `value`
    ///
    /// The value is coerced into the ABI type found at the locator, e.g. an
    /// address string for the `recipient` field of a swap struct.
    pub fn for_parameter(
        target: Address,
        signature: &str,
        locator: FieldLocator,
        value: &str,
    ) -> Result<Self, CodecError> {
        let selector = checked_selector(signature)?;
        let function = parse_signature(signature)?;
        let (param_index, ty) = locator.resolve_typed(&function)?;
        let value = ty
            .coerce_str(value)
            .map_err(|e| CodecError::ValueCoercion(e.to_string()))?;

        Ok(Self::parameter(
            target,
            selector,
            param_index,
            dyn_param_hash(&value),
        ))
    }

    /// Turn this descriptor into a revocation of the same entry
    pub const fn revoked(mut self) -> Self {
        self.status = false;
        self
    }

    /// The key of the registry entry this descriptor writes
    pub const fn registry_key(&self) -> RegistryKey {
        (
            self.target,
            self.selector,
            self.param_index,
            self.param_hash,
        )
    }

    /// Build the `approveAction` call registering this descriptor
    pub fn approve_call(&self) -> approveActionCall {
        approveActionCall {
            actionType: self.action_type.into(),
            target: self.target,
            selector: self.selector,
            paramIndex: U256::from(self.param_index),
            paramHash: self.param_hash,
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use alloy_sol_types::SolCall;

    use super::*;
    use crate::{hashing::address_param_hash, selector::function_selector};

    /// The recipient pinned in the tests
    const RECIPIENT: Address = address!("543303266113B64d03Ec17B7ec3829f8CddADaC4");
    /// The swap router targeted in the tests
    const ROUTER: Address = address!("4E2960a8cd19B467b82d26D83fAcb0fAE26b094D");

    #[test]
    fn test_action_type_codes() {
        for action_type in [ActionType::Contract, ActionType::Function, ActionType::Parameter] {
            let code: u8 = action_type.into();
            assert_eq!(ActionType::try_from(code).unwrap(), action_type);
            assert_eq!(action_type.to_string().parse::<ActionType>().unwrap(), action_type);
        }
        assert!(ActionType::try_from(3).is_err());
    }

    #[test]
    fn test_function_scope_uses_zero_hash() {
        let descriptor = ActionDescriptor::for_function(ROUTER, "deposit()").unwrap();
        assert_eq!(descriptor.action_type, ActionType::Function);
        assert_eq!(descriptor.param_hash, ZERO_PARAM_HASH);
        assert_eq!(descriptor.selector, function_selector("deposit()"));
    }

    #[test]
    fn test_parameter_for_struct_field() {
        let sig = "exactInputSingle((address,address,uint24,address,uint256,uint256,uint256,uint160))";
        let descriptor = ActionDescriptor::for_parameter(
            ROUTER,
            sig,
            FieldLocator::field(0, 3),
            &RECIPIENT.to_string(),
        )
        .unwrap();

        assert_eq!(descriptor.param_index, 3);
        assert_eq!(descriptor.param_hash, address_param_hash(RECIPIENT));
        assert_eq!(descriptor.selector, function_selector(sig));
    }

    #[test]
    fn test_parameter_rejects_mistyped_value() {
        let err = ActionDescriptor::for_parameter(
            ROUTER,
            "approve(address,uint256)",
            FieldLocator::argument(0),
            "not-an-address",
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::ValueCoercion(_)));
    }

    #[test]
    fn test_approve_call_encoding() {
        let descriptor = ActionDescriptor::parameter(
            ROUTER,
            function_selector("approve(address,uint256)"),
            0,
            address_param_hash(RECIPIENT),
        )
        .revoked();

        let call = descriptor.approve_call();
        assert_eq!(call.actionType, 2);
        assert!(!call.status);

        let decoded = approveActionCall::abi_decode(&call.abi_encode()).unwrap();
        assert_eq!(decoded.paramHash, descriptor.param_hash);
        assert_eq!(decoded.paramIndex, U256::ZERO);
    }

    #[test]
    fn test_descriptor_serde() {
        let descriptor = ActionDescriptor::contract(ROUTER);
        let json = serde_json::to_value(descriptor).unwrap();
        assert_eq!(json["actionType"], "contract");
        assert_eq!(json["status"], true);

        let parsed: ActionDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, descriptor);
    }
}
