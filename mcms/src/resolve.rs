use {
    crate::{ContractBinder, McmsChainState, McmsError, PartialRoles, Result},
    deployer_shared::primitives::ChainSelector,
    std::collections::BTreeMap,
    tracing::info,
};

/// Applies per-chain role overrides to the loaded governance state.
///
/// Only the roles an override specifies are replaced, each through a handle derived by `binder`.
/// An override for a chain without loaded state fails with [`McmsError::UnknownChain`] before any
/// binding happens.
pub async fn resolve(
    mut loaded: BTreeMap<ChainSelector, McmsChainState>,
    overrides: &BTreeMap<ChainSelector, PartialRoles>,
    binder: &dyn ContractBinder,
) -> Result<BTreeMap<ChainSelector, McmsChainState>> {
    if let Some(&chain) = overrides.keys().find(|chain| !loaded.contains_key(chain)) {
        return Err(McmsError::UnknownChain(chain));
    }

    for (&chain, roles) in overrides {
        let Some(state) = loaded.get_mut(&chain) else {
            continue;
        };

        for (role, address) in roles.specified() {
            let handle = binder.bind(chain, role, address).await?;
            info!(%chain, %role, %address, "Overriding governance role");
            state.set_role(role, handle);
        }
    }

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{ContractHandle, McmsRole, RecordingBinder},
        deployer_shared::primitives::{Address, address},
    };

    const CHAIN_X: ChainSelector = ChainSelector(4949039107694359620);
    const CHAIN_Y: ChainSelector = ChainSelector(5009297550715157269);

    fn loaded_state(chain: ChainSelector) -> McmsChainState {
        McmsRole::ALL
            .into_iter()
            .zip(1u8..)
            .fold(McmsChainState::new(chain), |state, (role, n)| {
                state.with_role(
                    role,
                    ContractHandle::new(Address::with_last_byte(n), role.contract_type()),
                )
            })
    }

    fn loaded() -> BTreeMap<ChainSelector, McmsChainState> {
        [(CHAIN_X, loaded_state(CHAIN_X)), (CHAIN_Y, loaded_state(CHAIN_Y))].into()
    }

    #[tokio::test]
    async fn test_overriding_bypasser_and_proposer_keeps_other_roles() {
        let addr_b = address!("00000000000000000000000000000000000000bb");
        let addr_p = address!("00000000000000000000000000000000000000cc");
        let overrides = [(
            CHAIN_X,
            PartialRoles::new()
                .with(McmsRole::Bypasser, addr_b)
                .with(McmsRole::Proposer, addr_p),
        )]
        .into();
        let original = loaded_state(CHAIN_X);

        let actual = resolve(loaded(), &overrides, &RecordingBinder::new())
            .await
            .unwrap();

        let state = &actual[&CHAIN_X];
        assert_eq!(state.require(McmsRole::Bypasser).unwrap().address, addr_b);
        assert_eq!(state.require(McmsRole::Proposer).unwrap().address, addr_p);
        assert_eq!(state.canceller, original.canceller);
        assert_eq!(state.timelock, original.timelock);
        assert_eq!(state.call_proxy, original.call_proxy);
        assert_eq!(actual[&CHAIN_Y], loaded_state(CHAIN_Y));
    }

    #[tokio::test]
    async fn test_override_for_unloaded_chain_is_unknown_chain() {
        let binder = RecordingBinder::new();
        let overrides = [(
            ChainSelector(99),
            PartialRoles::new().with(McmsRole::Proposer, Address::with_last_byte(9)),
        )]
        .into();

        let actual = resolve(loaded(), &overrides, &binder).await.unwrap_err();

        assert_eq!(actual, McmsError::UnknownChain(ChainSelector(99)));
        assert!(binder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_binding_fails_resolution() {
        let bad = Address::with_last_byte(0xee);
        let binder = RecordingBinder::new().failing_for(bad);
        let overrides = [(CHAIN_Y, PartialRoles::new().with(McmsRole::Canceller, bad))].into();

        let actual = resolve(loaded(), &overrides, &binder).await.unwrap_err();

        assert!(matches!(
            actual,
            McmsError::Bind {
                chain: CHAIN_Y,
                role: McmsRole::Canceller,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_zero_address_roles_are_not_bound() {
        let binder = RecordingBinder::new();
        let overrides =
            [(CHAIN_X, PartialRoles::new().with(McmsRole::Timelock, Address::ZERO))].into();

        let actual = resolve(loaded(), &overrides, &binder).await.unwrap();

        assert_eq!(actual, loaded());
        assert!(binder.calls().is_empty());
    }
}
