// programs/cairn_master/src/state.rs

use crate::errors::MasterError;
use anchor_lang::prelude::*;
use cairn_core::{codes, ContractCode, ContractType};

/// Global master configuration: admin identities, the emergency pause flag
/// and the master's own implementation pointer.
/// PDA seeds: ["master_config"]
#[account]
#[derive(InitSpace)]
pub struct MasterConfig {
    /// Governance executor - the only identity allowed to mutate the registry
    pub governance: Pubkey,

    /// Emergency admin - the only identity allowed to toggle the pause flag
    pub emergency_admin: Pubkey,

    /// System-wide pause flag
    pub paused: bool,

    /// Timestamp the current pause started (0 while active)
    pub paused_at: i64,

    /// Current master implementation (swapped by upgrade_master)
    pub implementation: Pubkey,

    /// Number of master implementation swaps
    pub master_upgrade_count: u64,

    /// Bump seed for PDA
    pub bump: u8,

    /// Reserved space for future upgrades
    #[max_len(64)]
    pub reserved: Vec<u8>,
}

impl MasterConfig {
    pub const SEED_PREFIX: &'static [u8] = b"master_config";

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_governance(&self, key: &Pubkey) -> bool {
        self.governance == *key
    }

    /// Toggle the pause flag. Only the emergency admin may call this, in
    /// either direction, and there is no automatic unpause.
    pub fn set_emergency_pause(&mut self, caller: &Pubkey, paused: bool, now: i64) -> Result<()> {
        require_keys_eq!(*caller, self.emergency_admin, MasterError::NotEmergencyAdmin);

        self.paused = paused;
        self.paused_at = if paused { now } else { 0 };
        Ok(())
    }

    /// Rotate the emergency admin (governance only)
    pub fn set_emergency_admin(&mut self, caller: &Pubkey, new_admin: Pubkey) -> Result<Pubkey> {
        require!(self.is_governance(caller), MasterError::Unauthorized);
        require!(new_admin != Pubkey::default(), MasterError::ZeroAddress);

        let old = self.emergency_admin;
        self.emergency_admin = new_admin;
        Ok(old)
    }

    /// Swap the master implementation. Registry entries live in their own
    /// account and are left untouched, as is the pause flag.
    pub fn upgrade_master(&mut self, caller: &Pubkey, new_implementation: Pubkey) -> Result<Pubkey> {
        require!(self.is_governance(caller), MasterError::Unauthorized);
        self.ensure_allowed(PausableAction::UpgradeMaster)?;
        require!(
            new_implementation != Pubkey::default(),
            MasterError::ZeroAddress
        );

        let old = self.implementation;
        self.implementation = new_implementation;
        self.master_upgrade_count = self.master_upgrade_count.saturating_add(1);
        Ok(old)
    }

    /// Gate for every state-changing entry point that consults the pause flag
    pub fn ensure_allowed(&self, action: PausableAction) -> Result<()> {
        if self.paused && action.is_blocked_while_paused() {
            return err!(MasterError::SystemPaused);
        }
        Ok(())
    }
}

/// Guard for value-flow entry points in other programs
pub fn require_not_paused(config: &MasterConfig) -> Result<()> {
    require!(!config.is_paused(), MasterError::SystemPaused);
    Ok(())
}

/// Operations that check the pause flag before running
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PausableAction {
    // User-facing value flows
    BuyCover,
    BuyNxm,
    SellNxm,
    RedeemClaimPayout,
    CastVotes,

    // Governance / ops recovery
    UpgradeContracts,
    UpgradeMaster,
}

impl PausableAction {
    /// The pause is a circuit breaker for value flows, not for recovery
    pub fn is_blocked_while_paused(&self) -> bool {
        matches!(
            self,
            PausableAction::BuyCover
                | PausableAction::BuyNxm
                | PausableAction::SellNxm
                | PausableAction::RedeemClaimPayout
                | PausableAction::CastVotes
        )
    }
}

/// A registered contract
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct ContractEntry {
    pub code: [u8; 2],
    /// Live address for Replaceable entries, proxy address for Proxy entries
    pub address: Pubkey,
    pub contract_type: ContractType,
}

/// Upgradeability proxy owned by the master. The proxy address is stable;
/// only the implementation pointer moves.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct ProxyRecord {
    pub code: [u8; 2],
    pub proxy: Pubkey,
    pub implementation: Pubkey,
}

/// Result of upgrading one registry code
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContractUpgrade {
    pub code: ContractCode,
    pub contract_type: ContractType,
    /// Address returned by get_latest_address after the upgrade
    pub latest_address: Pubkey,
    pub old_implementation: Pubkey,
    pub new_implementation: Pubkey,
}

/// Contract code registry
/// PDA seeds: ["contract_registry"]
#[account]
#[derive(InitSpace)]
pub struct ContractRegistry {
    /// Entries sorted by code
    #[max_len(32)]
    pub entries: Vec<ContractEntry>,

    /// Proxies ever deployed by the master, keyed by code
    #[max_len(32)]
    pub proxies: Vec<ProxyRecord>,

    /// Bump seed
    pub bump: u8,
}

impl ContractRegistry {
    pub const SEED_PREFIX: &'static [u8] = b"contract_registry";
    pub const PROXY_SEED_PREFIX: &'static [u8] = b"proxy";
    pub const MAX_CONTRACTS: usize = 32;

    /// Stable proxy address for a code
    pub fn proxy_address(code: &ContractCode, program_id: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(&[Self::PROXY_SEED_PREFIX, code.as_ref()], program_id).0
    }

    pub fn entry(&self, code: &ContractCode) -> Option<&ContractEntry> {
        self.entries
            .binary_search_by_key(code, |e| e.code)
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Registered address for `code`, or the zero address when absent
    pub fn get_latest_address(&self, code: &ContractCode) -> Pubkey {
        self.entry(code).map(|e| e.address).unwrap_or_default()
    }

    /// Internal-call authorization: a reverse lookup over the current entries
    pub fn is_internal(&self, address: &Pubkey) -> bool {
        *address != Pubkey::default() && self.entries.iter().any(|e| e.address == *address)
    }

    /// Registered codes in ascending order
    pub fn contract_codes(&self) -> Vec<ContractCode> {
        self.entries.iter().map(|e| e.code).collect()
    }

    /// Implementation a proxy currently forwards to. The proxy record of a
    /// removed code is kept for re-adding but resolves to nothing.
    pub fn proxy_implementation(&self, proxy: &Pubkey) -> Option<Pubkey> {
        if !self.is_internal(proxy) {
            return None;
        }
        self.proxies
            .iter()
            .find(|p| p.proxy == *proxy)
            .map(|p| p.implementation)
    }

    fn proxy_index(&self, code: &ContractCode) -> Option<usize> {
        self.proxies.iter().position(|p| p.code == *code)
    }

    /// Register brand-new contracts. Proxy entries get (or reuse) the proxy
    /// PDA for their code and point it at the given implementation.
    pub fn add_contracts(
        &mut self,
        codes: &[ContractCode],
        addresses: &[Pubkey],
        types: &[ContractType],
        program_id: &Pubkey,
    ) -> Result<Vec<ContractEntry>> {
        require!(
            codes.len() == addresses.len() && codes.len() == types.len(),
            MasterError::LengthMismatch
        );
        ensure_unique(codes)?;
        require!(
            self.entries.len() + codes.len() <= Self::MAX_CONTRACTS,
            MasterError::RegistryFull
        );

        let mut new_proxies = 0usize;
        for (code, address) in codes.iter().zip(addresses) {
            require!(self.entry(code).is_none(), MasterError::CodeAlreadyInUse);
            require!(*address != Pubkey::default(), MasterError::ZeroAddress);
        }
        for (code, contract_type) in codes.iter().zip(types) {
            if contract_type.is_proxy() && self.proxy_index(code).is_none() {
                new_proxies += 1;
            }
        }
        require!(
            self.proxies.len() + new_proxies <= Self::MAX_CONTRACTS,
            MasterError::RegistryFull
        );

        let mut added = Vec::with_capacity(codes.len());
        for ((code, address), contract_type) in codes.iter().zip(addresses).zip(types) {
            let registry_address = match contract_type {
                ContractType::Replaceable => *address,
                ContractType::Proxy => {
                    let proxy = Self::proxy_address(code, program_id);
                    match self.proxy_index(code) {
                        Some(i) => self.proxies[i].implementation = *address,
                        None => self.proxies.push(ProxyRecord {
                            code: *code,
                            proxy,
                            implementation: *address,
                        }),
                    }
                    proxy
                }
            };

            let entry = ContractEntry {
                code: *code,
                address: registry_address,
                contract_type: *contract_type,
            };
            self.insert_sorted(entry);
            added.push(entry);
        }

        Ok(added)
    }

    /// Point existing codes at new implementations. Replaceable entries
    /// change their registry address; Proxy entries keep it and move the
    /// proxy's implementation pointer.
    pub fn upgrade_contracts(
        &mut self,
        codes: &[ContractCode],
        addresses: &[Pubkey],
    ) -> Result<Vec<ContractUpgrade>> {
        require!(codes.len() == addresses.len(), MasterError::LengthMismatch);
        ensure_unique(codes)?;

        for (code, address) in codes.iter().zip(addresses) {
            let entry = self.entry(code).ok_or(MasterError::UnknownContractCode)?;
            require!(*address != Pubkey::default(), MasterError::ZeroAddress);
            if entry.contract_type.is_proxy() {
                require!(
                    self.proxy_index(code).is_some(),
                    MasterError::UnknownContractCode
                );
            }
        }

        let mut upgrades = Vec::with_capacity(codes.len());
        for (code, address) in codes.iter().zip(addresses) {
            let i = self
                .entries
                .binary_search_by_key(code, |e| e.code)
                .map_err(|_| MasterError::UnknownContractCode)?;
            let contract_type = self.entries[i].contract_type;

            let upgrade = match contract_type {
                ContractType::Replaceable => {
                    let old = self.entries[i].address;
                    self.entries[i].address = *address;
                    ContractUpgrade {
                        code: *code,
                        contract_type: ContractType::Replaceable,
                        latest_address: *address,
                        old_implementation: old,
                        new_implementation: *address,
                    }
                }
                ContractType::Proxy => {
                    let latest_address = self.entries[i].address;
                    let p = self
                        .proxy_index(code)
                        .ok_or(MasterError::UnknownContractCode)?;
                    let old = self.proxies[p].implementation;
                    self.proxies[p].implementation = *address;
                    ContractUpgrade {
                        code: *code,
                        contract_type: ContractType::Proxy,
                        latest_address,
                        old_implementation: old,
                        new_implementation: *address,
                    }
                }
            };
            upgrades.push(upgrade);
        }

        Ok(upgrades)
    }

    /// Delete entries. The removed addresses lose internal authorization in
    /// the same call since is_internal reads the entries directly.
    pub fn remove_contracts(&mut self, codes: &[ContractCode]) -> Result<Vec<ContractEntry>> {
        ensure_unique(codes)?;
        for code in codes {
            require!(self.entry(code).is_some(), MasterError::UnknownContractCode);
        }

        let mut removed = Vec::with_capacity(codes.len());
        for code in codes {
            if let Ok(i) = self.entries.binary_search_by_key(code, |e| e.code) {
                removed.push(self.entries.remove(i));
            }
        }
        Ok(removed)
    }

    fn insert_sorted(&mut self, entry: ContractEntry) {
        let i = self
            .entries
            .binary_search_by_key(&entry.code, |e| e.code)
            .unwrap_or_else(|i| i);
        self.entries.insert(i, entry);
    }
}

fn ensure_unique(codes: &[ContractCode]) -> Result<()> {
    for (i, code) in codes.iter().enumerate() {
        require!(!codes[..i].contains(code), MasterError::DuplicateCode);
    }
    Ok(())
}

/// Log-friendly rendering of a list of codes ("CO,TC")
pub fn codes_to_string(list: &[ContractCode]) -> String {
    list.iter()
        .map(codes::to_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::codes::{COVER, MCR, POOL, TOKEN_CONTROLLER};

    fn create_test_registry() -> ContractRegistry {
        ContractRegistry {
            entries: vec![],
            proxies: vec![],
            bump: 255,
        }
    }

    fn create_test_config() -> MasterConfig {
        MasterConfig {
            governance: Pubkey::new_unique(),
            emergency_admin: Pubkey::new_unique(),
            paused: false,
            paused_at: 0,
            implementation: Pubkey::new_unique(),
            master_upgrade_count: 0,
            bump: 255,
            reserved: vec![],
        }
    }

    fn program_id() -> Pubkey {
        crate::ID
    }

    // ==================== REGISTRY TESTS ====================

    #[test]
    fn test_add_replaceable_contract() {
        let mut registry = create_test_registry();
        let address = Pubkey::new_unique();

        registry
            .add_contracts(&[*b"XX"], &[address], &[ContractType::Replaceable], &program_id())
            .unwrap();

        assert_eq!(registry.get_latest_address(b"XX"), address);
        // newly added contracts can call internal functions right away
        assert!(registry.is_internal(&address));
    }

    #[test]
    fn test_registry_record_sizes() {
        assert_eq!(ContractEntry::INIT_SPACE, 2 + 32 + 1);
        assert_eq!(ProxyRecord::INIT_SPACE, 2 + 32 + 32);
        assert_eq!(
            ContractRegistry::INIT_SPACE,
            4 + 32 * ContractEntry::INIT_SPACE + 4 + 32 * ProxyRecord::INIT_SPACE + 1
        );
    }

    #[test]
    fn test_add_proxy_contract() {
        let mut registry = create_test_registry();
        let implementation = Pubkey::new_unique();

        registry
            .add_contracts(&[*b"XX"], &[implementation], &[ContractType::Proxy], &program_id())
            .unwrap();

        let proxy = registry.get_latest_address(b"XX");
        assert_eq!(proxy, ContractRegistry::proxy_address(b"XX", &program_id()));
        assert_ne!(proxy, implementation);
        assert_eq!(registry.proxy_implementation(&proxy), Some(implementation));
        // internal calls come through the proxy address
        assert!(registry.is_internal(&proxy));
    }

    #[test]
    fn test_absent_code_resolves_to_zero_address() {
        let registry = create_test_registry();
        assert_eq!(registry.get_latest_address(b"ZZ"), Pubkey::default());
        assert!(!registry.is_internal(&Pubkey::default()));
    }

    #[test]
    fn test_add_rejects_code_in_use() {
        let mut registry = create_test_registry();
        registry
            .add_contracts(&[MCR], &[Pubkey::new_unique()], &[ContractType::Replaceable], &program_id())
            .unwrap();

        let result = registry.add_contracts(
            &[MCR],
            &[Pubkey::new_unique()],
            &[ContractType::Replaceable],
            &program_id(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_add_is_all_or_nothing() {
        let mut registry = create_test_registry();
        let before = registry.entries.clone();

        // second entry has the zero address, so neither may land
        let result = registry.add_contracts(
            &[*b"AA", *b"BB"],
            &[Pubkey::new_unique(), Pubkey::default()],
            &[ContractType::Replaceable, ContractType::Proxy],
            &program_id(),
        );

        assert!(result.is_err());
        assert_eq!(registry.entries, before);
        assert!(registry.proxies.is_empty());
    }

    #[test]
    fn test_add_rejects_length_mismatch_and_duplicates() {
        let mut registry = create_test_registry();
        assert!(registry
            .add_contracts(&[*b"AA"], &[], &[ContractType::Replaceable], &program_id())
            .is_err());
        assert!(registry
            .add_contracts(
                &[*b"AA", *b"AA"],
                &[Pubkey::new_unique(), Pubkey::new_unique()],
                &[ContractType::Replaceable, ContractType::Replaceable],
                &program_id(),
            )
            .is_err());
        assert!(registry.entries.is_empty());
    }

    #[test]
    fn test_registry_capacity() {
        let mut registry = create_test_registry();
        for i in 0..ContractRegistry::MAX_CONTRACTS {
            let code = [b'A' + (i / 26) as u8, b'A' + (i % 26) as u8];
            registry
                .add_contracts(&[code], &[Pubkey::new_unique()], &[ContractType::Replaceable], &program_id())
                .unwrap();
        }
        let result = registry.add_contracts(
            &[*b"ZZ"],
            &[Pubkey::new_unique()],
            &[ContractType::Replaceable],
            &program_id(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_entries_stay_sorted() {
        let mut registry = create_test_registry();
        for code in [POOL, COVER, TOKEN_CONTROLLER, MCR] {
            registry
                .add_contracts(&[code], &[Pubkey::new_unique()], &[ContractType::Replaceable], &program_id())
                .unwrap();
        }
        assert_eq!(registry.contract_codes(), vec![COVER, MCR, POOL, TOKEN_CONTROLLER]);
    }

    #[test]
    fn test_upgrade_replaceable_changes_address() {
        let mut registry = create_test_registry();
        let old = Pubkey::new_unique();
        let new = Pubkey::new_unique();
        registry
            .add_contracts(&[MCR], &[old], &[ContractType::Replaceable], &program_id())
            .unwrap();

        let upgrades = registry.upgrade_contracts(&[MCR], &[new]).unwrap();

        assert_eq!(upgrades[0].old_implementation, old);
        assert_eq!(registry.get_latest_address(&MCR), new);
        assert!(registry.is_internal(&new));
        assert!(!registry.is_internal(&old));
    }

    #[test]
    fn test_upgrade_proxy_keeps_address() {
        let mut registry = create_test_registry();
        let first = Pubkey::new_unique();
        let second = Pubkey::new_unique();
        registry
            .add_contracts(&[TOKEN_CONTROLLER], &[first], &[ContractType::Proxy], &program_id())
            .unwrap();
        let proxy = registry.get_latest_address(&TOKEN_CONTROLLER);

        registry.upgrade_contracts(&[TOKEN_CONTROLLER], &[second]).unwrap();

        assert_eq!(registry.get_latest_address(&TOKEN_CONTROLLER), proxy);
        assert_eq!(registry.proxy_implementation(&proxy), Some(second));
        assert!(registry.is_internal(&proxy));
    }

    #[test]
    fn test_upgrade_proxies_and_replaceables_together() {
        let mut registry = create_test_registry();
        registry
            .add_contracts(
                &[MCR, TOKEN_CONTROLLER],
                &[Pubkey::new_unique(), Pubkey::new_unique()],
                &[ContractType::Replaceable, ContractType::Proxy],
                &program_id(),
            )
            .unwrap();
        let proxy = registry.get_latest_address(&TOKEN_CONTROLLER);
        let new_mcr = Pubkey::new_unique();
        let new_tc = Pubkey::new_unique();

        registry
            .upgrade_contracts(&[MCR, TOKEN_CONTROLLER], &[new_mcr, new_tc])
            .unwrap();

        assert_eq!(registry.get_latest_address(&MCR), new_mcr);
        assert_eq!(registry.proxy_implementation(&proxy), Some(new_tc));
    }

    #[test]
    fn test_upgrade_twice_in_a_row() {
        let mut registry = create_test_registry();
        registry
            .add_contracts(&[TOKEN_CONTROLLER], &[Pubkey::new_unique()], &[ContractType::Proxy], &program_id())
            .unwrap();
        let proxy = registry.get_latest_address(&TOKEN_CONTROLLER);

        for _ in 0..2 {
            let implementation = Pubkey::new_unique();
            registry
                .upgrade_contracts(&[TOKEN_CONTROLLER], &[implementation])
                .unwrap();
            assert_eq!(registry.proxy_implementation(&proxy), Some(implementation));
        }
    }

    #[test]
    fn test_upgrade_unknown_code_is_rejected_atomically() {
        let mut registry = create_test_registry();
        let mcr = Pubkey::new_unique();
        registry
            .add_contracts(&[MCR], &[mcr], &[ContractType::Replaceable], &program_id())
            .unwrap();

        let result = registry.upgrade_contracts(&[MCR, *b"??"], &[Pubkey::new_unique(), Pubkey::new_unique()]);

        assert!(result.is_err());
        assert_eq!(registry.get_latest_address(&MCR), mcr);
    }

    #[test]
    fn test_remove_revokes_internal_immediately() {
        let mut registry = create_test_registry();
        let new_contract = Pubkey::new_unique();
        let gateway = Pubkey::new_unique();
        registry
            .add_contracts(
                &[*b"RE", *b"GW"],
                &[new_contract, gateway],
                &[ContractType::Replaceable, ContractType::Replaceable],
                &program_id(),
            )
            .unwrap();
        assert!(registry.is_internal(&new_contract));

        let removed = registry.remove_contracts(&[*b"RE", *b"GW"]).unwrap();

        assert_eq!(removed.len(), 2);
        assert_eq!(registry.get_latest_address(b"RE"), Pubkey::default());
        assert_eq!(registry.get_latest_address(b"GW"), Pubkey::default());
        assert!(!registry.is_internal(&new_contract));
        assert!(!registry.is_internal(&gateway));
    }

    #[test]
    fn test_remove_unknown_code_fails_without_changes() {
        let mut registry = create_test_registry();
        registry
            .add_contracts(&[MCR], &[Pubkey::new_unique()], &[ContractType::Replaceable], &program_id())
            .unwrap();

        assert!(registry.remove_contracts(&[MCR, *b"NO"]).is_err());
        assert_eq!(registry.contract_codes(), vec![MCR]);
    }

    #[test]
    fn test_readding_proxy_reuses_proxy_address() {
        let mut registry = create_test_registry();
        registry
            .add_contracts(&[*b"XX"], &[Pubkey::new_unique()], &[ContractType::Proxy], &program_id())
            .unwrap();
        let proxy = registry.get_latest_address(b"XX");
        registry.remove_contracts(&[*b"XX"]).unwrap();
        assert!(!registry.is_internal(&proxy));
        assert_eq!(registry.proxy_implementation(&proxy), None);
        assert_eq!(registry.proxies.len(), 1);

        let implementation = Pubkey::new_unique();
        registry
            .add_contracts(&[*b"XX"], &[implementation], &[ContractType::Proxy], &program_id())
            .unwrap();

        assert_eq!(registry.get_latest_address(b"XX"), proxy);
        assert_eq!(registry.proxies.len(), 1);
        assert_eq!(registry.proxy_implementation(&proxy), Some(implementation));
    }

    // ==================== PAUSE TESTS ====================

    #[test]
    fn test_only_emergency_admin_can_pause() {
        let mut config = create_test_config();
        let stranger = Pubkey::new_unique();

        assert!(config.set_emergency_pause(&stranger, true, 100).is_err());
        assert!(!config.is_paused());

        // governance is not the emergency admin either
        let governance = config.governance;
        assert!(config.set_emergency_pause(&governance, true, 100).is_err());
    }

    #[test]
    fn test_start_and_end_emergency_pause() {
        let mut config = create_test_config();
        let admin = config.emergency_admin;
        assert!(!config.is_paused());

        config.set_emergency_pause(&admin, true, 1_000).unwrap();
        assert!(config.is_paused());
        assert_eq!(config.paused_at, 1_000);

        config.set_emergency_pause(&admin, false, 2_000).unwrap();
        assert!(!config.is_paused());
        assert_eq!(config.paused_at, 0);
    }

    #[test]
    fn test_paused_blocks_value_flows_only() {
        let mut config = create_test_config();
        let admin = config.emergency_admin;
        config.set_emergency_pause(&admin, true, 1).unwrap();

        for action in [
            PausableAction::BuyCover,
            PausableAction::BuyNxm,
            PausableAction::SellNxm,
            PausableAction::RedeemClaimPayout,
            PausableAction::CastVotes,
        ] {
            assert!(config.ensure_allowed(action).is_err(), "{:?} should be blocked", action);
        }
        assert!(config.ensure_allowed(PausableAction::UpgradeContracts).is_ok());
        assert!(config.ensure_allowed(PausableAction::UpgradeMaster).is_ok());
        assert!(require_not_paused(&config).is_err());
    }

    #[test]
    fn test_active_allows_everything() {
        let config = create_test_config();
        assert!(config.ensure_allowed(PausableAction::BuyCover).is_ok());
        assert!(require_not_paused(&config).is_ok());
    }

    #[test]
    fn test_upgrades_succeed_while_paused() {
        let mut config = create_test_config();
        let mut registry = create_test_registry();
        let admin = config.emergency_admin;
        let governance = config.governance;
        registry
            .add_contracts(
                &[MCR, TOKEN_CONTROLLER],
                &[Pubkey::new_unique(), Pubkey::new_unique()],
                &[ContractType::Replaceable, ContractType::Proxy],
                &program_id(),
            )
            .unwrap();

        config.set_emergency_pause(&admin, true, 1).unwrap();

        config.ensure_allowed(PausableAction::UpgradeContracts).unwrap();
        let new_tc = Pubkey::new_unique();
        registry
            .upgrade_contracts(&[MCR, TOKEN_CONTROLLER], &[Pubkey::new_unique(), new_tc])
            .unwrap();
        let proxy = registry.get_latest_address(&TOKEN_CONTROLLER);
        assert_eq!(registry.proxy_implementation(&proxy), Some(new_tc));

        let new_master = Pubkey::new_unique();
        config.upgrade_master(&governance, new_master).unwrap();
        assert_eq!(config.implementation, new_master);
        assert!(config.is_paused());
    }

    // ==================== MASTER UPGRADE TESTS ====================

    #[test]
    fn test_upgrade_master_requires_governance() {
        let mut config = create_test_config();
        let before = config.implementation;

        assert!(config.upgrade_master(&Pubkey::new_unique(), Pubkey::new_unique()).is_err());
        assert_eq!(config.implementation, before);

        let governance = config.governance;
        assert!(config.upgrade_master(&governance, Pubkey::default()).is_err());
    }

    #[test]
    fn test_upgrade_master_preserves_state() {
        let mut config = create_test_config();
        let mut registry = create_test_registry();
        let governance = config.governance;
        let admin = config.emergency_admin;
        let mcr = Pubkey::new_unique();
        registry
            .add_contracts(&[MCR], &[mcr], &[ContractType::Replaceable], &program_id())
            .unwrap();
        config.set_emergency_pause(&admin, true, 5).unwrap();
        let old = config.implementation;
        let new_master = Pubkey::new_unique();

        let returned = config.upgrade_master(&governance, new_master).unwrap();

        assert_eq!(returned, old);
        assert_eq!(config.implementation, new_master);
        assert_eq!(config.master_upgrade_count, 1);
        assert_eq!(config.emergency_admin, admin);
        assert!(config.is_paused());
        assert_eq!(registry.get_latest_address(&MCR), mcr);
        assert!(registry.is_internal(&mcr));
    }

    #[test]
    fn test_set_emergency_admin() {
        let mut config = create_test_config();
        let governance = config.governance;
        let new_admin = Pubkey::new_unique();

        assert!(config.set_emergency_admin(&Pubkey::new_unique(), new_admin).is_err());
        config.set_emergency_admin(&governance, new_admin).unwrap();

        assert_eq!(config.emergency_admin, new_admin);
        config.set_emergency_pause(&new_admin, true, 1).unwrap();
        assert!(config.is_paused());
    }

    #[test]
    fn test_codes_to_string() {
        assert_eq!(codes_to_string(&[COVER, MCR]), "CO,MC");
        assert_eq!(codes_to_string(&[]), "");
    }
}
