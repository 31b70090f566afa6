//! # RocksDB Persistence
//!
//! The committee and records survive a restart of the node.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::fixtures::{account, consensus_key, INITIAL_BALANCE};
    use qc_18_validator_set::{
        BincodeRecordSerializer, InMemoryLedger, RocksDbConfig, RocksDbStore, StaticParamSource,
        ValidatorParams, ValidatorSetApi, ValidatorSetDependencies, ValidatorSetManager,
    };
    use shared_types::{BlockContext, Coin};

    type RocksManager =
        ValidatorSetManager<RocksDbStore, BincodeRecordSerializer, InMemoryLedger, StaticParamSource>;

    fn open(dir: &TempDir, ledger: Arc<InMemoryLedger>) -> RocksManager {
        let config = RocksDbConfig::for_testing(dir.path().to_string_lossy().to_string());
        ValidatorSetManager::new(ValidatorSetDependencies {
            kv: RocksDbStore::open(config).unwrap(),
            serializer: BincodeRecordSerializer,
            ledger,
            params: Arc::new(StaticParamSource::new(ValidatorParams::for_testing())),
        })
    }

    #[test]
    fn test_committee_survives_restart() {
        let dir = TempDir::new().unwrap();
        let ledger = Arc::new(InMemoryLedger::with_balances(
            (0..6).map(|i| (account(i), Coin::from_whole(INITIAL_BALANCE))),
        ));
        let ctx = BlockContext::at_height(1);

        let (committee, updates) = {
            let mut manager = open(&dir, ledger.clone());
            assert!(manager.init_genesis().unwrap());
            for i in 0..6 {
                manager
                    .register(
                        &ctx,
                        &account(i),
                        consensus_key(i),
                        Coin::from_whole(1_000 + i as u64 * 100),
                        "",
                    )
                    .unwrap();
            }
            let updates = manager.compute_committee_delta(&ctx).unwrap();
            (manager.committee().unwrap(), updates)
        };

        let mut reopened = open(&dir, ledger);

        assert!(!reopened.init_genesis().unwrap());
        assert_eq!(reopened.committee().unwrap(), committee);
        assert_eq!(reopened.committee().unwrap().oncall.len(), 4);
        assert_eq!(
            reopened.validator(&account(5)).unwrap().consensus_key,
            consensus_key(5)
        );
        assert_eq!(reopened.compute_committee_delta(&ctx).unwrap(), updates);
    }
}
