//! # Validator Lifecycle Flows
//!
//! End-to-end flows through the transaction handler and the block hooks:
//!
//! 1. **Admission**: a full committee only admits strictly stronger candidates
//! 2. **Byzantine evidence**: offenders are slashed and dropped from the committee
//! 3. **Liveness**: chronically absent members are fired and the seat refilled
//! 4. **Withdrawal**: only waiting members withdraw, leaving zero or a legal remainder

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    use crate::fixtures::{account, consensus_key, TestChain, INITIAL_BALANCE};
    use qc_18_validator_set::{
        BeginBlockInfo, Evidence, SigningInfo, ValidatorParams, ValidatorSetApi, ValidatorUpdate,
    };
    use shared_types::{AccountKey, Coin, ResultCode};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn power_of(updates: &[ValidatorUpdate], owner: &AccountKey) -> Option<u64> {
        updates.iter().find(|u| &u.owner == owner).map(|u| u.power)
    }

    /// Chain with `n` registered validators, validator `i` depositing
    /// `base + i * step` whole coins.
    fn chain_with(params: ValidatorParams, n: usize, base: u64, step: u64) -> TestChain {
        let mut chain = TestChain::new(params, 32).unwrap();
        for i in 0..n {
            let result = chain.deposit(i, base + i as u64 * step);
            assert!(result.is_ok(), "validator{i}: {}", result.log);
        }
        chain
    }

    // =============================================================================
    // ADMISSION
    // =============================================================================

    #[test]
    fn test_full_committee_admits_only_stronger_candidates() {
        let mut chain = chain_with(ValidatorParams::default(), 21, 1_000, 10);
        assert_eq!(chain.oncall().len(), 21);
        assert_eq!(chain.end_block().unwrap().len(), 21);

        // Equal to the weakest member: the incumbent keeps the seat.
        assert!(chain.deposit(21, 1_000).is_ok());
        assert_eq!(chain.oncall().len(), 21);
        assert!(!chain.oncall().contains(&account(21)));
        assert_eq!(chain.all().len(), 22);

        assert!(chain.deposit(22, 5_000).is_ok());
        let oncall = chain.oncall();
        assert_eq!(oncall.len(), 21);
        assert!(oncall.contains(&account(22)));
        assert!(!oncall.contains(&account(0)));
        assert!(chain.all().contains(&account(0)));

        let updates = chain.end_block().unwrap();
        assert_eq!(updates.len(), 22);
        assert_eq!(power_of(&updates, &account(0)), Some(0));
        assert_eq!(power_of(&updates, &account(22)), Some(5_000));
        assert_eq!(power_of(&updates, &account(21)), None);
    }

    #[test]
    fn test_top_up_moves_waiting_member_into_committee() {
        let params = ValidatorParams {
            max_committee_size: 3,
            ..ValidatorParams::default()
        };
        let mut chain = chain_with(params, 4, 1_000, 100);
        assert!(!chain.oncall().contains(&account(0)));

        assert!(chain.deposit(0, 500).is_ok());

        let oncall = chain.oncall();
        assert!(oncall.contains(&account(0)));
        assert!(!oncall.contains(&account(1)));
        assert_eq!(
            chain.manager.committee().unwrap().lowest_validator,
            Some(account(2))
        );
    }

    #[test]
    fn test_registration_debits_and_revoke_refunds() {
        let mut chain = chain_with(ValidatorParams::default(), 1, 2_500, 0);
        assert_eq!(
            chain.ledger.balance(&account(0)),
            Coin::from_whole(INITIAL_BALANCE - 2_500)
        );

        assert!(chain.revoke(0).is_ok());

        assert_eq!(
            chain.ledger.balance(&account(0)),
            Coin::from_whole(INITIAL_BALANCE)
        );
        assert!(chain.oncall().is_empty());
        assert!(chain.all().is_empty());
    }

    #[test]
    fn test_ledger_failure_leaves_state_untouched() {
        let mut chain = TestChain::new(ValidatorParams::default(), 2).unwrap();
        chain
            .ledger
            .set_balance(&account(0), Coin::from_whole(500));

        let result = chain.deposit(0, 1_000);

        assert_eq!(result.code, ResultCode::VALIDATOR_LEDGER_FAILED);
        assert!(!chain.manager.is_validator_exist(&account(0)).unwrap());
        assert_eq!(chain.ledger.balance(&account(0)), Coin::from_whole(500));
        assert_eq!(chain.manager.committee().unwrap().version, 1);
    }

    // =============================================================================
    // BYZANTINE EVIDENCE
    // =============================================================================

    #[test]
    fn test_byzantine_evidence_removes_offenders() {
        let mut chain = chain_with(ValidatorParams::default(), 21, 2_000, 0);
        chain.end_block().unwrap();

        let signing = chain.signing(&BTreeSet::new()).unwrap();
        let info = BeginBlockInfo {
            signing,
            evidence: vec![
                Evidence::duplicate_vote(consensus_key(3), 1),
                Evidence::duplicate_vote(consensus_key(7), 1),
                Evidence::duplicate_vote(consensus_key(7), 1),
                Evidence::duplicate_vote(consensus_key(11), 1),
            ],
        };
        let outcome = chain.begin_block(&info).unwrap();

        assert_eq!(outcome.signing.signed, 21);
        assert_eq!(
            outcome.fire.fired(),
            vec![account(3), account(7), account(11)]
        );
        assert_eq!(outcome.fire.total_penalty(), Coin::from_whole(3_000));
        assert_eq!(chain.oncall().len(), 18);
        for offender in [3, 7, 11] {
            let record = chain.manager.validator(&account(offender)).unwrap();
            assert!(record.deposit.is_zero());
            assert!(!chain.all().contains(&account(offender)));
            assert_eq!(
                chain.ledger.balance(&account(offender)),
                Coin::from_whole(INITIAL_BALANCE - 1_000)
            );
        }

        // A small deposit is a fresh registration, not a top-up.
        let comeback = chain.deposit(3, 1);
        assert_eq!(comeback.code, ResultCode::VALIDATOR_INSUFFICIENT_DEPOSIT);
        assert!(!chain.all().contains(&account(3)));

        let updates = chain.end_block().unwrap();
        assert_eq!(updates.len(), 21);
        assert_eq!(updates.iter().filter(|u| u.power == 0).count(), 3);
    }

    #[test]
    fn test_unknown_keys_never_fail_hooks() {
        let mut chain = chain_with(ValidatorParams::default(), 2, 1_000, 0);
        let stranger = consensus_key(99);

        let outcome = chain
            .begin_block(&BeginBlockInfo {
                signing: vec![
                    SigningInfo::signed(consensus_key(0)),
                    SigningInfo::absent(stranger),
                ],
                evidence: vec![Evidence::duplicate_vote(stranger, 1)],
            })
            .unwrap();

        assert_eq!(outcome.signing.signed, 1);
        assert_eq!(outcome.signing.unknown_keys, vec![stranger]);
        assert_eq!(outcome.fire.unknown_keys, vec![stranger]);
        assert!(outcome.fire.punishments.is_empty());
        assert_eq!(chain.oncall().len(), 2);
    }

    // =============================================================================
    // LIVENESS
    // =============================================================================

    #[test]
    fn test_absent_member_fired_and_seat_refilled() {
        let mut chain = chain_with(ValidatorParams::for_testing(), 4, 2_000, 100);
        assert!(chain.deposit(4, 1_500).is_ok());
        assert!(!chain.oncall().contains(&account(4)));
        chain.end_block().unwrap();

        let mut rng = StdRng::seed_from_u64(18);
        let absent: BTreeSet<_> = [account(2)].into_iter().collect();
        let limit = ValidatorParams::for_testing().absent_commit_limit;

        for block in 1..=limit + 1 {
            let mut signing = chain.signing(&absent).unwrap();
            signing.shuffle(&mut rng);
            let outcome = chain
                .begin_block(&BeginBlockInfo {
                    signing,
                    evidence: vec![],
                })
                .unwrap();
            assert_eq!(outcome.signing.absent, 1);

            if block <= limit {
                assert!(outcome.fire.punishments.is_empty(), "fired at block {block}");
                continue;
            }
            let punishment = &outcome.fire.punishments[0];
            assert_eq!(punishment.owner, account(2));
            assert_eq!(punishment.penalty, Coin::from_whole(200));
            assert!(punishment.removed);
            assert_eq!(punishment.promoted, Some(account(4)));
        }

        let record = chain.manager.validator(&account(0)).unwrap();
        assert_eq!(record.produced_count, limit + 1);

        let updates = chain.end_block().unwrap();
        assert_eq!(power_of(&updates, &account(2)), Some(0));
        assert_eq!(power_of(&updates, &account(4)), Some(1_500));
    }

    #[test]
    fn test_end_block_is_idempotent() {
        let mut chain = chain_with(ValidatorParams::default(), 5, 1_000, 50);
        let first = chain.end_block().unwrap();
        let version = chain.manager.committee().unwrap().version;

        let second = chain.end_block().unwrap();

        assert_eq!(first, second);
        assert_eq!(chain.manager.committee().unwrap().version, version);
    }

    // =============================================================================
    // WITHDRAWAL
    // =============================================================================

    #[test]
    fn test_waiting_member_withdraws_in_legal_steps() {
        let params = ValidatorParams {
            max_committee_size: 1,
            ..ValidatorParams::default()
        };
        let mut chain = chain_with(params, 1, 5_000, 0);
        assert!(chain.deposit(1, 3_000).is_ok());
        assert_eq!(chain.oncall(), vec![account(0)]);

        let oncall_attempt = chain.withdraw(0, 1_000);
        assert_eq!(oncall_attempt.code, ResultCode::VALIDATOR_ILLEGAL_WITHDRAW);

        let below_min_remainder = chain.withdraw(1, 2_500);
        assert_eq!(
            below_min_remainder.code,
            ResultCode::VALIDATOR_ILLEGAL_WITHDRAW
        );

        assert!(chain.withdraw(1, 2_000).is_ok());
        assert_eq!(
            chain.manager.validator(&account(1)).unwrap().deposit,
            Coin::from_whole(1_000)
        );

        assert!(chain.withdraw(1, 1_000).is_ok());
        assert!(!chain.all().contains(&account(1)));
        assert_eq!(
            chain.ledger.balance(&account(1)),
            Coin::from_whole(INITIAL_BALANCE)
        );
    }

    #[test]
    fn test_invalid_messages_rejected_before_state() {
        let mut chain = TestChain::new(ValidatorParams::default(), 1).unwrap();

        let result = chain.deposit(0, 0);

        assert_eq!(result.code, ResultCode::INVALID_MSG);
        assert!(chain.all().is_empty());
    }
}
