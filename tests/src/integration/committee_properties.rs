//! # Committee Invariants Under Random Load
//!
//! Drives seeded random sequences of transactions, punishments and block
//! hooks, checking after every step that:
//!
//! - the committee never exceeds `max_committee_size` and is a subset of the pool
//! - the cached weakest member matches the actual minimum
//! - coins are conserved: balances + deposits + penalties == initial supply
//! - the delta reports oncall members at their power and everyone else at 0

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::fixtures::{account, consensus_key, TestChain};
    use qc_18_validator_set::domain::committee::check_invariants;
    use qc_18_validator_set::{
        BeginBlockInfo, Evidence, RemovalPolicy, ValidatorParams, ValidatorSetApi,
    };
    use shared_types::Coin;

    const ACCOUNTS: usize = 16;
    const STEPS: usize = 300;

    fn params() -> ValidatorParams {
        ValidatorParams {
            max_committee_size: 5,
            absent_commit_limit: 3,
            ..ValidatorParams::default()
        }
    }

    fn assert_invariants(chain: &TestChain, penalties: u128, step: usize) {
        let snapshot = chain.manager.committee().unwrap();
        let powers = chain
            .manager
            .validators()
            .unwrap()
            .into_iter()
            .map(|record| (record.owner.clone(), record.power()))
            .collect::<BTreeMap<_, _>>();

        if let Err(violation) = check_invariants(&snapshot, &powers, params().max_committee_size) {
            panic!("step {step}: {violation}");
        }
        assert_eq!(
            chain.circulating().unwrap() + penalties,
            chain.initial_supply(),
            "step {step}: coins created or destroyed"
        );
    }

    fn run(seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut chain = TestChain::new(params(), ACCOUNTS).unwrap();
        let mut penalties: u128 = 0;

        for step in 0..STEPS {
            let i = rng.gen_range(0..ACCOUNTS);
            match rng.gen_range(0..6) {
                0 => {
                    chain.deposit(i, rng.gen_range(1..4_000));
                }
                1 => {
                    chain.withdraw(i, rng.gen_range(1..3_000));
                }
                2 => {
                    chain.revoke(i);
                }
                3 => {
                    let policy = if rng.gen_bool(0.5) {
                        RemovalPolicy::Remove
                    } else {
                        RemovalPolicy::KeepIfPowered
                    };
                    let ctx = chain.ctx();
                    let penalty = Coin::from_whole(rng.gen_range(1..2_500));
                    if let Ok(punishment) =
                        chain
                            .manager
                            .punish_oncall_validator(&ctx, &account(i), penalty, policy)
                    {
                        penalties += punishment.penalty.units();
                    }
                }
                4 => {
                    let absent = chain
                        .oncall()
                        .into_iter()
                        .filter(|_| rng.gen_bool(0.3))
                        .collect::<BTreeSet<_>>();
                    let evidence = if rng.gen_bool(0.05) {
                        vec![Evidence::duplicate_vote(consensus_key(i), chain.height())]
                    } else {
                        vec![]
                    };
                    let info = BeginBlockInfo {
                        signing: chain.signing(&absent).unwrap(),
                        evidence,
                    };
                    let outcome = chain.begin_block(&info).unwrap();
                    penalties += outcome.fire.total_penalty().units();
                }
                _ => {
                    let oncall = chain.oncall();
                    for update in chain.end_block().unwrap() {
                        let expected = if oncall.contains(&update.owner) {
                            chain.manager.validator(&update.owner).unwrap().power()
                        } else {
                            0
                        };
                        assert_eq!(update.power, expected, "step {step}: {}", update.owner);
                    }
                }
            }
            assert_invariants(&chain, penalties, step);
        }
    }

    #[test]
    fn test_invariants_hold_under_random_operations() {
        for seed in 0..8 {
            run(seed);
        }
    }

    #[test]
    fn test_identical_inputs_produce_identical_state() {
        let replay = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut chain = TestChain::new(params(), ACCOUNTS).unwrap();
            for _ in 0..100 {
                let i = rng.gen_range(0..ACCOUNTS);
                if rng.gen_bool(0.7) {
                    chain.deposit(i, rng.gen_range(500..3_000));
                } else {
                    chain.withdraw(i, rng.gen_range(1..2_000));
                }
            }
            (
                chain.manager.committee().unwrap(),
                chain.end_block().unwrap(),
            )
        };

        assert_eq!(replay(42), replay(42));
    }
}
