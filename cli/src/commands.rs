//! Subcommands and their execution against a loaded ledger.

use anyhow::{bail, Context};
use clap::Subcommand;
use serde_json::{json, Value};

use nmr_contract::{DelegateChange, Numeraire, NumeraireConfig, NumeraireState, TransferOutcome};
use nmr_types::{
    Address, Clock, Confidence, FixedClock, NmrAmount, RoundId, Timestamp, TournamentId,
};

#[derive(Subcommand)]
pub enum Command {
    /// Create a fresh state file from the configured protocol parameters.
    Init {
        /// Overwrite an existing state file.
        #[arg(long)]
        force: bool,
    },
    /// Mint into the pool, limited by the current disbursement allowance.
    Mint { amount: NmrAmount },
    /// Transfer from the caller to another account.
    Transfer { to: Address, amount: NmrAmount },
    /// Show an account's liquid balance.
    Balance { account: Address },
    /// Show total supply, escrow and the disbursement allowance.
    Supply,
    CreateTournament { id: TournamentId },
    CreateRound {
        tournament: TournamentId,
        round: RoundId,
        /// Resolution time in Unix seconds.
        resolution_time: u64,
    },
    Tournament { id: TournamentId },
    Round { tournament: TournamentId, round: RoundId },
    /// Stake the caller's own tokens.
    Stake {
        amount: NmrAmount,
        tournament: TournamentId,
        round: RoundId,
        #[arg(long, default_value_t = 0)]
        confidence: Confidence,
    },
    /// Operator stakes tokens from `source` on behalf of `staker`.
    StakeOnBehalf {
        source: Address,
        staker: Address,
        amount: NmrAmount,
        tournament: TournamentId,
        round: RoundId,
        #[arg(long, default_value_t = 0)]
        confidence: Confidence,
    },
    GetStake {
        tournament: TournamentId,
        round: RoundId,
        staker: Address,
    },
    DestroyStake {
        staker: Address,
        tournament: TournamentId,
        round: RoundId,
    },
    ReleaseStake {
        staker: Address,
        tournament: TournamentId,
        round: RoundId,
        /// Mark the stake as successful.
        #[arg(long)]
        success: bool,
    },
    /// Approve a new delegate. Takes effect once both governance identities agree.
    ChangeDelegate { delegate: Address },
    /// Show the current and pending delegate.
    Delegate,
    /// Approve a pool payout. Executes once operator and governance agree.
    NumeraiTransfer { destination: Address, amount: NmrAmount },
    /// Sweep a deposit slot's balance back into the pool.
    TransferDeposit { slot: Address },
}

impl Command {
    fn mutates(&self) -> bool {
        !matches!(
            self,
            Command::Init { .. }
                | Command::Balance { .. }
                | Command::Supply
                | Command::Tournament { .. }
                | Command::Round { .. }
                | Command::GetStake { .. }
                | Command::Delegate
        )
    }
}

/// Run `command` against the state file named in `config`.
pub fn run(
    command: Command,
    config: &NumeraireConfig,
    clock: FixedClock,
    caller: Option<Address>,
) -> anyhow::Result<Value> {
    let path = config.state_path.as_path();
    let now = clock.now();

    if let Command::Init { force } = command {
        if path.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }
        let state = NumeraireState::new(config.params.clone(), now)?;
        nmr_contract::save(&state, path, now)?;
        tracing::info!(path = %path.display(), genesis = %now, "state initialised");
        return Ok(json!({ "state": path.display().to_string(), "genesis": now.as_secs() }));
    }

    let state = nmr_contract::load(path)
        .with_context(|| format!("loading state {}", path.display()))?;
    let mut numeraire = Numeraire::from_state(state, clock);
    let mutates = command.mutates();
    let output = execute(&mut numeraire, command, caller)?;

    if mutates {
        nmr_contract::save(numeraire.state(), path, now)?;
    }
    Ok(output)
}

fn execute(
    n: &mut Numeraire<FixedClock>,
    command: Command,
    caller: Option<Address>,
) -> anyhow::Result<Value> {
    let caller = || caller.context("this command needs --caller");

    let output = match command {
        Command::Init { .. } => bail!("init is handled before loading state"),
        Command::Mint { amount } => {
            let remaining = n.mint(&caller()?, amount)?;
            json!({ "minted": amount, "disbursement_remaining": remaining })
        }
        Command::Transfer { to, amount } => {
            let from = caller()?;
            n.transfer(&from, &to, amount)?;
            json!({ "from": from, "to": to, "amount": amount })
        }
        Command::Balance { account } => {
            json!({ "account": account, "balance": n.balance_of(&account) })
        }
        Command::Supply => {
            let next_reset = n.next_disbursement_reset();
            let until = next_reset.as_secs().saturating_sub(n.clock().now().as_secs());
            json!({
                "total_supply": n.total_supply(),
                "escrowed": n.total_escrowed(),
                "disbursement_remaining": n.disbursement(),
                "next_reset": next_reset.as_secs(),
                "next_reset_in": nmr_utils::format_duration(until),
            })
        }
        Command::CreateTournament { id } => {
            serde_json::to_value(n.create_tournament(&caller()?, id)?)?
        }
        Command::CreateRound {
            tournament,
            round,
            resolution_time,
        } => serde_json::to_value(n.create_round(
            &caller()?,
            tournament,
            round,
            Timestamp::new(resolution_time),
        )?)?,
        Command::Tournament { id } => serde_json::to_value(n.get_tournament(id)?)?,
        Command::Round { tournament, round } => {
            serde_json::to_value(n.get_round(tournament, round)?)?
        }
        Command::Stake {
            amount,
            tournament,
            round,
            confidence,
        } => serde_json::to_value(n.stake(&caller()?, amount, tournament, round, confidence)?)?,
        Command::StakeOnBehalf {
            source,
            staker,
            amount,
            tournament,
            round,
            confidence,
        } => serde_json::to_value(n.stake_on_behalf(
            &caller()?,
            &source,
            &staker,
            amount,
            tournament,
            round,
            confidence,
        )?)?,
        Command::GetStake {
            tournament,
            round,
            staker,
        } => serde_json::to_value(n.get_stake(tournament, round, &staker)?)?,
        Command::DestroyStake {
            staker,
            tournament,
            round,
        } => serde_json::to_value(n.destroy_stake(&caller()?, &staker, tournament, round)?)?,
        Command::ReleaseStake {
            staker,
            tournament,
            round,
            success,
        } => serde_json::to_value(n.release_stake(
            &caller()?,
            &staker,
            tournament,
            round,
            success,
        )?)?,
        Command::ChangeDelegate { delegate } => match n.change_delegate(&caller()?, delegate)? {
            DelegateChange::Pending { candidate } => {
                json!({ "status": "pending", "candidate": candidate })
            }
            DelegateChange::Changed { previous, current } => {
                json!({ "status": "changed", "previous": previous, "current": current })
            }
        },
        Command::Delegate => {
            let pending = n.pending_delegate().map(|(candidate, approved_by)| {
                json!({ "candidate": candidate, "approved_by": approved_by })
            });
            json!({ "delegate": n.delegate(), "pending": pending })
        }
        Command::NumeraiTransfer {
            destination,
            amount,
        } => match n.numerai_transfer(&caller()?, destination, amount)? {
            TransferOutcome::Pending => json!({ "status": "pending" }),
            TransferOutcome::Transferred { assigned_slot } => json!({
                "status": "transferred",
                "destination": destination,
                "amount": amount,
                "assigned_slot": assigned_slot,
            }),
        },
        Command::TransferDeposit { slot } => {
            let sweep = n.transfer_deposit(&caller()?, &slot)?;
            json!({
                "slot": slot,
                "swept": sweep.amount,
                "assigned_slot": sweep.assigned_slot,
            })
        }
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nmr_types::ProtocolParams;

    const NOW: u64 = 1_500_000_000;

    fn config(dir: &tempfile::TempDir) -> NumeraireConfig {
        NumeraireConfig {
            state_path: dir.path().join("numeraire.state"),
            ..NumeraireConfig::default()
        }
    }

    fn clock() -> FixedClock {
        FixedClock(Timestamp::new(NOW))
    }

    #[test]
    fn init_then_mint_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let operator = ProtocolParams::default().operator;

        run(Command::Init { force: false }, &config, clock(), None).unwrap();
        let out = run(
            Command::Mint {
                amount: NmrAmount::new(1_000),
            },
            &config,
            clock(),
            Some(operator),
        )
        .unwrap();
        assert_eq!(out["minted"], json!(NmrAmount::new(1_000)));

        let out = run(Command::Supply, &config, clock(), None).unwrap();
        assert_eq!(out["total_supply"], json!(NmrAmount::new(1_000)));
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        run(Command::Init { force: false }, &config, clock(), None).unwrap();
        assert!(run(Command::Init { force: false }, &config, clock(), None).is_err());
        run(Command::Init { force: true }, &config, clock(), None).unwrap();
    }

    #[test]
    fn mutating_command_without_caller_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        run(Command::Init { force: false }, &config, clock(), None).unwrap();
        let err = run(
            Command::Mint {
                amount: NmrAmount::new(1),
            },
            &config,
            clock(),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("--caller"));
    }

    #[test]
    fn failed_command_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        run(Command::Init { force: false }, &config, clock(), None).unwrap();
        let before = std::fs::read(&config.state_path).unwrap();

        let stranger = Address::from_low_u64(0xdead);
        assert!(run(
            Command::Mint {
                amount: NmrAmount::new(1),
            },
            &config,
            clock(),
            Some(stranger),
        )
        .is_err());
        assert_eq!(std::fs::read(&config.state_path).unwrap(), before);
    }

    #[test]
    fn missing_state_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(Command::Supply, &config(&dir), clock(), None).unwrap_err();
        assert!(err.to_string().contains("loading state"));
    }
}
