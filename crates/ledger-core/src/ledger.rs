//! Wallet registry and the only writer of the chain and the Merkle tree.
//!
//! Every transfer is validated and its block mined before anything is
//! mutated, so a rejected call leaves balances, histories, tree and chain
//! exactly as they were.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{info, warn};

use crate::account::Account;
use crate::block::Block;
use crate::chain::Blockchain;
use crate::config::LedgerConfig;
use crate::constants::{EXTERNAL_SOURCE, HASH_HEX_SIZE};
use crate::error::{LedgerError, Result};
use crate::export;
use crate::merkle::MerkleTree;
use crate::pow::Miner;
use crate::transaction::Transaction;

/// Outcome of a committed transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub transaction: Transaction,
    pub block_index: u64,
    pub block_hash: String,
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tx = &self.transaction;
        if tx.is_external() {
            write!(
                f,
                "Received {} tokens in wallet '{}' with label '{}'",
                tx.amount, tx.receiver, tx.label
            )
        } else {
            write!(
                f,
                "Sent {} tokens from '{}' to '{}' with label '{}'",
                tx.amount, tx.sender, tx.receiver, tx.label
            )
        }
    }
}

#[derive(Clone, Debug)]
pub struct Ledger {
    accounts: BTreeMap<String, Account>,
    chain: Blockchain,
    merkle: MerkleTree,
    difficulty: usize,
    miner: Miner,
}

impl Ledger {
    /// Builds an empty ledger and mines its genesis block.
    pub fn new(config: LedgerConfig) -> Result<Self> {
        check_difficulty(config.difficulty)?;
        let miner = config.miner();
        let chain = Blockchain::new(config.difficulty, &miner)?;
        Ok(Self {
            accounts: BTreeMap::new(),
            chain,
            merkle: MerkleTree::new(),
            difficulty: config.difficulty,
            miner,
        })
    }

    pub fn with_difficulty(difficulty: usize) -> Result<Self> {
        Self::new(LedgerConfig {
            difficulty,
            ..LedgerConfig::default()
        })
    }

    pub fn register(&mut self, name: &str) -> Result<()> {
        validate_name(name).inspect_err(|e| warn!("register rejected: {e}"))?;
        if self.accounts.contains_key(name) {
            let err = LedgerError::DuplicateAccount(name.to_string());
            warn!("register rejected: {err}");
            return Err(err);
        }
        self.accounts.insert(name.to_string(), Account::new(name));
        info!(wallet = name, "wallet created");
        Ok(())
    }

    pub fn balance_of(&self, name: &str) -> Result<u64> {
        self.account(name).map(|a| a.balance)
    }

    pub fn history(&self, name: &str) -> Result<&[Transaction]> {
        self.account(name).map(|a| a.history.as_slice())
    }

    /// Credits `name` with tokens from outside the ledger.
    pub fn receive(&mut self, name: &str, amount: u64, label: Option<&str>) -> Result<Receipt> {
        self.try_receive(name, amount, label)
            .inspect_err(|e| warn!("receive rejected: {e}"))
    }

    fn try_receive(&mut self, name: &str, amount: u64, label: Option<&str>) -> Result<Receipt> {
        let balance = self.balance_of(name)?;
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let credited = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(name.to_string()))?;

        let tx = Transaction::external(name, amount, label);
        let block = self.seal(&tx)?;

        let account = self.account_mut(name)?;
        account.balance = credited;
        account.history.push(tx.clone());

        Ok(self.record(tx, block))
    }

    /// Moves `amount` from `from` to `to`.
    pub fn send(
        &mut self,
        from: &str,
        to: &str,
        amount: u64,
        label: Option<&str>,
    ) -> Result<Receipt> {
        self.try_send(from, to, amount, label)
            .inspect_err(|e| warn!("send rejected: {e}"))
    }

    fn try_send(
        &mut self,
        from: &str,
        to: &str,
        amount: u64,
        label: Option<&str>,
    ) -> Result<Receipt> {
        let available = self.balance_of(from)?;
        let receiver_balance = self.balance_of(to)?;
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                available,
                requested: amount,
            });
        }
        if from != to && receiver_balance.checked_add(amount).is_none() {
            return Err(LedgerError::BalanceOverflow(to.to_string()));
        }

        let tx = Transaction::new(from, to, amount, label);
        let block = self.seal(&tx)?;

        // A self-transfer nets to zero and lands in the history twice.
        let sender = self.account_mut(from)?;
        sender.balance -= amount;
        sender.history.push(tx.clone());
        let receiver = self.account_mut(to)?;
        receiver.balance += amount;
        receiver.history.push(tx.clone());

        Ok(self.record(tx, block))
    }

    /// Mines the block for `tx` without touching any state.
    fn seal(&self, tx: &Transaction) -> Result<Block> {
        self.chain
            .prepare_block(vec![tx.clone()], self.difficulty, &self.miner)
    }

    fn record(&mut self, tx: Transaction, block: Block) -> Receipt {
        self.merkle.add_leaf(&tx.canonical_string());
        let block = self.chain.push_sealed(block);
        let receipt = Receipt {
            transaction: tx,
            block_index: block.index,
            block_hash: block.hash.clone(),
        };
        info!(block = receipt.block_index, "{receipt}");
        receipt
    }

    /// Changes the difficulty for blocks mined from now on.
    pub fn set_difficulty(&mut self, difficulty: usize) -> Result<()> {
        check_difficulty(difficulty).inspect_err(|e| warn!("set_difficulty rejected: {e}"))?;
        self.difficulty = difficulty;
        info!("Mining difficulty set to {difficulty}");
        Ok(())
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn miner(&self) -> &Miner {
        &self.miner
    }

    pub fn account(&self, name: &str) -> Result<&Account> {
        self.accounts
            .get(name)
            .ok_or_else(|| LedgerError::UnknownAccount(name.to_string()))
    }

    fn account_mut(&mut self, name: &str) -> Result<&mut Account> {
        self.accounts
            .get_mut(name)
            .ok_or_else(|| LedgerError::UnknownAccount(name.to_string()))
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn account_names(&self) -> Vec<&str> {
        self.accounts.keys().map(String::as_str).collect()
    }

    pub fn total_supply(&self) -> u128 {
        self.accounts.values().map(|a| u128::from(a.balance)).sum()
    }

    pub fn blockchain(&self) -> &Blockchain {
        &self.chain
    }

    pub fn blocks(&self) -> &[Block] {
        self.chain.blocks()
    }

    pub fn merkle_tree(&self) -> &MerkleTree {
        &self.merkle
    }

    pub fn merkle_levels(&self) -> &[Vec<String>] {
        self.merkle.levels()
    }

    pub fn merkle_root(&self) -> Option<&str> {
        self.merkle.root()
    }

    /// CSV export of one wallet's history.
    pub fn export_history(&self, name: &str) -> Result<String> {
        self.history(name).map(export::history_csv)
    }

    /// Text export of every block.
    pub fn export_chain(&self) -> String {
        export::chain_text(self.chain.blocks())
    }
}

impl Default for Ledger {
    /// Difficulty 2 and an unbounded sequential miner.
    fn default() -> Self {
        // An unbounded search at a difficulty within the digest length
        // always finds a nonce.
        Self::new(LedgerConfig::default()).expect("default config always mines genesis")
    }
}

fn check_difficulty(difficulty: usize) -> Result<()> {
    if difficulty > HASH_HEX_SIZE {
        return Err(LedgerError::InvalidDifficulty {
            requested: difficulty,
            max: HASH_HEX_SIZE,
        });
    }
    Ok(())
}

// Blank names and the external source marker are reserved.
fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name == EXTERNAL_SOURCE {
        return Err(LedgerError::InvalidAccountName(name.to_string()));
    }
    Ok(())
}
