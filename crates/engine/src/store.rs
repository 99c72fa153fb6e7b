//! Append-only in-memory transaction store.

use std::{collections::HashSet, io::Read};

use crate::{EngineError, ResultEngine, Transaction};

/// The set of transactions available for querying.
///
/// Records keep their insertion order, which filter limits and gateway
/// tie-breaks follow. Ids are unique.
#[derive(Clone, Debug, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    ids: HashSet<String>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from `transactions`, validating each record.
    pub fn from_transactions<I>(transactions: I) -> ResultEngine<Self>
    where
        I: IntoIterator<Item = Transaction>,
    {
        let mut store = Self::new();
        for tx in transactions {
            store.append(tx)?;
        }
        Ok(store)
    }

    /// Reads a JSON array of transactions.
    pub fn from_json_reader<R: Read>(reader: R) -> ResultEngine<Self> {
        let transactions: Vec<Transaction> = serde_json::from_reader(reader)?;
        Self::from_transactions(transactions)
    }

    /// Appends one transaction.
    ///
    /// Fails with [`EngineError::ExistingKey`] if the id is already stored.
    pub fn append(&mut self, tx: Transaction) -> ResultEngine<()> {
        tx.validate()?;
        if self.ids.contains(&tx.id) {
            return Err(EngineError::ExistingKey(tx.id));
        }
        self.ids.insert(tx.id.clone());
        self.transactions.push(tx);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }
}
