use std::collections::HashMap;

use derive_more::{Display, From, Into};

use crate::commit::CommitIdx;

/// Position of an [`Account`] in its repository.
#[derive(Clone, Copy, Debug, Display, Eq, From, Hash, Into, Ord, PartialEq, PartialOrd)]
#[display("account #{_0}")]
pub struct AccountIdx(usize);

/// The identity of an author or committer.
#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{name} <{email}>")]
pub struct AccountKey {
    pub name: String,
    pub email: String
}

impl AccountKey {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> AccountKey {
        AccountKey {
            name: name.into(),
            email: email.into()
        }
    }
}

/// Someone who authored or committed in the repository.
#[derive(Clone, Debug)]
pub struct Account {
    pub idx: AccountIdx,
    pub key: AccountKey,

    /// Every commit this account authored or committed, in log order.
    pub commits: Vec<CommitIdx>
}

impl Account {
    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn email(&self) -> &str {
        &self.key.email
    }
}

/// Hands out one [`Account`] per distinct name and email.
#[derive(Debug, Default)]
pub struct Accounts {
    inner: Vec<Account>,
    by_key: HashMap<AccountKey, AccountIdx>
}

impl Accounts {
    pub fn new() -> Accounts {
        Accounts::default()
    }

    /// Get the account for `key`, creating it on first sight.
    pub fn get_or_create(&mut self, key: AccountKey) -> AccountIdx {
        if let Some(&idx) = self.by_key.get(&key) {
            return idx;
        }

        let idx = AccountIdx::from(self.inner.len());

        self.inner.push(Account {
            idx,
            key: key.clone(),
            commits: vec![]
        });

        self.by_key.insert(key, idx);

        idx
    }

    pub fn get(&self, idx: AccountIdx) -> Option<&Account> {
        self.inner.get(usize::from(idx))
    }

    pub fn get_mut(&mut self, idx: AccountIdx) -> Option<&mut Account> {
        self.inner.get_mut(usize::from(idx))
    }

    pub fn find(&self, key: &AccountKey) -> Option<&Account> {
        self.by_key
            .get(key)
            .and_then(|&idx| self.get(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
