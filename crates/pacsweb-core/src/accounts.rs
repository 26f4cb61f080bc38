//! Account hierarchy utilities over a flat account list.
//!
//! The server hands accounts out as a flat list where each account points to
//! its parent. Everything here walks those `parent` links; walks stop when
//! they revisit an account so a malformed list cannot loop forever.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{Account, Movement, Money, Pk};

// ==================== Lookup ====================

/// Entities identified by a primary key
pub trait HasPk {
    fn pk(&self) -> Pk;
}

impl HasPk for Account {
    fn pk(&self) -> Pk {
        self.pk
    }
}

impl HasPk for crate::types::Currency {
    fn pk(&self) -> Pk {
        self.pk
    }
}

impl HasPk for crate::types::Transaction {
    fn pk(&self) -> Pk {
        self.pk
    }
}

/// A pk-indexed getter over a borrowed list
#[derive(Debug)]
pub struct Lookup<'a, T> {
    index: HashMap<Pk, &'a T>,
}

impl<'a, T: HasPk> Lookup<'a, T> {
    pub fn new(items: &'a [T]) -> Self {
        Self {
            index: items.iter().map(|item| (item.pk(), item)).collect(),
        }
    }

    pub fn get(&self, pk: Pk) -> Option<&'a T> {
        self.index.get(&pk).copied()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

// ==================== Hierarchy ====================

/// True iff `a` descends from `b` through `parent` links.
///
/// False for identical accounts, unrelated accounts and when a parent in the
/// chain is missing from `accounts`.
pub fn is_descendant(accounts: &[Account], a: &Account, b: &Account) -> bool {
    if a.pk == b.pk {
        return false;
    }
    let mut visited = HashSet::from([a.pk]);
    let mut current = a.parent;
    while let Some(parent_pk) = current {
        if parent_pk == b.pk {
            return true;
        }
        if !visited.insert(parent_pk) {
            log::warn!("Cycle detected while walking parents of account {}", a.pk);
            return false;
        }
        current = match accounts.iter().find(|acc| acc.pk == parent_pk) {
            Some(parent) => parent.parent,
            None => return false,
        };
    }
    false
}

/// Direct children of `account`
pub fn children<'a>(accounts: &'a [Account], account: &Account) -> Vec<&'a Account> {
    accounts
        .iter()
        .filter(|acc| acc.parent == Some(account.pk) && acc.pk != account.pk)
        .collect()
}

/// All accounts descending from `account`, in list order
pub fn descendants<'a>(accounts: &'a [Account], account: &Account) -> Vec<&'a Account> {
    accounts
        .iter()
        .filter(|acc| is_descendant(accounts, acc, account))
        .collect()
}

/// Finds the single root account.
pub fn find_root(accounts: &[Account]) -> CoreResult<&Account> {
    let mut roots = accounts.iter().filter(|acc| acc.is_root());
    match (roots.next(), roots.next()) {
        (Some(root), None) => Ok(root),
        (None, _) => Err(CoreError::MissingRoot),
        (Some(_), Some(_)) => Err(CoreError::MultipleRoots),
    }
}

/// Moneys of the movements posted to `account` or to one of its
/// descendants, in movement order.
///
/// Movements whose account cannot be resolved are skipped.
pub fn extract_moneys_for_account<'a, G, D>(
    get_account: G,
    is_descendant: D,
    account: &Account,
    movements: &[Movement],
) -> Vec<Money>
where
    G: Fn(Pk) -> Option<&'a Account>,
    D: Fn(&Account, &Account) -> bool,
{
    movements
        .iter()
        .filter(|movement| {
            if movement.account == account.pk {
                return true;
            }
            match get_account(movement.account) {
                Some(movement_account) => is_descendant(movement_account, account),
                None => false,
            }
        })
        .map(|movement| movement.money.clone())
        .collect()
}

/// Short label for an account: `(pk) name [R|B|L]`
pub fn make_acc_repr(account: &Account) -> String {
    format!(
        "({}) {} [{}]",
        account.pk,
        account.name,
        account.acc_type.abbrev()
    )
}

// ==================== Tree ====================

/// Account tree node for hierarchical display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountTreeNode {
    pub account: Account,
    pub children: Vec<AccountTreeNode>,
}

impl AccountTreeNode {
    /// Number of accounts in this subtree, itself included
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(AccountTreeNode::size).sum::<usize>()
    }

    /// Depth-first walk yielding `(depth, account)`
    pub fn walk(&self) -> Vec<(usize, &Account)> {
        let mut out = vec![];
        self.walk_into(0, &mut out);
        out
    }

    fn walk_into<'a>(&'a self, depth: usize, out: &mut Vec<(usize, &'a Account)>) {
        out.push((depth, &self.account));
        for child in &self.children {
            child.walk_into(depth + 1, out);
        }
    }
}

/// Builds the account tree starting at the root account
pub fn account_tree(accounts: &[Account]) -> CoreResult<AccountTreeNode> {
    let root = find_root(accounts)?;
    let mut visited = HashSet::new();
    Ok(build_tree(accounts, root, &mut visited))
}

/// Build tree node recursively
fn build_tree(accounts: &[Account], account: &Account, visited: &mut HashSet<Pk>) -> AccountTreeNode {
    visited.insert(account.pk);
    let mut nodes = vec![];
    for child in children(accounts, account) {
        if visited.contains(&child.pk) {
            continue;
        }
        nodes.push(build_tree(accounts, child, visited));
    }
    AccountTreeNode {
        account: account.clone(),
        children: nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccType;
    use rust_decimal::Decimal;

    fn acc(pk: Pk, acc_type: AccType, parent: Option<Pk>) -> Account {
        Account {
            pk,
            name: format!("acc{}", pk),
            acc_type,
            parent,
        }
    }

    /// root(1) -> branch(2) -> branch(3) -> leaf(4); root(1) -> leaf(5)
    fn fixture() -> Vec<Account> {
        vec![
            acc(1, AccType::Root, None),
            acc(2, AccType::Branch, Some(1)),
            acc(3, AccType::Branch, Some(2)),
            acc(4, AccType::Leaf, Some(3)),
            acc(5, AccType::Leaf, Some(1)),
        ]
    }

    fn movement(account: Pk, quantity: i64) -> Movement {
        Movement {
            account,
            money: Money::new(1, Decimal::from(quantity)),
            comment: None,
        }
    }

    #[test]
    fn test_is_descendant_multi_level() {
        let accounts = fixture();
        assert!(is_descendant(&accounts, &accounts[3], &accounts[1]));
        assert!(is_descendant(&accounts, &accounts[3], &accounts[0]));
        assert!(is_descendant(&accounts, &accounts[2], &accounts[1]));
    }

    #[test]
    fn test_is_descendant_false_cases() {
        let accounts = fixture();
        // identical
        assert!(!is_descendant(&accounts, &accounts[1], &accounts[1]));
        // unrelated
        assert!(!is_descendant(&accounts, &accounts[4], &accounts[1]));
        // reversed
        assert!(!is_descendant(&accounts, &accounts[1], &accounts[3]));
        // missing parent
        let orphan = acc(9, AccType::Leaf, Some(99));
        assert!(!is_descendant(&accounts, &orphan, &accounts[0]));
    }

    #[test]
    fn test_is_descendant_terminates_on_cycles() {
        let accounts = vec![
            acc(1, AccType::Root, None),
            acc(2, AccType::Branch, Some(3)),
            acc(3, AccType::Branch, Some(2)),
        ];
        assert!(!is_descendant(&accounts, &accounts[1], &accounts[0]));
        assert!(is_descendant(&accounts, &accounts[1], &accounts[2]));
    }

    #[test]
    fn test_extract_moneys_for_account() {
        let accounts = fixture();
        let lookup = Lookup::new(&accounts);
        let movements = vec![
            movement(4, 10),
            movement(5, -10),
            movement(2, 7),
            movement(42, 1),
            movement(3, -7),
        ];
        let moneys = extract_moneys_for_account(
            |pk| lookup.get(pk),
            |a, b| is_descendant(&accounts, a, b),
            &accounts[1],
            &movements,
        );
        assert_eq!(
            moneys,
            vec![
                Money::new(1, Decimal::from(10)),
                Money::new(1, Decimal::from(7)),
                Money::new(1, Decimal::from(-7)),
            ]
        );
    }

    #[test]
    fn test_children_and_descendants() {
        let accounts = fixture();
        let pks = |xs: Vec<&Account>| xs.iter().map(|a| a.pk).collect::<Vec<_>>();
        assert_eq!(pks(children(&accounts, &accounts[0])), vec![2, 5]);
        assert_eq!(pks(descendants(&accounts, &accounts[1])), vec![3, 4]);
        assert!(children(&accounts, &accounts[3]).is_empty());
    }

    #[test]
    fn test_find_root() {
        let accounts = fixture();
        assert_eq!(find_root(&accounts).unwrap().pk, 1);
        assert!(matches!(find_root(&accounts[1..]), Err(CoreError::MissingRoot)));
        let mut two_roots = fixture();
        two_roots.push(acc(6, AccType::Root, None));
        assert!(matches!(find_root(&two_roots), Err(CoreError::MultipleRoots)));
    }

    #[test]
    fn test_account_tree() {
        let accounts = fixture();
        let tree = account_tree(&accounts).unwrap();
        assert_eq!(tree.account.pk, 1);
        assert_eq!(tree.size(), 5);
        let walked: Vec<(usize, Pk)> = tree.walk().into_iter().map(|(d, a)| (d, a.pk)).collect();
        assert_eq!(walked, vec![(0, 1), (1, 2), (2, 3), (3, 4), (1, 5)]);
    }

    #[test]
    fn test_make_acc_repr() {
        let account = Account {
            pk: 12,
            name: "Cash".to_string(),
            acc_type: AccType::Leaf,
            parent: Some(1),
        };
        assert_eq!(make_acc_repr(&account), "(12) Cash [L]");
    }

    #[test]
    fn test_lookup() {
        let accounts = fixture();
        let lookup = Lookup::new(&accounts);
        assert_eq!(lookup.len(), 5);
        assert_eq!(lookup.get(3).map(|a| a.pk), Some(3));
        assert!(lookup.get(100).is_none());
    }
}
