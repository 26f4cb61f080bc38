//! Plain text renderings of ledger data

use pacsweb_core::accounts::make_acc_repr;
use pacsweb_core::dates::{days_between, format_full_readable, today};
use pacsweb_core::journal::JOURNAL_COLUMNS;
use pacsweb_core::{
    AccountTreeNode, Currency, JournalPage, JournalRow, LedgerSnapshot, MoneyFormatter,
    Pagination, ReportTable, Transaction,
};
use pacsweb_parser::PortfolioStats;
use pacsweb_utils::{render_table, truncate};
use std::collections::BTreeMap;

const DESCRIPTION_WIDTH: usize = 40;

fn header(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

pub fn account_tree(tree: &AccountTreeNode) -> String {
    tree.walk()
        .into_iter()
        .map(|(depth, account)| format!("{}{}", "  ".repeat(depth), make_acc_repr(account)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn currencies(currencies: &[Currency]) -> String {
    let rows: Vec<Vec<String>> = currencies
        .iter()
        .map(|c| {
            vec![
                c.pk.to_string(),
                c.name.clone(),
                if c.imutable { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    render_table(&header(&["Pk", "Name", "Immutable"]), &rows)
}

pub fn transactions(snapshot: &LedgerSnapshot, transactions: &[Transaction]) -> String {
    let accounts = snapshot.account_lookup();
    let rows: Vec<Vec<String>> = transactions
        .iter()
        .map(|t| {
            let names: Vec<String> = t
                .accounts()
                .into_iter()
                .map(|pk| {
                    accounts
                        .get(pk)
                        .map(|a| a.name.clone())
                        .unwrap_or_else(|| format!("?{}", pk))
                })
                .collect();
            vec![
                t.pk.to_string(),
                t.date.format("%Y-%m-%d").to_string(),
                truncate(&t.description, DESCRIPTION_WIDTH),
                names.join(", "),
            ]
        })
        .collect();
    render_table(&header(&["Pk", "Date", "Description", "Accounts"]), &rows)
}

pub fn transaction_detail(
    snapshot: &LedgerSnapshot,
    formatter: &MoneyFormatter,
    transaction: &Transaction,
) -> String {
    let days = days_between(&today(), &transaction.date);
    let mut lines = vec![
        format!("Transaction {}: {}", transaction.pk, transaction.description),
        format!("Date: {} ({} days ago)", format_full_readable(&transaction.date), days),
    ];
    if let Some(reference) = &transaction.reference {
        lines.push(format!("Reference: {}", reference));
    }
    if !transaction.tags.is_empty() {
        lines.push(format!(
            "Tags: {}",
            pacsweb_parser::tags::to_user_input(&transaction.tags)
        ));
    }

    let accounts = snapshot.account_lookup();
    let currencies = snapshot.currency_lookup();
    let rows: Vec<Vec<String>> = transaction
        .movements
        .iter()
        .map(|m| {
            vec![
                accounts
                    .get(m.account)
                    .map(make_acc_repr)
                    .unwrap_or_else(|| format!("({}) ?", m.account)),
                formatter.money(|pk| currencies.get(pk), &m.money),
                m.comment.clone().unwrap_or_default(),
            ]
        })
        .collect();
    lines.push(String::new());
    lines.push(render_table(&header(&["Account", "Money", "Comment"]), &rows));
    lines.join("\n")
}

pub fn journal(page: &JournalPage, pagination: &Pagination, rows: &[JournalRow]) -> String {
    let cells: Vec<Vec<String>> = rows.iter().map(JournalRow::cells).collect();
    format!(
        "{}\n\nPage {} of {} ({} entries)",
        render_table(&header(&JOURNAL_COLUMNS), &cells),
        pagination.page + 1,
        pagination.page_count(page.count).max(1),
        page.count
    )
}

pub fn report(table: &ReportTable) -> String {
    render_table(&table.header, &table.rows)
}

pub fn portfolio_stats(stats: &PortfolioStats) -> String {
    let rows: Vec<Vec<String>> = stats
        .number_of_entries
        .iter()
        .map(|(currency, count)| vec![currency.clone(), count.to_string()])
        .collect();
    render_table(&header(&["Currency", "Entries"]), &rows)
}

pub fn flags(flags: &BTreeMap<String, bool>) -> String {
    let rows: Vec<Vec<String>> = flags
        .iter()
        .map(|(name, active)| vec![name.clone(), active.to_string()])
        .collect();
    render_table(&header(&["Flag", "Active"]), &rows)
}
