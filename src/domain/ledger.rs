use serde::{Deserialize, Serialize};

use super::{Cents, ClassificationPolicy, Transaction, TransactionKind};

/// A transaction paired with the cumulative balance up to and including it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRow {
    pub transaction: Transaction,
    pub running_balance: Cents,
}

/// Aggregate view of the treasury, computed fresh from the transaction list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub rows: Vec<LedgerRow>,
    pub current_balance: Cents,
    pub total_income: Cents,
    pub total_expenses: Cents,
    pub scholarship_total: Cents,
}

/// Compute the balance sheet from transactions sorted ascending by date.
///
/// A strict left-to-right fold: no row's running balance depends on later
/// transactions. Callers are responsible for sorting; out-of-order input is
/// neither detected nor corrected here.
///
/// Deposits add to the balance and to income, except opening-balance entries,
/// which move the balance only. Deposits matching the scholarship rule also
/// accrue to the scholarship fund total. Expenses subtract from the balance
/// and add to the expense total. Transactions with an unrecognized kind move
/// nothing but still emit a row, so every entry the chapter recorded stays
/// visible in the ledger.
pub fn compute_balance_sheet(
    transactions: &[Transaction],
    policy: &ClassificationPolicy,
) -> BalanceSheet {
    let mut balance: Cents = 0;
    let mut total_income: Cents = 0;
    let mut total_expenses: Cents = 0;
    let mut scholarship_total: Cents = 0;
    let mut rows = Vec::with_capacity(transactions.len());

    for txn in transactions {
        let amount = txn.amount_cents();

        match txn.parsed_kind() {
            Some(TransactionKind::Deposit) => {
                balance += amount;
                if !policy.is_opening_balance(txn) {
                    total_income += amount;
                }
                if policy.is_scholarship(txn) {
                    scholarship_total += amount;
                }
            }
            Some(TransactionKind::Expense) => {
                balance -= amount;
                total_expenses += amount;
            }
            None => {}
        }

        rows.push(LedgerRow {
            transaction: txn.clone(),
            running_balance: balance,
        });
    }

    BalanceSheet {
        rows,
        current_balance: balance,
        total_income,
        total_expenses,
        scholarship_total,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn deposit(amount: Cents, description: &str) -> Transaction {
        Transaction::new(TransactionKind::Deposit, amount, Utc::now())
            .with_description(description)
    }

    fn expense(amount: Cents, description: &str) -> Transaction {
        Transaction::new(TransactionKind::Expense, amount, Utc::now())
            .with_description(description)
    }

    fn compute(transactions: &[Transaction]) -> BalanceSheet {
        compute_balance_sheet(transactions, &ClassificationPolicy::default())
    }

    #[test]
    fn test_empty_input_yields_zero_totals() {
        let sheet = compute(&[]);
        assert!(sheet.rows.is_empty());
        assert_eq!(sheet.current_balance, 0);
        assert_eq!(sheet.total_income, 0);
        assert_eq!(sheet.total_expenses, 0);
        assert_eq!(sheet.scholarship_total, 0);
    }

    #[test]
    fn test_running_balance_is_cumulative() {
        let txns = vec![
            deposit(10000, "Dues"),
            expense(2500, "Venue rental"),
            deposit(5000, "Raffle"),
        ];
        let sheet = compute(&txns);

        let balances: Vec<Cents> = sheet.rows.iter().map(|r| r.running_balance).collect();
        assert_eq!(balances, vec![10000, 7500, 12500]);
        assert_eq!(sheet.current_balance, 12500);
        assert_eq!(sheet.total_income, 15000);
        assert_eq!(sheet.total_expenses, 2500);
    }

    #[test]
    fn test_last_row_balance_equals_current_balance() {
        let txns = vec![deposit(100, "a"), expense(30, "b"), expense(70, "c")];
        let sheet = compute(&txns);
        assert_eq!(
            sheet.rows.last().map(|r| r.running_balance),
            Some(sheet.current_balance)
        );
    }

    #[test]
    fn test_each_row_advances_by_signed_amount() {
        let mut txns = vec![
            deposit(10000, "Dues"),
            expense(2500, "Postage"),
            deposit(300, "Interest"),
        ];
        txns[2].kind = "adjustment".into(); // unrecognized, signed amount 0

        let sheet = compute(&txns);
        let mut previous = 0;
        for row in &sheet.rows {
            assert_eq!(
                row.running_balance,
                previous + row.transaction.signed_amount()
            );
            previous = row.running_balance;
        }
    }

    #[test]
    fn test_opening_balance_excluded_from_income() {
        let txns = vec![deposit(100_000, "Beginning Balance")];
        let sheet = compute(&txns);
        assert_eq!(sheet.current_balance, 100_000);
        assert_eq!(sheet.total_income, 0);
        assert_eq!(sheet.total_expenses, 0);
    }

    #[test]
    fn test_scholarship_deposit_accrues_to_fund() {
        let txns = vec![
            deposit(50000, "Scholarship Donation - Blake Fought Memorial"),
            expense(20000, "Award check"),
        ];
        let sheet = compute(&txns);
        assert_eq!(sheet.current_balance, 30000);
        assert_eq!(sheet.scholarship_total, 50000);
        assert_eq!(sheet.total_expenses, 20000);
    }

    #[test]
    fn test_scholarship_expense_does_not_accrue() {
        // The fund tracks donations in; scholarship spending is an ordinary expense
        let txns = vec![expense(20000, "Scholarship award")];
        let sheet = compute(&txns);
        assert_eq!(sheet.scholarship_total, 0);
        assert_eq!(sheet.total_expenses, 20000);
    }

    #[test]
    fn test_unrecognized_kind_is_skipped_but_rowed() {
        let mut txns = vec![deposit(1000, "Dues"), deposit(500, "Mystery")];
        txns[1].kind = "journal".into();

        let sheet = compute(&txns);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1].running_balance, 1000);
        assert_eq!(sheet.current_balance, 1000);
        assert_eq!(sheet.total_income, 1000);
    }

    #[test]
    fn test_unparsable_amount_counts_as_zero() {
        let mut txns = vec![deposit(1000, "Dues"), deposit(500, "Torn check")];
        txns[1].amount = Some("".into());

        let sheet = compute(&txns);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1].running_balance, 1000);
        assert_eq!(sheet.total_income, 1000);
    }

    #[test]
    fn test_missing_amount_counts_as_zero() {
        let mut txns = vec![expense(1000, "Stamps")];
        txns[0].amount = None;

        let sheet = compute(&txns);
        assert_eq!(sheet.current_balance, 0);
        assert_eq!(sheet.total_expenses, 0);
        assert_eq!(sheet.rows[0].running_balance, 0);
    }

    #[test]
    fn test_compute_is_pure() {
        let txns = vec![
            deposit(100_000, "Beginning Balance"),
            deposit(50000, "Scholarship drive"),
            expense(12500, "Banner printing"),
        ];
        let first = compute(&txns);
        let second = compute(&txns);

        assert_eq!(first.current_balance, second.current_balance);
        assert_eq!(first.total_income, second.total_income);
        assert_eq!(first.total_expenses, second.total_expenses);
        assert_eq!(first.scholarship_total, second.scholarship_total);
        assert_eq!(first.rows.len(), second.rows.len());
        for (a, b) in first.rows.iter().zip(second.rows.iter()) {
            assert_eq!(a.running_balance, b.running_balance);
            assert_eq!(a.transaction.id, b.transaction.id);
        }
    }

    #[test]
    fn test_balance_is_income_minus_expenses_plus_opening() {
        let txns = vec![
            deposit(100_000, "Beginning Balance"),
            deposit(25000, "Dues"),
            expense(10000, "Picnic supplies"),
            deposit(5000, "Scholarship gift"),
            expense(7500, "Newsletter printing"),
        ];
        let sheet = compute(&txns);
        assert_eq!(sheet.total_income, 30000);
        assert_eq!(sheet.total_expenses, 17500);
        assert_eq!(sheet.current_balance, 100_000 + 30000 - 17500);
    }
}
