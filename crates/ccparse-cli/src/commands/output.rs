//! Rendering statement records as JSON, CSV or a text summary.

use std::fmt::Write as _;

use ccparse_core::{StatementRecord, TransactionRecord, UNKNOWN};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per transaction
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn format_record(
    record: &StatementRecord,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(UNKNOWN)
}

fn card_number(record: &StatementRecord) -> String {
    record
        .card_number
        .map(|n| n.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn format_csv(record: &StatementRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "issuer",
        "card_number",
        "card_variant",
        "statement_period",
        "payment_due_date",
        "total_amount_due",
        "minimum_amount_due",
        "txn_date",
        "txn_type",
        "txn_description",
        "txn_debit",
        "txn_credit",
    ])?;

    let card = card_number(record);
    let statement = [
        field(&record.issuer),
        card.as_str(),
        field(&record.card_variant),
        field(&record.statement_period),
        field(&record.payment_due_date),
        field(&record.total_amount_due),
        field(&record.minimum_amount_due),
    ];

    if record.transactions.is_empty() {
        let mut row: Vec<&str> = statement.to_vec();
        row.extend(["", "", "", "", ""]);
        wtr.write_record(&row)?;
    }

    for txn in &record.transactions {
        let mut row: Vec<&str> = statement.to_vec();
        row.extend([
            txn.date.as_str(),
            txn.kind.as_str(),
            txn.description.as_str(),
            txn.debit.as_deref().unwrap_or(""),
            txn.credit.as_deref().unwrap_or(""),
        ]);
        wtr.write_record(&row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_transaction(out: &mut String, txn: &TransactionRecord) {
    let amount = txn.amount().unwrap_or("-");
    let _ = writeln!(
        out,
        "  {:<12} {:<7} {:<40} {:>14}",
        txn.date,
        txn.kind.as_str(),
        txn.description,
        amount
    );
}

fn format_text(record: &StatementRecord) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Issuer:          {}", field(&record.issuer));
    let _ = writeln!(output, "Card:            {}", card_number(record));
    let _ = writeln!(output, "Variant:         {}", field(&record.card_variant));
    let _ = writeln!(output, "Period:          {}", field(&record.statement_period));
    let _ = writeln!(output, "Payment due:     {}", field(&record.payment_due_date));
    let _ = writeln!(output, "Total due:       {}", field(&record.total_amount_due));
    let _ = writeln!(output, "Minimum due:     {}", field(&record.minimum_amount_due));
    output.push('\n');

    if record.transactions.is_empty() {
        output.push_str("No transactions found\n");
        return output;
    }

    let _ = writeln!(output, "Transactions ({}):", record.transactions.len());
    for txn in &record.transactions {
        format_transaction(&mut output, txn);
    }
    output.push('\n');
    let _ = writeln!(output, "Total debits:    {}", record.total_debits());
    let _ = writeln!(output, "Total credits:   {}", record.total_credits());

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccparse_core::{MaskedCardNumber, TransactionType};

    fn sample() -> StatementRecord {
        StatementRecord {
            issuer: Some("HDFC".to_string()),
            card_number: MaskedCardNumber::from_last_four("1234"),
            total_amount_due: Some("1,200.00".to_string()),
            transactions: vec![
                TransactionRecord {
                    date: "05-Jan-2024".to_string(),
                    kind: TransactionType::Debit,
                    description: "Grocery, Store".to_string(),
                    debit: Some("1,200.00".to_string()),
                    credit: None,
                },
                TransactionRecord {
                    date: "12-Jan-2024".to_string(),
                    kind: TransactionType::Credit,
                    description: "Payment".to_string(),
                    debit: None,
                    credit: Some("500.00".to_string()),
                },
            ],
            ..StatementRecord::default()
        }
    }

    #[test]
    fn test_csv_row_per_transaction() {
        let csv = format_record(&sample(), OutputFormat::Csv, false).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("HDFC,XXXX-XXXX-XXXX-1234,unknown,"));
        assert!(lines[1].ends_with("05-Jan-2024,DEBIT,\"Grocery, Store\",\"1,200.00\","));
        assert!(lines[2].ends_with("12-Jan-2024,CREDIT,Payment,,500.00"));
    }

    #[test]
    fn test_csv_without_transactions() {
        let csv = format_record(&StatementRecord::default(), OutputFormat::Csv, false).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("unknown,unknown,unknown"));
    }

    #[test]
    fn test_text_totals() {
        let text = format_record(&sample(), OutputFormat::Text, false).unwrap();
        assert!(text.contains("Total debits:    1200.00"));
        assert!(text.contains("Total credits:   500.00"));
    }

    #[test]
    fn test_json_uses_sentinel() {
        let json = format_record(&StatementRecord::default(), OutputFormat::Json, false).unwrap();
        assert!(json.contains(r#""issuer":"unknown""#));
    }
}
